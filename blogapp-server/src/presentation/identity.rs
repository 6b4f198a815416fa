use crate::domain::{Caller, DomainError};
use crate::infrastructure::jwt::JwtService;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use futures::future::LocalBoxFuture;
use std::sync::Arc;

/// Resolves the caller from an optional `Authorization: Bearer` header.
///
/// No bearer credentials means an anonymous caller. A bearer token that does
/// not verify is rejected with 401 instead of being downgraded to anonymous.
impl FromRequest for Caller {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let credentials = Option::<BearerAuth>::from_request(req, payload);
        let jwt_service = req.app_data::<web::Data<Arc<JwtService>>>().cloned();

        Box::pin(async move {
            let credentials = credentials.await.unwrap_or(None);
            resolve_caller(credentials, jwt_service).map_err(actix_web::Error::from)
        })
    }
}

fn resolve_caller(
    credentials: Option<BearerAuth>,
    jwt_service: Option<web::Data<Arc<JwtService>>>,
) -> Result<Caller, DomainError> {
    let Some(credentials) = credentials else {
        return Ok(Caller::Anonymous);
    };

    let jwt_service = jwt_service.ok_or_else(|| {
        tracing::error!("JwtService not found in app data");
        DomainError::InternalError("JWT service not configured".to_string())
    })?;

    let author = jwt_service.verify_token(credentials.token())?;
    Ok(Caller::Authenticated(author))
}
