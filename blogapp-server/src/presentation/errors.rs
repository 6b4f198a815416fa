use crate::domain::DomainError;
use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};

const SERVER_ERROR_DETAIL: &str = "A server error occurred.";

#[derive(serde::Serialize)]
struct ErrorBody<'a> {
    detail: &'a str,
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.to_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());

        match self {
            Self::ValidationFailed(errors) => response.json(errors.as_map()),
            Self::DatabaseError(_) | Self::InternalError(_) => {
                tracing::error!("Request failed: {}", self);
                response.json(ErrorBody {
                    detail: SERVER_ERROR_DETAIL,
                })
            }
            Self::Unauthorized(_) | Self::InvalidCredentials => response
                .insert_header((header::WWW_AUTHENTICATE, "Bearer realm=\"api\""))
                .json(ErrorBody {
                    detail: &self.to_string(),
                }),
            _ => response.json(ErrorBody {
                detail: &self.to_string(),
            }),
        }
    }
}

/// Rejects unparsable JSON bodies with a 400 in the same shape as other errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        tracing::debug!("Rejected request body: {}", err);
        DomainError::MalformedRequest(format!("JSON parse error - {}", err)).into()
    })
}
