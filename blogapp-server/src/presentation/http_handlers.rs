use crate::application::{AuthService, BlogService, UpdateMode};
use crate::domain::post::{PostPayload, PostResponse};
use crate::domain::user::{LoginUserRequest, RegisterUserRequest, UserResponse};
use crate::domain::permission::{self, Action};
use crate::domain::{Caller, DomainError};
use actix_web::{web, HttpResponse};
use std::sync::Arc;

#[derive(serde::Serialize)]
struct AuthResponse {
    token: String,
    user: UserResponse,
}

// ============== Auth Handlers ==============

pub async fn register(
    auth_service: web::Data<Arc<AuthService>>,
    req: web::Json<RegisterUserRequest>,
) -> Result<HttpResponse, DomainError> {
    let (token, user) = auth_service.register(req.into_inner()).await?;
    Ok(HttpResponse::Created().json(AuthResponse { token, user }))
}

pub async fn login(
    auth_service: web::Data<Arc<AuthService>>,
    req: web::Json<LoginUserRequest>,
) -> Result<HttpResponse, DomainError> {
    let (token, user) = auth_service.login(req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(AuthResponse { token, user }))
}

// ============== Post Handlers ==============

// Write bodies are extracted lazily so an anonymous caller is told 403 even
// when the body would not parse.
type WriteBody = Result<web::Json<PostPayload>, actix_web::Error>;

pub async fn list_posts(
    blog_service: web::Data<Arc<BlogService>>,
    caller: Caller,
) -> Result<HttpResponse, DomainError> {
    let posts = blog_service.list_posts(&caller).await?;

    tracing::info!("Listing {} posts", posts.len());

    let body: Vec<PostResponse> = posts.into_iter().map(PostResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

pub async fn get_post(
    blog_service: web::Data<Arc<BlogService>>,
    caller: Caller,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();

    tracing::info!("Getting post with id={}", post_id);

    let post = blog_service.get_post(&caller, post_id).await?;
    Ok(HttpResponse::Ok().json(PostResponse::from(post)))
}

pub async fn create_post(
    blog_service: web::Data<Arc<BlogService>>,
    caller: Caller,
    payload: WriteBody,
) -> actix_web::Result<HttpResponse> {
    permission::check_request(Action::Create, &caller)?;
    let payload = payload?;

    tracing::info!("Creating post for user_id={:?}", caller.user().map(|u| u.id));

    let post = blog_service
        .create_post(&caller, payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(PostResponse::from(post)))
}

pub async fn update_post(
    blog_service: web::Data<Arc<BlogService>>,
    caller: Caller,
    path: web::Path<i64>,
    payload: WriteBody,
) -> actix_web::Result<HttpResponse> {
    apply_update(blog_service, caller, path, payload, UpdateMode::Full).await
}

pub async fn partial_update_post(
    blog_service: web::Data<Arc<BlogService>>,
    caller: Caller,
    path: web::Path<i64>,
    payload: WriteBody,
) -> actix_web::Result<HttpResponse> {
    apply_update(blog_service, caller, path, payload, UpdateMode::Partial).await
}

async fn apply_update(
    blog_service: web::Data<Arc<BlogService>>,
    caller: Caller,
    path: web::Path<i64>,
    payload: WriteBody,
    mode: UpdateMode,
) -> actix_web::Result<HttpResponse> {
    permission::check_request(Action::Update, &caller)?;
    let payload = payload?;
    let post_id = path.into_inner();

    tracing::info!(
        "Updating post id={} for user_id={:?}",
        post_id,
        caller.user().map(|u| u.id)
    );

    let post = blog_service
        .update_post(&caller, post_id, payload.into_inner(), mode)
        .await?;
    Ok(HttpResponse::Ok().json(PostResponse::from(post)))
}

pub async fn delete_post(
    blog_service: web::Data<Arc<BlogService>>,
    caller: Caller,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();

    tracing::info!(
        "Deleting post id={} for user_id={:?}",
        post_id,
        caller.user().map(|u| u.id)
    );

    blog_service.delete_post(&caller, post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
