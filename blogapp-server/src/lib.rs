pub mod application;
pub mod data;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

use std::sync::Arc;

use application::{AuthService, BlogService};
use data::post_repository::PostRepository;
use data::user_repository::UserRepository;
use domain::DomainError;
use infrastructure::jwt::JwtService;
use presentation::AppState;

/// Wires services over the given stores.
pub fn build_state(
    user_repo: Arc<dyn UserRepository + Send + Sync>,
    post_repo: Arc<dyn PostRepository + Send + Sync>,
    jwt_secret: &str,
    base_path: String,
) -> Result<AppState, DomainError> {
    let jwt_service = Arc::new(JwtService::new(jwt_secret)?);

    Ok(AppState {
        auth_service: Arc::new(AuthService::new(user_repo, jwt_service.clone())),
        blog_service: Arc::new(BlogService::new(post_repo)),
        jwt_service,
        base_path,
    })
}
