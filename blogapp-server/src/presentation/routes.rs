use crate::application::{AuthService, BlogService};
use crate::infrastructure::jwt::JwtService;
use actix_web::web;
use std::sync::Arc;

use super::errors::json_config;
use super::http_handlers;
use super::pages::{self, PageContext};

/// Everything the handlers pull out of app data.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub blog_service: Arc<BlogService>,
    pub jwt_service: Arc<JwtService>,
    /// Already normalized: empty or `/segment` without a trailing slash.
    pub base_path: String,
}

/// Registers app data and every route under `state.base_path`.
///
/// Paths are declared with trailing slashes; pair the app with
/// `NormalizePath::new(TrailingSlash::Always)` so the bare forms match too.
pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(web::Data::new(state.auth_service.clone()))
        .app_data(web::Data::new(state.blog_service.clone()))
        .app_data(web::Data::new(state.jwt_service.clone()))
        .app_data(web::Data::new(PageContext {
            base_path: state.base_path.clone(),
        }))
        .app_data(json_config())
        .service(
            web::scope(&state.base_path)
                .service(
                    web::scope("/api/auth")
                        .route("/register/", web::post().to(http_handlers::register))
                        .route("/login/", web::post().to(http_handlers::login)),
                )
                .service(
                    web::scope("/api/posts")
                        .route("/", web::get().to(http_handlers::list_posts))
                        .route("/", web::post().to(http_handlers::create_post))
                        .route("/{id}/", web::get().to(http_handlers::get_post))
                        .route("/{id}/", web::put().to(http_handlers::update_post))
                        .route("/{id}/", web::patch().to(http_handlers::partial_update_post))
                        .route("/{id}/", web::delete().to(http_handlers::delete_post)),
                )
                .route("/", web::get().to(pages::post_list))
                .route("/post/{id}/", web::get().to(pages::post_detail)),
        );
}
