pub mod errors;
pub mod http_handlers;
pub mod identity;
pub mod pages;
pub mod routes;

pub use routes::{configure, AppState};
