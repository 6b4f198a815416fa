pub mod error;
pub mod permission;
pub mod post;
pub mod user;

pub use error::{DomainError, FieldErrors};
pub use permission::{Action, Caller};
pub use post::{Author, Post};
pub use user::User;
