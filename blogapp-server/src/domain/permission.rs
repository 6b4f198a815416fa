//! Who may do what to a post.
//!
//! Reads are open to everyone. Writes need an authenticated caller, and
//! writes against an existing post need the caller to be its author.

use super::error::DomainError;
use super::post::{Author, Post};

/// The identity behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    Authenticated(Author),
}

impl Caller {
    pub fn user(&self) -> Option<&Author> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(author) => Some(author),
        }
    }

    /// The authenticated identity, or `NotAuthenticated`.
    pub fn require_user(&self) -> Result<&Author, DomainError> {
        self.user().ok_or(DomainError::NotAuthenticated)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn is_read(self) -> bool {
        matches!(self, Self::List | Self::Retrieve)
    }
}

/// Request-level check, evaluated before the target post is looked up.
pub fn check_request(action: Action, caller: &Caller) -> Result<(), DomainError> {
    if action.is_read() {
        return Ok(());
    }
    caller.require_user().map(|_| ())
}

/// Object-level check against a post that is known to exist.
pub fn check_object(action: Action, caller: &Caller, post: &Post) -> Result<(), DomainError> {
    if action.is_read() {
        return Ok(());
    }
    let user = caller.require_user()?;
    match action {
        Action::Update | Action::Delete if post.author.id != user.id => Err(DomainError::Forbidden),
        _ => Ok(()),
    }
}

/// Both checks at once. `post` is `None` for actions without a target.
pub fn authorize(action: Action, caller: &Caller, post: Option<&Post>) -> Result<(), DomainError> {
    check_request(action, caller)?;
    match post {
        Some(post) => check_object(action, caller, post),
        None => Ok(()),
    }
}
