use crate::data::post_repository::PostRepository;
use crate::domain::permission::{self, Action, Caller};
use crate::domain::post::{NewPost, PostChanges, PostPayload};
use crate::domain::{DomainError, Post};
use std::sync::Arc;

/// Whether an update replaces every writable field or only those supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    Full,
    Partial,
}

pub struct BlogService {
    post_repo: Arc<dyn PostRepository + Send + Sync>,
}

impl BlogService {
    pub fn new(post_repo: Arc<dyn PostRepository + Send + Sync>) -> Self {
        Self { post_repo }
    }

    pub async fn list_posts(&self, caller: &Caller) -> Result<Vec<Post>, DomainError> {
        permission::authorize(Action::List, caller, None)?;
        self.post_repo.list().await
    }

    pub async fn get_post(&self, caller: &Caller, id: i64) -> Result<Post, DomainError> {
        let post = self.post_repo.find_by_id(id).await?;
        permission::authorize(Action::Retrieve, caller, Some(&post))?;
        Ok(post)
    }

    pub async fn create_post(
        &self,
        caller: &Caller,
        payload: PostPayload,
    ) -> Result<Post, DomainError> {
        permission::authorize(Action::Create, caller, None)?;
        let author = caller.require_user()?.clone();

        let fields = payload.validate()?;

        let post = self
            .post_repo
            .create(NewPost {
                title: fields.title,
                content: fields.content,
                author,
            })
            .await?;

        tracing::info!(post_id = post.id, author_id = post.author.id, "Post created");

        Ok(post)
    }

    pub async fn update_post(
        &self,
        caller: &Caller,
        id: i64,
        payload: PostPayload,
        mode: UpdateMode,
    ) -> Result<Post, DomainError> {
        permission::check_request(Action::Update, caller)?;

        let post = self.post_repo.find_by_id(id).await?;
        self.check_owner(Action::Update, caller, &post)?;

        let changes = match mode {
            UpdateMode::Full => PostChanges::from(payload.validate()?),
            UpdateMode::Partial => payload.validate_partial()?,
        };

        let updated = self.post_repo.update(id, changes).await?;

        tracing::info!(post_id = id, author_id = updated.author.id, ?mode, "Post updated");

        Ok(updated)
    }

    pub async fn delete_post(&self, caller: &Caller, id: i64) -> Result<(), DomainError> {
        permission::check_request(Action::Delete, caller)?;

        let post = self.post_repo.find_by_id(id).await?;
        self.check_owner(Action::Delete, caller, &post)?;

        self.post_repo.delete(id).await?;

        tracing::info!(post_id = id, author_id = post.author.id, "Post deleted");

        Ok(())
    }

    fn check_owner(&self, action: Action, caller: &Caller, post: &Post) -> Result<(), DomainError> {
        permission::check_object(action, caller, post).inspect_err(|_| {
            tracing::warn!(
                "User {:?} attempted to {:?} post {} owned by {}",
                caller.user().map(|u| u.id),
                action,
                post.id,
                post.author.id
            );
        })
    }
}
