//! In-process stores used by the `memory` storage backend and by tests.
//!
//! Contents live only as long as the process.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::post_repository::PostRepository;
use super::user_repository::UserRepository;
use crate::domain::post::{NewPost, PostChanges};
use crate::domain::user::RegisterUserRequest;
use crate::domain::{DomainError, Post, User};

#[derive(Default)]
struct PostTable {
    rows: BTreeMap<i64, Post>,
    last_id: i64,
    last_created_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
pub struct InMemoryPostRepository {
    table: RwLock<PostTable>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, DomainError> {
        let mut table = self.table.write().await;

        // ids are never handed out twice, even after deletes
        table.last_id += 1;
        let id = table.last_id;

        // the wall clock may step backwards; listing order must not
        let now = Utc::now();
        let created_at = match table.last_created_at {
            Some(last) if last > now => last,
            _ => now,
        };
        table.last_created_at = Some(created_at);

        let stored = Post {
            id,
            title: post.title,
            content: post.content,
            author: post.author,
            created_at,
        };
        table.rows.insert(id, stored.clone());

        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> Result<Post, DomainError> {
        let table = self.table.read().await;
        table.rows.get(&id).cloned().ok_or(DomainError::PostNotFound)
    }

    async fn update(&self, id: i64, changes: PostChanges) -> Result<Post, DomainError> {
        let mut table = self.table.write().await;
        let post = table.rows.get_mut(&id).ok_or(DomainError::PostNotFound)?;

        if let Some(title) = changes.title {
            post.title = title;
        }
        if let Some(content) = changes.content {
            post.content = content;
        }

        Ok(post.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let mut table = self.table.write().await;
        table
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::PostNotFound)
    }

    async fn list(&self) -> Result<Vec<Post>, DomainError> {
        let table = self.table.read().await;
        let mut posts: Vec<Post> = table.rows.values().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts)
    }
}

#[derive(Default)]
struct UserTable {
    rows: BTreeMap<i64, User>,
    last_id: i64,
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    table: RwLock<UserTable>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(
        &self,
        req: RegisterUserRequest,
        password_hash: String,
    ) -> Result<User, DomainError> {
        let mut table = self.table.write().await;

        let taken = table
            .rows
            .values()
            .any(|u| u.username == req.username || u.email == req.email);
        if taken {
            return Err(DomainError::UserAlreadyExists);
        }

        table.last_id += 1;
        let user = User {
            id: table.last_id,
            username: req.username,
            email: req.email,
            password_hash,
            created_at: Utc::now(),
        };
        table.rows.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|u| u.email == email).cloned())
    }
}
