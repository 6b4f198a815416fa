//! Store tests against a real PostgreSQL database.
//!
//! Each test gets a fresh database with the migrations applied. They need
//! `DATABASE_URL` to point at a server where new databases can be created, so
//! they are ignored by default: `cargo test -- --ignored`.

use blogapp_server::data::post_repository::{PostRepository, PostgresPostRepository};
use blogapp_server::data::user_repository::{PostgresUserRepository, UserRepository};
use blogapp_server::domain::post::{Author, NewPost, PostChanges};
use blogapp_server::domain::user::RegisterUserRequest;
use blogapp_server::domain::DomainError;
use sqlx::PgPool;

async fn author(pool: &PgPool, username: &str) -> Author {
    let user = PostgresUserRepository::new(pool.clone())
        .create(
            RegisterUserRequest {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password: "unused".to_string(),
            },
            "hash".to_string(),
        )
        .await
        .expect("create user");
    Author {
        id: user.id,
        username: user.username,
    }
}

fn new_post(title: &str, author: &Author) -> NewPost {
    NewPost {
        title: title.to_string(),
        content: format!("{title} body"),
        author: author.clone(),
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn create_joins_the_author_name(pool: PgPool) {
    let alice = author(&pool, "alice").await;
    let repo = PostgresPostRepository::new(pool);

    let created = repo.create(new_post("First", &alice)).await.unwrap();
    assert_eq!(created.author, alice);
    assert_eq!(created.title, "First");

    let found = repo.find_by_id(created.id).await.unwrap();
    assert_eq!(found, created);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn partial_update_keeps_missing_fields(pool: PgPool) {
    let alice = author(&pool, "alice").await;
    let repo = PostgresPostRepository::new(pool);
    let created = repo.create(new_post("First", &alice)).await.unwrap();

    let updated = repo
        .update(
            created.id,
            PostChanges {
                title: Some("Renamed".to_string()),
                content: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.content, "First body");
    assert_eq!(updated.author, alice);
    assert_eq!(updated.created_at, created.created_at);

    let missing = repo
        .update(
            created.id + 1000,
            PostChanges {
                title: Some("x".to_string()),
                content: None,
            },
        )
        .await;
    assert!(matches!(missing, Err(DomainError::PostNotFound)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn list_is_newest_first_with_id_tie_break(pool: PgPool) {
    let alice = author(&pool, "alice").await;
    let bob = author(&pool, "bob").await;
    let repo = PostgresPostRepository::new(pool.clone());

    let t1 = repo.create(new_post("t1", &alice)).await.unwrap();
    let t2 = repo.create(new_post("t2", &bob)).await.unwrap();
    let t3 = repo.create(new_post("t3", &alice)).await.unwrap();

    // Give t2 and t3 the same timestamp.
    sqlx::query("UPDATE posts SET created_at = (SELECT created_at FROM posts WHERE id = $1) WHERE id = $2")
        .bind(t3.id)
        .bind(t2.id)
        .execute(&pool)
        .await
        .unwrap();

    let ids: Vec<i64> = repo.list().await.unwrap().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![t3.id, t2.id, t1.id]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn deleted_ids_are_gone_and_not_reused(pool: PgPool) {
    let alice = author(&pool, "alice").await;
    let repo = PostgresPostRepository::new(pool);

    let first = repo.create(new_post("First", &alice)).await.unwrap();
    repo.delete(first.id).await.unwrap();

    assert!(matches!(
        repo.find_by_id(first.id).await,
        Err(DomainError::PostNotFound)
    ));
    assert!(matches!(
        repo.delete(first.id).await,
        Err(DomainError::PostNotFound)
    ));

    let second = repo.create(new_post("Second", &alice)).await.unwrap();
    assert!(second.id > first.id);
}
