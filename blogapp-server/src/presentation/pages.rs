//! Read-only HTML pages over the same posts the JSON API serves.

use crate::application::BlogService;
use crate::domain::{Caller, DomainError, Post};
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use askama::Template;
use std::sync::Arc;

const DISPLAY_TIME_FORMAT: &str = "%B %-d, %Y, %H:%M UTC";
const EXCERPT_WORDS: usize = 30;

/// Values every page needs to build links.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub base_path: String,
}

impl PageContext {
    pub fn home_href(&self) -> String {
        format!("{}/", self.base_path)
    }

    pub fn post_href(&self, id: i64) -> String {
        format!("{}/post/{}/", self.base_path, id)
    }
}

#[derive(Clone)]
pub struct PostView {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub author: String,
    pub published: String,
    pub href: String,
}

impl PostView {
    fn new(post: Post, ctx: &PageContext) -> Self {
        Self {
            excerpt: excerpt(&post.content, EXCERPT_WORDS),
            href: ctx.post_href(post.id),
            published: post.created_at.format(DISPLAY_TIME_FORMAT).to_string(),
            author: post.author.username,
            title: post.title,
            content: post.content,
        }
    }
}

fn excerpt(content: &str, max_words: usize) -> String {
    let words: Vec<&str> = content.split_whitespace().collect();
    if words.len() <= max_words {
        words.join(" ")
    } else {
        format!("{} …", words[..max_words].join(" "))
    }
}

#[derive(Template)]
#[template(path = "post_list.html")]
struct PostListTemplate {
    home_href: String,
    posts: Vec<PostView>,
}

#[derive(Template)]
#[template(path = "post_detail.html")]
struct PostDetailTemplate {
    home_href: String,
    post: PostView,
}

#[derive(Template)]
#[template(path = "not_found.html")]
struct NotFoundTemplate {
    home_href: String,
}

fn render_page<T: Template>(template: T, status: StatusCode) -> Result<HttpResponse, DomainError> {
    let html = template.render().map_err(|err| {
        tracing::error!("Template rendering failed: {}", err);
        DomainError::InternalError(format!("Template rendering failed: {}", err))
    })?;

    Ok(HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(html))
}

// Pages never look at the Authorization header, so a stale token on a browser
// still gets the page.
pub async fn post_list(
    blog_service: web::Data<Arc<BlogService>>,
    ctx: web::Data<PageContext>,
) -> Result<HttpResponse, DomainError> {
    let posts = blog_service.list_posts(&Caller::Anonymous).await?;

    let template = PostListTemplate {
        home_href: ctx.home_href(),
        posts: posts
            .into_iter()
            .map(|post| PostView::new(post, &ctx))
            .collect(),
    };
    render_page(template, StatusCode::OK)
}

pub async fn post_detail(
    blog_service: web::Data<Arc<BlogService>>,
    ctx: web::Data<PageContext>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    match blog_service
        .get_post(&Caller::Anonymous, path.into_inner())
        .await
    {
        Ok(post) => render_page(
            PostDetailTemplate {
                home_href: ctx.home_href(),
                post: PostView::new(post, &ctx),
            },
            StatusCode::OK,
        ),
        Err(DomainError::PostNotFound) => render_page(
            NotFoundTemplate {
                home_href: ctx.home_href(),
            },
            StatusCode::NOT_FOUND,
        ),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_cuts_long_content_on_word_boundaries() {
        assert_eq!(excerpt("one  two\nthree", 5), "one two three");
        assert_eq!(excerpt("a b c d", 2), "a b …");
    }

    #[test]
    fn links_respect_base_path() {
        let root = PageContext {
            base_path: String::new(),
        };
        assert_eq!(root.home_href(), "/");
        assert_eq!(root.post_href(4), "/post/4/");

        let nested = PageContext {
            base_path: "/blog".to_string(),
        };
        assert_eq!(nested.home_href(), "/blog/");
        assert_eq!(nested.post_href(4), "/blog/post/4/");
    }

    #[test]
    fn list_page_escapes_user_content() {
        let html = PostListTemplate {
            home_href: "/".to_string(),
            posts: vec![PostView {
                title: "<script>alert(1)</script>".to_string(),
                content: "body".to_string(),
                excerpt: "body".to_string(),
                author: "alice".to_string(),
                published: "March 1, 2024, 12:00 UTC".to_string(),
                href: "/post/1/".to_string(),
            }],
        }
        .render()
        .unwrap();

        assert!(html.contains("&#60;script&#62;alert(1)&#60;/script&#62;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("/post/1/"));
    }
}
