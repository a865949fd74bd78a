//! Blog handlers: CRUD-lite plus the like/dislike toggles.
//!
//! Liked/disliked status is derived from set membership at read time;
//! there is no stored flag to fall out of sync with the sets.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::Identity;
use crate::domain::aggregates::engagement::{toggle, Reaction, ReactionState};
use crate::error::{ApiError, ApiResult};
use crate::response::{ApiResponse, Meta};
use crate::AppState;

use super::products::slugify;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub category: String,
    pub author_id: Uuid,
    pub views: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct BlogView {
    #[serde(flatten)]
    pub blog: Blog,
    pub likes: i64,
    pub dislikes: i64,
    pub is_liked: bool,
    pub is_disliked: bool,
}

async fn blog_view(db: &sqlx::PgPool, blog: Blog, user: Option<Uuid>) -> ApiResult<BlogView> {
    let likes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blog_likes WHERE blog_id = $1")
        .bind(blog.id)
        .fetch_one(db)
        .await?;
    let dislikes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blog_dislikes WHERE blog_id = $1")
        .bind(blog.id)
        .fetch_one(db)
        .await?;
    let (is_liked, is_disliked) = match user {
        Some(user_id) => {
            let liked: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM blog_likes WHERE blog_id = $1 AND user_id = $2)",
            )
            .bind(blog.id)
            .bind(user_id)
            .fetch_one(db)
            .await?;
            let disliked: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM blog_dislikes WHERE blog_id = $1 AND user_id = $2)",
            )
            .bind(blog.id)
            .bind(user_id)
            .fetch_one(db)
            .await?;
            (liked, disliked)
        }
        None => (false, false),
    };
    Ok(BlogView { blog, likes, dislikes, is_liked, is_disliked })
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBlogRequest {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1))]
    pub category: String,
}

pub async fn create_blog(
    State(s): State<AppState>,
    Identity(author_id): Identity,
    Json(r): Json<CreateBlogRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Blog>>)> {
    r.validate()?;
    let blog = sqlx::query_as::<_, Blog>(
        "INSERT INTO blogs (id, title, slug, description, category, author_id) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&r.title)
    .bind(slugify(&r.title))
    .bind(&r.description)
    .bind(&r.category)
    .bind(author_id)
    .fetch_one(&s.db)
    .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok("create new blog successfully...", blog)))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category: Option<String>,
}

pub async fn list_blogs(
    State(s): State<AppState>,
    Query(p): Query<ListParams>,
) -> ApiResult<Json<ApiResponse<Vec<Blog>>>> {
    let page = p.page.unwrap_or(1).max(1);
    let per_page = p.per_page.unwrap_or(20).min(100);
    let category = p.category.unwrap_or_default();
    let blogs = sqlx::query_as::<_, Blog>(
        "SELECT * FROM blogs WHERE ($1 = '' OR category = $1) \
         ORDER BY created_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(&category)
    .bind(per_page as i64)
    .bind(crate::response::page_offset(page, per_page))
    .fetch_all(&s.db)
    .await?;
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blogs WHERE ($1 = '' OR category = $1)")
        .bind(&category)
        .fetch_one(&s.db)
        .await?;
    Ok(ApiResponse::with_meta(
        "get all blogs successfully...",
        blogs,
        Meta::paginated(total, page, per_page),
    ))
}

/// Reading a blog bumps its view counter.
pub async fn get_blog(
    State(s): State<AppState>,
    caller: Option<Identity>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<BlogView>>> {
    let blog = sqlx::query_as::<_, Blog>(
        "UPDATE blogs SET views = views + 1 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_optional(&s.db)
    .await?
    .ok_or(ApiError::BlogNotFound)?;
    let view = blog_view(&s.db, blog, caller.map(|Identity(u)| u)).await?;
    Ok(ApiResponse::ok("get blog by id successfully...", view))
}

pub async fn like_blog(
    State(s): State<AppState>,
    Identity(user_id): Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<BlogView>>> {
    react(s, user_id, id, Reaction::Like).await
}

pub async fn dislike_blog(
    State(s): State<AppState>,
    Identity(user_id): Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<BlogView>>> {
    react(s, user_id, id, Reaction::Dislike).await
}

/// Applies a reaction toggle: removals and the insert run in one
/// transaction, so a caller never observes both sets containing the user.
async fn react(
    s: AppState,
    user_id: Uuid,
    blog_id: Uuid,
    reaction: Reaction,
) -> ApiResult<Json<ApiResponse<BlogView>>> {
    let mut tx = s.db.begin().await?;
    let blog = sqlx::query_as::<_, Blog>("SELECT * FROM blogs WHERE id = $1 FOR UPDATE")
        .bind(blog_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::BlogNotFound)?;
    let liked: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM blog_likes WHERE blog_id = $1 AND user_id = $2)",
    )
    .bind(blog_id)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;
    let disliked: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM blog_dislikes WHERE blog_id = $1 AND user_id = $2)",
    )
    .bind(blog_id)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    let change = toggle(ReactionState { liked, disliked }, reaction);
    for removed in &change.remove {
        let sql = match removed {
            Reaction::Like => "DELETE FROM blog_likes WHERE blog_id = $1 AND user_id = $2",
            Reaction::Dislike => "DELETE FROM blog_dislikes WHERE blog_id = $1 AND user_id = $2",
        };
        sqlx::query(sql).bind(blog_id).bind(user_id).execute(&mut *tx).await?;
    }
    if let Some(added) = change.add {
        let sql = match added {
            Reaction::Like => {
                "INSERT INTO blog_likes (blog_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING"
            }
            Reaction::Dislike => {
                "INSERT INTO blog_dislikes (blog_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING"
            }
        };
        sqlx::query(sql).bind(blog_id).bind(user_id).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    let message = match (change.add, reaction) {
        (Some(Reaction::Like), _) => "Blog liked successfully...",
        (Some(Reaction::Dislike), _) => "Blog disliked successfully...",
        (None, Reaction::Like) => "Blog unliked successfully...",
        (None, Reaction::Dislike) => "Blog undisliked successfully...",
    };
    let view = blog_view(&s.db, blog, Some(user_id)).await?;
    Ok(ApiResponse::ok(message, view))
}
