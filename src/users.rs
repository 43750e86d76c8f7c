use actix_web::{web, HttpResponse};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use crate::core::errors::ApiError;
use crate::models::models::{User, UserSummary};
use crate::posts::{post_with_likes_json, posts_by_creator};

pub async fn get_user_summary(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<UserSummary>, sqlx::Error> {
    sqlx::query_as::<_, UserSummary>("SELECT id, user_name FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn get_full_user(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn list_user_summaries(
    conn: &mut SqliteConnection,
) -> Result<Vec<UserSummary>, sqlx::Error> {
    sqlx::query_as::<_, UserSummary>("SELECT id, user_name FROM users")
        .fetch_all(&mut *conn)
        .await
}

/// Resolves a batch of ids to user summaries in one round trip. Holes in the
/// input are skipped; an empty batch never touches the store.
pub async fn users_from_ids<I>(
    conn: &mut SqliteConnection,
    ids: I,
) -> Result<Vec<UserSummary>, sqlx::Error>
where
    I: IntoIterator<Item = Option<i64>>,
{
    let present: Vec<i64> = ids.into_iter().flatten().collect();
    if present.is_empty() {
        return Ok(Vec::new());
    }

    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT id, user_name FROM users WHERE id IN (");
    let mut ids_sql = query.separated(", ");
    for id in &present {
        ids_sql.push_bind(*id);
    }
    ids_sql.push_unseparated(")");

    query
        .build_query_as::<UserSummary>()
        .fetch_all(&mut *conn)
        .await
}

// === HTTP Handlers ===

pub async fn list_users(pool: web::Data<SqlitePool>) -> Result<HttpResponse, ApiError> {
    let mut conn = pool.acquire().await?;
    let users = list_user_summaries(&mut conn).await?;

    Ok(HttpResponse::Ok().json(users))
}

pub async fn get_user(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();

    let mut tx = pool.begin().await?;
    let user = get_full_user(&mut tx, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let follows = users_from_ids(&mut tx, user.follows.iter().map(|&id| Some(id))).await?;
    let followers = users_from_ids(&mut tx, user.followers.iter().map(|&id| Some(id))).await?;

    let posts = posts_by_creator(&mut tx, user_id).await?;
    let mut hydrated_posts = Vec::with_capacity(posts.len());
    for post in &posts {
        let likes = users_from_ids(&mut tx, post.likes.iter().map(|&id| Some(id))).await?;
        hydrated_posts.push(post_with_likes_json(post, &likes));
    }
    tx.commit().await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "id": user.id,
        "user_name": user.user_name,
        "email": user.email,
        "follows": follows,
        "followers": followers,
        "posts": hydrated_posts,
        "created_at": user.created_at,
        "updated_at": user.updated_at,
    })))
}
