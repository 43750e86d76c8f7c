use actix_web::{web, HttpResponse};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::config::MAX_POST_LENGTH;
use crate::core::db::encode_id_list;
use crate::core::errors::ApiError;
use crate::models::models::{LikeReq, NewPostReq, Post, UserSummary};
use crate::users::{get_user_summary, users_from_ids};

pub async fn insert_post(
    conn: &mut SqliteConnection,
    created_by: i64,
    content: &str,
) -> Result<Post, sqlx::Error> {
    let now = Utc::now();
    sqlx::query_as::<_, Post>(
        "INSERT INTO posts(created_by, content, created_at, updated_at)
         VALUES(?, ?, ?, ?) RETURNING *",
    )
    .bind(created_by)
    .bind(content)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *conn)
    .await
}

pub async fn get_post(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn posts_by_creator(
    conn: &mut SqliteConnection,
    creator_id: i64,
) -> Result<Vec<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE created_by = ?")
        .bind(creator_id)
        .fetch_all(&mut *conn)
        .await
}

/// Applies a like toggle on a post and returns the updated liker list. The
/// likes column is rewritten in full inside the caller's transaction.
pub async fn apply_like_action(
    conn: &mut SqliteConnection,
    post_id: i64,
    user_id: i64,
    action: &str,
) -> Result<Vec<i64>, ApiError> {
    let post = get_post(&mut *conn, post_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    let mut likes = post.likes;
    match action {
        "like" => {
            // the liker must exist; the whole operation fails otherwise
            if get_user_summary(&mut *conn, user_id).await?.is_none() {
                return Err(ApiError::NotFound("User not found".to_string()));
            }
            if !likes.contains(&user_id) {
                likes.push(user_id);
            }
        }
        "unlike" => likes.retain(|&id| id != user_id),
        // unrecognized action: the list passes through unchanged
        _ => {}
    }

    sqlx::query("UPDATE posts SET likes = ?, updated_at = ? WHERE id = ?")
        .bind(encode_id_list(&likes))
        .bind(Utc::now())
        .bind(post_id)
        .execute(&mut *conn)
        .await?;

    Ok(likes)
}

pub fn post_with_likes_json(post: &Post, likes: &[UserSummary]) -> serde_json::Value {
    serde_json::json!({
        "id": post.id,
        "content": post.content,
        "created_by": post.created_by,
        "likes": likes,
        "created_at": post.created_at,
        "updated_at": post.updated_at,
    })
}

// === HTTP Handlers ===

pub async fn create_post(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    body: web::Json<NewPostReq>,
) -> Result<HttpResponse, ApiError> {
    let created_by = path.into_inner();
    let content = body.into_inner().content;

    if content.is_empty() || content.len() > MAX_POST_LENGTH {
        return Err(ApiError::BadRequest("Invalid content".to_string()));
    }

    let mut tx = pool.begin().await?;
    let post = insert_post(&mut tx, created_by, &content).await?;
    tx.commit().await?;

    Ok(HttpResponse::Ok().json(post))
}

pub async fn list_posts(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let creator_id = path.into_inner();

    let mut tx = pool.begin().await?;
    let posts = posts_by_creator(&mut tx, creator_id).await?;
    let mut hydrated = Vec::with_capacity(posts.len());
    for post in &posts {
        let likes = users_from_ids(&mut tx, post.likes.iter().map(|&id| Some(id))).await?;
        hydrated.push(post_with_likes_json(post, &likes));
    }
    tx.commit().await?;

    Ok(HttpResponse::Ok().json(hydrated))
}

pub async fn toggle_like(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    body: web::Json<LikeReq>,
) -> Result<HttpResponse, ApiError> {
    let post_id = path.into_inner();
    let LikeReq { user_id, action } = body.into_inner();

    let mut tx = pool.begin().await?;
    let likes = apply_like_action(&mut tx, post_id, user_id, &action).await?;
    let hydrated = users_from_ids(&mut tx, likes.iter().map(|&id| Some(id))).await?;
    tx.commit().await?;

    Ok(HttpResponse::Ok().json(hydrated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::testing;

    #[tokio::test]
    async fn insert_and_list_by_creator() {
        let pool = testing::pool().await;
        let alice = testing::seed_user(&pool, "alice", "alice@example.com").await;

        let mut conn = pool.acquire().await.unwrap();
        let post = insert_post(&mut conn, alice, "first!").await.unwrap();
        assert_eq!(post.created_by, alice);
        assert!(post.likes.is_empty());

        insert_post(&mut conn, alice, "second").await.unwrap();
        let posts = posts_by_creator(&mut conn, alice).await.unwrap();
        assert_eq!(posts.len(), 2);

        let none = posts_by_creator(&mut conn, 999).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn like_then_unlike_restores_prior_state() {
        let pool = testing::pool().await;
        let alice = testing::seed_user(&pool, "alice", "alice@example.com").await;
        let bob = testing::seed_user(&pool, "bob", "bob@example.com").await;

        let mut conn = pool.acquire().await.unwrap();
        let post = insert_post(&mut conn, alice, "hello").await.unwrap();

        let likes = apply_like_action(&mut conn, post.id, bob, "like")
            .await
            .unwrap();
        assert_eq!(likes, vec![bob]);

        let likes = apply_like_action(&mut conn, post.id, bob, "unlike")
            .await
            .unwrap();
        assert!(likes.is_empty());

        let stored = get_post(&mut conn, post.id).await.unwrap().unwrap();
        assert!(stored.likes.is_empty());
    }

    #[tokio::test]
    async fn double_like_keeps_single_entry() {
        let pool = testing::pool().await;
        let alice = testing::seed_user(&pool, "alice", "alice@example.com").await;
        let bob = testing::seed_user(&pool, "bob", "bob@example.com").await;

        let mut conn = pool.acquire().await.unwrap();
        let post = insert_post(&mut conn, alice, "hello").await.unwrap();

        apply_like_action(&mut conn, post.id, bob, "like").await.unwrap();
        let likes = apply_like_action(&mut conn, post.id, bob, "like")
            .await
            .unwrap();
        assert_eq!(likes, vec![bob]);
    }

    #[tokio::test]
    async fn like_requires_existing_user_and_post() {
        let pool = testing::pool().await;
        let alice = testing::seed_user(&pool, "alice", "alice@example.com").await;

        let mut conn = pool.acquire().await.unwrap();
        let post = insert_post(&mut conn, alice, "hello").await.unwrap();

        let err = apply_like_action(&mut conn, post.id, 999, "like")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        let stored = get_post(&mut conn, post.id).await.unwrap().unwrap();
        assert!(stored.likes.is_empty());

        let err = apply_like_action(&mut conn, 999, alice, "like")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn unknown_action_leaves_likes_unchanged() {
        let pool = testing::pool().await;
        let alice = testing::seed_user(&pool, "alice", "alice@example.com").await;
        let bob = testing::seed_user(&pool, "bob", "bob@example.com").await;

        let mut conn = pool.acquire().await.unwrap();
        let post = insert_post(&mut conn, alice, "hello").await.unwrap();
        apply_like_action(&mut conn, post.id, bob, "like").await.unwrap();

        let likes = apply_like_action(&mut conn, post.id, bob, "boost")
            .await
            .unwrap();
        assert_eq!(likes, vec![bob]);
    }
}
