use actix_web::{web, HttpResponse};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::core::db::encode_id_list;
use crate::core::errors::ApiError;
use crate::models::models::FollowReq;
use crate::users::{get_full_user, users_from_ids};

/// Applies a follow toggle between two users and returns the follower's
/// updated follows list. Both denormalized lists (the follower's follows and
/// the target's followers) are rewritten in full; the caller's transaction
/// keeps them in sync.
pub async fn apply_follow_action(
    conn: &mut SqliteConnection,
    target_id: i64,
    follower_id: i64,
    action: &str,
) -> Result<Vec<i64>, ApiError> {
    let follower = get_full_user(&mut *conn, follower_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    let target = get_full_user(&mut *conn, target_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let mut follows = follower.follows;
    let mut followers = target.followers;
    match action {
        "subscribe" => {
            if !follows.contains(&target_id) {
                follows.push(target_id);
            }
            if !followers.contains(&follower_id) {
                followers.push(follower_id);
            }
        }
        "unsubscribe" => {
            follows.retain(|&id| id != target_id);
            followers.retain(|&id| id != follower_id);
        }
        // unrecognized action: both lists pass through unchanged
        _ => {}
    }

    let now = Utc::now();
    sqlx::query("UPDATE users SET follows = ?, updated_at = ? WHERE id = ?")
        .bind(encode_id_list(&follows))
        .bind(now)
        .bind(follower_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("UPDATE users SET followers = ?, updated_at = ? WHERE id = ?")
        .bind(encode_id_list(&followers))
        .bind(now)
        .bind(target_id)
        .execute(&mut *conn)
        .await?;

    Ok(follows)
}

// === HTTP Handlers ===

pub async fn toggle_follow(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    body: web::Json<FollowReq>,
) -> Result<HttpResponse, ApiError> {
    let target_id = path.into_inner();
    let FollowReq {
        follower_id,
        action,
    } = body.into_inner();

    let mut tx = pool.begin().await?;
    let follows = apply_follow_action(&mut tx, target_id, follower_id, &action).await?;
    let hydrated = users_from_ids(&mut tx, follows.iter().map(|&id| Some(id))).await?;
    tx.commit().await?;

    Ok(HttpResponse::Ok().json(hydrated))
}
