use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use crate::core::db::decode_id_list;

#[derive(Serialize, Clone, Debug)]
pub struct User {
    pub id: i64,
    pub user_name: String,
    pub email: String,
    pub follows: Vec<i64>,
    pub followers: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// follows/followers live in JSON-encoded TEXT columns; decode them here so
// every query path gets the same list handling.
impl FromRow<'_, SqliteRow> for User {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let follows: String = row.try_get("follows")?;
        let followers: String = row.try_get("followers")?;
        Ok(Self {
            id: row.try_get("id")?,
            user_name: row.try_get("user_name")?,
            email: row.try_get("email")?,
            follows: decode_id_list("follows", &follows)?,
            followers: decode_id_list("followers", &followers)?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Serialize, Deserialize, FromRow, Clone, Debug, PartialEq, Eq)]
pub struct UserSummary {
    pub id: i64,
    pub user_name: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct Post {
    pub id: i64,
    pub content: String,
    pub created_by: i64,
    pub likes: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRow<'_, SqliteRow> for Post {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let likes: String = row.try_get("likes")?;
        Ok(Self {
            id: row.try_get("id")?,
            content: row.try_get("content")?,
            created_by: row.try_get("created_by")?,
            likes: decode_id_list("likes", &likes)?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

// === Request payloads ===

#[derive(Deserialize)]
pub struct SignUpReq {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SignInReq {
    pub login: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct FollowReq {
    pub follower_id: i64,
    pub action: String,
}

#[derive(Deserialize)]
pub struct NewPostReq {
    pub content: String,
}

#[derive(Deserialize)]
pub struct LikeReq {
    pub user_id: i64,
    pub action: String,
}
