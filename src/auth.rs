use actix_web::{web, HttpResponse};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::config::{MAX_USERNAME_LENGTH, MIN_PASSWORD_LENGTH, MIN_USERNAME_LENGTH};
use crate::core::errors::ApiError;
use crate::core::helpers::{hash_password, sanitize_text, verify_password};
use crate::models::models::{SignInReq, SignUpReq, User};

/// Looks up the stored hash for a login string that may be an email or a
/// user name. When both match different rows the first row wins.
pub async fn find_login_hash(
    conn: &mut SqliteConnection,
    login: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT hash FROM login WHERE email = ?1 OR user_name = ?1")
        .bind(login)
        .fetch_optional(&mut *conn)
        .await
}

async fn create_account(
    pool: &SqlitePool,
    email: &str,
    user_name: &str,
    password: &str,
) -> anyhow::Result<User> {
    let hash = hash_password(password)?;

    // users row and login row must land together
    let mut tx = pool.begin().await?;
    let now = Utc::now();
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users(email, user_name, created_at, updated_at)
         VALUES(?, ?, ?, ?) RETURNING *",
    )
    .bind(email)
    .bind(user_name)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO login(email, user_name, hash) VALUES(?, ?, ?)")
        .bind(email)
        .bind(user_name)
        .bind(&hash)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(user)
}

async fn authenticate(
    pool: &SqlitePool,
    login: &str,
    password: &str,
) -> anyhow::Result<Option<User>> {
    let mut tx = pool.begin().await?;

    let Some(hash) = find_login_hash(&mut tx, login).await? else {
        return Ok(None);
    };
    if !verify_password(password, &hash) {
        return Ok(None);
    }

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?1 OR user_name = ?1")
        .bind(login)
        .fetch_optional(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(user)
}

// === HTTP Handlers ===

pub async fn signup(
    pool: web::Data<SqlitePool>,
    body: web::Json<SignUpReq>,
) -> Result<HttpResponse, ApiError> {
    let SignUpReq {
        user_name,
        email,
        password,
    } = body.into_inner();

    let user_name = sanitize_text(&user_name);
    if email.is_empty() {
        return Err(ApiError::BadRequest("Email is required".to_string()));
    }
    if user_name.len() < MIN_USERNAME_LENGTH || user_name.len() > MAX_USERNAME_LENGTH {
        return Err(ApiError::BadRequest(
            "Username must be 3-50 characters".to_string(),
        ));
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(
            "Password must be at least 3 characters".to_string(),
        ));
    }

    match create_account(&pool, &email, &user_name, &password).await {
        Ok(user) => Ok(HttpResponse::Ok().json(user)),
        Err(err) => {
            tracing::warn!("signup failed: {:#}", err);
            Err(ApiError::BadRequest("cannot signup".to_string()))
        }
    }
}

pub async fn signin(
    pool: web::Data<SqlitePool>,
    body: web::Json<SignInReq>,
) -> Result<HttpResponse, ApiError> {
    let SignInReq { login, password } = body.into_inner();

    let user = match authenticate(&pool, &login, &password).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(ApiError::Unauthorized),
        Err(err) => {
            tracing::warn!("signin failed: {:#}", err);
            return Err(ApiError::Unauthorized);
        }
    };

    Ok(HttpResponse::Ok().json(user))
}
