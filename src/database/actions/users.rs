use crate::{
    authentication::{
        cryptography::{hash_password, verify_password},
        jwt::{generate_jwt_session, SessionData, SessionKey},
    },
    error::Error,
    form::{normalize_email, PasswordForm, RegisterForm},
    schema::{User, UserProfile, Uuid},
};

use chrono::Duration;
use sqlx::{Pool, Postgres};

pub async fn get_user(pool: &Pool<Postgres>, user_id: Uuid) -> Result<Option<User>, Error> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn get_user_by_email(
    pool: &Pool<Postgres>,
    email: &str,
) -> Result<Option<User>, Error> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE LOWER(email) = $1")
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Fails with `NotFound` when no user has the given id.
pub async fn require_user(pool: &Pool<Postgres>, user_id: Uuid) -> Result<User, Error> {
    get_user(pool, user_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("No user exists with id {user_id}")))
}

/// Public profile of `user_id`, with `is_subscribed` relative to `viewer`.
pub async fn get_user_profile(
    viewer: Option<&SessionData>,
    user_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<UserProfile, Error> {
    let row: Option<UserProfile> = sqlx::query_as(
        "
        SELECT u.id, u.email, u.username, u.first_name, u.last_name,
            EXISTS (
                SELECT 1 FROM follows f WHERE f.user_id = $2 AND f.author_id = u.id
            ) AS is_subscribed
        FROM users u
        WHERE u.id = $1
    ",
    )
    .bind(user_id)
    .bind(viewer.map(|session| session.user_id))
    .fetch_optional(pool)
    .await?;

    row.ok_or_else(|| Error::NotFound(format!("No user exists with id {user_id}")))
}

pub async fn list_users(
    viewer: Option<&SessionData>,
    pool: &Pool<Postgres>,
) -> Result<Vec<UserProfile>, Error> {
    let rows: Vec<UserProfile> = sqlx::query_as(
        "
        SELECT u.id, u.email, u.username, u.first_name, u.last_name,
            EXISTS (
                SELECT 1 FROM follows f WHERE f.user_id = $1 AND f.author_id = u.id
            ) AS is_subscribed
        FROM users u
        ORDER BY u.id
    ",
    )
    .bind(viewer.map(|session| session.user_id))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Creates a user; the password is stored as an argon2 hash.
pub async fn register_user(form: &RegisterForm, pool: &Pool<Postgres>) -> Result<User, Error> {
    form.validate()?;
    let password = hash_password(&form.password)?;

    let user: User = sqlx::query_as(
        "
        INSERT INTO users (email, username, first_name, last_name, password)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *;
    ",
    )
    .bind(form.normalized_email())
    .bind(&form.username)
    .bind(&form.first_name)
    .bind(&form.last_name)
    .bind(password)
    .fetch_one(pool)
    .await
    .map_err(|e| match Error::from(e) {
        Error::Conflict(_) => Error::Conflict(String::from(
            "A user with that email or username already exists",
        )),
        e => e,
    })?;

    log::info!("Registered user {} ({})", user.username, user.id);
    Ok(user)
}

/// Returns a signed session token for valid credentials.
pub async fn login_user(
    email: &str,
    password: &str,
    key: &SessionKey,
    lifetime: Duration,
    pool: &Pool<Postgres>,
) -> Result<String, Error> {
    let invalid = || Error::Unauthorized(String::from("Invalid credentials"));

    let user = get_user_by_email(pool, email).await?.ok_or_else(invalid)?;
    if !verify_password(password, &user.password)? {
        log::warn!("Rejected login for user {}", user.id);
        return Err(invalid());
    }

    generate_jwt_session(key, &user, lifetime)
}

pub async fn set_password(
    session: &SessionData,
    form: &PasswordForm,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    if form.new_password.trim().is_empty() {
        return Err(Error::Validation(String::from("Field new_password is required")));
    }

    let user = require_user(pool, session.user_id).await?;
    if !verify_password(&form.current_password, &user.password)? {
        return Err(Error::Validation(String::from("Current password is incorrect")));
    }

    sqlx::query("UPDATE users SET password = $1 WHERE id = $2")
        .bind(hash_password(&form.new_password)?)
        .bind(user.id)
        .execute(pool)
        .await?;

    log::info!("Password changed for user {}", user.id);
    Ok(())
}

/// Deletes the caller's account. Recipes and every join row cascade.
pub async fn delete_user(session: &SessionData, pool: &Pool<Postgres>) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(session.user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!(
            "No user exists with id {}",
            session.user_id
        )));
    }

    log::info!("Deleted user {}", session.user_id);
    Ok(())
}
