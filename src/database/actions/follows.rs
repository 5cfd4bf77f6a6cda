use sqlx::{Pool, Postgres};

use crate::{
    authentication::permissions::ActionType,
    constants::SUBSCRIPTION_RECIPES_LIMIT,
    error::Error,
    jwt::SessionData,
    mutation::{ensure_absent, ensure_deleted, ensure_distinct},
    schema::{RecipeShort, Subscription, User, Uuid},
};

use super::users::require_user;

pub async fn is_following(
    author_id: Uuid,
    user_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<bool, Error> {
    let result: Option<(i32,)> =
        sqlx::query_as("SELECT id FROM follows WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .fetch_optional(pool)
            .await?;

    Ok(result.is_some())
}

async fn subscription_for(
    author: User,
    recipes_limit: i64,
    pool: &Pool<Postgres>,
) -> Result<Subscription, Error> {
    let recipes: Vec<RecipeShort> = sqlx::query_as(
        "
        SELECT id, name, image, cooking_time
        FROM recipes
        WHERE author_id = $1
        ORDER BY id DESC
        LIMIT $2
    ",
    )
    .bind(author.id)
    .bind(recipes_limit)
    .fetch_all(pool)
    .await?;

    let recipes_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
        .bind(author.id)
        .fetch_one(pool)
        .await?;

    Ok(Subscription {
        id: author.id,
        email: author.email,
        username: author.username,
        first_name: author.first_name,
        last_name: author.last_name,
        is_subscribed: true,
        recipes,
        recipes_count: recipes_count.0,
    })
}

/// Subscribes the caller to `author_id`. Self-follows fail with
/// `Validation` before anything else is looked at.
pub async fn follow(
    session: &SessionData,
    author_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Subscription, Error> {
    ensure_distinct(session.user_id, author_id)?;
    session.authenticate(ActionType::ManageOwnLists)?;
    let author = require_user(pool, author_id).await?;

    let conflict = "You are already subscribed to this author";
    ensure_absent(is_following(author.id, session.user_id, pool).await?, conflict)?;

    sqlx::query("INSERT INTO follows (user_id, author_id) VALUES ($1, $2)")
        .bind(session.user_id)
        .bind(author.id)
        .execute(pool)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => Error::Conflict(conflict.to_owned()),
            e => e,
        })?;

    log::info!("User {} followed user {}", session.user_id, author.id);
    subscription_for(author, SUBSCRIPTION_RECIPES_LIMIT, pool).await
}

pub async fn unfollow(
    session: &SessionData,
    author_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    session.authenticate(ActionType::ManageOwnLists)?;
    let author = require_user(pool, author_id).await?;

    let result = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND author_id = $2")
        .bind(session.user_id)
        .bind(author.id)
        .execute(pool)
        .await?;

    ensure_deleted(result.rows_affected(), "You are not subscribed to this author")?;

    log::info!("User {} unfollowed user {}", session.user_id, author.id);
    Ok(())
}

/// Authors the caller follows, each with up to `recipes_limit` latest recipes.
pub async fn list_subscriptions(
    session: &SessionData,
    recipes_limit: Option<i64>,
    pool: &Pool<Postgres>,
) -> Result<Vec<Subscription>, Error> {
    let authors: Vec<User> = sqlx::query_as(
        "
        SELECT u.*
        FROM follows f
        INNER JOIN users u ON u.id = f.author_id
        WHERE f.user_id = $1
        ORDER BY f.id
    ",
    )
    .bind(session.user_id)
    .fetch_all(pool)
    .await?;

    let limit = recipes_limit
        .filter(|limit| *limit >= 0)
        .unwrap_or(SUBSCRIPTION_RECIPES_LIMIT);

    let mut subscriptions = Vec::with_capacity(authors.len());
    for author in authors.into_iter() {
        subscriptions.push(subscription_for(author, limit, pool).await?);
    }

    Ok(subscriptions)
}
