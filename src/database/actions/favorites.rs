use sqlx::{Pool, Postgres};

use crate::{
    authentication::permissions::ActionType,
    error::Error,
    jwt::SessionData,
    mutation::{ensure_absent, ensure_deleted},
    schema::{RecipeShort, Uuid},
};

use super::recipes::require_recipe;

pub async fn is_favorite(
    recipe_id: Uuid,
    user_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<bool, Error> {
    let result: Option<(i32,)> =
        sqlx::query_as("SELECT id FROM favorites WHERE user_id = $1 AND recipe_id = $2")
            .bind(user_id)
            .bind(recipe_id)
            .fetch_optional(pool)
            .await?;

    Ok(result.is_some())
}

pub async fn list_favorites(
    session: &SessionData,
    pool: &Pool<Postgres>,
) -> Result<Vec<RecipeShort>, Error> {
    let rows: Vec<RecipeShort> = sqlx::query_as(
        "
        SELECT r.id, r.name, r.image, r.cooking_time
        FROM favorites f
        INNER JOIN recipes r ON r.id = f.recipe_id
        WHERE f.user_id = $1
        ORDER BY f.id
    ",
    )
    .bind(session.user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn add_favorite(
    session: &SessionData,
    recipe_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<RecipeShort, Error> {
    session.authenticate(ActionType::ManageOwnLists)?;
    let recipe = require_recipe(recipe_id, pool).await?;

    let conflict = "Recipe is already in favorites";
    ensure_absent(is_favorite(recipe.id, session.user_id, pool).await?, conflict)?;

    sqlx::query("INSERT INTO favorites (user_id, recipe_id) VALUES ($1, $2)")
        .bind(session.user_id)
        .bind(recipe.id)
        .execute(pool)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => Error::Conflict(conflict.to_owned()),
            e => e,
        })?;

    log::info!("User {} favorited recipe {}", session.user_id, recipe.id);
    Ok(recipe.into())
}

pub async fn remove_favorite(
    session: &SessionData,
    recipe_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    session.authenticate(ActionType::ManageOwnLists)?;
    let recipe = require_recipe(recipe_id, pool).await?;

    let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND recipe_id = $2")
        .bind(session.user_id)
        .bind(recipe.id)
        .execute(pool)
        .await?;

    ensure_deleted(result.rows_affected(), "Recipe is not in favorites")?;

    log::info!("User {} unfavorited recipe {}", session.user_id, recipe.id);
    Ok(())
}
