use chrono::Local;
use sqlx::{Pool, Postgres};

use crate::{
    authentication::permissions::ActionType,
    error::Error,
    jwt::SessionData,
    mutation::{ensure_absent, ensure_deleted},
    schema::{CartPart, RecipeShort, Uuid},
    shopping_list::{aggregate, ShoppingList, ShoppingListFile, ShoppingListItem},
};

use super::{recipes::require_recipe, users::require_user};

pub async fn is_in_cart(
    recipe_id: Uuid,
    user_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<bool, Error> {
    let result: Option<(i32,)> =
        sqlx::query_as("SELECT id FROM shopping_cart WHERE user_id = $1 AND recipe_id = $2")
            .bind(user_id)
            .bind(recipe_id)
            .fetch_optional(pool)
            .await?;

    Ok(result.is_some())
}

pub async fn add_to_cart(
    session: &SessionData,
    recipe_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<RecipeShort, Error> {
    session.authenticate(ActionType::ManageOwnLists)?;
    let recipe = require_recipe(recipe_id, pool).await?;

    let conflict = "Recipe is already in the shopping cart";
    ensure_absent(is_in_cart(recipe.id, session.user_id, pool).await?, conflict)?;

    sqlx::query("INSERT INTO shopping_cart (user_id, recipe_id) VALUES ($1, $2)")
        .bind(session.user_id)
        .bind(recipe.id)
        .execute(pool)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => Error::Conflict(conflict.to_owned()),
            e => e,
        })?;

    log::info!("Recipe {} added to cart of user {}", recipe.id, session.user_id);
    Ok(recipe.into())
}

pub async fn remove_from_cart(
    session: &SessionData,
    recipe_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    session.authenticate(ActionType::ManageOwnLists)?;
    let recipe = require_recipe(recipe_id, pool).await?;

    let result = sqlx::query("DELETE FROM shopping_cart WHERE user_id = $1 AND recipe_id = $2")
        .bind(session.user_id)
        .bind(recipe.id)
        .execute(pool)
        .await?;

    ensure_deleted(result.rows_affected(), "Recipe is not in the shopping cart")?;

    log::info!("Recipe {} removed from cart of user {}", recipe.id, session.user_id);
    Ok(())
}

pub async fn list_cart(session: &SessionData, pool: &Pool<Postgres>) -> Result<Vec<RecipeShort>, Error> {
    let rows: Vec<RecipeShort> = sqlx::query_as(
        "
        SELECT r.id, r.name, r.image, r.cooking_time
        FROM shopping_cart sc
        INNER JOIN recipes r ON r.id = sc.recipe_id
        WHERE sc.user_id = $1
        ORDER BY sc.id
    ",
    )
    .bind(session.user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Every ingredient line of every recipe in the user's cart.
pub async fn list_cart_parts(user_id: Uuid, pool: &Pool<Postgres>) -> Result<Vec<CartPart>, Error> {
    let rows: Vec<CartPart> = sqlx::query_as(
        "
        SELECT i.name AS name, i.measurement_unit AS measurement_unit, ri.amount AS amount
        FROM shopping_cart sc
        INNER JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE sc.user_id = $1
        ORDER BY ri.id
    ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Totals per (ingredient name, unit) across the cart, smallest first.
///
/// An empty cart is reported as `EmptyResult` rather than an empty list.
pub async fn aggregate_shopping_list(
    user_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Vec<ShoppingListItem>, Error> {
    require_user(pool, user_id).await?;

    let parts = list_cart_parts(user_id, pool).await?;
    if parts.is_empty() {
        return Err(Error::EmptyResult);
    }

    let items = aggregate(parts);
    log::debug!("Aggregated {} shopping list items for user {user_id}", items.len());
    Ok(items)
}

/// Aggregates the caller's cart and renders it as `shopping_list.txt`.
pub async fn download_shopping_list(
    session: &SessionData,
    brand: &str,
    pool: &Pool<Postgres>,
) -> Result<ShoppingListFile, Error> {
    let items = aggregate_shopping_list(session.user_id, pool).await?;
    let today = Local::now().date_naive();

    Ok(ShoppingList::new(items).into_file(brand, today))
}
