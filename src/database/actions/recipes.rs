use crate::{
    authentication::permissions::ActionType,
    error::Error,
    form::RecipeForm,
    jwt::SessionData,
    schema::{Recipe, RecipeDetails, RecipePart, Uuid},
};

use sqlx::{Pool, Postgres, QueryBuilder, Transaction};

use super::{tags::list_recipe_tags, users::get_user_profile};

pub async fn get_recipe(id: Uuid, pool: &Pool<Postgres>) -> Result<Option<Recipe>, Error> {
    let row: Option<Recipe> = sqlx::query_as("SELECT * FROM recipes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Fails with `NotFound` when no recipe has the given id.
pub async fn require_recipe(id: Uuid, pool: &Pool<Postgres>) -> Result<Recipe, Error> {
    get_recipe(id, pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("No recipe exists with id {id}")))
}

/// Loads a recipe the session may modify: its own, or any for admins.
pub async fn get_recipe_mut(
    id: Uuid,
    session: &SessionData,
    pool: &Pool<Postgres>,
) -> Result<Recipe, Error> {
    session.authenticate(ActionType::ManageOwnRecipes)?;
    let recipe = require_recipe(id, pool).await?;

    match session.authenticate(ActionType::ManageAllRecipes) {
        Ok(_) => Ok(recipe),
        Err(_) => {
            if recipe.author_id != session.user_id {
                Err(Error::Unauthorized(String::from(
                    "Only the author can modify this recipe",
                )))
            } else {
                Ok(recipe)
            }
        }
    }
}

pub async fn list_recipe_ingredients(
    recipe_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Vec<RecipePart>, Error> {
    let rows: Vec<RecipePart> = sqlx::query_as(
        "
        SELECT ri.recipe_id AS recipe_id, i.id AS ingredient_id, i.name AS name,
            i.measurement_unit AS measurement_unit, ri.amount AS amount
        FROM recipe_ingredients ri
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = $1
        ORDER BY ri.id
    ",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Full read model of a recipe as seen by `viewer`.
pub async fn get_recipe_details(
    viewer: Option<&SessionData>,
    id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<RecipeDetails, Error> {
    let recipe = require_recipe(id, pool).await?;
    let author = get_user_profile(viewer, recipe.author_id, pool).await?;
    let tags = list_recipe_tags(recipe.id, pool).await?;
    let ingredients = list_recipe_ingredients(recipe.id, pool).await?;

    let (is_favorited, is_in_shopping_cart): (bool, bool) = sqlx::query_as(
        "
        SELECT
            EXISTS (SELECT 1 FROM favorites WHERE user_id = $1 AND recipe_id = $2),
            EXISTS (SELECT 1 FROM shopping_cart WHERE user_id = $1 AND recipe_id = $2)
    ",
    )
    .bind(viewer.map(|session| session.user_id))
    .bind(recipe.id)
    .fetch_one(pool)
    .await?;

    Ok(RecipeDetails {
        id: recipe.id,
        author,
        name: recipe.name,
        image: recipe.image,
        text: recipe.text,
        cooking_time: recipe.cooking_time,
        created_at: recipe.created_at,
        tags,
        ingredients,
        is_favorited,
        is_in_shopping_cart,
    })
}

/// Every recipe as seen by `viewer`, newest first.
pub async fn list_recipes(
    viewer: Option<&SessionData>,
    pool: &Pool<Postgres>,
) -> Result<Vec<RecipeDetails>, Error> {
    let ids: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM recipes ORDER BY id DESC")
        .fetch_all(pool)
        .await?;

    let mut recipes = Vec::with_capacity(ids.len());
    for (id,) in ids {
        recipes.push(get_recipe_details(viewer, id, pool).await?);
    }

    Ok(recipes)
}

pub async fn create_recipe(
    session: &SessionData,
    form: &RecipeForm,
    pool: &Pool<Postgres>,
) -> Result<RecipeDetails, Error> {
    session.authenticate(ActionType::CreateRecipes)?;
    form.validate()?;

    let mut tr = pool.begin().await?;

    let id: (Uuid,) = sqlx::query_as(
        "
        INSERT INTO recipes (author_id, name, image, text, cooking_time)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
    ",
    )
    .bind(session.user_id)
    .bind(&form.name)
    .bind(&form.image)
    .bind(&form.text)
    .bind(form.cooking_time)
    .fetch_one(&mut *tr)
    .await
    .map_err(|e| duplicate_name(e, &form.name))?;

    insert_recipe_contents(&mut tr, id.0, form).await?;
    tr.commit().await?;

    log::info!("User {} created recipe {}", session.user_id, id.0);
    get_recipe_details(Some(session), id.0, pool).await
}

/// Rewrites name, text, image, cooking time, tags and ingredient lines.
/// `created_at` is never touched.
pub async fn update_recipe(
    session: &SessionData,
    id: Uuid,
    form: &RecipeForm,
    pool: &Pool<Postgres>,
) -> Result<RecipeDetails, Error> {
    let recipe = get_recipe_mut(id, session, pool).await?;
    form.validate()?;

    let mut tr = pool.begin().await?;

    sqlx::query(
        "UPDATE recipes SET name = $1, image = $2, text = $3, cooking_time = $4 WHERE id = $5",
    )
    .bind(&form.name)
    .bind(&form.image)
    .bind(&form.text)
    .bind(form.cooking_time)
    .bind(recipe.id)
    .execute(&mut *tr)
    .await
    .map_err(|e| duplicate_name(e, &form.name))?;

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(recipe.id)
        .execute(&mut *tr)
        .await?;

    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(recipe.id)
        .execute(&mut *tr)
        .await?;

    insert_recipe_contents(&mut tr, recipe.id, form).await?;
    tr.commit().await?;

    log::info!("User {} updated recipe {}", session.user_id, recipe.id);
    get_recipe_details(Some(session), recipe.id, pool).await
}

/// Deletes a recipe; cart, favorite, tag and ingredient rows cascade.
pub async fn delete_recipe(
    session: &SessionData,
    id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    let recipe = get_recipe_mut(id, session, pool).await?;

    sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(recipe.id)
        .execute(pool)
        .await?;

    log::info!("User {} deleted recipe {}", session.user_id, recipe.id);
    Ok(())
}

async fn insert_recipe_contents(
    tr: &mut Transaction<'_, Postgres>,
    recipe_id: Uuid,
    form: &RecipeForm,
) -> Result<(), Error> {
    let mut parts = QueryBuilder::<Postgres>::new(
        "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) ",
    );
    parts.push_values(form.ingredients.iter(), |mut row, part| {
        row.push_bind(recipe_id)
            .push_bind(part.ingredient_id)
            .push_bind(part.amount);
    });
    parts.build().execute(&mut **tr).await?;

    let mut tags = QueryBuilder::<Postgres>::new("INSERT INTO recipe_tags (recipe_id, tag_id) ");
    tags.push_values(form.tags.iter(), |mut row, tag_id| {
        row.push_bind(recipe_id).push_bind(*tag_id);
    });
    tags.build().execute(&mut **tr).await?;

    Ok(())
}

fn duplicate_name(e: sqlx::Error, name: &str) -> Error {
    match Error::from(e) {
        Error::Conflict(_) => Error::Conflict(format!("You already have a recipe named {name}")),
        e => e,
    }
}
