#![allow(dead_code)]

use foodgram_sdk::{
    actions::{create_recipe, create_tag, register_user, seed_ingredients},
    form::{RecipeForm, RecipePartForm, RegisterForm},
    jwt::SessionData,
    schema::{Ingredient, RecipeDetails, Tag, TagColor, UserRole},
};
use sqlx::PgPool;

pub const SEED: &str = r#"[
    {"name": "flour", "measurement_unit": "g"},
    {"name": "eggs", "measurement_unit": "pcs"},
    {"name": "milk", "measurement_unit": "cup"}
]"#;

pub async fn user(pool: &PgPool, username: &str) -> SessionData {
    let form = RegisterForm {
        email: format!("{username}@example.com"),
        username: username.to_owned(),
        first_name: String::from("Test"),
        last_name: String::from("Cook"),
        password: String::from("pa55word!"),
    };
    let user = register_user(&form, pool).await.unwrap();
    SessionData::from(&user)
}

pub async fn admin(pool: &PgPool, username: &str) -> SessionData {
    let mut session = user(pool, username).await;
    sqlx::query("UPDATE users SET role = 'admin' WHERE id = $1")
        .bind(session.user_id)
        .execute(pool)
        .await
        .unwrap();
    session.role = UserRole::Admin;
    session
}

pub async fn ingredient(pool: &PgPool, name: &str) -> Ingredient {
    sqlx::query_as("SELECT * FROM ingredients WHERE name = $1")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Seeds ingredients and one tag, returning the tag.
pub async fn reference_data(pool: &PgPool) -> Tag {
    seed_ingredients(SEED, pool).await.unwrap();
    let admin = admin(pool, "admin").await;
    create_tag(&admin, "Breakfast", TagColor::Green, "breakfast", pool)
        .await
        .unwrap()
}

pub async fn recipe(
    pool: &PgPool,
    author: &SessionData,
    name: &str,
    tag: &Tag,
    parts: &[(&str, i32)],
) -> RecipeDetails {
    let mut ingredients = vec![];
    for (ingredient_name, amount) in parts {
        ingredients.push(RecipePartForm {
            ingredient_id: ingredient(pool, ingredient_name).await.id,
            amount: *amount,
        });
    }

    let form = RecipeForm {
        name: name.to_owned(),
        text: String::from("Combine everything."),
        image: format!("media/{name}.png"),
        cooking_time: 15,
        tags: vec![tag.id],
        ingredients,
    };
    create_recipe(author, &form, pool).await.unwrap()
}
