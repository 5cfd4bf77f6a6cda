mod common;

use chrono::Duration;
use foodgram_sdk::{
    actions::{
        add_to_cart, delete_user, follow, get_recipe, get_recipe_details, get_user_profile,
        list_recipes, list_subscriptions, list_users, login_user, register_user, unfollow,
        update_recipe,
    },
    error::Error,
    form::{RecipeForm, RecipePartForm, RegisterForm},
    jwt::{verify_jwt_session, SessionKey},
};
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn self_follow_is_always_a_validation_error(pool: PgPool) {
    let cook = common::user(&pool, "cook").await;

    assert!(matches!(
        follow(&cook, cook.user_id, &pool).await,
        Err(Error::Validation(_))
    ));

    // The standing constraint holds even for writes that bypass the actions.
    let direct = sqlx::query("INSERT INTO follows (user_id, author_id) VALUES ($1, $1)")
        .bind(cook.user_id)
        .execute(&pool)
        .await
        .map_err(Error::from);
    assert!(matches!(direct, Err(Error::Validation(_))));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn follow_conflicts_and_unfollow_not_found(pool: PgPool) {
    let tag = common::reference_data(&pool).await;
    let fan = common::user(&pool, "fan").await;
    let chef = common::user(&pool, "chef").await;
    common::recipe(&pool, &chef, "Omelette", &tag, &[("eggs", 3)]).await;

    let subscription = follow(&fan, chef.user_id, &pool).await.unwrap();
    assert_eq!(subscription.recipes_count, 1);
    assert!(matches!(
        follow(&fan, chef.user_id, &pool).await,
        Err(Error::Conflict(_))
    ));

    let profile = get_user_profile(Some(&fan), chef.user_id, &pool).await.unwrap();
    assert!(profile.is_subscribed);
    assert_eq!(list_subscriptions(&fan, None, &pool).await.unwrap().len(), 1);

    unfollow(&fan, chef.user_id, &pool).await.unwrap();
    assert!(matches!(
        unfollow(&fan, chef.user_id, &pool).await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        follow(&fan, chef.user_id + 1000, &pool).await,
        Err(Error::NotFound(_))
    ));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn duplicate_registration_conflicts(pool: PgPool) {
    common::user(&pool, "cook").await;

    let form = RegisterForm {
        email: String::from("cook@example.com"),
        username: String::from("another"),
        first_name: String::from("Test"),
        last_name: String::from("Cook"),
        password: String::from("pa55word!"),
    };
    assert!(matches!(
        register_user(&form, &pool).await,
        Err(Error::Conflict(_))
    ));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn email_identity_ignores_case(pool: PgPool) {
    let form = |email: &str, username: &str| RegisterForm {
        email: email.to_owned(),
        username: username.to_owned(),
        first_name: String::from("Test"),
        last_name: String::from("Cook"),
        password: String::from("pa55word!"),
    };

    let user = register_user(&form("Cook@Example.com", "cook"), &pool)
        .await
        .unwrap();
    assert_eq!(user.email, "cook@example.com");

    assert!(matches!(
        register_user(&form("cook@example.com", "twin"), &pool).await,
        Err(Error::Conflict(_))
    ));

    // A row written around the actions still collides on LOWER(email).
    let direct = sqlx::query(
        "INSERT INTO users (email, username, first_name, last_name, password)
         VALUES ('COOK@example.com', 'raw', 'Raw', 'Row', 'x')",
    )
    .execute(&pool)
    .await
    .map_err(Error::from);
    assert!(matches!(direct, Err(Error::Conflict(_))));

    let key = SessionKey::new(b"integration").unwrap();
    let token = login_user("COOK@example.com", "pa55word!", &key, Duration::hours(1), &pool)
        .await
        .unwrap();
    assert_eq!(verify_jwt_session(&key, &token).unwrap().user_id, user.id);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn listings_reflect_the_viewer(pool: PgPool) {
    let tag = common::reference_data(&pool).await;
    let chef = common::user(&pool, "chef").await;
    let fan = common::user(&pool, "fan").await;
    let first = common::recipe(&pool, &chef, "Omelette", &tag, &[("eggs", 3)]).await;
    let second = common::recipe(&pool, &chef, "Pancakes", &tag, &[("flour", 200)]).await;

    add_to_cart(&fan, first.id, &pool).await.unwrap();
    follow(&fan, chef.user_id, &pool).await.unwrap();

    let recipes = list_recipes(Some(&fan), &pool).await.unwrap();
    let ids: Vec<_> = recipes.iter().map(|recipe| recipe.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert!(recipes[1].is_in_shopping_cart);
    assert!(!recipes[0].is_in_shopping_cart);
    assert!(recipes[0].author.is_subscribed);

    let anonymous = list_recipes(None, &pool).await.unwrap();
    assert!(anonymous.iter().all(|recipe| !recipe.is_in_shopping_cart));

    // admin from reference_data, then chef and fan
    let users = list_users(Some(&fan), &pool).await.unwrap();
    let names: Vec<_> = users.iter().map(|user| user.username.as_str()).collect();
    assert_eq!(names, vec!["admin", "chef", "fan"]);
    assert!(users[1].is_subscribed);
    assert!(!users[0].is_subscribed);
    assert!(list_users(None, &pool)
        .await
        .unwrap()
        .iter()
        .all(|user| !user.is_subscribed));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn login_issues_a_verifiable_session(pool: PgPool) {
    let cook = common::user(&pool, "cook").await;
    let key = SessionKey::new(b"integration").unwrap();

    let token = login_user("cook@example.com", "pa55word!", &key, Duration::hours(1), &pool)
        .await
        .unwrap();
    assert_eq!(verify_jwt_session(&key, &token).unwrap(), cook);

    assert!(matches!(
        login_user("cook@example.com", "wrong", &key, Duration::hours(1), &pool).await,
        Err(Error::Unauthorized(_))
    ));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn author_names_are_unique_and_edits_keep_created_at(pool: PgPool) {
    let tag = common::reference_data(&pool).await;
    let cook = common::user(&pool, "cook").await;
    let other = common::user(&pool, "other").await;
    let recipe = common::recipe(&pool, &cook, "Omelette", &tag, &[("eggs", 3)]).await;

    // Another author may reuse the name.
    common::recipe(&pool, &other, "Omelette", &tag, &[("eggs", 2)]).await;

    let eggs = common::ingredient(&pool, "eggs").await;
    let form = RecipeForm {
        name: String::from("Omelette"),
        text: String::from("Again."),
        image: String::from("media/omelette.png"),
        cooking_time: 5,
        tags: vec![tag.id],
        ingredients: vec![RecipePartForm {
            ingredient_id: eggs.id,
            amount: 4,
        }],
    };
    assert!(matches!(
        foodgram_sdk::actions::create_recipe(&cook, &form, &pool).await,
        Err(Error::Conflict(_))
    ));

    let updated = update_recipe(&cook, recipe.id, &form, &pool).await.unwrap();
    assert_eq!(updated.created_at, recipe.created_at);
    assert_eq!(updated.ingredients[0].amount, 4);

    assert!(matches!(
        update_recipe(&other, recipe.id, &form, &pool).await,
        Err(Error::Unauthorized(_))
    ));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn deleting_an_account_cascades(pool: PgPool) {
    let tag = common::reference_data(&pool).await;
    let chef = common::user(&pool, "chef").await;
    let fan = common::user(&pool, "fan").await;
    let recipe = common::recipe(&pool, &chef, "Omelette", &tag, &[("eggs", 3)]).await;

    add_to_cart(&fan, recipe.id, &pool).await.unwrap();
    follow(&fan, chef.user_id, &pool).await.unwrap();

    let details = get_recipe_details(Some(&fan), recipe.id, &pool).await.unwrap();
    assert!(details.is_in_shopping_cart);
    assert!(!details.is_favorited);

    delete_user(&chef, &pool).await.unwrap();

    assert!(get_recipe(recipe.id, &pool).await.unwrap().is_none());
    assert!(list_subscriptions(&fan, None, &pool).await.unwrap().is_empty());
}
