use serde::Deserialize;
use sqlx::{Pool, Postgres};

use crate::{
    error::Error,
    schema::{Ingredient, Uuid},
};

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IngredientSeed {
    pub name: String,
    pub measurement_unit: String,
}

/// Parses seed data: a JSON array of `{name, measurement_unit}` objects.
pub fn parse_ingredient_seed(data: &str) -> Result<Vec<IngredientSeed>, Error> {
    serde_json::from_str(data).map_err(|e| Error::Validation(format!("Invalid seed data: {e}")))
}

/// Loads reference ingredients. Already seeded rows are skipped, so
/// running it twice is harmless. Returns the number of rows inserted.
pub async fn seed_ingredients(data: &str, pool: &Pool<Postgres>) -> Result<u64, Error> {
    let seeds = parse_ingredient_seed(data)?;

    let mut tr = pool.begin().await?;
    let mut inserted = 0;
    for seed in seeds.iter() {
        let result = sqlx::query(
            "
            INSERT INTO ingredients (name, measurement_unit)
            VALUES ($1, $2)
            ON CONFLICT (name, measurement_unit) DO NOTHING
        ",
        )
        .bind(&seed.name)
        .bind(&seed.measurement_unit)
        .execute(&mut *tr)
        .await?;

        inserted += result.rows_affected();
    }
    tr.commit().await?;

    log::info!("Seeded {inserted} of {} ingredients", seeds.len());
    Ok(inserted)
}

pub async fn list_ingredients(pool: &Pool<Postgres>) -> Result<Vec<Ingredient>, Error> {
    let rows: Vec<Ingredient> = sqlx::query_as("SELECT * FROM ingredients ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

pub async fn get_ingredient(id: Uuid, pool: &Pool<Postgres>) -> Result<Option<Ingredient>, Error> {
    let row: Option<Ingredient> = sqlx::query_as("SELECT * FROM ingredients WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}
