use std::collections::HashSet;

use serde::Deserialize;

use crate::{
    constants::{MIN_AMOUNT, MIN_COOKING_TIME},
    error::Error,
    schema::Uuid,
};

#[derive(Deserialize, Debug, Clone)]
pub struct RegisterForm {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), Error> {
        required("email", &self.email)?;
        required("username", &self.username)?;
        required("first_name", &self.first_name)?;
        required("last_name", &self.last_name)?;
        required("password", &self.password)?;

        if !self.email.contains('@') {
            return Err(Error::Validation(String::from("Invalid email address")));
        }

        Ok(())
    }

    /// Login identity key: trimmed and lowercased.
    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Deserialize, Debug, Clone)]
pub struct PasswordForm {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RecipePartForm {
    #[serde(rename = "id")]
    pub ingredient_id: Uuid,
    pub amount: i32,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RecipeForm {
    pub name: String,
    pub text: String,
    pub image: String,
    pub cooking_time: i32,
    pub tags: Vec<Uuid>,
    pub ingredients: Vec<RecipePartForm>,
}

impl RecipeForm {
    pub fn validate(&self) -> Result<(), Error> {
        required("name", &self.name)?;
        required("text", &self.text)?;
        required("image", &self.image)?;

        if self.cooking_time < MIN_COOKING_TIME {
            return Err(Error::Validation(format!(
                "Cooking time must be at least {MIN_COOKING_TIME} minute"
            )));
        }

        if self.ingredients.is_empty() {
            return Err(Error::Validation(String::from(
                "A recipe needs at least one ingredient",
            )));
        }

        let mut seen = HashSet::new();
        for part in self.ingredients.iter() {
            if part.amount < MIN_AMOUNT {
                return Err(Error::Validation(format!(
                    "Amount of ingredient {} must be at least {MIN_AMOUNT}",
                    part.ingredient_id
                )));
            }
            if !seen.insert(part.ingredient_id) {
                return Err(Error::Validation(format!(
                    "Ingredient {} is listed more than once",
                    part.ingredient_id
                )));
            }
        }

        if self.tags.is_empty() {
            return Err(Error::Validation(String::from(
                "A recipe needs at least one tag",
            )));
        }

        let mut seen = HashSet::new();
        if let Some(tag) = self.tags.iter().find(|tag| !seen.insert(**tag)) {
            return Err(Error::Validation(format!("Tag {tag} is listed more than once")));
        }

        Ok(())
    }
}

fn required(field: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("Field {field} is required")));
    }
    Ok(())
}
