use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use warp::{
    http::header::{HeaderValue, CONTENT_DISPOSITION, CONTENT_TYPE},
    reply::{Reply, Response},
};

use crate::{
    constants::{
        SHOPPING_LIST_CONTENT_TYPE, SHOPPING_LIST_DATE_FORMAT, SHOPPING_LIST_DISPOSITION,
    },
    schema::CartPart,
};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// Sums cart parts per (name, unit), smallest total first.
///
/// Equal totals are ordered by name, then unit.
pub fn aggregate(parts: Vec<CartPart>) -> Vec<ShoppingListItem> {
    let mut totals: HashMap<(String, String), i64> = HashMap::new();
    parts.into_iter().for_each(|part| {
        *totals
            .entry((part.name, part.measurement_unit))
            .or_insert(0) += i64::from(part.amount);
    });

    let mut items: Vec<ShoppingListItem> = totals
        .into_iter()
        .map(|((name, measurement_unit), amount)| ShoppingListItem {
            name,
            measurement_unit,
            amount,
        })
        .collect();

    items.sort_by(|a, b| {
        a.amount
            .cmp(&b.amount)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.measurement_unit.cmp(&b.measurement_unit))
    });
    items
}

#[derive(Debug, Clone)]
pub struct ShoppingList {
    pub items: Vec<ShoppingListItem>,
}

impl ShoppingList {
    pub fn new(items: Vec<ShoppingListItem>) -> Self {
        Self { items }
    }

    pub fn render(&self, brand: &str, date: NaiveDate) -> String {
        let mut lines = vec![format!(
            "Shopping list for: {}\n\n",
            date.format(SHOPPING_LIST_DATE_FORMAT)
        )];

        for item in self.items.iter() {
            lines.push(format!(
                "{} - {} {}\n",
                item.name, item.amount, item.measurement_unit
            ));
        }

        lines.push(format!("\n\n{brand} ({})", date.year()));
        lines.concat()
    }

    pub fn into_file(self, brand: &str, date: NaiveDate) -> ShoppingListFile {
        ShoppingListFile {
            body: self.render(brand, date),
        }
    }
}

/// Rendered shopping list served as a `shopping_list.txt` attachment.
#[derive(Debug, Clone)]
pub struct ShoppingListFile {
    pub body: String,
}

impl Reply for ShoppingListFile {
    fn into_response(self) -> Response {
        let mut response = Response::new(self.body.into());
        let headers = response.headers_mut();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static(SHOPPING_LIST_CONTENT_TYPE),
        );
        headers.insert(
            CONTENT_DISPOSITION,
            HeaderValue::from_static(SHOPPING_LIST_DISPOSITION),
        );
        response
    }
}
