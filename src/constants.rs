pub const DEFAULT_BRAND_NAME: &str = "Foodgram";
pub const DEFAULT_SESSION_LIFETIME_HOURS: i64 = 24;
pub const MAX_SESSION_LIFETIME_HOURS: i64 = 24 * 365;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

pub const SESSION_COOKIE: &str = "session";

pub const SHOPPING_LIST_FILENAME: &str = "shopping_list.txt";
pub const SHOPPING_LIST_DISPOSITION: &str = "attachment; filename=shopping_list.txt";
pub const SHOPPING_LIST_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
pub const SHOPPING_LIST_DATE_FORMAT: &str = "%d-%m-%Y";

pub const MIN_COOKING_TIME: i32 = 1;
pub const MIN_AMOUNT: i32 = 1;

/// Latest recipes shown per author in the subscription list.
pub const SUBSCRIPTION_RECIPES_LIMIT: i64 = 3;
