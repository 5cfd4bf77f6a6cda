mod database {
    pub mod actions;
    pub mod error;
    pub mod form;
    pub mod mutation;
    pub mod schema;
}
mod authentication {
    pub mod cryptography;
    pub mod jwt;
    pub mod middleware;
    pub mod permissions;
}
mod config;
mod constants;
mod shopping_list;

pub use authentication::*;
pub use config::*;
pub use constants::*;
pub use database::*;
pub use shopping_list::*;
