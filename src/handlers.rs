pub mod auth;
pub mod clients;
pub mod documents;
pub mod lots;
pub mod products;
pub mod profile;
pub mod recipes;
