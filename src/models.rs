pub mod auth;
pub mod clients;
pub mod lots;
pub mod products;
pub mod profile;
pub mod recipes;
