pub mod auth;
pub mod client_service;
pub mod document_service;
pub mod lot_service;
pub mod product_service;
pub mod recipe_builder;
pub mod recipe_service;
