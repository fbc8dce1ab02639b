pub mod user_repo;
pub use user_repo::UserRepository;
pub mod profile_repo;
pub use profile_repo::ProfileRepository;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod lot_repo;
pub use lot_repo::LotRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod recipe_repo;
pub use recipe_repo::RecipeRepository;

#[cfg(test)]
pub(crate) mod fixtures;
