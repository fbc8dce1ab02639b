// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Profile ---
        handlers::profile::get_profile,
        handlers::profile::update_profile,

        // --- Clients ---
        handlers::clients::list_clients,
        handlers::clients::create_client,
        handlers::clients::get_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,
        handlers::clients::list_client_lots,

        // --- Lots ---
        handlers::lots::list_lots,
        handlers::lots::create_lot,
        handlers::lots::get_lot,
        handlers::lots::update_lot,
        handlers::lots::delete_lot,

        // --- Products ---
        handlers::products::list_products,
        handlers::products::create_product,
        handlers::products::get_product,
        handlers::products::update_product,
        handlers::products::archive_product,

        // --- Recipes ---
        handlers::recipes::emit_recipe,
        handlers::recipes::preview_recipe,
        handlers::recipes::list_recipes,
        handlers::recipes::get_recipe,
        handlers::recipes::update_recipe_status,
        handlers::recipes::delete_recipe,

        // --- Documents ---
        handlers::documents::recipe_html,
        handlers::documents::recipe_pdf,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Profile ---
            models::profile::Profile,
            models::profile::ProfileResponse,
            models::profile::UpdateProfileRequest,

            // --- Clients / Lots / Products ---
            models::clients::Client,
            models::clients::ClientPayload,
            models::lots::Lot,
            models::lots::LotPayload,
            models::lots::CreateLotPayload,
            models::products::Product,
            models::products::ProductPayload,

            // --- Recipes ---
            models::recipes::RecipeStatus,
            models::recipes::ApplicationType,
            models::recipes::Recipe,
            models::recipes::RecipeLotDetail,
            models::recipes::RecipeProductDetail,
            models::recipes::RecipeSummary,
            models::recipes::RecipeDetail,
            models::recipes::RecipeProductInput,
            models::recipes::EmitRecipePayload,
            models::recipes::UpdateRecipeStatusPayload,
            services::recipe_builder::DraftLot,
            services::recipe_builder::RecipeLine,
            services::recipe_builder::RecipePreview,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados da conta"),
        (name = "Profile", description = "Dados profissionais do assessor (assinatura das receitas)"),
        (name = "Clients", description = "Produtores atendidos"),
        (name = "Lots", description = "Lotes (parcelas) dos clientes"),
        (name = "Products", description = "Catálogo de agroquímicos"),
        (name = "Recipes", description = "Montagem e emissão de receitas fitossanitárias"),
        (name = "Documents", description = "Receita em HTML e PDF")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
