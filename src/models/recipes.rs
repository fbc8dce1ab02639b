// src/models/recipes.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::clients::Client;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "recipe_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipeStatus {
    Open,
    Closed,
    Cancelled,
}

impl RecipeStatus {
    // Rótulo impresso no documento
    pub fn label(&self) -> &'static str {
        match self {
            RecipeStatus::Open => "Abierta",
            RecipeStatus::Closed => "Cerrada",
            RecipeStatus::Cancelled => "Anulada",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "application_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationType {
    #[default]
    Ground,
    Aerial,
}

impl ApplicationType {
    pub fn label(&self) -> &'static str {
        match self {
            ApplicationType::Ground => "Terrestre",
            ApplicationType::Aerial => "Aérea",
        }
    }
}

// --- Linhas do banco ---

// Cabeçalho da receita
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Uuid,
    #[schema(ignore)]
    pub user_id: Uuid,
    #[schema(example = 152)]
    pub recipe_number: i64,
    pub client_id: Uuid,
    #[schema(example = "Ing. Agr. Juan Pérez")]
    pub technical_advisor: String,
    pub emitted_at: DateTime<Utc>,
    #[schema(example = "Barbecho químico, malezas resistentes")]
    pub diagnosis: Option<String>,
    pub status: RecipeStatus,
    pub application_type: ApplicationType,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// recipe_lots + dados do lote
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeLotDetail {
    pub id: Uuid,
    pub lot_id: Uuid,
    #[schema(value_type = f64, example = 45.5)]
    pub applied_area_ha: Decimal,
    #[schema(example = "Lote 4 - Norte")]
    pub lot_name: String,
    #[schema(value_type = f64, example = 45.5)]
    pub lot_area_ha: Decimal,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// recipe_products + dados do produto
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeProductDetail {
    pub id: Uuid,
    pub product_id: Uuid,
    #[schema(example = 1)]
    pub mix_order: i32,
    #[schema(value_type = f64, example = 2.5)]
    pub dose_per_ha: Decimal,
    #[schema(example = "lts/ha")]
    pub dose_unit: String,
    #[schema(value_type = f64, example = 113.75)]
    pub total_dose: Decimal,
    #[schema(example = "lts")]
    pub total_unit: String,
    #[schema(example = "Glifosato Premium")]
    pub product_name: String,
    pub composition: Option<String>,
    pub brand: Option<String>,
}

// Linha da listagem
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
    pub id: Uuid,
    pub recipe_number: i64,
    pub emitted_at: DateTime<Utc>,
    pub status: RecipeStatus,
    pub client_id: Uuid,
    pub client_name: String,
    pub client_company: String,
    #[schema(value_type = f64)]
    pub total_area_ha: Decimal,
}

// Receita completa: cabeçalho, cliente, lotes e produtos
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub header: Recipe,
    pub client: Client,
    pub lots: Vec<RecipeLotDetail>,
    pub products: Vec<RecipeProductDetail>,
    #[schema(value_type = f64, example = 45.5)]
    pub total_area_ha: Decimal,
}

impl RecipeDetail {
    pub fn new(
        header: Recipe,
        client: Client,
        lots: Vec<RecipeLotDetail>,
        products: Vec<RecipeProductDetail>,
    ) -> Self {
        let total_area_ha = lots.iter().map(|l| l.applied_area_ha).sum();
        Self {
            header,
            client,
            lots,
            products,
            total_area_ha,
        }
    }
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeProductInput {
    pub product_id: Uuid,
    // Ausente ou <= 0 é rejeitado pelo montador da receita
    #[schema(value_type = Option<f64>, example = 2.5)]
    pub dose_per_ha: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmitRecipePayload {
    // Opcional aqui para que a ausência caia na regra "falta cliente"
    pub client_id: Option<Uuid>,

    #[serde(default)]
    pub lot_ids: Vec<Uuid>,

    #[serde(default)]
    pub products: Vec<RecipeProductInput>,

    #[validate(length(max = 2000, message = "too_long"))]
    #[schema(example = "Barbecho, malezas")]
    pub diagnosis: Option<String>,

    pub application_type: Option<ApplicationType>,

    #[validate(length(max = 4000, message = "too_long"))]
    pub comments: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipeStatusPayload {
    pub status: RecipeStatus,
}
