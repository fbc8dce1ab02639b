// src/models/lots.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::{
    numeric::NumericColumn,
    text::{trim_to_option, validate_required_text},
};

// lots.area_ha
pub const AREA_COLUMN: NumericColumn = NumericColumn::new(12, 2);

// Lote com os dados do cliente dono (as listas mostram nome e empresa)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub id: Uuid,
    #[schema(ignore)]
    pub user_id: Uuid,
    pub client_id: Uuid,

    #[schema(example = "Lote 4 - Norte")]
    pub name: String,
    #[schema(value_type = f64, example = 45.5)]
    pub area_ha: Decimal,
    #[schema(example = -33.1234)]
    pub latitude: Option<f64>,
    #[schema(example = -61.5678)]
    pub longitude: Option<f64>,
    #[schema(example = "Soja")]
    pub crop: Option<String>,
    pub comments: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    // Vêm do JOIN com clients
    #[schema(example = "Juan Pérez")]
    pub client_name: String,
    #[schema(example = "Agro Pérez S.A.")]
    pub client_company: String,
}

fn validate_positive_area(area: &Decimal) -> Result<(), ValidationError> {
    if *area <= Decimal::ZERO || !AREA_COLUMN.fits(*area) {
        let mut err = ValidationError::new("range");
        err.message = Some("invalid_area".into());
        return Err(err);
    }
    Ok(())
}

// Campos editáveis. O cliente dono só é escolhido na criação.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LotPayload {
    #[validate(custom(function = "validate_required_text"), length(max = 200, message = "too_long"))]
    #[schema(example = "Lote 4 - Norte")]
    pub name: String,

    #[validate(required(message = "required"), custom(function = "validate_positive_area"))]
    #[schema(value_type = Option<f64>, example = 45.5)]
    pub area_ha: Option<Decimal>,

    #[validate(range(min = -90.0, max = 90.0, message = "invalid_latitude"))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0, message = "invalid_longitude"))]
    pub longitude: Option<f64>,

    pub crop: Option<String>,
    pub comments: Option<String>,
}

impl LotPayload {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            crop: trim_to_option(self.crop),
            comments: trim_to_option(self.comments),
            ..self
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLotPayload {
    pub client_id: Uuid,

    #[serde(flatten)]
    #[validate(nested)]
    pub lot: LotPayload,
}
