// src/models/products.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::text::{trim_to_option, validate_required_text};

// Unidade usada quando o formulário não informa nenhuma
pub const DEFAULT_UNIT: &str = "lts";

// Catálogo de agroquímicos
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(ignore)]
    pub user_id: Uuid,

    #[schema(example = "Glifosato Premium")]
    pub name: String,
    #[schema(example = "Bayer")]
    pub brand: Option<String>,
    #[schema(example = "Glifosato 62%")]
    pub composition: Option<String>,
    #[schema(example = "Herbicida")]
    pub product_type: Option<String>,
    #[schema(example = "lts")]
    pub unit: String,
    // false = arquivado
    pub active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[validate(custom(function = "validate_required_text"), length(max = 200, message = "too_long"))]
    #[schema(example = "Glifosato Premium")]
    pub name: String,

    pub brand: Option<String>,
    pub composition: Option<String>,
    pub product_type: Option<String>,

    #[validate(length(max = 20, message = "too_long"))]
    #[schema(example = "lts")]
    pub unit: Option<String>,
}

impl ProductPayload {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            brand: trim_to_option(self.brand),
            composition: trim_to_option(self.composition),
            product_type: trim_to_option(self.product_type),
            unit: Some(trim_to_option(self.unit).unwrap_or_else(|| DEFAULT_UNIT.to_string())),
        }
    }

    pub fn unit(&self) -> &str {
        self.unit.as_deref().unwrap_or(DEFAULT_UNIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_defaults_to_liters() {
        let p = ProductPayload {
            name: " 2,4-D ".into(),
            brand: None,
            composition: Some(" ".into()),
            product_type: None,
            unit: Some("".into()),
        }
        .normalized();

        assert_eq!(p.name, "2,4-D");
        assert_eq!(p.unit(), "lts");
        assert_eq!(p.composition, None);
    }

    #[test]
    fn name_is_required() {
        let p = ProductPayload {
            name: "  ".into(),
            brand: None,
            composition: None,
            product_type: None,
            unit: Some("kg".into()),
        }
        .normalized();

        let errors = p.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
        assert_eq!(p.unit(), "kg");
    }
}
