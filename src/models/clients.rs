// src/models/clients.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::text::{trim_to_option, validate_required_text};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    #[schema(ignore)]
    pub user_id: Uuid,

    #[schema(example = "Juan Pérez")]
    pub name: String,
    #[schema(example = "Agro Pérez S.A.")]
    pub company: String,
    #[schema(example = "La Esperanza")]
    pub establishment: Option<String>,
    #[schema(example = "+54 9 341 555 1234")]
    pub contact: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Mesmo corpo para criar e para editar (a edição regrava a linha inteira)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    #[validate(custom(function = "validate_required_text"), length(max = 200, message = "too_long"))]
    #[schema(example = "Juan Pérez")]
    pub name: String,

    #[validate(custom(function = "validate_required_text"), length(max = 200, message = "too_long"))]
    #[schema(example = "Agro Pérez S.A.")]
    pub company: String,

    pub establishment: Option<String>,
    pub contact: Option<String>,

    #[validate(email(message = "invalid_email"))]
    #[schema(example = "juan@agroperez.com")]
    pub email: Option<String>,

    pub address: Option<String>,
}

impl ClientPayload {
    /// Apara tudo; opcionais em branco viram `None`. Validar depois disto.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            company: self.company.trim().to_string(),
            establishment: trim_to_option(self.establishment),
            contact: trim_to_option(self.contact),
            email: trim_to_option(self.email),
            address: trim_to_option(self.address),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str, company: &str) -> ClientPayload {
        ClientPayload {
            name: name.into(),
            company: company.into(),
            establishment: Some("  ".into()),
            contact: None,
            email: Some(" juan@agro.com ".into()),
            address: None,
        }
    }

    #[test]
    fn blank_required_fields_are_rejected_after_trimming() {
        let errors = payload("   ", "Agro").normalized().validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(!fields.contains_key("company"));
    }

    #[test]
    fn normalized_payload_is_valid_and_clean() {
        let p = payload(" Juan ", " Agro SA ").normalized();
        assert!(p.validate().is_ok());
        assert_eq!(p.name, "Juan");
        assert_eq!(p.company, "Agro SA");
        assert_eq!(p.establishment, None);
        assert_eq!(p.email.as_deref(), Some("juan@agro.com"));
    }

    #[test]
    fn malformed_email_is_rejected() {
        let mut p = payload("Juan", "Agro");
        p.email = Some("not-an-email".into());
        let errors = p.normalized().validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }
}
