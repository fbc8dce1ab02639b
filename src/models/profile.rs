// src/models/profile.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::text::trim_to_option;

// "Mis datos profesionales": a assinatura das receitas emitidas
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[schema(ignore)]
    pub user_id: Uuid,

    #[schema(example = "Ing. Agr. Juan Pérez")]
    pub full_name: Option<String>,

    #[schema(example = "MP 1234")]
    pub license_number: Option<String>,

    #[schema(example = "+54 9 3464 555555")]
    pub phone: Option<String>,

    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            full_name: None,
            license_number: None,
            phone: None,
            updated_at: None,
        }
    }

    /// Nome que vai na receita. Sem nome cadastrado grava-se um espaço,
    /// porque a coluna não aceita vazio nem nulo.
    pub fn signature(&self) -> String {
        self.full_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(" ")
            .to_string()
    }
}

// GET /api/profile: o perfil mais o e-mail da conta
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub profile: Profile,
    #[schema(example = "juan@agroperez.com")]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(max = 200, message = "too_long"))]
    #[schema(example = "Ing. Agr. Juan Pérez")]
    pub full_name: Option<String>,

    #[validate(length(max = 50, message = "too_long"))]
    #[schema(example = "MP 1234")]
    pub license_number: Option<String>,

    #[validate(length(max = 50, message = "too_long"))]
    pub phone: Option<String>,
}

impl UpdateProfileRequest {
    pub fn normalized(self) -> Self {
        Self {
            full_name: trim_to_option(self.full_name),
            license_number: trim_to_option(self.license_number),
            phone: trim_to_option(self.phone),
        }
    }
}
