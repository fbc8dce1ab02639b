// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    common::i18n::I18nStore,
    middleware::i18n::Locale,
    services::recipe_builder::DraftError,
};

// Erro de domínio. As mensagens aqui são para o log;
// o que o cliente vê sai do I18nStore via `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Receita inválida: {0}")]
    RecipeDraft(#[from] DraftError),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    // O &'static str é o nome do recurso ("client", "lot", ...), usado na chave de tradução
    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(&'static str),

    #[error("Recurso ainda referenciado: {0}")]
    StillReferenced(&'static str),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O erro que efetivamente vira resposta HTTP
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    /// Status HTTP e chave de tradução de cada variante.
    fn status_and_key(&self) -> (StatusCode, String) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "validation_failed".into()),
            AppError::RecipeDraft(e) => (StatusCode::BAD_REQUEST, format!("recipe.{}", e.code())),
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "email_already_exists".into()),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials".into()),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token".into()),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "user_not_found".into()),
            AppError::ResourceNotFound(resource) => (StatusCode::NOT_FOUND, format!("not_found.{}", resource)),
            AppError::StillReferenced(resource) => (StatusCode::CONFLICT, format!("still_referenced.{}", resource)),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error".into()),
        }
    }

    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let (status, key) = self.status_and_key();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let details = match self {
            // Campo -> lista de códigos traduzidos
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| {
                            let code = e.message.as_deref().unwrap_or(&e.code);
                            store.translate(&locale.0, &format!("validation.{}", code))
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                Some(json!(details))
            }
            AppError::RecipeDraft(e) => e.subject().map(|id| json!({ "id": id })),
            _ => None,
        };

        ApiError {
            status,
            error: store.translate(&locale.0, &key),
            details,
        }
    }
}
