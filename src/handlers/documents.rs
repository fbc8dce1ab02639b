// src/handlers/documents.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse, Response},
};
use chrono::{DateTime, FixedOffset, Local};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::get_rls_connection,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
};

// Datas do documento no fuso do servidor
fn local_now() -> DateTime<FixedOffset> {
    let now = Local::now();
    now.with_timezone(now.offset())
}

// GET /api/recipes/{id}/html
#[utoipa::path(
    get,
    path = "/api/recipes/{id}/html",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "ID da receita")),
    responses(
        (status = 200, description = "Documento HTML da receita", content_type = "text/html", body = String),
        (status = 404, description = "Receita não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn recipe_html(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(recipe_id): Path<Uuid>,
) -> Result<Html<String>, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .recipe_service
        .get_recipe_detail(&mut *rls_conn, user.0, recipe_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Html(app_state.document_service.render_html(&detail, local_now())))
}

// GET /api/recipes/{id}/pdf
#[utoipa::path(
    get,
    path = "/api/recipes/{id}/pdf",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "ID da receita")),
    responses(
        (status = 200, description = "PDF da receita", content_type = "application/pdf", body = Vec<u8>),
        (status = 404, description = "Receita não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn recipe_pdf(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(recipe_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .recipe_service
        .get_recipe_detail(&mut *rls_conn, user.0, recipe_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    drop(rls_conn);

    let recipe_number = detail.header.recipe_number;
    let now = local_now();

    // Layout do PDF é CPU puro: fora do runtime
    let document_service = app_state.document_service.clone();
    let pdf_bytes = tokio::task::spawn_blocking(move || document_service.render_pdf(&detail, now))
        .await
        .map_err(|e| {
            AppError::InternalServerError(anyhow::anyhow!("Falha na task do PDF: {}", e))
                .to_api_error(&locale, &app_state.i18n_store)
        })?
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Configura os Headers para o navegador baixar o PDF
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"receta_{}.pdf\"", recipe_number),
        ),
    ];

    Ok((headers, pdf_bytes).into_response())
}
