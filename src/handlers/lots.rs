// src/handlers/lots.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::get_rls_connection,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::lots::{CreateLotPayload, Lot, LotPayload},
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LotListQuery {
    /// Nome do lote, do cliente ou cultivo
    pub q: Option<String>,
    pub client_id: Option<Uuid>,
}

// GET /api/lots
#[utoipa::path(
    get,
    path = "/api/lots",
    tag = "Lots",
    params(LotListQuery),
    responses(
        (status = 200, description = "Lotes, mais novos primeiro", body = Vec<Lot>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_lots(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(query): Query<LotListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let lots = app_state
        .lot_service
        .list_lots(&mut *rls_conn, user.0, query.client_id, query.q.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(lots)))
}

// POST /api/lots
#[utoipa::path(
    post,
    path = "/api/lots",
    tag = "Lots",
    request_body = CreateLotPayload,
    responses(
        (status = 201, description = "Lote criado", body = Lot),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lot(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateLotPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = CreateLotPayload {
        lot: payload.lot.normalized(),
        ..payload
    };
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let lot = app_state
        .lot_service
        .create_lot(&mut *rls_conn, user.0, payload.client_id, &payload.lot)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(lot)))
}

// GET /api/lots/{id}
#[utoipa::path(
    get,
    path = "/api/lots/{id}",
    tag = "Lots",
    params(("id" = Uuid, Path, description = "ID do lote")),
    responses(
        (status = 200, description = "Lote", body = Lot),
        (status = 404, description = "Lote não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_lot(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(lot_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let lot = app_state
        .lot_service
        .get_lot(&mut *rls_conn, user.0, lot_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(lot)))
}

// PUT /api/lots/{id}
// O cliente dono não muda depois de criado
#[utoipa::path(
    put,
    path = "/api/lots/{id}",
    tag = "Lots",
    request_body = LotPayload,
    params(("id" = Uuid, Path, description = "ID do lote")),
    responses(
        (status = 200, description = "Lote atualizado", body = Lot),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Lote não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_lot(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(lot_id): Path<Uuid>,
    Json(payload): Json<LotPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = payload.normalized();
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let lot = app_state
        .lot_service
        .update_lot(&mut *rls_conn, user.0, lot_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(lot)))
}

// DELETE /api/lots/{id}
#[utoipa::path(
    delete,
    path = "/api/lots/{id}",
    tag = "Lots",
    params(("id" = Uuid, Path, description = "ID do lote")),
    responses(
        (status = 204, description = "Lote removido"),
        (status = 404, description = "Lote não encontrado"),
        (status = 409, description = "Lote usado em receita")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_lot(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(lot_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .lot_service
        .delete_lot(&mut *rls_conn, user.0, lot_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
