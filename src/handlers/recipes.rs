// src/handlers/recipes.rs

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
    models::recipes::{
        EmitRecipePayload, Recipe, RecipeDetail, RecipeStatus, RecipeSummary,
        UpdateRecipeStatusPayload,
    },
    services::recipe_builder::RecipePreview,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipeListQuery {
    /// Número da receita, nome do cliente ou empresa
    pub q: Option<String>,
    pub status: Option<RecipeStatus>,
}

// POST /api/recipes
#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "Recipes",
    request_body = EmitRecipePayload,
    responses(
        (status = 201, description = "Receita emitida", body = RecipeDetail),
        (status = 400, description = "Receita incompleta ou dose inválida"),
        (status = 404, description = "Cliente, lote ou produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn emit_recipe(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<EmitRecipePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .recipe_service
        .emit_recipe(&mut *rls_conn, user.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// POST /api/recipes/preview
#[utoipa::path(
    post,
    path = "/api/recipes/preview",
    tag = "Recipes",
    request_body = EmitRecipePayload,
    responses(
        (status = 200, description = "Totais calculados, nada é gravado", body = RecipePreview),
        (status = 400, description = "Receita incompleta ou dose inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn preview_recipe(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<EmitRecipePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let preview = app_state
        .recipe_service
        .preview_recipe(&mut *rls_conn, user.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(preview)))
}

// GET /api/recipes
#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "Recipes",
    params(RecipeListQuery),
    responses(
        (status = 200, description = "Receitas, mais novas primeiro", body = Vec<RecipeSummary>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_recipes(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(query): Query<RecipeListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let recipes = app_state
        .recipe_service
        .list_recipes(&mut *rls_conn, user.0, query.q.as_deref(), query.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(recipes)))
}

// GET /api/recipes/{id}
#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    tag = "Recipes",
    params(("id" = Uuid, Path, description = "ID da receita")),
    responses(
        (status = 200, description = "Receita completa", body = RecipeDetail),
        (status = 404, description = "Receita não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_recipe(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(recipe_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .recipe_service
        .get_recipe_detail(&mut *rls_conn, user.0, recipe_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

// PATCH /api/recipes/{id}/status
#[utoipa::path(
    patch,
    path = "/api/recipes/{id}/status",
    tag = "Recipes",
    request_body = UpdateRecipeStatusPayload,
    params(("id" = Uuid, Path, description = "ID da receita")),
    responses(
        (status = 200, description = "Estado alterado", body = Recipe),
        (status = 404, description = "Receita não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_recipe_status(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(recipe_id): Path<Uuid>,
    Json(payload): Json<UpdateRecipeStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let recipe = app_state
        .recipe_service
        .update_status(&mut *rls_conn, user.0, recipe_id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(recipe)))
}

// DELETE /api/recipes/{id}
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}",
    tag = "Recipes",
    params(("id" = Uuid, Path, description = "ID da receita")),
    responses(
        (status = 204, description = "Receita removida"),
        (status = 404, description = "Receita não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_recipe(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(recipe_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .recipe_service
        .delete_recipe(&mut *rls_conn, user.0, recipe_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
