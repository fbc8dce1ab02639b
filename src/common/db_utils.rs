// src/common/db_utils.rs

use crate::common::error::AppError;
use crate::config::AppState;
use crate::middleware::auth::AuthenticatedUser;

// ---
// Helper RLS: A "Chave" para o Banco de Dados
// ---
/// Adquire uma conexão da pool e define `app.user_id` para as políticas RLS.
///
/// A variável é de sessão (não local à transação), então vale para todas as
/// queries feitas com esta conexão. Como toda aquisição por aqui sobrescreve o
/// valor, uma conexão devolvida à pool nunca serve a outro usuário com a chave antiga.
pub(crate) async fn get_rls_connection(
    app_state: &AppState,
    user: &AuthenticatedUser,
) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>, AppError> {
    let mut conn = app_state.db_pool.acquire().await?;

    sqlx::query("SELECT set_config('app.user_id', $1, false)")
        .bind(user.0.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(conn)
}
