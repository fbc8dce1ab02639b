// src/db/client_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::clients::{Client, ClientPayload},
};

const CLIENT_COLUMNS: &str = "id, user_id, name, company, establishment, contact, email, address, created_at, updated_at";

#[derive(Clone, Default)]
pub struct ClientRepository;

impl ClientRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list_clients<'e, E>(&self, executor: E, user_id: Uuid) -> Result<Vec<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM clients WHERE user_id = $1 ORDER BY name ASC",
            CLIENT_COLUMNS
        );
        let clients = sqlx::query_as::<_, Client>(&sql)
            .bind(user_id)
            .fetch_all(executor)
            .await?;

        Ok(clients)
    }

    pub async fn find_client<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM clients WHERE user_id = $1 AND id = $2",
            CLIENT_COLUMNS
        );
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(user_id)
            .bind(client_id)
            .fetch_optional(executor)
            .await?;

        Ok(client)
    }

    pub async fn create_client<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        input: &ClientPayload,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO clients (user_id, name, company, establishment, contact, email, address)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            CLIENT_COLUMNS
        );
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(user_id)
            .bind(&input.name)
            .bind(&input.company)
            .bind(input.establishment.as_deref())
            .bind(input.contact.as_deref())
            .bind(input.email.as_deref())
            .bind(input.address.as_deref())
            .fetch_one(executor)
            .await?;

        Ok(client)
    }

    // Regrava a linha inteira. `None` se o cliente não existe (ou é de outro usuário).
    pub async fn update_client<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        client_id: Uuid,
        input: &ClientPayload,
    ) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE clients
            SET name = $3, company = $4, establishment = $5, contact = $6,
                email = $7, address = $8, updated_at = NOW()
            WHERE user_id = $1 AND id = $2
            RETURNING {}
            "#,
            CLIENT_COLUMNS
        );
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(user_id)
            .bind(client_id)
            .bind(&input.name)
            .bind(&input.company)
            .bind(input.establishment.as_deref())
            .bind(input.contact.as_deref())
            .bind(input.email.as_deref())
            .bind(input.address.as_deref())
            .fetch_optional(executor)
            .await?;

        Ok(client)
    }

    /// Apaga o cliente (e, pelo CASCADE, seus lotes). Receitas emitidas bloqueiam.
    pub async fn delete_client<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        client_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM clients WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(client_id)
            .execute(executor)
            .await
            .map_err(|e| {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_foreign_key_violation() {
                        return AppError::StillReferenced("client");
                    }
                }
                e.into()
            })?;

        Ok(result.rows_affected() > 0)
    }
}
