// src/services/client_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, text::matches_query},
    db::ClientRepository,
    models::clients::{Client, ClientPayload},
};

#[derive(Clone)]
pub struct ClientService {
    repo: ClientRepository,
}

impl ClientService {
    pub fn new(repo: ClientRepository) -> Self {
        Self { repo }
    }

    /// Busca por nome, empresa ou estabelecimento, sem acentos nem maiúsculas.
    pub async fn list_clients<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        query: Option<&str>,
    ) -> Result<Vec<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let clients = self.repo.list_clients(executor, user_id).await?;
        Ok(filter_clients(clients, query.unwrap_or_default()))
    }

    pub async fn get_client<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        client_id: Uuid,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_client(executor, user_id, client_id)
            .await?
            .ok_or(AppError::ResourceNotFound("client"))
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
        self.repo.create_client(executor, user_id, input).await
    }

    pub async fn update_client<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        client_id: Uuid,
        input: &ClientPayload,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update_client(executor, user_id, client_id, input)
            .await?
            .ok_or(AppError::ResourceNotFound("client"))
    }

    /// Os lotes caem junto; receitas emitidas para o cliente bloqueiam (409).
    pub async fn delete_client<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        client_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deleted = self.repo.delete_client(executor, user_id, client_id).await?;
        if !deleted {
            return Err(AppError::ResourceNotFound("client"));
        }

        tracing::info!("🗑️ Cliente {} removido", client_id);
        Ok(())
    }
}

fn filter_clients(clients: Vec<Client>, query: &str) -> Vec<Client> {
    clients
        .into_iter()
        .filter(|c| {
            matches_query(
                query,
                &[Some(&c.name), Some(&c.company), c.establishment.as_deref()],
            )
        })
        .collect()
}
