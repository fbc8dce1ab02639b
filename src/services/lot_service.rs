// src/services/lot_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, text::matches_query},
    db::LotRepository,
    models::lots::{Lot, LotPayload},
};

#[derive(Clone)]
pub struct LotService {
    repo: LotRepository,
}

impl LotService {
    pub fn new(repo: LotRepository) -> Self {
        Self { repo }
    }

    /// Busca por nome do lote, nome do cliente ou cultivo.
    pub async fn list_lots<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        client_id: Option<Uuid>,
        query: Option<&str>,
    ) -> Result<Vec<Lot>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lots = self.repo.list_lots(executor, user_id, client_id).await?;
        Ok(filter_lots(lots, query.unwrap_or_default()))
    }

    pub async fn get_lot<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        lot_id: Uuid,
    ) -> Result<Lot, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_lot(executor, user_id, lot_id)
            .await?
            .ok_or(AppError::ResourceNotFound("lot"))
    }

    pub async fn create_lot<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        client_id: Uuid,
        input: &LotPayload,
    ) -> Result<Lot, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lot = self
            .repo
            .create_lot(executor, user_id, client_id, input)
            .await?
            .ok_or(AppError::ResourceNotFound("client"))?;

        tracing::info!("🌱 Lote {} ({} ha) criado para o cliente {}", lot.id, lot.area_ha, client_id);
        Ok(lot)
    }

    pub async fn update_lot<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        lot_id: Uuid,
        input: &LotPayload,
    ) -> Result<Lot, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update_lot(executor, user_id, lot_id, input)
            .await?
            .ok_or(AppError::ResourceNotFound("lot"))
    }

    pub async fn delete_lot<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        lot_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete_lot(executor, user_id, lot_id).await? {
            return Err(AppError::ResourceNotFound("lot"));
        }
        Ok(())
    }
}

fn filter_lots(lots: Vec<Lot>, query: &str) -> Vec<Lot> {
    lots.into_iter()
        .filter(|l| {
            matches_query(
                query,
                &[Some(&l.name), Some(&l.client_name), l.crop.as_deref()],
            )
        })
        .collect()
}
