// src/services/product_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, text::matches_query},
    db::ProductRepository,
    models::products::{Product, ProductPayload},
};

#[derive(Clone)]
pub struct ProductService {
    repo: ProductRepository,
}

impl ProductService {
    pub fn new(repo: ProductRepository) -> Self {
        Self { repo }
    }

    /// Busca por nome ou composição. Arquivados ficam de fora salvo pedido explícito.
    pub async fn list_products<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        query: Option<&str>,
        include_archived: bool,
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = self
            .repo
            .list_products(executor, user_id, include_archived)
            .await?;
        Ok(filter_products(products, query.unwrap_or_default()))
    }

    pub async fn get_product<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_product(executor, user_id, product_id)
            .await?
            .ok_or(AppError::ResourceNotFound("product"))
    }

    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        input: &ProductPayload,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.create_product(executor, user_id, input).await
    }

    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        product_id: Uuid,
        input: &ProductPayload,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update_product(executor, user_id, product_id, input)
            .await?
            .ok_or(AppError::ResourceNotFound("product"))
    }

    pub async fn archive_product<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.archive_product(executor, user_id, product_id).await? {
            return Err(AppError::ResourceNotFound("product"));
        }

        tracing::info!("📦 Produto {} arquivado", product_id);
        Ok(())
    }
}

fn filter_products(products: Vec<Product>, query: &str) -> Vec<Product> {
    products
        .into_iter()
        .filter(|p| matches_query(query, &[Some(&p.name), p.composition.as_deref()]))
        .collect()
}
