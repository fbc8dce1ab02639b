// src/db/product_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::products::{Product, ProductPayload},
};

const PRODUCT_COLUMNS: &str =
    "id, user_id, name, brand, composition, product_type, unit, active, created_at, updated_at";

#[derive(Clone, Default)]
pub struct ProductRepository;

impl ProductRepository {
    pub fn new() -> Self {
        Self
    }

    /// Ordenados por nome. Arquivados só entram se pedidos.
    pub async fn list_products<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        include_archived: bool,
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {} FROM products
            WHERE user_id = $1 AND (active OR $2)
            ORDER BY name ASC
            "#,
            PRODUCT_COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(user_id)
            .bind(include_archived)
            .fetch_all(executor)
            .await?;

        Ok(products)
    }

    pub async fn find_product<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM products WHERE user_id = $1 AND id = $2",
            PRODUCT_COLUMNS
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(user_id)
            .bind(product_id)
            .fetch_optional(executor)
            .await?;

        Ok(product)
    }

    pub async fn find_products_by_ids<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        product_ids: &[Uuid],
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM products WHERE user_id = $1 AND id = ANY($2)",
            PRODUCT_COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(user_id)
            .bind(product_ids)
            .fetch_all(executor)
            .await?;

        Ok(products)
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
        let sql = format!(
            r#"
            INSERT INTO products (user_id, name, brand, composition, product_type, unit, active)
            VALUES ($1, $2, $3, $4, $5, $6, TRUE)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(user_id)
            .bind(&input.name)
            .bind(input.brand.as_deref())
            .bind(input.composition.as_deref())
            .bind(input.product_type.as_deref())
            .bind(input.unit())
            .fetch_one(executor)
            .await?;

        Ok(product)
    }

    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        product_id: Uuid,
        input: &ProductPayload,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE products
            SET name = $3, brand = $4, composition = $5, product_type = $6,
                unit = $7, updated_at = NOW()
            WHERE user_id = $1 AND id = $2
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(user_id)
            .bind(product_id)
            .bind(&input.name)
            .bind(input.brand.as_deref())
            .bind(input.composition.as_deref())
            .bind(input.product_type.as_deref())
            .bind(input.unit())
            .fetch_optional(executor)
            .await?;

        Ok(product)
    }

    /// "Apagar" um produto é arquivá-lo: receitas antigas continuam apontando para ele.
    pub async fn archive_product<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE products SET active = FALSE, updated_at = NOW() WHERE user_id = $1 AND id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
