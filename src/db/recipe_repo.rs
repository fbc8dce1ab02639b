// src/db/recipe_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::recipes::{
        ApplicationType, Recipe, RecipeLotDetail, RecipeProductDetail, RecipeStatus, RecipeSummary,
    },
    services::recipe_builder::RecipeLine,
};

const RECIPE_COLUMNS: &str = r#"
    id, user_id, recipe_number, client_id, technical_advisor, emitted_at,
    diagnosis, status, application_type, comments, created_at, updated_at
"#;

#[derive(Clone, Default)]
pub struct RecipeRepository;

impl RecipeRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  CABEÇALHO
    // =========================================================================

    /// Insere o cabeçalho; número, data de emissão e estado (OPEN) vêm do banco.
    pub async fn insert_recipe<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        client_id: Uuid,
        technical_advisor: &str,
        diagnosis: Option<&str>,
        application_type: ApplicationType,
        comments: Option<&str>,
    ) -> Result<Recipe, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO recipes (user_id, client_id, technical_advisor, diagnosis, application_type, comments)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            RECIPE_COLUMNS
        );
        let recipe = sqlx::query_as::<_, Recipe>(&sql)
            .bind(user_id)
            .bind(client_id)
            .bind(technical_advisor)
            .bind(diagnosis)
            .bind(application_type)
            .bind(comments)
            .fetch_one(executor)
            .await?;

        Ok(recipe)
    }

    pub async fn find_recipe<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<Option<Recipe>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM recipes WHERE user_id = $1 AND id = $2",
            RECIPE_COLUMNS
        );
        let recipe = sqlx::query_as::<_, Recipe>(&sql)
            .bind(user_id)
            .bind(recipe_id)
            .fetch_optional(executor)
            .await?;

        Ok(recipe)
    }

    /// Mais novas primeiro, com o cliente e a superfície total.
    pub async fn list_recipes<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        status: Option<RecipeStatus>,
    ) -> Result<Vec<RecipeSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let summaries = sqlx::query_as::<_, RecipeSummary>(
            r#"
            SELECT
                r.id, r.recipe_number, r.emitted_at, r.status, r.client_id,
                c.name AS client_name,
                c.company AS client_company,
                COALESCE(
                    (SELECT SUM(rl.applied_area_ha) FROM recipe_lots rl WHERE rl.recipe_id = r.id),
                    0
                ) AS total_area_ha
            FROM recipes r
            INNER JOIN clients c ON c.id = r.client_id
            WHERE r.user_id = $1
              AND ($2::recipe_status IS NULL OR r.status = $2)
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(status)
        .fetch_all(executor)
        .await?;

        Ok(summaries)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        recipe_id: Uuid,
        status: RecipeStatus,
    ) -> Result<Option<Recipe>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE recipes SET status = $3, updated_at = NOW()
            WHERE user_id = $1 AND id = $2
            RETURNING {}
            "#,
            RECIPE_COLUMNS
        );
        let recipe = sqlx::query_as::<_, Recipe>(&sql)
            .bind(user_id)
            .bind(recipe_id)
            .bind(status)
            .fetch_optional(executor)
            .await?;

        Ok(recipe)
    }

    // As linhas caem junto (ON DELETE CASCADE)
    pub async fn delete_recipe<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM recipes WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(recipe_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  LINHAS (LOTES E PRODUTOS)
    // =========================================================================

    pub async fn add_recipe_lot<'e, E>(
        &self,
        executor: E,
        recipe_id: Uuid,
        lot_id: Uuid,
        applied_area_ha: Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "INSERT INTO recipe_lots (recipe_id, lot_id, applied_area_ha) VALUES ($1, $2, $3)",
        )
        .bind(recipe_id)
        .bind(lot_id)
        .bind(applied_area_ha)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn add_recipe_product<'e, E>(
        &self,
        executor: E,
        recipe_id: Uuid,
        line: &RecipeLine,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO recipe_products (
                recipe_id, product_id, mix_order, dose_per_ha, dose_unit, total_dose, total_unit
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(recipe_id)
        .bind(line.product_id)
        .bind(line.mix_order)
        .bind(line.dose_per_ha)
        .bind(&line.dose_unit)
        .bind(line.total_dose)
        .bind(&line.total_unit)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn list_recipe_lots<'e, E>(
        &self,
        executor: E,
        recipe_id: Uuid,
    ) -> Result<Vec<RecipeLotDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lots = sqlx::query_as::<_, RecipeLotDetail>(
            r#"
            SELECT
                rl.id, rl.lot_id, rl.applied_area_ha,
                l.name AS lot_name, l.area_ha AS lot_area_ha,
                l.latitude, l.longitude
            FROM recipe_lots rl
            INNER JOIN lots l ON l.id = rl.lot_id
            WHERE rl.recipe_id = $1
            ORDER BY l.name ASC
            "#,
        )
        .bind(recipe_id)
        .fetch_all(executor)
        .await?;

        Ok(lots)
    }

    pub async fn list_recipe_products<'e, E>(
        &self,
        executor: E,
        recipe_id: Uuid,
    ) -> Result<Vec<RecipeProductDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, RecipeProductDetail>(
            r#"
            SELECT
                rp.id, rp.product_id, rp.mix_order, rp.dose_per_ha, rp.dose_unit,
                rp.total_dose, rp.total_unit,
                p.name AS product_name, p.composition, p.brand
            FROM recipe_products rp
            INNER JOIN products p ON p.id = rp.product_id
            WHERE rp.recipe_id = $1
            ORDER BY rp.mix_order ASC
            "#,
        )
        .bind(recipe_id)
        .fetch_all(executor)
        .await?;

        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    use crate::db::fixtures;

    fn line(product_id: Uuid, mix_order: i32, dose: &str, total: &str) -> RecipeLine {
        RecipeLine {
            product_id,
            product_name: String::new(),
            mix_order,
            dose_per_ha: fixtures::dec(dose),
            dose_unit: "lts/ha".into(),
            total_dose: fixtures::dec(total),
            total_unit: "lts".into(),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn header_and_lines_reload_together(pool: PgPool) {
        let repo = RecipeRepository::new();
        let user = fixtures::user(&pool, "juan@agro.com").await;
        let client = fixtures::client(&pool, user, "Juan").await;
        let norte = fixtures::lot(&pool, user, client.id, "Norte", "30.50").await;
        let sur = fixtures::lot(&pool, user, client.id, "Sur", "15").await;
        let glifo = fixtures::product(&pool, user, "Glifosato", "lts").await;
        let cleto = fixtures::product(&pool, user, "Cletodim", "lts").await;

        let header = repo
            .insert_recipe(
                &pool,
                user,
                client.id,
                "Ing. Juan",
                Some("Malezas"),
                ApplicationType::Aerial,
                None,
            )
            .await
            .unwrap();
        assert_eq!(header.status, RecipeStatus::Open);
        assert!(header.recipe_number > 0);

        repo.add_recipe_lot(&pool, header.id, sur.id, sur.area_ha).await.unwrap();
        repo.add_recipe_lot(&pool, header.id, norte.id, norte.area_ha).await.unwrap();
        repo.add_recipe_product(&pool, header.id, &line(glifo.id, 1, "2.5", "113.75"))
            .await
            .unwrap();
        repo.add_recipe_product(&pool, header.id, &line(cleto.id, 2, "0.8", "36.4"))
            .await
            .unwrap();

        let found = repo.find_recipe(&pool, user, header.id).await.unwrap().unwrap();
        assert_eq!(found.recipe_number, header.recipe_number);
        assert_eq!(found.technical_advisor, "Ing. Juan");
        assert_eq!(found.diagnosis.as_deref(), Some("Malezas"));
        assert_eq!(found.application_type, ApplicationType::Aerial);

        let lots = repo.list_recipe_lots(&pool, header.id).await.unwrap();
        assert_eq!(lots.len(), 2);
        assert_eq!(lots[0].lot_name, "Norte");
        assert_eq!(lots[0].applied_area_ha, fixtures::dec("30.50"));

        let products = repo.list_recipe_products(&pool, header.id).await.unwrap();
        assert_eq!(products[0].product_name, "Glifosato");
        assert_eq!(products[0].total_dose, fixtures::dec("113.75"));
        assert_eq!(products[1].mix_order, 2);
        assert_eq!(products[1].composition.as_deref(), Some("Cletodim 62%"));

        let summaries = repo.list_recipes(&pool, user, None).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].total_area_ha, fixtures::dec("45.50"));
        assert_eq!(summaries[0].client_company, "Juan S.A.");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn numbers_grow_and_status_filters(pool: PgPool) {
        let repo = RecipeRepository::new();
        let user = fixtures::user(&pool, "juan@agro.com").await;
        let client = fixtures::client(&pool, user, "Juan").await;

        let first = repo
            .insert_recipe(&pool, user, client.id, " ", None, ApplicationType::Ground, None)
            .await
            .unwrap();
        let second = repo
            .insert_recipe(&pool, user, client.id, " ", None, ApplicationType::Ground, None)
            .await
            .unwrap();
        assert!(second.recipe_number > first.recipe_number);

        let closed = repo
            .update_status(&pool, user, first.id, RecipeStatus::Closed)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(closed.status, RecipeStatus::Closed);

        let only_closed = repo.list_recipes(&pool, user, Some(RecipeStatus::Closed)).await.unwrap();
        assert_eq!(only_closed.len(), 1);
        assert_eq!(only_closed[0].id, first.id);
        assert_eq!(only_closed[0].total_area_ha, Decimal::ZERO);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn delete_cascades_to_the_lines(pool: PgPool) {
        let repo = RecipeRepository::new();
        let user = fixtures::user(&pool, "juan@agro.com").await;
        let other = fixtures::user(&pool, "otro@agro.com").await;
        let client = fixtures::client(&pool, user, "Juan").await;
        let lot = fixtures::lot(&pool, user, client.id, "Norte", "10").await;
        let header = repo
            .insert_recipe(&pool, user, client.id, " ", None, ApplicationType::Ground, None)
            .await
            .unwrap();
        repo.add_recipe_lot(&pool, header.id, lot.id, lot.area_ha).await.unwrap();

        assert!(!repo.delete_recipe(&pool, other, header.id).await.unwrap());
        assert!(repo.delete_recipe(&pool, user, header.id).await.unwrap());
        assert!(repo.list_recipe_lots(&pool, header.id).await.unwrap().is_empty());
        assert!(repo.find_recipe(&pool, user, header.id).await.unwrap().is_none());
    }
}
