// src/db/lot_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::lots::{Lot, LotPayload},
};

// Lote + nome/empresa do cliente. `l` pode ser a tabela ou um CTE com as mesmas colunas.
const LOT_SELECT: &str = r#"
    SELECT
        l.id, l.user_id, l.client_id, l.name, l.area_ha,
        l.latitude, l.longitude, l.crop, l.comments,
        l.created_at, l.updated_at,
        c.name AS client_name, c.company AS client_company
"#;

#[derive(Clone, Default)]
pub struct LotRepository;

impl LotRepository {
    pub fn new() -> Self {
        Self
    }

    /// Mais novos primeiro. `client_id` restringe aos lotes de um cliente.
    pub async fn list_lots<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        client_id: Option<Uuid>,
    ) -> Result<Vec<Lot>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            {}
            FROM lots l
            INNER JOIN clients c ON c.id = l.client_id
            WHERE l.user_id = $1
              AND ($2::uuid IS NULL OR l.client_id = $2)
            ORDER BY l.created_at DESC
            "#,
            LOT_SELECT
        );
        let lots = sqlx::query_as::<_, Lot>(&sql)
            .bind(user_id)
            .bind(client_id)
            .fetch_all(executor)
            .await?;

        Ok(lots)
    }

    pub async fn find_lot<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        lot_id: Uuid,
    ) -> Result<Option<Lot>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            {}
            FROM lots l
            INNER JOIN clients c ON c.id = l.client_id
            WHERE l.user_id = $1 AND l.id = $2
            "#,
            LOT_SELECT
        );
        let lot = sqlx::query_as::<_, Lot>(&sql)
            .bind(user_id)
            .bind(lot_id)
            .fetch_optional(executor)
            .await?;

        Ok(lot)
    }

    /// Busca vários de uma vez; ids desconhecidos simplesmente não voltam.
    pub async fn find_lots_by_ids<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        lot_ids: &[Uuid],
    ) -> Result<Vec<Lot>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            {}
            FROM lots l
            INNER JOIN clients c ON c.id = l.client_id
            WHERE l.user_id = $1 AND l.id = ANY($2)
            "#,
            LOT_SELECT
        );
        let lots = sqlx::query_as::<_, Lot>(&sql)
            .bind(user_id)
            .bind(lot_ids)
            .fetch_all(executor)
            .await?;

        Ok(lots)
    }

    /// O INSERT ... SELECT só acha o cliente se ele for do mesmo usuário:
    /// `None` quer dizer cliente inexistente.
    pub async fn create_lot<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        client_id: Uuid,
        input: &LotPayload,
    ) -> Result<Option<Lot>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            WITH l AS (
                INSERT INTO lots (user_id, client_id, name, area_ha, latitude, longitude, crop, comments)
                SELECT $1, c.id, $3, $4, $5, $6, $7, $8
                FROM clients c
                WHERE c.user_id = $1 AND c.id = $2
                RETURNING *
            )
            {}
            FROM l
            INNER JOIN clients c ON c.id = l.client_id
            "#,
            LOT_SELECT
        );
        let lot = sqlx::query_as::<_, Lot>(&sql)
            .bind(user_id)
            .bind(client_id)
            .bind(&input.name)
            .bind(input.area_ha)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(input.crop.as_deref())
            .bind(input.comments.as_deref())
            .fetch_optional(executor)
            .await?;

        Ok(lot)
    }

    pub async fn update_lot<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        lot_id: Uuid,
        input: &LotPayload,
    ) -> Result<Option<Lot>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            WITH l AS (
                UPDATE lots
                SET name = $3, area_ha = $4, latitude = $5, longitude = $6,
                    crop = $7, comments = $8, updated_at = NOW()
                WHERE user_id = $1 AND id = $2
                RETURNING *
            )
            {}
            FROM l
            INNER JOIN clients c ON c.id = l.client_id
            "#,
            LOT_SELECT
        );
        let lot = sqlx::query_as::<_, Lot>(&sql)
            .bind(user_id)
            .bind(lot_id)
            .bind(&input.name)
            .bind(input.area_ha)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(input.crop.as_deref())
            .bind(input.comments.as_deref())
            .fetch_optional(executor)
            .await?;

        Ok(lot)
    }

    pub async fn delete_lot<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        lot_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM lots WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(lot_id)
            .execute(executor)
            .await
            .map_err(|e| {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_foreign_key_violation() {
                        return AppError::StillReferenced("lot");
                    }
                }
                e.into()
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    use crate::db::{fixtures, RecipeRepository};
    use crate::models::recipes::ApplicationType;

    #[sqlx::test(migrations = "./migrations")]
    async fn saved_lot_reloads_with_client_data(pool: PgPool) {
        let repo = LotRepository::new();
        let user = fixtures::user(&pool, "juan@agro.com").await;
        let client = fixtures::client(&pool, user, "Juan").await;

        let created = repo
            .create_lot(&pool, user, client.id, &fixtures::lot_payload("Lote 4", "45.50"))
            .await
            .unwrap()
            .unwrap();
        let found = repo.find_lot(&pool, user, created.id).await.unwrap().unwrap();

        assert_eq!(found.client_id, client.id);
        assert_eq!(found.name, "Lote 4");
        assert_eq!(found.area_ha, fixtures::dec("45.50"));
        assert_eq!(found.latitude, Some(-33.1234));
        assert_eq!(found.longitude, None);
        assert_eq!(found.crop.as_deref(), Some("Soja"));
        assert_eq!(found.client_name, "Juan");
        assert_eq!(found.client_company, "Juan S.A.");

        let mut edit = fixtures::lot_payload("Lote 4 - Norte", "50");
        edit.latitude = None;
        let updated = repo.update_lot(&pool, user, created.id, &edit).await.unwrap().unwrap();
        assert_eq!(updated.name, "Lote 4 - Norte");
        assert_eq!(updated.area_ha, fixtures::dec("50"));
        assert_eq!(updated.latitude, None);
        assert_eq!(updated.client_id, client.id);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn lot_for_a_foreign_client_is_not_created(pool: PgPool) {
        let repo = LotRepository::new();
        let owner = fixtures::user(&pool, "a@agro.com").await;
        let other = fixtures::user(&pool, "b@agro.com").await;
        let client = fixtures::client(&pool, owner, "Ana").await;

        let lot = repo
            .create_lot(&pool, other, client.id, &fixtures::lot_payload("Intruso", "3"))
            .await
            .unwrap();
        assert!(lot.is_none());

        let missing = repo
            .create_lot(&pool, owner, Uuid::new_v4(), &fixtures::lot_payload("X", "3"))
            .await
            .unwrap();
        assert!(missing.is_none());
        assert!(repo.list_lots(&pool, owner, None).await.unwrap().is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn list_filters_by_client(pool: PgPool) {
        let repo = LotRepository::new();
        let user = fixtures::user(&pool, "juan@agro.com").await;
        let (a, b) = (
            fixtures::client(&pool, user, "Ana").await,
            fixtures::client(&pool, user, "Beto").await,
        );
        let lot_a = fixtures::lot(&pool, user, a.id, "A1", "1").await;
        fixtures::lot(&pool, user, b.id, "B1", "2").await;

        assert_eq!(repo.list_lots(&pool, user, None).await.unwrap().len(), 2);
        let only_a = repo.list_lots(&pool, user, Some(a.id)).await.unwrap();
        assert_eq!(only_a.len(), 1);
        assert_eq!(only_a[0].id, lot_a.id);

        let by_ids = repo
            .find_lots_by_ids(&pool, user, &[lot_a.id, Uuid::new_v4()])
            .await
            .unwrap();
        assert_eq!(by_ids.len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn lot_used_by_a_recipe_cannot_be_deleted(pool: PgPool) {
        let repo = LotRepository::new();
        let user = fixtures::user(&pool, "juan@agro.com").await;
        let client = fixtures::client(&pool, user, "Juan").await;
        let lot = fixtures::lot(&pool, user, client.id, "Norte", "10").await;

        let recipes = RecipeRepository::new();
        let recipe = recipes
            .insert_recipe(&pool, user, client.id, "Ing. Juan", None, ApplicationType::Ground, None)
            .await
            .unwrap();
        recipes.add_recipe_lot(&pool, recipe.id, lot.id, lot.area_ha).await.unwrap();

        let err = repo.delete_lot(&pool, user, lot.id).await.unwrap_err();
        assert!(matches!(err, AppError::StillReferenced("lot")));

        let spare = fixtures::lot(&pool, user, client.id, "Sur", "5").await;
        assert!(repo.delete_lot(&pool, user, spare.id).await.unwrap());
        assert!(!repo.delete_lot(&pool, user, spare.id).await.unwrap());
    }
}
