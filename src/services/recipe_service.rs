// src/services/recipe_service.rs

use std::collections::HashMap;

use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, text::{matches_query, trim_to_option}},
    db::{ClientRepository, LotRepository, ProductRepository, ProfileRepository, RecipeRepository},
    models::{
        clients::Client,
        recipes::{EmitRecipePayload, Recipe, RecipeDetail, RecipeStatus, RecipeSummary},
    },
    services::recipe_builder::{DraftError, RecipeDraft, RecipePreview},
};

#[derive(Clone)]
pub struct RecipeService {
    repo: RecipeRepository,
    client_repo: ClientRepository,
    lot_repo: LotRepository,
    product_repo: ProductRepository,
    profile_repo: ProfileRepository,
}

impl RecipeService {
    pub fn new(
        repo: RecipeRepository,
        client_repo: ClientRepository,
        lot_repo: LotRepository,
        product_repo: ProductRepository,
        profile_repo: ProfileRepository,
    ) -> Self {
        Self {
            repo,
            client_repo,
            lot_repo,
            product_repo,
            profile_repo,
        }
    }

    // =========================================================================
    //  MONTAGEM
    // =========================================================================

    /// Carrega cliente, lotes e produtos do pedido e monta o rascunho.
    /// Ids desconhecidos (ou de outro assessor) viram 404; as regras da receita
    /// ficam a cargo do `RecipeDraft`.
    async fn build_draft(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        input: &EmitRecipePayload,
    ) -> Result<RecipeDraft, AppError> {
        let client_id = input.client_id.ok_or(DraftError::MissingClient)?;
        let client = self
            .client_repo
            .find_client(&mut *conn, user_id, client_id)
            .await?
            .ok_or(AppError::ResourceNotFound("client"))?;

        let mut draft = RecipeDraft::new();
        draft.select_client(client.id);

        // 1. Lotes (repetidos no pedido contam uma vez só)
        let lot_ids = unique_ids(input.lot_ids.iter().copied());
        if !lot_ids.is_empty() {
            let found: HashMap<Uuid, _> = self
                .lot_repo
                .find_lots_by_ids(&mut *conn, user_id, &lot_ids)
                .await?
                .into_iter()
                .map(|lot| (lot.id, lot))
                .collect();

            for id in &lot_ids {
                let lot = found.get(id).ok_or(AppError::ResourceNotFound("lot"))?;
                draft.toggle_lot(lot)?;
            }
        }

        // 2. Produtos, na ordem de mistura do pedido
        let product_ids = unique_ids(input.products.iter().map(|p| p.product_id));
        if !product_ids.is_empty() {
            let found: HashMap<Uuid, _> = self
                .product_repo
                .find_products_by_ids(&mut *conn, user_id, &product_ids)
                .await?
                .into_iter()
                .map(|product| (product.id, product))
                .collect();

            for item in &input.products {
                let product = found
                    .get(&item.product_id)
                    .ok_or(AppError::ResourceNotFound("product"))?;
                draft.add_product(product)?;
                draft.set_dose(product.id, item.dose_per_ha);
            }
        }

        Ok(draft)
    }

    /// Calcula a receita sem gravar nada.
    pub async fn preview_recipe(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        input: &EmitRecipePayload,
    ) -> Result<RecipePreview, AppError> {
        let draft = self.build_draft(conn, user_id, input).await?;
        Ok(draft.preview()?)
    }

    /// Cabeçalho, lotes e produtos entram na mesma transação.
    pub async fn emit_recipe<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        input: &EmitRecipePayload,
    ) -> Result<RecipeDetail, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = executor.begin().await?;

        let draft = self.build_draft(&mut *tx, user_id, input).await?;
        let lines = draft.lines()?;
        let client_id = draft.client_id().ok_or(DraftError::MissingClient)?;

        // O assessor assina com o nome do perfil
        let advisor = self.profile_repo.get_profile(&mut *tx, user_id).await?.signature();
        let diagnosis = trim_to_option(input.diagnosis.clone());
        let comments = trim_to_option(input.comments.clone());

        let header = self
            .repo
            .insert_recipe(
                &mut *tx,
                user_id,
                client_id,
                &advisor,
                diagnosis.as_deref(),
                input.application_type.unwrap_or_default(),
                comments.as_deref(),
            )
            .await?;

        for lot in draft.lots() {
            self.repo
                .add_recipe_lot(&mut *tx, header.id, lot.lot_id, lot.area_ha)
                .await?;
        }
        for line in &lines {
            self.repo.add_recipe_product(&mut *tx, header.id, line).await?;
        }

        let detail = self.load_detail(&mut *tx, user_id, header).await?;

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        tracing::info!(
            "🧾 Receita N° {} emitida: {} lote(s), {} produto(s), {} ha",
            detail.header.recipe_number,
            detail.lots.len(),
            detail.products.len(),
            detail.total_area_ha
        );

        Ok(detail)
    }

    // =========================================================================
    //  CONSULTA E MANUTENÇÃO
    // =========================================================================

    /// Busca por número, nome do cliente ou empresa.
    pub async fn list_recipes<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        query: Option<&str>,
        status: Option<RecipeStatus>,
    ) -> Result<Vec<RecipeSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let summaries = self.repo.list_recipes(executor, user_id, status).await?;
        Ok(filter_summaries(summaries, query.unwrap_or_default()))
    }

    /// Várias consultas na mesma conexão (a da chave RLS do pedido).
    pub async fn get_recipe_detail(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<RecipeDetail, AppError> {
        let header = self
            .repo
            .find_recipe(&mut *conn, user_id, recipe_id)
            .await?
            .ok_or(AppError::ResourceNotFound("recipe"))?;

        self.load_detail(conn, user_id, header).await
    }

    async fn load_detail(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        header: Recipe,
    ) -> Result<RecipeDetail, AppError> {
        let client: Client = self
            .client_repo
            .find_client(&mut *conn, user_id, header.client_id)
            .await?
            .ok_or(AppError::ResourceNotFound("client"))?;
        let lots = self.repo.list_recipe_lots(&mut *conn, header.id).await?;
        let products = self.repo.list_recipe_products(&mut *conn, header.id).await?;

        Ok(RecipeDetail::new(header, client, lots, products))
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        recipe_id: Uuid,
        status: RecipeStatus,
    ) -> Result<Recipe, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let recipe = self
            .repo
            .update_status(executor, user_id, recipe_id, status)
            .await?
            .ok_or(AppError::ResourceNotFound("recipe"))?;

        tracing::info!("🧾 Receita N° {} -> {:?}", recipe.recipe_number, status);
        Ok(recipe)
    }

    pub async fn delete_recipe<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete_recipe(executor, user_id, recipe_id).await? {
            return Err(AppError::ResourceNotFound("recipe"));
        }
        Ok(())
    }
}

// Remove repetidos mantendo a primeira ocorrência
fn unique_ids(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = Vec::new();
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

fn filter_summaries(summaries: Vec<RecipeSummary>, query: &str) -> Vec<RecipeSummary> {
    summaries
        .into_iter()
        .filter(|r| {
            let number = r.recipe_number.to_string();
            matches_query(
                query,
                &[Some(&number), Some(&r.client_name), Some(&r.client_company)],
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn summary(number: i64, client: &str, company: &str) -> RecipeSummary {
        RecipeSummary {
            id: Uuid::new_v4(),
            recipe_number: number,
            emitted_at: Utc::now(),
            status: RecipeStatus::Open,
            client_id: Uuid::nil(),
            client_name: client.into(),
            client_company: company.into(),
            total_area_ha: Decimal::new(4550, 2),
        }
    }

    #[test]
    fn repeated_ids_keep_first_position() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(unique_ids([a, b, a, b, a].into_iter()), vec![a, b]);
        assert!(unique_ids(std::iter::empty()).is_empty());
    }

    #[test]
    fn recipe_search_covers_number_and_client() {
        let recipes = vec![
            summary(152, "Juan Pérez", "Agro Pérez S.A."),
            summary(153, "Ana Gómez", "La Tranquera"),
        ];

        assert_eq!(filter_summaries(recipes.clone(), "152")[0].recipe_number, 152);
        assert_eq!(filter_summaries(recipes.clone(), "gomez")[0].recipe_number, 153);
        assert_eq!(filter_summaries(recipes.clone(), "tranquera").len(), 1);
        assert_eq!(filter_summaries(recipes, " ").len(), 2);
    }

    mod with_database {
        use super::*;
        use sqlx::PgPool;

        use crate::{
            db::fixtures,
            models::{profile::UpdateProfileRequest, recipes::{ApplicationType, RecipeProductInput}},
        };

        fn service() -> RecipeService {
            RecipeService::new(
                RecipeRepository::new(),
                ClientRepository::new(),
                LotRepository::new(),
                ProductRepository::new(),
                ProfileRepository::new(),
            )
        }

        fn payload(client_id: Uuid, lot_ids: Vec<Uuid>, products: Vec<(Uuid, &str)>) -> EmitRecipePayload {
            EmitRecipePayload {
                client_id: Some(client_id),
                lot_ids,
                products: products
                    .into_iter()
                    .map(|(product_id, dose)| RecipeProductInput {
                        product_id,
                        dose_per_ha: Some(fixtures::dec(dose)),
                    })
                    .collect(),
                diagnosis: Some("  Barbecho  ".into()),
                application_type: None,
                comments: Some("   ".into()),
            }
        }

        #[sqlx::test(migrations = "./migrations")]
        async fn emitted_recipe_reloads_with_its_lines(pool: PgPool) {
            let user = fixtures::user(&pool, "juan@agro.com").await;
            ProfileRepository::new()
                .upsert_profile(
                    &pool,
                    user,
                    &UpdateProfileRequest {
                        full_name: Some("Ing. Agr. Juan Pérez".into()),
                        license_number: None,
                        phone: None,
                    },
                )
                .await
                .unwrap();
            let client = fixtures::client(&pool, user, "Juan").await;
            let norte = fixtures::lot(&pool, user, client.id, "Norte", "30.50").await;
            let sur = fixtures::lot(&pool, user, client.id, "Sur", "15").await;
            let glifo = fixtures::product(&pool, user, "Glifosato", "lts").await;
            let metsul = fixtures::product(&pool, user, "Metsulfuron", "grs").await;

            let input = payload(
                client.id,
                vec![norte.id, sur.id, norte.id],
                vec![(glifo.id, "2.5"), (metsul.id, "6.6")],
            );
            let emitted = service().emit_recipe(&pool, user, &input).await.unwrap();

            assert_eq!(emitted.header.technical_advisor, "Ing. Agr. Juan Pérez");
            assert_eq!(emitted.header.status, RecipeStatus::Open);
            assert_eq!(emitted.header.application_type, ApplicationType::Ground);
            assert_eq!(emitted.header.diagnosis.as_deref(), Some("Barbecho"));
            assert_eq!(emitted.header.comments, None);
            assert_eq!(emitted.total_area_ha, fixtures::dec("45.50"));

            let mut conn = pool.acquire().await.unwrap();
            let reloaded = service()
                .get_recipe_detail(&mut *conn, user, emitted.header.id)
                .await
                .unwrap();
            assert_eq!(reloaded.header.recipe_number, emitted.header.recipe_number);
            assert_eq!(reloaded.client.id, client.id);
            assert_eq!(reloaded.lots.len(), 2);
            assert_eq!(reloaded.products.len(), 2);
            assert_eq!(reloaded.products[0].product_id, glifo.id);
            assert_eq!(reloaded.products[0].dose_unit, "lts/ha");
            assert_eq!(reloaded.products[0].total_dose, fixtures::dec("113.75"));
            assert_eq!(reloaded.products[1].total_dose, fixtures::dec("300.3"));
            assert_eq!(reloaded.products[1].total_unit, "grs");
        }

        #[sqlx::test(migrations = "./migrations")]
        async fn preview_computes_without_saving(pool: PgPool) {
            let user = fixtures::user(&pool, "juan@agro.com").await;
            let client = fixtures::client(&pool, user, "Juan").await;
            let lot = fixtures::lot(&pool, user, client.id, "Norte", "12.5").await;
            let product = fixtures::product(&pool, user, "Cletodim", "lts").await;

            let mut conn = pool.acquire().await.unwrap();
            let preview = service()
                .preview_recipe(&mut *conn, user, &payload(client.id, vec![lot.id], vec![(product.id, "0.8")]))
                .await
                .unwrap();
            assert_eq!(preview.lines[0].total_dose, fixtures::dec("10"));

            let saved = RecipeRepository::new().list_recipes(&pool, user, None).await.unwrap();
            assert!(saved.is_empty());
        }

        #[sqlx::test(migrations = "./migrations")]
        async fn archived_product_is_refused_and_nothing_is_written(pool: PgPool) {
            let user = fixtures::user(&pool, "juan@agro.com").await;
            let client = fixtures::client(&pool, user, "Juan").await;
            let lot = fixtures::lot(&pool, user, client.id, "Norte", "10").await;
            let product = fixtures::product(&pool, user, "Atrazina", "kg").await;
            ProductRepository::new().archive_product(&pool, user, product.id).await.unwrap();

            let err = service()
                .emit_recipe(&pool, user, &payload(client.id, vec![lot.id], vec![(product.id, "1")]))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::RecipeDraft(DraftError::ArchivedProduct(id)) if id == product.id));

            let saved = RecipeRepository::new().list_recipes(&pool, user, None).await.unwrap();
            assert!(saved.is_empty());
        }

        #[sqlx::test(migrations = "./migrations")]
        async fn unknown_or_foreign_rows_are_not_found(pool: PgPool) {
            let user = fixtures::user(&pool, "juan@agro.com").await;
            let other = fixtures::user(&pool, "otro@agro.com").await;
            let client = fixtures::client(&pool, user, "Juan").await;
            let lot = fixtures::lot(&pool, user, client.id, "Norte", "10").await;
            let product = fixtures::product(&pool, user, "Glifosato", "lts").await;

            let foreign_client = fixtures::client(&pool, other, "Ajeno").await;
            let foreign_lot = fixtures::lot(&pool, other, foreign_client.id, "Ajeno", "3").await;

            let err = service()
                .emit_recipe(&pool, user, &payload(client.id, vec![foreign_lot.id], vec![(product.id, "1")]))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::ResourceNotFound("lot")));

            let err = service()
                .emit_recipe(&pool, user, &payload(foreign_client.id, vec![lot.id], vec![(product.id, "1")]))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::ResourceNotFound("client")));

            // lote de outro cliente do mesmo assessor
            let sibling = fixtures::client(&pool, user, "Vecino").await;
            let sibling_lot = fixtures::lot(&pool, user, sibling.id, "Vecino", "4").await;
            let err = service()
                .emit_recipe(&pool, user, &payload(client.id, vec![sibling_lot.id], vec![(product.id, "1")]))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::RecipeDraft(DraftError::LotNotOfClient(_))));

            let mut conn = pool.acquire().await.unwrap();
            let err = service()
                .get_recipe_detail(&mut *conn, user, Uuid::new_v4())
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::ResourceNotFound("recipe")));
        }
    }
}
