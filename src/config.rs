// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        ClientRepository, LotRepository, ProductRepository, ProfileRepository, RecipeRepository,
        UserRepository,
    },
    services::{
        auth::AuthService, client_service::ClientService, document_service::DocumentService,
        lot_service::LotService, product_service::ProductService, recipe_service::RecipeService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_FONTS_DIR: &str = "./fonts";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Variáveis de ambiente (com `.env` carregado antes, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub fonts_dir: PathBuf,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: {}", raw))?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            fonts_dir: env::var("FONTS_DIR")
                .unwrap_or_else(|_| DEFAULT_FONTS_DIR.to_string())
                .into(),
            db_max_connections,
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: Arc<I18nStore>,
    pub profile_repo: ProfileRepository,
    pub auth_service: AuthService,
    pub client_service: ClientService,
    pub lot_service: LotService,
    pub product_service: ProductService,
    pub recipe_service: RecipeService,
    pub document_service: DocumentService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::with_pool(db_pool, config)
    }

    /// Monta o gráfico de dependências sobre uma pool já criada.
    pub fn with_pool(db_pool: PgPool, config: &Config) -> anyhow::Result<Self> {
        let i18n_store = Arc::new(I18nStore::load()?);

        let profile_repo = ProfileRepository::new();
        let client_repo = ClientRepository::new();
        let lot_repo = LotRepository::new();
        let product_repo = ProductRepository::new();

        let auth_service = AuthService::new(
            UserRepository::new(db_pool.clone()),
            profile_repo.clone(),
            config.jwt_secret.clone(),
            db_pool.clone(),
        );
        let recipe_service = RecipeService::new(
            RecipeRepository::new(),
            client_repo.clone(),
            lot_repo.clone(),
            product_repo.clone(),
            profile_repo.clone(),
        );

        Ok(Self {
            db_pool,
            i18n_store,
            profile_repo,
            auth_service,
            client_service: ClientService::new(client_repo),
            lot_service: LotService::new(lot_repo),
            product_service: ProductService::new(product_repo),
            recipe_service,
            document_service: DocumentService::new(config.fonts_dir.clone()),
        })
    }
}
