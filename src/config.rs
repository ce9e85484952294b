// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        PermissionStore, PgCustomerRepository, PgInvoiceRepository, PgSalesRepository,
        RbacRepository,
    },
    services::{
        auth::AuthService,
        customer_service::{CustomerService, ServiceLimits},
    },
};

// --- CONFIGURAÇÃO (variáveis de ambiente / .env) ---

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub limits: ServiceLimits,
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).with_context(|| format!("{name} deve ser definida"))
}

fn optional<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} inválida: '{raw}'")),
        Err(_) => Ok(default),
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = ServiceLimits::default();
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: optional("BIND_ADDR", "0.0.0.0:3000".to_string())?,
            db_max_connections: optional("DB_MAX_CONNECTIONS", 5)?,
            limits: ServiceLimits {
                default_page_size: optional("DEFAULT_PAGE_SIZE", defaults.default_page_size)?,
                max_page_size: optional("MAX_PAGE_SIZE", defaults.max_page_size)?,
                recent_purchases: optional("RECENT_PURCHASES_LIMIT", defaults.recent_purchases)?,
            },
        })
    }

    pub async fn connect_pool(&self) -> anyhow::Result<PgPool> {
        let pool = PgPoolOptions::new()
            .max_connections(self.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&self.database_url)
            .await
            .context("Falha ao conectar no banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
        Ok(pool)
    }
}

// --- ESTADO COMPARTILHADO ---

#[derive(Clone)]
pub struct AppState {
    pub customer_service: CustomerService,
    pub auth_service: AuthService,
    pub permissions: Arc<dyn PermissionStore>,
    pub i18n_store: Arc<I18nStore>,
}

impl AppState {
    /// Monta o gráfico de dependências em cima do Postgres.
    pub fn from_pool(pool: PgPool, settings: &Settings) -> anyhow::Result<Self> {
        let customer_service = CustomerService::new(
            Arc::new(PgCustomerRepository::new(pool.clone())),
            Arc::new(PgSalesRepository::new(pool.clone())),
            Arc::new(PgInvoiceRepository::new(pool.clone())),
            settings.limits,
        );

        Self::from_parts(
            customer_service,
            AuthService::new(settings.jwt_secret.clone()),
            Arc::new(RbacRepository::new(pool)),
        )
    }

    pub fn from_parts(
        customer_service: CustomerService,
        auth_service: AuthService,
        permissions: Arc<dyn PermissionStore>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            customer_service,
            auth_service,
            permissions,
            i18n_store: Arc::new(I18nStore::load()?),
        })
    }
}
