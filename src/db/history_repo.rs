// src/db/history_repo.rs
//
// Leitura (somente!) das tabelas dos módulos de Vendas e Faturamento.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::history::{InvoiceSummary, PurchaseRecord},
};

#[async_trait]
pub trait SalesHistory: Send + Sync {
    /// Vendas concluídas do cliente, mais recentes primeiro.
    async fn completed_purchases(&self, customer_id: Uuid) -> Result<Vec<PurchaseRecord>, AppError>;
}

#[async_trait]
pub trait InvoiceHistory: Send + Sync {
    /// Faturas do cliente, mais recentes primeiro.
    async fn invoices_for(&self, customer_id: Uuid) -> Result<Vec<InvoiceSummary>, AppError>;
}

// 42P01 = undefined_table: o módulo vizinho não está instalado no Hub
fn module_not_installed(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == "42P01")
}

#[derive(Clone)]
pub struct PgSalesRepository {
    pool: PgPool,
}

impl PgSalesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SalesHistory for PgSalesRepository {
    async fn completed_purchases(&self, customer_id: Uuid) -> Result<Vec<PurchaseRecord>, AppError> {
        let result = sqlx::query_as::<_, PurchaseRecord>(
            r#"
            SELECT id, customer_id, number, total, status, created_at
            FROM sales
            WHERE customer_id = $1 AND status = 'completed'
            ORDER BY created_at DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await;

        match result {
            Ok(purchases) => Ok(purchases),
            Err(e) if module_not_installed(&e) => {
                tracing::debug!("Módulo de vendas não instalado; histórico vazio");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Clone)]
pub struct PgInvoiceRepository {
    pool: PgPool,
}

impl PgInvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvoiceHistory for PgInvoiceRepository {
    async fn invoices_for(&self, customer_id: Uuid) -> Result<Vec<InvoiceSummary>, AppError> {
        let result = sqlx::query_as::<_, InvoiceSummary>(
            r#"
            SELECT id, customer_id, number, total, status, issued_at
            FROM invoices
            WHERE customer_id = $1
            ORDER BY issued_at DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await;

        match result {
            Ok(invoices) => Ok(invoices),
            Err(e) if module_not_installed(&e) => {
                tracing::debug!("Módulo de faturamento não instalado; sem faturas");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}
