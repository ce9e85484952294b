// src/models/history.rs
//
// Dados lidos dos módulos vizinhos (Vendas e Faturamento).
// Este módulo só LÊ: o schema dessas tabelas não é nosso.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::customer::{average, Customer};

// Uma venda concluída (tabela `sales` do módulo de Vendas)
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    pub id: Uuid,
    pub customer_id: Uuid,
    #[schema(example = "V-2024-0042")]
    pub number: Option<String>,
    pub total: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

// Uma fatura vinculada ao cliente (tabela `invoices` do Faturamento)
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummary {
    pub id: Uuid,
    pub customer_id: Uuid,
    #[schema(example = "F-2024-0007")]
    pub number: Option<String>,
    pub total: Decimal,
    pub status: String,
    pub issued_at: DateTime<Utc>,
}

// --- AGREGADOS ---

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseStats {
    pub total_spent: Decimal,
    pub purchase_count: i32,
    pub average_purchase: Decimal,
    pub last_purchase_at: Option<DateTime<Utc>>,
}

impl Default for PurchaseStats {
    fn default() -> Self {
        Self {
            total_spent: Decimal::ZERO,
            purchase_count: 0,
            average_purchase: Decimal::ZERO,
            last_purchase_at: None,
        }
    }
}

impl PurchaseStats {
    /// Dobra a sequência de compras. A ordem de entrada não importa.
    pub fn fold<'a>(purchases: impl IntoIterator<Item = &'a PurchaseRecord>) -> Self {
        let mut stats = purchases.into_iter().fold(Self::default(), |mut acc, p| {
            acc.total_spent += p.total;
            acc.purchase_count += 1;
            acc.last_purchase_at = acc.last_purchase_at.max(Some(p.created_at));
            acc
        });
        stats.average_purchase = average(stats.total_spent, stats.purchase_count);
        stats
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStats {
    #[serde(flatten)]
    pub purchases: PurchaseStats,
    pub invoice_count: i32,
    pub invoiced_total: Decimal,
}

impl CustomerStats {
    pub fn compute(purchases: &[PurchaseRecord], invoices: &[InvoiceSummary]) -> Self {
        let (invoice_count, invoiced_total) = invoices
            .iter()
            .fold((0, Decimal::ZERO), |(count, total), inv| (count + 1, total + inv.total));

        Self {
            purchases: PurchaseStats::fold(purchases),
            invoice_count,
            invoiced_total,
        }
    }
}

/// Tela de detalhe: perfil + histórico + estatísticas.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetail {
    pub customer: Customer,
    pub recent_purchases: Vec<PurchaseRecord>,
    pub invoices: Vec<InvoiceSummary>,
    pub stats: CustomerStats,
}
