// src/models/customer.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::tax_id::{self, validate_tax_id};

// --- CLIENTE (O Dado) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(example = "Acme Corp")]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,

    // Sempre normalizado (maiúsculas, sem separadores)
    #[schema(example = "B12345678")]
    pub tax_id: Option<String>,
    pub notes: Option<String>,

    // Contadores desnormalizados, atualizados pelo refresh-stats
    pub total_spent: Decimal,
    pub visit_count: i32,
    pub last_purchase_at: Option<DateTime<Utc>>,

    // false = "apagado" (soft delete)
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Cliente novo, ativo e sem compras.
    pub fn from_draft(draft: &CustomerDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: draft.name.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            address: draft.address.clone(),
            tax_id: draft.tax_id.clone(),
            notes: draft.notes.clone(),
            total_spent: Decimal::ZERO,
            visit_count: 0,
            last_purchase_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn average_purchase(&self) -> Decimal {
        average(self.total_spent, self.visit_count)
    }
}

pub(crate) fn average(total: Decimal, count: i32) -> Decimal {
    if count > 0 {
        (total / Decimal::from(count)).round_dp(2)
    } else {
        Decimal::ZERO
    }
}

/// Linha da listagem: o cliente + a média calculada.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerListItem {
    #[serde(flatten)]
    pub customer: Customer,

    #[schema(example = 25.0)]
    pub average_purchase: Decimal,
}

impl From<Customer> for CustomerListItem {
    fn from(customer: Customer) -> Self {
        let average_purchase = customer.average_purchase();
        Self { customer, average_purchase }
    }
}

// Cards do topo da listagem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    #[serde(rename = "totalCustomers")]
    pub active: i64,
    #[serde(rename = "inactiveCustomers")]
    pub inactive: i64,
}

// =========================================================================
//  FORMULÁRIO (criação / edição)
// =========================================================================

fn validate_name(value: &str) -> Result<(), ValidationError> {
    let code = if value.trim().is_empty() {
        "required"
    } else if value.chars().count() > 255 {
        "too_long"
    } else {
        return Ok(());
    };
    let mut err = ValidationError::new(code);
    err.message = Some(code.into());
    Err(err)
}

// `"name": null` vira "" e cai no erro de campo obrigatório
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerForm {
    #[serde(deserialize_with = "null_as_empty")]
    #[validate(custom(function = "validate_name"))]
    #[schema(example = "Acme Corp")]
    pub name: String,

    #[validate(email(message = "invalid_email"), length(max = 254, message = "too_long"))]
    #[schema(example = "contato@acme.es")]
    pub email: Option<String>,

    #[validate(length(max = 20, message = "too_long"))]
    #[schema(example = "+34600123456")]
    pub phone: Option<String>,

    pub address: Option<String>,

    #[validate(length(max = 50, message = "too_long"), custom(function = "validate_tax_id"))]
    #[schema(example = "B12345678")]
    pub tax_id: Option<String>,

    pub notes: Option<String>,

    // Só faz sentido na edição; None = mantém o status atual
    pub is_active: Option<bool>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CustomerForm {
    /// Trim em tudo, vazios viram None e o documento é normalizado.
    /// Tem que rodar ANTES do `validate()`.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: blank_to_none(self.email),
            phone: blank_to_none(self.phone),
            address: blank_to_none(self.address),
            tax_id: blank_to_none(self.tax_id).map(|t| tax_id::normalize(&t)),
            notes: blank_to_none(self.notes),
            is_active: self.is_active,
        }
    }

    pub fn draft(&self) -> CustomerDraft {
        CustomerDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            tax_id: self.tax_id.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Campos editáveis, já validados. É o que chega no repositório.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerDraft {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
    pub notes: Option<String>,
}

// =========================================================================
//  BUSCA / FILTROS
// =========================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    Active,
    Inactive,
    All,
}

impl StatusFilter {
    /// None = não filtra por status
    pub fn as_flag(self) -> Option<bool> {
        match self {
            StatusFilter::Active => Some(true),
            StatusFilter::Inactive => Some(false),
            StatusFilter::All => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CustomerOrder {
    // Mais recentes primeiro
    #[default]
    Newest,
    Name,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerFilter {
    pub search: Option<String>,
    pub name_prefix: Option<String>,
    pub tax_id_prefix: Option<String>,
    pub status: StatusFilter,
    pub order: CustomerOrder,
}

impl CustomerFilter {
    pub fn include_inactive() -> Self {
        Self { status: StatusFilter::All, ..Self::default() }
    }

    /// Confere um cliente contra o filtro (mesma semântica do SQL).
    pub fn matches(&self, customer: &Customer) -> bool {
        if let Some(active) = self.status.as_flag() {
            if customer.is_active != active {
                return false;
            }
        }

        if let Some(prefix) = &self.name_prefix {
            if !customer.name.to_lowercase().starts_with(&prefix.to_lowercase()) {
                return false;
            }
        }

        if let Some(prefix) = &self.tax_id_prefix {
            let matches = customer
                .tax_id
                .as_deref()
                .is_some_and(|t| t.starts_with(prefix.as_str()));
            if !matches {
                return false;
            }
        }

        if let Some(term) = &self.search {
            let lowered = term.to_lowercase();
            let contains = |field: Option<&str>| field.is_some_and(|f| f.to_lowercase().contains(&lowered));
            // O documento é gravado normalizado: "B-12345678" tem que achar "B12345678"
            let tax_term = tax_id::normalize(term);
            let tax_hit = !tax_term.is_empty()
                && customer.tax_id.as_deref().is_some_and(|t| t.contains(tax_term.as_str()));
            let hit = contains(Some(customer.name.as_str()))
                || contains(customer.phone.as_deref())
                || contains(customer.email.as_deref())
                || contains(customer.tax_id.as_deref())
                || tax_hit
                || contains(customer.address.as_deref());
            if !hit {
                return false;
            }
        }

        true
    }
}

// Query string da listagem: ?search=&status=&name=&taxId=&order=&page=&pageSize=
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase", default)]
#[into_params(parameter_in = Query)]
pub struct CustomerQuery {
    /// Texto livre (nome, telefone, e-mail, documento, endereço)
    pub search: Option<String>,
    /// active (padrão) | inactive | all
    pub status: Option<StatusFilter>,
    /// Prefixo do nome
    pub name: Option<String>,
    /// Prefixo do documento fiscal
    pub tax_id: Option<String>,
    /// newest (padrão) | name
    pub order: Option<CustomerOrder>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl CustomerQuery {
    pub fn filter(&self) -> CustomerFilter {
        CustomerFilter {
            search: blank_to_none(self.search.clone()),
            name_prefix: blank_to_none(self.name.clone()),
            tax_id_prefix: blank_to_none(self.tax_id.clone()).map(|t| tax_id::normalize(&t)),
            status: self.status.unwrap_or_default(),
            order: self.order.unwrap_or_default(),
        }
    }
}
