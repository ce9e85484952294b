// src/db/customer_repo.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, PageRequest},
        tax_id,
    },
    models::{
        customer::{Customer, CustomerDraft, CustomerFilter, CustomerOrder, StatusCounts},
        history::PurchaseStats,
    },
};

/// O "store" de clientes. Nunca apaga linhas: desativar = `is_active = false`.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn create(&self, draft: &CustomerDraft) -> Result<Customer, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, AppError>;

    /// Substitui os campos editáveis. `is_active = None` mantém o status.
    /// `Ok(None)` = id não existe (nada foi alterado).
    async fn update(
        &self,
        id: Uuid,
        draft: &CustomerDraft,
        is_active: Option<bool>,
    ) -> Result<Option<Customer>, AppError>;

    /// Idempotente: se já estiver no status pedido, não mexe no `updated_at`.
    async fn set_active(&self, id: Uuid, active: bool) -> Result<Option<Customer>, AppError>;

    async fn save_stats(&self, id: Uuid, stats: &PurchaseStats) -> Result<Option<Customer>, AppError>;

    async fn list(&self, filter: &CustomerFilter, page: PageRequest) -> Result<Page<Customer>, AppError>;

    async fn count_by_status(&self) -> Result<StatusCounts, AppError>;
}

// =========================================================================
//  POSTGRES
// =========================================================================

const COLUMNS: &str = r#"
    id, name, email, phone, address, tax_id, notes,
    total_spent, visit_count, last_purchase_at,
    is_active, created_at, updated_at
"#;

// $1 status | $2 busca livre | $3 prefixo do nome | $4 prefixo do documento
// $5 busca livre normalizada para o documento
const FILTER_CLAUSE: &str = r#"
    WHERE ($1::boolean IS NULL OR is_active = $1)
      AND (
        $2::text IS NULL
        OR name ILIKE $2
        OR phone ILIKE $2
        OR email ILIKE $2
        OR tax_id ILIKE $2
        OR tax_id LIKE $5::text
        OR address ILIKE $2
      )
      AND ($3::text IS NULL OR name ILIKE $3)
      AND ($4::text IS NULL OR tax_id LIKE $4)
"#;

// Escapa os curingas do LIKE que vierem do usuário
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn order_clause(order: CustomerOrder) -> &'static str {
    match order {
        CustomerOrder::Newest => "ORDER BY created_at DESC, id DESC",
        CustomerOrder::Name => "ORDER BY lower(name) ASC, created_at DESC",
    }
}

// Os parâmetros do FILTER_CLAUSE, já no formato do LIKE
struct FilterParams {
    status: Option<bool>,
    search: Option<String>,
    search_tax_id: Option<String>,
    name_prefix: Option<String>,
    tax_id_prefix: Option<String>,
}

impl From<&CustomerFilter> for FilterParams {
    fn from(filter: &CustomerFilter) -> Self {
        Self {
            status: filter.status.as_flag(),
            search: filter.search.as_deref().map(|s| format!("%{}%", escape_like(s))),
            search_tax_id: filter
                .search
                .as_deref()
                .map(tax_id::normalize)
                .filter(|s| !s.is_empty())
                .map(|s| format!("%{}%", escape_like(&s))),
            name_prefix: filter.name_prefix.as_deref().map(|s| format!("{}%", escape_like(s))),
            tax_id_prefix: filter.tax_id_prefix.as_deref().map(|s| format!("{}%", escape_like(s))),
        }
    }
}

#[derive(Clone)]
pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerRepository for PgCustomerRepository {
    async fn create(&self, draft: &CustomerDraft) -> Result<Customer, AppError> {
        let new = Customer::from_draft(draft, Utc::now());

        let query = format!(
            r#"
            INSERT INTO customers (
                id, name, email, phone, address, tax_id, notes,
                total_spent, visit_count, last_purchase_at,
                is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {COLUMNS}
            "#
        );

        let customer = sqlx::query_as::<_, Customer>(&query)
            .bind(new.id)
            .bind(&new.name)
            .bind(&new.email)
            .bind(&new.phone)
            .bind(&new.address)
            .bind(&new.tax_id)
            .bind(&new.notes)
            .bind(new.total_spent)
            .bind(new.visit_count)
            .bind(new.last_purchase_at)
            .bind(new.is_active)
            .bind(new.created_at)
            .bind(new.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(customer)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, AppError> {
        let query = format!("SELECT {COLUMNS} FROM customers WHERE id = $1");

        let customer = sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    async fn update(
        &self,
        id: Uuid,
        draft: &CustomerDraft,
        is_active: Option<bool>,
    ) -> Result<Option<Customer>, AppError> {
        let query = format!(
            r#"
            UPDATE customers
            SET name = $2, email = $3, phone = $4, address = $5,
                tax_id = $6, notes = $7,
                is_active = COALESCE($8, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );

        let customer = sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .bind(&draft.name)
            .bind(&draft.email)
            .bind(&draft.phone)
            .bind(&draft.address)
            .bind(&draft.tax_id)
            .bind(&draft.notes)
            .bind(is_active)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<Option<Customer>, AppError> {
        let query = format!(
            r#"
            UPDATE customers
            SET updated_at = CASE WHEN is_active = $2 THEN updated_at ELSE NOW() END,
                is_active = $2
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );

        let customer = sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .bind(active)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    async fn save_stats(&self, id: Uuid, stats: &PurchaseStats) -> Result<Option<Customer>, AppError> {
        let query = format!(
            r#"
            UPDATE customers
            SET total_spent = $2, visit_count = $3, last_purchase_at = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );

        let customer = sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .bind(stats.total_spent)
            .bind(stats.purchase_count)
            .bind(stats.last_purchase_at)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    async fn list(&self, filter: &CustomerFilter, page: PageRequest) -> Result<Page<Customer>, AppError> {
        let params = FilterParams::from(filter);

        let count_query = format!("SELECT COUNT(*) FROM customers {FILTER_CLAUSE}");
        let total = sqlx::query_scalar::<_, i64>(&count_query)
            .bind(params.status)
            .bind(&params.search)
            .bind(&params.name_prefix)
            .bind(&params.tax_id_prefix)
            .bind(&params.search_tax_id)
            .fetch_one(&self.pool)
            .await?;

        let list_query = format!(
            "SELECT {COLUMNS} FROM customers {FILTER_CLAUSE} {} LIMIT $6 OFFSET $7",
            order_clause(filter.order)
        );
        let items = sqlx::query_as::<_, Customer>(&list_query)
            .bind(params.status)
            .bind(&params.search)
            .bind(&params.name_prefix)
            .bind(&params.tax_id_prefix)
            .bind(&params.search_tax_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(items, total, page))
    }

    async fn count_by_status(&self) -> Result<StatusCounts, AppError> {
        let (active, inactive) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE is_active),
                COUNT(*) FILTER (WHERE NOT is_active)
            FROM customers
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(StatusCounts { active, inactive })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::customer::StatusFilter;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("acme"), "acme");
    }

    #[test]
    fn filter_params_wrap_patterns() {
        let filter = CustomerFilter {
            search: Some("acme".into()),
            name_prefix: Some("Ac".into()),
            tax_id_prefix: Some("B12".into()),
            status: StatusFilter::Inactive,
            ..Default::default()
        };
        let params = FilterParams::from(&filter);

        assert_eq!(params.status, Some(false));
        assert_eq!(params.search.as_deref(), Some("%acme%"));
        assert_eq!(params.search_tax_id.as_deref(), Some("%ACME%"));
        assert_eq!(params.name_prefix.as_deref(), Some("Ac%"));
        assert_eq!(params.tax_id_prefix.as_deref(), Some("B12%"));
    }

    #[test]
    fn search_is_normalized_for_the_tax_id_column() {
        let filter = CustomerFilter { search: Some("b-123.45".into()), ..Default::default() };
        let params = FilterParams::from(&filter);
        assert_eq!(params.search.as_deref(), Some("%b-123.45%"));
        assert_eq!(params.search_tax_id.as_deref(), Some("%B12345%"));

        let only_separators = CustomerFilter { search: Some(" - ".into()), ..Default::default() };
        assert_eq!(FilterParams::from(&only_separators).search_tax_id, None);
    }

    #[test]
    fn status_all_does_not_bind_a_flag() {
        let params = FilterParams::from(&CustomerFilter::include_inactive());
        assert_eq!(params.status, None);
        assert!(params.search.is_none());
    }
}
