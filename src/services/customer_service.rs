// src/services/customer_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, PageRequest},
    },
    db::{CustomerRepository, InvoiceHistory, SalesHistory},
    models::{
        customer::{Customer, CustomerForm, CustomerListItem, CustomerQuery, StatusCounts},
        history::{CustomerDetail, CustomerStats, PurchaseStats},
    },
};

/// Limites da listagem e do detalhe (vêm da configuração).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceLimits {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub recent_purchases: usize,
}

impl Default for ServiceLimits {
    fn default() -> Self {
        Self {
            default_page_size: 25,
            max_page_size: 100,
            recent_purchases: 10,
        }
    }
}

#[derive(Clone)]
pub struct CustomerService {
    repo: Arc<dyn CustomerRepository>,
    sales: Arc<dyn SalesHistory>,
    invoices: Arc<dyn InvoiceHistory>,
    limits: ServiceLimits,
}

impl CustomerService {
    pub fn new(
        repo: Arc<dyn CustomerRepository>,
        sales: Arc<dyn SalesHistory>,
        invoices: Arc<dyn InvoiceHistory>,
        limits: ServiceLimits,
    ) -> Self {
        Self { repo, sales, invoices, limits }
    }

    // =========================================================================
    //  1. ESCRITA
    // =========================================================================

    pub async fn create(&self, form: CustomerForm) -> Result<Customer, AppError> {
        // Valida antes de tocar no banco: formulário inválido não muda nada
        let form = form.normalized();
        form.validate()?;

        let customer = self.repo.create(&form.draft()).await?;
        tracing::info!(customer_id = %customer.id, "Cliente criado");
        Ok(customer)
    }

    pub async fn update(&self, id: Uuid, form: CustomerForm) -> Result<Customer, AppError> {
        let form = form.normalized();
        form.validate()?;

        let customer = self
            .repo
            .update(id, &form.draft(), form.is_active)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        tracing::info!(customer_id = %id, "Cliente atualizado");
        Ok(customer)
    }

    /// Soft delete. Chamar de novo não é erro.
    pub async fn deactivate(&self, id: Uuid) -> Result<Customer, AppError> {
        let customer = self
            .repo
            .set_active(id, false)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        tracing::info!(customer_id = %id, "Cliente desativado");
        Ok(customer)
    }

    pub async fn reactivate(&self, id: Uuid) -> Result<Customer, AppError> {
        let customer = self
            .repo
            .set_active(id, true)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        tracing::info!(customer_id = %id, "Cliente reativado");
        Ok(customer)
    }

    /// Recalcula os contadores desnormalizados a partir das vendas.
    pub async fn refresh_stats(&self, id: Uuid) -> Result<Customer, AppError> {
        let purchases = self.sales.completed_purchases(id).await?;
        let stats = PurchaseStats::fold(&purchases);

        let customer = self
            .repo
            .save_stats(id, &stats)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        tracing::info!(
            customer_id = %id,
            purchases = stats.purchase_count,
            total_spent = %stats.total_spent,
            "Estatísticas do cliente atualizadas"
        );
        Ok(customer)
    }

    // =========================================================================
    //  2. LEITURA
    // =========================================================================

    pub async fn get(&self, id: Uuid) -> Result<Customer, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::CustomerNotFound)
    }

    pub async fn list(&self, query: &CustomerQuery) -> Result<Page<CustomerListItem>, AppError> {
        let page = PageRequest::new(
            query.page,
            query.page_size,
            self.limits.default_page_size,
            self.limits.max_page_size,
        );

        let customers = self.repo.list(&query.filter(), page).await?;
        Ok(customers.map(CustomerListItem::from))
    }

    pub async fn summary(&self) -> Result<StatusCounts, AppError> {
        self.repo.count_by_status().await
    }

    /// Perfil + histórico + estatísticas, sempre recalculadas na hora.
    pub async fn detail(&self, id: Uuid) -> Result<CustomerDetail, AppError> {
        let customer = self.get(id).await?;

        let (purchases, invoices) = tokio::try_join!(
            self.sales.completed_purchases(id),
            self.invoices.invoices_for(id),
        )?;

        let stats = CustomerStats::compute(&purchases, &invoices);
        let recent_purchases = purchases
            .into_iter()
            .take(self.limits.recent_purchases)
            .collect();

        Ok(CustomerDetail {
            customer,
            recent_purchases,
            invoices,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    use crate::{
        db::memory::{InMemoryCustomerRepository, InMemoryInvoiceHistory, InMemorySalesHistory},
        models::{
            customer::StatusFilter,
            history::{InvoiceSummary, PurchaseRecord},
        },
    };

    struct Fixture {
        service: CustomerService,
        repo: Arc<InMemoryCustomerRepository>,
        sales: Arc<InMemorySalesHistory>,
        invoices: Arc<InMemoryInvoiceHistory>,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(InMemoryCustomerRepository::new());
        let sales = Arc::new(InMemorySalesHistory::new());
        let invoices = Arc::new(InMemoryInvoiceHistory::new());
        let service = CustomerService::new(
            repo.clone(),
            sales.clone(),
            invoices.clone(),
            ServiceLimits { recent_purchases: 2, ..Default::default() },
        );
        Fixture { service, repo, sales, invoices }
    }

    fn form(name: &str) -> CustomerForm {
        CustomerForm { name: name.into(), ..Default::default() }
    }

    fn money(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn sale(customer_id: Uuid, total: &str, days_ago: i64, status: &str) -> PurchaseRecord {
        PurchaseRecord {
            id: Uuid::new_v4(),
            customer_id,
            number: None,
            total: money(total),
            status: status.into(),
            created_at: Utc::now() - Duration::days(days_ago),
        }
    }

    fn all_statuses() -> CustomerQuery {
        CustomerQuery { status: Some(StatusFilter::All), ..Default::default() }
    }

    #[tokio::test]
    async fn create_then_get_returns_the_same_fields() {
        let fx = fixture();
        let created = fx
            .service
            .create(CustomerForm {
                name: "John Doe".into(),
                email: Some("john@example.com".into()),
                phone: Some("+34600123456".into()),
                tax_id: Some("12345678z".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let found = fx.service.get(created.id).await.unwrap();
        assert_eq!(found, created);
        assert_eq!(found.tax_id.as_deref(), Some("12345678Z"));
        assert!(found.is_active);
    }

    #[tokio::test]
    async fn invalid_forms_never_reach_the_store() {
        let fx = fixture();

        let missing_name = fx.service.create(form("   ")).await;
        assert!(matches!(missing_name, Err(AppError::ValidationError(_))));

        let bad_tax_id = CustomerForm { tax_id: Some("12345678A".into()), ..form("Bad") };
        assert!(matches!(fx.service.create(bad_tax_id).await, Err(AppError::ValidationError(_))));

        let unknown_country = CustomerForm { tax_id: Some("ZZ12".into()), ..form("Bad") };
        assert!(matches!(fx.service.create(unknown_country).await, Err(AppError::ValidationError(_))));

        assert!(fx.repo.is_empty());
    }

    #[tokio::test]
    async fn invalid_edit_keeps_the_stored_customer() {
        let fx = fixture();
        let original = fx.service.create(form("Acme")).await.unwrap();

        let edit = CustomerForm { email: Some("not-an-email".into()), ..form("Acme 2") };
        let result = fx.service.update(original.id, edit).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));

        assert_eq!(fx.service.get(original.id).await.unwrap(), original);
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found() {
        let fx = fixture();
        fx.service.create(form("Existing")).await.unwrap();

        let result = fx.service.update(Uuid::new_v4(), form("Ghost")).await;
        assert!(matches!(result, Err(AppError::CustomerNotFound)));
        assert_eq!(fx.repo.len(), 1);
    }

    #[tokio::test]
    async fn update_keeps_status_unless_supplied() {
        let fx = fixture();
        let c = fx.service.create(form("Acme")).await.unwrap();

        let edited = fx.service.update(c.id, form("Acme Corp")).await.unwrap();
        assert_eq!(edited.name, "Acme Corp");
        assert!(edited.is_active);

        let disabled = fx
            .service
            .update(c.id, CustomerForm { is_active: Some(false), ..form("Acme Corp") })
            .await
            .unwrap();
        assert!(!disabled.is_active);
    }

    #[tokio::test]
    async fn deactivate_is_idempotent() {
        let fx = fixture();
        let c = fx.service.create(form("Acme")).await.unwrap();

        let once = fx.service.deactivate(c.id).await.unwrap();
        let twice = fx.service.deactivate(c.id).await.unwrap();
        assert!(!once.is_active);
        assert_eq!(once, twice);

        assert!(matches!(
            fx.service.deactivate(Uuid::new_v4()).await,
            Err(AppError::CustomerNotFound)
        ));
    }

    #[tokio::test]
    async fn acme_lifecycle() {
        let fx = fixture();
        let acme = fx
            .service
            .create(CustomerForm { tax_id: Some("B12345678".into()), ..form("Acme Corp") })
            .await
            .unwrap();
        assert!(acme.is_active);

        let acme = fx.service.deactivate(acme.id).await.unwrap();
        assert!(!acme.is_active);

        let default_list = fx.service.list(&CustomerQuery::default()).await.unwrap();
        assert!(default_list.items.iter().all(|item| item.customer.id != acme.id));

        let full_list = fx.service.list(&all_statuses()).await.unwrap();
        assert!(full_list.items.iter().any(|item| item.customer.id == acme.id));

        let summary = fx.service.summary().await.unwrap();
        assert_eq!(summary, StatusCounts { active: 0, inactive: 1 });

        let acme = fx.service.reactivate(acme.id).await.unwrap();
        assert!(acme.is_active);
    }

    #[tokio::test]
    async fn list_caps_the_page_size() {
        let fx = fixture();
        fx.service.create(form("Only")).await.unwrap();

        let page = fx
            .service
            .list(&CustomerQuery { page_size: Some(10_000), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(page.page_size, 100);
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn detail_folds_history_and_trims_recent_purchases() {
        let fx = fixture();
        let c = fx.service.create(form("Regular")).await.unwrap();

        fx.sales.record(sale(c.id, "10.00", 3, "completed"));
        fx.sales.record(sale(c.id, "20.00", 2, "completed"));
        fx.sales.record(sale(c.id, "30.00", 1, "completed"));
        fx.sales.record(sale(c.id, "999.00", 0, "cancelled"));
        fx.sales.record(sale(Uuid::new_v4(), "50.00", 0, "completed"));
        fx.invoices.record(InvoiceSummary {
            id: Uuid::new_v4(),
            customer_id: c.id,
            number: Some("F-1".into()),
            total: money("72.60"),
            status: "issued".into(),
            issued_at: Utc::now(),
        });

        let detail = fx.service.detail(c.id).await.unwrap();

        assert_eq!(detail.recent_purchases.len(), 2);
        assert_eq!(detail.recent_purchases[0].total, money("30.00"));
        assert_eq!(detail.stats.purchases.purchase_count, 3);
        assert_eq!(detail.stats.purchases.total_spent, money("60.00"));
        assert_eq!(detail.stats.purchases.average_purchase, money("20.00"));
        assert_eq!(detail.stats.invoice_count, 1);
        assert_eq!(detail.invoices.len(), 1);
    }

    #[tokio::test]
    async fn detail_without_history_is_empty_not_an_error() {
        let fx = fixture();
        let c = fx.service.create(form("New")).await.unwrap();

        let detail = fx.service.detail(c.id).await.unwrap();
        assert!(detail.recent_purchases.is_empty());
        assert!(detail.invoices.is_empty());
        assert_eq!(detail.stats.purchases, PurchaseStats::default());

        assert!(matches!(
            fx.service.detail(Uuid::new_v4()).await,
            Err(AppError::CustomerNotFound)
        ));
    }

    #[tokio::test]
    async fn refresh_stats_persists_counters() {
        let fx = fixture();
        let c = fx.service.create(form("Regular")).await.unwrap();
        for total in ["10.00", "20.00", "30.00", "40.00"] {
            fx.sales.record(sale(c.id, total, 1, "completed"));
        }

        let refreshed = fx.service.refresh_stats(c.id).await.unwrap();
        assert_eq!(refreshed.total_spent, money("100.00"));
        assert_eq!(refreshed.visit_count, 4);
        assert_eq!(refreshed.average_purchase(), money("25.00"));
        assert!(refreshed.last_purchase_at.is_some());

        let listed = fx.service.list(&CustomerQuery::default()).await.unwrap();
        assert_eq!(listed.items[0].average_purchase, money("25.00"));
    }

    #[tokio::test]
    async fn refresh_stats_of_unknown_id_is_not_found() {
        let fx = fixture();
        fx.service.create(form("Existing")).await.unwrap();

        let ghost = Uuid::new_v4();
        fx.sales.record(sale(ghost, "10.00", 1, "completed"));

        assert!(matches!(
            fx.service.refresh_stats(ghost).await,
            Err(AppError::CustomerNotFound)
        ));
        assert_eq!(fx.repo.len(), 1);
    }
}
