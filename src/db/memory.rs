// src/db/memory.rs
//
// Implementações em memória dos repositórios. Mesma semântica do Postgres;
// usadas nos testes e para subir o serviço sem banco.

use std::{
    collections::{HashMap, HashSet},
    sync::{PoisonError, RwLock},
};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, PageRequest},
    },
    db::{
        customer_repo::CustomerRepository,
        history_repo::{InvoiceHistory, SalesHistory},
        rbac_repo::PermissionStore,
    },
    models::{
        customer::{Customer, CustomerDraft, CustomerFilter, CustomerOrder, StatusCounts},
        history::{InvoiceSummary, PurchaseRecord, PurchaseStats},
    },
};

// =========================================================================
//  CLIENTES
// =========================================================================

#[derive(Debug, Default)]
pub struct InMemoryCustomerRepository {
    // Ordem de inserção
    rows: RwLock<Vec<Customer>>,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn modify<F>(&self, id: Uuid, f: F) -> Option<Customer>
    where
        F: FnOnce(&mut Customer),
    {
        let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        let row = rows.iter_mut().find(|c| c.id == id)?;
        f(row);
        Some(row.clone())
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn create(&self, draft: &CustomerDraft) -> Result<Customer, AppError> {
        let customer = Customer::from_draft(draft, Utc::now());
        self.rows
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(customer.clone());
        Ok(customer)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, AppError> {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        Ok(rows.iter().find(|c| c.id == id).cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        draft: &CustomerDraft,
        is_active: Option<bool>,
    ) -> Result<Option<Customer>, AppError> {
        Ok(self.modify(id, |c| {
            c.name = draft.name.clone();
            c.email = draft.email.clone();
            c.phone = draft.phone.clone();
            c.address = draft.address.clone();
            c.tax_id = draft.tax_id.clone();
            c.notes = draft.notes.clone();
            if let Some(active) = is_active {
                c.is_active = active;
            }
            c.updated_at = Utc::now();
        }))
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<Option<Customer>, AppError> {
        Ok(self.modify(id, |c| {
            if c.is_active != active {
                c.is_active = active;
                c.updated_at = Utc::now();
            }
        }))
    }

    async fn save_stats(&self, id: Uuid, stats: &PurchaseStats) -> Result<Option<Customer>, AppError> {
        Ok(self.modify(id, |c| {
            c.total_spent = stats.total_spent;
            c.visit_count = stats.purchase_count;
            c.last_purchase_at = stats.last_purchase_at;
            c.updated_at = Utc::now();
        }))
    }

    async fn list(&self, filter: &CustomerFilter, page: PageRequest) -> Result<Page<Customer>, AppError> {
        let mut matching: Vec<Customer> = {
            let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
            // Invertido: em caso de empate no created_at, o mais novo vem primeiro
            rows.iter().rev().filter(|c| filter.matches(c)).cloned().collect()
        };

        match filter.order {
            CustomerOrder::Newest => matching.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            CustomerOrder::Name => matching.sort_by(|a, b| {
                a.name
                    .to_lowercase()
                    .cmp(&b.name.to_lowercase())
                    .then_with(|| b.created_at.cmp(&a.created_at))
            }),
        }

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();

        Ok(Page::new(items, total, page))
    }

    async fn count_by_status(&self) -> Result<StatusCounts, AppError> {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        let active = rows.iter().filter(|c| c.is_active).count() as i64;
        Ok(StatusCounts {
            active,
            inactive: rows.len() as i64 - active,
        })
    }
}

// =========================================================================
//  MÓDULOS VIZINHOS
// =========================================================================

#[derive(Debug, Default)]
pub struct InMemorySalesHistory {
    purchases: RwLock<Vec<PurchaseRecord>>,
}

impl InMemorySalesHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, purchase: PurchaseRecord) {
        self.purchases
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(purchase);
    }
}

#[async_trait]
impl SalesHistory for InMemorySalesHistory {
    async fn completed_purchases(&self, customer_id: Uuid) -> Result<Vec<PurchaseRecord>, AppError> {
        let purchases = self.purchases.read().unwrap_or_else(PoisonError::into_inner);
        let mut found: Vec<PurchaseRecord> = purchases
            .iter()
            .filter(|p| p.customer_id == customer_id && p.status == "completed")
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryInvoiceHistory {
    invoices: RwLock<Vec<InvoiceSummary>>,
}

impl InMemoryInvoiceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, invoice: InvoiceSummary) {
        self.invoices
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(invoice);
    }
}

#[async_trait]
impl InvoiceHistory for InMemoryInvoiceHistory {
    async fn invoices_for(&self, customer_id: Uuid) -> Result<Vec<InvoiceSummary>, AppError> {
        let invoices = self.invoices.read().unwrap_or_else(PoisonError::into_inner);
        let mut found: Vec<InvoiceSummary> = invoices
            .iter()
            .filter(|i| i.customer_id == customer_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.issued_at.cmp(&a.issued_at));
        Ok(found)
    }
}

// =========================================================================
//  PERMISSÕES
// =========================================================================

#[derive(Debug, Default)]
pub struct StaticPermissionStore {
    grants: RwLock<HashMap<Uuid, HashSet<String>>>,
}

impl StaticPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, user_id: Uuid, permission_slug: &str) {
        self.grants
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(user_id)
            .or_default()
            .insert(permission_slug.to_string());
    }
}

#[async_trait]
impl PermissionStore for StaticPermissionStore {
    async fn user_has_permission(&self, user_id: Uuid, permission_slug: &str) -> Result<bool, AppError> {
        let grants = self.grants.read().unwrap_or_else(PoisonError::into_inner);
        Ok(grants
            .get(&user_id)
            .is_some_and(|perms| perms.contains(permission_slug)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::customer::{CustomerForm, StatusFilter};

    fn draft(name: &str) -> CustomerDraft {
        CustomerForm { name: name.into(), ..Default::default() }.draft()
    }

    fn all_pages() -> PageRequest {
        PageRequest::new(None, Some(100), 25, 100)
    }

    #[tokio::test]
    async fn newest_first_by_default() {
        let repo = InMemoryCustomerRepository::new();
        for name in ["First", "Second", "Third"] {
            repo.create(&draft(name)).await.unwrap();
        }

        let page = repo.list(&CustomerFilter::default(), all_pages()).await.unwrap();
        let names: Vec<&str> = page.items.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Third", "Second", "First"]);
    }

    #[tokio::test]
    async fn order_by_name_ignores_case() {
        let repo = InMemoryCustomerRepository::new();
        for name in ["charlie", "Alpha", "bravo"] {
            repo.create(&draft(name)).await.unwrap();
        }

        let filter = CustomerFilter { order: CustomerOrder::Name, ..Default::default() };
        let page = repo.list(&filter, all_pages()).await.unwrap();
        let names: Vec<&str> = page.items.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "bravo", "charlie"]);
    }

    #[tokio::test]
    async fn pagination_reports_total() {
        let repo = InMemoryCustomerRepository::new();
        for i in 0..7 {
            repo.create(&draft(&format!("Customer {i}"))).await.unwrap();
        }

        let page = repo
            .list(&CustomerFilter::default(), PageRequest::new(Some(2), Some(3), 25, 100))
            .await
            .unwrap();
        assert_eq!(page.total, 7);
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.items[0].name, "Customer 3");

        let last = repo
            .list(&CustomerFilter::default(), PageRequest::new(Some(3), Some(3), 25, 100))
            .await
            .unwrap();
        assert_eq!(last.items.len(), 1);
    }

    #[tokio::test]
    async fn set_active_is_idempotent_and_keeps_timestamp() {
        let repo = InMemoryCustomerRepository::new();
        let c = repo.create(&draft("Acme")).await.unwrap();

        let first = repo.set_active(c.id, false).await.unwrap().unwrap();
        let second = repo.set_active(c.id, false).await.unwrap().unwrap();
        assert!(!second.is_active);
        assert_eq!(first.updated_at, second.updated_at);

        let counts = repo.count_by_status().await.unwrap();
        assert_eq!(counts, StatusCounts { active: 0, inactive: 1 });

        let inactive = CustomerFilter { status: StatusFilter::Inactive, ..Default::default() };
        assert_eq!(repo.list(&inactive, all_pages()).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn unknown_ids_return_none() {
        let repo = InMemoryCustomerRepository::new();
        let id = Uuid::new_v4();
        assert!(repo.find_by_id(id).await.unwrap().is_none());
        assert!(repo.set_active(id, false).await.unwrap().is_none());
        assert!(repo.update(id, &draft("x"), None).await.unwrap().is_none());
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn permission_store_grants_per_user() {
        let store = StaticPermissionStore::new();
        let user = Uuid::new_v4();
        store.grant(user, "customers.view_customer");

        assert!(store.user_has_permission(user, "customers.view_customer").await.unwrap());
        assert!(!store.user_has_permission(user, "customers.add_customer").await.unwrap());
        assert!(!store.user_has_permission(Uuid::new_v4(), "customers.view_customer").await.unwrap());
    }
}
