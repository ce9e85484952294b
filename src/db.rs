pub mod customer_repo;
pub use customer_repo::{CustomerRepository, PgCustomerRepository};
pub mod history_repo;
pub use history_repo::{InvoiceHistory, PgInvoiceRepository, PgSalesRepository, SalesHistory};
pub mod rbac_repo;
pub use rbac_repo::{PermissionStore, RbacRepository};

pub mod memory;
