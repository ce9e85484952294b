pub mod error;
pub mod i18n;
pub mod pagination;
pub mod tax_id;
