pub mod customers;
pub mod module;
