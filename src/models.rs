pub mod auth;
pub mod customer;
pub mod history;
pub mod module;
