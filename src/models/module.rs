// src/models/module.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::middleware::rbac::{
    PermCustomerAdd, PermCustomerChange, PermCustomerDelete, PermCustomerView, PermissionDef,
};

pub const MODULE_ID: &str = "customers";

// Item de menu que o Hub registra na navegação
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuEntry {
    #[schema(example = "Clientes")]
    pub label: String,
    #[schema(example = "people-outline")]
    pub icon: String,
    #[schema(example = "/customers")]
    pub route: String,
    #[schema(example = "customers.view_customer")]
    pub permission: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleManifest {
    #[schema(example = "customers")]
    pub id: String,
    pub name: String,
    #[schema(example = "0.1.0")]
    pub version: String,
    pub menu: Vec<MenuEntry>,
    pub permissions: Vec<String>,
}

impl ModuleManifest {
    // O rótulo do menu já vem traduzido
    pub fn new(menu_label: String) -> Self {
        Self {
            id: MODULE_ID.to_string(),
            name: "Customer Management".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            menu: vec![MenuEntry {
                label: menu_label,
                icon: "people-outline".to_string(),
                route: "/customers".to_string(),
                permission: PermCustomerView::slug().to_string(),
            }],
            permissions: [
                PermCustomerView::slug(),
                PermCustomerAdd::slug(),
                PermCustomerChange::slug(),
                PermCustomerDelete::slug(),
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}
