// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Module ---
        handlers::module::health,
        handlers::module::get_manifest,

        // --- Customers ---
        handlers::customers::list_customers,
        handlers::customers::customer_summary,
        handlers::customers::get_customer,
        handlers::customers::create_customer,
        handlers::customers::update_customer,
        handlers::customers::deactivate_customer,
        handlers::customers::reactivate_customer,
        handlers::customers::refresh_customer_stats,
    ),
    components(
        schemas(
            // --- Customers ---
            models::customer::Customer,
            models::customer::CustomerListItem,
            models::customer::CustomerForm,
            models::customer::StatusCounts,
            models::customer::StatusFilter,
            models::customer::CustomerOrder,

            // --- Histórico (Vendas / Faturamento) ---
            models::history::PurchaseRecord,
            models::history::InvoiceSummary,
            models::history::PurchaseStats,
            models::history::CustomerStats,
            models::history::CustomerDetail,

            // --- Module ---
            models::module::MenuEntry,
            models::module::ModuleManifest,
        )
    ),
    tags(
        (name = "Customers", description = "Cadastro, busca e histórico de clientes"),
        (name = "Module", description = "Integração com o Hub (manifesto e saúde)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_customer_routes_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/customers"));
        assert!(doc.paths.paths.contains_key("/api/customers/{id}/refresh-stats"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
