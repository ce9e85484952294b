// src/handlers/module.rs
//
// Rotas de integração com o Hub (manifesto, saúde e documentação).

use axum::{extract::State, response::IntoResponse, Json};
use utoipa::OpenApi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::module::ModuleManifest,
};

// GET /api/modules/customers
#[utoipa::path(
    get,
    path = "/api/modules/customers",
    tag = "Module",
    responses(
        (status = 200, description = "Manifesto do módulo e item de menu", body = ModuleManifest),
        (status = 401, description = "Token ausente ou inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_manifest(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> impl IntoResponse {
    let label = app_state.i18n_store.translate(&locale.0, "menu_customers");
    Json(ModuleManifest::new(label))
}

// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Module",
    responses((status = 200, description = "Serviço no ar", body = String))
)]
pub async fn health() -> &'static str {
    "OK"
}

// GET /api/openapi.json
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
