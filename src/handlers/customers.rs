// src/handlers/customers.rs

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::{
        error::{ApiError, AppError},
        pagination::Page,
    },
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{
            PermCustomerAdd, PermCustomerChange, PermCustomerDelete, PermCustomerView,
            RequirePermission,
        },
    },
    models::{
        customer::{Customer, CustomerForm, CustomerListItem, CustomerQuery, StatusCounts},
        history::CustomerDetail,
    },
};

// =============================================================================
//  ÁREA 1: LISTAGEM / BUSCA
// =============================================================================

// GET /api/customers
#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "Customers",
    params(CustomerQuery),
    responses(
        (status = 200, description = "Página de clientes", body = Page<CustomerListItem>),
        (status = 400, description = "Parâmetros de busca inválidos"),
        (status = 403, description = "Sem permissão customers.view_customer")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCustomerView>,
    query: Result<Query<CustomerQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {

    let Query(query) = query.map_err(|rejection| {
        AppError::InvalidQuery(rejection.body_text()).to_api_error(&locale, &app_state.i18n_store)
    })?;

    let page = app_state.customer_service
        .list(&query)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(page)))
}

// GET /api/customers/summary
#[utoipa::path(
    get,
    path = "/api/customers/summary",
    tag = "Customers",
    responses(
        (status = 200, description = "Clientes ativos e inativos", body = StatusCounts)
    ),
    security(("api_jwt" = []))
)]
pub async fn customer_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCustomerView>,
) -> Result<impl IntoResponse, ApiError> {

    let counts = app_state.customer_service
        .summary()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(counts)))
}

// =============================================================================
//  ÁREA 2: DETALHE
// =============================================================================

// GET /api/customers/{id}
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Perfil, histórico e estatísticas", body = CustomerDetail),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCustomerView>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {

    let detail = app_state.customer_service
        .detail(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

// =============================================================================
//  ÁREA 3: FORMULÁRIOS (CRIAÇÃO / EDIÇÃO)
// =============================================================================

// POST /api/customers
#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "Customers",
    request_body = CustomerForm,
    responses(
        (status = 201, description = "Cliente criado", body = Customer),
        (status = 400, description = "Dados inválidos (detalhes por campo) ou JSON malformado"),
        (status = 403, description = "Sem permissão customers.add_customer")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCustomerAdd>,
    payload: Result<Json<CustomerForm>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {

    let Json(payload) = payload.map_err(|rejection| {
        AppError::InvalidPayload(rejection.body_text()).to_api_error(&locale, &app_state.i18n_store)
    })?;

    let customer = app_state.customer_service
        .create(payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(customer)))
}

// PUT /api/customers/{id}
#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = CustomerForm,
    responses(
        (status = 200, description = "Cliente atualizado", body = Customer),
        (status = 400, description = "Dados inválidos (detalhes por campo) ou JSON malformado"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCustomerChange>,
    Path(id): Path<Uuid>,
    payload: Result<Json<CustomerForm>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {

    let Json(payload) = payload.map_err(|rejection| {
        AppError::InvalidPayload(rejection.body_text()).to_api_error(&locale, &app_state.i18n_store)
    })?;

    let customer = app_state.customer_service
        .update(id, payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(customer)))
}

// =============================================================================
//  ÁREA 4: STATUS E ESTATÍSTICAS
// =============================================================================

// DELETE /api/customers/{id} (soft delete)
#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente desativado", body = Customer),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn deactivate_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCustomerDelete>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {

    let customer = app_state.customer_service
        .deactivate(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(customer)))
}

// POST /api/customers/{id}/reactivate
#[utoipa::path(
    post,
    path = "/api/customers/{id}/reactivate",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente reativado", body = Customer),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn reactivate_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCustomerChange>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {

    let customer = app_state.customer_service
        .reactivate(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(customer)))
}

// POST /api/customers/{id}/refresh-stats
#[utoipa::path(
    post,
    path = "/api/customers/{id}/refresh-stats",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Contadores recalculados", body = Customer),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn refresh_customer_stats(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCustomerChange>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {

    let customer = app_state.customer_service
        .refresh_stats(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(customer)))
}
