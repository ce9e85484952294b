// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
};

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn slug() -> &'static str;
}

/// 2. O Extractor (Guardião). Se rejeitar, o handler nem chega a rodar.
pub struct RequirePermission<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let Ok(locale) = Locale::from_request_parts(parts, state).await;

        // A. Usuário (colocado nos extensions pelo auth_guard)
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))?;

        // B. Verifica no Hub
        let required_perm = T::slug();
        let has_permission = app_state
            .permissions
            .user_has_permission(user.id, required_perm)
            .await
            .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

        if !has_permission {
            tracing::warn!(user_id = %user.id, permission = required_perm, "Acesso negado");
            return Err(AppError::PermissionDenied(required_perm.to_string())
                .to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct PermCustomerView;
impl PermissionDef for PermCustomerView {
    fn slug() -> &'static str { "customers.view_customer" }
}

pub struct PermCustomerAdd;
impl PermissionDef for PermCustomerAdd {
    fn slug() -> &'static str { "customers.add_customer" }
}

pub struct PermCustomerChange;
impl PermissionDef for PermCustomerChange {
    fn slug() -> &'static str { "customers.change_customer" }
}

// "delete" no Hub = desativar (soft delete)
pub struct PermCustomerDelete;
impl PermissionDef for PermCustomerDelete {
    fn slug() -> &'static str { "customers.delete_customer" }
}
