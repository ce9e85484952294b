// src/db/rbac_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;

/// Quem responde "esse usuário pode X?". As tabelas de cargos são do Hub.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    async fn user_has_permission(&self, user_id: Uuid, permission_slug: &str) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct RbacRepository {
    pool: PgPool,
}

impl RbacRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionStore for RbacRepository {
    async fn user_has_permission(&self, user_id: Uuid, permission_slug: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM user_roles ur
                JOIN role_permissions rp ON ur.role_id = rp.role_id
                JOIN permissions p ON rp.permission_id = p.id
                WHERE ur.user_id = $1
                  AND p.slug = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(permission_slug)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
