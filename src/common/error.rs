// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Erros internos do domínio. Nunca chegam "crus" ao cliente:
// passam por `to_api_error` para virar uma resposta traduzida.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Parâmetros de busca inválidos: {0}")]
    InvalidQuery(String),

    #[error("Corpo da requisição inválido: {0}")]
    InvalidPayload(String),

    #[error("Cliente não encontrado")]
    CustomerNotFound,

    #[error("Permissão ausente: {0}")]
    PermissionDenied(String),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O que efetivamente vai para o cliente (já traduzido).
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn to_api_error(self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();

        match self {
            // Devolve TODOS os campos inválidos, com as mensagens traduzidas.
            // As mensagens do validator são chaves do catálogo ("required", "invalid_email"...)
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| {
                            let key = e.message.as_deref().unwrap_or(e.code.as_ref());
                            i18n.translate(lang, key)
                        })
                        .collect();
                    details.insert(to_camel_case(&field), messages);
                }
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: i18n.translate(lang, "validation_failed"),
                    details: Some(json!(details)),
                }
            }
            AppError::InvalidQuery(reason) => {
                tracing::debug!(%reason, "Query string rejeitada");
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: i18n.translate(lang, "invalid_query"),
                    details: None,
                }
            }
            AppError::InvalidPayload(reason) => {
                tracing::debug!(%reason, "Corpo JSON rejeitado");
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: i18n.translate(lang, "invalid_payload"),
                    details: None,
                }
            }
            AppError::CustomerNotFound => ApiError {
                status: StatusCode::NOT_FOUND,
                error: i18n.translate(lang, "customer_not_found"),
                details: None,
            },
            AppError::PermissionDenied(slug) => ApiError {
                status: StatusCode::FORBIDDEN,
                error: i18n.translate_with(lang, "permission_denied", &[("permission", &slug)]),
                details: None,
            },
            AppError::InvalidToken | AppError::JwtError(_) => ApiError {
                status: StatusCode::UNAUTHORIZED,
                error: i18n.translate(lang, "invalid_token"),
                details: None,
            },

            // Banco e erros inesperados viram 500. O detalhe fica só no log.
            ref e => {
                tracing::error!(error = %e, "Erro Interno do Servidor");
                ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error: i18n.translate(lang, "internal_error"),
                    details: None,
                }
            }
        }
    }
}

// "tax_id" -> "taxId", para casar com o JSON que o frontend envia.
fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for ch in field.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}
