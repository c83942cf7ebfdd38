// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::board::{mutations::MutationError, state::BoardError};
use crate::models::lead::UnknownStatus;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Sessão expirada")]
    SessionExpired,

    #[error("Lead {0} não encontrado")]
    LeadNotFound(Uuid),

    #[error("Violação de restrição: {0}")]
    ConstraintViolation(String),

    // O banco aceitou o comando mas não devolveu a linha
    #[error("O banco não retornou dados após a operação")]
    EmptyResponse,

    #[error(transparent)]
    CorruptRecord(#[from] UnknownStatus),

    #[error(transparent)]
    Board(#[from] BoardError),

    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken | AppError::SessionExpired => {
                StatusCode::UNAUTHORIZED
            }
            AppError::LeadNotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConstraintViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Board(BoardError::LeadNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Board(BoardError::IndexOutOfBounds { .. }) => StatusCode::BAD_REQUEST,
            AppError::Mutation(MutationError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Mutation(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                })
            }
            AppError::InvalidCredentials => json!({ "error": "Usuário ou senha incorretos." }),
            AppError::InvalidToken => json!({ "error": "Token de autenticação inválido ou ausente." }),
            AppError::SessionExpired => json!({ "error": "Sessão expirada. Faça login novamente." }),

            // Erros de negócio: a mensagem do thiserror já é amigável.
            ref e if status != StatusCode::INTERNAL_SERVER_ERROR => json!({ "error": e.to_string() }),

            // Todo o resto vira 500; o detalhe fica só no log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                json!({ "error": "Ocorreu um erro inesperado." })
            }
        };

        (status, Json(body)).into_response()
    }
}
