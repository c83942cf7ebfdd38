// src/services/auth.rs

use bcrypt::verify;
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    models::auth::{Claims, Credentials, Session},
};

/// Login de usuário único: o par de credenciais vem da configuração e a
/// senha é guardada só como hash bcrypt.
#[derive(Clone)]
pub struct AuthService {
    username: String,
    password_hash: String,
    jwt_secret: String,
    session_ttl: TimeDelta,
}

impl AuthService {
    pub fn new(
        username: String,
        password_hash: String,
        jwt_secret: String,
        session_ttl: TimeDelta,
    ) -> Self {
        Self {
            username,
            password_hash,
            jwt_secret,
            session_ttl,
        }
    }

    pub async fn login(
        &self,
        credentials: &Credentials,
        now: DateTime<Utc>,
    ) -> Result<Session, AppError> {
        if credentials.username != self.username {
            return Err(AppError::InvalidCredentials);
        }

        let password_clone = credentials.password.clone();
        let password_hash_clone = self.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let session = self.issue_session(now)?;
        tracing::info!(username = %session.username, expires_at = %session.expires_at, "🔑 Sessão iniciada");
        Ok(session)
    }

    fn issue_session(&self, now: DateTime<Utc>) -> Result<Session, AppError> {
        let expires_at = now + self.session_ttl;

        let claims = Claims {
            sub: self.username.clone(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?;

        Ok(Session {
            token,
            username: claims.sub,
            expires_at,
        })
    }

    /// Só olha a expiração; a assinatura já foi checada em `validate_token`.
    pub fn is_valid(&self, session: &Session, now: DateTime<Utc>) -> bool {
        session.is_valid(now)
    }

    /// Confere assinatura e expiração do token e reconstrói a sessão.
    pub fn validate_token(&self, token: &str) -> Result<Session, AppError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::SessionExpired,
            _ => AppError::InvalidToken,
        })?;

        let claims = token_data.claims;
        if claims.sub != self.username {
            return Err(AppError::InvalidToken);
        }

        let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or(AppError::InvalidToken)?;

        Ok(Session {
            token: token.to_string(),
            username: claims.sub,
            expires_at,
        })
    }
}
