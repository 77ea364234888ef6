use anyhow::Context;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use super::claims::{Claims, TokenKind};
use crate::{config::JwtConfig, error::ApiError, state::AppState};

/// HS256 keys plus the issuer/audience every token is checked against.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[cfg.issuer.as_str()]);
        validation.set_audience(&[cfg.audience.as_str()]);
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            validation,
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            access_ttl: Duration::minutes(cfg.ttl_minutes.max(1)),
            refresh_ttl: Duration::minutes(cfg.refresh_ttl_minutes.max(1)),
        }
    }

    fn sign(&self, user_id: Uuid, kind: TokenKind) -> anyhow::Result<String> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims::new(
            user_id,
            kind,
            &self.issuer,
            &self.audience,
            OffsetDateTime::now_utc(),
            ttl,
        );
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .context("sign jwt")?;
        debug!(%user_id, ?kind, "jwt signed");
        Ok(token)
    }

    pub fn sign_access(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.sign(user_id, TokenKind::Access)
    }

    pub fn sign_refresh(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.sign(user_id, TokenKind::Refresh)
    }

    /// Checks signature, expiry, issuer and audience.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).context("verify jwt")?;
        Ok(data.claims)
    }

    pub fn verify_kind(&self, token: &str, kind: TokenKind) -> anyhow::Result<Claims> {
        let claims = self.verify(token)?;
        anyhow::ensure!(
            claims.kind == kind,
            "expected {kind:?} token, got {:?}",
            claims.kind
        );
        Ok(claims)
    }

    pub fn verify_refresh(&self, token: &str) -> anyhow::Result<Claims> {
        self.verify_kind(token, TokenKind::Refresh)
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::from_config(&state.config.jwt)
    }
}

/// `Authorization: Bearer <token>`, scheme matched case-insensitively.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
        .filter(|t| !t.is_empty())
}

/// Caller identity taken from a verified access token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("Missing or malformed bearer token".into()))?;

        match JwtKeys::from_ref(state).verify_kind(token, TokenKind::Access) {
            Ok(claims) => Ok(AuthUser(claims.sub)),
            Err(e) => {
                warn!(error = %format!("{e:#}"), "rejected bearer token");
                Err(ApiError::Unauthorized("Invalid or expired token".into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn keys(secret: &str, issuer: &str) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: "fitanaliz-users".into(),
            ttl_minutes: 5,
            refresh_ttl_minutes: 60,
        })
    }

    fn parts(header: &str) -> Parts {
        Request::builder()
            .header(AUTHORIZATION, header)
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[test]
    fn access_and_refresh_are_distinguished() {
        let k = keys("dev-secret", "fitanaliz");
        let user = Uuid::new_v4();

        let access = k.sign_access(user).unwrap();
        assert_eq!(k.verify_kind(&access, TokenKind::Access).unwrap().sub, user);
        let err = k.verify_refresh(&access).unwrap_err();
        assert!(err.to_string().contains("expected Refresh token"));

        let refresh = k.sign_refresh(user).unwrap();
        let claims = k.verify_refresh(&refresh).unwrap();
        assert_eq!(claims.kind, TokenKind::Refresh);
        assert_eq!(claims.exp - claims.iat, 60 * 60);
    }

    #[test]
    fn foreign_secret_or_issuer_is_rejected() {
        let token = keys("secret-a", "fitanaliz").sign_access(Uuid::new_v4()).unwrap();
        assert!(keys("secret-b", "fitanaliz").verify(&token).is_err());
        assert!(keys("secret-a", "someone-else").verify(&token).is_err());
    }

    #[test]
    fn bearer_scheme_parsing() {
        assert_eq!(bearer_token(&parts("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&parts("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&parts("Basic abc")), None);
        assert_eq!(bearer_token(&parts("Bearer ")), None);
    }
}
