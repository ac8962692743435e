//! Bearer tokens: HS256 JWTs carrying the user id and username.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use tracing::{info, warn};

use super::AuthError;
use crate::models::auth::TokenClaims;

/// Access token lifetime: 24 hours.
pub const ACCESS_TOKEN_EXPIRY_SECS: i64 = 24 * 60 * 60;

/// Environment variables checked, in order, for the signing secret.
pub const SECRET_ENV_VARS: [&str; 2] = ["JWT_SECRET", "SECRET_KEY"];

const GENERATED_SECRET_LEN: usize = 64;

/// Signing and verification keys derived from one shared secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtKeys").finish_non_exhaustive()
    }
}

impl JwtKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Token for `username`, valid for [`ACCESS_TOKEN_EXPIRY_SECS`].
    pub fn issue(&self, user_id: &str, username: &str) -> Result<String, AuthError> {
        self.issue_at(user_id, username, Utc::now())
    }

    fn issue_at(
        &self,
        user_id: &str,
        username: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = TokenClaims {
            sub: user_id.to_string(),
            username: username.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::seconds(ACCESS_TOKEN_EXPIRY_SECS)).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenError(format!("jwt encode: {e}")))
    }

    /// Claims of a token signed with these keys and not yet expired.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenError("token expired".into()),
                _ => AuthError::TokenError("invalid token".into()),
            })
    }
}

/// The signing secret from the environment, else from the persisted secret
/// file, generating that file on first use.
pub fn resolve_jwt_secret() -> String {
    let from_env = SECRET_ENV_VARS
        .iter()
        .find_map(|name| std::env::var(name).ok().filter(|v| !v.is_empty()));
    match from_env {
        Some(secret) => secret,
        None => load_or_create_secret(&default_secret_path()),
    }
}

/// Read the secret stored at `path`, or generate and store a new one.
///
/// A secret that cannot be written is still returned; tokens then stop
/// verifying after a restart.
pub fn load_or_create_secret(path: &Path) -> String {
    if let Some(existing) = std::fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
    {
        return existing;
    }

    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_SECRET_LEN)
        .map(char::from)
        .collect();
    let written = path
        .parent()
        .map_or(Ok(()), std::fs::create_dir_all)
        .and_then(|()| std::fs::write(path, &secret));
    match written {
        Ok(()) => info!(path = %path.display(), "generated new JWT secret"),
        Err(e) => warn!(error = %e, path = %path.display(), "JWT secret not persisted"),
    }
    secret
}

fn default_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("commupath")
        .join("jwt-secret")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_carries_user() {
        let keys = JwtKeys::from_secret(b"test-secret");
        let claims = keys.verify(&keys.issue("user-1", "alice").unwrap()).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.exp - claims.iat, ACCESS_TOKEN_EXPIRY_SECS);
    }

    #[test]
    fn other_secret_is_rejected() {
        let token = JwtKeys::from_secret(b"test-secret").issue("user-1", "alice").unwrap();
        let err = JwtKeys::from_secret(b"other-secret").verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenError(m) if m == "invalid token"));
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = JwtKeys::from_secret(b"test-secret");
        let issued = Utc::now() - Duration::seconds(ACCESS_TOKEN_EXPIRY_SECS + 60);
        let token = keys.issue_at("user-1", "alice", issued).unwrap();
        let err = keys.verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenError(m) if m == "token expired"));
    }

    #[test]
    fn garbage_is_rejected() {
        let keys = JwtKeys::from_secret(b"test-secret");
        assert!(keys.verify("not.a.jwt").is_err());
    }

    #[test]
    fn generated_secret_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("jwt-secret");
        let first = load_or_create_secret(&path);
        assert_eq!(first.len(), GENERATED_SECRET_LEN);
        assert_eq!(load_or_create_secret(&path), first);

        std::fs::write(&path, "  pinned\n").unwrap();
        assert_eq!(load_or_create_secret(&path), "pinned");
    }
}
