//! HS256 JWT capability check.
//!
//! Tokens are issued elsewhere; this module only verifies them. A valid
//! token has an HS256 header, a signature made with the shared secret, a
//! numeric `userId` claim and, optionally, an `exp` claim in the future.
//!
//! | Condition | Error |
//! |-----------|-------|
//! | no token | `Unauthorized` |
//! | malformed, wrong algorithm, bad signature | `Forbidden` |
//! | expired | `Forbidden` |

use anyhow::{bail, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use article_mirror_core::auth::{Principal, Verifier};
use article_mirror_core::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Deserialize)]
struct Header {
    alg: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claims {
    user_id: i64,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    exp: Option<i64>,
}

/// Verifies HS256-signed bearer tokens against a shared secret.
pub struct JwtVerifier {
    secret: Vec<u8>,
}

impl JwtVerifier {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Read the secret from environment variable `var`.
    pub fn from_env(var: &str) -> Result<Self> {
        match std::env::var(var) {
            Ok(secret) if !secret.is_empty() => Ok(Self::new(secret)),
            _ => bail!("environment variable {} must hold the token signing secret", var),
        }
    }

    fn check(&self, token: &str) -> Result<Principal, String> {
        let mut parts = token.split('.');
        let (header_b64, claims_b64, signature_b64) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(h), Some(c), Some(s), None) => (h, c, s),
                _ => return Err("malformed token".to_string()),
            };

        let header: Header = decode_json(header_b64)?;
        if header.alg != "HS256" {
            return Err(format!("unsupported algorithm {}", header.alg));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| "malformed signature".to_string())?;
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| "invalid signing key".to_string())?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| "invalid signature".to_string())?;

        let claims: Claims = decode_json(claims_b64)?;
        if let Some(exp) = claims.exp {
            if exp <= chrono::Utc::now().timestamp() {
                return Err("token expired".to_string());
            }
        }

        Ok(Principal {
            user_id: claims.user_id,
            email: claims.email,
        })
    }
}

fn decode_json<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| "malformed token segment".to_string())?;
    serde_json::from_slice(&bytes).map_err(|_| "malformed token payload".to_string())
}

impl Verifier for JwtVerifier {
    fn verify(&self, credential: Option<&str>) -> article_mirror_core::Result<Principal> {
        let token = credential.ok_or_else(|| Error::Unauthorized("token missing".to_string()))?;
        self.check(token).map_err(|reason| {
            tracing::debug!(%reason, "token rejected");
            Error::Forbidden(format!("invalid token: {}", reason))
        })
    }
}
