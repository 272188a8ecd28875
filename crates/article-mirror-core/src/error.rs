//! Error taxonomy shared by every adapter and by the controller.
//!
//! The variants map one-to-one onto the failure classes callers react to:
//! input problems and missing records are reported and never retried,
//! capability failures abort before any mutation, and the two backend
//! variants tell canonical failures ([`Error::Store`]) apart from mirror
//! failures ([`Error::Index`]).

use thiserror::Error;

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed input.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    /// No credential was presented.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A credential was presented but rejected.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The primary store is unavailable or rejected the operation.
    #[error("primary store error: {0}")]
    Store(String),

    /// The search index is unavailable or rejected the operation.
    #[error("search index error: {0}")]
    Index(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn article_not_found(id: i64) -> Self {
        Error::NotFound(format!("article {}", id))
    }

    pub fn category_not_found(id: i64) -> Self {
        Error::NotFound(format!("category {}", id))
    }

    /// Stable machine-readable code, used by transports.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "bad_request",
            Error::NotFound(_) => "not_found",
            Error::Unauthorized(_) => "unauthorized",
            Error::Forbidden(_) => "forbidden",
            Error::Store(_) => "store_error",
            Error::Index(_) => "index_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_the_record() {
        assert_eq!(Error::article_not_found(7).to_string(), "article 7 not found");
        assert_eq!(
            Error::category_not_found(3).to_string(),
            "category 3 not found"
        );
    }

    #[test]
    fn test_codes_are_distinct_per_class() {
        let codes = [
            Error::validation("x").code(),
            Error::article_not_found(1).code(),
            Error::Unauthorized("x".into()).code(),
            Error::Forbidden("x".into()).code(),
            Error::Store("x".into()).code(),
            Error::Index("x".into()).code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
