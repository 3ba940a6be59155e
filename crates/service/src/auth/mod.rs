//! Write authorization.
//!
//! The HTTP layer asks an [`Authorizer`] whether a request credential may
//! perform writes; the catalogue and review services never see credentials.

use async_trait::async_trait;

/// Decides whether a presented credential may perform writes.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn is_authorized(&self, credential: Option<&str>) -> bool;
}

/// Single shared secret compared verbatim.
#[derive(Clone, Debug)]
pub struct StaticKeyAuthorizer {
    expected: String,
}

impl StaticKeyAuthorizer {
    pub fn new(expected: impl Into<String>) -> Self {
        Self { expected: expected.into() }
    }
}

#[async_trait]
impl Authorizer for StaticKeyAuthorizer {
    async fn is_authorized(&self, credential: Option<&str>) -> bool {
        matches!(credential, Some(k) if !k.is_empty() && k == self.expected)
    }
}

/// Mask a credential for log output, keeping only its first four characters.
pub fn mask_credential(credential: Option<&str>) -> String {
    match credential {
        None | Some("") => "none".to_string(),
        Some(k) => {
            let head: String = k.chars().take(4).collect();
            format!("{head}***")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_key_matches_exactly() {
        let auth = StaticKeyAuthorizer::new("amana-secret-2025");
        assert!(auth.is_authorized(Some("amana-secret-2025")).await);
        assert!(!auth.is_authorized(Some("amana-secret-2024")).await);
        assert!(!auth.is_authorized(Some("")).await);
        assert!(!auth.is_authorized(None).await);
    }

    #[test]
    fn masking_hides_the_tail() {
        assert_eq!(mask_credential(None), "none");
        assert_eq!(mask_credential(Some("amana-secret")), "aman***");
        assert_eq!(mask_credential(Some("ab")), "ab***");
    }
}
