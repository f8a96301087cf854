use crate::error::ResolverError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What the identity subsystem learns about a user on first login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: String,
    pub email: String,
    pub refresh_token: String,
}

/// An email address as reported by a profile provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailCandidate {
    pub address: String,
    pub primary: bool,
}

/// Resolves a user profile and a durable credential from an
/// authorization code. Lives beside the worker; the shard pipeline does
/// not call it.
#[async_trait]
pub trait ProfileResolver: Send + Sync {
    async fn resolve_profile(&self, auth_code: &str) -> Result<Profile, ResolverError>;
}

/// The address flagged primary, or an empty string when none is.
pub fn primary_email(candidates: &[EmailCandidate]) -> String {
    candidates
        .iter()
        .find(|c| c.primary)
        .map(|c| c.address.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_email_selection() {
        let candidates = vec![
            EmailCandidate {
                address: "work@example.com".into(),
                primary: false,
            },
            EmailCandidate {
                address: "me@example.com".into(),
                primary: true,
            },
        ];
        assert_eq!(primary_email(&candidates), "me@example.com");
    }

    #[test]
    fn test_primary_email_defaults_to_empty() {
        let candidates = vec![EmailCandidate {
            address: "work@example.com".into(),
            primary: false,
        }];
        assert_eq!(primary_email(&candidates), "");
        assert_eq!(primary_email(&[]), "");
    }
}
