//! Credential - access token issued by a portal login

/// Access token plus the base domain that issued it.
///
/// Lives for a single pipeline run and is passed explicitly between
/// stages. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub domain: String,
}

impl Credential {
    pub fn new(token: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            domain: domain.into(),
        }
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Token prefix safe to print in logs
    pub fn redacted(&self) -> String {
        let prefix: String = self.token.chars().take(6).collect();
        format!("{}…", prefix)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &self.redacted())
            .field("domain", &self.domain)
            .finish()
    }
}
