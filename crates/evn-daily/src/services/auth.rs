//! Auth Negotiator
//!
//! Walks login path × payload shape × encoding until a response carries
//! an access token. The portals publish no contract, so a failed
//! combination just means "try the next one".

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::{PayloadShape, RegionProfile};
use crate::domain::{Credential, PipelineError};
use crate::ports::{HttpRequest, HttpTransport, PayloadEncoding, RequestBody};

/// Login search over one domain
pub struct AuthNegotiator {
    transport: Arc<dyn HttpTransport>,
    encodings: Vec<PayloadEncoding>,
    login_timeout: Duration,
}

impl AuthNegotiator {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        encodings: Vec<PayloadEncoding>,
        login_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            encodings,
            login_timeout,
        }
    }

    /// First credential produced by the search, endpoint-major,
    /// payload-minor, encoding-innermost.
    pub async fn authenticate(
        &self,
        domain: &str,
        profile: &RegionProfile,
        username: &str,
        password: &str,
    ) -> Option<Credential> {
        let base = domain.trim_end_matches('/');

        for path in &profile.login_paths {
            let url = format!("{}{}", base, path);
            tracing::info!("🔐 Trying login: {}", url);

            for shape in &profile.payload_shapes {
                for encoding in &self.encodings {
                    match self
                        .attempt(&url, shape, *encoding, username, password, &profile.token_fields)
                        .await
                    {
                        Ok(Some(token)) => {
                            let credential = Credential::new(token, base);
                            tracing::info!(
                                "✅ Logged in via {} ({}, {}) token {}",
                                url,
                                shape.describe(),
                                encoding,
                                credential.redacted()
                            );
                            return Some(credential);
                        }
                        Ok(None) => {}
                        Err(e) => {
                            tracing::debug!(
                                stage = e.stage(),
                                payload = %shape.describe(),
                                %encoding,
                                "⚠️  {}",
                                e
                            );
                        }
                    }
                }
            }
        }

        tracing::warn!("❌ Login rejected on every combination for {}", base);
        None
    }

    /// One (path, payload, encoding) combination.
    ///
    /// `Ok(None)` means the server answered without a usable token.
    async fn attempt(
        &self,
        url: &str,
        shape: &PayloadShape,
        encoding: PayloadEncoding,
        username: &str,
        password: &str,
        token_fields: &[String],
    ) -> Result<Option<String>, PipelineError> {
        let fields = shape.render(username, password);
        let body = match encoding {
            PayloadEncoding::Form => RequestBody::Form(fields),
            PayloadEncoding::Json => RequestBody::Json(Value::Object(
                fields
                    .into_iter()
                    .map(|(name, value)| (name, Value::String(value)))
                    .collect(),
            )),
        };

        let response = self
            .transport
            .send(HttpRequest::post(url, body, self.login_timeout))
            .await
            .map_err(|e| PipelineError::Transport {
                url: url.to_string(),
                message: e.message,
            })?;

        if !response.is_success() {
            return Ok(None);
        }

        let payload = response
            .json()
            .map_err(|e| PipelineError::malformed(url, e))?;

        Ok(extract_token(&payload, token_fields))
    }
}

/// First non-empty string under any recognized token field
pub fn extract_token(payload: &Value, token_fields: &[String]) -> Option<String> {
    token_fields.iter().find_map(|field| {
        payload
            .get(field)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    })
}
