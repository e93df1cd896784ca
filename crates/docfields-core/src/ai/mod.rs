//! AI-backed field extraction over a chat-completion endpoint.
//!
//! The client walks a [`ProbePlan`] one target at a time. The first target
//! that answers ends the walk; an authentication failure ends it at once;
//! anything else moves on to the next target.

pub mod probe;
pub mod response;
pub mod transport;

pub use probe::{ProbeAttempt, ProbeOutcome, ProbePlan, ProbeTarget};
pub use response::parse_response;
pub use transport::{ChatRequest, ChatTransport, ReqwestTransport};

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::AiError;
use crate::models::config::AiConfig;
use crate::models::document::ExtractedField;

/// Instructions sent with every request.
pub const SYSTEM_PROMPT: &str = "You extract key fields from business documents such as purchase orders and invoices. \
Respond with a single JSON object and nothing else, using exactly these keys: \
po_number, vendor_name, vendor_address, ship_to_address, order_date, required_date, \
total_amount, subtotal, phone_number, fax_number, ship_via. \
Use null for any field that does not appear in the document. \
Copy values as printed; do not invent or reformat them.";

/// Fields returned by a successful probe.
#[derive(Debug, Clone)]
pub struct AiExtraction {
    pub fields: Vec<ExtractedField>,
    pub deployment: String,
    pub api_version: String,
    pub attempts: Vec<ProbeAttempt>,
}

/// Extracts fields by probing deployments until one answers.
pub struct AiExtractionClient {
    transport: Arc<dyn ChatTransport>,
    plan: ProbePlan,
    max_input_chars: usize,
    temperature: f32,
    max_tokens: u32,
}

impl AiExtractionClient {
    /// Build a client from configuration. Fails when credentials are missing.
    pub fn from_config(config: &AiConfig) -> Result<Self, AiError> {
        let credentials = config.credentials().ok_or(AiError::NotConfigured)?;
        let timeout = Duration::from_secs(config.timeout_secs);
        let transport = ReqwestTransport::new(credentials, timeout)?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    /// Build a client over an arbitrary transport.
    pub fn with_transport(transport: Arc<dyn ChatTransport>, config: &AiConfig) -> Self {
        Self {
            transport,
            plan: ProbePlan::new(config.fixed_target()),
            max_input_chars: config.max_input_chars,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// Extract fields from document text.
    pub async fn extract(&self, text: &str) -> Result<AiExtraction, AiError> {
        if text.trim().is_empty() {
            return Err(AiError::EmptyDocument);
        }

        let user_prompt = self.user_prompt(text);
        let mut attempts = Vec::new();
        let mut last_error = None;

        for target in self.plan.clone() {
            let request = ChatRequest {
                target: target.clone(),
                system_prompt: SYSTEM_PROMPT.to_string(),
                user_prompt: user_prompt.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            };

            debug!("Probing {}", target);
            let result = self
                .transport
                .complete(&request)
                .await
                .and_then(|content| response::parse_response(&content));

            match result {
                Ok(fields) => {
                    attempts.push(ProbeAttempt {
                        target: target.clone(),
                        outcome: ProbeOutcome::Success,
                    });
                    info!(
                        "AI extraction succeeded with {} after {} attempt(s), {} fields",
                        target,
                        attempts.len(),
                        fields.len()
                    );
                    return Ok(AiExtraction {
                        fields,
                        deployment: target.deployment,
                        api_version: target.api_version,
                        attempts,
                    });
                }
                Err(err) if err.is_fatal() => {
                    warn!("Authentication failed for {}: {}", target, err);
                    attempts.push(ProbeAttempt {
                        target: target.clone(),
                        outcome: ProbeOutcome::Fatal(err.to_string()),
                    });
                    let status = match err {
                        AiError::Status { status, .. }
                        | AiError::Authentication { status, .. } => status,
                        _ => 401,
                    };
                    return Err(AiError::Authentication {
                        status,
                        deployment: target.deployment,
                        api_version: target.api_version,
                    });
                }
                Err(err) => {
                    debug!("Probe {} failed: {}", target, err);
                    attempts.push(ProbeAttempt {
                        target,
                        outcome: ProbeOutcome::Retryable(err.to_string()),
                    });
                    last_error = Some(err);
                }
            }
        }

        warn!("All {} AI probe attempts failed", attempts.len());
        Err(AiError::ProbeExhausted {
            attempts: attempts.len(),
            last: Box::new(last_error.unwrap_or(AiError::NotConfigured)),
        })
    }

    fn user_prompt(&self, text: &str) -> String {
        let excerpt: String = text.chars().take(self.max_input_chars).collect();
        format!("Extract the fields from this document:\n\n{excerpt}")
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use pretty_assertions::assert_eq;

    fn configured(fixed: Option<(&str, &str)>) -> AiConfig {
        AiConfig {
            api_key: Some("key".to_string()),
            api_url: Some("https://example.openai.azure.com".to_string()),
            deployment: fixed.map(|(d, _)| d.to_string()),
            api_version: fixed.map(|(_, v)| v.to_string()),
            ..AiConfig::default()
        }
    }

    fn client(transport: &Arc<ScriptedTransport>, config: &AiConfig) -> AiExtractionClient {
        AiExtractionClient::with_transport(transport.clone(), config)
    }

    #[tokio::test]
    async fn test_fixed_target_makes_one_call() {
        let transport = Arc::new(ScriptedTransport::new(vec![status(404)]));
        let config = configured(Some(("my-gpt", "2024-06-01")));

        let err = client(&transport, &config).extract("PO No.: PR028561").await.unwrap_err();

        assert_eq!(transport.call_count(), 1);
        assert_eq!(
            transport.calls.lock().unwrap()[0],
            ProbeTarget::new("my-gpt", "2024-06-01")
        );
        assert!(matches!(err, AiError::ProbeExhausted { attempts: 1, .. }));
    }

    #[tokio::test]
    async fn test_retryable_failures_advance() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            status(404),
            Err(AiError::Timeout),
            Ok(r#"{"po_number": "PR028561"}"#.to_string()),
        ]));
        let config = configured(None);

        let extraction = client(&transport, &config).extract("PO No.: PR028561").await.unwrap();

        assert_eq!(transport.call_count(), 3);
        assert_eq!(extraction.deployment, "gpt-4o");
        assert_eq!(extraction.api_version, "2024-02-15-preview");
        assert_eq!(extraction.attempts.len(), 3);
        assert_eq!(extraction.attempts[2].outcome, ProbeOutcome::Success);
        assert_eq!(extraction.fields[0], ExtractedField::new("PO Number", "PR028561", 0.90));
    }

    #[tokio::test]
    async fn test_unauthorized_stops_probing() {
        let transport = Arc::new(ScriptedTransport::new(vec![status(401)]));
        let config = configured(None);

        let err = client(&transport, &config).extract("PO No.: PR028561").await.unwrap_err();

        assert_eq!(transport.call_count(), 1);
        match err {
            AiError::Authentication {
                status, deployment, ..
            } => {
                assert_eq!(status, 401);
                assert_eq!(deployment, "gpt-4o");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_forbidden_after_retryable_still_stops() {
        let transport = Arc::new(ScriptedTransport::new(vec![status(500), status(403)]));
        let config = configured(None);

        let err = client(&transport, &config).extract("text").await.unwrap_err();

        assert_eq!(transport.call_count(), 2);
        assert!(matches!(err, AiError::Authentication { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_exhaustion_reports_last_error() {
        let transport = Arc::new(ScriptedTransport::new(Vec::new()));
        let config = configured(None);

        let err = client(&transport, &config).extract("text").await.unwrap_err();

        assert_eq!(transport.call_count(), 28);
        match err {
            AiError::ProbeExhausted { attempts, last } => {
                assert_eq!(attempts, 28);
                assert!(matches!(*last, AiError::Timeout));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unparseable_content_is_retryable() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok("Sorry, I cannot help.".to_string()),
            Ok("```json\n{\"vendorName\": \"Acme LLC\"}\n```".to_string()),
        ]));
        let config = configured(None);

        let extraction = client(&transport, &config).extract("text").await.unwrap();
        assert_eq!(transport.call_count(), 2);
        assert_eq!(extraction.fields[0].key, "Vendor Name");
    }

    #[tokio::test]
    async fn test_empty_text_makes_no_calls() {
        let transport = Arc::new(ScriptedTransport::new(Vec::new()));
        let config = configured(None);

        let err = client(&transport, &config).extract("  \n ").await.unwrap_err();

        assert!(matches!(err, AiError::EmptyDocument));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_input_is_truncated() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(
            r#"{"ship_via": "UPS"}"#.to_string(),
        )]));
        let config = AiConfig {
            max_input_chars: 10,
            ..configured(None)
        };

        client(&transport, &config).extract(&"x".repeat(50)).await.unwrap();

        let prompt = transport.prompts.lock().unwrap()[0].clone();
        assert!(prompt.ends_with(&"x".repeat(10)));
        assert!(!prompt.contains(&"x".repeat(11)));
    }

    #[test]
    fn test_missing_credentials() {
        assert!(matches!(
            AiExtractionClient::from_config(&AiConfig::default()),
            Err(AiError::NotConfigured)
        ));
    }
}
