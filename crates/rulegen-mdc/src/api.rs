//! External service clients: web-answer lookup and LLM completion.
//!
//! Both are exposed as narrow traits so the pipeline can be exercised
//! against stubs. The HTTP implementations perform a single attempt;
//! retry and rate limiting are composed around them by the processor.

use serde::{Deserialize, Serialize};

use rulegen_core::http::{ApiError, SHARED_RUNTIME, http_client};

use crate::schema::{self, RuleDoc};

/// One source citation returned by the lookup service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Citation {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Lookup outcome for one query. `Default` doubles as the explicit
/// "no contextual information available" sentinel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookupResult {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

/// Web-search/answer collaborator.
pub trait LookupService: Send + Sync {
    fn best_practices(&self, query: &str) -> Result<LookupResult, ApiError>;
}

/// LLM completion collaborator. Must return a document conforming to
/// the [`RuleDoc`] schema.
pub trait SynthesisService: Send + Sync {
    fn generate_rule(&self, prompt: &str) -> Result<RuleDoc, ApiError>;
}

// === HTTP implementations ===

/// Answer-API client (`POST {base}/answer` with `x-api-key`).
pub struct AnswerApi {
    base_url: String,
    api_key: String,
}

impl AnswerApi {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

impl LookupService for AnswerApi {
    fn best_practices(&self, query: &str) -> Result<LookupResult, ApiError> {
        let url = format!("{}/answer", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({ "query": query, "text": true });

        let result: Result<LookupResult, reqwest::Error> =
            SHARED_RUNTIME.handle().block_on(async {
                let resp = http_client()
                    .post(&url)
                    .header("x-api-key", &self.api_key)
                    .json(&body)
                    .send()
                    .await?
                    .error_for_status()?;
                resp.json().await
            });

        result.map_err(|e| ApiError::from_reqwest(e))
    }
}

/// Chat-completion client (`POST {base}/chat/completions`, bearer auth,
/// JSON response format carrying the rule schema).
pub struct CompletionApi {
    base_url: String,
    api_key: String,
    model: String,
}

impl CompletionApi {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: String,
}

impl SynthesisService for CompletionApi {
    fn generate_rule(&self, prompt: &str) -> Result<RuleDoc, ApiError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "response_format": schema::response_format(),
        });

        let result: Result<CompletionResponse, reqwest::Error> =
            SHARED_RUNTIME.handle().block_on(async {
                let resp = http_client()
                    .post(&url)
                    .bearer_auth(&self.api_key)
                    .json(&body)
                    .send()
                    .await?
                    .error_for_status()?;
                resp.json().await
            });

        let response = result.map_err(|e| ApiError::from_reqwest(e))?;
        parse_rule_content(&response)
    }
}

/// Pull the rule document out of the first completion choice.
fn parse_rule_content(response: &CompletionResponse) -> Result<RuleDoc, ApiError> {
    let content = &response
        .choices
        .first()
        .ok_or_else(|| ApiError::schema("completion returned no choices"))?
        .message
        .content;
    serde_json::from_str(content).map_err(|e| ApiError::schema(format!("invalid rule JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_result_defaults_when_fields_missing() {
        let result: LookupResult = serde_json::from_str("{}").unwrap();
        assert!(result.answer.is_empty());
        assert!(result.citations.is_empty());
    }

    #[test]
    fn lookup_result_parses_citations() {
        let result: LookupResult = serde_json::from_str(
            r#"{"answer": "use hooks", "citations": [{"url": "https://example.com", "text": "t"}]}"#,
        )
        .unwrap();
        assert_eq!(result.answer, "use hooks");
        assert_eq!(result.citations.len(), 1);
        assert_eq!(result.citations[0].text.as_deref(), Some("t"));
    }

    #[test]
    fn parse_rule_content_valid() {
        let response = CompletionResponse {
            choices: vec![CompletionChoice {
                message: CompletionMessage {
                    content: r#"{"name":"n","glob_pattern":"*","description":"d","content":"c"}"#
                        .into(),
                },
            }],
        };
        let doc = parse_rule_content(&response).unwrap();
        assert_eq!(doc.name, "n");
    }

    #[test]
    fn parse_rule_content_empty_choices_is_schema_error() {
        let response = CompletionResponse { choices: vec![] };
        assert!(matches!(
            parse_rule_content(&response),
            Err(ApiError::Schema(_))
        ));
    }

    #[test]
    fn parse_rule_content_malformed_json_is_schema_error() {
        let response = CompletionResponse {
            choices: vec![CompletionChoice {
                message: CompletionMessage {
                    content: "not json".into(),
                },
            }],
        };
        assert!(matches!(
            parse_rule_content(&response),
            Err(ApiError::Schema(_))
        ));
    }
}
