//! Reference-card generation backed by a hosted completion endpoint.
//!
//! Earlier prototypes of this feature evaluated model-generated component
//! code at runtime. That approach is a code-injection surface and is not
//! carried here: the model is asked for a *data-only* card description in a
//! restricted JSON schema, and the payload is parsed, never executed.
//! Without a configured API key the feature fails closed and stays disabled.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use parrot_core::secret::SecretStorage;
use parrot_core::{ParrotError, Result};

const COMPLETION_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const SYSTEM_PROMPT: &str = "You are a helpful assistant that describes reference cards. \
Respond with only a JSON object matching this schema, no other text: \
{\"title\": string, \"elements\": [{\"kind\": \"heading\"|\"paragraph\"|\"link\"|\"divider\", \
\"text\"?: string, \"url\"?: string}]}";

/// One element of a generated card, interpreted by trusted rendering code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardElement {
    Heading { text: String },
    Paragraph { text: String },
    Link { text: String, url: String },
    Divider,
}

/// A generated reference card: pure data, no behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSpec {
    pub title: String,
    #[serde(default)]
    pub elements: Vec<CardElement>,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    messages: Vec<RequestMessage<'a>>,
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    n: u32,
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Client for the completion endpoint that produces [`CardSpec`]s.
#[derive(Clone)]
pub struct CardGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

// Manual impl so the credential can never end up in logs or error output.
impl std::fmt::Debug for CardGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardGenerator")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

impl CardGenerator {
    /// Creates a generator with the provided API key.
    ///
    /// An empty key is rejected so a blank credential can never reach the
    /// authorization header.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ParrotError::config(
                "refusing to construct a generator with an empty API key",
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ParrotError::internal(format!("http client: {err}")))?;
        Ok(Self {
            client,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 500,
        })
    }

    /// Loads credentials from secret storage.
    ///
    /// No configured key means the feature is disabled; the error message
    /// says so without touching the credential itself.
    pub fn try_from_secrets(storage: &SecretStorage) -> Result<Self> {
        let secrets = storage.load()?;
        let api_key = secrets.completion_api_key().ok_or_else(|| {
            ParrotError::config("no completion API key configured; card generation is disabled")
        })?;
        Self::new(api_key)
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Asks the endpoint for a card matching the description.
    ///
    /// Network faults, non-success statuses, and schema mismatches all
    /// surface as `Generation` errors scoped to this feature.
    pub async fn generate(&self, description: &str) -> Result<CardSpec> {
        let request = ChatCompletionRequest {
            messages: vec![
                RequestMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                RequestMessage {
                    role: "user",
                    content: format!(
                        "Create a reference card based on the following description: {description}"
                    ),
                },
            ],
            model: &self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            n: 1,
        };

        let response = self
            .client
            .post(COMPLETION_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| ParrotError::generation(format!("request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ParrotError::generation(format!(
                "completion endpoint returned {status}"
            )));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| ParrotError::generation(format!("unreadable response: {err}")))?;

        let content = body
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| ParrotError::generation("completion response had no choices"))?;

        parse_card(content)
    }
}

/// Parses model output into the restricted card schema.
///
/// The payload is data, never code: anything that does not deserialize into
/// [`CardSpec`] is rejected.
pub fn parse_card(text: &str) -> Result<CardSpec> {
    let json = strip_code_fences(text);
    serde_json::from_str(json).map_err(|err| {
        ParrotError::generation(format!("generated card did not match the schema: {err}"))
    })
}

/// Strips the Markdown code fence the model sometimes wraps around its JSON.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") up to the first newline.
    let rest = match rest.find('\n') {
        Some(index) => &rest[index + 1..],
        None => rest,
    };
    rest.trim_end()
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_json_passes_through_fence_stripping() {
        assert_eq!(strip_code_fences("{\"title\": \"x\"}"), "{\"title\": \"x\"}");
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let fenced = "```json\n{\"title\": \"x\", \"elements\": []}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"title\": \"x\", \"elements\": []}");

        let plain_fence = "```\n{\"title\": \"y\"}\n```";
        assert_eq!(strip_code_fences(plain_fence), "{\"title\": \"y\"}");
    }

    #[test]
    fn parse_card_accepts_the_restricted_schema() {
        let card = parse_card(
            r#"{
                "title": "Rust",
                "elements": [
                    {"kind": "heading", "text": "Overview"},
                    {"kind": "paragraph", "text": "A systems language."},
                    {"kind": "link", "text": "Home", "url": "https://www.rust-lang.org"},
                    {"kind": "divider"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(card.title, "Rust");
        assert_eq!(card.elements.len(), 4);
        assert_eq!(
            card.elements[3],
            CardElement::Divider,
        );
    }

    #[test]
    fn anything_outside_the_schema_is_rejected() {
        // Executable-looking content never gets past the parser.
        let err = parse_card("() => { alert('x') }").unwrap_err();
        assert!(err.is_generation());

        let err = parse_card(r#"{"title": "x", "elements": [{"kind": "script"}]}"#).unwrap_err();
        assert!(err.is_generation());
    }

    #[test]
    fn empty_api_key_fails_closed() {
        assert!(CardGenerator::new("").unwrap_err().is_config());
        assert!(CardGenerator::new("   ").unwrap_err().is_config());
    }

    #[test]
    fn debug_output_never_contains_the_api_key() {
        let generator = CardGenerator::new("sk-very-secret").unwrap();
        let rendered = format!("{generator:?}");
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("gpt-4"));
    }

    #[test]
    fn missing_secret_file_disables_the_feature() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SecretStorage::with_path(dir.path().join("secret.json"));
        let err = CardGenerator::try_from_secrets(&storage).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("disabled"));
    }
}
