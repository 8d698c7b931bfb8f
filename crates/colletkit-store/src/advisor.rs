//! Cutting-parameter advisor backed by the Gemini API
//!
//! The advisor asks a language model for RPM, feed, plunge and step-down
//! values for a bit and a target material. Failures never reach the caller:
//! a missing key, an exhausted quota or a malformed answer all produce a
//! conservative fallback suggestion flagged as demo data.

use async_trait::async_trait;
use colletkit_core::Bit;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::traits::ParameterAdvisor;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Low temperature keeps the numbers stable between calls
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

const FALLBACK_WARNING: &str =
    "Configure an API key for the advisor, or wait for the quota to reset.";

/// Suggested cutting parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorSuggestion {
    pub rpm: u32,
    pub feed_rate: f64,
    pub plunge_rate: f64,
    pub step_down: f64,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Set on fallback suggestions
    #[serde(skip)]
    pub demo: bool,
}

impl AdvisorSuggestion {
    /// Conservative values returned whenever the model cannot be used
    pub fn fallback(reason: impl AsRef<str>) -> Self {
        Self {
            rpm: 18000,
            feed_rate: 2500.0,
            plunge_rate: 800.0,
            step_down: 1.5,
            explanation: format!("Demo mode: {}", reason.as_ref()),
            warning: Some(FALLBACK_WARNING.to_string()),
            demo: true,
        }
    }
}

/// Why a model call produced no suggestion
#[derive(Error, Debug)]
pub enum AdvisorError {
    /// No API key configured
    #[error("API key not configured")]
    MissingKey,

    /// HTTP 429 or RESOURCE_EXHAUSTED
    #[error("API quota exceeded. Try again in a few minutes or use a paid key.")]
    QuotaExceeded,

    /// Non-success HTTP status
    #[error("Advisor API error {status}: {body}")]
    Http { status: u16, body: String },

    /// Connection or timeout failure
    #[error("Advisor connection failed: {0}")]
    Transport(String),

    /// Response did not carry a usable suggestion
    #[error("Invalid advisor response: {0}")]
    InvalidResponse(String),
}

/// Advisor calling the Gemini `generateContent` endpoint
#[derive(Debug, Clone)]
pub struct GeminiAdvisor {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    temperature: f32,
}

impl GeminiAdvisor {
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, AdvisorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdvisorError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty() && k != "undefined"),
            model: model.into(),
            temperature,
        })
    }

    /// Read the key from an environment variable
    pub fn from_env(
        env_var: &str,
        model: impl Into<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, AdvisorError> {
        Self::new(std::env::var(env_var).ok(), model, temperature, timeout)
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the model, surfacing every failure
    pub async fn request(&self, bit: &Bit, material: &str) -> Result<AdvisorSuggestion, AdvisorError> {
        let api_key = self.api_key.as_deref().ok_or(AdvisorError::MissingKey)?;
        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, self.model);
        let body = request_body(&build_prompt(bit, material), self.temperature);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AdvisorError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            if status.as_u16() == 429 || body_text.contains("RESOURCE_EXHAUSTED") {
                return Err(AdvisorError::QuotaExceeded);
            }
            return Err(AdvisorError::Http {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| AdvisorError::InvalidResponse(e.to_string()))?;
        parse_gemini_response(&json)
    }
}

#[async_trait]
impl ParameterAdvisor for GeminiAdvisor {
    async fn suggest(&self, bit: &Bit, material: &str) -> AdvisorSuggestion {
        match self.request(bit, material).await {
            Ok(suggestion) => suggestion,
            Err(e) => {
                match e {
                    AdvisorError::MissingKey => tracing::error!("Advisor API key not found"),
                    _ => tracing::error!("Advisor call failed: {}", e),
                }
                AdvisorSuggestion::fallback(e.to_string())
            }
        }
    }
}

/// Prompt describing the bit and the target material
pub fn build_prompt(bit: &Bit, material: &str) -> String {
    let geometry = bit
        .specs
        .geometry
        .as_deref()
        .filter(|g| !g.trim().is_empty())
        .unwrap_or("2 flutes");

    format!(
        "Act as a senior CNC machining specialist.\n\
         Compute precise and safe cutting parameters for the following tool:\n\n\
         BIT SPECIFICATIONS:\n\
         - Name: {}\n\
         - Diameter: {}\n\
         - Material: {}\n\
         - Geometry: {}\n\n\
         TARGET MATERIAL:\n\
         - {}\n\n\
         Assume a medium-precision CNC router. Provide RPM, feed rate (mm/min), \
         plunge rate (mm/min) and step-down (mm).",
        bit.name, bit.diameter, bit.material, geometry, material
    )
}

fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "rpm": { "type": "INTEGER", "description": "Ideal spindle speed" },
            "feedRate": { "type": "INTEGER", "description": "Lateral feed in mm/min" },
            "plungeRate": { "type": "INTEGER", "description": "Plunge feed in mm/min" },
            "stepDown": { "type": "NUMBER", "description": "Maximum depth per pass in mm" },
            "explanation": { "type": "STRING", "description": "Short technical rationale" },
            "warning": { "type": "STRING", "description": "Important safety notice", "nullable": true }
        },
        "required": ["rpm", "feedRate", "plungeRate", "stepDown", "explanation"]
    })
}

fn request_body(prompt: &str, temperature: f32) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema(),
            "temperature": temperature,
            "thinkingConfig": { "thinkingBudget": 0 }
        }
    })
}

/// Extract the suggestion from `candidates[0].content.parts[0].text`
pub fn parse_gemini_response(json: &Value) -> Result<AdvisorSuggestion, AdvisorError> {
    let text = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AdvisorError::InvalidResponse("empty response".to_string()))?;

    serde_json::from_str(text).map_err(|e| AdvisorError::InvalidResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_values() {
        let s = AdvisorSuggestion::fallback("API key not configured");
        assert_eq!(s.rpm, 18000);
        assert_eq!(s.feed_rate, 2500.0);
        assert_eq!(s.plunge_rate, 800.0);
        assert_eq!(s.step_down, 1.5);
        assert_eq!(s.explanation, "Demo mode: API key not configured");
        assert!(s.warning.is_some());
        assert!(s.demo);
    }

    #[test]
    fn test_prompt_mentions_bit_and_material() {
        let bit = Bit {
            name: "Topo reto 3mm".to_string(),
            diameter: "3mm".to_string(),
            material: "Metal Duro".to_string(),
            ..Default::default()
        };
        let prompt = build_prompt(&bit, "Acrylic");
        assert!(prompt.contains("Name: Topo reto 3mm"));
        assert!(prompt.contains("Geometry: 2 flutes"));
        assert!(prompt.contains("- Acrylic"));
    }

    #[test]
    fn test_request_body_shape() {
        let body = request_body("hello", 0.2);
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(
            body["generationConfig"]["responseSchema"]["required"][0],
            "rpm"
        );
    }

    #[test]
    fn test_parse_response() {
        let json = json!({
            "candidates": [{
                "content": { "parts": [{ "text": " {\"rpm\":16000,\"feedRate\":1200,\"plungeRate\":400,\"stepDown\":0.5,\"explanation\":\"ok\"} " }] }
            }]
        });
        let s = parse_gemini_response(&json).unwrap();
        assert_eq!(s.rpm, 16000);
        assert_eq!(s.feed_rate, 1200.0);
        assert_eq!(s.warning, None);
        assert!(!s.demo);
    }

    #[test]
    fn test_parse_empty_response() {
        let err = parse_gemini_response(&json!({"candidates": []})).unwrap_err();
        assert!(matches!(err, AdvisorError::InvalidResponse(_)));

        let err = parse_gemini_response(&json!({
            "candidates": [{ "content": { "parts": [{ "text": "not json" }] } }]
        }))
        .unwrap_err();
        assert!(matches!(err, AdvisorError::InvalidResponse(_)));
    }

    #[test]
    fn test_blank_key_is_missing() {
        let advisor =
            GeminiAdvisor::new(Some("undefined".into()), DEFAULT_MODEL, 0.2, Duration::from_secs(1))
                .unwrap();
        assert!(!advisor.has_key());
    }

    #[tokio::test]
    async fn test_missing_key_falls_back() {
        let advisor = GeminiAdvisor::new(None, DEFAULT_MODEL, 0.2, Duration::from_secs(1)).unwrap();
        let s = advisor.suggest(&Bit::default(), "MDF").await;
        assert!(s.demo);
        assert_eq!(s.explanation, "Demo mode: API key not configured");
    }

    #[test]
    fn test_quota_message() {
        assert!(AdvisorError::QuotaExceeded.to_string().contains("quota exceeded"));
    }
}
