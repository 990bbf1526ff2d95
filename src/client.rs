//! Remote image model: request/response types, the [`ImageModel`] trait and
//! the Gemini `generateContent` backend.
//!
//! Orchestrators only see the trait, so tests can answer with canned
//! responses and the HTTP backend can be swapped or feature-gated out.

use crate::datauri::DataUrl;
use crate::Result;
use serde::{Deserialize, Serialize};

/// One piece of a request: instruction text or an inline image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPart {
    Text(String),
    InlineImage(DataUrl),
}

/// A single multimodal request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelRequest {
    pub parts: Vec<RequestPart>,
}

impl ModelRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(RequestPart::Text(text.into()));
        self
    }

    pub fn image(mut self, image: DataUrl) -> Self {
        self.parts.push(RequestPart::InlineImage(image));
        self
    }

    pub fn image_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, RequestPart::InlineImage(_)))
            .count()
    }
}

/// Part of a candidate's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePart {
    Text(String),
    /// Base64 image payload as returned by the provider
    Image { mime_type: Option<String>, data: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    pub parts: Vec<ResponsePart>,
}

/// Everything the model returned for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelResponse {
    pub candidates: Vec<Candidate>,
}

impl ModelResponse {
    /// Base64 payloads of every image in the first candidate, in order.
    pub fn first_candidate_images(&self) -> Vec<&str> {
        self.candidates
            .first()
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| match p {
                        ResponsePart::Image { data, .. } if !data.is_empty() => Some(data.as_str()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A hosted model that turns a multimodal request into candidates.
pub trait ImageModel {
    /// Issue exactly one remote call.
    fn generate_content(&self, request: &ModelRequest) -> Result<ModelResponse>;
}

impl<M: ImageModel + ?Sized> ImageModel for &M {
    fn generate_content(&self, request: &ModelRequest) -> Result<ModelResponse> {
        (**self).generate_content(request)
    }
}

impl<M: ImageModel + ?Sized> ImageModel for Box<M> {
    fn generate_content(&self, request: &ModelRequest) -> Result<ModelResponse> {
        (**self).generate_content(request)
    }
}

/// API credential passed explicitly to the client.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// `GEMINI_API_KEY`, then `GOOGLE_API_KEY`, then `API_KEY`.
    pub fn from_env() -> Option<Self> {
        ["GEMINI_API_KEY", "GOOGLE_API_KEY", "API_KEY"]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
            .map(Self::new)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("api_key", &"<redacted>").finish()
    }
}

// --- Gemini wire format ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest<'a> {
    contents: WireContent<'a>,
    generation_config: WireGenerationConfig,
}

#[derive(Serialize)]
struct WireContent<'a> {
    parts: Vec<WirePart<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WirePart<'a> {
    Text {
        text: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    Inline {
        inline_data: WireInlineData<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireInlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    response_modalities: Vec<&'static str>,
}

#[derive(Deserialize, Default)]
struct WireResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Deserialize, Default)]
struct WireCandidate {
    #[serde(default)]
    content: Option<WireResponseContent>,
}

#[derive(Deserialize, Default)]
struct WireResponseContent {
    #[serde(default)]
    parts: Vec<WireResponsePart>,
}

#[derive(Deserialize, Default)]
struct WireResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "inlineData", alias = "inline_data")]
    inline_data: Option<WireResponseInline>,
}

#[derive(Deserialize)]
struct WireResponseInline {
    #[serde(default, rename = "mimeType", alias = "mime_type")]
    mime_type: Option<String>,
    #[serde(default)]
    data: String,
}

#[derive(Deserialize)]
struct WireErrorEnvelope {
    error: WireError,
}

#[derive(Deserialize)]
struct WireError {
    #[serde(default)]
    message: String,
}

fn to_wire(request: &ModelRequest) -> WireRequest<'_> {
    let parts = request
        .parts
        .iter()
        .map(|p| match p {
            RequestPart::Text(text) => WirePart::Text { text },
            RequestPart::InlineImage(img) => WirePart::Inline {
                inline_data: WireInlineData {
                    mime_type: &img.mime_type,
                    data: &img.data,
                },
            },
        })
        .collect();
    WireRequest {
        contents: WireContent { parts },
        generation_config: WireGenerationConfig {
            response_modalities: vec!["IMAGE"],
        },
    }
}

fn from_wire(wire: WireResponse) -> ModelResponse {
    let candidates = wire
        .candidates
        .into_iter()
        .map(|c| Candidate {
            parts: c
                .content
                .map(|content| content.parts)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|part| match (part.inline_data, part.text) {
                    (Some(inline), _) => Some(ResponsePart::Image {
                        mime_type: inline.mime_type,
                        data: inline.data,
                    }),
                    (None, Some(text)) => Some(ResponsePart::Text(text)),
                    (None, None) => None,
                })
                .collect(),
        })
        .collect();
    ModelResponse { candidates }
}

/// Parse a `generateContent` response body.
pub fn parse_response_body(body: &str) -> Result<ModelResponse> {
    let wire: WireResponse = serde_json::from_str(body)
        .map_err(|e| crate::Error::DecodeError(format!("unexpected model response: {}", e)))?;
    Ok(from_wire(wire))
}

/// Serialize a request into the `generateContent` JSON body.
pub fn request_body(request: &ModelRequest) -> Result<String> {
    serde_json::to_string(&to_wire(request))
        .map_err(|e| crate::Error::DecodeError(format!("failed to encode request: {}", e)))
}

/// Turn a failed HTTP status into the error taxonomy.
///
/// Not-found, unauthorized and forbidden answers almost always mean a bad
/// key or a model the key cannot reach, so they get the credential message.
pub fn classify_http_failure(status: u16, body: &str) -> crate::Error {
    let message = serde_json::from_str::<WireErrorEnvelope>(body)
        .map(|e| e.error.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().chars().take(200).collect());

    if matches!(status, 401 | 403 | 404) || message.contains("Requested entity was not found") {
        crate::Error::AuthError(format!("the provider answered {} ({})", status, message))
    } else {
        crate::Error::RemoteError { status, message }
    }
}

#[cfg(feature = "gemini")]
pub use gemini::GeminiClient;

#[cfg(feature = "gemini")]
mod gemini {
    use super::*;
    use crate::{Error, StudioConfig};
    use log::{debug, info};
    use reqwest::blocking::Client;
    use std::time::Duration;

    /// Blocking HTTP client for the Gemini `generateContent` endpoint.
    pub struct GeminiClient {
        http: Client,
        endpoint: url::Url,
        credentials: Credentials,
    }

    impl GeminiClient {
        pub fn new(config: &StudioConfig, credentials: Credentials) -> Result<Self> {
            let http = Client::builder()
                .timeout(Duration::from_millis(config.timeout_ms))
                .build()
                .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

            let model = config.model.trim();
            let model_path = if model.starts_with("models/") {
                model.to_string()
            } else {
                format!("models/{}", model)
            };
            let raw = format!(
                "{}/{}:generateContent",
                config.api_base.trim_end_matches('/'),
                model_path
            );
            let endpoint = url::Url::parse(&raw)
                .map_err(|e| Error::ConfigError(format!("invalid API endpoint {}: {}", raw, e)))?;

            Ok(Self {
                http,
                endpoint,
                credentials,
            })
        }

        pub fn endpoint(&self) -> &url::Url {
            &self.endpoint
        }
    }

    impl ImageModel for GeminiClient {
        fn generate_content(&self, request: &ModelRequest) -> Result<ModelResponse> {
            let body = request_body(request)?;
            debug!(
                "POST {} ({} parts, {} images, {} bytes)",
                self.endpoint,
                request.parts.len(),
                request.image_count(),
                body.len()
            );

            let res = self
                .http
                .post(self.endpoint.clone())
                .query(&[("key", self.credentials.api_key())])
                .header("Content-Type", "application/json")
                .body(body)
                .send()
                .map_err(|e| Error::NetworkError(format!("request failed: {}", e)))?;

            let status = res.status();
            let text = res
                .text()
                .map_err(|e| Error::NetworkError(format!("Failed to read response body: {}", e)))?;

            if !status.is_success() {
                return Err(classify_http_failure(status.as_u16(), &text));
            }

            let response = parse_response_body(&text)?;
            info!("model returned {} candidate(s)", response.candidates.len());
            Ok(response)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_uses_camel_case_wire_names() {
        let req = ModelRequest::new()
            .text("hello")
            .image(DataUrl::from_base64("image/png", "AAAA"));
        let body: serde_json::Value = serde_json::from_str(&request_body(&req).unwrap()).unwrap();
        assert_eq!(body["contents"]["parts"][0]["text"], "hello");
        assert_eq!(body["contents"]["parts"][1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(body["contents"]["parts"][1]["inlineData"]["data"], "AAAA");
        assert_eq!(body["generationConfig"]["responseModalities"][0], "IMAGE");
    }

    #[test]
    fn parses_images_and_text_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[
            {"text":"here you go"},
            {"inlineData":{"mimeType":"image/png","data":"AAA"}},
            {"inline_data":{"mime_type":"image/png","data":"BBB"}}
        ]}}]}"#;
        let res = parse_response_body(body).unwrap();
        assert_eq!(res.candidates.len(), 1);
        assert_eq!(res.first_candidate_images(), vec!["AAA", "BBB"]);
        assert_eq!(res.candidates[0].parts[0], ResponsePart::Text("here you go".into()));
    }

    #[test]
    fn missing_candidates_parse_as_empty() {
        let res = parse_response_body("{}").unwrap();
        assert!(res.candidates.is_empty());
        assert!(res.first_candidate_images().is_empty());
    }

    #[test]
    fn not_found_becomes_auth_error() {
        let body = r#"{"error":{"code":404,"message":"Requested entity was not found."}}"#;
        assert!(matches!(classify_http_failure(404, body), crate::Error::AuthError(_)));
        assert!(matches!(
            classify_http_failure(500, r#"{"error":{"message":"boom"}}"#),
            crate::Error::RemoteError { status: 500, ref message } if message == "boom"
        ));
    }

    #[test]
    fn credentials_debug_is_redacted() {
        let c = Credentials::new("secret-key");
        assert!(!format!("{:?}", c).contains("secret-key"));
    }
}
