use std::path::Path;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use meditrack_models::settings::ScanSettings;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::{MedicineDetails, MedicineDetailsExtractor};

const PROMPT: &str = "Extract the medicine name and the expiry date from this image of a medicine package. \
Respond with the name on the first line and the expiry date in YYYY-MM-DD format on the second line. \
If a value isn't found, write 'null' for that line. Do not add any other text or formatting.";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("scan.api_key is not configured")]
    MissingApiKey,

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("model returned no text")]
    EmptyReply,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();

        (!text.trim().is_empty()).then_some(text)
    }
}

/// Reads medicine packages through the Gemini `generateContent` API.
pub struct GeminiExtractor {
    client: reqwest::Client,
    api_key: String,
    url: String,
}

impl GeminiExtractor {
    pub fn new(settings: &ScanSettings) -> Result<Self, ExtractError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ExtractError::MissingApiKey)?;

        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()?;

        Ok(Self {
            client,
            api_key,
            url: format!(
                "{}/models/{}:generateContent",
                settings.endpoint.trim_end_matches('/'),
                settings.model
            ),
        })
    }

    async fn request(&self, image: &[u8], mime_type: &str) -> Result<String, ExtractError> {
        let response: GenerateContentResponse = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(image, mime_type))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response.text().ok_or(ExtractError::EmptyReply)
    }
}

#[async_trait]
impl MedicineDetailsExtractor for GeminiExtractor {
    async fn extract(&self, image: &[u8], mime_type: &str) -> MedicineDetails {
        match self.request(image, mime_type).await {
            Ok(reply) => {
                let details = MedicineDetails::from_reply(&reply);
                log::info!(
                    "Extracted medicine details. [name = {:?}, expiry_date = {:?}]",
                    details.name,
                    details.expiry_date
                );
                details
            }
            Err(e) => {
                log::error!("Error extracting medicine details from image. [error = {e}]");
                MedicineDetails::default()
            }
        }
    }
}

fn request_body(image: &[u8], mime_type: &str) -> Value {
    json!({
        "contents": [{
            "parts": [
                {
                    "inlineData": {
                        "mimeType": mime_type,
                        "data": STANDARD.encode(image),
                    }
                },
                { "text": PROMPT }
            ]
        }]
    })
}

/// Guesses the image MIME type from the file extension, JPEG when unknown.
pub fn image_mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn request_carries_image_and_prompt() {
        let body = request_body(b"png-bytes", "image/png");
        let parts = &body["contents"][0]["parts"];

        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[0]["inlineData"]["data"], "cG5nLWJ5dGVz");
        assert_eq!(parts[1]["text"], PROMPT);
    }

    #[test]
    fn reply_text_joins_first_candidate_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "Paracetamol\n" }, { "text": "2027-01-15" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .unwrap();

        let details = MedicineDetails::from_reply(&response.text().unwrap());

        assert_eq!(details.name.as_deref(), Some("Paracetamol"));
        assert_eq!(details.expiry_date, NaiveDate::from_ymd_opt(2027, 1, 15));
    }

    #[test]
    fn blocked_reply_has_no_text() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({ "promptFeedback": { "blockReason": "OTHER" } }))
                .unwrap();

        assert_eq!(response.text(), None);
    }

    #[test]
    fn extractor_requires_an_api_key() {
        let settings = ScanSettings {
            api_key: Some("  ".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            GeminiExtractor::new(&settings),
            Err(ExtractError::MissingApiKey)
        ));
    }

    #[test]
    fn url_targets_the_configured_model() {
        let settings = ScanSettings {
            api_key: Some("key".to_string()),
            endpoint: "http://localhost:8080/v1beta/".to_string(),
            ..Default::default()
        };

        let extractor = GeminiExtractor::new(&settings).unwrap();

        assert_eq!(
            extractor.url,
            "http://localhost:8080/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn unreachable_service_degrades_to_empty_details() {
        let settings = ScanSettings {
            api_key: Some("key".to_string()),
            endpoint: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..Default::default()
        };
        let extractor = GeminiExtractor::new(&settings).unwrap();

        let details = extractor.extract(b"not an image", "image/jpeg").await;

        assert!(details.is_empty());
    }

    #[test]
    fn mime_type_follows_the_extension() {
        assert_eq!(image_mime_type(Path::new("box.PNG")), "image/png");
        assert_eq!(image_mime_type(Path::new("box.jpg")), "image/jpeg");
        assert_eq!(image_mime_type(Path::new("box")), "image/jpeg");
    }
}
