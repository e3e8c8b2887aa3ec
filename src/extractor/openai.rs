//! Chat-completions backed extractor

use crate::config::{Config, ExtractorConfig};
use crate::crawler::{truncate_chars, FetchedPage};
use crate::extractor::clean::{fallback_extraction, normalize, strip_code_fences};
use crate::extractor::{Credential, ExtractError, ExtractorProvider, VehicleData, VehicleExtractor};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const SYSTEM_PROMPT: &str =
    "You are a data extraction expert. Always respond with valid JSON only.";

const TRUNCATION_MARKER: &str = "\n...[truncated]";

/// Chat completion request body
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// One chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Builds the extraction prompt for a page
fn build_prompt(page: &FetchedPage, max_html_chars: usize, default_make: &str) -> String {
    let html = if page.content.chars().count() > max_html_chars {
        format!(
            "{}{}",
            truncate_chars(&page.content, max_html_chars),
            TRUNCATION_MARKER
        )
    } else {
        page.content.clone()
    };

    format!(
        r#"You are a vehicle data extraction expert. Extract the following information from this vehicle detail page HTML:

URL: {url}
Page Title: {title}

Required fields:
1. VIN (Vehicle Identification Number - exactly 17 characters)
2. Year (4-digit year, e.g., 2024, 2025)
3. Make (should be "{make}")
4. Model (e.g., Altima, Rogue, Sentra, Pathfinder, Murano)
5. Trim (e.g., SV, SL, Platinum, SR)
6. MSRP (Manufacturer's Suggested Retail Price - the original sticker price)
7. Sale Price (the final customer price after all discounts, incentives and dealer adjustments)

Pricing notes:
- Dealerships label the final price differently: "Sale Price", "Our Price", "Your Price", "Dealer Price", "Internet Price".
- The MSRP is typically labeled "MSRP", "Sticker Price" or "Retail Price".
- The Sale Price is the lowest price shown that the customer actually pays.
- Ignore monthly payment amounts.
- Return prices as numbers only, without dollar signs or commas.
- If a value is not found, return "Not Available".

Return ONLY a valid JSON object with these exact keys (no markdown, no code blocks, no explanations):
{{"vin": "", "year": "", "make": "", "model": "", "trim": "", "msrp": "", "sale_price": ""}}

HTML Content:
{html}
"#,
        url = page.url,
        title = page.title,
        make = default_make,
        html = html,
    )
}

/// Extractor that asks a chat-completions model for vehicle data
pub struct OpenAiExtractor {
    client: Client,
    config: ExtractorConfig,
    credential: Credential,
}

impl OpenAiExtractor {
    pub fn new(client: Client, config: ExtractorConfig, credential: Credential) -> Self {
        Self {
            client,
            config,
            credential,
        }
    }

    /// Sends one completion request and returns the raw reply text
    async fn complete(&self, prompt: String) -> Result<String, ExtractError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(format!(
                "{}/chat/completions",
                self.config.base_url.trim_end_matches('/')
            ))
            .bearer_auth(self.credential.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ExtractError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| ExtractError::Decode(e.to_string()))?;

        reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ExtractError::EmptyReply)
    }
}

#[async_trait]
impl VehicleExtractor for OpenAiExtractor {
    async fn extract(&self, page: &FetchedPage) -> VehicleData {
        let default_make = self.config.default_make.as_str();
        let prompt = build_prompt(page, self.config.max_html_chars, default_make);

        let content = match self.complete(prompt).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Extraction failed for {}: {}", page.url, e);
                return VehicleData::unavailable(default_make);
            }
        };

        let content = strip_code_fences(&content);
        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(data) if data.is_object() => normalize(&data, default_make),
            Ok(_) | Err(_) => {
                tracing::warn!(
                    "Extraction reply for {} was not a JSON object, salvaging VIN and year",
                    page.url
                );
                fallback_extraction(&content, default_make)
            }
        }
    }
}

/// Creates [`OpenAiExtractor`]s sharing one HTTP client
#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client,
    config: ExtractorConfig,
}

impl OpenAiProvider {
    /// Creates a provider from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(OpenAiProvider)` - Ready to hand out extractors
    /// * `Err(reqwest::Error)` - The HTTP client could not be built
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.extractor.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config: config.extractor.clone(),
        })
    }
}

impl ExtractorProvider for OpenAiProvider {
    fn extractor(&self, credential: &Credential) -> Arc<dyn VehicleExtractor> {
        Arc::new(OpenAiExtractor::new(
            self.client.clone(),
            self.config.clone(),
            credential.clone(),
        ))
    }
}
