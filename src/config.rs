use std::env;

use log::{debug, error, info};
use url::Url;

use crate::error::{BotError, Result};

/// Model name sent to the chat service when `CHAT_MODEL` is unset.
pub const DEFAULT_CHAT_MODEL: &str = "plant-care";

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub prediction_url: Url,
    pub chat_url: Url,
    pub chat_model: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment");
        dotenvy::dotenv().ok();

        let bot_token = env::var("BOT_TOKEN").map_err(|e| {
            error!("Failed to load BOT_TOKEN from environment: {e}");
            e
        })?;

        let prediction_url = required_url("API_URL")?;
        let chat_url = required_url("CHAT_API_URL")?;

        let chat_model = env::var("CHAT_MODEL")
            .ok()
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());

        info!("Configuration loaded successfully");
        debug!("Bot token length: {} characters", bot_token.len());
        debug!("Prediction endpoint: {prediction_url}");
        debug!("Chat endpoint: {chat_url}");
        debug!("Chat model: {chat_model}");

        Ok(Self {
            bot_token,
            prediction_url,
            chat_url,
            chat_model,
        })
    }
}

fn required_url(key: &str) -> Result<Url> {
    let raw = env::var(key).map_err(|e| {
        error!("Failed to load {key} from environment: {e}");
        e
    })?;
    parse_endpoint(key, &raw)
}

/// Parse an endpoint URL, rejecting anything that is not plain HTTP(S).
fn parse_endpoint(key: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        error!("Invalid URL in {key}: {e}");
        BotError::InvalidUrl {
            key: key.to_string(),
            source: e,
        }
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(BotError::Config(format!(
            "{key} must use http or https, got '{scheme}'"
        ))),
    }
}
