use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Image download error: {0}")]
    Download(#[from] teloxide::DownloadError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Invalid URL in {key}: {source}")]
    InvalidUrl {
        key: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Prediction API returned status {0}")]
    PredictionStatus(StatusCode),

    #[error("Prediction API request failed: {0}")]
    PredictionTransport(reqwest::Error),

    #[error("Chat API returned status {0}")]
    ChatStatus(StatusCode),

    #[error("Chat API request failed: {0}")]
    ChatTransport(reqwest::Error),
}

impl BotError {
    /// Returns the fixed user-facing text sent back to the chat in place of a result.
    pub fn user_message(&self) -> String {
        match self {
            BotError::Telegram(_) | BotError::Download(_) => {
                "Sorry, I couldn't download your image. Please try again.".to_string()
            }
            BotError::Config(_) | BotError::EnvVar(_) | BotError::InvalidUrl { .. } => {
                "Sorry, there's a configuration issue on my end. Please contact the bot administrator.".to_string()
            }
            BotError::PredictionStatus(_) => {
                "Sorry, I couldn't predict the disease. Please try again.".to_string()
            }
            BotError::PredictionTransport(_) => {
                "Sorry, there was an error with the prediction service.".to_string()
            }
            BotError::ChatStatus(_) => "Sorry, I couldn't reply. Please try again.".to_string(),
            BotError::ChatTransport(_) => {
                "Sorry, there was an error with the chat service.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
