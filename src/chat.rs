//! Client for the conversational AI service.

use std::future::Future;

use log::{debug, error};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{BotError, Result};
use crate::types::ChatMessage;

/// Something that can produce an assistant reply for a transcript.
pub trait ChatBackend: Send + Sync {
    fn chat(&self, messages: &[ChatMessage]) -> impl Future<Output = Result<String>> + Send;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

pub struct ChatClient {
    client: reqwest::Client,
    endpoint: Url,
    model: String,
}

impl ChatClient {
    pub fn new(client: reqwest::Client, endpoint: Url, model: String) -> Self {
        Self {
            client,
            endpoint,
            model,
        }
    }

    async fn send(&self, messages: &[ChatMessage]) -> Result<String> {
        debug!(
            "Sending request to chat API with {} messages",
            messages.len()
        );

        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(BotError::ChatTransport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(BotError::ChatStatus(status));
        }

        let body: ChatResponse = response.json().await.map_err(BotError::ChatTransport)?;

        debug!("Received response from chat API");
        Ok(body.message.content)
    }
}

impl ChatBackend for ChatClient {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let result = self.send(messages).await;
        if let Err(ref e) = result {
            error!("Error while contacting chat API: {e}");
        }
        result
    }
}
