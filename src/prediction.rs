//! Client for the plant disease classification service.

use std::future::Future;

use log::{debug, error};
use reqwest::{
    StatusCode,
    multipart::{Form, Part},
};
use serde::Deserialize;
use url::Url;

use crate::error::{BotError, Result};

const UPLOAD_FIELD: &str = "file";
const UPLOAD_FILENAME: &str = "image.jpg";

/// Something that can turn image bytes into a disease label.
pub trait Predictor: Send + Sync {
    fn predict(&self, image: Vec<u8>) -> impl Future<Output = Result<String>> + Send;
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    prediction: String,
}

pub struct PredictionClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl PredictionClient {
    pub fn new(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    async fn send(&self, image: Vec<u8>) -> Result<String> {
        debug!(
            "Sending {} byte image to prediction API at {}",
            image.len(),
            self.endpoint
        );

        let part = Part::bytes(image)
            .file_name(UPLOAD_FILENAME)
            .mime_str(mime::IMAGE_JPEG.as_ref())
            .map_err(BotError::PredictionTransport)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(BotError::PredictionTransport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(BotError::PredictionStatus(status));
        }

        let body: PredictionResponse = response
            .json()
            .await
            .map_err(BotError::PredictionTransport)?;

        debug!("Prediction API returned label '{}'", body.prediction);
        Ok(body.prediction)
    }
}

impl Predictor for PredictionClient {
    async fn predict(&self, image: Vec<u8>) -> Result<String> {
        let result = self.send(image).await;
        if let Err(ref e) = result {
            error!("Error while contacting prediction API: {e}");
        }
        result
    }
}
