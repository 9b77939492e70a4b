//! Local axum stubs standing in for the prediction and chat services.

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use url::Url;

pub const STUB_PATH: &str = "/endpoint";

/// One part of a multipart upload as the stub received it.
#[derive(Debug, Clone)]
pub struct UploadedPart {
    pub name: Option<String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
struct StubState<T> {
    status: StatusCode,
    body: &'static str,
    received: UnboundedSender<T>,
}

impl<T> StubState<T> {
    fn respond(&self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            self.body,
        )
            .into_response()
    }
}

/// Serve `POST /endpoint` expecting a JSON body; every body received is forwarded.
pub async fn spawn_json_stub(status: u16, body: &'static str) -> (Url, UnboundedReceiver<Value>) {
    async fn handle(
        State(state): State<StubState<Value>>,
        Json(request): Json<Value>,
    ) -> Response {
        let _ = state.received.send(request);
        state.respond()
    }

    let (received, rx) = mpsc::unbounded_channel();
    let router = Router::new()
        .route(STUB_PATH, post(handle))
        .with_state(stub_state(status, body, received));
    (serve(router).await, rx)
}

/// Serve `POST /endpoint` expecting a multipart upload; the parts of every
/// request received are forwarded.
pub async fn spawn_upload_stub(
    status: u16,
    body: &'static str,
) -> (Url, UnboundedReceiver<Vec<UploadedPart>>) {
    async fn handle(
        State(state): State<StubState<Vec<UploadedPart>>>,
        mut multipart: Multipart,
    ) -> Response {
        let mut parts = Vec::new();
        while let Some(field) = multipart.next_field().await.expect("multipart field") {
            let name = field.name().map(str::to_owned);
            let file_name = field.file_name().map(str::to_owned);
            let content_type = field.content_type().map(str::to_owned);
            let bytes = field.bytes().await.expect("field bytes").to_vec();
            parts.push(UploadedPart {
                name,
                file_name,
                content_type,
                bytes,
            });
        }
        let _ = state.received.send(parts);
        state.respond()
    }

    let (received, rx) = mpsc::unbounded_channel();
    let router = Router::new()
        .route(STUB_PATH, post(handle))
        .with_state(stub_state(status, body, received));
    (serve(router).await, rx)
}

/// An address nothing listens on.
pub fn refused_endpoint() -> Url {
    Url::parse("http://127.0.0.1:1/endpoint").expect("static url")
}

fn stub_state<T>(status: u16, body: &'static str, received: UnboundedSender<T>) -> StubState<T> {
    StubState {
        status: StatusCode::from_u16(status).expect("valid status code"),
        body,
        received,
    }
}

async fn serve(router: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stub server");
    });
    Url::parse(&format!("http://{addr}{STUB_PATH}")).expect("stub url")
}
