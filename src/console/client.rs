use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::TOKEN_HEADER;
use crate::domain::order::OrderStatus;
use crate::handlers::orders::{Envelope, ListOrdersResponse, OrderResponse, UpdateStatusRequest};

pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred.";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// No credential was available, so nothing was sent.
    #[error("Authentication token is missing. Please log in.")]
    AuthMissing,
    /// The server answered with `success: false` and a message.
    #[error("{0}")]
    Rejected(String),
    /// The server answered with `success: false` and nothing else.
    #[error("The server did not report a reason")]
    Unsuccessful,
    /// The request never completed, or came back without a readable body.
    #[error("{0}")]
    Network(String),
    #[error("An unexpected error occurred.")]
    Unexpected,
}

impl ClientError {
    /// Text for a notification: the server's own message when there is one,
    /// then the transport error text, then a generic fallback.
    pub fn message(&self, fallback: &str) -> String {
        match self {
            ClientError::Rejected(m) | ClientError::Network(m) if !m.trim().is_empty() => m.clone(),
            ClientError::Network(_) | ClientError::Unexpected => UNEXPECTED_ERROR.to_string(),
            ClientError::Rejected(_) | ClientError::Unsuccessful => fallback.to_string(),
            ClientError::AuthMissing => self.to_string(),
        }
    }
}

/// The two order endpoints the admin console talks to.
#[allow(async_fn_in_trait)]
pub trait OrdersApi {
    async fn list_orders(&self, token: &str) -> Result<Vec<OrderResponse>, ClientError>;
    async fn update_status(
        &self,
        token: &str,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<(), ClientError>;
}

pub struct HttpOrdersClient {
    client: Client,
    base_url: String,
}

impl HttpOrdersClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent("Storefront Admin Console")
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B, T>(&self, path: &str, token: &str, body: &B) -> Result<T, ClientError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!("POST {url}");
        let res = self
            .client
            .post(&url)
            .header(TOKEN_HEADER, token)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!("Request to {url} failed: {e}");
                ClientError::Network(e.to_string())
            })?;
        read_body(res).await
    }
}

/// Decodes the JSON body whatever the status line says; error statuses still
/// carry the server's `{success: false, message}` envelope.
async fn read_body<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    let status = res.status();
    let bytes = res
        .bytes()
        .await
        .map_err(|e| ClientError::Network(e.to_string()))?;
    match serde_json::from_slice::<T>(&bytes) {
        Ok(body) => Ok(body),
        Err(e) if status.is_success() => {
            warn!("Could not decode response body: {e}");
            Err(ClientError::Unexpected)
        }
        Err(_) => {
            let message = serde_json::from_slice::<Envelope>(&bytes)
                .ok()
                .and_then(|env| env.message)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));
            Err(ClientError::Network(message))
        }
    }
}

/// A blank server message counts as no message at all.
fn rejection(message: Option<String>) -> ClientError {
    message
        .filter(|m| !m.trim().is_empty())
        .map(ClientError::Rejected)
        .unwrap_or(ClientError::Unsuccessful)
}

impl OrdersApi for HttpOrdersClient {
    async fn list_orders(&self, token: &str) -> Result<Vec<OrderResponse>, ClientError> {
        let body: ListOrdersResponse = self.post("/api/order/list", token, &json!({})).await?;
        match body {
            ListOrdersResponse { success: true, orders, .. } => Ok(orders.unwrap_or_default()),
            ListOrdersResponse { message, .. } => Err(rejection(message)),
        }
    }

    async fn update_status(
        &self,
        token: &str,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<(), ClientError> {
        let request = UpdateStatusRequest {
            order_id: order_id.to_string(),
            status: status.to_string(),
        };
        let body: Envelope = self.post("/api/order/status", token, &request).await?;
        if body.success {
            Ok(())
        } else {
            Err(rejection(body.message))
        }
    }
}
