use chrono::Utc;
use reqwest::{Client as ReqwestClient, Method};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Result;
use crate::auth;
use crate::config::{ClientConfig, Credentials};
use crate::types::{
    ApiRequest, ApiResponse, CreateOrderParams, CreateOrderResult, OpenOrdersResult, RequestParams,
};

/// Async client for v2 private REST endpoints.
///
/// Every call stamps a fresh millisecond id (doubling as the nonce), signs
/// the envelope with [`auth::sign`], and `POST`s it as JSON to
/// `{host}/{method}`.
#[derive(Clone, Debug)]
pub struct ExchangeClient {
    host: Url,
    credentials: Credentials,
    client: ReqwestClient,
}

impl ExchangeClient {
    /// Creates a client with a default HTTP client.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self::with_client(config, ReqwestClient::new())
    }

    /// Creates a client with a custom HTTP client.
    #[must_use]
    pub fn with_client(config: ClientConfig, client: ReqwestClient) -> Self {
        Self {
            host: config.host,
            credentials: config.credentials,
            client,
        }
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Places an order via `private/create-order`.
    pub async fn create_order(&self, order: CreateOrderParams) -> Result<CreateOrderResult> {
        let response: ApiResponse<CreateOrderResult> = self
            .call("private/create-order", order.into_params()?)
            .await?;
        response.into_result()
    }

    /// Cancels a resting order via `private/cancel-order`.
    pub async fn cancel_order(&self, instrument_name: &str, order_id: &str) -> Result<()> {
        let params = RequestParams::new()
            .with("instrument_name", instrument_name)
            .with("order_id", order_id);
        let response: ApiResponse<serde_json::Value> =
            self.call("private/cancel-order", params).await?;
        response.ensure_ok()
    }

    /// Cancels every resting order on an instrument via
    /// `private/cancel-all-orders`.
    pub async fn cancel_all_orders(&self, instrument_name: &str) -> Result<()> {
        let params = RequestParams::new().with("instrument_name", instrument_name);
        let response: ApiResponse<serde_json::Value> =
            self.call("private/cancel-all-orders", params).await?;
        response.ensure_ok()
    }

    /// Fetches resting orders via `private/get-open-orders`, optionally
    /// filtered by instrument.
    pub async fn get_open_orders(
        &self,
        instrument_name: Option<&str>,
    ) -> Result<OpenOrdersResult> {
        let mut params = RequestParams::new();
        if let Some(instrument_name) = instrument_name {
            params.insert("instrument_name", instrument_name);
        }
        let response: ApiResponse<OpenOrdersResult> =
            self.call("private/get-open-orders", params).await?;
        response.into_result()
    }

    /// Signs and submits an arbitrary private call, stamping the current
    /// millisecond timestamp as both id and nonce.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: RequestParams,
    ) -> Result<ApiResponse<T>> {
        self.call_with_id(method, params, Utc::now().timestamp_millis())
            .await
    }

    /// Signs and submits a private call with an explicit id, for callers
    /// that manage their own correlation ids.
    pub async fn call_with_id<T: DeserializeOwned>(
        &self,
        method: &str,
        params: RequestParams,
        id: i64,
    ) -> Result<ApiResponse<T>> {
        let request = self.sign_request(method, params, id);
        self.send(&request).await
    }

    /// Builds and signs a call envelope without sending it.
    #[must_use]
    pub fn sign_request(&self, method: &str, params: RequestParams, id: i64) -> ApiRequest {
        let request = ApiRequest::new(method, self.credentials.api_key(), params, id);
        let sig = auth::sign(&request, self.credentials.secret_key());
        request.with_signature(sig)
    }

    /// Submits an already-signed envelope: the I/O half of the sign/send
    /// split.
    pub async fn send<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<ApiResponse<T>> {
        debug!(method = %request.method, id = request.id, "submitting signed request");
        let http_request = self
            .client
            .request(Method::POST, self.endpoint(&request.method)?)
            .json(request)
            .build()?;
        crate::request(&self.client, http_request).await
    }

    fn endpoint(&self, method: &str) -> Result<Url> {
        Ok(self.host.join(method)?)
    }
}
