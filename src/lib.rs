//! Crypto.com Exchange v2 REST API client SDK.
//!
//! The core of this crate is a pure request signer ([`auth::sign`]): the v2
//! API authenticates private calls with an HMAC-SHA256 tag computed over a
//! canonical rendering of the request envelope. [`ExchangeClient`] wraps the
//! signer with a thin async transport:
//! - stamp a millisecond id (doubling as the nonce)
//! - sign the envelope
//! - `POST` it as JSON and decode the response envelope
//!
//! Signing is deliberately separate from transport so it can be tested
//! without network access.

mod client;
mod config;
mod error;

pub mod auth;
pub mod types;

pub use client::ExchangeClient;
pub use config::{ClientConfig, Credentials, MAINNET_HOST, UAT_HOST};
pub use error::{Error, Kind as ErrorKind};

/// Convenience alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) async fn request<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    request: reqwest::Request,
) -> Result<T> {
    let response = client.execute(request).await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::warn!(%status, "request rejected");
        return Err(Error::status(status, body));
    }

    Ok(serde_json::from_str(&body)?)
}
