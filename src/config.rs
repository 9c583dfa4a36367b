use secrecy::SecretString;
use url::Url;

use crate::Result;
use crate::error::Error;

/// Production v2 REST host.
pub const MAINNET_HOST: &str = "https://api.crypto.com/v2/";
/// UAT sandbox host.
pub const UAT_HOST: &str = "https://uat-api.3ona.co/v2/";

const API_KEY_VAR: &str = "CRYPTO_COM_API_KEY";
const SECRET_KEY_VAR: &str = "CRYPTO_COM_SECRET_KEY";
const HOST_VAR: &str = "CRYPTO_COM_API_HOST";

/// API credentials. The secret never appears in `Debug` output.
#[derive(Clone, Debug)]
pub struct Credentials {
    api_key: String,
    secret_key: SecretString,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, secret_key: SecretString) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Error::validation("api key cannot be empty"));
        }
        Ok(Self {
            api_key,
            secret_key,
        })
    }

    /// Reads credentials from `CRYPTO_COM_API_KEY` and
    /// `CRYPTO_COM_SECRET_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = require_var(API_KEY_VAR)?;
        let secret_key = SecretString::from(require_var(SECRET_KEY_VAR)?);
        Self::new(api_key, secret_key)
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    #[must_use]
    pub fn secret_key(&self) -> &SecretString {
        &self.secret_key
    }
}

/// Client bootstrap configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub host: Url,
    pub credentials: Credentials,
}

impl ClientConfig {
    /// Creates a config. The host path must end with a slash so method
    /// names join onto it cleanly.
    pub fn new(host: Url, credentials: Credentials) -> Result<Self> {
        if !host.path().ends_with('/') {
            return Err(Error::validation(format!(
                "host must end with a trailing slash: {host}"
            )));
        }
        Ok(Self { host, credentials })
    }

    /// Parses a string host, appending the trailing slash if missing.
    pub fn from_raw(host: &str, credentials: Credentials) -> Result<Self> {
        let host = if host.ends_with('/') {
            Url::parse(host)?
        } else {
            Url::parse(&format!("{host}/"))?
        };
        Self::new(host, credentials)
    }

    /// Builds a config from the environment: credentials from their
    /// variables, host from `CRYPTO_COM_API_HOST` defaulting to mainnet.
    pub fn from_env() -> Result<Self> {
        let host = std::env::var(HOST_VAR).unwrap_or_else(|_| MAINNET_HOST.to_owned());
        Self::from_raw(&host, Credentials::from_env()?)
    }
}

fn require_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| Error::validation(format!("missing environment variable {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("key", SecretString::from("secret")).expect("valid credentials")
    }

    #[test]
    fn from_raw_appends_trailing_slash() {
        let config = ClientConfig::from_raw("https://api.crypto.com/v2", credentials())
            .expect("valid host");
        assert_eq!(config.host.as_str(), "https://api.crypto.com/v2/");
    }

    #[test]
    fn new_rejects_unjoinable_host() {
        let host = Url::parse("https://api.crypto.com/v2").expect("valid url");
        let err = ClientConfig::new(host, credentials()).expect_err("no trailing slash");
        assert_eq!(err.kind(), crate::ErrorKind::Validation);
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let err = Credentials::new("", SecretString::from("secret")).expect_err("empty key");
        assert_eq!(err.kind(), crate::ErrorKind::Validation);
    }

    #[test]
    fn secret_is_redacted_in_debug_output() {
        let credentials = Credentials::new("key", SecretString::from("dnopcDjFWzYVkTZdThSUdt"))
            .expect("valid credentials");
        let debug = format!("{credentials:?}");
        assert!(!debug.contains("dnopcDjFWzYVkTZdThSUdt"), "secret leaked: {debug}");
    }
}
