//! Runtime configuration read from the environment.

use std::time::Duration;

use crate::client::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, GatewayClient, SetupError};
use crate::domain::{ApiKey, DEFAULT_SERVICE_CODE, NumberApi, ServiceCode};

pub const BOT_TOKEN_VAR: &str = "BOT_TOKEN";
pub const API_KEY_VAR: &str = "SMS_API_KEY";
pub const API_URL_VAR: &str = "SMS_API_URL";
pub const API_TIMEOUT_VAR: &str = "SMS_API_TIMEOUT_SECS";
pub const NUMBER_API_VAR: &str = "SMS_NUMBER_API";
pub const SERVICE_VAR: &str = "SMS_SERVICE";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("invalid {var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub api_key: ApiKey,
    pub endpoint: String,
    pub timeout: Duration,
    pub number_api: NumberApi,
    pub service: ServiceCode,
}

impl Config {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let bot_token = get(BOT_TOKEN_VAR)
            .map(|token| token.trim().to_owned())
            .ok_or(ConfigError::Missing(BOT_TOKEN_VAR))?;
        let api_key = get(API_KEY_VAR)
            .ok_or(ConfigError::Missing(API_KEY_VAR))
            .and_then(|value| {
                ApiKey::new(value.clone()).map_err(|err| invalid(API_KEY_VAR, value, err))
            })?;

        let endpoint = get(API_URL_VAR).unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned());

        let timeout = match get(API_TIMEOUT_VAR) {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                Ok(_) => return Err(invalid(API_TIMEOUT_VAR, value, "must be positive")),
                Err(err) => return Err(invalid(API_TIMEOUT_VAR, value, err)),
            },
            None => DEFAULT_TIMEOUT,
        };

        let number_api = match get(NUMBER_API_VAR) {
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "v1" => NumberApi::V1,
                "v2" => NumberApi::V2,
                _ => return Err(invalid(NUMBER_API_VAR, value, "expected v1 or v2")),
            },
            None => NumberApi::default(),
        };

        let service = match get(SERVICE_VAR) {
            Some(value) => {
                ServiceCode::new(value.clone()).map_err(|err| invalid(SERVICE_VAR, value, err))?
            }
            None => ServiceCode::new(DEFAULT_SERVICE_CODE)
                .map_err(|err| invalid(SERVICE_VAR, DEFAULT_SERVICE_CODE.to_owned(), err))?,
        };

        Ok(Self {
            bot_token,
            api_key,
            endpoint,
            timeout,
            number_api,
            service,
        })
    }

    /// Gateway client configured from these settings.
    pub fn gateway_client(&self) -> Result<GatewayClient, SetupError> {
        GatewayClient::builder(self.api_key.clone())
            .endpoint(self.endpoint.clone())
            .timeout(self.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .number_api(self.number_api)
            .build()
    }
}

fn invalid(var: &'static str, value: String, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var,
        value,
        reason: reason.to_string(),
    }
}
