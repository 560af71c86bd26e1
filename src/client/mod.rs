//! Client layer: orchestrates transport calls and maps transport ↔ domain.

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

use crate::domain::{
    ActivationId, ActivationStatus, ApiKey, Balance, FinalizeOutcome, NumberApi, RentalRequest,
    Reservation, ValidationError,
};
use crate::transport::TransportError;

pub const DEFAULT_ENDPOINT: &str = "https://api.sms-activate.org/stubs/handler_api.php";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

trait HttpTransport: Send + Sync {
    fn get(&self, url: Url) -> BoxFuture<'_, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: Url) -> BoxFuture<'_, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let response = self.client.get(url).send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
/// Normalized failure of a gateway call.
///
/// Expected failure grammars are values of this type; the client never panics
/// or raises on them.
pub enum GatewayError {
    /// Timeout, connection refused, TLS failure or non-2xx HTTP status.
    #[error("connection to the gateway failed")]
    ConnectionFailed,

    /// `NO_NUMBERS`.
    #[error("no numbers available")]
    NoNumbersAvailable,

    /// `NO_BALANCE`.
    #[error("insufficient balance")]
    InsufficientBalance,

    /// Any `BAD_*` token (bad key, bad service, bad action, ...).
    #[error("request rejected by the gateway: {0}")]
    BadRequest(String),

    /// Unrecognized response body, preserved for diagnosis.
    #[error("unrecognized gateway response: {0}")]
    Unknown(String),
}

impl From<TransportError> for GatewayError {
    fn from(value: TransportError) -> Self {
        match value {
            TransportError::NoNumbers => Self::NoNumbersAvailable,
            TransportError::NoBalance => Self::InsufficientBalance,
            TransportError::BadRequest { raw } => Self::BadRequest(raw),
            TransportError::Unknown { raw } => Self::Unknown(raw),
        }
    }
}

/// Result shape of every gateway call.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, thiserror::Error)]
/// Errors raised while constructing a [`GatewayClient`].
pub enum SetupError {
    #[error("invalid gateway endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Http(#[source] reqwest::Error),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Remote rental operations the session layer depends on.
///
/// [`GatewayClient`] is the HTTP implementation; tests substitute scripted fakes.
pub trait Gateway: Send + Sync {
    fn get_balance(&self) -> BoxFuture<'_, GatewayResult<Balance>>;

    fn reserve_number<'a>(
        &'a self,
        request: &'a RentalRequest,
    ) -> BoxFuture<'a, GatewayResult<Reservation>>;

    fn poll_status<'a>(
        &'a self,
        activation_id: &'a ActivationId,
    ) -> BoxFuture<'a, GatewayResult<ActivationStatus>>;

    fn finalize<'a>(
        &'a self,
        activation_id: &'a ActivationId,
        outcome: FinalizeOutcome,
    ) -> BoxFuture<'a, GatewayResult<()>>;
}

#[derive(Debug, Clone)]
/// Builder for [`GatewayClient`].
pub struct GatewayClientBuilder {
    api_key: ApiKey,
    endpoint: String,
    timeout: Duration,
    user_agent: Option<String>,
    number_api: NumberApi,
}

impl GatewayClientBuilder {
    /// Create a builder with the default endpoint and a 10 second timeout.
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            number_api: NumberApi::default(),
        }
    }

    /// Override the `handler_api.php` endpoint URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Timeout applied to each request as a whole.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Select `getNumber` or `getNumberV2` for reservations.
    pub fn number_api(mut self, number_api: NumberApi) -> Self {
        self.number_api = number_api;
        self
    }

    /// Build a [`GatewayClient`].
    pub fn build(self) -> Result<GatewayClient, SetupError> {
        let endpoint = Url::parse(&self.endpoint)?;

        let mut builder = reqwest::Client::builder().timeout(self.timeout);
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        let client = builder.build().map_err(SetupError::Http)?;

        Ok(GatewayClient {
            api_key: self.api_key,
            endpoint,
            number_api: self.number_api,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

#[derive(Clone)]
/// HTTP client for the rent-a-number `handler_api.php` endpoint.
///
/// Every call returns a [`GatewayResult`]; transport failures are logged and
/// collapsed into [`GatewayError::ConnectionFailed`]. There are no retries.
pub struct GatewayClient {
    api_key: ApiKey,
    endpoint: Url,
    number_api: NumberApi,
    http: Arc<dyn HttpTransport>,
}

impl GatewayClient {
    /// Create a client with the default endpoint and timeout.
    pub fn new(api_key: ApiKey) -> Result<Self, SetupError> {
        GatewayClientBuilder::new(api_key).build()
    }

    /// Start building a client with custom settings.
    pub fn builder(api_key: ApiKey) -> GatewayClientBuilder {
        GatewayClientBuilder::new(api_key)
    }

    /// Current account balance (`getBalance`).
    pub async fn get_balance(&self) -> GatewayResult<Balance> {
        let body = self
            .call("getBalance", crate::transport::encode_get_balance_query(&self.api_key))
            .await?;
        crate::transport::decode_balance_response(&body).map_err(|err| reject("getBalance", err))
    }

    /// Reserve a number (`getNumber` or `getNumberV2`).
    pub async fn reserve_number(&self, request: &RentalRequest) -> GatewayResult<Reservation> {
        let action = self.number_api.action();
        let params =
            crate::transport::encode_get_number_query(&self.api_key, self.number_api, request);
        let body = self.call(action, params).await?;

        let decoded = match self.number_api {
            NumberApi::V1 => crate::transport::decode_number_response(&body),
            NumberApi::V2 => crate::transport::decode_number_v2_response(&body),
        };
        decoded.map_err(|err| reject(action, err))
    }

    /// Poll an activation for its verification code (`getStatus`).
    pub async fn poll_status(&self, activation_id: &ActivationId) -> GatewayResult<ActivationStatus> {
        let params = crate::transport::encode_get_status_query(&self.api_key, activation_id);
        let body = self.call("getStatus", params).await?;
        crate::transport::decode_status_response(&body).map_err(|err| reject("getStatus", err))
    }

    /// Report the final state of an activation (`setStatus`).
    ///
    /// Succeeds only when the gateway acknowledges the transition with
    /// `ACCESS_ACTIVATION` (confirm) or `ACCESS_CANCEL` (cancel).
    pub async fn finalize(
        &self,
        activation_id: &ActivationId,
        outcome: FinalizeOutcome,
    ) -> GatewayResult<()> {
        let params =
            crate::transport::encode_set_status_query(&self.api_key, activation_id, outcome);
        let body = self.call("setStatus", params).await?;
        crate::transport::decode_set_status_response(outcome, &body)
            .map_err(|err| reject("setStatus", err))
    }

    async fn call(&self, action: &str, params: Vec<(String, String)>) -> GatewayResult<String> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().extend_pairs(params);

        let response = match self.http.get(url).await {
            Ok(response) => response,
            Err(err) => {
                warn!(action, error = %err, "gateway request failed");
                return Err(GatewayError::ConnectionFailed);
            }
        };

        if !(200..=299).contains(&response.status) {
            warn!(action, status = response.status, "gateway returned non-success status");
            return Err(GatewayError::ConnectionFailed);
        }

        debug!(action, body = %response.body.trim(), "gateway response");
        Ok(response.body)
    }
}

fn reject(action: &str, err: TransportError) -> GatewayError {
    if let TransportError::Unknown { raw } = &err {
        warn!(action, raw = %raw, "unrecognized gateway response");
    }
    err.into()
}

impl Gateway for GatewayClient {
    fn get_balance(&self) -> BoxFuture<'_, GatewayResult<Balance>> {
        Box::pin(GatewayClient::get_balance(self))
    }

    fn reserve_number<'a>(
        &'a self,
        request: &'a RentalRequest,
    ) -> BoxFuture<'a, GatewayResult<Reservation>> {
        Box::pin(GatewayClient::reserve_number(self, request))
    }

    fn poll_status<'a>(
        &'a self,
        activation_id: &'a ActivationId,
    ) -> BoxFuture<'a, GatewayResult<ActivationStatus>> {
        Box::pin(GatewayClient::poll_status(self, activation_id))
    }

    fn finalize<'a>(
        &'a self,
        activation_id: &'a ActivationId,
        outcome: FinalizeOutcome,
    ) -> BoxFuture<'a, GatewayResult<()>> {
        Box::pin(GatewayClient::finalize(self, activation_id, outcome))
    }
}
