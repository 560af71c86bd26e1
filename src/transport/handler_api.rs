//! Plain-text grammar of the `handler_api.php` endpoint.
//!
//! Every response is a single line `TOKEN[:arg[:arg]]`. The first token is
//! matched against a fixed set; anything else is reported as
//! [`TransportError::Unknown`] with the raw body.

use crate::domain::{
    ActivationId, ActivationStatus, ApiKey, BALANCE_CURRENCY, Balance, CountryId, FinalizeOutcome,
    Money, NumberApi, RentalRequest, RentedNumber, Reservation, ServiceCode, VerificationCode,
};

pub const ACTION_FIELD: &str = "action";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("no numbers available")]
    NoNumbers,

    #[error("insufficient balance")]
    NoBalance,

    #[error("request rejected: {raw}")]
    BadRequest { raw: String },

    #[error("unrecognized response: {raw}")]
    Unknown { raw: String },
}

impl TransportError {
    pub(crate) fn unknown(raw: &str) -> Self {
        Self::Unknown {
            raw: raw.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    AccessBalance,
    AccessNumber,
    AccessActivation,
    AccessCancel,
    StatusOk,
    StatusWaitCode,
    StatusCancel,
    NoNumbers,
    NoBalance,
    Bad,
}

impl Token {
    fn parse(head: &str) -> Option<Self> {
        Some(match head {
            "ACCESS_BALANCE" => Self::AccessBalance,
            "ACCESS_NUMBER" => Self::AccessNumber,
            "ACCESS_ACTIVATION" => Self::AccessActivation,
            "ACCESS_CANCEL" => Self::AccessCancel,
            "STATUS_OK" => Self::StatusOk,
            "STATUS_WAIT_CODE" => Self::StatusWaitCode,
            "STATUS_CANCEL" => Self::StatusCancel,
            "NO_NUMBERS" => Self::NoNumbers,
            "NO_BALANCE" => Self::NoBalance,
            other if other.starts_with("BAD_") => Self::Bad,
            _ => return None,
        })
    }

    /// Whether the token is a complete response on its own.
    fn is_bare(self) -> bool {
        matches!(
            self,
            Self::AccessActivation
                | Self::AccessCancel
                | Self::StatusWaitCode
                | Self::StatusCancel
                | Self::NoNumbers
                | Self::NoBalance
                | Self::Bad
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    token: Token,
    /// Everything after the first `:`, if present.
    rest: Option<&'a str>,
}

fn tokenize(body: &str) -> Option<Line<'_>> {
    let (head, rest) = match body.split_once(':') {
        Some((head, rest)) => (head, Some(rest)),
        None => (body, None),
    };
    let token = Token::parse(head)?;
    if token.is_bare() && rest.is_some() {
        return None;
    }
    Some(Line { token, rest })
}

/// Map the shared failure tokens; returns `Unknown` for anything else.
fn rejection(line: Option<Line<'_>>, raw: &str) -> TransportError {
    match line.map(|it| it.token) {
        Some(Token::NoNumbers) => TransportError::NoNumbers,
        Some(Token::NoBalance) => TransportError::NoBalance,
        Some(Token::Bad) => TransportError::BadRequest {
            raw: raw.to_owned(),
        },
        _ => TransportError::unknown(raw),
    }
}

fn action(name: &str) -> (String, String) {
    (ACTION_FIELD.to_owned(), name.to_owned())
}

pub fn encode_get_balance_query(api_key: &ApiKey) -> Vec<(String, String)> {
    vec![
        (ApiKey::FIELD.to_owned(), api_key.as_str().to_owned()),
        action("getBalance"),
    ]
}

pub fn encode_get_number_query(
    api_key: &ApiKey,
    api: NumberApi,
    request: &RentalRequest,
) -> Vec<(String, String)> {
    vec![
        (ApiKey::FIELD.to_owned(), api_key.as_str().to_owned()),
        action(api.action()),
        (
            ServiceCode::FIELD.to_owned(),
            request.service().as_str().to_owned(),
        ),
        (
            CountryId::FIELD.to_owned(),
            request.country().id.value().to_string(),
        ),
    ]
}

pub fn encode_get_status_query(
    api_key: &ApiKey,
    activation_id: &ActivationId,
) -> Vec<(String, String)> {
    vec![
        (ApiKey::FIELD.to_owned(), api_key.as_str().to_owned()),
        action("getStatus"),
        (
            ActivationId::FIELD.to_owned(),
            activation_id.as_str().to_owned(),
        ),
    ]
}

pub fn encode_set_status_query(
    api_key: &ApiKey,
    activation_id: &ActivationId,
    outcome: FinalizeOutcome,
) -> Vec<(String, String)> {
    vec![
        (ApiKey::FIELD.to_owned(), api_key.as_str().to_owned()),
        action("setStatus"),
        (
            ActivationId::FIELD.to_owned(),
            activation_id.as_str().to_owned(),
        ),
        (FinalizeOutcome::FIELD.to_owned(), outcome.code().to_string()),
    ]
}

/// Decode a `getBalance` response; any other line, failure tokens included,
/// is [`TransportError::Unknown`].
pub fn decode_balance_response(body: &str) -> Result<Balance, TransportError> {
    let raw = body.trim();
    match tokenize(raw) {
        Some(Line {
            token: Token::AccessBalance,
            rest: Some(amount),
        }) => {
            let amount = Money::new(amount).map_err(|_| TransportError::unknown(raw))?;
            Ok(Balance {
                amount,
                currency: BALANCE_CURRENCY,
            })
        }
        _ => Err(TransportError::unknown(raw)),
    }
}

pub fn decode_number_response(body: &str) -> Result<Reservation, TransportError> {
    let raw = body.trim();
    let line = tokenize(raw);
    match line {
        Some(Line {
            token: Token::AccessNumber,
            rest: Some(rest),
        }) => {
            let (id, number) = rest
                .split_once(':')
                .ok_or_else(|| TransportError::unknown(raw))?;
            let activation_id = ActivationId::new(id).map_err(|_| TransportError::unknown(raw))?;
            let phone_number =
                RentedNumber::new(number).map_err(|_| TransportError::unknown(raw))?;
            Ok(Reservation {
                activation_id,
                phone_number,
                cost: None,
            })
        }
        _ => Err(rejection(line, raw)),
    }
}

pub fn decode_status_response(body: &str) -> Result<ActivationStatus, TransportError> {
    let raw = body.trim();
    match tokenize(raw) {
        Some(Line {
            token: Token::StatusOk,
            rest: Some(code),
        }) => VerificationCode::new(code)
            .map(ActivationStatus::CodeReceived)
            .map_err(|_| TransportError::unknown(raw)),
        Some(Line {
            token: Token::StatusWaitCode,
            ..
        }) => Ok(ActivationStatus::AwaitingCode),
        Some(Line {
            token: Token::StatusCancel,
            ..
        }) => Ok(ActivationStatus::Cancelled),
        _ => Err(TransportError::unknown(raw)),
    }
}

pub fn decode_set_status_response(
    outcome: FinalizeOutcome,
    body: &str,
) -> Result<(), TransportError> {
    let raw = body.trim();
    let expected = match outcome {
        FinalizeOutcome::Confirmed => Token::AccessActivation,
        FinalizeOutcome::Cancelled => Token::AccessCancel,
    };
    match tokenize(raw) {
        Some(line) if line.token == expected => Ok(()),
        _ => Err(TransportError::unknown(raw)),
    }
}
