use serde::Deserialize;
use serde_json::Value;

use super::handler_api::{TransportError, decode_number_response};
use crate::domain::{ActivationId, Money, RentedNumber, Reservation};

/// Success body of `getNumberV2`; unlisted fields are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NumberV2Body {
    activation_id: Value,
    phone_number: Value,
    #[serde(default)]
    activation_cost: Option<Value>,
}

/// Ids, numbers and costs arrive as JSON strings or numbers.
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Decode a `getNumberV2` response.
///
/// Success is a JSON object; failures use the same text tokens as `getNumber`.
/// A text `ACCESS_NUMBER` line is accepted as well.
pub fn decode_number_v2_response(body: &str) -> Result<Reservation, TransportError> {
    let raw = body.trim();
    if !raw.starts_with('{') {
        return decode_number_response(raw);
    }

    let unknown = || TransportError::unknown(raw);
    let parsed: NumberV2Body = serde_json::from_str(raw).map_err(|_| unknown())?;

    let activation_id = scalar_text(parsed.activation_id)
        .and_then(|id| ActivationId::new(id).ok())
        .ok_or_else(unknown)?;
    let phone_number = scalar_text(parsed.phone_number)
        .and_then(|number| RentedNumber::new(number).ok())
        .ok_or_else(unknown)?;
    let cost = match parsed.activation_cost {
        Some(cost) => Some(
            scalar_text(cost)
                .and_then(|cost| Money::new(cost).ok())
                .ok_or_else(unknown)?,
        ),
        None => None,
    };

    Ok(Reservation {
        activation_id,
        phone_number,
        cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_json_with_numeric_fields() {
        let json = r#"
        {
          "activationId": 778899,
          "phoneNumber": 971501234567,
          "activationCost": 12.50,
          "countryCode": "95",
          "canGetAnotherSms": true,
          "activationTime": "2024-01-01 12:00:00",
          "activationOperator": "etisalat"
        }
        "#;

        let reservation = decode_number_v2_response(json).unwrap();
        assert_eq!(reservation.activation_id.as_str(), "778899");
        assert_eq!(reservation.phone_number.raw(), "971501234567");
        assert_eq!(
            reservation.cost.as_ref().map(Money::to_display).as_deref(),
            Some("12.50")
        );
    }

    #[test]
    fn decodes_json_with_string_fields_and_no_cost() {
        let json = r#"{"activationId":"778899","phoneNumber":"971501234567"}"#;
        let reservation = decode_number_v2_response(json).unwrap();
        assert_eq!(reservation.activation_id.as_str(), "778899");
        assert_eq!(reservation.cost, None);
    }

    #[test]
    fn text_failures_share_the_v1_grammar() {
        assert_eq!(
            decode_number_v2_response("NO_NUMBERS").unwrap_err(),
            TransportError::NoNumbers
        );
        assert_eq!(
            decode_number_v2_response("NO_BALANCE").unwrap_err(),
            TransportError::NoBalance
        );
        assert!(decode_number_v2_response("ACCESS_NUMBER:1:971501234567").is_ok());
    }

    #[test]
    fn large_numeric_ids_keep_every_digit() {
        let json = r#"{"activationId":12345678901234567890,"phoneNumber":"971501234567"}"#;
        let reservation = decode_number_v2_response(json).unwrap();
        assert_eq!(reservation.activation_id.as_str(), "12345678901234567890");
    }

    #[test]
    fn malformed_json_is_unknown() {
        assert!(matches!(
            decode_number_v2_response("{ not json }"),
            Err(TransportError::Unknown { .. })
        ));
        assert!(matches!(
            decode_number_v2_response(r#"{"activationId": 1}"#),
            Err(TransportError::Unknown { .. })
        ));
        assert!(matches!(
            decode_number_v2_response(r#"{"activationId": "", "phoneNumber": "971"}"#),
            Err(TransportError::Unknown { .. })
        ));
        assert!(matches!(
            decode_number_v2_response(r#"{"activationId": true, "phoneNumber": "971"}"#),
            Err(TransportError::Unknown { .. })
        ));
        assert!(matches!(
            decode_number_v2_response(
                r#"{"activationId": 1, "phoneNumber": "971", "activationCost": [1]}"#
            ),
            Err(TransportError::Unknown { .. })
        ));
    }
}
