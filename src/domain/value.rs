use crate::domain::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Gateway `api_key` credential.
///
/// Invariant: non-empty after trimming.
pub struct ApiKey(String);

impl ApiKey {
    /// Query parameter name used by the gateway (`api_key`).
    pub const FIELD: &'static str = "api_key";

    /// Create a validated [`ApiKey`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Opaque activation identifier assigned by the gateway on reservation.
///
/// Invariant: non-empty after trimming.
pub struct ActivationId(String);

impl ActivationId {
    /// Query parameter name used by the gateway (`id`).
    pub const FIELD: &'static str = "id";

    /// Create a validated [`ActivationId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActivationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Gateway service code (`wa` for WhatsApp, `tg` for Telegram, ...).
///
/// Invariant: non-empty after trimming.
pub struct ServiceCode(String);

impl ServiceCode {
    /// Query parameter name used by the gateway (`service`).
    pub const FIELD: &'static str = "service";

    /// Create a validated [`ServiceCode`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Numeric country id understood by the gateway.
pub struct CountryId(u32);

impl CountryId {
    /// Query parameter name used by the gateway (`country`).
    pub const FIELD: &'static str = "country";

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Verification code delivered to a rented number.
///
/// Invariant: non-empty after trimming.
pub struct VerificationCode(String);

impl VerificationCode {
    pub const FIELD: &'static str = "code";

    /// Create a validated [`VerificationCode`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Phone number as returned by the gateway (digits, no leading `+`).
///
/// Invariant: non-empty digits after trimming, optionally prefixed with `+`. The
/// gateway value is kept verbatim; use [`RentedNumber::international`] for display.
pub struct RentedNumber(String);

impl RentedNumber {
    pub const FIELD: &'static str = "number";

    /// Create a validated [`RentedNumber`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidPhoneNumber {
                input: trimmed.to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the number exactly as the gateway reported it.
    pub fn raw(&self) -> &str {
        &self.0
    }

    /// International representation (`+971 50 123 4567`).
    ///
    /// Falls back to `+<raw>` when the number cannot be parsed.
    pub fn international(&self) -> String {
        let with_plus = if self.0.starts_with('+') {
            self.0.clone()
        } else {
            format!("+{}", self.0)
        };
        match phonenumber::parse(None, &with_plus) {
            Ok(parsed) => phonenumber::format(&parsed)
                .mode(phonenumber::Mode::International)
                .to_string(),
            Err(_) => with_plus,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Decimal amount as reported by the gateway.
///
/// The raw token is preserved to avoid formatting drift (`10.00` stays `"10.00"`).
pub struct Money {
    raw: String,
    value: f64,
}

impl Money {
    pub const FIELD: &'static str = "amount";

    /// Parse a decimal amount.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let raw = value.trim().to_owned();
        if raw.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        let parsed = raw
            .parse::<f64>()
            .ok()
            .filter(|it| it.is_finite())
            .ok_or_else(|| ValidationError::InvalidAmount { input: raw.clone() })?;
        Ok(Self { raw, value: parsed })
    }

    /// Borrow the raw token.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Amount rounded to two decimal places.
    pub fn to_display(&self) -> String {
        format!("{:.2}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_newtypes_trim_or_validate() {
        let key = ApiKey::new("  key ").unwrap();
        assert_eq!(key.as_str(), "key");
        assert!(ApiKey::new("  ").is_err());

        let id = ActivationId::new(" 778899 ").unwrap();
        assert_eq!(id.as_str(), "778899");
        assert_eq!(id.to_string(), "778899");
        assert!(ActivationId::new("").is_err());

        let service = ServiceCode::new(" wa ").unwrap();
        assert_eq!(service.as_str(), "wa");
        assert!(ServiceCode::new(" ").is_err());

        let code = VerificationCode::new("4521").unwrap();
        assert_eq!(code.as_str(), "4521");
        assert!(VerificationCode::new("").is_err());

        let number = RentedNumber::new(" 971501234567 ").unwrap();
        assert_eq!(number.raw(), "971501234567");
        assert!(RentedNumber::new("").is_err());
        assert!(matches!(
            RentedNumber::new("97150abc"),
            Err(ValidationError::InvalidPhoneNumber { .. })
        ));
    }

    #[test]
    fn rented_number_formats_internationally() {
        let number = RentedNumber::new("971501234567").unwrap();
        assert_eq!(number.international(), "+971 50 123 4567");

        let unparseable = RentedNumber::new("000").unwrap();
        assert_eq!(unparseable.international(), "+000");
    }

    #[test]
    fn money_preserves_raw_token_and_rounds_for_display() {
        let money = Money::new(" 10.5 ").unwrap();
        assert_eq!(money.as_str(), "10.5");
        assert_eq!(money.to_display(), "10.50");

        assert!(matches!(
            Money::new("ten"),
            Err(ValidationError::InvalidAmount { .. })
        ));
        assert!(matches!(
            Money::new("NaN"),
            Err(ValidationError::InvalidAmount { .. })
        ));
        assert!(matches!(Money::new(""), Err(ValidationError::Empty { .. })));
    }

    #[test]
    fn country_id_exposes_value() {
        assert_eq!(CountryId::new(95).value(), 95);
    }
}
