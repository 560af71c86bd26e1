use crate::domain::validation::ValidationError;
use crate::domain::value::{CountryId, ServiceCode};

pub const DEFAULT_SERVICE_CODE: &str = "wa";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// A country numbers can be rented from.
pub struct Country {
    /// Stable key used in chat callbacks (`uae`).
    pub key: &'static str,
    /// Human readable label shown on buttons.
    pub label: &'static str,
    pub id: CountryId,
}

/// Fixed country catalog offered in the menu.
pub const COUNTRIES: [Country; 4] = [
    Country {
        key: "saudi",
        label: "Saudi Arabia 🇸🇦",
        id: CountryId::new(2),
    },
    Country {
        key: "uae",
        label: "UAE 🇦🇪",
        id: CountryId::new(95),
    },
    Country {
        key: "kuwait",
        label: "Kuwait 🇰🇼",
        id: CountryId::new(48),
    },
    Country {
        key: "qatar",
        label: "Qatar 🇶🇦",
        id: CountryId::new(110),
    },
];

impl Country {
    /// Look a country up by its catalog key.
    pub fn by_key(key: &str) -> Result<Self, ValidationError> {
        COUNTRIES
            .iter()
            .find(|country| country.key == key)
            .copied()
            .ok_or_else(|| ValidationError::UnknownCountry {
                key: key.to_owned(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to reserve one number for a service in a country.
pub struct RentalRequest {
    country: Country,
    service: ServiceCode,
}

impl RentalRequest {
    pub fn new(country: Country, service: ServiceCode) -> Self {
        Self { country, service }
    }

    pub fn country(&self) -> &Country {
        &self.country
    }

    pub fn service(&self) -> &ServiceCode {
        &self.service
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Final state reported back to the gateway for an activation.
pub enum FinalizeOutcome {
    /// Code received, activation completed (`status=1`).
    Confirmed,
    /// Activation abandoned, funds returned (`status=8`).
    Cancelled,
}

impl FinalizeOutcome {
    /// Query parameter name used by the gateway (`status`).
    pub const FIELD: &'static str = "status";

    /// Numeric status sent to `setStatus`.
    pub fn code(self) -> u8 {
        match self {
            Self::Confirmed => 1,
            Self::Cancelled => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Which reservation action the client calls.
pub enum NumberApi {
    /// `getNumber`, answered with `ACCESS_NUMBER:<id>:<number>`.
    #[default]
    V1,
    /// `getNumberV2`, answered with a JSON object.
    V2,
}

impl NumberApi {
    pub fn action(self) -> &'static str {
        match self {
            Self::V1 => "getNumber",
            Self::V2 => "getNumberV2",
        }
    }
}
