//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod response;
mod validation;
mod value;

pub use request::{
    COUNTRIES, Country, DEFAULT_SERVICE_CODE, FinalizeOutcome, NumberApi, RentalRequest,
};
pub use response::{ActivationStatus, BALANCE_CURRENCY, Balance, Reservation};
pub use validation::ValidationError;
pub use value::{
    ActivationId, ApiKey, CountryId, Money, RentedNumber, ServiceCode, VerificationCode,
};
