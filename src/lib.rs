//! Telegram bot renting temporary phone numbers from an SMS-Activate style
//! gateway to receive one verification code each.
//!
//! The crate is layered the same way top to bottom: a domain layer of strong
//! types, a transport layer for the `handler_api.php` wire grammar, a small
//! client layer issuing the four gateway calls, and a session layer tracking
//! one rental per user. The [`bot`] module is the teloxide front end.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use rentsms::{ApiKey, Country, GatewayClient, InMemoryRentalStore, RentalRequest};
//! use rentsms::{ServiceCode, SessionController, UserId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GatewayClient::new(ApiKey::new("...")?)?;
//!     let service = ServiceCode::new("wa")?;
//!     let controller = SessionController::new(
//!         Arc::new(client),
//!         Arc::new(InMemoryRentalStore::new()),
//!         service.clone(),
//!     );
//!     let request = RentalRequest::new(Country::by_key("uae")?, service);
//!     let prompt = controller.select_country_service(UserId(42), request).await;
//!     println!("{}", prompt.text);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod bot;
pub mod client;
pub mod config;
pub mod domain;
pub mod session;
mod transport;

pub use client::{Gateway, GatewayClient, GatewayClientBuilder, GatewayError, SetupError};
pub use config::{Config, ConfigError};
pub use domain::{
    ActivationId, ActivationStatus, ApiKey, Balance, COUNTRIES, Country, CountryId,
    FinalizeOutcome, Money, NumberApi, RentalRequest, RentedNumber, Reservation, ServiceCode,
    ValidationError, VerificationCode,
};
pub use session::{
    Action, InMemoryRentalStore, Prompt, Rental, RentalStatus, RentalStore, SessionController,
    UserId,
};
