//! Session layer: per-user rental tracking and the state machine driving it.

mod controller;
pub mod machine;
mod prompt;
mod rental;
mod store;

pub use controller::SessionController;
pub use machine::{Effect, Event, Reply, SessionState, Step, Transition};
pub use prompt::{Action, Prompt, describe};
pub use rental::{Rental, RentalStatus};
pub use store::{InMemoryRentalStore, RentalStore, UserId};
