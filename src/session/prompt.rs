//! User-facing prompts produced by the session machine.
//!
//! A [`Prompt`] is plain text plus the actions the user can take next; the chat
//! layer decides how to render them.

use crate::client::GatewayError;
use crate::domain::{ActivationId, Balance, COUNTRIES, Country, Money};

use super::rental::Rental;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SelectCountry(Country),
    CheckBalance,
    Refresh(ActivationId),
    Cancel(ActivationId),
    Acknowledge,
    Menu,
}

impl Action {
    /// Button label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SelectCountry(country) => country.label,
            Self::CheckBalance => "💰 Balance",
            Self::Refresh(_) => "🔄 Refresh - get code",
            Self::Cancel(_) => "❌ Cancel number",
            Self::Acknowledge => "✔️ Done",
            Self::Menu => "🔙 Back to menu",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub actions: Vec<Action>,
}

impl Prompt {
    fn new(text: impl Into<String>, actions: Vec<Action>) -> Self {
        Self {
            text: text.into(),
            actions,
        }
    }
}

const CHOOSE_COUNTRY: &str = "Choose the country you want a number from:";

fn menu_actions() -> Vec<Action> {
    COUNTRIES
        .iter()
        .copied()
        .map(Action::SelectCountry)
        .chain(std::iter::once(Action::CheckBalance))
        .collect()
}

fn rental_actions(rental: &Rental) -> Vec<Action> {
    vec![
        Action::Refresh(rental.activation_id.clone()),
        Action::Cancel(rental.activation_id.clone()),
        Action::Menu,
    ]
}

/// Short reason shown to the user for a failed gateway call.
pub fn describe(err: &GatewayError) -> String {
    match err {
        GatewayError::ConnectionFailed => "could not reach the service, try again".to_owned(),
        GatewayError::NoNumbersAvailable => "no numbers available".to_owned(),
        GatewayError::InsufficientBalance => "insufficient balance".to_owned(),
        GatewayError::BadRequest(raw) => format!("request rejected ({raw})"),
        GatewayError::Unknown(_) => "the request failed".to_owned(),
    }
}

pub fn menu() -> Prompt {
    Prompt::new(CHOOSE_COUNTRY, menu_actions())
}

pub fn menu_with_rental(rental: &Rental) -> Prompt {
    Prompt::new(
        format!(
            "📱 You have an active number {} ({}).\n\
             Refresh to fetch the code, or cancel it before ordering a new one.",
            rental.phone_number.international(),
            rental.country_label
        ),
        rental_actions(rental),
    )
}

pub fn reserved(rental: &Rental, cost: Option<&Money>) -> Prompt {
    let mut text = format!(
        "✅ Number reserved in {}\n\n\
         📱 Number: {}\n\
         🆔 Activation id: {}\n",
        rental.country_label,
        rental.phone_number.international(),
        rental.activation_id
    );
    if let Some(cost) = cost {
        text.push_str(&format!("💸 Cost: {}\n", cost.to_display()));
    }
    text.push_str(
        "\n⏰ Wait for the verification code (up to 20 minutes), then press refresh to get it.",
    );
    Prompt::new(text, rental_actions(rental))
}

pub fn reserve_failed(country: &Country, err: &GatewayError) -> Prompt {
    Prompt::new(
        format!(
            "❌ Could not get a number in {}\n\n\
             Reason: {}\n\n\
             Try again or choose another country.",
            country.label,
            describe(err)
        ),
        menu_actions(),
    )
}

pub fn rental_in_progress(rental: &Rental) -> Prompt {
    Prompt::new(
        format!(
            "⚠️ You already have an active number {}.\n\
             Cancel it or wait for its code before ordering a new one.",
            rental.phone_number.international()
        ),
        rental_actions(rental),
    )
}

pub fn not_yet_arrived(rental: &Rental) -> Prompt {
    Prompt::new(
        format!(
            "⏰ The code has not arrived yet, please wait and try again.\n\n📱 Number: {}",
            rental.phone_number.international()
        ),
        rental_actions(rental),
    )
}

pub fn code_received(rental: &Rental) -> Prompt {
    let code = rental.code.as_ref().map(|it| it.as_str()).unwrap_or("?");
    Prompt::new(
        format!(
            "🎉 Code received!\n\n\
             📱 Number: {}\n\
             🔐 Verification code: {code}\n\n\
             Use the code to complete the verification now.",
            rental.phone_number.international()
        ),
        vec![Action::Acknowledge],
    )
}

pub fn poll_failed(rental: &Rental, err: &GatewayError) -> Prompt {
    Prompt::new(
        format!(
            "❌ Could not check the code: {}.\nPlease try again.",
            describe(err)
        ),
        rental_actions(rental),
    )
}

pub fn cancelled_by_gateway(rental: &Rental) -> Prompt {
    Prompt::new(
        format!(
            "❌ The number {} was cancelled by the service (expired or withdrawn).\n\n{CHOOSE_COUNTRY}",
            rental.phone_number.international()
        ),
        menu_actions(),
    )
}

pub fn cancel_confirmed() -> Prompt {
    Prompt::new(
        format!(
            "✅ Number cancelled\n💰 Funds returned\n\nYou can order a new number now.\n\n{CHOOSE_COUNTRY}"
        ),
        menu_actions(),
    )
}

pub fn cancel_failed(rental: &Rental, err: &GatewayError) -> Prompt {
    Prompt::new(
        format!(
            "❌ Could not cancel the number: {}.\nIt is still active, please try again.",
            describe(err)
        ),
        rental_actions(rental),
    )
}

pub fn already_delivered(rental: &Rental) -> Prompt {
    let mut prompt = code_received(rental);
    prompt.text = format!(
        "ℹ️ The code was already delivered, this number can no longer be cancelled.\n\n{}",
        prompt.text
    );
    prompt
}

pub fn nothing_to_do() -> Prompt {
    Prompt::new(
        format!("ℹ️ Nothing to do: you have no active number.\n\n{CHOOSE_COUNTRY}"),
        menu_actions(),
    )
}

pub fn stale_action(current: Option<&Rental>) -> Prompt {
    const STALE: &str = "ℹ️ Nothing to do: that number is no longer active.";
    match current {
        Some(rental) if rental.code.is_some() => {
            let mut prompt = code_received(rental);
            prompt.text = format!("{STALE}\n\n{}", prompt.text);
            prompt
        }
        Some(rental) => {
            let mut prompt = menu_with_rental(rental);
            prompt.text = format!("{STALE}\n\n{}", prompt.text);
            prompt
        }
        None => Prompt::new(format!("{STALE}\n\n{CHOOSE_COUNTRY}"), menu_actions()),
    }
}

pub fn still_waiting(rental: &Rental) -> Prompt {
    Prompt::new(
        format!(
            "ℹ️ Nothing to do yet: the code for {} has not arrived.",
            rental.phone_number.international()
        ),
        rental_actions(rental),
    )
}

pub fn balance(balance: &Balance) -> Prompt {
    Prompt::new(
        format!(
            "💰 Current balance: {} {}",
            balance.amount.to_display(),
            balance.currency
        ),
        vec![Action::Menu],
    )
}

pub fn balance_failed(err: &GatewayError) -> Prompt {
    Prompt::new(
        format!("❌ Could not fetch the balance: {}.", describe(err)),
        vec![Action::Menu],
    )
}
