//! Inline keyboard rendering and the `verb[:arg]` callback data codec.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::domain::{ActivationId, Country};
use crate::session::Action;

const COUNTRY: &str = "country";
const BALANCE: &str = "balance";
const REFRESH: &str = "refresh";
const CANCEL: &str = "cancel";
const ACKNOWLEDGE: &str = "ack";
const MENU: &str = "menu";

/// Countries are laid out this many buttons per row.
const COUNTRIES_PER_ROW: usize = 2;

pub fn encode_action(action: &Action) -> String {
    match action {
        Action::SelectCountry(country) => format!("{COUNTRY}:{}", country.key),
        Action::CheckBalance => BALANCE.to_owned(),
        Action::Refresh(id) => format!("{REFRESH}:{id}"),
        Action::Cancel(id) => format!("{CANCEL}:{id}"),
        Action::Acknowledge => ACKNOWLEDGE.to_owned(),
        Action::Menu => MENU.to_owned(),
    }
}

/// Parse callback data; `None` for anything this bot never produced.
pub fn decode_action(data: &str) -> Option<Action> {
    let (verb, arg) = match data.split_once(':') {
        Some((verb, arg)) => (verb, Some(arg)),
        None => (data, None),
    };

    match (verb, arg) {
        (COUNTRY, Some(key)) => Country::by_key(key).ok().map(Action::SelectCountry),
        (REFRESH, Some(id)) => ActivationId::new(id).ok().map(Action::Refresh),
        (CANCEL, Some(id)) => ActivationId::new(id).ok().map(Action::Cancel),
        (BALANCE, None) => Some(Action::CheckBalance),
        (ACKNOWLEDGE, None) => Some(Action::Acknowledge),
        (MENU, None) => Some(Action::Menu),
        _ => None,
    }
}

pub fn markup(actions: &[Action]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    let mut countries: Vec<InlineKeyboardButton> = Vec::new();

    for action in actions {
        let button = InlineKeyboardButton::callback(action.label(), encode_action(action));
        if matches!(action, Action::SelectCountry(_)) {
            countries.push(button);
            if countries.len() == COUNTRIES_PER_ROW {
                rows.push(std::mem::take(&mut countries));
            }
        } else {
            if !countries.is_empty() {
                rows.push(std::mem::take(&mut countries));
            }
            rows.push(vec![button]);
        }
    }
    if !countries.is_empty() {
        rows.push(countries);
    }

    InlineKeyboardMarkup::new(rows)
}
