//! Rental state machine.
//!
//! Pure functions over the user's current [`Rental`]: [`step`] decides what an
//! event needs (a local answer or a gateway call), [`resolve`] turns the
//! gateway reply into the next state. No I/O happens here.

use crate::client::GatewayResult;
use crate::domain::{
    ActivationId, ActivationStatus, Balance, FinalizeOutcome, RentalRequest, Reservation,
};

use super::prompt::{self, Prompt};
use super::rental::{Rental, RentalStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Menu,
    Select(RentalRequest),
    /// `target` is the activation the pressed button was rendered for.
    Refresh { target: Option<ActivationId> },
    Cancel { target: Option<ActivationId> },
    Acknowledge,
    CheckBalance,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Reserve(RentalRequest),
    Poll(ActivationId),
    Finalize(ActivationId, FinalizeOutcome),
    FetchBalance,
}

#[derive(Debug, Clone, PartialEq)]
/// Outcome of executing an [`Effect`].
pub enum Reply {
    Reserved(RentalRequest, GatewayResult<Reservation>),
    Polled(GatewayResult<ActivationStatus>),
    Finalized(FinalizeOutcome, GatewayResult<()>),
    Balance(GatewayResult<Balance>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Tracker entry after the transition; `None` means idle.
    pub next: Option<Rental>,
    pub prompt: Prompt,
    /// Best-effort call whose outcome does not affect `next` or `prompt`.
    pub follow_up: Option<Effect>,
}

impl Transition {
    fn to(next: Option<Rental>, prompt: Prompt) -> Self {
        Self {
            next,
            prompt,
            follow_up: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Done(Transition),
    Call(Effect),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState<'a> {
    Idle,
    AwaitingCode(&'a Rental),
    CodeReceived(&'a Rental),
}

impl<'a> SessionState<'a> {
    pub fn of(current: Option<&'a Rental>) -> Self {
        match current {
            None => Self::Idle,
            Some(rental) => match rental.status {
                RentalStatus::Reserved | RentalStatus::AwaitingCode => Self::AwaitingCode(rental),
                RentalStatus::CodeReceived => Self::CodeReceived(rental),
                RentalStatus::Cancelled => Self::Idle,
            },
        }
    }
}

fn is_stale(target: &Option<ActivationId>, rental: &Rental) -> bool {
    target
        .as_ref()
        .is_some_and(|target| *target != rental.activation_id)
}

fn keep(current: Option<&Rental>) -> Option<Rental> {
    current.cloned()
}

/// Decide how to handle `event` given the user's current rental.
pub fn step(current: Option<&Rental>, event: &Event) -> Step {
    let done = |next: Option<Rental>, prompt: Prompt| Step::Done(Transition::to(next, prompt));

    match (event, SessionState::of(current)) {
        (Event::Menu, SessionState::Idle) => done(None, prompt::menu()),
        (Event::Menu, SessionState::AwaitingCode(rental)) => {
            done(keep(current), prompt::menu_with_rental(rental))
        }
        // Leaving the code screen acknowledges it.
        (Event::Menu, SessionState::CodeReceived(_)) => done(None, prompt::menu()),

        (Event::Select(_), SessionState::AwaitingCode(rental)) => {
            done(keep(current), prompt::rental_in_progress(rental))
        }
        (Event::Select(request), _) => Step::Call(Effect::Reserve(request.clone())),

        (Event::Refresh { target } | Event::Cancel { target }, SessionState::Idle) => {
            if target.is_some() {
                done(None, prompt::stale_action(None))
            } else {
                done(None, prompt::nothing_to_do())
            }
        }
        (
            Event::Refresh { target } | Event::Cancel { target },
            SessionState::AwaitingCode(rental) | SessionState::CodeReceived(rental),
        ) if is_stale(target, rental) => done(keep(current), prompt::stale_action(current)),

        (Event::Refresh { .. }, SessionState::AwaitingCode(rental)) => {
            Step::Call(Effect::Poll(rental.activation_id.clone()))
        }
        (Event::Refresh { .. }, SessionState::CodeReceived(rental)) => {
            done(keep(current), prompt::code_received(rental))
        }

        (Event::Cancel { .. }, SessionState::AwaitingCode(rental)) => Step::Call(Effect::Finalize(
            rental.activation_id.clone(),
            FinalizeOutcome::Cancelled,
        )),
        (Event::Cancel { .. }, SessionState::CodeReceived(rental)) => {
            done(keep(current), prompt::already_delivered(rental))
        }

        (Event::Acknowledge, SessionState::CodeReceived(_)) => done(None, prompt::menu()),
        (Event::Acknowledge, SessionState::AwaitingCode(rental)) => {
            done(keep(current), prompt::still_waiting(rental))
        }
        (Event::Acknowledge, SessionState::Idle) => done(None, prompt::nothing_to_do()),

        (Event::CheckBalance, _) => Step::Call(Effect::FetchBalance),
    }
}

/// Complete a [`Step::Call`] with the gateway's reply.
pub fn resolve(current: Option<&Rental>, reply: Reply) -> Transition {
    match reply {
        Reply::Reserved(request, Ok(reservation)) => {
            let cost = reservation.cost.clone();
            let rental = Rental::reserved(&request, reservation).awaiting_code();
            let prompt = prompt::reserved(&rental, cost.as_ref());
            Transition::to(Some(rental), prompt)
        }
        // Never creates a rental; a terminal one being replaced is dropped.
        Reply::Reserved(request, Err(err)) => {
            Transition::to(None, prompt::reserve_failed(request.country(), &err))
        }

        Reply::Polled(result) => {
            let Some(rental) = current else {
                return Transition::to(None, prompt::nothing_to_do());
            };
            match result {
                Ok(ActivationStatus::CodeReceived(code)) => {
                    let received = rental.clone().with_code(code);
                    let prompt = prompt::code_received(&received);
                    Transition {
                        follow_up: Some(Effect::Finalize(
                            received.activation_id.clone(),
                            FinalizeOutcome::Confirmed,
                        )),
                        next: Some(received),
                        prompt,
                    }
                }
                Ok(ActivationStatus::AwaitingCode) => {
                    Transition::to(keep(current), prompt::not_yet_arrived(rental))
                }
                Ok(ActivationStatus::Cancelled) => {
                    let cancelled = rental.clone().cancelled();
                    Transition::to(None, prompt::cancelled_by_gateway(&cancelled))
                }
                Err(err) => Transition::to(keep(current), prompt::poll_failed(rental, &err)),
            }
        }

        Reply::Finalized(FinalizeOutcome::Cancelled, Ok(())) => {
            Transition::to(None, prompt::cancel_confirmed())
        }
        Reply::Finalized(FinalizeOutcome::Cancelled, Err(err)) => match current {
            Some(rental) => Transition::to(keep(current), prompt::cancel_failed(rental, &err)),
            None => Transition::to(None, prompt::nothing_to_do()),
        },
        // Confirmation only runs as a follow-up; it never changes the session.
        Reply::Finalized(FinalizeOutcome::Confirmed, _) => {
            let prompt = match SessionState::of(current) {
                SessionState::Idle => prompt::menu(),
                SessionState::AwaitingCode(rental) => prompt::menu_with_rental(rental),
                SessionState::CodeReceived(rental) => prompt::code_received(rental),
            };
            Transition::to(keep(current), prompt)
        }

        Reply::Balance(Ok(balance)) => Transition::to(keep(current), prompt::balance(&balance)),
        Reply::Balance(Err(err)) => Transition::to(keep(current), prompt::balance_failed(&err)),
    }
}
