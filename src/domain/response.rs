use crate::domain::value::{ActivationId, Money, RentedNumber, VerificationCode};

pub const BALANCE_CURRENCY: &str = "RUB";

#[derive(Debug, Clone, PartialEq)]
pub struct Balance {
    pub amount: Money,
    pub currency: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub activation_id: ActivationId,
    pub phone_number: RentedNumber,
    /// Only reported by `getNumberV2`.
    pub cost: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationStatus {
    CodeReceived(VerificationCode),
    AwaitingCode,
    Cancelled,
}
