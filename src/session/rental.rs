use crate::domain::{
    ActivationId, RentalRequest, RentedNumber, Reservation, ServiceCode, VerificationCode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RentalStatus {
    Reserved,
    AwaitingCode,
    CodeReceived,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A number currently rented by one user.
pub struct Rental {
    pub activation_id: ActivationId,
    pub phone_number: RentedNumber,
    pub country_label: String,
    pub service_code: ServiceCode,
    pub status: RentalStatus,
    /// Set once the gateway reported the verification code.
    pub code: Option<VerificationCode>,
}

impl Rental {
    /// Rental created from a successful reservation.
    pub fn reserved(request: &RentalRequest, reservation: Reservation) -> Self {
        Self {
            activation_id: reservation.activation_id,
            phone_number: reservation.phone_number,
            country_label: request.country().label.to_owned(),
            service_code: request.service().clone(),
            status: RentalStatus::Reserved,
            code: None,
        }
    }

    pub fn awaiting_code(self) -> Self {
        Self {
            status: RentalStatus::AwaitingCode,
            ..self
        }
    }

    pub fn with_code(self, code: VerificationCode) -> Self {
        Self {
            status: RentalStatus::CodeReceived,
            code: Some(code),
            ..self
        }
    }

    pub fn cancelled(self) -> Self {
        Self {
            status: RentalStatus::Cancelled,
            ..self
        }
    }

    /// Reserved or waiting for a code; blocks new reservations.
    pub fn is_live(&self) -> bool {
        matches!(
            self.status,
            RentalStatus::Reserved | RentalStatus::AwaitingCode
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Country;

    fn rental() -> Rental {
        let request = RentalRequest::new(
            Country::by_key("uae").unwrap(),
            ServiceCode::new("wa").unwrap(),
        );
        Rental::reserved(
            &request,
            Reservation {
                activation_id: ActivationId::new("778899").unwrap(),
                phone_number: RentedNumber::new("971501234567").unwrap(),
                cost: None,
            },
        )
    }

    #[test]
    fn status_progression() {
        let reserved = rental();
        assert_eq!(reserved.status, RentalStatus::Reserved);
        assert_eq!(reserved.country_label, "UAE 🇦🇪");
        assert!(reserved.is_live());

        let waiting = reserved.awaiting_code();
        assert!(waiting.is_live());

        let received = waiting.clone().with_code(VerificationCode::new("4521").unwrap());
        assert_eq!(received.status, RentalStatus::CodeReceived);
        assert_eq!(received.code.as_ref().map(VerificationCode::as_str), Some("4521"));
        assert!(!received.is_live());

        assert!(!waiting.cancelled().is_live());
    }
}
