use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::client::Gateway;
use crate::domain::{RentalRequest, ServiceCode};

use super::machine::{self, Effect, Event, Reply, Step};
use super::prompt::{Action, Prompt};
use super::rental::Rental;
use super::store::{RentalStore, UserId};

/// Drives the rental state machine for every user.
///
/// Interactions of one user are serialized: each holds that user's lock for
/// its whole read, gateway call and write cycle. Different users proceed
/// concurrently.
pub struct SessionController {
    gateway: Arc<dyn Gateway>,
    store: Arc<dyn RentalStore>,
    service: ServiceCode,
    locks: DashMap<UserId, Arc<Mutex<()>>>,
}

impl SessionController {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        store: Arc<dyn RentalStore>,
        service: ServiceCode,
    ) -> Self {
        Self {
            gateway,
            store,
            service,
            locks: DashMap::new(),
        }
    }

    /// Service code used for every reservation.
    pub fn service(&self) -> &ServiceCode {
        &self.service
    }

    /// Current tracker entry of `user`.
    pub fn rental(&self, user: UserId) -> Option<Rental> {
        self.store.get(user)
    }

    /// Event triggered by pressing `action`.
    pub fn event_for(&self, action: &Action) -> Event {
        match action {
            Action::SelectCountry(country) => {
                Event::Select(RentalRequest::new(*country, self.service.clone()))
            }
            Action::CheckBalance => Event::CheckBalance,
            Action::Refresh(id) => Event::Refresh {
                target: Some(id.clone()),
            },
            Action::Cancel(id) => Event::Cancel {
                target: Some(id.clone()),
            },
            Action::Acknowledge => Event::Acknowledge,
            Action::Menu => Event::Menu,
        }
    }

    pub async fn menu(&self, user: UserId) -> Prompt {
        self.handle(user, Event::Menu).await
    }

    pub async fn select_country_service(&self, user: UserId, request: RentalRequest) -> Prompt {
        self.handle(user, Event::Select(request)).await
    }

    pub async fn refresh(&self, user: UserId) -> Prompt {
        self.handle(user, Event::Refresh { target: None }).await
    }

    pub async fn cancel(&self, user: UserId) -> Prompt {
        self.handle(user, Event::Cancel { target: None }).await
    }

    pub async fn acknowledge(&self, user: UserId) -> Prompt {
        self.handle(user, Event::Acknowledge).await
    }

    pub async fn check_balance(&self, user: UserId) -> Prompt {
        self.handle(user, Event::CheckBalance).await
    }

    /// Apply one interaction and return the prompt to show.
    pub async fn handle(&self, user: UserId, event: Event) -> Prompt {
        let lock = self.user_lock(user);
        let prompt = {
            let _guard = lock.lock().await;
            self.handle_locked(user, event).await
        };
        drop(lock);
        self.locks
            .remove_if(&user, |_, lock| Arc::strong_count(lock) == 1);
        prompt
    }

    async fn handle_locked(&self, user: UserId, event: Event) -> Prompt {
        debug!(user_id = %user, event = ?event, "handling interaction");
        let current = self.store.get(user);

        let transition = match machine::step(current.as_ref(), &event) {
            Step::Done(transition) => transition,
            Step::Call(effect) => {
                let reply = self.execute(user, effect).await;
                machine::resolve(current.as_ref(), reply)
            }
        };

        self.commit(user, current, transition.next);

        if let Some(effect) = transition.follow_up {
            let reply = self.execute(user, effect).await;
            debug!(user_id = %user, reply = ?reply, "follow-up finished");
        }

        transition.prompt
    }

    fn user_lock(&self, user: UserId) -> Arc<Mutex<()>> {
        self.locks.entry(user).or_default().clone()
    }

    fn commit(&self, user: UserId, current: Option<Rental>, next: Option<Rental>) {
        if current == next {
            return;
        }
        match next {
            Some(rental) => self.store.set(user, rental),
            None => {
                self.store.clear(user);
            }
        }
    }

    async fn execute(&self, user: UserId, effect: Effect) -> Reply {
        match effect {
            Effect::Reserve(request) => {
                let result = self.gateway.reserve_number(&request).await;
                match &result {
                    Ok(reservation) => info!(
                        user_id = %user,
                        country = request.country().key,
                        service = request.service().as_str(),
                        activation_id = %reservation.activation_id,
                        "number reserved"
                    ),
                    Err(err) => info!(
                        user_id = %user,
                        country = request.country().key,
                        error = %err,
                        "reservation failed"
                    ),
                }
                Reply::Reserved(request, result)
            }
            Effect::Poll(activation_id) => {
                let result = self.gateway.poll_status(&activation_id).await;
                if let Err(err) = &result {
                    warn!(user_id = %user, activation_id = %activation_id, error = %err, "status poll failed");
                }
                Reply::Polled(result)
            }
            Effect::Finalize(activation_id, outcome) => {
                let result = self.gateway.finalize(&activation_id, outcome).await;
                match &result {
                    Ok(()) => info!(
                        user_id = %user,
                        activation_id = %activation_id,
                        outcome = ?outcome,
                        "activation finalized"
                    ),
                    Err(err) => warn!(
                        user_id = %user,
                        activation_id = %activation_id,
                        outcome = ?outcome,
                        error = %err,
                        "failed to finalize activation"
                    ),
                }
                Reply::Finalized(outcome, result)
            }
            Effect::FetchBalance => Reply::Balance(self.gateway.get_balance().await),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    use super::*;
    use crate::client::{BoxFuture, GatewayError, GatewayResult};
    use crate::domain::{
        ActivationId, ActivationStatus, Balance, Country, FinalizeOutcome, Money, RentedNumber,
        Reservation, VerificationCode,
    };
    use crate::session::{InMemoryRentalStore, RentalStatus};

    #[derive(Default)]
    struct ScriptedGateway {
        reservations: StdMutex<VecDeque<GatewayResult<Reservation>>>,
        statuses: StdMutex<VecDeque<GatewayResult<ActivationStatus>>>,
        finalizations: StdMutex<VecDeque<GatewayResult<()>>>,
        calls: StdMutex<Vec<String>>,
    }

    impl ScriptedGateway {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Gateway for ScriptedGateway {
        fn get_balance(&self) -> BoxFuture<'_, GatewayResult<Balance>> {
            self.record("getBalance".to_owned());
            Box::pin(async {
                Ok(Balance {
                    amount: Money::new("10").unwrap(),
                    currency: "RUB",
                })
            })
        }

        fn reserve_number<'a>(
            &'a self,
            request: &'a RentalRequest,
        ) -> BoxFuture<'a, GatewayResult<Reservation>> {
            self.record(format!("getNumber:{}", request.country().id.value()));
            let next = self.reservations.lock().unwrap().pop_front();
            Box::pin(async move { next.unwrap_or(Err(GatewayError::ConnectionFailed)) })
        }

        fn poll_status<'a>(
            &'a self,
            activation_id: &'a ActivationId,
        ) -> BoxFuture<'a, GatewayResult<ActivationStatus>> {
            self.record(format!("getStatus:{activation_id}"));
            let next = self.statuses.lock().unwrap().pop_front();
            Box::pin(async move { next.unwrap_or(Err(GatewayError::ConnectionFailed)) })
        }

        fn finalize<'a>(
            &'a self,
            activation_id: &'a ActivationId,
            outcome: FinalizeOutcome,
        ) -> BoxFuture<'a, GatewayResult<()>> {
            self.record(format!("setStatus:{activation_id}:{}", outcome.code()));
            let next = self.finalizations.lock().unwrap().pop_front();
            Box::pin(async move { next.unwrap_or(Err(GatewayError::ConnectionFailed)) })
        }
    }

    fn setup(
        gateway: ScriptedGateway,
    ) -> (
        Arc<ScriptedGateway>,
        Arc<InMemoryRentalStore>,
        SessionController,
    ) {
        let gateway = Arc::new(gateway);
        let store = Arc::new(InMemoryRentalStore::new());
        let controller = SessionController::new(
            gateway.clone(),
            store.clone(),
            ServiceCode::new("wa").unwrap(),
        );
        (gateway, store, controller)
    }

    fn reservation() -> GatewayResult<Reservation> {
        Ok(Reservation {
            activation_id: ActivationId::new("778899").unwrap(),
            phone_number: RentedNumber::new("971501234567").unwrap(),
            cost: None,
        })
    }

    fn uae(controller: &SessionController) -> RentalRequest {
        RentalRequest::new(Country::by_key("uae").unwrap(), controller.service().clone())
    }

    const USER: UserId = UserId(42);

    #[tokio::test]
    async fn second_selection_is_rejected_without_gateway_call() {
        let gateway = ScriptedGateway::default();
        gateway.reservations.lock().unwrap().push_back(reservation());
        let (gateway, store, controller) = setup(gateway);

        controller.select_country_service(USER, uae(&controller)).await;
        let prompt = controller
            .select_country_service(USER, uae(&controller))
            .await;

        assert!(prompt.text.contains("already have an active number"));
        assert_eq!(gateway.calls(), vec!["getNumber:95"]);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn no_numbers_creates_no_entry() {
        let gateway = ScriptedGateway::default();
        gateway
            .reservations
            .lock()
            .unwrap()
            .push_back(Err(GatewayError::NoNumbersAvailable));
        let (_, store, controller) = setup(gateway);

        let prompt = controller
            .select_country_service(USER, uae(&controller))
            .await;
        assert!(prompt.text.contains("no numbers available"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn code_received_triggers_best_effort_confirmation() {
        let gateway = ScriptedGateway::default();
        gateway.reservations.lock().unwrap().push_back(reservation());
        gateway
            .statuses
            .lock()
            .unwrap()
            .push_back(Ok(ActivationStatus::CodeReceived(
                VerificationCode::new("123456").unwrap(),
            )));
        // No scripted finalization: the confirmation fails.
        let (gateway, _, controller) = setup(gateway);

        controller.select_country_service(USER, uae(&controller)).await;
        let prompt = controller.refresh(USER).await;

        assert!(prompt.text.contains("123456"));
        assert_eq!(
            controller.rental(USER).map(|it| it.status),
            Some(RentalStatus::CodeReceived)
        );
        assert_eq!(
            gateway.calls(),
            vec!["getNumber:95", "getStatus:778899", "setStatus:778899:1"]
        );
    }

    #[tokio::test]
    async fn failed_cancel_leaves_rental_untouched() {
        let gateway = ScriptedGateway::default();
        gateway.reservations.lock().unwrap().push_back(reservation());
        gateway
            .finalizations
            .lock()
            .unwrap()
            .push_back(Err(GatewayError::Unknown("ACCESS_ACTIVATION".to_owned())));
        let (_, _, controller) = setup(gateway);

        controller.select_country_service(USER, uae(&controller)).await;
        let before = controller.rental(USER);
        controller.cancel(USER).await;

        assert_eq!(controller.rental(USER), before);
        assert_eq!(
            before.map(|it| it.status),
            Some(RentalStatus::AwaitingCode)
        );
    }

    #[tokio::test]
    async fn acknowledged_cancel_clears_rental() {
        let gateway = ScriptedGateway::default();
        gateway.reservations.lock().unwrap().push_back(reservation());
        gateway.finalizations.lock().unwrap().push_back(Ok(()));
        let (gateway, store, controller) = setup(gateway);

        controller.select_country_service(USER, uae(&controller)).await;
        let prompt = controller.cancel(USER).await;

        assert!(prompt.text.contains("Funds returned"));
        assert!(store.is_empty());
        assert_eq!(gateway.calls().last().map(String::as_str), Some("setStatus:778899:8"));
    }

    #[tokio::test]
    async fn refresh_without_rental_is_local() {
        let (gateway, _, controller) = setup(ScriptedGateway::default());
        let prompt = controller.refresh(USER).await;
        assert!(prompt.text.contains("Nothing to do"));
        let prompt = controller.cancel(USER).await;
        assert!(prompt.text.contains("Nothing to do"));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn actions_map_to_events() {
        let (_, _, controller) = setup(ScriptedGateway::default());
        let id = ActivationId::new("1").unwrap();
        assert_eq!(
            controller.event_for(&Action::Cancel(id.clone())),
            Event::Cancel {
                target: Some(id.clone())
            }
        );
        assert_eq!(
            controller.event_for(&Action::SelectCountry(Country::by_key("qatar").unwrap())),
            Event::Select(RentalRequest::new(
                Country::by_key("qatar").unwrap(),
                ServiceCode::new("wa").unwrap()
            ))
        );
        assert_eq!(controller.event_for(&Action::Menu), Event::Menu);
    }

    #[tokio::test]
    async fn balance_reaches_gateway_and_locks_are_released() {
        let (gateway, _, controller) = setup(ScriptedGateway::default());
        let prompt = controller.check_balance(USER).await;
        assert!(prompt.text.contains("10.00 RUB"));
        assert_eq!(gateway.calls(), vec!["getBalance"]);
        assert!(controller.locks.is_empty());
    }
}
