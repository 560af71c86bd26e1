use dashmap::DashMap;

use super::rental::Rental;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Chat user identifier.
pub struct UserId(pub u64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-user storage of the active rental.
///
/// Holds at most one [`Rental`] per user. Implementations do not validate; the
/// session controller enforces the single-rental rule before calling [`set`].
///
/// [`set`]: RentalStore::set
pub trait RentalStore: Send + Sync {
    fn get(&self, user: UserId) -> Option<Rental>;

    fn set(&self, user: UserId, rental: Rental);

    /// Remove and return the user's rental.
    fn clear(&self, user: UserId) -> Option<Rental>;
}

/// Volatile store; contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryRentalStore {
    rentals: DashMap<UserId, Rental>,
}

impl InMemoryRentalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rentals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rentals.is_empty()
    }
}

impl RentalStore for InMemoryRentalStore {
    fn get(&self, user: UserId) -> Option<Rental> {
        self.rentals.get(&user).map(|entry| entry.value().clone())
    }

    fn set(&self, user: UserId, rental: Rental) {
        self.rentals.insert(user, rental);
    }

    fn clear(&self, user: UserId) -> Option<Rental> {
        self.rentals.remove(&user).map(|(_, rental)| rental)
    }
}
