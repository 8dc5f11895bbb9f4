use crate::error::Result;
use crate::storage::Store;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct HealthService {
    store: Arc<dyn Store>,
}

impl HealthService {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Pings the store to check connectivity.
    ///
    /// # Errors
    /// Returns an error if the store is unreachable.
    pub async fn check_store(&self) -> Result<()> {
        self.store.ping().await
    }
}
