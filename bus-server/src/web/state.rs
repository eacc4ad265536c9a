//! Application state for the web layer.

use std::sync::Arc;

use crate::accounts::Accounts;
use crate::booking::SeatLayout;
use crate::config::ServerConfig;
use crate::store::Store;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Document store
    pub store: Store,

    /// Signup and login over the store's users
    pub accounts: Accounts,

    /// The fixed seat layout shared by every schedule
    pub layout: Arc<SeatLayout>,

    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(store: Store, config: ServerConfig) -> Self {
        Self {
            accounts: Accounts::new(store.clone(), config.hash_cost),
            store,
            layout: Arc::new(SeatLayout::generate()),
            config: Arc::new(config),
        }
    }
}
