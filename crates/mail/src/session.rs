//! Session teardown on authentication failure

use log::info;
use std::sync::Arc;

use crate::store::InMemoryAppStore;
use crate::sync::AuthFailureHandler;

/// Route of the login surface
pub const LOGIN_ROUTE: &str = "/login";

/// Moves the host to another surface
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Build the handler the sync loop calls on authentication failure:
/// forget the stored credentials, then navigate to the login surface.
pub fn logout_handler(
    store: Arc<InMemoryAppStore>,
    navigator: Arc<dyn Navigator>,
) -> AuthFailureHandler {
    Arc::new(move || {
        info!("Logging out, stored credentials rejected");
        store.clear_user_credentials();
        navigator.navigate(LOGIN_ROUTE);
    })
}
