use std::sync::Arc;

use chatline_db::MessageStore;

use crate::auth::TokenVerifier;
use crate::ingress::IngressProcessor;

/// Dependencies shared by the HTTP handlers
///
/// Built once in `main` and handed to the router; tests build it from
/// in-memory doubles.
#[derive(Clone)]
pub struct AppContext {
    pub ingress: Arc<IngressProcessor>,
    pub store: Arc<dyn MessageStore>,
    pub verifier: Arc<TokenVerifier>,
}

impl AppContext {
    pub fn new(
        ingress: Arc<IngressProcessor>,
        store: Arc<dyn MessageStore>,
        verifier: Arc<TokenVerifier>,
    ) -> Self {
        Self {
            ingress,
            store,
            verifier,
        }
    }
}
