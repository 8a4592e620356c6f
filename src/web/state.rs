use std::sync::Arc;

use crate::{
    Config,
    gateway::{
        GatewayPaymentProcessor, HttpObjectStore, IdentityVerifier, JwtIdentityVerifier,
        ObjectStore, PaymentProcessor,
    },
    model::ModelManager,
};

#[derive(Debug, Clone)]
pub struct AppState {
    mm: ModelManager,
    identity: Arc<dyn IdentityVerifier>,
    storage: Arc<dyn ObjectStore>,
    payments: Arc<dyn PaymentProcessor>,
}

impl AppState {
    pub fn new(
        mm: ModelManager,
        identity: Arc<dyn IdentityVerifier>,
        storage: Arc<dyn ObjectStore>,
        payments: Arc<dyn PaymentProcessor>,
    ) -> Self {
        Self {
            mm,
            identity,
            storage,
            payments,
        }
    }

    /// Wires the hosted collaborators described in the config.
    pub fn from_config(mm: ModelManager, config: &Config) -> Self {
        Self::new(
            mm,
            Arc::new(JwtIdentityVerifier::from_config(config.identity())),
            Arc::new(HttpObjectStore::from_config(config.storage())),
            Arc::new(GatewayPaymentProcessor::from_config(config.payment())),
        )
    }

    pub fn pool(&self) -> &ModelManager {
        &self.mm
    }

    pub fn identity(&self) -> &dyn IdentityVerifier {
        self.identity.as_ref()
    }

    pub fn storage(&self) -> &dyn ObjectStore {
        self.storage.as_ref()
    }

    pub fn payments(&self) -> &dyn PaymentProcessor {
        self.payments.as_ref()
    }
}
