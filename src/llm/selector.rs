//! Choice between the local and hosted responders

use std::sync::Arc;
use tracing::debug;

use super::core::provider::Responder;

/// Which responder serves a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveModel {
    Local,
    Hosted,
}

/// Holds both responders and picks one per request
///
/// The decision depends only on the static `hosted_enabled` flag and on
/// whether the hosted responder initialised, never on request content.
/// It is re-evaluated on every call and never cached.
#[derive(Clone)]
pub struct ModelSelector {
    local: Arc<dyn Responder>,
    hosted: Arc<dyn Responder>,
    hosted_enabled: bool,
}

impl ModelSelector {
    pub fn new(local: Arc<dyn Responder>, hosted: Arc<dyn Responder>, hosted_enabled: bool) -> Self {
        Self {
            local,
            hosted,
            hosted_enabled,
        }
    }

    /// Decide which responder is active right now
    pub fn active(&self) -> ActiveModel {
        if self.hosted_enabled && self.hosted.is_available() {
            ActiveModel::Hosted
        } else {
            ActiveModel::Local
        }
    }

    /// Resolve the active responder
    pub fn select(&self) -> Arc<dyn Responder> {
        let active = self.active();
        debug!(model = ?active, "Selected responder");
        match active {
            ActiveModel::Hosted => self.hosted.clone(),
            ActiveModel::Local => self.local.clone(),
        }
    }

    /// Whether hosted generation was requested by configuration
    pub fn hosted_enabled(&self) -> bool {
        self.hosted_enabled
    }
}
