//! Single-flight guard for credential refresh.
//!
//! At most one refresh runs at a time. Under [`RefreshPolicy::SharedAwait`]
//! later callers join the in-flight refresh and receive its outcome; under
//! [`RefreshPolicy::FailFast`] they are turned away immediately.

use std::sync::{Mutex, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tracing::debug;

use crate::config::RefreshPolicy;

type RefreshFlight = Shared<BoxFuture<'static, bool>>;

pub(crate) struct RefreshGate {
    policy: RefreshPolicy,
    in_flight: Mutex<Option<RefreshFlight>>,
}

impl RefreshGate {
    pub(crate) const fn new(policy: RefreshPolicy) -> Self {
        Self {
            policy,
            in_flight: Mutex::new(None),
        }
    }

    /// Run the refresh produced by `start`, or join the one already running.
    ///
    /// `start` is only invoked when no refresh is in flight. Returns whether
    /// the refresh succeeded.
    pub(crate) async fn run<F>(&self, start: F) -> bool
    where
        F: FnOnce() -> BoxFuture<'static, bool>,
    {
        let flight = {
            let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);

            match slot.as_ref().filter(|flight| flight.peek().is_none()) {
                Some(running) => match self.policy {
                    RefreshPolicy::SharedAwait => {
                        debug!("Joining in-flight token refresh");
                        running.clone()
                    }
                    RefreshPolicy::FailFast => {
                        debug!("Token refresh already in flight; rejecting caller");
                        return false;
                    }
                },
                None => {
                    let flight = start().shared();
                    *slot = Some(flight.clone());
                    flight
                }
            }
        };

        let succeeded = flight.await;

        // Whoever observes completion first frees the slot; a newer flight
        // that has not finished yet is left alone.
        let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|f| f.peek().is_some()) {
            *slot = None;
        }

        succeeded
    }
}
