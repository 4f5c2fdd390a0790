//! Single-flight nonce refresh.
//!
//! The backend rejects requests whose `X-WP-Nonce` has expired with a
//! 401/403 and a JSON body such as
//! `{"code":"rest_cookie_invalid_nonce","message":"Cookie check failed"}`.
//! When several requests hit that at once, exactly one of them fetches a new
//! nonce; the rest wait on the same refresh and share its outcome.
//!
//! ## Invariants
//!
//! - At most one refresh is in flight per [`NonceGate`].
//! - A caller whose sent nonce has already been replaced reuses the current
//!   nonce instead of starting another refresh.
//! - When a refresh fails, every waiter observes the same error, and callers
//!   that arrive with the same stale nonce within [`FAILURE_COOLDOWN`] get
//!   that error too instead of triggering another refresh.
//! - A refresh whose future is dropped releases its waiters with
//!   [`DeskApiError::RefreshAbandoned`] and frees the slot.
//! - A remembered failure belongs to the credentials that produced it;
//!   [`NonceGate::clear_failure`] drops it when those change.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Deserialize;
use tokio::sync::watch;

use crate::error::DeskApiError;

/// Header carrying the session nonce.
pub const NONCE_HEADER: &str = "X-WP-Nonce";

/// Error codes the backend uses for an expired or invalid nonce.
const NONCE_ERROR_CODES: &[&str] = &[
    "rest_cookie_invalid_nonce",
    "invalid_nonce",
    "rest_nonce_invalid",
    "nonce_expired",
];

/// How long a failed refresh answers for the nonce it tried to replace.
pub const FAILURE_COOLDOWN: Duration = Duration::from_secs(2);

/// Response body of `GET auth/nonce`.
#[derive(Debug, Clone, Deserialize)]
pub struct NonceResponse {
    pub nonce: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
}

/// Whether a response status and body mean "your nonce is no good".
pub fn is_nonce_failure(status: u16, body: &str) -> bool {
    if status != 401 && status != 403 {
        return false;
    }
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.code)
        .is_some_and(|code| NONCE_ERROR_CODES.contains(&code.as_str()))
}

type Outcome = Result<String, Arc<DeskApiError>>;

#[derive(Debug)]
struct Failure {
    replaced: Option<String>,
    error: Arc<DeskApiError>,
    at: Instant,
}

#[derive(Debug, Default)]
struct Slot {
    inflight: Option<watch::Receiver<Option<Outcome>>>,
    last_failure: Option<Failure>,
}

enum Role {
    Done(Result<String, DeskApiError>),
    Follower(watch::Receiver<Option<Outcome>>),
    Leader(watch::Sender<Option<Outcome>>),
}

/// Coordinates nonce refreshes so only one runs at a time.
#[derive(Debug, Default)]
pub struct NonceGate {
    slot: Mutex<Slot>,
    refreshes: AtomicU64,
}

impl NonceGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of refreshes this gate has actually started.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::SeqCst)
    }

    /// Whether a refresh is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        self.slot.lock().inflight.is_some()
    }

    /// Forget the last failed refresh so the next caller refreshes again.
    pub fn clear_failure(&self) {
        self.slot.lock().last_failure = None;
    }

    /// Obtain a nonce newer than `stale`.
    ///
    /// `current` reads the nonce the session holds right now. `fetch` performs
    /// the actual refresh and must store the new nonce in the session before
    /// resolving; it runs only if this caller ends up leading the refresh.
    pub async fn refresh<C, F, Fut>(
        &self,
        stale: Option<&str>,
        current: C,
        fetch: F,
    ) -> Result<String, DeskApiError>
    where
        C: Fn() -> Option<String>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, DeskApiError>>,
    {
        let role = {
            let mut slot = self.slot.lock();
            if let Some(rx) = slot.inflight.as_ref() {
                Role::Follower(rx.clone())
            } else if let Some(fresh) = current().filter(|c| Some(c.as_str()) != stale) {
                Role::Done(Ok(fresh))
            } else if let Some(failure) = slot
                .last_failure
                .as_ref()
                .filter(|f| f.replaced.as_deref() == stale && f.at.elapsed() < FAILURE_COOLDOWN)
            {
                Role::Done(Err(DeskApiError::NonceRefresh(failure.error.clone())))
            } else {
                let (tx, rx) = watch::channel(None);
                slot.inflight = Some(rx);
                Role::Leader(tx)
            }
        };

        match role {
            Role::Done(result) => result,
            Role::Follower(rx) => Self::follow(rx).await,
            Role::Leader(tx) => self.lead(tx, stale, fetch).await,
        }
    }

    async fn follow(mut rx: watch::Receiver<Option<Outcome>>) -> Result<String, DeskApiError> {
        let settled = rx
            .wait_for(Option::is_some)
            .await
            .map(|v| v.clone())
            .map_err(|_| DeskApiError::RefreshAbandoned)?;
        match settled {
            Some(Ok(nonce)) => Ok(nonce),
            Some(Err(e)) => Err(DeskApiError::NonceRefresh(e)),
            None => Err(DeskApiError::RefreshAbandoned),
        }
    }

    async fn lead<F, Fut>(
        &self,
        tx: watch::Sender<Option<Outcome>>,
        stale: Option<&str>,
        fetch: F,
    ) -> Result<String, DeskApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, DeskApiError>>,
    {
        let guard = SlotGuard { gate: self };
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        tracing::info!("refreshing session nonce");

        let outcome: Outcome = fetch().await.map_err(Arc::new);

        {
            let mut slot = self.slot.lock();
            slot.last_failure = match &outcome {
                Ok(_) => None,
                Err(error) => Some(Failure {
                    replaced: stale.map(str::to_string),
                    error: error.clone(),
                    at: Instant::now(),
                }),
            };
        }
        drop(guard);
        // Waiters that cloned the receiver before the slot was cleared still see this.
        let _ = tx.send(Some(outcome.clone()));

        match outcome {
            Ok(nonce) => Ok(nonce),
            Err(e) => {
                tracing::warn!("nonce refresh failed: {e}");
                Err(DeskApiError::NonceRefresh(e))
            }
        }
    }
}

/// Clears the in-flight slot when the leader finishes or is dropped.
struct SlotGuard<'a> {
    gate: &'a NonceGate,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.gate.slot.lock().inflight = None;
    }
}
