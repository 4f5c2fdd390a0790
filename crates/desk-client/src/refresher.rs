//! Background nonce refresh.
//!
//! Nonces expire server-side after a fixed lifetime, so the client refreshes
//! proactively instead of waiting for a rejected request. On start the
//! refresher checks when the nonce was last refreshed and refreshes at once
//! if that is older than [`RefreshPolicy::stale_after`] (or unknown). After
//! that it refreshes every [`RefreshPolicy::interval`] for as long as the
//! session stays authenticated.
//!
//! A tick that fires while the previous refresh is still running is skipped.
//! Failures are logged and left to the next tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::transport::Transport;

/// When the background refresher runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// Time between scheduled refreshes.
    pub interval: Duration,
    /// Age after which a nonce is refreshed immediately on start.
    pub stale_after: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30 * 60),
            stale_after: Duration::from_secs(25 * 60),
        }
    }
}

impl RefreshPolicy {
    /// Whether a nonce obtained at `last` should be replaced now.
    ///
    /// An unknown refresh time counts as stale. A timestamp in the future
    /// (clock skew) does not.
    pub fn is_stale(&self, last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let Some(last) = last else {
            return true;
        };
        match chrono::Duration::from_std(self.stale_after) {
            Ok(limit) => now.signed_duration_since(last) >= limit,
            Err(_) => false,
        }
    }
}

/// Spawns the background refresh task.
pub struct NonceRefresher;

impl NonceRefresher {
    /// Start refreshing on the current tokio runtime.
    pub fn spawn(transport: Transport, policy: RefreshPolicy) -> RefresherHandle {
        let in_flight = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(run(transport, policy, in_flight.clone()));
        RefresherHandle { task, in_flight }
    }
}

async fn run(transport: Transport, policy: RefreshPolicy, in_flight: Arc<AtomicBool>) {
    if !transport.session().is_authenticated() {
        tracing::debug!("not authenticated, nonce refresher not started");
        return;
    }

    let last = transport.session().last_refresh().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "unreadable last refresh time, treating nonce as stale");
        None
    });
    let has_nonce = matches!(transport.session().nonce(), Ok(Some(_)));
    if !has_nonce || policy.is_stale(last, Utc::now()) {
        tracing::info!("session nonce is stale, refreshing now");
        tick(&transport, &in_flight);
    }

    let mut ticker = tokio::time::interval_at(Instant::now() + policy.interval, policy.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        if !transport.session().is_authenticated() {
            tracing::info!("session ended, stopping nonce refresher");
            return;
        }
        tick(&transport, &in_flight);
    }
}

fn tick(transport: &Transport, in_flight: &Arc<AtomicBool>) {
    if in_flight.swap(true, Ordering::SeqCst) {
        tracing::debug!("previous nonce refresh still running, skipping tick");
        return;
    }
    let transport = transport.clone();
    let guard = InFlight(in_flight.clone());
    tokio::spawn(async move {
        let _guard = guard;
        match transport.refresh_nonce().await {
            Ok(_) => tracing::debug!("background nonce refresh succeeded"),
            Err(e) => tracing::warn!(error = %e, "background nonce refresh failed"),
        }
    });
}

/// Clears the overlap flag when a refresh finishes or is cancelled.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Handle to a running refresher. Dropping it stops the refresher.
#[derive(Debug)]
pub struct RefresherHandle {
    task: JoinHandle<()>,
    in_flight: Arc<AtomicBool>,
}

impl RefresherHandle {
    pub fn stop(&self) {
        self.task.abort();
    }

    /// False once stopped, or after the session was logged out.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Whether a refresh started by this refresher is in progress.
    pub fn is_refreshing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }
}

impl Drop for RefresherHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn default_cadence() {
        let policy = RefreshPolicy::default();
        assert_eq!(policy.interval, Duration::from_secs(1800));
        assert_eq!(policy.stale_after, Duration::from_secs(1500));
    }

    #[test]
    fn staleness_boundaries() {
        let policy = RefreshPolicy::default();
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let minutes_ago = |m| Some(now - chrono::Duration::minutes(m));

        assert!(policy.is_stale(None, now));
        assert!(!policy.is_stale(minutes_ago(10), now));
        assert!(!policy.is_stale(minutes_ago(24), now));
        assert!(policy.is_stale(minutes_ago(25), now));
        assert!(policy.is_stale(minutes_ago(90), now));
        assert!(!policy.is_stale(Some(now + chrono::Duration::minutes(5)), now));
    }

    #[test]
    fn overlap_flag_clears_on_drop() {
        let flag = Arc::new(AtomicBool::new(true));
        drop(InFlight(flag.clone()));
        assert!(!flag.load(Ordering::SeqCst));
    }
}
