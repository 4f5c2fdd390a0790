//! # desk-client -- Typed async client for the office desk REST backend
//!
//! The backend is a WordPress plugin exposing clients, tasks, invoices,
//! employees, the ledger and notifications under one REST namespace. Every
//! call is authenticated with a basic-auth token plus a rotating nonce
//! (`X-WP-Nonce`).
//!
//! ## Architecture
//!
//! - [`Transport`] attaches credentials, retries transient failures, and on a
//!   nonce rejection joins a single-flight refresh ([`nonce::NonceGate`])
//!   before retrying the request once.
//! - [`NonceRefresher`] refreshes the nonce in the background while the
//!   session is authenticated.
//! - [`SessionStore`] and [`PreferenceStore`] persist state through a
//!   [`KeyValueStore`]; [`FileStore`] keeps it in `state.json`.
//! - [`QueryCache`] caches fetched data with staleness windows, prefix
//!   invalidation, optimistic updates and polling.
//! - One sub-client per resource, reached through [`DeskClient`].
//!
//! ## Path Convention
//!
//! `DeskApiConfig::base_url` is the plugin's REST root
//! (`https://office.example/wp-json/office/v1`); resource paths such as
//! `clients/12` are joined onto it.

pub mod cache;
pub mod clients;
pub mod config;
pub mod employees;
pub mod error;
pub mod invoices;
pub mod nonce;
pub mod notifications;
pub mod pagination;
pub mod prefs;
pub mod refresher;
pub(crate) mod retry;
pub mod session;
pub mod store;
pub mod tags;
pub mod tasks;
pub mod transactions;
pub mod transport;
pub mod users;
pub(crate) mod wire;

pub use cache::{PollHandle, QueryCache, QueryKey, QueryOptions, Rollback};
pub use config::{basic_token, state_dir_from_env, ConfigError, DeskApiConfig};
pub use error::DeskApiError;
pub use pagination::{InfiniteList, ListQuery, Page};
pub use prefs::{ModalState, PreferenceStore};
pub use refresher::{NonceRefresher, RefreshPolicy, RefresherHandle};
pub use retry::RetryPolicy;
pub use session::SessionStore;
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use transport::Transport;
pub use users::CurrentUser;

use std::sync::Arc;

use parking_lot::Mutex;

/// Result of [`DeskClient::health_check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    /// REST root that was probed.
    pub url: String,
    /// HTTP status of the answer, if any arrived.
    pub status: Option<u16>,
    /// Transport error when nothing answered.
    pub error: Option<String>,
    /// Whether the local session holds credentials.
    pub authenticated: bool,
}

impl HealthReport {
    /// Any HTTP answer, even an error status, means the backend is reachable.
    pub fn is_reachable(&self) -> bool {
        self.status.is_some()
    }
}

/// Top-level office desk client. Holds the transport, local state and one
/// sub-client per resource. Cheap to clone.
#[derive(Debug, Clone)]
pub struct DeskClient {
    transport: Transport,
    refresh_policy: RefreshPolicy,
    prefs: PreferenceStore,
    cache: QueryCache,
    modals: ModalState,
    refresher: Arc<Mutex<Option<RefresherHandle>>>,
    clients: clients::ClientsClient,
    tasks: tasks::TasksClient,
    invoices: invoices::InvoicesClient,
    employees: employees::EmployeesClient,
    transactions: transactions::TransactionsClient,
    notifications: notifications::NotificationsClient,
    tags: tags::TagsClient,
    users: users::UsersClient,
}

impl DeskClient {
    /// Create a client over an explicit state store.
    pub fn new(config: DeskApiConfig, store: Arc<dyn KeyValueStore>) -> Result<Self, DeskApiError> {
        let session = SessionStore::new(store.clone());
        let transport = Transport::new(&config, session)?;

        Ok(Self {
            refresh_policy: config.refresh,
            prefs: PreferenceStore::new(store),
            cache: QueryCache::new(),
            modals: ModalState::new(),
            refresher: Arc::new(Mutex::new(None)),
            clients: clients::ClientsClient::new(transport.clone()),
            tasks: tasks::TasksClient::new(transport.clone()),
            invoices: invoices::InvoicesClient::new(transport.clone()),
            employees: employees::EmployeesClient::new(transport.clone()),
            transactions: transactions::TransactionsClient::new(transport.clone()),
            notifications: notifications::NotificationsClient::new(transport.clone()),
            tags: tags::TagsClient::new(transport.clone()),
            users: users::UsersClient::new(transport.clone()),
            transport,
        })
    }

    /// Create a client whose state lives in `config.state_file()`.
    pub fn open(config: DeskApiConfig) -> Result<Self, DeskApiError> {
        let store = FileStore::open(config.state_file())?;
        Self::new(config, Arc::new(store))
    }

    /// Authenticate with a WordPress application password.
    ///
    /// Stores the token, obtains a nonce and loads the user. On any failure
    /// the session is left logged out.
    pub async fn login(&self, username: &str, app_password: &str) -> Result<CurrentUser, DeskApiError> {
        let token = basic_token(username, app_password)?;
        let session = self.session();
        session.logout()?;
        session.set_token(&token)?;
        // A failure remembered for earlier credentials must not answer for these.
        self.transport.gate().clear_failure();

        let result = async {
            self.transport.refresh_nonce().await?;
            self.users.me().await
        }
        .await;

        match result {
            Ok(user) => {
                session.login(&token, &user)?;
                self.cache.clear();
                tracing::info!(user = %user.id, "logged in");
                Ok(user)
            }
            Err(e) => {
                if let Err(clear) = session.logout() {
                    tracing::warn!(error = %clear, "failed to clear session after login failure");
                }
                Err(e)
            }
        }
    }

    /// Stop the refresher and forget the session, cached data and open modals.
    pub fn logout(&self) -> Result<(), DeskApiError> {
        if let Some(handle) = self.refresher.lock().take() {
            handle.stop();
        }
        self.session().logout()?;
        self.transport.gate().clear_failure();
        self.cache.clear();
        self.modals.close_all();
        Ok(())
    }

    /// Start (or restart) the background nonce refresher.
    pub fn start_nonce_refresher(&self) -> Result<(), DeskApiError> {
        if !self.session().is_authenticated() {
            return Err(DeskApiError::NotAuthenticated);
        }
        let handle = NonceRefresher::spawn(self.transport.clone(), self.refresh_policy);
        if let Some(previous) = self.refresher.lock().replace(handle) {
            previous.stop();
        }
        Ok(())
    }

    pub fn refresh_policy(&self) -> RefreshPolicy {
        self.refresh_policy
    }

    pub fn refresher_running(&self) -> bool {
        self.refresher
            .lock()
            .as_ref()
            .is_some_and(RefresherHandle::is_running)
    }

    /// Probe the REST root without credentials.
    pub async fn health_check(&self) -> HealthReport {
        let url = self.transport.url("");
        let authenticated = self.session().is_authenticated();
        match self.transport.probe().await {
            Ok(status) => HealthReport {
                url,
                status: Some(status),
                error: None,
                authenticated,
            },
            Err(e) => {
                tracing::warn!(%url, error = %e, "office API unreachable");
                HealthReport {
                    url,
                    status: None,
                    error: Some(e.to_string()),
                    authenticated,
                }
            }
        }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn session(&self) -> &SessionStore {
        self.transport.session()
    }

    pub fn prefs(&self) -> &PreferenceStore {
        &self.prefs
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn modals(&self) -> &ModalState {
        &self.modals
    }

    pub fn clients(&self) -> &clients::ClientsClient {
        &self.clients
    }

    pub fn tasks(&self) -> &tasks::TasksClient {
        &self.tasks
    }

    pub fn invoices(&self) -> &invoices::InvoicesClient {
        &self.invoices
    }

    pub fn employees(&self) -> &employees::EmployeesClient {
        &self.employees
    }

    pub fn transactions(&self) -> &transactions::TransactionsClient {
        &self.transactions
    }

    pub fn notifications(&self) -> &notifications::NotificationsClient {
        &self.notifications
    }

    pub fn tags(&self) -> &tags::TagsClient {
        &self.tags
    }

    pub fn users(&self) -> &users::UsersClient {
        &self.users
    }
}
