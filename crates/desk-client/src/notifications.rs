//! In-app notifications.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/notifications` | Paged list (`unread=1` to filter) |
//! | GET    | `/notifications/unread-count` | Badge counter |
//! | POST   | `/notifications/{id}/read` | Mark one read |
//! | POST   | `/notifications/read-all` | Mark all read |
//!
//! The unread counter is polled; see [`crate::QueryOptions::notifications`].

use chrono::{DateTime, Utc};
use desk_core::{NotificationId, NotificationKind};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::DeskApiError;
use crate::pagination::{ListQuery, Page};
use crate::transport::Transport;
use crate::wire;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    #[serde(rename = "type", default = "unknown_kind")]
    pub kind: NotificationKind,
    pub title: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "read")]
    pub is_read: bool,
    /// Path of the record the notification refers to, e.g. `/tasks/5`.
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default, with = "wire::opt_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

fn unknown_kind() -> NotificationKind {
    NotificationKind::Unknown
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CountBody {
    Wrapped {
        #[serde(alias = "unread", alias = "unread_count")]
        count: u64,
    },
    Bare(u64),
}

#[derive(Debug, Clone)]
pub struct NotificationsClient {
    transport: Transport,
}

impl NotificationsClient {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Calls `GET {base}/notifications`.
    pub async fn list(&self, query: &ListQuery) -> Result<Page<Notification>, DeskApiError> {
        self.transport.get_page("notifications", query).await
    }

    /// Calls `GET {base}/notifications/unread-count`.
    pub async fn unread_count(&self) -> Result<u64, DeskApiError> {
        let body: CountBody = self
            .transport
            .get_json("notifications/unread-count", Vec::new())
            .await?;
        Ok(match body {
            CountBody::Wrapped { count } | CountBody::Bare(count) => count,
        })
    }

    /// Calls `POST {base}/notifications/{id}/read`.
    pub async fn mark_read(&self, id: NotificationId) -> Result<(), DeskApiError> {
        self.transport
            .send_empty(Method::POST, &format!("notifications/{}/read", id.get()))
            .await
    }

    /// Calls `POST {base}/notifications/read-all`.
    pub async fn mark_all_read(&self) -> Result<(), DeskApiError> {
        self.transport
            .send_empty(Method::POST, "notifications/read-all")
            .await
    }
}
