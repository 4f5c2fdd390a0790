//! Typed client for the office's client register.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/clients` | Paged list (`search`, `type`, `tag`) |
//! | GET    | `/clients/{id}` | Get by ID |
//! | POST   | `/clients` | Create |
//! | PUT    | `/clients/{id}` | Update |
//! | DELETE | `/clients/{id}` | Delete |

use chrono::{DateTime, Utc};
use desk_core::{ClientId, EmployeeId, Money, TagId};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::DeskApiError;
use crate::pagination::{ListQuery, Page};
use crate::transport::Transport;
use crate::wire;

/// Whether a client is a person or a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientKind {
    Individual,
    Company,
    #[serde(other)]
    Unknown,
}

/// A client record.
///
/// Only `id` and `name` are guaranteed; the rest default when the backend
/// omits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<ClientKind>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub commercial_register: Option<String>,
    #[serde(default)]
    pub tax_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub assigned_employee: Option<EmployeeId>,
    #[serde(default)]
    pub tags: Vec<TagId>,
    #[serde(default)]
    pub balance: Money,
    #[serde(default, with = "wire::opt_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Fields for creating or updating a client. Unset fields are left out of
/// the request body so updates only touch what changed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClientInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ClientKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commercial_register: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_employee: Option<EmployeeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<TagId>>,
}

/// Client for the `/clients` resource.
#[derive(Debug, Clone)]
pub struct ClientsClient {
    transport: Transport,
}

impl ClientsClient {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// One page of clients.
    ///
    /// Calls `GET {base}/clients?page=..&per_page=..`.
    pub async fn list(&self, query: &ListQuery) -> Result<Page<Client>, DeskApiError> {
        self.transport.get_page("clients", query).await
    }

    /// Calls `GET {base}/clients/{id}`; `None` when the client does not exist.
    pub async fn get(&self, id: ClientId) -> Result<Option<Client>, DeskApiError> {
        self.transport.get_optional(&format!("clients/{}", id.get())).await
    }

    /// Calls `POST {base}/clients`.
    pub async fn create(&self, input: &ClientInput) -> Result<Client, DeskApiError> {
        self.transport.send_json(Method::POST, "clients", input).await
    }

    /// Calls `PUT {base}/clients/{id}`.
    pub async fn update(&self, id: ClientId, input: &ClientInput) -> Result<Client, DeskApiError> {
        self.transport
            .send_json(Method::PUT, &format!("clients/{}", id.get()), input)
            .await
    }

    /// Calls `DELETE {base}/clients/{id}`.
    pub async fn delete(&self, id: ClientId) -> Result<(), DeskApiError> {
        self.transport
            .send_empty(Method::DELETE, &format!("clients/{}", id.get()))
            .await
    }
}
