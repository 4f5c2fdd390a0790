//! Typed client for office tasks.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/tasks` | Paged list (`status`, `priority`, `assignee`, `client_id`) |
//! | GET    | `/tasks/{id}` | Get by ID |
//! | POST   | `/tasks` | Create |
//! | PUT    | `/tasks/{id}` | Update |
//! | PATCH  | `/tasks/{id}` | Status change |
//! | DELETE | `/tasks/{id}` | Delete |

use chrono::{DateTime, NaiveDate, Utc};
use desk_core::{ClientId, EmployeeId, Money, TaskId, TaskPriority, TaskStatus};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::DeskApiError;
use crate::pagination::{ListQuery, Page};
use crate::transport::Transport;
use crate::wire;

/// A task assigned to an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(default = "default_priority")]
    pub priority: TaskPriority,
    #[serde(default)]
    pub client_id: Option<ClientId>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default, alias = "assignee")]
    pub assigned_to: Option<EmployeeId>,
    #[serde(default)]
    pub assignee_name: Option<String>,
    #[serde(default, with = "wire::opt_date")]
    pub due_date: Option<NaiveDate>,
    /// Fee charged for the task; commissions are computed from it.
    #[serde(default)]
    pub fee: Money,
    #[serde(default, with = "wire::opt_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "wire::opt_datetime")]
    pub completed_at: Option<DateTime<Utc>>,
}

fn default_priority() -> TaskPriority {
    TaskPriority::Medium
}

impl Task {
    pub fn is_open(&self) -> bool {
        !matches!(self.status, TaskStatus::Completed | TaskStatus::Cancelled)
    }
}

/// Fields for creating or updating a task.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<ClientId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<EmployeeId>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "wire::opt_date::serialize"
    )]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<Money>,
}

#[derive(Serialize)]
struct StatusChange {
    status: TaskStatus,
}

/// Client for the `/tasks` resource.
#[derive(Debug, Clone)]
pub struct TasksClient {
    transport: Transport,
}

impl TasksClient {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Calls `GET {base}/tasks`.
    pub async fn list(&self, query: &ListQuery) -> Result<Page<Task>, DeskApiError> {
        self.transport.get_page("tasks", query).await
    }

    /// Calls `GET {base}/tasks/{id}`.
    pub async fn get(&self, id: TaskId) -> Result<Option<Task>, DeskApiError> {
        self.transport.get_optional(&format!("tasks/{}", id.get())).await
    }

    /// Calls `POST {base}/tasks`.
    pub async fn create(&self, input: &TaskInput) -> Result<Task, DeskApiError> {
        self.transport.send_json(Method::POST, "tasks", input).await
    }

    /// Calls `PUT {base}/tasks/{id}`.
    pub async fn update(&self, id: TaskId, input: &TaskInput) -> Result<Task, DeskApiError> {
        self.transport
            .send_json(Method::PUT, &format!("tasks/{}", id.get()), input)
            .await
    }

    /// Move a task to `status`.
    ///
    /// Calls `PATCH {base}/tasks/{id}` with `{"status": ...}`.
    pub async fn update_status(&self, id: TaskId, status: TaskStatus) -> Result<Task, DeskApiError> {
        self.transport
            .send_json(Method::PATCH, &format!("tasks/{}", id.get()), &StatusChange { status })
            .await
    }

    /// Calls `DELETE {base}/tasks/{id}`.
    pub async fn delete(&self, id: TaskId) -> Result<(), DeskApiError> {
        self.transport
            .send_empty(Method::DELETE, &format!("tasks/{}", id.get()))
            .await
    }
}
