//! Typed client for employees, their commissions and payouts.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/employees` | Paged list |
//! | GET    | `/employees/{id}` | Get by ID |
//! | GET    | `/employees/{id}/commissions` | Commission ledger |
//! | GET    | `/employees/{id}/payouts` | Payout history |
//! | POST   | `/employees/{id}/payouts` | Pay out commission |

use chrono::{DateTime, NaiveDate, Utc};
use desk_core::{EmployeeId, Money, PayoutId, TaskId, UserId};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::DeskApiError;
use crate::pagination::{ListQuery, Page};
use crate::transport::Transport;
use crate::wire;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Commission rate in percent of task fees.
    #[serde(default)]
    pub commission_rate: Option<f64>,
    /// Earned but not yet paid out.
    #[serde(default)]
    pub commission_balance: Money,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// One commission earned on a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commission {
    pub id: u64,
    pub employee_id: EmployeeId,
    #[serde(default)]
    pub task_id: Option<TaskId>,
    #[serde(default)]
    pub task_title: Option<String>,
    pub amount: Money,
    #[serde(default)]
    pub paid: bool,
    #[serde(default, with = "wire::opt_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A commission payout to an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    pub id: PayoutId,
    pub employee_id: EmployeeId,
    pub amount: Money,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default, with = "wire::opt_date")]
    pub paid_on: Option<NaiveDate>,
    #[serde(default, with = "wire::opt_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PayoutInput {
    pub amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "wire::opt_date::serialize"
    )]
    pub paid_on: Option<NaiveDate>,
}

/// Client for the `/employees` resource.
#[derive(Debug, Clone)]
pub struct EmployeesClient {
    transport: Transport,
}

impl EmployeesClient {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Calls `GET {base}/employees`.
    pub async fn list(&self, query: &ListQuery) -> Result<Page<Employee>, DeskApiError> {
        self.transport.get_page("employees", query).await
    }

    /// Calls `GET {base}/employees/{id}`.
    pub async fn get(&self, id: EmployeeId) -> Result<Option<Employee>, DeskApiError> {
        self.transport.get_optional(&format!("employees/{}", id.get())).await
    }

    /// Calls `GET {base}/employees/{id}/commissions`.
    pub async fn commissions(&self, id: EmployeeId) -> Result<Vec<Commission>, DeskApiError> {
        self.transport
            .get_json(&format!("employees/{}/commissions", id.get()), Vec::new())
            .await
    }

    /// Calls `GET {base}/employees/{id}/payouts`.
    pub async fn payouts(&self, id: EmployeeId) -> Result<Vec<Payout>, DeskApiError> {
        self.transport
            .get_json(&format!("employees/{}/payouts", id.get()), Vec::new())
            .await
    }

    /// Calls `POST {base}/employees/{id}/payouts`.
    pub async fn create_payout(
        &self,
        id: EmployeeId,
        input: &PayoutInput,
    ) -> Result<Payout, DeskApiError> {
        if input.amount.is_negative() || input.amount.is_zero() {
            return Err(DeskApiError::Invalid(format!(
                "payout amount must be positive, got {}",
                input.amount
            )));
        }
        self.transport
            .send_json(Method::POST, &format!("employees/{}/payouts", id.get()), input)
            .await
    }
}

/// Sum of commissions not yet paid out.
pub fn unpaid_total(commissions: &[Commission]) -> Money {
    commissions.iter().filter(|c| !c.paid).map(|c| c.amount).sum()
}
