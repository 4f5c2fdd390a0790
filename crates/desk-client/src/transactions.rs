//! Typed client for the office ledger.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/transactions` | Paged list (`type`, `from`, `to`) |
//! | POST   | `/transactions` | Record income or expense |

use chrono::{DateTime, NaiveDate, Utc};
use desk_core::{ClientId, EmployeeId, InvoiceId, Money, TransactionId, TransactionKind};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::DeskApiError;
use crate::pagination::{ListQuery, Page};
use crate::transport::Transport;
use crate::wire;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Money,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub client_id: Option<ClientId>,
    #[serde(default)]
    pub invoice_id: Option<InvoiceId>,
    #[serde(default)]
    pub employee_id: Option<EmployeeId>,
    #[serde(default, with = "wire::opt_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, with = "wire::opt_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Amount with sign applied: income and refunds received are positive.
    pub fn signed_amount(&self) -> Money {
        match self.kind {
            TransactionKind::Expense | TransactionKind::Payout => -self.amount.abs(),
            _ => self.amount,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionInput {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<ClientId>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "wire::opt_date::serialize"
    )]
    pub date: Option<NaiveDate>,
}

/// Client for the `/transactions` resource.
#[derive(Debug, Clone)]
pub struct TransactionsClient {
    transport: Transport,
}

impl TransactionsClient {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Calls `GET {base}/transactions`.
    pub async fn list(&self, query: &ListQuery) -> Result<Page<Transaction>, DeskApiError> {
        self.transport.get_page("transactions", query).await
    }

    /// Calls `POST {base}/transactions`.
    pub async fn create(&self, input: &TransactionInput) -> Result<Transaction, DeskApiError> {
        if input.kind == TransactionKind::Unknown {
            return Err(DeskApiError::Invalid("transaction type is required".into()));
        }
        self.transport.send_json(Method::POST, "transactions", input).await
    }
}

/// Net of a set of transactions (income minus expenses and payouts).
pub fn net_total(rows: &[Transaction]) -> Money {
    rows.iter().map(Transaction::signed_amount).sum()
}
