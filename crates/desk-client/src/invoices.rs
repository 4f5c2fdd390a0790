//! Typed client for receivables (invoices) and their payments.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/invoices` | Paged list (`status`, `client_id`) |
//! | GET    | `/invoices/{id}` | Get by ID |
//! | POST   | `/invoices` | Create |
//! | POST   | `/invoices/{id}/payments` | Record a payment |
//! | DELETE | `/invoices/{id}` | Delete |
//! | GET    | `/invoices/summary` | Receivables totals |

use chrono::{DateTime, NaiveDate, Utc};
use desk_core::{ClientId, InvoiceId, InvoiceStatus, Money, TaskId};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::DeskApiError;
use crate::pagination::{ListQuery, Page};
use crate::transport::Transport;
use crate::wire;

/// A receivable issued to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    #[serde(default, alias = "invoice_number")]
    pub number: Option<String>,
    pub client_id: ClientId,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub task_id: Option<TaskId>,
    pub status: InvoiceStatus,
    pub amount: Money,
    #[serde(default)]
    pub paid_amount: Money,
    #[serde(default, with = "wire::opt_date")]
    pub issue_date: Option<NaiveDate>,
    #[serde(default, with = "wire::opt_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Invoice {
    /// Amount still owed. Never negative.
    pub fn remaining(&self) -> Money {
        let rest = self.amount - self.paid_amount;
        if rest.is_negative() {
            Money::ZERO
        } else {
            rest
        }
    }
}

/// Fields for a new invoice.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceInput {
    pub client_id: ClientId,
    pub amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "wire::opt_date::serialize"
    )]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// How a payment was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Card,
    Cheque,
    #[serde(other)]
    Other,
}

/// A payment recorded against an invoice.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentInput {
    pub amount: Money,
    pub method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "wire::opt_date::serialize"
    )]
    pub paid_on: Option<NaiveDate>,
}

/// The payment as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: u64,
    pub invoice_id: InvoiceId,
    pub amount: Money,
    #[serde(default)]
    pub method: Option<PaymentMethod>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default, with = "wire::opt_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Receivables totals shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceivablesSummary {
    #[serde(default)]
    pub total_invoiced: Money,
    #[serde(default)]
    pub total_paid: Money,
    #[serde(default)]
    pub outstanding: Money,
    #[serde(default)]
    pub overdue: Money,
    #[serde(default)]
    pub overdue_count: u64,
}

/// Client for the `/invoices` resource.
#[derive(Debug, Clone)]
pub struct InvoicesClient {
    transport: Transport,
}

impl InvoicesClient {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Calls `GET {base}/invoices`.
    pub async fn list(&self, query: &ListQuery) -> Result<Page<Invoice>, DeskApiError> {
        self.transport.get_page("invoices", query).await
    }

    /// Calls `GET {base}/invoices/{id}`.
    pub async fn get(&self, id: InvoiceId) -> Result<Option<Invoice>, DeskApiError> {
        self.transport.get_optional(&format!("invoices/{}", id.get())).await
    }

    /// Calls `POST {base}/invoices`.
    pub async fn create(&self, input: &InvoiceInput) -> Result<Invoice, DeskApiError> {
        self.transport.send_json(Method::POST, "invoices", input).await
    }

    /// Record a payment; the backend recomputes the invoice status.
    ///
    /// Calls `POST {base}/invoices/{id}/payments`.
    pub async fn record_payment(
        &self,
        id: InvoiceId,
        payment: &PaymentInput,
    ) -> Result<Payment, DeskApiError> {
        self.transport
            .send_json(Method::POST, &format!("invoices/{}/payments", id.get()), payment)
            .await
    }

    /// Calls `DELETE {base}/invoices/{id}`.
    pub async fn delete(&self, id: InvoiceId) -> Result<(), DeskApiError> {
        self.transport
            .send_empty(Method::DELETE, &format!("invoices/{}", id.get()))
            .await
    }

    /// Calls `GET {base}/invoices/summary`.
    pub async fn summary(&self) -> Result<ReceivablesSummary, DeskApiError> {
        self.transport.get_json("invoices/summary", Vec::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_is_clamped_at_zero() {
        let invoice: Invoice = serde_json::from_str(
            r#"{"id": 9, "client_id": 12, "status": "paid", "amount": "1000", "paid_amount": 1200.5}"#,
        )
        .unwrap();
        assert_eq!(invoice.remaining(), Money::ZERO);
        assert!(!invoice.status.is_outstanding());
    }

    #[test]
    fn payment_body_uses_string_amounts() {
        let body = PaymentInput {
            amount: Money::from_minor(50_050),
            method: PaymentMethod::BankTransfer,
            reference: None,
            paid_on: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"amount": "500.50", "method": "bank_transfer"})
        );
    }
}
