//! # Resource Statuses
//!
//! Status and kind enums for tasks, invoices, transactions and
//! notifications, as the backend spells them. Each enum carries a
//! `#[serde(other)]` catch-all so a new server-side value degrades to a
//! neutral badge instead of failing the whole list.

use serde::{Deserialize, Serialize};

use crate::badge::{Badge, BadgeTone};

/// Task workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Review,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// Wire name, as sent in `status` filters and bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Review => "review",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::Unknown => "unknown",
        }
    }
}

impl Badge for TaskStatus {
    fn tone(&self) -> BadgeTone {
        match self {
            TaskStatus::Pending => BadgeTone::Warning,
            TaskStatus::InProgress => BadgeTone::Info,
            TaskStatus::Review => BadgeTone::Info,
            TaskStatus::Completed => BadgeTone::Success,
            TaskStatus::Cancelled => BadgeTone::Danger,
            TaskStatus::Unknown => BadgeTone::Neutral,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in progress",
            TaskStatus::Review => "in review",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "review" => Ok(TaskStatus::Review),
            "completed" | "done" => Ok(TaskStatus::Completed),
            "cancelled" | "canceled" => Ok(TaskStatus::Cancelled),
            other => Err(format!("unknown task status: {other}")),
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
    #[serde(other)]
    Unknown,
}

impl Badge for TaskPriority {
    fn tone(&self) -> BadgeTone {
        match self {
            TaskPriority::Low => BadgeTone::Neutral,
            TaskPriority::Medium => BadgeTone::Info,
            TaskPriority::High => BadgeTone::Warning,
            TaskPriority::Urgent => BadgeTone::Danger,
            TaskPriority::Unknown => BadgeTone::Neutral,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
            TaskPriority::Unknown => "unknown",
        }
    }
}

/// Invoice / receivable status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Unpaid,
    PartiallyPaid,
    Paid,
    Overdue,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl InvoiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Unpaid => "unpaid",
            InvoiceStatus::PartiallyPaid => "partially_paid",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
            InvoiceStatus::Unknown => "unknown",
        }
    }

    /// Whether the invoice still counts toward outstanding receivables.
    pub fn is_outstanding(self) -> bool {
        matches!(
            self,
            InvoiceStatus::Unpaid | InvoiceStatus::PartiallyPaid | InvoiceStatus::Overdue
        )
    }
}

impl Badge for InvoiceStatus {
    fn tone(&self) -> BadgeTone {
        match self {
            InvoiceStatus::Draft => BadgeTone::Neutral,
            InvoiceStatus::Unpaid => BadgeTone::Warning,
            InvoiceStatus::PartiallyPaid => BadgeTone::Info,
            InvoiceStatus::Paid => BadgeTone::Success,
            InvoiceStatus::Overdue => BadgeTone::Danger,
            InvoiceStatus::Cancelled => BadgeTone::Neutral,
            InvoiceStatus::Unknown => BadgeTone::Neutral,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Unpaid => "unpaid",
            InvoiceStatus::PartiallyPaid => "partially paid",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
            InvoiceStatus::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "draft" => Ok(InvoiceStatus::Draft),
            "unpaid" => Ok(InvoiceStatus::Unpaid),
            "partially_paid" | "partial" => Ok(InvoiceStatus::PartiallyPaid),
            "paid" => Ok(InvoiceStatus::Paid),
            "overdue" => Ok(InvoiceStatus::Overdue),
            "cancelled" | "canceled" => Ok(InvoiceStatus::Cancelled),
            other => Err(format!("unknown invoice status: {other}")),
        }
    }
}

/// Ledger transaction type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
    Payout,
    Refund,
    #[serde(other)]
    Unknown,
}

impl Badge for TransactionKind {
    fn tone(&self) -> BadgeTone {
        match self {
            TransactionKind::Income => BadgeTone::Success,
            TransactionKind::Expense => BadgeTone::Danger,
            TransactionKind::Payout => BadgeTone::Warning,
            TransactionKind::Refund => BadgeTone::Info,
            TransactionKind::Unknown => BadgeTone::Neutral,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
            TransactionKind::Payout => "payout",
            TransactionKind::Refund => "refund",
            TransactionKind::Unknown => "unknown",
        }
    }
}

/// Notification category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Task,
    Invoice,
    Payment,
    Commission,
    System,
    #[serde(other)]
    Unknown,
}

impl Badge for NotificationKind {
    fn tone(&self) -> BadgeTone {
        match self {
            NotificationKind::Task => BadgeTone::Info,
            NotificationKind::Invoice => BadgeTone::Warning,
            NotificationKind::Payment => BadgeTone::Success,
            NotificationKind::Commission => BadgeTone::Success,
            NotificationKind::System => BadgeTone::Neutral,
            NotificationKind::Unknown => BadgeTone::Neutral,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            NotificationKind::Task => "task",
            NotificationKind::Invoice => "invoice",
            NotificationKind::Payment => "payment",
            NotificationKind::Commission => "commission",
            NotificationKind::System => "system",
            NotificationKind::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_match_serde() {
        for status in [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed] {
            assert_eq!(serde_json::to_value(status).unwrap(), status.as_str());
        }
        assert_eq!(
            serde_json::to_value(InvoiceStatus::PartiallyPaid).unwrap(),
            InvoiceStatus::PartiallyPaid.as_str()
        );
    }

    #[test]
    fn unknown_values_fall_back_to_neutral() {
        let status: TaskStatus = serde_json::from_str(r#""on_hold""#).unwrap();
        assert_eq!(status, TaskStatus::Unknown);
        assert_eq!(status.tone(), BadgeTone::Neutral);

        let kind: TransactionKind = serde_json::from_str(r#""transfer""#).unwrap();
        assert_eq!(kind.tone(), BadgeTone::Neutral);
    }

    #[test]
    fn overdue_invoice_is_danger_and_outstanding() {
        let status: InvoiceStatus = serde_json::from_str(r#""overdue""#).unwrap();
        assert_eq!(status.tone(), BadgeTone::Danger);
        assert!(status.is_outstanding());
        assert!(!InvoiceStatus::Paid.is_outstanding());
        assert!(!InvoiceStatus::Draft.is_outstanding());
    }

    #[test]
    fn task_status_parses_loose_spellings() {
        assert_eq!("In Progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("done".parse::<TaskStatus>().unwrap(), TaskStatus::Completed);
        assert!("sleeping".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn invoice_status_parses_loose_spellings() {
        assert_eq!(
            "partially-paid".parse::<InvoiceStatus>().unwrap(),
            InvoiceStatus::PartiallyPaid
        );
        assert_eq!("canceled".parse::<InvoiceStatus>().unwrap(), InvoiceStatus::Cancelled);
    }

    #[test]
    fn priorities_order_by_urgency() {
        assert!(TaskPriority::Urgent > TaskPriority::High);
        assert!(TaskPriority::Low < TaskPriority::Medium);
        assert_eq!(TaskPriority::Urgent.tone(), BadgeTone::Danger);
    }
}
