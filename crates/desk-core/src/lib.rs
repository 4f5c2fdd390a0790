//! # desk-core -- Foundational Types for the Office Desk Stack
//!
//! Leaf crate of the workspace. Everything here is pure: no I/O, no async,
//! no HTTP. The client crate and the CLI build on these types.
//!
//! ## Contents
//!
//! 1. **Identifier newtypes.** `ClientId`, `TaskId`, `InvoiceId`, ... wrap the
//!    backend's integer ids so a task id cannot be passed where a client id
//!    is expected.
//!
//! 2. **`Money`.** Amounts are integer minor units (halalas). Floats from the
//!    wire are converted once at the boundary and never stored.
//!
//! 3. **Display formatting.** Saudi phone normalisation and WhatsApp deep
//!    links, SAR currency strings, dates and due-date status.
//!
//! 4. **Badges and capabilities.** Status-to-tone mappings for tables and
//!    cards, and the capability set used to gate actions by role.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `desk-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod badge;
pub mod capability;
pub mod display;
pub mod error;
pub mod identity;
pub mod money;
pub mod phone;
pub mod status;

pub use badge::{Badge, BadgeTone};
pub use capability::{Capabilities, Capability};
pub use display::{due_status, format_date, format_datetime, format_sar, DueStatus};
pub use error::DeskError;
pub use identity::{
    ClientId, EmployeeId, InvoiceId, NotificationId, PayoutId, TagId, TaskId, TransactionId,
    UserId,
};
pub use money::Money;
pub use phone::{normalize_saudi_phone, whatsapp_link, SAUDI_COUNTRY_CODE};
pub use status::{InvoiceStatus, NotificationKind, TaskPriority, TaskStatus, TransactionKind};
