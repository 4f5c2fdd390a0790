//! # Identifier Newtypes
//!
//! Newtype wrappers for the backend's resource identifiers. WordPress post
//! and user ids are positive integers; each resource gets its own type so
//! that a `TaskId` cannot be sent to an endpoint expecting a `ClientId`.
//!
//! All identifiers serialize transparently as bare integers, matching the
//! JSON the backend produces and accepts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DeskError;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Identifier namespace used in `Display` output and errors.
            pub const KIND: &'static str = $kind;

            /// Access the raw numeric id.
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}:{}", $kind, self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl FromStr for $name {
            type Err = DeskError;

            /// Parse from either the bare number (`42`) or the display form (`client:42`).
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let digits = s
                    .trim()
                    .strip_prefix(concat!($kind, ":"))
                    .unwrap_or(s.trim());
                match digits.parse::<u64>() {
                    Ok(0) | Err(_) => Err(DeskError::InvalidIdentifier {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                    Ok(n) => Ok(Self(n)),
                }
            }
        }
    };
}

define_id!(
    /// A client (individual or company) the office works for.
    ClientId,
    "client"
);
define_id!(
    /// A task assigned to an employee, usually tied to a client.
    TaskId,
    "task"
);
define_id!(
    /// A receivable / invoice issued to a client.
    InvoiceId,
    "invoice"
);
define_id!(
    /// An office employee who may earn commissions.
    EmployeeId,
    "employee"
);
define_id!(
    /// A ledger transaction (payment received, expense, payout).
    TransactionId,
    "transaction"
);
define_id!(
    /// An in-app notification for the current user.
    NotificationId,
    "notification"
);
define_id!(
    /// A free-form tag attached to clients or tasks.
    TagId,
    "tag"
);
define_id!(
    /// A WordPress user account.
    UserId,
    "user"
);
define_id!(
    /// A commission payout made to an employee.
    PayoutId,
    "payout"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind() {
        assert_eq!(ClientId(7).to_string(), "client:7");
        assert_eq!(InvoiceId(1200).to_string(), "invoice:1200");
    }

    #[test]
    fn parses_bare_and_prefixed_forms() {
        assert_eq!("42".parse::<TaskId>().unwrap(), TaskId(42));
        assert_eq!("task:42".parse::<TaskId>().unwrap(), TaskId(42));
        assert_eq!(" 9 ".parse::<EmployeeId>().unwrap(), EmployeeId(9));
    }

    #[test]
    fn rejects_zero_and_garbage() {
        assert!("0".parse::<ClientId>().is_err());
        assert!("abc".parse::<ClientId>().is_err());
        assert!("".parse::<ClientId>().is_err());
        // Wrong namespace prefix is not silently accepted.
        assert!("task:3".parse::<ClientId>().is_err());
    }

    #[test]
    fn serializes_as_bare_integer() {
        let json = serde_json::to_string(&NotificationId(15)).unwrap();
        assert_eq!(json, "15");
        let back: NotificationId = serde_json::from_str("15").unwrap();
        assert_eq!(back, NotificationId(15));
    }
}
