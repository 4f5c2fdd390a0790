//! # Capabilities -- Role-Gated Actions
//!
//! The backend reports the current user's WordPress capabilities, either as
//! a map (`{"manage_clients": true, "edit_posts": false}`) or as a list of
//! granted names. Views and CLI commands check a [`Capability`] before
//! offering an action; the server still enforces the same rules.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

/// Capability that grants everything (WordPress administrators).
const ADMIN_CAPABILITY: &str = "manage_options";

/// Well-known capabilities checked by the office desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ViewClients,
    ManageClients,
    ViewTasks,
    ManageTasks,
    ViewInvoices,
    ManageInvoices,
    ViewEmployees,
    ManageEmployees,
    ManagePayouts,
    ViewReports,
    ManageSettings,
}

impl Capability {
    pub const ALL: [Capability; 11] = [
        Capability::ViewClients,
        Capability::ManageClients,
        Capability::ViewTasks,
        Capability::ManageTasks,
        Capability::ViewInvoices,
        Capability::ManageInvoices,
        Capability::ViewEmployees,
        Capability::ManageEmployees,
        Capability::ManagePayouts,
        Capability::ViewReports,
        Capability::ManageSettings,
    ];

    /// Capability name as the backend spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::ViewClients => "view_clients",
            Capability::ManageClients => "manage_clients",
            Capability::ViewTasks => "view_tasks",
            Capability::ManageTasks => "manage_tasks",
            Capability::ViewInvoices => "view_invoices",
            Capability::ManageInvoices => "manage_invoices",
            Capability::ViewEmployees => "view_employees",
            Capability::ManageEmployees => "manage_employees",
            Capability::ManagePayouts => "manage_payouts",
            Capability::ViewReports => "view_reports",
            Capability::ManageSettings => "manage_settings",
        }
    }

    /// The `manage_*` capability that implies this `view_*` one, if any.
    fn implied_by(self) -> Option<Capability> {
        match self {
            Capability::ViewClients => Some(Capability::ManageClients),
            Capability::ViewTasks => Some(Capability::ManageTasks),
            Capability::ViewInvoices => Some(Capability::ManageInvoices),
            Capability::ViewEmployees => Some(Capability::ManageEmployees),
            _ => None,
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of capabilities granted to the current user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Capabilities(BTreeSet<String>);

impl Capabilities {
    pub fn new<I, S>(granted: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(granted.into_iter().map(Into::into).collect())
    }

    /// Raw check by backend name.
    pub fn has(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn is_admin(&self) -> bool {
        self.has(ADMIN_CAPABILITY)
    }

    /// Whether the user may perform `cap`.
    ///
    /// Administrators can do everything; a `manage_*` grant implies the
    /// matching `view_*`.
    pub fn can(&self, cap: Capability) -> bool {
        self.is_admin()
            || self.has(cap.as_str())
            || cap.implied_by().is_some_and(|c| self.has(c.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for Capabilities {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Map(std::collections::BTreeMap<String, bool>),
            List(Vec<String>),
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Map(map) => Self(
                map.into_iter()
                    .filter_map(|(name, granted)| granted.then_some(name))
                    .collect(),
            ),
            Wire::List(list) => Self(list.into_iter().collect()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_form_keeps_only_granted() {
        let caps: Capabilities =
            serde_json::from_str(r#"{"view_clients": true, "manage_invoices": false}"#).unwrap();
        assert!(caps.can(Capability::ViewClients));
        assert!(!caps.can(Capability::ManageInvoices));
    }

    #[test]
    fn list_form_is_accepted() {
        let caps: Capabilities = serde_json::from_str(r#"["manage_tasks"]"#).unwrap();
        assert!(caps.can(Capability::ManageTasks));
        assert!(caps.can(Capability::ViewTasks), "manage implies view");
        assert!(!caps.can(Capability::ViewClients));
    }

    #[test]
    fn admin_can_do_everything() {
        let caps = Capabilities::new(["manage_options"]);
        assert!(caps.can(Capability::ManagePayouts));
        assert!(caps.can(Capability::ManageSettings));
    }

    #[test]
    fn empty_set_grants_nothing() {
        let caps = Capabilities::default();
        assert!(caps.is_empty());
        assert!(!caps.can(Capability::ViewClients));
    }
}
