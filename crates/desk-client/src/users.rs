//! Signed-in user and capability lookup.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/users/me` | Current user with capability flags |

use desk_core::{Capabilities, Capability, UserId};
use serde::{Deserialize, Serialize};

use crate::error::DeskApiError;
use crate::transport::Transport;

/// The authenticated user as returned by `GET /users/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    #[serde(alias = "display_name")]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default, alias = "allcaps")]
    pub capabilities: Capabilities,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl CurrentUser {
    pub fn can(&self, cap: Capability) -> bool {
        self.capabilities.can(cap)
    }

    pub fn is_admin(&self) -> bool {
        self.capabilities.is_admin() || self.roles.iter().any(|r| r == "administrator")
    }
}

/// Client for user endpoints.
#[derive(Debug, Clone)]
pub struct UsersClient {
    transport: Transport,
}

impl UsersClient {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Fetch the signed-in user.
    ///
    /// Calls `GET {base}/users/me`.
    pub async fn me(&self) -> Result<CurrentUser, DeskApiError> {
        self.transport.get_json("users/me", Vec::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_wordpress_user_shape() {
        let user: CurrentUser = serde_json::from_str(
            r#"{
                "id": 7,
                "display_name": "Faisal",
                "roles": ["administrator"],
                "allcaps": {"manage_options": true, "edit_posts": true, "delete_site": false}
            }"#,
        )
        .unwrap();
        assert_eq!(user.id, UserId(7));
        assert_eq!(user.name, "Faisal");
        assert!(user.is_admin());
        assert!(user.can(Capability::ManageSettings));
        assert!(user.email.is_none());
    }

    #[test]
    fn accountant_is_limited() {
        let user: CurrentUser = serde_json::from_str(
            r#"{"id": 3, "name": "Noura", "roles": ["accountant"],
                "capabilities": ["view_invoices", "manage_payouts"]}"#,
        )
        .unwrap();
        assert!(!user.is_admin());
        assert!(user.can(Capability::ViewInvoices));
        assert!(user.can(Capability::ManagePayouts));
        assert!(!user.can(Capability::ManageClients));
    }
}
