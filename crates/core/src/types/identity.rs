//! Signed-in user identity.

use serde::{Deserialize, Serialize};

use crate::UserId;

/// The account returned by the login and registration endpoints.
///
/// Fields are kept verbatim from the account service; the client never
/// normalises or re-validates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
}
