use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Identity of the signed-in user running a measurement.
///
/// Supplied by the host's auth session; the controller only copies `user_id`
/// onto the persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UserIdentity {
    pub user_id: String,
    /// Owning organization, when the user belongs to one.
    pub organization_id: Option<String>,
}

impl UserIdentity {
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            organization_id: None,
        }
    }
}
