use serde::{Deserialize, Serialize};

const REFERENCE_PREFIX: &str = "{{connections['";
const REFERENCE_SUFFIX: &str = "']}}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    #[default]
    Active,
    Error,
    Missing,
}

/// A stored credential that block inputs refer to by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub name: String,
    pub block_name: String,
    #[serde(default)]
    pub status: ConnectionStatus,
}

impl Connection {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        block_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            block_name: block_name.into(),
            status: ConnectionStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ConnectionStatus::Active
    }

    /// The placeholder a step input uses to point at this connection.
    pub fn reference(&self) -> String {
        connection_reference(&self.name)
    }
}

/// Builds the `{{connections['name']}}` placeholder for a connection name.
pub fn connection_reference(name: &str) -> String {
    format!("{}{}{}", REFERENCE_PREFIX, name, REFERENCE_SUFFIX)
}

/// Extracts the connection name from a `{{connections['name']}}` placeholder.
pub fn parse_connection_reference(auth: &str) -> Option<&str> {
    auth.trim()
        .strip_prefix(REFERENCE_PREFIX)
        .and_then(|rest| rest.strip_suffix(REFERENCE_SUFFIX))
        .filter(|name| !name.is_empty())
}
