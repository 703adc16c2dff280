//! Account roles

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Role chosen at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Performing artist; may give an artistic name and a genre
    Artist,
    /// Manager or label; may give a company and how many artists it manages
    Manager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Artist => "artist",
            Role::Manager => "manager",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "artist" | "artista" => Ok(Role::Artist),
            "manager" => Ok(Role::Manager),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}
