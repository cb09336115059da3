//! User Model

use serde::{Deserialize, Serialize};

/// Backend user (read-only from the client's perspective)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
}
