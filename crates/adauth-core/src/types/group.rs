//! Group record

use serde::{Deserialize, Serialize};

/// Directory group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Value of the unique-name attribute
    pub code: String,

    /// Value of the display-name attribute
    pub name: String,
}
