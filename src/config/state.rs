use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Index of a directory attachment store
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct State {
    pub counter: Counter,
    #[serde(default)]
    pub history: Vec<AttachmentEntry>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Counter {
    pub last_id: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AttachmentEntry {
    pub id: u64,
    pub name: String,
    pub mimetype: String,
    pub created: DateTime<Local>,
    /// File name inside the store directory
    pub file: String,
    pub size: u64,
}
