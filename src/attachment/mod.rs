mod directory;
mod memory;

pub use directory::DirectoryStore;
pub use memory::MemoryStore;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

pub const PDF_MIMETYPE: &str = "application/pdf";

/// Identifier handed out by an attachment store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttachmentId(pub u64);

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A binary attachment waiting to be stored, payload base64 encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAttachment {
    pub name: String,
    pub datas: String,
    pub mimetype: String,
}

impl NewAttachment {
    pub fn pdf(name: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            name: name.into(),
            datas: STANDARD.encode(bytes),
            mimetype: PDF_MIMETYPE.to_string(),
        }
    }

    /// Raw payload bytes
    pub fn decode(&self) -> Result<Vec<u8>> {
        Ok(STANDARD.decode(&self.datas)?)
    }
}

/// A stored attachment with its decoded payload
#[derive(Debug, Clone)]
pub struct Attachment {
    pub id: AttachmentId,
    pub name: String,
    pub mimetype: String,
    pub created: DateTime<Local>,
    pub data: Vec<u8>,
}

/// Somewhere finished reports can be persisted and later downloaded from.
///
/// Every call to `create` makes a new, independent record.
pub trait AttachmentStore {
    fn create(&mut self, attachment: NewAttachment) -> Result<AttachmentId>;
}
