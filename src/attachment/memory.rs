use crate::attachment::{AttachmentId, AttachmentStore, NewAttachment};
use crate::error::Result;

/// Keeps attachments in memory, for embedding in a host that persists them itself
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<(AttachmentId, NewAttachment)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: AttachmentId) -> Option<&NewAttachment> {
        self.records
            .iter()
            .find(|(stored, _)| *stored == id)
            .map(|(_, attachment)| attachment)
    }
}

impl AttachmentStore for MemoryStore {
    fn create(&mut self, attachment: NewAttachment) -> Result<AttachmentId> {
        let id = AttachmentId(self.records.len() as u64 + 1);
        self.records.push((id, attachment));
        Ok(id)
    }
}
