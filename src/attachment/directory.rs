use chrono::Local;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::attachment::{Attachment, AttachmentId, AttachmentStore, NewAttachment};
use crate::config::{load_state, save_state, AttachmentEntry};
use crate::error::{ReportError, Result};

const LOCK_FILE: &str = "attachments.lock";

/// Stores attachment payloads as files in a directory, indexed by
/// `attachments.toml`. Writers in other processes are serialized through
/// an exclusive lock on `attachments.lock`.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    dir: PathBuf,
}

/// Keep stored file names flat and readable
fn file_name(id: u64, name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c => c,
        })
        .collect();
    format!("{id:06}-{safe}")
}

impl DirectoryStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Held until the returned file is dropped
    fn lock_index(&self) -> Result<File> {
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.dir.join(LOCK_FILE))?;
        lock.lock_exclusive()?;
        Ok(lock)
    }

    fn write_payload(path: &Path, data: &[u8]) -> Result<()> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        if let Err(e) = file.write_all(data).and_then(|_| file.sync_all()) {
            drop(file);
            discard(path);
            return Err(e.into());
        }
        Ok(())
    }

    /// Index entries, oldest first
    pub fn list(&self) -> Result<Vec<AttachmentEntry>> {
        Ok(load_state(&self.dir)?.history)
    }

    pub fn path_of(&self, id: AttachmentId) -> Result<PathBuf> {
        let state = load_state(&self.dir)?;
        let entry = state
            .history
            .iter()
            .find(|e| e.id == id.0)
            .ok_or(ReportError::AttachmentNotFound(id.0))?;
        Ok(self.dir.join(&entry.file))
    }

    pub fn get(&self, id: AttachmentId) -> Result<Attachment> {
        let state = load_state(&self.dir)?;
        let entry = state
            .history
            .into_iter()
            .find(|e| e.id == id.0)
            .ok_or(ReportError::AttachmentNotFound(id.0))?;
        let data = fs::read(self.dir.join(&entry.file))?;

        Ok(Attachment {
            id,
            name: entry.name,
            mimetype: entry.mimetype,
            created: entry.created,
            data,
        })
    }
}

/// Remove a payload that never made it into the index
fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!(path = %path.display(), "failed to remove orphaned attachment: {e}");
    }
}

impl AttachmentStore for DirectoryStore {
    fn create(&mut self, attachment: NewAttachment) -> Result<AttachmentId> {
        let data = attachment.decode()?;

        let _lock = self.lock_index()?;
        let mut state = load_state(&self.dir)?;

        let id = state.counter.last_id + 1;
        let file = file_name(id, &attachment.name);
        let path = self.dir.join(&file);
        Self::write_payload(&path, &data)?;

        state.counter.last_id = id;
        state.history.push(AttachmentEntry {
            id,
            name: attachment.name,
            mimetype: attachment.mimetype,
            created: Local::now(),
            file,
            size: data.len() as u64,
        });
        if let Err(e) = save_state(&self.dir, &state) {
            discard(&path);
            return Err(e);
        }

        debug!(id, dir = %self.dir.display(), "stored attachment");
        Ok(AttachmentId(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn create_assigns_increasing_ids() {
        let temp = TempDir::new().unwrap();
        let mut store = DirectoryStore::open(temp.path().join("store")).unwrap();

        let first = store.create(NewAttachment::pdf("Reporte_Pagos.pdf", b"one")).unwrap();
        let second = store.create(NewAttachment::pdf("Reporte_Pagos.pdf", b"one")).unwrap();

        assert_eq!(first, AttachmentId(1));
        assert_eq!(second, AttachmentId(2));
        assert_ne!(store.path_of(first).unwrap(), store.path_of(second).unwrap());
    }

    #[test]
    fn persists_across_reopen() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("store");
        let id = {
            let mut store = DirectoryStore::open(&dir).unwrap();
            store.create(NewAttachment::pdf("a/b.pdf", b"payload")).unwrap()
        };

        let store = DirectoryStore::open(&dir).unwrap();
        let entries = store.list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file, "000001-a_b.pdf");
        assert_eq!(entries[0].size, 7);

        let attachment = store.get(id).unwrap();
        assert_eq!(attachment.name, "a/b.pdf");
        assert_eq!(attachment.mimetype, "application/pdf");
        assert_eq!(attachment.data, b"payload");
    }

    #[test]
    fn concurrent_writers_get_distinct_ids() {
        const WRITERS: usize = 4;
        const PER_WRITER: usize = 10;

        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("store");
        DirectoryStore::open(&dir).unwrap();

        let handles: Vec<_> = (0..WRITERS)
            .map(|w| {
                let dir = dir.clone();
                std::thread::spawn(move || {
                    (0..PER_WRITER)
                        .map(|i| {
                            let mut store = DirectoryStore::open(&dir).unwrap();
                            let body = format!("writer {w} run {i}");
                            let id = store
                                .create(NewAttachment::pdf("Reporte_Pagos.pdf", body.as_bytes()))
                                .unwrap();
                            (id, body)
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let created: Vec<_> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();

        let store = DirectoryStore::open(&dir).unwrap();
        let mut ids: Vec<u64> = store.list().unwrap().iter().map(|e| e.id).collect();
        ids.sort_unstable();
        let expected: Vec<u64> = (1..=(WRITERS * PER_WRITER) as u64).collect();
        assert_eq!(ids, expected);

        for (id, body) in created {
            assert_eq!(store.get(id).unwrap().data, body.as_bytes());
        }
    }

    #[test]
    fn existing_payload_file_is_not_overwritten() {
        let temp = TempDir::new().unwrap();
        let mut store = DirectoryStore::open(temp.path()).unwrap();
        let stray = temp.path().join(file_name(1, "Reporte_Pagos.pdf"));
        fs::write(&stray, b"keep me").unwrap();

        let err = store
            .create(NewAttachment::pdf("Reporte_Pagos.pdf", b"new"))
            .unwrap_err();

        assert!(matches!(err, ReportError::Io(_)));
        assert_eq!(fs::read(&stray).unwrap(), b"keep me");
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn unknown_id_is_not_found() {
        let temp = TempDir::new().unwrap();
        let store = DirectoryStore::open(temp.path()).unwrap();
        assert!(matches!(
            store.get(AttachmentId(9)),
            Err(ReportError::AttachmentNotFound(9))
        ));
    }
}
