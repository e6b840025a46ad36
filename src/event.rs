//! Change event types
//!
//! A [`ChangeEvent`] is the immutable `(kind, path)` value the backend emits
//! and the aggregator batches. Equality and hash are structural over both
//! fields, which is what collapses duplicates inside a batch.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use notify::event::{EventKind, ModifyKind, RenameMode};

/// A batch of deduplicated change events, as returned by a successful watch.
pub type Batch = HashSet<ChangeEvent>;

/// Kind of filesystem mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Path was created
    Created,
    /// Path contents or metadata changed
    Modified,
    /// Path was removed
    Deleted,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Created => write!(f, "created"),
            ChangeKind::Modified => write!(f, "modified"),
            ChangeKind::Deleted => write!(f, "deleted"),
        }
    }
}

/// A single filesystem mutation notice
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub struct ChangeEvent {
    /// What happened
    pub kind: ChangeKind,
    /// Where it happened
    pub path: PathBuf,
}

impl ChangeEvent {
    /// Create a new change event
    pub fn new(kind: ChangeKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    /// NDJSON form used by the diagnostic trace sink
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Map a raw `notify` event to zero or more change events.
    ///
    /// Renames are split: the old name surfaces as `deleted`, the new name
    /// as `created`. Access notifications carry no mutation and are dropped.
    pub(crate) fn from_notify(event: &notify::Event) -> Vec<ChangeEvent> {
        // Two-path rename events pair (from, to) in order.
        if let EventKind::Modify(ModifyKind::Name(RenameMode::Both)) = event.kind {
            let mut out = Vec::with_capacity(2);
            if let Some(from) = event.paths.first() {
                out.push(ChangeEvent::new(ChangeKind::Deleted, from.clone()));
            }
            if let Some(to) = event.paths.get(1) {
                out.push(ChangeEvent::new(ChangeKind::Created, to.clone()));
            }
            return out;
        }

        let kind = match event.kind {
            EventKind::Create(_) => Some(ChangeKind::Created),
            EventKind::Remove(_) => Some(ChangeKind::Deleted),
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => Some(ChangeKind::Deleted),
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => Some(ChangeKind::Created),
            EventKind::Modify(_) | EventKind::Any => Some(ChangeKind::Modified),
            EventKind::Access(_) | EventKind::Other => None,
        };

        match kind {
            Some(kind) => event
                .paths
                .iter()
                .map(|path| ChangeEvent::new(kind, path.clone()))
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Entry flowing through the event channel from backend to aggregator
#[derive(Debug)]
pub(crate) enum RawEvent {
    /// A mapped filesystem change
    Change(ChangeEvent),
    /// The backend hit an unrecoverable native error
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, MetadataKind, RemoveKind};
    use std::path::Path;

    #[test]
    fn test_change_event_to_json() {
        let event = ChangeEvent::new(ChangeKind::Created, "src/main.rs");
        let json = event.to_json();
        assert!(json.contains("\"kind\":\"created\""));
        assert!(json.contains("\"path\":\"src/main.rs\""));
    }

    #[test]
    fn test_change_event_structural_equality() {
        let mut batch = Batch::new();
        batch.insert(ChangeEvent::new(ChangeKind::Modified, "a.txt"));
        batch.insert(ChangeEvent::new(ChangeKind::Modified, "a.txt"));
        batch.insert(ChangeEvent::new(ChangeKind::Deleted, "a.txt"));
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_from_notify_create() {
        let raw = notify::Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("new.txt"));
        let events = ChangeEvent::from_notify(&raw);
        assert_eq!(
            events,
            vec![ChangeEvent::new(ChangeKind::Created, "new.txt")]
        );
    }

    #[test]
    fn test_from_notify_remove() {
        let raw = notify::Event::new(EventKind::Remove(RemoveKind::File))
            .add_path(PathBuf::from("gone.txt"));
        let events = ChangeEvent::from_notify(&raw);
        assert_eq!(
            events,
            vec![ChangeEvent::new(ChangeKind::Deleted, "gone.txt")]
        );
    }

    #[test]
    fn test_from_notify_data_modify() {
        let raw = notify::Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Any)))
            .add_path(PathBuf::from("edited.txt"));
        let events = ChangeEvent::from_notify(&raw);
        assert_eq!(
            events,
            vec![ChangeEvent::new(ChangeKind::Modified, "edited.txt")]
        );
    }

    #[test]
    fn test_from_notify_rename_both_splits() {
        let raw = notify::Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(PathBuf::from("old.txt"))
            .add_path(PathBuf::from("new.txt"));
        let events = ChangeEvent::from_notify(&raw);
        assert_eq!(events.len(), 2);
        assert!(events.contains(&ChangeEvent::new(ChangeKind::Deleted, "old.txt")));
        assert!(events.contains(&ChangeEvent::new(ChangeKind::Created, "new.txt")));
    }

    #[test]
    fn test_from_notify_metadata_is_modified() {
        let raw = notify::Event::new(EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any)))
            .add_path(PathBuf::from("touched.txt"));
        let events = ChangeEvent::from_notify(&raw);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, ChangeKind::Modified);
    }

    #[test]
    fn test_from_notify_access_dropped() {
        let raw = notify::Event::new(EventKind::Access(notify::event::AccessKind::Any))
            .add_path(PathBuf::from("read.txt"));
        assert!(ChangeEvent::from_notify(&raw).is_empty());
    }

    #[test]
    fn test_from_notify_multiple_paths() {
        let raw = notify::Event::new(EventKind::Create(CreateKind::Any))
            .add_path(PathBuf::from("a"))
            .add_path(PathBuf::from("b"));
        let events = ChangeEvent::from_notify(&raw);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.kind == ChangeKind::Created));
        assert!(events.iter().any(|e| e.path == Path::new("a")));
        assert!(events.iter().any(|e| e.path == Path::new("b")));
    }
}
