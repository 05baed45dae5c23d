//! A debounced filesystem watcher, grounded on the teacher's own
//! `DatabaseWatcher`: a `notify::RecommendedWatcher` polling every 500ms,
//! coalescing raw events into batches of changed and removed paths so the
//! orchestrator never re-scans on every individual `write()` a buggy editor
//! plugin issues.

use std::path::Path;
use std::path::PathBuf;
use std::sync::mpsc::channel;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use notify::Config;
use notify::RecommendedWatcher;
use notify::RecursiveMode;
use notify::Watcher;

use crate::error::DatabaseError;

/// How long the watcher waits after the last observed event before flushing
/// a batch, so a save-then-format-on-save pair of writes collapses into one
/// rescan.
pub const DEBOUNCE: Duration = Duration::from_millis(500);

/// A single coalesced batch of filesystem changes.
#[derive(Debug, Default, Clone)]
pub struct ChangeBatch {
    pub changed: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
}

impl ChangeBatch {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.removed.is_empty()
    }
}

/// Watches a workspace root and yields debounced [`ChangeBatch`]es.
pub struct DatabaseWatcher {
    _watcher: RecommendedWatcher,
    events: Receiver<notify::Result<notify::Event>>,
}

impl DatabaseWatcher {
    pub fn new(root: &Path) -> Result<Self, DatabaseError> {
        let (tx, events) = channel();

        let mut watcher = RecommendedWatcher::new(
            move |event| {
                let _ = tx.send(event);
            },
            Config::default().with_poll_interval(DEBOUNCE),
        )
        .map_err(DatabaseError::WatcherInit)?;

        watcher.watch(root, RecursiveMode::Recursive).map_err(DatabaseError::WatcherWatch)?;

        Ok(Self { _watcher: watcher, events })
    }

    /// Blocks until at least one filesystem event arrives, then drains the
    /// channel for [`DEBOUNCE`] before returning the coalesced batch.
    /// Excluded paths (per [`crate::exclusion`]) are dropped before they ever
    /// reach the caller.
    pub fn next_batch(&self) -> Result<ChangeBatch, DatabaseError> {
        let first = self.events.recv().map_err(|_| DatabaseError::WatcherNotActive)?;

        let mut batch = ChangeBatch::default();
        apply_event(&mut batch, first);

        while let Ok(event) = self.events.recv_timeout(DEBOUNCE) {
            apply_event(&mut batch, event);
        }

        batch.changed.retain(|path| !crate::exclusion::is_excluded_by_fixed_rules(path));
        batch.removed.retain(|path| !crate::exclusion::is_excluded_by_fixed_rules(path));

        // A path that both changed and was ultimately removed (e.g. a
        // save-then-delete within one debounce window) should only be
        // forgotten, never ingested.
        batch.changed.retain(|path| !batch.removed.contains(path));

        Ok(batch)
    }
}

fn apply_event(batch: &mut ChangeBatch, event: notify::Result<notify::Event>) {
    let Ok(event) = event else {
        return;
    };

    use notify::EventKind;
    match event.kind {
        EventKind::Remove(_) => batch.removed.extend(event.paths),
        EventKind::Create(_) | EventKind::Modify(_) => batch.changed.extend(event.paths),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_batch_starts_empty() {
        assert!(ChangeBatch::default().is_empty());
    }

    #[test]
    fn apply_event_sorts_create_into_changed() {
        let mut batch = ChangeBatch::default();
        apply_event(
            &mut batch,
            Ok(notify::Event::new(notify::EventKind::Create(notify::event::CreateKind::File))
                .add_path(PathBuf::from("a.twig"))),
        );
        assert_eq!(batch.changed, vec![PathBuf::from("a.twig")]);
        assert!(batch.removed.is_empty());
    }

    #[test]
    fn apply_event_sorts_remove_into_removed() {
        let mut batch = ChangeBatch::default();
        apply_event(
            &mut batch,
            Ok(notify::Event::new(notify::EventKind::Remove(notify::event::RemoveKind::File))
                .add_path(PathBuf::from("a.twig"))),
        );
        assert!(batch.changed.is_empty());
        assert_eq!(batch.removed, vec![PathBuf::from("a.twig")]);
    }
}
