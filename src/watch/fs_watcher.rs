//! Filesystem event source
//!
//! Wraps a `notify` watcher and forwards relevant changes into the event
//! loop as [`WatchInput`]s. Raw notify events are translated into
//! added/changed/removed events and filtered by extension, ignored
//! directory and the root's `.gitignore` before anything reaches the
//! debouncer.

use crate::error::QualityError;
use crate::models::{ChangeKind, FileEvent};
use crate::parsers::supported_extensions;
use ignore::gitignore::Gitignore;
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Component, Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Directory names never watched
pub const IGNORED_DIRS: &[&str] = &["node_modules", ".git", "dist", "__pycache__", "venv", "target"];

/// Input delivered to the event loop
#[derive(Debug)]
pub enum WatchInput {
    Event(FileEvent),
    Error(QualityError),
}

impl From<FileEvent> for WatchInput {
    fn from(event: FileEvent) -> Self {
        WatchInput::Event(event)
    }
}

/// Decides which paths are worth analyzing
pub struct PathFilter {
    extensions: Vec<&'static str>,
    ignored_dirs: Vec<String>,
    roots: Vec<(PathBuf, Option<Gitignore>)>,
}

impl PathFilter {
    /// Filter for `roots`, loading each root's `.gitignore` if present
    pub fn new(roots: &[PathBuf]) -> Self {
        let roots = roots
            .iter()
            .map(|root| {
                let gitignore_path = root.join(".gitignore");
                let gitignore = if gitignore_path.is_file() {
                    let (gi, err) = Gitignore::new(&gitignore_path);
                    if let Some(e) = err {
                        warn!("Partially invalid {}: {}", gitignore_path.display(), e);
                    }
                    Some(gi)
                } else {
                    None
                };
                (root.clone(), gitignore)
            })
            .collect();

        Self {
            extensions: supported_extensions().to_vec(),
            ignored_dirs: IGNORED_DIRS.iter().map(|d| d.to_string()).collect(),
            roots,
        }
    }

    /// Add directory names to skip
    pub fn with_ignored_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    pub fn accepts(&self, path: &Path) -> bool {
        let supported = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext));
        supported && !self.is_ignored_path(path)
    }

    fn is_ignored_path(&self, path: &Path) -> bool {
        let in_ignored_dir = path.components().any(|c| match c {
            Component::Normal(name) => self.ignored_dirs.iter().any(|d| name == d.as_str()),
            _ => false,
        });
        if in_ignored_dir {
            return true;
        }

        // Gitignore::matched_path_or_any_parents panics outside its root
        self.roots.iter().any(|(root, gitignore)| match gitignore {
            Some(gi) if path.starts_with(root) => {
                gi.matched_path_or_any_parents(path, false).is_ignore()
            }
            _ => false,
        })
    }
}

/// Translate one notify event into zero or more file events
pub fn translate(event: &Event) -> Vec<FileEvent> {
    let at = |i: usize| event.paths.get(i).cloned();
    let each = |kind: ChangeKind| -> Vec<FileEvent> {
        event
            .paths
            .iter()
            .map(|p| FileEvent::new(p.clone(), kind))
            .collect()
    };

    match event.kind {
        EventKind::Create(_) => each(ChangeKind::Added),
        EventKind::Remove(_) => each(ChangeKind::Removed),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => each(ChangeKind::Removed),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => each(ChangeKind::Added),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let mut out = Vec::new();
            if let Some(from) = at(0) {
                out.push(FileEvent::new(from, ChangeKind::Removed));
            }
            if let Some(to) = at(1) {
                out.push(FileEvent::new(to, ChangeKind::Added));
            }
            out
        }
        // backends that cannot tell which side of a rename they saw
        EventKind::Modify(ModifyKind::Name(_)) => event
            .paths
            .iter()
            .map(|p| {
                let kind = if p.exists() {
                    ChangeKind::Added
                } else {
                    ChangeKind::Removed
                };
                FileEvent::new(p.clone(), kind)
            })
            .collect(),
        EventKind::Modify(_) => each(ChangeKind::Changed),
        _ => Vec::new(),
    }
}

/// Live recursive watch over a set of roots
pub struct FsWatcher {
    // dropping the watcher releases every watch handle
    _watcher: RecommendedWatcher,
}

impl FsWatcher {
    /// Start watching `roots`, sending accepted events to `tx`
    pub fn start(
        roots: &[PathBuf],
        filter: PathFilter,
        tx: mpsc::UnboundedSender<WatchInput>,
    ) -> Result<Self, QualityError> {
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let inputs: Vec<WatchInput> = match res {
                Ok(event) => translate(&event)
                    .into_iter()
                    .filter(|e| filter.accepts(&e.path))
                    .map(WatchInput::from)
                    .collect(),
                Err(e) => vec![WatchInput::Error(e.into())],
            };
            for input in inputs {
                // receiver gone means the loop has stopped
                if tx.send(input).is_err() {
                    return;
                }
            }
        })?;

        for root in roots {
            watcher.watch(root, RecursiveMode::Recursive)?;
            debug!("Watching {}", root.display());
        }

        Ok(Self { _watcher: watcher })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, RemoveKind};

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        let mut event = Event::new(kind);
        for p in paths {
            event = event.add_path(PathBuf::from(p));
        }
        event
    }

    fn kinds(events: &[FileEvent]) -> Vec<ChangeKind> {
        events.iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_translate_basic_kinds() {
        let created = translate(&event(EventKind::Create(CreateKind::File), &["/r/a.py"]));
        assert_eq!(kinds(&created), vec![ChangeKind::Added]);

        let modified = translate(&event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &["/r/a.py"],
        ));
        assert_eq!(kinds(&modified), vec![ChangeKind::Changed]);

        let removed = translate(&event(EventKind::Remove(RemoveKind::File), &["/r/a.py"]));
        assert_eq!(kinds(&removed), vec![ChangeKind::Removed]);
    }

    #[test]
    fn test_translate_rename_both() {
        let renamed = translate(&event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/r/old.py", "/r/new.py"],
        ));
        assert_eq!(renamed.len(), 2);
        assert_eq!(renamed[0], FileEvent::new("/r/old.py", ChangeKind::Removed));
        assert_eq!(renamed[1], FileEvent::new("/r/new.py", ChangeKind::Added));
    }

    #[test]
    fn test_translate_ignores_access() {
        let accessed = translate(&event(
            EventKind::Access(notify::event::AccessKind::Any),
            &["/r/a.py"],
        ));
        assert!(accessed.is_empty());
    }

    #[test]
    fn test_filter_extensions_and_dirs() {
        let filter = PathFilter::new(&[PathBuf::from("/nonexistent-root")]);
        assert!(filter.accepts(Path::new("/r/src/a.py")));
        assert!(filter.accepts(Path::new("/r/src/App.tsx")));
        assert!(!filter.accepts(Path::new("/r/src/main.rs")));
        assert!(!filter.accepts(Path::new("/r/README.md")));
        assert!(!filter.accepts(Path::new("/r/node_modules/lib/index.js")));
        assert!(!filter.accepts(Path::new("/r/app/__pycache__/a.py")));
        assert!(!filter.accepts(Path::new("/r/dist/bundle.js")));
    }

    #[test]
    fn test_filter_extra_ignored_dirs() {
        let filter = PathFilter::new(&[]).with_ignored_dirs(["generated"]);
        assert!(!filter.accepts(Path::new("/r/generated/a.py")));
        assert!(filter.accepts(Path::new("/r/src/a.py")));
    }

    #[test]
    fn test_filter_respects_gitignore() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "build_out/\nscratch.py\n").unwrap();
        let filter = PathFilter::new(&[dir.path().to_path_buf()]);

        assert!(!filter.accepts(&dir.path().join("build_out/gen.py")));
        assert!(!filter.accepts(&dir.path().join("scratch.py")));
        assert!(filter.accepts(&dir.path().join("src/app.py")));
        // outside the root the gitignore does not apply
        assert!(filter.accepts(Path::new("/elsewhere/scratch.py")));
    }
}
