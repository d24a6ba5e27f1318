//! Change detection
//!
//! - `fs_watcher` - notify-backed event source with path filtering
//! - `debouncer` - per-path quiet-period coalescing

pub mod debouncer;
pub mod fs_watcher;

pub use debouncer::{resolve, ChangeDebouncer, Fired, Trigger, DEFAULT_DEBOUNCE};
pub use fs_watcher::{translate, FsWatcher, PathFilter, WatchInput, IGNORED_DIRS};
