//! Watch backend bridging `notify` into the event channel
//!
//! The backend's only job is to observe the configured paths and push
//! mapped [`ChangeEvent`]s into the channel; no aggregation logic runs on
//! its callback thread. Strategy is fixed at construction: native OS
//! notifications, or periodic re-scanning when polling is forced.

use std::io;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};

use notify::{Config, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::{SettleError, SettleResult};
use crate::event::{ChangeEvent, RawEvent};
use crate::session::SessionOptions;

/// A running watch backend. Dropping it stops emission and releases the
/// underlying OS resources.
#[derive(Debug)]
pub(crate) enum FsBackend {
    Native(RecommendedWatcher),
    Poll(PollWatcher),
}

impl FsBackend {
    pub(crate) fn strategy(&self) -> &'static str {
        match self {
            FsBackend::Native(_) => "native",
            FsBackend::Poll(_) => "poll",
        }
    }
}

/// Validate the watch paths and start the backend.
///
/// Every path is checked before any watcher is created, so a missing path
/// fails synchronously with no backend left running.
pub(crate) fn start(options: &SessionOptions) -> SettleResult<(FsBackend, Receiver<RawEvent>)> {
    for path in &options.paths {
        ensure_exists(path)?;
    }

    let (tx, rx) = mpsc::channel();
    let handler = event_handler(tx, options.debug);

    let mode = if options.recursive {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };

    let backend = if options.force_polling {
        let config = Config::default().with_poll_interval(options.poll_delay);
        let mut watcher = PollWatcher::new(handler, config).map_err(map_notify_error)?;
        for path in &options.paths {
            watcher.watch(path, mode).map_err(map_notify_error)?;
        }
        FsBackend::Poll(watcher)
    } else {
        let mut watcher =
            RecommendedWatcher::new(handler, Config::default()).map_err(map_notify_error)?;
        for path in &options.paths {
            watcher.watch(path, mode).map_err(map_notify_error)?;
        }
        FsBackend::Native(watcher)
    };

    Ok((backend, rx))
}

/// Build the `notify` callback: map raw events and forward them into the
/// channel. Send failures mean the session dropped the receiver and are
/// ignored.
fn event_handler(
    tx: Sender<RawEvent>,
    debug: bool,
) -> impl Fn(Result<notify::Event, notify::Error>) + Send + 'static {
    move |result| match result {
        Ok(raw) => {
            for change in ChangeEvent::from_notify(&raw) {
                if debug {
                    tracing::debug!(target: "settle::raw", "{}", change.to_json());
                }
                let _ = tx.send(RawEvent::Change(change));
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "watch backend error");
            let _ = tx.send(RawEvent::Error(err.to_string()));
        }
    }
}

fn ensure_exists(path: &Path) -> SettleResult<()> {
    match std::fs::metadata(path) {
        Ok(_) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Err(SettleError::PathNotFound {
            path: path.to_path_buf(),
        }),
        Err(err) => Err(SettleError::Io(err)),
    }
}

fn map_notify_error(err: notify::Error) -> SettleError {
    if matches!(err.kind, notify::ErrorKind::PathNotFound) {
        SettleError::PathNotFound {
            path: err.paths.first().cloned().unwrap_or_default(),
        }
    } else {
        SettleError::backend(err)
    }
}
