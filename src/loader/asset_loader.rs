//! Asynchronous fetch-and-parse of a single scene asset
//!
//! The load runs on a worker thread. Observers receive zero or more
//! [`LoadEvent::Progress`] events followed by exactly one terminal event,
//! either [`LoadEvent::Loaded`] or [`LoadEvent::Failed`].

use std::fs::File;
use std::io::Read;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use log::{debug, error};

use super::gltf_import::{import_bytes, LoadedAsset};
use crate::error::AssetLoadError;

const CHUNK_SIZE: usize = 64 * 1024;

/// Bytes received so far for an in-flight load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    pub loaded_bytes: u64,
    /// Zero when the size is unknown
    pub total_bytes: u64,
}

impl LoadProgress {
    /// Percentage loaded, `None` if the total is unknown
    pub fn percent(&self) -> Option<f64> {
        if self.total_bytes == 0 {
            return None;
        }
        Some(self.loaded_bytes as f64 / self.total_bytes as f64 * 100.0)
    }
}

/// Notification delivered to the load observer
#[derive(Debug)]
pub enum LoadEvent {
    Progress(LoadProgress),
    Loaded(LoadedAsset),
    Failed(AssetLoadError),
}

impl LoadEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoadEvent::Progress(_))
    }
}

/// Loads one asset from a path
#[derive(Debug, Clone)]
pub struct AssetLoader {
    path: PathBuf,
}

impl AssetLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Starts the load on a worker thread.
    ///
    /// `observer` sees progress events and then exactly one terminal event.
    pub fn spawn<F>(self, mut observer: F) -> std::io::Result<JoinHandle<()>>
    where
        F: FnMut(LoadEvent) + Send + 'static,
    {
        std::thread::Builder::new()
            .name("asset-loader".to_string())
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    self.load(|progress| observer(LoadEvent::Progress(progress)))
                }));
                observer(terminal_event(result));
            })
    }

    /// Reads and parses the asset on the calling thread
    pub fn load<P>(&self, progress: P) -> Result<LoadedAsset, AssetLoadError>
    where
        P: FnMut(LoadProgress),
    {
        debug!("Loading asset from {}", self.path.display());
        let file = File::open(&self.path).map_err(|err| AssetLoadError::io(&self.path, err))?;
        let total = file.metadata().map(|m| m.len()).unwrap_or(0);

        let bytes = read_with_progress(file, total, progress)
            .map_err(|err| AssetLoadError::io(&self.path, err))?;

        import_bytes(&bytes, self.path.parent())
    }
}

/// Folds a possibly panicked load into the single terminal event
fn terminal_event(
    result: std::thread::Result<Result<LoadedAsset, AssetLoadError>>,
) -> LoadEvent {
    match result {
        Ok(Ok(asset)) => LoadEvent::Loaded(asset),
        Ok(Err(err)) => LoadEvent::Failed(err),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!("Asset loader panicked: {message}");
            LoadEvent::Failed(AssetLoadError::Panicked(message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Reads `reader` to the end, reporting cumulative progress after every chunk
pub fn read_with_progress<R, P>(mut reader: R, total: u64, mut progress: P) -> std::io::Result<Vec<u8>>
where
    R: Read,
    P: FnMut(LoadProgress),
{
    let mut bytes = Vec::with_capacity(total as usize);
    let mut chunk = vec![0u8; CHUNK_SIZE];

    loop {
        let read = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        bytes.extend_from_slice(&chunk[..read]);
        progress(LoadProgress {
            loaded_bytes: bytes.len() as u64,
            total_bytes: total.max(bytes.len() as u64),
        });
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::test_assets;
    use std::io::Cursor;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_progress_is_monotonic_and_complete() {
        let data = vec![7u8; CHUNK_SIZE * 3 + 17];
        let mut seen = Vec::new();
        let bytes = read_with_progress(Cursor::new(&data), data.len() as u64, |p| seen.push(p))
            .expect("in-memory read");

        assert_eq!(bytes, data);
        assert_eq!(seen.len(), 4);
        assert!(seen.windows(2).all(|w| w[0].loaded_bytes <= w[1].loaded_bytes));
        let last = seen.last().copied().expect("progress reported");
        assert_eq!(last.loaded_bytes, data.len() as u64);
        assert_eq!(last.percent(), Some(100.0));
    }

    #[test]
    fn test_unknown_total_has_no_percent() {
        let progress = LoadProgress {
            loaded_bytes: 10,
            total_bytes: 0,
        };
        assert_eq!(progress.percent(), None);
    }

    fn collect_events(loader: AssetLoader) -> Vec<LoadEvent> {
        let (tx, rx) = mpsc::channel();
        let handle = loader
            .spawn(move |event| {
                let _ = tx.send(event);
            })
            .expect("spawn loader thread");
        handle.join().expect("loader thread panicked");

        let mut events = Vec::new();
        while let Ok(event) = rx.recv_timeout(Duration::from_secs(5)) {
            events.push(event);
        }
        events
    }

    fn write_temp(name: &str, contents: &[u8]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("glbview-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join(name);
        std::fs::write(&path, contents).expect("write temp asset");
        path
    }

    #[test]
    fn test_missing_file_fails_exactly_once() {
        let events = collect_events(AssetLoader::new("does/not/exist.glb"));
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
        assert!(matches!(
            events.last(),
            Some(LoadEvent::Failed(AssetLoadError::Io { .. }))
        ));
    }

    #[test]
    fn test_valid_asset_succeeds_exactly_once() {
        let path = write_temp("triangle.gltf", test_assets::TRIANGLE_GLTF.as_bytes());
        let events = collect_events(AssetLoader::new(&path));

        let terminal: Vec<_> = events.iter().filter(|e| e.is_terminal()).collect();
        assert_eq!(terminal.len(), 1);
        assert!(matches!(events.last(), Some(LoadEvent::Loaded(_))));
        // every progress event precedes the terminal one
        assert!(events[..events.len() - 1]
            .iter()
            .all(|e| matches!(e, LoadEvent::Progress(_))));
        assert!(!events.is_empty());
    }

    #[test]
    fn test_cyclic_hierarchy_fails_exactly_once() {
        let path = write_temp("cyclic.gltf", test_assets::CYCLIC_GLTF.as_bytes());
        let events = collect_events(AssetLoader::new(&path));
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
        assert!(matches!(
            events.last(),
            Some(LoadEvent::Failed(AssetLoadError::InvalidHierarchy { node: 0 }))
        ));
    }

    #[test]
    fn test_panicking_load_becomes_failure() {
        let result = panic::catch_unwind(|| -> Result<LoadedAsset, AssetLoadError> {
            panic!("decoder blew up")
        });
        match terminal_event(result) {
            LoadEvent::Failed(AssetLoadError::Panicked(message)) => {
                assert_eq!(message, "decoder blew up")
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_formatted_panic_message_is_kept() {
        let result = panic::catch_unwind(|| -> Result<LoadedAsset, AssetLoadError> {
            panic!("bad node {}", 7)
        });
        assert!(matches!(
            terminal_event(result),
            LoadEvent::Failed(AssetLoadError::Panicked(message)) if message == "bad node 7"
        ));
    }

    #[test]
    fn test_garbage_fails_with_parse_error() {
        let path = write_temp("garbage.glb", b"definitely not a gltf file");
        let events = collect_events(AssetLoader::new(&path));
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
        assert!(matches!(
            events.last(),
            Some(LoadEvent::Failed(AssetLoadError::Parse(_)))
        ));
    }
}
