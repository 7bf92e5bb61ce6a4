//! Named pipes carrying aligner output to the aggregation workers.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, warn};

use crate::pipeline::PipelineError;

/// File name prefix of every channel; the aligner appends `-<index>`
pub const CHANNEL_PREFIX: &str = "pblat.fifo";

/// Distinguishes channel sets created by one process
static NEXT_RUN: AtomicUsize = AtomicUsize::new(0);

/// The set of named pipes for one run.
///
/// Pipes are named `pblat.fifo.<pid>.<run>-<index>`, where `run` counts the
/// sets made by this process, so concurrent runs sharing a directory do not
/// collide. When the set is dropped, waiting readers are released and the
/// pipes removed.
#[derive(Debug)]
pub struct ChannelSet {
    pattern: PathBuf,
    paths: Vec<PathBuf>,
}

impl ChannelSet {
    /// Create `count` named pipes in `dir`.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::ChannelCreation` if any pipe cannot be made;
    /// pipes already created are removed.
    pub fn create(dir: &Path, count: usize) -> Result<Self, PipelineError> {
        let run = NEXT_RUN.fetch_add(1, Ordering::Relaxed);
        let pattern = dir.join(format!("{CHANNEL_PREFIX}.{}.{run}", std::process::id()));
        let mut set = Self {
            paths: Vec::with_capacity(count),
            pattern,
        };

        for index in 0..count {
            let path = set.channel_path(index);
            make_fifo(&path).map_err(|source| PipelineError::ChannelCreation {
                path: path.clone(),
                source,
            })?;
            set.paths.push(path);
        }

        debug!(pattern = %set.pattern.display(), count, "Created channels");
        Ok(set)
    }

    /// Path prefix handed to the aligner
    #[must_use]
    pub fn pattern(&self) -> &Path {
        &self.pattern
    }

    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    fn channel_path(&self, index: usize) -> PathBuf {
        let mut name = self.pattern.clone().into_os_string();
        name.push(format!("-{index}"));
        PathBuf::from(name)
    }

    /// Unblock readers still waiting for a writer to attach.
    ///
    /// Opens and immediately closes the write end of every pipe without
    /// blocking, so a waiting reader sees an empty stream. Pipes with no
    /// reader are skipped.
    pub fn release_readers(&self) {
        for path in &self.paths {
            release_reader(path);
        }
    }
}

impl Drop for ChannelSet {
    fn drop(&mut self) {
        for path in &self.paths {
            release_reader(path);
            if let Err(e) = std::fs::remove_file(path) {
                warn!(path = %path.display(), error = %e, "Failed to remove channel");
            }
        }
    }
}

#[cfg(unix)]
fn make_fifo(path: &Path) -> io::Result<()> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    // SAFETY: `c_path` is a valid NUL-terminated string that outlives the call
    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), 0o600) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn make_fifo(_path: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "named pipes require a Unix platform",
    ))
}

#[cfg(unix)]
fn release_reader(path: &Path) {
    use std::os::unix::fs::OpenOptionsExt;

    // ENXIO means no reader is waiting
    let _ = std::fs::OpenOptions::new()
        .write(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(path);
}

#[cfg(not(unix))]
fn release_reader(_path: &Path) {}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::io::Read;
    use std::os::unix::fs::FileTypeExt;

    #[test]
    fn test_create_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let paths = {
            let set = ChannelSet::create(dir.path(), 3).unwrap();
            assert_eq!(set.len(), 3);
            let prefix = format!("{CHANNEL_PREFIX}.{}.", std::process::id());
            for (i, path) in set.paths().iter().enumerate() {
                let name = path.file_name().unwrap().to_string_lossy().to_string();
                assert!(name.starts_with(&prefix), "{name}");
                assert!(name.ends_with(&format!("-{i}")), "{name}");
                assert!(std::fs::metadata(path).unwrap().file_type().is_fifo());
            }
            set.paths().to_vec()
        };
        for path in paths {
            assert!(!path.exists());
        }
    }

    #[test]
    fn test_sets_in_one_directory_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let first = ChannelSet::create(dir.path(), 2).unwrap();
        let second = ChannelSet::create(dir.path(), 2).unwrap();
        assert_ne!(first.pattern(), second.pattern());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 4);
    }

    #[test]
    fn test_missing_directory() {
        let err = ChannelSet::create(Path::new("/no/such/dir"), 1).unwrap_err();
        assert!(matches!(err, PipelineError::ChannelCreation { .. }));
    }

    #[test]
    fn test_release_unblocks_waiting_reader() {
        let dir = tempfile::tempdir().unwrap();
        let set = ChannelSet::create(dir.path(), 1).unwrap();
        let path = set.paths()[0].clone();

        let reader = std::thread::spawn(move || {
            let mut content = String::new();
            std::fs::File::open(&path)
                .unwrap()
                .read_to_string(&mut content)
                .unwrap();
            content
        });

        while !reader.is_finished() {
            set.release_readers();
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert_eq!(reader.join().unwrap(), "");
    }

    #[test]
    fn test_drop_releases_waiting_reader() {
        let dir = tempfile::tempdir().unwrap();
        let set = ChannelSet::create(dir.path(), 1).unwrap();
        let path = set.paths()[0].clone();

        let (opened_tx, opened_rx) = std::sync::mpsc::channel();
        let reader = std::thread::spawn(move || {
            opened_tx.send(()).unwrap();
            // NotFound if the pipe is already gone, empty if released
            std::fs::read_to_string(&path).unwrap_or_default()
        });

        opened_rx.recv().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(50));
        drop(set);
        assert_eq!(reader.join().unwrap(), "");
    }
}
