use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::info;

use crate::pipeline::config::AlignerParams;
use crate::pipeline::PipelineError;

/// Everything the aligner needs for one run
#[derive(Debug, Clone, Copy)]
pub struct AlignmentRequest<'a> {
    pub reference: &'a Path,
    pub reads: &'a Path,

    /// Prefix of the channel paths; worker i writes to `<pattern>-<i>`
    pub channel_pattern: &'a Path,

    /// The channel paths, one per aligner worker
    pub channels: &'a [PathBuf],

    pub params: &'a AlignerParams,
}

impl AlignmentRequest<'_> {
    #[must_use]
    pub fn workers(&self) -> usize {
        self.channels.len()
    }
}

/// An aligner that spreads PSLX output over the request's channels.
///
/// Implementations return once every record has been written and every
/// channel closed.
pub trait Aligner {
    /// # Errors
    ///
    /// Returns `PipelineError::Aligner` if the alignment fails.
    fn align(&self, request: &AlignmentRequest<'_>) -> Result<(), PipelineError>;
}

impl<A: Aligner + ?Sized> Aligner for &A {
    fn align(&self, request: &AlignmentRequest<'_>) -> Result<(), PipelineError> {
        (**self).align(request)
    }
}

/// Default pblat executable name, looked up on `PATH`
pub const DEFAULT_PBLAT: &str = "pblat";

/// Runs a pblat build that writes worker output to named pipes.
///
/// The executable must accept BLAT's positional `database query output`
/// arguments plus `-threads=<W>` and `-pipePattern=<prefix>`, and write the
/// PSLX records of its worker `i` to the existing FIFO `<prefix>-<i>` for
/// every `i` in `0..W`, opening each one exactly once and closing it when
/// done. The prefix is the full per-run path (`<dir>/pblat.fifo.<pid>.<run>`)
/// handed over by the orchestrator and must be used as given.
/// Records of one query must stay on one worker. The positional output is
/// ignored (`stdout`, discarded).
#[derive(Debug, Clone)]
pub struct PblatAligner {
    executable: PathBuf,
}

impl Default for PblatAligner {
    fn default() -> Self {
        Self::new(DEFAULT_PBLAT)
    }
}

impl PblatAligner {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Build the command line for a request.
    ///
    /// The positional output is `stdout`; records go to the pipes.
    #[must_use]
    pub fn command(&self, request: &AlignmentRequest<'_>) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.arg(request.reference)
            .arg(request.reads)
            .arg("stdout")
            .arg(format!("-threads={}", request.workers()))
            .arg(format!("-pipePattern={}", request.channel_pattern.display()))
            .args(request.params.to_args())
            .stdin(Stdio::null())
            .stdout(Stdio::null());
        cmd
    }
}

impl Aligner for PblatAligner {
    fn align(&self, request: &AlignmentRequest<'_>) -> Result<(), PipelineError> {
        let mut cmd = self.command(request);
        info!(
            executable = %self.executable.display(),
            workers = request.workers(),
            "Starting aligner"
        );

        let status = cmd.status().map_err(|e| {
            PipelineError::Aligner(format!(
                "failed to start {}: {e}",
                self.executable.display()
            ))
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(PipelineError::Aligner(format!(
                "{} exited with {status}",
                self.executable.display()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn test_command_line() {
        let params = AlignerParams::default();
        let channels = vec![PathBuf::from("/tmp/pblat.fifo.1-0"), PathBuf::from("/tmp/pblat.fifo.1-1")];
        let request = AlignmentRequest {
            reference: Path::new("te.fa"),
            reads: Path::new("reads.fa"),
            channel_pattern: Path::new("/tmp/pblat.fifo.1"),
            channels: &channels,
            params: &params,
        };

        let cmd = PblatAligner::default().command(&request);
        assert_eq!(cmd.get_program(), OsStr::new("pblat"));

        let args: Vec<&OsStr> = cmd.get_args().collect();
        assert_eq!(args[0], "te.fa");
        assert_eq!(args[1], "reads.fa");
        assert_eq!(args[2], "stdout");
        assert!(args.contains(&OsStr::new("-threads=2")));
        assert!(args.contains(&OsStr::new("-pipePattern=/tmp/pblat.fifo.1")));
        assert!(args.contains(&OsStr::new("-noHead")));
        assert!(args.contains(&OsStr::new("-out=pslx")));
    }

    #[test]
    fn test_missing_executable_is_aligner_error() {
        let params = AlignerParams::default();
        let request = AlignmentRequest {
            reference: Path::new("te.fa"),
            reads: Path::new("reads.fa"),
            channel_pattern: Path::new("/tmp/none"),
            channels: &[],
            params: &params,
        };
        let err = PblatAligner::new("/no/such/pblat")
            .align(&request)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Aligner(_)));
    }
}
