use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::parsing::fasta::is_fasta_file;
use crate::pipeline::PipelineError;
use crate::reference::DEFAULT_READ_LENGTH;

/// Default minimum sequence identity (fraction)
pub const DEFAULT_MIN_IDENTITY: f64 = 0.95;

/// Default tile size
pub const DEFAULT_TILE_SIZE: u32 = 10;

/// Alignment parameters passed through to the aligner.
///
/// `None`/`false` leaves the aligner's own default in place. Output is
/// always headerless PSLX.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignerParams {
    /// Database type (dna, prot, dnax)
    pub t_type: Option<String>,
    /// Query type (dna, rna, prot, dnax, rnax)
    pub q_type: Option<String>,
    /// Protein query and database
    pub prot: bool,
    /// Over-occurring 11-mer file
    pub ooc: Option<PathBuf>,
    pub tile_size: u32,
    pub step_size: Option<u32>,
    pub one_off: Option<u32>,
    pub min_match: Option<u32>,
    pub min_score: Option<u32>,
    /// Minimum identity as a fraction in (0, 1]
    pub min_identity: f64,
    pub max_gap: Option<u32>,
    pub rep_match: Option<u32>,
    pub mask: Option<String>,
    pub q_mask: Option<String>,
    pub repeats: Option<String>,
    pub min_rep_divergence: Option<f64>,
    pub trim_t: bool,
    pub no_trim_a: bool,
    pub trim_hard_a: bool,
    pub fast_map: bool,
    pub fine: bool,
    pub max_intron: Option<u32>,
    pub extend_through_n: bool,
}

impl Default for AlignerParams {
    fn default() -> Self {
        Self {
            t_type: None,
            q_type: None,
            prot: false,
            ooc: None,
            tile_size: DEFAULT_TILE_SIZE,
            step_size: None,
            one_off: None,
            min_match: None,
            min_score: None,
            min_identity: DEFAULT_MIN_IDENTITY,
            max_gap: None,
            rep_match: None,
            mask: None,
            q_mask: None,
            repeats: None,
            min_rep_divergence: None,
            trim_t: false,
            no_trim_a: false,
            trim_hard_a: false,
            fast_map: false,
            fine: false,
            max_intron: None,
            extend_through_n: false,
        }
    }
}

impl AlignerParams {
    /// BLAT-style `-name=value` options for these parameters
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "-out=pslx".to_string(),
            "-noHead".to_string(),
            format!("-tileSize={}", self.tile_size),
            format!("-minIdentity={}", identity_percent(self.min_identity)),
        ];

        let mut opt = |name: &str, value: Option<String>| {
            if let Some(value) = value {
                args.push(format!("-{name}={value}"));
            }
        };
        opt("t", self.t_type.clone());
        opt("q", self.q_type.clone());
        opt("ooc", self.ooc.as_ref().map(|p| p.display().to_string()));
        opt("stepSize", self.step_size.map(|v| v.to_string()));
        opt("oneOff", self.one_off.map(|v| v.to_string()));
        opt("minMatch", self.min_match.map(|v| v.to_string()));
        opt("minScore", self.min_score.map(|v| v.to_string()));
        opt("maxGap", self.max_gap.map(|v| v.to_string()));
        opt("repMatch", self.rep_match.map(|v| v.to_string()));
        opt("mask", self.mask.clone());
        opt("qMask", self.q_mask.clone());
        opt("repeats", self.repeats.clone());
        opt(
            "minRepDivergence",
            self.min_rep_divergence.map(|v| v.to_string()),
        );
        opt("maxIntron", self.max_intron.map(|v| v.to_string()));

        for (name, set) in [
            ("prot", self.prot),
            ("trimT", self.trim_t),
            ("noTrimA", self.no_trim_a),
            ("trimHardA", self.trim_hard_a),
            ("fastMap", self.fast_map),
            ("fine", self.fine),
            ("extendThroughN", self.extend_through_n),
        ] {
            if set {
                args.push(format!("-{name}"));
            }
        }

        args
    }
}

/// BLAT takes identity as a percentage
fn identity_percent(fraction: f64) -> f64 {
    (fraction * 100.0 * 10_000.0).round() / 10_000.0
}

/// Everything needed for one counting run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Reference FASTA (one record per target)
    pub reference: PathBuf,

    /// Reads to align
    pub reads: PathBuf,

    /// Directory for the named pipes (system temp dir when unset)
    pub channel_dir: Option<PathBuf>,

    /// Number of aligner workers and readers (logical CPUs when unset)
    pub workers: Option<usize>,

    /// Window width for reference statistics
    pub read_length: usize,

    /// Seed for the random tie-breaking draw; worker i uses `seed + i`
    pub seed: Option<u64>,

    /// Upper bound on each wait for a worker result after the aligner exits
    pub collect_timeout: Option<Duration>,

    pub aligner: AlignerParams,
}

impl PipelineConfig {
    pub fn new(reference: impl Into<PathBuf>, reads: impl Into<PathBuf>) -> Self {
        Self {
            reference: reference.into(),
            reads: reads.into(),
            channel_dir: None,
            workers: None,
            read_length: DEFAULT_READ_LENGTH,
            seed: None,
            collect_timeout: None,
            aligner: AlignerParams::default(),
        }
    }

    /// Check inputs before any channel or worker is created.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Configuration` describing the first problem found.
    pub fn validate(&self) -> Result<(), PipelineError> {
        check_input(&self.reference, "reference")?;
        check_input(&self.reads, "read")?;
        if !is_fasta_file(&self.reference) {
            return Err(PipelineError::Configuration(format!(
                "Reference must be FASTA (.fa, .fasta, .fna, optionally .gz/.bgz): {}",
                self.reference.display()
            )));
        }

        if self.workers == Some(0) {
            return Err(PipelineError::Configuration(
                "Worker count must be at least 1".to_string(),
            ));
        }
        if self.read_length == 0 {
            return Err(PipelineError::Configuration(
                "Read length must be positive".to_string(),
            ));
        }
        let identity = self.aligner.min_identity;
        if !(identity > 0.0 && identity <= 1.0) {
            return Err(PipelineError::Configuration(format!(
                "Minimum identity must be in (0, 1], got {identity}"
            )));
        }
        if let Some(dir) = &self.channel_dir {
            if !dir.is_dir() {
                return Err(PipelineError::Configuration(format!(
                    "Channel directory does not exist: {}",
                    dir.display()
                )));
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get).max(1)
    }

    #[must_use]
    pub fn channel_dir(&self) -> PathBuf {
        self.channel_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

fn check_input(path: &Path, what: &str) -> Result<(), PipelineError> {
    if path.as_os_str().is_empty() {
        return Err(PipelineError::Configuration(format!(
            "You must specify a {what} file"
        )));
    }
    if !path.is_file() {
        return Err(PipelineError::Configuration(format!(
            "The {what} file does not exist: {}",
            path.display()
        )));
    }
    Ok(())
}
