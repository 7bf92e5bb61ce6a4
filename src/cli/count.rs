use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use crate::cli::{open_output, OutputFormat};
use crate::pipeline::config::{DEFAULT_MIN_IDENTITY, DEFAULT_TILE_SIZE};
use crate::pipeline::{AlignerParams, Orchestrator, PblatAligner, PipelineConfig};
use crate::reference::DEFAULT_READ_LENGTH;

#[derive(Args)]
pub struct CountArgs {
    /// Reference FASTA (one record per target sequence)
    #[arg(required = true)]
    pub reference: PathBuf,

    /// Reads to align (FASTA)
    #[arg(required = true)]
    pub reads: PathBuf,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of aligner workers (defaults to the number of CPUs)
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Directory for the named pipes (defaults to the system temp directory)
    #[arg(long)]
    pub pipe_dir: Option<PathBuf>,

    /// Read length, used as the window width for reference statistics
    #[arg(long, default_value_t = DEFAULT_READ_LENGTH)]
    pub read_length: usize,

    /// Seed for random tie-breaking (unseeded by default)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Give up if no worker reports for this many seconds after the aligner exits
    #[arg(long)]
    pub timeout: Option<u64>,

    /// pblat executable
    #[arg(long, default_value = "pblat")]
    pub pblat: PathBuf,

    // === Aligner options ===
    /// Minimum sequence identity (fraction)
    #[arg(long, default_value_t = DEFAULT_MIN_IDENTITY)]
    pub min_identity: f64,

    /// Size of match that triggers an alignment
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE)]
    pub tile_size: u32,

    /// Spacing between tiles
    #[arg(long)]
    pub step_size: Option<u32>,

    /// Allow one mismatch in a tile (0 or 1)
    #[arg(long)]
    pub one_off: Option<u32>,

    /// Number of tile matches needed
    #[arg(long)]
    pub min_match: Option<u32>,

    /// Minimum score
    #[arg(long)]
    pub min_score: Option<u32>,

    /// Maximum gap between tiles in a clump
    #[arg(long)]
    pub max_gap: Option<u32>,

    /// Repeat count above which a tile is ignored
    #[arg(long)]
    pub rep_match: Option<u32>,

    /// Database type (dna, prot, dnax)
    #[arg(long = "t-type")]
    pub t_type: Option<String>,

    /// Query type (dna, rna, prot, dnax, rnax)
    #[arg(long = "q-type")]
    pub q_type: Option<String>,

    /// Protein query and database
    #[arg(long)]
    pub prot: bool,

    /// Over-occurring 11-mer file
    #[arg(long)]
    pub ooc: Option<PathBuf>,

    /// Mask out repeats in the database (lower, upper, out, or a file)
    #[arg(long)]
    pub mask: Option<String>,

    /// Mask out repeats in the query
    #[arg(long)]
    pub q_mask: Option<String>,

    /// Repeat masking type used only to classify matches as repeats
    #[arg(long)]
    pub repeats: Option<String>,

    /// Minimum percent divergence of repeats to allow them unmasked
    #[arg(long)]
    pub min_rep_divergence: Option<f64>,

    /// Trim poly-T at start of query
    #[arg(long)]
    pub trim_t: bool,

    /// Don't trim poly-A tail
    #[arg(long)]
    pub no_trim_a: bool,

    /// Remove poly-A tail from query before alignment
    #[arg(long)]
    pub trim_hard_a: bool,

    /// Run for fast DNA/DNA remapping
    #[arg(long)]
    pub fast_map: bool,

    /// Search harder for small initial and terminal exons
    #[arg(long)]
    pub fine: bool,

    /// Maximum intron size
    #[arg(long)]
    pub max_intron: Option<u32>,

    /// Allow extending alignments through N's
    #[arg(long)]
    pub extend_through_n: bool,
}

impl CountArgs {
    fn aligner_params(&self) -> AlignerParams {
        AlignerParams {
            t_type: self.t_type.clone(),
            q_type: self.q_type.clone(),
            prot: self.prot,
            ooc: self.ooc.clone(),
            tile_size: self.tile_size,
            step_size: self.step_size,
            one_off: self.one_off,
            min_match: self.min_match,
            min_score: self.min_score,
            min_identity: self.min_identity,
            max_gap: self.max_gap,
            rep_match: self.rep_match,
            mask: self.mask.clone(),
            q_mask: self.q_mask.clone(),
            repeats: self.repeats.clone(),
            min_rep_divergence: self.min_rep_divergence,
            trim_t: self.trim_t,
            no_trim_a: self.no_trim_a,
            trim_hard_a: self.trim_hard_a,
            fast_map: self.fast_map,
            fine: self.fine,
            max_intron: self.max_intron,
            extend_through_n: self.extend_through_n,
        }
    }

    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            channel_dir: self.pipe_dir.clone(),
            workers: self.threads,
            read_length: self.read_length,
            seed: self.seed,
            collect_timeout: self.timeout.map(Duration::from_secs),
            aligner: self.aligner_params(),
            ..PipelineConfig::new(&self.reference, &self.reads)
        }
    }
}

/// Execute count subcommand
///
/// # Errors
///
/// Returns an error if configuration is invalid, the aligner fails, or any
/// worker stream is malformed.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CountArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.pipeline_config();

    if verbose {
        eprintln!("Reference file: {}", config.reference.display());
        eprintln!("Read file: {}", config.reads.display());
        eprintln!(
            "Identity cutoff: {}, workers: {}",
            config.aligner.min_identity,
            config.worker_count()
        );
    }

    let orchestrator = Orchestrator::new(config, PblatAligner::new(&args.pblat));
    let output = orchestrator.run()?;

    if verbose {
        eprintln!(
            "Counted reads on {} targets ({} reference windows)",
            output.tallies.len(),
            output.stats.total_windows()
        );
    }

    let mut out = open_output(args.output.as_deref())?;
    output.report().write(format.into(), &mut out)?;

    Ok(())
}
