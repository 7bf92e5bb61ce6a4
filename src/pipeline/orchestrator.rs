use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::aggregate::{aggregate_stream, merge_tallies};
use crate::core::tally::TallyTable;
use crate::parsing::pslx::ParseError;
use crate::pipeline::aligner::{Aligner, AlignmentRequest};
use crate::pipeline::channel::ChannelSet;
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::report::Report;
use crate::pipeline::PipelineError;
use crate::reference::ReferenceStatistics;

/// How often readers stuck waiting for a writer are released after the aligner exits
const RELEASE_INTERVAL: Duration = Duration::from_millis(50);

/// One finished worker: its index and its table or the error that stopped it
type WorkerMessage = (usize, Result<TallyTable, ParseError>);

/// Merged tallies and reference statistics of a run
#[derive(Debug)]
pub struct PipelineOutput {
    pub tallies: TallyTable,
    pub stats: ReferenceStatistics,
}

impl PipelineOutput {
    #[must_use]
    pub fn report(&self) -> Report {
        Report::build(&self.tallies, Some(&self.stats))
    }
}

/// Runs the aligner into named pipes and aggregates what comes out
pub struct Orchestrator<A> {
    config: PipelineConfig,
    aligner: A,
}

impl<A: Aligner> Orchestrator<A> {
    pub fn new(config: PipelineConfig, aligner: A) -> Self {
        Self { config, aligner }
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Execute one counting run.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` before anything is created if inputs are
    /// invalid, `ChannelCreation` if the pipes cannot be made, `Aligner` if
    /// the aligner fails, `Worker` if any stream is malformed, `Timeout` if a
    /// collection timeout expires, or `Reference` if the reference cannot be read.
    pub fn run(&self) -> Result<PipelineOutput, PipelineError> {
        self.config.validate()?;

        let workers = self.config.worker_count();
        let channels = ChannelSet::create(&self.config.channel_dir(), workers)?;

        // Readers first: a writer blocks on open until the pipe has a reader
        let (tx, rx) = mpsc::channel();
        let handles = spawn_workers(channels.paths(), self.config.seed, &tx);
        drop(tx);
        let handles = match handles {
            Ok(handles) => handles,
            Err(e) => {
                channels.release_readers();
                return Err(e);
            }
        };

        let reference = self.config.reference.clone();
        let read_length = self.config.read_length;
        let stats_handle = thread::Builder::new()
            .name("reference-stats".to_string())
            .spawn(move || ReferenceStatistics::from_fasta(read_length, &reference))?;

        let request = AlignmentRequest {
            reference: &self.config.reference,
            reads: &self.config.reads,
            channel_pattern: channels.pattern(),
            channels: channels.paths(),
            params: &self.config.aligner,
        };
        let aligned = self.aligner.align(&request);
        if let Err(e) = &aligned {
            warn!(error = %e, "Aligner failed; draining workers");
        }

        let collected = collect_results(&rx, workers, self.config.collect_timeout, || {
            channels.release_readers();
        });
        let tables = match (aligned, collected) {
            // A malformed stream usually breaks the aligner's pipe too; report the cause
            (_, Err(e @ PipelineError::Worker { .. })) | (Err(e), _) | (Ok(()), Err(e)) => {
                channels.release_readers();
                return Err(e);
            }
            (Ok(()), Ok(tables)) => tables,
        };
        join_workers(handles)?;

        let tallies = merge_tallies(tables);
        info!(targets = tallies.len(), "Merged worker results");

        let stats = stats_handle
            .join()
            .map_err(|_| PipelineError::ThreadPanicked("reference-stats".to_string()))?
            .map_err(PipelineError::Reference)?;

        drop(channels);
        Ok(PipelineOutput { tallies, stats })
    }
}

/// Aggregate existing PSLX files, one worker thread per file.
///
/// # Errors
///
/// Returns `Worker` for the first file that cannot be read or decoded.
pub fn aggregate_files(paths: &[PathBuf], seed: Option<u64>) -> Result<TallyTable, PipelineError> {
    let (tx, rx) = mpsc::channel();
    let handles = spawn_workers(paths, seed, &tx)?;
    drop(tx);

    let tables = collect_results(&rx, paths.len(), None, || {})?;
    join_workers(handles)?;

    Ok(merge_tallies(tables))
}

fn spawn_workers(
    paths: &[PathBuf],
    seed: Option<u64>,
    tx: &Sender<WorkerMessage>,
) -> Result<Vec<JoinHandle<()>>, PipelineError> {
    let mut handles = Vec::with_capacity(paths.len());

    for (index, path) in paths.iter().enumerate() {
        let path = path.clone();
        let tx = tx.clone();
        let worker_seed = seed.map(|s| s.wrapping_add(index as u64));

        let handle = thread::Builder::new()
            .name(format!("aggregate-{index}"))
            .spawn(move || {
                let result = aggregate_path(&path, worker_seed);
                // The receiver is gone only if the run was abandoned
                let _ = tx.send((index, result));
            })?;
        handles.push(handle);
    }

    Ok(handles)
}

/// Open a stream (blocking until a writer attaches, for a pipe) and fold it
fn aggregate_path(path: &Path, seed: Option<u64>) -> Result<TallyTable, ParseError> {
    let mut rng = match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };

    let file = File::open(path)?;
    let tallies = aggregate_stream(BufReader::new(file), &mut rng)?;
    debug!(path = %path.display(), targets = tallies.len(), "Worker finished");
    Ok(tallies)
}

/// Receive exactly `expected` worker results, ordered by worker index.
///
/// `on_tick` runs before every wait; the pipeline uses it to release
/// readers no writer will ever reach.
fn collect_results<F: FnMut()>(
    rx: &Receiver<WorkerMessage>,
    expected: usize,
    timeout: Option<Duration>,
    mut on_tick: F,
) -> Result<Vec<TallyTable>, PipelineError> {
    let mut tables: Vec<Option<TallyTable>> = vec![None; expected];
    let mut received = 0;
    let mut last_progress = Instant::now();

    while received < expected {
        on_tick();
        match rx.recv_timeout(RELEASE_INTERVAL) {
            Ok((index, Ok(table))) => {
                tables[index] = Some(table);
                received += 1;
                last_progress = Instant::now();
            }
            Ok((index, Err(source))) => return Err(PipelineError::Worker { index, source }),
            Err(RecvTimeoutError::Timeout) => {
                if let Some(limit) = timeout {
                    if last_progress.elapsed() >= limit {
                        return Err(PipelineError::Timeout(limit));
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                let missing = tables.iter().position(Option::is_none).unwrap_or(0);
                return Err(PipelineError::ThreadPanicked(format!("aggregate-{missing}")));
            }
        }
    }

    Ok(tables.into_iter().flatten().collect())
}

fn join_workers(handles: Vec<JoinHandle<()>>) -> Result<(), PipelineError> {
    for (index, handle) in handles.into_iter().enumerate() {
        handle
            .join()
            .map_err(|_| PipelineError::ThreadPanicked(format!("aggregate-{index}")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn pslx_file(lines: &[(&str, &str, u32)]) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".pslx").unwrap();
        for (q, t, score) in lines {
            writeln!(
                file,
                "{score}\t0\t0\t0\t0\t0\t0\t0\t+\t{q}\t43\t0\t43\t{t}\t500\t0\t43\t1\t43,\t0,\t0,\tacgt,\tacgt,"
            )
            .unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_aggregate_files_merges() {
        let a = pslx_file(&[("r1", "T1", 43)]);
        let b = pslx_file(&[("r2", "T1", 43), ("r3", "T1", 40), ("r3", "T2", 40)]);

        let table =
            aggregate_files(&[a.path().to_path_buf(), b.path().to_path_buf()], Some(3)).unwrap();
        let t1 = table.get("T1").unwrap();
        assert_eq!(t1.unique_reads, 2);
        assert_eq!(t1.non_unique_reads, 1);
        assert_eq!(table.get("T2").unwrap().non_unique_reads, 1);
    }

    #[test]
    fn test_aggregate_files_reports_bad_worker() {
        let good = pslx_file(&[("r1", "T1", 43)]);
        let mut bad = NamedTempFile::new().unwrap();
        writeln!(bad, "garbage").unwrap();

        let err = aggregate_files(&[good.path().to_path_buf(), bad.path().to_path_buf()], None)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Worker { index: 1, .. }));
    }

    #[test]
    fn test_collect_times_out() {
        let (_tx, rx) = mpsc::channel::<WorkerMessage>();
        let err = collect_results(&rx, 1, Some(Duration::from_millis(100)), || {}).unwrap_err();
        assert!(matches!(err, PipelineError::Timeout(_)));
    }

    #[test]
    fn test_collect_orders_by_index() {
        let (tx, rx) = mpsc::channel();
        let mut second = TallyTable::new();
        second.entry("T2");
        tx.send((1, Ok(second))).unwrap();
        tx.send((0, Ok(TallyTable::new()))).unwrap();

        let tables = collect_results(&rx, 2, None, || {}).unwrap();
        assert!(tables[0].is_empty());
        assert_eq!(tables[1].len(), 1);
    }
}
