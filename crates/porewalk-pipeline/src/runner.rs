//! Frame-parallel execution.
//!
//! A reader thread pumps frames into a bounded channel, worker threads run
//! the analyser, and a single writer drains a bounded reorder buffer so the
//! stream file is written in strictly increasing frame order regardless of
//! completion order. A cooperative cancel flag stops the pump; in-flight
//! frames finish whole or are dropped whole, so partial records never reach
//! the stream.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::bounded;
use log::{error, info};
use porewalk_core::{Frame, PorewalkError, Result};

use crate::analyzer::FrameAnalyzer;

/// Outcome of a streaming run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub analysed: usize,
    pub failed: usize,
}

/// Reorders out-of-order results back into frame order.
///
/// Bounded: out-of-orderness cannot exceed the in-flight frame count, so a
/// capacity overflow indicates a logic error rather than load.
pub(crate) struct ReorderBuffer {
    pending: BTreeMap<usize, Option<String>>,
    next: usize,
    capacity: usize,
}

impl ReorderBuffer {
    pub(crate) fn new(capacity: usize) -> Self {
        ReorderBuffer {
            pending: BTreeMap::new(),
            next: 0,
            capacity,
        }
    }

    /// Inserts one result (`None` marks a failed frame) and returns the
    /// lines that became ready to write, in order.
    pub(crate) fn push(&mut self, index: usize, line: Option<String>) -> Result<Vec<String>> {
        if self.pending.len() >= self.capacity {
            return Err(PorewalkError::internal(format!(
                "reorder buffer overflow at frame {} (capacity {})",
                index, self.capacity
            )));
        }
        self.pending.insert(index, line);

        let mut ready = Vec::new();
        while let Some(entry) = self.pending.remove(&self.next) {
            if let Some(line) = entry {
                ready.push(line);
            }
            self.next += 1;
        }
        Ok(ready)
    }

    pub(crate) fn is_drained(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Analyses `frames` with `workers` threads, writing one JSON line per
/// successful frame to `stream_path` in frame order.
///
/// Failed frames are logged with their index and counted; the caller
/// decides whether a non-zero failure count fails the run. I/O errors on
/// the stream file abort immediately.
pub fn run_frames<I>(
    frames: I,
    analyzer: &FrameAnalyzer,
    stream_path: &Path,
    workers: usize,
    cancel: &AtomicBool,
) -> Result<RunSummary>
where
    I: Iterator<Item = Result<Frame>> + Send,
{
    let workers = workers.max(1);
    let (frame_tx, frame_rx) = bounded::<(usize, Result<Frame>)>(2 * workers);
    let (result_tx, result_rx) = bounded::<(usize, Result<String>)>(2 * workers);

    let mut out = BufWriter::new(File::create(stream_path)?);
    let mut summary = RunSummary {
        analysed: 0,
        failed: 0,
    };

    let write_result: Result<()> = thread::scope(|scope| {
        // input pump: the only reader of the trajectory.
        scope.spawn(move || {
            for (index, frame) in frames.enumerate() {
                if cancel.load(Ordering::Relaxed) {
                    info!("cancellation requested, stopping frame pump at index {}", index);
                    break;
                }
                if frame_tx.send((index, frame)).is_err() {
                    break;
                }
            }
        });

        // workers: stateless apart from the shared read-only analyser.
        for _ in 0..workers {
            let frame_rx = frame_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for (index, frame) in frame_rx.iter() {
                    let line = frame
                        .and_then(|f| analyzer.analyze(&f))
                        .and_then(|record| record.to_json_line());
                    if result_tx.send((index, line)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(frame_rx);
        drop(result_tx);

        // writer: single consumer of the reorder buffer. Consumes the
        // receiver so an early error drops it and unblocks the workers
        // before the scope joins them.
        let mut buffer = ReorderBuffer::new(4 * workers + 16);
        for (index, line) in result_rx {
            let entry = match line {
                Ok(line) => Some(line),
                Err(err) => {
                    error!("frame {} failed: {}", index, err);
                    summary.failed += 1;
                    None
                }
            };
            if entry.is_some() {
                summary.analysed += 1;
            }
            for ready in buffer.push(index, entry)? {
                out.write_all(ready.as_bytes())?;
                out.write_all(b"\n")?;
            }
        }
        if !buffer.is_drained() {
            return Err(PorewalkError::internal(
                "reorder buffer not drained at end of run",
            ));
        }
        out.flush()?;
        Ok(())
    });
    write_result?;

    info!(
        "{} frames analysed, {} failed",
        summary.analysed, summary.failed
    );
    Ok(summary)
}
