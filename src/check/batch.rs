//! Parallel checking of many tickets.
//!
//! Jobs go into a std::sync::mpsc channel that a fixed pool of worker
//! threads drains. Each worker recognizes a ticket, checks it, and sends the
//! report back tagged with the job index so results can be returned in
//! submission order. A ticket that fails recognition gets a failed report;
//! it never stops the rest of the batch.

use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;
use std::thread;

use super::pipeline::{check_lines, TicketReport};
use crate::draw::DrawSource;
use crate::log;
use crate::ocr::{TextSource, STDIN_PATH};
use crate::ticket::ExtractRules;

/// A ticket waiting to be checked.
#[derive(Debug, Clone)]
pub struct TicketJob {
    /// Position in the submitted batch (0-based)
    pub index: usize,
    /// Path to the ticket image or text file
    pub path: PathBuf,
}

impl TicketJob {
    pub fn new(index: usize, path: PathBuf) -> Self {
        Self { index, path }
    }

    /// Label used in reports and logs.
    pub fn label(&self) -> String {
        if self.path.as_os_str() == STDIN_PATH {
            "stdin".to_string()
        } else {
            self.path.display().to_string()
        }
    }
}

/// Creates a new job queue.
///
/// The channel is unbounded; the whole batch is queued up front and the
/// sender dropped, so workers stop once it is drained.
pub fn create_job_queue() -> (Sender<TicketJob>, Receiver<TicketJob>) {
    channel()
}

/// Shared services every worker uses.
pub struct BatchContext<'a> {
    pub text: &'a dyn TextSource,
    pub draws: &'a dyn DrawSource,
    pub rules: &'a ExtractRules,
}

/// Checks every ticket in `paths` using up to `workers` threads.
/// Reports come back in the same order as `paths`.
pub fn run_batch(paths: &[PathBuf], ctx: &BatchContext<'_>, workers: usize) -> Vec<TicketReport> {
    let (sender, receiver) = create_job_queue();
    for (index, path) in paths.iter().enumerate() {
        // The receiver is alive until the workers below finish.
        let _ = sender.send(TicketJob::new(index, path.clone()));
    }
    drop(sender);

    let jobs = Mutex::new(receiver);
    let (result_tx, result_rx) = channel();
    let workers = workers.clamp(1, paths.len().max(1));

    log(&format!(
        "Checking {} ticket(s) with {} worker(s)",
        paths.len(),
        workers
    ));

    thread::scope(|scope| {
        for worker_id in 1..=workers {
            let jobs = &jobs;
            let results = result_tx.clone();
            scope.spawn(move || run_worker(worker_id, jobs, results, ctx));
        }
    });
    drop(result_tx);

    let mut reports: Vec<(usize, TicketReport)> = result_rx.into_iter().collect();
    reports.sort_by_key(|(index, _)| *index);
    reports.into_iter().map(|(_, report)| report).collect()
}

/// Runs one worker until the job queue is empty.
fn run_worker(
    worker_id: usize,
    jobs: &Mutex<Receiver<TicketJob>>,
    results: Sender<(usize, TicketReport)>,
    ctx: &BatchContext<'_>,
) {
    loop {
        // Hold the lock only while taking the next job.
        let next = {
            let receiver = jobs.lock().unwrap_or_else(|e| e.into_inner());
            receiver.recv()
        };

        let job = match next {
            Ok(job) => job,
            Err(_) => {
                // Channel closed and drained
                break;
            }
        };

        log(&format!(
            "Worker {}: checking ticket {} ({})",
            worker_id,
            job.index + 1,
            job.label()
        ));

        let report = match ctx.text.recognize(&job.path) {
            Ok(lines) => check_lines(&job.label(), &lines, ctx.draws, ctx.rules),
            Err(e) => {
                log(&format!(
                    "Worker {}: recognition failed for {}: {:#}",
                    worker_id,
                    job.label(),
                    e
                ));
                TicketReport::recognition_failed(&job.label(), format!("{:#}", e))
            }
        };

        if results.send((job.index, report)).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::pipeline::Outcome;
    use crate::draw::{DrawRecord, PrizeTable, StaticDrawSource};
    use crate::ocr::TextFileSource;
    use crate::ticket::DrawPeriod;
    use anyhow::{anyhow, Result};
    use std::collections::HashMap;
    use std::path::Path;

    /// Serves canned lines per path.
    struct CannedText {
        tickets: HashMap<PathBuf, Vec<String>>,
    }

    impl TextSource for CannedText {
        fn recognize(&self, path: &Path) -> Result<Vec<String>> {
            self.tickets
                .get(path)
                .cloned()
                .ok_or_else(|| anyhow!("unreadable image"))
        }
    }

    fn draws() -> StaticDrawSource {
        let mut source = StaticDrawSource::new();
        source.insert(
            DrawRecord::new(
                DrawPeriod::parse("23056").unwrap(),
                [1, 2, 3, 4, 5],
                [1, 2],
                PrizeTable::new(10_000_000, 200_000),
            )
            .unwrap(),
        );
        source
    }

    fn ticket(front: &str) -> Vec<String> {
        vec!["第23056期".to_string(), format!("{} + 11 12", front)]
    }

    #[test]
    fn test_work_queue_send_receive() {
        let (sender, receiver) = create_job_queue();
        sender
            .send(TicketJob::new(0, PathBuf::from("ticket.png")))
            .unwrap();
        drop(sender);

        let received = receiver.recv().unwrap();
        assert_eq!(received.index, 0);
        assert_eq!(received.path, PathBuf::from("ticket.png"));
        assert!(receiver.recv().is_err());
    }

    #[test]
    fn test_batch_preserves_order() {
        let fronts = [
            "01 02 03 04 05",    // 5+0
            "01 02 03 04 09",    // 4+0
            "10 11 12 13 14",    // nothing
            "01 02 03 20 21",    // 3+0
        ];
        let paths: Vec<PathBuf> = (0..fronts.len())
            .map(|i| PathBuf::from(format!("ticket_{}.png", i)))
            .collect();
        let text = CannedText {
            tickets: paths
                .iter()
                .cloned()
                .zip(fronts.iter().map(|f| ticket(f)))
                .collect(),
        };
        let draws = draws();
        let rules = ExtractRules::default();
        let ctx = BatchContext {
            text: &text,
            draws: &draws,
            rules: &rules,
        };

        let reports = run_batch(&paths, &ctx, 3);

        let totals: Vec<u64> = reports.iter().map(|r| r.total).collect();
        assert_eq!(totals, vec![10_000, 100, 0, 5]);
        for (report, path) in reports.iter().zip(&paths) {
            assert_eq!(report.source, path.display().to_string());
        }
    }

    #[test]
    fn test_recognition_failure_does_not_stop_batch() {
        let good = PathBuf::from("good.png");
        let bad = PathBuf::from("bad.png");
        let text = CannedText {
            tickets: HashMap::from([(good.clone(), ticket("01 02 03 04 05"))]),
        };
        let draws = draws();
        let rules = ExtractRules::default();
        let ctx = BatchContext {
            text: &text,
            draws: &draws,
            rules: &rules,
        };

        let reports = run_batch(&[bad, good], &ctx, 2);
        assert_eq!(reports.len(), 2);
        assert!(matches!(
            reports[0].outcome,
            Outcome::RecognitionFailed { .. }
        ));
        assert_eq!(reports[1].outcome, Outcome::Checked);
    }

    #[test]
    fn test_stdin_keeps_argument_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.txt");
        let last = dir.path().join("last.txt");
        std::fs::write(&first, ticket("01 02 03 04 05").join("\n")).unwrap();
        std::fs::write(&last, ticket("01 02 03 20 21").join("\n")).unwrap();

        let text = TextFileSource::with_stdin(&ticket("01 02 03 04 09").join("\n"));
        let draws = draws();
        let rules = ExtractRules::default();
        let ctx = BatchContext {
            text: &text,
            draws: &draws,
            rules: &rules,
        };

        let paths = [first.clone(), PathBuf::from(STDIN_PATH), last.clone()];
        let reports = run_batch(&paths, &ctx, 3);

        let sources: Vec<String> = reports.iter().map(|r| r.source.clone()).collect();
        assert_eq!(
            sources,
            vec![
                first.display().to_string(),
                "stdin".to_string(),
                last.display().to_string()
            ]
        );
        let totals: Vec<u64> = reports.iter().map(|r| r.total).collect();
        assert_eq!(totals, vec![10_000, 100, 5]);
    }

    #[test]
    fn test_empty_batch() {
        let text = CannedText {
            tickets: HashMap::new(),
        };
        let draws = draws();
        let rules = ExtractRules::default();
        let ctx = BatchContext {
            text: &text,
            draws: &draws,
            rules: &rules,
        };
        assert!(run_batch(&[], &ctx, 4).is_empty());
    }
}
