//! Console progress reporter.
//!
//! A background thread polls the shared [`RenderProgress`] every
//! [`REPORT_INTERVAL`] and rewrites a single status line on stderr. The
//! channel doubles as the timer and the shutdown signal.

use std::io::Write;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, RecvTimeoutError, Sender};
use pyre_renderer::{ProgressSnapshot, RenderProgress};

pub const REPORT_INTERVAL: Duration = Duration::from_millis(500);

pub struct ProgressReporter {
    done: Sender<()>,
    handle: JoinHandle<()>,
}

impl ProgressReporter {
    pub fn spawn(progress: Arc<RenderProgress>) -> std::io::Result<Self> {
        let (done, rx) = channel::bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("pyre-progress".into())
            .spawn(move || loop {
                match rx.recv_timeout(REPORT_INTERVAL) {
                    Err(RecvTimeoutError::Timeout) => write_status(&progress.snapshot()),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                        write_status(&progress.snapshot());
                        eprintln!();
                        break;
                    }
                }
            })?;

        Ok(Self { done, handle })
    }

    /// Print the final status line and wait for the reporter to exit.
    pub fn finish(self) {
        // A send error means the thread is already gone
        let _ = self.done.send(());
        if self.handle.join().is_err() {
            log::warn!("Progress reporter panicked");
        }
    }
}

fn write_status(snapshot: &ProgressSnapshot) {
    let mut stderr = std::io::stderr().lock();
    let _ = write!(stderr, "\r{}      ", format_status(snapshot));
    let _ = stderr.flush();
}

pub fn format_status(snapshot: &ProgressSnapshot) -> String {
    let remaining = match snapshot.remaining() {
        Some(left) => format!("{}s", left.as_secs()),
        None => "unknown".to_string(),
    };
    format!(
        "Render progress: {:.3}%; expected remaining: {}",
        snapshot.fraction() * 100.0,
        remaining
    )
}
