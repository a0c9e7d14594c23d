//! Wall-clock progress reporting for long-running phases.
//!
//! A supervisor thread wakes on a fixed interval, independent of how fast
//! work completes, and reports the counters it is given. On a terminal it
//! drives an indicatif bar, otherwise it prints `label current / max` lines.

use std::io::IsTerminal;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, Sender};
use indicatif::{ProgressBar, ProgressStyle};

/// Handle to a running supervisor thread.
pub struct Supervisor {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

impl Supervisor {
    /// Start reporting `poll()` as `(current, max)` every `interval`.
    pub fn spawn<F>(label: &'static str, interval: Duration, poll: F) -> Self
    where
        F: Fn() -> (u64, u64) + Send + 'static,
    {
        let (stop, stopped) = crossbeam_channel::bounded::<()>(1);
        let bar = std::io::stderr().is_terminal().then(|| new_bar(label));

        let handle = std::thread::spawn(move || {
            loop {
                let finished = match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => false,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
                };

                let (current, max) = poll();
                match &bar {
                    Some(bar) => {
                        bar.set_length(max);
                        bar.set_position(current);
                    }
                    None => eprintln!("{} {} / {}", label, current, max),
                }

                if finished {
                    break;
                }
            }
            if let Some(bar) = bar {
                bar.finish();
            }
        });

        Self { stop, handle }
    }

    /// Report the final counters and stop the thread.
    pub fn finish(self) {
        let _ = self.stop.send(());
        if self.handle.join().is_err() {
            tracing::warn!("progress reporter panicked");
        }
    }
}

fn new_bar(label: &'static str) -> ProgressBar {
    let bar = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("{prefix:>6} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    bar.set_style(style);
    bar.set_prefix(label);
    bar
}
