//! Progress reporting for batches of files.
//!
//! A terminal bar by default. With `--log-only` the bar stays hidden and a
//! progress line is logged every few files instead.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

static LOG_ONLY: AtomicBool = AtomicBool::new(false);

pub fn set_log_only(value: bool) {
    LOG_ONLY.store(value, Ordering::Relaxed);
}

pub fn is_log_only() -> bool {
    LOG_ONLY.load(Ordering::Relaxed)
}

/// "1.5s" under a minute, "2.0m" above.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

/// Progress of one phase over a known number of files.
pub struct BatchProgress {
    phase: &'static str,
    bar: ProgressBar,
    done: u64,
    total: u64,
    log_every: u64,
}

impl BatchProgress {
    pub fn new(phase: &'static str, total: u64, log_every: u64) -> Self {
        let bar = ProgressBar::new(total);
        if is_log_only() {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        } else {
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
                    .unwrap()
                    .progress_chars("=> "),
            );
        }
        bar.set_message(phase);
        Self {
            phase,
            bar,
            done: 0,
            total,
            log_every: log_every.max(1),
        }
    }

    /// Count one finished file.
    pub fn tick(&mut self) {
        self.done += 1;
        self.bar.inc(1);
        if let Some(line) = self.log_line() {
            log::info!("{}", line);
        }
    }

    /// The periodic progress line due after the current file, if any.
    fn log_line(&self) -> Option<String> {
        if !is_log_only() || self.total == 0 {
            return None;
        }
        if self.done % self.log_every != 0 && self.done != self.total {
            return None;
        }
        let pct = 100.0 * self.done as f64 / self.total as f64;
        Some(format!("[{}] {}/{} ({:.1}%)", self.phase, self.done, self.total, pct))
    }

    pub fn finish(self) {
        self.bar.finish_and_clear();
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1.5m");
    }

    #[test]
    fn test_log_only_batch() {
        set_log_only(true);
        let mut progress = BatchProgress::new("Saving", 5, 2);
        assert!(progress.is_hidden());

        let mut lines = Vec::new();
        for _ in 0..5 {
            progress.done += 1;
            lines.extend(progress.log_line());
        }
        set_log_only(false);

        assert_eq!(
            lines,
            vec!["[Saving] 2/5 (40.0%)", "[Saving] 4/5 (80.0%)", "[Saving] 5/5 (100.0%)"]
        );
        progress.finish();
    }

    #[test]
    fn test_zero_interval_and_empty_batch() {
        let mut progress = BatchProgress::new("Reading tags", 0, 0);
        progress.tick();
        progress.finish();
    }
}
