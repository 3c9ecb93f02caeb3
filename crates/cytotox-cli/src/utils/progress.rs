use cytotox::engine::progress::{Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 100;

/// Spinner on stderr that follows the analysis phases, switching to a bar while a
/// stage works through samples.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
    phases_done: Arc<Mutex<u64>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    #[cfg(test)]
    pub fn hidden() -> Self {
        Self::with_draw_target(ProgressDrawTarget::hidden())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::new(0)
            .with_style(Self::spinner_style())
            .with_message("Waiting...");
        pb.set_draw_target(target);
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
            phases_done: Arc::new(Mutex::new(0)),
        }
    }

    pub fn phases_done(&self) -> u64 {
        self.phases_done.lock().map_or(0, |count| *count)
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();
        let phases_clone = self.phases_done.clone();

        Box::new(move |progress: Progress| {
            let Ok(pb_guard) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart { name } => {
                    pb_guard.reset();
                    pb_guard.set_length(0);
                    pb_guard.set_style(Self::spinner_style());
                    pb_guard.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb_guard.set_message(name.to_string());
                }
                Progress::PhaseFinish => {
                    pb_guard.disable_steady_tick();
                    pb_guard.finish_with_message("✓ Done");
                    if let Ok(mut count) = phases_clone.lock() {
                        *count += 1;
                    }
                }
                Progress::SamplesStart { samples } => {
                    pb_guard.disable_steady_tick();
                    pb_guard.reset();
                    pb_guard.set_length(samples);
                    pb_guard.set_style(Self::bar_style());
                }
                Progress::SampleDone { sample } => {
                    pb_guard.set_message(sample);
                    pb_guard.inc(1);
                }
                Progress::SamplesFinish => {
                    let length = pb_guard.length().unwrap_or(0);
                    pb_guard.set_position(length);
                }
                Progress::Message(msg) => {
                    if pb_guard.is_finished() {
                        pb_guard.set_message(msg);
                    } else {
                        pb_guard.println(format!("  {msg}"));
                    }
                }
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<24} [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn handler_starts_finished_and_empty() {
        let handler = CliProgressHandler::hidden();
        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.length(), Some(0));
        assert!(pb.is_finished());
        assert_eq!(handler.phases_done(), 0);
    }

    #[test]
    fn callback_follows_phases_and_samples() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart {
            name: "Normalization",
        });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.message(), "Normalization");
            assert!(!pb.is_finished());
        }

        callback(Progress::SamplesStart { samples: 4 });
        callback(Progress::SampleDone {
            sample: "MS309".to_string(),
        });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.length(), Some(4));
            assert_eq!(pb.position(), 1);
            assert_eq!(pb.message(), "MS309");
        }

        callback(Progress::SamplesFinish);
        assert_eq!(handler.pb.lock().unwrap().position(), 4);

        callback(Progress::PhaseFinish);
        assert_eq!(handler.pb.lock().unwrap().message(), "✓ Done");
        assert_eq!(handler.phases_done(), 1);
    }

    #[test]
    fn callback_can_run_on_another_thread() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::PhaseStart { name: "Reshape" });
            callback(Progress::Message("2 blocks".to_string()));
            callback(Progress::PhaseFinish);
        })
        .join()
        .unwrap();

        assert!(handler.pb.lock().unwrap().is_finished());
        assert_eq!(handler.phases_done(), 1);
    }
}
