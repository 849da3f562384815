use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use statmech_glass::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;
const HOPPING_LABEL: &str = "Hopping";

/// Renders fit progress on stderr: a spinner while data and parameters load,
/// then a bar over the basin hops labelled with the lowest SSE found so far.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0)
            .with_style(Self::spinner_style())
            .with_message("Preparing fit...");
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb = self.pb.clone();

        Box::new(move |progress: Progress| {
            let Ok(bar) = pb.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart { name } => {
                    bar.reset();
                    bar.set_length(0);
                    bar.set_style(Self::spinner_style());
                    bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    bar.set_message(name);
                }
                Progress::PhaseFinish => {
                    bar.disable_steady_tick();
                    bar.finish_with_message("✓ Done");
                }
                Progress::TaskStart { total_steps } => {
                    bar.disable_steady_tick();
                    bar.reset();
                    bar.set_length(total_steps);
                    bar.set_position(0);
                    bar.set_style(Self::bar_style());
                    bar.set_message(HOPPING_LABEL);
                }
                Progress::BestSse { hop, sse } => {
                    bar.set_message(best_sse_label(sse));
                    if hop > 0 && !bar.is_hidden() {
                        bar.println(format!("  hop {hop}: SSE lowered to {sse:.4e}"));
                    }
                }
                Progress::TaskIncrement => bar.inc(1),
                Progress::TaskFinish => {
                    let length = bar.length().unwrap_or(0);
                    if bar.position() < length {
                        bar.set_position(length);
                    }
                    bar.finish();
                }
                Progress::Message(msg) => {
                    if bar.is_finished() {
                        bar.set_message(msg);
                    } else {
                        bar.println(format!("  {}", msg));
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
        ProgressStyle::with_template("{msg:<20} [{bar:36.cyan/blue}] hop {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .with_key(
                "eta",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
                },
            )
            .progress_chars("##-")
    }
}

fn best_sse_label(sse: f64) -> String {
    format!("best SSE {sse:.3e}")
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
        let handler = CliProgressHandler::new();
        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.length(), Some(0));
        assert!(pb.is_finished());
    }

    #[test]
    fn hops_drive_the_bar() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart {
            name: "Fitting enthalpies",
        });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.message(), "Fitting enthalpies");
            assert!(!pb.is_finished());
        }

        callback(Progress::TaskStart { total_steps: 4 });
        callback(Progress::TaskIncrement);
        callback(Progress::TaskIncrement);
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.length(), Some(4));
            assert_eq!(pb.position(), 2);
        }

        callback(Progress::TaskFinish);
        {
            let pb = handler.pb.lock().unwrap();
            assert!(pb.is_finished());
            assert_eq!(pb.position(), 4);
        }

        callback(Progress::PhaseFinish);
        assert_eq!(handler.pb.lock().unwrap().message(), "✓ Done");
    }

    #[test]
    fn lower_sse_replaces_the_bar_label() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        callback(Progress::TaskStart { total_steps: 10 });
        assert_eq!(handler.pb.lock().unwrap().message(), HOPPING_LABEL);

        callback(Progress::BestSse { hop: 0, sse: 0.5 });
        assert_eq!(handler.pb.lock().unwrap().message(), "best SSE 5.000e-1");

        callback(Progress::TaskIncrement);
        callback(Progress::BestSse {
            hop: 1,
            sse: 2.5e-7,
        });
        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.message(), "best SSE 2.500e-7");
        assert_eq!(pb.position(), 1);
    }

    #[test]
    fn callback_can_move_to_another_thread() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::PhaseStart {
                name: "Loading ternary data",
            });
            callback(Progress::Message("3 rows".to_string()));
            callback(Progress::PhaseFinish);
        })
        .join()
        .unwrap();

        let pb = handler.pb.lock().unwrap();
        assert!(pb.is_finished());
        assert_eq!(pb.message(), "✓ Done");
    }
}
