/// Events emitted by long-running fits.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    /// One step per basin hop.
    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,
    /// A hop found a lower sum of squared residuals than any before it.
    /// Hop 0 is the local search from the starting guess.
    BestSse { hop: usize, sse: f64 },

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl std::fmt::Debug for ProgressReporter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    /// Runs `body` between a `PhaseStart` and a `PhaseFinish` event.
    pub fn phase<T>(&self, name: &'static str, body: impl FnOnce() -> T) -> T {
        self.report(Progress::PhaseStart { name });
        let result = body();
        self.report(Progress::PhaseFinish);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn silent_reporter_ignores_events() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::TaskIncrement);
        assert_eq!(reporter.phase("noop", || 7), 7);
    }

    #[test]
    fn phase_wraps_the_body_in_start_and_finish_events() {
        let events = Mutex::new(Vec::new());
        {
            let reporter = ProgressReporter::with_callback(Box::new(|e| {
                events.lock().unwrap().push(e);
            }));
            reporter.phase("fit", || reporter.report(Progress::TaskIncrement));
        }
        assert_eq!(
            events.into_inner().unwrap(),
            vec![
                Progress::PhaseStart { name: "fit" },
                Progress::TaskIncrement,
                Progress::PhaseFinish,
            ]
        );
    }
}
