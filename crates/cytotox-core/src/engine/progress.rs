/// Events a running analysis reports to its caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    /// A stage is about to work through `samples` samples one at a time.
    SamplesStart { samples: u64 },
    /// The current stage is done with `sample`.
    SampleDone { sample: String },
    SamplesFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards events to an optional callback; without one, reporting is a no-op.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    sink: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            sink: Some(callback),
        }
    }

    pub fn report(&self, event: Progress) {
        if let Some(sink) = &self.sink {
            sink(event);
        }
    }

    pub fn message(&self, text: impl Into<String>) {
        self.report(Progress::Message(text.into()));
    }
}
