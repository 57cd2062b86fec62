use symcalc_error::Error as ComputeError;

/// Utility enum to package errors that can occur while running a line.
#[derive(Debug)]
pub enum Error {
    /// An error from parsing, evaluating, simplifying or differentiating. Its spans point into
    /// the expression source.
    Compute(ComputeError),

    /// A malformed REPL command.
    Command(String),
}

impl Error {
    /// Report this error to stderr. `input` is the source the error's spans point into.
    pub fn report_to_stderr(&self, input: &str) {
        match self {
            Self::Compute(err) => err.report_to_stderr("input", input),
            Self::Command(msg) => eprintln!("error: {}", msg),
        }
    }
}

impl From<ComputeError> for Error {
    fn from(err: ComputeError) -> Self {
        Self::Compute(err)
    }
}
