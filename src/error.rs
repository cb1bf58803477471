use std::path::PathBuf;
use std::process::ExitStatus;

/// Boundary errors reported to the user before or after a run.
///
/// Per-game parse problems are recorded on the game itself and logged as
/// warnings; they never surface here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("input file '{}' is missing", .0.display())]
    MissingInput(PathBuf),

    #[error("input and output are the same file: '{}'", .0.display())]
    InputIsOutput(PathBuf),

    #[error("output filename matches the program name: '{0}'")]
    OutputIsProgram(String),

    #[error("normalizer executable '{0}' is missing")]
    MissingNormalizer(String),

    #[error("pgn-extract failed ({status}): {stderr}")]
    NormalizerFailed { status: ExitStatus, stderr: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
