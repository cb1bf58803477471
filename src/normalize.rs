use crate::error::Error;

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Resolves the pgn-extract executable.
///
/// A name containing a path separator is checked as-is; a bare name is
/// looked up in the working directory first (the tool historically lives
/// next to its input files), then on `PATH`.
pub fn locate(name: &str) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    if candidate.is_file() {
        return Some(candidate.to_path_buf());
    }

    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|full| full.is_file())
}

/// Runs `pgn-extract -s -o<output> <temp>` and waits for it to finish.
///
/// Stdout is discarded; a spawn failure or non-zero exit is surfaced with
/// the tool's stderr instead of being silently ignored.
pub fn run(exe: &Path, temp: &Path, output: &Path) -> Result<(), Error> {
    let result = Command::new(exe)
        .arg("-s")
        .arg(format!("-o{}", output.display()))
        .arg(temp)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()?;

    if result.status.success() {
        Ok(())
    } else {
        Err(Error::NormalizerFailed {
            status: result.status,
            stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
        })
    }
}
