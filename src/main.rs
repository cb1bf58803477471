use pgn_fragments::error::Error;
use pgn_fragments::{extract, log, normalize, tree};

use clap::Parser;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const APP_NAME: &str = "Game Fragment Extractor";

#[derive(Parser)]
#[command(
    name = "pgn-fragments",
    version,
    about = "Extracts marked game fragments from PGN files"
)]
struct Args {
    /// Input PGN file (".zst" inputs are decompressed transparently)
    #[arg(short, long)]
    input: PathBuf,

    /// Output PGN file for the normalized fragments
    #[arg(short, long)]
    output: PathBuf,

    /// Name or path of the pgn-extract executable
    #[arg(long, default_value = "pgn-extract")]
    pgn_extract: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    println!("{} v{}\n", APP_NAME, env!("CARGO_PKG_VERSION"));

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error(e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Error> {
    if !args.input.is_file() {
        return Err(Error::MissingInput(args.input.clone()));
    }
    if args.input == args.output {
        return Err(Error::InputIsOutput(args.input.clone()));
    }
    if let Some(program) = program_name()
        && args.output.file_name() == Some(program.as_os_str())
    {
        return Err(Error::OutputIsProgram(program.to_string_lossy().into_owned()));
    }

    let normalizer = normalize::locate(&args.pgn_extract)
        .ok_or_else(|| Error::MissingNormalizer(args.pgn_extract.clone()))?;

    let temp = temp_path(&args.input);
    remove_if_exists(&args.output)?;
    remove_if_exists(&temp)?;

    let summary = extract::extract_fragments(&args.input, &temp)?;
    if summary.skipped > 0 {
        log::warn(format!("{} game(s) skipped due to parse errors", summary.skipped));
    }

    if summary.fragments == 0 {
        log::warn(format!(
            "no '{}' markers found in {} game(s); nothing to write",
            tree::SENTINEL,
            summary.games
        ));
        remove_if_exists(&temp)?;
        return Ok(());
    }

    let normalized = normalize::run(&normalizer, &temp, &args.output);
    remove_if_exists(&temp)?;
    normalized?;

    println!(
        "{} fragment(s) from {} game(s) written to {}",
        summary.fragments,
        summary.games,
        args.output.display()
    );
    Ok(())
}

fn program_name() -> Option<OsString> {
    let argv0 = env::args_os().next()?;
    Path::new(&argv0).file_name().map(OsString::from)
}

/// The shared temp file lives next to the input as `temp_out_<file-name>`
/// and is deleted once the normalizer has consumed it.
fn temp_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("temp_out_{name}"))
}

fn remove_if_exists(path: &Path) -> Result<(), Error> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_path_prefixes_file_name_only() {
        assert_eq!(
            temp_path(Path::new("games/input.pgn")),
            Path::new("games/temp_out_input.pgn")
        );
        assert_eq!(
            temp_path(Path::new("input.pgn")),
            Path::new("temp_out_input.pgn")
        );
    }

    #[test]
    fn test_remove_if_exists_tolerates_missing_file() {
        assert!(remove_if_exists(Path::new("no-such-file.pgn")).is_ok());
    }

    #[test]
    fn test_remove_if_exists_deletes_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stale.pgn");
        fs::write(&path, "stale").unwrap();

        remove_if_exists(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_input_is_rejected() {
        let args = Args {
            input: PathBuf::from("no-such-input.pgn"),
            output: PathBuf::from("out.pgn"),
            pgn_extract: "pgn-extract".to_string(),
        };
        assert!(matches!(run(&args), Err(Error::MissingInput(_))));
    }

    #[test]
    fn test_input_equal_to_output_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("games.pgn");
        fs::write(&input, "1. e4 *").unwrap();

        let args = Args {
            input: input.clone(),
            output: input,
            pgn_extract: "pgn-extract".to_string(),
        };
        assert!(matches!(run(&args), Err(Error::InputIsOutput(_))));
    }

    #[test]
    fn test_missing_normalizer_is_rejected_before_processing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("games.pgn");
        fs::write(&input, "1. e4 {[#]} e5 *").unwrap();

        let args = Args {
            input,
            output: dir.path().join("out.pgn"),
            pgn_extract: "definitely-not-a-real-tool-name".to_string(),
        };
        assert!(matches!(run(&args), Err(Error::MissingNormalizer(_))));
        // Precondition failure means no temp file was ever written.
        assert!(!dir.path().join("temp_out_games.pgn").exists());
    }

    #[test]
    fn test_no_sentinels_is_a_warning_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("games.pgn");
        fs::write(&input, "1. e4 e5 2. Nf3 Nc6 *").unwrap();
        let normalizer = dir.path().join("pgn-extract");
        fs::write(&normalizer, b"").unwrap();

        let args = Args {
            input,
            output: dir.path().join("out.pgn"),
            pgn_extract: normalizer.to_string_lossy().into_owned(),
        };

        run(&args).unwrap();
        assert!(!dir.path().join("out.pgn").exists());
        assert!(!dir.path().join("temp_out_games.pgn").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_end_to_end_run_invokes_normalizer_and_cleans_temp() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("games.pgn");
        fs::write(&input, "1. e4 e5 {[#]} 2. Nf3 (2. Nc3) Nc6 1-0").unwrap();

        // Stand-in normalizer: copies the temp file to the -o target.
        let normalizer = dir.path().join("fake-pgn-extract");
        fs::write(
            &normalizer,
            "#!/bin/sh\nout=\"${2#-o}\"\ncp \"$3\" \"$out\"\n",
        )
        .unwrap();
        fs::set_permissions(&normalizer, fs::Permissions::from_mode(0o755)).unwrap();

        let output = dir.path().join("out.pgn");
        let args = Args {
            input,
            output: output.clone(),
            pgn_extract: normalizer.to_string_lossy().into_owned(),
        };

        run(&args).unwrap();

        let contents = fs::read_to_string(&output).unwrap();
        assert!(contents.contains("Nf3 (Nc3 ) Nc6  1-0"));
        assert!(!dir.path().join("temp_out_games.pgn").exists());
    }
}
