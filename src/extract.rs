use crate::error::Error;
use crate::log;
use crate::serializer;
use crate::tree::{Game, SENTINEL};
use crate::visitor::GameTreeBuilder;

use pgn_reader::Reader;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;
use zstd::stream::read::Decoder as ZstdDecoder;

pub type PgnInput = Box<dyn Read>;

#[derive(Debug, Default, Eq, PartialEq)]
pub struct ExtractionSummary {
    pub games: usize,
    pub fragments: usize,
    pub skipped: usize,
}

/// Opens the input stream, decompressing `.zst` files transparently.
///
/// No extra BufReader layer: pgn-reader buffers the underlying reader with
/// its own strategy and recommends against double buffering.
pub fn open_input_stream(path: &Path) -> Result<PgnInput, Error> {
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "zst") {
        Ok(Box::new(ZstdDecoder::new(file)?))
    } else {
        Ok(Box::new(file))
    }
}

/// Scans every game in `input` and appends one fragment to `temp` for each
/// main-line node whose comment is the `"[#]"` sentinel.
///
/// The temp file is created lazily on the first fragment, so a run without
/// sentinels leaves no file behind. Games with parse diagnostics are logged
/// and skipped; the run continues.
pub fn extract_fragments(input: &Path, temp: &Path) -> Result<ExtractionSummary, Error> {
    let mut reader = Reader::new(open_input_stream(input)?);
    let mut builder = GameTreeBuilder::new();
    let mut summary = ExtractionSummary::default();
    let mut sink: Option<File> = None;
    let mut game_index = 1usize;

    while reader.read_game(&mut builder)?.is_some() {
        let Some(game) = builder.take_game() else {
            continue;
        };
        summary.games += 1;

        if let Some(err) = game.parse_error.as_deref() {
            log::warn(format!(
                "skipping game {game_index} in '{}': {err}",
                input.display()
            ));
            summary.skipped += 1;
        } else {
            write_game_fragments(&game, temp, &mut sink, &mut summary)?;
        }
        game_index += 1;
    }

    Ok(summary)
}

/// Walks the main line only; sentinels inside variations are never honored.
/// Only nodes with at least one child can start a fragment.
fn write_game_fragments(
    game: &Game,
    temp: &Path,
    sink: &mut Option<File>,
    summary: &mut ExtractionSummary,
) -> Result<(), Error> {
    let mut node = Game::ROOT;
    while let Some(next) = game.main_continuation(node) {
        if game.node(node).comment == SENTINEL
            && let Some(fen) = game.node(node).fen.as_deref()
        {
            let mut buf = String::new();
            serializer::render_fragment(game, node, fen, &mut buf);

            if sink.is_none() {
                *sink = Some(OpenOptions::new().append(true).create(true).open(temp)?);
            }
            if let Some(file) = sink.as_mut() {
                file.write_all(buf.as_bytes())?;
            }
            summary.fragments += 1;
        }
        node = next;
    }
    Ok(())
}
