use crate::tree::{Game, NodeId};

use pgn_reader::{Nag, Outcome, RawComment, RawTag, SanPlus, Skip, Visitor};
use shakmaty::{CastlingMode, Chess, EnPassantMode, Position, fen::Fen};
use std::mem;
use std::ops::ControlFlow;

/// Streaming PGN visitor (pgn-reader) that materializes one [`Game`] tree
/// per record, entering variations instead of skipping them.
///
/// The main-line position is replayed with shakmaty so every main-line node
/// carries its FEN; variation moves are stored as SAN tokens without
/// legality checks (the normalizer validates downstream). Parse problems
/// become per-game diagnostics, never run failures.
pub struct GameTreeBuilder {
    game: Game,
    current: NodeId,
    variation_stack: Vec<NodeId>,
    pending_start_comment: String,
    comment_chunks: String,
    awaiting_variation_move: bool,
    pos: Chess,
    mainline_broken: bool,
    result_marker: Option<String>,
    pub finished: Option<Game>,
}

impl GameTreeBuilder {
    pub fn new() -> Self {
        Self {
            game: Game::new(),
            current: Game::ROOT,
            variation_stack: Vec::new(),
            pending_start_comment: String::new(),
            comment_chunks: String::new(),
            awaiting_variation_move: false,
            pos: Chess::default(),
            mainline_broken: false,
            result_marker: None,
            finished: None,
        }
    }

    pub fn take_game(&mut self) -> Option<Game> {
        self.finished.take()
    }

    fn on_main_line(&self) -> bool {
        self.variation_stack.is_empty()
    }

    fn current_fen(&self) -> String {
        Fen::from_position(&self.pos, EnPassantMode::Legal).to_string()
    }

    fn append_comment(slot: &mut String, text: &str) {
        if !slot.is_empty() {
            slot.push(' ');
        }
        slot.push_str(text);
    }
}

impl Default for GameTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Visitor for GameTreeBuilder {
    type Tags = ();
    type Movetext = ();
    type Output = ();

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        self.game = Game::new();
        self.current = Game::ROOT;
        self.variation_stack.clear();
        self.pending_start_comment.clear();
        self.comment_chunks.clear();
        self.awaiting_variation_move = false;
        self.pos = Chess::default();
        self.mainline_broken = false;
        self.result_marker = None;
        self.finished = None;
        ControlFlow::Continue(())
    }

    fn tag(
        &mut self,
        _: &mut Self::Tags,
        key: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        let key = String::from_utf8_lossy(key).into_owned();
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        self.game.set_header(&key, value);
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, _: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        // Games from a non-standard starting position replay from their FEN tag.
        if self.game.header("SetUp").is_none_or(|v| v != "0")
            && let Some(raw) = self.game.header("FEN")
        {
            let raw = raw.to_string();
            match Fen::from_ascii(raw.as_bytes())
                .map_err(|e| e.to_string())
                .and_then(|fen| {
                    fen.into_position(CastlingMode::Standard)
                        .map_err(|e| e.to_string())
                }) {
                Ok(pos) => self.pos = pos,
                Err(e) => {
                    self.game
                        .push_parse_error(&format!("invalid FEN header '{raw}': {e}"));
                    self.mainline_broken = true;
                }
            }
        }

        if !self.mainline_broken {
            self.game.node_mut(Game::ROOT).fen = Some(self.current_fen());
        }
        ControlFlow::Continue(())
    }

    fn san(&mut self, _: &mut Self::Movetext, san: SanPlus) -> ControlFlow<Self::Output> {
        let node = self.game.add_child(self.current, san.to_string());
        if self.awaiting_variation_move {
            self.game.node_mut(node).starting_comment =
                mem::take(&mut self.pending_start_comment);
            self.awaiting_variation_move = false;
        }

        if self.on_main_line() && !self.mainline_broken {
            match san.san.to_move(&self.pos) {
                Ok(m) => {
                    self.pos.play_unchecked(m);
                    self.game.node_mut(node).fen = Some(self.current_fen());
                }
                Err(e) => {
                    self.game
                        .push_parse_error(&format!("illegal main-line move '{san}': {e}"));
                    self.mainline_broken = true;
                }
            }
        }

        self.current = node;
        ControlFlow::Continue(())
    }

    fn nag(&mut self, _: &mut Self::Movetext, _: Nag) -> ControlFlow<Self::Output> {
        ControlFlow::Continue(())
    }

    // A comment spanning the reader's internal buffer arrives as partial
    // chunks followed by a final `comment` call; chunks must not be trimmed
    // individually or interior whitespace would be lost.
    fn partial_comment(
        &mut self,
        _: &mut Self::Movetext,
        comment: RawComment<'_>,
    ) -> ControlFlow<Self::Output> {
        self.comment_chunks
            .push_str(&String::from_utf8_lossy(comment.as_bytes()));
        ControlFlow::Continue(())
    }

    fn comment(
        &mut self,
        _: &mut Self::Movetext,
        comment: RawComment<'_>,
    ) -> ControlFlow<Self::Output> {
        let mut text = mem::take(&mut self.comment_chunks);
        text.push_str(&String::from_utf8_lossy(comment.as_bytes()));
        let text = text.trim();
        if text.is_empty() {
            return ControlFlow::Continue(());
        }

        if self.awaiting_variation_move {
            Self::append_comment(&mut self.pending_start_comment, text);
        } else {
            Self::append_comment(&mut self.game.node_mut(self.current).comment, text);
        }
        ControlFlow::Continue(())
    }

    fn begin_variation(&mut self, _: &mut Self::Movetext) -> ControlFlow<Self::Output, Skip> {
        // A variation branches as an alternative to the move just played, so
        // new children attach to that move's parent. A variation before any
        // move has nothing to branch from and is skipped.
        match self.game.parent(self.current) {
            Some(parent) => {
                self.variation_stack.push(self.current);
                self.current = parent;
                self.awaiting_variation_move = true;
                ControlFlow::Continue(Skip(false))
            }
            None => ControlFlow::Continue(Skip(true)),
        }
    }

    fn end_variation(&mut self, _: &mut Self::Movetext) -> ControlFlow<Self::Output> {
        if let Some(resume) = self.variation_stack.pop() {
            self.current = resume;
        }
        self.awaiting_variation_move = false;
        self.pending_start_comment.clear();
        ControlFlow::Continue(())
    }

    fn outcome(&mut self, _: &mut Self::Movetext, outcome: Outcome) -> ControlFlow<Self::Output> {
        self.result_marker = Some(outcome.to_string());
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, _: Self::Movetext) -> Self::Output {
        let mut game = mem::take(&mut self.game);
        game.result = match game.header("Result") {
            Some(result) => result.to_string(),
            None => self.result_marker.take().unwrap_or_else(|| "*".to_string()),
        };
        self.finished = Some(game);
        self.current = Game::ROOT;
        self.variation_stack.clear();
    }
}
