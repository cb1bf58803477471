use crate::tree::{Game, NodeId, SENTINEL};

use std::fmt::Write;

/// Variation nesting levels rendered below the main line. Deeper variations
/// are dropped silently without unbalancing their ancestors' parentheses.
pub const MAX_VARIATION_DEPTH: usize = 3;

/// Renders one fragment into `buf`: passthrough headers, synthesized
/// `SetUp`/`FEN` for the restarted position, the movetext reachable from
/// `start`, and the terminal result token.
///
/// `start_fen` is the position at `start` itself; the fragment's moves are
/// `start`'s descendants. The caller appends the buffer to the shared temp
/// file in one write.
pub fn render_fragment(game: &Game, start: NodeId, start_fen: &str, buf: &mut String) {
    for (key, value) in &game.headers {
        if key == "SetUp" || key == "FEN" {
            continue;
        }
        let _ = writeln!(buf, "[{key} \"{value}\"]");
    }

    let _ = writeln!(buf, "[SetUp \"1\"]");
    let _ = writeln!(buf, "[FEN \"{}\"]", restart_fen(start_fen));
    buf.push('\n');

    write_moves(game, start, 0, buf);

    let _ = write!(buf, " {}\n\n", game.result);
}

/// Rewrites the halfmove clock and fullmove number to `0 1`, keeping the
/// board, side to move, castling and en passant fields unchanged. The
/// fragment restarts numbering at move one.
pub fn restart_fen(fen: &str) -> String {
    let mut fields: Vec<&str> = fen.split_whitespace().collect();
    fields.truncate(4);
    let mut restarted = fields.join(" ");
    restarted.push_str(" 0 1");
    restarted
}

/// Emits the line starting at `node`'s main continuation, recursing one
/// nesting level deeper for each alternative line encountered.
///
/// Formatting mirrors the established fragment layout byte for byte:
/// - main line (depth 0): `"san "`, or `"san {comment} "` for a non-empty,
///   non-sentinel comment;
/// - inside a variation: `"san "`, or `"san {comment}"` with no trailing
///   space;
/// - variation open: `"("` (prefixed comment as `"({starting_comment}"`),
///   first move as `"san "`, and, when that move is a leaf, its own comment
///   immediately as `"{comment}"` since it is never visited again;
/// - variation close: `") "`.
///
/// A variation whose first move carries a comment but which continues past
/// it loses that comment, matching the original layout.
fn write_moves(game: &Game, node: NodeId, depth: usize, buf: &mut String) {
    let mut node = node;
    while let Some(next) = game.main_continuation(node) {
        let played = game.node(next);
        let san = played.san.as_deref().unwrap_or_default();

        if depth == 0 {
            if !played.comment.is_empty() && played.comment != SENTINEL {
                let _ = write!(buf, "{san} {{{}}} ", played.comment);
            } else {
                let _ = write!(buf, "{san} ");
            }
        } else if !played.comment.is_empty() {
            let _ = write!(buf, "{san} {{{}}}", played.comment);
        } else {
            let _ = write!(buf, "{san} ");
        }

        if depth < MAX_VARIATION_DEPTH {
            for &alt in &game.children(node)[1..] {
                let first = game.node(alt);
                if first.starting_comment.is_empty() {
                    buf.push('(');
                } else {
                    let _ = write!(buf, "({{{}}}", first.starting_comment);
                }
                let _ = write!(buf, "{} ", first.san.as_deref().unwrap_or_default());

                if game.children(alt).is_empty() && !first.comment.is_empty() {
                    let _ = write!(buf, "{{{}}}", first.comment);
                }

                write_moves(game, alt, depth + 1, buf);
                buf.push_str(") ");
            }
        }

        node = next;
    }
}
