/// Comment text that marks "a fragment starts at this position".
///
/// Matching is exact string equality after the parser's whitespace trim;
/// `"[# ]"` or `"[#] deep"` never match.
pub const SENTINEL: &str = "[#]";

/// Handle into a [`Game`]'s node arena.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NodeId(usize);

/// One node of the move tree.
///
/// `children[0]`, if present, is the unique main continuation; indices >= 1
/// are alternative lines in document order. `fen` is only populated for
/// nodes on the game's main line (the only places a fragment can start).
#[derive(Debug, Default)]
pub struct GameNode {
    /// SAN token of the move that produced this node; `None` for the root.
    pub san: Option<String>,
    /// Comment following the move, whitespace-trimmed. Empty when absent.
    pub comment: String,
    /// Comment preceding the first move of a variation. Empty when absent
    /// or when the node does not begin a variation.
    pub starting_comment: String,
    /// FEN of the position after this node's move (main line only).
    pub fen: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// One parsed game: insertion-ordered headers, terminal result, and an
/// arena-backed move tree rooted at [`Game::ROOT`].
#[derive(Debug)]
pub struct Game {
    pub headers: Vec<(String, String)>,
    pub result: String,
    /// Accumulated per-game diagnostics; a game carrying one is skipped by
    /// the extraction driver rather than failing the run.
    pub parse_error: Option<String>,
    nodes: Vec<GameNode>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub const ROOT: NodeId = NodeId(0);

    pub fn new() -> Self {
        Self {
            headers: Vec::new(),
            result: String::new(),
            parse_error: None,
            nodes: vec![GameNode::default()],
        }
    }

    pub fn node(&self, id: NodeId) -> &GameNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut GameNode {
        &mut self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// `children[0]`, the main continuation at this node.
    pub fn main_continuation(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].children.first().copied()
    }

    /// Appends a new child (later siblings are alternative lines).
    pub fn add_child(&mut self, parent: NodeId, san: String) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(GameNode {
            san: Some(san),
            parent: Some(parent),
            ..GameNode::default()
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Records a header tag. A repeated tag updates the existing entry in
    /// place, keeping its original position.
    pub fn set_header(&mut self, key: &str, value: String) {
        if let Some(entry) = self.headers.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value;
        } else {
            self.headers.push((key.to_string(), value));
        }
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn push_parse_error(&mut self, msg: &str) {
        match &mut self.parse_error {
            Some(existing) => {
                existing.push_str("; ");
                existing.push_str(msg);
            }
            None => self.parse_error = Some(msg.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game_has_bare_root() {
        let game = Game::new();
        assert!(game.node(Game::ROOT).san.is_none());
        assert!(game.children(Game::ROOT).is_empty());
        assert!(game.main_continuation(Game::ROOT).is_none());
    }

    #[test]
    fn test_add_child_preserves_sibling_order() {
        let mut game = Game::new();
        let main = game.add_child(Game::ROOT, "e4".to_string());
        let alt = game.add_child(Game::ROOT, "d4".to_string());

        assert_eq!(game.children(Game::ROOT), &[main, alt]);
        assert_eq!(game.main_continuation(Game::ROOT), Some(main));
        assert_eq!(game.parent(alt), Some(Game::ROOT));
        assert_eq!(game.node(alt).san.as_deref(), Some("d4"));
    }

    #[test]
    fn test_set_header_updates_in_place() {
        let mut game = Game::new();
        game.set_header("Event", "First".to_string());
        game.set_header("Site", "Here".to_string());
        game.set_header("Event", "Second".to_string());

        assert_eq!(game.headers.len(), 2);
        assert_eq!(game.headers[0], ("Event".to_string(), "Second".to_string()));
        assert_eq!(game.header("Site"), Some("Here"));
    }

    #[test]
    fn test_push_parse_error_joins_with_separator() {
        let mut game = Game::new();
        game.push_parse_error("first");
        game.push_parse_error("second");
        assert_eq!(game.parse_error.as_deref(), Some("first; second"));
    }
}
