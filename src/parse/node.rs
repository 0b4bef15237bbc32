use chrono::{Duration, NaiveDateTime};

/// A single node in the parsed outline tree.
///
/// The root is a synthetic level-0 node; its children are the day nodes from the log, and their
/// children are the clocked item nodes. Nodes are read-only after the load.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct OutlineNode {
    /// The heading text, with any trailing tag group removed. Empty for the root.
    pub heading: String,
    /// The level of this node (0 for the root), i.e. the number of `*`s at the start of the
    /// heading line.
    pub level: u8,
    /// The tags on this node, in source order. There may be duplicates if the source repeats them.
    pub tags: Vec<String>,
    /// The clock entries recorded in this node's body, in source order. Entries may still be
    /// running (no end timestamp).
    pub clocks: Vec<ClockEntry>,
    /// The direct children of this node.
    pub children: Vec<OutlineNode>,
}
impl OutlineNode {
    /// Creates the synthetic root node of an outline tree.
    pub fn root() -> Self {
        Self {
            heading: String::new(),
            level: 0,
            tags: Vec::new(),
            clocks: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Iterates over the item nodes of this tree: the children of the root's children (depth 1 =
    /// day, depth 2 = clocked item).
    pub fn items(&self) -> impl Iterator<Item = &OutlineNode> {
        self.children.iter().flat_map(|day| day.children.iter())
    }
}

/// A clock entry on an item node, recording when work on the item started and, unless the clock is
/// still running, when it ended.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ClockEntry {
    /// When the clock was started. Minute resolution.
    pub start: NaiveDateTime,
    /// When the clock was stopped, if it has been.
    pub end: Option<NaiveDateTime>,
}
impl ClockEntry {
    /// The elapsed time of this entry, if it has finished.
    pub fn duration(&self) -> Option<Duration> {
        self.end.map(|end| end - self.start)
    }
}
