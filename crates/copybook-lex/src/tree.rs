//! Record-tree construction from classified lines.
//!
//! The builder walks the classified line list with a cursor and a
//! "current root" — the record that new declarations are measured
//! against. Records live in an arena during construction so that the
//! depth maps can point back at ancestors by index; the read-only
//! [`Record`] tree is materialised once every line is consumed.
//!
//! Placement is driven by level numbers. The first time a level is seen
//! under the current root, the new record nests inside it and the level
//! is remembered; the next time that level appears, the new record is a
//! sibling and attaches to the remembered ancestor instead.

use std::collections::HashMap;

use tracing::debug;

use crate::classify::{splice_occurs, splice_redefines, Line, LineKind};
use crate::error::{CopybookError, Result};
use crate::pic;
use crate::record::{PicKind, Record};

/// The level number that denotes the outermost record description. It
/// is folded into the caller-named synthetic root rather than parsed
/// into a group of its own.
const RECORD_DESCRIPTION_INDICATOR: &str = "01";

/// Index of a record in the construction arena.
type NodeId = usize;

/// A record under construction.
#[derive(Debug)]
struct Node {
    name: String,
    kind: PicKind,
    length: usize,
    occurs: usize,
    depth: String,
    children: Vec<NodeId>,
    /// Level label → the ancestor that adopts children at that level.
    depth_map: HashMap<String, NodeId>,
    /// Child name → position in `children`, for REDEFINES lookups.
    child_index: HashMap<String, usize>,
}

impl Node {
    fn group(name: &str, depth: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: PicKind::Group,
            length: 0,
            occurs: 0,
            depth: depth.to_string(),
            children: Vec::new(),
            depth_map: HashMap::new(),
            child_index: HashMap::new(),
        }
    }
}

/// Builds a [`Record`] tree from classified lines.
pub struct Tree {
    lines: Vec<Line>,
    pos: usize,
    arena: Vec<Node>,
    seen_record_description: bool,
}

impl Tree {
    /// Create a builder over classified lines.
    pub fn new(lines: Vec<Line>) -> Self {
        Self {
            lines,
            pos: 0,
            arena: Vec::new(),
            seen_record_description: false,
        }
    }

    /// Consume every line and return the finished tree, rooted at a
    /// synthetic group carrying the caller's `name`.
    pub fn build(mut self, name: &str) -> Result<Record> {
        let root = self.push(Node::group(name, ""));
        let mut current = root;

        while self.pos < self.lines.len() {
            let line = self.lines[self.pos].clone();
            self.pos += 1;

            match line.kind {
                LineKind::StructNum => current = self.parse_struct(&line, current, 4, 2)?,
                LineKind::StructNonNum => current = self.parse_struct(&line, current, 3, 1)?,
                LineKind::Pic => {
                    let id = self.leaf(&line, None)?;
                    current = self.delve(current, id);
                }
                LineKind::Occurs => {
                    let id = self.leaf(&line, Some(10))?;
                    current = self.delve(current, id);
                }
                LineKind::Redefines => self.redefine_leaf(&line, current)?,
                LineKind::GroupRedefines => current = self.redefine_group(&line, current)?,
                LineKind::MultiRedefines => {
                    let second =
                        self.continuation(&line, LineKind::RedefinesPart, "REDEFINES")?;
                    let spliced = splice_redefines(&line, &second);
                    self.redefine_leaf(&spliced, current)?;
                }
                LineKind::MultiOccurs => {
                    let second = self.continuation(&line, LineKind::OccursPart, "OCCURS")?;
                    let spliced = splice_occurs(&line, &second);
                    let id = self.leaf(&spliced, Some(10))?;
                    current = self.delve(current, id);
                }
                LineKind::RedefinesPart | LineKind::OccursPart | LineKind::Unknown => {
                    debug!(line = line.number(), "skipping line");
                }
            }
        }

        Ok(self.materialise(root))
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.arena.push(node);
        self.arena.len() - 1
    }

    /// Fetch and consume the continuation line of a two-line definition.
    fn continuation(
        &mut self,
        first: &Line,
        expect: LineKind,
        kind: &'static str,
    ) -> Result<Line> {
        let second = self.lines.get(self.pos).cloned();
        match second {
            Some(line) if line.kind == expect => {
                self.pos += 1;
                Ok(line)
            }
            _ => Err(CopybookError::BadContinuation {
                kind,
                line: first.number(),
            }),
        }
    }

    /// Handle a group declaration line. The outermost `01` is absorbed
    /// into the synthetic root; any other level opens a new group.
    fn parse_struct(
        &mut self,
        line: &Line,
        current: NodeId,
        name_idx: usize,
        group_idx: usize,
    ) -> Result<NodeId> {
        let level = &line.tokens[group_idx].text;
        if level == RECORD_DESCRIPTION_INDICATOR {
            if self.seen_record_description {
                return Err(CopybookError::MultipleRecordDescriptions);
            }
            self.seen_record_description = true;
            return Ok(current);
        }

        let node = Node::group(&line.tokens[name_idx].text, level);
        let id = self.push(node);
        Ok(self.delve(current, id))
    }

    /// Build a leaf record from a PIC (and optionally OCCURS) line.
    fn leaf(&mut self, line: &Line, count_idx: Option<usize>) -> Result<NodeId> {
        let clause = pic::clause(&line.tokens[6].text).to_string();
        let length = pic::parse_length(&clause)?;
        let kind = pic::parse_kind(&clause);
        let occurs = match count_idx {
            Some(i) => pic::parse_occurs_count(&line.tokens[i].text)?,
            None => 0,
        };

        Ok(self.push(Node {
            name: line.tokens[4].text.clone(),
            kind,
            length,
            occurs,
            depth: line.tokens[2].text.clone(),
            children: Vec::new(),
            depth_map: HashMap::new(),
            child_index: HashMap::new(),
        }))
    }

    /// Place a new record relative to the current root and return the
    /// root for the next line.
    ///
    /// A level seen before routes the record to the remembered ancestor;
    /// a new level nests the record under the current root and remembers
    /// the level. A placed group becomes the next root so following
    /// lines parse into it; a placed leaf hands the root role to its
    /// parent, which also keeps it the lookup scope for a REDEFINES of
    /// the field just placed.
    fn delve(&mut self, current: NodeId, new_id: NodeId) -> NodeId {
        let depth = self.arena[new_id].depth.clone();
        match self.arena[current].depth_map.get(&depth).copied() {
            Some(ancestor) => {
                self.arena[new_id].depth_map = self.arena[ancestor].depth_map.clone();
                self.attach(ancestor, new_id);
                if self.arena[new_id].kind == PicKind::Group {
                    new_id
                } else {
                    ancestor
                }
            }
            None => {
                self.arena[current].depth_map.insert(depth, current);
                self.arena[new_id].depth_map = self.arena[current].depth_map.clone();
                self.attach(current, new_id);
                if self.arena[new_id].kind == PicKind::Group {
                    new_id
                } else {
                    current
                }
            }
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        let name = self.arena[child].name.clone();
        let idx = self.arena[parent].children.len();
        self.arena[parent].children.push(child);
        self.arena[parent].child_index.insert(name, idx);
    }

    /// Replace a sibling with a PIC field under a new name, in place.
    /// The slot keeps its position in the parent's child list; only the
    /// index-cache key moves.
    fn redefine_leaf(&mut self, line: &Line, current: NodeId) -> Result<()> {
        let target = line.tokens[8].text.trim_end_matches('.').to_string();
        let clause = pic::clause(&line.tokens[10].text).to_string();
        let length = pic::parse_length(&clause)?;
        let kind = pic::parse_kind(&clause);
        let name = line.tokens[4].text.clone();

        let slot = *self
            .arena[current]
            .child_index
            .get(&target)
            .ok_or_else(|| CopybookError::RedefinesTargetMissing {
                target: target.clone(),
            })?;
        let dst = self.arena[current].children[slot];

        let node = &mut self.arena[dst];
        node.name = name.clone();
        node.length = length;
        node.kind = kind;
        node.depth_map.clear();
        node.children.clear();
        node.child_index.clear();

        self.arena[current].child_index.remove(&target);
        self.arena[current].child_index.insert(name, slot);
        Ok(())
    }

    /// Replace a sibling with a new group; following lines parse into
    /// the replacement.
    fn redefine_group(&mut self, line: &Line, current: NodeId) -> Result<NodeId> {
        let target = line.tokens[8].text.trim_end_matches('.').to_string();
        let name = line.tokens[4].text.clone();
        let level = line.tokens[2].text.clone();

        let slot = *self
            .arena[current]
            .child_index
            .get(&target)
            .ok_or_else(|| CopybookError::RedefinesTargetMissing {
                target: target.clone(),
            })?;
        let dst = self.arena[current].children[slot];

        // REDEFINES binds to the most recently declared group at the
        // target's level. A target without a depth map borrows the one
        // from that level's parent; delve populates the map on every
        // record it places, so this branch cannot fire under the
        // current builder.
        let mut root = current;
        if self.arena[dst].depth_map.is_empty() {
            let target_depth = self.arena[dst].depth.clone();
            if let Some(&peer_parent) = self.arena[root].depth_map.get(&target_depth) {
                self.arena[dst].depth_map = self.arena[peer_parent].depth_map.clone();
                root = peer_parent;
            }
        }

        let slot = *self
            .arena[root]
            .child_index
            .get(&target)
            .ok_or_else(|| CopybookError::RedefinesTargetMissing {
                target: target.clone(),
            })?;
        let dst = self.arena[root].children[slot];

        let mut node = Node::group(&name, &level);
        node.depth_map = self.arena[dst].depth_map.clone();
        let new_id = self.push(node);

        self.arena[root].children[slot] = new_id;
        self.arena[root].child_index.remove(&target);
        self.arena[root].child_index.insert(name, slot);
        Ok(new_id)
    }

    /// Extract the read-only tree. Group lengths are the sums of their
    /// children's effective lengths, so a REDEFINES replacement is
    /// reflected in every ancestor.
    fn materialise(&self, id: NodeId) -> Record {
        let node = &self.arena[id];
        let children: Vec<Record> = node
            .children
            .iter()
            .map(|&child| self.materialise(child))
            .collect();
        let length = if node.kind == PicKind::Group {
            children.iter().map(Record::effective_length).sum()
        } else {
            node.length
        };
        Record {
            name: node.name.clone(),
            kind: node.kind,
            length,
            occurs: node.occurs,
            depth: node.depth.clone(),
            children,
        }
    }
}
