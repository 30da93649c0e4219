//! The grammar tree: keyword-indexed dispatch of directive tokens onto
//! typed leaf values.
//!
//! Interior branches own their children and route one token at a time.
//! Resolution order is fixed: an explicit keyword match wins, and only
//! when it fails is each child's fallback pattern tried against the
//! current token (skipping over a leading LOCAL/GLOBAL qualifier). A
//! fallback child parses from the matched token itself, which is how
//! keyword-less value directives like `CALLOUT VERTICAL` reach their
//! leaf.

use std::collections::HashMap;

use crate::error::ParseError;
use crate::parser::types::{ActionCode, KeywordTable, SourceLocation};
use crate::parser::values::Leaf;

/// Scope state of one tree node.
///
/// `pushed` is set while a LOCAL override is active and must be cleared
/// by `pop()` at the end of the scope; `global` marks values that persist
/// past it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeFlags {
    pub pushed: bool,
    pub global: bool,
}

/// Structural fallback test applied to a single token. Evaluated without
/// a regex engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Any keyword from a fixed alternation.
    AnyOf(&'static [&'static str]),
    /// A single uppercase letter, the buffer-name shape.
    Letter,
}

impl Pattern {
    pub fn matches(&self, token: &str) -> bool {
        match self {
            Pattern::AnyOf(options) => options.contains(&token),
            Pattern::Letter => {
                token.len() == 1 && token.chars().all(|c| c.is_ascii_uppercase())
            }
        }
    }
}

/// A terminal node: one typed value reachable at the end of a keyword
/// path.
#[derive(Debug)]
pub struct LeafNode {
    pub keyword: &'static str,
    pub preamble: String,
    pub scope: ScopeFlags,
    pub leaf: Leaf,
}

impl LeafNode {
    fn new(keyword: &'static str, leaf: Leaf) -> Self {
        Self {
            keyword,
            preamble: String::new(),
            scope: ScopeFlags::default(),
            leaf,
        }
    }

    fn parse(
        &mut self,
        args: &[String],
        index: usize,
        here: &SourceLocation,
        table: &KeywordTable,
    ) -> Result<ActionCode, ParseError> {
        self.leaf.parse(args, index, here, self.scope.pushed, table)
    }

    /// Re-emit this leaf as `KEYWORD [LOCAL|GLOBAL] <value>`.
    pub fn format(&self, local: bool, global: bool) -> String {
        let qualifier = if local {
            "LOCAL "
        } else if global {
            "GLOBAL "
        } else {
            ""
        };
        format!("{} {}{}", self.keyword, qualifier, self.leaf.format_value())
            .trim_end()
            .to_string()
    }

    /// Re-emit the full directive line for write-back, preamble included.
    pub fn format_line(&self, local: bool, global: bool) -> String {
        let qualifier = if local {
            "LOCAL "
        } else if global {
            "GLOBAL "
        } else {
            ""
        };
        format!("{}{}{}", self.preamble, qualifier, self.leaf.format_value())
            .trim_end()
            .to_string()
    }

    fn pop(&mut self) {
        self.scope = ScopeFlags::default();
        self.leaf.pop();
    }

    fn doc(&self, out: &mut Vec<String>, preamble: &str) {
        for line in self.leaf.doc() {
            out.push(format!("{} {}", preamble, line).trim_end().to_string());
        }
    }
}

/// One child slot of a branch: the dispatch keyword, an optional fallback
/// pattern, and the owned subtree.
#[derive(Debug)]
struct Entry {
    key: &'static str,
    pattern: Option<Pattern>,
    node: Node,
}

/// An interior node of the grammar tree.
#[derive(Debug)]
pub struct Branch {
    pub scope: ScopeFlags,
    pub preamble: String,
    /// A lenient branch swallows unknown sub-keywords instead of failing,
    /// so foreign sub-directives of a tolerated family coexist.
    pub lenient: bool,
    entries: Vec<Entry>,
    index: HashMap<&'static str, usize>,
}

impl Branch {
    pub fn new() -> Self {
        Self {
            scope: ScopeFlags::default(),
            preamble: String::new(),
            lenient: false,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn lenient() -> Self {
        let mut branch = Self::new();
        branch.lenient = true;
        branch
    }

    /// Register a child under its dispatch keyword.
    pub fn add(&mut self, key: &'static str, node: Node) {
        self.index.insert(key, self.entries.len());
        self.entries.push(Entry {
            key,
            pattern: None,
            node,
        });
    }

    /// Register a child that is also reachable through a fallback pattern
    /// when no explicit keyword matches.
    pub fn add_with_pattern(&mut self, key: &'static str, pattern: Pattern, node: Node) {
        self.index.insert(key, self.entries.len());
        self.entries.push(Entry {
            key,
            pattern: Some(pattern),
            node,
        });
    }

    /// Register an extra dispatch keyword for an existing child.
    pub fn add_alias(&mut self, alias: &'static str, key: &str) {
        if let Some(&slot) = self.index.get(key) {
            self.index.insert(alias, slot);
        }
    }

    /// Dispatch the tokens starting at `index` into this branch.
    pub fn parse(
        &mut self,
        args: &[String],
        index: usize,
        here: &SourceLocation,
        table: &KeywordTable,
    ) -> Result<ActionCode, ParseError> {
        let size = args.len();
        if index < size {
            if let Some(&slot) = self.index.get(args[index].as_str()) {
                // Explicit keyword match. An immediately following
                // LOCAL/GLOBAL token scopes the matched child.
                let entry = &mut self.entries[slot];
                let mut offset = 1;
                if size - index > 1 {
                    if let qualifier @ ("LOCAL" | "GLOBAL") = args[index + 1].as_str() {
                        // A qualifier with nothing after it scopes no
                        // directive; reject before touching any flags.
                        if index + 2 >= size {
                            return Err(ParseError::ambiguous_scope(here, qualifier));
                        }
                        if qualifier == "LOCAL" {
                            entry.node.scope_mut().pushed = true;
                        } else {
                            entry.node.scope_mut().global = true;
                        }
                        offset += 1;
                    }
                }
                return entry.node.parse(args, index + offset, here, table);
            }

            // No explicit match. Try each child's fallback pattern against
            // the current token, tolerating a leading scope qualifier. The
            // matched token is part of the child's value, so the child
            // parses from it rather than past it.
            let local = args[index] == "LOCAL";
            let global = args[index] == "GLOBAL";
            let offset = usize::from(local || global);
            if index + offset < size {
                let token = args[index + offset].as_str();
                for entry in &mut self.entries {
                    let matched = entry
                        .pattern
                        .map(|pattern| pattern.matches(token))
                        .unwrap_or(false);
                    if matched {
                        let scope = entry.node.scope_mut();
                        scope.pushed = local;
                        scope.global = global;
                        return entry.node.parse(args, index + offset, here, table);
                    }
                }
            } else if offset == 1 {
                return Err(ParseError::ambiguous_scope(here, &args[index]));
            }
        }

        if self.lenient {
            return Ok(ActionCode::Ok);
        }
        Err(ParseError::syntax(here, args))
    }

    /// Probe whether the tokens from `index` on form a prefix of a live
    /// path in the tree. Never mutates state.
    pub fn preamble_match(&self, args: &[String], index: usize) -> bool {
        if index >= args.len() {
            return true;
        }
        match self.index.get(args[index].as_str()) {
            Some(&slot) => self.entries[slot].node.preamble_match(args, index + 1),
            None => false,
        }
    }

    /// Emit one grammar summary per leaf, in sorted key order. Alias
    /// keys do not repeat their subtree.
    pub fn doc(&self, out: &mut Vec<String>, preamble: &str) {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_unstable_by_key(|&slot| self.entries[slot].key);
        for slot in order {
            let entry = &self.entries[slot];
            entry.node.doc(out, &format!("{} {}", preamble, entry.key));
        }
    }

    /// Clear scope flags depth-first across the whole subtree.
    pub fn pop(&mut self) {
        self.scope = ScopeFlags::default();
        for entry in &mut self.entries {
            entry.node.pop();
        }
    }

    pub fn child(&self, key: &str) -> Option<&Node> {
        self.index.get(key).map(|&slot| &self.entries[slot].node)
    }

    pub fn child_mut(&mut self, key: &str) -> Option<&mut Node> {
        let slot = *self.index.get(key)?;
        Some(&mut self.entries[slot].node)
    }

    /// Rebuild every node's preamble after the tree is assembled.
    /// `prefix` is the full path up to and including this branch's own
    /// keyword, with a trailing space.
    pub fn set_preambles(&mut self, prefix: &str) {
        self.preamble = prefix.to_string();
        for entry in &mut self.entries {
            let child_prefix = format!("{}{} ", prefix, entry.key);
            match &mut entry.node {
                Node::Branch(branch) => branch.set_preambles(&child_prefix),
                Node::Leaf(leaf) => leaf.preamble = child_prefix,
            }
        }
    }
}

impl Default for Branch {
    fn default() -> Self {
        Self::new()
    }
}

/// A position in the grammar tree: interior dispatch or terminal typed
/// value.
#[derive(Debug)]
pub enum Node {
    Branch(Branch),
    Leaf(LeafNode),
}

impl Node {
    pub fn branch(branch: Branch) -> Self {
        Node::Branch(branch)
    }

    pub fn leaf(keyword: &'static str, leaf: Leaf) -> Self {
        Node::Leaf(LeafNode::new(keyword, leaf))
    }

    fn scope_mut(&mut self) -> &mut ScopeFlags {
        match self {
            Node::Branch(branch) => &mut branch.scope,
            Node::Leaf(leaf) => &mut leaf.scope,
        }
    }

    pub fn scope(&self) -> ScopeFlags {
        match self {
            Node::Branch(branch) => branch.scope,
            Node::Leaf(leaf) => leaf.scope,
        }
    }

    pub fn parse(
        &mut self,
        args: &[String],
        index: usize,
        here: &SourceLocation,
        table: &KeywordTable,
    ) -> Result<ActionCode, ParseError> {
        match self {
            Node::Branch(branch) => branch.parse(args, index, here, table),
            Node::Leaf(leaf) => leaf.parse(args, index, here, table),
        }
    }

    pub fn preamble_match(&self, args: &[String], index: usize) -> bool {
        match self {
            Node::Branch(branch) => branch.preamble_match(args, index),
            // A leaf accepts any remaining tokens as its value text.
            Node::Leaf(_) => true,
        }
    }

    pub fn doc(&self, out: &mut Vec<String>, preamble: &str) {
        match self {
            Node::Branch(branch) => branch.doc(out, preamble),
            Node::Leaf(leaf) => leaf.doc(out, preamble),
        }
    }

    pub fn pop(&mut self) {
        match self {
            Node::Branch(branch) => branch.pop(),
            Node::Leaf(leaf) => leaf.pop(),
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafNode> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn as_branch(&self) -> Option<&Branch> {
        match self {
            Node::Branch(branch) => Some(branch),
            _ => None,
        }
    }
}
