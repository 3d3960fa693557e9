use std::sync::Arc;

use thiserror::Error;

use crate::model::{CallForest, CallTree, CallTreeNode, NodeId};

/// Leading spaces per level of call depth in a JMC call-tree export.
pub const INDENT_SPACES: usize = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JmcParseError {
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("line {line}: expected `<signature>\\t<samples>`")]
    MalformedLine { line: usize },
    #[error("line {line}: sample count {value:?} is not a number")]
    MalformedSampleCount { line: usize, value: String },
    #[error("line {line}: depth {depth} has no parent (only {available} open frames)")]
    StackUnderflow {
        line: usize,
        depth: usize,
        available: usize,
    },
}

/// One decoded line of a JMC call-tree report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JmcLine<'a> {
    pub depth: usize,
    pub signature: &'a str,
    pub samples: u64,
}

impl<'a> JmcLine<'a> {
    /// Decode `<indent><signature>\t<samples>[\t...]`.
    ///
    /// `line` is the 1-based line number used in error messages.
    pub fn decode(raw: &'a str, line: usize) -> Result<Self, JmcParseError> {
        let mut fields = raw.split('\t');
        let (Some(frame), Some(count)) = (fields.next(), fields.next()) else {
            return Err(JmcParseError::MalformedLine { line });
        };

        let signature = frame.trim_start_matches(' ');
        let indentation = frame.len() - signature.len();

        let digits: String = count.trim().chars().filter(|&c| c != ',').collect();
        let samples = digits
            .parse::<u64>()
            .map_err(|_| JmcParseError::MalformedSampleCount {
                line,
                value: count.trim().to_string(),
            })?;

        Ok(Self {
            depth: indentation / INDENT_SPACES,
            signature,
            samples,
        })
    }
}

/// Rebuilds a call forest from decoded lines in report order.
///
/// Holds the ids of the currently open frames; a line at depth `d` closes
/// everything deeper than `d` and becomes a child of the frame left on top.
#[derive(Debug)]
pub struct ForestBuilder {
    name: String,
    tree: CallTree,
    roots: Vec<NodeId>,
    stack: Vec<NodeId>,
}

impl ForestBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tree: CallTree::new(),
            roots: Vec::new(),
            stack: Vec::new(),
        }
    }

    pub fn push(&mut self, decoded: &JmcLine<'_>, line: usize) -> Result<NodeId, JmcParseError> {
        let depth = decoded.depth;
        if depth > self.stack.len() {
            return Err(JmcParseError::StackUnderflow {
                line,
                depth,
                available: self.stack.len(),
            });
        }
        self.stack.truncate(depth);

        let id = self.tree.push(CallTreeNode {
            signature: decoded.signature.into(),
            samples: decoded.samples,
            depth: u32::try_from(depth).unwrap_or(u32::MAX),
            line,
            children: Vec::new(),
        });

        match self.stack.last() {
            None => self.roots.push(id),
            Some(&parent) => self.tree.add_child(parent, id),
        }
        self.stack.push(id);
        Ok(id)
    }

    pub fn finish(self) -> CallForest {
        CallForest::new(self.name, Arc::new(self.tree), self.roots)
    }
}

/// Parse a JMC call-tree report (tab-separated, 3-space indented).
///
/// Blank lines are skipped. Any malformed line aborts the whole parse.
pub fn parse_jmc(data: &[u8], name: &str) -> Result<CallForest, JmcParseError> {
    let text = std::str::from_utf8(data)?;
    let mut builder = ForestBuilder::new(name);

    for (index, raw) in text.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let line = index + 1;
        let decoded = JmcLine::decode(raw, line)?;
        builder.push(&decoded, line)?;
    }

    let forest = builder.finish();
    tracing::debug!(
        report = name,
        nodes = forest.tree().len(),
        roots = forest.roots().len(),
        samples = forest.total_samples(),
        "parsed JMC call tree"
    );
    Ok(forest)
}
