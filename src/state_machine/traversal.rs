//! Menu traversal
//!
//! Resolves the node a reply leads to, given the stored path of 1-based
//! option indices. Pure: the same tree, path and input always produce the
//! same result.

use super::state::TraversalPhase;
use crate::layer::LayerNode;
use thiserror::Error;

/// Command tokens that bypass option parsing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationCommands {
    /// Go back one level
    pub previous: Option<String>,
    /// Truncate the path to `reset_prefix_len` and leave any form
    pub reset: Option<String>,
    /// Hand over straight from the root menu
    pub direct_to_agent: Option<String>,
    pub reset_prefix_len: usize,
}

fn is_command(command: Option<&str>, input: &str) -> bool {
    command.is_some_and(|c| !c.is_empty() && c == input.trim())
}

impl NavigationCommands {
    pub fn is_previous(&self, input: &str) -> bool {
        is_command(self.previous.as_deref(), input)
    }

    pub fn is_reset(&self, input: &str) -> bool {
        is_command(self.reset.as_deref(), input)
    }

    pub fn is_direct_to_agent(&self, input: &str) -> bool {
        is_command(self.direct_to_agent.as_deref(), input)
    }

    /// Path after a reset command
    pub fn reset_path(&self, path: &[usize]) -> Vec<usize> {
        path.iter().take(self.reset_prefix_len).copied().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraversalError {
    /// Reply is not a valid option; `prompt` is the menu to show again
    #[error("Invalid selection {input:?}")]
    InvalidSelection { input: String, prompt: String },
    /// The stored path points past the end of the tree, usually after a
    /// new tree was uploaded
    #[error("Path {path:?} does not exist in the layer tree (failed at depth {depth})")]
    StalePath { path: Vec<usize>, depth: usize },
}

/// Outcome of a successful traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub node: &'a LayerNode,
    /// Path to store for the next turn
    pub path: Vec<usize>,
}

impl Resolution<'_> {
    pub fn phase(&self) -> TraversalPhase {
        if self.path.is_empty() {
            TraversalPhase::Root
        } else if self.node.is_terminal() {
            TraversalPhase::Terminal
        } else {
            TraversalPhase::Menu
        }
    }
}

/// Walk `path` from `root`, bounds-checked at every level
pub fn descend<'a>(root: &'a LayerNode, path: &[usize]) -> Result<&'a LayerNode, TraversalError> {
    path.iter()
        .enumerate()
        .try_fold(root, |node, (depth, &index)| {
            node.child(index).ok_or_else(|| TraversalError::StalePath {
                path: path.to_vec(),
                depth,
            })
        })
}

/// Parse a 1-based option number
pub(crate) fn parse_index(input: &str) -> Option<usize> {
    input.trim().parse::<usize>().ok().filter(|&i| i > 0)
}

/// Resolve the node `input` leads to from `path`.
///
/// Terminal nodes (handover, resolve, form) return themselves without
/// consuming the input; free-input nodes accept any text and continue with
/// their first option.
pub fn resolve_next<'a>(
    root: &'a LayerNode,
    path: &[usize],
    input: &str,
    commands: &NavigationCommands,
) -> Result<Resolution<'a>, TraversalError> {
    if commands.is_previous(input) {
        let shorter = path.split_last().map_or(&[][..], |(_, rest)| rest);
        return Ok(Resolution {
            node: descend(root, shorter)?,
            path: shorter.to_vec(),
        });
    }

    let current = descend(root, path)?;
    if !path.is_empty() && current.is_terminal() {
        return Ok(Resolution {
            node: current,
            path: path.to_vec(),
        });
    }

    let index = if current.input {
        1
    } else {
        parse_index(input).ok_or_else(|| invalid(current, input))?
    };

    let node = current.child(index).ok_or_else(|| invalid(current, input))?;
    let mut next_path = path.to_vec();
    next_path.push(index);

    Ok(Resolution {
        node,
        path: next_path,
    })
}

fn invalid(current: &LayerNode, input: &str) -> TraversalError {
    TraversalError::InvalidSelection {
        input: input.to_string(),
        prompt: current.message.clone(),
    }
}
