// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The link stack: which dependency is being loaded, and how far it got.

use super::error::ModuleError;
use std::fmt;

/// Progress of one dependency through the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Requested, not yet read
    Pending,
    /// Source is being read
    Loading,
    /// Source parsed into a unit
    Parsed,
    /// Unit executed in its own scope
    Executed,
    /// Exports bound into the importer
    Linked,
    /// Export table released
    Released,
    /// Loading stopped with an error
    Failed,
}

impl LoadState {
    /// Returns true if the loader may move from `self` to `next`.
    pub fn can_advance_to(self, next: LoadState) -> bool {
        use LoadState::*;
        match (self, next) {
            (Pending, Loading)
            | (Loading, Parsed)
            | (Parsed, Executed)
            | (Executed, Linked)
            | (Linked, Released) => true,
            (Released | Failed, _) => false,
            (_, Failed) => true,
            _ => false,
        }
    }

    /// Returns true for `Released` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, LoadState::Released | LoadState::Failed)
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One dependency being loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFrame {
    /// Dependency path
    pub path: String,
    /// Loader progress
    pub state: LoadState,
}

/// Frames for the dependencies currently being loaded, outermost first.
#[derive(Debug, Clone)]
pub struct LinkStack {
    frames: Vec<LinkFrame>,
    max_depth: usize,
}

impl LinkStack {
    /// An empty stack that refuses to nest deeper than `max_depth`.
    pub fn new(max_depth: usize) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Number of frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Returns true if no dependency is being loaded.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Returns true if `path` is already being loaded.
    pub fn contains(&self, path: &str) -> bool {
        self.frames.iter().any(|frame| frame.path == path)
    }

    /// The innermost frame.
    pub fn top(&self) -> Option<&LinkFrame> {
        self.frames.last()
    }

    /// Paths from the outermost frame to the innermost.
    pub fn paths(&self) -> Vec<String> {
        self.frames.iter().map(|frame| frame.path.clone()).collect()
    }

    /// Pushes a `Pending` frame for `path`.
    ///
    /// Fails if `path` is already on the stack or the depth limit is reached.
    pub fn push(&mut self, path: &str) -> Result<(), ModuleError> {
        if self.contains(path) {
            let mut chain = self.paths();
            chain.push(path.to_string());
            return Err(ModuleError::CircularImport { chain });
        }
        if self.frames.len() >= self.max_depth {
            return Err(ModuleError::LinkDepthExceeded {
                limit: self.max_depth,
            });
        }
        tracing::debug!(path, depth = self.frames.len() + 1, "link frame pushed");
        self.frames.push(LinkFrame {
            path: path.to_string(),
            state: LoadState::Pending,
        });
        Ok(())
    }

    /// Pops the innermost frame.
    pub fn pop(&mut self) -> Option<LinkFrame> {
        let frame = self.frames.pop();
        if let Some(frame) = &frame {
            tracing::debug!(path = %frame.path, state = %frame.state, "link frame popped");
        }
        frame
    }

    /// Moves the innermost frame to `next`. Illegal transitions are ignored
    /// and reported as `false`.
    pub fn advance(&mut self, next: LoadState) -> bool {
        let Some(frame) = self.frames.last_mut() else {
            return false;
        };
        if !frame.state.can_advance_to(next) {
            tracing::warn!(path = %frame.path, from = %frame.state, to = %next, "illegal load state transition");
            return false;
        }
        tracing::debug!(path = %frame.path, from = %frame.state, to = %next, "load state");
        frame.state = next;
        true
    }

    /// Runs `f` with a frame for `path` pushed, popping it on every exit path.
    ///
    /// The frame ends `Failed` if `f` returns an error.
    pub fn with_frame<T, C, F>(
        context: &mut C,
        stack: fn(&mut C) -> &mut LinkStack,
        path: &str,
        f: F,
    ) -> Result<T, crate::Error>
    where
        F: FnOnce(&mut C) -> Result<T, crate::Error>,
    {
        stack(context).push(path)?;
        let result = f(context);
        let stack = stack(context);
        if result.is_err() {
            stack.advance(LoadState::Failed);
        }
        stack.pop();
        result
    }
}
