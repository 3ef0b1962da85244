// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Errors raised by the mesh graph and the CSG layer

/// Everything a topology operation can refuse to do
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    /// A handle that is out of range or refers to a retired element
    #[error("{kind} {index} is not a live element of this mesh")]
    StaleHandle { kind: &'static str, index: usize },

    /// A face whose vertex loop cannot form a polygon
    #[error("degenerate face: {0}")]
    DegenerateFace(String),

    /// A structural edit whose preconditions do not hold; nothing was changed
    #[error("{op}: {reason}")]
    Precondition { op: &'static str, reason: String },

    /// Reported by validation when the graph is inconsistent
    #[error("topology invariant violated: {0}")]
    Invariant(String),

    /// Input the operation is not able to handle correctly
    #[error("unsupported input: {0}")]
    Unsupported(String),

    /// Rejected configuration values
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl MeshError {
    pub(crate) fn precondition(op: &'static str, reason: impl Into<String>) -> Self {
        Self::Precondition {
            op,
            reason: reason.into(),
        }
    }
}

pub type MeshResult<T> = std::result::Result<T, MeshError>;
