// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boolean operation dispatch

use super::{csg, Mesh, MeshError, MeshResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanOp {
    Union,
    Difference,
    Intersection,
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Union => "union",
            Self::Difference => "difference",
            Self::Intersection => "intersection",
        })
    }
}

impl FromStr for BooleanOp {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "union" => Ok(Self::Union),
            "difference" | "subtract" => Ok(Self::Difference),
            "intersection" | "intersect" => Ok(Self::Intersection),
            other => Err(MeshError::Unsupported(format!("unknown boolean operation '{other}'"))),
        }
    }
}

/// Perform boolean operation between two meshes
pub fn perform_boolean_operation(mesh_a: &Mesh, mesh_b: &Mesh, op: BooleanOp) -> MeshResult<Mesh> {
    tracing::debug!(%op, faces_a = mesh_a.face_count(), faces_b = mesh_b.face_count(), "boolean operation");
    match op {
        BooleanOp::Union => csg::union(mesh_a, mesh_b),
        BooleanOp::Difference => csg::subtract(mesh_a, mesh_b),
        BooleanOp::Intersection => csg::intersect(mesh_a, mesh_b),
    }
}

impl Mesh {
    /// Combine this mesh with `other`; the result takes this mesh's configuration
    pub fn boolean_operation(&self, other: &Mesh, op: BooleanOp) -> MeshResult<Mesh> {
        perform_boolean_operation(self, other, op)
    }
}
