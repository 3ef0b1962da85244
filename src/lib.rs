// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe mesh topology engine
//!
//! An editable polygon mesh stored as a vertex/edge/face graph with reversible
//! local edits (face and edge split/unsplit, vertex and edge merging), a
//! consistency validator, and CSG booleans built on BSP clipping.

pub mod config;
pub mod geometry;
pub mod io;

pub use config::MeshConfig;
pub use geometry::{
    BooleanOp, CreateOption, EdgeId, FaceEdgeId, FaceId, Mesh, MeshError, MeshResult, Primitive,
    VertexId,
};
pub use io::{load, save, OutputSettings, StlFormat};

use anyhow::{Context, Result};
use std::path::Path;

/// Load two STL files and combine them
pub fn boolean_files<P: AsRef<Path>, Q: AsRef<Path>>(
    a: P,
    b: Q,
    op: BooleanOp,
    config: MeshConfig,
) -> Result<Mesh> {
    let mesh_a = io::load_with_config(a.as_ref(), config)?;
    let mesh_b = io::load_with_config(b.as_ref(), config)?;
    mesh_a
        .boolean_operation(&mesh_b, op)
        .with_context(|| format!("{op} of {} and {}", a.as_ref().display(), b.as_ref().display()))
}
