// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Shared helpers for integration tests

#![allow(dead_code)]

use polyframe_mesh::{FaceId, Mesh, VertexId};
use std::collections::HashMap;

/// Whether `a` is a rotation of `b`
pub fn same_cycle(a: &[VertexId], b: &[VertexId]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    if a.is_empty() {
        return true;
    }
    (0..b.len()).any(|shift| a.iter().enumerate().all(|(i, v)| *v == b[(i + shift) % b.len()]))
}

/// Vertex loop of every live face
pub fn face_loops(mesh: &Mesh) -> HashMap<FaceId, Vec<VertexId>> {
    mesh.faces()
        .map(|f| (f, mesh.face_vertices(f).unwrap()))
        .collect()
}

/// Every edge's radial loop holds exactly the face-edges that name it
pub fn assert_radial_counts(mesh: &Mesh) {
    let mut riding: HashMap<_, usize> = HashMap::new();
    for face in mesh.faces() {
        for fe in mesh.face_edges(face).unwrap() {
            *riding.entry(mesh.face_edge_info(fe).unwrap().edge).or_default() += 1;
        }
    }
    for edge in mesh.edges() {
        let radial = mesh.radial_face_edges(edge).unwrap();
        assert_eq!(radial.len(), mesh.faces_sharing_edge(edge).unwrap().len());
        assert_eq!(radial.len(), riding.get(&edge).copied().unwrap_or(0), "{edge}");
    }
}

pub fn counts(mesh: &Mesh) -> (usize, usize, usize) {
    (mesh.vertex_count(), mesh.edge_count(), mesh.face_count())
}
