// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Vertex and edge merging
//!
//! These are the welding steps that turn a soup of independently created faces
//! back into a connected graph. Both whole-mesh passes are idempotent.

use super::mesh::{EdgeRecord, Mesh, VertexRecord};
use super::{EdgeId, MeshError, MeshResult, VertexId};
use ahash::AHashMap;

impl Mesh {
    /// Fold `discard` into `keep`
    ///
    /// Every edge end and face-edge start at `discard` moves to `keep` and the
    /// two edge rings are spliced into one. Vertices joined by an edge cannot be
    /// merged since that edge would collapse into a loop.
    pub fn merge_vertices(&mut self, keep: VertexId, discard: VertexId) -> MeshResult<()> {
        self.check_vertex_merge(keep, discard)?;
        self.commit_vertex_merge(keep, discard);
        self.debug_check("merge_vertices");
        Ok(())
    }

    /// Merge every group of vertices lying within the mesh tolerance
    ///
    /// Vertices are visited in creation order and the first of each group
    /// survives. Returns the number of vertices removed.
    pub fn merge_all_vertices(&mut self) -> usize {
        let tolerance = self.config.tolerance;
        let mut merged = 0;
        for index in 0..self.vertices.len() {
            let keep = VertexId(index);
            if !self.vert(keep).alive {
                continue;
            }
            let position = self.vert(keep).position;
            for discard in self.pool.find_vertices(&position, tolerance) {
                if discard <= keep {
                    continue;
                }
                match self.check_vertex_merge(keep, discard) {
                    Ok(()) => {
                        self.commit_vertex_merge(keep, discard);
                        merged += 1;
                    }
                    Err(err) => {
                        tracing::warn!(%keep, %discard, %err, "skipping coincident vertices");
                    }
                }
            }
        }
        if merged > 0 {
            tracing::debug!(merged, "merged coincident vertices");
            self.debug_check("merge_all_vertices");
        }
        merged
    }

    /// Collapse parallel edges that join the same pair of vertices
    ///
    /// The lowest handle of each group survives and its radial loop absorbs the
    /// face-edges of the others. Returns the number of edges removed.
    pub fn merge_mesh_edges(&mut self) -> usize {
        let mut survivors: AHashMap<(VertexId, VertexId), EdgeId> = AHashMap::new();
        let mut merged = 0;
        for index in 0..self.edges.len() {
            let edge = EdgeId(index);
            if !self.edge(edge).alive {
                continue;
            }
            let [a, b] = self.edge(edge).ends;
            let key = (a.min(b), a.max(b));
            match survivors.get(&key) {
                Some(&keep) => {
                    self.splice_radial(keep, edge);
                    self.unlink_edge_end(edge, 0);
                    self.unlink_edge_end(edge, 1);
                    *self.edge_mut(edge) = EdgeRecord::default();
                    merged += 1;
                }
                None => {
                    survivors.insert(key, edge);
                }
            }
        }
        if merged > 0 {
            tracing::debug!(merged, "merged parallel edges");
            self.debug_check("merge_mesh_edges");
        }
        merged
    }

    fn check_vertex_merge(&self, keep: VertexId, discard: VertexId) -> MeshResult<()> {
        const OP: &str = "merge_vertices";
        self.check_vertex(keep)?;
        self.check_vertex(discard)?;
        if keep == discard {
            return Err(MeshError::precondition(OP, format!("cannot merge {keep} into itself")));
        }
        if !self.find_edges(keep, discard)?.is_empty() {
            return Err(MeshError::precondition(
                OP,
                format!("{keep} and {discard} are joined by an edge"),
            ));
        }
        Ok(())
    }

    fn commit_vertex_merge(&mut self, keep: VertexId, discard: VertexId) {
        let moved = self.ring(discard);
        for &edge in &moved {
            for fe in self.radial(edge) {
                if self.fe(fe).start == discard {
                    self.fe_mut(fe).start = keep;
                }
            }
            let k = self.end_index(edge, discard);
            self.edge_mut(edge).ends[k] = keep;
        }

        if let Some(&first_moved) = moved.first() {
            let first_kept = self.vert(keep).first_edge;
            if first_kept.is_absent() {
                self.vert_mut(keep).first_edge = first_moved;
            } else {
                self.splice_rings(first_kept, first_moved, keep);
            }
        }

        self.pool.remove(discard);
        *self.vert_mut(discard) = VertexRecord::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CreateOption;
    use nalgebra::Point3;

    /// Two triangles sharing the edge (0,0,0)-(1,0,0), built with no sharing at all
    fn unwelded_pair() -> Mesh {
        let mut mesh = Mesh::new();
        let tris = [
            [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
            [Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, -1.0, 0.0)],
        ];
        for tri in tris {
            let vs: Vec<VertexId> = tri
                .iter()
                .map(|&p| mesh.create_vertex(p, CreateOption::CreateNew))
                .collect();
            mesh.create_face(&vs, CreateOption::CreateNew).unwrap();
        }
        mesh
    }

    #[test]
    fn test_merge_all_then_edges_welds_pair() {
        let mut mesh = unwelded_pair();
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.edge_count(), 6);

        assert_eq!(mesh.merge_all_vertices(), 2);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.edge_count(), 6);

        assert_eq!(mesh.merge_mesh_edges(), 1);
        assert_eq!(mesh.edge_count(), 5);
        let shared = mesh.find_edges(VertexId(0), VertexId(1)).unwrap();
        assert_eq!(shared.len(), 1);
        assert_eq!(mesh.edge_face_count(shared[0]).unwrap(), 2);
        mesh.validate().unwrap();
    }

    #[test]
    fn test_merge_passes_are_idempotent() {
        let mut mesh = unwelded_pair();
        mesh.merge_all_vertices();
        mesh.merge_mesh_edges();
        assert_eq!(mesh.merge_all_vertices(), 0);
        assert_eq!(mesh.merge_mesh_edges(), 0);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.edge_count(), 5);
    }

    #[test]
    fn test_first_created_vertex_survives() {
        let mut mesh = unwelded_pair();
        mesh.merge_all_vertices();
        assert!(mesh.is_vertex_alive(VertexId(0)));
        assert!(mesh.is_vertex_alive(VertexId(1)));
        assert!(!mesh.is_vertex_alive(VertexId(3)));
        assert!(!mesh.is_vertex_alive(VertexId(4)));
        assert!(!mesh.contains_vertex(VertexId(3)));
    }

    #[test]
    fn test_merge_vertices_splices_rings() {
        let mut mesh = Mesh::new();
        let a = mesh.create_vertex(Point3::new(0.0, 0.0, 0.0), CreateOption::CreateNew);
        let b = mesh.create_vertex(Point3::new(0.0, 0.0, 0.0), CreateOption::CreateNew);
        let c = mesh.create_vertex(Point3::new(1.0, 0.0, 0.0), CreateOption::CreateNew);
        let d = mesh.create_vertex(Point3::new(0.0, 1.0, 0.0), CreateOption::CreateNew);
        mesh.create_edge(a, c).unwrap();
        mesh.create_edge(b, d).unwrap();
        mesh.create_edge(b, c).unwrap();

        mesh.merge_vertices(a, b).unwrap();
        assert_eq!(mesh.vertex_degree(a).unwrap(), 3);
        assert_eq!(mesh.find_edges(a, c).unwrap().len(), 2);
        assert!(!mesh.is_vertex_alive(b));
        mesh.validate().unwrap();
    }

    #[test]
    fn test_merge_vertices_rejections() {
        let mut mesh = Mesh::new();
        let a = mesh.create_vertex(Point3::new(0.0, 0.0, 0.0), CreateOption::CreateNew);
        let b = mesh.create_vertex(Point3::new(0.0, 0.0, 1e-7), CreateOption::CreateNew);
        mesh.create_edge(a, b).unwrap();

        assert!(mesh.merge_vertices(a, a).is_err());
        assert!(matches!(
            mesh.merge_vertices(a, b),
            Err(MeshError::Precondition { .. })
        ));
        assert_eq!(mesh.merge_all_vertices(), 0);
        assert_eq!(mesh.vertex_count(), 2);
        mesh.validate().unwrap();
    }

    #[test]
    fn test_merge_into_isolated_vertex() {
        let mut mesh = Mesh::new();
        let lone = mesh.create_vertex(Point3::new(0.0, 0.0, 0.0), CreateOption::CreateNew);
        let a = mesh.create_vertex(Point3::new(0.0, 0.0, 0.0), CreateOption::CreateNew);
        let b = mesh.create_vertex(Point3::new(1.0, 0.0, 0.0), CreateOption::CreateNew);
        let edge = mesh.create_edge(a, b).unwrap();

        mesh.merge_vertices(lone, a).unwrap();
        assert_eq!(mesh.edge_vertices(edge).unwrap(), [lone, b]);
        assert_eq!(mesh.vertex_edges(lone).unwrap(), vec![edge]);
        mesh.validate().unwrap();
    }
}
