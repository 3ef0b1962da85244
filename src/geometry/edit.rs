// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Reversible local edits: face split/unsplit and edge split/unsplit
//!
//! Each edit runs in two phases. `plan_*` reads the mesh, checks every
//! precondition and records the handles it will touch; `commit` applies the
//! plan and cannot fail. A rejected edit therefore never leaves a partially
//! rewired graph behind.

use super::mesh::{EdgeRecord, FaceEdgeRecord, FaceRecord, Mesh, VertexRecord};
use super::{EdgeId, FaceEdgeId, FaceId, MeshError, MeshResult, VertexId};
use nalgebra::Point3;

struct SplitFacePlan {
    face: FaceId,
    a: VertexId,
    b: VertexId,
    /// Face-edge leaving `a`
    from_a: FaceEdgeId,
    /// Face-edge leaving `b`
    from_b: FaceEdgeId,
    /// Whether the face's first face-edge lies on the `a`→`b` side
    first_on_a_side: bool,
}

struct UnsplitFacePlan {
    keep: FaceId,
    merge: FaceId,
    edge: EdgeId,
    /// Face-edges of `keep` and `merge` riding `edge`
    keep_fe: FaceEdgeId,
    merge_fe: FaceEdgeId,
}

struct SplitEdgePlan {
    edge: EdgeId,
    position: Point3<f64>,
}

struct UnsplitEdgePlan {
    edge: EdgeId,
    vertex: VertexId,
    other: EdgeId,
    /// Far end of `other`, which `edge` will reach once `vertex` is gone
    far: VertexId,
}

impl Mesh {
    /// Cut `face` along a new edge between two of its non-adjacent vertices
    ///
    /// Returns the new edge and the newly allocated face. The original face keeps
    /// the half that contains its first face-edge.
    pub fn split_face(&mut self, face: FaceId, a: VertexId, b: VertexId) -> MeshResult<(EdgeId, FaceId)> {
        let plan = self.plan_split_face(face, a, b)?;
        let result = plan.commit(self);
        self.debug_check("split_face");
        Ok(result)
    }

    /// Undo a face split, folding `merge` back into `keep` across `shared_edge`
    pub fn unsplit_face(&mut self, keep: FaceId, merge: FaceId, shared_edge: EdgeId) -> MeshResult<()> {
        let plan = self.plan_unsplit_face(keep, merge, shared_edge)?;
        plan.commit(self);
        self.debug_check("unsplit_face");
        Ok(())
    }

    /// Insert a vertex on `edge` at `point` (default: the midpoint)
    ///
    /// `edge` keeps its first end and now stops at the new vertex; the returned
    /// edge runs from the new vertex to the old second end. Every face riding
    /// `edge` gains one vertex.
    pub fn split_mesh_edge(&mut self, edge: EdgeId, point: Option<Point3<f64>>) -> MeshResult<(VertexId, EdgeId)> {
        let plan = self.plan_split_edge(edge, point)?;
        let result = plan.commit(self);
        self.debug_check("split_mesh_edge");
        Ok(result)
    }

    /// Remove a degree-two `vertex` from `edge`, joining `edge` with the other
    /// edge at that vertex
    pub fn unsplit_mesh_edge(&mut self, edge: EdgeId, vertex: VertexId) -> MeshResult<()> {
        let plan = self.plan_unsplit_edge(edge, vertex)?;
        plan.commit(self);
        self.debug_check("unsplit_mesh_edge");
        Ok(())
    }

    fn plan_split_face(&self, face: FaceId, a: VertexId, b: VertexId) -> MeshResult<SplitFacePlan> {
        const OP: &str = "split_face";
        self.check_face(face)?;
        self.check_vertex(a)?;
        self.check_vertex(b)?;
        if a == b {
            return Err(MeshError::precondition(OP, format!("diagonal ends are both {a}")));
        }

        let face_loop = self.face_loop(face);
        let leaving = |v: VertexId| -> MeshResult<FaceEdgeId> {
            let mut hits = face_loop.iter().copied().filter(|&fe| self.fe(fe).start == v);
            match (hits.next(), hits.next()) {
                (Some(fe), None) => Ok(fe),
                (None, _) => Err(MeshError::precondition(OP, format!("{v} is not on {face}"))),
                (Some(_), Some(_)) => Err(MeshError::precondition(
                    OP,
                    format!("{v} occurs more than once on {face}"),
                )),
            }
        };
        let from_a = leaving(a)?;
        let from_b = leaving(b)?;

        if self.fe(from_a).next == from_b || self.fe(from_b).next == from_a {
            return Err(MeshError::precondition(OP, format!("{a} and {b} are adjacent on {face}")));
        }
        if !self.find_edges(a, b)?.is_empty() {
            return Err(MeshError::precondition(OP, format!("{a} and {b} are already joined by an edge")));
        }

        let first = self.face(face).first;
        let mut first_on_a_side = false;
        let mut current = from_a;
        while current != from_b {
            if current == first {
                first_on_a_side = true;
                break;
            }
            current = self.fe(current).next;
        }

        Ok(SplitFacePlan {
            face,
            a,
            b,
            from_a,
            from_b,
            first_on_a_side,
        })
    }

    fn plan_unsplit_face(&self, keep: FaceId, merge: FaceId, edge: EdgeId) -> MeshResult<UnsplitFacePlan> {
        const OP: &str = "unsplit_face";
        self.check_face(keep)?;
        self.check_face(merge)?;
        self.check_edge(edge)?;
        if keep == merge {
            return Err(MeshError::precondition(OP, format!("cannot merge {keep} with itself")));
        }

        let radial = self.radial(edge);
        if radial.len() != 2 {
            return Err(MeshError::precondition(
                OP,
                format!("{edge} is shared by {} faces, expected 2", radial.len()),
            ));
        }
        let keep_fe = radial.iter().copied().find(|&fe| self.fe(fe).face == keep);
        let merge_fe = radial.iter().copied().find(|&fe| self.fe(fe).face == merge);
        let (Some(keep_fe), Some(merge_fe)) = (keep_fe, merge_fe) else {
            return Err(MeshError::precondition(
                OP,
                format!("{edge} is not shared by {keep} and {merge}"),
            ));
        };
        if self.fe(keep_fe).start == self.fe(merge_fe).start {
            return Err(MeshError::precondition(
                OP,
                format!("{keep} and {merge} traverse {edge} in the same direction"),
            ));
        }
        // Any second shared edge would fold back on itself in the merged loop
        let keep_edges: Vec<EdgeId> = self.face_loop(keep).iter().map(|&fe| self.fe(fe).edge).collect();
        if let Some(extra) = self
            .face_loop(merge)
            .iter()
            .map(|&fe| self.fe(fe).edge)
            .find(|&e| e != edge && keep_edges.contains(&e))
        {
            return Err(MeshError::precondition(
                OP,
                format!("{keep} and {merge} also share {extra}, not only {edge}"),
            ));
        }

        Ok(UnsplitFacePlan {
            keep,
            merge,
            edge,
            keep_fe,
            merge_fe,
        })
    }

    fn plan_split_edge(&self, edge: EdgeId, point: Option<Point3<f64>>) -> MeshResult<SplitEdgePlan> {
        self.check_edge(edge)?;
        let [p, q] = self.edge(edge).ends;
        let position = match point {
            Some(point) => point,
            None => nalgebra::center(&self.vert(p).position, &self.vert(q).position),
        };
        if !(position.x.is_finite() && position.y.is_finite() && position.z.is_finite()) {
            return Err(MeshError::precondition("split_mesh_edge", "split point is not finite"));
        }
        Ok(SplitEdgePlan { edge, position })
    }

    fn plan_unsplit_edge(&self, edge: EdgeId, vertex: VertexId) -> MeshResult<UnsplitEdgePlan> {
        const OP: &str = "unsplit_mesh_edge";
        self.check_edge(edge)?;
        self.check_vertex(vertex)?;
        if !self.edge(edge).ends.contains(&vertex) {
            return Err(MeshError::precondition(OP, format!("{vertex} is not an end of {edge}")));
        }

        let ring = self.ring(vertex);
        if ring.len() != 2 {
            return Err(MeshError::precondition(
                OP,
                format!("{vertex} has {} incident edges, expected 2", ring.len()),
            ));
        }
        let other = if ring[0] == edge { ring[1] } else { ring[0] };
        let near = self.other_end(edge, vertex);
        let far = self.other_end(other, vertex);
        if near == far {
            return Err(MeshError::precondition(
                OP,
                format!("{edge} and {other} both lead to {near}"),
            ));
        }

        let on_edge = self.radial(edge);
        let on_other = self.radial(other);
        if on_edge.len() != on_other.len() {
            return Err(MeshError::precondition(
                OP,
                format!(
                    "{edge} is used by {} faces but {other} by {}",
                    on_edge.len(),
                    on_other.len()
                ),
            ));
        }
        for &fe in &on_edge {
            let rec = self.fe(fe);
            let partner = if rec.start == vertex { rec.prev } else { rec.next };
            if self.fe(partner).edge != other {
                return Err(MeshError::precondition(
                    OP,
                    format!("{} does not continue from {edge} onto {other}", rec.face),
                ));
            }
            if self.face(rec.face).vertex_count <= 3 {
                return Err(MeshError::precondition(
                    OP,
                    format!("{} would collapse below three vertices", rec.face),
                ));
            }
        }

        Ok(UnsplitEdgePlan {
            edge,
            vertex,
            other,
            far,
        })
    }

    #[inline]
    fn other_end(&self, edge: EdgeId, vertex: VertexId) -> VertexId {
        let ends = self.edge(edge).ends;
        if ends[0] == vertex {
            ends[1]
        } else {
            ends[0]
        }
    }
}

impl SplitFacePlan {
    fn commit(self, mesh: &mut Mesh) -> (EdgeId, FaceId) {
        let normal = mesh.face(self.face).normal;
        let new_face = FaceId(mesh.faces.len());
        mesh.faces.push(FaceRecord {
            first: FaceEdgeId::NONE,
            vertex_count: 0,
            normal,
            alive: true,
        });

        let edge = mesh.push_edge(self.a, self.b);
        let before_b = mesh.fe(self.from_b).prev;
        let before_a = mesh.fe(self.from_a).prev;

        // The a-side loop runs a..b and closes with b->a; the b-side runs b..a
        // and closes with a->b.
        let (a_side_face, b_side_face) = if self.first_on_a_side {
            (self.face, new_face)
        } else {
            (new_face, self.face)
        };
        let close_a_side = mesh.push_face_edge(a_side_face, edge, self.b);
        let close_b_side = mesh.push_face_edge(b_side_face, edge, self.a);
        mesh.attach_radial(close_a_side, edge);
        mesh.attach_radial(close_b_side, edge);

        mesh.link_face_loop(before_b, close_a_side);
        mesh.link_face_loop(close_a_side, self.from_a);
        mesh.link_face_loop(before_a, close_b_side);
        mesh.link_face_loop(close_b_side, self.from_b);

        let old_first = mesh.face(self.face).first;
        let (a_first, b_first) = if self.first_on_a_side {
            (old_first, self.from_b)
        } else {
            (self.from_a, old_first)
        };
        mesh.face_mut(a_side_face).first = a_first;
        mesh.face_mut(b_side_face).first = b_first;
        for face in [a_side_face, b_side_face] {
            let face_loop = mesh.face_loop(face);
            for &fe in &face_loop {
                mesh.fe_mut(fe).face = face;
            }
            mesh.face_mut(face).vertex_count = face_loop.len();
        }

        (edge, new_face)
    }
}

impl UnsplitFacePlan {
    fn commit(self, mesh: &mut Mesh) {
        let keep_prev = mesh.fe(self.keep_fe).prev;
        let keep_next = mesh.fe(self.keep_fe).next;
        let merge_prev = mesh.fe(self.merge_fe).prev;
        let merge_next = mesh.fe(self.merge_fe).next;

        for fe in mesh.face_loop(self.merge) {
            mesh.fe_mut(fe).face = self.keep;
        }
        mesh.link_face_loop(keep_prev, merge_next);
        mesh.link_face_loop(merge_prev, keep_next);

        if mesh.face(self.keep).first == self.keep_fe {
            mesh.face_mut(self.keep).first = keep_next;
        }
        let count = mesh.face(self.keep).vertex_count + mesh.face(self.merge).vertex_count - 2;
        mesh.face_mut(self.keep).vertex_count = count;

        for fe in [self.keep_fe, self.merge_fe] {
            mesh.detach_radial(fe);
            *mesh.fe_mut(fe) = FaceEdgeRecord::default();
        }
        mesh.unlink_edge_end(self.edge, 0);
        mesh.unlink_edge_end(self.edge, 1);
        *mesh.edge_mut(self.edge) = EdgeRecord::default();
        *mesh.face_mut(self.merge) = FaceRecord::default();
    }
}

impl SplitEdgePlan {
    fn commit(self, mesh: &mut Mesh) -> (VertexId, EdgeId) {
        let [p, q] = mesh.edge(self.edge).ends;
        let riders = mesh.radial(self.edge);
        let vertex = mesh.push_vertex(self.position);

        mesh.unlink_edge_end(self.edge, 1);
        mesh.edge_mut(self.edge).ends[1] = vertex;
        mesh.link_edge_end(self.edge, 1);
        let new_edge = mesh.push_edge(vertex, q);

        for &fe in &riders {
            mesh.detach_radial(fe);
        }
        for fe in riders {
            let rec = mesh.fe(fe);
            let (face, next) = (rec.face, rec.next);
            // p->q becomes p->v on the old edge then v->q on the new one;
            // q->p becomes q->v on the new edge then v->p on the old one.
            let (first_edge, second_edge) = if rec.start == p {
                (self.edge, new_edge)
            } else {
                (new_edge, self.edge)
            };
            let inserted = mesh.push_face_edge(face, second_edge, vertex);
            mesh.attach_radial(fe, first_edge);
            mesh.attach_radial(inserted, second_edge);
            mesh.link_face_loop(fe, inserted);
            mesh.link_face_loop(inserted, next);
            mesh.face_mut(face).vertex_count += 1;
        }

        (vertex, new_edge)
    }
}

impl UnsplitEdgePlan {
    fn commit(self, mesh: &mut Mesh) {
        let riders = mesh.radial(self.edge);
        for fe in riders {
            let rec = mesh.fe(fe);
            let face = rec.face;
            if rec.start == self.vertex {
                // other: far->vertex, edge: vertex->near  =>  far->near
                let partner = rec.prev;
                let before = mesh.fe(partner).prev;
                mesh.link_face_loop(before, fe);
                mesh.fe_mut(fe).start = self.far;
                if mesh.face(face).first == partner {
                    mesh.face_mut(face).first = fe;
                }
                mesh.detach_radial(partner);
                *mesh.fe_mut(partner) = FaceEdgeRecord::default();
            } else {
                // edge: near->vertex, other: vertex->far  =>  near->far
                let partner = rec.next;
                let after = mesh.fe(partner).next;
                mesh.link_face_loop(fe, after);
                if mesh.face(face).first == partner {
                    mesh.face_mut(face).first = fe;
                }
                mesh.detach_radial(partner);
                *mesh.fe_mut(partner) = FaceEdgeRecord::default();
            }
            mesh.face_mut(face).vertex_count -= 1;
        }

        let k = mesh.end_index(self.edge, self.vertex);
        mesh.unlink_edge_end(self.edge, k);
        mesh.unlink_edge_end(self.other, 0);
        mesh.unlink_edge_end(self.other, 1);
        *mesh.edge_mut(self.other) = EdgeRecord::default();

        mesh.edge_mut(self.edge).ends[k] = self.far;
        mesh.link_edge_end(self.edge, k);

        mesh.pool.remove(self.vertex);
        *mesh.vert_mut(self.vertex) = VertexRecord::default();
    }
}
