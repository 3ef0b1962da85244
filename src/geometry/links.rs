// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Low-level list plumbing: vertex edge rings, face loops and radial loops
//!
//! None of these helpers check preconditions; callers validate handles first.

use super::mesh::Mesh;
use super::{EdgeId, FaceEdgeId, FaceId, VertexId};

impl Mesh {
    /// Which end of `edge` is `vertex`
    #[inline]
    pub(crate) fn end_index(&self, edge: EdgeId, vertex: VertexId) -> usize {
        if self.edge(edge).ends[0] == vertex {
            0
        } else {
            1
        }
    }

    /// Successor of `edge` in the ring of `vertex`
    #[inline]
    pub(crate) fn ring_next(&self, edge: EdgeId, vertex: VertexId) -> EdgeId {
        self.edge(edge).next[self.end_index(edge, vertex)]
    }

    /// Edges in the ring of `vertex`; stops early if the ring is corrupt
    pub(crate) fn ring(&self, vertex: VertexId) -> Vec<EdgeId> {
        let first = self.vert(vertex).first_edge;
        let mut ring = Vec::new();
        if first.is_absent() {
            return ring;
        }
        let mut current = first;
        loop {
            ring.push(current);
            current = self.ring_next(current, vertex);
            if current == first || current.is_absent() || ring.len() > self.edges.len() {
                break;
            }
        }
        ring
    }

    /// Thread end `k` of `edge` into the ring of the vertex at that end
    pub(crate) fn link_edge_end(&mut self, edge: EdgeId, k: usize) {
        let vertex = self.edge(edge).ends[k];
        let first = self.vert(vertex).first_edge;
        if first.is_absent() {
            self.edge_mut(edge).next[k] = edge;
            self.vert_mut(vertex).first_edge = edge;
        } else {
            let kf = self.end_index(first, vertex);
            let after = self.edge(first).next[kf];
            self.edge_mut(edge).next[k] = after;
            self.edge_mut(first).next[kf] = edge;
        }
    }

    /// Remove end `k` of `edge` from the ring of the vertex at that end
    pub(crate) fn unlink_edge_end(&mut self, edge: EdgeId, k: usize) {
        let vertex = self.edge(edge).ends[k];
        let after = self.edge(edge).next[k];
        if after == edge {
            self.vert_mut(vertex).first_edge = EdgeId::NONE;
        } else {
            let mut pred = after;
            while self.ring_next(pred, vertex) != edge {
                pred = self.ring_next(pred, vertex);
            }
            let kp = self.end_index(pred, vertex);
            self.edge_mut(pred).next[kp] = after;
            if self.vert(vertex).first_edge == edge {
                self.vert_mut(vertex).first_edge = after;
            }
        }
        self.edge_mut(edge).next[k] = EdgeId::NONE;
    }

    /// Join two disjoint rings around the same vertex through one member of each
    pub(crate) fn splice_rings(&mut self, a: EdgeId, b: EdgeId, vertex: VertexId) {
        let ka = self.end_index(a, vertex);
        let kb = self.end_index(b, vertex);
        let a_next = self.edge(a).next[ka];
        let b_next = self.edge(b).next[kb];
        self.edge_mut(a).next[ka] = b_next;
        self.edge_mut(b).next[kb] = a_next;
    }

    /// Vertex where `face_edge` arrives
    #[inline]
    pub(crate) fn fe_end(&self, face_edge: FaceEdgeId) -> VertexId {
        let rec = self.fe(face_edge);
        let ends = self.edge(rec.edge).ends;
        if ends[0] == rec.start {
            ends[1]
        } else {
            ends[0]
        }
    }

    #[inline]
    pub(crate) fn link_face_loop(&mut self, prev: FaceEdgeId, next: FaceEdgeId) {
        self.fe_mut(prev).next = next;
        self.fe_mut(next).prev = prev;
    }

    /// Face-edges of `face` in loop order
    pub(crate) fn face_loop(&self, face: FaceId) -> Vec<FaceEdgeId> {
        let first = self.face(face).first;
        let mut face_loop = Vec::new();
        if first.is_absent() {
            return face_loop;
        }
        let mut current = first;
        loop {
            face_loop.push(current);
            current = self.fe(current).next;
            if current == first || current.is_absent() || face_loop.len() > self.face_edges.len() {
                break;
            }
        }
        face_loop
    }

    /// Face-edges riding `edge` in radial order
    pub(crate) fn radial(&self, edge: EdgeId) -> Vec<FaceEdgeId> {
        let first = self.edge(edge).face_edge;
        let mut radial = Vec::new();
        if first.is_absent() {
            return radial;
        }
        let mut current = first;
        loop {
            radial.push(current);
            current = self.fe(current).radial_next;
            if current == first || current.is_absent() || radial.len() > self.face_edges.len() {
                break;
            }
        }
        radial
    }

    /// Put `face_edge` on the radial loop of `edge`
    pub(crate) fn attach_radial(&mut self, face_edge: FaceEdgeId, edge: EdgeId) {
        self.fe_mut(face_edge).edge = edge;
        let first = self.edge(edge).face_edge;
        if first.is_absent() {
            let rec = self.fe_mut(face_edge);
            rec.radial_next = face_edge;
            rec.radial_prev = face_edge;
            self.edge_mut(edge).face_edge = face_edge;
        } else {
            let after = self.fe(first).radial_next;
            let rec = self.fe_mut(face_edge);
            rec.radial_prev = first;
            rec.radial_next = after;
            self.fe_mut(first).radial_next = face_edge;
            self.fe_mut(after).radial_prev = face_edge;
        }
    }

    /// Take `face_edge` off the radial loop it rides
    pub(crate) fn detach_radial(&mut self, face_edge: FaceEdgeId) {
        let edge = self.fe(face_edge).edge;
        let next = self.fe(face_edge).radial_next;
        let prev = self.fe(face_edge).radial_prev;
        if next == face_edge {
            self.edge_mut(edge).face_edge = FaceEdgeId::NONE;
        } else {
            self.fe_mut(prev).radial_next = next;
            self.fe_mut(next).radial_prev = prev;
            if self.edge(edge).face_edge == face_edge {
                self.edge_mut(edge).face_edge = next;
            }
        }
        let rec = self.fe_mut(face_edge);
        rec.radial_next = FaceEdgeId::NONE;
        rec.radial_prev = FaceEdgeId::NONE;
    }

    /// Merge the radial loop of `from` into the radial loop of `into`
    ///
    /// Every face-edge of `from` is re-pointed at `into`; `from` ends up free.
    pub(crate) fn splice_radial(&mut self, into: EdgeId, from: EdgeId) {
        let moved = self.radial(from);
        if moved.is_empty() {
            return;
        }
        for &fe in &moved {
            self.fe_mut(fe).edge = into;
        }
        self.edge_mut(from).face_edge = FaceEdgeId::NONE;

        let a = self.edge(into).face_edge;
        if a.is_absent() {
            self.edge_mut(into).face_edge = moved[0];
            return;
        }
        let b = moved[0];
        let a_next = self.fe(a).radial_next;
        let b_prev = self.fe(b).radial_prev;
        self.fe_mut(a).radial_next = b;
        self.fe_mut(b).radial_prev = a;
        self.fe_mut(b_prev).radial_next = a_next;
        self.fe_mut(a_next).radial_prev = b_prev;
    }
}
