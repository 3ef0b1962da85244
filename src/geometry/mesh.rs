// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polygon mesh stored as a vertex/edge/face graph
//!
//! Elements live in dense arenas and refer to each other through index handles.
//! Every vertex threads its incident edges into a circular *edge ring*; every
//! face owns a circular loop of face-edges; every edge threads the face-edges
//! riding it into a circular *radial loop*. Retired elements stay in their arena
//! as tombstones with all links reset to the absent sentinel.

use super::{
    BoundingBox, EdgeId, FaceEdgeId, FaceId, MeshError, MeshResult, VertexId, VertexPool,
};
use crate::config::MeshConfig;
use nalgebra::{Matrix4, Point3, Vector3};

/// How creation calls treat existing coincident elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateOption {
    /// Return a matching vertex or edge when one already exists
    #[default]
    ReuseExisting,
    /// Always allocate a new element
    CreateNew,
}

/// Normals shorter than this are treated as undefined
pub(crate) const NORMAL_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Default)]
pub(crate) struct VertexRecord {
    pub position: Point3<f64>,
    pub first_edge: EdgeId,
    pub alive: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct EdgeRecord {
    pub ends: [VertexId; 2],
    /// Next edge in the ring of `ends[k]`
    pub next: [EdgeId; 2],
    pub face_edge: FaceEdgeId,
    pub alive: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FaceEdgeRecord {
    pub face: FaceId,
    pub edge: EdgeId,
    /// Vertex this face-edge leaves in the face's winding order
    pub start: VertexId,
    pub next: FaceEdgeId,
    pub prev: FaceEdgeId,
    pub radial_next: FaceEdgeId,
    pub radial_prev: FaceEdgeId,
    pub alive: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FaceRecord {
    pub first: FaceEdgeId,
    pub vertex_count: usize,
    pub normal: Vector3<f64>,
    pub alive: bool,
}

/// Read-only view of one face-edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceEdgeInfo {
    pub face: FaceId,
    pub edge: EdgeId,
    pub start: VertexId,
    pub end: VertexId,
}

/// Editable polygon mesh
#[derive(Debug, Clone)]
pub struct Mesh {
    pub(crate) config: MeshConfig,
    pub(crate) vertices: Vec<VertexRecord>,
    pub(crate) edges: Vec<EdgeRecord>,
    pub(crate) face_edges: Vec<FaceEdgeRecord>,
    pub(crate) faces: Vec<FaceRecord>,
    pub(crate) pool: VertexPool,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Mesh {
    pub fn new() -> Self {
        Self::with_config(MeshConfig::default())
    }

    pub fn with_config(config: MeshConfig) -> Self {
        Self {
            pool: VertexPool::new(config.cell_size),
            config,
            vertices: Vec::new(),
            edges: Vec::new(),
            face_edges: Vec::new(),
            faces: Vec::new(),
        }
    }

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    pub fn tolerance(&self) -> f64 {
        self.config.tolerance
    }

    pub fn vertex_pool(&self) -> &VertexPool {
        &self.pool
    }

    // ---------------------------------------------------------------------
    // Arena access
    // ---------------------------------------------------------------------

    #[inline]
    pub(crate) fn vert(&self, id: VertexId) -> &VertexRecord {
        &self.vertices[id.0]
    }

    #[inline]
    pub(crate) fn vert_mut(&mut self, id: VertexId) -> &mut VertexRecord {
        &mut self.vertices[id.0]
    }

    #[inline]
    pub(crate) fn edge(&self, id: EdgeId) -> &EdgeRecord {
        &self.edges[id.0]
    }

    #[inline]
    pub(crate) fn edge_mut(&mut self, id: EdgeId) -> &mut EdgeRecord {
        &mut self.edges[id.0]
    }

    #[inline]
    pub(crate) fn fe(&self, id: FaceEdgeId) -> &FaceEdgeRecord {
        &self.face_edges[id.0]
    }

    #[inline]
    pub(crate) fn fe_mut(&mut self, id: FaceEdgeId) -> &mut FaceEdgeRecord {
        &mut self.face_edges[id.0]
    }

    #[inline]
    pub(crate) fn face(&self, id: FaceId) -> &FaceRecord {
        &self.faces[id.0]
    }

    #[inline]
    pub(crate) fn face_mut(&mut self, id: FaceId) -> &mut FaceRecord {
        &mut self.faces[id.0]
    }

    pub fn is_vertex_alive(&self, id: VertexId) -> bool {
        self.vertices.get(id.0).is_some_and(|v| v.alive)
    }

    pub fn is_edge_alive(&self, id: EdgeId) -> bool {
        self.edges.get(id.0).is_some_and(|e| e.alive)
    }

    pub fn is_face_edge_alive(&self, id: FaceEdgeId) -> bool {
        self.face_edges.get(id.0).is_some_and(|fe| fe.alive)
    }

    pub fn is_face_alive(&self, id: FaceId) -> bool {
        self.faces.get(id.0).is_some_and(|f| f.alive)
    }

    pub(crate) fn check_vertex(&self, id: VertexId) -> MeshResult<()> {
        if self.is_vertex_alive(id) {
            Ok(())
        } else {
            Err(MeshError::StaleHandle {
                kind: "vertex",
                index: id.0,
            })
        }
    }

    pub(crate) fn check_edge(&self, id: EdgeId) -> MeshResult<()> {
        if self.is_edge_alive(id) {
            Ok(())
        } else {
            Err(MeshError::StaleHandle {
                kind: "edge",
                index: id.0,
            })
        }
    }

    pub(crate) fn check_face_edge(&self, id: FaceEdgeId) -> MeshResult<()> {
        if self.is_face_edge_alive(id) {
            Ok(())
        } else {
            Err(MeshError::StaleHandle {
                kind: "face-edge",
                index: id.0,
            })
        }
    }

    pub(crate) fn check_face(&self, id: FaceId) -> MeshResult<()> {
        if self.is_face_alive(id) {
            Ok(())
        } else {
            Err(MeshError::StaleHandle {
                kind: "face",
                index: id.0,
            })
        }
    }

    // ---------------------------------------------------------------------
    // Creation
    // ---------------------------------------------------------------------

    /// Create a vertex, or with `ReuseExisting` return the first-created vertex
    /// already within tolerance of `position`
    pub fn create_vertex(&mut self, position: Point3<f64>, option: CreateOption) -> VertexId {
        if option == CreateOption::ReuseExisting {
            if let Some(&existing) = self
                .pool
                .find_vertices(&position, self.config.tolerance)
                .first()
            {
                return existing;
            }
        }
        self.push_vertex(position)
    }

    pub(crate) fn push_vertex(&mut self, position: Point3<f64>) -> VertexId {
        let id = VertexId(self.vertices.len());
        self.vertices.push(VertexRecord {
            position,
            first_edge: EdgeId::NONE,
            alive: true,
        });
        self.pool.add(id, position);
        id
    }

    /// Create a free edge between two distinct vertices
    ///
    /// Parallel edges between the same pair are allowed; `merge_mesh_edges`
    /// collapses them later.
    pub fn create_edge(&mut self, a: VertexId, b: VertexId) -> MeshResult<EdgeId> {
        self.check_vertex(a)?;
        self.check_vertex(b)?;
        if a == b {
            return Err(MeshError::precondition(
                "create_edge",
                format!("both ends are {a}"),
            ));
        }
        Ok(self.push_edge(a, b))
    }

    pub(crate) fn push_edge(&mut self, a: VertexId, b: VertexId) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.edges.push(EdgeRecord {
            ends: [a, b],
            next: [EdgeId::NONE; 2],
            face_edge: FaceEdgeId::NONE,
            alive: true,
        });
        self.link_edge_end(id, 0);
        self.link_edge_end(id, 1);
        id
    }

    pub(crate) fn push_face_edge(&mut self, face: FaceId, edge: EdgeId, start: VertexId) -> FaceEdgeId {
        let id = FaceEdgeId(self.face_edges.len());
        self.face_edges.push(FaceEdgeRecord {
            face,
            edge,
            start,
            next: id,
            prev: id,
            radial_next: id,
            radial_prev: id,
            alive: true,
        });
        id
    }

    /// Create a face from an ordered vertex loop
    ///
    /// The normal comes from the first three vertices, falling back to Newell's
    /// method when they are collinear.
    pub fn create_face(&mut self, vertices: &[VertexId], option: CreateOption) -> MeshResult<FaceId> {
        self.check_face_loop(vertices)?;
        let normal = self.loop_normal(vertices)?;
        Ok(self.commit_face(vertices, option, normal))
    }

    /// Create a face with a caller-supplied normal
    pub fn create_face_with_normal(
        &mut self,
        vertices: &[VertexId],
        option: CreateOption,
        normal: Vector3<f64>,
    ) -> MeshResult<FaceId> {
        self.check_face_loop(vertices)?;
        let normal = normal
            .try_normalize(NORMAL_EPSILON)
            .ok_or_else(|| MeshError::DegenerateFace("explicit normal has zero length".into()))?;
        Ok(self.commit_face(vertices, option, normal))
    }

    fn check_face_loop(&self, vertices: &[VertexId]) -> MeshResult<()> {
        if vertices.len() < 3 {
            return Err(MeshError::DegenerateFace(format!(
                "{} vertices given, at least 3 required",
                vertices.len()
            )));
        }
        for &v in vertices {
            self.check_vertex(v)?;
        }
        for i in 0..vertices.len() {
            let next = vertices[(i + 1) % vertices.len()];
            if vertices[i] == next {
                return Err(MeshError::DegenerateFace(format!(
                    "{} repeats consecutively",
                    vertices[i]
                )));
            }
        }
        let mut distinct = vertices.to_vec();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() < 3 {
            return Err(MeshError::DegenerateFace(format!(
                "only {} distinct vertices",
                distinct.len()
            )));
        }
        let origin = self.vert(vertices[0]).position;
        if vertices
            .iter()
            .all(|&v| (self.vert(v).position - origin).norm() <= self.config.tolerance)
        {
            return Err(MeshError::DegenerateFace(
                "all vertices share one position".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn loop_normal(&self, vertices: &[VertexId]) -> MeshResult<Vector3<f64>> {
        let positions: Vec<Point3<f64>> = vertices.iter().map(|&v| self.vert(v).position).collect();
        polygon_normal(&positions)
            .ok_or_else(|| MeshError::DegenerateFace("vertices are collinear".into()))
    }

    fn commit_face(&mut self, vertices: &[VertexId], option: CreateOption, normal: Vector3<f64>) -> FaceId {
        let face = FaceId(self.faces.len());
        self.faces.push(FaceRecord {
            first: FaceEdgeId::NONE,
            vertex_count: vertices.len(),
            normal,
            alive: true,
        });

        let mut loop_edges = Vec::with_capacity(vertices.len());
        for i in 0..vertices.len() {
            let a = vertices[i];
            let b = vertices[(i + 1) % vertices.len()];
            let existing = match option {
                CreateOption::ReuseExisting => self.find_edges(a, b).ok().and_then(|e| e.first().copied()),
                CreateOption::CreateNew => None,
            };
            let edge = match existing {
                Some(edge) => edge,
                None => self.push_edge(a, b),
            };
            let fe = self.push_face_edge(face, edge, a);
            self.attach_radial(fe, edge);
            loop_edges.push(fe);
        }

        for i in 0..loop_edges.len() {
            self.link_face_loop(loop_edges[i], loop_edges[(i + 1) % loop_edges.len()]);
        }
        self.face_mut(face).first = loop_edges[0];
        face
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.alive)
            .map(|(i, _)| VertexId(i))
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.alive)
            .map(|(i, _)| EdgeId(i))
    }

    pub fn faces(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.alive)
            .map(|(i, _)| FaceId(i))
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.iter().filter(|v| v.alive).count()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.alive).count()
    }

    pub fn face_count(&self) -> usize {
        self.faces.iter().filter(|f| f.alive).count()
    }

    pub fn position(&self, vertex: VertexId) -> MeshResult<Point3<f64>> {
        self.check_vertex(vertex)?;
        Ok(self.vert(vertex).position)
    }

    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.vertices().map(|v| self.vert(v).position).collect()
    }

    /// All live vertices within `tolerance` of `position`
    pub fn find_vertices(&self, position: &Point3<f64>, tolerance: f64) -> Vec<VertexId> {
        self.pool.find_vertices(position, tolerance)
    }

    pub fn contains_vertex(&self, vertex: VertexId) -> bool {
        self.pool.contains_vertex(vertex)
    }

    pub fn edge_vertices(&self, edge: EdgeId) -> MeshResult<[VertexId; 2]> {
        self.check_edge(edge)?;
        Ok(self.edge(edge).ends)
    }

    /// The end of `edge` that is not `vertex`
    pub fn other_vertex(&self, edge: EdgeId, vertex: VertexId) -> MeshResult<VertexId> {
        let [a, b] = self.edge_vertices(edge)?;
        if vertex == a {
            Ok(b)
        } else if vertex == b {
            Ok(a)
        } else {
            Err(MeshError::precondition(
                "other_vertex",
                format!("{vertex} is not an end of {edge}"),
            ))
        }
    }

    /// Edges in the ring of `vertex`, starting from its first edge
    pub fn vertex_edges(&self, vertex: VertexId) -> MeshResult<Vec<EdgeId>> {
        self.check_vertex(vertex)?;
        Ok(self.ring(vertex))
    }

    pub fn vertex_degree(&self, vertex: VertexId) -> MeshResult<usize> {
        Ok(self.vertex_edges(vertex)?.len())
    }

    /// Every edge joining `a` and `b`
    pub fn find_edges(&self, a: VertexId, b: VertexId) -> MeshResult<Vec<EdgeId>> {
        self.check_vertex(a)?;
        self.check_vertex(b)?;
        Ok(self
            .ring(a)
            .into_iter()
            .filter(|&e| {
                let ends = self.edge(e).ends;
                (ends[0] == a && ends[1] == b) || (ends[0] == b && ends[1] == a)
            })
            .collect())
    }

    /// Vertices of `face` in winding order, beginning at its first face-edge
    pub fn face_vertices(&self, face: FaceId) -> MeshResult<Vec<VertexId>> {
        Ok(self
            .face_edges(face)?
            .into_iter()
            .map(|fe| self.fe(fe).start)
            .collect())
    }

    pub fn face_positions(&self, face: FaceId) -> MeshResult<Vec<Point3<f64>>> {
        Ok(self
            .face_vertices(face)?
            .into_iter()
            .map(|v| self.vert(v).position)
            .collect())
    }

    pub fn face_edges(&self, face: FaceId) -> MeshResult<Vec<FaceEdgeId>> {
        self.check_face(face)?;
        Ok(self.face_loop(face))
    }

    pub fn face_vertex_count(&self, face: FaceId) -> MeshResult<usize> {
        self.check_face(face)?;
        Ok(self.face(face).vertex_count)
    }

    pub fn face_normal(&self, face: FaceId) -> MeshResult<Vector3<f64>> {
        self.check_face(face)?;
        Ok(self.face(face).normal)
    }

    pub fn face_edge_info(&self, face_edge: FaceEdgeId) -> MeshResult<FaceEdgeInfo> {
        self.check_face_edge(face_edge)?;
        let rec = self.fe(face_edge);
        Ok(FaceEdgeInfo {
            face: rec.face,
            edge: rec.edge,
            start: rec.start,
            end: self.fe_end(face_edge),
        })
    }

    /// Face-edges riding `edge`, in radial order
    pub fn radial_face_edges(&self, edge: EdgeId) -> MeshResult<Vec<FaceEdgeId>> {
        self.check_edge(edge)?;
        Ok(self.radial(edge))
    }

    /// One entry per face-edge riding `edge`
    pub fn faces_sharing_edge(&self, edge: EdgeId) -> MeshResult<Vec<FaceId>> {
        Ok(self
            .radial_face_edges(edge)?
            .into_iter()
            .map(|fe| self.fe(fe).face)
            .collect())
    }

    pub fn edge_face_count(&self, edge: EdgeId) -> MeshResult<usize> {
        Ok(self.radial_face_edges(edge)?.len())
    }

    /// Every face fanned into triangles from its first vertex
    pub fn triangles(&self) -> Vec<([Point3<f64>; 3], Vector3<f64>)> {
        let mut triangles = Vec::new();
        for face in self.faces() {
            let positions: Vec<Point3<f64>> = self
                .face_loop(face)
                .into_iter()
                .map(|fe| self.vert(self.fe(fe).start).position)
                .collect();
            let normal = self.face(face).normal;
            for i in 1..positions.len().saturating_sub(1) {
                triangles.push(([positions[0], positions[i], positions[i + 1]], normal));
            }
        }
        triangles
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(self.vertices().map(|v| &self.vert(v).position))
    }

    // ---------------------------------------------------------------------
    // Whole-mesh edits
    // ---------------------------------------------------------------------

    pub fn translate(&mut self, offset: Vector3<f64>) {
        self.transform(&Matrix4::new_translation(&offset));
    }

    /// Transform every vertex by a matrix, re-indexing positions and normals
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for vertex in self.vertices.iter_mut().filter(|v| v.alive) {
            vertex.position = matrix.transform_point(&vertex.position);
        }
        self.rebuild_pool();

        let normal_matrix = matrix
            .try_inverse()
            .map(|m| m.transpose())
            .unwrap_or(*matrix);
        let faces: Vec<FaceId> = self.faces().collect();
        for face in faces {
            let vertices: Vec<VertexId> = self.face_loop(face).into_iter().map(|fe| self.fe(fe).start).collect();
            let normal = match self.loop_normal(&vertices) {
                Ok(normal) => normal,
                Err(_) => normal_matrix
                    .transform_vector(&self.face(face).normal)
                    .try_normalize(NORMAL_EPSILON)
                    .unwrap_or(self.face(face).normal),
            };
            self.face_mut(face).normal = normal;
        }
    }

    pub(crate) fn rebuild_pool(&mut self) {
        self.pool.clear();
        for (i, vertex) in self.vertices.iter().enumerate() {
            if vertex.alive {
                self.pool.add(VertexId(i), vertex.position);
            }
        }
    }

    /// Flip the winding of `face` and negate its normal
    pub fn reverse_face(&mut self, face: FaceId) -> MeshResult<()> {
        self.check_face(face)?;
        let loop_edges = self.face_loop(face);
        let new_starts: Vec<VertexId> = loop_edges.iter().map(|&fe| self.fe_end(fe)).collect();
        for (&fe, start) in loop_edges.iter().zip(new_starts) {
            let rec = self.fe_mut(fe);
            std::mem::swap(&mut rec.next, &mut rec.prev);
            rec.start = start;
        }
        let rec = self.face_mut(face);
        rec.normal = -rec.normal;
        self.debug_check("reverse_face");
        Ok(())
    }

    /// Remove `face`, leaving its edges in place (possibly free)
    pub fn delete_face(&mut self, face: FaceId) -> MeshResult<()> {
        self.check_face(face)?;
        for fe in self.face_loop(face) {
            self.detach_radial(fe);
            *self.fe_mut(fe) = FaceEdgeRecord::default();
        }
        *self.face_mut(face) = FaceRecord::default();
        self.debug_check("delete_face");
        Ok(())
    }

    /// Deep copy with compacted handles
    ///
    /// Tombstones are dropped and live elements renumbered in their original
    /// order, so the copy shares no identities with `self`.
    pub fn copy(&self) -> Mesh {
        fn remap_table(alive: impl Iterator<Item = bool>) -> Vec<usize> {
            let mut next = 0;
            alive
                .map(|a| {
                    if a {
                        next += 1;
                        next - 1
                    } else {
                        usize::MAX
                    }
                })
                .collect()
        }
        let vmap = remap_table(self.vertices.iter().map(|v| v.alive));
        let emap = remap_table(self.edges.iter().map(|e| e.alive));
        let femap = remap_table(self.face_edges.iter().map(|fe| fe.alive));
        let fmap = remap_table(self.faces.iter().map(|f| f.alive));

        let rv = |id: VertexId| if id.is_absent() { id } else { VertexId(vmap[id.0]) };
        let re = |id: EdgeId| if id.is_absent() { id } else { EdgeId(emap[id.0]) };
        let rfe = |id: FaceEdgeId| if id.is_absent() { id } else { FaceEdgeId(femap[id.0]) };
        let rf = |id: FaceId| if id.is_absent() { id } else { FaceId(fmap[id.0]) };

        let mut copy = Mesh::with_config(self.config);
        copy.vertices = self
            .vertices
            .iter()
            .filter(|v| v.alive)
            .map(|v| VertexRecord {
                position: v.position,
                first_edge: re(v.first_edge),
                alive: true,
            })
            .collect();
        copy.edges = self
            .edges
            .iter()
            .filter(|e| e.alive)
            .map(|e| EdgeRecord {
                ends: [rv(e.ends[0]), rv(e.ends[1])],
                next: [re(e.next[0]), re(e.next[1])],
                face_edge: rfe(e.face_edge),
                alive: true,
            })
            .collect();
        copy.face_edges = self
            .face_edges
            .iter()
            .filter(|fe| fe.alive)
            .map(|fe| FaceEdgeRecord {
                face: rf(fe.face),
                edge: re(fe.edge),
                start: rv(fe.start),
                next: rfe(fe.next),
                prev: rfe(fe.prev),
                radial_next: rfe(fe.radial_next),
                radial_prev: rfe(fe.radial_prev),
                alive: true,
            })
            .collect();
        copy.faces = self
            .faces
            .iter()
            .filter(|f| f.alive)
            .map(|f| FaceRecord {
                first: rfe(f.first),
                vertex_count: f.vertex_count,
                normal: f.normal,
                alive: true,
            })
            .collect();
        copy.rebuild_pool();
        copy
    }

    /// Run validation after a structural edit when configured to
    pub(crate) fn debug_check(&self, op: &str) {
        if !self.config.validate_edits {
            return;
        }
        if let Err(err) = self.validate() {
            tracing::error!(op, %err, "mesh failed validation after edit");
            debug_assert!(false, "{op} left the mesh inconsistent: {err}");
        }
    }
}

/// Unit normal of a polygon: first-three-vertex cross product, or Newell's
/// method when those three are collinear
pub(crate) fn polygon_normal(positions: &[Point3<f64>]) -> Option<Vector3<f64>> {
    if positions.len() < 3 {
        return None;
    }
    let cross = (positions[1] - positions[0]).cross(&(positions[2] - positions[0]));
    if let Some(normal) = cross.try_normalize(NORMAL_EPSILON) {
        return Some(normal);
    }

    let mut newell = Vector3::zeros();
    for i in 0..positions.len() {
        let a = positions[i];
        let b = positions[(i + 1) % positions.len()];
        newell.x += (a.y - b.y) * (a.z + b.z);
        newell.y += (a.z - b.z) * (a.x + b.x);
        newell.z += (a.x - b.x) * (a.y + b.y);
    }
    newell.try_normalize(NORMAL_EPSILON)
}
