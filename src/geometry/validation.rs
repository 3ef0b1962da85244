// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Consistency checks for the mesh graph
//!
//! `diagnose` walks every arena and reports each broken link it finds; it
//! never panics on a corrupt graph and every walk is bounded by the size of the
//! arena it traverses. `validate` is the short form used by tests and by the
//! post-edit check.

use super::mesh::Mesh;
use super::{EdgeId, FaceEdgeId, FaceId, MeshError, MeshResult, VertexId};
use serde::Serialize;
use std::fmt;

/// The element a [`TopologyIssue`] was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Element {
    Vertex(VertexId),
    Edge(EdgeId),
    FaceEdge(FaceEdgeId),
    Face(FaceId),
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex(id) => write!(f, "{id}"),
            Self::Edge(id) => write!(f, "{id}"),
            Self::FaceEdge(id) => write!(f, "{id}"),
            Self::Face(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopologyIssue {
    pub element: Element,
    pub message: String,
}

impl fmt::Display for TopologyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.element, self.message)
    }
}

struct Diagnosis<'a> {
    mesh: &'a Mesh,
    issues: Vec<TopologyIssue>,
}

impl Diagnosis<'_> {
    fn report(&mut self, element: Element, message: impl Into<String>) {
        self.issues.push(TopologyIssue {
            element,
            message: message.into(),
        });
    }

    fn vertices(&mut self) {
        let mesh = self.mesh;
        let mut end_counts = vec![0usize; mesh.vertices.len()];
        for edge in mesh.edges.iter().filter(|e| e.alive) {
            for end in edge.ends {
                if let Some(count) = end_counts.get_mut(end.0) {
                    *count += 1;
                }
            }
        }

        for (index, record) in mesh.vertices.iter().enumerate() {
            let id = VertexId(index);
            let element = Element::Vertex(id);
            if !record.alive {
                if !record.first_edge.is_absent() {
                    self.report(element, "retired vertex still references an edge");
                }
                if mesh.pool.contains_vertex(id) {
                    self.report(element, "retired vertex is still in the vertex pool");
                }
                continue;
            }
            if !mesh.pool.contains_vertex(id) {
                self.report(element, "live vertex is missing from the vertex pool");
            }

            let first = record.first_edge;
            if first.is_absent() {
                if end_counts[index] != 0 {
                    self.report(element, "has incident edges but no first edge");
                }
                continue;
            }

            let mut visited = Vec::new();
            let mut current = first;
            loop {
                if !mesh.is_edge_alive(current) {
                    self.report(element, format!("edge ring reaches non-live {current}"));
                    break;
                }
                let ends = mesh.edge(current).ends;
                let Some(k) = ends.iter().position(|&v| v == id) else {
                    self.report(element, format!("edge ring contains {current}, which is not incident"));
                    break;
                };
                if visited.contains(&current) {
                    self.report(element, format!("edge ring revisits {current} without closing"));
                    break;
                }
                visited.push(current);
                current = mesh.edge(current).next[k];
                if current == first {
                    break;
                }
                if visited.len() > mesh.edges.len() {
                    self.report(element, "edge ring does not terminate");
                    break;
                }
            }
            if visited.len() != end_counts[index] {
                self.report(
                    element,
                    format!(
                        "edge ring holds {} edges but {} live edge ends touch it",
                        visited.len(),
                        end_counts[index]
                    ),
                );
            }
        }
    }

    fn edges(&mut self) {
        let mesh = self.mesh;
        let mut riders = vec![0usize; mesh.edges.len()];
        for fe in mesh.face_edges.iter().filter(|fe| fe.alive) {
            if let Some(count) = riders.get_mut(fe.edge.0) {
                *count += 1;
            }
        }

        for (index, record) in mesh.edges.iter().enumerate() {
            let id = EdgeId(index);
            let element = Element::Edge(id);
            if !record.alive {
                let clear = record.ends.iter().all(|v| v.is_absent())
                    && record.next.iter().all(|e| e.is_absent())
                    && record.face_edge.is_absent();
                if !clear {
                    self.report(element, "retired edge still holds references");
                }
                continue;
            }

            for k in 0..2 {
                if !mesh.is_vertex_alive(record.ends[k]) {
                    self.report(element, format!("end {k} is non-live {}", record.ends[k]));
                }
                if !mesh.is_edge_alive(record.next[k]) {
                    self.report(element, format!("ring link at end {k} is non-live {}", record.next[k]));
                }
            }
            if record.ends[0] == record.ends[1] {
                self.report(element, "both ends are the same vertex");
            }

            let first = record.face_edge;
            let mut length = 0;
            if !first.is_absent() {
                let mut current = first;
                loop {
                    if !mesh.is_face_edge_alive(current) {
                        self.report(element, format!("radial loop reaches non-live {current}"));
                        break;
                    }
                    let fe = mesh.fe(current);
                    if fe.edge != id {
                        self.report(element, format!("radial loop contains {current}, which rides {}", fe.edge));
                    }
                    if !mesh.is_face_edge_alive(fe.radial_next)
                        || mesh.fe(fe.radial_next).radial_prev != current
                    {
                        self.report(element, format!("radial links around {current} are not mutual"));
                        break;
                    }
                    length += 1;
                    current = fe.radial_next;
                    if current == first {
                        break;
                    }
                    if length > mesh.face_edges.len() {
                        self.report(element, "radial loop does not terminate");
                        break;
                    }
                }
            }
            if length != riders[index] {
                self.report(
                    element,
                    format!("radial loop holds {length} face-edges but {} ride the edge", riders[index]),
                );
            }
        }
    }

    fn face_edges(&mut self) {
        let mesh = self.mesh;
        for (index, record) in mesh.face_edges.iter().enumerate() {
            let id = FaceEdgeId(index);
            let element = Element::FaceEdge(id);
            if !record.alive {
                let clear = record.face.is_absent()
                    && record.edge.is_absent()
                    && record.start.is_absent()
                    && record.next.is_absent()
                    && record.prev.is_absent()
                    && record.radial_next.is_absent()
                    && record.radial_prev.is_absent();
                if !clear {
                    self.report(element, "retired face-edge still holds references");
                }
                continue;
            }

            if !mesh.is_face_alive(record.face) {
                self.report(element, format!("belongs to non-live {}", record.face));
            }
            if !mesh.is_edge_alive(record.edge) {
                self.report(element, format!("rides non-live {}", record.edge));
                continue;
            }
            if !mesh.edge(record.edge).ends.contains(&record.start) {
                self.report(element, format!("starts at {}, not an end of {}", record.start, record.edge));
            }
            for (link, target) in [("next", record.next), ("prev", record.prev)] {
                if !mesh.is_face_edge_alive(target) {
                    self.report(element, format!("{link} is non-live {target}"));
                } else if mesh.fe(target).face != record.face {
                    self.report(element, format!("{link} {target} belongs to another face"));
                }
            }
            if mesh.is_face_edge_alive(record.next) && mesh.fe(record.next).prev != id {
                self.report(element, "next does not link back");
            }
            if !mesh.is_face_edge_alive(record.radial_next) || !mesh.is_face_edge_alive(record.radial_prev) {
                self.report(element, "radial neighbours are not live");
            }
        }
    }

    fn faces(&mut self) {
        let mesh = self.mesh;
        let mut owned = vec![0usize; mesh.faces.len()];
        for fe in mesh.face_edges.iter().filter(|fe| fe.alive) {
            if let Some(count) = owned.get_mut(fe.face.0) {
                *count += 1;
            }
        }

        for (index, record) in mesh.faces.iter().enumerate() {
            let id = FaceId(index);
            let element = Element::Face(id);
            if !record.alive {
                if !record.first.is_absent() || record.vertex_count != 0 {
                    self.report(element, "retired face still holds references");
                }
                continue;
            }
            if !mesh.is_face_edge_alive(record.first) {
                self.report(element, format!("first face-edge {} is not live", record.first));
                continue;
            }

            let mut length = 0;
            let mut current = record.first;
            loop {
                let fe = mesh.fe(current);
                if fe.face != id {
                    self.report(element, format!("loop contains {current} of {}", fe.face));
                    break;
                }
                let next = fe.next;
                if !mesh.is_face_edge_alive(next) {
                    break;
                }
                if mesh.is_edge_alive(fe.edge) && mesh.fe_end(current) != mesh.fe(next).start {
                    self.report(element, format!("{current} does not end where {next} starts"));
                }
                length += 1;
                current = next;
                if current == record.first {
                    break;
                }
                if length > mesh.face_edges.len() {
                    self.report(element, "face loop does not terminate");
                    break;
                }
            }

            if length < 3 {
                self.report(element, format!("loop has {length} face-edges, at least 3 required"));
            }
            if length != record.vertex_count {
                self.report(
                    element,
                    format!("loop has {length} face-edges but the cached count is {}", record.vertex_count),
                );
            }
            if length != owned[index] {
                self.report(
                    element,
                    format!("loop has {length} face-edges but {} name this face", owned[index]),
                );
            }
        }
    }
}

impl Mesh {
    /// Every consistency problem in the graph
    pub fn diagnose(&self) -> Vec<TopologyIssue> {
        let mut diagnosis = Diagnosis {
            mesh: self,
            issues: Vec::new(),
        };
        diagnosis.vertices();
        diagnosis.edges();
        diagnosis.face_edges();
        diagnosis.faces();
        diagnosis.issues
    }

    /// Fail with the first consistency problem found
    pub fn validate(&self) -> MeshResult<()> {
        match self.diagnose().into_iter().next() {
            None => Ok(()),
            Some(issue) => Err(MeshError::Invariant(issue.to_string())),
        }
    }
}
