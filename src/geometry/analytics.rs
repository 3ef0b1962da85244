// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry analytics and statistics

use super::{BoundingBox, Mesh};
use serde::{Deserialize, Serialize};

/// Geometry and topology statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshStats {
    pub vertex_count: usize,
    pub edge_count: usize,
    pub face_count: usize,
    /// Edges used by exactly one face
    pub boundary_edges: usize,
    /// Edges used by more than two faces
    pub non_manifold_edges: usize,
    /// Edges used by no face at all
    pub free_edges: usize,
    /// Total surface area in square units
    pub surface_area: f64,
    /// Signed enclosed volume; negative when faces wind inward
    pub volume: f64,
    pub bbox: BoundingBox,
    pub is_closed: bool,
    pub is_manifold: bool,
}

impl MeshStats {
    /// Pretty print statistics
    pub fn print(&self) {
        println!("╔══════════════════════════════════════════════════════════╗");
        println!("║              MESH ANALYTICS                              ║");
        println!("╠══════════════════════════════════════════════════════════╣");
        println!("║ Vertices:        {:>10}                              ║", self.vertex_count);
        println!("║ Edges:           {:>10}                              ║", self.edge_count);
        println!("║ Faces:           {:>10}                              ║", self.face_count);
        println!("║   boundary:      {:>10}                              ║", self.boundary_edges);
        println!("║   non-manifold:  {:>10}                              ║", self.non_manifold_edges);
        println!("║   free:          {:>10}                              ║", self.free_edges);
        println!("║                                                          ║");
        println!("║ Volume:          {:>10.4}                              ║", self.volume);
        println!("║ Surface Area:    {:>10.4}                              ║", self.surface_area);
        if !self.bbox.is_empty() {
            println!(
                "║   Min: ({:>7.2}, {:>7.2}, {:>7.2})                      ║",
                self.bbox.min.x, self.bbox.min.y, self.bbox.min.z
            );
            println!(
                "║   Max: ({:>7.2}, {:>7.2}, {:>7.2})                      ║",
                self.bbox.max.x, self.bbox.max.y, self.bbox.max.z
            );
        }
        println!(
            "║ Closed:          {:>10}                              ║",
            if self.is_closed { "Yes" } else { "No" }
        );
        println!(
            "║ Manifold:        {:>10}                              ║",
            if self.is_manifold { "Yes" } else { "No" }
        );
        println!("╚══════════════════════════════════════════════════════════╝");
    }
}

/// Analyze mesh geometry and compute statistics
pub fn analyze(mesh: &Mesh) -> MeshStats {
    let mut boundary_edges = 0;
    let mut non_manifold_edges = 0;
    let mut free_edges = 0;
    for edge in mesh.edges() {
        match mesh.radial(edge).len() {
            0 => free_edges += 1,
            1 => boundary_edges += 1,
            2 => {}
            _ => non_manifold_edges += 1,
        }
    }

    MeshStats {
        vertex_count: mesh.vertex_count(),
        edge_count: mesh.edge_count(),
        face_count: mesh.face_count(),
        boundary_edges,
        non_manifold_edges,
        free_edges,
        surface_area: surface_area(mesh),
        volume: signed_volume(mesh),
        bbox: mesh.bounding_box(),
        is_closed: is_closed(mesh),
        is_manifold: is_manifold(mesh),
    }
}

/// Signed volume from the divergence theorem over the fanned faces
pub fn signed_volume(mesh: &Mesh) -> f64 {
    mesh.triangles()
        .iter()
        .map(|([a, b, c], _)| a.coords.dot(&b.coords.cross(&c.coords)) / 6.0)
        .sum()
}

pub fn surface_area(mesh: &Mesh) -> f64 {
    mesh.triangles()
        .iter()
        .map(|([a, b, c], _)| (b - a).cross(&(c - a)).norm() / 2.0)
        .sum()
}

/// Every edge is shared by exactly two faces
pub fn is_closed(mesh: &Mesh) -> bool {
    mesh.face_count() > 0 && mesh.edges().all(|edge| mesh.radial(edge).len() == 2)
}

/// No edge is shared by more than two faces
pub fn is_manifold(mesh: &Mesh) -> bool {
    mesh.edges().all(|edge| mesh.radial(edge).len() <= 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{CreateOption, Primitive};
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_analyze_cube() {
        let mesh = Primitive::cube(10.0, Point3::origin()).to_mesh();
        let stats = analyze(&mesh);

        assert_relative_eq!(stats.volume, 1000.0, epsilon = 1e-9);
        assert_relative_eq!(stats.surface_area, 600.0, epsilon = 1e-9);
        assert_eq!(stats.vertex_count, 8);
        assert_eq!(stats.edge_count, 12);
        assert_eq!(stats.face_count, 6);
        assert_eq!(stats.boundary_edges, 0);
        assert!(stats.is_closed);
        assert!(stats.is_manifold);
        assert_relative_eq!(stats.bbox.max.x, 5.0);
    }

    #[test]
    fn test_prism_volume() {
        let mesh = Primitive::prism(1.0, 2.0, 64).to_mesh();
        let expected = 0.5 * 64.0 * (std::f64::consts::TAU / 64.0).sin() * 2.0;
        assert_relative_eq!(signed_volume(&mesh), expected, epsilon = 1e-9);
        assert!(is_closed(&mesh));
    }

    #[test]
    fn test_reversed_faces_flip_volume_sign() {
        let mut mesh = Primitive::cube(2.0, Point3::origin()).to_mesh();
        let faces: Vec<_> = mesh.faces().collect();
        for face in faces {
            mesh.reverse_face(face).unwrap();
        }
        assert_relative_eq!(signed_volume(&mesh), -8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_open_and_non_manifold_counts() {
        let mut mesh = Primitive::cube(2.0, Point3::origin()).to_mesh();
        let top = mesh.faces().nth(4).unwrap();
        mesh.delete_face(top).unwrap();
        let stats = analyze(&mesh);
        assert_eq!(stats.boundary_edges, 4);
        assert!(!stats.is_closed);
        assert!(stats.is_manifold);

        // A fin hung off one of the remaining edges
        let edge = mesh.edges().next().unwrap();
        let [a, b] = mesh.edge_vertices(edge).unwrap();
        let tip = mesh.create_vertex(Point3::new(5.0, 5.0, 5.0), CreateOption::CreateNew);
        mesh.create_face(&[a, b, tip], CreateOption::ReuseExisting).unwrap();
        let stats = analyze(&mesh);
        assert!(stats.non_manifold_edges >= 1);
        assert!(!stats.is_manifold);
    }

    #[test]
    fn test_empty_mesh() {
        let stats = analyze(&Mesh::new());
        assert_eq!(stats.face_count, 0);
        assert_eq!(stats.volume, 0.0);
        assert!(!stats.is_closed);
    }
}
