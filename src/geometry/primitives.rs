// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric primitives generator

use super::{CreateOption, Mesh, VertexId};
use crate::config::MeshConfig;
use nalgebra::{Point3, Vector3};
use std::f64::consts::TAU;

/// Corners of the unit cube spanning [-1, 1] on every axis
const CUBE_CORNERS: [[f64; 3]; 8] = [
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
];

/// Front, left, right, back, top, bottom; all wound counter-clockwise seen
/// from outside
const CUBE_FACES: [[usize; 4]; 6] = [
    [0, 1, 2, 3],
    [4, 0, 3, 7],
    [1, 5, 6, 2],
    [4, 7, 6, 5],
    [3, 2, 6, 7],
    [4, 5, 1, 0],
];

/// Geometric primitives
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Axis-aligned cube with edge length `size`
    Cube { size: f64, center: Point3<f64> },
    /// Regular `sides`-gon extruded from z = 0 to z = `height`
    Prism { radius: f64, height: f64, sides: u32 },
}

impl Primitive {
    pub fn cube(size: f64, center: Point3<f64>) -> Self {
        Self::Cube { size, center }
    }

    pub fn prism(radius: f64, height: f64, sides: u32) -> Self {
        Self::Prism {
            radius,
            height,
            sides: sides.max(3),
        }
    }

    pub fn to_mesh(&self) -> Mesh {
        self.to_mesh_with_config(MeshConfig::default())
    }

    pub fn to_mesh_with_config(&self, config: MeshConfig) -> Mesh {
        let mut mesh = Mesh::with_config(config);
        match self {
            Self::Cube { size, center } => generate_cube(&mut mesh, *size, *center),
            Self::Prism {
                radius,
                height,
                sides,
            } => generate_prism(&mut mesh, *radius, *height, *sides),
        }
        mesh
    }
}

fn add_faces(mesh: &mut Mesh, vertices: &[VertexId], faces: &[Vec<usize>]) {
    for indices in faces {
        let loop_vertices: Vec<VertexId> = indices.iter().map(|&i| vertices[i]).collect();
        if let Err(err) = mesh.create_face(&loop_vertices, CreateOption::ReuseExisting) {
            tracing::warn!(%err, "skipping degenerate primitive face");
        }
    }
}

fn generate_cube(mesh: &mut Mesh, size: f64, center: Point3<f64>) {
    let half = size / 2.0;
    let vertices: Vec<VertexId> = CUBE_CORNERS
        .iter()
        .map(|&[x, y, z]| {
            let position = center + Vector3::new(x, y, z) * half;
            mesh.create_vertex(position, CreateOption::CreateNew)
        })
        .collect();
    let faces: Vec<Vec<usize>> = CUBE_FACES.iter().map(|f| f.to_vec()).collect();
    add_faces(mesh, &vertices, &faces);
}

fn generate_prism(mesh: &mut Mesh, radius: f64, height: f64, sides: u32) {
    let n = sides as usize;
    let mut vertices = Vec::with_capacity(2 * n);
    for z in [0.0, height] {
        for i in 0..n {
            let angle = TAU * i as f64 / n as f64;
            let position = Point3::new(radius * angle.cos(), radius * angle.sin(), z);
            vertices.push(mesh.create_vertex(position, CreateOption::CreateNew));
        }
    }

    // Bottom faces down, top faces up, then one quad per side
    let mut faces = Vec::with_capacity(n + 2);
    faces.push((0..n).rev().collect::<Vec<_>>());
    faces.push((n..2 * n).collect::<Vec<_>>());
    for i in 0..n {
        let j = (i + 1) % n;
        faces.push(vec![i, j, n + j, n + i]);
    }
    add_faces(mesh, &vertices, &faces);
}
