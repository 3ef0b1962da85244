// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CSG (Constructive Solid Geometry) operations using BSP trees
//!
//! Both operands are flattened to planar polygons, clipped against each other's
//! BSP tree and the surviving fragments are replayed into a fresh mesh which is
//! then welded with the mesh tolerance.

use super::bsp::BspNode;
use super::mesh::polygon_normal;
use super::polygon::{Plane, Polygon};
use super::{CreateOption, Mesh, MeshError, MeshResult, VertexId};
use crate::config::MeshConfig;
use nalgebra::Point3;

/// One polygon per live face, in face creation order
///
/// Vertices start at each face's first face-edge and the plane is taken from
/// the first three of them.
pub fn polygons_from_mesh(mesh: &Mesh) -> Vec<Polygon> {
    let mut polygons = Vec::with_capacity(mesh.face_count());
    for face in mesh.faces() {
        let vertices: Vec<Point3<f64>> = mesh
            .face_loop(face)
            .into_iter()
            .map(|fe| mesh.vert(mesh.fe(fe).start).position)
            .collect();
        let normal = polygon_normal(&vertices).unwrap_or(mesh.face(face).normal);
        let plane = Plane::from_normal_and_point(normal, &vertices[0]);
        polygons.push(Polygon::with_plane(vertices, plane));
    }
    polygons
}

/// Rebuild a welded mesh from a polygon soup
///
/// Every fragment gets its own vertices and edges, then coincident vertices and
/// parallel edges are merged. Fragments that collapse below three distinct
/// points within `config.tolerance` are dropped.
pub fn mesh_from_polygons(polygons: &[Polygon], config: MeshConfig) -> Mesh {
    let mut mesh = Mesh::with_config(config);
    let tolerance = config.tolerance;

    for polygon in polygons {
        let mut points: Vec<Point3<f64>> = Vec::with_capacity(polygon.vertices.len());
        for &p in &polygon.vertices {
            if points.last().map_or(true, |last| (p - last).norm() > tolerance) {
                points.push(p);
            }
        }
        while points.len() > 1 && (points[0] - points[points.len() - 1]).norm() <= tolerance {
            points.pop();
        }
        if points.len() < 3 {
            tracing::debug!(vertices = points.len(), "dropping collapsed fragment");
            continue;
        }

        let vertices: Vec<VertexId> = points
            .iter()
            .map(|&p| mesh.create_vertex(p, CreateOption::CreateNew))
            .collect();
        if let Err(err) = mesh.create_face_with_normal(&vertices, CreateOption::CreateNew, polygon.plane.normal) {
            tracing::warn!(%err, "dropping degenerate fragment");
        }
    }

    let vertices_merged = mesh.merge_all_vertices();
    let edges_merged = mesh.merge_mesh_edges();
    tracing::debug!(
        fragments = polygons.len(),
        faces = mesh.face_count(),
        vertices_merged,
        edges_merged,
        "rebuilt mesh from polygons"
    );
    mesh
}

/// Reject inputs the polygon conversion cannot represent faithfully
///
/// Only non-manifold edges (more than two faces) are detected. Self-intersecting
/// operands are not supported either, but they pass this check and produce an
/// unspecified result.
fn check_supported(mesh: &Mesh, operand: &str) -> MeshResult<()> {
    if let Some(edge) = mesh.edges().find(|&e| mesh.radial(e).len() > 2) {
        return Err(MeshError::Unsupported(format!(
            "{operand} operand: {edge} is shared by {} faces",
            mesh.radial(edge).len()
        )));
    }
    Ok(())
}

fn trees(a: &Mesh, b: &Mesh) -> MeshResult<(BspNode, BspNode)> {
    check_supported(a, "first")?;
    check_supported(b, "second")?;
    Ok((
        BspNode::new(polygons_from_mesh(a)),
        BspNode::new(polygons_from_mesh(b)),
    ))
}

/// Welded copy of `mesh`, used when the other operand is empty
fn rebuild(mesh: &Mesh, config: MeshConfig) -> Mesh {
    mesh_from_polygons(&polygons_from_mesh(mesh), config)
}

/// Everything inside `a` or `b`
pub fn union(a: &Mesh, b: &Mesh) -> MeshResult<Mesh> {
    let (mut ta, mut tb) = trees(a, b)?;
    // A planeless tree clips nothing, so empty operands are settled up front
    if b.face_count() == 0 {
        return Ok(rebuild(a, a.config));
    }
    if a.face_count() == 0 {
        return Ok(rebuild(b, a.config));
    }
    ta.clip_to(&tb);
    tb.clip_to(&ta);
    tb.invert();
    tb.clip_to(&ta);
    tb.invert();
    ta.build(tb.all_polygons());
    Ok(mesh_from_polygons(&ta.all_polygons(), a.config))
}

/// Everything inside both `a` and `b`
pub fn intersect(a: &Mesh, b: &Mesh) -> MeshResult<Mesh> {
    let (mut ta, mut tb) = trees(a, b)?;
    if a.face_count() == 0 || b.face_count() == 0 {
        return Ok(Mesh::with_config(a.config));
    }
    ta.invert();
    tb.clip_to(&ta);
    tb.invert();
    ta.clip_to(&tb);
    tb.clip_to(&ta);
    ta.build(tb.all_polygons());
    ta.invert();
    Ok(mesh_from_polygons(&ta.all_polygons(), a.config))
}

/// Everything inside `a` but not inside `b`
pub fn subtract(a: &Mesh, b: &Mesh) -> MeshResult<Mesh> {
    let (mut ta, mut tb) = trees(a, b)?;
    if a.face_count() == 0 {
        return Ok(Mesh::with_config(a.config));
    }
    if b.face_count() == 0 {
        return Ok(rebuild(a, a.config));
    }
    ta.invert();
    ta.clip_to(&tb);
    tb.clip_to(&ta);
    tb.invert();
    tb.clip_to(&ta);
    tb.invert();
    ta.build(tb.all_polygons());
    ta.invert();
    Ok(mesh_from_polygons(&ta.all_polygons(), a.config))
}
