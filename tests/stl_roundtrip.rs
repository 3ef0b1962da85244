// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL export followed by import

mod common;

use anyhow::Result;
use approx::assert_relative_eq;
use nalgebra::Point3;
use polyframe_mesh::geometry::{analyze, csg, is_closed, signed_volume};
use polyframe_mesh::{io, MeshConfig, OutputSettings, Primitive, StlFormat};
use tempfile::tempdir;

#[test]
fn test_both_formats_load_back() -> Result<()> {
    let dir = tempdir()?;
    let mesh = Primitive::prism(3.0, 2.0, 6).to_mesh();

    for (name, format) in [("binary.stl", StlFormat::Binary), ("ascii.stl", StlFormat::Ascii)] {
        let path = dir.path().join(name);
        io::save(&mesh, &path, &OutputSettings { format })?;

        let loaded = io::load(&path)?;
        assert_eq!(loaded.vertex_count(), mesh.vertex_count(), "{name}");
        assert!(is_closed(&loaded), "{name}");
        assert_relative_eq!(signed_volume(&loaded), signed_volume(&mesh), epsilon = 1e-4);
        loaded.validate()?;
        common::assert_radial_counts(&loaded);
    }
    Ok(())
}

#[test]
fn test_boolean_result_survives_roundtrip() -> Result<()> {
    let dir = tempdir()?;
    let a = Primitive::cube(10.0, Point3::new(-2.0, 0.0, 0.0)).to_mesh();
    let b = Primitive::cube(10.0, Point3::new(2.0, 0.0, 0.0)).to_mesh();
    let a_path = dir.path().join("a.stl");
    let b_path = dir.path().join("b.stl");
    io::save(&a, &a_path, &OutputSettings::default())?;
    io::save(&b, &b_path, &OutputSettings::default())?;

    let union = polyframe_mesh::boolean_files(
        &a_path,
        &b_path,
        polyframe_mesh::BooleanOp::Union,
        MeshConfig::default(),
    )?;
    assert_relative_eq!(signed_volume(&union), 1400.0, epsilon = 1e-3);

    let out = dir.path().join("union.stl");
    io::save(&union, &out, &OutputSettings::default())?;
    let reloaded = io::load(&out)?;
    assert_relative_eq!(signed_volume(&reloaded), 1400.0, epsilon = 1e-3);

    // Fragment corners sit on neighbouring faces' edges, so the union has open
    // T-junction seams; fanning faces into facets must not add or close any
    let before = analyze(&union);
    let after = analyze(&reloaded);
    assert_eq!(after.vertex_count, before.vertex_count);
    assert_eq!(after.boundary_edges, before.boundary_edges);
    assert_eq!(after.non_manifold_edges, 0);
    reloaded.validate()?;
    Ok(())
}

#[test]
fn test_loaded_meshes_are_editable() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("cube.stl");
    io::save(&Primitive::cube(4.0, Point3::origin()).to_mesh(), &path, &OutputSettings::default())?;

    let mut mesh = io::load_with_config(&path, MeshConfig::with_tolerance(1e-4))?;
    assert_eq!(mesh.tolerance(), 1e-4);
    let before = common::counts(&mesh);
    let edge = mesh.edges().next().expect("loaded edge");
    let (vertex, _) = mesh.split_mesh_edge(edge, None)?;
    mesh.unsplit_mesh_edge(edge, vertex)?;
    assert_eq!(common::counts(&mesh), before);

    let sliced = csg::subtract(&mesh, &Primitive::cube(4.0, Point3::new(2.0, 0.0, 0.0)).to_mesh())?;
    assert_relative_eq!(signed_volume(&sliced), 32.0, epsilon = 1e-4);
    mesh.validate()?;
    Ok(())
}

#[test]
fn test_missing_input_is_reported_with_path() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.stl");
    let err = polyframe_mesh::boolean_files(
        &missing,
        &missing,
        polyframe_mesh::BooleanOp::Intersection,
        MeshConfig::default(),
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("nope.stl"));
}
