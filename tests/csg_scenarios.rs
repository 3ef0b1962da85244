// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CSG booleans on overlapping and disjoint cubes

mod common;

use anyhow::Result;
use approx::assert_relative_eq;
use nalgebra::Point3;
use polyframe_mesh::geometry::{analyze, csg, signed_volume};
use polyframe_mesh::{BooleanOp, Mesh, Primitive};

const TOL: f64 = 1e-6;

fn cube_at(x: f64, y: f64, z: f64) -> Mesh {
    Primitive::cube(10.0, Point3::new(x, y, z)).to_mesh()
}

fn close_to_any(value: f64, candidates: &[f64]) -> bool {
    candidates.iter().any(|c| (value - c).abs() < TOL)
}

#[test]
fn test_intersect_overlapping_cubes() -> Result<()> {
    let a = cube_at(-2.0, -2.0, -2.0);
    let b = cube_at(2.0, 2.0, 2.0);
    let result = csg::intersect(&a, &b)?;

    assert_eq!(result.face_count(), 6);
    assert_eq!(result.vertex_count(), 8);
    for p in result.positions() {
        for c in [p.x, p.y, p.z] {
            assert!(close_to_any(c.abs(), &[3.0]), "unexpected coordinate {c}");
        }
    }
    assert_relative_eq!(signed_volume(&result), 216.0, epsilon = 1e-6);
    result.validate()?;
    common::assert_radial_counts(&result);
    Ok(())
}

#[test]
fn test_intersect_disjoint_cubes_is_empty() -> Result<()> {
    let a = cube_at(-5.0, -5.0, -5.0);
    let b = cube_at(5.0, 5.0, 5.0);
    let result = csg::intersect(&a, &b)?;
    assert_eq!(result.face_count(), 0);
    result.validate()?;
    Ok(())
}

#[test]
fn test_union_of_shifted_cubes() -> Result<()> {
    let a = cube_at(-2.0, 0.0, 0.0);
    let b = cube_at(2.0, 0.0, 0.0);
    let result = csg::union(&a, &b)?;

    assert_eq!(result.face_count(), 13);
    assert_eq!(result.vertex_count(), 16);
    for p in result.positions() {
        assert!(close_to_any(p.x.abs(), &[3.0, 7.0]), "unexpected x {}", p.x);
        assert!(close_to_any(p.y.abs(), &[5.0]), "unexpected y {}", p.y);
        assert!(close_to_any(p.z.abs(), &[5.0]), "unexpected z {}", p.z);
    }
    assert_relative_eq!(signed_volume(&result), 1400.0, epsilon = 1e-6);
    result.validate()?;
    common::assert_radial_counts(&result);
    Ok(())
}

#[test]
fn test_subtract_shifted_cubes() -> Result<()> {
    let a = cube_at(-2.0, 0.0, 0.0);
    let b = cube_at(2.0, 0.0, 0.0);
    let result = csg::subtract(&a, &b)?;

    assert_eq!(result.face_count(), 6);
    assert_eq!(result.vertex_count(), 8);
    for p in result.positions() {
        assert!(close_to_any(p.x, &[-7.0, -3.0]), "unexpected x {}", p.x);
    }
    assert_relative_eq!(signed_volume(&result), 400.0, epsilon = 1e-6);

    let stats = analyze(&result);
    assert!(stats.is_closed);
    assert!(stats.is_manifold);
    result.validate()?;
    Ok(())
}

#[test]
fn test_boolean_operation_method() -> Result<()> {
    let a = cube_at(-2.0, 0.0, 0.0);
    let b = cube_at(2.0, 0.0, 0.0);
    let union = a.boolean_operation(&b, BooleanOp::Union)?;
    let difference = a.boolean_operation(&b, BooleanOp::Difference)?;
    let intersection = a.boolean_operation(&b, BooleanOp::Intersection)?;

    // |A ∪ B| = |A − B| + |A ∩ B| + |B − A|
    let reverse = b.boolean_operation(&a, BooleanOp::Difference)?;
    assert_relative_eq!(
        signed_volume(&union),
        signed_volume(&difference) + signed_volume(&intersection) + signed_volume(&reverse),
        epsilon = 1e-6
    );
    assert_relative_eq!(signed_volume(&intersection), 600.0, epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_results_can_be_chained() -> Result<()> {
    let a = cube_at(-2.0, 0.0, 0.0);
    let b = cube_at(2.0, 0.0, 0.0);
    let union = csg::union(&a, &b)?;

    let cutter = Primitive::cube(4.0, Point3::new(0.0, 0.0, 5.0)).to_mesh();
    let notched = csg::subtract(&union, &cutter)?;
    assert_relative_eq!(signed_volume(&notched), 1400.0 - 32.0, epsilon = 1e-6);
    notched.validate()?;
    Ok(())
}

#[test]
fn test_result_uses_first_operand_tolerance() -> Result<()> {
    let config = polyframe_mesh::MeshConfig::with_tolerance(1e-3);
    let a = Primitive::cube(10.0, Point3::origin()).to_mesh_with_config(config);
    let b = cube_at(20.0, 0.0, 0.0);
    let result = csg::union(&a, &b)?;
    assert_eq!(result.tolerance(), 1e-3);
    assert_eq!(result.face_count(), 12);
    Ok(())
}
