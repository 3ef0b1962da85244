// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL facet-list import and export
//!
//! Faces are written as triangle fans from their first vertex. Loading creates
//! one triangular face per facet, welding vertices within the mesh tolerance.

use crate::config::MeshConfig;
use crate::geometry::{CreateOption, Mesh, VertexId};
use anyhow::{Context, Result};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StlFormat {
    Ascii,
    #[default]
    Binary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    pub format: StlFormat,
}

/// Write `mesh` to an STL file
pub fn save<P: AsRef<Path>>(mesh: &Mesh, path: P, settings: &OutputSettings) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create STL file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    match settings.format {
        StlFormat::Binary => write_binary(mesh, &mut writer),
        StlFormat::Ascii => write_ascii(mesh, &mut writer),
    }
    .with_context(|| format!("Failed to write STL file: {}", path.display()))?;
    writer.flush().context("Failed to flush STL file")?;
    tracing::debug!(path = %path.display(), faces = mesh.face_count(), "saved STL");
    Ok(())
}

/// Read an ASCII or binary STL file with the default configuration
pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    load_with_config(path, MeshConfig::default())
}

pub fn load_with_config<P: AsRef<Path>>(path: P, config: MeshConfig) -> Result<Mesh> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open STL file: {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let stl = stl_io::read_stl(&mut reader)
        .with_context(|| format!("Failed to parse STL file: {}", path.display()))?;

    let mut mesh = Mesh::with_config(config);
    let vertices: Vec<VertexId> = stl
        .vertices
        .iter()
        .map(|v| {
            let position = Point3::new(v[0] as f64, v[1] as f64, v[2] as f64);
            mesh.create_vertex(position, CreateOption::ReuseExisting)
        })
        .collect();

    let mut skipped = 0usize;
    for facet in &stl.faces {
        let corners = facet.vertices.map(|i| vertices[i]);
        if let Err(err) = mesh.create_face(&corners, CreateOption::ReuseExisting) {
            tracing::debug!(%err, "skipping degenerate facet");
            skipped += 1;
        }
    }
    if skipped > 0 {
        tracing::warn!(skipped, path = %path.display(), "degenerate facets were skipped");
    }
    tracing::debug!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "loaded STL"
    );
    Ok(mesh)
}

fn write_binary<W: Write>(mesh: &Mesh, writer: &mut W) -> Result<()> {
    use stl_io::{Normal, Triangle, Vertex};

    let to_f32 = |p: &Point3<f64>| [p.x as f32, p.y as f32, p.z as f32];
    let triangles: Vec<Triangle> = mesh
        .triangles()
        .into_iter()
        .map(|(corners, normal)| Triangle {
            normal: Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
            vertices: corners.map(|p| Vertex::new(to_f32(&p))),
        })
        .collect();
    stl_io::write_stl(writer, triangles.iter())?;
    Ok(())
}

fn write_ascii<W: Write>(mesh: &Mesh, writer: &mut W) -> Result<()> {
    writeln!(writer, "solid mesh")?;
    for ([a, b, c], normal) in mesh.triangles() {
        writeln!(writer, "  facet normal {} {} {}", normal.x, normal.y, normal.z)?;
        writeln!(writer, "    outer loop")?;
        for p in [a, b, c] {
            writeln!(writer, "      vertex {} {} {}", p.x, p.y, p.z)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid mesh")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use tempfile::NamedTempFile;

    #[test]
    fn test_save_binary_and_load() -> Result<()> {
        let mesh = Primitive::cube(10.0, Point3::origin()).to_mesh();
        let file = NamedTempFile::new()?;
        save(&mesh, file.path(), &OutputSettings::default())?;

        let loaded = load(file.path())?;
        assert_eq!(loaded.vertex_count(), 8);
        assert_eq!(loaded.face_count(), 12);
        assert_eq!(loaded.edge_count(), 18);
        loaded.validate()?;
        Ok(())
    }

    #[test]
    fn test_ascii_output_layout() -> Result<()> {
        let mesh = Primitive::cube(2.0, Point3::origin()).to_mesh();
        let file = NamedTempFile::new()?;
        save(&mesh, file.path(), &OutputSettings { format: StlFormat::Ascii })?;

        let text = std::fs::read_to_string(file.path())?;
        assert!(text.starts_with("solid mesh"));
        assert_eq!(text.matches("facet normal").count(), 12);
        assert!(text.trim_end().ends_with("endsolid mesh"));
        Ok(())
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = load("/nonexistent/definitely/missing.stl").unwrap_err();
        assert!(format!("{err:#}").contains("Failed to open STL file"));
    }
}
