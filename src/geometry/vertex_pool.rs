// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Spatial hash over vertex positions
//!
//! Space is divided into cubic cells of a fixed size. A query for all vertices
//! within `tolerance` of a point visits the cells overlapping the query sphere's
//! bounding cube and compares exact distances only against their occupants.

use super::VertexId;
use ahash::AHashMap;
use nalgebra::Point3;

type CellKey = (i64, i64, i64);

/// Beyond this many cells per axis a query scans every entry instead
const MAX_CELL_RADIUS: i64 = 4;

#[derive(Debug, Clone)]
pub struct VertexPool {
    cell_size: f64,
    cells: AHashMap<CellKey, Vec<(VertexId, Point3<f64>)>>,
    locations: AHashMap<VertexId, CellKey>,
}

impl VertexPool {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            cells: AHashMap::new(),
            locations: AHashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    #[inline]
    fn cell_of(&self, position: &Point3<f64>) -> CellKey {
        let discretize = |v: f64| (v / self.cell_size).floor() as i64;
        (
            discretize(position.x),
            discretize(position.y),
            discretize(position.z),
        )
    }

    /// Index `vertex` at `position`; re-adding a vertex moves it
    pub fn add(&mut self, vertex: VertexId, position: Point3<f64>) {
        self.remove(vertex);
        let key = self.cell_of(&position);
        self.cells.entry(key).or_default().push((vertex, position));
        self.locations.insert(vertex, key);
    }

    /// Drop `vertex` from the index, returning whether it was present
    pub fn remove(&mut self, vertex: VertexId) -> bool {
        let Some(key) = self.locations.remove(&vertex) else {
            return false;
        };
        if let Some(bucket) = self.cells.get_mut(&key) {
            bucket.retain(|(id, _)| *id != vertex);
            if bucket.is_empty() {
                self.cells.remove(&key);
            }
        }
        true
    }

    pub fn contains_vertex(&self, vertex: VertexId) -> bool {
        self.locations.contains_key(&vertex)
    }

    /// All vertices within `tolerance` (inclusive) of `position`, in handle order
    pub fn find_vertices(&self, position: &Point3<f64>, tolerance: f64) -> Vec<VertexId> {
        let tolerance = tolerance.max(0.0);
        let radius = (tolerance / self.cell_size).ceil() as i64;
        let mut found = Vec::new();

        if radius > MAX_CELL_RADIUS {
            for bucket in self.cells.values() {
                Self::collect_close(bucket, position, tolerance, &mut found);
            }
        } else {
            let (cx, cy, cz) = self.cell_of(position);
            for dx in -radius..=radius {
                for dy in -radius..=radius {
                    for dz in -radius..=radius {
                        if let Some(bucket) = self.cells.get(&(cx + dx, cy + dy, cz + dz)) {
                            Self::collect_close(bucket, position, tolerance, &mut found);
                        }
                    }
                }
            }
        }

        found.sort_unstable();
        found
    }

    fn collect_close(
        bucket: &[(VertexId, Point3<f64>)],
        position: &Point3<f64>,
        tolerance: f64,
        found: &mut Vec<VertexId>,
    ) {
        found.extend(
            bucket
                .iter()
                .filter(|(_, p)| (p - position).norm() <= tolerance)
                .map(|(id, _)| *id),
        );
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.locations.clear();
    }
}
