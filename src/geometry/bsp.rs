// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! BSP tree used by the CSG operations

use super::polygon::{Plane, Polygon};

/// BSP tree node; the root of a tree represents a solid
///
/// Each node splits space by `plane` (taken from the first polygon it was built
/// with) and stores the polygons lying in that plane.
#[derive(Debug, Clone, Default)]
pub struct BspNode {
    plane: Option<Plane>,
    front: Option<Box<BspNode>>,
    back: Option<Box<BspNode>>,
    polygons: Vec<Polygon>,
}

impl BspNode {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        let mut node = Self::default();
        node.build(polygons);
        node
    }

    /// Convert solid space to empty space and vice versa
    pub fn invert(&mut self) {
        for polygon in &mut self.polygons {
            polygon.flip();
        }
        if let Some(ref mut plane) = self.plane {
            plane.flip();
        }
        if let Some(ref mut front) = self.front {
            front.invert();
        }
        if let Some(ref mut back) = self.back {
            back.invert();
        }
        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// Remove the parts of `polygons` that lie inside this solid
    pub fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let Some(plane) = self.plane else {
            return polygons;
        };

        let mut front = Vec::new();
        let mut back = Vec::new();
        for polygon in &polygons {
            // Coplanar pieces follow their orientation into the same lists
            let (mut coplanar_front, mut coplanar_back) = (Vec::new(), Vec::new());
            plane.split_polygon(polygon, &mut coplanar_front, &mut coplanar_back, &mut front, &mut back);
            front.append(&mut coplanar_front);
            back.append(&mut coplanar_back);
        }

        let mut front = match self.front {
            Some(ref node) => node.clip_polygons(front),
            None => front,
        };
        let back = match self.back {
            Some(ref node) => node.clip_polygons(back),
            None => Vec::new(),
        };
        front.extend(back);
        front
    }

    /// Remove every polygon of this tree that lies inside `other`
    pub fn clip_to(&mut self, other: &BspNode) {
        self.polygons = other.clip_polygons(std::mem::take(&mut self.polygons));
        if let Some(ref mut front) = self.front {
            front.clip_to(other);
        }
        if let Some(ref mut back) = self.back {
            back.clip_to(other);
        }
    }

    /// Every polygon in the tree, node first, then front, then back
    pub fn all_polygons(&self) -> Vec<Polygon> {
        let mut result = self.polygons.clone();
        if let Some(ref front) = self.front {
            result.extend(front.all_polygons());
        }
        if let Some(ref back) = self.back {
            result.extend(back.all_polygons());
        }
        result
    }

    /// Insert `polygons`, extending the existing tree
    pub fn build(&mut self, polygons: Vec<Polygon>) {
        let Some(first) = polygons.first() else {
            return;
        };
        let plane = *self.plane.get_or_insert(first.plane);

        let mut front = Vec::new();
        let mut back = Vec::new();
        for polygon in &polygons {
            let (mut coplanar_front, mut coplanar_back) = (Vec::new(), Vec::new());
            plane.split_polygon(polygon, &mut coplanar_front, &mut coplanar_back, &mut front, &mut back);
            self.polygons.append(&mut coplanar_front);
            self.polygons.append(&mut coplanar_back);
        }
        if !front.is_empty() {
            self.front.get_or_insert_with(Box::default).build(front);
        }
        if !back.is_empty() {
            self.back.get_or_insert_with(Box::default).build(back);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn quad(points: [[f64; 3]; 4]) -> Polygon {
        Polygon::new(points.iter().map(|&[x, y, z]| Point3::new(x, y, z)).collect()).unwrap()
    }

    /// Six outward-facing quads of the axis-aligned cube [lo, hi]^3
    fn box_polygons(lo: f64, hi: f64) -> Vec<Polygon> {
        vec![
            quad([[lo, lo, hi], [hi, lo, hi], [hi, hi, hi], [lo, hi, hi]]),
            quad([[lo, lo, lo], [lo, lo, hi], [lo, hi, hi], [lo, hi, lo]]),
            quad([[hi, lo, hi], [hi, lo, lo], [hi, hi, lo], [hi, hi, hi]]),
            quad([[lo, lo, lo], [lo, hi, lo], [hi, hi, lo], [hi, lo, lo]]),
            quad([[lo, hi, hi], [hi, hi, hi], [hi, hi, lo], [lo, hi, lo]]),
            quad([[lo, lo, lo], [hi, lo, lo], [hi, lo, hi], [lo, lo, hi]]),
        ]
    }

    #[test]
    fn test_build_keeps_every_polygon() {
        let tree = BspNode::new(box_polygons(0.0, 1.0));
        assert_eq!(tree.all_polygons().len(), 6);
    }

    #[test]
    fn test_clip_removes_inside_polygons() {
        let tree = BspNode::new(box_polygons(0.0, 10.0));
        let inner = box_polygons(2.0, 3.0);
        assert!(tree.clip_polygons(inner).is_empty());

        let outer = box_polygons(20.0, 21.0);
        assert_eq!(tree.clip_polygons(outer).len(), 6);
    }

    #[test]
    fn test_invert_twice_is_identity() {
        let original = BspNode::new(box_polygons(0.0, 1.0));
        let mut tree = original.clone();
        tree.invert();
        assert_ne!(tree.all_polygons(), original.all_polygons());
        tree.invert();
        assert_eq!(tree.all_polygons(), original.all_polygons());
    }

    #[test]
    fn test_inverted_tree_keeps_inside() {
        let mut tree = BspNode::new(box_polygons(0.0, 10.0));
        tree.invert();
        assert_eq!(tree.clip_polygons(box_polygons(2.0, 3.0)).len(), 6);
        assert!(tree.clip_polygons(box_polygons(20.0, 21.0)).is_empty());
    }
}
