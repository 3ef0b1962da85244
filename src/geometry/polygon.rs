// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Planar polygons and plane splitting for CSG

use nalgebra::{Point3, Vector3};

/// Points closer than this to a plane count as lying on it
pub const PLANE_EPSILON: f64 = 1e-5;

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

/// Oriented plane `normal · p = w`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub w: f64,
}

impl Plane {
    pub fn new(normal: Vector3<f64>, w: f64) -> Self {
        Self { normal, w }
    }

    /// Plane through `a` with the given unit normal
    pub fn from_normal_and_point(normal: Vector3<f64>, a: &Point3<f64>) -> Self {
        Self {
            normal,
            w: normal.dot(&a.coords),
        }
    }

    /// Plane through three points, `None` when they are collinear
    pub fn from_points(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<Self> {
        let normal = (b - a).cross(&(c - a)).try_normalize(f64::EPSILON)?;
        Some(Self::from_normal_and_point(normal, a))
    }

    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    /// Signed distance of `point` from the plane
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.w
    }

    fn classify(&self, point: &Point3<f64>) -> u8 {
        let t = self.signed_distance(point);
        if t < -PLANE_EPSILON {
            BACK
        } else if t > PLANE_EPSILON {
            FRONT
        } else {
            COPLANAR
        }
    }

    /// Route `polygon` relative to this plane
    ///
    /// Coplanar polygons go to `coplanar_front` or `coplanar_back` depending on
    /// whether they face the same way as the plane. Spanning polygons are cut
    /// and each piece with at least three vertices keeps the original plane.
    pub fn split_polygon(
        &self,
        polygon: &Polygon,
        coplanar_front: &mut Vec<Polygon>,
        coplanar_back: &mut Vec<Polygon>,
        front: &mut Vec<Polygon>,
        back: &mut Vec<Polygon>,
    ) {
        let types: Vec<u8> = polygon.vertices.iter().map(|v| self.classify(v)).collect();
        let polygon_type = types.iter().fold(COPLANAR, |acc, &t| acc | t);

        match polygon_type {
            COPLANAR => {
                if self.normal.dot(&polygon.plane.normal) > 0.0 {
                    coplanar_front.push(polygon.clone());
                } else {
                    coplanar_back.push(polygon.clone());
                }
            }
            FRONT => front.push(polygon.clone()),
            BACK => back.push(polygon.clone()),
            _ => {
                let n = polygon.vertices.len();
                let mut f = Vec::with_capacity(n + 1);
                let mut b = Vec::with_capacity(n + 1);
                for i in 0..n {
                    let j = (i + 1) % n;
                    let (ti, tj) = (types[i], types[j]);
                    let (vi, vj) = (polygon.vertices[i], polygon.vertices[j]);
                    if ti != BACK {
                        f.push(vi);
                    }
                    if ti != FRONT {
                        b.push(vi);
                    }
                    if ti | tj == SPANNING {
                        let t = (self.w - self.normal.dot(&vi.coords)) / self.normal.dot(&(vj - vi));
                        let v = vi + (vj - vi) * t;
                        f.push(v);
                        b.push(v);
                    }
                }
                if f.len() >= 3 {
                    front.push(Polygon::with_plane(f, polygon.plane));
                }
                if b.len() >= 3 {
                    back.push(Polygon::with_plane(b, polygon.plane));
                }
            }
        }
    }
}

/// Convex planar polygon carried through BSP clipping
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<Point3<f64>>,
    pub plane: Plane,
}

impl Polygon {
    /// Polygon whose plane comes from its first three vertices
    pub fn new(vertices: Vec<Point3<f64>>) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let plane = Plane::from_points(&vertices[0], &vertices[1], &vertices[2])?;
        Some(Self { vertices, plane })
    }

    pub fn with_plane(vertices: Vec<Point3<f64>>, plane: Plane) -> Self {
        Self { vertices, plane }
    }

    pub fn flip(&mut self) {
        self.vertices.reverse();
        self.plane.flip();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square(z: f64) -> Polygon {
        Polygon::new(vec![
            Point3::new(0.0, 0.0, z),
            Point3::new(1.0, 0.0, z),
            Point3::new(1.0, 1.0, z),
            Point3::new(0.0, 1.0, z),
        ])
        .unwrap()
    }

    #[derive(Default)]
    struct Buckets {
        cf: Vec<Polygon>,
        cb: Vec<Polygon>,
        f: Vec<Polygon>,
        b: Vec<Polygon>,
    }

    fn split(plane: &Plane, polygon: &Polygon) -> Buckets {
        let mut out = Buckets::default();
        plane.split_polygon(polygon, &mut out.cf, &mut out.cb, &mut out.f, &mut out.b);
        out
    }

    #[test]
    fn test_plane_from_points() {
        let plane = Plane::from_points(
            &Point3::new(0.0, 0.0, 2.0),
            &Point3::new(1.0, 0.0, 2.0),
            &Point3::new(0.0, 1.0, 2.0),
        )
        .unwrap();
        assert_relative_eq!(plane.normal, Vector3::z());
        assert_relative_eq!(plane.w, 2.0);
        assert!(Plane::from_points(&Point3::origin(), &Point3::new(1.0, 0.0, 0.0), &Point3::new(2.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_coplanar_routing_by_orientation() {
        let plane = Plane::new(Vector3::z(), 0.0);
        let up = unit_square(0.0);
        let mut down = up.clone();
        down.flip();

        let out = split(&plane, &up);
        assert_eq!((out.cf.len(), out.cb.len()), (1, 0));
        let out = split(&plane, &down);
        assert_eq!((out.cf.len(), out.cb.len()), (0, 1));
    }

    #[test]
    fn test_within_epsilon_is_coplanar() {
        let plane = Plane::new(Vector3::z(), 0.0);
        let out = split(&plane, &unit_square(PLANE_EPSILON / 2.0));
        assert_eq!(out.cf.len(), 1);
        let out = split(&plane, &unit_square(1.0));
        assert_eq!(out.f.len(), 1);
        let out = split(&plane, &unit_square(-1.0));
        assert_eq!(out.b.len(), 1);
    }

    #[test]
    fn test_spanning_polygon_is_cut() {
        let plane = Plane::new(Vector3::x(), 0.25);
        let out = split(&plane, &unit_square(0.0));
        assert_eq!(out.f.len(), 1);
        assert_eq!(out.b.len(), 1);
        assert_eq!(out.f[0].vertices.len(), 4);
        assert_eq!(out.b[0].vertices.len(), 4);
        assert!(out.f[0].vertices.iter().all(|v| v.x >= 0.25 - 1e-12));
        assert!(out.b[0].vertices.iter().all(|v| v.x <= 0.25 + 1e-12));
        assert_eq!(out.f[0].plane, out.b[0].plane);
    }

    #[test]
    fn test_touching_vertex_does_not_cut() {
        // Plane through one corner: the square lies entirely in front
        let plane = Plane::new(Vector3::new(1.0, 1.0, 0.0).normalize(), 0.0);
        let out = split(&plane, &unit_square(0.0));
        assert_eq!(out.f.len(), 1);
        assert!(out.b.is_empty());
    }
}
