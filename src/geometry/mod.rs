// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh topology, editing and CSG

mod analytics;
mod bbox;
mod boolean;
mod bsp;
pub mod csg;
mod edit;
mod error;
mod ids;
mod links;
mod merge;
mod mesh;
mod polygon;
mod primitives;
mod validation;
mod vertex_pool;

pub use analytics::{analyze, is_closed, is_manifold, signed_volume, surface_area, MeshStats};
pub use bbox::BoundingBox;
pub use boolean::{perform_boolean_operation, BooleanOp};
pub use bsp::BspNode;
pub use error::{MeshError, MeshResult};
pub use ids::{EdgeId, FaceEdgeId, FaceId, VertexId};
pub use mesh::{CreateOption, FaceEdgeInfo, Mesh};
pub use polygon::{Plane, Polygon, PLANE_EPSILON};
pub use primitives::Primitive;
pub use validation::{Element, TopologyIssue};
pub use vertex_pool::VertexPool;
