//! Core geometry types for tube analysis.
//!
//! This crate provides the in-memory representation of decoded CAD geometry:
//!
//! - [`TriMesh`] - A triangle mesh with optional indices and per-vertex normals
//! - [`MeshSet`] - The ordered set of meshes decoded from one file
//! - [`MetadataBag`] - Loose metadata reported alongside the geometry
//! - [`Aabb`] - Axis-aligned bounding box with slenderness helpers
//!
//! # Units
//!
//! All coordinates are `f64` in the units the source file was authored in.
//! Unit detection and conversion live in `cad-units`; nothing in this crate
//! rescales geometry implicitly.
//!
//! # Example
//!
//! ```
//! use cad_mesh::{TriMesh, MeshSet, Point3};
//!
//! let mesh = TriMesh::from_raw(&[0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 5.0, 0.0], Some(&[0, 1, 2]));
//! assert_eq!(mesh.vertex_count(), 3);
//! assert_eq!(mesh.triangle_count(), 1);
//!
//! let mut set = MeshSet::new();
//! set.push(mesh);
//! assert!(!set.is_empty_geometry());
//! assert!((set.bounds().max_extent() - 10.0).abs() < 1e-12);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod bounds;
mod mesh;
mod meshset;
mod metadata;

pub use bounds::Aabb;
pub use mesh::TriMesh;
pub use meshset::MeshSet;
pub use metadata::MetadataBag;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
