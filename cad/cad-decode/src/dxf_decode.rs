//! DXF decoding via the `dxf` crate.
//!
//! DXF drawings describe wire geometry. LINE, POLYLINE, and LWPOLYLINE
//! entities become line-strip meshes (ordered position buffers, no faces);
//! ARC and CIRCLE entities are tessellated the same way. Everything else is
//! ignored without failing the file.

use cad_mesh::{MeshSet, MetadataBag, Point3, TriMesh};
use dxf::entities::EntityType;
use dxf::Drawing;
use tracing::debug;

use crate::error::{DecodeError, DecodeResult};

/// Segments used when flattening a full circle.
const CIRCLE_SEGMENTS: usize = 64;
/// Segments used when flattening an arc.
const ARC_SEGMENTS: usize = 48;

/// Decode DXF bytes into line-strip meshes.
pub fn decode_dxf(bytes: &[u8]) -> DecodeResult<(MeshSet, MetadataBag)> {
    let mut reader = std::io::Cursor::new(bytes);
    let drawing = Drawing::load(&mut reader)
        .map_err(|e| DecodeError::failure(format!("DXF parse: {e}")))?;

    let meshes = meshes_from_drawing(&drawing);
    debug!(meshes = meshes.len(), "DXF entity walk complete");

    // DXF rarely states units reliably; the resolver falls back to
    // geometry-magnitude estimation.
    Ok((meshes, MetadataBag::default()))
}

/// Walk a drawing's entities and synthesize line-strip meshes.
pub(crate) fn meshes_from_drawing(drawing: &Drawing) -> MeshSet {
    let mut meshes = MeshSet::new();

    for entity in drawing.entities() {
        match &entity.specific {
            EntityType::Line(line) => {
                meshes.push(TriMesh::from_positions(vec![
                    Point3::new(line.p1.x, line.p1.y, line.p1.z),
                    Point3::new(line.p2.x, line.p2.y, line.p2.z),
                ]));
            }
            EntityType::LwPolyline(poly) => {
                let mut points: Vec<Point3<f64>> = poly
                    .vertices
                    .iter()
                    .map(|v| Point3::new(v.x, v.y, 0.0))
                    .collect();
                if poly.get_is_closed() {
                    if let Some(first) = points.first().copied() {
                        points.push(first);
                    }
                }
                push_strip(&mut meshes, points);
            }
            EntityType::Polyline(poly) => {
                let points: Vec<Point3<f64>> = poly
                    .vertices()
                    .map(|v| Point3::new(v.location.x, v.location.y, v.location.z))
                    .collect();
                push_strip(&mut meshes, points);
            }
            EntityType::Arc(arc) => {
                let start = arc.start_angle.to_radians();
                let mut end = arc.end_angle.to_radians();
                if end < start {
                    end += std::f64::consts::TAU;
                }
                let points = sweep_circle(
                    Point3::new(arc.center.x, arc.center.y, arc.center.z),
                    arc.radius,
                    start,
                    end,
                    ARC_SEGMENTS,
                );
                push_strip(&mut meshes, points);
            }
            EntityType::Circle(circle) => {
                let points = sweep_circle(
                    Point3::new(circle.center.x, circle.center.y, circle.center.z),
                    circle.radius,
                    0.0,
                    std::f64::consts::TAU,
                    CIRCLE_SEGMENTS,
                );
                push_strip(&mut meshes, points);
            }
            // Unsupported entities are skipped without failing the file.
            _ => {}
        }
    }

    meshes
}

fn push_strip(meshes: &mut MeshSet, points: Vec<Point3<f64>>) {
    if points.len() >= 2 {
        meshes.push(TriMesh::from_positions(points));
    }
}

fn sweep_circle(
    center: Point3<f64>,
    radius: f64,
    start: f64,
    end: f64,
    segments: usize,
) -> Vec<Point3<f64>> {
    if !radius.is_finite() || radius <= 0.0 {
        return Vec::new();
    }
    (0..=segments)
        .map(|i| {
            let t = i as f64 / segments as f64;
            let a = start + (end - start) * t;
            Point3::new(
                radius.mul_add(a.cos(), center.x),
                radius.mul_add(a.sin(), center.y),
                center.z,
            )
        })
        .collect()
}
