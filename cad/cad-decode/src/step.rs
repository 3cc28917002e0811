//! STEP (ISO 10303-21) decoding via the truck CAD kernel.
//!
//! STEP files carry B-rep geometry. The truck kernel parses the exchange
//! structure and tessellates each shell; this module adapts its polygon
//! meshes into [`TriMesh`]es, one per shell, preserving file order.

use cad_mesh::{MeshSet, MetadataBag, TriMesh};
use tracing::{debug, warn};
use truck_meshalgo::prelude::*;
use truck_polymesh::PolygonMesh;
use truck_stepio::r#in::Table;

use crate::error::{DecodeError, DecodeResult};

/// Decode STEP bytes into one mesh per successfully tessellated shell.
///
/// Tessellation runs twice: a coarse pass to size the geometry, then a fine
/// pass with a tolerance scaled to the bounding-box diameter. Shells that
/// fail to convert are skipped; the file only fails when no shell survives.
pub fn decode_step(bytes: &[u8]) -> DecodeResult<(MeshSet, MetadataBag)> {
    let text = String::from_utf8_lossy(bytes);

    let exchange = truck_stepio::r#in::ruststep::parser::parse(&text)
        .map_err(|e| DecodeError::failure(format!("STEP parse: {e}")))?;

    let Some(data) = exchange.data.first() else {
        return Err(DecodeError::failure("STEP file has no data section"));
    };

    let table = Table::from_data_section(data);

    let mut meshes = MeshSet::new();
    let mut skipped = 0_usize;
    for shell_holder in table.shell.values() {
        let Ok(shell) = table.to_compressed_shell(shell_holder) else {
            skipped += 1;
            continue;
        };

        // Coarse pass to learn the scale, fine pass at a proportional tolerance.
        let coarse = shell.robust_triangulation(0.01).to_polygon();
        let tolerance = (coarse.bounding_box().diameter() * 0.001).max(1e-6);
        let fine = shell.robust_triangulation(tolerance).to_polygon();

        let mesh = polygon_to_trimesh(&fine);
        if mesh.positions.is_empty() {
            skipped += 1;
            continue;
        }
        meshes.push(mesh);
    }

    if skipped > 0 {
        warn!(skipped, "some STEP shells failed to tessellate");
    }

    if meshes.is_empty_geometry() {
        return Err(DecodeError::failure(
            "STEP file yielded no tessellatable geometry",
        ));
    }

    debug!(shells = meshes.len(), "STEP tessellation complete");

    // Unit information in STEP lives in the header, which the unit resolver
    // scans from the raw prefix; nothing to report here.
    Ok((meshes, MetadataBag::default()))
}

/// Flatten a truck polygon mesh (tris and quads) into a [`TriMesh`].
#[allow(clippy::cast_possible_truncation)]
fn polygon_to_trimesh(poly: &PolygonMesh) -> TriMesh {
    let mut coords = Vec::with_capacity(poly.positions().len() * 3);
    for p in poly.positions() {
        coords.extend_from_slice(&[p.x, p.y, p.z]);
    }

    let mut indices = Vec::with_capacity(poly.tri_faces().len() * 3);
    for face in poly.tri_faces() {
        indices.extend_from_slice(&[
            face[0].pos as u32,
            face[1].pos as u32,
            face[2].pos as u32,
        ]);
    }
    // Quads split along the 0-2 diagonal.
    for quad in poly.quad_faces() {
        indices.extend_from_slice(&[
            quad[0].pos as u32,
            quad[1].pos as u32,
            quad[2].pos as u32,
        ]);
        indices.extend_from_slice(&[
            quad[0].pos as u32,
            quad[2].pos as u32,
            quad[3].pos as u32,
        ]);
    }

    TriMesh::from_raw(&coords, Some(&indices))
}
