//! IGES decoding.
//!
//! IGES files are fixed 80-column records. Column 73 carries the section
//! code (S/G/D/P/T), columns 74-80 a sequence number. Directory (D) entries
//! come in pairs and point into the parameter data (P) section.
//!
//! Supported entities:
//!
//! - 110 line -> two-point strip
//! - 100 circular arc -> tessellated strip
//! - 126 rational B-spline curve -> sampled strip
//! - 128 rational B-spline surface -> sampled triangle grid
//!
//! Unsupported entities are skipped without failing the file. The global
//! section's unit flag is surfaced through the metadata bag.

use cad_mesh::{MeshSet, MetadataBag, Point3, TriMesh};
use tracing::{debug, warn};

use crate::error::{DecodeError, DecodeResult};

/// Samples taken along a B-spline curve.
const CURVE_SAMPLES: usize = 100;
/// Samples per direction on a B-spline surface.
const SURFACE_SAMPLES: usize = 24;
/// Segments used when flattening a circular arc.
const ARC_SEGMENTS: usize = 48;

/// Decode IGES bytes into meshes plus unit metadata.
pub fn decode_iges(bytes: &[u8]) -> DecodeResult<(MeshSet, MetadataBag)> {
    let text = String::from_utf8_lossy(bytes);

    let mut global = String::new();
    let mut directory: Vec<String> = Vec::new();
    let mut parameters: Vec<String> = Vec::new();

    for line in text.lines() {
        if line.len() < 73 {
            continue;
        }
        // Lossy decoding can leave multibyte replacement chars in garbage
        // input; clip on char boundaries rather than byte offsets.
        let section = line.as_bytes()[72];
        match section {
            b'G' => global.push_str(clip(line, 72)),
            b'D' => directory.push(clip(line, 72).to_string()),
            // Parameter data: columns 1-64, the DE back-pointer sits in 65-72.
            b'P' => parameters.push(clip(line, 64).to_string()),
            _ => {}
        }
    }

    if directory.is_empty() || parameters.is_empty() {
        return Err(DecodeError::failure(
            "IGES file has no directory or parameter section",
        ));
    }

    let metadata = global_metadata(&global);

    let mut meshes = MeshSet::new();
    let mut skipped = 0_usize;
    for pair in directory.chunks_exact(2) {
        let Some((entity_type, pointer)) = directory_entry(&pair[0]) else {
            continue;
        };
        let params = entity_params(&parameters, pointer);
        match build_entity(entity_type, &params) {
            Some(mesh) if !mesh.positions.is_empty() => meshes.push(mesh),
            Some(_) => {}
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(skipped, "skipped unsupported or malformed IGES entities");
    }

    if meshes.is_empty_geometry() {
        return Err(DecodeError::failure(
            "IGES file contained no supported geometry",
        ));
    }

    debug!(meshes = meshes.len(), "IGES decode complete");
    Ok((meshes, metadata))
}

/// Entity type and parameter-data pointer from the first directory line.
fn directory_entry(line: &str) -> Option<(i32, usize)> {
    let entity_type: i32 = field(line, 0)?.parse().ok()?;
    let pointer: usize = field(line, 1)?.parse().ok()?;
    if pointer == 0 {
        return None;
    }
    Some((entity_type, pointer))
}

/// Truncate to `end` bytes, backing off to the nearest char boundary.
fn clip(line: &str, end: usize) -> &str {
    let mut end = end.min(line.len());
    while end > 0 && !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}

/// One of the eight-column fields of a directory line.
fn field(line: &str, index: usize) -> Option<&str> {
    let start = index * 8;
    let end = (start + 8).min(line.len());
    let f = line.get(start..end)?.trim();
    if f.is_empty() { None } else { Some(f) }
}

/// Collect an entity's parameters starting at a 1-based P-section pointer.
///
/// Records run to the `;` terminator; parameters split on `,`. IGES permits
/// `D` exponents in floats, which are rewritten to `E` before parsing.
fn entity_params(parameters: &[String], pointer: usize) -> Vec<f64> {
    let mut record = String::new();
    for line in parameters.iter().skip(pointer.saturating_sub(1)) {
        match line.find(';') {
            Some(end) => {
                record.push_str(&line[..end]);
                break;
            }
            None => record.push_str(line),
        }
    }

    record
        .split(',')
        .filter_map(|p| {
            let p = p.trim().replace(['D', 'd'], "E");
            p.parse::<f64>().ok()
        })
        .collect()
}

/// Build a mesh for a supported entity; `None` marks a skip.
fn build_entity(entity_type: i32, p: &[f64]) -> Option<TriMesh> {
    match entity_type {
        110 => line_entity(p),
        100 => arc_entity(p),
        126 => bspline_curve_entity(p),
        128 => bspline_surface_entity(p),
        _ => None,
    }
}

/// Entity 110: line from (x1,y1,z1) to (x2,y2,z2).
fn line_entity(p: &[f64]) -> Option<TriMesh> {
    if p.len() < 7 {
        return None;
    }
    Some(TriMesh::from_positions(vec![
        Point3::new(p[1], p[2], p[3]),
        Point3::new(p[4], p[5], p[6]),
    ]))
}

/// Entity 100: circular arc in the plane z = zt, counterclockwise from the
/// start point to the terminate point.
fn arc_entity(p: &[f64]) -> Option<TriMesh> {
    if p.len() < 8 {
        return None;
    }
    let (zt, cx, cy) = (p[1], p[2], p[3]);
    let (sx, sy) = (p[4], p[5]);
    let (ex, ey) = (p[6], p[7]);

    let radius = ((sx - cx).powi(2) + (sy - cy).powi(2)).sqrt();
    if !radius.is_finite() || radius <= 0.0 {
        return None;
    }
    let a0 = (sy - cy).atan2(sx - cx);
    let mut a1 = (ey - cy).atan2(ex - cx);
    if a1 <= a0 {
        a1 += std::f64::consts::TAU;
    }

    let points = (0..=ARC_SEGMENTS)
        .map(|i| {
            let a = a0 + (a1 - a0) * (i as f64 / ARC_SEGMENTS as f64);
            Point3::new(
                radius.mul_add(a.cos(), cx),
                radius.mul_add(a.sin(), cy),
                zt,
            )
        })
        .collect();
    Some(TriMesh::from_positions(points))
}

/// Entity 126: rational B-spline curve, sampled uniformly in parameter.
fn bspline_curve_entity(p: &[f64]) -> Option<TriMesh> {
    // Layout: 126, K, M, prop1..4, knots (K+M+2), weights (K+1),
    // control points 3*(K+1), V0, V1, ...
    if p.len() < 7 {
        return None;
    }
    let k = to_index(p[1])?;
    let degree = to_index(p[2])?;
    let n_ctrl = k + 1;
    let n_knots = k + degree + 2;

    let knots_at = 7;
    let weights_at = knots_at + n_knots;
    let points_at = weights_at + n_ctrl;
    let range_at = points_at + 3 * n_ctrl;
    if p.len() < range_at + 2 {
        return None;
    }

    let knots = &p[knots_at..weights_at];
    let weights = &p[weights_at..points_at];
    let ctrl: Vec<Point3<f64>> = p[points_at..range_at]
        .chunks_exact(3)
        .map(|c| Point3::new(c[0], c[1], c[2]))
        .collect();

    let (v0, v1) = (p[range_at], p[range_at + 1]);
    let span = v1 - v0;
    if !span.is_finite() || span <= 0.0 {
        return None;
    }

    let points: Vec<Point3<f64>> = (0..=CURVE_SAMPLES)
        .map(|i| {
            let u = v0 + (v1 - v0) * (i as f64 / CURVE_SAMPLES as f64);
            nurbs_curve_point(degree, knots, weights, &ctrl, u)
        })
        .collect::<Option<_>>()?;
    Some(TriMesh::from_positions(points))
}

/// Entity 128: rational B-spline surface, sampled to a triangle grid.
fn bspline_surface_entity(p: &[f64]) -> Option<TriMesh> {
    // Layout: 128, K1, K2, M1, M2, prop1..5, U-knots (K1+M1+2),
    // V-knots (K2+M2+2), weights (K1+1)*(K2+1), points 3*(K1+1)*(K2+1),
    // U0, U1, V0, V1.
    if p.len() < 10 {
        return None;
    }
    let k1 = to_index(p[1])?;
    let k2 = to_index(p[2])?;
    let m1 = to_index(p[3])?;
    let m2 = to_index(p[4])?;
    let (nu, nv) = (k1 + 1, k2 + 1);

    let u_knots_at = 10;
    let v_knots_at = u_knots_at + k1 + m1 + 2;
    let weights_at = v_knots_at + k2 + m2 + 2;
    let points_at = weights_at + nu * nv;
    let range_at = points_at + 3 * nu * nv;
    if p.len() < range_at + 4 {
        return None;
    }

    let u_knots = &p[u_knots_at..v_knots_at];
    let v_knots = &p[v_knots_at..weights_at];
    let weights = &p[weights_at..points_at];
    let ctrl: Vec<Point3<f64>> = p[points_at..range_at]
        .chunks_exact(3)
        .map(|c| Point3::new(c[0], c[1], c[2]))
        .collect();

    let (u0, u1, v0, v1) = (p[range_at], p[range_at + 1], p[range_at + 2], p[range_at + 3]);
    let (u_span, v_span) = (u1 - u0, v1 - v0);
    if !u_span.is_finite() || u_span <= 0.0 || !v_span.is_finite() || v_span <= 0.0 {
        return None;
    }

    let n = SURFACE_SAMPLES;
    let mut coords = Vec::with_capacity((n + 1) * (n + 1) * 3);
    for j in 0..=n {
        let v = v0 + (v1 - v0) * (j as f64 / n as f64);
        for i in 0..=n {
            let u = u0 + (u1 - u0) * (i as f64 / n as f64);
            let point = nurbs_surface_point(m1, u_knots, m2, v_knots, weights, &ctrl, nu, u, v)?;
            coords.extend_from_slice(&[point.x, point.y, point.z]);
        }
    }

    let stride = (n + 1) as u32;
    let mut indices = Vec::with_capacity(n * n * 6);
    for j in 0..n as u32 {
        for i in 0..n as u32 {
            let a = j * stride + i;
            let b = a + 1;
            let c = a + stride;
            let d = c + 1;
            indices.extend_from_slice(&[a, b, d, a, d, c]);
        }
    }

    Some(TriMesh::from_raw(&coords, Some(&indices)))
}

fn to_index(v: f64) -> Option<usize> {
    if v.is_finite() && v >= 0.0 && v < 1e7 {
        Some(v as usize)
    } else {
        None
    }
}

// ============================================================================
// NURBS evaluation
// ============================================================================

/// Knot span containing `u` (last span when `u` sits on the domain end).
fn knot_span(degree: usize, knots: &[f64], u: f64) -> usize {
    let high = knots.len() - degree - 2;
    let mut span = degree;
    while span < high && u >= knots[span + 1] {
        span += 1;
    }
    span
}

/// Nonzero B-spline basis functions at `u` (Cox-de Boor, NURBS book A2.2).
fn basis_functions(degree: usize, knots: &[f64], span: usize, u: f64) -> Vec<f64> {
    let mut basis = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    basis[0] = 1.0;

    for j in 1..=degree {
        left[j] = u - knots[span + 1 - j];
        right[j] = knots[span + j] - u;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            let term = if denom.abs() > f64::EPSILON {
                basis[r] / denom
            } else {
                0.0
            };
            basis[r] = right[r + 1].mul_add(term, saved);
            saved = left[j - r] * term;
        }
        basis[j] = saved;
    }
    basis
}

fn nurbs_curve_point(
    degree: usize,
    knots: &[f64],
    weights: &[f64],
    ctrl: &[Point3<f64>],
    u: f64,
) -> Option<Point3<f64>> {
    if ctrl.len() < degree + 1 || knots.len() != ctrl.len() + degree + 1 {
        return None;
    }
    let u = u.clamp(knots[degree], knots[ctrl.len()]);
    let span = knot_span(degree, knots, u);
    let basis = basis_functions(degree, knots, span, u);

    let mut num = nalgebra::Vector3::zeros();
    let mut den = 0.0;
    for (j, b) in basis.iter().enumerate() {
        let idx = span - degree + j;
        let w = weights.get(idx).copied().unwrap_or(1.0);
        num += ctrl.get(idx)?.coords * (b * w);
        den += b * w;
    }
    if den.abs() < f64::EPSILON {
        return None;
    }
    Some(Point3::from(num / den))
}

#[allow(clippy::too_many_arguments)]
fn nurbs_surface_point(
    u_degree: usize,
    u_knots: &[f64],
    v_degree: usize,
    v_knots: &[f64],
    weights: &[f64],
    ctrl: &[Point3<f64>],
    nu: usize,
    u: f64,
    v: f64,
) -> Option<Point3<f64>> {
    let nv = ctrl.len() / nu;
    if nu < u_degree + 1 || nv < v_degree + 1 {
        return None;
    }

    let u = u.clamp(u_knots[u_degree], u_knots[nu]);
    let v = v.clamp(v_knots[v_degree], v_knots[nv]);
    let u_span = knot_span(u_degree, u_knots, u);
    let v_span = knot_span(v_degree, v_knots, v);
    let u_basis = basis_functions(u_degree, u_knots, u_span, u);
    let v_basis = basis_functions(v_degree, v_knots, v_span, v);

    let mut num = nalgebra::Vector3::zeros();
    let mut den = 0.0;
    for (jv, bv) in v_basis.iter().enumerate() {
        let row = v_span - v_degree + jv;
        for (ju, bu) in u_basis.iter().enumerate() {
            let col = u_span - u_degree + ju;
            // Control net stored row-major: index = row * nu + col.
            let idx = row * nu + col;
            let w = weights.get(idx).copied().unwrap_or(1.0);
            let b = bu * bv * w;
            num += ctrl.get(idx)?.coords * b;
            den += b;
        }
    }
    if den.abs() < f64::EPSILON {
        return None;
    }
    Some(Point3::from(num / den))
}

// ============================================================================
// Global section
// ============================================================================

/// Pull the unit flag (parameter 14) and unit name (parameter 15) out of the
/// global section and surface them as decoder metadata.
fn global_metadata(global: &str) -> MetadataBag {
    let params = split_hollerith(global);

    let flag = params.get(13).and_then(|p| p.trim().parse::<i32>().ok());
    let name = params.get(14).map(|p| strip_hollerith(p));

    let units = match flag {
        Some(1) => Some("inch".to_string()),
        Some(2) => Some("millimeter".to_string()),
        Some(4) => Some("foot".to_string()),
        Some(6) => Some("meter".to_string()),
        Some(9) => Some("micrometer".to_string()),
        Some(10) => Some("centimeter".to_string()),
        // Flag 3 defers to the unit name; other flags are passed through.
        _ => name.clone().filter(|n| !n.is_empty()),
    };
    let length_unit = name.filter(|n| !n.is_empty());

    if units.is_none() && length_unit.is_none() {
        warn!("IGES global section carries no unit information");
    }
    MetadataBag {
        units,
        length_unit,
        extra: Vec::new(),
    }
}

/// Split global-section parameters on commas, honoring `nH` Hollerith
/// strings whose content may itself contain delimiters.
fn split_hollerith(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut params = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        // Detect a Hollerith prefix at the start of the current field.
        if current.trim().is_empty() && chars[i].is_ascii_digit() {
            let digits_start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            if i < chars.len() && (chars[i] == 'H' || chars[i] == 'h') {
                let count: usize = chars[digits_start..i]
                    .iter()
                    .collect::<String>()
                    .parse()
                    .unwrap_or(0);
                current.extend(&chars[digits_start..=i]);
                i += 1;
                let take = count.min(chars.len() - i);
                current.extend(&chars[i..i + take]);
                i += take;
                continue;
            }
            current.extend(&chars[digits_start..i]);
            continue;
        }

        match chars[i] {
            ',' => {
                params.push(current.trim().to_string());
                current = String::new();
            }
            ';' => break,
            c => current.push(c),
        }
        i += 1;
    }
    if !current.trim().is_empty() {
        params.push(current.trim().to_string());
    }
    params
}

/// Drop the `nH` prefix from a Hollerith string parameter.
fn strip_hollerith(param: &str) -> String {
    let p = param.trim();
    if let Some(h) = p.find(['H', 'h']) {
        if p[..h].chars().all(|c| c.is_ascii_digit()) && !p[..h].is_empty() {
            return p[h + 1..].to_string();
        }
    }
    p.to_string()
}
