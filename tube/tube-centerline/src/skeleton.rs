//! Centerline extraction by voxel skeletonization.
//!
//! The tube surface is sampled into a voxel grid, a 6-connected distance
//! transform is relaxed outward from the surface voxels, and voxels that are
//! strict local maxima of the distance field deep inside the shape form the
//! medial axis. Ordering those points end to end gives the centerline
//! polyline whose arc length is the tube length.

use cad_mesh::{Aabb, MeshSet, Point3};
use tracing::debug;

use crate::{integrate, sample, CenterlineParams, LengthEstimate, LengthMethod};

/// Voxels closer to the surface than this distance are never medial.
const MIN_MEDIAL_DISTANCE: u32 = 2;
/// Neighbor-count radius factor for endpoint detection.
const ENDPOINT_RADIUS_FACTOR: f64 = 2.0;
/// Points examined when estimating medial point spacing.
const SPACING_SAMPLE: usize = 100;

/// Run the skeletonization estimator. `None` means skipped.
pub(crate) fn estimate(meshes: &MeshSet, params: &CenterlineParams) -> Option<LengthEstimate> {
    let samples = sample::collect(meshes, params.skeleton_samples);
    if samples.len() < params.min_skeleton_samples {
        debug!(samples = samples.len(), "too few surface samples, skipping skeletonization");
        return None;
    }

    let grid = VoxelGrid::from_samples(&samples, params.voxel_resolution)?;
    let distance = grid.distance_transform();
    let medial = grid.medial_voxels(&distance);
    if medial.len() < 2 {
        debug!(medial = medial.len(), "too few medial voxels, skipping skeletonization");
        return None;
    }

    let points: Vec<Point3<f64>> = medial.iter().map(|&v| grid.voxel_center(v)).collect();
    let ordered = order_path(&points);
    let integration = integrate::integrate_polyline(&ordered)?;

    let smoothness = path_smoothness(&ordered);
    let coverage = (ordered.len() as f64 / (0.01 * samples.len() as f64)).min(1.0);
    let skeleton_confidence = 0.7f64.mul_add(smoothness, 0.3 * coverage);
    let confidence = 0.6f64.mul_add(skeleton_confidence, 0.4 * integration.confidence);

    debug!(
        medial = ordered.len(),
        length = integration.length,
        smoothness,
        coverage,
        "skeletonization complete"
    );

    Some(LengthEstimate {
        length: integration.length,
        confidence,
        method: LengthMethod::Skeleton,
    })
}

/// A flat-buffer voxelization of the sampled surface.
struct VoxelGrid {
    origin: Point3<f64>,
    voxel_size: f64,
    dims: [usize; 3],
    occupied: Vec<bool>,
}

impl VoxelGrid {
    /// Build a grid over the sample bounds with roughly `resolution` voxels
    /// along the longest axis, marking sample-occupied voxels as surface.
    fn from_samples(samples: &[Point3<f64>], resolution: usize) -> Option<Self> {
        let bounds = Aabb::from_points(samples.iter());
        let extent = bounds.max_extent();
        if !extent.is_finite() || extent <= 0.0 || resolution == 0 {
            return None;
        }
        let voxel_size = extent / resolution as f64;

        let size = bounds.size();
        let dims = [
            (size.x / voxel_size).ceil() as usize + 1,
            (size.y / voxel_size).ceil() as usize + 1,
            (size.z / voxel_size).ceil() as usize + 1,
        ];

        let mut grid = Self {
            origin: bounds.min,
            voxel_size,
            dims,
            occupied: vec![false; dims[0] * dims[1] * dims[2]],
        };
        for p in samples {
            if let Some(idx) = grid.voxel_of(p) {
                grid.occupied[idx] = true;
            }
        }
        Some(grid)
    }

    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.dims[1] + y) * self.dims[0] + x
    }

    fn coords(&self, index: usize) -> [usize; 3] {
        let x = index % self.dims[0];
        let y = (index / self.dims[0]) % self.dims[1];
        let z = index / (self.dims[0] * self.dims[1]);
        [x, y, z]
    }

    fn voxel_of(&self, p: &Point3<f64>) -> Option<usize> {
        let v = (p - self.origin) / self.voxel_size;
        let (x, y, z) = (v.x.floor(), v.y.floor(), v.z.floor());
        if x < 0.0 || y < 0.0 || z < 0.0 {
            return None;
        }
        let (x, y, z) = (x as usize, y as usize, z as usize);
        if x >= self.dims[0] || y >= self.dims[1] || z >= self.dims[2] {
            return None;
        }
        Some(self.index(x, y, z))
    }

    /// World-space center of a voxel.
    fn voxel_center(&self, index: usize) -> Point3<f64> {
        let [x, y, z] = self.coords(index);
        Point3::new(
            (x as f64 + 0.5).mul_add(self.voxel_size, self.origin.x),
            (y as f64 + 0.5).mul_add(self.voxel_size, self.origin.y),
            (z as f64 + 0.5).mul_add(self.voxel_size, self.origin.z),
        )
    }

    /// Iterative 6-connected distance transform from the surface voxels.
    ///
    /// Surface voxels start at 0, everything else effectively at infinity;
    /// each sweep relaxes `d[v] = min(d[v], d[neighbor] + 1)` until the
    /// field stabilizes, bounded by the largest grid dimension.
    fn distance_transform(&self) -> Vec<u32> {
        let mut field: Vec<u32> = self
            .occupied
            .iter()
            .map(|&surface| if surface { 0 } else { u32::MAX })
            .collect();

        let max_sweeps = self.dims[0].max(self.dims[1]).max(self.dims[2]);
        for _ in 0..max_sweeps {
            let mut changed = false;
            for z in 0..self.dims[2] {
                for y in 0..self.dims[1] {
                    for x in 0..self.dims[0] {
                        let idx = self.index(x, y, z);
                        let mut best = field[idx];
                        for n in self.six_neighbors(x, y, z) {
                            best = best.min(field[n].saturating_add(1));
                        }
                        if best < field[idx] {
                            field[idx] = best;
                            changed = true;
                        }
                    }
                }
            }
            if !changed {
                break;
            }
        }
        field
    }

    fn six_neighbors(&self, x: usize, y: usize, z: usize) -> impl Iterator<Item = usize> + '_ {
        const OFFSETS: [[i64; 3]; 6] = [
            [-1, 0, 0],
            [1, 0, 0],
            [0, -1, 0],
            [0, 1, 0],
            [0, 0, -1],
            [0, 0, 1],
        ];
        OFFSETS.iter().filter_map(move |[dx, dy, dz]| {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            let nz = z as i64 + dz;
            (nx >= 0
                && ny >= 0
                && nz >= 0
                && (nx as usize) < self.dims[0]
                && (ny as usize) < self.dims[1]
                && (nz as usize) < self.dims[2])
                .then(|| self.index(nx as usize, ny as usize, nz as usize))
        })
    }

    /// Inner voxels that are strict local maxima of the distance field
    /// within their 26-neighborhood.
    fn medial_voxels(&self, field: &[u32]) -> Vec<usize> {
        let mut medial = Vec::new();
        for (idx, &d) in field.iter().enumerate() {
            if d < MIN_MEDIAL_DISTANCE || d == u32::MAX {
                continue;
            }
            let [x, y, z] = self.coords(idx);
            let mut is_max = true;
            'search: for dz in -1_i64..=1 {
                for dy in -1_i64..=1 {
                    for dx in -1_i64..=1 {
                        if dx == 0 && dy == 0 && dz == 0 {
                            continue;
                        }
                        let nx = x as i64 + dx;
                        let ny = y as i64 + dy;
                        let nz = z as i64 + dz;
                        if nx < 0
                            || ny < 0
                            || nz < 0
                            || nx as usize >= self.dims[0]
                            || ny as usize >= self.dims[1]
                            || nz as usize >= self.dims[2]
                        {
                            continue;
                        }
                        let n = self.index(nx as usize, ny as usize, nz as usize);
                        if field[n] >= d {
                            is_max = false;
                            break 'search;
                        }
                    }
                }
            }
            if is_max {
                medial.push(idx);
            }
        }
        medial
    }
}

/// Order scattered medial points into a path.
///
/// Endpoints are points with at most one neighbor within twice the mean
/// nearest-neighbor spacing; traversal greedily walks to the nearest
/// unvisited point from one endpoint. When no clear endpoints exist, the
/// two farthest-apart points substitute.
fn order_path(points: &[Point3<f64>]) -> Vec<Point3<f64>> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let spacing = mean_nearest_neighbor_spacing(points);
    let radius = ENDPOINT_RADIUS_FACTOR * spacing;

    let mut endpoints: Vec<usize> = (0..points.len())
        .filter(|&i| {
            let neighbors = points
                .iter()
                .enumerate()
                .filter(|&(j, p)| j != i && (p - points[i]).norm() <= radius)
                .count();
            neighbors <= 1
        })
        .collect();

    if endpoints.len() < 2 {
        endpoints = farthest_pair(points);
    }

    let start = endpoints.first().copied().unwrap_or(0);
    let mut visited = vec![false; points.len()];
    let mut ordered = Vec::with_capacity(points.len());
    let mut current = start;
    visited[current] = true;
    ordered.push(points[current]);

    for _ in 1..points.len() {
        let mut nearest = None;
        let mut nearest_dist = f64::INFINITY;
        for (j, p) in points.iter().enumerate() {
            if visited[j] {
                continue;
            }
            let d = (p - points[current]).norm_squared();
            if d < nearest_dist {
                nearest_dist = d;
                nearest = Some(j);
            }
        }
        let Some(next) = nearest else { break };
        visited[next] = true;
        ordered.push(points[next]);
        current = next;
    }
    ordered
}

/// Mean distance to the nearest neighbor, sampled over up to
/// [`SPACING_SAMPLE`] points.
fn mean_nearest_neighbor_spacing(points: &[Point3<f64>]) -> f64 {
    let sample_count = points.len().min(SPACING_SAMPLE);
    let mut total = 0.0;
    let mut counted = 0_usize;
    for i in 0..sample_count {
        let mut nearest = f64::INFINITY;
        for (j, p) in points.iter().enumerate() {
            if j != i {
                nearest = nearest.min((p - points[i]).norm());
            }
        }
        if nearest.is_finite() {
            total += nearest;
            counted += 1;
        }
    }
    if counted == 0 {
        return 0.0;
    }
    total / counted as f64
}

/// Indices of the two farthest-apart points.
fn farthest_pair(points: &[Point3<f64>]) -> Vec<usize> {
    let mut best = (0, 0);
    let mut best_dist = -1.0;
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            let d = (points[j] - points[i]).norm_squared();
            if d > best_dist {
                best_dist = d;
                best = (i, j);
            }
        }
    }
    vec![best.0, best.1]
}

/// `max(0.1, 1 - total_turning / ((n - 2) * pi))` over the ordered path.
fn path_smoothness(points: &[Point3<f64>]) -> f64 {
    if points.len() < 3 {
        return 1.0;
    }
    let mut total_turning = 0.0;
    for w in points.windows(3) {
        let a = w[1] - w[0];
        let b = w[2] - w[1];
        let (na, nb) = (a.norm(), b.norm());
        if na > f64::EPSILON && nb > f64::EPSILON {
            let cos = (a.dot(&b) / (na * nb)).clamp(-1.0, 1.0);
            total_turning += cos.acos();
        }
    }
    let budget = (points.len() - 2) as f64 * std::f64::consts::PI;
    (1.0 - total_turning / budget).max(0.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn grid_requires_real_extent() {
        let flat = vec![Point3::origin(); 10];
        assert!(VoxelGrid::from_samples(&flat, 80).is_none());
        assert!(VoxelGrid::from_samples(&[], 80).is_none());
    }

    #[test]
    fn grid_marks_sampled_voxels() {
        let samples = vec![Point3::origin(), Point3::new(10.0, 0.0, 0.0)];
        let grid = VoxelGrid::from_samples(&samples, 10).unwrap();
        assert_eq!(grid.occupied.iter().filter(|&&o| o).count(), 2);
    }

    #[test]
    fn flat_indexing_round_trips() {
        let samples = vec![Point3::origin(), Point3::new(8.0, 6.0, 4.0)];
        let grid = VoxelGrid::from_samples(&samples, 8).unwrap();
        for idx in [0, 7, grid.occupied.len() - 1] {
            let [x, y, z] = grid.coords(idx);
            assert_eq!(grid.index(x, y, z), idx);
        }
    }

    #[test]
    fn distance_transform_counts_steps_from_surface() {
        // Two surface voxels at the ends of a 1-D grid; the field grows by
        // one per voxel away from them.
        let samples = vec![Point3::origin(), Point3::new(10.0, 0.0, 0.0)];
        let grid = VoxelGrid::from_samples(&samples, 10).unwrap();
        let field = grid.distance_transform();
        // Voxel 5 sits mid-span, 5 steps from the nearer end.
        assert_eq!(field[5], 5);
        assert_eq!(field[0], 0);
        assert_eq!(field[10], 0);
    }

    #[test]
    fn medial_extraction_finds_interior_peak() {
        // Hand-built grid: surface shell around a single deep interior voxel.
        let mut samples = Vec::new();
        for x in 0..7 {
            for y in 0..7 {
                for z in 0..7 {
                    // Hollow cube shell of side 6.
                    if x == 0 || x == 6 || y == 0 || y == 6 || z == 0 || z == 6 {
                        samples.push(Point3::new(f64::from(x), f64::from(y), f64::from(z)));
                    }
                }
            }
        }
        let grid = VoxelGrid::from_samples(&samples, 6).unwrap();
        let field = grid.distance_transform();
        let medial = grid.medial_voxels(&field);
        // The center voxel (3,3,3) is the unique strict maximum at distance 3.
        assert_eq!(medial.len(), 1);
        assert_eq!(grid.coords(medial[0]), [3, 3, 3]);
        assert_eq!(field[medial[0]], 3);
    }

    #[test]
    fn order_path_reconstructs_a_shuffled_line() {
        let mut points: Vec<Point3<f64>> =
            (0..20).map(|i| Point3::new(f64::from(i), 0.0, 0.0)).collect();
        points.swap(3, 15);
        points.swap(0, 10);
        points.swap(7, 19);

        let ordered = order_path(&points);
        assert_eq!(ordered.len(), 20);
        let length: f64 = ordered.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
        assert_relative_eq!(length, 19.0, epsilon = 1e-9);
    }

    #[test]
    fn order_path_handles_loop_via_farthest_pair() {
        // A closed ring has no endpoints; the farthest pair seeds traversal.
        let points: Vec<Point3<f64>> = (0..12)
            .map(|i| {
                let a = std::f64::consts::TAU * f64::from(i) / 12.0;
                Point3::new(a.cos(), a.sin(), 0.0)
            })
            .collect();
        let ordered = order_path(&points);
        assert_eq!(ordered.len(), 12);
    }

    #[test]
    fn smoothness_of_straight_path_is_high() {
        let points: Vec<Point3<f64>> =
            (0..10).map(|i| Point3::new(f64::from(i), 0.0, 0.0)).collect();
        assert_relative_eq!(path_smoothness(&points), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn smoothness_of_zigzag_is_floored() {
        let points: Vec<Point3<f64>> = (0..20)
            .map(|i| Point3::new(f64::from(i / 2), f64::from(i % 2), 0.0))
            .collect();
        let s = path_smoothness(&points);
        assert!(s >= 0.1 && s < 1.0);
    }

    #[test]
    fn skips_on_too_few_samples() {
        let meshes = cad_mesh::MeshSet::from_meshes(vec![cad_mesh::TriMesh::from_positions(
            (0..10).map(|i| Point3::new(f64::from(i), 0.0, 0.0)).collect(),
        )]);
        assert!(estimate(&meshes, &CenterlineParams::default()).is_none());
    }
}
