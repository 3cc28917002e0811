//! Calibration parameters for the length estimators.

/// Tunable constants for centerline estimation.
///
/// Defaults are the calibrated production values; tests and callers with
/// unusual geometry can dial individual knobs.
///
/// # Example
///
/// ```
/// use tube_centerline::CenterlineParams;
///
/// let params = CenterlineParams::default().voxel_resolution(40);
/// assert_eq!(params.voxel_resolution, 40);
/// ```
#[derive(Debug, Clone)]
pub struct CenterlineParams {
    /// Surface samples collected for skeletonization.
    pub skeleton_samples: usize,
    /// Minimum surface samples below which skeletonization skips.
    pub min_skeleton_samples: usize,
    /// Approximate voxels along the longest axis of the sample grid.
    pub voxel_resolution: usize,
    /// Samples collected for PCA slicing.
    pub pca_samples: usize,
    /// Slabs the principal-axis span is divided into.
    pub pca_slabs: usize,
    /// PCA result is rejected below this fraction of the dominant extent.
    pub pca_min_ratio: f64,
    /// Positions sampled by the ordered path estimator.
    pub path_samples: usize,
    /// Path result is rejected below this fraction of the diagonal.
    pub path_min_ratio: f64,
}

impl Default for CenterlineParams {
    fn default() -> Self {
        Self {
            skeleton_samples: 3000,
            min_skeleton_samples: 50,
            voxel_resolution: 80,
            pca_samples: 2000,
            pca_slabs: 120,
            pca_min_ratio: 0.8,
            path_samples: 50,
            path_min_ratio: 0.8,
        }
    }
}

impl CenterlineParams {
    /// Set the voxel resolution.
    #[must_use]
    pub const fn voxel_resolution(mut self, resolution: usize) -> Self {
        self.voxel_resolution = resolution;
        self
    }

    /// Set the skeleton surface-sample budget.
    #[must_use]
    pub const fn skeleton_samples(mut self, samples: usize) -> Self {
        self.skeleton_samples = samples;
        self
    }

    /// Set the PCA sample budget.
    #[must_use]
    pub const fn pca_samples(mut self, samples: usize) -> Self {
        self.pca_samples = samples;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_calibration() {
        let p = CenterlineParams::default();
        assert_eq!(p.skeleton_samples, 3000);
        assert_eq!(p.min_skeleton_samples, 50);
        assert_eq!(p.voxel_resolution, 80);
        assert_eq!(p.pca_samples, 2000);
        assert_eq!(p.pca_slabs, 120);
        assert!((p.pca_min_ratio - 0.8).abs() < f64::EPSILON);
        assert_eq!(p.path_samples, 50);
    }

    #[test]
    fn builder_setters() {
        let p = CenterlineParams::default()
            .voxel_resolution(64)
            .skeleton_samples(500)
            .pca_samples(100);
        assert_eq!(p.voxel_resolution, 64);
        assert_eq!(p.skeleton_samples, 500);
        assert_eq!(p.pca_samples, 100);
    }
}
