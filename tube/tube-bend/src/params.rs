//! Calibration parameters for bend detection.

/// Tunable constants for the bend analyzer.
///
/// The angle thresholds are empirical calibration values; expose them here
/// rather than burying them in the counting loops.
///
/// # Example
///
/// ```
/// use tube_bend::BendParams;
///
/// let params = BendParams::default().curvature_threshold(0.3);
/// assert!((params.curvature_threshold - 0.3).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct BendParams {
    /// Turning-sum threshold (radians) for the curvature method.
    pub curvature_threshold: f64,
    /// Chord-angle threshold (radians) for the direction-change method.
    pub direction_threshold: f64,
    /// Vertex samples for the curvature method.
    pub curvature_samples: usize,
    /// Vertex samples for the direction-change method.
    pub direction_samples: usize,
}

impl Default for BendParams {
    fn default() -> Self {
        Self {
            curvature_threshold: 0.2,
            direction_threshold: 0.5,
            curvature_samples: 100,
            direction_samples: 50,
        }
    }
}

impl BendParams {
    /// Set the curvature turning-sum threshold.
    #[must_use]
    pub const fn curvature_threshold(mut self, radians: f64) -> Self {
        self.curvature_threshold = radians;
        self
    }

    /// Set the direction-change chord threshold.
    #[must_use]
    pub const fn direction_threshold(mut self, radians: f64) -> Self {
        self.direction_threshold = radians;
        self
    }
}
