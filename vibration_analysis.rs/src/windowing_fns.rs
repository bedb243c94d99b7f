use std::f64::consts::TAU;

use crate::WindowingFn;

/// Rectangular taper. The default of the periodogram estimator.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxcarWindow;

impl BoxcarWindow {
	#[must_use]
	pub const fn new() -> Self {
		Self
	}
}

impl WindowingFn for BoxcarWindow {
	fn ratio_at(&self, _index: usize, _n_of_samples: usize) -> f64 {
		1.
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HannWindow;

impl HannWindow {
	#[must_use]
	pub const fn new() -> Self {
		Self
	}
}

impl WindowingFn for HannWindow {
	#[allow(clippy::cast_precision_loss)]
	fn ratio_at(&self, index: usize, n_of_samples: usize) -> f64 {
		0.5 * (1. - f64::cos(TAU * index as f64 / n_of_samples as f64))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_boxcar_is_flat() {
		let w = BoxcarWindow::new();
		for i in 0..100 {
			assert!((w.ratio_at(i, 100) - 1.).abs() < f64::EPSILON);
		}
	}

	#[test]
	fn test_hann_edges_and_center() {
		let w = HannWindow::new();
		assert!(w.ratio_at(0, 1024).abs() < 1e-12);
		assert!((w.ratio_at(512, 1024) - 1.).abs() < 1e-12);
	}
}
