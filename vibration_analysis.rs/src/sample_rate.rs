use std::fmt::Display;

use derive_more::derive::{Add, AddAssign, Mul, MulAssign};

#[derive(
	Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash, Add, AddAssign, Mul, MulAssign,
)]
pub struct SampleRate(pub usize);

impl SampleRate {
	#[must_use]
	pub const fn hz(&self) -> usize {
		self.0
	}

	#[must_use]
	#[allow(clippy::cast_precision_loss)]
	pub const fn as_f64(&self) -> f64 {
		self.0 as f64
	}

	#[must_use]
	pub fn nyquist(&self) -> f64 {
		self.as_f64() / 2.
	}
}

impl Display for SampleRate {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		Display::fmt(&format!("{}Hz", self.0), f)
	}
}

impl From<usize> for SampleRate {
	fn from(value: usize) -> Self {
		Self(value)
	}
}

impl From<SampleRate> for usize {
	fn from(value: SampleRate) -> Self {
		value.0
	}
}
