use std::sync::Arc;

use rustfft::{
	num_complex::{Complex, Complex64},
	Fft, FftPlanner,
};

use crate::{
	frequency_bins, psd_real_length, windowing_fns::BoxcarWindow, SampleRate, WindowingFn,
};

/// One-sided power spectral density estimator over fixed-length windows.
///
/// The FFT plan and scratch buffers are allocated once and reused across
/// windows, since every window of a waveform shares the same length.
///
/// Power is density-scaled: `|X[k]|^2 / (fs * sum(w[n]^2))`, with every bin
/// strictly between 0Hz and the Nyquist frequency doubled to account for the
/// discarded mirrored half. A full-scale sine at an exact bin therefore
/// integrates to its mean-square power over the bin width.
pub struct PeriodogramAnalyzer {
	sample_rate: SampleRate,
	samples_per_window: usize,
	windowing_fn: Arc<dyn WindowingFn + Sync + Send + 'static>,
	fft_processor: Arc<dyn Fft<f64>>,
	complex_signal: Vec<Complex64>,
	cur_power: Vec<f64>,
	window_energy: f64,
}

impl std::fmt::Debug for PeriodogramAnalyzer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PeriodogramAnalyzer")
			.field("sample_rate", &self.sample_rate)
			.field("samples_per_window", &self.samples_per_window)
			.field("windowing_fn", &"omitted")
			.field("fft_processor", &"omitted")
			.finish_non_exhaustive()
	}
}

impl PeriodogramAnalyzer {
	#[must_use]
	pub fn new(sample_rate: SampleRate, samples_per_window: usize) -> Self {
		Self::with_windowing_fn(sample_rate, samples_per_window, BoxcarWindow)
	}

	#[must_use]
	pub fn with_windowing_fn(
		sample_rate: SampleRate,
		samples_per_window: usize,
		windowing_fn: impl WindowingFn + Send + Sync + 'static,
	) -> Self {
		assert!(samples_per_window > 0, "window must hold at least one sample");

		let mut planner = FftPlanner::new();
		let window_energy = (0..samples_per_window)
			.map(|i| windowing_fn.ratio_at(i, samples_per_window).powi(2))
			.sum();
		Self {
			sample_rate,
			samples_per_window,
			windowing_fn: Arc::new(windowing_fn),
			fft_processor: planner.plan_fft_forward(samples_per_window),
			complex_signal: vec![Complex { re: 0., im: 0. }; samples_per_window],
			cur_power: vec![0.; psd_real_length(samples_per_window)],
			window_energy,
		}
	}

	/// The frequency axis shared by every window of this analyzer, from 0
	/// to the Nyquist frequency inclusive.
	#[must_use]
	pub fn frequency_bins(&self) -> Vec<f64> {
		frequency_bins(self.sample_rate, self.samples_per_window).collect()
	}

	/// Estimate the PSD of one window, sampled at the configured rate.
	///
	/// The returned slice is sorted by frequency bin and remains valid until
	/// the next call.
	///
	/// # Panics
	/// - if `window` does not match the configured `samples_per_window`.
	#[must_use]
	pub fn analyze(&mut self, window: &[f64]) -> &[f64] {
		assert_eq!(
			window.len(),
			self.samples_per_window,
			"window with incompatible length received"
		);

		for (i, (c, sample)) in self.complex_signal.iter_mut().zip(window).enumerate() {
			*c = Complex::new(
				sample * self.windowing_fn.ratio_at(i, self.samples_per_window),
				0.,
			);
		}

		self.fft_processor.process(&mut self.complex_signal);

		let density_factor = 1. / (self.sample_rate.as_f64() * self.window_energy);

		let n_of_bins = self.cur_power.len();
		let nyquist_bin = if self.samples_per_window % 2 == 0 {
			// even-length windows place the Nyquist frequency on the last bin,
			// which has no mirrored counterpart to fold in
			Some(n_of_bins - 1)
		} else {
			None
		};
		self.cur_power
			.iter_mut()
			.zip(self.complex_signal.iter().take(n_of_bins))
			.enumerate()
			.for_each(|(i, (dst, src))| {
				let one_sided = if i == 0 || Some(i) == nyquist_bin {
					1.
				} else {
					2.
				};
				*dst = src.norm_sqr() * density_factor * one_sided;
			});

		&self.cur_power
	}

	#[must_use]
	pub fn sample_rate(&self) -> SampleRate {
		self.sample_rate
	}

	#[must_use]
	pub fn samples_per_window(&self) -> usize {
		self.samples_per_window
	}
}

#[cfg(test)]
mod tests {
	use std::f64::consts::TAU;

	use crate::frequency_to_index;

	use super::*;

	fn sine(frequency: f64, sample_rate: SampleRate, samples: usize) -> Vec<f64> {
		(0..samples)
			.map(|i| f64::sin(TAU * frequency * i as f64 / sample_rate.as_f64()))
			.collect()
	}

	#[test]
	fn test_sine_lands_on_its_bin() {
		const SAMPLE_RATE: SampleRate = SampleRate(8000);
		let signal = sine(1000., SAMPLE_RATE, 8000);
		let mut analyzer = PeriodogramAnalyzer::new(SAMPLE_RATE, 8000);

		let power = analyzer.analyze(&signal);
		let peak = power
			.iter()
			.enumerate()
			.max_by(|(_, a), (_, b)| a.total_cmp(b))
			.unwrap()
			.0;
		assert_eq!(peak, frequency_to_index(1000., SAMPLE_RATE, 8000));
	}

	#[test]
	fn test_density_scaling_of_exact_bin_sine() {
		// unit-amplitude sine at an exact bin: |X[k]|^2 = (N/2)^2, doubled and
		// divided by fs*N gives exactly 0.5
		const SAMPLE_RATE: SampleRate = SampleRate(8000);
		let signal = sine(1000., SAMPLE_RATE, 8000);
		let mut analyzer = PeriodogramAnalyzer::new(SAMPLE_RATE, 8000);

		let power = analyzer.analyze(&signal);
		let bin = frequency_to_index(1000., SAMPLE_RATE, 8000);
		assert!((power[bin] - 0.5).abs() < 1e-9);
	}

	#[test]
	fn test_parseval_total_power() {
		// integral of the one-sided density times the bin width equals the
		// mean square of the signal
		const SAMPLE_RATE: SampleRate = SampleRate(1000);
		let signal = sine(250., SAMPLE_RATE, 1000);
		let mut analyzer = PeriodogramAnalyzer::new(SAMPLE_RATE, 1000);

		let power = analyzer.analyze(&signal);
		let bin_width = SAMPLE_RATE.as_f64() / 1000.;
		let integrated: f64 = power.iter().sum::<f64>() * bin_width;
		let mean_square: f64 =
			signal.iter().map(|s| s * s).sum::<f64>() / signal.len() as f64;
		assert!((integrated - mean_square).abs() < 1e-9);
	}

	#[test]
	fn test_hann_window_keeps_peak_location() {
		const SAMPLE_RATE: SampleRate = SampleRate(8000);
		let signal = sine(440., SAMPLE_RATE, 8000);
		let mut analyzer = PeriodogramAnalyzer::with_windowing_fn(
			SAMPLE_RATE,
			8000,
			crate::windowing_fns::HannWindow,
		);

		let power = analyzer.analyze(&signal);
		let peak = power
			.iter()
			.enumerate()
			.max_by(|(_, a), (_, b)| a.total_cmp(b))
			.unwrap()
			.0;
		assert_eq!(peak, frequency_to_index(440., SAMPLE_RATE, 8000));
	}

	#[test]
	#[should_panic(expected = "window with incompatible length received")]
	fn test_wrong_window_length_panics() {
		let mut analyzer = PeriodogramAnalyzer::new(SampleRate(8000), 8000);
		let _ = analyzer.analyze(&[0.; 100]);
	}
}
