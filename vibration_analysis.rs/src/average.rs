use crate::{AnalysisError, PeriodogramAnalyzer, SampleRate, Waveform};

/// Explicit configuration for the averaging transforms, replacing the
/// per-script constants of the lab rigs (channel 1 is the high-sensitivity
/// accelerometer channel on the two-channel Digiducer units).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PsdConfig {
	/// Length of each averaging window, in seconds.
	pub window_seconds: f64,
	/// Channel to analyze when the waveform is multi-channel.
	pub channel: usize,
}

impl Default for PsdConfig {
	fn default() -> Self {
		Self {
			window_seconds: 1.,
			channel: 1,
		}
	}
}

/// A variance-reduced PSD estimate: the elementwise mean of the per-window
/// periodograms of one waveform.
#[derive(Debug, Clone, PartialEq)]
pub struct AveragedPsd {
	frequencies: Vec<f64>,
	power: Vec<f64>,
	splits: usize,
}

impl AveragedPsd {
	/// Frequency bins, monotonically increasing from 0 to the Nyquist
	/// frequency.
	#[must_use]
	pub fn frequencies(&self) -> &[f64] {
		&self.frequencies
	}

	#[must_use]
	pub fn power(&self) -> &[f64] {
		&self.power
	}

	/// How many whole windows were averaged.
	#[must_use]
	pub fn splits(&self) -> usize {
		self.splits
	}

	#[must_use]
	pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
		(self.frequencies, self.power)
	}
}

/// Number of whole windows of `window_samples` in a recording of `samples`.
const fn n_of_splits(samples: usize, window_samples: usize) -> usize {
	samples / window_samples
}

#[allow(clippy::cast_precision_loss, clippy::cast_sign_loss, clippy::cast_possible_truncation)]
fn window_samples(sample_rate: SampleRate, window_seconds: f64) -> usize {
	(sample_rate.as_f64() * window_seconds).floor() as usize
}

/// Split a single-channel recording into whole non-overlapping windows of
/// `window_seconds`, estimate a periodogram per window and average the
/// estimates elementwise. Trailing samples that do not fill a whole window
/// are discarded, which keeps the bin count identical across windows; the
/// averaging is only valid because every window shares one frequency axis.
///
/// # Errors
/// [`AnalysisError::InsufficientData`] when the recording is shorter than a
/// single window (or the window is shorter than a single sample).
#[allow(clippy::cast_precision_loss)]
pub fn average_psd_samples(
	samples: &[f64],
	sample_rate: SampleRate,
	window_seconds: f64,
) -> Result<AveragedPsd, AnalysisError> {
	let window_samples = window_samples(sample_rate, window_seconds);
	if window_samples < 1 {
		return Err(AnalysisError::InsufficientData {
			samples: samples.len(),
			window_samples,
		});
	}
	let splits = n_of_splits(samples.len(), window_samples);
	if splits < 1 {
		return Err(AnalysisError::InsufficientData {
			samples: samples.len(),
			window_samples,
		});
	}

	let mut analyzer = PeriodogramAnalyzer::new(sample_rate, window_samples);
	let mut accumulated = vec![0.; crate::psd_real_length(window_samples)];
	for window in samples.chunks_exact(window_samples) {
		let power = analyzer.analyze(window);
		for (acc, p) in accumulated.iter_mut().zip(power) {
			*acc += p;
		}
	}

	for acc in &mut accumulated {
		*acc /= splits as f64;
	}

	Ok(AveragedPsd {
		frequencies: analyzer.frequency_bins(),
		power: accumulated,
		splits,
	})
}

/// [`average_psd_samples`] over one channel of a (possibly multi-channel)
/// waveform.
///
/// # Errors
/// - [`AnalysisError::ShapeMismatch`] when `config.channel` is out of range.
/// - [`AnalysisError::InsufficientData`] when the waveform is shorter than a
///   single window.
pub fn average_psd(waveform: &Waveform, config: &PsdConfig) -> Result<AveragedPsd, AnalysisError> {
	let samples = waveform.channel(config.channel)?;
	average_psd_samples(&samples, waveform.sample_rate(), config.window_seconds)
}

#[cfg(test)]
mod tests {
	use std::f64::consts::TAU;

	use crate::frequency_to_index;

	use super::*;

	fn sine_waveform(
		frequency: f64,
		sample_rate: SampleRate,
		seconds: usize,
		n_of_channels: usize,
		channel: usize,
	) -> Waveform {
		let frames = sample_rate.hz() * seconds;
		let mut samples = vec![0.; frames * n_of_channels];
		for i in 0..frames {
			samples[i * n_of_channels + channel] =
				f64::sin(TAU * frequency * i as f64 / sample_rate.as_f64());
		}
		Waveform::from_interleaved(samples, n_of_channels, sample_rate).unwrap()
	}

	fn median(mut values: Vec<f64>) -> f64 {
		values.sort_by(f64::total_cmp);
		let len = values.len();
		if len % 2 == 0 {
			(values[len / 2 - 1] + values[len / 2]) / 2.
		} else {
			values[len / 2]
		}
	}

	#[test]
	fn test_two_second_sine_scenario() {
		// 48kHz, 2s, 1kHz sine on channel 1 of 2, 1s windows
		const SAMPLE_RATE: SampleRate = SampleRate(48000);
		let waveform = sine_waveform(1000., SAMPLE_RATE, 2, 2, 1);

		let averaged = average_psd(
			&waveform,
			&PsdConfig {
				window_seconds: 1.,
				channel: 1,
			},
		)
		.unwrap();

		assert_eq!(averaged.splits(), 2);
		assert_eq!(averaged.frequencies().len(), 24001);
		assert_eq!(averaged.power().len(), 24001);

		let peak_bin = frequency_to_index(1000., SAMPLE_RATE, 48000);
		let peak = averaged.power()[peak_bin];
		assert!((peak - 0.5).abs() < 1e-9);

		let rest: Vec<f64> = averaged
			.power()
			.iter()
			.enumerate()
			.filter(|(i, _)| *i != peak_bin)
			.map(|(_, p)| *p)
			.collect();
		assert!(peak >= 10. * median(rest).max(f64::MIN_POSITIVE));
	}

	#[test]
	fn test_flat_waveform_yields_near_zero_power() {
		let waveform = Waveform::from_mono(vec![0.; 48000], SampleRate(48000));
		let averaged = average_psd(
			&waveform,
			&PsdConfig {
				window_seconds: 1.,
				channel: 0,
			},
		)
		.unwrap();
		assert_eq!(averaged.splits(), 1);
		assert!(averaged.power().iter().all(|p| p.abs() < 1e-20));
	}

	#[test]
	fn test_trailing_samples_are_discarded() {
		// 2.5 windows worth of data: exactly 2 splits, remainder ignored
		const SAMPLE_RATE: SampleRate = SampleRate(1000);
		let samples: Vec<f64> = (0..2500)
			.map(|i| f64::sin(TAU * 100. * i as f64 / 1000.))
			.collect();

		let averaged = average_psd_samples(&samples, SAMPLE_RATE, 1.).unwrap();
		assert_eq!(averaged.splits(), 2);

		// identical to averaging over the first 2000 samples only
		let truncated = average_psd_samples(&samples[..2000], SAMPLE_RATE, 1.).unwrap();
		assert_eq!(averaged, truncated);
	}

	#[test]
	fn test_duplicated_waveform_is_idempotent() {
		let base: Vec<f64> = (0..4000)
			.map(|i| {
				f64::sin(TAU * 50. * i as f64 / 4000.) + 0.25 * f64::sin(TAU * 325. * i as f64 / 4000.)
			})
			.collect();
		let mut doubled = base.clone();
		doubled.extend_from_slice(&base);

		let single = average_psd_samples(&base, SampleRate(4000), 1.).unwrap();
		let repeated = average_psd_samples(&doubled, SampleRate(4000), 1.).unwrap();

		assert_eq!(single.splits(), 1);
		assert_eq!(repeated.splits(), 2);
		assert_eq!(single.frequencies(), repeated.frequencies());
		for (a, b) in single.power().iter().zip(repeated.power()) {
			assert!((a - b).abs() < 1e-12);
		}
	}

	#[test]
	fn test_window_longer_than_waveform() {
		let samples = vec![0.; 1000];
		assert_eq!(
			average_psd_samples(&samples, SampleRate(1000), 1.5),
			Err(AnalysisError::InsufficientData {
				samples: 1000,
				window_samples: 1500,
			})
		);
	}

	#[test]
	fn test_sub_sample_window() {
		let samples = vec![0.; 1000];
		assert!(average_psd_samples(&samples, SampleRate(1000), 0.0001).is_err());
	}

	#[test]
	fn test_window_is_floored_before_counting_splits() {
		// 1000.5 nominal samples per window floors to 1000, so 3001 samples
		// hold 3 whole windows (not floor(3001 / 1000.5) = 2)
		let samples = vec![0.; 3001];
		let averaged = average_psd_samples(&samples, SampleRate(1000), 1.0005).unwrap();
		assert_eq!(averaged.splits(), 3);
		assert_eq!(averaged.frequencies().len(), 501);
	}

	#[test]
	fn test_fractional_window_seconds() {
		// 0.5s at 1kHz: 500-sample windows, 4 splits over 2000 samples
		let samples = vec![1.; 2000];
		let averaged = average_psd_samples(&samples, SampleRate(1000), 0.5).unwrap();
		assert_eq!(averaged.splits(), 4);
		assert_eq!(averaged.frequencies().len(), 251);
	}
}
