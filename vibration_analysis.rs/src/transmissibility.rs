use rustfft::{
	num_complex::{Complex, Complex64},
	FftPlanner,
};

use crate::{
	frequency_bins, psd_real_length, AnalysisError, PsdConfig, SampleRate, ShapeMismatch, Waveform,
};

/// Frequency response ratio between two simultaneously captured waveforms,
/// e.g. accelerometers on either side of a vibration isolation stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Transmissibility {
	frequencies: Vec<f64>,
	ratio: Vec<f64>,
}

impl Transmissibility {
	#[must_use]
	pub fn frequencies(&self) -> &[f64] {
		&self.frequencies
	}

	/// `|H(f)|`: output spectrum magnitude over input spectrum magnitude.
	#[must_use]
	pub fn ratio(&self) -> &[f64] {
		&self.ratio
	}

	#[must_use]
	pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
		(self.frequencies, self.ratio)
	}
}

/// One-sided complex spectrum of one channel, averaged over whole windows.
/// Same windowing policy as the PSD averager: trailing samples discarded.
fn averaged_spectrum(
	waveform: &Waveform,
	config: &PsdConfig,
) -> Result<(SampleRate, usize, Vec<Complex64>), AnalysisError> {
	let samples = waveform.channel(config.channel)?;
	let sample_rate = waveform.sample_rate();

	#[allow(clippy::cast_precision_loss, clippy::cast_sign_loss, clippy::cast_possible_truncation)]
	let window_samples = (sample_rate.as_f64() * config.window_seconds).floor() as usize;
	let splits = if window_samples < 1 {
		0
	} else {
		samples.len() / window_samples
	};
	if splits < 1 {
		return Err(AnalysisError::InsufficientData {
			samples: samples.len(),
			window_samples,
		});
	}

	let mut planner = FftPlanner::new();
	let fft_processor = planner.plan_fft_forward(window_samples);
	let mut complex_signal = vec![Complex { re: 0., im: 0. }; window_samples];
	let mut accumulated = vec![Complex { re: 0., im: 0. }; psd_real_length(window_samples)];

	for window in samples.chunks_exact(window_samples) {
		for (c, sample) in complex_signal.iter_mut().zip(window) {
			*c = Complex::new(*sample, 0.);
		}
		fft_processor.process(&mut complex_signal);
		for (acc, c) in accumulated.iter_mut().zip(complex_signal.iter()) {
			*acc += *c;
		}
	}

	#[allow(clippy::cast_precision_loss)]
	let splits_f = splits as f64;
	for acc in &mut accumulated {
		*acc /= splits_f;
	}

	Ok((sample_rate, window_samples, accumulated))
}

/// Elementwise magnitude ratio of the averaged spectra of `output` over
/// `input`.
///
/// # Errors
/// - [`AnalysisError::InsufficientData`] when either waveform is shorter than
///   one window.
/// - [`AnalysisError::ShapeMismatch`] on a bad channel index, or when the two
///   averaged spectra end up with different bin counts (mismatched rates or
///   recording lengths shorter than the shared window).
pub fn transmissibility(
	input: &Waveform,
	output: &Waveform,
	config: &PsdConfig,
) -> Result<Transmissibility, AnalysisError> {
	let (sample_rate, window_samples, input_spectrum) = averaged_spectrum(input, config)?;
	let (_, _, output_spectrum) = averaged_spectrum(output, config)?;

	if input_spectrum.len() != output_spectrum.len() {
		return Err(ShapeMismatch::BinCountMismatch {
			left: input_spectrum.len(),
			right: output_spectrum.len(),
		}
		.into());
	}

	let ratio = output_spectrum
		.iter()
		.zip(&input_spectrum)
		.map(|(out, inp)| (out / inp).norm())
		.collect();

	Ok(Transmissibility {
		frequencies: frequency_bins(sample_rate, window_samples).collect(),
		ratio,
	})
}
