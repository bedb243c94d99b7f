use std::time::Duration;

use crate::{AnalysisError, SampleRate, ShapeMismatch};

/// An immutable, fixed-rate recording.
///
/// Samples are stored interleaved: frame `i` occupies
/// `[i * n_of_channels, (i + 1) * n_of_channels)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
	samples: Vec<f64>,
	n_of_channels: usize,
	sample_rate: SampleRate,
}

impl Waveform {
	/// Wrap an interleaved buffer.
	///
	/// # Errors
	/// [`AnalysisError::ShapeMismatch`] when `n_of_channels` is zero or the buffer
	/// length is not a multiple of it.
	pub fn from_interleaved(
		samples: Vec<f64>,
		n_of_channels: usize,
		sample_rate: SampleRate,
	) -> Result<Self, AnalysisError> {
		if n_of_channels == 0 || samples.len() % n_of_channels != 0 {
			return Err(ShapeMismatch::MisalignedBuffer {
				samples: samples.len(),
				n_of_channels,
			}
			.into());
		}
		Ok(Self {
			samples,
			n_of_channels,
			sample_rate,
		})
	}

	#[must_use]
	pub fn from_mono(samples: Vec<f64>, sample_rate: SampleRate) -> Self {
		Self {
			samples,
			n_of_channels: 1,
			sample_rate,
		}
	}

	#[must_use]
	pub fn sample_rate(&self) -> SampleRate {
		self.sample_rate
	}

	#[must_use]
	pub fn n_of_channels(&self) -> usize {
		self.n_of_channels
	}

	/// The number of sampling points in time, regardless of the number of channels.
	#[must_use]
	pub fn n_of_frames(&self) -> usize {
		self.samples.len() / self.n_of_channels
	}

	#[must_use]
	#[allow(clippy::cast_precision_loss)]
	pub fn duration(&self) -> Duration {
		Duration::from_secs_f64(self.n_of_frames() as f64 / self.sample_rate.as_f64())
	}

	#[must_use]
	pub fn raw_samples(&self) -> &[f64] {
		&self.samples
	}

	/// Deinterleave one channel into a contiguous buffer.
	///
	/// # Errors
	/// [`AnalysisError::ShapeMismatch`] when `channel` is out of range.
	pub fn channel(&self, channel: usize) -> Result<Vec<f64>, AnalysisError> {
		if channel >= self.n_of_channels {
			return Err(ShapeMismatch::ChannelOutOfRange {
				channel,
				n_of_channels: self.n_of_channels,
			}
			.into());
		}
		Ok(self
			.samples
			.iter()
			.skip(channel)
			.step_by(self.n_of_channels)
			.copied()
			.collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_channel_extraction() {
		let waveform = Waveform::from_interleaved(
			vec![1., 10., 2., 20., 3., 30.],
			2,
			SampleRate(48000),
		)
		.unwrap();
		assert_eq!(waveform.n_of_frames(), 3);
		assert_eq!(waveform.channel(0).unwrap(), vec![1., 2., 3.]);
		assert_eq!(waveform.channel(1).unwrap(), vec![10., 20., 30.]);
	}

	#[test]
	fn test_channel_out_of_range() {
		let waveform = Waveform::from_mono(vec![0.; 8], SampleRate(8));
		assert_eq!(
			waveform.channel(1),
			Err(ShapeMismatch::ChannelOutOfRange {
				channel: 1,
				n_of_channels: 1
			}
			.into())
		);
	}

	#[test]
	fn test_misaligned_buffer() {
		assert!(Waveform::from_interleaved(vec![0.; 7], 2, SampleRate(48000)).is_err());
		assert!(Waveform::from_interleaved(vec![0.; 8], 0, SampleRate(48000)).is_err());
	}

	#[test]
	fn test_duration() {
		let waveform = Waveform::from_mono(vec![0.; 24000], SampleRate(48000));
		assert_eq!(waveform.duration(), Duration::from_millis(500));
	}
}
