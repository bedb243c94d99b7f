//! Waveform persistence.
//!
//! Recordings are stored as 32-bit float WAV files: the header carries the
//! sample rate and channel count, so a loaded waveform can never silently
//! come back at the wrong rate — the failure mode of headerless flat array
//! dumps consumed by index.

use std::path::Path;

use vibration_analysis::{SampleRate, Waveform};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
	#[error("i/o or codec failure")]
	Wav(#[from] hound::Error),
	#[error("unsupported sample format: expected 32-bit float, found {bits}-bit {format:?}")]
	UnsupportedFormat {
		bits: u16,
		format: hound::SampleFormat,
	},
	#[error("file holds a partial frame and cannot be deinterleaved")]
	Corrupt,
}

/// # Errors
/// [`StoreError::Wav`] on i/o or encoding failure.
#[allow(clippy::cast_possible_truncation)]
pub fn save(path: impl AsRef<Path>, waveform: &Waveform) -> Result<(), StoreError> {
	let spec = hound::WavSpec {
		channels: waveform.n_of_channels() as u16,
		sample_rate: waveform.sample_rate().hz() as u32,
		bits_per_sample: 32,
		sample_format: hound::SampleFormat::Float,
	};
	log::debug!(
		"saving {} frame(s) at {} to {:?}",
		waveform.n_of_frames(),
		waveform.sample_rate(),
		path.as_ref()
	);
	let mut writer = hound::WavWriter::create(path, spec)?;
	for &sample in waveform.raw_samples() {
		writer.write_sample(sample as f32)?;
	}
	writer.finalize()?;
	Ok(())
}

/// # Errors
/// - [`StoreError::UnsupportedFormat`] when the file is not 32-bit float.
/// - [`StoreError::Corrupt`] when the sample count does not fill whole
///   frames.
pub fn load(path: impl AsRef<Path>) -> Result<Waveform, StoreError> {
	let mut reader = hound::WavReader::open(path.as_ref())?;
	let spec = reader.spec();
	if spec.sample_format != hound::SampleFormat::Float || spec.bits_per_sample != 32 {
		return Err(StoreError::UnsupportedFormat {
			bits: spec.bits_per_sample,
			format: spec.sample_format,
		});
	}

	let samples: Vec<f64> = reader
		.samples::<f32>()
		.map(|s| s.map(f64::from))
		.collect::<Result<_, _>>()?;

	log::debug!(
		"loaded {} sample(s) at {}Hz from {:?}",
		samples.len(),
		spec.sample_rate,
		path.as_ref()
	);
	Waveform::from_interleaved(
		samples,
		spec.channels as usize,
		SampleRate(spec.sample_rate as usize),
	)
	.map_err(|_| StoreError::Corrupt)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_round_trip_preserves_metadata() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("run.wav");

		let samples: Vec<f64> = (0..1000).map(|i| f64::from(i) / 1000.).collect();
		let original = Waveform::from_interleaved(samples, 2, SampleRate(48000)).unwrap();
		save(&path, &original).unwrap();

		let loaded = load(&path).unwrap();
		assert_eq!(loaded.sample_rate(), SampleRate(48000));
		assert_eq!(loaded.n_of_channels(), 2);
		assert_eq!(loaded.n_of_frames(), 500);
		for (a, b) in original.raw_samples().iter().zip(loaded.raw_samples()) {
			// samples pass through f32 on disk
			assert!((a - b).abs() < f64::from(f32::EPSILON));
		}
	}

	#[test]
	fn test_non_float_file_is_rejected() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("pcm16.wav");

		let spec = hound::WavSpec {
			channels: 1,
			sample_rate: 48000,
			bits_per_sample: 16,
			sample_format: hound::SampleFormat::Int,
		};
		let mut writer = hound::WavWriter::create(&path, spec).unwrap();
		writer.write_sample(0i16).unwrap();
		writer.finalize().unwrap();

		assert!(matches!(
			load(&path),
			Err(StoreError::UnsupportedFormat { bits: 16, .. })
		));
	}

	#[test]
	fn test_loaded_waveform_feeds_the_averager() {
		use vibration_analysis::{average_psd, PsdConfig};

		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("sine.wav");

		let samples: Vec<f64> = (0..8000)
			.map(|i| f64::sin(std::f64::consts::TAU * 440. * f64::from(i) / 8000.))
			.collect();
		save(&path, &Waveform::from_mono(samples, SampleRate(8000))).unwrap();

		let averaged = average_psd(
			&load(&path).unwrap(),
			&PsdConfig {
				window_seconds: 1.,
				channel: 0,
			},
		)
		.unwrap();
		assert_eq!(averaged.splits(), 1);
		assert_eq!(averaged.frequencies().len(), 4001);
	}
}
