use std::{
	mem::replace,
	sync::{Arc, Mutex},
	time::Duration,
};

use cpal::{
	traits::{DeviceTrait, HostTrait, StreamTrait},
	Device, Stream, SupportedStreamConfig,
};
use vibration_analysis::{SampleRate, Waveform};

use crate::{CaptureBuilderError, CaptureSamplingState, CaptureStreamError};

/// Configures a one-shot recording: rate, channel count, capacity and
/// (optionally) which device and what engineering-unit scale to apply.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformRecorderBuilder {
	sample_rate: SampleRate,
	n_of_channels: usize,
	capacity: Duration,
	device_name: Option<String>,
	scale: Option<f64>,
}

impl WaveformRecorderBuilder {
	#[must_use]
	pub const fn new(sample_rate: SampleRate, n_of_channels: usize, capacity: Duration) -> Self {
		Self {
			sample_rate,
			n_of_channels,
			capacity,
			device_name: None,
			scale: None,
		}
	}

	/// Record from the named device instead of the default input.
	#[must_use]
	pub fn with_device_name(mut self, device_name: impl Into<String>) -> Self {
		self.device_name = Some(device_name.into());
		self
	}

	/// Multiply every sample by `scale` when materializing waveforms,
	/// converting the raw ±1.0 stream to engineering units. For a discovered
	/// sensor, use the recorded channel's entry of
	/// [`SensorInfo::scale`](crate::SensorInfo::scale).
	#[must_use]
	pub const fn with_scale(mut self, scale: f64) -> Self {
		self.scale = Some(scale);
		self
	}

	/// Build and start recording the input stream.
	///
	/// # Errors
	/// [`CaptureBuilderError`]
	pub fn build(&self) -> Result<WaveformRecorder, CaptureBuilderError> {
		let (device, config) = self.provide_device()?;
		log::debug!(
			"recording {} channel(s) at {} from {:?}",
			self.n_of_channels,
			self.sample_rate,
			device.name().unwrap_or_else(|_| "<unnamed>".to_owned())
		);
		Ok(WaveformRecorder::new(self, device, config))
	}

	fn provide_device(&self) -> Result<(Device, SupportedStreamConfig), CaptureBuilderError> {
		let mut devices = cpal::default_host()
			.input_devices()
			.map_err(|_| CaptureBuilderError::UnableToListDevices)?;

		let device = match self.device_name.as_deref() {
			Some(name) => devices
				.find(|d| d.name().is_ok_and(|n| n == name))
				.ok_or_else(|| CaptureBuilderError::DeviceNotFound(name.to_owned()))?,
			None => devices.next().ok_or(CaptureBuilderError::NoDeviceFound)?,
		};

		let config = device
			.supported_input_configs()
			.map_err(|_| CaptureBuilderError::NoConfigFound)?
			.find(|c| {
				c.channels() as usize == self.n_of_channels
					&& c.sample_format() == cpal::SampleFormat::F32
					&& (c.min_sample_rate().0 as usize..=c.max_sample_rate().0 as usize)
						.contains(&self.sample_rate.hz())
			})
			.map(|c| c.with_sample_rate(cpal::SampleRate(self.sample_rate.hz() as u32)))
			.ok_or(CaptureBuilderError::NoConfigFound)?;

		Ok((device, config))
	}
}

/// Accumulates an input stream into a bounded buffer until dropped or
/// consumed. The stream is owned by the recorder and stops with it.
pub struct WaveformRecorder {
	buffer: Arc<Mutex<Vec<f32>>>,
	error: Arc<Mutex<Option<CaptureStreamError>>>,
	capacity_samples: usize,
	sample_rate: SampleRate,
	n_of_channels: usize,
	scale: Option<f64>,
	// None when the stream failed to build/start; the failure is in `error`
	_stream: Option<Stream>,
}

impl WaveformRecorder {
	fn new(
		builder: &WaveformRecorderBuilder,
		device: Device,
		config: SupportedStreamConfig,
	) -> Self {
		let n_of_channels = builder.n_of_channels;
		#[allow(clippy::cast_possible_truncation)]
		let capacity_samples = n_of_channels
			* (builder.sample_rate.hz() * builder.capacity.as_micros() as usize / 1_000_000);

		let buffer: Arc<Mutex<Vec<f32>>> =
			Arc::new(Mutex::new(Vec::with_capacity(capacity_samples)));
		let error: Arc<Mutex<Option<CaptureStreamError>>> = Arc::new(Mutex::new(None));

		let stream = {
			let buffer = buffer.clone();
			let error_slot = error.clone();
			device
				.build_input_stream(
					&config.into(),
					move |data: &[f32], _: &_| {
						let mut b = buffer.lock().unwrap();
						let room = capacity_samples.saturating_sub(b.len());
						// whole frames only, so a full buffer always
						// deinterleaves cleanly
						let fillable =
							(room.min(data.len()) / n_of_channels) * n_of_channels;
						b.extend_from_slice(&data[..fillable]);
					},
					move |err| {
						*error_slot.lock().unwrap() =
							Some(CaptureStreamError::SamplingError(err.to_string()));
					},
					None,
				)
				.map_err(|err| CaptureStreamError::BuildFailed(err.to_string()))
				.and_then(|stream| {
					stream
						.play()
						.map(|()| stream)
						.map_err(|err| CaptureStreamError::StartFailed(err.to_string()))
				})
		};

		let stream = match stream {
			Ok(stream) => Some(stream),
			Err(err) => {
				*error.lock().unwrap() = Some(err);
				None
			}
		};

		Self {
			buffer,
			error,
			capacity_samples,
			sample_rate: builder.sample_rate,
			n_of_channels,
			scale: builder.scale,
			_stream: stream,
		}
	}

	#[must_use]
	pub fn state(&self) -> CaptureSamplingState {
		match self.error.lock().unwrap().clone() {
			None => CaptureSamplingState::Sampling,
			Some(err) => CaptureSamplingState::Stopped(err),
		}
	}

	/// Whether the accumulation buffer reached its configured capacity.
	#[must_use]
	pub fn is_full(&self) -> bool {
		self.buffer.lock().unwrap().len() >= self.capacity_samples
	}

	/// Materialize and clear the accumulated samples.
	#[must_use]
	pub fn take(&mut self) -> Waveform {
		let raw = replace(
			&mut *self.buffer.lock().unwrap(),
			Vec::with_capacity(self.capacity_samples),
		);
		self.to_waveform(&raw)
	}

	/// Materialize the accumulated samples without clearing them.
	#[must_use]
	pub fn snapshot(&self) -> Waveform {
		let raw = self.buffer.lock().unwrap().clone();
		self.to_waveform(&raw)
	}

	fn to_waveform(&self, raw: &[f32]) -> Waveform {
		let scale = self.scale.unwrap_or(1.);
		let samples = raw.iter().map(|&s| f64::from(s) * scale).collect();
		Waveform::from_interleaved(samples, self.n_of_channels, self.sample_rate)
			.expect("capture buffer holds whole frames")
	}

	#[must_use]
	pub fn sample_rate(&self) -> SampleRate {
		self.sample_rate
	}

	#[must_use]
	pub fn n_of_channels(&self) -> usize {
		self.n_of_channels
	}
}
