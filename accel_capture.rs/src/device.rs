use cpal::traits::{DeviceTrait, HostTrait};

use crate::CaptureBuilderError;

/// Model number substrings of The Modal Shop USB-audio devices: digital
/// accelerometers (333D, 633A), signal conditioners (485B) and the SDC line.
pub const TMS_MODELS: [&str; 4] = ["485B", "333D", "633A", "SDC0"];

/// Full-scale counts per g of the acceleration devices.
const ACCELERATION_COUNTS: f64 = 855_400.;
/// Full-scale counts per volt of the voltage devices.
const VOLTAGE_COUNTS: f64 = 8_388_608.;

/// What the raw sample stream represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorFormat {
	/// Scaled samples are in g.
	Acceleration,
	/// Scaled samples are in volts.
	Voltage,
}

/// A recognized USB accelerometer / signal conditioner, with the calibration
/// record the device encodes at fixed offsets in its name (per the MAN-0343
/// USB Audio Interface Guide).
#[derive(Debug, Clone, PartialEq)]
pub struct SensorInfo {
	/// Full device name, usable with
	/// [`WaveformRecorderBuilder::with_device_name`](crate::WaveformRecorderBuilder::with_device_name).
	pub device_name: String,
	/// Model number, e.g. `333D01`.
	pub model: String,
	/// Unit serial number.
	pub serial_number: String,
	pub format: SensorFormat,
	/// Raw per-channel sensitivity, in counts per engineering unit.
	pub sensitivity: [u32; 2],
	/// Per-channel factor converting the raw ±1.0 samples to engineering
	/// units (g or volts). Feed the recorded channel's entry to
	/// [`WaveformRecorderBuilder::with_scale`](crate::WaveformRecorderBuilder::with_scale).
	pub scale: [f64; 2],
	/// Calibration date as encoded, `yymmdd`.
	pub calibration_date: String,
}

/// Decode the name blob of a device such as
/// `"Digiducer 333D01012101570855417108220610 Audio"`: six model characters,
/// a format digit at offset 7, six serial digits, two per-channel
/// sensitivities (five digits each for acceleration, seven for voltage) and
/// the calibration date.
fn parse_sensor_name(device_name: &str) -> Option<SensorInfo> {
	let loc = TMS_MODELS
		.iter()
		.find_map(|model| device_name.find(model))?;
	let field = |offset: usize, len: usize| device_name.get(loc + offset..loc + offset + len);
	let int_field = |offset: usize, len: usize| field(offset, len)?.parse::<u32>().ok();

	let model = field(0, 6)?;
	let serial_number = field(8, 6)?;
	let (format, sensitivity, calibration_date) = match field(7, 1)? {
		"1" => {
			let sensitivity = [int_field(14, 5)?, int_field(19, 5)?];
			(SensorFormat::Acceleration, sensitivity, field(24, 6)?)
		}
		format @ ("2" | "3") => {
			let mut sensitivity = [int_field(14, 7)?, int_field(21, 7)?];
			if format == "3" {
				// format 3 is referenced to 50mV; convert to the 1V reference
				sensitivity = sensitivity.map(|s| s * 20);
			}
			(SensorFormat::Voltage, sensitivity, field(28, 6)?)
		}
		_ => return None,
	};

	let counts = match format {
		SensorFormat::Acceleration => ACCELERATION_COUNTS,
		SensorFormat::Voltage => VOLTAGE_COUNTS,
	};
	let scale = sensitivity.map(|s| counts / f64::from(s));

	Some(SensorInfo {
		device_name: device_name.to_owned(),
		model: model.to_owned(),
		serial_number: serial_number.to_owned(),
		format,
		sensitivity,
		scale,
		calibration_date: calibration_date.to_owned(),
	})
}

/// Enumerate the input devices of the default host and keep the ones that
/// identify as TMS sensors.
///
/// # Errors
/// [`CaptureBuilderError::UnableToListDevices`]
pub fn find_sensors() -> Result<Vec<SensorInfo>, CaptureBuilderError> {
	let devices = cpal::default_host()
		.input_devices()
		.map_err(|_| CaptureBuilderError::UnableToListDevices)?;

	let mut sensors = vec![];
	for device in devices {
		let Ok(name) = device.name() else {
			continue;
		};
		if let Some(info) = parse_sensor_name(&name) {
			log::debug!(
				"found sensor {} (serial {}, scale {:?})",
				info.model,
				info.serial_number,
				info.scale
			);
			sensors.push(info);
		}
	}
	Ok(sensors)
}
