use crate::{check_range, parse_f64, InstrumentError, SerialLink};

/// Output channel of a two-channel synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthChannel {
	A,
	B,
}

impl SynthChannel {
	const fn index(self) -> u8 {
		match self {
			Self::A => 0,
			Self::B => 1,
		}
	}
}

/// Reference clock selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefSource {
	External,
	Internal27Mhz,
	Internal10Mhz,
}

impl RefSource {
	const fn code(self) -> u8 {
		match self {
			Self::External => 0,
			Self::Internal27Mhz => 1,
			Self::Internal10Mhz => 2,
		}
	}
}

/// Windfreak SynthHD dual-channel RF synthesizer over its USB serial
/// protocol (single-letter unterminated commands, `?` suffix for queries).
///
/// Out-of-range setpoints are rejected before anything reaches the wire.
pub struct SynthHd {
	link: SerialLink,
}

impl std::fmt::Debug for SynthHd {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SynthHd").field("link", &self.link).finish()
	}
}

impl SynthHd {
	pub const MIN_FREQUENCY_MHZ: f64 = 10.;
	pub const MAX_FREQUENCY_MHZ: f64 = 15_000.;
	pub const MIN_POWER_DBM: f64 = -50.;
	pub const MAX_POWER_DBM: f64 = 20.;

	/// Open the synthesizer on the given serial device path.
	///
	/// # Errors
	/// [`InstrumentError::Serial`]
	pub fn open(path: &str) -> Result<Self, InstrumentError> {
		let link = SerialLink::open(
			serialport::new(path, 9600).timeout(std::time::Duration::from_secs(1)),
		)?;
		Ok(Self { link })
	}

	#[must_use]
	pub fn from_link(link: SerialLink) -> Self {
		Self { link }
	}

	fn select(&mut self, channel: SynthChannel) -> Result<(), InstrumentError> {
		self.link.write_raw(&format!("C{}", channel.index()))
	}

	/// # Errors
	/// [`InstrumentError::OutOfRange`] outside 10MHz..=15GHz.
	pub fn set_frequency_mhz(
		&mut self,
		channel: SynthChannel,
		mhz: f64,
	) -> Result<(), InstrumentError> {
		check_range(
			"frequency (MHz)",
			mhz,
			Self::MIN_FREQUENCY_MHZ,
			Self::MAX_FREQUENCY_MHZ,
		)?;
		self.select(channel)?;
		self.link.write_raw(&format!("f{mhz:.7}"))
	}

	/// # Errors
	/// [`InstrumentError`]
	pub fn frequency_mhz(&mut self, channel: SynthChannel) -> Result<f64, InstrumentError> {
		self.select(channel)?;
		self.link.write_raw("f?")?;
		parse_f64(&self.link.read_line()?)
	}

	/// # Errors
	/// [`InstrumentError::OutOfRange`] outside -50dBm..=20dBm.
	pub fn set_power_dbm(
		&mut self,
		channel: SynthChannel,
		dbm: f64,
	) -> Result<(), InstrumentError> {
		check_range("power (dBm)", dbm, Self::MIN_POWER_DBM, Self::MAX_POWER_DBM)?;
		self.select(channel)?;
		self.link.write_raw(&format!("W{dbm:.3}"))
	}

	/// # Errors
	/// [`InstrumentError`]
	pub fn power_dbm(&mut self, channel: SynthChannel) -> Result<f64, InstrumentError> {
		self.select(channel)?;
		self.link.write_raw("W?")?;
		parse_f64(&self.link.read_line()?)
	}

	/// Phase setpoint, wrapped into `[0, 360)`.
	///
	/// # Errors
	/// [`InstrumentError`]
	pub fn set_phase_deg(
		&mut self,
		channel: SynthChannel,
		degrees: f64,
	) -> Result<(), InstrumentError> {
		let wrapped = degrees.rem_euclid(360.);
		self.select(channel)?;
		self.link.write_raw(&format!("~{wrapped:.2}"))
	}

	/// Enable the PLL and unmute the RF output.
	///
	/// # Errors
	/// [`InstrumentError`]
	pub fn rf_on(&mut self, channel: SynthChannel) -> Result<(), InstrumentError> {
		self.select(channel)?;
		self.link.write_raw("E1")?;
		self.link.write_raw("r1")
	}

	/// Mute the RF output and power the PLL down.
	///
	/// # Errors
	/// [`InstrumentError`]
	pub fn rf_off(&mut self, channel: SynthChannel) -> Result<(), InstrumentError> {
		self.select(channel)?;
		self.link.write_raw("r0")?;
		self.link.write_raw("E0")
	}

	/// # Errors
	/// [`InstrumentError`]
	pub fn set_reference(&mut self, source: RefSource) -> Result<(), InstrumentError> {
		self.link.write_raw(&format!("x{}", source.code()))
	}
}
