use std::time::Duration;

use serialport::{DataBits, Parity};

use crate::{check_range, parse_f64, InstrumentError, SerialLink};

/// Lakeshore 372 AC resistance bridge / temperature controller over its
/// 57600 7O1 serial line. Used to log cryostat thermometry and to drive the
/// mixing chamber heater during temperature sweeps.
pub struct Lakeshore372 {
	link: SerialLink,
}

impl std::fmt::Debug for Lakeshore372 {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Lakeshore372")
			.field("link", &self.link)
			.finish()
	}
}

impl Lakeshore372 {
	/// # Errors
	/// [`InstrumentError::Serial`]
	pub fn open(path: &str) -> Result<Self, InstrumentError> {
		let link = SerialLink::open(
			serialport::new(path, 57600)
				.data_bits(DataBits::Seven)
				.parity(Parity::Odd)
				.timeout(Duration::from_secs(1)),
		)?;
		Ok(Self { link })
	}

	#[must_use]
	pub fn from_link(link: SerialLink) -> Self {
		Self { link }
	}

	/// # Errors
	/// [`InstrumentError`]
	pub fn idn(&mut self) -> Result<String, InstrumentError> {
		self.link.query("*IDN?")
	}

	/// Resistance reading of one scanner channel, in Ohms.
	///
	/// # Errors
	/// [`InstrumentError`]
	pub fn resistance_ohms(&mut self, channel: u8) -> Result<f64, InstrumentError> {
		let response = self.link.query(&format!("RDGR? {channel}"))?;
		parse_f64(&response)
	}

	/// Calibrated temperature reading of one scanner channel, in Kelvin.
	///
	/// # Errors
	/// [`InstrumentError`]
	pub fn temperature_kelvin(&mut self, channel: u8) -> Result<f64, InstrumentError> {
		let response = self.link.query(&format!("RDGK? {channel}"))?;
		parse_f64(&response)
	}

	/// Manual heater output, percent of range.
	///
	/// # Errors
	/// [`InstrumentError::OutOfRange`] outside 0..=100.
	pub fn set_heater_output(&mut self, percent: f64) -> Result<(), InstrumentError> {
		check_range("heater output (%)", percent, 0., 100.)?;
		self.link.write_cmd(&format!("MOUT 0,{percent}"))
	}

	/// # Errors
	/// [`InstrumentError`]
	pub fn heater_output(&mut self) -> Result<f64, InstrumentError> {
		let response = self.link.query("MOUT? 0")?;
		parse_f64(&response)
	}

	/// Resistance of every listed channel, in order. One slow scan pass,
	/// the way the cryostat sweep loggers poll their thermometer lists.
	///
	/// # Errors
	/// [`InstrumentError`]
	pub fn scan_resistances(
		&mut self,
		channels: &[u8],
	) -> Result<Vec<(u8, f64)>, InstrumentError> {
		channels
			.iter()
			.map(|&ch| Ok((ch, self.resistance_ohms(ch)?)))
			.collect()
	}
}
