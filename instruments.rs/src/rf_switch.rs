use std::time::Duration;

use crate::{InstrumentError, SerialLink};

/// Actuation pulse durations as reported by the controller, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseDurations {
	pub close_ms: u32,
	pub open_ms: u32,
}

/// Cryogenic RF switch matrix over its serial text protocol.
///
/// The controller chats: every command is acknowledged with a variable
/// number of status lines, and lines starting with `#` are comments. The
/// driver drains the whole response and hands back the meaningful lines.
pub struct CryoSwitch {
	link: SerialLink,
	n_of_switches: u8,
}

impl std::fmt::Debug for CryoSwitch {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CryoSwitch")
			.field("link", &self.link)
			.field("n_of_switches", &self.n_of_switches)
			.finish()
	}
}

impl CryoSwitch {
	/// Open the controller and drain its boot greeting. The controller
	/// needs a few seconds after the port opens before it listens.
	///
	/// # Errors
	/// [`InstrumentError::Serial`]
	pub fn open(path: &str, n_of_switches: u8) -> Result<Self, InstrumentError> {
		let link = SerialLink::open(
			serialport::new(path, 9600).timeout(Duration::from_millis(200)),
		)?;
		let mut switch = Self {
			link,
			n_of_switches,
		};
		std::thread::sleep(Duration::from_secs(5));
		let greeting = switch.drain_response()?;
		log::debug!("cryoswitch greeting: {greeting:?}");
		Ok(switch)
	}

	#[must_use]
	pub fn from_link(link: SerialLink, n_of_switches: u8) -> Self {
		Self {
			link,
			n_of_switches,
		}
	}

	/// Read response lines until the controller goes quiet, dropping
	/// `#`-prefixed comment lines.
	fn drain_response(&mut self) -> Result<Vec<String>, InstrumentError> {
		let mut lines = vec![];
		while let Some(line) = self.link.try_read_line()? {
			if !line.starts_with('#') {
				lines.push(line);
			}
		}
		Ok(lines)
	}

	fn command(&mut self, cmd: &str) -> Result<Vec<String>, InstrumentError> {
		self.link.write_cmd(cmd)?;
		std::thread::sleep(Duration::from_millis(100));
		self.drain_response()
	}

	fn check_switch(&self, switch: u8) -> Result<(), InstrumentError> {
		if (1..=self.n_of_switches).contains(&switch) {
			Ok(())
		} else {
			Err(InstrumentError::OutOfRange {
				parameter: "switch",
				value: f64::from(switch),
				min: 1.,
				max: f64::from(self.n_of_switches),
			})
		}
	}

	/// Open every port of one switch.
	///
	/// # Errors
	/// [`InstrumentError::OutOfRange`] on a bad switch number.
	pub fn open_ports(&mut self, switch: u8) -> Result<(), InstrumentError> {
		self.check_switch(switch)?;
		self.command(&format!("all {switch}")).map(|_| ())
	}

	/// Open every port of every switch.
	///
	/// # Errors
	/// [`InstrumentError`]
	pub fn open_all_ports(&mut self) -> Result<(), InstrumentError> {
		for switch in 1..=self.n_of_switches {
			self.open_ports(switch)?;
		}
		Ok(())
	}

	/// Pulse one port closed.
	///
	/// # Errors
	/// [`InstrumentError::OutOfRange`] on a bad switch number.
	pub fn enable_port(&mut self, switch: u8, port: u8) -> Result<(), InstrumentError> {
		self.check_switch(switch)?;
		self.command(&format!("tog {switch} {port} cls")).map(|_| ())
	}

	/// Pulse one port open.
	///
	/// # Errors
	/// [`InstrumentError::OutOfRange`] on a bad switch number.
	pub fn disable_port(&mut self, switch: u8, port: u8) -> Result<(), InstrumentError> {
		self.check_switch(switch)?;
		self.command(&format!("tog {switch} {port} opn")).map(|_| ())
	}

	/// Set the opening pulse duration, in milliseconds, and read back what
	/// the controller settled on.
	///
	/// # Errors
	/// [`InstrumentError`]
	pub fn set_open_duration(&mut self, ms: u32) -> Result<PulseDurations, InstrumentError> {
		self.command(&format!("opd {ms}"))?;
		self.pulse_durations()
	}

	/// Set the closing pulse duration, in milliseconds, and read back what
	/// the controller settled on.
	///
	/// # Errors
	/// [`InstrumentError`]
	pub fn set_close_duration(&mut self, ms: u32) -> Result<PulseDurations, InstrumentError> {
		self.command(&format!("cld {ms}"))?;
		self.pulse_durations()
	}

	/// Query the configured pulse durations. The controller reports one line
	/// per duration with the value as the fifth word.
	///
	/// # Errors
	/// [`InstrumentError::UnexpectedResponse`] when the report cannot be
	/// parsed.
	pub fn pulse_durations(&mut self) -> Result<PulseDurations, InstrumentError> {
		let lines = self.command("dur")?;
		let duration_of = |line: &str| {
			line.split_whitespace()
				.nth(4)
				.and_then(|word| word.parse().ok())
				.ok_or_else(|| InstrumentError::UnexpectedResponse {
					command: "dur".to_owned(),
					response: line.to_owned(),
				})
		};
		match lines.as_slice() {
			[close_line, open_line, ..] => Ok(PulseDurations {
				close_ms: duration_of(close_line)?,
				open_ms: duration_of(open_line)?,
			}),
			_ => Err(InstrumentError::UnexpectedResponse {
				command: "dur".to_owned(),
				response: lines.join("\n"),
			}),
		}
	}
}
