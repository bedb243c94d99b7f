use std::io::{Read, Write};

use serialport::SerialPort;

use crate::InstrumentError;

/// Line-oriented text transport over a serial port, shared by the serial
/// instruments (synthesizer, RF switch, temperature monitor).
pub struct SerialLink {
	port: Box<dyn SerialPort>,
}

impl std::fmt::Debug for SerialLink {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SerialLink")
			.field("port", &self.port.name())
			.finish()
	}
}

impl SerialLink {
	/// # Errors
	/// [`InstrumentError::Serial`] when the port cannot be opened.
	pub fn open(builder: serialport::SerialPortBuilder) -> Result<Self, InstrumentError> {
		Ok(Self {
			port: builder.open()?,
		})
	}

	/// Wrap an already-open port.
	#[must_use]
	pub fn from_port(port: Box<dyn SerialPort>) -> Self {
		Self { port }
	}

	/// Write a command terminated with `\r\n`.
	///
	/// # Errors
	/// [`InstrumentError::Io`]
	pub fn write_cmd(&mut self, cmd: &str) -> Result<(), InstrumentError> {
		log::debug!("serial send: {cmd}");
		self.port.write_all(cmd.as_bytes())?;
		self.port.write_all(b"\r\n")?;
		Ok(())
	}

	/// Write raw bytes with no terminator (the Windfreak protocol is
	/// unterminated).
	///
	/// # Errors
	/// [`InstrumentError::Io`]
	pub fn write_raw(&mut self, cmd: &str) -> Result<(), InstrumentError> {
		log::debug!("serial send: {cmd}");
		self.port.write_all(cmd.as_bytes())?;
		Ok(())
	}

	/// Read one `\n`-terminated line, without the terminator.
	///
	/// # Errors
	/// [`InstrumentError::Timeout`] when the port goes silent mid-line.
	pub fn read_line(&mut self) -> Result<String, InstrumentError> {
		match self.try_read_line()? {
			Some(line) => Ok(line),
			None => Err(InstrumentError::Timeout),
		}
	}

	/// Like [`read_line`](Self::read_line), but a timeout before the first
	/// byte yields `None` instead of an error. Used to drain chatty devices
	/// that send a variable number of status lines.
	///
	/// # Errors
	/// [`InstrumentError::Io`], [`InstrumentError::Timeout`] (mid-line only)
	pub fn try_read_line(&mut self) -> Result<Option<String>, InstrumentError> {
		let mut line = Vec::new();
		let mut byte = [0u8; 1];
		loop {
			match self.port.read(&mut byte) {
				Ok(0) => return Err(InstrumentError::Timeout),
				Ok(_) => {
					if byte[0] == b'\n' {
						let line = String::from_utf8_lossy(&line)
							.trim_end_matches('\r')
							.to_owned();
						log::trace!("serial recv: {line}");
						return Ok(Some(line));
					}
					line.push(byte[0]);
				}
				Err(err)
					if matches!(
						err.kind(),
						std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
					) =>
				{
					if line.is_empty() {
						return Ok(None);
					}
					return Err(InstrumentError::Timeout);
				}
				Err(err) => return Err(InstrumentError::Io(err)),
			}
		}
	}

	/// # Errors
	/// [`InstrumentError::Io`], [`InstrumentError::Timeout`]
	pub fn query(&mut self, cmd: &str) -> Result<String, InstrumentError> {
		self.write_cmd(cmd)?;
		self.read_line()
	}
}
