use std::{fmt::Display, net::ToSocketAddrs, time::Duration};

use crate::{InstrumentError, ScpiSocket};

/// Scattering parameter selectable for the measured trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SParameter {
	S11,
	S21,
	S12,
	S22,
}

impl Display for SParameter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::S11 => write!(f, "S11"),
			Self::S21 => write!(f, "S21"),
			Self::S12 => write!(f, "S12"),
			Self::S22 => write!(f, "S22"),
		}
	}
}

/// Vector network analyzer driver over SCPI.
///
/// Thin request/response wrapping; every setter issues one command and every
/// getter one query. Sweeps are bus-triggered and synchronized with `*OPC?`
/// so a trace read never observes a half-finished sweep.
#[derive(Debug)]
pub struct Vna {
	scpi: ScpiSocket,
}

impl Vna {
	/// Connect to a VNA SCPI server (port 5025 on the instrument softwares).
	///
	/// # Errors
	/// [`InstrumentError::Io`]
	pub fn connect(addr: impl ToSocketAddrs, timeout: Duration) -> Result<Self, InstrumentError> {
		Ok(Self {
			scpi: ScpiSocket::connect(addr, timeout)?,
		})
	}

	#[must_use]
	pub fn from_socket(scpi: ScpiSocket) -> Self {
		Self { scpi }
	}

	/// # Errors
	/// [`InstrumentError`]
	pub fn idn(&mut self) -> Result<String, InstrumentError> {
		self.scpi.idn()
	}

	/// Reset the instrument to default values.
	///
	/// # Errors
	/// [`InstrumentError`]
	pub fn reset(&mut self) -> Result<(), InstrumentError> {
		self.scpi.send("*RST")
	}

	/// # Errors
	/// [`InstrumentError`]
	pub fn clear_status(&mut self) -> Result<(), InstrumentError> {
		self.scpi.send("*CLS")
	}

	/// # Errors
	/// [`InstrumentError`]
	pub fn set_start_frequency(&mut self, hz: f64) -> Result<(), InstrumentError> {
		self.scpi.send(&format!("SENS:FREQ:STAR {hz}"))
	}

	/// # Errors
	/// [`InstrumentError`]
	pub fn set_stop_frequency(&mut self, hz: f64) -> Result<(), InstrumentError> {
		self.scpi.send(&format!("SENS:FREQ:STOP {hz}"))
	}

	/// Collapse the sweep to a single frequency.
	///
	/// # Errors
	/// [`InstrumentError`]
	pub fn set_cw_frequency(&mut self, hz: f64) -> Result<(), InstrumentError> {
		self.set_start_frequency(hz)?;
		self.set_stop_frequency(hz)
	}

	/// # Errors
	/// [`InstrumentError`]
	pub fn set_n_of_points(&mut self, points: usize) -> Result<(), InstrumentError> {
		self.scpi.send(&format!("SENS:SWE:POIN {points}"))
	}

	/// IF bandwidth.
	///
	/// # Errors
	/// [`InstrumentError`]
	pub fn set_bandwidth(&mut self, hz: f64) -> Result<(), InstrumentError> {
		self.scpi.send(&format!("SENS:BWID {hz}"))
	}

	/// # Errors
	/// [`InstrumentError`]
	pub fn set_power_dbm(&mut self, dbm: f64) -> Result<(), InstrumentError> {
		self.scpi.send(&format!("SOURce:POWer {dbm}"))
	}

	/// # Errors
	/// [`InstrumentError`]
	pub fn power_dbm(&mut self) -> Result<f64, InstrumentError> {
		self.scpi.query_f64("SOURce:POWer?")
	}

	/// Enable trace averaging over `count` sweeps, or disable it with `None`.
	///
	/// # Errors
	/// [`InstrumentError`]
	pub fn set_averaging(&mut self, count: Option<usize>) -> Result<(), InstrumentError> {
		match count {
			Some(count) => {
				self.scpi.send(&format!("SENS:AVER:COUN {count}"))?;
				self.scpi.send("SENS:AVER ON")?;
				self.scpi.send("TRIG:AVER ON")
			}
			None => {
				self.scpi.send("SENS:AVER OFF")?;
				self.scpi.send("TRIG:AVER OFF")
			}
		}
	}

	/// # Errors
	/// [`InstrumentError`]
	pub fn define_trace(&mut self, parameter: SParameter) -> Result<(), InstrumentError> {
		self.scpi.send(&format!("CALC:PAR:DEF {parameter}"))
	}

	/// Run one bus-triggered sweep and block until the instrument reports
	/// completion.
	///
	/// # Errors
	/// [`InstrumentError::UnexpectedResponse`] when the completion poll
	/// returns anything but `1`.
	pub fn single_sweep(&mut self) -> Result<(), InstrumentError> {
		self.scpi.send("TRIG:SOUR BUS")?;
		self.scpi.send("TRIG:SING")?;
		let response = self.scpi.query("*OPC?")?;
		if response.trim() != "1" {
			return Err(InstrumentError::UnexpectedResponse {
				command: "*OPC?".to_owned(),
				response,
			});
		}
		Ok(())
	}

	/// The stimulus frequency of every sweep point, in Hz.
	///
	/// # Errors
	/// [`InstrumentError`]
	pub fn frequency_axis(&mut self) -> Result<Vec<f64>, InstrumentError> {
		self.scpi.query_csv_f64("SENS:FREQ:DATA?")
	}

	/// The formatted data of the active trace.
	///
	/// # Errors
	/// [`InstrumentError`]
	pub fn read_trace(&mut self) -> Result<Vec<f64>, InstrumentError> {
		self.scpi.query_csv_f64("CALC:TRAC:DATA:FDAT?")
	}
}

#[cfg(test)]
mod tests {
	use std::{
		io::{BufRead, BufReader, Write},
		net::TcpListener,
		sync::mpsc,
		thread,
	};

	use super::*;

	/// Records every command; answers queries from a script. Returns the
	/// address and a channel with the received lines.
	fn scripted_vna(responses: Vec<&'static str>) -> (String, mpsc::Receiver<String>) {
		let listener = TcpListener::bind("127.0.0.1:0").unwrap();
		let addr = listener.local_addr().unwrap().to_string();
		let (tx, rx) = mpsc::channel();
		thread::spawn(move || {
			let (stream, _) = listener.accept().unwrap();
			let mut writer = stream.try_clone().unwrap();
			let reader = BufReader::new(stream);
			let mut responses = responses.into_iter();
			for line in reader.lines() {
				let line = line.unwrap();
				let is_query = line.ends_with('?');
				tx.send(line).unwrap();
				if is_query {
					writeln!(writer, "{}", responses.next().unwrap()).unwrap();
				}
			}
		});
		(addr, rx)
	}

	#[test]
	fn test_sweep_setup_commands() {
		let (addr, rx) = scripted_vna(vec!["1", "4e9,5e9,6e9", "-80,-81,-82"]);
		let mut vna = Vna::connect(addr, Duration::from_secs(1)).unwrap();

		vna.set_start_frequency(4e9).unwrap();
		vna.set_stop_frequency(6e9).unwrap();
		vna.set_n_of_points(3).unwrap();
		vna.set_power_dbm(-10.).unwrap();
		vna.define_trace(SParameter::S21).unwrap();
		vna.single_sweep().unwrap();
		let frequencies = vna.frequency_axis().unwrap();
		let trace = vna.read_trace().unwrap();

		assert_eq!(frequencies, vec![4e9, 5e9, 6e9]);
		assert_eq!(trace, vec![-80., -81., -82.]);

		let sent: Vec<String> = rx.try_iter().collect();
		assert_eq!(
			sent,
			vec![
				"SENS:FREQ:STAR 4000000000",
				"SENS:FREQ:STOP 6000000000",
				"SENS:SWE:POIN 3",
				"SOURce:POWer -10",
				"CALC:PAR:DEF S21",
				"TRIG:SOUR BUS",
				"TRIG:SING",
				"*OPC?",
				"SENS:FREQ:DATA?",
				"CALC:TRAC:DATA:FDAT?",
			]
		);
	}

	#[test]
	fn test_averaging_toggle() {
		let (addr, rx) = scripted_vna(vec![]);
		let mut vna = Vna::connect(addr, Duration::from_secs(1)).unwrap();
		vna.set_averaging(Some(16)).unwrap();
		vna.set_averaging(None).unwrap();
		// allow the listener thread to drain the socket
		thread::sleep(Duration::from_millis(100));
		let sent: Vec<String> = rx.try_iter().collect();
		assert_eq!(
			sent,
			vec![
				"SENS:AVER:COUN 16",
				"SENS:AVER ON",
				"TRIG:AVER ON",
				"SENS:AVER OFF",
				"TRIG:AVER OFF",
			]
		);
	}

	#[test]
	fn test_sweep_completion_is_checked() {
		let (addr, _rx) = scripted_vna(vec!["0"]);
		let mut vna = Vna::connect(addr, Duration::from_secs(1)).unwrap();
		assert!(matches!(
			vna.single_sweep(),
			Err(InstrumentError::UnexpectedResponse { .. })
		));
	}
}
