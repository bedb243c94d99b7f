use std::{
	io::{BufRead, BufReader, Write},
	net::{TcpStream, ToSocketAddrs},
	time::Duration,
};

use crate::{parse_csv_f64, parse_f64, InstrumentError};

/// Newline-terminated SCPI transport over TCP, the protocol spoken by the
/// VNA softwares on port 5025.
///
/// A handle only exists once the connection is up; there is no disconnected
/// state to check before every command.
#[derive(Debug)]
pub struct ScpiSocket {
	stream: TcpStream,
	reader: BufReader<TcpStream>,
}

impl ScpiSocket {
	/// Connect with the given response timeout.
	///
	/// # Errors
	/// [`InstrumentError::Io`] when the endpoint is unreachable.
	pub fn connect(addr: impl ToSocketAddrs, timeout: Duration) -> Result<Self, InstrumentError> {
		let addr = addr
			.to_socket_addrs()?
			.next()
			.ok_or_else(|| std::io::Error::from(std::io::ErrorKind::AddrNotAvailable))?;
		let stream = TcpStream::connect_timeout(&addr, timeout)?;
		stream.set_read_timeout(Some(timeout))?;
		stream.set_write_timeout(Some(timeout))?;
		let reader = BufReader::new(stream.try_clone()?);
		Ok(Self { stream, reader })
	}

	/// Send a command that produces no response.
	///
	/// # Errors
	/// [`InstrumentError::Io`]
	pub fn send(&mut self, cmd: &str) -> Result<(), InstrumentError> {
		log::debug!("scpi send: {cmd}");
		self.stream.write_all(cmd.as_bytes())?;
		self.stream.write_all(b"\n")?;
		Ok(())
	}

	/// Send a query and read one line of response, without the terminator.
	///
	/// # Errors
	/// [`InstrumentError::Io`], [`InstrumentError::Timeout`]
	pub fn query(&mut self, cmd: &str) -> Result<String, InstrumentError> {
		self.send(cmd)?;
		let mut line = String::new();
		let read = self.reader.read_line(&mut line).map_err(|err| {
			if matches!(
				err.kind(),
				std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
			) {
				InstrumentError::Timeout
			} else {
				InstrumentError::Io(err)
			}
		})?;
		if read == 0 {
			return Err(InstrumentError::Timeout);
		}
		let response = line.trim_end_matches(['\r', '\n']).to_owned();
		log::trace!("scpi recv: {response}");
		Ok(response)
	}

	/// # Errors
	/// [`InstrumentError::Parse`] on a non-numeric response.
	pub fn query_f64(&mut self, cmd: &str) -> Result<f64, InstrumentError> {
		let response = self.query(cmd)?;
		parse_f64(&response)
	}

	/// Query a comma-separated list of numbers, e.g. a trace or a frequency
	/// axis.
	///
	/// # Errors
	/// [`InstrumentError::Parse`] when any field is non-numeric.
	pub fn query_csv_f64(&mut self, cmd: &str) -> Result<Vec<f64>, InstrumentError> {
		let response = self.query(cmd)?;
		parse_csv_f64(&response)
	}

	/// # Errors
	/// [`InstrumentError::Io`], [`InstrumentError::Timeout`]
	pub fn idn(&mut self) -> Result<String, InstrumentError> {
		self.query("*IDN?")
	}
}
