#[derive(thiserror::Error, Debug)]
pub enum InstrumentError {
	#[error("i/o failure while talking to the instrument")]
	Io(#[from] std::io::Error),
	#[error("unable to open the serial port")]
	Serial(#[from] serialport::Error),
	#[error("timed out waiting for a response")]
	Timeout,
	#[error("unparsable response {response:?}")]
	Parse { response: String },
	#[error("{parameter} {value} is outside the allowed range {min}..={max}")]
	OutOfRange {
		parameter: &'static str,
		value: f64,
		min: f64,
		max: f64,
	},
	#[error("unexpected response {response:?} to {command:?}")]
	UnexpectedResponse { command: String, response: String },
}

pub(crate) fn check_range(
	parameter: &'static str,
	value: f64,
	min: f64,
	max: f64,
) -> Result<(), InstrumentError> {
	if (min..=max).contains(&value) {
		Ok(())
	} else {
		Err(InstrumentError::OutOfRange {
			parameter,
			value,
			min,
			max,
		})
	}
}

pub(crate) fn parse_f64(response: &str) -> Result<f64, InstrumentError> {
	response
		.trim()
		.parse()
		.map_err(|_| InstrumentError::Parse {
			response: response.to_owned(),
		})
}

pub(crate) fn parse_csv_f64(response: &str) -> Result<Vec<f64>, InstrumentError> {
	response
		.trim()
		.split(',')
		.map(|field| {
			field.trim().parse().map_err(|_| InstrumentError::Parse {
				response: response.to_owned(),
			})
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_csv() {
		assert_eq!(
			parse_csv_f64("1.0, 2.5,3e9\n").unwrap(),
			vec![1., 2.5, 3e9]
		);
		assert!(parse_csv_f64("1.0,abc").is_err());
	}

	#[test]
	fn test_check_range() {
		assert!(check_range("power", -5., -50., 20.).is_ok());
		assert!(matches!(
			check_range("power", 30., -50., 20.),
			Err(InstrumentError::OutOfRange { parameter: "power", .. })
		));
	}
}
