#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum AnalysisError {
	#[error("cannot fit a whole window of {window_samples} sample(s) in a waveform of {samples} sample(s)")]
	InsufficientData {
		samples: usize,
		window_samples: usize,
	},
	#[error("shape mismatch: {reason}")]
	ShapeMismatch { reason: ShapeMismatch },
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeMismatch {
	#[error("channel {channel} requested, but the waveform only has {n_of_channels} channel(s)")]
	ChannelOutOfRange {
		channel: usize,
		n_of_channels: usize,
	},
	#[error("buffer of {samples} samples cannot be split into {n_of_channels} channel(s)")]
	MisalignedBuffer {
		samples: usize,
		n_of_channels: usize,
	},
	#[error("spectra of {left} and {right} bins cannot be compared elementwise")]
	BinCountMismatch { left: usize, right: usize },
}

impl From<ShapeMismatch> for AnalysisError {
	fn from(reason: ShapeMismatch) -> Self {
		Self::ShapeMismatch { reason }
	}
}
