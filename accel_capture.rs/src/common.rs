#[derive(Debug, Clone)]
pub enum CaptureSamplingState {
	Sampling,
	Stopped(CaptureStreamError),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureBuilderError {
	#[error("unable to list input devices")]
	UnableToListDevices,
	#[error("no available device found")]
	NoDeviceFound,
	#[error("no input device named {0:?} found")]
	DeviceNotFound(String),
	#[error("no available stream configuration found")]
	NoConfigFound,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureStreamError {
	#[error("unable to build stream")]
	BuildFailed(String),
	#[error("unable to start stream")]
	StartFailed(String),
	#[error("error while sampling")]
	SamplingError(String),
}
