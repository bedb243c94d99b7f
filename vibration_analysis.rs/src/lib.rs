mod common;
pub use common::*;

mod sample_rate;
pub use sample_rate::*;

mod waveform;
pub use waveform::*;

mod windowing_fn;
pub use windowing_fn::*;

pub mod windowing_fns;

mod bins;
pub use bins::*;

mod periodogram;
pub use periodogram::*;

mod average;
pub use average::*;

mod transmissibility;
pub use transmissibility::*;

pub use rustfft::num_complex;
