mod common;
pub use common::*;

mod device;
pub use device::*;

mod recorder;
pub use recorder::*;
