mod error;
pub use error::*;

mod scpi;
pub use scpi::*;

mod serial_link;
pub use serial_link::*;

mod vna;
pub use vna::*;

mod synth;
pub use synth::*;

mod rf_switch;
pub use rf_switch::*;

mod lakeshore;
pub use lakeshore::*;
