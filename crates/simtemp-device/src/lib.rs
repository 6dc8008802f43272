//! Simulated Temperature Sensor Device
//!
//! Ties the sampling engine together behind a single [`Device`] handle:
//! creation and teardown, the blocking/non-blocking consumer contract, the
//! byte-stream [`Session`] endpoint and the textual attribute and
//! structured control-command bridges.

mod attributes;
mod consumer;
mod control;
mod device;
mod error;
mod session;

pub use attributes::Attribute;
pub use consumer::{ReadMode, Readiness};
pub use control::ControlResponse;
pub use device::Device;
pub use error::DeviceError;
pub use session::Session;

pub use config_store::{Configuration, DeviceProperties};
pub use sample_generator::StatsSnapshot;
pub use simtemp_protocol::{Mode, Sample};
