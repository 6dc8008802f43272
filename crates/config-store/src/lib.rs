//! Configuration Store
//!
//! Holds the live sensor configuration behind its own lock domain, validates
//! every candidate before it is committed and describes the boot-time
//! properties a device is created from.

mod error;
mod properties;
mod store;
mod validator;

pub use error::ValidationError;
pub use properties::DeviceProperties;
pub use store::{ConfigChange, ConfigStore, ConfigWriter, Configuration};
pub use validator::{Validator, MAX_SAMPLING_MS, MIN_SAMPLING_MS};
