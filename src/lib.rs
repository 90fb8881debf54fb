// src/lib.rs

#![no_std] // Specify no_std at the crate root

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod common;
pub mod device;

// Re-export key types for convenience
pub use common::error::{Sps30Error, TransportFault};
pub use common::hal_traits::{Sps30Timer, Sps30Transport};
pub use common::types::{
    DebugLevel, DeviceInfo, DeviceStatus, FirmwareVersion, Measurement, MeasurementField,
};
pub use device::{Config, Sps30};
