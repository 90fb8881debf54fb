// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod command;
pub mod crc;
pub mod error;
pub mod frame;
pub mod hal_traits;
pub mod timing;
pub mod types;

// --- Re-export key types/traits/functions for easier access ---

// From command.rs
pub use command::Command;

// From crc.rs
pub use crc::{calculate_crc8, verify_word_crc};

// From error.rs
pub use error::{Sps30Error, TransportFault};

// From frame.rs
pub use frame::{decode, encode, Payload, MAX_FRAME_LEN, MAX_PAYLOAD_LEN, MAX_RAW_LEN};

// From hal_traits.rs
pub use hal_traits::{Sps30Timer, Sps30Transport}; // Core sync traits

// From types.rs
pub use types::{
    DebugLevel, DeviceInfo, DeviceStatus, FirmwareVersion, Measurement, MeasurementField,
};

// From timing.rs (constants - users can access via common::timing::*)
// No re-exports by default.

// --- Feature-gated re-exports ---

// embedded-hal delay adapter (from hal_traits.rs)
#[cfg(feature = "embedded-hal")]
pub use hal_traits::HalDelay;
