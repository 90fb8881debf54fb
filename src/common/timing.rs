// src/common/timing.rs

use core::time::Duration;

// Nominal values from the SPS30 datasheet (March 2020) and the timings the
// sensor is known to need in practice. The engine treats all of these as
// fixed blocking delays; there is no adaptive timing.

// === Instruction Settle Delays ===

/// Wait after `StartMeasurement` before the device is ready for traffic.
pub const START_SETTLE: Duration = Duration::from_millis(1000);
/// Wait after `Reset`; longer than the start settle.
pub const RESET_SETTLE: Duration = Duration::from_millis(2000);
/// Short settle after every pointer/command write.
pub const POST_WRITE_SETTLE: Duration = Duration::from_micros(500);

// === Sleep / Wake (datasheet page 5) ===

/// Gap between the two wake-up sends; both edges must land inside the
/// device's 100 ms wake window.
pub const WAKE_TOGGLE_GAP: Duration = Duration::from_millis(10);
/// Wait after the second wake-up send for the device to reach idle.
pub const WAKE_SETTLE: Duration = Duration::from_millis(100);

// === Data-Ready Poll ===

/// Pause between data-ready poll attempts.
pub const DATA_READY_POLL_INTERVAL: Duration = Duration::from_millis(1000);
/// Poll attempts before giving up with a timeout.
pub const DATA_READY_ATTEMPTS: u32 = 4;

// === Auto-Clean Interval Persistence (datasheet page 15) ===

/// Wait between releasing and re-opening the bus while persisting a new
/// auto-clean interval.
pub const INTERVAL_RELEASE_SETTLE: Duration = Duration::from_millis(1000);
