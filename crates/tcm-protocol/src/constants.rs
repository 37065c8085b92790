//! Protocol constants
//!
//! These constants define the frame identifiers, component identifiers and
//! configuration identifiers used by the Fieldforce TCM binary protocol. The
//! numeric values are fixed by the module firmware and must not change.

// ============================================================================
// Frame Identifiers
// ============================================================================

/// Query the module type and firmware revision.
pub const FRAME_GET_MOD_INFO: u8 = 1;
/// Response to `FRAME_GET_MOD_INFO`.
pub const FRAME_MOD_INFO_RESP: u8 = 2;
/// Select which data components `FRAME_GET_DATA` reports.
pub const FRAME_SET_DATA_COMPONENTS: u8 = 3;
/// Request a single data sample.
pub const FRAME_GET_DATA: u8 = 4;
/// Data sample (also emitted continuously in interval mode).
pub const FRAME_DATA_RESP: u8 = 5;
/// Write a configuration parameter.
pub const FRAME_SET_CONFIG: u8 = 6;
/// Read a configuration parameter.
pub const FRAME_GET_CONFIG: u8 = 7;
/// Response to `FRAME_GET_CONFIG`.
pub const FRAME_CONFIG_RESP: u8 = 8;
/// Persist configuration to non-volatile memory.
pub const FRAME_SAVE: u8 = 9;
/// Start a user calibration.
pub const FRAME_START_CAL: u8 = 10;
/// Abort a user calibration.
pub const FRAME_STOP_CAL: u8 = 11;
/// Write a filter parameter.
pub const FRAME_SET_PARAM: u8 = 12;
/// Read a filter parameter.
pub const FRAME_GET_PARAM: u8 = 13;
/// Response to `FRAME_GET_PARAM`.
pub const FRAME_PARAM_RESP: u8 = 14;
/// Power the module down.
pub const FRAME_POWER_DOWN: u8 = 15;
/// Response to `FRAME_SAVE`, carries a status code.
pub const FRAME_SAVE_DONE: u8 = 16;
/// Emitted once per recorded calibration sample.
pub const FRAME_USER_CAL_SAMP_COUNT: u8 = 17;
/// Emitted once when a calibration completes.
pub const FRAME_USER_CAL_SCORE: u8 = 18;
/// Acknowledges `FRAME_SET_CONFIG`.
pub const FRAME_SET_CONFIG_DONE: u8 = 19;
/// Acknowledges `FRAME_SET_PARAM`.
pub const FRAME_SET_PARAM_DONE: u8 = 20;
/// Start interval (streaming) mode.
pub const FRAME_START_INTERVAL_MODE: u8 = 21;
/// Stop interval (streaming) mode.
pub const FRAME_STOP_INTERVAL_MODE: u8 = 22;
/// Sent by the module after it wakes up.
pub const FRAME_POWER_UP: u8 = 23;
/// Write acquisition parameters.
pub const FRAME_SET_ACQ_PARAMS: u8 = 24;
/// Read acquisition parameters.
pub const FRAME_GET_ACQ_PARAMS: u8 = 25;
/// Acknowledges `FRAME_SET_ACQ_PARAMS`.
pub const FRAME_ACQ_PARAMS_DONE: u8 = 26;
/// Response to `FRAME_GET_ACQ_PARAMS`.
pub const FRAME_ACQ_PARAMS_RESP: u8 = 27;
/// Acknowledges `FRAME_POWER_DOWN`.
pub const FRAME_POWER_DOWN_DONE: u8 = 28;
/// Restore factory magnetometer calibration.
pub const FRAME_FACTORY_USER_CAL: u8 = 29;
/// Acknowledges `FRAME_FACTORY_USER_CAL`.
pub const FRAME_FACTORY_USER_CAL_DONE: u8 = 30;
/// Record a calibration sample when auto-sampling is off.
pub const FRAME_TAKE_USER_CAL_SAMPLE: u8 = 31;
/// Restore factory accelerometer calibration.
pub const FRAME_FACTORY_INCL_CAL: u8 = 36;
/// Acknowledges `FRAME_FACTORY_INCL_CAL`.
pub const FRAME_FACTORY_INCL_CAL_DONE: u8 = 37;
/// Switch between compass and other operating modes.
pub const FRAME_SET_MODE: u8 = 46;
/// Response to `FRAME_SET_MODE`.
pub const FRAME_SET_MODE_RESP: u8 = 47;
/// Request a single sample while in sync mode.
pub const FRAME_SYNC_READ: u8 = 49;

/// Unframed byte that wakes a powered-down module.
pub const POWER_UP_SENTINEL: u8 = 0xFF;

// ============================================================================
// Data Components
// ============================================================================

/// Compass heading in degrees (f32).
pub const COMPONENT_HEADING: u8 = 5;
/// Module temperature in degrees Celsius (f32).
pub const COMPONENT_TEMPERATURE: u8 = 7;
/// Magnetic distortion detected (bool).
pub const COMPONENT_DISTORTION: u8 = 8;
/// User calibration is valid (bool).
pub const COMPONENT_CAL_STATUS: u8 = 9;
/// Pitch-aligned acceleration in g (f32).
pub const COMPONENT_P_ALIGNED: u8 = 21;
/// Roll-aligned acceleration in g (f32).
pub const COMPONENT_R_ALIGNED: u8 = 22;
/// Vertically aligned acceleration in g (f32).
pub const COMPONENT_IZ_ALIGNED: u8 = 23;
/// Pitch angle in degrees (f32).
pub const COMPONENT_P_ANGLE: u8 = 24;
/// Roll angle in degrees (f32).
pub const COMPONENT_R_ANGLE: u8 = 25;
/// X-aligned magnetic field in µT (f32).
pub const COMPONENT_X_ALIGNED: u8 = 27;
/// Y-aligned magnetic field in µT (f32).
pub const COMPONENT_Y_ALIGNED: u8 = 28;
/// Z-aligned magnetic field in µT (f32).
pub const COMPONENT_Z_ALIGNED: u8 = 29;

// ============================================================================
// Configuration Parameters
// ============================================================================

/// Magnetic declination in degrees (f32).
pub const CONFIG_DECLINATION: u8 = 1;
/// Report true rather than magnetic north (bool).
pub const CONFIG_TRUE_NORTH: u8 = 2;
/// Big-endian output (bool).
pub const CONFIG_BIG_ENDIAN: u8 = 6;
/// Mounting reference, see [`crate::Orientation`] (u8).
pub const CONFIG_MOUNTING_REF: u8 = 10;
/// Number of points collected by a user calibration (u32).
pub const CONFIG_USER_CAL_NUM_POINTS: u8 = 12;
/// Automatically record calibration samples (bool).
pub const CONFIG_USER_CAL_AUTO_SAMPLING: u8 = 13;
/// Baud rate index (u8).
pub const CONFIG_BAUD_RATE: u8 = 14;
/// Report headings in mils instead of degrees (bool).
pub const CONFIG_MIL_OUTPUT: u8 = 15;
/// Enable calibration data reporting (bool).
pub const CONFIG_DATA_CAL: u8 = 16;
/// Magnetometer coefficient set in use (u32).
pub const CONFIG_COEFF_COPY_SET: u8 = 18;
/// Accelerometer coefficient set in use (u32).
pub const CONFIG_ACCEL_COEFF_COPY_SET: u8 = 19;

// ============================================================================
// Filter Parameters
// ============================================================================

/// Parameter id of the FIR filter.
pub const PARAM_FIR_FILTER: u8 = 3;
/// Axis id the FIR filter applies to.
pub const PARAM_FIR_AXIS: u8 = 1;
/// Supported FIR filter lengths.
pub const FIR_TAP_COUNTS: [u8; 5] = [0, 4, 8, 16, 32];

// ============================================================================
// Sizes
// ============================================================================

/// Bytes of framing around a payload: length (2) + frame id (1) + crc (2).
pub const FRAME_OVERHEAD: usize = 5;
/// Largest frame the decoder will accept.
pub const MAX_FRAME_SIZE: usize = 4096;
