//! Common types used in the protocol.

use crate::constants::*;
use crate::error::ProtocolError;
use crate::registry::{default_filter_coefficients, describe, Namespace, Value};

/// Module type and firmware revision returned by `GetModInfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModInfo {
    /// Four character module type, e.g. `TCM6`.
    pub device_type: [u8; 4],
    /// Four character firmware revision.
    pub revision: [u8; 4],
}

impl ModInfo {
    /// Module type as text.
    pub fn device_type_str(&self) -> String {
        tag_to_string(&self.device_type)
    }

    /// Firmware revision as text.
    pub fn revision_str(&self) -> String {
        tag_to_string(&self.revision)
    }
}

fn tag_to_string(tag: &[u8; 4]) -> String {
    let end = tag.iter().position(|&b| b == 0).unwrap_or(tag.len());
    String::from_utf8_lossy(&tag[..end]).trim_end().to_string()
}

/// One sensor reading.
///
/// Only the components selected with `SetDataComponents` are reported by the
/// module; every other field stays `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Datum {
    /// Heading in degrees (or mils).
    pub heading: Option<f32>,
    /// Temperature in °C.
    pub temperature: Option<f32>,
    /// Magnetic distortion detected.
    pub distortion: Option<bool>,
    /// User calibration valid.
    pub cal_status: Option<bool>,
    /// Pitch-aligned acceleration in g.
    pub p_aligned: Option<f32>,
    /// Roll-aligned acceleration in g.
    pub r_aligned: Option<f32>,
    /// Vertically aligned acceleration in g.
    pub iz_aligned: Option<f32>,
    /// Pitch in degrees.
    pub p_angle: Option<f32>,
    /// Roll in degrees.
    pub r_angle: Option<f32>,
    /// X-aligned magnetic field in µT.
    pub x_aligned: Option<f32>,
    /// Y-aligned magnetic field in µT.
    pub y_aligned: Option<f32>,
    /// Z-aligned magnetic field in µT.
    pub z_aligned: Option<f32>,
}

impl Datum {
    /// Store a decoded component value in its slot.
    pub fn apply(&mut self, id: u8, value: Value) -> Result<(), ProtocolError> {
        let descriptor = describe(Namespace::Data, id)?;
        if value.scalar_type() != descriptor.scalar_type {
            return Err(ProtocolError::invalid_argument(format!(
                "{} expects {:?}, got {:?}",
                descriptor.name, descriptor.scalar_type, value
            )));
        }

        match (id, value) {
            (COMPONENT_HEADING, Value::F32(v)) => self.heading = Some(v),
            (COMPONENT_TEMPERATURE, Value::F32(v)) => self.temperature = Some(v),
            (COMPONENT_DISTORTION, Value::Bool(v)) => self.distortion = Some(v),
            (COMPONENT_CAL_STATUS, Value::Bool(v)) => self.cal_status = Some(v),
            (COMPONENT_P_ALIGNED, Value::F32(v)) => self.p_aligned = Some(v),
            (COMPONENT_R_ALIGNED, Value::F32(v)) => self.r_aligned = Some(v),
            (COMPONENT_IZ_ALIGNED, Value::F32(v)) => self.iz_aligned = Some(v),
            (COMPONENT_P_ANGLE, Value::F32(v)) => self.p_angle = Some(v),
            (COMPONENT_R_ANGLE, Value::F32(v)) => self.r_angle = Some(v),
            (COMPONENT_X_ALIGNED, Value::F32(v)) => self.x_aligned = Some(v),
            (COMPONENT_Y_ALIGNED, Value::F32(v)) => self.y_aligned = Some(v),
            (COMPONENT_Z_ALIGNED, Value::F32(v)) => self.z_aligned = Some(v),
            (id, _) => {
                return Err(ProtocolError::UnknownIdentifier {
                    namespace: Namespace::Data,
                    id,
                })
            }
        }
        Ok(())
    }

    /// Check if no component was reported.
    pub fn is_empty(&self) -> bool {
        *self == Datum::default()
    }
}

/// Acquisition parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcqParams {
    /// Poll (true) or push in interval mode (false).
    pub polling_mode: bool,
    /// Flush the FIR filter between samples.
    pub flush_filter: bool,
    /// Time between sensor acquisitions, seconds.
    pub sensor_acq_time: f32,
    /// Time between interval-mode responses, seconds.
    pub interval_resp_time: f32,
}

impl Default for AcqParams {
    fn default() -> Self {
        AcqParams {
            polling_mode: true,
            flush_filter: false,
            sensor_acq_time: 0.0,
            interval_resp_time: 0.0,
        }
    }
}

/// Scores reported when a user calibration completes.
///
/// What each field measures depends on the calibration mode that was run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CalScores {
    /// Overall magnetometer calibration score.
    pub cal_score: f32,
    /// Reserved / mode dependent.
    pub cal_param2: f32,
    /// Accelerometer calibration score.
    pub accel_cal_score: f32,
    /// Distribution error of the samples.
    pub dist_error: f32,
    /// Tilt error of the samples.
    pub tilt_error: f32,
    /// Tilt range covered by the samples.
    pub tilt_range: f32,
}

/// FIR filter configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    count: u8,
    coefficients: Vec<f64>,
}

impl FilterSpec {
    /// Build a filter with `count` taps.
    ///
    /// Without explicit coefficients the built-in table for `count` is used.
    /// Explicit coefficients must number exactly `count`.
    pub fn new(count: u8, coefficients: Option<Vec<f64>>) -> Result<Self, ProtocolError> {
        let defaults = default_filter_coefficients(count)?;
        let coefficients = match coefficients {
            None => defaults.to_vec(),
            Some(values) if values.len() == count as usize => values,
            Some(values) => {
                return Err(ProtocolError::invalid_argument(format!(
                    "{} coefficients supplied for a {}-tap filter",
                    values.len(),
                    count
                )))
            }
        };

        Ok(FilterSpec {
            count,
            coefficients,
        })
    }

    /// Filter exactly as reported by the module, without checking the tap
    /// count against the supported lengths.
    pub(crate) fn from_parts(count: u8, coefficients: Vec<f64>) -> Self {
        FilterSpec {
            count,
            coefficients,
        }
    }

    /// Filter with the built-in coefficients for `count` taps.
    pub fn with_defaults(count: u8) -> Result<Self, ProtocolError> {
        FilterSpec::new(count, None)
    }

    /// Parameter id, always [`PARAM_FIR_FILTER`].
    pub fn param_id(&self) -> u8 {
        PARAM_FIR_FILTER
    }

    /// Axis id, always [`PARAM_FIR_AXIS`].
    pub fn axis_id(&self) -> u8 {
        PARAM_FIR_AXIS
    }

    /// Number of taps.
    pub fn count(&self) -> u8 {
        self.count
    }

    /// Tap coefficients.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }
}

/// Physical mounting reference of the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Standard, 0°.
    Std0,
    /// X axis up, 0°.
    XUp0,
    /// Y axis up, 0°.
    YUp0,
    /// Standard, 90°.
    Std90,
    /// Standard, 180°.
    Std180,
    /// Standard, 270°.
    Std270,
    /// Z axis down, 0°.
    ZDown0,
    /// X axis up, 90°.
    XUp90,
    /// X axis up, 180°.
    XUp180,
    /// X axis up, 270°.
    XUp270,
    /// Y axis up, 90°.
    YUp90,
    /// Y axis up, 180°.
    YUp180,
    /// Y axis up, 270°.
    YUp270,
    /// Z axis down, 90°.
    ZDown90,
    /// Z axis down, 180°.
    ZDown180,
    /// Z axis down, 270°.
    ZDown270,
}

impl Orientation {
    const ALL: [Orientation; 16] = [
        Orientation::Std0,
        Orientation::XUp0,
        Orientation::YUp0,
        Orientation::Std90,
        Orientation::Std180,
        Orientation::Std270,
        Orientation::ZDown0,
        Orientation::XUp90,
        Orientation::XUp180,
        Orientation::XUp270,
        Orientation::YUp90,
        Orientation::YUp180,
        Orientation::YUp270,
        Orientation::ZDown90,
        Orientation::ZDown180,
        Orientation::ZDown270,
    ];
}

impl From<Orientation> for u8 {
    fn from(value: Orientation) -> Self {
        // Wire values run 1..=16 in declaration order.
        value as u8 + 1
    }
}

impl TryFrom<u8> for Orientation {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        value
            .checked_sub(1)
            .and_then(|index| Orientation::ALL.get(index as usize).copied())
            .ok_or_else(|| {
                ProtocolError::invalid_argument(format!("invalid mounting reference {}", value))
            })
    }
}

impl From<Orientation> for Value {
    fn from(value: Orientation) -> Self {
        Value::U8(value.into())
    }
}

/// User calibration procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationMode {
    /// Full range magnetometer calibration.
    FullRange,
    /// Calibration in the horizontal plane only.
    TwoDimensional,
    /// Hard-iron only recalibration.
    HardIron,
    /// Calibration with limited tilt.
    LimitedTilt,
    /// Accelerometer only.
    Accel,
    /// Accelerometer and magnetometer together.
    AccelMagnetic,
}

impl From<CalibrationMode> for u32 {
    fn from(value: CalibrationMode) -> Self {
        match value {
            CalibrationMode::FullRange => 10,
            CalibrationMode::TwoDimensional => 20,
            CalibrationMode::HardIron => 30,
            CalibrationMode::LimitedTilt => 40,
            CalibrationMode::Accel => 100,
            CalibrationMode::AccelMagnetic => 110,
        }
    }
}

impl TryFrom<u32> for CalibrationMode {
    type Error = ProtocolError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            10 => Ok(CalibrationMode::FullRange),
            20 => Ok(CalibrationMode::TwoDimensional),
            30 => Ok(CalibrationMode::HardIron),
            40 => Ok(CalibrationMode::LimitedTilt),
            100 => Ok(CalibrationMode::Accel),
            110 => Ok(CalibrationMode::AccelMagnetic),
            other => Err(ProtocolError::invalid_argument(format!(
                "invalid calibration mode {}",
                other
            ))),
        }
    }
}
