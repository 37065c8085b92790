//! Component and configuration registries.
//!
//! Data components and configuration parameters are both identified on the
//! wire by a single byte. The byte alone determines the width and type of the
//! value that follows it, so decoding is driven entirely by the tables below.

use std::fmt;

use bytes::BufMut;

use crate::constants::*;
use crate::error::ProtocolError;

// ============================================================================
// Scalar Types
// ============================================================================

/// Wire type of a component or configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// Unsigned 8-bit integer.
    U8,
    /// Unsigned 16-bit integer, big-endian.
    U16,
    /// Unsigned 32-bit integer, big-endian.
    U32,
    /// IEEE-754 single precision, big-endian.
    F32,
    /// One byte, non-zero means true.
    Bool,
}

impl ScalarType {
    /// Number of bytes the value occupies on the wire.
    pub const fn size(self) -> usize {
        match self {
            ScalarType::U8 | ScalarType::Bool => 1,
            ScalarType::U16 => 2,
            ScalarType::U32 | ScalarType::F32 => 4,
        }
    }

    /// Decode a value of this type from the start of `data`.
    pub fn decode(self, data: &[u8]) -> Result<Value, ProtocolError> {
        let size = self.size();
        if data.len() < size {
            return Err(ProtocolError::too_short(size, data.len()));
        }

        let value = match self {
            ScalarType::U8 => Value::U8(data[0]),
            ScalarType::Bool => Value::Bool(data[0] != 0),
            ScalarType::U16 => Value::U16(u16::from_be_bytes([data[0], data[1]])),
            ScalarType::U32 => {
                Value::U32(u32::from_be_bytes([data[0], data[1], data[2], data[3]]))
            }
            ScalarType::F32 => {
                Value::F32(f32::from_be_bytes([data[0], data[1], data[2], data[3]]))
            }
        };

        Ok(value)
    }
}

/// A decoded scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// Unsigned 8-bit integer.
    U8(u8),
    /// Unsigned 16-bit integer.
    U16(u16),
    /// Unsigned 32-bit integer.
    U32(u32),
    /// Single precision float.
    F32(f32),
    /// Boolean flag.
    Bool(bool),
}

impl Value {
    /// The wire type of this value.
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Value::U8(_) => ScalarType::U8,
            Value::U16(_) => ScalarType::U16,
            Value::U32(_) => ScalarType::U32,
            Value::F32(_) => ScalarType::F32,
            Value::Bool(_) => ScalarType::Bool,
        }
    }

    /// Append the big-endian wire form of this value to `buf`.
    pub fn encode_into<B: BufMut>(&self, buf: &mut B) {
        match *self {
            Value::U8(v) => buf.put_u8(v),
            Value::U16(v) => buf.put_u16(v),
            Value::U32(v) => buf.put_u32(v),
            Value::F32(v) => buf.put_f32(v),
            Value::Bool(v) => buf.put_u8(u8::from(v)),
        }
    }

    /// The value as a float, if it is one.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::F32(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as a flag, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The value widened to u32, if it is an unsigned integer.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::U8(v) => Some(u32::from(*v)),
            Value::U16(v) => Some(u32::from(*v)),
            Value::U32(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::U16(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U32(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

// ============================================================================
// Registries
// ============================================================================

/// Which registry an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Sensor outputs reported by `GetData`.
    Data,
    /// Configuration parameters accessed by `GetConfig` / `SetConfig`.
    Config,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Data => write!(f, "data component"),
            Namespace::Config => write!(f, "configuration"),
        }
    }
}

/// Name and wire type of one identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentDescriptor {
    /// Wire identifier.
    pub id: u8,
    /// Human readable name.
    pub name: &'static str,
    /// Wire type of the value.
    pub scalar_type: ScalarType,
}

const fn descriptor(id: u8, name: &'static str, scalar_type: ScalarType) -> ComponentDescriptor {
    ComponentDescriptor {
        id,
        name,
        scalar_type,
    }
}

/// Data components reported by the module.
pub static DATA_COMPONENTS: [ComponentDescriptor; 12] = [
    descriptor(COMPONENT_HEADING, "Heading", ScalarType::F32),
    descriptor(COMPONENT_TEMPERATURE, "Temperature", ScalarType::F32),
    descriptor(COMPONENT_DISTORTION, "Distortion", ScalarType::Bool),
    descriptor(COMPONENT_CAL_STATUS, "CalStatus", ScalarType::Bool),
    descriptor(COMPONENT_P_ALIGNED, "PAligned", ScalarType::F32),
    descriptor(COMPONENT_R_ALIGNED, "RAligned", ScalarType::F32),
    descriptor(COMPONENT_IZ_ALIGNED, "IZAligned", ScalarType::F32),
    descriptor(COMPONENT_P_ANGLE, "PAngle", ScalarType::F32),
    descriptor(COMPONENT_R_ANGLE, "RAngle", ScalarType::F32),
    descriptor(COMPONENT_X_ALIGNED, "XAligned", ScalarType::F32),
    descriptor(COMPONENT_Y_ALIGNED, "YAligned", ScalarType::F32),
    descriptor(COMPONENT_Z_ALIGNED, "ZAligned", ScalarType::F32),
];

/// Configuration parameters understood by the module.
pub static CONFIG_PARAMETERS: [ComponentDescriptor; 11] = [
    descriptor(CONFIG_DECLINATION, "Declination", ScalarType::F32),
    descriptor(CONFIG_TRUE_NORTH, "TrueNorth", ScalarType::Bool),
    descriptor(CONFIG_BIG_ENDIAN, "BigEndian", ScalarType::Bool),
    descriptor(CONFIG_MOUNTING_REF, "MountingRef", ScalarType::U8),
    descriptor(CONFIG_USER_CAL_NUM_POINTS, "UserCalNumPoints", ScalarType::U32),
    descriptor(CONFIG_USER_CAL_AUTO_SAMPLING, "UserCalAutoSampling", ScalarType::Bool),
    descriptor(CONFIG_BAUD_RATE, "BaudRate", ScalarType::U8),
    descriptor(CONFIG_MIL_OUTPUT, "MilOutput", ScalarType::Bool),
    descriptor(CONFIG_DATA_CAL, "DataCal", ScalarType::Bool),
    descriptor(CONFIG_COEFF_COPY_SET, "CoeffCopySet", ScalarType::U32),
    descriptor(CONFIG_ACCEL_COEFF_COPY_SET, "AccelCoeffCopySet", ScalarType::U32),
];

/// Look up `id` in the given registry.
pub fn describe(
    namespace: Namespace,
    id: u8,
) -> Result<&'static ComponentDescriptor, ProtocolError> {
    let table: &'static [ComponentDescriptor] = match namespace {
        Namespace::Data => &DATA_COMPONENTS,
        Namespace::Config => &CONFIG_PARAMETERS,
    };

    table
        .iter()
        .find(|d| d.id == id)
        .ok_or(ProtocolError::UnknownIdentifier { namespace, id })
}

// ============================================================================
// FIR Filter Defaults
// ============================================================================

const FIR_DEFAULTS_4: [f64; 4] = [
    4.6708657655334e-2, 4.5329134234467e-1,
    4.5329134234467e-1, 4.6708657655334e-2,
];

const FIR_DEFAULTS_8: [f64; 8] = [
    1.9875512449729e-2, 6.4500864832660e-2,
    1.6637325898141e-1, 2.4925036373620e-1,
    2.4925036373620e-1, 1.6637325898141e-1,
    6.4500864832660e-2, 1.9875512449729e-2,
];

const FIR_DEFAULTS_16: [f64; 16] = [
    7.9724971069144e-3, 1.2710056429342e-2,
    2.5971390034516e-2, 4.6451949792704e-2,
    7.1024151197772e-2, 9.5354386848804e-2,
    1.1484431942626e-1, 1.2567124916369e-1,
    1.2567124916369e-1, 1.1484431942626e-1,
    9.5354386848804e-2, 7.1024151197772e-2,
    4.6451949792704e-2, 2.5971390034516e-2,
    1.2710056429342e-2, 7.9724971069144e-3,
];

const FIR_DEFAULTS_32: [f64; 32] = [
    1.4823725958818e-3, 2.0737124095482e-3,
    3.2757326624196e-3, 5.3097803863757e-3,
    8.3414139286254e-3, 1.2456836057785e-2,
    1.7646051430536e-2, 2.3794805168613e-2,
    3.0686505921968e-2, 3.8014333463472e-2,
    4.5402682509802e-2, 5.2436112653103e-2,
    5.8693165018301e-2, 6.3781858267530e-2,
    6.7373451424187e-2, 6.9231186101853e-2,
    6.9231186101853e-2, 6.7373451424187e-2,
    6.3781858267530e-2, 5.8693165018301e-2,
    5.2436112653103e-2, 4.5402682509802e-2,
    3.8014333463472e-2, 3.0686505921968e-2,
    2.3794805168613e-2, 1.7646051430536e-2,
    1.2456836057785e-2, 8.3414139286254e-3,
    5.3097803863757e-3, 3.2757326624196e-3,
    2.0737124095482e-3, 1.4823725958818e-3,
];

/// Built-in coefficients for a FIR filter with `count` taps.
///
/// Only the lengths in [`FIR_TAP_COUNTS`] are supported.
pub fn default_filter_coefficients(count: u8) -> Result<&'static [f64], ProtocolError> {
    match count {
        0 => Ok(&[]),
        4 => Ok(&FIR_DEFAULTS_4),
        8 => Ok(&FIR_DEFAULTS_8),
        16 => Ok(&FIR_DEFAULTS_16),
        32 => Ok(&FIR_DEFAULTS_32),
        other => Err(ProtocolError::invalid_argument(format!(
            "unsupported FIR tap count {} (supported: {:?})",
            other, FIR_TAP_COUNTS
        ))),
    }
}
