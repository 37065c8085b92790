//! Commands that can be sent to the module.

use bytes::BufMut;

use crate::constants::*;
use crate::error::ProtocolError;
use crate::frame::encode_frame;
use crate::registry::{describe, Namespace, Value};
use crate::types::*;

/// Commands that can be sent to the module.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Query module type and firmware revision.
    GetModInfo,

    /// Select the components reported by `GetData`.
    SetDataComponents {
        /// Data component ids, in reporting order.
        ids: Vec<u8>,
    },

    /// Request one data sample.
    GetData,

    /// Write a configuration parameter.
    SetConfig {
        /// Configuration id.
        id: u8,
        /// New value, of the registered type.
        value: Value,
    },

    /// Read a configuration parameter.
    GetConfig {
        /// Configuration id.
        id: u8,
    },

    /// Persist configuration.
    Save,

    /// Start a user calibration.
    StartCalibration {
        /// Calibration procedure.
        mode: CalibrationMode,
    },

    /// Abort a user calibration.
    StopCalibration,

    /// Record a calibration sample (auto-sampling off).
    TakeCalibrationSample,

    /// Write the FIR filter.
    SetFilter(FilterSpec),

    /// Read the FIR filter.
    GetFilter,

    /// Write acquisition parameters.
    SetAcqParams(AcqParams),

    /// Read acquisition parameters.
    GetAcqParams,

    /// Enter interval (streaming) mode.
    StartIntervalMode,

    /// Leave interval (streaming) mode.
    StopIntervalMode,

    /// Wake the module. Sent as a bare byte, not a frame.
    PowerUp,

    /// Power the module down.
    PowerDown,

    /// Restore the factory magnetometer calibration.
    FactoryMagCalibration,

    /// Restore the factory accelerometer calibration.
    FactoryAccelCalibration,
}

impl Command {
    /// Build a `SetDataComponents` command, checking every id is known.
    pub fn set_data_components(ids: &[u8]) -> Result<Self, ProtocolError> {
        if ids.len() > u8::MAX as usize {
            return Err(ProtocolError::invalid_argument(format!(
                "{} components requested, at most {} fit in a frame",
                ids.len(),
                u8::MAX
            )));
        }
        for &id in ids {
            describe(Namespace::Data, id)?;
        }
        Ok(Command::SetDataComponents { ids: ids.to_vec() })
    }

    /// Build a `SetConfig` command, checking the id and value type.
    pub fn set_config(id: u8, value: Value) -> Result<Self, ProtocolError> {
        let descriptor = describe(Namespace::Config, id)?;
        if value.scalar_type() != descriptor.scalar_type {
            return Err(ProtocolError::invalid_argument(format!(
                "{} expects {:?}, got {:?}",
                descriptor.name, descriptor.scalar_type, value
            )));
        }
        Ok(Command::SetConfig { id, value })
    }

    /// Build a `GetConfig` command, checking the id is known.
    pub fn get_config(id: u8) -> Result<Self, ProtocolError> {
        describe(Namespace::Config, id)?;
        Ok(Command::GetConfig { id })
    }

    /// Get the frame id for this command.
    pub fn code(&self) -> u8 {
        match self {
            Command::GetModInfo => FRAME_GET_MOD_INFO,
            Command::SetDataComponents { .. } => FRAME_SET_DATA_COMPONENTS,
            Command::GetData => FRAME_GET_DATA,
            Command::SetConfig { .. } => FRAME_SET_CONFIG,
            Command::GetConfig { .. } => FRAME_GET_CONFIG,
            Command::Save => FRAME_SAVE,
            Command::StartCalibration { .. } => FRAME_START_CAL,
            Command::StopCalibration => FRAME_STOP_CAL,
            Command::TakeCalibrationSample => FRAME_TAKE_USER_CAL_SAMPLE,
            Command::SetFilter(_) => FRAME_SET_PARAM,
            Command::GetFilter => FRAME_GET_PARAM,
            Command::SetAcqParams(_) => FRAME_SET_ACQ_PARAMS,
            Command::GetAcqParams => FRAME_GET_ACQ_PARAMS,
            Command::StartIntervalMode => FRAME_START_INTERVAL_MODE,
            Command::StopIntervalMode => FRAME_STOP_INTERVAL_MODE,
            Command::PowerUp => FRAME_POWER_UP,
            Command::PowerDown => FRAME_POWER_DOWN,
            Command::FactoryMagCalibration => FRAME_FACTORY_USER_CAL,
            Command::FactoryAccelCalibration => FRAME_FACTORY_INCL_CAL,
        }
    }

    /// Frame id the module answers with, or `None` for commands the module
    /// does not acknowledge.
    pub fn response_code(&self) -> Option<u8> {
        match self {
            Command::GetModInfo => Some(FRAME_MOD_INFO_RESP),
            Command::GetData => Some(FRAME_DATA_RESP),
            Command::SetConfig { .. } => Some(FRAME_SET_CONFIG_DONE),
            Command::GetConfig { .. } => Some(FRAME_CONFIG_RESP),
            Command::Save => Some(FRAME_SAVE_DONE),
            Command::SetFilter(_) => Some(FRAME_SET_PARAM_DONE),
            Command::GetFilter => Some(FRAME_PARAM_RESP),
            Command::SetAcqParams(_) => Some(FRAME_ACQ_PARAMS_DONE),
            Command::GetAcqParams => Some(FRAME_ACQ_PARAMS_RESP),
            Command::PowerUp => Some(FRAME_POWER_UP),
            Command::PowerDown => Some(FRAME_POWER_DOWN_DONE),
            Command::FactoryMagCalibration => Some(FRAME_FACTORY_USER_CAL_DONE),
            Command::FactoryAccelCalibration => Some(FRAME_FACTORY_INCL_CAL_DONE),
            Command::SetDataComponents { .. }
            | Command::StartCalibration { .. }
            | Command::StopCalibration
            | Command::TakeCalibrationSample
            | Command::StartIntervalMode
            | Command::StopIntervalMode => None,
        }
    }

    /// Encode the payload carried inside the frame.
    pub fn payload(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        match self {
            Command::SetDataComponents { ids } => {
                buf.put_u8(ids.len() as u8);
                buf.extend_from_slice(ids);
            }

            Command::SetConfig { id, value } => {
                buf.put_u8(*id);
                value.encode_into(&mut buf);
            }

            Command::GetConfig { id } => {
                buf.put_u8(*id);
            }

            Command::StartCalibration { mode } => {
                buf.put_u32(u32::from(*mode));
            }

            Command::SetFilter(filter) => {
                buf.put_u8(filter.param_id());
                buf.put_u8(filter.axis_id());
                buf.put_u8(filter.count());
                for &coefficient in filter.coefficients() {
                    buf.put_f64(coefficient);
                }
            }

            Command::GetFilter => {
                buf.put_u8(PARAM_FIR_FILTER);
                buf.put_u8(PARAM_FIR_AXIS);
            }

            Command::SetAcqParams(params) => {
                buf.put_u8(u8::from(params.polling_mode));
                buf.put_u8(u8::from(params.flush_filter));
                buf.put_f32(params.sensor_acq_time);
                buf.put_f32(params.interval_resp_time);
            }

            Command::GetModInfo
            | Command::GetData
            | Command::Save
            | Command::StopCalibration
            | Command::TakeCalibrationSample
            | Command::GetAcqParams
            | Command::StartIntervalMode
            | Command::StopIntervalMode
            | Command::PowerUp
            | Command::PowerDown
            | Command::FactoryMagCalibration
            | Command::FactoryAccelCalibration => {}
        }

        buf
    }

    /// Encode the command to the bytes written on the wire.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        match self {
            // The module is asleep and cannot parse frames yet.
            Command::PowerUp => Ok(vec![POWER_UP_SENTINEL]),
            _ => encode_frame(self.code(), &self.payload()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use crate::registry::default_filter_coefficients;

    #[test]
    fn test_get_mod_info_encoding() {
        assert_eq!(Command::GetModInfo.encode().unwrap(), vec![0x00, 0x05, 0x01, 0xEF, 0xD4]);
    }

    #[test]
    fn test_power_up_is_unframed() {
        assert_eq!(Command::PowerUp.encode().unwrap(), vec![0xFF]);
        assert_eq!(Command::PowerUp.response_code(), Some(FRAME_POWER_UP));
    }

    #[test]
    fn test_set_data_components() {
        let cmd = Command::set_data_components(&[COMPONENT_HEADING, COMPONENT_P_ANGLE]).unwrap();
        assert_eq!(cmd.payload(), vec![2, 5, 24]);
        assert_eq!(cmd.response_code(), None);

        assert!(matches!(
            Command::set_data_components(&[COMPONENT_HEADING, 6]),
            Err(ProtocolError::UnknownIdentifier { id: 6, .. })
        ));
    }

    #[test]
    fn test_set_config_payload() {
        let cmd = Command::set_config(CONFIG_DECLINATION, Value::F32(10.0)).unwrap();
        let mut expected = vec![CONFIG_DECLINATION];
        expected.extend_from_slice(&10.0f32.to_be_bytes());
        assert_eq!(cmd.payload(), expected);

        let cmd = Command::set_config(CONFIG_MOUNTING_REF, Orientation::XUp0.into()).unwrap();
        assert_eq!(cmd.payload(), vec![CONFIG_MOUNTING_REF, 2]);

        let cmd = Command::set_config(CONFIG_USER_CAL_NUM_POINTS, Value::U32(12)).unwrap();
        assert_eq!(cmd.payload(), vec![CONFIG_USER_CAL_NUM_POINTS, 0, 0, 0, 12]);
    }

    #[test]
    fn test_set_config_validation() {
        assert!(matches!(
            Command::set_config(CONFIG_TRUE_NORTH, Value::U8(1)),
            Err(ProtocolError::InvalidArgument(_))
        ));
        assert!(matches!(
            Command::set_config(3, Value::Bool(true)),
            Err(ProtocolError::UnknownIdentifier { id: 3, .. })
        ));
        assert!(Command::get_config(99).is_err());
    }

    #[test]
    fn test_set_filter_default_payload() {
        let cmd = Command::SetFilter(FilterSpec::with_defaults(4).unwrap());
        let payload = cmd.payload();

        assert_eq!(&payload[..3], &[3, 1, 4]);
        assert_eq!(payload.len(), 3 + 4 * 8);
        let taps: Vec<f64> = payload[3..]
            .chunks_exact(8)
            .map(|c| f64::from_be_bytes(c.try_into().unwrap()))
            .collect();
        assert_eq!(taps, default_filter_coefficients(4).unwrap());
    }

    #[test]
    fn test_get_filter_payload() {
        assert_eq!(Command::GetFilter.payload(), vec![3, 1]);
    }

    #[test]
    fn test_start_calibration_payload() {
        let cmd = Command::StartCalibration {
            mode: CalibrationMode::AccelMagnetic,
        };
        assert_eq!(cmd.payload(), vec![0, 0, 0, 110]);
        assert_eq!(cmd.response_code(), None);
    }

    #[test]
    fn test_acq_params_payload() {
        let cmd = Command::SetAcqParams(AcqParams {
            polling_mode: true,
            flush_filter: false,
            sensor_acq_time: 0.0,
            interval_resp_time: 0.1,
        });
        let payload = cmd.payload();
        assert_eq!(&payload[..2], &[1, 0]);
        assert_eq!(&payload[2..6], &0.0f32.to_be_bytes());
        assert_eq!(&payload[6..], &0.1f32.to_be_bytes());
    }

    #[test]
    fn test_encoded_frames_verify() {
        let commands = [
            Command::GetData,
            Command::Save,
            Command::StopIntervalMode,
            Command::SetFilter(FilterSpec::with_defaults(32).unwrap()),
        ];
        for cmd in commands {
            let frame = Frame::decode(&cmd.encode().unwrap()).unwrap();
            assert_eq!(frame.frame_id, cmd.code());
            assert_eq!(frame.payload, cmd.payload());
        }
    }
}
