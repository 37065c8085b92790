//! Responses from the module.

use crate::constants::*;
use crate::error::*;
use crate::frame::Frame;
use crate::registry::{describe, Namespace, Value};
use crate::types::*;

/// Frames the module sends to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Module type and revision.
    ModInfo(ModInfo),

    /// One data sample.
    Data(Datum),

    /// Value of a configuration parameter.
    Config {
        /// Configuration id echoed by the module.
        id: u8,
        /// Decoded value.
        value: Value,
    },

    /// Configuration parameter written.
    SetConfigDone,

    /// Result of a save.
    SaveDone {
        /// Zero on success.
        code: u16,
    },

    /// A calibration sample was recorded.
    CalibrationSampleCount(u32),

    /// Calibration finished.
    CalibrationScores(CalScores),

    /// FIR filter configuration.
    Filter(FilterSpec),

    /// FIR filter written.
    SetFilterDone,

    /// Acquisition parameters written.
    AcqParamsDone,

    /// Acquisition parameters.
    AcqParams(AcqParams),

    /// Module woke up.
    PowerUp,

    /// Module is powering down.
    PowerDownDone,

    /// Factory magnetometer calibration restored.
    FactoryMagCalibrationDone,

    /// Factory accelerometer calibration restored.
    FactoryAccelCalibrationDone,
}

impl Response {
    /// Decode a response from a verified frame.
    pub fn decode(frame: &Frame) -> Result<Self, ProtocolError> {
        let data = frame.payload.as_slice();

        match frame.frame_id {
            FRAME_MOD_INFO_RESP => Ok(Response::ModInfo(decode_mod_info(data)?)),
            FRAME_DATA_RESP => Ok(Response::Data(decode_data(data)?)),
            FRAME_CONFIG_RESP => {
                let id = *data.first().ok_or(ProtocolError::too_short(1, 0))?;
                let value = decode_config(data, id)?;
                Ok(Response::Config { id, value })
            }
            FRAME_SET_CONFIG_DONE => Ok(Response::SetConfigDone),
            FRAME_SAVE_DONE => Ok(Response::SaveDone {
                code: decode_save_code(data)?,
            }),
            FRAME_USER_CAL_SAMP_COUNT => {
                Ok(Response::CalibrationSampleCount(decode_sample_count(data)?))
            }
            FRAME_USER_CAL_SCORE => Ok(Response::CalibrationScores(decode_cal_scores(data)?)),
            FRAME_PARAM_RESP => Ok(Response::Filter(decode_filter(data)?)),
            FRAME_SET_PARAM_DONE => Ok(Response::SetFilterDone),
            FRAME_ACQ_PARAMS_DONE => Ok(Response::AcqParamsDone),
            FRAME_ACQ_PARAMS_RESP => Ok(Response::AcqParams(decode_acq_params(data)?)),
            FRAME_POWER_UP => Ok(Response::PowerUp),
            FRAME_POWER_DOWN_DONE => Ok(Response::PowerDownDone),
            FRAME_FACTORY_USER_CAL_DONE => Ok(Response::FactoryMagCalibrationDone),
            FRAME_FACTORY_INCL_CAL_DONE => Ok(Response::FactoryAccelCalibrationDone),
            other => Err(ProtocolError::UnknownFrame(other)),
        }
    }

    /// Frame id this response is carried in.
    pub fn code(&self) -> u8 {
        match self {
            Response::ModInfo(_) => FRAME_MOD_INFO_RESP,
            Response::Data(_) => FRAME_DATA_RESP,
            Response::Config { .. } => FRAME_CONFIG_RESP,
            Response::SetConfigDone => FRAME_SET_CONFIG_DONE,
            Response::SaveDone { .. } => FRAME_SAVE_DONE,
            Response::CalibrationSampleCount(_) => FRAME_USER_CAL_SAMP_COUNT,
            Response::CalibrationScores(_) => FRAME_USER_CAL_SCORE,
            Response::Filter(_) => FRAME_PARAM_RESP,
            Response::SetFilterDone => FRAME_SET_PARAM_DONE,
            Response::AcqParamsDone => FRAME_ACQ_PARAMS_DONE,
            Response::AcqParams(_) => FRAME_ACQ_PARAMS_RESP,
            Response::PowerUp => FRAME_POWER_UP,
            Response::PowerDownDone => FRAME_POWER_DOWN_DONE,
            Response::FactoryMagCalibrationDone => FRAME_FACTORY_USER_CAL_DONE,
            Response::FactoryAccelCalibrationDone => FRAME_FACTORY_INCL_CAL_DONE,
        }
    }
}

// ============================================================================
// Payload Decoders
// ============================================================================

fn require_len(data: &[u8], expected: usize) -> Result<(), ProtocolError> {
    if data.len() < expected {
        return Err(ProtocolError::too_short(expected, data.len()));
    }
    Ok(())
}

fn read_f32(data: &[u8], offset: usize) -> f32 {
    f32::from_be_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}

/// Decode a `ModInfoResp` payload: two 4-byte tags.
pub fn decode_mod_info(data: &[u8]) -> Result<ModInfo, ProtocolError> {
    require_len(data, 8)?;

    let mut info = ModInfo {
        device_type: [0u8; 4],
        revision: [0u8; 4],
    };
    info.device_type.copy_from_slice(&data[0..4]);
    info.revision.copy_from_slice(&data[4..8]);
    Ok(info)
}

/// Decode a `DataResp` payload.
///
/// Format: count(1) + count × (component_id(1) + value). The value width is
/// looked up in the data component registry, so a single unknown id makes
/// the rest of the payload undecodable and fails the whole sample.
pub fn decode_data(data: &[u8]) -> Result<Datum, ProtocolError> {
    require_len(data, 1)?;
    let count = data[0] as usize;

    let mut datum = Datum::default();
    let mut offset = 1;

    for _ in 0..count {
        require_len(data, offset + 1)?;
        let descriptor = describe(Namespace::Data, data[offset])?;
        offset += 1;

        let value = descriptor.scalar_type.decode(&data[offset..])?;
        offset += descriptor.scalar_type.size();

        datum.apply(descriptor.id, value)?;
    }

    Ok(datum)
}

/// Decode a `ConfigResp` payload for a request of `expected_id`.
///
/// Format: config_id(1) + value.
pub fn decode_config(data: &[u8], expected_id: u8) -> Result<Value, ProtocolError> {
    require_len(data, 1)?;
    if data[0] != expected_id {
        return Err(ProtocolError::UnexpectedResponseId {
            expected: expected_id,
            actual: data[0],
        });
    }

    let descriptor = describe(Namespace::Config, expected_id)?;
    descriptor.scalar_type.decode(&data[1..])
}

/// Decode a `SaveDone` payload: a 2-byte status code.
pub fn decode_save_code(data: &[u8]) -> Result<u16, ProtocolError> {
    require_len(data, 2)?;
    Ok(u16::from_be_bytes([data[0], data[1]]))
}

/// Decode a `UserCalSampCount` payload: the number of samples so far.
pub fn decode_sample_count(data: &[u8]) -> Result<u32, ProtocolError> {
    require_len(data, 4)?;
    Ok(u32::from_be_bytes([data[0], data[1], data[2], data[3]]))
}

/// Decode a `UserCalScore` payload: six f32 scores.
pub fn decode_cal_scores(data: &[u8]) -> Result<CalScores, ProtocolError> {
    require_len(data, 24)?;

    Ok(CalScores {
        cal_score: read_f32(data, 0),
        cal_param2: read_f32(data, 4),
        accel_cal_score: read_f32(data, 8),
        dist_error: read_f32(data, 12),
        tilt_error: read_f32(data, 16),
        tilt_range: read_f32(data, 20),
    })
}

/// Decode a `ParamResp` payload.
///
/// Format: param_id(1) + axis_id(1) + count(1) + count × f64.
pub fn decode_filter(data: &[u8]) -> Result<FilterSpec, ProtocolError> {
    require_len(data, 3)?;

    if data[0] != PARAM_FIR_FILTER {
        return Err(ProtocolError::ProtocolMismatch {
            field: "param id",
            expected: PARAM_FIR_FILTER,
            actual: data[0],
        });
    }
    if data[1] != PARAM_FIR_AXIS {
        return Err(ProtocolError::ProtocolMismatch {
            field: "axis id",
            expected: PARAM_FIR_AXIS,
            actual: data[1],
        });
    }

    let count = data[2];
    let expected = 3 + count as usize * 8;
    require_len(data, expected)?;
    if data.len() > expected {
        return Err(ProtocolError::FrameTooLong {
            max: expected,
            actual: data.len(),
        });
    }

    let coefficients = data[3..]
        .chunks_exact(8)
        .map(|c| f64::from_be_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
        .collect();

    Ok(FilterSpec::from_parts(count, coefficients))
}

/// Decode an `AcqParamsResp` payload.
///
/// Format: polling_mode(1) + flush_filter(1) + sensor_acq_time(f32) +
/// interval_resp_time(f32).
pub fn decode_acq_params(data: &[u8]) -> Result<AcqParams, ProtocolError> {
    require_len(data, 10)?;

    Ok(AcqParams {
        polling_mode: data[0] != 0,
        flush_filter: data[1] != 0,
        sensor_acq_time: read_f32(data, 2),
        interval_resp_time: read_f32(data, 6),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;

    fn data_payload(components: &[(u8, &[u8])]) -> Vec<u8> {
        let mut payload = vec![components.len() as u8];
        for (id, value) in components {
            payload.push(*id);
            payload.extend_from_slice(value);
        }
        payload
    }

    #[test]
    fn test_decode_data_sparse() {
        let payload = data_payload(&[
            (COMPONENT_HEADING, &1.0f32.to_be_bytes()),
            (COMPONENT_DISTORTION, &[1]),
        ]);
        let datum = decode_data(&payload).unwrap();

        assert_eq!(datum.heading, Some(1.0));
        assert_eq!(datum.distortion, Some(true));
        assert_eq!(
            datum,
            Datum {
                heading: Some(1.0),
                distortion: Some(true),
                ..Datum::default()
            }
        );
    }

    #[test]
    fn test_decode_data_any_order() {
        let payload = data_payload(&[
            (COMPONENT_Z_ALIGNED, &(-12.5f32).to_be_bytes()),
            (COMPONENT_CAL_STATUS, &[0]),
            (COMPONENT_TEMPERATURE, &21.0f32.to_be_bytes()),
            (COMPONENT_P_ANGLE, &3.0f32.to_be_bytes()),
        ]);
        let datum = decode_data(&payload).unwrap();

        assert_eq!(datum.z_aligned, Some(-12.5));
        assert_eq!(datum.cal_status, Some(false));
        assert_eq!(datum.temperature, Some(21.0));
        assert_eq!(datum.p_angle, Some(3.0));
        assert_eq!(datum.heading, None);
    }

    #[test]
    fn test_decode_data_empty() {
        assert!(decode_data(&[0]).unwrap().is_empty());
        assert!(matches!(decode_data(&[]), Err(ProtocolError::FrameTooShort { .. })));
    }

    #[test]
    fn test_decode_data_unknown_component() {
        let payload = data_payload(&[(COMPONENT_HEADING, &1.0f32.to_be_bytes()), (6, &[0])]);
        assert_eq!(
            decode_data(&payload),
            Err(ProtocolError::UnknownIdentifier {
                namespace: Namespace::Data,
                id: 6
            })
        );
    }

    #[test]
    fn test_decode_data_truncated() {
        // Count says two components but only one is present.
        let mut payload = data_payload(&[(COMPONENT_HEADING, &1.0f32.to_be_bytes())]);
        payload[0] = 2;
        assert!(matches!(decode_data(&payload), Err(ProtocolError::FrameTooShort { .. })));

        // Value cut short.
        let payload = vec![1, COMPONENT_TEMPERATURE, 0x41, 0xA8];
        assert!(matches!(decode_data(&payload), Err(ProtocolError::FrameTooShort { .. })));
    }

    #[test]
    fn test_decode_config() {
        let mut payload = vec![CONFIG_DECLINATION];
        payload.extend_from_slice(&(-3.5f32).to_be_bytes());
        assert_eq!(decode_config(&payload, CONFIG_DECLINATION), Ok(Value::F32(-3.5)));

        assert_eq!(
            decode_config(&[CONFIG_MOUNTING_REF, 4], CONFIG_MOUNTING_REF),
            Ok(Value::U8(4))
        );
    }

    #[test]
    fn test_decode_config_wrong_id() {
        assert_eq!(
            decode_config(&[2, 1], 1),
            Err(ProtocolError::UnexpectedResponseId {
                expected: 1,
                actual: 2
            })
        );
    }

    #[test]
    fn test_decode_filter() {
        let payload = Command::SetFilter(FilterSpec::with_defaults(8).unwrap()).payload();
        let filter = decode_filter(&payload).unwrap();
        assert_eq!(filter, FilterSpec::with_defaults(8).unwrap());

        assert_eq!(decode_filter(&[3, 1, 0]).unwrap().coefficients(), &[] as &[f64]);
    }

    #[test]
    fn test_decode_filter_header_mismatch() {
        assert_eq!(
            decode_filter(&[4, 1, 0]),
            Err(ProtocolError::ProtocolMismatch {
                field: "param id",
                expected: 3,
                actual: 4
            })
        );
        assert_eq!(
            decode_filter(&[3, 2, 0]),
            Err(ProtocolError::ProtocolMismatch {
                field: "axis id",
                expected: 1,
                actual: 2
            })
        );
    }

    #[test]
    fn test_decode_filter_length() {
        assert!(matches!(
            decode_filter(&[3, 1, 4, 0, 0]),
            Err(ProtocolError::FrameTooShort { expected: 35, .. })
        ));
        assert!(matches!(
            decode_filter(&[3, 1, 0, 0]),
            Err(ProtocolError::FrameTooLong { max: 3, actual: 4 })
        ));
    }

    #[test]
    fn test_decode_acq_params() {
        let params = AcqParams {
            polling_mode: false,
            flush_filter: true,
            sensor_acq_time: 0.25,
            interval_resp_time: 0.5,
        };
        let payload = Command::SetAcqParams(params).payload();
        assert_eq!(decode_acq_params(&payload), Ok(params));
    }

    #[test]
    fn test_decode_cal_scores() {
        let payload: Vec<u8> = (1..=6).flat_map(|v| (v as f32).to_be_bytes()).collect();
        let scores = decode_cal_scores(&payload).unwrap();
        assert_eq!(
            scores,
            CalScores {
                cal_score: 1.0,
                cal_param2: 2.0,
                accel_cal_score: 3.0,
                dist_error: 4.0,
                tilt_error: 5.0,
                tilt_range: 6.0,
            }
        );
        assert!(decode_cal_scores(&payload[..20]).is_err());
    }

    #[test]
    fn test_response_decode_dispatch() {
        let frame = Frame::new(FRAME_MOD_INFO_RESP, b"TCM6C016".to_vec());
        let response = Response::decode(&frame).unwrap();
        match &response {
            Response::ModInfo(info) => {
                assert_eq!(info.device_type_str(), "TCM6");
                assert_eq!(info.revision_str(), "C016");
            }
            other => panic!("Expected ModInfo, got {:?}", other),
        }
        assert_eq!(response.code(), FRAME_MOD_INFO_RESP);

        let frame = Frame::new(FRAME_SAVE_DONE, vec![0x00, 0x07]);
        assert_eq!(Response::decode(&frame), Ok(Response::SaveDone { code: 7 }));

        let frame = Frame::new(FRAME_CONFIG_RESP, vec![CONFIG_TRUE_NORTH, 1]);
        assert_eq!(
            Response::decode(&frame),
            Ok(Response::Config {
                id: CONFIG_TRUE_NORTH,
                value: Value::Bool(true)
            })
        );
    }

    #[test]
    fn test_response_decode_unknown_frame() {
        // Requests are never sent by the module.
        let frame = Frame::new(FRAME_GET_DATA, Vec::new());
        assert_eq!(Response::decode(&frame), Err(ProtocolError::UnknownFrame(FRAME_GET_DATA)));
    }
}
