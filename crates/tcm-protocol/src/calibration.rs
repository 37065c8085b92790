//! User calibration session.
//!
//! Once `StartCal` is sent the module reports progress asynchronously: one
//! `UserCalSampCount` frame per recorded sample, then a single `UserCalScore`
//! frame when the calibration converges. Data frames may be interleaved if the
//! module is still streaming. The session consumes those frames one at a time
//! through [`CalibrationSession::step`], so it can be driven from a live
//! channel or from recorded frames alike.

use log::debug;

use crate::constants::*;
use crate::error::ProtocolError;
use crate::frame::Frame;
use crate::responses::{decode_cal_scores, decode_sample_count};
use crate::types::{CalScores, CalibrationMode};

/// Where a calibration session stands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationState {
    /// Waiting for the next sample count or the final score.
    AwaitingProgressOrScore,
    /// Calibration finished with these scores.
    Converged(CalScores),
}

/// Observation produced by a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationStatus {
    /// A sample was recorded; the value is the number recorded so far.
    Progress(u32),
    /// Calibration finished.
    Converged(CalScores),
}

impl CalibrationStatus {
    /// Check if this observation ends the session.
    pub fn is_converged(&self) -> bool {
        matches!(self, CalibrationStatus::Converged(_))
    }
}

/// Tracks one calibration run.
#[derive(Debug, Clone)]
pub struct CalibrationSession {
    mode: CalibrationMode,
    state: CalibrationState,
    samples: u32,
}

impl CalibrationSession {
    /// Start tracking a calibration run in `mode`.
    pub fn new(mode: CalibrationMode) -> Self {
        CalibrationSession {
            mode,
            state: CalibrationState::AwaitingProgressOrScore,
            samples: 0,
        }
    }

    /// Calibration procedure being run.
    pub fn mode(&self) -> CalibrationMode {
        self.mode
    }

    /// Current state.
    pub fn state(&self) -> CalibrationState {
        self.state
    }

    /// Last sample count reported by the module.
    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// Check if the session reached its terminal state.
    pub fn is_converged(&self) -> bool {
        matches!(self.state, CalibrationState::Converged(_))
    }

    /// Feed one received frame to the session.
    ///
    /// Returns `Ok(None)` for data frames, which are skipped.
    pub fn step(&mut self, frame: &Frame) -> Result<Option<CalibrationStatus>, ProtocolError> {
        if self.is_converged() {
            return Err(ProtocolError::InvalidState(
                "calibration session already converged".to_string(),
            ));
        }

        match frame.frame_id {
            FRAME_USER_CAL_SAMP_COUNT => {
                let count = decode_sample_count(&frame.payload)?;
                debug!("calibration sample {} recorded", count);
                self.samples = count;
                Ok(Some(CalibrationStatus::Progress(count)))
            }
            FRAME_USER_CAL_SCORE => {
                let scores = decode_cal_scores(&frame.payload)?;
                debug!("calibration converged after {} samples: {:?}", self.samples, scores);
                self.state = CalibrationState::Converged(scores);
                Ok(Some(CalibrationStatus::Converged(scores)))
            }
            FRAME_DATA_RESP => Ok(None),
            actual => Err(ProtocolError::UnexpectedFrame {
                expected: FRAME_USER_CAL_SAMP_COUNT,
                actual,
            }),
        }
    }
}
