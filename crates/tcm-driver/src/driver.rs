//! Request/response driver for the TCM module.
//!
//! [`Tcm`] owns a [`Channel`] and runs one exchange at a time: encode a
//! command, write it, then read the single frame the module answers with.
//! Every method takes `&mut self`, so exchanges on one channel can never
//! overlap.

use tcm_protocol::{
    decode_acq_params, decode_config, decode_data, decode_filter, decode_mod_info,
    decode_save_code, payload_len, AcqParams, CalibrationMode, CalibrationSession,
    CalibrationStatus, Command, Datum, FilterSpec, Frame, ModInfo, ProtocolError, Response,
    Value, FRAME_DATA_RESP,
};
use tracing::{debug, trace, warn};

use crate::channel::Channel;
use crate::error::DriverResult;

/// Driver for one TCM module.
#[derive(Debug)]
pub struct Tcm<C> {
    channel: C,
    streaming: bool,
}

impl<C: Channel> Tcm<C> {
    /// Drive the module on the other end of `channel`.
    pub fn new(channel: C) -> Self {
        Tcm {
            channel,
            streaming: false,
        }
    }

    /// Borrow the channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Mutably borrow the channel.
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Release the channel.
    pub fn into_inner(self) -> C {
        self.channel
    }

    /// Whether interval mode was started and not yet stopped.
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    // ------------------------------------------------------------------------
    // Frame I/O
    // ------------------------------------------------------------------------

    /// Write a command.
    pub fn send(&mut self, command: &Command) -> DriverResult<()> {
        debug!("Tcm: sending frame {} ({:?})", command.code(), command);
        self.channel.write_all(&command.encode()?)
    }

    /// Read one frame and verify its checksum.
    ///
    /// The whole frame is consumed even when the checksum fails.
    pub fn read_frame(&mut self) -> DriverResult<Frame> {
        let header = self.channel.read_exact(2)?;
        let length = u16::from_be_bytes([header[0], header[1]]);
        let payload_len = payload_len(length)?;

        let body = self.channel.read_exact(length as usize - 2)?;
        let frame_id = body[0];
        let payload = body[1..1 + payload_len].to_vec();
        let crc = u16::from_be_bytes([body[1 + payload_len], body[2 + payload_len]]);

        let frame = Frame::from_parts(length, frame_id, payload, crc)?;
        trace!("Tcm: received frame {} with {} payload bytes", frame.frame_id, payload_len);
        Ok(frame)
    }

    /// Read one frame and require it to carry `expected`. Returns the payload.
    pub fn read_expected(&mut self, expected: u8) -> DriverResult<Vec<u8>> {
        let frame = self.read_frame()?;
        if frame.frame_id != expected {
            warn!(
                "Tcm: expected frame {}, received frame {}",
                expected, frame.frame_id
            );
            return Err(ProtocolError::UnexpectedFrame {
                expected,
                actual: frame.frame_id,
            }
            .into());
        }
        Ok(frame.payload)
    }

    /// Read one frame of any kind and decode it.
    pub fn read_response(&mut self) -> DriverResult<Response> {
        let frame = self.read_frame()?;
        Ok(Response::decode(&frame)?)
    }

    /// Send `command` and read the payload of the frame it is answered with.
    fn request(&mut self, command: &Command) -> DriverResult<Vec<u8>> {
        self.send(command)?;
        match command.response_code() {
            Some(expected) => self.read_expected(expected),
            None => Ok(Vec::new()),
        }
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Query the module type and firmware revision.
    pub fn get_model_info(&mut self) -> DriverResult<ModInfo> {
        let payload = self.request(&Command::GetModInfo)?;
        Ok(decode_mod_info(&payload)?)
    }

    /// Take one sample of the selected data components.
    pub fn get_data(&mut self) -> DriverResult<Datum> {
        let payload = self.request(&Command::GetData)?;
        Ok(decode_data(&payload)?)
    }

    /// Select the components reported in data responses.
    ///
    /// The module does not acknowledge this command.
    pub fn set_data_components(&mut self, ids: &[u8]) -> DriverResult<()> {
        let command = Command::set_data_components(ids)?;
        self.send(&command)
    }

    /// Write a configuration parameter.
    pub fn set_config(&mut self, id: u8, value: impl Into<Value>) -> DriverResult<()> {
        let command = Command::set_config(id, value.into())?;
        self.request(&command)?;
        Ok(())
    }

    /// Read a configuration parameter.
    pub fn get_config(&mut self, id: u8) -> DriverResult<Value> {
        let command = Command::get_config(id)?;
        let payload = self.request(&command)?;
        Ok(decode_config(&payload, id)?)
    }

    /// Configure the FIR filter with `count` taps.
    ///
    /// Without `coefficients` the built-in table for `count` is used.
    pub fn set_filter(&mut self, count: u8, coefficients: Option<Vec<f64>>) -> DriverResult<()> {
        let filter = FilterSpec::new(count, coefficients)?;
        self.request(&Command::SetFilter(filter))?;
        Ok(())
    }

    /// Read the FIR filter configuration.
    pub fn get_filter(&mut self) -> DriverResult<FilterSpec> {
        let payload = self.request(&Command::GetFilter)?;
        Ok(decode_filter(&payload)?)
    }

    /// Write the acquisition parameters.
    pub fn set_acquisition_params(&mut self, params: AcqParams) -> DriverResult<()> {
        self.request(&Command::SetAcqParams(params))?;
        Ok(())
    }

    /// Read the acquisition parameters.
    pub fn get_acquisition_params(&mut self) -> DriverResult<AcqParams> {
        let payload = self.request(&Command::GetAcqParams)?;
        Ok(decode_acq_params(&payload)?)
    }

    /// Enter interval mode. Data frames then arrive without being requested;
    /// read them with [`Tcm::read_streamed_data`].
    pub fn start_streaming(&mut self) -> DriverResult<()> {
        self.send(&Command::StartIntervalMode)?;
        self.streaming = true;
        Ok(())
    }

    /// Leave interval mode and drop whatever the module already queued.
    pub fn stop_streaming(&mut self) -> DriverResult<()> {
        self.send(&Command::StopIntervalMode)?;
        self.streaming = false;
        self.channel.discard_buffered()
    }

    /// Read the next data frame pushed in interval mode.
    pub fn read_streamed_data(&mut self) -> DriverResult<Datum> {
        if !self.streaming {
            return Err(
                ProtocolError::InvalidState("interval mode is not running".to_string()).into(),
            );
        }
        let payload = self.read_expected(FRAME_DATA_RESP)?;
        Ok(decode_data(&payload)?)
    }

    /// Wake the module from power-down.
    pub fn power_up(&mut self) -> DriverResult<()> {
        self.request(&Command::PowerUp)?;
        Ok(())
    }

    /// Put the module into power-down.
    pub fn power_down(&mut self) -> DriverResult<()> {
        self.request(&Command::PowerDown)?;
        Ok(())
    }

    /// Persist the configuration to non-volatile memory.
    pub fn save(&mut self) -> DriverResult<()> {
        let payload = self.request(&Command::Save)?;
        let code = decode_save_code(&payload)?;
        if code != 0 {
            warn!("Tcm: save failed with code {}", code);
            return Err(ProtocolError::SaveFailed { code }.into());
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Calibration
    // ------------------------------------------------------------------------

    /// Begin a user calibration. Nothing is awaited; poll the returned
    /// session with [`Tcm::calibration_status`].
    pub fn start_calibration(&mut self, mode: CalibrationMode) -> DriverResult<CalibrationSession> {
        self.send(&Command::StartCalibration { mode })?;
        debug!("Tcm: calibration started in {:?} mode", mode);
        Ok(CalibrationSession::new(mode))
    }

    /// Block until the module reports calibration progress or completion.
    ///
    /// Data frames received in between are skipped. A session that already
    /// converged is rejected before anything is read from the channel.
    pub fn calibration_status(
        &mut self,
        session: &mut CalibrationSession,
    ) -> DriverResult<CalibrationStatus> {
        if session.is_converged() {
            return Err(ProtocolError::InvalidState(
                "calibration session already converged".to_string(),
            )
            .into());
        }
        loop {
            let frame = self.read_frame()?;
            match session.step(&frame)? {
                Some(status) => return Ok(status),
                None => trace!("Tcm: skipped data frame during calibration"),
            }
        }
    }

    /// Record a calibration sample now. Only needed when auto-sampling is off.
    pub fn take_calibration_sample(&mut self) -> DriverResult<()> {
        self.send(&Command::TakeCalibrationSample)
    }

    /// Abort a user calibration.
    pub fn stop_calibration(&mut self) -> DriverResult<()> {
        self.send(&Command::StopCalibration)
    }

    /// Restore the factory magnetometer calibration.
    pub fn restore_factory_mag_calibration(&mut self) -> DriverResult<()> {
        self.request(&Command::FactoryMagCalibration)?;
        Ok(())
    }

    /// Restore the factory accelerometer calibration.
    pub fn restore_factory_accel_calibration(&mut self) -> DriverResult<()> {
        self.request(&Command::FactoryAccelCalibration)?;
        Ok(())
    }
}
