//! Structured Control-Command Interface

use crate::device::Device;
use crate::error::DeviceError;
use simtemp_protocol::{ConfigRecord, ControlCommand, StatsRecord};
use tracing::{debug, info};

/// Output of a control command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlResponse {
    None,
    Config(ConfigRecord),
    Stats(StatsRecord),
}

impl ControlResponse {
    /// Copy the payload into `dst`, returning bytes written
    pub fn write_to(&self, dst: &mut [u8]) -> Result<usize, DeviceError> {
        let written = match self {
            ControlResponse::None => 0,
            ControlResponse::Config(record) => record.write_to(dst)?,
            ControlResponse::Stats(record) => record.write_to(dst)?,
        };
        Ok(written)
    }
}

impl Device {
    /// Execute a decoded control command
    pub async fn execute(&self, command: ControlCommand) -> Result<ControlResponse, DeviceError> {
        self.ensure_live()?;
        debug!("Control command: {:?}", command);

        let response = match command {
            ControlCommand::GetConfig => ControlResponse::Config(self.config().to_record()),
            ControlCommand::SetConfig(record) => {
                let candidate = self
                    .config
                    .validator()
                    .candidate_from_record(&record, &self.config())?;
                // `enabled` is not part of the record and keeps its committed value
                self.update_config(|c| {
                    c.sampling_ms = candidate.sampling_ms;
                    c.threshold_mc = candidate.threshold_mc;
                    c.mode = candidate.mode;
                })
                .await?;
                ControlResponse::None
            }
            ControlCommand::GetStats => ControlResponse::Stats(self.statistics().to_record()),
            ControlCommand::ResetStats => {
                self.reset_statistics();
                ControlResponse::None
            }
            ControlCommand::Enable => {
                self.enable().await?;
                ControlResponse::None
            }
            ControlCommand::Disable => {
                self.disable().await?;
                ControlResponse::None
            }
            ControlCommand::FlushBuffer => {
                let drained = self.flush();
                info!("Buffer flushed by control command ({} samples)", drained);
                ControlResponse::None
            }
        };
        Ok(response)
    }

    /// Decode and execute a raw command code.
    ///
    /// `payload` carries the input record for write commands and receives
    /// the output record for read commands. Returns bytes written back.
    pub async fn control(&self, code: u32, payload: &mut [u8]) -> Result<usize, DeviceError> {
        let result = self.control_inner(code, payload).await;
        if let Err(e) = &result {
            self.stats.record_error(e.errno());
        }
        result
    }

    async fn control_inner(&self, code: u32, payload: &mut [u8]) -> Result<usize, DeviceError> {
        let command = ControlCommand::decode(code, payload)?;
        let needed = command.response_size();
        if payload.len() < needed {
            return Err(DeviceError::Fault(format!(
                "response needs {} bytes, caller gave {}",
                needed,
                payload.len()
            )));
        }
        let response = self.execute(command).await?;
        response.write_to(payload)
    }
}
