//! Test doubles shared by the unit tests

use keeptime_hal::{TimeError, TimeSource, Timestamp};

/// In-memory time source
///
/// Time only moves when set. When `fail_with` is set, every call fails
/// with that error.
#[derive(Debug, Default)]
pub struct ManualTime {
    pub time: Timestamp,
    pub fail_with: Option<TimeError>,
}

impl TimeSource for ManualTime {
    fn now(&mut self) -> Result<Timestamp, TimeError> {
        match self.fail_with {
            Some(e) => Err(e),
            None => Ok(self.time),
        }
    }

    fn set(&mut self, time: Timestamp) -> Result<(), TimeError> {
        match self.fail_with {
            Some(e) => Err(e),
            None => {
                self.time = time;
                Ok(())
            }
        }
    }
}
