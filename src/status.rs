use std::fmt;

use crate::error::Error;

/// Outcome of a print job reported by the printer.
///
/// The printer replies with `ESC R <code>`. A successful result doesn't
/// always mean a label came out: the printer spins its gear and reports
/// `Success` even without a cassette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintResult {
    Success,
    /// Intermediate state, never returned by a finished job.
    Printing,
    Failed,
    SuccessLowBattery,
    FailedCancel,
    FailedLowBattery,
    /// Documented but never seen in the wild.
    FailedNoCasette,
}

impl PrintResult {
    /// Parse the reply notification of the printer.
    ///
    /// Code 1 is a completed job and code 5 a failed one, both with a different
    /// status value; they are folded into `Success` and `Failed`.
    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        match data {
            [0x1B, b'R', code, ..] => match code {
                0 | 1 => Ok(Self::Success),
                2 | 5 => Ok(Self::Failed),
                3 => Ok(Self::SuccessLowBattery),
                4 => Ok(Self::FailedCancel),
                6 => Ok(Self::FailedLowBattery),
                7 => Ok(Self::FailedNoCasette),
                _ => Err(Error::UnrecognizedResult(*code)),
            },
            _ => Err(Error::MalformedReply(data.to_vec())),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Printing => 1,
            Self::Failed => 2,
            Self::SuccessLowBattery => 3,
            Self::FailedCancel => 4,
            Self::FailedLowBattery => 6,
            Self::FailedNoCasette => 7,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Printing => "PRINTING",
            Self::Failed => "FAILED",
            Self::SuccessLowBattery => "SUCCESS_LOW_BATTERY",
            Self::FailedCancel => "FAILED_CANCEL",
            Self::FailedLowBattery => "FAILED_LOW_BATTERY",
            Self::FailedNoCasette => "FAILED_NO_CASETTE",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::SuccessLowBattery)
    }
}

impl fmt::Display for PrintResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}
