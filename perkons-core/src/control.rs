//! Hardware controls and their byte offsets inside a voice region
//!
//! Every control lives in a single byte. Ranges and offsets are kept in one
//! static table so validation and field mapping never drift apart.

use crate::error::KitError;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Kind of hardware control, which fixes its admissible range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlKind {
    /// Three-position switch (0, 1, 2)
    Toggle,
    /// Potentiometer (0-255)
    Pot,
}

impl ControlKind {
    /// Lowest admissible value
    pub const fn min(&self) -> i32 {
        0
    }

    /// Highest admissible value
    pub const fn max(&self) -> i32 {
        match self {
            ControlKind::Toggle => 2,
            ControlKind::Pot => 255,
        }
    }
}

/// One of the 11 named controls of a voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    /// ALGO toggle
    Algo,
    /// MODE toggle
    Mode,
    /// VCF toggle
    Vcf,
    /// TUNE potentiometer
    Tune,
    /// PARAM1 potentiometer
    Param1,
    /// PARAM2 potentiometer
    Param2,
    /// FX SEND potentiometer
    FxSend,
    /// DECAY potentiometer
    Decay,
    /// CUTOFF potentiometer
    Cutoff,
    /// DRIVE potentiometer
    Drive,
    /// LEVEL potentiometer
    Level,
}

/// Static description of a control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlSpec {
    /// The control described
    pub control: Control,
    /// Lowercase name used in CLI arguments and JSON
    pub name: &'static str,
    /// Toggle or potentiometer
    pub kind: ControlKind,
    /// Byte offset relative to the start of the voice region
    pub offset: usize,
}

/// Number of controls per voice
pub const CONTROL_COUNT: usize = 11;

/// The control table, in panel order
///
/// Each potentiometer byte is preceded by a "quantized" companion byte
/// (offsets 8, 10, ..., 22) that is passed through untouched.
pub static CONTROLS: [ControlSpec; CONTROL_COUNT] = [
    ControlSpec { control: Control::Algo, name: "algo", kind: ControlKind::Toggle, offset: 0 },
    ControlSpec { control: Control::Mode, name: "mode", kind: ControlKind::Toggle, offset: 2 },
    ControlSpec { control: Control::Vcf, name: "vcf", kind: ControlKind::Toggle, offset: 24 },
    ControlSpec { control: Control::Tune, name: "tune", kind: ControlKind::Pot, offset: 9 },
    ControlSpec { control: Control::Param1, name: "param1", kind: ControlKind::Pot, offset: 11 },
    ControlSpec { control: Control::Param2, name: "param2", kind: ControlKind::Pot, offset: 13 },
    ControlSpec { control: Control::FxSend, name: "fx_send", kind: ControlKind::Pot, offset: 15 },
    ControlSpec { control: Control::Decay, name: "decay", kind: ControlKind::Pot, offset: 17 },
    ControlSpec { control: Control::Cutoff, name: "cutoff", kind: ControlKind::Pot, offset: 19 },
    ControlSpec { control: Control::Drive, name: "drive", kind: ControlKind::Pot, offset: 21 },
    ControlSpec { control: Control::Level, name: "level", kind: ControlKind::Pot, offset: 23 },
];

impl Control {
    /// All controls, in table order
    pub fn all() -> impl Iterator<Item = Control> {
        CONTROLS.iter().map(|spec| spec.control)
    }

    /// Table entry for this control
    pub fn spec(&self) -> &'static ControlSpec {
        // Table order matches declaration order
        &CONTROLS[*self as usize]
    }

    /// Lowercase name
    pub fn name(&self) -> &'static str {
        self.spec().name
    }

    /// Toggle or potentiometer
    pub fn kind(&self) -> ControlKind {
        self.spec().kind
    }

    /// Byte offset inside the voice region
    pub fn offset(&self) -> usize {
        self.spec().offset
    }

    /// Lowest admissible value
    pub fn min(&self) -> i32 {
        self.kind().min()
    }

    /// Highest admissible value
    pub fn max(&self) -> i32 {
        self.kind().max()
    }

    /// Check `value` against the control's range and narrow it to a byte
    pub fn validate(&self, value: i32) -> Result<u8, KitError> {
        if value < self.min() || value > self.max() {
            return Err(KitError::OutOfRange {
                control: *self,
                value,
            });
        }

        Ok(value as u8)
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Control {
    type Err = KitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        CONTROLS
            .iter()
            .find(|spec| spec.name == wanted)
            .map(|spec| spec.control)
            .ok_or_else(|| KitError::UnknownControl(s.to_string()))
    }
}
