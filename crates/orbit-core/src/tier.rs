//! Static tier table.
//!
//! Four fixed duration categories keyed `"25"`, `"50"`, `"75"` and
//! `"infinity"`. Label and color are display concerns carried for the
//! view layer; duration drives the session countdown.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed duration/visual category assigned to a task. Not user-editable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Tier {
    #[serde(rename = "25")]
    Min25,
    #[serde(rename = "50")]
    Min50,
    #[serde(rename = "75")]
    Min75,
    #[serde(rename = "infinity")]
    Infinity,
}

impl Tier {
    /// All tiers in display order.
    pub fn all() -> [Tier; 4] {
        [Tier::Min25, Tier::Min50, Tier::Min75, Tier::Infinity]
    }

    /// Session duration in minutes.
    pub fn duration_minutes(&self) -> u32 {
        match self {
            Tier::Min25 => 25,
            Tier::Min50 => 50,
            Tier::Min75 => 75,
            Tier::Infinity => 1440,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Min25 => "25 MIN",
            Tier::Min50 => "50 MIN",
            Tier::Min75 => "75 MIN",
            Tier::Infinity => "\u{221e} HORIZON",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Tier::Min25 => "#00f0ff",
            Tier::Min50 => "#ffd700",
            Tier::Min75 => "#ff2a6d",
            Tier::Infinity => "#d300c5",
        }
    }

    /// Parse a tier key as it appears on the wire.
    pub fn from_key(key: &str) -> Option<Tier> {
        match key {
            "25" => Some(Tier::Min25),
            "50" => Some(Tier::Min50),
            "75" => Some(Tier::Min75),
            "infinity" => Some(Tier::Infinity),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Tier::Min25 => "25",
            Tier::Min50 => "50",
            Tier::Min75 => "75",
            Tier::Infinity => "infinity",
        }
    }
}

impl Default for Tier {
    fn default() -> Self {
        Tier::Min25
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
