// src/tracker/fix.rs
//! Decoded position fix

use super::bcd;
use chrono::{DateTime, Local};
use std::fmt;

/// One decoded position report from a tracker
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    pub device_id: [u8; 5],
    pub timestamp: DateTime<Local>,
    pub latitude: f64,  // degrees, no hemisphere sign
    pub longitude: f64, // degrees, no hemisphere sign
}

impl Fix {
    /// Device id as the 10 character hex string the tracker prints on its label
    pub fn device_hex(&self) -> String {
        bcd::hex_string(&self.device_id)
    }

    /// Seconds since the Unix epoch
    pub fn epoch_seconds(&self) -> i64 {
        self.timestamp.timestamp()
    }

    /// Local time in the classic `ctime` layout, e.g. "Sun Jan 17 11:09:27 2016"
    pub fn local_time_string(&self) -> String {
        self.timestamp.format("%a %b %e %H:%M:%S %Y").to_string()
    }

    /// Format a coordinate the way it is sent to sinks
    pub fn format_coordinate(value: f64) -> String {
        format!("{:.6}", value)
    }
}

impl fmt::Display for Fix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Device : {}", self.device_hex())?;
        writeln!(f, "Time : {}", self.local_time_string())?;
        writeln!(f, "Latitude : {}", Self::format_coordinate(self.latitude))?;
        write!(f, "Longitude : {}", Self::format_coordinate(self.longitude))
    }
}
