// src/tracker/frame.rs
//! Binary fix frame decoding
//!
//! A fix frame starts with the `$` marker byte and has a fixed layout:
//!
//! | bytes     | content                                          |
//! |-----------|--------------------------------------------------|
//! | `[0]`     | marker `0x24`                                    |
//! | `[1..6)`  | device id, raw                                   |
//! | `[6..12)` | hour, minute, second, year, month, day, one BCD byte each |
//! | `[12..17)`| latitude, `DDMMmmmm..` in BCD                    |
//! | `[17..22)`| longitude, `DDDMMmmmm.` in BCD                   |
//!
//! Anything after byte 22 is ignored. Frames that do not start with the marker
//! (the device also emits a comma separated `*HQ,...#` text dialect) are handed
//! back untouched.

use super::{bcd, Fix};
use crate::error::DecodeError;
use chrono::{DateTime, Duration, Local, Months, NaiveDate, NaiveDateTime, TimeZone};
use std::ops::Range;

pub const FIX_MAGIC: u8 = 0x24;
pub const FIX_FRAME_LEN: usize = 22;

const DEVICE_ID: Range<usize> = 1..6;
const TIME_FIELDS: Range<usize> = 6..12;
const LATITUDE: Range<usize> = 12..17;
const LONGITUDE: Range<usize> = 17..22;

const LATITUDE_DEGREE_DIGITS: usize = 2;
const LONGITUDE_DEGREE_DIGITS: usize = 3;
const MINUTE_FRACTION_DIGITS: usize = 4;

/// Outcome of classifying one buffer read from a tracker
#[derive(Debug, Clone, PartialEq)]
pub enum Frame<'a> {
    Fix(Fix),
    /// Not a binary fix frame; the original bytes, unchanged
    NotAFix(&'a [u8]),
}

impl Frame<'_> {
    pub fn is_fix(&self) -> bool {
        matches!(self, Frame::Fix(_))
    }
}

/// Decode one buffer into a fix, or hand it back if it is not a fix frame
pub fn decode(buffer: &[u8]) -> Result<Frame<'_>, DecodeError> {
    if buffer.first() != Some(&FIX_MAGIC) {
        return Ok(Frame::NotAFix(buffer));
    }

    if buffer.len() < FIX_FRAME_LEN {
        return Err(DecodeError::BufferTooShort {
            needed: FIX_FRAME_LEN,
            actual: buffer.len(),
        });
    }

    let mut device_id = [0u8; 5];
    device_id.copy_from_slice(&buffer[DEVICE_ID]);

    Ok(Frame::Fix(Fix {
        device_id,
        timestamp: decode_timestamp(&buffer[TIME_FIELDS])?,
        latitude: decode_coordinate("latitude", &buffer[LATITUDE], LATITUDE_DEGREE_DIGITS)?,
        longitude: decode_coordinate("longitude", &buffer[LONGITUDE], LONGITUDE_DEGREE_DIGITS)?,
    }))
}

/// Six BCD bytes in hour, minute, second, year, month, day order, as local time
fn decode_timestamp(data: &[u8]) -> Result<DateTime<Local>, DecodeError> {
    let hour = bcd::bcd_pair("hour", data[0])?;
    let minute = bcd::bcd_pair("minute", data[1])?;
    let second = bcd::bcd_pair("second", data[2])?;
    let year = bcd::bcd_pair("year", data[3])?;
    let month = bcd::bcd_pair("month", data[4])?;
    let day = bcd::bcd_pair("day", data[5])?;

    let invalid = DecodeError::InvalidTimestamp {
        year,
        month,
        day,
        hour,
        minute,
        second,
    };

    let naive = normalize_calendar(year, month, day, hour, minute, second).ok_or(invalid.clone())?;
    resolve_local(&Local, &naive).ok_or(invalid)
}

/// Build a calendar value the way `mktime` does: out of range fields roll
/// over into the next unit (month 13 is January of the next year, day 0 the
/// last day of the previous month, hour 25 one o'clock the next day).
/// The two digit year is taken literally.
fn normalize_calendar(
    year: u32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> Option<NaiveDateTime> {
    let start = NaiveDate::from_ymd_opt(year as i32, 1, 1)?.and_hms_opt(0, 0, 0)?;
    let start = if month == 0 {
        start.checked_sub_months(Months::new(1))?
    } else {
        start.checked_add_months(Months::new(month - 1))?
    };

    start
        .checked_add_signed(Duration::days(day as i64 - 1))?
        .checked_add_signed(Duration::hours(hour as i64))?
        .checked_add_signed(Duration::minutes(minute as i64))?
        .checked_add_signed(Duration::seconds(second as i64))
}

/// Ambiguous (DST fold) takes the earlier instant, a DST gap moves forward one hour
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: &NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(naive).earliest().or_else(|| {
        let shifted = naive.checked_add_signed(Duration::hours(1))?;
        tz.from_local_datetime(&shifted).earliest()
    })
}

/// Degrees followed by `MM.mmmm` minutes; trailing digits of the span are unused
fn decode_coordinate(
    field: &'static str,
    data: &[u8],
    degree_digits: usize,
) -> Result<f64, DecodeError> {
    let text = bcd::hex_string(data);
    let minutes_start = degree_digits;
    let fraction_start = minutes_start + 2;
    let end = fraction_start + MINUTE_FRACTION_DIGITS;

    let degrees = bcd::decimal_digits(field, &text[..minutes_start])?;

    let whole = &text[minutes_start..fraction_start];
    let fraction = &text[fraction_start..end];
    bcd::decimal_digits(field, whole)?;
    bcd::decimal_digits(field, fraction)?;

    let minutes_text = format!("{}.{}", whole, fraction);
    let minutes = minutes_text
        .parse::<f64>()
        .map_err(|_| DecodeError::MalformedDigit { field, text: minutes_text.clone() })?;

    Ok(degrees as f64 + minutes / 60.0)
}
