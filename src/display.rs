// src/display.rs
//! Human readable diagnostics printed for every frame and publish

use crate::{
    error::{DecodeError, PublishError},
    publish::PublishOutcome,
    tracker::{bcd, Frame},
};
use std::net::SocketAddr;

/// Render what was read and what it decoded to
pub fn render_frame(raw: &[u8], decoded: &Result<Frame<'_>, DecodeError>) -> String {
    let mut text = bcd::hex_dump(raw);
    text.push('\n');

    match decoded {
        Ok(Frame::Fix(fix)) => text.push_str(&fix.to_string()),
        Ok(Frame::NotAFix(bytes)) => text.push_str(&render_raw(bytes)),
        Err(e) => text.push_str(&format!("Undecodable frame: {}", e)),
    }

    text.push('\n');
    text
}

/// Raw bytes with anything unprintable escaped
pub fn render_raw(bytes: &[u8]) -> String {
    bytes.escape_ascii().to_string()
}

pub fn render_publish(result: &Result<PublishOutcome, PublishError>) -> String {
    match result {
        Ok(outcome) => outcome.to_string(),
        Err(e) => e.to_string(),
    }
}

/// Print a frame report for one peer to stdout
pub fn print_frame(peer: SocketAddr, raw: &[u8], decoded: &Result<Frame<'_>, DecodeError>) {
    println!("[{}] {}", peer, render_frame(raw, decoded));
}

pub fn print_publish(peer: SocketAddr, result: &Result<PublishOutcome, PublishError>) {
    println!("[{}] {}", peer, render_publish(result));
}
