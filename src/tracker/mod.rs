// src/tracker/mod.rs
//! TK-Star tracker wire format

pub mod bcd;
pub mod fix;
pub mod frame;

pub use fix::Fix;
pub use frame::{decode, Frame, FIX_FRAME_LEN, FIX_MAGIC};
