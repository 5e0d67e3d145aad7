#![allow(dead_code)]

pub mod fixtures;
pub mod mock_bot_api;
pub mod shared_buffer;

pub use shared_buffer::{SharedBuf, read_output};
