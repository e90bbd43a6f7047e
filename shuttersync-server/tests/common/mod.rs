#![allow(dead_code)]

pub mod fake_shelly;
pub mod mock_app;
