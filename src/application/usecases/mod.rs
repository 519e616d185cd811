//! 유스케이스 모음.

pub mod configure;
pub mod inspect_config;
pub mod sign;
