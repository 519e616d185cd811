//! Interface layer
//! CLI 입력을 유스케이스 호출로 변환한다.

pub mod cli;
pub mod composition;
