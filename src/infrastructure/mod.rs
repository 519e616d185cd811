//! Infrastructure layer
//! 외부 시스템(파일시스템/git CLI)과 직접 통신하는 구현체 집합.

pub mod config;
pub mod git;
pub mod ini;
