//! Domain layer
//! 서명 알고리즘과 도메인 오류를 외부 의존성 없이 표현한다.

pub mod error;
pub mod signing;
