//! 애플리케이션 계층이 의존하는 포트(추상 인터페이스) 모음.

use anyhow::Result;

/// 소스 컨트롤 협력자 포트.
///
/// 참조 해석, 오브젝트 타입 조회, 스코프 설정값 읽기, 현재 브랜치
/// 조회만 요구한다. `Ok(None)`은 "없음"을, `Err`는 실행 실패를 뜻한다.
pub trait SourceControl: Send + Sync {
    /// 참조를 정식 오브젝트 id로 해석한다. 존재하지 않으면 `None`.
    fn rev_parse(&self, reference: &str) -> Result<Option<String>>;

    /// 참조가 가리키는 오브젝트의 타입(`commit`/`tag`/`tree`/...).
    fn object_type(&self, reference: &str) -> Result<Option<String>>;

    /// 점 표기 키의 설정값. 설정되어 있지 않으면 `None`.
    fn config_value(&self, key: &str) -> Result<Option<String>>;

    /// 현재 브랜치 이름. detached HEAD면 `None`, 조회 자체가 실패하면 `Err`.
    fn current_branch(&self) -> Result<Option<String>>;
}
