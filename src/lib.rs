//! eb-devtools library root.
//! 계층(domain/application/infrastructure/interface)을 외부에 노출한다.

use anyhow::Result;

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interface;

use application::usecases::sign::SignOptions;
use interface::composition::AppComposition;

/// 라이브러리 직접 호출용: 현재 디렉터리 저장소에 대한 서명 URI를 만든다.
pub fn sign(options: &SignOptions) -> Result<String> {
    let composition = AppComposition::default();
    composition.sign_usecase()?.execute(options)
}

/// 설정 점검 JSON 출력용 함수.
pub fn inspect_config_pretty_json() -> Result<String> {
    let composition = AppComposition::default();
    composition.inspect_config_usecase()?.execute()
}
