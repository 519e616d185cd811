//! 해석된 설정을 확인하는 유스케이스.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use crate::infrastructure::config::ConfigResolver;

/// 사람이 읽기 쉬운 설정 요약. 비밀 값은 설정 여부만 보여 준다.
#[derive(Debug, Serialize)]
pub struct ConfigReport {
    pub settings_file: String,
    pub region: Option<String>,
    pub application_name: Option<String>,
    pub environment_name: Option<String>,
    pub dev_tools_endpoint: Option<String>,
    pub credential_file: Option<String>,
    pub access_key_configured: bool,
    pub secret_key_configured: bool,
    pub branches: BTreeMap<String, String>,
}

pub struct InspectConfigUseCase {
    pub config: ConfigResolver,
}

impl InspectConfigUseCase {
    /// 설정 점검 결과를 pretty JSON 문자열로 만든다.
    pub fn execute(&self) -> Result<String> {
        let report = ConfigReport {
            settings_file: self.config.settings_path().display().to_string(),
            region: self.config.region()?,
            application_name: self.config.application_name()?,
            environment_name: self.config.environment_name()?,
            dev_tools_endpoint: self.config.dev_tools_endpoint()?,
            credential_file: self
                .config
                .credential_file_path()?
                .map(|path| path.display().to_string()),
            access_key_configured: self
                .config
                .access_key_id()?
                .is_some_and(|key| !key.is_empty()),
            secret_key_configured: self
                .config
                .secret_access_key()?
                .is_some_and(|key| !key.is_empty()),
            branches: self.config.branch_mappings()?,
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }
}
