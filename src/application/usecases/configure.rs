//! 설정 값을 기록하는 유스케이스.

use anyhow::Result;

use crate::infrastructure::config::{ConfigResolver, SettingsUpdate};

pub struct ConfigureUseCase {
    pub config: ConfigResolver,
}

impl ConfigureUseCase {
    /// 전달된 값만 갱신한다. 자격 증명의 기록 여부는 해석기의
    /// credential 파일 규칙을 따른다.
    pub fn execute(&mut self, update: &SettingsUpdate) -> Result<()> {
        self.config.write_settings(update)
    }
}
