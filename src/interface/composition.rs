//! 애플리케이션 조립(composition root) 모듈.

use std::env;

use anyhow::{Context, Result};

use crate::application::usecases::configure::ConfigureUseCase;
use crate::application::usecases::inspect_config::InspectConfigUseCase;
use crate::application::usecases::sign::SignRequestUseCase;
use crate::infrastructure::config::ConfigResolver;
use crate::infrastructure::git::GitCli;

/// 실행 시점 의존성을 한 곳에서 조립하는 컨테이너.
#[derive(Default)]
pub struct AppComposition;

impl AppComposition {
    /// 서명 유스케이스를 생성한다.
    pub fn sign_usecase(&self) -> Result<SignRequestUseCase> {
        Ok(SignRequestUseCase {
            config: self.resolver()?,
        })
    }

    /// 설정 기록 유스케이스를 생성한다.
    pub fn configure_usecase(&self) -> Result<ConfigureUseCase> {
        Ok(ConfigureUseCase {
            config: self.resolver()?,
        })
    }

    /// 설정 점검 유스케이스를 생성한다.
    pub fn inspect_config_usecase(&self) -> Result<InspectConfigUseCase> {
        Ok(InspectConfigUseCase {
            config: self.resolver()?,
        })
    }

    fn resolver(&self) -> Result<ConfigResolver> {
        let root = env::current_dir().context("failed to determine the working directory")?;
        Ok(ConfigResolver::new(root, Box::new(GitCli)))
    }
}
