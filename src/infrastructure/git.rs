//! `git` CLI를 호출하는 SourceControl 포트 구현.

use std::process::{Command, Output};

use anyhow::{Context, Result};
use tracing::debug;

use crate::application::ports::SourceControl;
use crate::domain::error::DevToolsError;

/// 작업 디렉터리의 git 저장소에 대해 동작하는 동기 실행기.
pub struct GitCli;

impl GitCli {
    fn run(&self, args: &[&str]) -> Result<Output> {
        Command::new("git")
            .args(args)
            .output()
            .with_context(|| format!("failed to run git {}", args.join(" ")))
    }
}

fn stdout_trimmed(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

impl SourceControl for GitCli {
    fn rev_parse(&self, reference: &str) -> Result<Option<String>> {
        let output = self.run(&["rev-parse", reference])?;
        if !output.status.success() {
            debug!(reference, "git rev-parse found no such revision");
            return Ok(None);
        }
        Ok(Some(stdout_trimmed(&output)))
    }

    fn object_type(&self, reference: &str) -> Result<Option<String>> {
        let output = self.run(&["cat-file", "-t", reference])?;
        if !output.status.success() {
            return Ok(None);
        }
        Ok(Some(stdout_trimmed(&output)))
    }

    fn config_value(&self, key: &str) -> Result<Option<String>> {
        let output = self.run(&["config", "--get", key])?;
        if !output.status.success() {
            // `git config --get`은 키가 없으면 1로 끝난다.
            return Ok(None);
        }
        Ok(Some(stdout_trimmed(&output)))
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let output = self.run(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        if !output.status.success() {
            return Err(DevToolsError::BranchLookup.into());
        }
        let branch = stdout_trimmed(&output);
        if branch == "HEAD" {
            // HEAD가 브랜치를 가리키지 않으므로 기본값으로 넘어간다.
            return Ok(None);
        }
        Ok(Some(branch))
    }
}
