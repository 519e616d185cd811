//! 도메인 오류 분류.

use std::fmt;

use thiserror::Error;

/// 자격 증명 키 구분.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    AccessKey,
    SecretKey,
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialKind::AccessKey => write!(f, "Access"),
            CredentialKind::SecretKey => write!(f, "Secret"),
        }
    }
}

/// 서명/설정 과정에서 발생하는 치명적 오류.
#[derive(Debug, Error)]
pub enum DevToolsError {
    #[error("unable to find AWS {0} Key; run `eb-devtools config` to add it")]
    MissingCredential(CredentialKind),

    #[error("unable to find revision {reference}")]
    UnknownRevision { reference: String },

    #[error("{reference} is a {object_type}, and the value of --commit must refer to a commit")]
    NotACommit {
        reference: String,
        object_type: String,
    },

    #[error("no region configured; run `eb-devtools config --region <region>` to set one")]
    MissingRegion,

    #[error("no application name configured; run `eb-devtools config --application <name>` to set one")]
    MissingApplication,

    #[error("no deployment endpoint could be resolved from the configuration")]
    MissingEndpoint,

    #[error("error looking up the current branch")]
    BranchLookup,
}
