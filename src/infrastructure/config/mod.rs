//! 계층화된 설정 해석기.
//!
//! 해석 순서: 저장소 로컬 `.elasticbeanstalk/config` → git config 폴백.
//! 자격 증명은 별도의 사용자 단위 credential 파일을 먼저 본다.
//! 파싱된 INI 문서는 해석기 수명 동안 한 번만 읽어 메모이즈한다.

use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::application::ports::SourceControl;
use crate::infrastructure::ini::{GLOBAL_SECTION, Ini};

const SETTINGS_DIR: &str = ".elasticbeanstalk";
const SETTINGS_FILE: &str = "config";
const CREDENTIAL_FILE: &str = "aws_credential_file";
const CREDENTIAL_FILE_ENV: &str = "AWS_CREDENTIAL_FILE";

const CREDENTIAL_PATH_KEY: &str = "AwsCredentialFile";
const ACCESS_KEY_SETTING: &str = "AWSAccessKeyId";
const SECRET_KEY_SETTING: &str = "AWSSecretKey";

const BRANCHES_SECTION: &str = "branches";

/// 기본 엔드포인트를 합성할 수 있는 리전 목록.
const KNOWN_REGIONS: [&str; 8] = [
    "us-east-1",
    "us-west-1",
    "us-west-2",
    "eu-west-1",
    "ap-northeast-1",
    "ap-southeast-1",
    "ap-southeast-2",
    "sa-east-1",
];

/// 해석기가 노출하는 논리 속성.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Region,
    ApplicationName,
    EnvironmentName,
    DevToolsEndpoint,
    AccessKeyId,
    SecretAccessKey,
}

/// 속성별 키 이름 서술자: 저장소 로컬 키와 git config 폴백 키.
struct AttributeKeys {
    settings_key: Option<&'static str>,
    git_key: &'static str,
}

// 표 순서는 Attribute 선언 순서와 같다.
const ATTRIBUTES: [AttributeKeys; 6] = [
    AttributeKeys {
        settings_key: Some("Region"),
        git_key: "aws.region",
    },
    AttributeKeys {
        settings_key: Some("ApplicationName"),
        git_key: "aws.elasticbeanstalk.application",
    },
    AttributeKeys {
        settings_key: Some("EnvironmentName"),
        git_key: "aws.elasticbeanstalk.environment",
    },
    AttributeKeys {
        settings_key: Some("DevToolsEndpoint"),
        git_key: "aws.elasticbeanstalk.host",
    },
    AttributeKeys {
        settings_key: None,
        git_key: "aws.accesskey",
    },
    AttributeKeys {
        settings_key: None,
        git_key: "aws.secretkey",
    },
];

impl Attribute {
    fn keys(self) -> &'static AttributeKeys {
        &ATTRIBUTES[self as usize]
    }
}

/// `config` 명령이 기록할 수 있는 설정 묶음. 모든 필드는 선택이다.
#[derive(Debug, Default, Clone)]
pub struct SettingsUpdate {
    pub region: Option<String>,
    pub application_name: Option<String>,
    pub environment_name: Option<String>,
    pub dev_tools_endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.settings_entries().is_empty()
            && self.access_key_id.is_none()
            && self.secret_access_key.is_none()
    }

    /// 저장소 로컬 파일에 기록될 (키, 값) 쌍.
    fn settings_entries(&self) -> BTreeMap<String, String> {
        let mut entries = BTreeMap::new();
        let fields = [
            (Attribute::Region, &self.region),
            (Attribute::ApplicationName, &self.application_name),
            (Attribute::EnvironmentName, &self.environment_name),
            (Attribute::DevToolsEndpoint, &self.dev_tools_endpoint),
        ];
        for (attribute, value) in fields {
            if let (Some(key), Some(value)) = (attribute.keys().settings_key, value) {
                entries.insert(key.to_string(), value.clone());
            }
        }
        entries
    }
}

/// 호출당 한 번 만들어지는 설정 해석기. 전역 상태는 없다.
pub struct ConfigResolver {
    root: PathBuf,
    home: Option<PathBuf>,
    credential_env: Option<String>,
    git: Box<dyn SourceControl>,
    settings: OnceCell<Ini>,
    credentials: OnceCell<Option<Ini>>,
}

impl ConfigResolver {
    pub fn new(root: impl Into<PathBuf>, git: Box<dyn SourceControl>) -> Self {
        Self::with_env(
            root,
            dirs::home_dir(),
            env::var(CREDENTIAL_FILE_ENV).ok(),
            git,
        )
    }

    /// 환경을 명시적으로 주입하는 생성자. 테스트에서도 쓴다.
    pub fn with_env(
        root: impl Into<PathBuf>,
        home: Option<PathBuf>,
        credential_env: Option<String>,
        git: Box<dyn SourceControl>,
    ) -> Self {
        Self {
            root: root.into(),
            home,
            credential_env,
            git,
            settings: OnceCell::new(),
            credentials: OnceCell::new(),
        }
    }

    pub fn source_control(&self) -> &dyn SourceControl {
        self.git.as_ref()
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_DIR).join(SETTINGS_FILE)
    }

    pub fn region(&self) -> Result<Option<String>> {
        self.get(Attribute::Region)
    }

    pub fn application_name(&self) -> Result<Option<String>> {
        self.get(Attribute::ApplicationName)
    }

    pub fn environment_name(&self) -> Result<Option<String>> {
        self.get(Attribute::EnvironmentName)
    }

    pub fn dev_tools_endpoint(&self) -> Result<Option<String>> {
        self.get(Attribute::DevToolsEndpoint)
    }

    pub fn access_key_id(&self) -> Result<Option<String>> {
        self.get(Attribute::AccessKeyId)
    }

    pub fn secret_access_key(&self) -> Result<Option<String>> {
        self.get(Attribute::SecretAccessKey)
    }

    /// 속성 하나를 해석 순서에 따라 찾는다.
    pub fn get(&self, attribute: Attribute) -> Result<Option<String>> {
        match attribute {
            Attribute::DevToolsEndpoint => self.resolve_endpoint(),
            Attribute::AccessKeyId => {
                self.credential(ACCESS_KEY_SETTING, attribute.keys().git_key)
            }
            Attribute::SecretAccessKey => {
                self.credential(SECRET_KEY_SETTING, attribute.keys().git_key)
            }
            _ => {
                let keys = attribute.keys();
                if let Some(key) = keys.settings_key
                    && let Some(value) = self.settings_map()?.get(key)
                {
                    return Ok(Some(value.clone()));
                }
                self.git_fallback(keys.git_key)
            }
        }
    }

    /// 브랜치 → 환경 매핑. 파일이 없거나 읽을 수 없으면 빈 맵.
    pub fn branch_mappings(&self) -> Result<BTreeMap<String, String>> {
        Ok(self.settings_doc()?.settings(BRANCHES_SECTION))
    }

    /// 엔드포인트 특례: 저장소 로컬 파일에 리전이 있으면 명시적
    /// 엔드포인트 → 알려진 리전의 기본값 순으로 시도하고, 그래도 없으면
    /// git 폴백으로 내려간다.
    fn resolve_endpoint(&self) -> Result<Option<String>> {
        let settings = self.settings_map()?;
        if let Some(region) = settings.get("Region") {
            if let Some(endpoint) = settings.get("DevToolsEndpoint") {
                return Ok(Some(endpoint.clone()));
            }
            if let Some(endpoint) = default_endpoint(region) {
                return Ok(Some(endpoint));
            }
            debug!(%region, "region has no default endpoint, trying git config");
        }
        self.git_fallback(Attribute::DevToolsEndpoint.keys().git_key)
    }

    /// 자격 증명 체인: credential 파일(존재할 때만) → git 폴백.
    fn credential(&self, key: &str, git_key: &str) -> Result<Option<String>> {
        if let Some(doc) = self.credential_doc()?
            && let Some(value) = doc.settings(GLOBAL_SECTION).get(key)
        {
            return Ok(Some(value.clone()));
        }
        self.git_fallback(git_key)
    }

    fn git_fallback(&self, key: &str) -> Result<Option<String>> {
        debug!(key, "falling back to git config");
        self.git.config_value(key)
    }

    fn settings_map(&self) -> Result<BTreeMap<String, String>> {
        Ok(self.settings_doc()?.settings(GLOBAL_SECTION))
    }

    fn settings_doc(&self) -> Result<&Ini> {
        if let Some(doc) = self.settings.get() {
            return Ok(doc);
        }
        let doc = load_or_empty(&self.settings_path(), true)?;
        Ok(self.settings.get_or_init(|| doc))
    }

    fn credential_doc(&self) -> Result<Option<&Ini>> {
        if let Some(doc) = self.credentials.get() {
            return Ok(doc.as_ref());
        }
        let loaded = match self.credential_file_path()? {
            Some(path) if path.exists() => Some(load_or_empty(&path, false)?),
            _ => None,
        };
        Ok(self.credentials.get_or_init(|| loaded).as_ref())
    }

    /// credential 파일 경로: 환경변수 → 저장소 설정 → 홈 기본 경로.
    pub fn credential_file_path(&self) -> Result<Option<PathBuf>> {
        if let Some(path) = &self.credential_env {
            return Ok(Some(PathBuf::from(path)));
        }
        if let Some(path) = self.settings_map()?.get(CREDENTIAL_PATH_KEY) {
            return Ok(Some(PathBuf::from(path)));
        }
        Ok(self.default_credential_file_path())
    }

    fn default_credential_file_path(&self) -> Option<PathBuf> {
        self.home
            .as_ref()
            .map(|home| home.join(SETTINGS_DIR).join(CREDENTIAL_FILE))
    }

    /// 설정을 기록한다. 저장소 로컬 값은 항상 쓰고, 자격 증명은 아직
    /// 어떤 credential 파일도 구성되어 있지 않을 때만 기본 경로에 새로
    /// 만든 뒤 그 경로를 저장소 설정에 남긴다.
    pub fn write_settings(&mut self, update: &SettingsUpdate) -> Result<()> {
        let entries = update.settings_entries();
        if !entries.is_empty() {
            self.write_repo_settings(entries)?;
        }

        if update.access_key_id.is_some() || update.secret_access_key.is_some() {
            match self.writable_credential_path()? {
                Some(path) => self.write_credential_file(&path, update)?,
                None => {
                    warn!("a credential file is already configured; leaving credentials untouched")
                }
            }
        }
        Ok(())
    }

    fn write_repo_settings(&mut self, updates: BTreeMap<String, String>) -> Result<()> {
        let path = self.settings_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let mut doc = match self.settings.take() {
            Some(doc) => doc,
            None => load_or_empty(&path, true)?,
        };
        doc.write_settings(GLOBAL_SECTION, &updates)
            .with_context(|| format!("failed to write settings to {}", path.display()))?;
        let _ = self.settings.set(doc);
        Ok(())
    }

    /// 자격 증명을 새 파일로 기록해도 되는 경우에만 그 경로를 돌려준다:
    /// 환경변수와 저장소 설정 모두 비어 있고, 기본 경로에 파일이 없어야 한다.
    fn writable_credential_path(&self) -> Result<Option<PathBuf>> {
        if self.credential_env.is_some() {
            return Ok(None);
        }
        if self.settings_map()?.contains_key(CREDENTIAL_PATH_KEY) {
            return Ok(None);
        }
        match self.default_credential_file_path() {
            Some(path) if !path.exists() => Ok(Some(path)),
            _ => Ok(None),
        }
    }

    fn write_credential_file(&mut self, path: &Path, update: &SettingsUpdate) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }

        let updates = BTreeMap::from([
            (
                ACCESS_KEY_SETTING.to_string(),
                update.access_key_id.clone().unwrap_or_default(),
            ),
            (
                SECRET_KEY_SETTING.to_string(),
                update.secret_access_key.clone().unwrap_or_default(),
            ),
        ]);
        let mut doc = Ini::empty(path, false);
        doc.write_settings(GLOBAL_SECTION, &updates)
            .with_context(|| format!("failed to write credentials to {}", path.display()))?;
        self.credentials.take();

        // 이후의 읽기가 명시적이 되도록 선택한 경로를 저장소 설정에 남긴다.
        let record = BTreeMap::from([(
            CREDENTIAL_PATH_KEY.to_string(),
            path.display().to_string(),
        )]);
        self.write_repo_settings(record)
    }
}

fn default_endpoint(region: &str) -> Option<String> {
    KNOWN_REGIONS
        .contains(&region)
        .then(|| format!("git.elasticbeanstalk.{region}.amazonaws.com"))
}

/// 없는 파일과 권한 오류는 빈 문서로 복구하고, 그 밖의 I/O 오류는 전파한다.
fn load_or_empty(path: &Path, default_header: bool) -> Result<Ini> {
    match Ini::load(path, default_header) {
        Ok(doc) => Ok(doc),
        Err(err)
            if matches!(
                err.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
            ) =>
        {
            debug!(path = %path.display(), "settings file unavailable, treating as empty");
            Ok(Ini::empty(path, default_header))
        }
        Err(err) => {
            Err(err).with_context(|| format!("failed to read {}", path.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Default)]
    struct StubGit {
        config: BTreeMap<String, String>,
    }

    impl StubGit {
        fn with(pairs: &[(&str, &str)]) -> Self {
            Self {
                config: pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            }
        }
    }

    impl SourceControl for StubGit {
        fn rev_parse(&self, _reference: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn object_type(&self, _reference: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn config_value(&self, key: &str) -> Result<Option<String>> {
            Ok(self.config.get(key).cloned())
        }

        fn current_branch(&self) -> Result<Option<String>> {
            Ok(None)
        }
    }

    fn write_settings_file(root: &Path, contents: &str) {
        let dir = root.join(SETTINGS_DIR);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(SETTINGS_FILE), contents).unwrap();
    }

    fn resolver(root: &Path, home: Option<&Path>, git: StubGit) -> ConfigResolver {
        ConfigResolver::with_env(
            root,
            home.map(Path::to_path_buf),
            None,
            Box::new(git),
        )
    }

    #[test]
    fn repo_settings_take_precedence_over_git_config() {
        let dir = TempDir::new().unwrap();
        write_settings_file(dir.path(), "[global]\nRegion=us-west-2\n");
        let config = resolver(
            dir.path(),
            None,
            StubGit::with(&[("aws.region", "eu-west-1")]),
        );

        assert_eq!(config.region().unwrap().as_deref(), Some("us-west-2"));
    }

    #[test]
    fn git_config_is_used_when_the_settings_file_is_missing() {
        let dir = TempDir::new().unwrap();
        let config = resolver(
            dir.path(),
            None,
            StubGit::with(&[("aws.elasticbeanstalk.application", "myapp")]),
        );

        assert_eq!(
            config.application_name().unwrap().as_deref(),
            Some("myapp")
        );
        assert_eq!(config.region().unwrap(), None);
    }

    #[test]
    fn known_region_synthesizes_the_default_endpoint() {
        let dir = TempDir::new().unwrap();
        write_settings_file(dir.path(), "[global]\nRegion=us-east-1\n");
        let config = resolver(
            dir.path(),
            None,
            StubGit::with(&[("aws.elasticbeanstalk.host", "ignored.example.com")]),
        );

        assert_eq!(
            config.dev_tools_endpoint().unwrap().as_deref(),
            Some("git.elasticbeanstalk.us-east-1.amazonaws.com")
        );
    }

    #[test]
    fn explicit_endpoint_wins_over_the_default() {
        let dir = TempDir::new().unwrap();
        write_settings_file(
            dir.path(),
            "[global]\nRegion=us-east-1\nDevToolsEndpoint=git.example.com:8443\n",
        );
        let config = resolver(dir.path(), None, StubGit::default());

        assert_eq!(
            config.dev_tools_endpoint().unwrap().as_deref(),
            Some("git.example.com:8443")
        );
    }

    #[test]
    fn unknown_region_falls_through_to_git_config() {
        let dir = TempDir::new().unwrap();
        write_settings_file(dir.path(), "[global]\nRegion=unknown-region-9\n");

        let config = resolver(
            dir.path(),
            None,
            StubGit::with(&[("aws.elasticbeanstalk.host", "git.fallback.example.com")]),
        );
        assert_eq!(
            config.dev_tools_endpoint().unwrap().as_deref(),
            Some("git.fallback.example.com")
        );

        let config = resolver(dir.path(), None, StubGit::default());
        assert_eq!(config.dev_tools_endpoint().unwrap(), None);
    }

    #[test]
    fn branch_mappings_come_from_the_branches_section() {
        let dir = TempDir::new().unwrap();
        write_settings_file(
            dir.path(),
            "[global]\nRegion=us-east-1\n[branches]\nmaster=production\ndev=staging\n",
        );
        let config = resolver(dir.path(), None, StubGit::default());

        let mappings = config.branch_mappings().unwrap();
        assert_eq!(mappings.get("master").map(String::as_str), Some("production"));
        assert_eq!(mappings.get("dev").map(String::as_str), Some("staging"));
    }

    #[test]
    fn branch_mappings_are_empty_without_a_settings_file() {
        let dir = TempDir::new().unwrap();
        let config = resolver(dir.path(), None, StubGit::default());
        assert!(config.branch_mappings().unwrap().is_empty());
    }

    #[test]
    fn credentials_come_from_the_credential_file_at_the_default_path() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        let cred_dir = home.join(SETTINGS_DIR);
        fs::create_dir_all(&cred_dir).unwrap();
        fs::write(
            cred_dir.join(CREDENTIAL_FILE),
            "AWSAccessKeyId=AKIAFILE\nAWSSecretKey=filesecret\n",
        )
        .unwrap();

        let config = resolver(
            dir.path(),
            Some(&home),
            StubGit::with(&[("aws.accesskey", "AKIAGIT")]),
        );

        assert_eq!(config.access_key_id().unwrap().as_deref(), Some("AKIAFILE"));
        assert_eq!(
            config.secret_access_key().unwrap().as_deref(),
            Some("filesecret")
        );
    }

    #[test]
    fn credential_env_var_overrides_the_default_path() {
        let dir = TempDir::new().unwrap();
        let override_path = dir.path().join("custom_credentials");
        fs::write(&override_path, "AWSAccessKeyId=AKIACUSTOM\n").unwrap();

        let config = ConfigResolver::with_env(
            dir.path(),
            None,
            Some(override_path.display().to_string()),
            Box::new(StubGit::default()),
        );

        assert_eq!(
            config.access_key_id().unwrap().as_deref(),
            Some("AKIACUSTOM")
        );
    }

    #[test]
    fn credentials_fall_back_to_git_config_without_a_file() {
        let dir = TempDir::new().unwrap();
        let config = resolver(
            dir.path(),
            None,
            StubGit::with(&[("aws.secretkey", "gitsecret")]),
        );

        assert_eq!(
            config.secret_access_key().unwrap().as_deref(),
            Some("gitsecret")
        );
    }

    #[test]
    fn write_settings_creates_the_settings_file() {
        let dir = TempDir::new().unwrap();
        let mut config = resolver(dir.path(), None, StubGit::default());

        let update = SettingsUpdate {
            region: Some("us-east-1".to_string()),
            application_name: Some("myapp".to_string()),
            ..SettingsUpdate::default()
        };
        config.write_settings(&update).unwrap();

        let written = fs::read_to_string(config.settings_path()).unwrap();
        assert_eq!(written, "[global]\nApplicationName=myapp\nRegion=us-east-1\n");
        assert_eq!(config.region().unwrap().as_deref(), Some("us-east-1"));

        // 같은 갱신을 반복해도 파일은 그대로다.
        config.write_settings(&update).unwrap();
        assert_eq!(fs::read_to_string(config.settings_path()).unwrap(), written);
    }

    #[test]
    fn writing_credentials_creates_the_default_file_and_records_its_path() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        fs::create_dir_all(&home).unwrap();
        let mut config = resolver(dir.path(), Some(&home), StubGit::default());

        let update = SettingsUpdate {
            access_key_id: Some("AKIANEW".to_string()),
            secret_access_key: Some("newsecret".to_string()),
            ..SettingsUpdate::default()
        };
        config.write_settings(&update).unwrap();

        let cred_path = home.join(SETTINGS_DIR).join(CREDENTIAL_FILE);
        assert_eq!(
            fs::read_to_string(&cred_path).unwrap(),
            "AWSAccessKeyId=AKIANEW\nAWSSecretKey=newsecret\n"
        );
        let repo_settings = fs::read_to_string(config.settings_path()).unwrap();
        assert!(repo_settings.contains(&format!(
            "AwsCredentialFile={}\n",
            cred_path.display()
        )));
        assert_eq!(config.access_key_id().unwrap().as_deref(), Some("AKIANEW"));
    }

    #[test]
    fn credentials_are_not_written_when_a_file_is_already_configured() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        fs::create_dir_all(&home).unwrap();
        let mut config = ConfigResolver::with_env(
            dir.path(),
            Some(home.clone()),
            Some("/elsewhere/credentials".to_string()),
            Box::new(StubGit::default()),
        );

        let update = SettingsUpdate {
            access_key_id: Some("AKIANEW".to_string()),
            secret_access_key: Some("newsecret".to_string()),
            ..SettingsUpdate::default()
        };
        config.write_settings(&update).unwrap();

        assert!(!home.join(SETTINGS_DIR).join(CREDENTIAL_FILE).exists());
        assert!(!config.settings_path().exists());
    }

    #[test]
    fn credentials_are_not_written_when_the_default_file_exists() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        let cred_dir = home.join(SETTINGS_DIR);
        fs::create_dir_all(&cred_dir).unwrap();
        let cred_path = cred_dir.join(CREDENTIAL_FILE);
        fs::write(&cred_path, "AWSAccessKeyId=AKIAOLD\n").unwrap();

        let mut config = resolver(dir.path(), Some(&home), StubGit::default());
        let update = SettingsUpdate {
            access_key_id: Some("AKIANEW".to_string()),
            ..SettingsUpdate::default()
        };
        config.write_settings(&update).unwrap();

        assert_eq!(
            fs::read_to_string(&cred_path).unwrap(),
            "AWSAccessKeyId=AKIAOLD\n"
        );
    }
}
