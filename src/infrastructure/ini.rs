//! 관대한(lenient) INI 저장소.
//!
//! 형식에 맞지 않는 줄도 그대로 보존하며, 설정을 다시 쓸 때 이해하지 못한
//! 줄은 건드리지 않는다. 예를 들어:
//!
//! ```text
//! [mysection]
//! I don't conform to your expectations!
//! aKey=aValue
//! ```
//!
//! 위 파일에 `anotherKey=anotherValue`를 쓰면 기존 줄은 그대로 남고
//! 새 줄만 섹션 끝에 추가된다.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// 이름 붙은 섹션. 원본 파일의 줄을 그대로 보관한다.
#[derive(Debug, Clone)]
pub struct Section {
    name: String,
    lines: Vec<String>,
}

impl Section {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// `key=value` 형태의 줄만 골라 키/값 맵을 만든다.
    ///
    /// `=`가 없는 줄, 키나 값이 비어 있는 줄은 건너뛴다.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for line in &self.lines {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                continue;
            }
            map.insert(key.to_string(), value.to_string());
        }
        map
    }

    /// 갱신 대상 키의 기존 줄을 제거하고 키 오름차순으로 새 줄을 덧붙인다.
    ///
    /// 같은 갱신을 반복해도 결과가 변하지 않는다(교체, 중복 추가 아님).
    fn apply_updates(&mut self, updates: &BTreeMap<String, String>) {
        self.lines.retain(|line| match line.split_once('=') {
            Some((key, _)) if !key.is_empty() => !updates.contains_key(key.trim()),
            _ => true,
        });
        for (key, value) in updates {
            self.lines.push(format!("{key}={value}\n"));
        }
    }
}

/// 섹션 순서를 보존하는 INI 문서.
#[derive(Debug, Clone)]
pub struct Ini {
    path: PathBuf,
    default_header: bool,
    sections: Vec<Section>,
}

impl Ini {
    /// 파일을 줄 단위로 파싱한다. 파일이 없거나 읽을 수 없으면
    /// `io::Error`를 그대로 돌려주며, 복구는 호출자(설정 해석기)의 몫이다.
    pub fn load(path: impl Into<PathBuf>, default_header: bool) -> io::Result<Self> {
        let path = path.into();
        let raw = fs::read_to_string(&path)?;
        Ok(Self {
            sections: parse_sections(&raw, default_header),
            path,
            default_header,
        })
    }

    /// 섹션이 하나도 없는 문서를 만든다.
    pub fn empty(path: impl Into<PathBuf>, default_header: bool) -> Self {
        Self {
            path: path.into(),
            default_header,
            sections: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.name == name)
    }

    /// 섹션의 키/값 맵. 섹션이 없으면 빈 맵.
    pub fn settings(&self, name: &str) -> BTreeMap<String, String> {
        self.section(name)
            .map(Section::to_map)
            .unwrap_or_default()
    }

    /// 이름으로 섹션을 찾고, 없으면 새로 만들어 끝에 붙인다.
    ///
    /// 새 섹션은 합성 헤더 줄로 시작한다. 단 `global` 섹션은
    /// `default_header`가 꺼져 있으면 헤더 없이 만든다.
    pub fn section_mut(&mut self, name: &str) -> &mut Section {
        if let Some(idx) = self.sections.iter().position(|section| section.name == name) {
            return &mut self.sections[idx];
        }

        let mut lines = Vec::new();
        if !(name == GLOBAL_SECTION && !self.default_header) {
            lines.push(format!("[{name}]\n"));
        }
        self.sections.push(Section {
            name: name.to_string(),
            lines,
        });
        let last = self.sections.len() - 1;
        &mut self.sections[last]
    }

    /// 대상 섹션에 갱신을 적용한 뒤 파일 전체를 다시 쓴다.
    ///
    /// 건드리지 않은 섹션과 줄은 바이트 단위로 동일하게 남는다
    /// (줄 끝 개행만 한 개로 정규화된다).
    pub fn write_settings(
        &mut self,
        section: &str,
        updates: &BTreeMap<String, String>,
    ) -> io::Result<()> {
        self.section_mut(section).apply_updates(updates);
        self.save()
    }

    fn save(&self) -> io::Result<()> {
        let mut out = String::new();
        for section in &self.sections {
            for line in &section.lines {
                out.push_str(line.trim_end_matches(['\r', '\n']));
                out.push('\n');
            }
        }
        fs::write(&self.path, out)
    }
}

pub const GLOBAL_SECTION: &str = "global";

/// `[name]` 헤더 줄이면 섹션 이름을 돌려준다. 뒤쪽 공백은 허용한다.
fn header_name(line: &str) -> Option<&str> {
    let rest = line.trim_end().strip_prefix('[')?;
    let (name, tail) = rest.split_once(']')?;
    tail.is_empty().then_some(name)
}

fn parse_sections(raw: &str, default_header: bool) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut pending_name: Option<String> = None;
    let mut pending_lines: Vec<String> = Vec::new();

    for line in raw.split_inclusive('\n') {
        if let Some(name) = header_name(line) {
            flush(&mut sections, pending_name.take(), std::mem::take(&mut pending_lines), default_header);
            pending_name = Some(name.to_string());
            pending_lines.push(line.to_string());
        } else {
            pending_lines.push(line.to_string());
        }
    }
    flush(&mut sections, pending_name, pending_lines, default_header);

    sections
}

/// 모은 줄들을 섹션으로 확정한다. 첫 헤더 앞의 내용은 암시적
/// `global` 섹션이 되며, `default_header`가 켜져 있으면 합성 헤더를 얹는다.
fn flush(
    sections: &mut Vec<Section>,
    name: Option<String>,
    mut lines: Vec<String>,
    default_header: bool,
) {
    if lines.is_empty() {
        return;
    }
    if name.is_none() && default_header {
        lines.insert(0, format!("[{GLOBAL_SECTION}]\n"));
    }
    sections.push(Section {
        name: name.unwrap_or_else(|| GLOBAL_SECTION.to_string()),
        lines,
    });
}
