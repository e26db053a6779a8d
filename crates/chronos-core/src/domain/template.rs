//! 전략 템플릿.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 템플릿 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Screen,
    Strategy,
}

impl TemplateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Screen => "screen",
            TemplateKind::Strategy => "strategy",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "screen" => Ok(Self::Screen),
            "strategy" => Ok(Self::Strategy),
            other => Err(format!("Unknown template kind: {}", other)),
        }
    }
}

/// 저장된 템플릿. (kind, name, version)은 고유합니다.
///
/// `config_json`은 `entry_rules`와 선택적 `score_field`를 담습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyTemplate {
    pub id: i64,
    pub kind: TemplateKind,
    pub name: String,
    pub version: i32,
    pub description: Option<String>,
    pub config_json: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// 템플릿 생성 입력.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTemplate {
    pub kind: TemplateKind,
    pub name: String,
    #[serde(default = "default_version")]
    pub version: i32,
    #[serde(default)]
    pub description: Option<String>,
    pub config_json: serde_json::Value,
}

fn default_version() -> i32 {
    1
}
