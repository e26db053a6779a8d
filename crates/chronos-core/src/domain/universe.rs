//! 유니버스와 종목.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 추적 대상 종목. `ticker`는 정규화된 고유 값입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: i64,
    pub ticker: String,
    pub name: Option<String>,
}

/// 이름이 붙은 종목 묶음.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 유니버스 생성 입력.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUniverse {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// 유니버스 부분 수정 입력. `None` 필드는 유지됩니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UniverseUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl UniverseUpdate {
    pub fn apply(&self, universe: &mut Universe) {
        if let Some(name) = &self.name {
            universe.name = name.clone();
        }
        if let Some(description) = &self.description {
            universe.description = Some(description.clone());
        }
    }
}
