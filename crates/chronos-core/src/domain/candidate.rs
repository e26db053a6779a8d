//! 매매 후보.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 후보 상태. 생성 후 전이는 운영자 결정입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
    #[default]
    Proposed,
    Selected,
    Rejected,
}

impl CandidateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateStatus::Proposed => "proposed",
            CandidateStatus::Selected => "selected",
            CandidateStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CandidateStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "proposed" => Ok(Self::Proposed),
            "selected" => Ok(Self::Selected),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("Unknown candidate status: {}", other)),
        }
    }
}

/// 저장된 후보 행. `as_of`는 생성 시각입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeCandidate {
    pub id: i64,
    pub universe_id: i64,
    pub template_id: i64,
    pub ticker: String,
    pub as_of: DateTime<Utc>,
    pub score: f64,
    pub status: CandidateStatus,
    pub reason_code: Option<String>,
    pub payload_json: serde_json::Value,
}

/// 후보 생성 입력.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCandidate {
    pub universe_id: i64,
    pub template_id: i64,
    pub ticker: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub status: CandidateStatus,
    #[serde(default)]
    pub reason_code: Option<String>,
    #[serde(default)]
    pub payload_json: serde_json::Value,
}

/// 후보 목록 정렬: `as_of` 내림차순, 같으면 `score` 내림차순.
pub fn sort_candidates(candidates: &mut [TradeCandidate]) {
    candidates.sort_by(|a, b| {
        b.as_of
            .cmp(&a.as_of)
            .then_with(|| b.score.total_cmp(&a.score))
    });
}
