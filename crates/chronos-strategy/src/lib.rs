//! 템플릿 룰 평가와 후보 생성.
//!
//! 이 크레이트가 제공하는 기능:
//! - 템플릿 설정(`entry_rules`, `score_field`) 파싱과 저장 전 검증
//! - fail-closed 룰 평가 (값 없음, 알 수 없는 연산자 → 불통과)
//! - 유니버스 단위 후보 생성 엔진
//!
//! # 예제
//!
//! ```rust,ignore
//! use chronos_strategy::CandidateEngine;
//!
//! let engine = CandidateEngine::new(store.clone());
//! let created = engine.generate(universe_id, template_id, "yahoo", "1d").await?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod rules;

pub use config::TemplateConfig;
pub use engine::{build_candidates, CandidateEngine, REASON_TEMPLATE_RULES_PASSED};
pub use error::CandidateError;
pub use rules::{evaluate_rules, EntryRule, RuleOp};
