//! 후보 생성 엔진.
//!
//! 템플릿의 진입 룰을 유니버스 각 종목의 최신 시그널 행에 적용하고,
//! 통과한 종목을 `proposed` 후보로 한 번에 저장합니다. 같은 입력으로 다시
//! 실행하면 새 후보가 추가됩니다 (중복 제거 없음).

use std::sync::Arc;

use chronos_core::{CandidateStatus, NewCandidate, SignalRow};
use chronos_data::Store;
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::config::TemplateConfig;
use crate::error::CandidateError;
use crate::rules::evaluate_rules;

/// 엔진이 만든 후보의 `reason_code`.
pub const REASON_TEMPLATE_RULES_PASSED: &str = "template_rules_passed";

/// 저장소 위에서 동작하는 후보 생성기.
#[derive(Clone)]
pub struct CandidateEngine {
    store: Arc<dyn Store>,
}

impl CandidateEngine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// 후보를 생성하고 생성 개수를 반환합니다.
    ///
    /// 유니버스 존재 여부는 호출자가 확인합니다.
    #[instrument(skip(self))]
    pub async fn generate(
        &self,
        universe_id: i64,
        template_id: i64,
        provider: &str,
        interval: &str,
    ) -> Result<usize, CandidateError> {
        let template = self
            .store
            .get_template(template_id)
            .await?
            .ok_or(CandidateError::TemplateNotFound(template_id))?;

        let config = TemplateConfig::parse(&template.config_json)?;
        let applied_rules = template
            .config_json
            .get("entry_rules")
            .cloned()
            .unwrap_or_else(|| serde_json::to_value(&config.entry_rules).unwrap_or_default());

        let members = self.store.list_members(universe_id).await?;
        let mut latest = Vec::with_capacity(members.len());
        for stock in members {
            match self.store.latest_signal(stock.id, provider, interval).await? {
                Some(signal) => latest.push((stock.ticker, signal)),
                None => debug!(ticker = %stock.ticker, "시그널 없음, 건너뜀"),
            }
        }

        let candidates = build_candidates(universe_id, template_id, &config, &applied_rules, &latest);
        if candidates.is_empty() {
            info!(evaluated = latest.len(), "통과한 종목 없음");
            return Ok(0);
        }

        let created = self.store.insert_candidates(&candidates).await?;

        info!(
            evaluated = latest.len(),
            created = created.len(),
            "후보 생성 완료"
        );
        Ok(created.len())
    }
}

/// 최신 시그널 목록에서 후보 입력을 만듭니다 (저장 없음).
pub fn build_candidates(
    universe_id: i64,
    template_id: i64,
    config: &TemplateConfig,
    applied_rules: &serde_json::Value,
    latest: &[(String, SignalRow)],
) -> Vec<NewCandidate> {
    latest
        .iter()
        .filter(|(_, signal)| evaluate_rules(&config.entry_rules, signal))
        .map(|(ticker, signal)| {
            let score = config
                .score_field
                .as_deref()
                .and_then(|field| signal.field(field))
                .unwrap_or(0.0);

            NewCandidate {
                universe_id,
                template_id,
                ticker: ticker.clone(),
                score,
                status: CandidateStatus::Proposed,
                reason_code: Some(REASON_TEMPLATE_RULES_PASSED.to_string()),
                payload_json: json!({
                    "template_id": template_id,
                    "latest_signal": signal,
                    "applied_rules": applied_rules,
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{EntryRule, RuleOp};
    use chrono::NaiveDate;

    fn signal(rsi: Option<f64>) -> SignalRow {
        SignalRow {
            rsi,
            ..SignalRow::empty(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap())
        }
    }

    #[test]
    fn test_build_candidates_scores_and_payload() {
        let config = TemplateConfig {
            entry_rules: vec![EntryRule::new("rsi", RuleOp::Lt, 35.0)],
            score_field: Some("rsi".into()),
        };
        let rules = serde_json::to_value(&config.entry_rules).unwrap();
        let latest = vec![
            ("AAA".to_string(), signal(Some(30.0))),
            ("BBB".to_string(), signal(Some(50.0))),
            ("CCC".to_string(), signal(None)),
        ];

        let out = build_candidates(1, 9, &config, &rules, &latest);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].ticker, "AAA");
        assert_eq!(out[0].score, 30.0);
        assert_eq!(out[0].reason_code.as_deref(), Some("template_rules_passed"));
        assert_eq!(out[0].payload_json["template_id"], 9);
        assert_eq!(out[0].payload_json["latest_signal"]["rsi"], 30.0);
        assert_eq!(out[0].payload_json["applied_rules"][0]["op"], "lt");
    }

    #[test]
    fn test_score_defaults_to_zero() {
        let config = TemplateConfig {
            entry_rules: vec![],
            score_field: Some("macd".into()),
        };
        let out = build_candidates(1, 1, &config, &json!([]), &[("AAA".into(), signal(Some(1.0)))]);
        assert_eq!(out[0].score, 0.0);
    }
}
