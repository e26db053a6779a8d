//! 템플릿 설정 파싱과 검증.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CandidateError;
use crate::rules::EntryRule;

/// 템플릿 `config_json`의 구조화된 형태.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    #[serde(default)]
    pub entry_rules: Vec<EntryRule>,
    #[serde(default)]
    pub score_field: Option<String>,
}

impl TemplateConfig {
    /// JSON 값을 파싱합니다. JSON 문자열로 감싼 설정도 받습니다.
    ///
    /// 형태가 잘못되면 `InvalidConfig`. 알 수 없는 연산자는 오류가 아니며
    /// 평가 시 불통과로 처리됩니다.
    pub fn parse(value: &Value) -> Result<Self, CandidateError> {
        let value = match value {
            Value::String(raw) => serde_json::from_str::<Value>(raw)
                .map_err(|e| CandidateError::InvalidConfig(e.to_string()))?,
            other => other.clone(),
        };

        if !value.is_object() {
            return Err(CandidateError::InvalidConfig(
                "config must be a JSON object".into(),
            ));
        }

        let config: TemplateConfig = serde_json::from_value(value)
            .map_err(|e| CandidateError::InvalidConfig(e.to_string()))?;

        if let Some(rule) = config.entry_rules.iter().find(|r| r.field.trim().is_empty()) {
            return Err(CandidateError::InvalidConfig(format!(
                "rule field must not be empty: {:?}",
                rule
            )));
        }
        if config.score_field.as_deref().is_some_and(|f| f.trim().is_empty()) {
            return Err(CandidateError::InvalidConfig(
                "score_field must not be empty".into(),
            ));
        }

        Ok(config)
    }

    /// 저장용 정규화 형태 (항상 JSON 객체).
    pub fn normalize(value: &Value) -> Result<Value, CandidateError> {
        match value {
            Value::String(raw) => {
                Self::parse(value)?;
                serde_json::from_str(raw).map_err(|e| CandidateError::InvalidConfig(e.to_string()))
            }
            other => {
                Self::parse(other)?;
                Ok(other.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleOp;
    use serde_json::json;

    #[test]
    fn test_parse_full_config() {
        let config = TemplateConfig::parse(&json!({
            "entry_rules": [
                {"field": "rsi", "op": "lt", "value": 35},
                {"field": "ema_20", "op": "gt", "value": 100.5}
            ],
            "score_field": "rsi"
        }))
        .unwrap();

        assert_eq!(config.entry_rules.len(), 2);
        assert_eq!(config.entry_rules[0].op, RuleOp::Lt);
        assert_eq!(config.entry_rules[0].value, 35.0);
        assert_eq!(config.score_field.as_deref(), Some("rsi"));
    }

    #[test]
    fn test_defaults_when_keys_missing() {
        let config = TemplateConfig::parse(&json!({})).unwrap();
        assert!(config.entry_rules.is_empty());
        assert!(config.score_field.is_none());
    }

    #[test]
    fn test_string_wrapped_config() {
        let raw = json!(r#"{"entry_rules": [{"field": "rsi", "op": "lt", "value": 30}]}"#);
        assert_eq!(TemplateConfig::parse(&raw).unwrap().entry_rules.len(), 1);
        assert!(TemplateConfig::normalize(&raw).unwrap().is_object());
    }

    #[test]
    fn test_malformed_configs_rejected() {
        for bad in [
            json!([1, 2, 3]),
            json!({"entry_rules": "rsi < 30"}),
            json!({"entry_rules": [{"field": "rsi", "op": "lt"}]}),
            json!({"entry_rules": [{"field": "rsi", "op": "lt", "value": "30"}]}),
            json!({"entry_rules": [{"field": " ", "op": "lt", "value": 30}]}),
            json!({"score_field": 7}),
            json!("not json"),
        ] {
            assert!(
                matches!(TemplateConfig::parse(&bad), Err(CandidateError::InvalidConfig(_))),
                "accepted {bad}"
            );
        }
    }
}
