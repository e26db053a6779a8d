//! 진입 룰과 평가.
//!
//! 룰 형식: `{"field": "rsi", "op": "lt", "value": 35}`

use chronos_core::SignalRow;
use serde::{Deserialize, Serialize};

/// 비교 연산자. 알 수 없는 문자열은 `Unknown`으로 보존되어 항상 불통과합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleOp {
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
    Unknown(String),
}

impl From<String> for RuleOp {
    fn from(op: String) -> Self {
        match op.as_str() {
            "lt" => RuleOp::Lt,
            "lte" => RuleOp::Lte,
            "gt" => RuleOp::Gt,
            "gte" => RuleOp::Gte,
            "eq" => RuleOp::Eq,
            _ => RuleOp::Unknown(op),
        }
    }
}

impl From<RuleOp> for String {
    fn from(op: RuleOp) -> Self {
        match op {
            RuleOp::Lt => "lt".to_string(),
            RuleOp::Lte => "lte".to_string(),
            RuleOp::Gt => "gt".to_string(),
            RuleOp::Gte => "gte".to_string(),
            RuleOp::Eq => "eq".to_string(),
            RuleOp::Unknown(op) => op,
        }
    }
}

impl RuleOp {
    pub fn apply(&self, actual: f64, expected: f64) -> bool {
        match self {
            RuleOp::Lt => actual < expected,
            RuleOp::Lte => actual <= expected,
            RuleOp::Gt => actual > expected,
            RuleOp::Gte => actual >= expected,
            RuleOp::Eq => actual == expected,
            RuleOp::Unknown(_) => false,
        }
    }
}

/// 시그널 필드 하나에 대한 비교 조건.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRule {
    pub field: String,
    pub op: RuleOp,
    pub value: f64,
}

impl EntryRule {
    pub fn new(field: impl Into<String>, op: RuleOp, value: f64) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    /// 필드 값이 없으면(null 포함) 불통과.
    pub fn passes(&self, signal: &SignalRow) -> bool {
        match signal.field(&self.field) {
            Some(actual) => self.op.apply(actual, self.value),
            None => false,
        }
    }
}

/// 모든 룰이 통과해야 true. 룰이 없으면 true.
pub fn evaluate_rules(rules: &[EntryRule], signal: &SignalRow) -> bool {
    rules.iter().all(|rule| rule.passes(signal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn signal(rsi: Option<f64>) -> SignalRow {
        SignalRow {
            rsi,
            ema_20: Some(105.0),
            ema_50: Some(100.0),
            ..SignalRow::empty(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
        }
    }

    #[test]
    fn test_operators() {
        let s = signal(Some(30.0));
        assert!(EntryRule::new("rsi", RuleOp::Lt, 35.0).passes(&s));
        assert!(!EntryRule::new("rsi", RuleOp::Lt, 30.0).passes(&s));
        assert!(EntryRule::new("rsi", RuleOp::Lte, 30.0).passes(&s));
        assert!(EntryRule::new("rsi", RuleOp::Gt, 29.9).passes(&s));
        assert!(EntryRule::new("rsi", RuleOp::Gte, 30.0).passes(&s));
        assert!(EntryRule::new("rsi", RuleOp::Eq, 30.0).passes(&s));
    }

    #[test]
    fn test_missing_field_fails() {
        assert!(!EntryRule::new("rsi", RuleOp::Lt, 100.0).passes(&signal(None)));
        assert!(!EntryRule::new("volume", RuleOp::Gt, 0.0).passes(&signal(Some(1.0))));
    }

    #[test]
    fn test_unknown_op_round_trips_and_fails() {
        let rule: EntryRule =
            serde_json::from_value(serde_json::json!({"field": "rsi", "op": "between", "value": 1}))
                .unwrap();
        assert_eq!(rule.op, RuleOp::Unknown("between".into()));
        assert!(!rule.passes(&signal(Some(1.0))));
        assert_eq!(serde_json::to_value(&rule).unwrap()["op"], "between");
    }

    #[test]
    fn test_empty_rules_pass() {
        assert!(evaluate_rules(&[], &signal(None)));
    }

    fn op_strategy() -> impl Strategy<Value = RuleOp> {
        prop_oneof![
            Just(RuleOp::Lt),
            Just(RuleOp::Lte),
            Just(RuleOp::Gt),
            Just(RuleOp::Gte),
            Just(RuleOp::Eq),
            "[a-z]{1,8}".prop_map(RuleOp::from),
        ]
    }

    proptest! {
        #[test]
        fn prop_fail_closed(
            ops in prop::collection::vec(op_strategy(), 1..6),
            value in -1000.0f64..1000.0,
            rsi in prop::option::of(-1000.0f64..1000.0),
        ) {
            let s = signal(rsi);
            let rules: Vec<EntryRule> =
                ops.iter().cloned().map(|op| EntryRule::new("rsi", op, value)).collect();

            let passed = evaluate_rules(&rules, &s);

            // 값이 없거나 알 수 없는 연산자가 하나라도 있으면 절대 통과하지 않음
            if rsi.is_none() || ops.iter().any(|op| matches!(op, RuleOp::Unknown(_))) {
                prop_assert!(!passed);
            }
            // 통과했다면 모든 룰이 개별적으로 참
            if passed {
                let actual = rsi.unwrap();
                prop_assert!(ops.iter().all(|op| op.apply(actual, value)));
            }
        }
    }
}
