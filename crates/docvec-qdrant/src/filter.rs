//! Exact-match payload filters.
//!
//! Filters use the JSON shape of Qdrant's REST API, limited to `match`
//! conditions on a single value:
//!
//! ```json
//! {"must": [{"key": "metadata.source", "match": {"value": "wiki"}}]}
//! ```

use docvec_core::DocvecError;
use qdrant_client::qdrant::{Condition, Filter};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PayloadFilter {
    #[serde(default)]
    pub must: Vec<FieldCondition>,
    #[serde(default)]
    pub should: Vec<FieldCondition>,
    #[serde(default)]
    pub must_not: Vec<FieldCondition>,
}

/// `key` is a dot path into the payload, e.g. `metadata.source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldCondition {
    pub key: String,
    #[serde(rename = "match")]
    pub matches: MatchSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchSpec {
    pub value: MatchValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchValue {
    Bool(bool),
    Integer(i64),
    Keyword(String),
}

impl PayloadFilter {
    pub fn parse(expr: &str) -> Result<Self, DocvecError> {
        serde_json::from_str(expr)
            .map_err(|e| DocvecError::Validation(format!("invalid filter {expr:?}: {e}")))
    }

    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty() && self.must_not.is_empty()
    }

    /// Evaluate against a stored payload.
    pub fn matches(&self, payload: &Map<String, Value>) -> bool {
        self.must.iter().all(|c| c.matches(payload))
            && !self.must_not.iter().any(|c| c.matches(payload))
            && (self.should.is_empty() || self.should.iter().any(|c| c.matches(payload)))
    }

    pub(crate) fn to_qdrant(&self) -> Filter {
        let convert = |conds: &[FieldCondition]| -> Vec<Condition> {
            conds.iter().map(FieldCondition::to_qdrant).collect()
        };
        Filter {
            must: convert(&self.must),
            should: convert(&self.should),
            must_not: convert(&self.must_not),
            ..Default::default()
        }
    }
}

impl FieldCondition {
    fn matches(&self, payload: &Map<String, Value>) -> bool {
        let mut parts = self.key.split('.');
        let Some(first) = parts.next() else {
            return false;
        };
        let mut current = payload.get(first);
        for part in parts {
            current = current.and_then(|v| v.get(part));
        }
        match current {
            Some(Value::Array(items)) => items.iter().any(|v| self.matches.value.eq_json(v)),
            Some(v) => self.matches.value.eq_json(v),
            None => false,
        }
    }

    fn to_qdrant(&self) -> Condition {
        match &self.matches.value {
            MatchValue::Bool(b) => Condition::matches(self.key.clone(), *b),
            MatchValue::Integer(i) => Condition::matches(self.key.clone(), *i),
            MatchValue::Keyword(s) => Condition::matches(self.key.clone(), s.clone()),
        }
    }
}

impl MatchValue {
    fn eq_json(&self, value: &Value) -> bool {
        match (self, value) {
            (MatchValue::Bool(a), Value::Bool(b)) => a == b,
            (MatchValue::Integer(a), Value::Number(n)) => n.as_i64() == Some(*a),
            (MatchValue::Keyword(a), Value::String(b)) => a == b,
            _ => false,
        }
    }
}
