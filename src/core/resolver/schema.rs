use serde_json::Value;

/// One accepted shape for a field's value. `DigitString` covers the
/// "string matching `^\d+$`" variant the source schemas use for
/// zone/site ids that travel as strings but must look numeric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    Number,
    StringAny,
    DigitString,
    Boolean,
}

impl FieldType {
    fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Number => value.is_number(),
            FieldType::StringAny => value.is_string(),
            FieldType::DigitString => value
                .as_str()
                .is_some_and(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())),
            FieldType::Boolean => value.is_boolean(),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::StringAny => "string",
            FieldType::DigitString => "string matching ^\\d+$",
            FieldType::Boolean => "boolean",
        }
    }
}

/// A field's accepted type, possibly a union (e.g. `integer|string
/// matching ^\d+$` for legacy zone ids that may arrive as either).
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub required: bool,
    pub accepts: Vec<FieldType>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, required: bool, accepts: Vec<FieldType>) -> Self {
        Self {
            name: name.into(),
            required,
            accepts,
        }
    }

    fn describe_union(&self) -> String {
        self.accepts
            .iter()
            .map(FieldType::describe)
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Per-bidder parameter schema, registered at startup (§4.4). `validate`
/// never panics on malformed input; it returns human-readable violation
/// strings meant for the admin API and startup logs.
#[derive(Debug, Clone, Default)]
pub struct BidderSchema {
    pub fields: Vec<FieldSpec>,
}

impl BidderSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn validate(&self, params: &Value) -> Vec<String> {
        let mut violations = Vec::new();

        let Some(object) = params.as_object() else {
            violations.push("params must be a JSON object".to_string());
            return violations;
        };

        for field in &self.fields {
            match object.get(&field.name) {
                None => {
                    if field.required {
                        violations.push(format!("missing required field `{}`", field.name));
                    }
                }
                Some(value) => {
                    if !field.accepts.iter().any(|t| t.matches(value)) {
                        violations.push(format!(
                            "field `{}` must be {} (got {value})",
                            field.name,
                            field.describe_union()
                        ));
                    }
                }
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rubicon_schema() -> BidderSchema {
        BidderSchema::new(vec![
            FieldSpec::new("accountId", true, vec![FieldType::Integer, FieldType::DigitString]),
            FieldSpec::new("siteId", true, vec![FieldType::Integer, FieldType::DigitString]),
            FieldSpec::new("zoneId", true, vec![FieldType::Integer, FieldType::DigitString]),
        ])
    }

    #[test]
    fn union_accepts_integer_or_digit_string() {
        let schema = rubicon_schema();
        assert!(schema
            .validate(&json!({"accountId": 1001, "siteId": "2002", "zoneId": 3003}))
            .is_empty());
    }

    #[test]
    fn rejects_non_digit_string() {
        let schema = rubicon_schema();
        let violations = schema.validate(&json!({"accountId": "abc", "siteId": 1, "zoneId": 1}));
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn reports_missing_required_field() {
        let schema = rubicon_schema();
        let violations = schema.validate(&json!({"accountId": 1}));
        assert!(violations.iter().any(|v| v.contains("siteId")));
        assert!(violations.iter().any(|v| v.contains("zoneId")));
    }
}
