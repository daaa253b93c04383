//! Request validation against an entity's field rules. All failing fields are
//! reported together so forms can show per-field messages.

use crate::catalog::{EntityDef, FieldKind, FieldRule};
use crate::error::{AppError, FieldErrors};
use serde_json::Value;
use std::collections::HashMap;

/// Validate a create/update body. Unknown fields are ignored; every rule field
/// must satisfy its rule. Returns `AppError::Validation` with field-level
/// messages on failure.
pub fn validate(def: &EntityDef, body: &HashMap<String, Value>) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    for rule in def.rules {
        let val = body.get(rule.field);
        if let Some(message) = check_field(rule, val) {
            errors.entry(rule.field.to_string()).or_default().push(message);
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

fn check_field(rule: &FieldRule, val: Option<&Value>) -> Option<String> {
    let missing = match val {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    };
    if missing {
        return rule
            .required
            .then(|| format!("{} is required", rule.field));
    }
    let val = val?;
    match rule.kind {
        FieldKind::Text { max_len } => {
            let Value::String(s) = val else {
                return Some(format!("{} must be a string", rule.field));
            };
            if let Some(max) = max_len {
                if s.chars().count() > max {
                    return Some(format!("{} must be at most {} characters", rule.field, max));
                }
            }
            None
        }
        FieldKind::Id => match val {
            Value::Number(n) if n.is_i64() => None,
            // HTML forms post numbers as strings.
            Value::String(s) if s.trim().parse::<i64>().is_ok() => None,
            _ => Some(format!("{} must be a numeric id", rule.field)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AUTHOR, BOOK, LOAN};
    use serde_json::json;

    fn body(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn field_errors(err: AppError) -> FieldErrors {
        match err {
            AppError::Validation(e) => e,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn accepts_a_complete_author() {
        assert!(validate(&AUTHOR, &body(&[("name", json!("Orwell"))])).is_ok());
    }

    #[test]
    fn missing_and_empty_required_fields_fail() {
        let errors = field_errors(validate(&AUTHOR, &body(&[])).unwrap_err());
        assert_eq!(errors["name"], vec!["name is required"]);

        let errors = field_errors(validate(&AUTHOR, &body(&[("name", json!("  "))])).unwrap_err());
        assert_eq!(errors["name"], vec!["name is required"]);
    }

    #[test]
    fn overlong_text_fails_the_length_bound() {
        let long = "x".repeat(256);
        let errors = field_errors(validate(&AUTHOR, &body(&[("name", json!(long))])).unwrap_err());
        assert_eq!(errors["name"], vec!["name must be at most 255 characters"]);
    }

    #[test]
    fn id_fields_accept_integers_and_numeric_strings() {
        let ok = body(&[("book_id", json!(3)), ("person_id", json!("12"))]);
        assert!(validate(&LOAN, &ok).is_ok());

        let bad = body(&[("book_id", json!("three")), ("person_id", json!(1))]);
        let errors = field_errors(validate(&LOAN, &bad).unwrap_err());
        assert_eq!(errors["book_id"], vec!["book_id must be a numeric id"]);
        assert!(!errors.contains_key("person_id"));
    }

    #[test]
    fn all_failing_fields_are_reported_together() {
        let bad = body(&[("title", json!("1984")), ("author_id", json!("n/a"))]);
        let errors = field_errors(validate(&BOOK, &bad).unwrap_err());
        assert!(errors.contains_key("description"));
        assert!(errors.contains_key("author_id"));
        assert!(errors.contains_key("location_id"));
        assert!(errors.contains_key("category_id"));
        assert!(!errors.contains_key("title"));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let extra = body(&[("name", json!("Orwell")), ("pen_name", json!("Eric Blair"))]);
        assert!(validate(&AUTHOR, &extra).is_ok());
    }
}
