//! `validator` derive structs → 422 `MartError` with per-field messages.

use mart_core::MartError;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

fn friendly_message(code: &str) -> Option<&'static str> {
    match code {
        "required" => Some("is required"),
        "email" => Some("must be a valid email"),
        "length" => Some("has invalid length"),
        "range" => Some("is out of range"),
        _ => None,
    }
}

/// `product_location` → `productLocation`, matching the JSON field names.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn join_path(prefix: &str, field: &str) -> String {
    let field = camel_case(field);
    if prefix.is_empty() {
        field
    } else {
        format!("{prefix}.{field}")
    }
}

fn push_field(out: &mut Map<String, Value>, key: &str, msg: String) {
    let entry = out
        .entry(key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(msgs) = entry {
        msgs.push(Value::String(msg));
    }
}

fn collect(out: &mut Map<String, Value>, prefix: &str, errs: &ValidationErrors) {
    for (field, kind) in errs.errors() {
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let key = join_path(prefix, field);
                for e in field_errors {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .or_else(|| friendly_message(&e.code).map(|m| format!("{key} {m}")))
                        .unwrap_or_else(|| e.code.to_string());
                    push_field(out, &key, msg);
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                collect(out, &join_path(prefix, field), nested);
            }
            ValidationErrorsKind::List(items) => {
                let base = join_path(prefix, field);
                for (idx, nested) in items {
                    collect(out, &format!("{base}[{idx}]"), nested);
                }
            }
        }
    }
}

pub fn field_errors(errs: &ValidationErrors) -> Value {
    let mut out = Map::new();
    collect(&mut out, "", errs);
    Value::Object(out)
}

/// Parses `data` as `T` and runs its validators.
pub fn validate<T>(data: &Value, error_message: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned + Validate,
{
    let parsed: T = serde_json::from_value(data.clone()).map_err(|e| {
        MartError::unprocessable(error_message)
            .with_errors(json!({"_schema": [e.to_string()]}))
            .into_anyhow()
    })?;

    parsed.validate().map_err(|e| {
        MartError::unprocessable(error_message)
            .with_errors(field_errors(&e))
            .into_anyhow()
    })?;

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewProduct;

    #[test]
    fn nested_field_errors_use_json_paths() {
        let data = json!({
            "name": "",
            "price": -1,
            "category": {"main": "Machines", "sub": " "},
            "seller": {"name": "X", "contactEmail": "not-an-email"},
            "gallery": [],
        });

        let err = validate::<NewProduct>(&data, "Products schema validation failed").unwrap_err();
        let mart = MartError::find_in(&err).unwrap();
        assert_eq!(mart.code(), 422);

        let errors = mart.errors.clone().unwrap();
        assert_eq!(errors["productLocation"][0], "Please select product location");
        assert_eq!(errors["gallery"][0], "Please upload at least one image");
        assert_eq!(errors["category.sub"][0], "category.sub is required");
        assert_eq!(errors["seller.contactEmail"][0], "seller.contactEmail must be a valid email");
        assert!(errors.get("name").is_some());
        assert!(errors.get("price").is_some());
    }

    #[test]
    fn shape_errors_land_under_schema() {
        let err = validate::<NewProduct>(&json!({"name": 3}), "Products schema validation failed").unwrap_err();
        let mart = MartError::find_in(&err).unwrap();
        assert!(mart.errors.as_ref().unwrap()["_schema"].is_array());
    }
}
