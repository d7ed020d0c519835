//! Utilities for validating constraints on types.

use serde::Deserialize;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// A type that cannot be instatiated without validating the value within.
/// That is, if you have a [`Valid<T>`], `T` is guaranteed to be valid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Valid<T> {
    value: T,
}

impl<T> Valid<T> {
    /// Constructs a new validated value.
    pub fn new(value: T) -> Result<Valid<T>, ValidationErrors>
    where
        T: Validate,
    {
        value.validate().map(|_| Valid { value })
    }

    /// Returns the validated value.
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<'de, T: Deserialize<'de> + Validate> Deserialize<'de> for Valid<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value: T = T::deserialize(deserializer)?;
        Valid::new(value).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}

/// Describes every failed constraint as `path (code,code)`, sorted by path.
///
/// Nested structs are joined with `.` and list elements are indexed,
/// as in `checkoutItems[1].quantity (range)`.
pub fn invalid_fields(errors: &ValidationErrors) -> Vec<String> {
    let mut fields = Vec::new();
    collect_invalid_fields("", errors, &mut fields);
    fields.sort();
    fields
}

fn collect_invalid_fields(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            to_camel_case(field)
        } else {
            format!("{prefix}.{}", to_camel_case(field))
        };
        match kind {
            ValidationErrorsKind::Field(errors) => {
                let codes: Vec<&str> = errors.iter().map(|e| e.code.as_ref()).collect();
                out.push(format!("{path} ({})", codes.join(",")));
            }
            ValidationErrorsKind::Struct(errors) => collect_invalid_fields(&path, errors, out),
            ValidationErrorsKind::List(list) => {
                for (index, errors) in list {
                    collect_invalid_fields(&format!("{path}[{index}]"), errors, out);
                }
            }
        }
    }
}

/// Field names as they appear on the wire.
fn to_camel_case(field: &str) -> String {
    let mut parts = field.split('_');
    let mut name = parts.next().unwrap_or_default().to_string();
    for part in parts {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::inventory::item::{CheckoutLine, CheckoutRequest, NewItem};

    #[test]
    pub fn valid_value_succeeds() {
        let data = r#"
            {
                "barcode": "12345",
                "name": "Sample Item 1",
                "quantity": 10,
                "price": 9.99
            }
        "#;
        let value = serde_json::from_str::<Valid<NewItem>>(data);
        assert!(value.is_ok());
    }

    #[test]
    pub fn invalid_value_fails() {
        let data = r#"
            {
                "barcode": "",
                "name": "Sample Item 1",
                "quantity": 10,
                "price": 9.99
            }
        "#;
        let value = serde_json::from_str::<Valid<NewItem>>(data);
        assert!(value.is_err());
    }

    #[test]
    pub fn invalid_fields_are_listed_by_path() {
        let request = CheckoutRequest {
            checkout_items: vec![
                CheckoutLine {
                    barcode: "A1".to_string(),
                    quantity: 1,
                },
                CheckoutLine {
                    barcode: "B2".to_string(),
                    quantity: -4,
                },
            ],
        };
        let errors = Valid::new(request).unwrap_err();
        assert_eq!(
            vec!["checkoutItems[1].quantity (range)".to_string()],
            invalid_fields(&errors)
        );
    }

    #[test]
    pub fn flat_fields_are_sorted() {
        let item = NewItem {
            barcode: String::new(),
            name: String::new(),
            quantity: 0,
            description: None,
            price: 0.0,
        };
        let errors = Valid::new(item).unwrap_err();
        assert_eq!(
            vec!["barcode (length)".to_string(), "name (length)".to_string()],
            invalid_fields(&errors)
        );
    }
}
