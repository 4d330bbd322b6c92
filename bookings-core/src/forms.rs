use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use validator::ValidateEmail;

pub const MSG_REQUIRED: &str = "This field cannot be blank";
pub const MSG_INVALID_EMAIL: &str = "Invalid email address";

/// Validation messages per field, in the order they were added.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    /// First message recorded for `field`.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(|msgs| msgs.first()).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Submitted form values plus the errors collected while checking them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Form {
    values: HashMap<String, String>,
    pub errors: FormErrors,
}

impl Form {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self {
            values,
            errors: FormErrors::default(),
        }
    }

    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    fn is_blank(&self, field: &str) -> bool {
        self.get(field).trim().is_empty()
    }

    /// Whether the field was posted with a non-blank value. Records nothing.
    pub fn has(&self, field: &str) -> bool {
        !self.is_blank(field)
    }

    pub fn required(&mut self, fields: &[&str]) -> &mut Self {
        for field in fields {
            if self.is_blank(field) {
                self.errors.add(field, MSG_REQUIRED);
            }
        }
        self
    }

    pub fn min_length(&mut self, field: &str, length: usize) -> &mut Self {
        if self.get(field).trim().chars().count() < length {
            let message = format!("This field must be at least {} characters long", length);
            self.errors.add(field, message);
        }
        self
    }

    pub fn is_email(&mut self, field: &str) -> &mut Self {
        let value = self.get(field).trim().to_string();
        if !value.validate_email() {
            self.errors.add(field, MSG_INVALID_EMAIL);
        }
        self
    }

    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> Form {
        Form::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_empty_form_is_valid() {
        assert!(form(&[]).valid());
    }

    #[test]
    fn test_required_reports_only_missing_fields() {
        let mut f = form(&[("a", "x")]);
        f.required(&["a", "b"]);

        assert!(!f.valid());
        assert_eq!(f.errors.len(), 1);
        assert_eq!(f.errors.get("b"), Some(MSG_REQUIRED));
        assert_eq!(f.errors.get("a"), None);
    }

    #[test]
    fn test_required_treats_whitespace_as_blank() {
        let mut f = form(&[("a", "   ")]);
        f.required(&["a"]);
        assert_eq!(f.errors.get("a"), Some(MSG_REQUIRED));
    }

    #[test]
    fn test_has() {
        let f = form(&[("a", "a"), ("b", "")]);
        assert!(f.has("a"));
        assert!(!f.has("b"));
        assert!(!f.has("whatever"));
        assert!(f.valid());
    }

    #[test]
    fn test_min_length() {
        let mut f = form(&[("name", "ab")]);
        f.min_length("name", 3);
        assert!(!f.valid());
        assert_eq!(
            f.errors.get("name"),
            Some("This field must be at least 3 characters long")
        );

        let mut f = form(&[("name", "abc")]);
        f.min_length("name", 3);
        assert!(f.valid());

        // trimmed before counting
        let mut f = form(&[("name", " ab ")]);
        f.min_length("name", 3);
        assert!(!f.valid());

        let mut f = form(&[]);
        f.min_length("missing", 1);
        assert!(!f.valid());
    }

    #[test]
    fn test_is_email() {
        let mut f = form(&[("email", "me@here.com")]);
        f.is_email("email");
        assert!(f.valid());

        let mut f = form(&[("email", "not-an-email")]);
        f.is_email("email");
        assert_eq!(f.errors.get("email"), Some(MSG_INVALID_EMAIL));

        let mut f = form(&[]);
        f.is_email("email");
        assert!(!f.valid());
    }

    #[test]
    fn test_checks_accumulate_per_field() {
        let mut f = form(&[("first_name", ""), ("email", "x")]);
        f.required(&["first_name", "last_name", "email"])
            .min_length("first_name", 3)
            .is_email("email");

        let fields: Vec<&str> = f.errors.fields().collect();
        assert_eq!(fields, vec!["email", "first_name", "last_name"]);
        // first message wins for display
        assert_eq!(f.errors.get("first_name"), Some(MSG_REQUIRED));
    }
}
