use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Email addresses accepted at signup.
pub static EMAIL_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is a valid regex")
});

/// Key used for errors that belong to the form as a whole rather than a field.
pub const GENERIC_ERROR_KEY: &str = "generic";

/// FormErrors
///
/// Field name to the ordered list of messages recorded against it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormErrors(HashMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    /// First message for `field`, the one shown next to the input.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// Every message for `field`, in the order the rules fired.
    pub fn all(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Form
///
/// Submitted field values plus the errors accumulated by the validation
/// rules. Rules never short-circuit one another: each one records its own
/// message, and all but `required` skip empty values so a blank field is only
/// reported once.
#[derive(Debug, Clone, Default)]
pub struct Form {
    values: HashMap<String, Vec<String>>,
    pub errors: FormErrors,
}

impl Form {
    pub fn new<I, K, V>(data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut values: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in data {
            values.entry(key.into()).or_default().push(value.into());
        }
        Self {
            values,
            errors: FormErrors::default(),
        }
    }

    /// First submitted value for `field`, or `""` when absent.
    pub fn get(&self, field: &str) -> &str {
        self.values
            .get(field)
            .and_then(|values| values.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn required(&mut self, fields: &[&str]) {
        for field in fields {
            if self.get(field).trim().is_empty() {
                self.errors.add(field, "This field cannot be blank");
            }
        }
    }

    pub fn max_length(&mut self, field: &str, max: usize) {
        let value = self.get(field);
        if value.is_empty() {
            return;
        }
        if value.chars().count() > max {
            self.errors.add(
                field,
                format!("This field is too long (maximum is {max} characters)"),
            );
        }
    }

    pub fn min_length(&mut self, field: &str, min: usize) {
        let value = self.get(field);
        if value.is_empty() {
            return;
        }
        if value.chars().count() < min {
            self.errors.add(
                field,
                format!("This field is too short (minimum is {min} characters)"),
            );
        }
    }

    pub fn permitted_values(&mut self, field: &str, options: &[&str]) {
        let value = self.get(field);
        if value.is_empty() || options.contains(&value) {
            return;
        }
        self.errors.add(field, "This field is invalid");
    }

    pub fn matches_pattern(&mut self, field: &str, pattern: &Regex) {
        let value = self.get(field);
        if value.is_empty() || pattern.is_match(value) {
            return;
        }
        self.errors.add(field, "This field is invalid");
    }

    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }
}
