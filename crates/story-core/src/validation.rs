//! Client-side form validation.
//!
//! Validators collect every violated rule rather than stopping at the first.
//! Each [`Violation`] maps to a catalog key so callers can localize it.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::locale::{Locale, builtin_message};
use crate::stories::Photo;

/// Largest photo the API accepts.
pub const MAX_PHOTO_BYTES: usize = 1024 * 1024;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MIN_NAME_LEN: usize = 2;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Password,
    Description,
    Photo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    InvalidEmail,
    TooShort,
    PasswordRequirements,
    InvalidImageType,
    TooLarge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    pub field: Field,
    pub rule: Rule,
}

impl Violation {
    fn new(field: Field, rule: Rule) -> Self {
        Self { field, rule }
    }

    /// Catalog key describing this violation.
    pub fn message_key(self) -> &'static str {
        match (self.field, self.rule) {
            (Field::Name, _) => "form-name-too-short",
            (Field::Email, Rule::Required) => "form-email-required",
            (Field::Email, _) => "form-email-invalid",
            (Field::Password, Rule::Required) => "form-password-required",
            (Field::Password, Rule::TooShort) => "form-password-too-short",
            (Field::Password, _) => "form-password-requirements",
            (Field::Description, _) => "form-description-required",
            (Field::Photo, Rule::Required) => "form-photo-required",
            (Field::Photo, Rule::TooLarge) => "form-photo-too-large",
            (Field::Photo, _) => "form-photo-invalid-type",
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = self.message_key();
        f.write_str(builtin_message(Locale::En, key).unwrap_or(key))
    }
}

/// Every rule a form submission broke. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    violations: Vec<Violation>,
}

impl ValidationErrors {
    pub(crate) fn single(field: Field, rule: Rule) -> Self {
        Self {
            violations: vec![Violation::new(field, rule)],
        }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn has(&self, field: Field, rule: Rule) -> bool {
        self.violations.contains(&Violation::new(field, rule))
    }

    /// Messages resolved through `translate` (usually `LocaleStore::get_message`).
    pub fn messages(&self, translate: impl Fn(&str) -> String) -> Vec<String> {
        self.violations
            .iter()
            .map(|violation| translate(violation.message_key()))
            .collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Default)]
struct Collector(Vec<Violation>);

impl Collector {
    fn check(&mut self, ok: bool, field: Field, rule: Rule) {
        if !ok {
            self.0.push(Violation::new(field, rule));
        }
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors { violations: self.0 })
        }
    }
}

/// Live password checklist shown on the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordRequirements {
    pub min_length: bool,
    pub has_letter: bool,
    pub has_number: bool,
}

impl PasswordRequirements {
    pub fn check(password: &str) -> Self {
        Self {
            min_length: password.chars().count() >= MIN_PASSWORD_LEN,
            has_letter: password.chars().any(char::is_alphabetic),
            has_number: password.chars().any(|c| c.is_ascii_digit()),
        }
    }

    pub fn is_satisfied(self) -> bool {
        self.min_length && self.has_letter && self.has_number
    }
}

fn check_email(errors: &mut Collector, email: &str) {
    let email = email.trim();
    if email.is_empty() {
        errors.check(false, Field::Email, Rule::Required);
    } else {
        errors.check(is_valid_email(email), Field::Email, Rule::InvalidEmail);
    }
}

/// # Errors
/// Returns every violated rule.
pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationErrors> {
    let mut errors = Collector::default();
    check_email(&mut errors, email);
    if password.is_empty() {
        errors.check(false, Field::Password, Rule::Required);
    } else {
        errors.check(
            password.chars().count() >= MIN_PASSWORD_LEN,
            Field::Password,
            Rule::TooShort,
        );
    }
    errors.finish()
}

/// # Errors
/// Returns every violated rule.
pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
) -> Result<(), ValidationErrors> {
    let mut errors = Collector::default();
    errors.check(
        name.trim().chars().count() >= MIN_NAME_LEN,
        Field::Name,
        Rule::TooShort,
    );
    check_email(&mut errors, email);
    if password.is_empty() {
        errors.check(false, Field::Password, Rule::Required);
    } else {
        errors.check(
            PasswordRequirements::check(password).is_satisfied(),
            Field::Password,
            Rule::PasswordRequirements,
        );
    }
    errors.finish()
}

/// # Errors
/// Returns every violated rule.
pub fn validate_story(description: &str, photo: Option<&Photo>) -> Result<(), ValidationErrors> {
    let mut errors = Collector::default();
    errors.check(
        !description.trim().is_empty(),
        Field::Description,
        Rule::Required,
    );
    match photo {
        None => errors.check(false, Field::Photo, Rule::Required),
        Some(photo) => {
            errors.check(
                photo.mime_type.starts_with("image/"),
                Field::Photo,
                Rule::InvalidImageType,
            );
            errors.check(
                photo.bytes.len() <= MAX_PHOTO_BYTES,
                Field::Photo,
                Rule::TooLarge,
            );
        }
    }
    errors.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(mime: &str, len: usize) -> Photo {
        Photo {
            file_name: "photo.jpg".to_string(),
            mime_type: mime.to_string(),
            bytes: vec![0; len],
        }
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("ayu@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.co.id"));
        assert!(!is_valid_email("ayu@example"));
        assert!(!is_valid_email("ayu example@x.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_login_collects_all_violations() {
        let errors = validate_login("", "").unwrap_err();
        assert!(errors.has(Field::Email, Rule::Required));
        assert!(errors.has(Field::Password, Rule::Required));
        assert_eq!(errors.violations().len(), 2);

        let errors = validate_login("nope", "short").unwrap_err();
        assert!(errors.has(Field::Email, Rule::InvalidEmail));
        assert!(errors.has(Field::Password, Rule::TooShort));

        assert!(validate_login("ayu@example.com", "password1").is_ok());
    }

    #[test]
    fn test_registration_rules() {
        let errors = validate_registration(" a ", "ayu@example.com", "abcdefgh").unwrap_err();
        assert!(errors.has(Field::Name, Rule::TooShort));
        assert!(errors.has(Field::Password, Rule::PasswordRequirements));

        assert!(validate_registration("Ayu", "ayu@example.com", "abcdefg1").is_ok());
    }

    #[test]
    fn test_password_requirements() {
        let reqs = PasswordRequirements::check("12345678");
        assert!(reqs.min_length);
        assert!(!reqs.has_letter);
        assert!(reqs.has_number);
        assert!(!reqs.is_satisfied());

        assert!(PasswordRequirements::check("rahasia99").is_satisfied());
    }

    #[test]
    fn test_story_form_rules() {
        let errors = validate_story("  ", None).unwrap_err();
        assert!(errors.has(Field::Description, Rule::Required));
        assert!(errors.has(Field::Photo, Rule::Required));

        let oversized = photo("text/plain", MAX_PHOTO_BYTES + 1);
        let errors = validate_story("hi", Some(&oversized)).unwrap_err();
        assert!(errors.has(Field::Photo, Rule::InvalidImageType));
        assert!(errors.has(Field::Photo, Rule::TooLarge));

        assert!(validate_story("hi", Some(&photo("image/png", MAX_PHOTO_BYTES))).is_ok());
    }

    #[test]
    fn test_messages_are_localizable() {
        let errors = validate_login("", "password1").unwrap_err();
        assert_eq!(errors.to_string(), "Email is required");
        let localized =
            errors.messages(|key| builtin_message(Locale::Id, key).unwrap_or(key).to_string());
        assert_eq!(localized, vec!["Email wajib diisi"]);
    }
}
