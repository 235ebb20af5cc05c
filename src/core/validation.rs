//! Form validation
//!
//! Client-side checks for the registration and create-server forms. They
//! give early feedback only; the backend validates again.

use crate::core::models::{CreateServerPayload, RegisterForm};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

const NAME_MIN_LEN: usize = 2;
const NAME_MAX_LEN: usize = 100;
const EMAIL_MAX_LEN: usize = 254;
const PASSWORD_MIN_LEN: usize = 8;
const PASSWORD_MAX_LEN: usize = 128;

static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| compile("name", r"^[a-zA-ZÀ-ÿ0-9\s'-]+$"));

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| compile("email", r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"));

fn compile(name: &str, pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| {
        tracing::error!("Failed to compile {} regex: {}", name, e);
        // [^\s\S] never matches
        Regex::new(r"[^\s\S]").unwrap()
    })
}

/// Per-field errors of the registration form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterFormErrors {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl RegisterFormErrors {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.confirm_password.is_none()
    }

    /// First error in field order
    pub fn first(&self) -> Option<&str> {
        self.username
            .as_deref()
            .or(self.email.as_deref())
            .or(self.password.as_deref())
            .or(self.confirm_password.as_deref())
    }
}

pub fn validate_username(value: &str) -> Option<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();

    if trimmed.is_empty() {
        return Some("Username is required".to_string());
    }
    if len < NAME_MIN_LEN {
        return Some(format!("Username must be at least {} characters", NAME_MIN_LEN));
    }
    if len > NAME_MAX_LEN {
        return Some(format!("Username must be less than {} characters", NAME_MAX_LEN));
    }
    if !NAME_PATTERN.is_match(trimmed) {
        return Some("Please enter a valid username".to_string());
    }
    None
}

pub fn validate_email(value: &str) -> Option<String> {
    let normalized = value.trim().to_lowercase();

    if normalized.is_empty() {
        return Some("Email address is required".to_string());
    }
    if normalized.chars().count() > EMAIL_MAX_LEN {
        return Some("Email address is too long".to_string());
    }
    if !EMAIL_PATTERN.is_match(&normalized) {
        return Some("Please enter a valid email address".to_string());
    }
    None
}

pub fn validate_password(value: &str) -> Option<String> {
    let len = value.chars().count();

    if value.is_empty() {
        return Some("Password is required".to_string());
    }
    if len < PASSWORD_MIN_LEN {
        return Some(format!("Password must be at least {} characters", PASSWORD_MIN_LEN));
    }
    if len > PASSWORD_MAX_LEN {
        return Some("Password is too long".to_string());
    }
    None
}

pub fn validate_confirm_password(password: &str, confirm: &str) -> Option<String> {
    if confirm.is_empty() {
        return Some("Please confirm your password".to_string());
    }
    if password != confirm {
        return Some("Passwords do not match".to_string());
    }
    None
}

/// Validate every field of the registration form
pub fn validate_register_form(form: &RegisterForm) -> RegisterFormErrors {
    RegisterFormErrors {
        username: validate_username(&form.username),
        email: validate_email(&form.email),
        password: validate_password(&form.password),
        confirm_password: validate_confirm_password(&form.password, &form.confirm_password),
    }
}

/// Validate a create-server request; returns the first problem found
pub fn validate_create_server(payload: &CreateServerPayload) -> Result<(), String> {
    if payload.name.trim().is_empty() {
        return Err("Server name is required".to_string());
    }
    if payload.host.trim().is_empty() {
        return Err("Host is required".to_string());
    }
    if payload.host.chars().any(char::is_whitespace) {
        return Err("Host must not contain spaces".to_string());
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordStrengthLevel {
    Weak,
    Fair,
    Good,
    Strong,
}

impl PasswordStrengthLevel {
    pub fn label(self) -> &'static str {
        match self {
            PasswordStrengthLevel::Weak => "Weak password",
            PasswordStrengthLevel::Fair => "Fair password",
            PasswordStrengthLevel::Good => "Good password",
            PasswordStrengthLevel::Strong => "Strong password",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
    /// 0 for an empty password, else 1..=4
    pub score: u8,
    pub level: PasswordStrengthLevel,
}

/// Score a password from its length and character variety
pub fn password_strength(password: &str) -> PasswordStrength {
    if password.is_empty() {
        return PasswordStrength {
            score: 0,
            level: PasswordStrengthLevel::Weak,
        };
    }

    let len = password.chars().count();
    let checks = [
        len >= 8,
        len >= 12,
        len >= 16,
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];
    let raw = checks.iter().filter(|&&passed| passed).count() as u8;
    let score = raw.div_ceil(2).clamp(1, 4);

    let level = match score {
        1 => PasswordStrengthLevel::Weak,
        2 => PasswordStrengthLevel::Fair,
        3 => PasswordStrengthLevel::Good,
        _ => PasswordStrengthLevel::Strong,
    };

    PasswordStrength { score, level }
}
