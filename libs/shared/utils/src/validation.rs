//! Field validators shared by the registration and update payloads.
//!
//! Each returns the user-facing message on failure so handlers can surface
//! it as a 400.

use std::sync::LazyLock;

use regex::Regex;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_-]*$").expect("valid regex"));
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"));
static CITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z\s]+$").expect("valid regex"));
static SPECIAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[!@#$%^&*(),.?":{}|<>]"#).expect("valid regex"));
static DOSAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+)?\s?(mg|ml)$").expect("valid regex"));

const BLOOD_GROUPS: [&str; 8] = ["A+", "A-", "B+", "B-", "O+", "O-", "AB+", "AB-"];
const GENDERS: [&str; 3] = ["male", "female", "other"];

pub fn validate_username(value: &str) -> Result<(), String> {
    let len = value.chars().count();
    if !(3..=80).contains(&len) {
        return Err("Username must be between 3 and 80 characters long".to_string());
    }
    if value.starts_with(|c: char| c.is_ascii_digit()) {
        return Err("Username cannot start with a number".to_string());
    }
    if !USERNAME_RE.is_match(value) {
        return Err(
            "Username must start with a letter and can only contain letters, numbers, underscores, and hyphens"
                .to_string(),
        );
    }
    Ok(())
}

pub fn validate_email(value: &str) -> Result<(), String> {
    if EMAIL_RE.is_match(value) {
        Ok(())
    } else {
        Err("Invalid email format".to_string())
    }
}

pub fn validate_city(value: &str) -> Result<(), String> {
    if CITY_RE.is_match(value) {
        Ok(())
    } else {
        Err("City must only contain letters and spaces".to_string())
    }
}

pub fn validate_password(value: &str) -> Result<(), String> {
    if value.chars().count() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }
    if !value.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain at least one uppercase letter".to_string());
    }
    if !value.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must contain at least one lowercase letter".to_string());
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit".to_string());
    }
    if !SPECIAL_RE.is_match(value) {
        return Err("Password must contain at least one special character".to_string());
    }
    Ok(())
}

pub fn validate_name(value: &str) -> Result<(), String> {
    let len = value.chars().count();
    if !(2..=50).contains(&len) {
        return Err("Name must be between 2 and 50 characters long".to_string());
    }
    if value.starts_with(|c: char| c.is_ascii_digit()) {
        return Err("Name cannot start with a number".to_string());
    }
    Ok(())
}

pub fn validate_phone(value: &str) -> Result<(), String> {
    if value.starts_with("03") && value.len() == 11 && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err("Phone number must be a valid number starting with '03' and exactly 11 digits long".to_string())
    }
}

pub fn validate_gender(value: &str) -> Result<(), String> {
    if GENDERS.contains(&value.to_lowercase().as_str()) {
        Ok(())
    } else {
        Err("Gender must be either 'male', 'female', or 'other'".to_string())
    }
}

pub fn validate_blood_group(value: &str) -> Result<(), String> {
    if BLOOD_GROUPS.contains(&value.to_uppercase().as_str()) {
        Ok(())
    } else {
        Err("Blood group must be one of the following: 'A+', 'A-', 'B+', 'B-', 'O+', 'O-', 'AB+', 'AB-'".to_string())
    }
}

pub fn validate_dosage(value: &str) -> Result<(), String> {
    let len = value.chars().count();
    if !(3..=10).contains(&len) || !DOSAGE_RE.is_match(value) {
        return Err("Dosage must be a number followed by 'mg' or 'ml' (e.g. '500 mg')".to_string());
    }
    Ok(())
}

/// Runs an optional field through a validator.
pub fn validate_optional(
    value: Option<&str>,
    validator: fn(&str) -> Result<(), String>,
) -> Result<(), String> {
    value.map_or(Ok(()), validator)
}
