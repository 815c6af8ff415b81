use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

use super::repo_types::{NewStudent, StudentPatch};
use crate::error::ValidationErrors;

pub const NAME_MAX_LEN: usize = 100;
pub const EMAIL_MAX_LEN: usize = 254;
pub const CONTROLNUM_MAX_LEN: usize = 20;
pub const YEAR_MIN: i64 = 1900;
pub const YEAR_MAX: i64 = 2100;

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const NOT_BLANK: &str = "This field may not be blank.";
const NOT_STRING: &str = "Not a valid string.";
const INVALID_EMAIL: &str = "Enter a valid email address.";
const INVALID_INT: &str = "A valid integer is required.";

/// Whether every writable field must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Create and PUT.
    Full,
    /// PATCH.
    Partial,
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Validates a create/PUT body, requiring every writable field.
pub fn validate_new(body: &Value) -> Result<NewStudent, ValidationErrors> {
    let obj = as_object(body)?;
    let mut errors = ValidationErrors::default();
    // In full mode every `None` has a matching entry in `errors`.
    match read_fields(obj, Mode::Full, &mut errors) {
        StudentPatch {
            name: Some(name),
            email: Some(email),
            controlnum: Some(controlnum),
            year: Some(year),
        } if errors.is_empty() => Ok(NewStudent {
            name,
            email,
            controlnum,
            year,
        }),
        _ => Err(errors),
    }
}

/// Validates a PATCH body; absent fields stay `None`.
pub fn validate_patch(body: &Value) -> Result<StudentPatch, ValidationErrors> {
    let obj = as_object(body)?;
    let mut errors = ValidationErrors::default();
    let patch = read_fields(obj, Mode::Partial, &mut errors);
    if errors.is_empty() {
        Ok(patch)
    } else {
        Err(errors)
    }
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    body.as_object().ok_or_else(|| {
        let mut errors = ValidationErrors::default();
        errors.add(
            "non_field_errors",
            format!(
                "Invalid data. Expected a dictionary, but got {}.",
                type_name(body)
            ),
        );
        errors
    })
}

fn read_fields(
    obj: &Map<String, Value>,
    mode: Mode,
    errors: &mut ValidationErrors,
) -> StudentPatch {
    StudentPatch {
        name: text_field(obj, "name", NAME_MAX_LEN, mode, errors),
        email: text_field(obj, "email", EMAIL_MAX_LEN, mode, errors).and_then(|email| {
            if is_valid_email(&email) {
                Some(email)
            } else {
                errors.add("email", INVALID_EMAIL);
                None
            }
        }),
        controlnum: text_field(obj, "controlnum", CONTROLNUM_MAX_LEN, mode, errors),
        year: year_field(obj, mode, errors),
    }
}

/// Looks up `key`, recording "required"/"null" errors. `None` means skip.
fn present<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    mode: Mode,
    errors: &mut ValidationErrors,
) -> Option<&'a Value> {
    match obj.get(key) {
        None => {
            if mode == Mode::Full {
                errors.add(key, REQUIRED);
            }
            None
        }
        Some(Value::Null) => {
            errors.add(key, NOT_NULL);
            None
        }
        Some(v) => Some(v),
    }
}

fn text_field(
    obj: &Map<String, Value>,
    key: &str,
    max_len: usize,
    mode: Mode,
    errors: &mut ValidationErrors,
) -> Option<String> {
    let value = present(obj, key, mode, errors)?;
    let Some(raw) = value.as_str() else {
        errors.add(key, NOT_STRING);
        return None;
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.add(key, NOT_BLANK);
        return None;
    }
    if trimmed.chars().count() > max_len {
        errors.add(
            key,
            format!("Ensure this field has no more than {} characters.", max_len),
        );
        return None;
    }
    Some(trimmed.to_string())
}

fn year_field(obj: &Map<String, Value>, mode: Mode, errors: &mut ValidationErrors) -> Option<i32> {
    let value = present(obj, "year", mode, errors)?;
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => strip_zero_decimals(s.trim()).parse::<i64>().ok(),
        _ => None,
    };
    let Some(year) = parsed else {
        errors.add("year", INVALID_INT);
        return None;
    };
    if year < YEAR_MIN {
        errors.add(
            "year",
            format!("Ensure this value is greater than or equal to {}.", YEAR_MIN),
        );
        return None;
    }
    if year > YEAR_MAX {
        errors.add(
            "year",
            format!("Ensure this value is less than or equal to {}.", YEAR_MAX),
        );
        return None;
    }
    i32::try_from(year).ok()
}

/// `"2021.0"` → `"2021"`; other decimals are left to fail parsing.
fn strip_zero_decimals(s: &str) -> std::borrow::Cow<'_, str> {
    lazy_static! {
        static ref ZERO_DECIMALS_RE: Regex = Regex::new(r"\.0*$").unwrap();
    }
    ZERO_DECIMALS_RE.replace(s, "")
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
