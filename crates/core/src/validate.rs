//! Inbound command records validation.
//!
//! Commands arrive as untyped JSON records, the validator coerces the fields it knows about
//! and ignores the rest of them.

use std::fmt;

use displaydoc::Display;
use serde_json::{Map, Value};

use crate::{Action, Animation, Mode, RGB8};

/// Field with the optional reset flag.
const RESET_FIELDS: [&str; 2] = ["reset", "resetAfter"];

/// Reasons why a field value cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum FieldError {
    /// value `{0}` is not an integer
    NotAnInteger(String),
    /// value {value} is out of range {min}..={max}
    OutOfRange { value: i64, min: i64, max: i64 },
    /// value `{0}` is not a boolean
    NotABoolean(String),
}

/// Command validation failure.
///
/// The display representation is sent back to the caller as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field is missing.
    MissingField { field: &'static str },
    /// Field value cannot be coerced to the expected type.
    InvalidField {
        field: &'static str,
        cause: FieldError,
    },
    /// Mode is missing or is not supported.
    UnknownMode { mode: Option<String> },
}

impl ValidationError {
    /// Returns the name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field } | Self::InvalidField { field, .. } => field,
            Self::UnknownMode { .. } => "mode",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => write!(f, "missing field `{field}`"),
            Self::InvalidField { field, cause } => write!(f, "invalid field `{field}`: {cause}"),
            Self::UnknownMode { mode: Some(mode) } => write!(f, "unknown message mode `{mode}`"),
            Self::UnknownMode { mode: None } => f.write_str("unknown message, no mode specified"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validates an untyped command record and converts it into an action.
///
/// The color channels are checked first, then the mode and its specific fields.
pub fn validate(raw: &Map<String, Value>) -> Result<Action, ValidationError> {
    let color = RGB8::new(channel(raw, "r")?, channel(raw, "g")?, channel(raw, "b")?);

    let mode = match raw.get("mode") {
        None | Some(Value::Null) => return Err(ValidationError::UnknownMode { mode: None }),
        Some(Value::String(name)) => Mode::from_name(name).ok_or_else(|| {
            ValidationError::UnknownMode {
                mode: Some(name.clone()),
            }
        })?,
        Some(other) => {
            return Err(ValidationError::UnknownMode {
                mode: Some(other.to_string()),
            })
        }
    };

    let animation = match mode {
        Mode::Timer => Animation::Timer {
            color,
            duration_secs: integer(raw, "duration")?,
        },
        Mode::Flash => Animation::Flash {
            color,
            wait_ms: wait(raw)?,
        },
        Mode::Wipe => Animation::Wipe {
            color,
            wait_ms: wait(raw)?,
        },
        // No extra fields, the reset flag is ignored as well.
        Mode::SetAll => return Ok(Action::new(Animation::SetAll { color })),
    };

    let mut action = Action::new(animation);
    if let Some(reset_after) = reset_flag(raw)? {
        action = action.with_reset(reset_after);
    }
    Ok(action)
}

fn channel(raw: &Map<String, Value>, field: &'static str) -> Result<u8, ValidationError> {
    bounded(raw, field, 0, u8::MAX.into()).map(|value| value as u8)
}

fn wait(raw: &Map<String, Value>) -> Result<u32, ValidationError> {
    bounded(raw, "wait", 0, u32::MAX.into()).map(|value| value as u32)
}

fn bounded(
    raw: &Map<String, Value>,
    field: &'static str,
    min: i64,
    max: i64,
) -> Result<i64, ValidationError> {
    let value = integer(raw, field)?;
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::InvalidField {
            field,
            cause: FieldError::OutOfRange { value, min, max },
        })
    }
}

fn integer(raw: &Map<String, Value>, field: &'static str) -> Result<i64, ValidationError> {
    let value = raw
        .get(field)
        .ok_or(ValidationError::MissingField { field })?;
    coerce_integer(value).map_err(|cause| ValidationError::InvalidField { field, cause })
}

fn reset_flag(raw: &Map<String, Value>) -> Result<Option<bool>, ValidationError> {
    let Some((field, value)) = RESET_FIELDS
        .iter()
        .find_map(|field| raw.get(*field).map(|value| (*field, value)))
    else {
        return Ok(None);
    };

    match value {
        Value::Bool(flag) => Ok(Some(*flag)),
        Value::Number(number) if number.as_u64() == Some(0) => Ok(Some(false)),
        Value::Number(number) if number.as_u64() == Some(1) => Ok(Some(true)),
        other => Err(ValidationError::InvalidField {
            field,
            cause: FieldError::NotABoolean(other.to_string()),
        }),
    }
}

/// Converts a JSON value to an integer the way a lenient scripting runtime does it.
///
/// Floats are truncated toward zero, booleans become 0 and 1, strings are parsed after
/// trimming the surrounding whitespace.
fn coerce_integer(value: &Value) -> Result<i64, FieldError> {
    let not_an_integer = || FieldError::NotAnInteger(value_repr(value));
    match value {
        Value::Bool(flag) => Ok(i64::from(*flag)),
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                return Ok(integer);
            }
            let float = number.as_f64().ok_or_else(not_an_integer)?;
            let truncated = float.trunc();
            // i64::MAX is not representable, the upper bound is exclusive.
            if truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
                Ok(truncated as i64)
            } else {
                Err(not_an_integer())
            }
        }
        Value::String(text) => text.trim().parse().map_err(|_| not_an_integer()),
        Value::Null | Value::Array(_) | Value::Object(_) => Err(not_an_integer()),
    }
}

fn value_repr(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
