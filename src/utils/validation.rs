use crate::utils::error::{PasteError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl Into<String>, reason: impl Into<String>) -> PasteError {
    PasteError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.into(),
        reason: reason.into(),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.contains('\0') {
        return Err(invalid(
            field_name,
            path.escape_default().to_string(),
            "Path contains null bytes",
        ));
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            value.to_string(),
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

/// `value` 必須是 `allowed` 其中之一
pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(invalid(field_name, value, format!("Valid values: {}", allowed.join(", "))))
    }
}

/// 將數值限制在 [min, max] 範圍內
pub fn clamp_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> T {
    if value < min {
        tracing::warn!("{} = {} is below {}, using {}", field_name, value, min, min);
        min
    } else if value > max {
        tracing::warn!("{} = {} is above {}, using {}", field_name, value, max, max);
        max
    } else {
        value
    }
}
