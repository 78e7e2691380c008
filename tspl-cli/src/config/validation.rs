//! Setting value validation.

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "TSPL_DOTS_PER_UNIT" => validate_int_range(value, 0, 100)?,
        "TSPL_THRESHOLD" => validate_int_range(value, 0, 255)?,
        "TSPL_OPTIONS_FILE" => {
            if value.trim().is_empty() {
                return Err("must not be blank".into());
            }
        }
        // Boolean settings
        k if is_boolean_setting(k) => {
            if value != "true" && value != "false" {
                return Err("must be 'true' or 'false'".into());
            }
        }
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: i32, max: i32) -> Result<(), String> {
    let v: i32 = value.parse().map_err(|_| "must be an integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}

fn is_boolean_setting(key: &str) -> bool {
    matches!(key, "TSPL_PEEL" | "TSPL_ROTATE_PRINT")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_range() {
        assert!(validate_setting("TSPL_THRESHOLD", "0").is_ok());
        assert!(validate_setting("TSPL_THRESHOLD", "255").is_ok());
        assert!(validate_setting("TSPL_THRESHOLD", "256").is_err());
        assert!(validate_setting("TSPL_THRESHOLD", "abc").is_err());
    }

    #[test]
    fn test_dots_per_unit_allows_zero() {
        assert!(validate_setting("TSPL_DOTS_PER_UNIT", "0").is_ok());
        assert!(validate_setting("TSPL_DOTS_PER_UNIT", "-1").is_err());
    }

    #[test]
    fn test_boolean_settings() {
        assert!(validate_setting("TSPL_PEEL", "true").is_ok());
        assert!(validate_setting("TSPL_ROTATE_PRINT", "false").is_ok());
        assert_eq!(
            validate_setting("TSPL_PEEL", "yes"),
            Err("must be 'true' or 'false'".to_string())
        );
    }

    #[test]
    fn test_unknown_keys_pass() {
        assert!(validate_setting("SOMETHING_ELSE", "whatever").is_ok());
    }
}
