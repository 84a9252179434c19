//! Validation of rewrite inputs
//!
//! Form values arrive as free text. Dimensions follow the lenient numeric
//! parsing clients expect (surrounding whitespace, exponents, `0x`/`0o`/`0b`
//! literals and an empty string are all accepted as numbers) and are then
//! narrowed to positive integers that fit an EXIF LONG.

/// Validation errors for rewrite requests.
///
/// The `Display` output is the exact plain-text body sent to the client.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing file \"picture\"")]
    MissingFile,

    #[error("file \"picture\" is empty")]
    EmptyFile,

    #[error("width/height must be numbers")]
    NonNumericDimensions,

    #[error("width/height must be positive integers")]
    InvalidDimensions,

    #[error("picture is not a recognized image format")]
    UnrecognizedFormat,

    #[error("picture could not be decoded: {0}")]
    UndecodableImage(String),
}

/// Parse a single form value the way a lenient numeric cast does.
///
/// A missing value is not a number; an empty or blank value is zero.
pub fn parse_number(raw: Option<&str>) -> Option<f64> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    if let Some(value) = parse_prefixed_integer(trimmed) {
        return value;
    }
    // Rust also accepts "inf"/"nan" spellings; those are rejected below as non-finite
    trimmed.parse::<f64>().ok()
}

/// Unsigned `0x`, `0o` and `0b` literals (prefix in either case).
///
/// Returns `None` when there is no such prefix, `Some(None)` when the prefix
/// is followed by anything but digits of that radix.
fn parse_prefixed_integer(s: &str) -> Option<Option<f64>> {
    let radix = match s.get(..2)?.to_ascii_lowercase().as_str() {
        "0x" => 16,
        "0o" => 8,
        "0b" => 2,
        _ => return None,
    };
    let digits = &s[2..];
    if digits.is_empty() {
        return Some(None);
    }
    Some(digits.chars().try_fold(0f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    }))
}

/// Validate and convert the `width`/`height` form values.
///
/// Both values are checked for being finite numbers first, so a request with
/// one garbage value and one negative value reports the numeric error.
pub fn parse_dimensions(
    width: Option<&str>,
    height: Option<&str>,
) -> Result<(u32, u32), ValidationError> {
    let width = parse_number(width).filter(|v| v.is_finite());
    let height = parse_number(height).filter(|v| v.is_finite());

    let (width, height) = match (width, height) {
        (Some(w), Some(h)) => (w, h),
        _ => return Err(ValidationError::NonNumericDimensions),
    };

    Ok((to_dimension(width)?, to_dimension(height)?))
}

fn to_dimension(value: f64) -> Result<u32, ValidationError> {
    if value <= 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(ValidationError::InvalidDimensions);
    }
    Ok(value as u32)
}

/// Validate the uploaded file payload size
pub fn validate_file_size(size: usize) -> Result<(), ValidationError> {
    if size == 0 {
        return Err(ValidationError::EmptyFile);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dimensions_ok() {
        assert_eq!(parse_dimensions(Some("640"), Some("480")), Ok((640, 480)));
        assert_eq!(parse_dimensions(Some(" 12 "), Some("1e3")), Ok((12, 1000)));
        assert_eq!(parse_dimensions(Some("7.0"), Some("+9")), Ok((7, 9)));
    }

    #[test]
    fn test_parse_dimensions_prefixed_literals() {
        assert_eq!(parse_dimensions(Some("0x10"), Some("0b101")), Ok((16, 5)));
        assert_eq!(parse_dimensions(Some(" 0O17 "), Some("0XfF")), Ok((15, 255)));

        for raw in ["0x", "-0x10", "0x+1", "0b102", "0o8", "0x1.5"] {
            assert_eq!(
                parse_dimensions(Some(raw), Some("1")),
                Err(ValidationError::NonNumericDimensions),
                "width={raw:?}"
            );
        }
    }

    #[test]
    fn test_parse_dimensions_not_numbers() {
        assert_eq!(
            parse_dimensions(Some("abc"), Some("480")),
            Err(ValidationError::NonNumericDimensions)
        );
        assert_eq!(
            parse_dimensions(Some("640"), None),
            Err(ValidationError::NonNumericDimensions)
        );
        assert_eq!(
            parse_dimensions(Some("inf"), Some("1")),
            Err(ValidationError::NonNumericDimensions)
        );
        assert_eq!(
            parse_dimensions(Some("NaN"), Some("1")),
            Err(ValidationError::NonNumericDimensions)
        );
    }

    #[test]
    fn test_numeric_error_takes_precedence() {
        assert_eq!(
            parse_dimensions(Some("-5"), Some("abc")),
            Err(ValidationError::NonNumericDimensions)
        );
    }

    #[test]
    fn test_parse_dimensions_not_positive_integers() {
        for (w, h) in [("0", "10"), ("-1", "10"), ("10", "12.5"), ("", "10"), ("5e10", "1")] {
            assert_eq!(
                parse_dimensions(Some(w), Some(h)),
                Err(ValidationError::InvalidDimensions),
                "width={w:?} height={h:?}"
            );
        }
    }

    #[test]
    fn test_parse_dimensions_accepts_u32_max() {
        assert_eq!(
            parse_dimensions(Some("4294967295"), Some("1")),
            Ok((u32::MAX, 1))
        );
    }

    #[test]
    fn test_validate_file_size() {
        assert!(validate_file_size(1).is_ok());
        assert_eq!(validate_file_size(0), Err(ValidationError::EmptyFile));
    }

    #[test]
    fn test_messages_match_client_contract() {
        assert_eq!(ValidationError::MissingFile.to_string(), "missing file \"picture\"");
        assert_eq!(
            ValidationError::NonNumericDimensions.to_string(),
            "width/height must be numbers"
        );
    }
}
