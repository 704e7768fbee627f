use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("failed to parse size {0:?}")]
    InvalidSize(String),

    #[error("failed to parse number {0:?}")]
    InvalidNumber(String),

    #[error("unexpected suffix {suffix:?} in number {token:?}")]
    UnexpectedSuffix { token: String, suffix: char },
}

/// "4,617M" -> 4617 * 1024^2. Suffixes K/M/G/T are 1024-based; the
/// magnitude may be fractional. Empty input is zero.
pub fn parse_size(token: &str) -> Result<u64, LexError> {
    let cleaned = token.trim().replace(',', "");
    if cleaned.is_empty() {
        return Ok(0);
    }

    let (digits, multiplier) = match cleaned.chars().last() {
        Some('K') => (&cleaned[..cleaned.len() - 1], 1u64 << 10),
        Some('M') => (&cleaned[..cleaned.len() - 1], 1u64 << 20),
        Some('G') => (&cleaned[..cleaned.len() - 1], 1u64 << 30),
        Some('T') => (&cleaned[..cleaned.len() - 1], 1u64 << 40),
        _ => (cleaned.as_str(), 1),
    };

    let value: f64 = digits
        .parse()
        .map_err(|_| LexError::InvalidSize(token.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(LexError::InvalidSize(token.to_string()));
    }

    Ok((value * multiplier as f64) as u64)
}

/// "10,000,000" -> 10000000. A trailing letter ("25K") is reported as
/// `UnexpectedSuffix` so callers can tell a unit from plain garbage.
pub fn parse_number(token: &str) -> Result<u64, LexError> {
    let cleaned = token.trim().replace(',', "");
    if cleaned.is_empty() {
        return Ok(0);
    }

    if let Some(last) = cleaned.chars().last().filter(|c| c.is_ascii_alphabetic()) {
        let head = &cleaned[..cleaned.len() - 1];
        if !head.is_empty() && head.chars().all(|c| c.is_ascii_digit()) {
            return Err(LexError::UnexpectedSuffix {
                token: token.trim().to_string(),
                suffix: last,
            });
        }
    }

    cleaned
        .parse()
        .map_err(|_| LexError::InvalidNumber(token.to_string()))
}
