//! Ledger rules shared by every entry point
//!
//! Amount parsing, emergency fund calculation, category checks and image
//! validation for receipts and profile pictures.

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::models::{Category, TransactionKind};

/// Lowest allowed emergency fund rate (percent)
pub const MIN_EMERGENCY_RATE: u8 = 5;

/// Highest allowed emergency fund rate (percent)
pub const MAX_EMERGENCY_RATE: u8 = 10;

/// Rate given to newly registered users
pub const DEFAULT_EMERGENCY_RATE: u8 = 10;

/// Maximum accepted image size (10 MB)
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
const JPEG_MAGIC: &[u8] = &[0xff, 0xd8, 0xff];

/// Parse a user-typed amount such as `1.500.000` or `1,500,000`
///
/// Thousands separators are stripped; what remains must be a non-negative
/// whole number.
pub fn parse_amount(input: &str) -> Result<i64> {
    let digits: String = input
        .trim()
        .chars()
        .filter(|c| *c != '.' && *c != ',')
        .collect();

    if digits.is_empty() {
        return Err(Error::InvalidData("Amount is required".to_string()));
    }

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::InvalidData(format!(
            "Amount must be a whole number: {}",
            input.trim()
        )));
    }

    digits
        .parse::<i64>()
        .map_err(|_| Error::InvalidData(format!("Amount is too large: {}", input.trim())))
}

/// Emergency fund portion of a transaction (floor of amount * rate / 100)
pub fn emergency_fund(amount: i64, kind: TransactionKind, rate: u8) -> i64 {
    match kind {
        TransactionKind::Income => amount.saturating_mul(i64::from(rate)) / 100,
        TransactionKind::Expense => 0,
    }
}

pub fn validate_emergency_rate(rate: u8) -> Result<()> {
    if !(MIN_EMERGENCY_RATE..=MAX_EMERGENCY_RATE).contains(&rate) {
        return Err(Error::InvalidData(format!(
            "Emergency fund rate must be between {}% and {}%",
            MIN_EMERGENCY_RATE, MAX_EMERGENCY_RATE
        )));
    }
    Ok(())
}

/// Check that a category can be recorded under the given kind
pub fn validate_category(kind: TransactionKind, category: Category) -> Result<()> {
    if category.kind() != kind {
        return Err(Error::InvalidData(format!(
            "Category '{}' is not valid for {} transactions",
            category, kind
        )));
    }
    Ok(())
}

pub fn validate_amount(amount: i64) -> Result<()> {
    if amount < 0 {
        return Err(Error::InvalidData("Amount cannot be negative".to_string()));
    }
    Ok(())
}

/// Image formats accepted for receipts and profile pictures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Sniff the format from the leading bytes
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(PNG_MAGIC) {
            Some(Self::Png)
        } else if bytes.starts_with(JPEG_MAGIC) {
            Some(Self::Jpeg)
        } else {
            None
        }
    }
}

/// Validate uploaded image bytes, returning the detected format
pub fn validate_image(bytes: &[u8]) -> Result<ImageFormat> {
    if bytes.is_empty() {
        return Err(Error::InvalidData("Image is empty".to_string()));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(Error::InvalidData(format!(
            "Image is too large ({} bytes, max {})",
            bytes.len(),
            MAX_IMAGE_BYTES
        )));
    }
    ImageFormat::detect(bytes)
        .ok_or_else(|| Error::InvalidData("Image must be a PNG or JPEG file".to_string()))
}

/// SHA256 hex digest of image bytes
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Format a value as rupiah with comma thousands separators, e.g. `Rp 1,500,000`
///
/// Rounds to whole units; the sign is kept.
pub fn format_rupiah(value: f64) -> String {
    let rounded = format!("{:.0}", value);
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(rest) if rest.chars().any(|c| c != '0') => ("-", rest),
        Some(rest) => ("", rest),
        None => ("", rounded.as_str()),
    };
    format!("Rp {}{}", sign, group_thousands(digits))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_strips_separators() {
        assert_eq!(parse_amount("1.500.000").unwrap(), 1_500_000);
        assert_eq!(parse_amount("1,500,000").unwrap(), 1_500_000);
        assert_eq!(parse_amount(" 250000 ").unwrap(), 250_000);
        assert_eq!(parse_amount("0").unwrap(), 0);
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount("...").is_err());
        assert!(parse_amount("12a").is_err());
        assert!(parse_amount("-500").is_err());
        assert!(parse_amount("99999999999999999999999").is_err());
    }

    #[test]
    fn test_emergency_fund() {
        assert_eq!(emergency_fund(1_000_000, TransactionKind::Income, 10), 100_000);
        assert_eq!(emergency_fund(1_000_000, TransactionKind::Income, 5), 50_000);
        // floors
        assert_eq!(emergency_fund(999, TransactionKind::Income, 7), 69);
        assert_eq!(emergency_fund(1_000_000, TransactionKind::Expense, 10), 0);
    }

    #[test]
    fn test_emergency_rate_bounds() {
        assert!(validate_emergency_rate(4).is_err());
        assert!(validate_emergency_rate(5).is_ok());
        assert!(validate_emergency_rate(10).is_ok());
        assert!(validate_emergency_rate(11).is_err());
    }

    #[test]
    fn test_validate_category() {
        assert!(validate_category(TransactionKind::Income, Category::Profit).is_ok());
        assert!(validate_category(TransactionKind::Expense, Category::Rent).is_ok());
        assert!(validate_category(TransactionKind::Income, Category::Rent).is_err());
        assert!(validate_category(TransactionKind::Expense, Category::Profit).is_err());
    }

    #[test]
    fn test_validate_image() {
        let png = [PNG_MAGIC, b"rest"].concat();
        let jpeg = [JPEG_MAGIC, b"rest"].concat();
        assert_eq!(validate_image(&png).unwrap(), ImageFormat::Png);
        assert_eq!(validate_image(&jpeg).unwrap(), ImageFormat::Jpeg);
        assert!(validate_image(b"GIF89a").is_err());
        assert!(validate_image(&[]).is_err());

        let mut huge = png.clone();
        huge.resize(MAX_IMAGE_BYTES + 1, 0);
        assert!(validate_image(&huge).is_err());
    }

    #[test]
    fn test_content_hash_is_stable() {
        assert_eq!(content_hash(b"abc"), content_hash(b"abc"));
        assert_ne!(content_hash(b"abc"), content_hash(b"abd"));
        assert_eq!(content_hash(b"").len(), 64);
    }

    #[test]
    fn test_format_rupiah() {
        assert_eq!(format_rupiah(0.0), "Rp 0");
        assert_eq!(format_rupiah(999.0), "Rp 999");
        assert_eq!(format_rupiah(1000.0), "Rp 1,000");
        assert_eq!(format_rupiah(1_500_000.4), "Rp 1,500,000");
        assert_eq!(format_rupiah(123_456.6), "Rp 123,457");
        assert_eq!(format_rupiah(-25_000.0), "Rp -25,000");
        assert_eq!(format_rupiah(-0.2), "Rp 0");
    }
}
