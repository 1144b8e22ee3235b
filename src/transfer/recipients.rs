//! Recipient list sources.

use alloy::primitives::Address;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::transfer::types::RecipientError;

/// Parse a 0x-prefixed recipient address.
///
/// Mixed-case input must carry a valid EIP-55 checksum; all-lowercase and
/// all-uppercase input is accepted as is.
pub fn parse_address(raw: &str) -> Result<Address, RecipientError> {
    let invalid = |reason: String| RecipientError::InvalidAddress {
        address: raw.to_string(),
        reason,
    };

    let body = raw
        .strip_prefix("0x")
        .ok_or_else(|| invalid("missing 0x prefix".to_string()))?;
    let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = body.chars().any(|c| c.is_ascii_lowercase());

    if has_upper && has_lower {
        Address::parse_checksummed(raw, None).map_err(|e| invalid(e.to_string()))
    } else {
        Address::from_str(raw).map_err(|e| invalid(e.to_string()))
    }
}

/// Split text into recipients: one per line, trimmed, blank lines dropped.
pub fn parse_recipients(text: &str) -> Vec<String> {
    normalize_recipients(text.lines())
}

/// Trim entries and drop blank ones, keeping order.
pub fn normalize_recipients<I, S>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .map(|entry| entry.as_ref().trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// Read recipients from a text file with one address per line.
pub fn load_recipients(path: &Path) -> std::io::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    let recipients = parse_recipients(&content);
    tracing::debug!(path = ?path, count = recipients.len(), "Loaded recipient list");
    Ok(recipients)
}
