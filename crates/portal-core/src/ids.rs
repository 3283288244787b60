//! ID and invite-code generation.
//!
//! Record ids are 9-character lowercase base-36 tokens. Invite codes are a
//! fixed uppercase prefix, a dash, and an uppercase alphanumeric suffix
//! (e.g. `TCP-7QK2ZD`). Randomness comes from the OS via `getrandom`.

use crate::errors::CoreError;

/// Length of a record id.
pub const ID_LEN: usize = 9;

/// Prefix of stored image blob ids.
pub const PREFIX_BLOB: &str = "blob";

/// Default invite-code prefix.
pub const DEFAULT_CODE_PREFIX: &str = "TCP";

/// Default length of the random invite-code suffix.
pub const DEFAULT_CODE_SUFFIX_LEN: usize = 6;

const ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const CODE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Largest multiple of 36 that fits in a byte. Bytes at or above it are
/// discarded so every symbol is equally likely.
const REJECTION_LIMIT: u8 = 252;

fn random_token(alphabet: &[u8; 36], len: usize) -> Result<String, CoreError> {
    let mut out = String::with_capacity(len);
    let mut buf = [0u8; 32];
    while out.len() < len {
        getrandom::fill(&mut buf)
            .map_err(|e| CoreError::Other(anyhow::anyhow!("OS randomness unavailable: {e}")))?;
        for byte in buf {
            if byte < REJECTION_LIMIT {
                out.push(char::from(alphabet[usize::from(byte % 36)]));
                if out.len() == len {
                    break;
                }
            }
        }
    }
    Ok(out)
}

/// Generate a record id, e.g. `"k3x9q0m2a"`.
///
/// # Errors
///
/// Returns `CoreError::Other` if the OS random source fails.
pub fn generate_id() -> Result<String, CoreError> {
    random_token(ID_ALPHABET, ID_LEN)
}

/// Generate a blob id, e.g. `"blob-k3x9q0m2a"`.
///
/// # Errors
///
/// Returns `CoreError::Other` if the OS random source fails.
pub fn generate_blob_id() -> Result<String, CoreError> {
    Ok(format!("{PREFIX_BLOB}-{}", generate_id()?))
}

/// Whether `s` looks like an id from [`generate_blob_id`].
#[must_use]
pub fn is_blob_id(s: &str) -> bool {
    s.strip_prefix(PREFIX_BLOB)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|id| id.len() == ID_LEN && id.bytes().all(|b| ID_ALPHABET.contains(&b)))
}

/// Generate an invite code `PREFIX-XXXXXX`.
///
/// Uniqueness is probabilistic only; callers check the code collection and
/// retry on collision.
///
/// # Errors
///
/// Returns `CoreError::Other` if the OS random source fails.
pub fn generate_code(prefix: &str, suffix_len: usize) -> Result<String, CoreError> {
    Ok(format!(
        "{}-{}",
        prefix.to_ascii_uppercase(),
        random_token(CODE_ALPHABET, suffix_len)?
    ))
}

/// Normalize user-entered code text before lookup.
#[must_use]
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// Whether `code` has the `PREFIX-XXXXXX` shape for the given prefix.
#[must_use]
pub fn is_well_formed_code(code: &str, prefix: &str, suffix_len: usize) -> bool {
    let Some((head, tail)) = code.split_once('-') else {
        return false;
    };
    head.eq_ignore_ascii_case(prefix)
        && tail.len() == suffix_len
        && tail
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generate_id_format() {
        let id = generate_id().unwrap();
        assert_eq!(id.len(), ID_LEN);
        assert!(id.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
    }

    #[test]
    fn generate_id_uniqueness() {
        let ids: HashSet<String> = (0..500).map(|_| generate_id().unwrap()).collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn blob_id_is_prefixed() {
        let id = generate_blob_id().unwrap();
        assert!(id.starts_with("blob-"));
        assert!(is_blob_id(&id));
        assert!(!is_blob_id("blob-"));
        assert!(!is_blob_id("https://x.dev/blob-k3x9q0m2a"));
    }

    #[test]
    fn generate_code_format() {
        let code = generate_code("tcp", DEFAULT_CODE_SUFFIX_LEN).unwrap();
        assert!(code.starts_with("TCP-"));
        assert!(is_well_formed_code(&code, "TCP", DEFAULT_CODE_SUFFIX_LEN));
    }

    #[test]
    fn normalize_trims_and_uppercases() {
        assert_eq!(normalize_code("  tcp-ab12cd \n"), "TCP-AB12CD");
    }

    #[test]
    fn malformed_codes_are_detected() {
        assert!(!is_well_formed_code("TCP-abc123", "TCP", 6));
        assert!(!is_well_formed_code("TCP-ABC12", "TCP", 6));
        assert!(!is_well_formed_code("XYZ-ABC123", "TCP", 6));
        assert!(!is_well_formed_code("TCPABC123", "TCP", 6));
    }
}
