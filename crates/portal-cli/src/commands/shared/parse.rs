use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

/// Parse a snake_case enum value using serde-deserialization.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
    let json = format!("\"{normalized}\"");
    serde_json::from_str(&json).map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

/// Parse repeated `key=value` arguments. Only the first `=` splits, so values
/// may contain `=` (URLs, base64 padding).
pub fn parse_pairs(raw: &[String], field: &str) -> anyhow::Result<BTreeMap<String, String>> {
    let mut pairs = BTreeMap::new();
    for item in raw {
        let Some((key, value)) = item.split_once('=') else {
            anyhow::bail!("invalid {field} '{item}': expected key=value");
        };
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("invalid {field} '{item}': empty key");
        }
        if pairs.insert(key.to_string(), value.to_string()).is_some() {
            anyhow::bail!("duplicate {field} for '{key}'");
        }
    }
    Ok(pairs)
}
