//! Parser for `key: value` classification blocks.

use std::collections::BTreeMap;

use crate::base::types::ClassificationRecord;

/// Parse a block into its fields.
///
/// Each line is split on its first colon and both halves are trimmed. Lines
/// without a colon, or with an empty key or value, are dropped.
pub fn parse(raw: &str) -> BTreeMap<String, String> {
    raw.lines()
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            let (key, value) = (key.trim(), value.trim());

            (!key.is_empty() && !value.is_empty()).then(|| (key.to_string(), value.to_string()))
        })
        .collect()
}

/// Parse a block straight into a typed record.
pub fn parse_record(raw: &str) -> ClassificationRecord {
    ClassificationRecord::from_fields(&parse(raw))
}
