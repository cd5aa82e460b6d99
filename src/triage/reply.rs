//! Canned reply selection.

use crate::base::types::{Category, ClassificationRecord};

/// Pick the canned reply for a classification.
///
/// Only store-information enquiries get one.
pub fn generate_reply<'a>(record: &ClassificationRecord, store_info_reply: &'a str) -> Option<&'a str> {
    match record.category {
        Some(Category::StoreInfo) => Some(store_info_reply),
        _ => None,
    }
}
