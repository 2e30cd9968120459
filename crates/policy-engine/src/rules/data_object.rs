use splitwarden_core::types::PolicySnapshot;

use crate::objects::{names_object, PolicyObjects};

/// Value line of our data object; carries the domains.
pub fn matches(objects: &PolicyObjects, line: &str) -> bool {
    names_object(line, &objects.data_prefix(), objects.data_object())
}

pub fn apply(line: &str, snapshot: &mut PolicySnapshot) {
    snapshot
        .domains
        .extend(comma_terminated_tokens(line).map(str::to_string));
}

/// Every maximal run of non-whitespace, non-comma characters that is directly
/// followed by a comma.
pub fn comma_terminated_tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split_whitespace().flat_map(|word| {
        let mut parts: Vec<&str> = word.split(',').collect();
        // The piece after the last comma is not comma-terminated.
        parts.pop();
        parts.into_iter().filter(|part| !part.is_empty())
    })
}
