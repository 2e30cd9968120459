use splitwarden_core::types::PolicySnapshot;

use crate::objects::PolicyObjects;

/// `webvpn` block declares the custom attribute for the direction.
pub fn matches(objects: &PolicyObjects, line: &str) -> bool {
    line.contains(&objects.attribute_declaration())
}

pub fn apply(_line: &str, snapshot: &mut PolicySnapshot) {
    snapshot.webvpn_declared = true;
}
