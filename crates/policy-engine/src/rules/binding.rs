use splitwarden_core::types::PolicySnapshot;

use crate::objects::{names_object, PolicyObjects};

/// Group policy attributes bind the direction to our data object.
pub fn matches(objects: &PolicyObjects, line: &str) -> bool {
    names_object(line, &objects.binding_prefix(), objects.data_object())
}

pub fn apply(_line: &str, snapshot: &mut PolicySnapshot) {
    snapshot.group_policy_bound = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitwarden_core::types::PolicyDirection;

    #[test]
    fn test_binding_line() {
        let objects = PolicyObjects::new("Group1", PolicyDirection::Include);
        assert!(matches(
            &objects,
            " anyconnect-custom dynamic-split-include-domains value group1_include"
        ));
        assert!(!matches(
            &objects,
            " anyconnect-custom dynamic-split-include-domains value other_include"
        ));
        assert!(!matches(
            &objects,
            " anyconnect-custom dynamic-split-exclude-domains value group1_exclude"
        ));
    }
}
