//! Line rules that turn `show run` output into a [`PolicySnapshot`].
//!
//! Every rule is tried against every line; a line that matches nothing is
//! simply not part of the policy.

use splitwarden_core::types::PolicySnapshot;

use crate::objects::PolicyObjects;

pub mod attribute;
pub mod binding;
pub mod data_object;

/// A named pattern and the snapshot field it feeds.
pub struct LineRule {
    pub name: &'static str,
    pub matches: fn(&PolicyObjects, &str) -> bool,
    pub apply: fn(&str, &mut PolicySnapshot),
}

impl LineRule {
    /// Applies the rule to `line`, returning whether it matched.
    pub fn evaluate(&self, objects: &PolicyObjects, line: &str, snapshot: &mut PolicySnapshot) -> bool {
        if (self.matches)(objects, line) {
            (self.apply)(line, snapshot);
            true
        } else {
            false
        }
    }
}

pub const LINE_RULES: &[LineRule] = &[
    LineRule {
        name: "attribute-declaration",
        matches: attribute::matches,
        apply: attribute::apply,
    },
    LineRule {
        name: "group-policy-binding",
        matches: binding::matches,
        apply: binding::apply,
    },
    LineRule {
        name: "data-object",
        matches: data_object::matches,
        apply: data_object::apply,
    },
];
