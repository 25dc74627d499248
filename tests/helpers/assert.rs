use snapbox::{Assert, Substitutions};

use crate::helpers::{FROM_SHA, TO_SHA};

/// Assert that replaces the revisions of both mocked builds with `[FROMSHA]` and `[TOSHA]`.
///
/// The generation timestamp changes every run, so expected reports match it with `[..]`.
/// Run with `SNAPSHOTS=overwrite` to regenerate them.
pub fn assert() -> Assert {
    let mut substitutions = Substitutions::default();
    substitutions.insert("[FROMSHA]", FROM_SHA).unwrap();
    substitutions.insert("[TOSHA]", TO_SHA).unwrap();
    Assert::new()
        .substitutions(substitutions)
        .action_env("SNAPSHOTS")
}
