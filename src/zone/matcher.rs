//! Nameserver set comparison.

use std::collections::HashSet;

use crate::domain::denormalize_domain;

/// Returns `true` if every name in `actual` appears in `expected`.
///
/// Trailing dots are ignored on both sides. An empty `actual` matches.
pub fn match_ns_records<E, A>(expected: &[E], actual: &[A]) -> bool
where
    E: AsRef<str>,
    A: AsRef<str>,
{
    let expected: HashSet<&str> = expected
        .iter()
        .map(|name| denormalize_domain(name.as_ref()))
        .collect();
    actual
        .iter()
        .all(|name| expected.contains(denormalize_domain(name.as_ref())))
}
