//! Domain name normalization.
//!
//! Hosted zone names and record names are kept fully qualified (with a
//! trailing dot) internally. Registrar nameservers and resolver answers are
//! compared in their denormalized form.

/// Returns the domain with exactly one trailing dot added if it had none.
///
/// `normalize_domain("")` is `"."`, the root.
pub fn normalize_domain(domain: &str) -> String {
    if domain.ends_with('.') {
        domain.to_string()
    } else {
        format!("{domain}.")
    }
}

/// Returns the domain with a single trailing dot removed.
///
/// `denormalize_domain(".")` is `""`.
pub fn denormalize_domain(domain: &str) -> &str {
    domain.strip_suffix('.').unwrap_or(domain)
}

/// Returns the zone-relative label for `fqdn` inside `origin`.
///
/// The apex becomes `@`, names inside the zone lose the origin suffix and
/// names outside the zone stay fully qualified.
pub fn relative_label(fqdn: &str, origin: &str) -> String {
    let fqdn = normalize_domain(fqdn);
    let origin = normalize_domain(origin);
    if fqdn == origin {
        return "@".to_string();
    }
    match fqdn.strip_suffix(&format!(".{origin}")) {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => fqdn,
    }
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
