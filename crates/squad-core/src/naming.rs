//! Name normalisation helpers shared by the generators and validators

use once_cell::sync::Lazy;
use regex::Regex;

static KEBAB_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9]*(?:-[a-z0-9]+)*$").expect("valid kebab-case regex"));

static SEMVER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?(?:\+[0-9A-Za-z.-]+)?$")
        .expect("valid semver regex")
});

/// Lowercase letters, digits and single hyphens, starting with a letter.
pub fn is_kebab_case(name: &str) -> bool {
    KEBAB_CASE.is_match(name)
}

pub fn is_semver(version: &str) -> bool {
    SEMVER.is_match(version)
}

/// Convert free text or camelCase into kebab-case.
///
/// A leading digit is prefixed so the result still satisfies [`is_kebab_case`].
pub fn to_kebab_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_lower = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if ch.is_ascii_uppercase() && prev_lower {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
            prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        } else {
            if !out.ends_with('-') && !out.is_empty() {
                out.push('-');
            }
            prev_lower = false;
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        format!("n-{}", trimmed)
    } else {
        trimmed.to_string()
    }
}

/// `order-manager` -> `Order Manager`
pub fn to_title_case(input: &str) -> String {
    input
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn to_snake_case(input: &str) -> String {
    to_kebab_case(input).replace('-', "_")
}

/// Naive English singular form, good enough for domain nouns.
pub fn singularize(word: &str) -> String {
    let lower = word.to_lowercase();
    if lower.len() <= 3 {
        return lower;
    }
    if let Some(stem) = lower.strip_suffix("ies") {
        return format!("{}y", stem);
    }
    for suffix in ["sses", "shes", "ches", "xes", "zes"] {
        if lower.ends_with(suffix) {
            return lower[..lower.len() - 2].to_string();
        }
    }
    if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
        return lower;
    }
    match lower.strip_suffix('s') {
        Some(stem) => stem.to_string(),
        None => lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_kebab_case() {
        assert!(is_kebab_case("my-squad"));
        assert!(is_kebab_case("a"));
        assert!(is_kebab_case("etl2-loader"));
        assert!(!is_kebab_case("MySquad"));
        assert!(!is_kebab_case("-squad"));
        assert!(!is_kebab_case("squad-"));
        assert!(!is_kebab_case("my--squad"));
        assert!(!is_kebab_case("my_squad"));
        assert!(!is_kebab_case("1squad"));
    }

    #[test]
    fn test_to_kebab_case() {
        assert_eq!(to_kebab_case("Order Management System"), "order-management-system");
        assert_eq!(to_kebab_case("orderManager"), "order-manager");
        assert_eq!(to_kebab_case("  E-Commerce / Orders "), "e-commerce-orders");
        assert_eq!(to_kebab_case("3d printing"), "n-3d-printing");
    }

    #[test]
    fn test_title_and_snake_case() {
        assert_eq!(to_title_case("order-manager"), "Order Manager");
        assert_eq!(to_snake_case("Customer Account"), "customer_account");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("orders"), "order");
        assert_eq!(singularize("inventories"), "inventory");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("status"), "status");
        assert_eq!(singularize("address"), "address");
        assert_eq!(singularize("Payments"), "payment");
    }

    #[test]
    fn test_is_semver() {
        assert!(is_semver("1.0.0"));
        assert!(is_semver("2.1.0-beta.1"));
        assert!(!is_semver("1.0"));
        assert!(!is_semver("v1.0.0"));
    }
}
