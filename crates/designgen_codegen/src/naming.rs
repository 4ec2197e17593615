//! Identifier conventions for generated Rust.

/// Strict, reserved, and edition-2024 keywords.
pub const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for", "if", "impl", "in",
    "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "async", "await", "dyn", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try", "gen",
];

/// Check whether an identifier is a Rust keyword.
pub fn is_keyword(name: &str) -> bool {
    RUST_KEYWORDS.contains(&name)
}

/// Escape Rust keywords by adding the `r#` prefix.
///
/// `self`, `Self`, `super` and `crate` cannot be raw identifiers; they get a trailing underscore instead.
pub fn escape_keyword(name: &str) -> String {
    match name {
        "self" | "Self" | "super" | "crate" => format!("{name}_"),
        _ if is_keyword(name) => format!("r#{name}"),
        _ => name.to_string(),
    }
}

/// Convert a design name (`showAccount`, `show-account`, `Show Account`) to `snake_case`.
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let mut prev_lower = false;

    for ch in s.chars() {
        if ch.is_uppercase() {
            if prev_lower && !result.ends_with('_') {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
            prev_lower = false;
        } else if ch.is_alphanumeric() {
            result.push(ch);
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        } else {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
            prev_lower = false;
        }
    }

    result.trim_end_matches('_').to_string()
}

/// Convert a design name to `PascalCase`.
pub fn to_pascal_case(s: &str) -> String {
    to_snake_case(s)
        .split('_')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("account"), "account");
        assert_eq!(to_snake_case("showAccount"), "show_account");
        assert_eq!(to_snake_case("ShowAccount"), "show_account");
        assert_eq!(to_snake_case("show-account"), "show_account");
        assert_eq!(to_snake_case("Show Account"), "show_account");
        assert_eq!(to_snake_case("HTTPServer"), "httpserver");
        assert_eq!(to_snake_case("v2Api"), "v2_api");
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(to_pascal_case("account"), "Account");
        assert_eq!(to_pascal_case("create_account"), "CreateAccount");
        assert_eq!(to_pascal_case("showAccount"), "ShowAccount");
        assert_eq!(to_pascal_case("bottle-rating"), "BottleRating");
    }

    #[test]
    fn test_escape_keyword() {
        assert_eq!(escape_keyword("type"), "r#type");
        assert_eq!(escape_keyword("gen"), "r#gen");
        assert_eq!(escape_keyword("self"), "self_");
        assert_eq!(escape_keyword("name"), "name");
    }
}
