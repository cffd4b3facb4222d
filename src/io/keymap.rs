/// Map a raw key name to the symbol the layouts use.
///
/// Single characters are lower-cased and named keys (`F3`, `Tab`) are
/// lower-cased whole. On Spanish layouts the acute dead key arrives as
/// `Dead` or as one of several accent characters; all of them become `´`.
/// `[` sits where `{` is printed and is folded into it.
pub fn normalize_key(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    if raw == "Dead" {
        return Some("´".to_string());
    }

    let mut chars = raw.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return Some(raw.to_lowercase());
    };

    let folded = match c {
        '[' => "{".to_string(),
        '\'' | '`' | '¨' | '´' => "´".to_string(),
        c if c.is_whitespace() => return None,
        c => c.to_lowercase().collect(),
    };
    Some(folded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_are_lower_cased() {
        assert_eq!(normalize_key("A").as_deref(), Some("a"));
        assert_eq!(normalize_key("Ñ").as_deref(), Some("ñ"));
        assert_eq!(normalize_key(",").as_deref(), Some(","));
    }

    #[test]
    fn named_keys_are_lower_cased() {
        assert_eq!(normalize_key("F3").as_deref(), Some("f3"));
        assert_eq!(normalize_key("f8").as_deref(), Some("f8"));
    }

    #[test]
    fn accent_variants_fold_to_acute() {
        for raw in ["Dead", "'", "`", "¨", "´"] {
            assert_eq!(normalize_key(raw).as_deref(), Some("´"), "{raw}");
        }
    }

    #[test]
    fn bracket_folds_to_brace() {
        assert_eq!(normalize_key("[").as_deref(), Some("{"));
        assert_eq!(normalize_key("{").as_deref(), Some("{"));
    }

    #[test]
    fn blank_keys_have_no_symbol() {
        assert_eq!(normalize_key(""), None);
        assert_eq!(normalize_key(" "), None);
    }
}
