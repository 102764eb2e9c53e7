use std::sync::LazyLock;

use regex::Regex;

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
        .expect("valid regex")
});

/// `rgb()`, `rgba()`, `hsl()` and `hsla()` with purely numeric arguments.
static FUNCTIONAL_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:rgba?|hsla?)\([0-9\s,%.+\-]*\)$").expect("valid regex")
});

static KEYWORD_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]+$").expect("valid regex"));

/// Returns `true` if `value` is a color safe to place in a synthesized
/// `style="color: ...;"` declaration.
///
/// Accepts hex colors (3, 4, 6 or 8 digits), `rgb[a]()` / `hsl[a]()` with
/// numeric arguments, and bare alphabetic keywords. Surrounding whitespace is
/// ignored.
#[must_use]
pub fn is_valid_editorial_color(value: &str) -> bool {
    let value = value.trim();
    HEX_COLOR.is_match(value) || FUNCTIONAL_COLOR.is_match(value) || KEYWORD_COLOR.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_hex() {
        for value in ["#fff", "#ffff", "#1d4ed8", "#1D4ED8CC"] {
            assert!(is_valid_editorial_color(value), "{value}");
        }
    }

    #[test]
    fn rejects_malformed_hex() {
        for value in ["#ff", "#fffff", "#1234567", "#ggg", "1d4ed8", "#"] {
            assert!(!is_valid_editorial_color(value), "{value}");
        }
    }

    #[test]
    fn accepts_functional_forms() {
        for value in [
            "rgb(29, 78, 216)",
            "rgba(29,78,216,0.5)",
            "RGB(10%, 20%, 30%)",
            "hsl(220, 80%, 48%)",
            "hsla(-20, +80%, 48.5%, .3)",
        ] {
            assert!(is_valid_editorial_color(value), "{value}");
        }
    }

    #[test]
    fn rejects_functional_with_non_numeric_arguments() {
        for value in [
            "rgb(var(--x))",
            "rgb(1,2,3) ;",
            "hsl(calc(1 + 2), 1%, 1%)",
            "rgb(1 2 3 / 50%)",
            "lab(50% 40 59)",
        ] {
            assert!(!is_valid_editorial_color(value), "{value}");
        }
    }

    #[test]
    fn accepts_keywords() {
        assert!(is_valid_editorial_color("red"));
        assert!(is_valid_editorial_color("RebeccaPurple"));
        assert!(is_valid_editorial_color("  teal  "));
    }

    #[test]
    fn rejects_injection_attempts() {
        for value in [
            "red;}body{display:none",
            "red; background: url(x)",
            "url(javascript:alert(1))",
            "expression(alert(1))",
            "red!important",
            "",
            "   ",
        ] {
            assert!(!is_valid_editorial_color(value), "{value}");
        }
    }
}
