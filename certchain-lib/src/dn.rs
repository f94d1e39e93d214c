//! Distinguished-name parsing for raw issuer/subject strings.
//!
//! Input is the one-line text form produced by certificate dump tools
//! (`CN=example.com, O=Example\, Inc, C=US`). Only CN, O, OU and C are kept.

use crate::fields::DnAttributes;

/// Parse a raw DN string into its CN/O/OU/C attributes.
///
/// Commas preceded by a backslash belong to the value. Other backslash
/// escapes are removed, except `\XY` hex pairs, which stand for raw bytes
/// and are kept verbatim. Unknown attributes are ignored, and a repeated
/// attribute keeps its last value. Never fails: malformed input simply
/// yields fewer attributes.
pub fn parse_dn(text: &str) -> DnAttributes {
    let mut attrs = DnAttributes::default();

    for segment in split_unescaped_commas(text) {
        let unescaped = segment.replace("\\,", ",");
        let item = strip_escapes(unescaped.trim());

        if let Some(value) = item.strip_prefix("CN=") {
            attrs.cn = Some(value.to_string());
        } else if let Some(value) = item.strip_prefix("O=") {
            attrs.o = Some(value.to_string());
        } else if let Some(value) = item.strip_prefix("C=") {
            attrs.c = Some(value.to_string());
        } else if let Some(value) = item.strip_prefix("OU=") {
            attrs.ou = Some(value.to_string());
        }
    }

    attrs
}

/// Split on commas that are not immediately preceded by a backslash.
fn split_unescaped_commas(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut prev = None;

    for ch in text.chars() {
        if ch == ',' && prev != Some('\\') {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
        prev = Some(ch);
    }
    parts.push(current);
    parts
}

/// Drop backslashes that do not start a two-hex-digit escape.
fn strip_escapes(item: &str) -> String {
    let mut out = String::with_capacity(item.len());
    let mut chars = item.chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            let mut ahead = chars.clone();
            let hex_pair = matches!(
                (ahead.next(), ahead.next()),
                (Some(a), Some(b)) if a.is_ascii_hexdigit() && b.is_ascii_hexdigit()
            );
            if !hex_pair {
                continue;
            }
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_attributes() {
        let dn = parse_dn("CN=example.com, O=Example Inc, OU=IT, C=US");
        assert_eq!(dn.cn(), Some("example.com"));
        assert_eq!(dn.o(), Some("Example Inc"));
        assert_eq!(dn.ou(), Some("IT"));
        assert_eq!(dn.c(), Some("US"));
    }

    #[test]
    fn escaped_comma_stays_in_value() {
        let dn = parse_dn("CN=x, O=Acme\\, Inc, C=US");
        assert_eq!(dn.cn(), Some("x"));
        assert_eq!(dn.o(), Some("Acme, Inc"));
        assert_eq!(dn.c(), Some("US"));
        assert_eq!(dn.ou(), None);
    }

    #[test]
    fn hex_escapes_survive() {
        let dn = parse_dn("CN=GTLSCA - G1,O=\\E8\\A1\\8C\\E6\\94\\BF\\E9\\99\\A2,C=TW");
        assert_eq!(dn.cn(), Some("GTLSCA - G1"));
        assert_eq!(dn.o(), Some("\\E8\\A1\\8C\\E6\\94\\BF\\E9\\99\\A2"));
    }

    #[test]
    fn non_hex_escapes_are_stripped() {
        let dn = parse_dn("O=Foo \\\"Bar\\\", CN=a\\+b");
        assert_eq!(dn.o(), Some("Foo \"Bar\""));
        assert_eq!(dn.cn(), Some("a+b"));
    }

    #[test]
    fn escape_followed_by_single_hex_digit_is_stripped() {
        let dn = parse_dn("CN=a\\Fz");
        assert_eq!(dn.cn(), Some("aFz"));
    }

    #[test]
    fn rfc2253_form_without_spaces() {
        let dn = parse_dn("CN=leaf.example.org,OU=Web,O=Example,C=DE");
        assert_eq!(dn.cn(), Some("leaf.example.org"));
        assert_eq!(dn.ou(), Some("Web"));
        assert_eq!(dn.o(), Some("Example"));
        assert_eq!(dn.c(), Some("DE"));
    }

    #[test]
    fn empty_input_yields_no_attributes() {
        assert!(parse_dn("").is_empty());
    }

    #[test]
    fn unknown_attributes_are_ignored() {
        let dn = parse_dn("L=Berlin, ST=Berlin, emailAddress=a@b.c, CN=host");
        assert_eq!(dn.cn(), Some("host"));
        assert_eq!(dn.o(), None);
        assert_eq!(dn.c(), None);
    }

    #[test]
    fn last_occurrence_wins() {
        let dn = parse_dn("OU=First, OU=Second, CN=a, CN=b");
        assert_eq!(dn.ou(), Some("Second"));
        assert_eq!(dn.cn(), Some("b"));
    }

    #[test]
    fn garbage_does_not_panic() {
        for input in ["\\", ",,,", "=,=", "CN=", "\\\\,\\", "O=\u{e9}\\"] {
            let _ = parse_dn(input);
        }
        assert_eq!(parse_dn("CN=").cn(), Some(""));
    }
}
