use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Runs of characters not allowed in an SPDX element identifier
static INVALID_ID_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-zA-Z0-9\-.]+").expect("identifier pattern is a valid regex")
});

/// Code point recorded for a byte that is not a character on its own
const REPLACEMENT_CODE_POINT: u32 = char::REPLACEMENT_CHARACTER as u32;

/// Turns arbitrary text into a valid SPDX identifier fragment
///
/// Every disallowed run is escaped one byte at a time: an ASCII byte becomes
/// `C<code point>` and each byte of a multi-byte character becomes
/// `C65533`, so `é` yields two escape segments.
///
/// # Examples
/// ```
/// use layercraft::layer_build::services::sanitize_identifier;
///
/// assert_eq!(sanitize_identifier("Hello World!"), "HelloC32WorldC33");
/// ```
pub fn sanitize_identifier(input: &str) -> String {
    INVALID_ID_CHARS
        .replace_all(input, |caps: &Captures| {
            caps[0]
                .bytes()
                .map(|byte| {
                    let code = if byte.is_ascii() {
                        u32::from(byte)
                    } else {
                        REPLACEMENT_CODE_POINT
                    };
                    format!("C{}", code)
                })
                .collect::<String>()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_characters_are_untouched() {
        assert_eq!(
            sanitize_identifier("SPDXRef-Package-busybox-1.36.1-r2"),
            "SPDXRef-Package-busybox-1.36.1-r2"
        );
    }

    #[test]
    fn test_hello_world() {
        assert_eq!(sanitize_identifier("Hello World!"), "HelloC32WorldC33");
    }

    #[test]
    fn test_run_is_escaped_per_byte() {
        assert_eq!(sanitize_identifier("a  b"), "aC32C32b");
    }

    #[test]
    fn test_multibyte_character_is_escaped_per_byte() {
        assert_eq!(sanitize_identifier("é"), "C65533C65533");
        assert_eq!(sanitize_identifier("café"), "cafC65533C65533");
    }

    #[test]
    fn test_digest_colon() {
        assert_eq!(
            sanitize_identifier("SPDXRef-Package-sha256:abc"),
            "SPDXRef-Package-sha256C58abc"
        );
    }

    #[test]
    fn test_is_pure() {
        let input = "ghcr.io/org/image@sha256:0f";
        assert_eq!(sanitize_identifier(input), sanitize_identifier(input));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize_identifier(""), "");
    }
}
