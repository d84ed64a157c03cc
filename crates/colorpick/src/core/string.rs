use crate::error::{ColorFormatError, CorpusErrorKind};

/// Parse a 24-bit color in hexadecimal format.
///
/// The string must consist of exactly six hexadecimal digits, optionally
/// prefixed with `#`. Digits are case-insensitive.
pub(crate) fn parse_hex(s: &str) -> Result<[u8; 3], ColorFormatError> {
    let digits = s.strip_prefix('#').unwrap_or(s);

    if digits.chars().count() != 6 {
        return Err(ColorFormatError::UnexpectedLength);
    } else if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ColorFormatError::MalformedHex);
    }

    // All characters are ASCII, so byte offsets are character offsets.
    fn parse_coordinate(s: &str, index: usize) -> Result<u8, ColorFormatError> {
        let t = s
            .get(2 * index..2 * (index + 1))
            .ok_or(ColorFormatError::UnexpectedLength)?;
        u8::from_str_radix(t, 16).map_err(|_| ColorFormatError::MalformedHex)
    }

    let c1 = parse_coordinate(digits, 0)?;
    let c2 = parse_coordinate(digits, 1)?;
    let c3 = parse_coordinate(digits, 2)?;
    Ok([c1, c2, c3])
}

const NAME_JUNK: &[char] = &['"', ' ', '\t', '\r', '\n'];
const COLOR_JUNK: &[char] = &['#', '"', ' ', '\t', '\r', '\n'];

/// Parse one line of a color corpus.
///
/// A line either is `name: "#RRGGBB"` or a bare color string, which then also
/// serves as name. Quotes, leading hashes, and white space around the name
/// and color string are ignored. Blank lines and lines starting with `//`
/// yield `None`. A line with more than one colon is rejected, even if the
/// first color string is valid.
pub(crate) fn parse_line(line: &str) -> Result<Option<(String, [u8; 3])>, CorpusErrorKind> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with("//") {
        return Ok(None);
    }

    let mut fields = trimmed.split(':');
    let name = fields.next().unwrap_or(trimmed).trim_matches(NAME_JUNK);
    let color = match fields.next() {
        Some(color) => color,
        None => name,
    };
    // Trailing fields are an error, not silently dropped.
    if fields.next().is_some() {
        return Err(CorpusErrorKind::TooManyFields);
    }

    let rgb = parse_hex(color.trim_matches(COLOR_JUNK)).map_err(CorpusErrorKind::Format)?;
    Ok(Some((name.to_string(), rgb)))
}

/// Format a named color as a corpus line, i.e., `name: "#rrggbb"`.
pub(crate) fn format_line(name: &str, rgb: &[u8; 3]) -> String {
    format!(
        "{}: \"#{:02x}{:02x}{:02x}\"",
        name, rgb[0], rgb[1], rgb[2]
    )
}

// ====================================================================================================================

#[cfg(test)]
mod test {
    use super::{format_line, parse_hex, parse_line};
    use crate::error::{ColorFormatError, CorpusErrorKind};

    #[test]
    fn test_parse_hex() -> Result<(), ColorFormatError> {
        assert_eq!(parse_hex("#112233")?, [0x11_u8, 0x22, 0x33]);
        assert_eq!(parse_hex("aBcDeF")?, [0xab_u8, 0xcd, 0xef]);
        assert_eq!(parse_hex("#123"), Err(ColorFormatError::UnexpectedLength));
        assert_eq!(parse_hex(""), Err(ColorFormatError::UnexpectedLength));
        assert_eq!(
            parse_hex("#1122334"),
            Err(ColorFormatError::UnexpectedLength)
        );
        assert_eq!(parse_hex("#00g000"), Err(ColorFormatError::MalformedHex));
        assert_eq!(parse_hex("+f+f+f"), Err(ColorFormatError::MalformedHex));
        assert_eq!(parse_hex("💩00000"), Err(ColorFormatError::MalformedHex));

        Ok(())
    }

    #[test]
    fn test_parse_line() -> Result<(), CorpusErrorKind> {
        assert_eq!(
            parse_line("  tomato: \"#FF6347\"\n")?,
            Some(("tomato".to_string(), [0xff_u8, 0x63, 0x47]))
        );
        assert_eq!(
            parse_line("\"sky blue\":#87ceeb")?,
            Some(("sky blue".to_string(), [0x87_u8, 0xce, 0xeb]))
        );
        assert_eq!(
            parse_line("00ff7f")?,
            Some(("00ff7f".to_string(), [0x00_u8, 0xff, 0x7f]))
        );
        assert_eq!(parse_line("   ")?, None);
        assert_eq!(parse_line("// reds")?, None);

        assert_eq!(
            parse_line("red: \"#ff00\""),
            Err(CorpusErrorKind::Format(ColorFormatError::UnexpectedLength))
        );
        assert_eq!(
            parse_line("red: \"#ff00zz\""),
            Err(CorpusErrorKind::Format(ColorFormatError::MalformedHex))
        );
        assert_eq!(
            parse_line("red: #ff0000: #00ff00"),
            Err(CorpusErrorKind::TooManyFields)
        );
        assert_eq!(
            parse_line("red: \"#ff0000\":"),
            Err(CorpusErrorKind::TooManyFields)
        );
        assert_eq!(
            parse_line("crimson"),
            Err(CorpusErrorKind::Format(ColorFormatError::UnexpectedLength))
        );

        Ok(())
    }

    #[test]
    fn test_format_line() {
        assert_eq!(
            format_line("tomato", &[0xff, 0x63, 0x47]),
            "tomato: \"#ff6347\""
        );
    }
}
