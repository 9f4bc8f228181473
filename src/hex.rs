#![doc = r#"
Hex token parsing for raw MIDI messages.

The textual form of a raw message is whitespace-separated, two-digit hex
byte tokens, e.g. `"90 3C 45"`. [`parse`] turns such text into bytes and
[`render`] is its inverse, producing the canonical uppercase rendering.

No MIDI legality checks happen here; feeding the result to
[`MidiMessage::decode`](crate::message::MidiMessage::decode) is where
status-byte validation lives.
"#]

use thiserror::Error;

/// An error produced while parsing hex byte text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A whitespace-separated token was not exactly two hex digits.
    #[error("invalid hex byte token `{0}`")]
    InvalidToken(String),
}

/// Parses whitespace-separated two-digit hex tokens into a byte sequence.
///
/// Tokens are case-insensitive. Empty input (or all-whitespace input)
/// yields an empty sequence.
///
/// # Example
/// ```rust
/// # use midiwire::hex;
/// let bytes = hex::parse("F0 00 20 08 10 7F 00 01 F7").unwrap();
/// assert_eq!(bytes, [240, 0, 32, 8, 16, 127, 0, 1, 247]);
///
/// assert!(hex::parse("90 3").is_err());
/// ```
pub fn parse(text: &str) -> Result<Vec<u8>, ParseError> {
    text.split_whitespace()
        .map(|token| {
            if token.len() != 2 || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(ParseError::InvalidToken(token.to_owned()));
            }
            u8::from_str_radix(token, 16).map_err(|_| ParseError::InvalidToken(token.to_owned()))
        })
        .collect()
}

/// Renders bytes in the canonical debug form: uppercase, two digits, space
/// separated.
///
/// # Example
/// ```rust
/// # use midiwire::hex;
/// assert_eq!(hex::render(&[0x90, 0x3C, 0x45]), "90 3C 45");
/// assert_eq!(hex::render(&[]), "");
/// ```
pub fn render(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{byte:02X}"));
    }
    out
}

#[test]
fn parses_mixed_case_tokens() {
    assert_eq!(parse("9a Bf 0c").unwrap(), [0x9A, 0xBF, 0x0C]);
}

#[test]
fn empty_input_is_empty_message() {
    assert_eq!(parse("").unwrap(), Vec::<u8>::new());
    assert_eq!(parse("   \t\n").unwrap(), Vec::<u8>::new());
}

#[test]
fn rejects_short_long_and_junk_tokens() {
    assert_eq!(
        parse("90 3"),
        Err(ParseError::InvalidToken("3".to_owned()))
    );
    assert_eq!(
        parse("903C"),
        Err(ParseError::InvalidToken("903C".to_owned()))
    );
    assert_eq!(
        parse("90 G0"),
        Err(ParseError::InvalidToken("G0".to_owned()))
    );
    // `from_str_radix` would accept a sign, the token rule must not
    assert_eq!(
        parse("+9"),
        Err(ParseError::InvalidToken("+9".to_owned()))
    );
}

#[test]
fn render_is_parse_inverse() {
    let bytes = vec![0x00, 0x7F, 0x80, 0xF7, 0xFF];
    assert_eq!(parse(&render(&bytes)).unwrap(), bytes);
}
