//! Parser utility functions - literal decoding

/// Decode a numeric literal (decimal, exponent, hex, octal, binary) to its value
pub fn parse_number(text: &str) -> Option<f64> {
    let radix_digits = |prefix_len: usize, radix: u32| {
        u64::from_str_radix(&text[prefix_len..], radix)
            .ok()
            .map(|n| n as f64)
    };
    let lower = text.to_ascii_lowercase();
    if lower.starts_with("0x") {
        return radix_digits(2, 16);
    }
    if lower.starts_with("0o") {
        return radix_digits(2, 8);
    }
    if lower.starts_with("0b") {
        return radix_digits(2, 2);
    }
    text.parse::<f64>().ok()
}

/// Decode the body of a quoted string literal (quotes already stripped)
///
/// Returns `None` on a malformed escape sequence.
pub fn unescape_string(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = chars.next()?;
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            'x' => {
                let hex: String = chars.by_ref().take(2).collect();
                out.push(decode_code_point(&hex, 2)?);
            }
            'u' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    let hex: String = chars.by_ref().take_while(|&c| c != '}').collect();
                    out.push(decode_code_point(&hex, hex.len().max(1))?);
                } else {
                    let hex: String = chars.by_ref().take(4).collect();
                    out.push(decode_code_point(&hex, 4)?);
                }
            }
            // Line continuation
            '\n' => {}
            other => out.push(other),
        }
    }
    Some(out)
}

fn decode_code_point(hex: &str, expected_len: usize) -> Option<char> {
    if hex.is_empty() || hex.len() != expected_len {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}
