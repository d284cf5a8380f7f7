//! Go literal syntax checks.
//!
//! Only as much of `strconv.Unquote` as template parsing needs: escapes are
//! validated and decoded, numbers are left to the lexer.

/// Decodes a `"..."` or `` `...` `` literal. `None` on invalid syntax.
pub fn unquote(text: &str) -> Option<String> {
    if let Some(raw) = text.strip_prefix('`') {
        let body = raw.strip_suffix('`')?;
        return Some(body.replace('\r', ""));
    }
    let body = text.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' | '\n' => return None,
            '\\' => out.push(unescape(&mut chars, '"')?),
            c => out.push(c),
        }
    }
    Some(out)
}

/// Whether a `'x'` literal holds exactly one character.
pub fn is_char_constant(text: &str) -> bool {
    let Some(body) = text.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) else {
        return false;
    };
    let mut chars = body.chars();
    let valid = match chars.next() {
        Some('\\') => unescape(&mut chars, '\'').is_some(),
        Some('\'') | None => false,
        Some(_) => true,
    };
    valid && chars.next().is_none()
}

fn unescape(chars: &mut std::str::Chars<'_>, quote: char) -> Option<char> {
    let c = chars.next()?;
    let decoded = match c {
        'a' => '\u{07}',
        'b' => '\u{08}',
        'f' => '\u{0C}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\u{0B}',
        '\\' => '\\',
        c if c == quote => c,
        'x' => return hex(chars, 2),
        'u' => return hex(chars, 4),
        'U' => return hex(chars, 8),
        '0'..='7' => {
            let mut value = c.to_digit(8)?;
            for _ in 0..2 {
                value = value * 8 + chars.next()?.to_digit(8)?;
            }
            return (value <= 255).then(|| char::from(value as u8));
        }
        _ => return None,
    };
    Some(decoded)
}

fn hex(chars: &mut std::str::Chars<'_>, digits: usize) -> Option<char> {
    let mut value = 0u32;
    for _ in 0..digits {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    char::from_u32(value)
}
