/// Characters OCR commonly reads in place of digits. Letters are listed
/// upper case and match either case.
const SUBSTITUTIONS: &[(char, char)] = &[
    ('O', '0'),
    ('Q', '0'),
    ('D', '0'),
    ('I', '1'),
    ('L', '1'),
    ('|', '1'),
    ('!', '1'),
    ('Z', '2'),
    ('S', '5'),
    ('G', '6'),
    ('B', '8'),
];

/// Maps one character through the substitution table.
/// Full-width digits become ASCII digits.
fn substitute(c: char) -> char {
    let key = c.to_ascii_uppercase();
    if let Some(&(_, digit)) = SUBSTITUTIONS.iter().find(|(from, _)| *from == key) {
        return digit;
    }
    match c {
        '\u{FF10}'..='\u{FF19}' => {
            char::from_u32(c as u32 - 0xFF10 + '0' as u32).unwrap_or(c)
        }
        _ => c,
    }
}

/// Cleans an OCR line for number matching.
///
/// Confusable letters become digits, every whitespace run (including the
/// ideographic space) becomes a single space, and the ends are trimmed.
/// The result is only used for searching; callers keep the raw text for
/// display.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;

    for c in raw.chars() {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(substitute(c));
    }

    out
}
