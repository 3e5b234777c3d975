//! Brace aware helpers for raw BibTeX values.

use std::{iter::Peekable, str::Chars};

/// Converts a raw BibTeX value to plain UTF-8 text.
///
/// Protective braces are removed, the common LaTeX accent commands and escapes are converted,
/// `~` becomes a space, `---`/`--` become an em/en dash and whitespace runs are collapsed.
pub(crate) fn clean(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' | '}' => {}
            '~' => out.push(' '),
            '\\' => push_command(&mut out, &mut chars),
            c => out.push(c),
        }
    }

    let out = out.replace("---", "\u{2014}").replace("--", "\u{2013}");
    collapse_whitespace(&out)
}

/// Removes the braces from a raw value without touching anything else.
///
/// Used for identifiers such as DOIs and URLs where LaTeX conversion would corrupt the value.
pub(crate) fn literal(raw: &str) -> String {
    let stripped = raw.replace(['{', '}'], "");
    collapse_whitespace(&stripped)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_command(out: &mut String, chars: &mut Peekable<Chars<'_>>) {
    match chars.next() {
        Some(mark @ ('"' | '\'' | '`' | '^' | '~' | '=' | '.')) => push_accented(out, mark, chars),
        Some(c) if c.is_ascii_alphabetic() => {
            let mut name = String::from(c);
            while let Some(&next) = chars.peek() {
                if !next.is_ascii_alphabetic() {
                    break;
                }
                name.push(next);
                chars.next();
            }

            // control words eat a single following space
            if chars.peek() == Some(&' ') {
                chars.next();
            }

            match name.as_str() {
                "c" | "v" | "u" | "H" | "k" | "r" => {
                    let mark = name.chars().next().unwrap_or_default();
                    push_accented(out, mark, chars);
                }
                "ss" => out.push('ß'),
                "o" => out.push('ø'),
                "O" => out.push('Ø'),
                "aa" => out.push('å'),
                "AA" => out.push('Å'),
                "ae" => out.push('æ'),
                "AE" => out.push('Æ'),
                "oe" => out.push('œ'),
                "OE" => out.push('Œ'),
                "l" => out.push('ł'),
                "L" => out.push('Ł'),
                "i" => out.push('i'),
                _ => out.push_str(&name),
            }
        }
        // escaped characters such as \& \% \_ \{ are kept literally
        Some(c) => out.push(c),
        None => {}
    }
}

fn push_accented(out: &mut String, mark: char, chars: &mut Peekable<Chars<'_>>) {
    while chars.peek() == Some(&' ') {
        chars.next();
    }

    let braced = chars.peek() == Some(&'{');
    if braced {
        chars.next();
    }

    let letter = match chars.next() {
        // dotless i/j under an accent: \'{\i}
        Some('\\') => match chars.next() {
            Some(c) => c,
            None => return,
        },
        Some('{' | '}') | None => return,
        Some(c) => c,
    };

    if braced && chars.peek() == Some(&'}') {
        chars.next();
    }

    out.push(accent(mark, letter).unwrap_or(letter));
}

fn accent(mark: char, letter: char) -> Option<char> {
    let (plain, accented) = match mark {
        '"' => ("aeiouyAEIOUY", "äëïöüÿÄËÏÖÜŸ"),
        '\'' => ("aeiouycnszAEIOUYCNSZ", "áéíóúýćńśźÁÉÍÓÚÝĆŃŚŹ"),
        '`' => ("aeiouAEIOU", "àèìòùÀÈÌÒÙ"),
        '^' => ("aeiouAEIOU", "âêîôûÂÊÎÔÛ"),
        '~' => ("anoANO", "ãñõÃÑÕ"),
        '=' => ("aeiou", "āēīōū"),
        '.' => ("zZ", "żŻ"),
        'c' => ("csCS", "çşÇŞ"),
        'v' => ("cszrenCSZREN", "čšžřěňČŠŽŘĚŇ"),
        'u' => ("agAG", "ăğĂĞ"),
        'H' => ("oOuU", "őŐűŰ"),
        'k' => ("aeAE", "ąęĄĘ"),
        'r' => ("uUaA", "ůŮåÅ"),
        _ => return None,
    };

    plain
        .chars()
        .position(|c| c == letter)
        .and_then(|i| accented.chars().nth(i))
}

/// Splits `s` on every character matching `is_sep` that is not inside braces.
///
/// Escaped characters (`\{`) never change the brace depth. Empty parts are kept.
pub(crate) fn split_top_level(s: &str, is_sep: impl Fn(char) -> bool) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0_usize;
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            c if depth == 0 && is_sep(c) => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }

    parts.push(&s[start..]);
    parts
}

/// Splits `s` into the words found at brace depth zero.
pub(crate) fn words(s: &str) -> Vec<&str> {
    split_top_level(s, char::is_whitespace)
        .into_iter()
        .filter(|w| !w.is_empty())
        .collect()
}

/// Returns true when the whole of `s` is wrapped in a single pair of braces, such as
/// `{World Health Organization}`.
pub(crate) fn is_fully_braced(s: &str) -> bool {
    if !s.starts_with('{') || !s.ends_with('}') {
        return false;
    }

    let mut depth = 0_usize;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i + 1 == s.len();
                }
            }
            _ => {}
        }
    }
    false
}

/// Returns true when a word starts with a lowercase letter at brace depth zero, which is how
/// BibTeX recognises name particles such as `van` or `de`.
pub(crate) fn starts_lowercase(word: &str) -> bool {
    word.chars().next().map_or(false, char::is_lowercase)
}
