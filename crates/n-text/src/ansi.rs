// SPDX-License-Identifier: MIT
//
// ANSI escape sequences in both directions.
//
// Encoding: pure functions that write SGR sequences to any `fmt::Write`.
// No state and no decisions about when to emit; that belongs to the serializer
// in `styled.rs`. This module just knows the byte-level encoding.
//
// Decoding: `apply_sgr` folds the parameters of one `CSI ... m` sequence
// into a `Style`, and `escape_len` / `strip_ansi` find and remove escape
// sequences so width measurement never counts them.

use std::borrow::Cow;
use std::fmt::{self, Write};

use crate::style::{Attr, Color, Style, UnderlineStyle};

const ESC: char = '\x1b';

// ─── Encoding ────────────────────────────────────────────────────────────────

/// Reset all SGR attributes to terminal defaults (SGR 0).
#[inline]
pub fn reset(w: &mut impl Write) -> fmt::Result {
    w.write_str("\x1b[0m")
}

/// Set the foreground color.
///
/// Compact codes for the 16 standard colors (30–37, 90–97), the 256-color
/// form for indices 16–255, and 24-bit `TrueColor` for RGB.
pub fn fg(w: &mut impl Write, color: Color) -> fmt::Result {
    match color {
        Color::Default => w.write_str("\x1b[39m"),
        Color::Ansi256(idx) => {
            if idx < 8 {
                write!(w, "\x1b[{}m", 30 + u16::from(idx))
            } else if idx < 16 {
                write!(w, "\x1b[{}m", 82 + u16::from(idx))
            } else {
                write!(w, "\x1b[38;5;{idx}m")
            }
        }
        Color::Rgb(r, g, b) => write!(w, "\x1b[38;2;{r};{g};{b}m"),
    }
}

/// Set the background color (40–47, 100–107, 48;5;N, 48;2;R;G;B).
pub fn bg(w: &mut impl Write, color: Color) -> fmt::Result {
    match color {
        Color::Default => w.write_str("\x1b[49m"),
        Color::Ansi256(idx) => {
            if idx < 8 {
                write!(w, "\x1b[{}m", 40 + u16::from(idx))
            } else if idx < 16 {
                write!(w, "\x1b[{}m", 92 + u16::from(idx))
            } else {
                write!(w, "\x1b[48;5;{idx}m")
            }
        }
        Color::Rgb(r, g, b) => write!(w, "\x1b[48;2;{r};{g};{b}m"),
    }
}

/// Emit SGR codes for text attributes as a single CSI sequence.
///
/// Multiple attributes are semicolon-separated: `\x1b[1;3;9m` for
/// bold + italic + strikethrough. Does nothing if no attributes are set.
pub fn attrs(w: &mut impl Write, attr: Attr) -> fmt::Result {
    if attr.is_empty() {
        return Ok(());
    }

    const CODES: [(Attr, &str); 8] = [
        (Attr::BOLD, "1"),
        (Attr::DIM, "2"),
        (Attr::ITALIC, "3"),
        (Attr::SLOW_BLINK, "5"),
        (Attr::RAPID_BLINK, "6"),
        (Attr::INVERSE, "7"),
        (Attr::HIDDEN, "8"),
        (Attr::STRIKETHROUGH, "9"),
    ];

    w.write_str("\x1b[")?;
    let mut first = true;
    for (flag, code) in CODES {
        if attr.contains(flag) {
            if !first {
                w.write_char(';')?;
            }
            w.write_str(code)?;
            first = false;
        }
    }
    w.write_char('m')
}

/// Set the underline style using the `SGR 4:N` colon syntax.
/// `None` disables underline via SGR 24.
pub fn underline(w: &mut impl Write, style: UnderlineStyle) -> fmt::Result {
    match style {
        UnderlineStyle::None => w.write_str("\x1b[24m"),
        UnderlineStyle::Straight => w.write_str("\x1b[4:1m"),
        UnderlineStyle::Double => w.write_str("\x1b[4:2m"),
        UnderlineStyle::Curly => w.write_str("\x1b[4:3m"),
        UnderlineStyle::Dotted => w.write_str("\x1b[4:4m"),
        UnderlineStyle::Dashed => w.write_str("\x1b[4:5m"),
    }
}

// ─── Sequence Scanning ───────────────────────────────────────────────────────

/// Byte length of the escape sequence at the start of `s`.
///
/// `s` must start with ESC. Handles CSI (`ESC [` params final), OSC
/// (`ESC ]` ... BEL or ST), and two-character escapes. An unterminated
/// sequence runs to the end of `s`. The returned length always lands on a
/// char boundary.
#[must_use]
pub fn escape_len(s: &str) -> usize {
    let b = s.as_bytes();
    debug_assert_eq!(b.first(), Some(&0x1B));
    if b.len() < 2 {
        return b.len();
    }

    match b[1] {
        b'[' => {
            for (i, &byte) in b.iter().enumerate().skip(2) {
                if (0x40..=0x7E).contains(&byte) {
                    return i + 1;
                }
                if !(0x20..=0x3F).contains(&byte) {
                    // Malformed: stop before the offending byte.
                    return i;
                }
            }
            b.len()
        }
        b']' => {
            let mut i = 2;
            while i < b.len() {
                match b[i] {
                    0x07 => return i + 1,
                    0x1B if b.get(i + 1) == Some(&b'\\') => return i + 2,
                    _ => i += 1,
                }
            }
            b.len()
        }
        _ => 1 + s[1..].chars().next().map_or(0, char::len_utf8),
    }
}

/// Remove every escape sequence from `s`.
///
/// Borrows when there is nothing to strip.
#[must_use]
pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.contains(ESC) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find(ESC) {
        out.push_str(&rest[..pos]);
        let len = escape_len(&rest[pos..]);
        rest = &rest[pos + len..];
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// If `seq` is a complete SGR sequence (`ESC [ params m`), return its
/// parameter string.
#[must_use]
pub fn sgr_params(seq: &str) -> Option<&str> {
    seq.strip_prefix("\x1b[")?.strip_suffix('m')
}

// ─── SGR Decoding ────────────────────────────────────────────────────────────

/// Fold the parameters of one SGR sequence into `style`.
///
/// `params` is the text between `ESC [` and `m`: `"1;31"`,
/// `"38;2;10;20;30"`, `"4:3"`. An empty string means SGR 0. Unknown codes
/// are ignored.
pub fn apply_sgr(style: &mut Style, params: &str) {
    let parts: Vec<&str> = params.split(';').collect();
    let mut i = 0;

    while i < parts.len() {
        let mut sub = parts[i].split(':');
        let head = sub.next().unwrap_or("");
        let code = if head.is_empty() { Some(0) } else { head.parse::<u16>().ok() };
        i += 1;

        let Some(code) = code else { continue };

        match code {
            0 => *style = Style::PLAIN,
            1 => style.attrs.insert(Attr::BOLD),
            2 => style.attrs.insert(Attr::DIM),
            3 => style.attrs.insert(Attr::ITALIC),
            4 => {
                style.underline = sub
                    .next()
                    .and_then(|n| n.parse::<u16>().ok())
                    .map_or(UnderlineStyle::Straight, UnderlineStyle::from_param);
            }
            5 => style.attrs.insert(Attr::SLOW_BLINK),
            6 => style.attrs.insert(Attr::RAPID_BLINK),
            7 => style.attrs.insert(Attr::INVERSE),
            8 => style.attrs.insert(Attr::HIDDEN),
            9 => style.attrs.insert(Attr::STRIKETHROUGH),
            21 => style.underline = UnderlineStyle::Double,
            22 => style.attrs.remove(Attr::BOLD | Attr::DIM),
            23 => style.attrs.remove(Attr::ITALIC),
            24 => style.underline = UnderlineStyle::None,
            25 => style.attrs.remove(Attr::SLOW_BLINK | Attr::RAPID_BLINK),
            27 => style.attrs.remove(Attr::INVERSE),
            28 => style.attrs.remove(Attr::HIDDEN),
            29 => style.attrs.remove(Attr::STRIKETHROUGH),
            #[allow(clippy::cast_possible_truncation)]
            30..=37 => style.fg = Color::Ansi256((code - 30) as u8),
            38 => {
                let colon: Vec<&str> = sub.collect();
                let (color, used) = extended_color(&colon, &parts[i..]);
                i += used;
                if let Some(color) = color {
                    style.fg = color;
                }
            }
            39 => style.fg = Color::Default,
            #[allow(clippy::cast_possible_truncation)]
            40..=47 => style.bg = Color::Ansi256((code - 40) as u8),
            48 => {
                let colon: Vec<&str> = sub.collect();
                let (color, used) = extended_color(&colon, &parts[i..]);
                i += used;
                if let Some(color) = color {
                    style.bg = color;
                }
            }
            49 => style.bg = Color::Default,
            #[allow(clippy::cast_possible_truncation)]
            90..=97 => style.fg = Color::Ansi256((code - 90 + 8) as u8),
            #[allow(clippy::cast_possible_truncation)]
            100..=107 => style.bg = Color::Ansi256((code - 100 + 8) as u8),
            _ => {}
        }
    }
}

/// Decode the color of a `38`/`48` parameter.
///
/// Colon form (`38:5:N`, `38:2:R:G:B`, `38:2:CS:R:G:B`) lives entirely in
/// `colon`; semicolon form consumes the following parameters from `rest`.
/// Returns the color (if well-formed) and how many of `rest` were used.
fn extended_color(colon: &[&str], rest: &[&str]) -> (Option<Color>, usize) {
    fn byte(s: &str) -> Option<u8> {
        s.parse().ok()
    }

    if !colon.is_empty() {
        let color = match colon[0] {
            "5" => colon.get(1).and_then(|n| byte(n)).map(Color::Ansi256),
            "2" => {
                let rgb = if colon.len() >= 5 { &colon[colon.len() - 3..] } else { &colon[1..] };
                match rgb {
                    [r, g, b, ..] => Some(Color::Rgb(
                        byte(r).unwrap_or(0),
                        byte(g).unwrap_or(0),
                        byte(b).unwrap_or(0),
                    )),
                    _ => None,
                }
            }
            _ => None,
        };
        return (color, 0);
    }

    match rest.first().copied() {
        Some("5") => (rest.get(1).and_then(|n| byte(n)).map(Color::Ansi256), 2.min(rest.len())),
        Some("2") if rest.len() >= 4 => {
            let color = match (byte(rest[1]), byte(rest[2]), byte(rest[3])) {
                (Some(r), Some(g), Some(b)) => Some(Color::Rgb(r, g, b)),
                _ => None,
            };
            (color, 4)
        }
        Some("2") => (None, rest.len()),
        _ => (None, 0),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
