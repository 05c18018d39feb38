// SPDX-License-Identifier: MIT
//
// Keypress classification.
//
// The decoder only promises atomic tokens. This module gives them
// meaning: which key, which modifiers, press or release. It understands
// the encodings terminals actually send:
//
// - Legacy CSI (`ESC [ A`, `ESC [ 1 ; 5 C`, `ESC [ 3 ~`)
// - Linux console function keys (`ESC [ [ A` .. `ESC [ [ E`)
// - rxvt shifted arrows (`ESC [ a`) and ctrl arrows (`ESC O a`)
// - SS3 (`ESC O P`)
// - Kitty keyboard protocol (`CSI codepoint ; modifiers : event u`)
// - Meta prefix (`ESC` + anything), nesting included
// - C0 control bytes as Ctrl+letter
//
// Number parsing is done directly on `&[u8]`.

use bitflags::bitflags;
use unicode_segmentation::UnicodeSegmentation;

use crate::input::{Decoder, Token};

// ─── Event Types ────────────────────────────────────────────────────────────

/// A keyboard event with key identity, modifiers, and press state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Which key was pressed.
    pub code: KeyCode,
    /// Active modifier keys.
    pub modifiers: Modifiers,
    /// Press, repeat, or release (Kitty keyboard protocol).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A press of `code` with `modifiers`.
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self {
            code,
            modifiers,
            kind: KeyEventKind::Press,
        }
    }
}

/// Key press / repeat / release distinction.
///
/// Only the Kitty protocol reports repeat and release; everything else
/// is a [`Press`](KeyEventKind::Press).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

/// Identity of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A Unicode character.
    Char(char),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// Keypad 5 with Num Lock off.
    Clear,
    // ── Function keys ───────────────────────────────────────────
    /// F1 through F35.
    F(u8),
    // ── Lock keys (Kitty protocol) ──────────────────────────────
    CapsLock,
    ScrollLock,
    NumLock,
    PrintScreen,
    Pause,
    Menu,
}

bitflags! {
    /// Keyboard modifier flags.
    ///
    /// Matches the Kitty keyboard protocol bitmask (also the xterm CSI
    /// modifier encoding, where `param = 1 + bitmask`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
        const SUPER = 0b0000_1000;
        const HYPER = 0b0001_0000;
        const META  = 0b0010_0000;
    }
}

// ─── Classification ─────────────────────────────────────────────────────────

/// Classify one resolved key token: an escape sequence or a single
/// grapheme cluster.
///
/// Returns `None` for sequences that are not keys (focus reports, mouse,
/// unknown CSI) and for multi-codepoint clusters, which have no
/// [`KeyCode`].
///
/// ```
/// use n_term::keypress::{parse_keypress, KeyCode, Modifiers};
///
/// let key = parse_keypress("\x1b[1;5C").unwrap();
/// assert_eq!(key.code, KeyCode::Right);
/// assert_eq!(key.modifiers, Modifiers::CTRL);
/// ```
#[must_use]
pub fn parse_keypress(token: &str) -> Option<KeyEvent> {
    let bytes = token.as_bytes();
    match bytes {
        [] => None,
        [0x1B] => Some(KeyEvent::new(KeyCode::Escape, Modifiers::empty())),
        [0x1B, b'[', ..] => parse_csi(&bytes[2..]),
        [0x1B, b'O', rest @ ..] => parse_ss3(rest),
        [0x1B, ..] => {
            // Meta prefix: whatever follows, with Alt held.
            let mut key = parse_keypress(&token[1..])?;
            key.modifiers |= Modifiers::ALT;
            Some(key)
        }
        _ => parse_char(token),
    }
}

/// A single codepoint, including C0 controls.
#[allow(clippy::cast_possible_truncation)]
fn parse_char(token: &str) -> Option<KeyEvent> {
    let mut chars = token.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }

    let key = match c {
        '\r' | '\n' => KeyEvent::new(KeyCode::Enter, Modifiers::empty()),
        '\t' => KeyEvent::new(KeyCode::Tab, Modifiers::empty()),
        '\x08' | '\x7F' => KeyEvent::new(KeyCode::Backspace, Modifiers::empty()),
        '\0' => KeyEvent::new(KeyCode::Char(' '), Modifiers::CTRL),
        c @ '\x01'..='\x1A' => {
            let letter = char::from(c as u8 - 1 + b'a');
            KeyEvent::new(KeyCode::Char(letter), Modifiers::CTRL)
        }
        c @ '\x1C'..='\x1F' => {
            let symbol = char::from(c as u8 - 0x1C + b'4');
            KeyEvent::new(KeyCode::Char(symbol), Modifiers::CTRL)
        }
        c => KeyEvent::new(KeyCode::Char(c), Modifiers::empty()),
    };
    Some(key)
}

// ── CSI ─────────────────────────────────────────────────────────────────────

fn parse_csi(body: &[u8]) -> Option<KeyEvent> {
    let (&final_byte, params_raw) = body.split_last()?;

    // Linux console: ESC [ [ A .. ESC [ [ E are F1..F5.
    if params_raw == b"[" {
        return match final_byte {
            b'A'..=b'E' => Some(KeyEvent::new(KeyCode::F(final_byte - b'A' + 1), Modifiers::empty())),
            _ => None,
        };
    }

    let params = parse_csi_params(params_raw);
    let modifiers = params
        .get(1)
        .map_or(Modifiers::empty(), |p| decode_modifiers(p.0));

    match final_byte {
        b'~' => {
            let first = params.first().map_or(0, |p| p.0);
            tilde_key(first).map(|code| KeyEvent::new(code, modifiers))
        }
        b'u' => Some(parse_kitty_key(&params)),
        b'Z' => Some(KeyEvent::new(KeyCode::Tab, Modifiers::SHIFT | modifiers)),
        // rxvt: lower-case final means Shift.
        b'a'..=b'd' => letter_key(final_byte.to_ascii_uppercase())
            .map(|code| KeyEvent::new(code, Modifiers::SHIFT)),
        b => letter_key(b).map(|code| KeyEvent::new(code, modifiers)),
    }
}

/// Keys addressed by number in `CSI n ~`.
const fn tilde_key(n: u32) -> Option<KeyCode> {
    let code = match n {
        1 | 7 => KeyCode::Home,
        2 => KeyCode::Insert,
        3 => KeyCode::Delete,
        4 | 8 => KeyCode::End,
        5 => KeyCode::PageUp,
        6 => KeyCode::PageDown,
        // rxvt F1..F4.
        11 => KeyCode::F(1),
        12 => KeyCode::F(2),
        13 => KeyCode::F(3),
        14 => KeyCode::F(4),
        15 => KeyCode::F(5),
        17 => KeyCode::F(6),
        18 => KeyCode::F(7),
        19 => KeyCode::F(8),
        20 => KeyCode::F(9),
        21 => KeyCode::F(10),
        23 => KeyCode::F(11),
        24 => KeyCode::F(12),
        25 => KeyCode::F(13),
        26 => KeyCode::F(14),
        28 => KeyCode::F(15),
        29 => KeyCode::F(16),
        31 => KeyCode::F(17),
        32 => KeyCode::F(18),
        33 => KeyCode::F(19),
        34 => KeyCode::F(20),
        _ => return None,
    };
    Some(code)
}

/// Keys addressed by final letter, shared by CSI and SS3.
const fn letter_key(b: u8) -> Option<KeyCode> {
    let code = match b {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'E' => KeyCode::Clear,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        _ => return None,
    };
    Some(code)
}

// ── SS3 ─────────────────────────────────────────────────────────────────────

fn parse_ss3(rest: &[u8]) -> Option<KeyEvent> {
    match rest {
        [b'M'] => Some(KeyEvent::new(KeyCode::Enter, Modifiers::empty())),
        // rxvt: lower-case final means Ctrl.
        [b @ b'a'..=b'd'] => letter_key(b.to_ascii_uppercase())
            .map(|code| KeyEvent::new(code, Modifiers::CTRL)),
        [b] => letter_key(*b).map(|code| KeyEvent::new(code, Modifiers::empty())),
        _ => None,
    }
}

// ── Kitty Keyboard Protocol ─────────────────────────────────────────────────

fn parse_kitty_key(params: &[CsiParam]) -> KeyEvent {
    // Format: CSI codepoint [; modifiers[:event_type]] u
    let codepoint = params.first().map_or(0, |p| p.0);
    let (modifier_val, event_type) = params.get(1).map_or((0, 0), |p| (p.0, p.1));

    let kind = match event_type {
        2 => KeyEventKind::Repeat,
        3 => KeyEventKind::Release,
        _ => KeyEventKind::Press,
    };

    KeyEvent {
        code: kitty_codepoint_to_keycode(codepoint),
        modifiers: decode_modifiers(modifier_val),
        kind,
    }
}

/// Map a Kitty keyboard protocol codepoint to `KeyCode`.
///
/// Functional keys live in the Private Use Area from 57344.
fn kitty_codepoint_to_keycode(cp: u32) -> KeyCode {
    match cp {
        27 | 57344 => KeyCode::Escape,
        13 | 57345 => KeyCode::Enter,
        9 | 57346 => KeyCode::Tab,
        127 | 57347 => KeyCode::Backspace,
        57348 => KeyCode::Insert,
        57349 => KeyCode::Delete,
        57350 => KeyCode::Left,
        57351 => KeyCode::Right,
        57352 => KeyCode::Up,
        57353 => KeyCode::Down,
        57354 => KeyCode::PageUp,
        57355 => KeyCode::PageDown,
        57356 => KeyCode::Home,
        57357 => KeyCode::End,
        57358 => KeyCode::CapsLock,
        57359 => KeyCode::ScrollLock,
        57360 => KeyCode::NumLock,
        57361 => KeyCode::PrintScreen,
        57362 => KeyCode::Pause,
        57363 => KeyCode::Menu,
        // F1–F35; the range guarantees the result fits in u8.
        #[allow(clippy::cast_possible_truncation)]
        cp @ 57364..=57398 => KeyCode::F((cp - 57364 + 1) as u8),
        cp => char::from_u32(cp).map_or(KeyCode::Char('\0'), KeyCode::Char),
    }
}

// ─── Parameters ─────────────────────────────────────────────────────────────

/// CSI parameter: `(main_value, colon_sub_parameter)`.
#[derive(Debug, PartialEq, Eq)]
struct CsiParam(u32, u32);

/// Parse semicolon-separated CSI parameters with optional colon sub-params.
///
/// - `1;2` → `[(1,0), (2,0)]`
/// - `97;5:2` → `[(97,0), (5,2)]`
/// - (empty) → `[]`
fn parse_csi_params(raw: &[u8]) -> Vec<CsiParam> {
    if raw.is_empty() {
        return Vec::new();
    }

    raw.split(|&b| b == b';')
        .map(|field| {
            let mut parts = field.splitn(2, |&b| b == b':');
            let main = parts.next().map_or(0, parse_u32);
            let sub = parts.next().map_or(0, parse_u32);
            CsiParam(main, sub)
        })
        .collect()
}

/// Leading decimal digits of `buf`, saturating.
fn parse_u32(buf: &[u8]) -> u32 {
    buf.iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0u32, |val, &b| val.saturating_mul(10).saturating_add(u32::from(b - b'0')))
}

/// Decode a CSI modifier parameter (`1 + bitmask`). 0 and 1 mean none.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u32) -> Modifiers {
    let val = if param > 0 { param - 1 } else { 0 };
    Modifiers::from_bits_truncate(val as u8)
}

// ─── Event Stream ───────────────────────────────────────────────────────────

/// A classified input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A key.
    Key(KeyEvent),
    /// A grapheme cluster with no single-codepoint key (emoji sequences,
    /// combining marks).
    Text(String),
    /// One complete bracketed paste.
    Paste(String),
    /// An escape sequence that is not a key.
    Unknown(String),
}

/// Adapts a [`Decoder`] into a stream of [`InputEvent`]s.
///
/// Text runs are split into clusters, one event each. A paste triple
/// becomes a single [`InputEvent::Paste`].
#[derive(Debug, Default)]
pub struct Events {
    decoder: Decoder,
}

impl Events {
    /// Wrap a decoder.
    #[must_use]
    pub const fn new(decoder: Decoder) -> Self {
        Self { decoder }
    }

    /// The underlying decoder.
    #[must_use]
    pub const fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// Feed raw bytes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<InputEvent> {
        let mut events = Vec::new();
        self.decoder.push(chunk, |token| classify(token, &mut events));
        events
    }

    /// Advance the deferred flush (see [`Decoder::tick`]).
    pub fn tick(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        self.decoder.tick(|token| classify(token, &mut events));
        events
    }

    /// Resolve anything carried (see [`Decoder::flush`]).
    pub fn flush(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        self.decoder.flush(|token| classify(token, &mut events));
        events
    }
}

fn classify(token: Token, events: &mut Vec<InputEvent>) {
    match token {
        Token::Text(text) => {
            for cluster in text.graphemes(true) {
                events.push(
                    parse_keypress(cluster)
                        .map_or_else(|| InputEvent::Text(cluster.to_owned()), InputEvent::Key),
                );
            }
        }
        Token::Sequence(seq) => {
            let event = match parse_keypress(&seq) {
                Some(key) => InputEvent::Key(key),
                None => {
                    tracing::trace!(?seq, "not a key");
                    InputEvent::Unknown(seq)
                }
            };
            events.push(event);
        }
        Token::Paste(content) => events.push(InputEvent::Paste(content)),
        Token::PasteStart | Token::PasteEnd => {}
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
