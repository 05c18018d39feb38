// SPDX-License-Identifier: MIT
//
// Terminal input decoder.
//
// Turns raw stdin bytes, chunked however the OS felt like chunking them,
// into atomic input tokens: runs of text, complete escape sequences, and
// bracketed paste. A token is only emitted once it is fully resolved, and
// the token stream does not depend on where the chunk boundaries fell.
//
// Handles:
//
// - CSI sequences, including the legacy `ESC [ [` function-key form
// - SS3 sequences (`ESC O x`)
// - Meta prefixes (`ESC ESC ...`), nested up to a configurable depth
// - ESC + codepoint (Alt+key)
// - Bracketed paste (`ESC [ 200 ~` ... `ESC [ 201 ~`)
// - UTF-8 split across reads, and grapheme clusters that may still grow
//   (ZWJ chains, emoji awaiting a modifier, half a flag)
//
// # Design
//
// Bytes that cannot be resolved yet stay in a carry buffer and are
// prepended to the next chunk. A lone ESC at the end of a chunk is the
// classic ambiguity: the Escape key, or the first byte of a sequence
// still in flight? The decoder never guesses. It schedules a deferred
// flush that the host advances with [`Decoder::tick`] on idle turns.
// The first tick only coalesces; the second resolves the carry. Any new
// `push` (or `reset`) cancels the pending flush, and a handle from an
// earlier generation is a no-op. A sequence that has already started
// (`ESC [` and friends) is never decided by the clock; it waits for its
// remaining bytes, or for `max_carry`.
//
// Parsing works directly on `&[u8]`. Nested ESC depth is tracked with an
// explicit counter, never the call stack.

use unicode_segmentation::UnicodeSegmentation;

use n_text::width::{is_pictographic, is_regional_indicator};

// ─── Tokens ─────────────────────────────────────────────────────────────────

/// One resolved piece of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A run of text made of complete grapheme clusters.
    Text(String),
    /// A complete escape sequence, or a resolved lone ESC.
    Sequence(String),
    /// Bracketed paste opened (`ESC [ 200 ~`).
    PasteStart,
    /// Everything between the paste delimiters, verbatim.
    Paste(String),
    /// Bracketed paste closed (`ESC [ 201 ~`).
    PasteEnd,
}

// ─── Configuration ──────────────────────────────────────────────────────────

/// Decoder limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Longest chain of `ESC ESC ...` meta prefixes resolved as a single
    /// sequence. Deeper chains are split.
    pub max_depth: usize,
    /// Bytes of an unterminated escape sequence kept before giving up and
    /// flushing them as literal text.
    pub max_carry: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: 32,
            max_carry: 4096,
        }
    }
}

// ─── Decoder ────────────────────────────────────────────────────────────────

const ESC: u8 = 0x1B;

/// Bracketed paste opening delimiter: `ESC [ 200 ~`
const PASTE_START: &[u8] = b"\x1b[200~";
/// Bracketed paste closing delimiter: `ESC [ 201 ~`
const PASTE_END: &[u8] = b"\x1b[201~";

/// What the carry buffer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CarryMode {
    None,
    /// An escape sequence (possibly just ESC) waiting for more bytes.
    Escape,
    /// A trailing cluster that may still grow, or a cut UTF-8 sequence.
    Grapheme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Coalesce,
    Decide,
}

#[derive(Debug, Clone, Copy)]
struct Deferred {
    generation: u64,
    step: Step,
}

/// Handle to the decoder's outstanding deferred flush.
///
/// Only the handle of the current generation does anything; handles
/// obtained before a later `push` or `reset` are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushHandle(u64);

/// Stateful input decoder.
///
/// Feed chunks with [`push`](Decoder::push); tokens are passed to the
/// callback in byte-stream order.
///
/// ```
/// use n_term::input::{Decoder, Token};
///
/// let mut decoder = Decoder::new();
/// let mut tokens = Vec::new();
/// decoder.push(b"\x1b[", |t| tokens.push(t));
/// decoder.push(b"A", |t| tokens.push(t));
/// assert_eq!(tokens, vec![Token::Sequence("\x1b[A".into())]);
/// ```
#[derive(Debug)]
pub struct Decoder {
    config: DecoderConfig,
    carry: Vec<u8>,
    mode: CarryMode,
    /// Raw bytes of an open bracketed paste.
    paste: Option<Vec<u8>>,
    generation: u64,
    deferred: Option<Deferred>,
}

impl Decoder {
    /// A decoder with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    /// A decoder with custom limits.
    #[must_use]
    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            config,
            carry: Vec::with_capacity(64),
            mode: CarryMode::None,
            paste: None,
            generation: 0,
            deferred: None,
        }
    }

    /// Active limits.
    #[must_use]
    pub const fn config(&self) -> DecoderConfig {
        self.config
    }

    /// Feed a chunk of raw input.
    ///
    /// Cancels any pending deferred flush. Bytes that cannot be resolved
    /// yet are carried into the next call.
    pub fn push(&mut self, chunk: &[u8], mut emit: impl FnMut(Token)) {
        self.generation = self.generation.wrapping_add(1);
        self.deferred = None;

        let mut buf = std::mem::take(&mut self.carry);
        buf.extend_from_slice(chunk);
        self.mode = CarryMode::None;

        let mut text = String::new();
        let mut pos = 0;

        while pos < buf.len() {
            // ── Paste mode: everything up to the closing delimiter ────
            if self.paste.is_some() {
                let closed = self.feed_paste(&buf[pos..]);
                match closed {
                    Some((content, after)) => {
                        tracing::debug!(bytes = content.len(), "paste closed");
                        emit(Token::Paste(content));
                        emit(Token::PasteEnd);
                        buf = after;
                        pos = 0;
                        continue;
                    }
                    None => break,
                }
            }

            // ── Escape sequences ─────────────────────────────────────
            if buf[pos] == ESC {
                match scan_escape(&buf[pos..], self.config.max_depth) {
                    Scan::Complete(len) => {
                        flush_text(&mut text, &mut emit);
                        let seq = &buf[pos..pos + len];
                        pos += len;
                        if seq == PASTE_START {
                            tracing::debug!("paste opened");
                            self.paste = Some(Vec::new());
                            emit(Token::PasteStart);
                        } else {
                            emit(sequence(seq));
                        }
                    }
                    Scan::Incomplete => {
                        self.carry = buf[pos..].to_vec();
                        self.mode = CarryMode::Escape;
                        pos = buf.len();
                    }
                    Scan::Invalid => {
                        flush_text(&mut text, &mut emit);
                        emit(Token::Sequence(String::from("\x1b")));
                        pos += 1;
                    }
                }
                continue;
            }

            // ── Text up to the next ESC ──────────────────────────────
            let end = buf[pos..]
                .iter()
                .position(|&b| b == ESC)
                .map_or(buf.len(), |p| pos + p);
            let at_end = end == buf.len();
            let (decoded, held) = decode_text(&buf[pos..end], at_end);
            text.push_str(&decoded);
            if !held.is_empty() {
                tracing::trace!(bytes = held.len(), "holding trailing cluster");
                self.carry = held;
                self.mode = CarryMode::Grapheme;
            }
            pos = end;
        }

        flush_text(&mut text, &mut emit);

        if self.mode == CarryMode::Escape && self.carry.len() > self.config.max_carry {
            tracing::warn!(
                bytes = self.carry.len(),
                limit = self.config.max_carry,
                "unterminated escape sequence flushed as text"
            );
            self.mode = CarryMode::None;
            let carry = std::mem::take(&mut self.carry);
            emit(Token::Text(String::from_utf8_lossy(&carry).into_owned()));
        }

        if self.awaits_decision() {
            self.deferred = Some(Deferred {
                generation: self.generation,
                step: Step::Coalesce,
            });
        }
    }

    /// Whether the carry is something only time can resolve: bare ESC
    /// bytes, or a held cluster. A started sequence (`ESC [`, `ESC O`, ...)
    /// waits for more input instead.
    fn awaits_decision(&self) -> bool {
        match self.mode {
            CarryMode::Grapheme => !self.carry.is_empty(),
            CarryMode::Escape => !self.carry.is_empty() && self.carry.iter().all(|&b| b == ESC),
            CarryMode::None => false,
        }
    }

    /// Append paste bytes. On finding the closing delimiter, return the
    /// paste content and the bytes that followed it.
    fn feed_paste(&mut self, bytes: &[u8]) -> Option<(String, Vec<u8>)> {
        let paste = self.paste.as_mut()?;
        // The delimiter may straddle the previous chunk boundary.
        let search_from = paste.len().saturating_sub(PASTE_END.len() - 1);
        paste.extend_from_slice(bytes);

        let offset = find_subsequence(&paste[search_from..], PASTE_END)?;
        let end = search_from + offset;
        let after = paste.split_off(end + PASTE_END.len());
        paste.truncate(end);
        let content = String::from_utf8_lossy(paste).into_owned();
        self.paste = None;
        Some((content, after))
    }

    /// Whether a carried ESC is waiting on the deferred flush.
    #[must_use]
    pub fn has_pending_escape(&self) -> bool {
        self.deferred.is_some() && self.mode == CarryMode::Escape
    }

    /// Handle to the outstanding deferred flush, if any.
    #[must_use]
    pub fn pending_flush(&self) -> Option<FlushHandle> {
        self.deferred
            .filter(|d| d.generation == self.generation)
            .map(|d| FlushHandle(d.generation))
    }

    /// Advance the outstanding deferred flush by one step.
    ///
    /// Returns `true` when this tick resolved the carry.
    pub fn tick(&mut self, emit: impl FnMut(Token)) -> bool {
        match self.pending_flush() {
            Some(handle) => self.fire(handle, emit),
            None => false,
        }
    }

    /// Advance the deferred flush identified by `handle`. Stale handles
    /// are ignored.
    ///
    /// Returns `true` when this call resolved the carry.
    pub fn fire(&mut self, handle: FlushHandle, emit: impl FnMut(Token)) -> bool {
        let Some(deferred) = self.deferred.as_mut() else {
            return false;
        };
        if handle.0 != self.generation || deferred.generation != handle.0 {
            tracing::trace!(handle = handle.0, current = self.generation, "stale flush handle");
            return false;
        }

        match deferred.step {
            Step::Coalesce => {
                deferred.step = Step::Decide;
                false
            }
            Step::Decide => {
                self.deferred = None;
                self.flush(emit);
                true
            }
        }
    }

    /// Resolve the carry now: an escape becomes a `Sequence`, a held
    /// cluster becomes `Text`. An open paste stays open.
    pub fn flush(&mut self, mut emit: impl FnMut(Token)) {
        self.deferred = None;
        let carry = std::mem::take(&mut self.carry);
        let mode = std::mem::replace(&mut self.mode, CarryMode::None);
        if carry.is_empty() {
            return;
        }

        match mode {
            CarryMode::Escape => {
                tracing::debug!(bytes = carry.len(), "carried escape resolved");
                emit(sequence(&carry));
            }
            CarryMode::Grapheme | CarryMode::None => {
                emit(Token::Text(String::from_utf8_lossy(&carry).into_owned()));
            }
        }
    }

    /// Drop all buffered state and cancel the deferred flush.
    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.deferred = None;
        self.carry.clear();
        self.mode = CarryMode::None;
        if self.paste.take().is_some() {
            tracing::debug!("open paste discarded by reset");
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Stateless Scanning ─────────────────────────────────────────────────────

/// Result of scanning one escape sequence.
#[derive(Debug, PartialEq, Eq)]
enum Scan {
    /// A complete sequence of `usize` bytes.
    Complete(usize),
    /// The bytes so far are a valid prefix; need more.
    Incomplete,
    /// A byte that cannot appear here.
    Invalid,
}

/// Scan the escape sequence at the start of `buf` (`buf[0]` is ESC).
fn scan_escape(buf: &[u8], max_depth: usize) -> Scan {
    debug_assert_eq!(buf.first(), Some(&ESC));

    // Meta prefixes: each extra ESC nests one level deeper.
    let mut at = 0;
    let mut depth = 0;
    while buf.get(at + 1) == Some(&ESC) {
        depth += 1;
        if depth >= max_depth {
            tracing::warn!(depth, "escape nesting limit reached");
            return Scan::Complete(at + 1);
        }
        at += 1;
    }

    let Some(&intro) = buf.get(at + 1) else {
        return Scan::Incomplete;
    };

    match intro {
        b'[' => scan_csi(buf, at + 2),
        b'O' => match buf.get(at + 2) {
            None => Scan::Incomplete,
            Some(0x40..=0x7E) => Scan::Complete(at + 3),
            Some(_) => Scan::Invalid,
        },
        lead => {
            let len = match utf8_char_len(lead) {
                0 => 1,
                n => n,
            };
            if buf.len() < at + 1 + len {
                Scan::Incomplete
            } else {
                Scan::Complete(at + 1 + len)
            }
        }
    }
}

/// Scan CSI parameters and the final byte, starting at `start`.
fn scan_csi(buf: &[u8], start: usize) -> Scan {
    let mut end = start;
    // Legacy function keys: ESC [ [ A
    if buf.get(end) == Some(&b'[') {
        end += 1;
    }

    while let Some(&b) = buf.get(end) {
        match b {
            0x20..=0x3F => end += 1,
            0x40..=0x7E => return Scan::Complete(end + 1),
            _ => return Scan::Invalid,
        }
    }
    Scan::Incomplete
}

/// Decode a text segment (no ESC bytes).
///
/// Invalid UTF-8 becomes U+FFFD. When the segment ends the buffer
/// (`at_end`), a cut UTF-8 sequence and a trailing cluster that may still
/// grow are returned as held bytes instead of text.
fn decode_text(bytes: &[u8], at_end: bool) -> (String, Vec<u8>) {
    let (mut decoded, partial) = decode_utf8(bytes, at_end);
    if !at_end {
        return (decoded, Vec::new());
    }

    let mut held = Vec::new();
    let tail = decoded
        .grapheme_indices(true)
        .next_back()
        .map(|(idx, last)| (idx, !partial.is_empty() || may_grow(last)));
    if let Some((idx, true)) = tail {
        held.extend_from_slice(&decoded.as_bytes()[idx..]);
        decoded.truncate(idx);
    }
    held.extend_from_slice(partial);
    (decoded, held)
}

fn decode_utf8(mut bytes: &[u8], at_end: bool) -> (String, &[u8]) {
    let mut out = String::with_capacity(bytes.len());
    loop {
        match std::str::from_utf8(bytes) {
            Ok(s) => {
                out.push_str(s);
                return (out, &[]);
            }
            Err(err) => {
                let (valid, rest) = bytes.split_at(err.valid_up_to());
                out.push_str(&String::from_utf8_lossy(valid));
                match err.error_len() {
                    Some(n) => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        bytes = &rest[n..];
                    }
                    None if at_end => return (out, rest),
                    None => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        return (out, &[]);
                    }
                }
            }
        }
    }
}

/// Whether a cluster at the end of a chunk may be extended by the next.
fn may_grow(cluster: &str) -> bool {
    let mut chars = cluster.chars();
    let Some(base) = chars.next() else {
        return false;
    };
    if cluster.ends_with('\u{200D}') || is_pictographic(base) {
        return true;
    }
    is_regional_indicator(base) && chars.next().is_none()
}

/// Expected byte length of a UTF-8 character from its lead byte.
/// Returns 0 for invalid lead bytes (continuation bytes, 0xF8..).
const fn utf8_char_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

/// Find the first occurrence of `needle` in `haystack`.
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn sequence(bytes: &[u8]) -> Token {
    let seq = String::from_utf8_lossy(bytes).into_owned();
    tracing::trace!(?seq, "sequence");
    Token::Sequence(seq)
}

fn flush_text(text: &mut String, emit: &mut impl FnMut(Token)) {
    if !text.is_empty() {
        tracing::trace!(len = text.len(), "text run");
        emit(Token::Text(std::mem::take(text)));
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
