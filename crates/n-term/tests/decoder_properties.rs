// SPDX-License-Identifier: MIT
//
// Property tests for the input decoder.
//
// 1. Splitting the input anywhere yields the same tokens as feeding it
//    whole (adjacent text runs coalesced, carry resolved by ticks).
// 2. Nothing is lost: every text byte reappears in some token.
// 3. Reset always returns the decoder to a clean state.

use n_term::input::{Decoder, Token};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

const PIECES: &[&str] = &[
    "a", "Z", " ", "\r", "\t", "é", "e\u{0301}", "中", "👍", "🏽", "👨", "\u{200D}", "🇺", "🇸",
    "\x1b", "\x1b[A", "\x1b[1;5C", "\x1b[3~", "\x1bOP", "\x1b[[A", "\x1bx", "\x1b\x1b[B",
    "\x1b[200~", "\x1b[201~", "\x1b[1\x01", "\x7f",
];

fn input_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(PIECES), 0..24)
        .prop_map(|pieces| pieces.concat().into_bytes())
}

/// Input plus a sorted set of cut points.
fn chunked_strategy() -> impl Strategy<Value = (Vec<u8>, Vec<usize>)> {
    input_strategy().prop_flat_map(|bytes| {
        let len = bytes.len();
        let cuts = prop::collection::vec(0..=len, 0..8).prop_map(|mut cuts| {
            cuts.sort_unstable();
            cuts.dedup();
            cuts
        });
        (Just(bytes), cuts)
    })
}

fn decode(chunks: &[&[u8]]) -> Vec<Token> {
    let mut decoder = Decoder::new();
    let mut tokens = Vec::new();
    for chunk in chunks {
        decoder.push(chunk, |t| tokens.push(t));
    }
    decoder.tick(|t| tokens.push(t));
    decoder.tick(|t| tokens.push(t));
    coalesce(tokens)
}

/// Merge adjacent `Text` tokens.
fn coalesce(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        match (out.last_mut(), token) {
            (Some(Token::Text(prev)), Token::Text(next)) => prev.push_str(&next),
            (_, token) => out.push(token),
        }
    }
    out
}

fn split<'a>(bytes: &'a [u8], cuts: &[usize]) -> Vec<&'a [u8]> {
    let mut chunks = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for &cut in cuts {
        chunks.push(&bytes[start..cut]);
        start = cut;
    }
    chunks.push(&bytes[start..]);
    chunks
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Chunk boundaries do not matter
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn chunking_does_not_change_tokens((bytes, cuts) in chunked_strategy()) {
        let whole = decode(&[&bytes]);
        let chunked = decode(&split(&bytes, &cuts));
        prop_assert_eq!(chunked, whole, "cuts {:?} in {:?}", cuts, String::from_utf8_lossy(&bytes));
    }

    #[test]
    fn byte_at_a_time_matches_whole(bytes in input_strategy()) {
        let whole = decode(&[&bytes]);
        let singles: Vec<&[u8]> = bytes.chunks(1).collect();
        prop_assert_eq!(decode(&singles), whole);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Nothing is lost
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn tokens_reassemble_input(bytes in input_strategy()) {
        let mut rebuilt = String::new();
        for token in decode(&[&bytes]) {
            match token {
                Token::Text(s) | Token::Sequence(s) | Token::Paste(s) => rebuilt.push_str(&s),
                Token::PasteStart => rebuilt.push_str("\x1b[200~"),
                Token::PasteEnd => rebuilt.push_str("\x1b[201~"),
            }
        }
        let input = String::from_utf8_lossy(&bytes);
        // An unterminated paste keeps its content buffered.
        prop_assert!(input.starts_with(&rebuilt), "{:?} vs {:?}", rebuilt, input);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Reset
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn reset_returns_to_clean_state(bytes in input_strategy()) {
        let mut decoder = Decoder::new();
        decoder.push(&bytes, |_| {});
        decoder.reset();
        prop_assert!(!decoder.has_pending_escape());
        prop_assert_eq!(decoder.pending_flush(), None);

        let mut tokens = Vec::new();
        decoder.push(b"ok", |t| tokens.push(t));
        prop_assert_eq!(tokens, vec![Token::Text("ok".into())]);
    }
}
