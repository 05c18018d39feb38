// SPDX-License-Identifier: MIT
//
// n-term — Terminal protocol core for n-ink.
//
// Both directions of the terminal conversation, minus the terminal:
//
//   - Input: `input` decodes raw stdin bytes, however they were chunked,
//     into atomic tokens (text runs, escape sequences, bracketed paste).
//     `keypress` gives those tokens meaning as key events.
//
//   - Output: `output` composites positioned, clipped writes into a grid
//     of styled chars and serializes it to ANSI text with minimal SGR
//     transitions.
//
// Raw mode, signal handling, and the actual read/write syscalls belong
// to the host. Everything here is plain data in, plain data out.

pub mod input;
pub mod keypress;
pub mod output;

pub use input::{Decoder, DecoderConfig, FlushHandle, Token};
pub use keypress::{parse_keypress, Events, InputEvent, KeyCode, KeyEvent, KeyEventKind, Modifiers};
pub use output::{Clip, Content, Output, Rendered, Transformer, WriteOptions};
