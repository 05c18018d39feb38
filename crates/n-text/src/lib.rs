// SPDX-License-Identifier: MIT
//
// n-text — Text layer for n-ink.
//
// Everything that needs to know how wide a piece of terminal text is
// lives here. Strings carry their styling inline as SGR sequences; this
// crate folds those into `Style` values, splits text into grapheme
// clusters with column widths, and puts it back together after wrapping
// or truncating without ever tearing a cluster or an escape in half.
//
// Layering: `width` knows codepoints and clusters, `ansi` knows escape
// sequences, `styled` joins the two into styled chars, and `measure`,
// `wrap`, and `truncate` are built on top. Both the output compositor
// and the layout bridge consume this crate.

pub mod ansi;
pub mod measure;
pub mod style;
pub mod styled;
pub mod truncate;
pub mod width;
pub mod wrap;

pub use measure::{Dimensions, Measurer, CURSOR_MARKER};
pub use style::{Attr, Color, Style, UnderlineStyle};
pub use styled::StyledChar;
pub use truncate::{truncate, TruncatePosition, ELLIPSIS};
pub use width::{default_char_width, WidthFn};
pub use wrap::{wrap, wrap_text, TextWrap};
