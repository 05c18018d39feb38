// SPDX-License-Identifier: MIT
//
// Property tests for the output compositor.
//
// 1. An empty clip/unclip pair changes nothing.
// 2. Writes entirely outside the active clip never appear.
// 3. Nothing painted under a clip lands outside it.

use n_term::output::{Clip, Output, WriteOptions};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

const WIDTH: usize = 12;
const HEIGHT: usize = 5;

#[derive(Debug, Clone)]
struct Write {
    x: i32,
    y: i32,
    text: String,
}

fn write_strategy() -> impl Strategy<Value = Write> {
    (-4i32..16, -2i32..7, "[a-z中👍 ]{0,8}(\n[a-z]{0,4})?")
        .prop_map(|(x, y, text)| Write { x, y, text })
}

fn clip_strategy() -> impl Strategy<Value = Clip> {
    (
        prop::option::of(-2i32..8),
        prop::option::of(0i32..14),
        prop::option::of(-1i32..3),
        prop::option::of(0i32..6),
    )
        .prop_map(|(x1, x2, y1, y2)| Clip { x1, x2, y1, y2 })
}

fn render(writes: &[Write], setup: impl FnOnce(&mut Output)) -> String {
    let mut output = Output::new(WIDTH, HEIGHT);
    for w in writes {
        output.write(w.x, w.y, w.text.as_str(), WriteOptions::default());
    }
    setup(&mut output);
    output.get().text
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Balanced clips restore the prior region
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn empty_clip_pair_is_invisible(
        writes in prop::collection::vec(write_strategy(), 0..6),
        clip in clip_strategy(),
        after in write_strategy(),
    ) {
        let plain = render(&writes, |out| {
            out.write(after.x, after.y, after.text.as_str(), WriteOptions::default());
        });
        let clipped = render(&writes, |out| {
            out.clip(clip);
            out.unclip();
            out.write(after.x, after.y, after.text.as_str(), WriteOptions::default());
        });
        prop_assert_eq!(clipped, plain);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Writes fully outside the clip are dropped
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn write_right_of_clip_never_appears(
        writes in prop::collection::vec(write_strategy(), 0..6),
        x2 in 0i32..12,
        extra in write_strategy(),
    ) {
        let clip = Clip { x1: None, x2: Some(x2), y1: None, y2: None };
        let base = render(&writes, |_| {});
        let with_extra = render(&writes, |out| {
            out.clip(clip);
            out.write(x2 + extra.x.abs(), extra.y, extra.text.as_str(), WriteOptions::default());
            out.unclip();
        });
        prop_assert_eq!(with_extra, base);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Clipped paint stays inside the clip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn clipped_cells_stay_inside(
        writes in prop::collection::vec(write_strategy(), 1..6),
        clip in clip_strategy(),
    ) {
        let mut output = Output::new(WIDTH, HEIGHT);
        output.clip(clip);
        for w in &writes {
            output.write(w.x, w.y, w.text.as_str(), WriteOptions::default());
        }
        output.unclip();

        let grid = output.composite();
        for (y, row) in grid.rows().iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                if cell.is_plain_blank() {
                    continue;
                }
                let (x, y) = (i32::try_from(x).unwrap(), i32::try_from(y).unwrap());
                prop_assert!(clip.contains(x, y), "{:?} painted at ({}, {})", cell.value, x, y);
            }
        }
    }
}
