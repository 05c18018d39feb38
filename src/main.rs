// SPDX-License-Identifier: MIT
//
// n-ink — dump decoded terminal input, one event per line.
//
// Pipe bytes in (or run it on a raw-mode terminal) and watch how the
// decoder splits them:
//
//   printf 'a\x1b[A\x1b[200~hi\x1b[201~' | n-ink
//   key Char('a')
//   key Up
//   paste "hi" (2 bytes)
//
// A background thread reads stdin and sends chunks over a channel. The
// main loop waits on the channel with a short timeout; every timeout is
// a decoder tick, which is what turns a lone ESC into the Escape key.
//
// Environment:
//
//   RUST_LOG       log filter for stderr output (default "warn")
//   N_INK_TICK_MS  idle tick interval in milliseconds (default 10)

use std::io::{self, Read, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use n_term::{Events, InputEvent, KeyEvent, Modifiers};
use n_text::{truncate, Measurer, TruncatePosition};
use tracing_subscriber::EnvFilter;

/// Chunk size for stdin reads. One keypress is a handful of bytes; a
/// paste can be kilobytes.
const READ_BUF_SIZE: usize = 4096;

const DEFAULT_TICK_MS: u64 = 10;

/// Paste previews are cut to this many columns.
const PREVIEW_COLUMNS: usize = 60;

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let tick = tick_interval();
    tracing::debug!(?tick, "starting");

    let (tx, rx) = mpsc::channel::<Vec<u8>>();
    thread::Builder::new()
        .name("n-ink-stdin".into())
        .spawn(move || read_stdin(&tx))?;

    let mut events = Events::default();
    let measurer = Measurer::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    loop {
        let batch = match rx.recv_timeout(tick) {
            Ok(chunk) => events.push(&chunk),
            Err(RecvTimeoutError::Timeout) => events.tick(),
            Err(RecvTimeoutError::Disconnected) => break,
        };
        for event in &batch {
            writeln!(out, "{}", describe(event, &measurer))?;
        }
        out.flush()?;
    }

    for event in &events.flush() {
        writeln!(out, "{}", describe(event, &measurer))?;
    }
    out.flush()
}

/// Read stdin until EOF or error. Dropping `tx` on return closes the
/// channel, which ends the main loop.
fn read_stdin(tx: &mpsc::Sender<Vec<u8>>) {
    let mut stdin = io::stdin().lock();
    let mut buf = [0u8; READ_BUF_SIZE];
    loop {
        match stdin.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                tracing::warn!(error = %e, "stdin read failed");
                break;
            }
        }
    }
}

fn tick_interval() -> Duration {
    let ms = std::env::var("N_INK_TICK_MS")
        .ok()
        .and_then(|v| match v.parse::<u64>() {
            Ok(ms) if ms > 0 => Some(ms),
            _ => {
                tracing::warn!(value = %v, "ignoring invalid N_INK_TICK_MS");
                None
            }
        })
        .unwrap_or(DEFAULT_TICK_MS);
    Duration::from_millis(ms)
}

fn describe(event: &InputEvent, measurer: &Measurer) -> String {
    match event {
        InputEvent::Key(key) => describe_key(key),
        InputEvent::Text(text) => format!("text {text:?}"),
        InputEvent::Paste(text) => {
            let preview = truncate(&text.replace('\n', "⏎"), PREVIEW_COLUMNS, TruncatePosition::Middle, measurer);
            format!("paste {preview:?} ({} bytes)", text.len())
        }
        InputEvent::Unknown(seq) => format!("unknown {seq:?}"),
    }
}

fn describe_key(key: &KeyEvent) -> String {
    let mut line = String::from("key ");
    for (flag, name) in [
        (Modifiers::CTRL, "Ctrl+"),
        (Modifiers::ALT, "Alt+"),
        (Modifiers::SHIFT, "Shift+"),
        (Modifiers::SUPER, "Super+"),
    ] {
        if key.modifiers.contains(flag) {
            line.push_str(name);
        }
    }
    line.push_str(&format!("{:?}", key.code));
    if key.kind != n_term::KeyEventKind::Press {
        line.push_str(&format!(" ({:?})", key.kind));
    }
    line
}
