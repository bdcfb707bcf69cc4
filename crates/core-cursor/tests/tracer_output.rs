mod common;
use common::*;

use core_cursor::{CursorCollection, CursorConfig, CursorContext};
use core_document::Document;
use core_model::ViewModel;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::Level;
use tracing::subscriber::with_default;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone)]
struct BufferWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

struct LockedWriter<'a> {
    guard: MutexGuard<'a, Vec<u8>>,
}

impl Write for LockedWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for BufferWriter {
    type Writer = LockedWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LockedWriter {
            guard: self.inner.lock().expect("log buffer poisoned"),
        }
    }
}

fn capture<F: FnOnce()>(level: Level, f: F) -> String {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .with_ansi(false)
        .without_time()
        .with_writer(BufferWriter {
            inner: buffer.clone(),
        })
        .finish();
    with_default(subscriber, f);
    String::from_utf8(buffer.lock().unwrap().clone()).unwrap()
}

fn run_session() {
    let mut doc = Document::from_str("sample.txt", "abcdef\nghij").unwrap();
    let vm = ViewModel::new();
    let cfg = CursorConfig::default();
    let mut ctx = CursorContext::new(&mut doc, &vm, &cfg);
    let mut cc = CursorCollection::new(&mut ctx);
    cc.set_selections(&mut ctx, &[sel(0, 1, 0, 3), sel(1, 0, 1, 2)]);
    // no change: must not dump
    cc.ensure_valid_state(&mut ctx);
    cc.dispose(&mut ctx);
}

#[test]
fn state_change_dumps_every_cursor() {
    let out = capture(Level::TRACE, run_session);
    assert_eq!(out.matches("----------------------------").count(), 1);
    assert!(out.contains("textModel: sample.txt"));
    assert!(out.contains("stack: "));
    assert!(out.contains("1/2: view state: [0,1 -> 0,3] --->>>abc|def"));
    assert!(out.contains("1/2: model state: [0,1 -> 0,3] ---->>>abc|def"));
    assert!(out.contains("2/2: model state: [1,0 -> 1,2] ---->>>gh|ij"));
}

#[test]
fn no_dump_below_trace() {
    let out = capture(Level::DEBUG, run_session);
    assert!(!out.contains("----------------------------"));
}
