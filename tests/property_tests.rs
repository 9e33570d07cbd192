//! Property-based tests.
//!
//! Uses proptest to verify invariants across random inputs:
//! - Startup port repair fixes exactly the out-of-range values
//! - Model filtering is an order-preserving, case-insensitive subset
//! - Image encoding is independent of stream chunking

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hearth::image::encode_image;
use hearth::llm::{ModelEntry, filter_models};
use hearth::settings::{DEFAULT_PORT, KEY_PORT, MemoryStore, Settings};
use proptest::prelude::*;
use serde_json::Value;
use std::io::Read;

/// Reader that yields at most `chunk` bytes per call.
struct ChunkedReader {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
}

impl Read for ChunkedReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let remaining = self.data.len() - self.pos;
        let n = self.chunk.min(remaining).min(buf.len());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

proptest! {
    /// Property: the startup repair resets exactly the out-of-range ports.
    #[test]
    fn prop_port_repair(port in proptest::num::i64::ANY) {
        let settings = Settings::new(MemoryStore::new());
        settings.store().set(KEY_PORT, Value::from(port)).unwrap();
        settings.repair_port();

        let stored = settings.store().get(KEY_PORT).unwrap().and_then(|v| v.as_i64());
        if (1..=65535).contains(&port) {
            prop_assert_eq!(stored, Some(port));
        } else {
            prop_assert_eq!(stored, Some(i64::from(DEFAULT_PORT)));
        }
    }

    /// Property: filtering returns exactly the case-insensitive matches,
    /// in upstream order.
    #[test]
    fn prop_filter_models_subset(
        names in proptest::collection::vec("[a-zA-Z0-9:._-]{1,16}", 0..12),
        query in "[a-zA-Z0-9]{0,4}"
    ) {
        let entries: Vec<ModelEntry> = names.iter().map(|n| ModelEntry::new(n.clone())).collect();
        let filtered = filter_models(entries, &query);

        let expected: Vec<String> = names
            .iter()
            .filter(|n| n.to_lowercase().contains(&query.to_lowercase()))
            .cloned()
            .collect();
        let actual: Vec<String> = filtered.iter().map(|m| m.name.clone()).collect();
        prop_assert_eq!(actual, expected);
    }

    /// Property: the empty query is the identity filter.
    #[test]
    fn prop_filter_models_empty_query(
        names in proptest::collection::vec("[a-zA-Z0-9:._-]{1,16}", 0..12)
    ) {
        let entries: Vec<ModelEntry> = names.iter().map(|n| ModelEntry::new(n.clone())).collect();
        let filtered = filter_models(entries.clone(), "");
        prop_assert_eq!(filtered, entries);
    }

    /// Property: encoding is the base64 of all bytes in order, no matter
    /// how the stream is chunked, and decodes back to the input.
    #[test]
    fn prop_encode_image_chunking_invariant(
        data in proptest::collection::vec(any::<u8>(), 0..4096),
        chunk in 1usize..64
    ) {
        let reader = ChunkedReader { data: data.clone(), pos: 0, chunk };
        let encoded = encode_image(reader).unwrap();

        prop_assert_eq!(&encoded, &STANDARD.encode(&data));
        prop_assert_eq!(STANDARD.decode(&encoded).unwrap(), data);
    }
}
