use alloc::vec::Vec;
use std::dbg;

use quickcheck::{QuickCheck, TestResult};

use super::utils::{Chunking, Value, roundtrip};
use crate::{Decoder, DecoderOptions, EncoderOptions};

fn tests() -> u64 {
    #[cfg(not(miri))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(miri)]
    let tests = 10;
    tests
}

/// Property: whatever the encoder and decoder configurations, decoding the
/// encoder's output reproduces the source values in the requested delivery.
#[test]
fn roundtrip_any_configuration_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(
        values: Vec<Value>,
        encoder: EncoderOptions,
        decoder: DecoderOptions,
        upstream: Chunking,
    ) -> bool {
        let (actual, expected) = roundtrip(&values, encoder, decoder, upstream, &[]);
        let result = actual == expected;
        if !result {
            dbg!(&values, encoder, decoder.delivery(), upstream, &actual, &expected);
        }
        result
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Vec<Value>, EncoderOptions, DecoderOptions, Chunking) -> bool);
}

/// Property: the decoder is total. Arbitrary bytes either decode or fail with
/// an error, and nothing is yielded after the first error.
#[test]
fn arbitrary_bytes_never_panic_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(bytes: Vec<u8>, split: usize) -> TestResult {
        let mut decoder = Decoder::new(DecoderOptions::default());
        let (head, tail) = bytes.split_at(split % (bytes.len() + 1));
        decoder.feed(head);
        let mut results: Vec<_> = decoder.by_ref().collect();
        decoder.feed(tail);
        results.extend(decoder.finish());

        let errors = results.iter().filter(|r| r.is_err()).count();
        if errors > 1 {
            return TestResult::failed();
        }
        if errors == 1 && !results.last().is_some_and(Result::is_err) {
            return TestResult::failed();
        }
        TestResult::passed()
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Vec<u8>, usize) -> TestResult);
}
