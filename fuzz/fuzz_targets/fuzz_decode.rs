#![no_main]
use arith_stream::{decompress_with, CodecError, CoderConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must either decode or hit the padding limit.
    let config = CoderConfig::default().with_strict_padding(true);
    match decompress_with(&config, data) {
        Ok(_) | Err(CodecError::TruncatedStream { .. }) => {}
        Err(e) => panic!("unexpected error: {e}"),
    }
});
