#![no_main]
use arith_stream::{compress_with, decompress_with, CoderConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // Byte 0: precision (12-31 bits). The ceiling is the largest that
    // precision allows, capped at 2^20.
    let bits = 12 + u32::from(data[0] % 20);
    let ceiling = (1u32 << (bits - 2)).min(1 << 20);
    let config = CoderConfig::default()
        .with_precision_bits(bits)
        .with_rescale_ceiling(ceiling)
        .with_strict_padding(true);

    let input = &data[1..];
    let compressed = compress_with(&config, input).expect("compress");
    let restored = decompress_with(&config, &compressed).expect("decompress");
    assert_eq!(input, restored.as_slice());
});
