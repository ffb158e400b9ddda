#![no_main]
use arith_stream::batch::{compress_all, decompress_all};
use arith_stream::CoderConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Split the input on 0xFF into independent buffers.
    let inputs: Vec<&[u8]> = data.split(|&b| b == 0xFF).take(16).collect();
    let config = CoderConfig::default();

    let compressed = compress_all(&config, &inputs).expect("compress");
    let restored = decompress_all(&config, &compressed).expect("decompress");
    assert_eq!(restored.len(), inputs.len());
    for (input, output) in inputs.iter().zip(&restored) {
        assert_eq!(*input, output.as_slice());
    }
});
