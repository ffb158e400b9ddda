//! Profiling helper - runs compression or decompression in a loop for perf analysis

use arith_stream::{compress, Decoder, Encoder, CoderConfig};

fn sample(len: usize) -> Vec<u8> {
    let text = b"It was the best of times, it was the worst of times, it was the age of wisdom, ";
    text.iter().copied().cycle().take(len).collect()
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let mode = args.get(1).map(|s| s.as_str()).unwrap_or("encode");
    let iterations: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(1000);

    let data = sample(256 * 1024);
    let config = CoderConfig::default();

    match mode {
        "encode" => {
            println!("Running compression {} times...", iterations);
            let mut total_out = 0u64;
            for _ in 0..iterations {
                let mut encoder = Encoder::new(Vec::new(), &config).expect("config");
                encoder.encode_all(&data).expect("encode");
                let (_, stats) = encoder.finish().expect("finish");
                total_out += stats.bytes_out;
            }
            println!("Average output: {} bytes", total_out / iterations.max(1) as u64);
        }
        "decode" => {
            let compressed = compress(&data).expect("compress");
            println!(
                "Running decompression {} times ({} -> {} bytes)...",
                iterations,
                compressed.len(),
                data.len()
            );
            for _ in 0..iterations {
                let mut decoder = Decoder::new(compressed.as_slice(), &config).expect("config");
                decoder.decode_to(std::io::sink()).expect("decode");
            }
        }
        _ => eprintln!("Usage: profile [encode|decode] [iterations]"),
    }
    println!("Done");
}
