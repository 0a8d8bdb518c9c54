//! Streaming large payloads into a file without flattening them.
//!
//! Run with: cargo run --example streaming_blob

use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, IoSlice};
use vbs_writer::{PackOptions, VbsPacker, Writer};

fn main() -> Result<(), Box<dyn Error>> {
    let path = std::env::temp_dir().join("vbs_streaming_blob.bin");
    let file = BufWriter::new(File::create(&path)?);
    let options = PackOptions::new().with_buffer_size(4 * 1024);
    let doc = Writer::new(VbsPacker::with_options(file, options));

    let root = doc.dict();
    root.append("name", "frames");

    // scatter/gather: three buffers become one blob
    let header = [0u8; 16];
    let body = vec![0xAB; 32 * 1024];
    let trailer = *b"END";
    let parts = [
        IoSlice::new(&header),
        IoSlice::new(&body),
        IoSlice::new(&trailer),
    ];
    root.append_blob("payload", &parts[..]);

    // two-phase: announce the length, then supply the bytes piecewise
    let chunks: Vec<Vec<u8>> = (0..4).map(|i| vec![i as u8; 1024]).collect();
    let total: usize = chunks.iter().map(Vec::len).sum();
    root.declare_blob_head("chunks", total);
    for chunk in &chunks {
        root.append_raw(chunk);
    }
    root.close();

    doc.finish().finish()?;
    println!(
        "wrote {} bytes to {}",
        std::fs::metadata(&path)?.len(),
        path.display()
    );

    Ok(())
}
