//! Working with Value trees and pre-encoded splices.
//!
//! Run with: cargo run --example dynamic_values

use std::error::Error;
use vbs_writer::{vbs, List, Value, VbsPacker, Writer};

fn main() -> Result<(), Box<dyn Error>> {
    let config = vbs!({
        "host": "localhost",
        "port": 8080,
        "features": ["auth", "logging", "metrics"],
        "debug": true
    });

    if let Some(Value::String(host)) = config.as_dict().and_then(|d| d.get("host")) {
        println!("Accessing field 'host': {host}");
    }

    // encode the shared part once and splice it into every document
    let shared: List = vec![vbs!({ "region": "eu-1" }), vbs!([1, 2, 3])].into();
    let shared = shared.with_encoding();

    for id in 0..3 {
        let doc = Writer::new(VbsPacker::new());
        let root = doc.dict();
        root.append("id", id);
        root.append("config", &config);
        root.append_list_from("shared", &shared);
        let bytes = doc.finish().finish()?;
        println!("document {id}: {} bytes", bytes.len());
    }

    Ok(())
}
