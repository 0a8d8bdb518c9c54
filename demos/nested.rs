//! Writing nested containers by hand.
//!
//! A parent view seals its open child before it writes again, so children
//! can be left open and still come out correctly nested.
//!
//! Run with: cargo run --example nested

use std::error::Error;
use vbs_writer::{VbsPacker, Writer};

fn main() -> Result<(), Box<dyn Error>> {
    let doc = Writer::new(VbsPacker::new());
    let root = doc.dict();
    root.append("service", "ingest");

    let hosts = root.append_list("hosts");
    for (name, port) in [("alpha", 7000), ("beta", 7001)] {
        let host = hosts.append_dict();
        host.append("name", name);
        host.append("port", port);
        // left open; the next append_dict() seals it
    }

    // seals the last host and the hosts list
    root.append("replicas", 2);
    let limits = root.append_dict("limits");
    limits.append("rps", 500);
    limits.append_fmt("burst", format_args!("{}x", 3));
    println!("open containers before finish: {}", doc.open_containers());

    let bytes = doc.finish().finish()?;
    println!("{} bytes: {bytes:02x?}", bytes.len());

    Ok(())
}
