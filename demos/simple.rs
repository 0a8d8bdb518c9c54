//! Basic VBS serialization of serde types.
//!
//! Run with: cargo run --example simple

use serde::Serialize;
use std::error::Error;
use vbs_writer::to_vec;

#[derive(Debug, Serialize)]
struct User {
    id: u32,
    name: String,
    email: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let users = vec![
        User {
            id: 42,
            name: "Alice Johnson".to_string(),
            email: "alice@example.com".to_string(),
        },
        User {
            id: 43,
            name: "Bob Smith".to_string(),
            email: "bob@example.com".to_string(),
        },
    ];

    let bytes = to_vec(&users)?;
    println!("{} users packed into {} bytes", users.len(), bytes.len());
    println!("{bytes:02x?}");

    Ok(())
}
