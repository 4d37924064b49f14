//! Version command implementation

use crate::error::Result;
use crate::platform::Target;

/// Run version command
pub fn run() -> Result<()> {
    println!("kindling {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Build info:");
    println!("  Rust version: {}", rustc_version());
    println!("  Profile: {}", build_profile());
    match Target::current() {
        Ok(target) => println!("  Target: {target}"),
        Err(e) => println!("  Target: {e}"),
    }

    Ok(())
}

fn rustc_version() -> &'static str {
    env!("CARGO_PKG_RUST_VERSION")
}

fn build_profile() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}
