/// Build script for the stc_firmware crate.
///
/// Hands the board linker script to the linker when building for a RISC-V
/// target. Host builds of the crate (e.g. `cargo doc`) skip it.
use std::env;
use std::path::PathBuf;

fn main() {
    let arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_default());

    if arch.starts_with("riscv") {
        let script = manifest_dir.join("link.ld");
        println!("cargo:rustc-link-arg=-T{}", script.display());
    }

    println!("cargo:rerun-if-changed=link.ld");
    println!("cargo:rerun-if-changed=src/entry.S");
}
