use std::{env, fs, path::PathBuf};

fn main() {
    // Pick the linker memory layout for the target; host builds need none.
    let target = env::var("TARGET").unwrap();
    let memory_file = if target.starts_with("thumbv8m") {
        Some("memory-pico2.x")
    } else if target.starts_with("riscv32imac") {
        Some("memory-pico2-riscv.x")
    } else if target.starts_with("thumbv6m") {
        Some("memory-pico1.x")
    } else {
        None
    };

    if let Some(memory_file) = memory_file {
        let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
        let memory_x = fs::read_to_string(memory_file)
            .unwrap_or_else(|err| panic!("Failed to read {memory_file}: {err}"));
        fs::write(out_dir.join("memory.x"), memory_x).expect("Failed to write memory.x");
        println!("cargo:rustc-link-search={}", out_dir.display());
        println!("cargo:rerun-if-changed={memory_file}");
    }
}
