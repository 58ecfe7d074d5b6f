use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=RUSTC");

    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let rustc_version = Command::new(rustc)
        .arg("--version")
        .output()
        .ok()
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .and_then(|version| version.split_whitespace().nth(1).map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=BASECAMP_RUSTC_VERSION={}", rustc_version);

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_default());
    let rustls_version = manifest_dir
        .ancestors()
        .map(|dir| dir.join("Cargo.lock"))
        .find(|lock| lock.is_file())
        .and_then(|lock| {
            println!("cargo:rerun-if-changed={}", lock.display());
            locked_version(&lock, "rustls")
        })
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=BASECAMP_RUSTLS_VERSION={}", rustls_version);
}

/// Version of `package` pinned in a Cargo.lock file.
fn locked_version(lock: &Path, package: &str) -> Option<String> {
    let contents = fs::read_to_string(lock).ok()?;
    let name_line = format!("name = \"{}\"", package);
    let mut lines = contents.lines();

    while let Some(line) = lines.next() {
        if line.trim() == name_line {
            let version = lines.next()?.trim();
            return version
                .strip_prefix("version = \"")
                .and_then(|v| v.strip_suffix('"'))
                .map(str::to_string);
        }
    }
    None
}
