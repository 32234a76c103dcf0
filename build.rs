//! Build script for tabrecon - handles DuckDB library detection and linking

use std::env;
use std::path::PathBuf;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Bundled DuckDB compiles its own library; nothing to detect.
    if cfg!(feature = "bundled") {
        println!("cargo:warning=Using bundled DuckDB - skipping system library detection");
        return;
    }

    if let Some(lib_path) = find_duckdb_library() {
        println!("cargo:rustc-link-search=native={}", lib_path.display());
        println!("cargo:rustc-link-lib=duckdb");
    } else {
        eprintln!("❌ DuckDB library not found!");
        eprintln!();
        eprintln!("Please install DuckDB:");
        if cfg!(target_os = "macos") {
            eprintln!("  brew install duckdb");
        } else {
            eprintln!("  sudo apt install libduckdb-dev  # Ubuntu/Debian");
            eprintln!("  sudo yum install duckdb-devel   # RHEL/CentOS");
        }
        eprintln!();
        eprintln!("Or use bundled DuckDB:");
        eprintln!("  cargo build --features bundled");
        eprintln!();
        eprintln!("Or set custom path:");
        eprintln!("  export DUCKDB_LIB_PATH=/path/to/duckdb/lib");
        panic!("DuckDB library not found");
    }
}

fn find_duckdb_library() -> Option<PathBuf> {
    // Environment override wins.
    if let Ok(path) = env::var("DUCKDB_LIB_PATH") {
        let path = PathBuf::from(path);
        if has_duckdb_library(&path) {
            return Some(path);
        }
    }

    // pkg-config, then standard install locations.
    if let Some(path) = try_pkg_config() {
        return Some(path);
    }

    standard_paths().into_iter().find(|p| has_duckdb_library(p))
}

fn try_pkg_config() -> Option<PathBuf> {
    let output = Command::new("pkg-config")
        .args(["--libs-only-L", "duckdb"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in stdout.lines() {
        if let Some(path_str) = line.strip_prefix("-L") {
            let path = PathBuf::from(path_str.trim());
            if has_duckdb_library(&path) {
                return Some(path);
            }
        }
    }
    None
}

fn standard_paths() -> Vec<PathBuf> {
    if cfg!(target_os = "macos") {
        vec![
            PathBuf::from("/opt/homebrew/lib"),
            PathBuf::from("/usr/local/lib"),
            PathBuf::from("/opt/local/lib"),
        ]
    } else {
        vec![
            PathBuf::from("/usr/lib"),
            PathBuf::from("/usr/local/lib"),
            PathBuf::from("/usr/lib/x86_64-linux-gnu"),
            PathBuf::from("/usr/lib64"),
        ]
    }
}

fn has_duckdb_library(path: &PathBuf) -> bool {
    if !path.exists() {
        return false;
    }
    let library_names: &[&str] = if cfg!(target_os = "macos") {
        &["libduckdb.dylib", "libduckdb.so", "libduckdb.a"]
    } else {
        &["libduckdb.so", "libduckdb.so.1", "libduckdb.a"]
    };
    library_names.iter().any(|name| path.join(name).exists())
}
