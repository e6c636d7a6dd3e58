//! # memlay CLI Entry Point
//!
//! Drives the layout pipeline end to end: compile the schema, size and map
//! the backing file, persist the descriptor, and emit the FFI source pair.
//!
//! ## Usage
//!
//! ```bash
//! memlay --input layout.json \
//!        --backing-file memory.buf \
//!        --descriptor layout.ram \
//!        --out-dir generated \
//!        [--format]
//! ```

use eyre::{bail, Result};
use std::env;
use std::path::PathBuf;

use memlay::LayoutEngine;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    let mut schema_path: Option<PathBuf> = None;
    let mut backing_path: Option<PathBuf> = None;
    let mut descriptor_path: Option<PathBuf> = None;
    let mut out_dir: Option<PathBuf> = None;
    let mut do_format = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            "--version" | "-v" => {
                println!("memlay {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--input" => {
                i += 1;
                schema_path = Some(require_value(&args, i, "--input")?);
            }
            "--backing-file" => {
                i += 1;
                backing_path = Some(require_value(&args, i, "--backing-file")?);
            }
            "--descriptor" => {
                i += 1;
                descriptor_path = Some(require_value(&args, i, "--descriptor")?);
            }
            "--out-dir" => {
                i += 1;
                out_dir = Some(require_value(&args, i, "--out-dir")?);
            }
            "--format" => {
                do_format = true;
            }
            arg => {
                bail!("Unknown option: {}", arg);
            }
        }
        i += 1;
    }

    let (Some(schema_path), Some(backing_path), Some(descriptor_path), Some(out_dir)) =
        (schema_path, backing_path, descriptor_path, out_dir)
    else {
        print_usage();
        return Ok(());
    };

    let mut engine = LayoutEngine::new();
    engine.load_layout_json(&schema_path)?;
    engine.allocate_memory_from_file(&backing_path)?;
    engine.save_descriptor(&descriptor_path)?;

    let header_path = out_dir.join("layout_ffi.hpp");
    let source_path = out_dir.join("layout_ffi.cpp");
    engine.generate_ffi_header(&header_path)?;
    engine.generate_ffi_source(&source_path)?;

    if do_format {
        engine.validate_and_format(&header_path, &source_path)?;
    }

    let size = engine.mapped_size();
    println!(
        "Total buffer size: {} bytes ({:.3} KB, {:.6} MB)",
        size,
        size as f64 / 1024.0,
        size as f64 / (1024.0 * 1024.0)
    );

    Ok(())
}

fn require_value(args: &[String], i: usize, flag: &str) -> Result<PathBuf> {
    match args.get(i) {
        Some(value) if !value.starts_with('-') => Ok(PathBuf::from(value)),
        _ => bail!("{} requires a path argument", flag),
    }
}

fn print_usage() {
    println!("memlay - declarative memory-layout compiler");
    println!();
    println!("USAGE:");
    println!("    memlay --input <layout.json> --backing-file <memory.buf>");
    println!("           --descriptor <layout.ram> --out-dir <dir> [--format]");
    println!();
    println!("OPTIONS:");
    println!("    --input <path>         Layout schema JSON file");
    println!("    --backing-file <path>  Backing buffer file (created/truncated to fit)");
    println!("    --descriptor <path>    Compiled layout descriptor output");
    println!("    --out-dir <path>       Directory for layout_ffi.hpp / layout_ffi.cpp");
    println!("    --format               Run clang-format on the emitted files");
    println!("    -h, --help             Print help information");
    println!("    -v, --version          Print version information");
    println!();
    println!("EXAMPLES:");
    println!("    memlay --input layout.json --backing-file memory.buf \\");
    println!("           --descriptor layout.ram --out-dir generated");
}
