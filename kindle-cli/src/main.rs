//! Kindle CLI: assemble, verify and run register-machine programs.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Input/assembly error
//! - 2: Verification failure
//! - 3: Build or runtime error

mod commands;

use std::process;

use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "run" => commands::run(&args[2..]),
        "verify" => commands::verify(&args[2..]),
        "disassemble" => commands::disassemble(&args[2..]),
        "table" => commands::table(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            process::exit(0);
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

/// Log to stderr, filtered by `KINDLE_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_env("KINDLE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_usage() {
    eprintln!("Usage: kindle <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  run <file.kasm> [--lazy] [--no-verify]   Assemble, verify and execute a program");
    eprintln!("  verify <file.kasm>                       Assemble and verify a program");
    eprintln!("  disassemble <file.kasm>                  Print the canonical listing");
    eprintln!("  table                                    Build a dispatch table and print its slots");
}
