//! CLI command implementations.

use std::fs;

use kindle_bytecode::BytecodeArray;
use kindle_interpreter::{ContextConfig, ExecutionContext, RuntimeError};
use tracing::debug;

/// Assemble, verify and execute a .kasm program, printing r0.
pub fn run(args: &[String]) -> Result<(), i32> {
    let Some(input) = args.first() else {
        eprintln!("error: run requires an input file");
        eprintln!("Usage: kindle run <file.kasm> [--lazy] [--no-verify]");
        return Err(1);
    };

    let mut config = ContextConfig::default().verify(true);
    for flag in &args[1..] {
        match flag.as_str() {
            "--lazy" => config = config.lazy(),
            "--no-verify" => config = config.verify(false),
            other => {
                eprintln!("error: unknown flag '{other}'");
                return Err(1);
            }
        }
    }

    let bytecode = read_program(input)?;
    let context = ExecutionContext::new(config).map_err(|e| {
        eprintln!("error: {e}");
        3
    })?;

    match context.execute(&bytecode) {
        Ok(completion) => {
            debug!(
                continues = completion.stats.continues,
                returns = completion.stats.returns,
                "execution finished"
            );
            println!("{}", completion.value);
            Ok(())
        }
        Err(RuntimeError::Rejected(errors)) => {
            for e in &errors {
                eprintln!("error: {e}");
            }
            Err(2)
        }
        Err(e) => {
            eprintln!("runtime error: {e}");
            Err(3)
        }
    }
}

/// Assemble and verify a .kasm program.
pub fn verify(args: &[String]) -> Result<(), i32> {
    let Some(input) = args.first() else {
        eprintln!("error: verify requires an input file");
        eprintln!("Usage: kindle verify <file.kasm>");
        return Err(1);
    };

    let bytecode = read_program(input)?;
    match kindle_verifier::verify(&bytecode) {
        Ok(()) => {
            println!(
                "OK: {input} ({} bytes, {} registers, {} constants)",
                bytecode.len(),
                bytecode.register_count(),
                bytecode.constants().len()
            );
            Ok(())
        }
        Err(errors) => {
            for e in &errors {
                eprintln!("error: {e}");
            }
            Err(2)
        }
    }
}

/// Print the canonical listing of a .kasm program.
pub fn disassemble(args: &[String]) -> Result<(), i32> {
    let Some(input) = args.first() else {
        eprintln!("error: disassemble requires an input file");
        eprintln!("Usage: kindle disassemble <file.kasm>");
        return Err(1);
    };

    let bytecode = read_program(input)?;
    print!("{}", kindle_assembler::disassemble(&bytecode));
    Ok(())
}

/// Build a dispatch table and print every slot and the layout fingerprint.
pub fn table(args: &[String]) -> Result<(), i32> {
    if let Some(extra) = args.first() {
        eprintln!("error: unexpected argument '{extra}'");
        return Err(1);
    }

    let context = ExecutionContext::new(ContextConfig::default()).map_err(|e| {
        eprintln!("error: {e}");
        3
    })?;
    let table = context.table();

    for (opcode, unit) in table.iter() {
        let entry = unit.map_or_else(|| "-".to_string(), |u| format!("{:#x}", u.entry_address()));
        println!(
            "{:>3}  {:<13} operands={}  entry={entry}",
            opcode.index(),
            opcode.mnemonic(),
            opcode.operand_types().len()
        );
    }
    if let Some(fingerprint) = table.fingerprint() {
        println!("fingerprint: {}", fingerprint.to_hex());
    }
    Ok(())
}

// --- Helpers ---

/// Read and assemble a .kasm file.
fn read_program(path: &str) -> Result<BytecodeArray, i32> {
    let text = fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read '{path}': {e}");
        1
    })?;

    kindle_assembler::assemble(&text).map_err(|e| {
        eprintln!("error: {e}");
        1
    })
}
