//! Builds the recursive factorial module and shows it.
//!
//! ```text
//! wasmtree [--hex] [--layout] [OUTPUT]
//! ```
//!
//! Writes the binary to OUTPUT when given, or prints it as hex with
//! `--hex`. The text rendering always goes to stdout; `--layout` adds the
//! section layout as JSON.

use std::env;
use std::error::Error;
use std::fs;
use std::process;

use wasmtree::{access, demo, printer};

struct Args {
    hex: bool,
    layout: bool,
    output: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        hex: false,
        layout: false,
        output: None,
    };
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--hex" => args.hex = true,
            "--layout" => args.layout = true,
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
            path if args.output.is_none() => args.output = Some(path.to_string()),
            extra => return Err(format!("unexpected argument {extra}")),
        }
    }
    Ok(args)
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let module = demo::factorial_module()?;
    let bytes = module.to_bytes();

    if let Some(path) = &args.output {
        fs::write(path, &bytes)?;
        eprintln!("wrote {} bytes to {path}", bytes.len());
    }
    if args.hex {
        for line in bytes.chunks(16) {
            println!("{}", hex::encode(line));
        }
    }

    let mut failed = false;
    printer::Printer::new(
        |s: &str| print!("{s}"),
        |e| {
            failed = true;
            eprintln!("render: {e}");
        },
    )
    .print(&module);

    if args.layout {
        println!("{}", serde_json::to_string_pretty(&access::layout(&module))?);
    }
    if failed {
        return Err("rendering reported errors".into());
    }
    Ok(())
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("usage: wasmtree [--hex] [--layout] [OUTPUT]");
            process::exit(2);
        }
    };
    if let Err(e) = run(args) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
