use std::{
    env, fs,
    io::{self, IsTerminal},
    path::Path,
    process,
};

use sluice_diagnostics::{emit_module_diagnostics, DiagnosticsConfig};
use sluice_parser::parse_module;
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    let mut args = env::args().skip(1);
    let mut input_path = None;
    let mut source_path = None;
    let mut cfg = DiagnosticsConfig::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--source" => {
                let Some(value) = args.next() else {
                    eprintln!("error: --source requires a file path");
                    process::exit(2);
                };
                source_path = Some(value);
            }
            "--max" => {
                let Some(value) = args.next() else {
                    eprintln!("error: --max requires a number");
                    process::exit(2);
                };
                cfg.max_diagnostics = match value.parse() {
                    Ok(max) => max,
                    Err(_) => {
                        eprintln!("error: invalid diagnostic limit `{value}`");
                        process::exit(2);
                    }
                };
            }
            "--help" | "-h" => {
                print_help();
                return;
            }
            other if other.starts_with('-') => {
                eprintln!("error: unknown flag `{other}`");
                process::exit(2);
            }
            path => {
                if input_path.replace(path.to_string()).is_some() {
                    eprintln!("error: expected exactly one input file path");
                    process::exit(2);
                }
            }
        }
    }

    let Some(path) = input_path else {
        print_help();
        process::exit(2);
    };

    let input = match fs::read_to_string(&path) {
        Ok(input) => input,
        Err(err) => {
            eprintln!("error: failed to read `{path}`: {err}");
            process::exit(2);
        }
    };

    let colors = io::stderr().is_terminal();
    let parsed = match parse_module(&input) {
        Ok(parsed) => parsed,
        Err(errors) => {
            for error in &errors {
                let _ = error.print(io::stderr(), &path, &input, colors);
            }
            process::exit(2);
        }
    };

    let report = match emit_module_diagnostics(&parsed.module, &cfg) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(101);
        }
    };

    // Positions point into the source program, not into the IR text.
    let source_path = source_path.or_else(|| {
        let source = parsed.debug.source.as_ref()?;
        let dir = Path::new(&path).parent().unwrap_or(Path::new(""));
        Some(dir.join(source.as_str()).to_string_lossy().into_owned())
    });
    let source = source_path.and_then(|source_path| match fs::read_to_string(&source_path) {
        Ok(text) => Some((source_path, text)),
        Err(err) => {
            warn!(path = %source_path, %err, "source text unavailable");
            None
        }
    });

    if report.is_empty() {
        println!("{report}");
        return;
    }

    match source {
        Some((source_path, text)) => {
            for diag in report.iter() {
                let _ = diag.print(io::stdout(), &source_path, &text, io::stdout().is_terminal());
            }
        }
        None => println!("{report}"),
    }

    process::exit(1);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn print_help() {
    println!(
        "Usage: sluice-diag <file> [--source <file>] [--max <n>]\n\
         Emits dataflow diagnostics for optimized sluice IR.\n\
         Exits with 1 when diagnostics were emitted, 2 on invalid input and 101 \
         when the IR is malformed."
    );
}
