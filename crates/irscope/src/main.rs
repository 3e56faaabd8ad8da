//! irscope CLI
//!
//! Inspect compiler IR traces from the terminal.

use std::path::Path;

use irscope::commands::{layout_phase, list_phases, read_trace, render_phase, trace_entity};
use irscope::{CliError, Options};

type Command = fn(&str, &Options) -> Result<String, CliError>;

fn main() {
    irscope::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    let handler: Command = match command.as_str() {
        "phases" => list_phases,
        "layout" => layout_phase,
        "trace" => trace_entity,
        "render" => render_phase,
        "help" | "--help" | "-h" => {
            print_usage();
            return;
        }
        "version" | "--version" | "-V" => {
            println!("irscope {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if args.len() < 3 {
        eprintln!("Usage: irscope {command} <trace.json> [options]");
        eprintln!("Run 'irscope help' for the options.");
        std::process::exit(1);
    }

    let result = Options::parse(&args[3..])
        .and_then(|options| {
            let text = read_trace(Path::new(&args[2]))?;
            handler(&text, &options)
        });
    match result {
        Ok(report) => println!("{report}"),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("irscope - compiler IR trace inspector");
    println!();
    println!("Usage: irscope <command> <trace.json> [options]");
    println!();
    println!("Commands:");
    println!("  phases     List phases, their kinds and member counts");
    println!("  layout     Lay out a graph phase and print its geometry");
    println!("  trace      Show the logical entity of one element across phases");
    println!("  render     Render a phase as the inspector view draws it");
    println!("  help       Show this message");
    println!("  version    Show version information");
    println!();
    println!("Options:");
    println!("  --phase=<n>          Phase index (layout: first graph phase; render: 0)");
    println!("  --node=<id>          Element id (trace: required; render: select it)");
    println!("  --search=<text>      Select elements whose label or opcode contains <text>");
    println!("  --source             Also render the function source");
    println!("  --passes=<n>         Crossing-reduction passes (default 4)");
    println!("  --same-id-origins    Link unannotated elements to the same id one phase back");
    println!("  --prewarm            Lay out every graph phase on load");
    println!();
    println!("Set RUST_LOG (e.g. RUST_LOG=irscope_layout=debug) for a trace of the work done.");
}
