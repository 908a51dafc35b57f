// SPDX-FileCopyrightText: 2025 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Run Intcode programs from the command line, either on their own or as a network of amplifiers

use std::error::Error;
use std::fs::{self, read_to_string};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use intcode::network::{Topology, best_phase_setting};
use intcode::prelude::*;
use intcode::program::parse_program;
use itertools::Itertools;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(PartialEq, Clone, Copy, ValueEnum)]
enum CodeFormat {
    /// comma-separated ASCII-encoded decimal numbers
    #[value(alias("text"))]
    #[value(alias("aoc"))]
    Ascii,
    /// little-endian 64-bit integers
    #[cfg_attr(target_endian = "little", value(alias("binary-native")))]
    #[value(name("binary-little-endian"), alias("binle"))]
    LittleEndian,
    #[cfg_attr(target_endian = "big", value(alias("binary-native")))]
    #[value(name("binary-big-endian"), alias("binbe"))]
    /// big-endian 64-bit integers
    BigEndian,
}

const VERSION: &str = concat!(env!("CARGO_CRATE_NAME"), '-', env!("CARGO_PKG_VERSION"));

#[derive(Parser)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = VERSION)]
#[command(about = "Intcode machine", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
    #[arg(help = "Input format for the intcode")]
    #[arg(short, long, global = true)]
    #[arg(default_value = "ascii")]
    format: CodeFormat,
    #[arg(short, long, global = true)]
    #[arg(help = "Log at debug level unless RUST_LOG says otherwise")]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run a program to completion, printing each output on its own line
    Run {
        #[arg(help = "The program to run")]
        source: PathBuf,
        #[arg(short, long = "input", allow_negative_numbers = true)]
        #[arg(help = "Value to queue as input; may be repeated")]
        inputs: Vec<i64>,
        #[arg(long, requires = "verb", allow_negative_numbers = true)]
        #[arg(help = "Value to write to address 1 before running")]
        noun: Option<i64>,
        #[arg(long, requires = "noun", allow_negative_numbers = true)]
        #[arg(help = "Value to write to address 2 before running")]
        verb: Option<i64>,
        #[arg(long)]
        #[arg(help = "Print each executed instruction to stderr")]
        trace: bool,
    },
    /// Find the amplifier phase setting that produces the highest signal
    Amplify {
        #[arg(help = "The amplifier program")]
        source: PathBuf,
        #[arg(long)]
        #[arg(help = "Wire the last amplifier back into the first")]
        feedback: bool,
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        #[arg(help = "Phase settings to permute [default: 0,1,2,3,4, or 5,6,7,8,9 with --feedback]")]
        phases: Option<Vec<i64>>,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        #[arg(help = "Signal fed into the first amplifier")]
        signal: i64,
    },
}

fn read_bin_file<F: Fn([u8; 8]) -> i64>(file: &Path, func: F) -> Result<Vec<i64>, Box<dyn Error>> {
    let input = fs::read(file)?;
    let (chunks, remainder) = input.as_chunks::<8>();
    if !remainder.is_empty() {
        return Err(Box::new(IncompleteI64(Box::from(remainder))));
    }
    Ok(chunks.iter().map(|c| func(*c)).collect())
}

fn load(source: &Path, format: CodeFormat) -> Result<Vec<i64>, Box<dyn Error>> {
    let prog = match format {
        CodeFormat::Ascii => parse_program(
            &read_to_string(source)
                .map_err(|e| format!("failed to read {}: {e}", source.display()))?,
        )?,
        CodeFormat::LittleEndian => read_bin_file(source, i64::from_le_bytes)?,
        CodeFormat::BigEndian => read_bin_file(source, i64::from_be_bytes)?,
    };
    info!(path = %source.display(), len = prog.len(), "loaded program");
    Ok(prog)
}

fn run(
    mut machine: Machine,
    noun_verb: Option<(i64, i64)>,
    trace: bool,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    if let Some((noun, verb)) = noun_verb {
        machine.set_noun_verb(noun, verb);
    }
    if trace {
        machine.start_trace();
    }
    let result = machine.run();
    if let Some(trace) = machine.end_trace() {
        for instr in &trace.0 {
            eprintln!("{instr}");
        }
    }
    let (output, state) = match result {
        Ok(stopped) => stopped,
        Err(fault) => {
            // outputs from before the fault are still worth seeing
            write_outputs(out, machine.take_outputs())?;
            return Err(Box::new(fault));
        }
    };
    write_outputs(out, output)?;
    if state == State::Awaiting {
        return Err(Box::new(StarvedForInput {
            position: machine.instruction_pointer(),
        }));
    }
    if noun_verb.is_some() {
        writeln!(out, "address 0: {}", machine.read(0))?;
    }
    Ok(())
}

fn write_outputs(out: &mut impl Write, outputs: Vec<i64>) -> io::Result<()> {
    for i in outputs {
        writeln!(out, "{i}")?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match args.command {
        Command::Run {
            source,
            inputs,
            noun,
            verb,
            trace,
        } => {
            let machine = Machine::with_inputs(load(&source, args.format)?, inputs);
            run(machine, noun.zip(verb), trace, &mut io::stdout().lock())
        }
        Command::Amplify {
            source,
            feedback,
            phases,
            signal,
        } => {
            let program = load(&source, args.format)?;
            let (topology, default_phases) = if feedback {
                (Topology::Feedback, 5..10)
            } else {
                (Topology::Series, 0..5)
            };
            let phases = phases.unwrap_or_else(|| default_phases.collect());
            if !phases.iter().all_unique() {
                warn!(?phases, "phase settings repeat, so some orderings are tried twice");
            }
            let (order, signal) = best_phase_setting(&program, &phases, topology, signal)?;
            println!("phases: {}", order.iter().join(","));
            println!("signal: {signal}");
            Ok(())
        }
    }
}

#[derive(Debug, Error)]
#[error("expected 8 bytes, got {}: {:02x?}", .0.len(), .0)]
struct IncompleteI64(Box<[u8]>);

#[derive(Debug, Error)]
#[error("program is awaiting more input at position {position}")]
struct StarvedForInput {
    position: i64,
}
