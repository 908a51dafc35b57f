// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD
#![warn(missing_docs)]

//! Library providing a resumable Intcode machine
//!
//! The machine is fully functional, with all of the [Opcodes] and [Parameter Modes] defined in
//! the completed Intcode computer for [Day 9]. Execution pauses whenever an `IN` instruction finds
//! no pending input, and picks up at that exact instruction once more input is pushed, which is
//! what lets several machines be wired into the [amplifier networks](network) of [Day 7].
//!
//! # Example
//!
//! ```rust
//! use intcode::prelude::*;
//! let mut machine = Machine::new(vec![104, 1024, 99]);
//!
//! assert_eq!(machine.run().unwrap(), (vec![1024], State::Halted));
//! ```
//!
//! # Suspend and resume
//!
//! ```rust
//! use intcode::prelude::*;
//! // read an int, output twice its value, repeat
//! let mut machine = Machine::new(vec![3, 11, 102, 2, 11, 11, 4, 11, 1105, 1, 0]);
//! assert_eq!(machine.run().unwrap(), (vec![], State::Awaiting));
//!
//! machine.push_input(21);
//! assert_eq!(machine.run().unwrap(), (vec![42], State::Awaiting));
//!
//! assert_eq!(machine.run_through_inputs([1, 2]).unwrap(), (vec![2, 4], State::Awaiting));
//! ```
//!
//! [Opcodes]: https://esolangs.org/wiki/Intcode#Opcodes
//! [Parameter Modes]: https://esolangs.org/wiki/Intcode#Parameter_Modes
//! [Day 7]: https://adventofcode.com/2019/day/7
//! [Day 9]: https://adventofcode.com/2019/day/9

mod internals;
mod memory;
pub mod network;
pub mod program;
pub mod trace;

use std::collections::VecDeque;
use std::fmt::{self, Display};
use std::ops::{Index, IndexMut};

use thiserror::Error;
use tracing::{debug, trace};

use memory::Memory;
use trace::Trace;

/// A small module that re-exports items needed when working with the Intcode machine
pub mod prelude {
    pub use crate::{Machine, MachineError, State, Status};
    pub use std::iter::empty;
}

/// Instruction pointer value of a machine that has halted or faulted
pub const HALTED_POSITION: i64 = -1;

/// The reason a call to [`Machine::run`] returned.
///
/// [Awaiting](State::Awaiting) means that there are more instructions to execute, but all input
/// has been consumed and the next instruction requires input.
///
/// [Halted](State::Halted) means that a `HALT` instruction has been executed. Once it's been
/// returned, no more instructions will be executed.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum State {
    /// Execution is awaiting input
    Awaiting,
    /// Execution has halted
    Halted,
}

/// Where a [Machine] is in its lifecycle
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Status {
    /// Not yet run, or never stopped since construction
    Ready,
    /// Blocked on an `IN` instruction with no pending input; resumable
    Awaiting,
    /// Executed a `HALT` instruction
    Halted,
    /// Stopped by a [MachineError]
    Faulted,
}

impl From<State> for Status {
    fn from(state: State) -> Self {
        match state {
            State::Awaiting => Self::Awaiting,
            State::Halted => Self::Halted,
        }
    }
}

/// An error that occured while executing an Intcode instruction.
///
/// Every variant is fatal: the machine that produced it stays faulted.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum MachineError {
    /// An invalid opcode was encountered
    #[error("unknown opcode {opcode} at position {position}")]
    UnknownOpcode {
        /// the two-digit opcode that was not recognized
        opcode: i64,
        /// instruction pointer of the offending instruction
        position: i64,
    },
    /// An unknown parameter mode was encountered
    #[error("unknown parameter mode {mode} at position {position}")]
    UnknownMode {
        /// the offending mode digit
        mode: i64,
        /// instruction pointer of the offending instruction
        position: i64,
    },
    /// An instruction tried to write to an immediate destination
    #[error("instruction at position {position} attempted to write to immediate {literal}")]
    WriteToImmediate {
        /// the literal word of the destination parameter
        literal: i64,
        /// instruction pointer of the offending instruction
        position: i64,
    },
    /// A parameter resolved to a negative address
    #[error("instruction at position {position} attempted to read negative address {address}")]
    NegativeRead {
        /// the resolved address
        address: i64,
        /// instruction pointer of the offending instruction
        position: i64,
    },
    /// A jump instruction tried to jump to a negative address
    #[error("instruction at position {position} attempted to jump to {target}")]
    JumpToNegative {
        /// the resolved jump target
        target: i64,
        /// instruction pointer of the offending instruction
        position: i64,
    },
}

/// Parameter mode for Intcode instruction
///
/// Intcode instruction parameters each have a mode:  [positional], [immediate], or [relative].
///
/// When executing an intcode instruction, the instruction's parameters are interpreted in
/// accordance with their associated modes.
///
/// [positional]: ParamMode::Positional
/// [immediate]: ParamMode::Immediate
/// [relative]: ParamMode::Relative
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ParamMode {
    /// Positional Mode
    ///
    /// A parameter in positional mode evaluates to the value at the address specified by the
    /// parameter.
    Positional = 0,
    /// Immediate Mode
    ///
    /// A parameter in immediate mode evaluates directly to the value specified. Instructions which
    /// write to memory may not use immediate mode for their destinations.
    #[doc(alias = "#")]
    Immediate = 1,
    /// Relative Mode
    ///
    /// A parameter in relative mode evaluates to the value at the address specified by the
    /// parameter, added to the [Relative Base], which starts out as `0` but can be modified
    /// throughout the program's execution.
    ///
    /// [Relative Base]: https://adventofcode.com/2019/day/9
    #[doc(alias = "@")]
    Relative = 2,
}

impl Display for ParamMode {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamMode::Positional => Ok(()),
            ParamMode::Immediate => write!(fmt, "#"),
            ParamMode::Relative => write!(fmt, "@"),
        }
    }
}

impl TryFrom<i64> for ParamMode {
    type Error = i64;
    fn try_from(i: i64) -> Result<Self, Self::Error> {
        match i {
            0 => Ok(ParamMode::Positional),
            1 => Ok(ParamMode::Immediate),
            2 => Ok(ParamMode::Relative),
            _ => Err(i),
        }
    }
}

/// The operation of an Intcode instruction, taken from the two lowest decimal digits
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[allow(missing_docs, reason = "names are the standard mnemonics")]
pub enum OpCode {
    Add = 1,
    Mul = 2,
    In = 3,
    Out = 4,
    Jnz = 5,
    Jz = 6,
    Lt = 7,
    Eq = 8,
    Rbo = 9,
    Halt = 99,
}

impl OpCode {
    /// Number of parameters the instruction takes
    pub const fn param_count(self) -> usize {
        match self {
            OpCode::Add | OpCode::Mul | OpCode::Lt | OpCode::Eq => 3,
            OpCode::Jnz | OpCode::Jz => 2,
            OpCode::In | OpCode::Out | OpCode::Rbo => 1,
            OpCode::Halt => 0,
        }
    }
}

impl TryFrom<i64> for OpCode {
    type Error = i64;
    fn try_from(op: i64) -> Result<Self, Self::Error> {
        match op {
            1 => Ok(OpCode::Add),
            2 => Ok(OpCode::Mul),
            3 => Ok(OpCode::In),
            4 => Ok(OpCode::Out),
            5 => Ok(OpCode::Jnz),
            6 => Ok(OpCode::Jz),
            7 => Ok(OpCode::Lt),
            8 => Ok(OpCode::Eq),
            9 => Ok(OpCode::Rbo),
            99 => Ok(OpCode::Halt),
            _ => Err(op),
        }
    }
}

impl Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OpCode::Add => "ADD",
            OpCode::Mul => "MUL",
            OpCode::In => "IN",
            OpCode::Out => "OUT",
            OpCode::Jnz => "JNZ",
            OpCode::Jz => "JZ",
            OpCode::Lt => "LT",
            OpCode::Eq => "EQ",
            OpCode::Rbo => "RBO",
            OpCode::Halt => "HALT",
        })
    }
}

/// Result of executing a single instruction
pub(crate) enum StepOutcome {
    Running,
    Stopped(State),
}

#[derive(Clone)]
/// An Intcode machine, owning its memory, its pending input, and its unclaimed output.
pub struct Machine {
    index: i64,
    rel_offset: i64,
    code: Memory,
    inputs: VecDeque<i64>,
    outputs: Vec<i64>,
    status: Status,
    fault: Option<MachineError>,
    trace: Option<Trace>,
}

// ignore the trace field
impl PartialEq for Machine {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && self.rel_offset == other.rel_offset
            && self.code == other.code
            && self.inputs == other.inputs
            && self.outputs == other.outputs
            && self.status == other.status
            && self.fault == other.fault
    }
}

impl fmt::Debug for Machine {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Machine")
            .field("code", &self.code)
            .field("rbo", &self.rel_offset)
            .field("ip", &self.index)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("status", &self.status)
            .field("tracing", &self.trace.is_some())
            .finish_non_exhaustive()
    }
}

impl Index<u64> for Machine {
    type Output = i64;

    fn index(&self, i: u64) -> &Self::Output {
        self.code.index(i)
    }
}

impl IndexMut<u64> for Machine {
    fn index_mut(&mut self, i: u64) -> &mut Self::Output {
        self.code.index_mut(i)
    }
}

impl Machine {
    /// Create a new machine with no pending input. Collects `code` into the starting memory state.
    pub fn new(code: impl IntoIterator<Item = i64>) -> Self {
        Self::with_inputs(code, [])
    }

    /// Create a new machine whose input queue starts out holding `inputs`
    pub fn with_inputs(
        code: impl IntoIterator<Item = i64>,
        inputs: impl IntoIterator<Item = i64>,
    ) -> Self {
        Self {
            index: 0,
            rel_offset: 0,
            code: code.into_iter().collect(),
            inputs: inputs.into_iter().collect(),
            outputs: Vec::new(),
            status: Status::Ready,
            fault: None,
            trace: None,
        }
    }

    /// Queue up a single input value. Legal at any time, including while awaiting input.
    pub fn push_input(&mut self, value: i64) {
        self.inputs.push_back(value);
    }

    /// Queue up every value in `inputs`, in order
    pub fn extend_inputs(&mut self, inputs: impl IntoIterator<Item = i64>) {
        self.inputs.extend(inputs);
    }

    /// Number of input values that have been pushed but not yet consumed
    pub fn pending_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Take any output that hasn't been returned by [`run`](Self::run) yet.
    ///
    /// This is only ever non-empty after a run ended in a [MachineError], as successful runs
    /// return their output directly.
    pub fn take_outputs(&mut self) -> Vec<i64> {
        std::mem::take(&mut self.outputs)
    }

    /// Get the memory at `address`. Addresses that were never written read as `0`.
    #[doc(alias = "peek")]
    pub fn read(&self, address: u64) -> i64 {
        self.code.read(address)
    }

    /// Manually set a memory location, growing memory if needed
    #[doc(alias("poke", "mem_override"))]
    pub fn write(&mut self, address: u64, value: i64) {
        self.code.write(address, value);
    }

    /// Set the "noun" and "verb" at addresses 1 and 2, as the 1202 program alarm puzzles do
    pub fn set_noun_verb(&mut self, noun: i64, verb: i64) {
        self.write(1, noun);
        self.write(2, verb);
    }

    /// The contiguous memory cells from address 0 up
    ///
    /// Cells written far past the end of the program are left out. Use [`Machine::read`] to see
    /// them.
    pub fn memory(&self) -> &[i64] {
        self.code.as_slice()
    }

    /// The address of the next instruction, or [`HALTED_POSITION`] once halted or faulted
    pub fn instruction_pointer(&self) -> i64 {
        self.index
    }

    /// The current relative base
    pub fn relative_base(&self) -> i64 {
        self.rel_offset
    }

    /// The machine's current [Status]
    pub fn status(&self) -> Status {
        self.status
    }

    /// Whether a `HALT` instruction has been executed
    pub fn is_halted(&self) -> bool {
        self.status == Status::Halted
    }

    /// The error that faulted the machine, if any
    pub fn fault(&self) -> Option<&MachineError> {
        self.fault.as_ref()
    }

    fn exec_instruction(&mut self) -> Result<StepOutcome, MachineError> {
        let (opcode, modes) = self.decode()?;
        trace!(
            ip = self.index,
            rbo = self.rel_offset,
            instruction = self.word(0),
            %opcode,
            "executing instruction"
        );

        match opcode {
            OpCode::Add => self.op3(modes, i64::wrapping_add),
            OpCode::Mul => self.op3(modes, i64::wrapping_mul),
            OpCode::In => {
                let Some(&input) = self.inputs.front() else {
                    return Ok(StepOutcome::Stopped(State::Awaiting));
                };
                let dest = self.resolve_dest(modes[0], 1)?;
                self.inputs.pop_front();
                self.record(&[(self.word(1), dest)], Some(input));
                self.store(dest, input);
                self.index += 2;
                Ok(StepOutcome::Running)
            }
            OpCode::Out => {
                let val = self.resolve_param(modes[0], 1)?;
                self.record(&[(self.word(1), val)], None);
                self.outputs.push(val);
                self.index += 2;
                Ok(StepOutcome::Running)
            }
            OpCode::Jnz => self.jump(modes, |v| v != 0),
            OpCode::Jz => self.jump(modes, |v| v == 0),
            OpCode::Lt => self.op3(modes, |a, b| i64::from(a < b)),
            OpCode::Eq => self.op3(modes, |a, b| i64::from(a == b)),
            OpCode::Rbo => {
                let val = self.resolve_param(modes[0], 1)?;
                self.record(&[(self.word(1), val)], None);
                self.rel_offset = self.rel_offset.wrapping_add(val);
                self.index += 2;
                Ok(StepOutcome::Running)
            }
            OpCode::Halt => {
                self.record(&[], None);
                self.index = HALTED_POSITION;
                Ok(StepOutcome::Stopped(State::Halted))
            }
        }
    }

    /// Execute until either the program halts, or it tries to read nonexistent input.
    ///
    /// Returns `Ok((v, s))`, where `v` is a [`Vec<i64>`] containing all output produced since the
    /// previous return, and `s` is the [`State`] at the time it stopped. A machine that is awaiting
    /// input resumes at the `IN` instruction it stopped on.
    ///
    /// On error, it will return a [`MachineError`] that reflects the error. The machine is then
    /// faulted, and every later call returns that same error without executing anything.
    ///
    /// # Panics
    ///
    /// Panics if an instruction writes to a negative address.
    pub fn run(&mut self) -> Result<(Vec<i64>, State), MachineError> {
        if let Some(err) = &self.fault {
            return Err(err.clone());
        }
        if self.status == Status::Halted {
            return Ok((self.take_outputs(), State::Halted));
        }

        let state = loop {
            match self.exec_instruction() {
                Ok(StepOutcome::Running) => (),
                Ok(StepOutcome::Stopped(state)) => break state,
                Err(err) => {
                    debug!(error = %err, "machine faulted");
                    self.index = HALTED_POSITION;
                    self.status = Status::Faulted;
                    self.fault = Some(err.clone());
                    return Err(err);
                }
            }
        };

        self.status = state.into();
        debug!(
            ?state,
            ip = self.index,
            outputs = self.outputs.len(),
            "machine stopped"
        );
        Ok((self.take_outputs(), state))
    }

    /// Queue up `inputs`, then [`run`](Self::run).
    pub fn run_through_inputs(
        &mut self,
        inputs: impl IntoIterator<Item = i64>,
    ) -> Result<(Vec<i64>, State), MachineError> {
        self.extend_inputs(inputs);
        self.run()
    }
}
