// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! An opt-in, in-memory record of the instructions a [Machine] executes
use std::fmt::{self, Display};

use itertools::Itertools;

use super::{Machine, OpCode, ParamMode};

#[derive(Clone, Debug, PartialEq)]
/// Information about an instruction that was executed, which can be queried with its various
/// methods, or converted into a [String] using its [Display] impl.
pub struct TracedInstr {
    op_int: i64,
    instr_ptr: i64,
    rel_base: i64,
    opcode: OpCode,
    modes: [ParamMode; 3],
    params: Vec<(i64, i64)>,
    stored: Option<i64>,
}

impl TracedInstr {
    /// Return the relative base at the time the traced instruction was executed
    pub fn rel_base(&self) -> i64 {
        self.rel_base
    }

    /// Return the instruction pointer's position when the traced instruction was executed
    pub fn instr_ptr(&self) -> i64 {
        self.instr_ptr
    }

    /// Return the actual integer of the traced instruction
    pub fn op_int(&self) -> i64 {
        self.op_int
    }

    /// Return the opcode of the traced instruction
    pub fn op_code(&self) -> OpCode {
        self.opcode
    }

    /// If the instruction stored a value, return that value
    pub fn stored_val(&self) -> Option<i64> {
        self.stored
    }

    /// Return an array of the parameter modes of the traced instruction
    pub fn param_modes(&self) -> [ParamMode; 3] {
        self.modes
    }

    /// Return each parameter as its literal word paired with what it resolved to.
    ///
    /// Destinations resolve to the address written to, everything else to the value read.
    pub fn params(&self) -> &[(i64, i64)] {
        &self.params
    }

    pub(super) fn build(
        op_int: i64,
        instr_ptr: i64,
        rel_base: i64,
        resolved_params: &[(i64, i64)],
        stored: Option<i64>,
    ) -> Self {
        let opcode = OpCode::try_from(op_int % 100)
            .unwrap_or_else(|op| unreachable!("traced undecodable opcode {op}"));
        debug_assert_eq!(resolved_params.len(), opcode.param_count());
        let mut modes = [ParamMode::Positional; 3];
        let mut divisor = 100;
        for mode in modes.iter_mut().take(opcode.param_count()) {
            *mode = ParamMode::try_from(op_int / divisor % 10).unwrap_or(ParamMode::Positional);
            divisor *= 10;
        }
        Self {
            op_int,
            instr_ptr,
            rel_base,
            opcode,
            modes,
            params: resolved_params.to_vec(),
            stored,
        }
    }
}

impl Machine {
    /// Begin a [Trace] of executed instructions. If a trace is already running, this replaces that
    /// trace and returns it in a [`Some`], otherwise, it returns [`None`].
    ///
    /// # Example
    /// ```
    ///# use intcode::prelude::*;
    /// let mut machine = Machine::new([1101, 90, 9, 4, 99]);
    /// machine.start_trace();
    /// machine.run().unwrap();
    /// let trace = machine.end_trace().unwrap();
    /// assert_eq!(trace.0.len(), 2);
    /// assert_eq!(trace.0[0].stored_val(), Some(99));
    /// ```
    pub fn start_trace(&mut self) -> Option<Trace> {
        self.trace.replace(Trace::new())
    }

    /// Stop tracing executed instructions into a [Trace]. If no trace was active, returns [`None`]
    ///
    /// see [Machine::start_trace]
    pub fn end_trace(&mut self) -> Option<Trace> {
        self.trace.take()
    }

    /// Get a view of the current trace
    pub fn show_trace(&self) -> Option<&Trace> {
        self.trace.as_ref()
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
/// A log of instructions that a [Machine] has executed since a call to [Machine::start_trace]
///
/// see [Machine::start_trace]
pub struct Trace(pub Vec<TracedInstr>);

impl Trace {
    pub(crate) fn push(&mut self, instr: TracedInstr) {
        self.0.push(instr);
    }

    pub(crate) fn new() -> Self {
        Self(Vec::new())
    }
}

impl Display for TracedInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ran instruction at {:0>4}: op int {: <5} | ",
            self.instr_ptr, self.op_int
        )?;
        let params = self
            .params
            .iter()
            .zip(self.modes)
            .map(|(&(literal, resolved), mode)| format!("{mode}{literal} (resolves to {resolved})"))
            .join(", ");

        match self.opcode {
            OpCode::Halt => write!(f, "[HALT]"),
            OpCode::Rbo => write!(
                f,
                "[RBO {params} (went from {} to {})]",
                self.rel_base,
                self.rel_base.wrapping_add(self.params[0].1),
            ),
            OpCode::Jnz | OpCode::Jz => {
                let jumped = (self.params[0].1 != 0) == (self.opcode == OpCode::Jnz);
                write!(
                    f,
                    "[{} {params} ({})]",
                    self.opcode,
                    if jumped { "jumped" } else { "didn't jump" }
                )
            }
            opcode => match self.stored {
                Some(val) => write!(f, "[{opcode} {params} (stored {val})]"),
                None => write!(f, "[{opcode} {params}]"),
            },
        }
    }
}
