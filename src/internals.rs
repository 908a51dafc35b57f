// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

use super::*;
use crate::trace::TracedInstr;

impl Machine {
    /// The int `offset` cells past the instruction pointer
    pub(crate) fn word(&self, offset: i64) -> i64 {
        self.code
            .read(self.index.wrapping_add(offset).cast_unsigned())
    }

    // Given a 5 digit number, digits ABCDE are used as follows:
    // DE is the two-digit opcode
    // C is the 1st parameter's mode
    // B is the 2nd parameter's mode
    // A is the 3rd parameter's mode
    //
    // So *0*1202 would be parsed as follows:
    //
    // Opcode 02 is multiply
    // C=2: 1st parameter is in relative mode
    // B=1: 2nd parameter is in immediate mode
    // A=0: 3rd parameter is in positional mode
    //
    // Only the digits of parameters the opcode actually takes are checked.
    pub(crate) fn decode(&self) -> Result<(OpCode, [ParamMode; 3]), MachineError> {
        let instruction = self.word(0);
        let opcode =
            OpCode::try_from(instruction % 100).map_err(|opcode| MachineError::UnknownOpcode {
                opcode,
                position: self.index,
            })?;

        let mut modes = [ParamMode::Positional; 3];
        let mut divisor = 100;
        for mode in modes.iter_mut().take(opcode.param_count()) {
            *mode = ParamMode::try_from(instruction / divisor % 10).map_err(|mode| {
                MachineError::UnknownMode {
                    mode,
                    position: self.index,
                }
            })?;
            divisor *= 10;
        }
        Ok((opcode, modes))
    }

    /// Read the int at a resolved `address`
    fn load(&self, address: i64) -> Result<i64, MachineError> {
        u64::try_from(address)
            .map(|address| self.code.read(address))
            .map_err(|_| MachineError::NegativeRead {
                address,
                position: self.index,
            })
    }

    /// Write `value` to a resolved `address`
    ///
    /// A negative destination can't come from a well-formed program, so this panics rather than
    /// reporting an error.
    pub(crate) fn store(&mut self, address: i64, value: i64) {
        let Ok(address) = u64::try_from(address) else {
            panic!(
                "instruction at position {} tried to write {value} to negative address {address}",
                self.index
            );
        };
        self.code.write(address, value);
    }

    /// Processes the parameter `offset` cells past the instruction pointer into a concrete value
    /// using the method appropriate for `mode`.
    pub(crate) fn resolve_param(&self, mode: ParamMode, offset: i64) -> Result<i64, MachineError> {
        let literal = self.word(offset);
        match mode {
            ParamMode::Positional => self.load(literal),
            ParamMode::Immediate => Ok(literal),
            ParamMode::Relative => self.load(self.rel_offset.wrapping_add(literal)),
        }
    }

    /// Processes the parameter `offset` cells past the instruction pointer into the address it
    /// writes to. Immediate-mode destinations are an error.
    pub(crate) fn resolve_dest(&self, mode: ParamMode, offset: i64) -> Result<i64, MachineError> {
        let literal = self.word(offset);
        match mode {
            ParamMode::Positional => Ok(literal),
            ParamMode::Immediate => Err(MachineError::WriteToImmediate {
                literal,
                position: self.index,
            }),
            ParamMode::Relative => Ok(self.rel_offset.wrapping_add(literal)),
        }
    }

    /// Push the current instruction to the active trace, if any.
    ///
    /// Must be called before the instruction moves the instruction pointer or relative base.
    pub(crate) fn record(&mut self, resolved_params: &[(i64, i64)], stored: Option<i64>) {
        if self.trace.is_none() {
            return;
        }
        let traced = TracedInstr::build(
            self.word(0),
            self.index,
            self.rel_offset,
            resolved_params,
            stored,
        );
        if let Some(trace) = self.trace.as_mut() {
            trace.push(traced);
        }
    }

    /// common logic of all 4 instructions that take 3 parameters
    pub(crate) fn op3(
        &mut self,
        modes: [ParamMode; 3],
        operation: impl Fn(i64, i64) -> i64,
    ) -> Result<StepOutcome, MachineError> {
        let a = self.resolve_param(modes[0], 1)?;
        let b = self.resolve_param(modes[1], 2)?;
        let dest = self.resolve_dest(modes[2], 3)?;
        let val = operation(a, b);
        self.record(
            &[(self.word(1), a), (self.word(2), b), (self.word(3), dest)],
            Some(val),
        );
        self.store(dest, val);
        self.index += 4;
        Ok(StepOutcome::Running)
    }

    pub(crate) fn jump(
        &mut self,
        modes: [ParamMode; 3],
        func: impl Fn(i64) -> bool,
    ) -> Result<StepOutcome, MachineError> {
        let expr = self.resolve_param(modes[0], 1)?;
        let dest = self.resolve_param(modes[1], 2)?;
        self.record(&[(self.word(1), expr), (self.word(2), dest)], None);
        if func(expr) {
            if dest < 0 {
                return Err(MachineError::JumpToNegative {
                    target: dest,
                    position: self.index,
                });
            }
            self.index = dest;
        } else {
            self.index += 3;
        }
        Ok(StepOutcome::Running)
    }
}
