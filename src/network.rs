// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Networks of [Machine]s wired output-to-input, as in the amplifier circuits of [Day 7]
//!
//! Each amplifier is its own [Machine], seeded with a phase setting as its first input. A signal
//! is handed from one amplifier to the next by copying the most recent output of one into the
//! input queue of the other, so no machine ever shares state with another.
//!
//! ```
//! use intcode::network::{best_phase_setting, Topology};
//! let program = [3, 15, 3, 16, 1002, 16, 10, 16, 1, 16, 15, 15, 4, 15, 99, 0, 0];
//! let (phases, signal) = best_phase_setting(&program, &[0, 1, 2, 3, 4], Topology::Series, 0).unwrap();
//! assert_eq!(phases, vec![4, 3, 2, 1, 0]);
//! assert_eq!(signal, 43210);
//! ```
//!
//! [Day 7]: https://adventofcode.com/2019/day/7

use itertools::Itertools;
use thiserror::Error;
use tracing::debug;

use crate::{Machine, MachineError, State};

/// How the amplifiers in a network are connected
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Topology {
    /// The signal passes through each amplifier once, and each amplifier must halt
    Series,
    /// The last amplifier's output loops back into the first, until the last one halts
    Feedback,
}

/// An error that stopped a network of amplifiers
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum NetworkError {
    /// An amplifier's machine faulted
    #[error("amplifier {stage} faulted: {source}")]
    Fault {
        /// index of the amplifier
        stage: usize,
        /// the underlying fault
        source: MachineError,
    },
    /// An amplifier stopped without producing any output to pass along
    #[error("amplifier {stage} produced no output")]
    NoOutput {
        /// index of the amplifier
        stage: usize,
    },
    /// An amplifier in a series network was still awaiting input after its only turn
    #[error("amplifier {stage} did not halt after its only turn")]
    Stalled {
        /// index of the amplifier
        stage: usize,
    },
    /// The network has no amplifiers
    #[error("network has no amplifiers")]
    Empty,
}

/// A chain of amplifiers, each running its own copy of a program
#[derive(Debug, Clone)]
pub struct Amplifiers {
    machines: Vec<Machine>,
}

impl Amplifiers {
    /// Build one amplifier per entry of `phases`, each running a copy of `program` with its phase
    /// setting queued as its first input.
    pub fn new(program: &[i64], phases: &[i64]) -> Self {
        let machines = phases
            .iter()
            .map(|&phase| Machine::with_inputs(program.iter().copied(), [phase]))
            .collect();
        Self { machines }
    }

    /// The amplifiers' machines, in signal order
    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    /// Hand `signal` to amplifier `stage`, run it, and return its most recent output
    fn run_stage(&mut self, stage: usize, signal: i64) -> Result<(i64, State), NetworkError> {
        let machine = &mut self.machines[stage];
        machine.push_input(signal);
        let (outputs, state) = machine
            .run()
            .map_err(|source| NetworkError::Fault { stage, source })?;
        let output = outputs
            .last()
            .copied()
            .ok_or(NetworkError::NoOutput { stage })?;
        debug!(stage, signal, output, ?state, "amplifier passed signal");
        Ok((output, state))
    }

    /// Pass `signal` through every amplifier once, returning the last amplifier's output
    pub fn run_series(&mut self, signal: i64) -> Result<i64, NetworkError> {
        if self.machines.is_empty() {
            return Err(NetworkError::Empty);
        }
        (0..self.machines.len()).try_fold(signal, |signal, stage| {
            match self.run_stage(stage, signal)? {
                (output, State::Halted) => Ok(output),
                (_, State::Awaiting) => Err(NetworkError::Stalled { stage }),
            }
        })
    }

    /// Pass `signal` around the loop of amplifiers until the last one halts, returning its final
    /// output
    pub fn run_feedback(&mut self, mut signal: i64) -> Result<i64, NetworkError> {
        if self.machines.is_empty() {
            return Err(NetworkError::Empty);
        }
        let last = self.machines.len() - 1;
        loop {
            for stage in 0..=last {
                let (output, state) = self.run_stage(stage, signal)?;
                signal = output;
                if stage == last && state == State::Halted {
                    return Ok(signal);
                }
            }
        }
    }

    /// Run with the given [Topology]
    pub fn run(&mut self, topology: Topology, signal: i64) -> Result<i64, NetworkError> {
        match topology {
            Topology::Series => self.run_series(signal),
            Topology::Feedback => self.run_feedback(signal),
        }
    }
}

/// Try every ordering of `phases`, returning the ordering that produces the highest final signal
/// along with that signal.
///
/// Any error from any ordering is returned immediately.
pub fn best_phase_setting(
    program: &[i64],
    phases: &[i64],
    topology: Topology,
    signal: i64,
) -> Result<(Vec<i64>, i64), NetworkError> {
    let attempts = phases
        .iter()
        .copied()
        .permutations(phases.len())
        .map(|order| {
            Amplifiers::new(program, &order)
                .run(topology, signal)
                .map(|output| (order, output))
        });
    itertools::process_results(attempts, |attempts| {
        attempts.max_by_key(|&(_, output)| output)
    })?
    .ok_or(NetworkError::Empty)
}
