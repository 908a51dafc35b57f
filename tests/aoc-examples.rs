//! Worked examples from the 2019 Advent of Code puzzles, checked against their stated results,
//! plus a few properties of suspending and resuming machines.
// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

use either::Either;
use intcode::network::{Amplifiers, Topology, best_phase_setting};
use intcode::prelude::*;
use intcode::trace::{Trace, TracedInstr};
use intcode::{OpCode, ParamMode};
use itertools::Itertools;

/// `Machine::new` over a literal program
macro_rules! machine {
    [$($i:expr),*] => {{
        Machine::new([$($i),*])
    }}
}

/// Feed `inputs` and run until the machine stops.
///
/// Stopping anywhere but `Halted` is an error. The machine stays with the caller so its memory
/// and trace can be checked afterwards.
fn run_to_end(
    machine: &mut Machine,
    inputs: impl IntoIterator<Item = i64>,
) -> Result<Vec<i64>, Either<MachineError, Awaiting>> {
    let (output, state) = machine.run_through_inputs(inputs).map_err(Either::Left)?;
    if state == State::Halted {
        Ok(output)
    } else {
        Err(Either::Right(Awaiting { output }))
    }
}

/// What one recorded instruction should look like
struct Step {
    op_int: i64,
    instr_ptr: i64,
    stored_val: Option<i64>,
}

impl Step {
    const fn new(op_int: i64, instr_ptr: i64, stored_val: Option<i64>) -> Self {
        Self {
            op_int,
            instr_ptr,
            stored_val,
        }
    }

    fn check(self, traced: TracedInstr) {
        assert_eq!(self.op_int, traced.op_int());
        assert_eq!(self.instr_ptr, traced.instr_ptr());
        assert_eq!(self.stored_val, traced.stored_val());
    }
}

fn assert_trace(expected: impl IntoIterator<Item = Step>, Trace(trace): Trace) {
    expected
        .into_iter()
        .zip_eq(trace)
        .for_each(|(step, instr)| step.check(instr))
}

mod day2_examples {
    mod part1 {
        use crate::*;

        /// The walkthrough program: add into position 3, multiply into position 0, halt
        #[test]
        fn extended_example() {
            let mut machine = machine![1, 9, 10, 3, 2, 3, 11, 0, 99, 30, 40, 50];
            machine.start_trace();
            let output = run_to_end(&mut machine, empty()).unwrap();
            assert!(output.is_empty());
            const EXPECTED: [Step; 3] = [
                Step::new(1, 0, Some(70)),
                Step::new(2, 4, Some(3500)),
                Step::new(99, 8, None),
            ];
            assert_trace(EXPECTED, machine.end_trace().unwrap());
            assert_eq!(machine.read(0), 3500);
        }

        /// Short programs given as initial memory and the memory they leave behind
        #[test]
        fn small_examples() {
            macro_rules! example {
                ($($code: literal),+ becomes $($output: literal),+) => {{
                    let mut machine = machine![$($code),*];
                    run_to_end(&mut machine, []).unwrap();
                    assert_eq!(machine.memory(), [$($output),+].as_slice());
                }}
            }
            example!(1,0,0,0,99 becomes 2,0,0,0,99);
            example!(2,3,0,3,99 becomes 2,3,0,6,99);
            example!(2,4,4,5,99,0 becomes 2,4,4,5,99,9801);
            example!(1,1,1,4,99,5,6,0,99 becomes 30,1,1,4,2,5,6,0,99);
        }
    }
}

mod day5_examples {
    mod part1 {
        use crate::*;

        #[test]
        fn echo_input() {
            let template = machine![3, 0, 4, 0, 99];
            for i in -128..128 {
                assert_eq!(run_to_end(&mut template.clone(), [i]).unwrap(), vec![i]);
            }
        }

        #[test]
        fn immediate_mode_example() {
            let mut machine = machine![1002, 4, 3, 4, 33];
            machine.start_trace();
            let output = run_to_end(&mut machine, []).unwrap();
            assert!(output.is_empty());
            assert_eq!(machine[4], 99);
            const EXPECTED: [Step; 2] = [
                Step::new(1002, 0, Some(99)),
                Step::new(99, 4, None),
            ];
            let trace = machine.end_trace().unwrap();
            assert_eq!(
                trace.0[0].param_modes(),
                [
                    ParamMode::Positional,
                    ParamMode::Immediate,
                    ParamMode::Positional
                ]
            );
            assert_trace(EXPECTED, trace);
        }

        #[test]
        fn negative_immediate() {
            let mut machine = machine![1101, 100, -1, 4, 0];
            run_to_end(&mut machine, []).unwrap();
            assert_eq!(machine[4], 99);
        }
    }
    mod part2 {
        use crate::*;

        #[test]
        fn comparison_examples() {
            let templates = [
                machine![3, 9, 8, 9, 10, 9, 4, 9, 99, -1, 8],
                machine![3, 9, 7, 9, 10, 9, 4, 9, 99, -1, 8],
                machine![3, 3, 1108, -1, 8, 3, 4, 3, 99],
                machine![3, 3, 1107, -1, 8, 3, 4, 3, 99],
            ];

            let expected_builder = |mode, cmp_op, input| {
                let val = if cmp_op == OpCode::Lt {
                    input < 8
                } else {
                    input == 8
                } as i64;
                let expected = [
                    Step::new(OpCode::In as i64, 0, Some(input)),
                    Step::new(cmp_op as i64 + (mode as i64 * 1100), 2, Some(val)),
                    Step::new(OpCode::Out as i64, 6, None),
                    Step::new(OpCode::Halt as i64, 8, None),
                ];
                (expected, val)
            };

            let expected = |i: i64| {
                [
                    expected_builder(ParamMode::Positional, OpCode::Eq, i),
                    expected_builder(ParamMode::Positional, OpCode::Lt, i),
                    expected_builder(ParamMode::Immediate, OpCode::Eq, i),
                    expected_builder(ParamMode::Immediate, OpCode::Lt, i),
                ]
            };

            for input in [7, 8, 9] {
                let mut machines = templates.clone();
                let expected_traces = expected(input);
                for (machine, (trace, out)) in machines.iter_mut().zip(expected_traces) {
                    machine.start_trace();
                    let output = run_to_end(machine, [input]).unwrap();
                    assert_eq!(output, vec![out]);
                    assert_trace(trace, machine.end_trace().unwrap());
                }
            }
        }

        #[test]
        fn jump_examples() {
            let templates = [
                machine![3, 12, 6, 12, 15, 1, 13, 14, 13, 4, 13, 99, -1, 0, 1, 9],
                machine![3, 3, 1105, -1, 9, 1101, 0, 0, 12, 4, 12, 99, 1],
            ];

            for (input, expected) in [(0, 0), (1, 1), (-5, 1)] {
                for machine in templates.iter() {
                    let mut machine = machine.clone();
                    machine.start_trace();
                    assert_eq!(run_to_end(&mut machine, [input]).unwrap(), vec![expected]);
                    let Trace(trace) = machine.end_trace().unwrap();
                    assert_eq!(trace[1].op_code() as i64, trace[1].op_int() % 100);
                }
            }
        }

        #[test]
        fn larger_example() {
            let template = machine![
                3, 21, 1008, 21, 8, 20, 1005, 20, 22, 107, 8, 21, 20, 1006, 20, 31, 1106, 0, 36,
                98, 0, 0, 1002, 21, 125, 20, 4, 20, 1105, 1, 46, 104, 999, 1105, 1, 46, 1101, 1000,
                1, 20, 4, 20, 1105, 1, 46, 98, 99
            ];
            for (input, expected) in [(6, 999), (7, 999), (8, 1000), (9, 1001), (100, 1001)] {
                assert_eq!(
                    run_to_end(&mut template.clone(), [input]).unwrap(),
                    vec![expected]
                );
            }
        }
    }
}

mod day7_examples {
    mod part1 {
        use crate::*;

        #[test]
        fn max_thruster_signals() {
            let examples: [(&[i64], [i64; 5], i64); 3] = [
                (
                    &[3, 15, 3, 16, 1002, 16, 10, 16, 1, 16, 15, 15, 4, 15, 99, 0, 0],
                    [4, 3, 2, 1, 0],
                    43210,
                ),
                (
                    &[
                        3, 23, 3, 24, 1002, 24, 10, 24, 1002, 23, -1, 23, 101, 5, 23, 23, 1, 24,
                        23, 23, 4, 23, 99, 0, 0,
                    ],
                    [0, 1, 2, 3, 4],
                    54321,
                ),
                (
                    &[
                        3, 31, 3, 32, 1002, 32, 10, 32, 1001, 31, -2, 31, 1007, 31, 0, 33, 1002,
                        33, 7, 33, 1, 33, 31, 31, 1, 32, 31, 31, 4, 31, 99, 0, 0, 0,
                    ],
                    [1, 0, 4, 3, 2],
                    65210,
                ),
            ];
            for (program, phases, signal) in examples {
                assert_eq!(
                    best_phase_setting(program, &[0, 1, 2, 3, 4], Topology::Series, 0),
                    Ok((phases.to_vec(), signal))
                );
            }
        }
    }

    mod part2 {
        use crate::*;

        #[test]
        fn max_feedback_signals() {
            let examples: [(&[i64], [i64; 5], i64); 2] = [
                (
                    &[
                        3, 26, 1001, 26, -4, 26, 3, 27, 1002, 27, 2, 27, 1, 27, 26, 27, 4, 27,
                        1001, 28, -1, 28, 1005, 28, 6, 99, 0, 0, 5,
                    ],
                    [9, 8, 7, 6, 5],
                    139629729,
                ),
                (
                    &[
                        3, 52, 1001, 52, -5, 52, 3, 53, 1, 52, 56, 54, 1007, 54, 5, 55, 1005, 55,
                        26, 1001, 54, -5, 54, 1105, 1, 12, 1, 53, 54, 53, 1008, 54, 0, 55, 1001,
                        55, 1, 55, 2, 53, 55, 53, 4, 53, 1001, 56, -1, 56, 1005, 56, 6, 99, 0, 0,
                        0, 0, 10,
                    ],
                    [9, 7, 8, 5, 6],
                    18216,
                ),
            ];
            for (program, phases, signal) in examples {
                assert_eq!(
                    Amplifiers::new(program, &phases).run(Topology::Feedback, 0),
                    Ok(signal)
                );
                assert_eq!(
                    best_phase_setting(program, &[5, 6, 7, 8, 9], Topology::Feedback, 0),
                    Ok((phases.to_vec(), signal))
                );
            }
        }

        /// Wire up the feedback loop by hand, one `push_input` and `run` at a time
        #[test]
        fn hand_wired_feedback_loop() {
            let program = [
                3, 26, 1001, 26, -4, 26, 3, 27, 1002, 27, 2, 27, 1, 27, 26, 27, 4, 27, 1001, 28,
                -1, 28, 1005, 28, 6, 99, 0, 0, 5,
            ];
            let mut amps: Vec<Machine> = [9, 8, 7, 6, 5]
                .into_iter()
                .map(|phase| Machine::with_inputs(program, [phase]))
                .collect();

            let mut signal = 0;
            let mut passes = 0;
            while !amps[4].is_halted() {
                for amp in amps.iter_mut() {
                    amp.push_input(signal);
                    let (output, _) = amp.run().unwrap();
                    assert_eq!(output.len(), 1);
                    signal = output[0];
                }
                passes += 1;
                if passes < 5 {
                    assert!(amps.iter().all(|amp| amp.status() == Status::Awaiting));
                }
            }
            assert_eq!(passes, 5);
            assert_eq!(signal, 139629729);
            assert!(amps.iter().all(Machine::is_halted));
        }
    }
}

mod day9_examples {
    mod part1 {
        use crate::*;
        /// Quine: with no input, it outputs its own program
        #[test]
        fn quine() {
            let quine_code = [
                109, 1, 204, -1, 1001, 100, 1, 100, 1008, 100, 16, 101, 1006, 101, 0, 99,
            ];
            let mut machine = Machine::new(quine_code);
            let output = run_to_end(&mut machine, empty()).unwrap();
            assert_eq!(output.as_slice(), quine_code.as_slice());
            // the quine keeps its counter past the end of its own code
            assert_eq!(machine.read(100), 16);
        }

        /// Multiplies two large immediates; the product has 16 digits
        #[test]
        fn output_sixteen_digit() {
            let mut machine = machine![1102, 34915192, 34915192, 7, 4, 7, 99, 0];
            let output = run_to_end(&mut machine, empty()).unwrap();
            assert_eq!(output.len(), 1, "{output:?}");
            assert_eq!(output[0].to_string().len(), 16, "{output:?}");
        }

        /// Outputs its own immediate operand unchanged
        #[test]
        fn large_number() {
            let mut machine = machine![104, 1125899906842624, 99];
            let output = run_to_end(&mut machine, empty()).unwrap();
            assert_eq!(output, vec![1125899906842624]);
        }
    }
}

mod machine_properties {
    use crate::*;

    /// Resuming after a push must behave exactly as if the input had been there all along
    #[test]
    fn resume_matches_upfront_input() {
        let program = [3, 9, 1002, 9, 3, 9, 4, 9, 99];

        let mut resumed = Machine::new(program);
        assert_eq!(resumed.run(), Ok((vec![], State::Awaiting)));
        assert_eq!(resumed.status(), Status::Awaiting);
        assert_ne!(resumed.status(), Status::Halted);
        resumed.push_input(7);
        let resumed_result = resumed.run();

        let mut upfront = Machine::with_inputs(program, [7]);
        let upfront_result = upfront.run();

        assert_eq!(resumed_result, Ok((vec![21], State::Halted)));
        assert_eq!(resumed_result, upfront_result);
        assert_eq!(resumed.memory(), upfront.memory());
        assert_eq!(resumed, upfront);
    }

    #[test]
    fn awaiting_is_not_halted() {
        let mut machine = machine![3, 0, 99];
        assert_eq!(
            run_to_end(&mut machine, []),
            Err(Either::Right(Awaiting { output: vec![] }))
        );
        assert!(!machine.is_halted());
        assert_eq!(machine.instruction_pointer(), 0);
        assert_eq!(run_to_end(&mut machine, [1]), Ok(vec![]));
        assert!(machine.is_halted());
        assert_eq!(machine.instruction_pointer(), intcode::HALTED_POSITION);
    }

    #[test]
    fn output_is_returned_once() {
        // output the input, forever
        let mut machine = machine![3, 7, 4, 7, 1105, 1, 0];
        assert_eq!(machine.run_through_inputs([1, 2]), Ok((vec![1, 2], State::Awaiting)));
        assert_eq!(machine.run(), Ok((vec![], State::Awaiting)));
        assert_eq!(machine.run_through_inputs([3]), Ok((vec![3], State::Awaiting)));
    }

    #[test]
    fn out_of_bounds_read() {
        let mut machine = machine![4, 50, 99];
        assert_eq!(machine.read(3), 0);
        assert_eq!(machine.read(u64::MAX), 0);
        assert_eq!(run_to_end(&mut machine, []), Ok(vec![0]));
        assert_eq!(machine.memory().len(), 3);
    }

    #[test]
    fn writes_grow_memory() {
        let mut machine = machine![1101, 2, 3, 10, 99];
        run_to_end(&mut machine, []).unwrap();
        assert_eq!(machine.memory(), &[1101, 2, 3, 10, 99, 0, 0, 0, 0, 0, 5]);
        machine.write(12, -1);
        assert_eq!(machine.memory().len(), 13);
        assert_eq!(machine.read(11), 0);
    }

    #[test]
    fn unknown_opcode_faults() {
        for bad in [0, 10, 98, -1, 1234] {
            let mut machine = machine![bad, 0, 0, 0, 99];
            assert_eq!(
                run_to_end(&mut machine, []),
                Err(Either::Left(MachineError::UnknownOpcode {
                    opcode: bad % 100,
                    position: 0
                }))
            );
            assert_eq!(machine.status(), Status::Faulted);
        }
        let err = MachineError::UnknownOpcode {
            opcode: 98,
            position: 4,
        };
        assert_eq!(err.to_string(), "unknown opcode 98 at position 4");
    }
}

#[derive(Debug, PartialEq)]
struct Awaiting {
    output: Vec<i64>,
}
