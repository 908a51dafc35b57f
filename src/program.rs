// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Parsing Intcode programs from their comma-separated text form
//!
//! ```
//! use intcode::prelude::*;
//! let mut machine: Machine = "104, 1125899906842624,\n99\n".parse().unwrap();
//! assert_eq!(machine.run().unwrap(), (vec![1125899906842624], State::Halted));
//! ```

use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

use crate::Machine;

/// An error encountered while parsing program text
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ParseError {
    /// The program text contained nothing but whitespace
    #[error("program is empty")]
    Empty,
    /// A comma-separated field wasn't a valid 64-bit integer
    #[error("field {index} ({text:?}) is not a valid integer: {source}")]
    InvalidInt {
        /// 0-based position of the field within the program
        index: usize,
        /// the offending field, trimmed
        text: Box<str>,
        /// why it failed to parse
        source: ParseIntError,
    },
}

/// Parse comma-separated signed decimal integers into a program.
///
/// Whitespace around the whole program and around each field is ignored, so a trailing newline
/// is fine, but an empty field is not.
pub fn parse_program(text: &str) -> Result<Vec<i64>, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::Empty);
    }
    text.split(',')
        .map(str::trim)
        .enumerate()
        .map(|(index, field)| {
            field.parse().map_err(|source| ParseError::InvalidInt {
                index,
                text: Box::from(field),
                source,
            })
        })
        .collect()
}

impl FromStr for Machine {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_program(s).map(Machine::new)
    }
}
