// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::entity::EntityId;

/// Result type for planesolve core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the entity store and expression language
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unexpected character at position {0}")]
    UnexpectedChar(usize),

    #[error("Invalid number at position {0}")]
    InvalidNumber(usize),

    #[error("Unexpected token at position {position}: expected {expected}")]
    UnexpectedToken {
        position: usize,
        expected: String,
    },

    #[error("Unexpected end of expression")]
    UnexpectedEnd,

    #[error("Unresolved variable: {0}")]
    UnresolvedVariable(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Entity not found: #{0}")]
    MissingEntity(EntityId),

    #[error("Segment endpoints must be distinct")]
    DegenerateSegment,

    #[error("Variable already defined: {0}")]
    DuplicateVariable(String),
}

impl Error {
    pub fn unexpected(position: usize, expected: impl Into<String>) -> Self {
        Self::UnexpectedToken {
            position,
            expected: expected.into(),
        }
    }
}
