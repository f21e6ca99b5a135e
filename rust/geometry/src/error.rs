// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use planesolve_core::EntityId;
use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during construction and solving
#[derive(Error, Debug)]
pub enum Error {
    #[error("Collinear points do not define a circle")]
    CollinearPoints,

    #[error("Entity not found: #{0}")]
    MissingEntity(EntityId),

    #[error("Core error: {0}")]
    Core(#[from] planesolve_core::Error),
}
