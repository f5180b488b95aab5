// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

use thiserror::Error;

/// Failures bubbled up from an embedder-supplied [`crate::surface::Surface`].
///
/// Logic violations such as popping an empty state stack or disposing the
/// root layer are tolerated silently rather than represented here — they
/// are not failures of the raster target.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("raster target rejected the operation: {0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, SurfaceError>;
