// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by [`DualLoop`](crate::DualLoop).

use std::io;

use crate::ContextError;

/// Failures of the loop scheduler. All of them are fatal to the current run.
#[derive(Debug, thiserror::Error)]
pub enum LoopError {
    /// Binding, unbinding or using the graphics context failed.
    #[error("graphics context handoff failed")]
    Context(#[from] ContextError),
    /// A worker thread could not be started.
    #[error("failed to spawn the {name} thread")]
    Spawn {
        /// Which loop.
        name: &'static str,
        /// Cause.
        #[source]
        source: io::Error,
    },
    /// A worker thread panicked.
    #[error("the {0} thread panicked")]
    ThreadPanicked(&'static str),
    /// The application was lost with a panicked update thread.
    #[error("no application to hand back")]
    ApplicationLost,
}
