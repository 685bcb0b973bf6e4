// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::NodeId;

/// Errors produced by structural edits of a [`Tree`](crate::Tree).
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    /// The requested parent is the node itself or one of its descendants.
    ///
    /// The tree is left exactly as it was before the call.
    #[error("circular reference: {child:?} cannot be parented under {parent:?}")]
    CircularReference {
        /// The node that was being attached.
        child: NodeId,
        /// The proposed parent.
        parent: NodeId,
    },
}
