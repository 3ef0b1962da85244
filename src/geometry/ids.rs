// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Arena handles for mesh elements

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel index stored in a link that points nowhere
pub(crate) const ABSENT: usize = usize::MAX;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub(crate) usize);

        impl $name {
            pub(crate) const NONE: Self = Self(ABSENT);

            /// Position of the element in its arena
            pub fn index(self) -> usize {
                self.0
            }

            pub(crate) fn is_absent(self) -> bool {
                self.0 == ABSENT
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::NONE
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_absent() {
                    write!(f, "{}(-)", $label)
                } else {
                    write!(f, "{}({})", $label, self.0)
                }
            }
        }
    };
}

define_id!(
    /// Handle to a vertex
    VertexId,
    "v"
);
define_id!(
    /// Handle to an undirected edge
    EdgeId,
    "e"
);
define_id!(
    /// Handle to one face's use of an edge
    FaceEdgeId,
    "fe"
);
define_id!(
    /// Handle to a face
    FaceId,
    "f"
);
