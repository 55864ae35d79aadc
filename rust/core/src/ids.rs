// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stable identities for model entities.
//!
//! Ids come from the host model and stay valid for the lifetime of the model,
//! so they are plain integers rather than arena keys.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! model_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

model_id!(
    /// Id of a building element (door, equipment, wall, ...).
    ElementId
);
model_id!(
    /// Id of a room / space.
    RoomId
);
model_id!(
    /// Id of a level.
    LevelId
);

/// A named point-in-time view of the model (e.g. "Existing", "New Construction").
///
/// Room relationships are always phase-scoped. Phases are compared by name so
/// the same phase can be addressed in a linked document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phase(String);

impl Phase {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Phase {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_with_hash() {
        assert_eq!(ElementId(42).to_string(), "#42");
        assert_eq!(RoomId::from(7).to_string(), "#7");
    }

    #[test]
    fn ids_serialize_transparently() {
        assert_eq!(serde_json::to_string(&LevelId(3)).unwrap(), "3");
        let phase: Phase = serde_json::from_str("\"New Construction\"").unwrap();
        assert_eq!(phase, Phase::from("New Construction"));
        assert_eq!(phase.name(), "New Construction");
    }
}
