// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module defines the `Participant` enum, which represents the four kinds
//! of participants that power can flow between.

use std::fmt::Display;

/// One of the four trunks of the diagram.
///
/// Power always flows *between* participants: generation feeds the grid,
/// batteries and consumers; the grid feeds batteries and consumers; batteries
/// feed the grid and consumers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Participant {
    Generation,
    Grid,
    Batteries,
    Consumers,
}

impl Participant {
    /// All participants, in the order they are laid out in a diagram.
    pub const ALL: [Participant; 4] = [
        Participant::Generation,
        Participant::Grid,
        Participant::Batteries,
        Participant::Consumers,
    ];

    /// Returns true if power can flow from `self` into `to`.
    pub fn can_feed(&self, to: Participant) -> bool {
        matches!(
            (self, to),
            (Participant::Generation, Participant::Grid)
                | (Participant::Generation, Participant::Batteries)
                | (Participant::Generation, Participant::Consumers)
                | (Participant::Grid, Participant::Batteries)
                | (Participant::Grid, Participant::Consumers)
                | (Participant::Batteries, Participant::Grid)
                | (Participant::Batteries, Participant::Consumers)
        )
    }
}

impl Display for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Participant::Generation => write!(f, "Generation"),
            Participant::Grid => write!(f, "Grid"),
            Participant::Batteries => write!(f, "Batteries"),
            Participant::Consumers => write!(f, "Consumers"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Participant;

    #[test]
    fn test_can_feed() {
        assert!(Participant::Generation.can_feed(Participant::Grid));
        assert!(Participant::Batteries.can_feed(Participant::Grid));
        assert!(!Participant::Grid.can_feed(Participant::Generation));
        assert!(!Participant::Consumers.can_feed(Participant::Batteries));
        for p in Participant::ALL {
            assert!(!p.can_feed(p), "{p} must not feed itself");
        }
    }
}
