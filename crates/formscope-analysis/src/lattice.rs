//! Instantaneous team shape.
//!
//! A [`Lattice`] is the complete graph of relative positions between a
//! team's outfield players in one tracking frame. Positions are stored
//! relative to the team's center of mass; displacements between players are
//! translation invariant and are what formations aggregate.
//!
//! # Example
//!
//! ```
//! use formscope_analysis::{lattice::Lattice, roster::ExcludedRoles};
//! use formscope_tracking::{DirectionFlip, PlayerRecord};
//!
//! let players = [
//!     PlayerRecord::new(1, -50.0, 0.0), // goalkeeper
//!     PlayerRecord::new(4, -20.0, 10.0),
//!     PlayerRecord::new(5, -20.0, -10.0),
//!     PlayerRecord::new(9, 10.0, 0.0),
//! ];
//! let lattice = Lattice::build(
//!     &players,
//!     &ExcludedRoles::new([1]),
//!     312.4,
//!     DirectionFlip::Forward,
//! )
//! .unwrap();
//!
//! assert_eq!(lattice.roster().numbers(), &[4, 5, 9]);
//! let d = lattice.node(4).unwrap().neighbour(5).unwrap();
//! assert_eq!(d.distance, 20.0);
//! ```

use formscope_tracking::{DirectionFlip, PlayerRecord, Vec2};

use crate::{
    graph::{Displacement, DisplacementTable, Node},
    roster::{DuplicateJersey, ExcludedRoles, Roster},
};

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum LatticeError {
    #[display("no outfield players in frame at t={timestamp:.2}s")]
    EmptyLattice { timestamp: f64 },
    #[display("frame at t={timestamp:.2}s: {duplicate}")]
    DuplicatePlayer {
        timestamp: f64,
        duplicate: DuplicateJersey,
    },
}

/// Relative-position graph of one team at one instant.
#[derive(Debug, Clone)]
pub struct Lattice {
    roster: Roster,
    positions: Vec<Vec2>,
    displacements: DisplacementTable,
    timestamp: f64,
    direction_flip: DirectionFlip,
}

impl Lattice {
    /// Builds the lattice for the players of one team in one frame.
    ///
    /// Players whose jersey number is in `excluded` are left out. Every
    /// position is multiplied by the sign of `direction_flip` before any
    /// geometry is computed.
    pub fn build(
        players: &[PlayerRecord],
        excluded: &ExcludedRoles,
        timestamp: f64,
        direction_flip: DirectionFlip,
    ) -> Result<Self, LatticeError> {
        let mut outfield = players
            .iter()
            .filter(|p| !excluded.contains(p.number))
            .map(|p| (p.number, direction_flip.apply(p.position())))
            .collect::<Vec<_>>();
        outfield.sort_unstable_by_key(|(number, _)| *number);

        let roster = Roster::new(outfield.iter().map(|(number, _)| *number))
            .map_err(|duplicate| LatticeError::DuplicatePlayer {
                timestamp,
                duplicate,
            })?;
        let raw = outfield.into_iter().map(|(_, pos)| pos).collect::<Vec<_>>();
        let com = Vec2::centroid(raw.iter().copied())
            .ok_or(LatticeError::EmptyLattice { timestamp })?;

        let displacements = DisplacementTable::from_fn(raw.len(), |from, to| raw[to] - raw[from]);
        let positions = raw.into_iter().map(|pos| pos - com).collect();

        Ok(Self {
            roster,
            positions,
            displacements,
            timestamp,
            direction_flip,
        })
    }

    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.roster.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    /// Game-clock time of the frame the lattice was built from.
    #[must_use]
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    #[must_use]
    pub fn direction_flip(&self) -> DirectionFlip {
        self.direction_flip
    }

    #[must_use]
    pub fn node(&self, number: u32) -> Option<Node<'_>> {
        let index = self.roster.index_of(number)?;
        Some(self.node_at(index))
    }

    pub fn nodes(&self) -> impl Iterator<Item = Node<'_>> + '_ {
        (0..self.len()).map(|index| self.node_at(index))
    }

    /// Displacement between two players addressed by roster index.
    #[must_use]
    pub fn displacement(&self, from: usize, to: usize) -> Displacement {
        self.displacements.get(from, to)
    }

    fn node_at(&self, index: usize) -> Node<'_> {
        Node::new(&self.roster, &self.displacements, index, self.positions[index])
    }
}
