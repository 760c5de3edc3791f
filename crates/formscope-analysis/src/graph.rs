//! Complete relative-position graphs over a [`Roster`].

use formscope_tracking::Vec2;

use crate::roster::Roster;

/// Vector and distance from one player to another.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Displacement {
    pub offset: Vec2,
    pub distance: f64,
}

impl Displacement {
    #[must_use]
    pub fn new(offset: Vec2) -> Self {
        Self {
            offset,
            distance: offset.length(),
        }
    }
}

/// Dense `n x n` table of displacements addressed by roster index.
///
/// Row `i` holds the displacements from player `i` to every player. The
/// diagonal is kept as a zero entry but never reported as a neighbour.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplacementTable {
    size: usize,
    cells: Vec<Displacement>,
}

impl DisplacementTable {
    /// Fills the table from a function of `(from, to)` indices.
    ///
    /// `offset` is only called for `from != to`.
    pub fn from_fn<F>(size: usize, mut offset: F) -> Self
    where
        F: FnMut(usize, usize) -> Vec2,
    {
        let mut cells = Vec::with_capacity(size * size);
        for from in 0..size {
            for to in 0..size {
                let cell = if from == to {
                    Displacement::default()
                } else {
                    Displacement::new(offset(from, to))
                };
                cells.push(cell);
            }
        }
        Self { size, cells }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn get(&self, from: usize, to: usize) -> Displacement {
        self.cells[from * self.size + to]
    }

    #[must_use]
    pub fn row(&self, from: usize) -> &[Displacement] {
        &self.cells[from * self.size..(from + 1) * self.size]
    }
}

/// One player of a graph, together with its neighbour set.
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    roster: &'a Roster,
    index: usize,
    position: Vec2,
    row: &'a [Displacement],
}

impl<'a> Node<'a> {
    pub(crate) fn new(
        roster: &'a Roster,
        table: &'a DisplacementTable,
        index: usize,
        position: Vec2,
    ) -> Self {
        Self {
            roster,
            index,
            position,
            row: table.row(index),
        }
    }

    #[must_use]
    pub fn number(&self) -> u32 {
        self.roster.number_at(self.index)
    }

    /// Position relative to the graph's center of mass.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Displacement to the player wearing `number`.
    ///
    /// `None` for the node itself and for numbers not on the roster.
    #[must_use]
    pub fn neighbour(&self, number: u32) -> Option<Displacement> {
        let to = self.roster.index_of(number)?;
        (to != self.index).then(|| self.row[to])
    }

    /// Every other player with the displacement to it, by jersey number.
    pub fn neighbours(&self) -> impl Iterator<Item = (u32, Displacement)> + 'a {
        let index = self.index;
        let roster = self.roster;
        self.row
            .iter()
            .enumerate()
            .filter(move |(to, _)| *to != index)
            .map(move |(to, d)| (roster.number_at(to), *d))
    }

    /// Distances to every other player, nearest first.
    #[must_use]
    pub fn sorted_distances(&self) -> Vec<f64> {
        let mut distances = self.neighbours().map(|(_, d)| d.distance).collect::<Vec<_>>();
        distances.sort_by(f64::total_cmp);
        distances
    }
}
