//! Aggregation of many lattices into one average formation.
//!
//! A formation is a shape rather than a set of pitch coordinates: the team
//! drifts up and down the pitch and players swap positions locally from one
//! moment to the next. Averaging absolute positions would blur all of that
//! together, so the aggregation works on the relative vectors between pairs of
//! players instead, which do not depend on where on the pitch the team is.
//!
//! # Algorithm
//!
//! 1. **Median vectors**: for every pair of players, take the component-wise
//!    median of the displacement between them over all lattices. The median
//!    keeps a single frame with a player out of position, or a tracking
//!    glitch, from dragging the result.
//! 2. **Local density**: for every player, the distance to its k-th nearest
//!    neighbour in the median graph (k = 3 by default).
//! 3. **Reference player**: players are ranked by local density, ascending,
//!    and the first one is anchored at the origin.
//! 4. **Reconstruction**: every other player is placed at the reference
//!    player's median vector to it.
//! 5. **Centering**: the reconstructed coordinates are shifted so that their
//!    center of mass is the origin.
//!
//! Every lattice added to a formation must cover exactly the same players.
//! A mismatch means a substitution was not cut out of the window and is
//! reported as [`FormationError::InputConsistency`].
//!
//! # Example
//!
//! ```
//! use formscope_analysis::{
//!     formation::{FormationBuilder, FormationLabel, Phase},
//!     lattice::Lattice,
//!     roster::ExcludedRoles,
//! };
//! use formscope_tracking::{DirectionFlip, PlayerRecord, TeamSide};
//!
//! let excluded = ExcludedRoles::new([1]);
//! let label = FormationLabel::new(TeamSide::Home, Phase::Attack);
//! let mut builder = FormationBuilder::new(label, excluded.clone());
//!
//! for shift in [0.0, 5.0, 10.0] {
//!     let players = [
//!         PlayerRecord::new(4, shift - 10.0, 0.0),
//!         PlayerRecord::new(8, shift, 0.0),
//!         PlayerRecord::new(9, shift + 10.0, 0.0),
//!     ];
//!     let lattice = Lattice::build(&players, &excluded, shift, DirectionFlip::Forward).unwrap();
//!     builder.add(&lattice).unwrap();
//! }
//!
//! let formation = builder.finalize().unwrap();
//! assert_eq!(formation.lattice_count(), 3);
//! assert_eq!(formation.position(9).unwrap().x, 10.0);
//! ```

use formscope_stats::descriptive::median_of_sorted;
use formscope_tracking::{TeamSide, Vec2};
use serde::{Deserialize, Serialize};

use crate::{
    graph::{DisplacementTable, Node},
    lattice::Lattice,
    roster::{ExcludedRoles, Roster},
};

/// Number of nearest neighbours used to measure local density.
pub const DEFAULT_NEIGHBOURS: usize = 3;

/// Whether the measured team has the ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[display("attack")]
    Attack,
    #[display("defence")]
    Defence,
}

/// Which team and phase a formation describes, displayed as `home_attack` etc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[display("{team}_{phase}")]
pub struct FormationLabel {
    pub team: TeamSide,
    pub phase: Phase,
}

impl FormationLabel {
    #[must_use]
    pub const fn new(team: TeamSide, phase: Phase) -> Self {
        Self { team, phase }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum FormationError {
    #[display(
        "{label}: lattice at t={timestamp:.2}s has players {found} but the formation is measured over {expected}"
    )]
    InputConsistency {
        label: FormationLabel,
        expected: Roster,
        found: Roster,
        timestamp: f64,
    },
    #[display("{label}: no lattices to aggregate")]
    EmptyAggregation { label: FormationLabel },
}

#[derive(Debug, Clone, Default)]
struct PairSamples {
    dx: Vec<f64>,
    dy: Vec<f64>,
}

impl PairSamples {
    fn into_median(mut self) -> Option<Vec2> {
        self.dx.sort_by(f64::total_cmp);
        self.dy.sort_by(f64::total_cmp);
        Some(Vec2::new(
            median_of_sorted(&self.dx)?,
            median_of_sorted(&self.dy)?,
        ))
    }
}

/// Accumulates lattices for one formation.
///
/// Only the per-pair displacement samples are kept; the lattices themselves
/// can be dropped as soon as they have been added.
#[derive(Debug, Clone)]
pub struct FormationBuilder {
    label: FormationLabel,
    excluded: ExcludedRoles,
    neighbours: usize,
    roster: Option<Roster>,
    samples: Vec<PairSamples>,
    timestamps: Vec<f64>,
}

impl FormationBuilder {
    #[must_use]
    pub fn new(label: FormationLabel, excluded: ExcludedRoles) -> Self {
        Self {
            label,
            excluded,
            neighbours: DEFAULT_NEIGHBOURS,
            roster: None,
            samples: vec![],
            timestamps: vec![],
        }
    }

    /// Sets k, the neighbour rank used for local density.
    #[must_use]
    pub fn with_neighbours(mut self, neighbours: usize) -> Self {
        self.neighbours = neighbours;
        self
    }

    #[must_use]
    pub fn label(&self) -> FormationLabel {
        self.label
    }

    /// Players the formation is measured over, fixed by the first lattice.
    #[must_use]
    pub fn roster(&self) -> Option<&Roster> {
        self.roster.as_ref()
    }

    #[must_use]
    pub fn lattice_count(&self) -> usize {
        self.timestamps.len()
    }

    /// Adds one lattice's displacements.
    ///
    /// The first lattice fixes the set of players; every later lattice must
    /// match it exactly.
    pub fn add(&mut self, lattice: &Lattice) -> Result<(), FormationError> {
        match &self.roster {
            None => {
                self.samples = vec![PairSamples::default(); pair_count(lattice.len())];
                self.roster = Some(lattice.roster().clone());
            }
            Some(roster) if roster != lattice.roster() => {
                return Err(FormationError::InputConsistency {
                    label: self.label,
                    expected: roster.clone(),
                    found: lattice.roster().clone(),
                    timestamp: lattice.timestamp(),
                });
            }
            Some(_) => {}
        }

        for (samples, (from, to)) in self.samples.iter_mut().zip(pairs(lattice.len())) {
            let offset = lattice.displacement(from, to).offset;
            samples.dx.push(offset.x);
            samples.dy.push(offset.y);
        }
        self.timestamps.push(lattice.timestamp());
        Ok(())
    }

    /// Reduces the accumulated lattices to the average formation.
    pub fn finalize(self) -> Result<Formation, FormationError> {
        let empty = FormationError::EmptyAggregation { label: self.label };
        let Some(roster) = self.roster else {
            return Err(empty);
        };
        let medians = self
            .samples
            .into_iter()
            .map(PairSamples::into_median)
            .collect::<Option<Vec<_>>>()
            .ok_or(empty)?;

        let n = roster.len();
        let table = DisplacementTable::from_fn(n, |from, to| {
            if from < to {
                medians[pair_index(n, from, to)]
            } else {
                -medians[pair_index(n, to, from)]
            }
        });
        let graph = MedianGraph::new(roster, table, self.neighbours);
        let reference = graph.density_ranking()[0];
        let positions = graph.anchored_positions(reference);

        Ok(Formation {
            label: self.label,
            excluded: self.excluded,
            graph,
            reference,
            positions,
            timestamps: self.timestamps,
        })
    }
}

/// Median displacement graph with per-player local density.
#[derive(Debug, Clone)]
struct MedianGraph {
    roster: Roster,
    table: DisplacementTable,
    densities: Vec<f64>,
    neighbours: usize,
}

impl MedianGraph {
    fn new(roster: Roster, table: DisplacementTable, neighbours: usize) -> Self {
        let densities = (0..roster.len())
            .map(|index| {
                let node = Node::new(&roster, &table, index, Vec2::ZERO);
                let distances = node.sorted_distances();
                if distances.is_empty() {
                    return 0.0;
                }
                let k = neighbours.clamp(1, distances.len());
                distances[k - 1]
            })
            .collect();
        Self {
            roster,
            table,
            densities,
            neighbours,
        }
    }

    /// Roster indices ordered by local density, ties by jersey number.
    fn density_ranking(&self) -> Vec<usize> {
        let mut ranking = (0..self.roster.len()).collect::<Vec<_>>();
        ranking.sort_by(|&a, &b| self.densities[a].total_cmp(&self.densities[b]).then(a.cmp(&b)));
        ranking
    }

    /// Coordinates reconstructed from `reference`'s median vectors, centered.
    fn anchored_positions(&self, reference: usize) -> Vec<Vec2> {
        let mut positions = (0..self.roster.len())
            .map(|index| {
                if index == reference {
                    Vec2::ZERO
                } else {
                    self.table.get(reference, index).offset
                }
            })
            .collect::<Vec<_>>();
        if let Some(com) = Vec2::centroid(positions.iter().copied()) {
            for pos in &mut positions {
                *pos = *pos - com;
            }
        }
        positions
    }
}

/// Average formation of one team in one phase of play.
#[derive(Debug, Clone)]
pub struct Formation {
    label: FormationLabel,
    excluded: ExcludedRoles,
    graph: MedianGraph,
    reference: usize,
    positions: Vec<Vec2>,
    timestamps: Vec<f64>,
}

impl Formation {
    #[must_use]
    pub fn label(&self) -> FormationLabel {
        self.label
    }

    #[must_use]
    pub fn excluded(&self) -> &ExcludedRoles {
        &self.excluded
    }

    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.graph.roster
    }

    /// Jersey numbers in ascending order.
    #[must_use]
    pub fn pids(&self) -> &[u32] {
        self.graph.roster.numbers()
    }

    /// Jersey number of the player anchored during reconstruction.
    #[must_use]
    pub fn reference(&self) -> u32 {
        self.graph.roster.number_at(self.reference)
    }

    /// The neighbour rank used for local density.
    #[must_use]
    pub fn neighbours(&self) -> usize {
        self.graph.neighbours
    }

    #[must_use]
    pub fn lattice_count(&self) -> usize {
        self.timestamps.len()
    }

    /// Game-clock times of the contributing lattices, in the order added.
    #[must_use]
    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    /// Final position of `number`, relative to the formation's center of mass.
    #[must_use]
    pub fn position(&self, number: u32) -> Option<Vec2> {
        let index = self.graph.roster.index_of(number)?;
        Some(self.positions[index])
    }

    /// `(jersey number, position)` for every player, by jersey number.
    pub fn positions(&self) -> impl Iterator<Item = (u32, Vec2)> + '_ {
        self.pids().iter().copied().zip(self.positions.iter().copied())
    }

    /// Player `number` with its median vectors to every other player.
    #[must_use]
    pub fn node(&self, number: u32) -> Option<Node<'_>> {
        let index = self.graph.roster.index_of(number)?;
        Some(Node::new(
            &self.graph.roster,
            &self.graph.table,
            index,
            self.positions[index],
        ))
    }

    #[must_use]
    pub fn local_density(&self, number: u32) -> Option<f64> {
        let index = self.graph.roster.index_of(number)?;
        Some(self.graph.densities[index])
    }

    /// Jersey numbers ordered by local density, the reference player first.
    #[must_use]
    pub fn density_ranking(&self) -> Vec<u32> {
        self.graph
            .density_ranking()
            .into_iter()
            .map(|index| self.graph.roster.number_at(index))
            .collect()
    }

    /// Reconstructs the formation from a different reference player.
    ///
    /// Returns `None` if `number` is not part of the formation.
    #[must_use]
    pub fn positions_anchored_at(&self, number: u32) -> Option<Vec<(u32, Vec2)>> {
        let index = self.graph.roster.index_of(number)?;
        let positions = self.graph.anchored_positions(index);
        Some(self.pids().iter().copied().zip(positions).collect())
    }
}

fn pair_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Position of the pair `(from, to)`, `from < to`, in [`pairs`] order.
fn pair_index(n: usize, from: usize, to: usize) -> usize {
    debug_assert!(from < to && to < n);
    from * (2 * n - from - 1) / 2 + (to - from - 1)
}

fn pairs(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n).flat_map(move |from| (from + 1..n).map(move |to| (from, to)))
}

#[cfg(test)]
mod tests {
    use formscope_tracking::{DirectionFlip, PlayerRecord};
    use rand::{Rng as _, SeedableRng as _};
    use rand_distr::{Distribution as _, Normal};
    use rand_pcg::Pcg64Mcg;

    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn label() -> FormationLabel {
        FormationLabel::new(TeamSide::Home, Phase::Attack)
    }

    fn lattice(points: &[(u32, f64, f64)], timestamp: f64) -> Lattice {
        let players = points
            .iter()
            .map(|&(number, x, y)| PlayerRecord::new(number, x, y))
            .collect::<Vec<_>>();
        Lattice::build(
            &players,
            &ExcludedRoles::default(),
            timestamp,
            DirectionFlip::Forward,
        )
        .unwrap()
    }

    /// Ten players on a 5 x 2 grid centered on the origin.
    fn grid() -> Vec<(u32, f64, f64)> {
        let mut points = vec![];
        let mut number = 2;
        for x in [-20.0, -10.0, 0.0, 10.0, 20.0] {
            for y in [-15.0, 15.0] {
                points.push((number, x, y));
                number += 1;
            }
        }
        points
    }

    fn shifted(points: &[(u32, f64, f64)], dx: f64, dy: f64) -> Vec<(u32, f64, f64)> {
        points.iter().map(|&(n, x, y)| (n, x + dx, y + dy)).collect()
    }

    fn assert_close(a: Vec2, b: Vec2, tolerance: f64) {
        assert!(
            (a.x - b.x).abs() < tolerance && (a.y - b.y).abs() < tolerance,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn test_pair_indexing() {
        for n in 0..8 {
            let all = pairs(n).collect::<Vec<_>>();
            assert_eq!(all.len(), pair_count(n));
            for (i, &(from, to)) in all.iter().enumerate() {
                assert_eq!(pair_index(n, from, to), i);
            }
        }
    }

    #[test]
    fn test_identical_frames_reproduce_grid() {
        let mut builder = FormationBuilder::new(label(), ExcludedRoles::new([1]));
        for t in 0..3_u8 {
            builder.add(&lattice(&grid(), f64::from(t))).unwrap();
        }
        let formation = builder.finalize().unwrap();

        assert_eq!(formation.lattice_count(), 3);
        assert_eq!(formation.pids(), &[2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
        for (number, x, y) in grid() {
            assert_close(formation.position(number).unwrap(), Vec2::new(x, y), TOLERANCE);
        }
    }

    #[test]
    fn test_mismatched_roster_is_rejected() {
        let mut builder = FormationBuilder::new(label(), ExcludedRoles::default());
        builder.add(&lattice(&grid(), 0.0)).unwrap();
        builder.add(&lattice(&grid(), 1.0)).unwrap();

        let mut substituted = grid();
        substituted[4].0 = 18;
        let err = builder.add(&lattice(&substituted, 2.0)).unwrap_err();
        match err {
            FormationError::InputConsistency {
                expected,
                found,
                timestamp,
                ..
            } => {
                assert!(expected.index_of(6).is_some());
                assert!(found.index_of(18).is_some());
                assert!(found.index_of(6).is_none());
                assert_eq!(timestamp, 2.0);
            }
            FormationError::EmptyAggregation { .. } => panic!("unexpected error: {err}"),
        }
        // the rejected lattice leaves the builder untouched
        assert_eq!(builder.lattice_count(), 2);
        assert!(builder.add(&lattice(&grid(), 3.0)).is_ok());
    }

    #[test]
    fn test_missing_player_is_rejected() {
        let mut builder = FormationBuilder::new(label(), ExcludedRoles::default());
        builder.add(&lattice(&grid(), 0.0)).unwrap();
        let err = builder.add(&lattice(&grid()[1..], 1.0)).unwrap_err();
        assert!(matches!(err, FormationError::InputConsistency { .. }));
    }

    #[test]
    fn test_empty_formation_fails() {
        let builder = FormationBuilder::new(label(), ExcludedRoles::default());
        let err = builder.finalize().unwrap_err();
        assert_eq!(err, FormationError::EmptyAggregation { label: label() });
        assert_eq!(err.to_string(), "home_attack: no lattices to aggregate");
    }

    #[test]
    fn test_median_ignores_outlier_frame() {
        let base: [(u32, f64, f64); 4] =
            [(2, -10.0, 0.0), (5, 0.0, 8.0), (7, 0.0, -8.0), (9, 12.0, 0.0)];
        let mut outlier = base;
        outlier[3] = (9, 60.0, 25.0);

        let mut builder = FormationBuilder::new(label(), ExcludedRoles::default());
        for (t, points) in (0_u8..).zip([&base, &base, &outlier, &base, &base]) {
            builder.add(&lattice(points, f64::from(t))).unwrap();
        }
        let formation = builder.finalize().unwrap();

        let expected = Vec2::new(22.0, 0.0);
        assert_close(
            formation.node(2).unwrap().neighbour(9).unwrap().offset,
            expected,
            TOLERANCE,
        );
        let com = Vec2::new(0.5, 0.0);
        for (number, x, y) in base {
            assert_close(formation.position(number).unwrap(), Vec2::new(x, y) - com, TOLERANCE);
        }
    }

    #[test]
    fn test_even_count_median_is_midpoint() {
        let mut builder = FormationBuilder::new(label(), ExcludedRoles::default());
        builder.add(&lattice(&[(3, 0.0, 0.0), (4, 10.0, 0.0)], 0.0)).unwrap();
        builder.add(&lattice(&[(3, 0.0, 0.0), (4, 14.0, 2.0)], 1.0)).unwrap();
        let formation = builder.finalize().unwrap();
        let d = formation.node(3).unwrap().neighbour(4).unwrap();
        assert_eq!(d.offset, Vec2::new(12.0, 1.0));
        let back = formation.node(4).unwrap().neighbour(3).unwrap();
        assert_eq!(back.offset, Vec2::new(-12.0, -1.0));
    }

    #[test]
    fn test_reference_is_lowest_density() {
        let points = [(1, 0.0, 0.0), (2, 1.0, 0.0), (3, 10.0, 0.0), (4, 30.0, 0.0)];
        let build = |neighbours| {
            let mut builder =
                FormationBuilder::new(label(), ExcludedRoles::default()).with_neighbours(neighbours);
            builder.add(&lattice(&points, 0.0)).unwrap();
            builder.finalize().unwrap()
        };

        // nearest neighbour: 1 and 2 tie at 1.0, the lower number wins
        let formation = build(1);
        assert_eq!(formation.reference(), 1);
        assert_eq!(formation.local_density(4), Some(20.0));

        let formation = build(2);
        assert_eq!(formation.reference(), 2);
        assert_eq!(formation.density_ranking(), vec![2, 1, 3, 4]);

        let formation = build(DEFAULT_NEIGHBOURS);
        assert_eq!(formation.reference(), 3);
        assert_eq!(formation.local_density(3), Some(20.0));

        // more neighbours than players falls back to the farthest one
        let formation = build(10);
        assert_eq!(formation.reference(), 3);
        assert_eq!(formation.neighbours(), 10);
    }

    #[test]
    fn test_single_player_formation() {
        let mut builder = FormationBuilder::new(label(), ExcludedRoles::default());
        builder.add(&lattice(&[(6, 30.0, -4.0)], 0.0)).unwrap();
        let formation = builder.finalize().unwrap();
        assert_eq!(formation.reference(), 6);
        assert_eq!(formation.position(6), Some(Vec2::ZERO));
        assert_eq!(formation.local_density(6), Some(0.0));
    }

    #[test]
    fn test_result_is_centered_and_reference_independent() {
        let mut rng = Pcg64Mcg::seed_from_u64(17);
        let mut builder = FormationBuilder::new(label(), ExcludedRoles::default());
        for t in 0..40_u8 {
            let dx = rng.random_range(-30.0..30.0);
            let dy = rng.random_range(-20.0..20.0);
            builder.add(&lattice(&shifted(&grid(), dx, dy), f64::from(t))).unwrap();
        }
        let formation = builder.finalize().unwrap();

        let com = Vec2::centroid(formation.positions().map(|(_, p)| p)).unwrap();
        assert_close(com, Vec2::ZERO, 1e-9);

        let positions = formation.positions().collect::<Vec<_>>();
        for &anchor in formation.pids() {
            let anchored = formation.positions_anchored_at(anchor).unwrap();
            for (&(a, pa), &(b, pb)) in positions.iter().zip(&anchored) {
                assert_eq!(a, b);
                assert_close(pa, pb, 1e-6);
            }
            for i in 0..positions.len() {
                for j in i + 1..positions.len() {
                    let expected = (positions[j].1 - positions[i].1).length();
                    let actual = (anchored[j].1 - anchored[i].1).length();
                    assert!((expected - actual).abs() < 1e-6);
                }
            }
        }
        assert!(formation.positions_anchored_at(42).is_none());
    }

    #[test]
    fn test_noisy_tracking_converges_to_shape() {
        let mut rng = Pcg64Mcg::seed_from_u64(2019);
        let noise = Normal::new(0.0, 0.5).unwrap();
        let mut builder = FormationBuilder::new(label(), ExcludedRoles::default());
        for t in 0..201_u8 {
            let drift_x = rng.random_range(-25.0..25.0);
            let drift_y = rng.random_range(-10.0..10.0);
            let points = grid()
                .into_iter()
                .map(|(n, x, y)| {
                    (
                        n,
                        x + drift_x + noise.sample(&mut rng),
                        y + drift_y + noise.sample(&mut rng),
                    )
                })
                .collect::<Vec<_>>();
            builder.add(&lattice(&points, f64::from(t))).unwrap();
        }
        let formation = builder.finalize().unwrap();

        let com = Vec2::centroid(formation.positions().map(|(_, p)| p)).unwrap();
        assert_close(com, Vec2::ZERO, 1e-9);
        for (number, x, y) in grid() {
            assert_close(formation.position(number).unwrap(), Vec2::new(x, y), 0.5);
        }
    }
}
