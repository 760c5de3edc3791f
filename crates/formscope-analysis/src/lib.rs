//! Formation estimation from player tracking data.
//!
//! The pipeline for one team over one window of a match:
//!
//! 1. [`window`] resolves `period:minute` markers to frame indices.
//! 2. [`substitution`] cuts the window at the team's first roster change.
//! 3. [`possession`] splits the window into sustained possessions, once for
//!    the team (attack) and once for its opponent (defence).
//! 4. [`lattice`] turns sampled frames into relative-position graphs.
//! 5. [`formation`] aggregates the graphs into one average shape per phase.
//!
//! [`estimator`] runs all of the above; the other modules are usable on their
//! own.

pub mod estimator;
pub mod formation;
pub mod graph;
pub mod lattice;
pub mod possession;
pub mod roster;
pub mod substitution;
pub mod window;
