//! Tracking data model shared by the formscope crates.
//!
//! Frames, player records and match metadata mirror the Second Spectrum feed
//! layout so they can be deserialized directly. [`Vec2`] is the planar vector
//! type used by the analysis for positions and displacements.

pub use self::{direction::*, frame::*, geometry::*};

pub mod direction;
pub mod frame;
pub mod geometry;
