//! Statistical utilities for the formscope project.
//!
//! This crate provides the small set of robust statistics the formation
//! analysis relies on:
//!
//! - **Descriptive statistics**: mean, median, variance, standard deviation
//! - **Median**: midpoint-averaged median used to aggregate displacement samples
//! - **Percentiles**: nearest-rank percentile lookup for summaries
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics and the median helpers
//! - [`percentiles`]: Nearest-rank percentiles over a sorted sample
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use formscope_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Taking a median
//!
//! ```
//! use formscope_stats::descriptive::median;
//!
//! assert_eq!(median([0.5, -1.5, 2.0, 3.0]), Some(1.25));
//! ```
//!
//! ## Computing percentiles
//!
//! ```
//! use formscope_stats::percentiles::Percentiles;
//!
//! let percentiles = Percentiles::new([1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
//! assert_eq!(percentiles.at(50.0), 3.0);
//! ```

pub mod descriptive;
pub mod percentiles;
