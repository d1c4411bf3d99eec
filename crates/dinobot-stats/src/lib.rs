//! Statistical utilities for the dinobot project.
//!
//! The same summary is used in two very different places:
//!
//! - **Frame reduction**: mean and standard deviation over every pixel of a grayscale frame,
//!   computed once per polling tick, so the computation must not allocate or sort.
//! - **Reporting**: spread of playthrough scores inside one cost evaluation, and of the
//!   scores recorded per threshold while sweeping a cost curve.
//!
//! # Example
//!
//! ```
//! use dinobot_stats::descriptive::DescriptiveStats;
//!
//! let stats = DescriptiveStats::new([1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! assert_eq!(stats.variance, 2.0);
//! ```

pub mod descriptive;
