//! Obstacle extraction: reducing a frame to the nearest obstacle.
//!
//! Obstacles render darker than the background, so a column belongs to an obstacle when
//! its mean intensity is more than one standard deviation below the mean intensity of the
//! whole frame. Marked columns are grouped into runs, and runs separated by at most
//! `max_gap` columns are merged: anti-aliasing and compression noise would otherwise split
//! one physical obstacle into several narrow ones.
//!
//! ```text
//! marked columns:  13 14 15 16 20 21      105 106 107      180 181 183
//! merged runs:     (13, width 9)          (105, width 3)   (180, width 4)
//! extracted:       (13, 9)
//! ```
//!
//! Only the leftmost run is handed to the policy, which keeps its input at a fixed two
//! fields. [`ObstacleExtractor::obstacle_runs`] still exposes every run for diagnostics.

use serde::{Deserialize, Serialize};

use crate::Frame;

/// Position and width of the nearest obstacle, in board columns.
///
/// The position is measured from the left edge of the board region, which sits just in
/// front of the runner, so it doubles as the distance to the obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObstacleState {
    pub position: u16,
    pub width: u16,
}

impl ObstacleState {
    /// Sentinel reported when no obstacle is visible: far away and zero wide.
    pub const EMPTY: Self = Self::new(600, 0);

    #[must_use]
    pub const fn new(position: u16, width: u16) -> Self {
        Self { position, width }
    }

    /// Returns `[position, width]` as policy features.
    #[must_use]
    pub fn features(&self) -> [f32; 2] {
        [f32::from(self.position), f32::from(self.width)]
    }
}

/// Reduces frames to [`ObstacleState`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObstacleExtractor {
    /// Largest column distance between two marked columns that still belong to one obstacle.
    pub max_gap: usize,
    /// State reported when no column is dark enough.
    pub empty_state: ObstacleState,
}

impl Default for ObstacleExtractor {
    fn default() -> Self {
        Self {
            max_gap: 50,
            empty_state: ObstacleState::EMPTY,
        }
    }
}

impl ObstacleExtractor {
    /// Returns the nearest obstacle in the frame, or `empty_state` if there is none.
    #[must_use]
    pub fn extract(&self, frame: &Frame) -> ObstacleState {
        self.obstacle_runs(frame)
            .first()
            .copied()
            .unwrap_or(self.empty_state)
    }

    /// Returns every merged obstacle run, left to right.
    #[must_use]
    pub fn obstacle_runs(&self, frame: &Frame) -> Vec<ObstacleState> {
        merge_runs(&dark_columns(frame), self.max_gap)
    }
}

/// Indices of the columns whose mean is more than one standard deviation below the frame mean.
#[must_use]
pub fn dark_columns(frame: &Frame) -> Vec<usize> {
    let Some(stats) = frame.intensity_stats() else {
        return vec![];
    };
    let threshold = stats.mean - stats.std_dev;
    frame
        .column_means()
        .into_iter()
        .enumerate()
        .filter(|(_, mean)| *mean < threshold)
        .map(|(column, _)| column)
        .collect()
}

fn merge_runs(columns: &[usize], max_gap: usize) -> Vec<ObstacleState> {
    let Some((&first, rest)) = columns.split_first() else {
        return vec![];
    };

    let mut runs = vec![];
    let mut start = first;
    let mut last = first;
    for &column in rest {
        if column - last > max_gap {
            runs.push(run_state(start, last));
            start = column;
        }
        last = column;
    }
    runs.push(run_state(start, last));
    runs
}

fn run_state(start: usize, last: usize) -> ObstacleState {
    let clamp = |n: usize| u16::try_from(n).unwrap_or(u16::MAX);
    ObstacleState::new(clamp(start), clamp(last - start + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a frame whose columns have exactly the given intensities.
    fn frame_from_columns(columns: &[u8], height: usize) -> Frame {
        Frame::from_fn(columns.len(), height, |x, _| columns[x])
    }

    /// Builds a light frame with the given columns darkened.
    fn frame_with_dark_columns(width: usize, dark: &[usize]) -> Frame {
        Frame::from_fn(width, 10, |x, y| {
            if y >= 4 && dark.contains(&x) { 40 } else { 250 }
        })
    }

    mod extract {
        use super::*;

        #[test]
        fn test_uniform_frame_is_empty() {
            let extractor = ObstacleExtractor::default();
            for value in [0, 1, 128, 247, 255] {
                let frame = Frame::filled(64, 8, value);
                assert_eq!(extractor.extract(&frame), ObstacleState::EMPTY);
            }
        }

        #[test]
        fn test_reference_column_profile() {
            // mean ≈ 6.4, std ≈ 4.0, threshold ≈ 2.5
            let frame = frame_from_columns(&[10, 10, 10, 2, 2, 2, 2, 10, 10], 3);
            let extractor = ObstacleExtractor::default();
            assert_eq!(extractor.extract(&frame), ObstacleState::new(3, 4));
        }

        #[test]
        fn test_single_dark_column() {
            let frame = frame_with_dark_columns(100, &[42]);
            let extractor = ObstacleExtractor::default();
            assert_eq!(extractor.extract(&frame), ObstacleState::new(42, 1));
        }

        #[test]
        fn test_close_groups_merge() {
            let frame = frame_with_dark_columns(200, &[10, 11, 12, 40, 41, 90]);
            let extractor = ObstacleExtractor::default();
            assert_eq!(extractor.obstacle_runs(&frame).len(), 1);
            assert_eq!(extractor.extract(&frame), ObstacleState::new(10, 81));
        }

        #[test]
        fn test_gap_equal_to_max_gap_merges() {
            let frame = frame_with_dark_columns(200, &[10, 60]);
            let extractor = ObstacleExtractor::default();
            assert_eq!(extractor.extract(&frame), ObstacleState::new(10, 51));
        }

        #[test]
        fn test_only_leftmost_group_is_kept() {
            let frame = frame_with_dark_columns(300, &[20, 21, 22, 150, 151]);
            let extractor = ObstacleExtractor::default();
            assert_eq!(
                extractor.obstacle_runs(&frame),
                vec![ObstacleState::new(20, 3), ObstacleState::new(150, 2)]
            );
            assert_eq!(extractor.extract(&frame), ObstacleState::new(20, 3));
        }

        #[test]
        fn test_custom_empty_state_and_gap() {
            let extractor = ObstacleExtractor {
                max_gap: 2,
                empty_state: ObstacleState::new(1000, 0),
            };
            assert_eq!(
                extractor.extract(&Frame::filled(10, 10, 200)),
                ObstacleState::new(1000, 0)
            );
            let frame = frame_with_dark_columns(40, &[5, 6, 10, 11]);
            assert_eq!(extractor.extract(&frame), ObstacleState::new(5, 2));
        }
    }

    mod merge {
        use super::*;

        #[test]
        fn test_empty_columns() {
            assert!(merge_runs(&[], 50).is_empty());
        }

        #[test]
        fn test_runs_from_documentation() {
            let columns = [13, 14, 15, 16, 20, 21, 105, 106, 107, 180, 181, 183];
            assert_eq!(
                merge_runs(&columns, 50),
                vec![
                    ObstacleState::new(13, 9),
                    ObstacleState::new(105, 3),
                    ObstacleState::new(180, 4),
                ]
            );
        }

        #[test]
        fn test_unit_gap_splits_every_break() {
            assert_eq!(
                merge_runs(&[1, 2, 4], 1),
                vec![ObstacleState::new(1, 2), ObstacleState::new(4, 1)]
            );
        }
    }
}
