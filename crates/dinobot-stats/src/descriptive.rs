/// Descriptive statistics summarizing a dataset.
///
/// Variance is the population variance (divided by `n`, not `n - 1`), which is what
/// the obstacle threshold `mean - std_dev` is defined against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescriptiveStats {
    /// Number of values in the dataset.
    pub count: usize,
    /// The minimum value in the dataset.
    pub min: f32,
    /// The maximum value in the dataset.
    pub max: f32,
    /// The arithmetic mean of the dataset.
    pub mean: f32,
    /// The population variance of the dataset.
    pub variance: f32,
    /// The population standard deviation of the dataset.
    pub std_dev: f32,
}

impl DescriptiveStats {
    /// Computes descriptive statistics in a single pass.
    ///
    /// Uses Welford's online update, accumulated in `f64`, so large inputs such as every
    /// pixel of a frame neither lose precision nor need to be buffered.
    ///
    /// # Returns
    ///
    /// * `Some(DescriptiveStats)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use dinobot_stats::descriptive::DescriptiveStats;
    /// let stats = DescriptiveStats::new([5.0, 2.0, 4.0, 1.0, 3.0]).unwrap();
    /// assert_eq!(stats.count, 5);
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    ///
    /// assert!(DescriptiveStats::new(std::iter::empty()).is_none());
    /// ```
    #[expect(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let mut count = 0_usize;
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut mean = 0.0_f64;
        let mut m2 = 0.0_f64;

        for value in values {
            count += 1;
            min = min.min(value);
            max = max.max(value);
            let x = f64::from(value);
            let delta = x - mean;
            mean += delta / count as f64;
            m2 += delta * (x - mean);
        }

        if count == 0 {
            return None;
        }

        let variance = m2 / count as f64;
        Some(Self {
            count,
            min,
            max,
            mean: mean as f32,
            variance: variance as f32,
            std_dev: variance.sqrt() as f32,
        })
    }
}
