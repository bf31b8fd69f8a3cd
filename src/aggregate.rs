//! Rating aggregates derived on read from raw review rows.

/// Review statistics for one place
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RatingSummary {
    /// All review rows, rated or not
    pub review_count: usize,
    /// Reviews that carry a rating
    pub rated_count: usize,
    /// Mean of the present ratings; `None` when nothing is rated
    pub average: Option<f64>,
}

impl RatingSummary {
    /// Builds the summary from the `rating` column of every review of a place.
    pub fn from_ratings(ratings: &[Option<u8>]) -> Self {
        let rated: Vec<u8> = ratings.iter().flatten().copied().collect();
        let average = if rated.is_empty() {
            None
        } else {
            let sum: u32 = rated.iter().map(|r| u32::from(*r)).sum();
            Some(f64::from(sum) / rated.len() as f64)
        };

        Self {
            review_count: ratings.len(),
            rated_count: rated.len(),
            average,
        }
    }
}
