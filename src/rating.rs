//! Social signals on a video: star ratings and likes.
//!
//! Neither operation looks at who is voting, every call counts.

use crate::error::{OutOfRangeSnafu, ValidationError};
use crate::prelude::*;
use crate::video::Video;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// A star rating, always within `MIN_RATING..=MAX_RATING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub fn new(rating: i64) -> Result<Self, ValidationError> {
        let value = u8::try_from(rating)
            .ok()
            .filter(|value| (MIN_RATING..=MAX_RATING).contains(value));

        value.map(Rating).context(OutOfRangeSnafu { rating })
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = ValidationError;

    fn try_from(rating: i64) -> Result<Self, Self::Error> {
        Self::new(rating)
    }
}

/// Arithmetic mean of `ratings`, `0.0` when there are none.
pub fn average(ratings: &[u8]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }

    let sum: u64 = ratings.iter().map(|&rating| u64::from(rating)).sum();
    sum as f64 / ratings.len() as f64
}

impl Video {
    /// Appends `rating` to the history and recomputes the average.
    pub fn apply_rating(&mut self, rating: Rating) {
        self.rating_history.push(rating.get());
        self.average_rating = average(&self.rating_history);
    }

    pub fn apply_like(&mut self) {
        self.like_count += 1;
    }
}
