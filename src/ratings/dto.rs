use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateRequest {
    pub value: i16,
}

impl RateRequest {
    pub fn validated(self) -> AppResult<i16> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.value) {
            return Err(AppError::validation(format!(
                "La valoración debe estar entre {MIN_RATING} y {MAX_RATING}"
            )));
        }
        Ok(self.value)
    }
}

/// Average of every rating for an episode; `0.0` with `count == 0` when unrated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AverageRating {
    pub episode_id: i32,
    pub average: f64,
    pub count: i64,
}
