use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Rating;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRatingRequest {
    pub rating: i32,
    pub review: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct RatingList {
    #[schema(value_type = Vec<Rating>)]
    pub items: Vec<Rating>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RatingCreated {
    pub rating: Rating,
    pub rating_avg: f64,
    pub rating_count: i32,
}
