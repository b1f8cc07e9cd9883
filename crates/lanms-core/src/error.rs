/// Errors produced while building or processing quadrilaterals.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LanmsError {
    #[error("polygon must have exactly 4 vertices (got {vertices})")]
    MalformedPolygon { vertices: usize },

    #[error("candidate buffer length {len} is not a multiple of 9 (8 coordinates + score)")]
    MalformedRow { len: usize },

    #[error("{name} must be finite and within [0, 1] (got {value})")]
    InvalidThreshold { name: &'static str, value: f32 },

    #[error("precision must be finite and positive (got {value})")]
    InvalidPrecision { value: f32 },

    #[error("candidate {index} has an invalid score {score} (must be finite and >= 0)")]
    InvalidScore { index: usize, score: f32 },

    #[error("candidate {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },

    #[error("candidate {index} has a coordinate outside the clipping range (|v| < 2^62 fixed-point units)")]
    CoordinateOutOfRange { index: usize },
}
