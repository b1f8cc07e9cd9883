use crate::LanmsError;
use serde::{Deserialize, Serialize};

/// What an incoming candidate is compared against during the locality pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeReference {
    /// The open group's in-progress weighted average.
    #[default]
    MergedView,
    /// The most recently added member of the open group.
    LastMember,
}

/// Parameters of the merge-and-suppress pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanmsParams {
    /// Adjacent candidates are merged when their IoU exceeds this.
    pub merge_threshold: f32,
    /// Greedy NMS drops a quad when its IoU with a kept one exceeds this.
    pub nms_threshold: f32,
    /// Fixed-point scale applied to pixel coordinates before clipping.
    ///
    /// Only used by the flat-row codec; the core works in whatever units it
    /// is given.
    pub precision: f32,
    pub reference: MergeReference,
}

impl Default for LanmsParams {
    fn default() -> Self {
        Self {
            merge_threshold: 0.3,
            nms_threshold: 0.3,
            precision: 10_000.0,
            reference: MergeReference::MergedView,
        }
    }
}

impl LanmsParams {
    /// Same threshold for both passes.
    pub fn with_threshold(threshold: f32) -> Self {
        Self {
            merge_threshold: threshold,
            nms_threshold: threshold,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), LanmsError> {
        check_threshold("merge_threshold", self.merge_threshold)?;
        check_threshold("nms_threshold", self.nms_threshold)?;
        if !self.precision.is_finite() || self.precision <= 0.0 {
            return Err(LanmsError::InvalidPrecision {
                value: self.precision,
            });
        }
        Ok(())
    }
}

fn check_threshold(name: &'static str, value: f32) -> Result<(), LanmsError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(LanmsError::InvalidThreshold { name, value })
    }
}
