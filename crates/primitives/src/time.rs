use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A point on the animation timeline.
///
/// Wraps an `f64` with a total order so time codes can key ordered maps.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeCode(pub f64);

impl TimeCode {
	/// Returns the raw time value.
	pub fn value(self) -> f64 {
		self.0
	}
}

impl PartialEq for TimeCode {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}

impl Eq for TimeCode {}

impl PartialOrd for TimeCode {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for TimeCode {
	fn cmp(&self, other: &Self) -> Ordering {
		self.0.total_cmp(&other.0)
	}
}

impl From<f64> for TimeCode {
	fn from(v: f64) -> Self {
		Self(v)
	}
}

impl fmt::Display for TimeCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}
