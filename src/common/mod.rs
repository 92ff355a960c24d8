//! Small shared building blocks: the north/east offset vector and the polled period helper.

mod periodic;
mod vec2d;

pub use periodic::Periodic;
pub use vec2d::Vec2D;

use chrono::TimeDelta;

/// Converts a (possibly negative) time delta to fractional seconds.
#[allow(clippy::cast_precision_loss)]
pub fn secs_f64(delta: TimeDelta) -> f64 {
    delta.num_microseconds().map_or(0.0, |us| us as f64 / 1e6)
}

#[cfg(test)]
mod tests;
