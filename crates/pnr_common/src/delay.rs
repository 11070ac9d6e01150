//! Delay algebra (C2).
//!
//! `Delay` is a scalar, fixed-point propagation time measured in picoseconds.
//! Picoseconds (rather than a floating-point nanosecond value) keep the
//! algebra exactly associative under addition, required of `DelayInfo::+`.

use serde::{Deserialize, Serialize};
use std::ops::Add;

/// A scalar propagation delay, in picoseconds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Delay(i64);

impl Delay {
    /// The zero delay.
    pub const ZERO: Delay = Delay(0);

    /// A sentinel "unconstrained" delay, used as the initial sink budget when
    /// no target frequency is set (§4.7). Large enough that any real path
    /// delay will compare as tighter, but finite so arithmetic on it cannot
    /// overflow.
    pub const UNCONSTRAINED: Delay = Delay(i64::MAX / 4);

    /// Creates a delay from a picosecond count.
    pub fn from_picos(picos: i64) -> Self {
        Self(picos)
    }

    /// Creates a delay from a nanosecond value, truncating to picosecond
    /// resolution.
    pub fn from_nanos(ns: f64) -> Self {
        Self((ns * 1000.0).round() as i64)
    }

    /// Returns the delay as a picosecond count.
    pub fn as_picos(self) -> i64 {
        self.0
    }

    /// Returns the delay as nanoseconds.
    pub fn as_nanos(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Returns the inverse of a frequency in Hz as a delay — the period.
    ///
    /// Used by the budget assignment hook (C9) to turn a target frequency
    /// into a per-sink delay budget.
    pub fn from_frequency_hz(hz: f64) -> Self {
        Self::from_nanos(1.0e9 / hz)
    }
}

impl Add for Delay {
    type Output = Delay;

    fn add(self, rhs: Delay) -> Delay {
        Delay(self.0 + rhs.0)
    }
}

impl std::iter::Sum for Delay {
    fn sum<I: Iterator<Item = Delay>>(iter: I) -> Self {
        iter.fold(Delay::ZERO, Add::add)
    }
}

/// A bundle of min/max rise/fall delays, as exposed by the architecture
/// catalog for a cell's internal timing arcs and by wires/pips for routing
/// delay.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct DelayInfo {
    /// Minimum (fast-corner) delay for a rising transition.
    pub min_rise: Delay,
    /// Maximum (slow-corner) delay for a rising transition.
    pub max_rise: Delay,
    /// Minimum (fast-corner) delay for a falling transition.
    pub min_fall: Delay,
    /// Maximum (slow-corner) delay for a falling transition.
    pub max_fall: Delay,
}

impl DelayInfo {
    /// A `DelayInfo` with all four corners set to zero.
    pub const ZERO: DelayInfo = DelayInfo {
        min_rise: Delay::ZERO,
        max_rise: Delay::ZERO,
        min_fall: Delay::ZERO,
        max_fall: Delay::ZERO,
    };

    /// Creates a `DelayInfo` with all four corners set to the same value —
    /// the common case for an architecture with no rise/fall asymmetry.
    pub fn uniform(delay: Delay) -> Self {
        Self {
            min_rise: delay,
            max_rise: delay,
            min_fall: delay,
            max_fall: delay,
        }
    }

    /// Returns the tightest (minimum) delay across all four corners.
    pub fn min_delay(&self) -> Delay {
        self.min_rise.min(self.min_fall)
    }

    /// Returns the loosest (maximum) delay across all four corners.
    pub fn max_delay(&self) -> Delay {
        self.max_rise.max(self.max_fall)
    }
}

impl Add for DelayInfo {
    type Output = DelayInfo;

    /// Combines two delays along a path, componentwise. Associative because
    /// each component is plain integer addition.
    fn add(self, rhs: DelayInfo) -> DelayInfo {
        DelayInfo {
            min_rise: self.min_rise + rhs.min_rise,
            max_rise: self.max_rise + rhs.max_rise,
            min_fall: self.min_fall + rhs.min_fall,
            max_fall: self.max_fall + rhs.max_fall,
        }
    }
}
