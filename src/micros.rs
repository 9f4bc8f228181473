use core::ops::{Add, AddAssign, Mul, Sub, SubAssign};

/// Unsigned microseconds.
///
/// All scheduler timestamps and offsets are kept in integer microseconds;
/// fractional seconds only appear at the API edge via [`Micros::from_seconds`].
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Micros(u64);

impl Micros {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Creates a new instance of microseconds
    #[inline]
    pub const fn new(microseconds: u64) -> Self {
        Self(microseconds)
    }

    /// Returns the microseconds as a u64
    #[inline]
    pub const fn us(&self) -> u64 {
        self.0
    }

    /// ms -> us
    #[inline]
    pub const fn from_ms(ms: u64) -> Self {
        Self(ms * 1_000)
    }

    /// s -> us. Negative inputs clamp to zero.
    pub const fn from_seconds(secs: f64) -> Self {
        if secs <= 0. {
            return Self(0);
        }
        Self((secs * 1_000_000.) as u64)
    }

    /// Returns seconds
    #[inline]
    pub const fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1_000_000.
    }

    /// Returns no time if I am less than other.
    pub const fn saturating_sub(&self, other: Self) -> Micros {
        if self.0 < other.0 {
            Micros(0)
        } else {
            Micros(self.0 - other.0)
        }
    }
}

impl Add for Micros {
    type Output = Micros;
    fn add(self, rhs: Self) -> Self::Output {
        Micros(self.0 + rhs.0)
    }
}

impl AddAssign for Micros {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Micros {
    type Output = Micros;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Micros {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Mul<u64> for Micros {
    type Output = Micros;
    fn mul(self, rhs: u64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

#[test]
fn seconds_round_to_micros() {
    assert_eq!(Micros::from_seconds(0.1), Micros::new(100_000));
    assert_eq!(Micros::from_seconds(0.), Micros::ZERO);
    assert_eq!(Micros::from_seconds(-1.), Micros::ZERO);
}

#[test]
fn saturating_sub_floors_at_zero() {
    let a = Micros::from_ms(5);
    let b = Micros::from_ms(8);
    assert_eq!(b.saturating_sub(a), Micros::from_ms(3));
    assert_eq!(a.saturating_sub(b), Micros::ZERO);
}
