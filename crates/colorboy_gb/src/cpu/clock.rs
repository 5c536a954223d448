use std::ops::AddAssign;

/// Elapsed time in machine cycles and T-states (`t == 4 * m`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Clock {
    m: u64,
    t: u64,
}

impl Clock {
    pub const fn new() -> Self {
        Self { m: 0, t: 0 }
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    #[inline]
    pub fn add_m(&mut self, m: u32) {
        self.m += u64::from(m);
        self.t += u64::from(m) * 4;
    }

    #[inline]
    pub fn m(&self) -> u64 {
        self.m
    }

    #[inline]
    pub fn t(&self) -> u64 {
        self.t
    }
}

impl AddAssign for Clock {
    fn add_assign(&mut self, rhs: Self) {
        self.m += rhs.m;
        self.t += rhs.t;
    }
}
