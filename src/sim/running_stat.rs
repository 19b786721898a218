/// Running mean and variance of a stream of samples (Welford)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunningStat {
    n: u64,
    old_m: f64,
    new_m: f64,
    old_s: f64,
    new_s: f64,
}

impl RunningStat {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            n: 0,
            old_m: 0.0,
            new_m: 0.0,
            old_s: 0.0,
            new_s: 0.0,
        }
    }

    pub fn clear(&mut self) {
        self.n = 0;
    }

    pub fn push(&mut self, x: f64) {
        self.n += 1;

        if self.n == 1 {
            self.old_m = x;
            self.new_m = x;
            self.old_s = 0.0;
            self.new_s = 0.0;
        } else {
            self.new_m = self.old_m + (x - self.old_m) / self.n as f64;
            self.new_s = self.old_s + (x - self.old_m) * (x - self.new_m);

            self.old_m = self.new_m;
            self.old_s = self.new_s;
        }
    }

    #[must_use]
    pub const fn count(&self) -> u64 {
        self.n
    }

    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.n > 0 { self.new_m } else { 0.0 }
    }

    #[must_use]
    pub fn variance(&self) -> f64 {
        if self.n > 1 {
            self.new_s / (self.n - 1) as f64
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}
