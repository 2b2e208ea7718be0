/// A race clock that tracks ticks of fixed duration from a start timestamp.
///
/// The `Clock` advances tick-by-tick, or runs a function at every remaining
/// tick, and maps tick indices to elapsed seconds and UNIX timestamps.
///
/// # Examples
///
/// ```
/// use solar_race_sim::sim::clock::Clock;
///
/// let mut clock = Clock::new(3, 60.0, 1_700_000_000);
/// let mut ticks = Vec::new();
///
/// clock.run(|tick| ticks.push(tick));
/// assert_eq!(ticks, vec![0, 1, 2]);
/// assert_eq!(clock.timestamp(2), 1_700_000_120);
/// ```
#[derive(Debug, Clone)]
pub struct Clock {
    /// Next tick to hand out
    current: usize,
    /// Number of ticks in the race
    total: usize,
    /// Duration of one tick (s)
    dt_s: f64,
    /// UNIX time at the start of tick 0
    start_time: i64,
}

impl Clock {
    /// Creates a clock of `total` ticks, each `dt_s` seconds long.
    pub fn new(total: usize, dt_s: f64, start_time: i64) -> Self {
        Self {
            current: 0,
            total,
            dt_s,
            start_time,
        }
    }

    /// Advances the clock by one tick.
    ///
    /// # Returns
    ///
    /// * `Some(tick)` - The tick index (starting from 0) before advancing
    /// * `None` - If every tick has been handed out
    pub fn tick(&mut self) -> Option<usize> {
        if self.current < self.total {
            let tick = self.current;
            self.current += 1;
            Some(tick)
        } else {
            None
        }
    }

    /// Runs a function for each remaining tick, in order.
    pub fn run(&mut self, mut f: impl FnMut(usize)) {
        while let Some(tick) = self.tick() {
            f(tick);
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn dt_s(&self) -> f64 {
        self.dt_s
    }

    /// Seconds elapsed from the start line to the start of `tick`.
    pub fn elapsed_s(&self, tick: usize) -> f64 {
        tick as f64 * self.dt_s
    }

    /// UNIX timestamp at the start of `tick`, rounded to the nearest second.
    pub fn timestamp(&self, tick: usize) -> i64 {
        self.start_time + self.elapsed_s(tick).round() as i64
    }
}
