/// Replay clock over the window `[start, end)`.
///
/// The clock does not pick step sizes itself. After each step it is moved to
/// whatever next time the controller asked for.
///
/// # Examples
///
/// ```
/// use connectivity_ctl::sim::clock::Clock;
///
/// let mut clock = Clock::new(0, 3);
/// let mut times = Vec::new();
///
/// while let Some(t) = clock.now() {
///     times.push(t);
///     clock.advance_to(t + 1);
/// }
/// assert_eq!(times, vec![0, 1, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct Clock {
    /// Time of the next step
    current: u64,
    /// First time that is no longer simulated
    end: u64,
}

impl Clock {
    /// Creates a clock positioned at `start`.
    ///
    /// # Arguments
    ///
    /// * `start` - Time of the first step
    /// * `end` - Exclusive end of the window
    pub fn new(start: u64, end: u64) -> Self {
        Self {
            current: start,
            end,
        }
    }

    /// Returns the time of the pending step, or `None` once `end` is reached.
    pub fn now(&self) -> Option<u64> {
        (self.current < self.end).then_some(self.current)
    }

    /// Moves the clock to `next`.
    ///
    /// # Returns
    ///
    /// `false` if `next` does not move time forward; the clock is unchanged.
    pub fn advance_to(&mut self, next: u64) -> bool {
        if next <= self.current {
            return false;
        }
        self.current = next;
        true
    }
}
