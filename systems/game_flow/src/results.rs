//! Per-round scores and the running best.

/// History of round scores.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultBoard {
    results: Vec<u32>,
}

impl ResultBoard {
    /// Creates an empty board.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            results: Vec::new(),
        }
    }

    /// Records a round score.
    ///
    /// Returns whether the displayed maximum should be refreshed: the score
    /// is non-zero and at least as good as every earlier round.
    pub fn record(&mut self, score: u32) -> bool {
        self.results.push(score);
        score != 0 && self.best() == score
    }

    /// Best score across all rounds, zero when none were played.
    #[must_use]
    pub fn best(&self) -> u32 {
        self.results.iter().copied().max().unwrap_or(0)
    }

    /// Score of the most recent round.
    #[must_use]
    pub fn last(&self) -> Option<u32> {
        self.results.last().copied()
    }

    /// Every recorded score in play order.
    #[must_use]
    pub fn results(&self) -> &[u32] {
        &self.results
    }
}
