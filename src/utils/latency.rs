use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LatencyStats {
    pub replies: usize,
    pub mean: Duration,
    pub max: Duration,
    pub over_budget: usize,
}

/// Tracks prospect reply latency against a per-reply budget.
#[derive(Debug, Clone)]
pub struct LatencyTracker {
    budget: Duration,
    samples: Vec<Duration>,
}

impl LatencyTracker {
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            samples: Vec::new(),
        }
    }

    pub fn record(&mut self, latency: Duration) {
        if !self.budget.is_zero() && latency > self.budget {
            tracing::debug!(
                "⏱️ Reply took {:?}, over the {:?} budget",
                latency,
                self.budget
            );
        }
        self.samples.push(latency);
    }

    pub fn stats(&self) -> LatencyStats {
        if self.samples.is_empty() {
            return LatencyStats::default();
        }

        let total: Duration = self.samples.iter().sum();
        let max = self.samples.iter().max().copied().unwrap_or_default();
        let over_budget = if self.budget.is_zero() {
            0
        } else {
            self.samples.iter().filter(|l| **l > self.budget).count()
        };

        LatencyStats {
            replies: self.samples.len(),
            mean: total / self.samples.len() as u32,
            max,
            over_budget,
        }
    }

    pub fn log_final_stats(&self) {
        let stats = self.stats();
        if stats.replies == 0 {
            return;
        }
        tracing::info!(
            "📊 Reply latency - replies: {}, mean: {:?}, max: {:?}, over budget: {}",
            stats.replies,
            stats.mean,
            stats.max,
            stats.over_budget
        );
    }
}

impl Default for LatencyTracker {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
