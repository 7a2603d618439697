use std::time::{Duration, Instant};

/// Running totals across episodes for the interactive modes
pub struct EpisodeMetrics {
    pub start_time: Instant,
    pub elapsed_time: Duration,
    pub best_coverage: u32,
    pub best_reward: Option<f64>,
    pub episodes_played: u32,
}

impl EpisodeMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            elapsed_time: Duration::ZERO,
            best_coverage: 0,
            best_reward: None,
            episodes_played: 0,
        }
    }

    pub fn update(&mut self) {
        self.elapsed_time = self.start_time.elapsed();
    }

    pub fn on_episode_start(&mut self) {
        self.start_time = Instant::now();
        self.elapsed_time = Duration::ZERO;
    }

    pub fn on_episode_end(&mut self, coverage: u32, total_reward: f64) {
        self.episodes_played += 1;
        self.best_coverage = self.best_coverage.max(coverage);
        self.best_reward = Some(match self.best_reward {
            Some(best) => best.max(total_reward),
            None => total_reward,
        });
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for EpisodeMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_formatting() {
        let mut metrics = EpisodeMetrics::new();
        metrics.elapsed_time = Duration::from_secs(125);
        assert_eq!(metrics.format_time(), "02:05");

        metrics.elapsed_time = Duration::from_secs(0);
        assert_eq!(metrics.format_time(), "00:00");

        metrics.elapsed_time = Duration::from_secs(3661);
        assert_eq!(metrics.format_time(), "61:01");
    }

    #[test]
    fn test_best_coverage_tracking() {
        let mut metrics = EpisodeMetrics::new();

        metrics.on_episode_end(40, -3.5);
        assert_eq!(metrics.best_coverage, 40);
        assert_eq!(metrics.best_reward, Some(-3.5));
        assert_eq!(metrics.episodes_played, 1);

        metrics.on_episode_end(25, -10.0);
        assert_eq!(metrics.best_coverage, 40);
        assert_eq!(metrics.best_reward, Some(-3.5));

        metrics.on_episode_end(100, 120.0);
        assert_eq!(metrics.best_coverage, 100);
        assert_eq!(metrics.best_reward, Some(120.0));
        assert_eq!(metrics.episodes_played, 3);
    }

    #[test]
    fn test_episode_start_resets_time() {
        let mut metrics = EpisodeMetrics::new();
        std::thread::sleep(Duration::from_millis(50));
        metrics.update();

        assert!(metrics.elapsed_time.as_millis() >= 50);

        metrics.on_episode_start();
        metrics.update();
        assert!(metrics.elapsed_time.as_millis() < 50);
    }
}
