use std::time::{Duration, Instant};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct StageTiming {
    pub name: String,
    pub call_count: u64,
    pub total_duration: Duration,
    pub max_duration: Duration,
}

impl StageTiming {
    pub fn new(name: String) -> Self {
        Self {
            name,
            call_count: 0,
            total_duration: Duration::ZERO,
            max_duration: Duration::ZERO,
        }
    }

    pub fn record(&mut self, duration: Duration) {
        self.call_count += 1;
        self.total_duration += duration;
        self.max_duration = self.max_duration.max(duration);
    }

    pub fn total_micros(&self) -> f64 {
        self.total_duration.as_secs_f64() * 1_000_000.0
    }

    pub fn percentage(&self, total: Duration) -> f64 {
        if total.as_nanos() > 0 {
            (self.total_duration.as_nanos() as f64 / total.as_nanos() as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Wall-clock timings of the pipeline stages of one CLI run.
#[derive(Debug, Default)]
pub struct Profiler {
    timings: HashMap<String, StageTiming>,
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_stage(&mut self, name: &str, duration: Duration) {
        self.timings
            .entry(name.to_string())
            .or_insert_with(|| StageTiming::new(name.to_string()))
            .record(duration);
    }

    /// Run `f` and charge its duration to `name`.
    pub fn time<T>(&mut self, name: &str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.record_stage(name, start.elapsed());
        out
    }

    pub fn report(&self) -> ProfileReport {
        let total_time: Duration = self.timings.values()
            .map(|t| t.total_duration)
            .sum();

        let mut stages: Vec<StageTiming> = self.timings.values().cloned().collect();
        stages.sort_by(|a, b| b.total_duration.cmp(&a.total_duration));

        ProfileReport { total_time, stages }
    }
}

pub struct ProfileReport {
    pub total_time: Duration,
    pub stages: Vec<StageTiming>,
}

impl ProfileReport {
    /// Write the table to stderr.
    pub fn print(&self) {
        eprintln!("\n{}", "═".repeat(72));
        eprintln!("PROFILE  total {:.3} ms", self.total_time.as_secs_f64() * 1000.0);
        eprintln!("{}", "═".repeat(72));
        eprintln!("{:<24} {:<10} {:<14} {:<14} {:<8}",
            "Stage", "Calls", "Total(μs)", "Max(μs)", "% Time");
        eprintln!("{}", "─".repeat(72));

        for timing in &self.stages {
            eprintln!("{:<24} {:<10} {:<14.2} {:<14.2} {:<8.2}",
                timing.name,
                timing.call_count,
                timing.total_micros(),
                timing.max_duration.as_secs_f64() * 1_000_000.0,
                timing.percentage(self.total_time)
            );
        }
    }
}
