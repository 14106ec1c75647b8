use std::collections::HashMap;
use std::time::Instant;

/// Observer for stream-processing events.
///
/// Keeps the use cases free of any particular reporting mechanism; the CLI
/// logs through `log`, tests discard everything.
pub trait PipelineLogger: Send {
    /// Frames processed so far. `total` is 0 for live sources.
    fn progress(&mut self, current: usize, total: usize);

    /// How long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// A frame that could not be read or analysed and was dropped.
    fn skipped(&mut self, frame_index: usize, reason: &str);

    /// End-of-run report. Default: no-op.
    fn summary(&self) {}
}

/// Discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn skipped(&mut self, _frame_index: usize, _reason: &str) {}
}

/// Accumulates stage timings and skipped frames and reports through `log`.
///
/// Progress lines are throttled to one every `throttle_frames` frames.
pub struct StatsPipelineLogger {
    throttle_frames: usize,
    timings: HashMap<String, Vec<f64>>,
    skipped: Vec<usize>,
    start_time: Instant,
    frames: usize,
}

impl StatsPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            skipped: Vec::new(),
            start_time: Instant::now(),
            frames: 0,
        }
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn skipped_frames(&self) -> &[usize] {
        &self.skipped
    }

    /// Formatted report, or `None` when nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.skipped.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Stage timings ({} frames, {:.1}s total):",
            self.frames,
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = total_ms / durations.len().max(1) as f64;
            lines.push(format!(
                "  {stage:10}: avg {avg_ms:6.2}ms  total {total_ms:7.0}ms"
            ));
        }

        if !self.skipped.is_empty() {
            lines.push(format!("  Skipped frames: {}", self.skipped.len()));
        }

        if self.frames > 0 && elapsed_ms > 0.0 {
            let fps = self.frames as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }

        Some(lines.join("\n"))
    }
}

impl Default for StatsPipelineLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl PipelineLogger for StatsPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.frames = current;
        if current % self.throttle_frames != 0 && current != total {
            return;
        }
        if total > 0 {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Processed {current}/{total} frames ({pct:.1}%)");
        } else {
            log::info!("Processed {current} frames");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn skipped(&mut self, frame_index: usize, reason: &str) {
        log::warn!("Skipping frame {frame_index}: {reason}");
        self.skipped.push(frame_index);
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n{text}");
        }
    }
}
