use std::sync::Mutex;

/// Counters for one conversion run.
pub struct ConversionMetrics {
    inner: Mutex<Metrics>,
}

/// Point-in-time copy of the run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    pub lines_processed: usize,
    pub lines_skipped: usize,
    pub lines_failed: usize,
    pub stations_written: usize,
    pub writes_failed: usize,
    pub placeholders: usize,
}

impl ConversionMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    fn update(&self, apply: impl FnOnce(&mut Metrics)) {
        if let Ok(mut metrics) = self.inner.lock() {
            apply(&mut metrics);
        }
    }

    pub fn record_processed(&self, placeholders: usize) {
        self.update(|m| {
            m.lines_processed += 1;
            m.placeholders += placeholders;
        });
    }

    pub fn record_skipped(&self) {
        self.update(|m| m.lines_skipped += 1);
    }

    pub fn record_failed(&self) {
        self.update(|m| m.lines_failed += 1);
    }

    pub fn record_station(&self) {
        self.update(|m| m.stations_written += 1);
    }

    pub fn record_write_failed(&self) {
        self.update(|m| m.writes_failed += 1);
    }

    pub fn snapshot(&self) -> Metrics {
        self.inner.lock().map(|m| *m).unwrap_or_default()
    }
}

impl Default for ConversionMetrics {
    fn default() -> Self {
        Self::new()
    }
}
