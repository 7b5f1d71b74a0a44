//! Histogram calibrator for percentile amax

use crate::error::Result;

use super::calibrator::check_unsigned;

/// Fixed-bin histogram of |x| over `[0, range]`
///
/// When a batch exceeds the current range the existing counts are re-binned
/// into the wider range by bin centre, so the bin count stays constant.
#[derive(Clone, Debug)]
pub struct HistogramCalibrator {
    counts: Vec<u64>,
    range: f32,
    percentile: f32,
    unsigned: bool,
    num_batches: usize,
}

impl HistogramCalibrator {
    pub fn new(num_bins: usize, percentile: f32, unsigned: bool) -> Self {
        Self {
            counts: vec![0; num_bins.max(1)],
            range: 0.0,
            percentile,
            unsigned,
            num_batches: 0,
        }
    }

    /// Observe a batch of data
    pub fn collect(&mut self, data: &[f32]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }

        check_unsigned(data, self.unsigned)?;

        let batch_max = data.iter().fold(0.0f32, |m, &x| m.max(x.abs()));
        if batch_max > self.range {
            self.rebin(batch_max);
        }

        let num_bins = self.counts.len();
        if self.range > 0.0 {
            let width = self.range / num_bins as f32;
            for &x in data {
                let idx = ((x.abs() / width) as usize).min(num_bins - 1);
                self.counts[idx] += 1;
            }
        } else {
            self.counts[0] += data.len() as u64;
        }

        self.num_batches += 1;
        Ok(())
    }

    /// Upper edge of the bin where the cumulative count reaches the percentile
    pub fn compute_amax(&self) -> Option<f32> {
        let total: u64 = self.counts.iter().sum();
        if total == 0 {
            return None;
        }
        if self.range <= 0.0 {
            return Some(0.0);
        }

        let width = self.range / self.counts.len() as f32;
        let target = f64::from(self.percentile) / 100.0 * total as f64;
        let mut cumulative = 0u64;
        for (i, &count) in self.counts.iter().enumerate() {
            cumulative += count;
            if cumulative as f64 >= target {
                return Some((i + 1) as f32 * width);
            }
        }
        Some(self.range)
    }

    pub fn num_batches(&self) -> usize {
        self.num_batches
    }

    pub fn num_bins(&self) -> usize {
        self.counts.len()
    }

    /// Current histogram range
    pub fn range(&self) -> f32 {
        self.range
    }

    pub fn reset(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = 0);
        self.range = 0.0;
        self.num_batches = 0;
    }

    fn rebin(&mut self, new_range: f32) {
        let num_bins = self.counts.len();
        if self.range > 0.0 {
            let old_width = self.range / num_bins as f32;
            let new_width = new_range / num_bins as f32;
            let mut counts = vec![0u64; num_bins];
            for (i, &count) in self.counts.iter().enumerate() {
                if count == 0 {
                    continue;
                }
                let centre = (i as f32 + 0.5) * old_width;
                let idx = ((centre / new_width) as usize).min(num_bins - 1);
                counts[idx] += count;
            }
            self.counts = counts;
        }
        // With a zero range every count sits in bin 0, which maps to bin 0 again.
        self.range = new_range;
    }
}
