use crate::date::{DateRange, to_millis};
use crate::ir::Instant;

const COMPRESSION_FACTOR: f64 = 3.0;

#[derive(Debug, Clone, PartialEq)]
pub enum TimeScale {
    Linear(LinearScale),
    Compressed(CompressedScale),
}

impl TimeScale {
    pub fn linear(domain: &DateRange, range_start: f32, range_end: f32) -> Self {
        Self::Linear(LinearScale {
            min: to_millis(domain.min) as f64,
            max: to_millis(domain.max) as f64,
            range_start,
            range_end,
        })
    }

    /// Piecewise-linear scale where unusually large gaps between
    /// `instants` are shortened.
    pub fn compressed(
        instants: &[Instant],
        domain: &DateRange,
        range_start: f32,
        range_end: f32,
    ) -> Self {
        let mut points: Vec<i64> = instants.iter().map(|instant| to_millis(*instant)).collect();
        points.push(to_millis(domain.min));
        points.push(to_millis(domain.max));
        points.sort_unstable();
        points.dedup();

        let gaps: Vec<f64> = points.windows(2).map(|w| (w[1] - w[0]) as f64).collect();
        let compressed = compress_gaps(&gaps);
        let mut cumulative = Vec::with_capacity(points.len());
        let mut acc = 0.0f64;
        cumulative.push(acc);
        for segment in &compressed.segments {
            acc += segment;
            cumulative.push(acc);
        }

        let mut scale = CompressedScale {
            points,
            cumulative,
            segments: compressed.segments,
            total: acc,
            threshold: compressed.threshold,
            range_start,
            range_end,
            breaks: Vec::new(),
        };
        scale.breaks = compressed
            .compressed
            .iter()
            .map(|&idx| scale.project(scale.cumulative[idx] + scale.segments[idx] / 2.0))
            .collect();
        Self::Compressed(scale)
    }

    pub fn map(&self, instant: Instant) -> f32 {
        let t = to_millis(instant);
        match self {
            Self::Linear(scale) => scale.map_millis(t as f64),
            Self::Compressed(scale) => scale.map_millis(t),
        }
    }

    pub fn breaks(&self) -> &[f32] {
        match self {
            Self::Linear(_) => &[],
            Self::Compressed(scale) => &scale.breaks,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearScale {
    min: f64,
    max: f64,
    range_start: f32,
    range_end: f32,
}

impl LinearScale {
    fn map_millis(&self, t: f64) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return (self.range_start + self.range_end) / 2.0;
        }
        let ratio = (t - self.min) / span;
        (self.range_start as f64 + ratio * (self.range_end - self.range_start) as f64) as f32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompressedScale {
    points: Vec<i64>,
    /// Compressed distance from the first point to each point.
    cumulative: Vec<f64>,
    segments: Vec<f64>,
    total: f64,
    threshold: f64,
    range_start: f32,
    range_end: f32,
    breaks: Vec<f32>,
}

impl CompressedScale {
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    fn map_millis(&self, t: i64) -> f32 {
        if self.total <= 0.0 {
            return (self.range_start + self.range_end) / 2.0;
        }
        let k = self.points.partition_point(|p| *p <= t);
        let distance = if k == 0 {
            0.0
        } else if k == self.points.len() {
            self.total
        } else {
            let lo = self.points[k - 1];
            let hi = self.points[k];
            let frac = (t - lo) as f64 / (hi - lo) as f64;
            self.cumulative[k - 1] + frac * self.segments[k - 1]
        };
        self.project(distance)
    }

    fn project(&self, distance: f64) -> f32 {
        if self.total <= 0.0 {
            return (self.range_start + self.range_end) / 2.0;
        }
        let ratio = distance / self.total;
        (self.range_start as f64 + ratio * (self.range_end - self.range_start) as f64) as f32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompressedGaps {
    pub segments: Vec<f64>,
    pub threshold: f64,
    /// Indices of the gaps that were shortened.
    pub compressed: Vec<usize>,
}

/// Upper median: the element at `floor(n / 2)` of the sorted values.
pub fn upper_median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Some(sorted[sorted.len() / 2])
}

/// Caps every gap above `3 × median` at that threshold.
pub fn compress_gaps(gaps: &[f64]) -> CompressedGaps {
    let Some(median) = upper_median(gaps) else {
        return CompressedGaps {
            segments: Vec::new(),
            threshold: 0.0,
            compressed: Vec::new(),
        };
    };
    let threshold = median * COMPRESSION_FACTOR;
    let mut segments = Vec::with_capacity(gaps.len());
    let mut compressed = Vec::new();
    for (idx, gap) in gaps.iter().enumerate() {
        if *gap > threshold {
            segments.push(threshold);
            compressed.push(idx);
        } else {
            segments.push(*gap);
        }
    }
    CompressedGaps {
        segments,
        threshold,
        compressed,
    }
}
