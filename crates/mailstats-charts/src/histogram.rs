//! Equal-width histogram binning for chart panels.

/// Default number of bins used by the chart histograms.
pub const DEFAULT_BINS: usize = 30;

/// One histogram bar: the half-open interval `[start, end)` and its count.
/// The last bin of a histogram is closed on the right.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: u64,
}

/// Split `values` into `bins` equal-width bins spanning `[min, max]`.
///
/// When every value is identical the range is widened to `[v - 0.5, v + 0.5]`
/// so the bars keep a visible width. Empty input, or `bins == 0`, yields no
/// bins. Non-finite values are ignored.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        min -= 0.5;
        max += 0.5;
    }

    let width = (max - min) / bins as f64;
    let mut result: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: min + width * i as f64,
            end: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for value in finite {
        let index = (((value - min) / width) as usize).min(bins - 1);
        result[index].count += 1;
    }

    result
}
