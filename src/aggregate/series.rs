/// Pure read-side transforms over a runner's odds series
use std::collections::BTreeMap;

use crate::types::{Candle, OddPoint};

/// Keep only the points within `window_ms` of the series' own last
/// timestamp. The window is anchored to the data, not the wall clock, so a
/// chart of a finished meeting still shows its final minutes. `None` means
/// no trimming. The boundary is inclusive.
pub fn filter_by_window(series: &[OddPoint], window_ms: Option<i64>) -> Vec<OddPoint> {
    let Some(window) = window_ms else {
        return series.to_vec();
    };
    let Some(last) = series.last() else {
        return Vec::new();
    };
    let cutoff = last.timestamp - window;
    series
        .iter()
        .filter(|point| point.timestamp >= cutoff)
        .cloned()
        .collect()
}

/// Aggregate win-odds points into fixed-size OHLC candles.
///
/// Points without a win value carry no price and are skipped. Buckets with
/// no surviving points simply do not appear; there is no gap filling. Each
/// candle is stamped with the real timestamp of its first point rather than
/// the bucket's left edge.
pub fn bucket_ohlc(series: &[OddPoint], bucket_size_ms: i64) -> Vec<Candle> {
    if bucket_size_ms <= 0 {
        return Vec::new();
    }

    let mut buckets: BTreeMap<i64, Vec<(i64, f64)>> = BTreeMap::new();
    for point in series {
        let Some(win) = point.win_odds else {
            continue;
        };
        let key = point.timestamp.div_euclid(bucket_size_ms) * bucket_size_ms;
        buckets.entry(key).or_default().push((point.timestamp, win));
    }

    buckets
        .into_values()
        .filter_map(|points| {
            let (first_ts, open) = *points.first()?;
            let (_, close) = *points.last()?;
            let (high, low) = points
                .iter()
                .fold((open, open), |(hi, lo), &(_, v)| (hi.max(v), lo.min(v)));
            Some(Candle {
                timestamp: first_ts,
                open,
                high,
                low,
                close,
            })
        })
        .collect()
}

/// Slice one page out of a series. Returns the page plus the total point
/// count so callers can render "page X of Y" without a second pass. Pages
/// past the end (and a zero page size) yield an empty page, never an error.
pub fn paginate(series: &[OddPoint], page_index: usize, page_size: usize) -> (Vec<OddPoint>, usize) {
    let total = series.len();
    if page_size == 0 {
        return (Vec::new(), total);
    }
    let Some(start) = page_index.checked_mul(page_size) else {
        return (Vec::new(), total);
    };
    if start >= total {
        return (Vec::new(), total);
    }
    let end = (start + page_size).min(total);
    (series[start..end].to_vec(), total)
}
