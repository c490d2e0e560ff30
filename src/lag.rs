use super::series::SpatialUnitSeries;
use super::threshold::{Condition, WeekFlags};


/// Weeks from the onset of the unbroken run of `c` that ends right before
/// `trigger` to the trigger week itself.
///
/// The scan starts at the week before the trigger and moves backwards while
/// the flag holds and consecutive weeks are at most seven days apart. If the
/// week before the trigger already fails, there is no run and no lag.
pub fn run_lag(series: &SpatialUnitSeries, flags: &[WeekFlags], trigger: usize, c: Condition) -> Option<u32> {
	assert_eq!(series.len(), flags.len());
	let mut onset: Option<usize> = None;
	let mut i = trigger;
	while i > 0 {
		let prev = i - 1;
		if !flags[prev].get(c) || !series.adjacent(prev, i) {
			break
		}
		onset = Some(prev);
		i = prev;
	}
	onset.map(|start| series.weeks_between(start, trigger))
}

/// Weeks from the most recent rainfall peak before `trigger` to the trigger
/// week. Ties go to the latest week holding the maximum.
pub fn rainfall_lag(series: &SpatialUnitSeries, trigger: usize) -> Option<u32> {
	let before = &series.weeks()[..trigger];
	let mut peak: Option<usize> = None;
	for (i, w) in before.iter().enumerate() {
		match peak {
			Some(p) if before[p].rain_sum > w.rain_sum => (),
			_ => peak = Some(i),
		}
	}
	peak.map(|p| series.weeks_between(p, trigger))
}
