use chrono::NaiveDate;

use log::warn;

use super::error::{Error, Result};


/// One week of case counts and climate aggregates for a single spatial unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklyObservation {
	pub week_start_date: NaiveDate,
	pub dengue_cases: u64,
	pub temperature_2m_max: f64,
	pub temperature_2m_min: f64,
	pub relative_humidity_2m_mean: f64,
	pub rain_sum: f64,
}


/// Weeks of one district or block, ascending by `week_start_date`, with
/// unique dates and at least one entry.
///
/// Missing weeks are not interpolated; code walking the series must check
/// [`SpatialUnitSeries::adjacent`] where continuity matters.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialUnitSeries {
	weeks: Vec<WeeklyObservation>,
}

impl SpatialUnitSeries {
	/// Sort and de-duplicate `rows`. On duplicate dates the row that came
	/// last in the input wins.
	pub fn build<I: IntoIterator<Item = WeeklyObservation>>(rows: I) -> Result<Self> {
		let mut rows: Vec<WeeklyObservation> = rows.into_iter().collect();
		// stable, so equal dates keep their input order
		rows.sort_by_key(|row| row.week_start_date);

		let mut weeks: Vec<WeeklyObservation> = Vec::with_capacity(rows.len());
		for row in rows {
			match weeks.last_mut() {
				Some(prev) if prev.week_start_date == row.week_start_date => {
					warn!("duplicate week {}, keeping the later row", row.week_start_date);
					*prev = row;
				},
				_ => weeks.push(row),
			}
		}

		if weeks.is_empty() {
			return Err(Error::EmptySeries)
		}
		Ok(Self{weeks})
	}

	#[inline(always)]
	pub fn len(&self) -> usize {
		self.weeks.len()
	}

	#[inline(always)]
	pub fn is_empty(&self) -> bool {
		self.weeks.is_empty()
	}

	#[inline(always)]
	pub fn weeks(&self) -> &[WeeklyObservation] {
		&self.weeks[..]
	}

	#[inline(always)]
	pub fn date(&self, i: usize) -> NaiveDate {
		self.weeks[i].week_start_date
	}

	pub fn first_date(&self) -> NaiveDate {
		self.date(0)
	}

	pub fn last_date(&self) -> NaiveDate {
		self.date(self.weeks.len() - 1)
	}

	pub fn date_index(&self, date: NaiveDate) -> Option<usize> {
		self.weeks.binary_search_by_key(&date, |w| w.week_start_date).ok()
	}

	pub fn cases(&self) -> Vec<u64> {
		self.weeks.iter().map(|w| w.dengue_cases).collect()
	}

	/// True if week `j` starts no more than seven days after week `i`.
	pub fn adjacent(&self, i: usize, j: usize) -> bool {
		debug_assert!(i < j);
		(self.date(j) - self.date(i)).num_days() <= 7
	}

	/// Whole weeks from the start of week `i` to the start of week `j`.
	pub fn weeks_between(&self, i: usize, j: usize) -> u32 {
		let days = (self.date(j) - self.date(i)).num_days();
		debug_assert!(days >= 0);
		(days / 7) as u32
	}
}
