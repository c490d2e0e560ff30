use std::io;

use chrono::naive::NaiveDate;

use serde::{Deserialize, Serialize};

use smartstring::alias::{String as SmartString};

use super::error::{Error, Result};
use super::progress::ProgressSink;
use super::selection::UnitKey;
use super::series::WeeklyObservation;


/// A row of the weekly dashboard table as it comes off disk. Numeric fields
/// are kept as text until [`RawWeeklyRow::validate`] so that errors can name
/// the row and column.
///
/// Precomputed derived columns (`trigger_date`, `lag_*`, `meets_threshold`)
/// may be present in the input; they are ignored and recomputed.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWeeklyRow {
	pub dtname: SmartString,
	pub sdtname: SmartString,
	#[serde(default)]
	pub dtname_disp: Option<SmartString>,
	#[serde(default)]
	pub sdtname_disp: Option<SmartString>,
	pub week_start_date: SmartString,
	pub dengue_cases: SmartString,
	pub temperature_2m_max: SmartString,
	pub temperature_2m_min: SmartString,
	pub relative_humidity_2m_mean: SmartString,
	pub rain_sum: SmartString,
	#[serde(default, deserialize_with = "csv::invalid_option")]
	pub pct_blocks_with_cases: Option<f64>,
}


/// A validated row: the observation plus its unit and passthrough columns.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyRecord {
	pub unit: UnitKey,
	pub district_disp: SmartString,
	pub block_disp: SmartString,
	pub observation: WeeklyObservation,
	pub pct_blocks_with_cases: Option<f64>,
}


fn invalid(row: usize, field: &'static str, value: &str, reason: &'static str) -> Error {
	Error::Invalid{
		row,
		field,
		value: value.into(),
		reason,
	}
}

fn parse_date(row: usize, field: &'static str, s: &str) -> Result<NaiveDate> {
	let s = s.trim();
	let date_part = match s.len() {
		// plain ISO date
		10 => Some(s),
		// date with time of day, as written by pandas
		19 => s.get(..10),
		_ => None,
	};
	let date_part = date_part.ok_or_else(|| invalid(row, field, s, "expected YYYY-MM-DD"))?;
	date_part.replace("/", "-").parse::<NaiveDate>().map_err(|_| invalid(row, field, s, "expected YYYY-MM-DD"))
}

fn parse_count(row: usize, field: &'static str, s: &str) -> Result<u64> {
	let t = s.trim();
	if t.is_empty() {
		return Err(invalid(row, field, s, "missing value"))
	}
	if let Ok(v) = t.parse::<i64>() {
		if v < 0 {
			return Err(invalid(row, field, s, "must not be negative"))
		}
		return Ok(v as u64)
	}
	// integer columns containing gaps get written as floats
	match t.parse::<f64>() {
		Ok(v) if v.is_finite() && v.fract() == 0.0 => {
			if v < 0.0 {
				Err(invalid(row, field, s, "must not be negative"))
			} else {
				Ok(v as u64)
			}
		},
		Ok(_) => Err(invalid(row, field, s, "must be a whole number")),
		Err(_) => Err(invalid(row, field, s, "not a number")),
	}
}

fn parse_real(row: usize, field: &'static str, s: &str) -> Result<f64> {
	let t = s.trim();
	if t.is_empty() {
		return Err(invalid(row, field, s, "missing value"))
	}
	match t.parse::<f64>() {
		Ok(v) if v.is_finite() => Ok(v),
		Ok(_) => Err(invalid(row, field, s, "must be finite")),
		Err(_) => Err(invalid(row, field, s, "not a number")),
	}
}

fn display_or_raw(disp: &Option<SmartString>, raw: &SmartString) -> SmartString {
	match disp {
		Some(d) if !d.trim().is_empty() => d.trim().into(),
		_ => raw.trim().into(),
	}
}

impl RawWeeklyRow {
	/// Check and convert the row. `row` is the 1-based data row number used
	/// in error messages.
	pub fn validate(&self, row: usize) -> Result<WeeklyRecord> {
		let rain_sum = parse_real(row, "rain_sum", &self.rain_sum)?;
		if rain_sum < 0.0 {
			return Err(invalid(row, "rain_sum", &self.rain_sum, "must not be negative"))
		}
		let observation = WeeklyObservation{
			week_start_date: parse_date(row, "week_start_date", &self.week_start_date)?,
			dengue_cases: parse_count(row, "dengue_cases", &self.dengue_cases)?,
			temperature_2m_max: parse_real(row, "temperature_2m_max", &self.temperature_2m_max)?,
			temperature_2m_min: parse_real(row, "temperature_2m_min", &self.temperature_2m_min)?,
			relative_humidity_2m_mean: parse_real(row, "relative_humidity_2m_mean", &self.relative_humidity_2m_mean)?,
			rain_sum,
		};
		Ok(WeeklyRecord{
			unit: UnitKey{
				district: self.dtname.trim().into(),
				block: self.sdtname.trim().into(),
			},
			district_disp: display_or_raw(&self.dtname_disp, &self.dtname),
			block_disp: display_or_raw(&self.sdtname_disp, &self.sdtname),
			observation,
			// NaN cells count as absent
			pct_blocks_with_cases: self.pct_blocks_with_cases.filter(|v| v.is_finite()),
		})
	}
}


/// Read and validate the whole weekly table. Fails on the first bad row.
pub fn load_weekly_records<R: io::Read, S: ProgressSink + ?Sized>(s: &mut S, r: R) -> Result<Vec<WeeklyRecord>> {
	let mut r = csv::Reader::from_reader(r);
	let mut result = Vec::new();
	for (i, row) in r.deserialize().enumerate() {
		let raw: RawWeeklyRow = row?;
		result.push(raw.validate(i + 1)?);
		if i % 10000 == 9999 {
			s.update(i + 1);
		}
	}
	s.finish(result.len());
	Ok(result)
}


/// One output row: an input week with its flags and its unit's derived
/// trigger and lag values. `None` is written as an empty field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedRow {
	pub dtname: SmartString,
	pub sdtname: SmartString,
	pub dtname_disp: SmartString,
	pub sdtname_disp: SmartString,
	pub week_start_date: NaiveDate,
	pub dengue_cases: u64,
	pub temperature_2m_max: f64,
	pub temperature_2m_min: f64,
	pub relative_humidity_2m_mean: f64,
	pub rain_sum: f64,
	pub max_temp_ok: bool,
	pub min_temp_ok: bool,
	pub humidity_ok: bool,
	pub rainfall_ok: bool,
	pub meets_threshold: bool,
	pub trigger_date: Option<NaiveDate>,
	pub lag_all_weeks: Option<u32>,
	pub lag_max_weeks: Option<u32>,
	pub lag_min_weeks: Option<u32>,
	pub lag_hum_weeks: Option<u32>,
	pub lag_rainfall_weeks: Option<u32>,
	pub pct_blocks_with_cases: Option<f64>,
}

pub fn write_derived<W: io::Write>(w: W, rows: &[DerivedRow]) -> Result<()> {
	let mut w = csv::Writer::from_writer(w);
	for row in rows {
		w.serialize(row)?;
	}
	w.flush()?;
	Ok(())
}


#[cfg(test)]
mod tests {
	use super::*;
	use crate::progress::NullSink;

	const HEADER: &str = "dtname,sdtname,dtname_disp,sdtname_disp,week_start_date,dengue_cases,temperature_2m_max,temperature_2m_min,relative_humidity_2m_mean,rain_sum,pct_blocks_with_cases\n";

	fn load(body: &str) -> Result<Vec<WeeklyRecord>> {
		let text = format!("{}{}", HEADER, body);
		load_weekly_records(&mut NullSink, text.as_bytes())
	}

	#[test]
	fn loads_valid_rows() {
		let recs = load(concat!(
			"Jaipur,All,Jaipur (High),All,2024-06-03,12,36.5,24.1,55.0,3.2,41.5\n",
			"Jaipur,Sanganer, Jaipur (High) ,,2024-06-10 00:00:00,7.0,34.0,23.0,61.0,0,\n",
		)).unwrap();
		assert_eq!(recs.len(), 2);
		assert_eq!(recs[0].district_disp.as_str(), "Jaipur (High)");
		assert_eq!(recs[0].pct_blocks_with_cases, Some(41.5));
		assert_eq!(recs[1].district_disp.as_str(), "Jaipur (High)");
		assert_eq!(recs[1].block_disp.as_str(), "Sanganer");
		assert_eq!(recs[1].observation.week_start_date, NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
		assert_eq!(recs[1].observation.dengue_cases, 7);
		assert_eq!(recs[1].pct_blocks_with_cases, None);
	}

	#[test]
	fn rejects_negative_cases_with_row_and_field() {
		let err = load(concat!(
			"Jaipur,All,,,2024-06-03,12,36.5,24.1,55.0,3.2,\n",
			"Jaipur,All,,,2024-06-10,-4,36.5,24.1,55.0,3.2,\n",
		)).unwrap_err();
		match err {
			Error::Invalid{row, field, ..} => {
				assert_eq!(row, 2);
				assert_eq!(field, "dengue_cases");
			},
			other => panic!("unexpected error: {:?}", other),
		}
	}

	#[test]
	fn rejects_non_numeric_temperature() {
		let err = load("Jaipur,All,,,2024-06-03,12,hot,24.1,55.0,3.2,\n").unwrap_err();
		match err {
			Error::Invalid{row: 1, field: "temperature_2m_max", ..} => (),
			other => panic!("unexpected error: {:?}", other),
		}
	}

	#[test]
	fn rejects_fractional_cases_and_bad_dates() {
		assert!(matches!(
			load("Jaipur,All,,,2024-06-03,1.5,30,20,60,3,\n"),
			Err(Error::Invalid{field: "dengue_cases", ..})
		));
		assert!(matches!(
			load("Jaipur,All,,,03/06/2024,1,30,20,60,3,\n"),
			Err(Error::Invalid{field: "week_start_date", ..})
		));
		assert!(matches!(
			load("Jaipur,All,,,2024-06-03,1,30,20,60,-1,\n"),
			Err(Error::Invalid{field: "rain_sum", ..})
		));
	}

	#[test]
	fn non_finite_block_share_is_absent() {
		let recs = load(concat!(
			"Jaipur,All,,,2024-06-03,1,30,20,60,3,nan\n",
			"Jaipur,All,,,2024-06-10,1,30,20,60,3,inf\n",
			"Jaipur,All,,,2024-06-17,1,30,20,60,3,12.5\n",
		)).unwrap();
		let shares: Vec<Option<f64>> = recs.iter().map(|r| r.pct_blocks_with_cases).collect();
		assert_eq!(shares, vec![None, None, Some(12.5)]);
	}

	#[test]
	fn writes_absent_values_as_empty_fields() {
		let row = DerivedRow{
			dtname: "Jaipur".into(),
			sdtname: "All".into(),
			dtname_disp: "Jaipur".into(),
			sdtname_disp: "All".into(),
			week_start_date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
			dengue_cases: 0,
			temperature_2m_max: 30.0,
			temperature_2m_min: 20.0,
			relative_humidity_2m_mean: 60.0,
			rain_sum: 1.5,
			max_temp_ok: true,
			min_temp_ok: true,
			humidity_ok: true,
			rainfall_ok: true,
			meets_threshold: true,
			trigger_date: None,
			lag_all_weeks: None,
			lag_max_weeks: Some(0),
			lag_min_weeks: None,
			lag_hum_weeks: None,
			lag_rainfall_weeks: None,
			pct_blocks_with_cases: None,
		};
		let mut buf = Vec::new();
		write_derived(&mut buf, &[row]).unwrap();
		let text = String::from_utf8(buf).unwrap();
		let mut lines = text.lines();
		assert!(lines.next().unwrap().ends_with("lag_rainfall_weeks,pct_blocks_with_cases"));
		assert_eq!(
			lines.next().unwrap(),
			"Jaipur,All,Jaipur,All,2024-06-03,0,30.0,20.0,60.0,1.5,true,true,true,true,true,,,0,,,,"
		);
	}
}
