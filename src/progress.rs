use std::io;
use std::io::Write;
use std::time;


/// Receives the number of rows ingested so far.
pub trait ProgressSink {
	fn update(&mut self, rows: usize);
	fn finish(&mut self, rows: usize);
}


/// Row counter with ingestion rate. Draws on stderr by default so stdout
/// stays free for table output.
pub struct ProgressMeter<W: Write = io::Stderr> {
	out: W,
	t0: time::Instant,
	tprev: time::Instant,
	rowsprev: usize,
}

impl ProgressMeter<io::Stderr> {
	pub fn start() -> Self {
		Self::start_on(io::stderr())
	}
}

impl<W: Write> ProgressMeter<W> {
	pub fn start_on(out: W) -> Self {
		let now = time::Instant::now();
		Self{
			out,
			t0: now,
			tprev: now,
			rowsprev: 0,
		}
	}

	fn rate(rows: usize, dt: time::Duration) -> f64 {
		let secs = dt.as_secs_f64();
		if secs > 0.0 {
			rows as f64 / secs
		} else {
			0.0
		}
	}

	pub fn into_inner(self) -> W {
		self.out
	}
}

impl<W: Write> ProgressSink for ProgressMeter<W> {
	fn update(&mut self, rows: usize) {
		let now = time::Instant::now();
		let rate = Self::rate(rows.saturating_sub(self.rowsprev), now - self.tprev);
		let _ = write!(self.out, "{:12} rows [{:8.0}/s]\r", rows, rate);
		let _ = self.out.flush();
		self.rowsprev = rows;
		self.tprev = now;
	}

	fn finish(&mut self, rows: usize) {
		let rate = Self::rate(rows, self.t0.elapsed());
		let _ = writeln!(self.out, "{:12} rows [{:8.0}/s]", rows, rate);
		let _ = self.out.flush();
	}
}


/// Discards all progress, for non-interactive runs and tests.
pub struct NullSink;

impl ProgressSink for NullSink {
	fn update(&mut self, _rows: usize) {}
	fn finish(&mut self, _rows: usize) {}
}


/// A progress meter when stderr is a terminal, nothing otherwise.
pub fn default_output() -> Box<dyn ProgressSink> {
	if isatty::stderr_isatty() {
		Box::new(ProgressMeter::start())
	} else {
		Box::new(NullSink)
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn meter_reports_row_counts() {
		let mut pm = ProgressMeter::start_on(Vec::new());
		pm.update(10000);
		pm.update(20000);
		pm.finish(23456);
		let text = String::from_utf8(pm.into_inner()).unwrap();
		let lines: Vec<&str> = text.split(|c| c == '\r' || c == '\n').filter(|l| !l.is_empty()).collect();
		assert_eq!(lines.len(), 3);
		assert!(lines[0].trim_start().starts_with("10000 rows ["));
		assert!(lines[1].trim_start().starts_with("20000 rows ["));
		assert!(lines[2].trim_start().starts_with("23456 rows ["));
		assert!(text.ends_with("/s]\n"));
	}
}
