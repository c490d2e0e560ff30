use dengue::{analyse_selection, block_options, format_lag, highlight_ranges, load_weekly_records, open_input, Condition, Error, NullSink};


static PANELS: &[(Condition, &str)] = &[
	(Condition::Combined, "Dengue Cases"),
	(Condition::MaxTemp, "Max Temperature (°C)"),
	(Condition::MinTemp, "Min Temperature (°C)"),
	(Condition::Humidity, "Mean Relative Humidity (%)"),
	(Condition::Rainfall, "Rainfall (mm)"),
];


fn main() -> Result<(), Box<dyn std::error::Error>> {
	pretty_env_logger::init();

	let argv: Vec<String> = std::env::args().collect();
	if argv.len() < 3 {
		eprintln!("usage: {} <input.csv[.gz]|URL> <district> [block]", argv[0]);
		std::process::exit(2);
	}
	let district = argv[2].as_str();
	let block = argv.get(3).map(|s| s.as_str()).unwrap_or("All");
	let config = dengue::config::from_env()?;

	let records = load_weekly_records(&mut NullSink, open_input(&argv[1])?)?;
	let (series, analysis) = match analyse_selection(&records, district, block, &config) {
		Ok(v) => v,
		Err(Error::EmptySeries) => {
			println!("no data for this selection");
			let blocks = block_options(&records, district);
			if blocks.len() > 1 {
				let names: Vec<&str> = blocks.iter().map(|b| b.as_str()).collect();
				println!("blocks of {}: {}", district, names.join(", "));
			}
			return Ok(())
		},
		Err(other) => return Err(other.into()),
	};
	let result = &analysis.result;

	println!("Block: {}, District: {}", block, district);
	println!("weeks: {} .. {} ({} weeks)", series.first_date(), series.last_date(), series.len());
	match result.trigger_date {
		Some(d) => println!("trigger week: {}", d),
		None => println!("trigger week: –"),
	}
	for (c, title) in PANELS.iter() {
		let lag = result.lag(*c);
		match result.onset_date(*c) {
			Some(onset) if *c == Condition::Rainfall => println!("{} (Lag: {}) peak at {}", title, format_lag(lag), onset),
			Some(onset) => println!("{} (Lag: {}) since {}", title, format_lag(lag), onset),
			None => println!("{} (Lag: {})", title, format_lag(lag)),
		}
		for (start, end) in highlight_ranges(&series, &analysis.flags, *c) {
			println!("    {} .. {}", start, end);
		}
	}
	Ok(())
}
