use std::fs::File;
use std::io;

use log::info;

use dengue::{analyse_table, derived_rows, load_weekly_records, open_input, write_derived};


fn main() -> Result<(), Box<dyn std::error::Error>> {
	pretty_env_logger::init();

	let argv: Vec<String> = std::env::args().collect();
	if argv.len() < 2 {
		eprintln!("usage: {} <input.csv[.gz]|URL> [output.csv|-]", argv[0]);
		std::process::exit(2);
	}
	let config = dengue::config::from_env()?;

	info!("loading weekly records from {} ...", argv[1]);
	let r = open_input(&argv[1])?;
	let records = load_weekly_records(&mut *dengue::default_output(), r)?;

	let units = analyse_table(&records, &config)?;
	let triggered = units.iter().filter(|u| u.analysis.result.trigger_date.is_some()).count();
	info!("{} of {} spatial units have a trigger week", triggered, units.len());

	let rows = derived_rows(&units);
	match argv.get(2).map(|s| s.as_str()) {
		None | Some("-") => {
			let stdout = io::stdout();
			write_derived(stdout.lock(), &rows)?;
		},
		Some(path) => {
			info!("writing {} rows to {}", rows.len(), path);
			write_derived(File::create(path)?, &rows)?;
		},
	}
	Ok(())
}
