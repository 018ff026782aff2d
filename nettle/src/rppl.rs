use nettle_core::parser::prelude::parse_module;

use crate::cli::read_line;

const PROMPT: &str = ">> ";

pub fn start(print_ast: bool) -> std::io::Result<()> {
	loop {
		let Some(input) = read_line(PROMPT)? else {
			return Ok(());
		};

		match input.as_str() {
			"" => {},
			".exit" => return Ok(()),
			_ => match parse_module(&input) {
				Ok(parsed) if print_ast => println!("{:#?}", parsed.program),
				Ok(parsed) => println!("{}", parsed.program),
				Err(errors) => {
					for error in errors {
						let (message, extra) = error.details();

						println!("[at {}] Parse error: {}.", error.position, message);
						if !extra.is_empty() {
							println!("\t{}", extra.join(";\n\t"));
						}
					}
				}
			}
		}
	}
}
