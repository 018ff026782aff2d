use nettle_core::lexer::prelude::{lex, Token};

use crate::cli::read_line;

const PROMPT: &str = ">> ";

pub fn start() -> std::io::Result<()> {
	loop {
		let Some(input) = read_line(PROMPT)? else {
			return Ok(());
		};

		match input.as_str() {
			"" => {},
			".exit" => return Ok(()),
			_ => {
				for result in lex(&input) {
					match result {
						Ok(spanned) if spanned.token == Token::Eof => break,
						Ok(spanned) => println!("{:?} at {}", spanned.token, spanned.position),
						Err(err) => {
							let (message, extra) = err.details();

							println!("[at {}] Lexical error: {}", err.position, message);
							if !extra.is_empty() {
								println!("{}", extra.join("\n"));
							}
						}
					}
				}
			}
		}
	}
}
