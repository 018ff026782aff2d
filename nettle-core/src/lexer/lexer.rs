use std::fmt::Display;
use std::iter::Fuse;

use log::trace;

use super::error::{LexicalError, LexicalErrorType};
use super::token::{Spanned, Token};
use crate::utils::prelude::{Position, SrcSpan};

pub type LexResult = std::result::Result<Spanned, LexicalError>;

pub fn str_to_keyword(word: &str) -> Option<Token> {
	Some(match word {
		"var" => Token::Var,
		"let" => Token::Let,
		"const" => Token::Const,
		"net" => Token::Net,
		"pub" => Token::Pub,
		"func" => Token::Func,
		"class" => Token::Class,
		"extends" => Token::Extends,

		"return" => Token::Return,
		"if" => Token::If,
		"else" => Token::Else,
		"while" => Token::While,
		"for" => Token::For,
		"break" => Token::Break,
		"continue" => Token::Continue,
		"switch" => Token::Switch,
		"case" => Token::Case,
		"default" => Token::Default,
		"try" => Token::Try,
		"catch" => Token::Catch,
		"finally" => Token::Finally,
		"throw" => Token::Throw,
		"import" => Token::Import,
		"pass" => Token::Pass,

		"print" => Token::Print,
		"input" => Token::Input,
		"lambda" => Token::Lambda,

		"true" => Token::True,
		"false" => Token::False,
		"null" => Token::Null,
		"undefined" => Token::Undefined,

		_ => return None
	})
}

/// Every prefix of an operator is itself an operator, so extending the
/// candidate one character at a time yields the longest match.
pub fn str_to_operator(operator: &str) -> Option<Token> {
	Some(match operator {
		"+" => Token::Plus,
		"++" => Token::PlusPlus,
		"+=" => Token::PlusAssign,
		"-" => Token::Minus,
		"--" => Token::MinusMinus,
		"-=" => Token::MinusAssign,
		"*" => Token::Star,
		"**" => Token::StarStar,
		"*=" => Token::StarAssign,
		"**=" => Token::StarStarAssign,
		"/" => Token::Slash,
		"/=" => Token::SlashAssign,
		"%" => Token::Percent,
		"%=" => Token::PercentAssign,
		"=" => Token::Assign,
		"==" => Token::Equal,
		"===" => Token::StrictEqual,
		"=>" => Token::FatArrow,
		"!" => Token::Bang,
		"!=" => Token::NotEqual,
		"!==" => Token::StrictNotEqual,
		"<" => Token::LessThan,
		"<=" => Token::LessThanOrEqual,
		"<<" => Token::ShiftLeft,
		"<<=" => Token::ShiftLeftAssign,
		">" => Token::GreaterThan,
		">=" => Token::GreaterThanOrEqual,
		">>" => Token::ShiftRight,
		">>=" => Token::ShiftRightAssign,
		">>>" => Token::UnsignedShiftRight,
		">>>=" => Token::UnsignedShiftRightAssign,
		"&" => Token::Ampersand,
		"&&" => Token::AndAnd,
		"&=" => Token::AmpersandAssign,
		"|" => Token::Pipe,
		"||" => Token::OrOr,
		"|=" => Token::PipeAssign,
		"^" => Token::Caret,
		"^=" => Token::CaretAssign,
		"~" => Token::Tilde,
		"." => Token::Dot,
		".." => Token::DotDot,
		"..=" => Token::DotDotAssign,

		_ => return None
	})
}

#[derive(Debug)]
pub struct Lexer<T: Iterator<Item = (u32, char)>> {
	position: u32,
	next_position: u32,
	ch: Option<char>,
	next_ch: Option<char>,
	cursor: Position,
	finished: bool,
	input: Fuse<T>,
}

impl<T: Iterator<Item = (u32, char)>> Display for Lexer<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f,
			"Lexer {{\n\tposition: {},\n\tnext_position: {},\n\tcursor: {},\n\tch: {:?}, next_ch: {:?}\n}}",
			self.position, self.next_position, self.cursor, self.ch, self.next_ch
		)
	}
}

impl<T: Iterator<Item = (u32, char)>> Lexer<T> {
	pub fn new(input: T) -> Self {
		let mut lexer = Self {
			position: 0,
			next_position: 0,
			ch: None,
			next_ch: None,
			cursor: Position::default(),
			finished: false,
			input: input.fuse(),
		};

		lexer.next_char();
		lexer.next_char();

		lexer
	}

	pub fn peek(&self) -> Option<char> {
		self.ch
	}

	pub fn peek_next(&self) -> Option<char> {
		self.next_ch
	}

	pub fn next_token(&mut self) -> LexResult {
		self.skip_whitespace();

		let start = self.position;
		let position = self.cursor;

		let ch = match self.ch {
			Some(ch) => ch,
			None => return Ok(Spanned::new(Token::Eof, SrcSpan::from(start, start), position))
		};

		match ch {
			'/' if self.next_ch == Some('/') => Ok(self.lex_line_comment()),
			'/' if self.next_ch == Some('*') => self.lex_block_comment(),
			'"' | '\'' => self.lex_string(ch),
			'`' => self.lex_template(),
			'a'..='z' | 'A'..='Z' | '_' | '$' => Ok(self.lex_ident()),
			'0'..='9' => self.lex_number(),
			'(' => Ok(self.eat_one_char(Token::LParen)),
			')' => Ok(self.eat_one_char(Token::RParen)),
			'[' => Ok(self.eat_one_char(Token::LSBracket)),
			']' => Ok(self.eat_one_char(Token::RSBracket)),
			'{' => Ok(self.eat_one_char(Token::LBrace)),
			'}' => Ok(self.eat_one_char(Token::RBrace)),
			',' => Ok(self.eat_one_char(Token::Comma)),
			';' => Ok(self.eat_one_char(Token::Semicolon)),
			':' => Ok(self.eat_one_char(Token::Colon)),
			'?' => Ok(self.eat_one_char(Token::Question)),
			c => match str_to_operator(c.encode_utf8(&mut [0; 4])) {
				Some(token) => Ok(self.lex_operator(c, token)),
				None => {
					self.next_char();

					Err(self.error(LexicalErrorType::UnrecognizedToken { tok: c }, start, position))
				}
			}
		}
	}

	fn next_char(&mut self) -> Option<char> {
		let ch = self.ch;

		if let Some(consumed) = ch {
			self.cursor.advance(consumed);
		}

		let next = self.input.next();

		self.position = self.next_position;
		self.next_position = match (next, self.next_ch) {
			(Some((pos, _)), _) => pos,
			(None, Some(last)) => self.next_position + last.len_utf8() as u32,
			(None, None) => self.next_position,
		};

		self.ch = self.next_ch;
		self.next_ch = next.map(|(_, ch)| ch);

		ch
	}

	fn error(&self, error: LexicalErrorType, start: u32, position: Position) -> LexicalError {
		LexicalError {
			error,
			location: SrcSpan::from(start, self.position),
			position,
		}
	}

	fn skip_whitespace(&mut self) {
		while self.ch.is_some_and(|ch| ch.is_whitespace()) {
			self.next_char();
		}
	}

	fn eat_one_char(&mut self, token: Token) -> Spanned {
		let start_pos = self.position;
		let position = self.cursor;
		self.next_char();
		let end_pos = self.position;

		Spanned::new(token, SrcSpan::from(start_pos, end_pos), position)
	}

	fn lex_operator(&mut self, first: char, mut token: Token) -> Spanned {
		let start_pos = self.position;
		let position = self.cursor;
		let mut operator = String::from(first);

		self.next_char();

		while let Some(ch) = self.ch {
			operator.push(ch);

			match str_to_operator(&operator) {
				Some(longer) => {
					token = longer;
					self.next_char();
				},
				None => break
			}
		}

		Spanned::new(token, SrcSpan::from(start_pos, self.position), position)
	}

	fn lex_ident(&mut self) -> Spanned {
		let start_pos = self.position;
		let position = self.cursor;
		let mut ident = String::new();

		while let Some(ch) = self.ch {
			if !(ch.is_ascii_alphanumeric() || ch == '_' || ch == '$') {
				break;
			}

			ident.push(ch);
			self.next_char();
		}

		let end_pos = self.position;
		let token = str_to_keyword(&ident).unwrap_or(Token::Ident(ident));

		Spanned::new(token, SrcSpan::from(start_pos, end_pos), position)
	}

	fn eat_digits(&mut self, value: &mut String) {
		while let Some(ch) = self.ch.filter(|ch| ch.is_ascii_digit()) {
			value.push(ch);
			self.next_char();
		}
	}

	fn lex_number(&mut self) -> LexResult {
		let start_pos = self.position;
		let position = self.cursor;

		if self.ch == Some('0') && matches!(self.next_ch, Some('x' | 'X' | 'o' | 'O' | 'b' | 'B')) {
			return self.lex_radix_number();
		}

		let mut value = String::new();
		let mut is_float = false;

		self.eat_digits(&mut value);

		if self.ch == Some('.') && self.next_ch.is_some_and(|ch| ch.is_ascii_digit()) {
			is_float = true;
			value.push('.');
			self.next_char();
			self.eat_digits(&mut value);
		}

		if let Some(exponent @ ('e' | 'E')) = self.ch {
			is_float = true;
			value.push(exponent);
			self.next_char();

			if let Some(sign @ ('+' | '-')) = self.ch {
				value.push(sign);
				self.next_char();
			}

			if !self.ch.is_some_and(|ch| ch.is_ascii_digit()) {
				return Err(self.error(LexicalErrorType::MissingDigitsAfterExponent, start_pos, position));
			}

			self.eat_digits(&mut value);
		}

		let token = if is_float {
			match value.parse::<f64>() {
				Ok(value) => Token::Float(value),
				Err(_) => return Err(self.error(LexicalErrorType::NumberOutOfRange, start_pos, position))
			}
		} else {
			match value.parse::<i64>() {
				Ok(value) => Token::Int(value),
				Err(_) => return Err(self.error(LexicalErrorType::NumberOutOfRange, start_pos, position))
			}
		};

		Ok(Spanned::new(token, SrcSpan::from(start_pos, self.position), position))
	}

	fn lex_radix_number(&mut self) -> LexResult {
		let start_pos = self.position;
		let position = self.cursor;

		self.next_char(); // skip zero

		let radix = match self.next_char() {
			Some('x' | 'X') => 16,
			Some('o' | 'O') => 8,
			_ => 2,
		};

		let mut digits = String::new();

		while let Some(ch) = self.ch.filter(|ch| ch.is_ascii_alphanumeric()) {
			digits.push(ch);
			self.next_char();
		}

		if digits.is_empty() {
			return Err(self.error(LexicalErrorType::MissingDigitsAfterRadix, start_pos, position));
		}

		if !digits.chars().all(|ch| ch.is_digit(radix)) {
			return Err(self.error(LexicalErrorType::DigitOutOfRadix, start_pos, position));
		}

		match i64::from_str_radix(&digits, radix) {
			Ok(value) => Ok(Spanned::new(Token::Int(value), SrcSpan::from(start_pos, self.position), position)),
			Err(_) => Err(self.error(LexicalErrorType::NumberOutOfRange, start_pos, position))
		}
	}

	fn lex_string(&mut self, quote: char) -> LexResult {
		let start_pos = self.position;
		let position = self.cursor;
		let mut value = String::new();

		self.next_char(); // skip opening quote

		loop {
			match self.next_char() {
				Some(ch) if ch == quote => break,
				Some('\\') => match self.next_char() {
					Some('n') => value.push('\n'),
					Some('t') => value.push('\t'),
					Some('r') => value.push('\r'),
					Some('0') => value.push('\0'),
					Some(escaped) => value.push(escaped),
					None => return Err(self.error(LexicalErrorType::UnterminatedString, start_pos, position))
				},
				Some(ch) => value.push(ch),
				None => return Err(self.error(LexicalErrorType::UnterminatedString, start_pos, position))
			}
		}

		Ok(Spanned::new(Token::String(value), SrcSpan::from(start_pos, self.position), position))
	}

	fn lex_template(&mut self) -> LexResult {
		let start_pos = self.position;
		let position = self.cursor;
		let mut value = String::new();

		self.next_char(); // skip backtick

		loop {
			match self.next_char() {
				Some('`') => break,
				Some(ch) => value.push(ch),
				None => return Err(self.error(LexicalErrorType::UnterminatedTemplate, start_pos, position))
			}
		}

		Ok(Spanned::new(Token::String(value), SrcSpan::from(start_pos, self.position), position))
	}

	fn lex_line_comment(&mut self) -> Spanned {
		let start_pos = self.position;
		let position = self.cursor;

		while self.ch.is_some_and(|ch| ch != '\n') {
			self.next_char();
		}

		Spanned::new(Token::Comment, SrcSpan::from(start_pos, self.position), position)
	}

	fn lex_block_comment(&mut self) -> LexResult {
		let start_pos = self.position;
		let position = self.cursor;

		self.next_char(); // skip slash
		self.next_char(); // skip star

		while !(self.ch == Some('*') && self.next_ch == Some('/')) {
			if self.next_char().is_none() {
				return Err(self.error(LexicalErrorType::MissingCommentEnd, start_pos, position));
			}
		}

		self.next_char();
		self.next_char();

		Ok(Spanned::new(Token::Comment, SrcSpan::from(start_pos, self.position), position))
	}
}

impl<T: Iterator<Item = (u32, char)>> Iterator for Lexer<T> {
	type Item = LexResult;

	fn next(&mut self) -> Option<Self::Item> {
		if self.finished {
			return None;
		}

		let token = self.next_token();

		match &token {
			Ok(spanned) => {
				trace!("token {:?} at {}", spanned.token, spanned.position);

				if spanned.token == Token::Eof {
					self.finished = true;
				}
			},
			Err(err) => trace!("lexical error {:?} at {}", err.error, err.position)
		}

		Some(token)
	}
}

/// Lexes a whole in-memory source.
pub fn lex(src: &str) -> Lexer<impl Iterator<Item = (u32, char)> + '_> {
	Lexer::new(src.char_indices().map(|(i, c)| (i as u32, c)))
}
