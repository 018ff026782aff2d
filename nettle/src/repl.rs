use std::{path::PathBuf, rc::Rc};

use nettle_core::{
    environment::prelude::{Environment, Value},
    eval::prelude::{Interpreter, Options},
    parser::prelude::ParseErrorType,
    utils::prelude::{Error, WarningEmitterIO}
};

use crate::{cli::{read_line, stderr_buffer_writer}, natives};

const PROMPT: &str = ">> ";
const CONTINUATION: &str = ".. ";

/// Whether the input stopped in the middle of a construct and more lines
/// should be read before evaluating it.
fn incomplete(result: &Result<Value, Error>) -> bool {
    match result {
        Err(Error::Parse { errors, .. }) => errors.iter()
            .any(|error| error.error == ParseErrorType::UnexpectedEof),
        _ => false
    }
}

/// Read Eval Print Loop. Every line runs in the same global frame; a failing
/// line is reported and the loop goes on.
pub fn start(options: Options, warnings: Rc<dyn WarningEmitterIO>) -> std::io::Result<()> {
    let env = Environment::global();
    let mut interpreter = Interpreter::new(options);
    natives::install(&mut interpreter, warnings.clone());

    let mut pending = String::new();

    loop {
        let prompt = if pending.is_empty() { PROMPT } else { CONTINUATION };

        let Some(input) = read_line(prompt)? else {
            return Ok(());
        };

        match input.as_str() {
            "" if pending.is_empty() => continue,
            ".exit" => return Ok(()),
            _ => {}
        }

        pending.push_str(&input);
        pending.push('\n');

        let result = interpreter.run_source(
            PathBuf::from("<repl>"),
            pending.clone(),
            &env,
            warnings.clone()
        );

        // an empty line gives up on an unfinished construct
        if incomplete(&result) && !input.is_empty() {
            continue;
        }

        pending.clear();

        match result {
            Ok(Value::Undefined) => {},
            Ok(value) => println!("{value:?}"),
            Err(err) => {
                let buffer_writer = stderr_buffer_writer();
                let mut buffer = buffer_writer.buffer();

                err.pretty(&mut buffer);
                buffer_writer
                    .print(&buffer)
                    .expect("Writing error to stderr");
            }
        }
    }
}
