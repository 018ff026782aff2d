pub mod error;
pub mod optimizer;

pub mod prelude {
    pub use super::{
        error::*,
        optimizer::*,
        load,
        load_from_stream,
        load_source
    };
}


use std::{path::PathBuf, rc::Rc};

use log::{debug, trace};
use utf8_chars::BufReadCharsExt;

use crate::{
    parser::prelude::{parse_module, parse_module_from_stream, Program},
    utils::prelude::{Error, SourceWarningEmitter, WarningEmitter, WarningEmitterIO}
};
use self::optimizer::Optimizer;

/// Reads, parses and (optionally) folds the module at `path`.
pub fn load(
    path: PathBuf,
    warnings: Rc<dyn WarningEmitterIO>,
    optimize: bool
) -> Result<Program, Error> {
    let src = match std::fs::read_to_string(&path) {
        Ok(src) => src,
        Err(err) => {
            let error = Error::StdIo { err: err.kind() };
            return Err(error)
        }
    };

    load_source(path, src, warnings, optimize)
}

/// Same as [`load`], but lexes while the file is being read.
pub fn load_from_stream(
    path: PathBuf,
    warnings: Rc<dyn WarningEmitterIO>,
    optimize: bool
) -> Result<Program, Error> {
    let file = match std::fs::File::open(&path) {
        Ok(file) => file,
        Err(err) => {
            let error = Error::StdIo { err: err.kind() };
            return Err(error)
        }
    };

    let file_size = file.metadata()
        .map_err(|err| Error::StdIo { err: err.kind() })?.len() as usize;

    let mut src = String::with_capacity(file_size);
    let mut failure = None;
    let mut reader = std::io::BufReader::new(file);

    let stream = reader.chars()
        .map_while(|c| match c {
            Ok(c) => {
                src.push(c);
                Some(c)
            },
            Err(err) => {
                failure = Some(err.kind());
                None
            }
        });

    let parsed = parse_module_from_stream(stream);

    if let Some(err) = failure {
        return Err(Error::StdIo { err })
    }

    if !parsed.errors.is_empty() {
        return Err(Error::Parse { path, src, errors: parsed.errors })
    }

    let mut program = parsed.program;

    if optimize {
        let warnings = SourceWarningEmitter::new(path, src, WarningEmitter::new(warnings));
        Optimizer::optimize(&mut program, &warnings);
    }

    Ok(program)
}

/// Parses and folds `src`, which was read from `path`.
pub fn load_source(
    path: PathBuf,
    src: String,
    warnings: Rc<dyn WarningEmitterIO>,
    optimize: bool
) -> Result<Program, Error> {
    let parsed = match parse_module(&src) {
        Ok(parsed) => parsed,
        Err(errors) => {
            debug!("{} parse error(s) in {}", errors.len(), path.display());
            let error = Error::Parse { path, src, errors };
            return Err(error)
        }
    };

    let mut program = parsed.program;

    if optimize {
        let warnings = SourceWarningEmitter::new(path, src, WarningEmitter::new(warnings));
        Optimizer::optimize(&mut program, &warnings);
    }

    trace!("program:\n{program}");

    Ok(program)
}
