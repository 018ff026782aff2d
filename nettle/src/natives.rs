use std::{cell::RefCell, path::PathBuf, rc::Rc};

use log::{debug, info};
use nettle_core::{
    environment::prelude::Value,
    eval::prelude::Interpreter,
    utils::prelude::{Error, WarningEmitterIO}
};

use crate::cli::stderr_buffer_writer;

/// Registers `import`, which runs `<target>.nt` from the working directory
/// in the importing frame. The module shares the importer's output and call
/// depth. Modules currently being imported are tracked so a cycle fails
/// instead of recursing forever.
pub fn install(interpreter: &mut Interpreter, warnings: Rc<dyn WarningEmitterIO>) {
    install_import(interpreter, warnings, Rc::new(RefCell::new(vec![])));
}

fn install_import(
    interpreter: &mut Interpreter,
    warnings: Rc<dyn WarningEmitterIO>,
    importing: Rc<RefCell<Vec<PathBuf>>>
) {
    let template = interpreter.nested();

    interpreter.register_native("import", Some(1), move |args, env| {
        let target = args[0].to_string();
        let path = module_path(&target);

        if importing.borrow().contains(&path) {
            return Err(format!("circular import of `{target}`"));
        }

        info!("importing {}", path.display());

        let src = std::fs::read_to_string(&path)
            .map_err(|err| format!("cannot read {}: {err}", path.display()))?;

        let mut nested = template.nested();
        install_import(&mut nested, warnings.clone(), importing.clone());

        importing.borrow_mut().push(path.clone());
        let result = nested.run_source(path.clone(), src, env, warnings.clone());
        importing.borrow_mut().pop();

        match result {
            Ok(_) => {
                debug!("imported {}", path.display());
                Ok(Value::Undefined)
            },
            Err(err) => {
                report(&err);
                Err(format!("failed to import `{target}`"))
            }
        }
    });
}

/// `lib` and `lib.nt` both name `lib.nt`.
pub(crate) fn module_path(target: &str) -> PathBuf {
    let path = PathBuf::from(target);

    match path.extension() {
        Some(extension) if extension == "nt" => path,
        _ => PathBuf::from(format!("{target}.nt"))
    }
}

fn report(err: &Error) {
    let buffer_writer = stderr_buffer_writer();
    let mut buffer = buffer_writer.buffer();

    err.pretty(&mut buffer);
    buffer_writer
        .print(&buffer)
        .expect("Writing error to stderr");
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::module_path;

    #[test]
    fn test_module_path() {
        assert_eq!(module_path("lib"), PathBuf::from("lib.nt"));
        assert_eq!(module_path("lib.nt"), PathBuf::from("lib.nt"));
        assert_eq!(module_path("dir/util"), PathBuf::from("dir/util.nt"));
        assert_eq!(module_path("data.v2"), PathBuf::from("data.v2.nt"));
    }
}
