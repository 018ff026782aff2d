use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    io::{BufRead, Write},
    path::PathBuf,
    rc::Rc
};

use log::{debug, trace};

use crate::{
    environment::prelude::{
        Class, Env, Environment, EnvironmentError, Function, FunctionBody, Instance, Map, Value
    },
    lexer::prelude::Token,
    optimizer::prelude::load_source,
    parser::prelude::{
        Block, ClassDeclaration, ClassMember, Declaration, Expression, FixedLoop, FunctionDeclaration,
        Identifier, Primitive, Program, Statement, Switch, Try
    },
    utils::prelude::{Error, SrcSpan, WarningEmitterIO}
};
use super::{
    error::{runtime_error, EvalResult, RuntimeError, RuntimeErrorType, Signal},
    operators::{binary, unary},
    stdlib
};

/// Remaining stack below which evaluation moves to a freshly allocated segment.
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Fold constants before running.
    pub optimize: bool,
    /// Assigning to an undeclared name declares it in the current frame
    /// instead of failing.
    pub implicit_declarations: bool,
    /// Nested calls allowed before `StackOverflow`. Evaluation grows its own
    /// stack, so the limit does not depend on the host thread's stack size.
    pub max_call_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            optimize: true,
            implicit_declarations: false,
            max_call_depth: 256,
        }
    }
}

/// Tree-walking evaluator. Holds the native function table and the
/// streams `print` and `input` talk to. Streams and call depth are shared
/// with interpreters created through [`Interpreter::nested`].
pub struct Interpreter {
    options: Options,
    natives: HashMap<String, Value>,
    output: Rc<RefCell<Box<dyn Write>>>,
    input: Rc<RefCell<Box<dyn BufRead>>>,
    depth: Rc<Cell<usize>>,
}

impl Interpreter {
    /// Creates an interpreter on stdout/stdin with the standard natives installed.
    pub fn new(options: Options) -> Self {
        let mut interpreter = Self {
            options,
            natives: HashMap::new(),
            output: Rc::new(RefCell::new(Box::new(std::io::stdout()))),
            input: Rc::new(RefCell::new(Box::new(std::io::BufReader::new(std::io::stdin())))),
            depth: Rc::new(Cell::new(0)),
        };

        stdlib::install(&mut interpreter);

        interpreter
    }

    pub fn with_output(mut self, output: Box<dyn Write>) -> Self {
        self.output = Rc::new(RefCell::new(output));
        self
    }

    pub fn with_input(mut self, input: Box<dyn BufRead>) -> Self {
        self.input = Rc::new(RefCell::new(input));
        self
    }

    /// An interpreter for code started from inside this one, such as an
    /// imported module. It writes to the same output, reads the same input,
    /// counts calls against the same depth and starts with the same natives.
    pub fn nested(&self) -> Self {
        Self {
            options: self.options.clone(),
            natives: self.natives.clone(),
            output: self.output.clone(),
            input: self.input.clone(),
            depth: self.depth.clone(),
        }
    }

    pub fn register_native(
        &mut self,
        name: &str,
        arity: Option<usize>,
        callback: impl Fn(&[Value], &Env) -> Result<Value, String> + 'static
    ) {
        debug!("registering native `{name}`");
        self.natives.insert(name.to_string(), Value::native(name, arity, callback));
    }

    /// Runs every statement of `program` in `env`. The result is the value
    /// of a top-level `return`, or of the last statement otherwise.
    pub fn run(&mut self, program: &Program, env: &Env) -> Result<Value, RuntimeError> {
        let mut last = Value::Undefined;

        for statement in program.statements.iter() {
            match self.execute(statement, env) {
                Ok(value) => last = value,
                Err(signal) => return match signal {
                    Signal::Return(value) => Ok(value),
                    Signal::Break(span) => Err(RuntimeError::new(RuntimeErrorType::BreakOutsideLoop, span)),
                    Signal::Continue(span) => Err(RuntimeError::new(RuntimeErrorType::ContinueOutsideLoop, span)),
                    Signal::Throw(value, span) => Err(RuntimeError::new(
                        RuntimeErrorType::UncaughtThrow { value: value.to_string() },
                        span
                    )),
                    Signal::Error(error) => Err(*error),
                }
            }
        }

        Ok(last)
    }

    /// Parses, optionally folds and runs `src`.
    pub fn run_source(
        &mut self,
        path: PathBuf,
        src: String,
        env: &Env,
        warnings: Rc<dyn WarningEmitterIO>
    ) -> Result<Value, Error> {
        let program = load_source(path.clone(), src.clone(), warnings, self.options.optimize)?;

        self.run(&program, env)
            .map_err(|error| Error::Runtime { path, src, error })
    }

    /// Runs `block` directly in `env`; the caller decides whether that is a
    /// fresh frame.
    pub fn execute_block(&mut self, block: &Block, env: Env) -> EvalResult {
        let mut last = Value::Undefined;

        for statement in block.statements.iter() {
            last = self.execute(statement, &env)?;
        }

        Ok(last)
    }

    pub fn execute(&mut self, statement: &Statement, env: &Env) -> EvalResult {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.execute_inner(statement, env))
    }

    fn execute_inner(&mut self, statement: &Statement, env: &Env) -> EvalResult {
        trace!("executing {}", statement.location());

        match statement {
            Statement::Declaration(declaration) => {
                self.declare(declaration, env)?;
                Ok(Value::Undefined)
            },
            Statement::Function(function) => {
                let value = self.function(function, env);
                env.borrow_mut().define(&function.name.value, value, false);
                Ok(Value::Undefined)
            },
            Statement::Class(class) => self.class(class, env),
            Statement::Block(block) => self.execute_block(block, Environment::enclosed(env)),
            Statement::If(conditional) => {
                if self.evaluate(&conditional.condition, env)?.is_truthy() {
                    self.execute(&conditional.resolution, env)?;
                } else if let Some(alternative) = &conditional.alternative {
                    self.execute(alternative, env)?;
                }

                Ok(Value::Undefined)
            },
            Statement::While(loop_) => {
                while self.evaluate(&loop_.condition, env)?.is_truthy() {
                    match self.execute(&loop_.body, env) {
                        Ok(_) | Err(Signal::Continue(_)) => {},
                        Err(Signal::Break(_)) => break,
                        Err(signal) => return Err(signal)
                    }
                }

                Ok(Value::Undefined)
            },
            Statement::For(loop_) => self.fixed_loop(loop_, env),
            Statement::Switch(switch) => self.switch(switch, env),
            Statement::Return(ret) => {
                let value = match &ret.value {
                    Some(value) => self.evaluate(value, env)?,
                    None => Value::Undefined
                };

                Err(Signal::Return(value))
            },
            Statement::Break(break_) => Err(Signal::Break(break_.location)),
            Statement::Continue(continue_) => Err(Signal::Continue(continue_.location)),
            Statement::Throw(throw) => {
                let value = self.evaluate(&throw.value, env)?;
                Err(Signal::Throw(value, throw.location))
            },
            Statement::Try(try_) => self.try_catch(try_, env),
            Statement::Import(import) => {
                let Some(native) = self.lookup_callable("import", env) else {
                    return runtime_error(RuntimeErrorType::UndefinedFunction {
                        name: "import".to_string()
                    }, import.location);
                };

                self.call(native, vec![Value::string(&import.target)], env, import.location)?;
                Ok(Value::Undefined)
            },
            Statement::Print(output) => {
                let mut rendered = Vec::with_capacity(output.values.len());

                for value in output.values.iter() {
                    rendered.push(self.evaluate(value, env)?.to_string());
                }

                let mut sink = self.output.borrow_mut();

                writeln!(sink, "{}", rendered.join(" "))
                    .and_then(|_| sink.flush())
                    .or_else(|err| runtime_error(RuntimeErrorType::Io {
                        message: err.to_string()
                    }, output.location))?;

                Ok(Value::Undefined)
            },
            Statement::Pass(_) => Ok(Value::Undefined),
            Statement::Expression(statement) => self.evaluate(&statement.expression, env),
        }
    }

    fn declare(&mut self, declaration: &Declaration, env: &Env) -> Result<(), Signal> {
        for binding in declaration.bindings.iter() {
            let value = match &binding.value {
                Some(value) => self.evaluate(value, env)?,
                None => Value::Undefined
            };

            env.borrow_mut().define(&binding.name.value, value, declaration.kind.is_constant());
        }

        Ok(())
    }

    fn function(&self, function: &FunctionDeclaration, env: &Env) -> Value {
        Value::Function {
            function: Rc::new(Function {
                name: Some(function.name.value.clone()),
                parameters: function.parameters.iter().map(|p| p.value.clone()).collect(),
                body: FunctionBody::Block(function.body.clone()),
                closure: env.clone(),
            })
        }
    }

    fn class(&mut self, class: &ClassDeclaration, env: &Env) -> EvalResult {
        let parent = match &class.parent {
            Some(parent) => match self.identifier(parent, env)? {
                Value::Class { class: parent } => Some(parent),
                other => return runtime_error(RuntimeErrorType::InvalidParent {
                    name: parent.value.clone(),
                    type_name: other.type_name()
                }, parent.location)
            },
            None => None
        };

        let value = Value::Class {
            class: Rc::new(Class {
                name: class.name.value.clone(),
                parent,
                members: class.members.clone(),
                closure: env.clone(),
            })
        };

        env.borrow_mut().define(&class.name.value, value, false);

        Ok(Value::Undefined)
    }

    fn fixed_loop(&mut self, loop_: &FixedLoop, env: &Env) -> EvalResult {
        let frame = Environment::enclosed(env);

        if let Some(initializer) = &loop_.initializer {
            self.execute(initializer, &frame)?;
        }

        loop {
            if let Some(condition) = &loop_.condition {
                if !self.evaluate(condition, &frame)?.is_truthy() {
                    break;
                }
            }

            match self.execute(&loop_.body, &frame) {
                Ok(_) | Err(Signal::Continue(_)) => {},
                Err(Signal::Break(_)) => break,
                Err(signal) => return Err(signal)
            }

            if let Some(update) = &loop_.update {
                self.evaluate(update, &frame)?;
            }
        }

        Ok(Value::Undefined)
    }

    fn switch(&mut self, switch: &Switch, env: &Env) -> EvalResult {
        let subject = self.evaluate(&switch.subject, env)?;

        // cases are tried in order; `default` matches whenever it is reached
        for case in switch.cases.iter() {
            let matches = match &case.value {
                Some(value) => self.evaluate(value, env)? == subject,
                None => true
            };

            if matches {
                self.execute(&case.body, env)?;
                break;
            }
        }

        Ok(Value::Undefined)
    }

    fn try_catch(&mut self, try_: &Try, env: &Env) -> EvalResult {
        let result = self.execute_block(&try_.body, Environment::enclosed(env));

        let result = match (result, &try_.catch) {
            (Err(Signal::Throw(value, span)), Some(catch)) => {
                debug!("caught {value:?} thrown at {span}");

                let frame = Environment::enclosed(env);

                if let Some(parameter) = &catch.parameter {
                    frame.borrow_mut().define(&parameter.value, value, false);
                }

                self.execute_block(&catch.body, frame)
            },
            (result, _) => result
        };

        if let Some(finally) = &try_.finally {
            self.execute_block(finally, Environment::enclosed(env))?;
        }

        result.map(|_| Value::Undefined)
    }

    pub fn evaluate(&mut self, expression: &Expression, env: &Env) -> EvalResult {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.evaluate_inner(expression, env))
    }

    fn evaluate_inner(&mut self, expression: &Expression, env: &Env) -> EvalResult {
        match expression {
            Expression::Identifier(identifier) => self.identifier(identifier, env),
            Expression::Primitive(primitive) => Ok(match primitive {
                Primitive::Int { value, .. } => Value::Integer { value: *value },
                Primitive::Float { value, .. } => Value::Float { value: *value },
                Primitive::String { value, .. } => Value::string(value),
                Primitive::Bool { value, .. } => Value::Boolean { value: *value },
                Primitive::Null { .. } => Value::Null,
                Primitive::Undefined { .. } => Value::Undefined,
            }),
            Expression::Infix(infix) => match infix.operator {
                Token::AndAnd => {
                    let left = self.evaluate(&infix.left, env)?;

                    if left.is_truthy() {
                        self.evaluate(&infix.right, env)
                    } else {
                        Ok(left)
                    }
                },
                Token::OrOr => {
                    let left = self.evaluate(&infix.left, env)?;

                    if left.is_truthy() {
                        Ok(left)
                    } else {
                        self.evaluate(&infix.right, env)
                    }
                },
                _ => {
                    let left = self.evaluate(&infix.left, env)?;
                    let right = self.evaluate(&infix.right, env)?;

                    binary(&infix.operator, left, right, infix.location)
                }
            },
            Expression::Prefix(prefix) => match (&prefix.operator, prefix.expression.as_ref()) {
                (Token::PlusPlus | Token::MinusMinus, Expression::Identifier(target)) => {
                    let operator = match prefix.operator {
                        Token::PlusPlus => Token::Plus,
                        _ => Token::Minus
                    };

                    let current = self.identifier(target, env)?;
                    let value = binary(&operator, current, Value::Integer { value: 1 }, prefix.location)?;

                    self.assign(target, value, env)
                },
                _ => {
                    let operand = self.evaluate(&prefix.expression, env)?;
                    unary(&prefix.operator, operand, prefix.location)
                }
            },
            Expression::Ternary(ternary) => {
                if self.evaluate(&ternary.condition, env)?.is_truthy() {
                    self.evaluate(&ternary.resolution, env)
                } else {
                    self.evaluate(&ternary.alternative, env)
                }
            },
            Expression::Assignment(assignment) => {
                let value = self.evaluate(&assignment.value, env)?;

                let value = match assignment.operator.compound_operator() {
                    Some(operator) => {
                        let current = self.identifier(&assignment.target, env)?;
                        binary(&operator, current, value, assignment.location)?
                    },
                    None => value
                };

                self.assign(&assignment.target, value, env)
            },
            Expression::Call(call) => {
                let callee = match call.callee.as_ref() {
                    Expression::Identifier(identifier) => match self.lookup_callable(&identifier.value, env) {
                        Some(callee) => callee,
                        None => return runtime_error(RuntimeErrorType::UndefinedFunction {
                            name: identifier.value.clone()
                        }, identifier.location)
                    },
                    callee => self.evaluate(callee, env)?
                };

                let mut arguments = Vec::with_capacity(call.arguments.len());

                for argument in call.arguments.iter() {
                    arguments.push(self.evaluate(argument, env)?);
                }

                self.call(callee, arguments, env, call.location)
            },
            Expression::Member(member) => match self.evaluate(&member.object, env)? {
                Value::Map { entries } => {
                    let value = entries.borrow().get(&member.name.value).cloned();
                    Ok(value.unwrap_or(Value::Undefined))
                },
                Value::Instance { instance } => {
                    let value = instance.frame.borrow().get_local(&member.name.value);

                    match value {
                        Some(value) => Ok(value),
                        None => runtime_error(RuntimeErrorType::UnknownMember {
                            name: member.name.value.clone()
                        }, member.name.location)
                    }
                },
                other => runtime_error(RuntimeErrorType::NoMembers {
                    type_name: other.type_name()
                }, member.location)
            },
            Expression::Index(index) => {
                let object = self.evaluate(&index.object, env)?;
                let key = self.evaluate(&index.index, env)?;

                self.index(object, key, index.location)
            },
            Expression::List(list) => {
                let mut items = Vec::with_capacity(list.items.len());

                for item in list.items.iter() {
                    items.push(self.evaluate(item, env)?);
                }

                Ok(Value::array(items))
            },
            Expression::Map(map) => {
                let mut entries = Map::new();

                for entry in map.entries.iter() {
                    let value = self.evaluate(&entry.value, env)?;
                    entries.insert(entry.key.clone(), value);
                }

                Ok(Value::map(entries))
            },
            Expression::Lambda(lambda) => Ok(Value::Function {
                function: Rc::new(Function {
                    name: None,
                    parameters: lambda.parameters.iter().map(|p| p.value.clone()).collect(),
                    body: FunctionBody::Expression(lambda.body.clone()),
                    closure: env.clone(),
                })
            }),
            Expression::Input(input) => {
                let prompt = match &input.prompt {
                    Some(prompt) => Some(self.evaluate(prompt, env)?),
                    None => None
                };

                self.read_line(prompt, input.location)
            },
            Expression::Nested { expression, .. } => self.evaluate(expression, env),
        }
    }

    fn identifier(&self, identifier: &Identifier, env: &Env) -> EvalResult {
        if let Some(value) = env.borrow().get(&identifier.value) {
            return Ok(value);
        }

        match self.natives.get(&identifier.value) {
            Some(native) => Ok(native.clone()),
            None => runtime_error(RuntimeErrorType::UndefinedVariable {
                name: identifier.value.clone()
            }, identifier.location)
        }
    }

    /// A callable binding in scope wins over a native of the same name; a
    /// non-callable binding only surfaces when no native exists.
    fn lookup_callable(&self, name: &str, env: &Env) -> Option<Value> {
        let bound = env.borrow().get(name);

        match bound {
            Some(value) if value.is_callable() => Some(value),
            bound => self.natives.get(name).cloned().or(bound)
        }
    }

    fn assign(&mut self, target: &Identifier, value: Value, env: &Env) -> EvalResult {
        let result = env.borrow_mut().set(&target.value, value.clone());

        match result {
            Ok(()) => Ok(value),
            Err(EnvironmentError::Constant { name }) => {
                runtime_error(RuntimeErrorType::ConstantReassignment { name }, target.location)
            },
            Err(EnvironmentError::Undefined { name }) if self.options.implicit_declarations => {
                debug!("implicitly declaring `{name}`");
                env.borrow_mut().define(name, value.clone(), false);
                Ok(value)
            },
            Err(EnvironmentError::Undefined { name }) => {
                runtime_error(RuntimeErrorType::UndefinedVariable { name }, target.location)
            }
        }
    }

    fn index(&self, object: Value, key: Value, span: SrcSpan) -> EvalResult {
        match (&object, &key) {
            (Value::Array { items }, Value::Integer { value }) => Ok(usize::try_from(*value).ok()
                .and_then(|idx| items.borrow().get(idx).cloned())
                .unwrap_or(Value::Undefined)),
            (Value::String { value: string }, Value::Integer { value }) => Ok(usize::try_from(*value).ok()
                .and_then(|idx| string.chars().nth(idx))
                .map(|c| Value::string(c.to_string()))
                .unwrap_or(Value::Undefined)),
            (Value::Map { entries }, Value::String { value }) => {
                let value = entries.borrow().get(value).cloned();
                Ok(value.unwrap_or(Value::Undefined))
            },
            (Value::Array { .. } | Value::String { .. } | Value::Map { .. }, _) => {
                runtime_error(RuntimeErrorType::InvalidIndex {
                    container: object.type_name(),
                    index: key.type_name()
                }, span)
            },
            _ => runtime_error(RuntimeErrorType::NotIndexable { type_name: object.type_name() }, span)
        }
    }

    fn read_line(&mut self, prompt: Option<Value>, span: SrcSpan) -> EvalResult {
        let io_error = |err: std::io::Error| RuntimeError::new(RuntimeErrorType::Io {
            message: err.to_string()
        }, span);

        if let Some(prompt) = prompt {
            let mut sink = self.output.borrow_mut();

            write!(sink, "{prompt}").map_err(io_error)?;
            sink.flush().map_err(io_error)?;
        }

        let mut line = String::new();

        if self.input.borrow_mut().read_line(&mut line).map_err(io_error)? == 0 {
            return Ok(Value::Undefined);
        }

        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);

        Ok(Value::String { value: line })
    }

    /// Calls a function, native or class with already evaluated arguments.
    pub fn call(&mut self, callee: Value, arguments: Vec<Value>, env: &Env, span: SrcSpan) -> EvalResult {
        match callee {
            Value::Function { function } => {
                let name = function.name.clone().unwrap_or_else(|| "lambda".to_string());

                if function.parameters.len() != arguments.len() {
                    return runtime_error(RuntimeErrorType::ArityMismatch {
                        name,
                        expected: function.parameters.len(),
                        got: arguments.len()
                    }, span);
                }

                if self.depth.get() >= self.options.max_call_depth {
                    return runtime_error(RuntimeErrorType::StackOverflow {
                        depth: self.options.max_call_depth
                    }, span);
                }

                let frame = Environment::enclosed(&function.closure);

                for (parameter, argument) in function.parameters.iter().zip(arguments) {
                    frame.borrow_mut().define(parameter, argument, false);
                }

                self.depth.set(self.depth.get() + 1);
                trace!("calling `{name}` at depth {}", self.depth.get());

                let result = match &function.body {
                    FunctionBody::Block(body) => self.execute_block(body, frame).map(|_| Value::Undefined),
                    FunctionBody::Expression(body) => self.evaluate(body, &frame),
                };

                self.depth.set(self.depth.get() - 1);

                match result {
                    Ok(value) | Err(Signal::Return(value)) => Ok(value),
                    Err(Signal::Break(span)) => runtime_error(RuntimeErrorType::BreakOutsideLoop, span),
                    Err(Signal::Continue(span)) => runtime_error(RuntimeErrorType::ContinueOutsideLoop, span),
                    Err(signal) => Err(signal)
                }
            },
            Value::NativeFunction { native } => {
                if let Some(arity) = native.arity {
                    if arity != arguments.len() {
                        return runtime_error(RuntimeErrorType::ArityMismatch {
                            name: native.name.clone(),
                            expected: arity,
                            got: arguments.len()
                        }, span);
                    }
                }

                trace!("calling native `{}`", native.name);

                (native.callback)(&arguments, env).or_else(|message| {
                    runtime_error(RuntimeErrorType::Native { name: native.name.clone(), message }, span)
                })
            },
            Value::Class { class } => self.instantiate(class, arguments, span),
            other => runtime_error(RuntimeErrorType::NotCallable { type_name: other.type_name() }, span)
        }
    }

    fn instantiate(&mut self, class: Rc<Class>, arguments: Vec<Value>, span: SrcSpan) -> EvalResult {
        let frame = Environment::enclosed(&class.closure);

        self.install_members(&class, &frame)?;

        let init = frame.borrow().get_local("init");

        match init {
            Some(init) => {
                self.call(init, arguments, &frame, span)?;
            },
            None if !arguments.is_empty() => {
                return runtime_error(RuntimeErrorType::ArityMismatch {
                    name: class.name.clone(),
                    expected: 0,
                    got: arguments.len()
                }, span);
            },
            None => {}
        }

        Ok(Value::Instance {
            instance: Rc::new(Instance { class, frame })
        })
    }

    fn install_members(&mut self, class: &Class, frame: &Env) -> Result<(), Signal> {
        if let Some(parent) = &class.parent {
            self.install_members(parent, frame)?;
        }

        for member in class.members.iter() {
            match member {
                ClassMember::Field(field) => self.declare(field, frame)?,
                ClassMember::Method(method) => {
                    let value = self.function(method, frame);
                    frame.borrow_mut().define(&method.name.value, value, false);
                }
            }
        }

        Ok(())
    }
}
