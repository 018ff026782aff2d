use std::{cell::RefCell, fmt::{Debug, Display}, rc::Rc};

use crate::parser::prelude::{Block, ClassMember, Expression};

use super::prelude::Env;

/// Host callback behind a native function: receives the evaluated arguments
/// and the calling frame.
pub type NativeCallback = Rc<dyn Fn(&[Value], &Env) -> Result<Value, String>>;

#[derive(Clone)]
pub enum Value {
    Null,
    Undefined,
    Boolean {
        value: bool
    },
    Integer {
        value: i64
    },
    Float {
        value: f64
    },
    String {
        value: String
    },
    Array {
        items: Rc<RefCell<Vec<Value>>>
    },
    Map {
        entries: Rc<RefCell<Map>>
    },
    Function {
        function: Rc<Function>
    },
    NativeFunction {
        native: Rc<NativeFunction>
    },
    Error {
        message: String,
        data: Option<Box<Value>>
    },
    Class {
        class: Rc<Class>
    },
    Instance {
        instance: Rc<Instance>
    },
}

pub struct Function {
    pub name: Option<String>,
    pub parameters: Vec<String>,
    pub body: FunctionBody,
    pub closure: Env,
}

#[derive(Clone)]
pub enum FunctionBody {
    Block(Rc<Block>),
    Expression(Rc<Expression>),
}

pub struct NativeFunction {
    pub name: String,
    pub arity: Option<usize>,
    pub callback: NativeCallback,
}

pub struct Class {
    pub name: String,
    pub parent: Option<Rc<Class>>,
    pub members: Vec<ClassMember>,
    pub closure: Env,
}

pub struct Instance {
    pub class: Rc<Class>,
    pub frame: Env,
}

/// String-keyed map that remembers insertion order. Order is only visible
/// when iterating; equality compares keys and values.
#[derive(Clone, Default)]
pub struct Map {
    entries: Vec<(String, Value)>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Replaces the value in place when the key exists, keeping its position.
    pub fn insert(&mut self, key: String, value: Value) {
        match self.entries.iter_mut().find(|(name, _)| *name == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value))
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let idx = self.entries.iter().position(|(name, _)| name == key)?;

        Some(self.entries.remove(idx).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Value)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Value)> for Map {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut map = Map::new();

        for (key, value) in iter {
            map.insert(key, value);
        }

        map
    }
}

impl Value {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String { value: value.into() }
    }

    pub fn array(items: Vec<Value>) -> Self {
        Self::Array { items: Rc::new(RefCell::new(items)) }
    }

    pub fn map(map: Map) -> Self {
        Self::Map { entries: Rc::new(RefCell::new(map)) }
    }

    pub fn error(message: impl Into<String>, data: Option<Value>) -> Self {
        Self::Error { message: message.into(), data: data.map(Box::new) }
    }

    pub fn native(
        name: impl Into<String>,
        arity: Option<usize>,
        callback: impl Fn(&[Value], &Env) -> Result<Value, String> + 'static
    ) -> Self {
        Self::NativeFunction {
            native: Rc::new(NativeFunction {
                name: name.into(),
                arity,
                callback: Rc::new(callback),
            })
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Undefined => "undefined",
            Self::Boolean { .. } => "boolean",
            Self::Integer { .. } => "int",
            Self::Float { .. } => "float",
            Self::String { .. } => "string",
            Self::Array { .. } => "array",
            Self::Map { .. } => "map",
            Self::Function { .. } => "function",
            Self::NativeFunction { .. } => "native",
            Self::Error { .. } => "error",
            Self::Class { .. } => "class",
            Self::Instance { .. } => "instance",
        }
    }

    /// `null`, `undefined`, `false`, `0`, `0.0` and `""` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null | Self::Undefined => false,
            Self::Boolean { value } => *value,
            Self::Integer { value } => *value != 0,
            Self::Float { value } => *value != 0.0,
            Self::String { value } => !value.is_empty(),
            _ => true
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Function { .. } | Self::NativeFunction { .. } | Self::Class { .. })
    }

    /// Reference identity for containers and callables, value and type for scalars.
    pub fn identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Array { items: a }, Self::Array { items: b }) => Rc::ptr_eq(a, b),
            (Self::Map { entries: a }, Self::Map { entries: b }) => Rc::ptr_eq(a, b),
            (Self::Function { function: a }, Self::Function { function: b }) => Rc::ptr_eq(a, b),
            (Self::NativeFunction { native: a }, Self::NativeFunction { native: b }) => Rc::ptr_eq(a, b),
            (Self::Class { class: a }, Self::Class { class: b }) => Rc::ptr_eq(a, b),
            (Self::Instance { instance: a }, Self::Instance { instance: b }) => Rc::ptr_eq(a, b),
            (Self::Integer { value: a }, Self::Integer { value: b }) => a == b,
            (Self::Float { value: a }, Self::Float { value: b }) => a == b,
            (Self::Error { .. }, Self::Error { .. }) => false,
            (a, b) => a.type_name() == b.type_name() && a == b
        }
    }

    fn render(&self, f: &mut std::fmt::Formatter<'_>, quoted: bool, seen: &mut Vec<*const ()>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Undefined => write!(f, "undefined"),
            Self::Boolean { value } => write!(f, "{value}"),
            Self::Integer { value } => write!(f, "{value}"),
            Self::Float { value } if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 => {
                write!(f, "{value:.1}")
            },
            Self::Float { value } => write!(f, "{value}"),
            Self::String { value } if quoted => write!(f, "{value:?}"),
            Self::String { value } => write!(f, "{value}"),
            Self::Array { items } => {
                let ptr = Rc::as_ptr(items) as *const ();

                let items = match items.try_borrow() {
                    Ok(items) if !seen.contains(&ptr) => items,
                    _ => return write!(f, "[...]")
                };

                seen.push(ptr);
                write!(f, "[")?;

                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }

                    item.render(f, true, seen)?;
                }

                seen.pop();
                write!(f, "]")
            },
            Self::Map { entries } => {
                let ptr = Rc::as_ptr(entries) as *const ();

                let entries = match entries.try_borrow() {
                    Ok(entries) if !seen.contains(&ptr) => entries,
                    _ => return write!(f, "{{...}}")
                };

                seen.push(ptr);
                write!(f, "{{")?;

                for (idx, (key, value)) in entries.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }

                    write!(f, "{key:?}: ")?;
                    value.render(f, true, seen)?;
                }

                seen.pop();
                write!(f, "}}")
            },
            Self::Function { function } => match &function.name {
                Some(name) => write!(f, "<func {name}>"),
                None => write!(f, "<lambda>")
            },
            Self::NativeFunction { native } => write!(f, "<native {}>", native.name),
            Self::Error { message, data: Some(data) } => {
                write!(f, "error: {message} (")?;
                data.render(f, true, seen)?;
                write!(f, ")")
            },
            Self::Error { message, data: None } => write!(f, "error: {message}"),
            Self::Class { class } => write!(f, "<class {}>", class.name),
            Self::Instance { instance } => write!(f, "<{} instance>", instance.class.name),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.render(f, false, &mut vec![])
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.render(f, true, &mut vec![])
    }
}

/// Containers currently being compared, as pairs of cell pointers.
type Comparing = Vec<(*const (), *const ())>;

impl Value {
    fn eq_inner(&self, other: &Self, comparing: &mut Comparing) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) | (Self::Undefined, Self::Undefined) => true,
            (Self::Boolean { value: a }, Self::Boolean { value: b }) => a == b,
            (Self::Integer { value: a }, Self::Integer { value: b }) => a == b,
            (Self::Float { value: a }, Self::Float { value: b }) => a == b,
            (Self::Integer { value: a }, Self::Float { value: b })
            | (Self::Float { value: b }, Self::Integer { value: a }) => *a as f64 == *b,
            (Self::String { value: a }, Self::String { value: b }) => a == b,
            (Self::Array { items: a }, Self::Array { items: b }) => {
                let pair = (Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ());

                // a pair met again while still being compared is assumed equal
                if Rc::ptr_eq(a, b) || comparing.contains(&pair) {
                    return true;
                }

                let (Ok(a), Ok(b)) = (a.try_borrow(), b.try_borrow()) else {
                    return false;
                };

                if a.len() != b.len() {
                    return false;
                }

                comparing.push(pair);
                let equal = a.iter().zip(b.iter()).all(|(x, y)| x.eq_inner(y, comparing));
                comparing.pop();

                equal
            },
            (Self::Map { entries: a }, Self::Map { entries: b }) => {
                let pair = (Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ());

                if Rc::ptr_eq(a, b) || comparing.contains(&pair) {
                    return true;
                }

                let (Ok(a), Ok(b)) = (a.try_borrow(), b.try_borrow()) else {
                    return false;
                };

                if a.len() != b.len() {
                    return false;
                }

                comparing.push(pair);
                let equal = a.iter().all(|(key, x)| {
                    b.get(key).is_some_and(|y| x.eq_inner(y, comparing))
                });
                comparing.pop();

                equal
            },
            (
                Self::Error { message: a, data: data_a },
                Self::Error { message: b, data: data_b }
            ) => a == b && match (data_a, data_b) {
                (Some(x), Some(y)) => x.eq_inner(y, comparing),
                (None, None) => true,
                _ => false
            },
            (a, b) => a.identical(b)
        }
    }
}

/// Structural equality: numbers compare across `int`/`float`, containers
/// element-wise (maps regardless of order), callables by reference.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.eq_inner(other, &mut vec![])
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        Value::map(self.clone()) == Value::map(other.clone())
    }
}
