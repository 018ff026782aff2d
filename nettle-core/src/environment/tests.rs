use super::prelude::{Environment, EnvironmentError, Map, Value};

#[test]
fn test_define_and_lookup_through_parents() {
    let global = Environment::global();
    global.borrow_mut().define("x", Value::Integer { value: 1 }, false);

    let inner = Environment::enclosed(&global);
    inner.borrow_mut().define("y", Value::Integer { value: 2 }, false);

    assert_eq!(inner.borrow().get("x"), Some(Value::Integer { value: 1 }));
    assert_eq!(inner.borrow().get("y"), Some(Value::Integer { value: 2 }));
    assert_eq!(global.borrow().get("y"), None);

    assert!(inner.borrow().exists("x"));
    assert!(!global.borrow().exists("y"));
}

#[test]
fn test_shadowing_is_per_frame() {
    let global = Environment::global();
    global.borrow_mut().define("x", Value::Integer { value: 1 }, false);

    let inner = Environment::enclosed(&global);
    inner.borrow_mut().define("x", Value::Integer { value: 2 }, false);

    assert_eq!(inner.borrow().get("x"), Some(Value::Integer { value: 2 }));
    assert_eq!(global.borrow().get("x"), Some(Value::Integer { value: 1 }));

    // redefinition in the same frame overwrites and keeps the position
    global.borrow_mut().define("y", Value::Null, false);
    global.borrow_mut().define("x", Value::string("again"), false);

    assert_eq!(global.borrow().names(), vec!["x".to_string(), "y".to_string()]);
    assert_eq!(global.borrow().get("x"), Some(Value::string("again")));
}

#[test]
fn test_set_updates_owning_frame() -> Result<(), EnvironmentError> {
    let global = Environment::global();
    global.borrow_mut().define("counter", Value::Integer { value: 0 }, false);

    let inner = Environment::enclosed(&global);
    inner.borrow_mut().set("counter", Value::Integer { value: 5 })?;

    assert_eq!(global.borrow().get("counter"), Some(Value::Integer { value: 5 }));
    assert!(inner.borrow().names().is_empty());

    Ok(())
}

#[test]
fn test_set_errors() {
    let global = Environment::global();
    global.borrow_mut().define("limit", Value::Integer { value: 5 }, true);

    let inner = Environment::enclosed(&global);

    assert_eq!(
        inner.borrow_mut().set("limit", Value::Integer { value: 6 }),
        Err(EnvironmentError::Constant { name: "limit".to_string() })
    );
    assert_eq!(global.borrow().get("limit"), Some(Value::Integer { value: 5 }));

    assert_eq!(
        inner.borrow_mut().set("missing", Value::Null),
        Err(EnvironmentError::Undefined { name: "missing".to_string() })
    );
    assert!(inner.borrow().is_constant("limit"));
}

#[test]
fn test_truthiness() {
    let falsy = [
        Value::Null,
        Value::Undefined,
        Value::Boolean { value: false },
        Value::Integer { value: 0 },
        Value::Float { value: 0.0 },
        Value::string(""),
    ];

    for value in falsy {
        assert!(!value.is_truthy(), "{value:?} should be falsy");
    }

    let truthy = [
        Value::Boolean { value: true },
        Value::Integer { value: -1 },
        Value::Float { value: 0.5 },
        Value::string("0"),
        Value::array(vec![]),
        Value::map(Map::new()),
        Value::error("boom", None),
    ];

    for value in truthy {
        assert!(value.is_truthy(), "{value:?} should be truthy");
    }
}

#[test]
fn test_equality_and_identity() {
    let a = Value::array(vec![Value::Integer { value: 1 }, Value::string("x")]);
    let b = Value::array(vec![Value::Integer { value: 1 }, Value::string("x")]);

    assert_eq!(a, b);
    assert!(!a.identical(&b));
    assert!(a.identical(&a.clone()));

    assert_eq!(Value::Integer { value: 1 }, Value::Float { value: 1.0 });
    assert!(!Value::Integer { value: 1 }.identical(&Value::Float { value: 1.0 }));
    assert!(Value::string("s").identical(&Value::string("s")));
    assert_ne!(Value::Null, Value::Undefined);
}

#[test]
fn test_rendering() {
    let mut map = Map::new();
    map.insert("name".to_string(), Value::string("nettle"));
    map.insert("tags".to_string(), Value::array(vec![Value::Integer { value: 1 }, Value::Float { value: 2.0 }]));

    assert_eq!(Value::map(map).to_string(), r#"{"name": "nettle", "tags": [1, 2.0]}"#);
    assert_eq!(Value::Float { value: 0.25 }.to_string(), "0.25");
    assert_eq!(Value::string("plain").to_string(), "plain");
    assert_eq!(Value::error("bad", Some(Value::Integer { value: 3 })).to_string(), "error: bad (3)");

    let cyclic = Value::array(vec![]);
    if let Value::Array { items } = &cyclic {
        items.borrow_mut().push(cyclic.clone());
    }
    assert_eq!(cyclic.to_string(), "[[...]]");
}

#[test]
fn test_map_keeps_insertion_order() {
    let mut map = Map::new();
    map.insert("b".to_string(), Value::Integer { value: 1 });
    map.insert("a".to_string(), Value::Integer { value: 2 });
    map.insert("b".to_string(), Value::Integer { value: 3 });

    assert_eq!(map.keys().cloned().collect::<Vec<_>>(), vec!["b".to_string(), "a".to_string()]);
    assert_eq!(map.get("b"), Some(&Value::Integer { value: 3 }));
    assert_eq!(map.remove("b"), Some(Value::Integer { value: 3 }));
    assert_eq!(map.len(), 1);
}

#[test]
fn test_map_equality_ignores_order() {
    let mut first = Map::new();
    first.insert("a".to_string(), Value::Integer { value: 1 });
    first.insert("b".to_string(), Value::Integer { value: 2 });

    let mut second = Map::new();
    second.insert("b".to_string(), Value::Float { value: 2.0 });
    second.insert("a".to_string(), Value::Integer { value: 1 });

    assert_eq!(Value::map(first.clone()), Value::map(second.clone()));
    assert!(first == second);

    second.insert("c".to_string(), Value::Null);
    assert_ne!(Value::map(first), Value::map(second));
}

#[test]
fn test_equality_of_cyclic_containers() {
    fn self_containing() -> Value {
        let array = Value::array(vec![Value::Integer { value: 1 }]);
        if let Value::Array { items } = &array {
            items.borrow_mut().push(array.clone());
        }
        array
    }

    assert_eq!(self_containing(), self_containing());

    let other = Value::array(vec![Value::Integer { value: 2 }]);
    if let Value::Array { items } = &other {
        items.borrow_mut().push(other.clone());
    }
    assert_ne!(self_containing(), other);

    let map = Value::map(Map::new());
    let twin = Value::map(Map::new());
    for value in [&map, &twin] {
        if let Value::Map { entries } = value {
            entries.borrow_mut().insert("me".to_string(), value.clone());
        }
    }
    assert_eq!(map, twin);
}
