use serde_json::json;
use submission_core::codec::{flatten, simplify, unflatten};
use submission_core::hide_fields;
use submission_core::path::{format_path, get_value, parse_path, remove_value, set_value, Path, Segment};

#[test]
fn test_get_value_walks_mixed_paths() {
    let tree = json!({"a": {"b": [{"c": "deep"}]}, "list": ["x"]});
    assert_eq!(get_value(&tree, "a.b[0].c"), Some(&json!("deep")));
    assert_eq!(get_value(&tree, "a.b[0]"), Some(&json!({"c": "deep"})));
    assert_eq!(get_value(&tree, ""), Some(&tree));
    assert_eq!(get_value(&tree, "list.0"), Some(&json!("x")));
    assert_eq!(get_value(&tree, "a.b[1].c"), None);
    assert_eq!(get_value(&tree, "a.b.c"), None);
    assert_eq!(get_value(&tree, "list[0].x"), None);
}

#[test]
fn test_set_value_overwrites_partially() {
    let mut tree = json!({"a": {"b": "1", "c": "2"}});
    set_value(&mut tree, "a.b", |current| {
        assert_eq!(current, Some(json!("1")));
        Some(json!("9"))
    });
    assert_eq!(tree, json!({"a": {"b": "9", "c": "2"}}));
}

#[test]
fn test_set_value_replaces_scalars_with_containers() {
    let mut tree = json!({"a": "scalar"});
    set_value(&mut tree, "a[0]", |_| Some(json!("x")));
    assert_eq!(tree, json!({"a": ["x"]}));
    set_value(&mut tree, "a.name", |_| Some(json!("y")));
    assert_eq!(tree, json!({"a": {"name": "y"}}));
}

#[test]
fn test_set_value_delete_keeps_siblings() {
    let mut tree = json!({"a": {"b": "1", "c": "2"}, "list": ["x", "y"]});
    set_value(&mut tree, "a.b", |_| None);
    set_value(&mut tree, "list[0]", |_| None);
    assert_eq!(tree, json!({"a": {"c": "2"}, "list": [null, "y"]}));
    assert_eq!(get_value(&tree, "list[1]"), Some(&json!("y")));
}

#[test]
fn test_remove_missing_is_noop() {
    let mut tree = json!({"a": "1"});
    assert_eq!(remove_value(&mut tree, "b.c"), None);
    assert_eq!(tree, json!({"a": "1"}));
}

#[test]
fn test_path_builder() {
    let path = Path::root().key("order").key("lines").index(3).key("sku");
    assert_eq!(path.to_string(), "order.lines[3].sku");
    assert_eq!(
        path.segments().last(),
        Some(&Segment::Key("sku".to_string()))
    );
    assert!(Path::root().is_root());
    assert_eq!(format_path(&parse_path("a[key]")), "a.key");
    assert_eq!(Path::root().key("a.b").to_string(), "[a.b]");
    assert_eq!(parse_path("[a.b]"), vec![Segment::Key("a.b".to_string())]);
}

#[test]
fn test_flatten_and_unflatten() {
    let tree = json!({"user": {"name": "Ada", "langs": ["en", "fr"]}});
    let flat = flatten(&tree, "", |value| value.as_str().map(|_| value.clone()));
    assert_eq!(
        flat.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["user.langs[0]", "user.langs[1]", "user.name"]
    );
    assert_eq!(unflatten(flat), tree);
}

#[test]
fn test_simplify_keeps_addressing() {
    let tree = json!({"rows": [{"a": ""}, {"a": "x"}], "note": ""});
    let simplified = simplify(tree).unwrap();
    assert_eq!(simplified, json!({"rows": [null, {"a": "x"}]}));
    assert_eq!(get_value(&simplified, "rows[1].a"), Some(&json!("x")));
    assert_eq!(simplify(json!({"a": "", "b": []})), None);
}

#[test]
fn test_hide_fields() {
    let mut payload = json!({"user": {"name": "Ada", "password": "secret"}, "token": "t"});
    hide_fields(&mut payload, &["user.password", "token", "missing"]);
    assert_eq!(payload, json!({"user": {"name": "Ada"}}));
}
