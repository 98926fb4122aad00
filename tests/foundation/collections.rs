//! Integration tests for the shared list handle
//!
//! Tests aliasing and by-value capture of contents.

use rewind_foundation::{List, Value};

#[test]
fn clones_share_contents() {
    let list = List::new();
    let alias = list.clone();
    list.push(Value::Int(1));
    assert_eq!(alias.len(), 1);
    assert!(list.ptr_eq(&alias));
    assert_eq!(list.id(), alias.id());
}

#[test]
fn captured_contents_restore_exactly() {
    let list: List = vec![Value::Int(3), Value::Int(1), Value::Int(2)].into();
    let before = list.contents();

    list.set(0, Value::Int(10));
    list.remove(1);
    list.push(Value::None);
    assert_eq!(list.to_vec(), vec![Value::Int(10), Value::Int(2), Value::None]);

    list.replace(before);
    assert_eq!(list.to_vec(), vec![Value::Int(3), Value::Int(1), Value::Int(2)]);
}

#[test]
fn out_of_range_edits_change_nothing() {
    let list: List = vec![Value::Int(1)].into();
    assert_eq!(list.set(5, Value::Int(2)), None);
    assert_eq!(list.remove(5), None);
    assert_eq!(list.get(5), None);
    assert_eq!(list.pop(), Some(Value::Int(1)));
    assert_eq!(list.pop(), None);
    assert!(list.is_empty());
}

#[test]
fn equal_contents_are_equal_lists() {
    let a: List = vec![Value::string("x")].into();
    let b: List = vec![Value::string("x")].into();
    assert_eq!(a, b);
    assert!(!a.ptr_eq(&b));
}
