// SPDX-License-Identifier: GPL-3.0-only

//! Typed reads out of `a{sv}` property maps returned by `GetManagedObjects`.

use zbus::zvariant::Value;

use crate::manager::PropertyMap;

fn unwrap_variant<'a, 'v>(value: &'a Value<'v>) -> &'a Value<'v> {
    match value {
        Value::Value(inner) => unwrap_variant(inner),
        other => other,
    }
}

fn get<'a>(props: &'a PropertyMap, name: &str) -> Option<&'a Value<'static>> {
    props.get(name).map(|value| unwrap_variant(&**value))
}

fn value_bytes(value: &Value<'_>) -> Option<Vec<u8>> {
    match unwrap_variant(value) {
        Value::Array(array) => array
            .iter()
            .map(|item| match item {
                Value::U8(b) => Some(*b),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}

/// `ay` property
pub(crate) fn bytes(props: &PropertyMap, name: &str) -> Option<Vec<u8>> {
    get(props, name).and_then(value_bytes)
}

/// `aay` property
pub(crate) fn byte_strings(props: &PropertyMap, name: &str) -> Option<Vec<Vec<u8>>> {
    match get(props, name)? {
        Value::Array(array) => array.iter().map(value_bytes).collect(),
        _ => None,
    }
}

/// `o` property, returned as-is (including the "/" sentinel)
pub(crate) fn object_path(props: &PropertyMap, name: &str) -> Option<String> {
    match get(props, name)? {
        Value::ObjectPath(path) => Some(path.as_str().to_string()),
        _ => None,
    }
}
