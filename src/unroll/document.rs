//! Checked accessors and helpers over weakly typed content documents
//!
//! Documents are JSON-value trees; a field that is absent or carries an
//! unexpected type reads as "not found" rather than failing the call.

use serde_json::{Map, Value};
use uuid::Uuid;

use super::types::{Content, ID};

/// Read a field as an object, if present and object-shaped
pub fn get_object<'a>(content: &'a Content, key: &str) -> Option<&'a Content> {
    content.get(key).and_then(Value::as_object)
}

/// Read a field as a string, if present and string-shaped
pub fn get_str<'a>(content: &'a Content, key: &str) -> Option<&'a str> {
    content.get(key).and_then(Value::as_str)
}

/// Read a field as an array, if present and array-shaped
pub fn get_array<'a>(content: &'a Content, key: &str) -> Option<&'a Vec<Value>> {
    content.get(key).and_then(Value::as_array)
}

/// Extract the identity token from an `id` URL
///
/// The identity is the UUID suffix of the URL. Anything that does not end
/// in a valid UUID yields `None`; absence of an identity is never an error.
pub fn extract_identity(raw: &str) -> Option<String> {
    let tail = raw.rsplit('/').next()?;
    Uuid::parse_str(tail).ok().map(|uuid| uuid.to_string())
}

/// Extract the identity of a document from its own `id` field
pub fn identity_of(content: &Content) -> Option<String> {
    get_str(content, ID).and_then(extract_identity)
}

/// Shallow-merge `src` into `dst`; `src` values win on key collision
pub fn merge_into(dst: &mut Content, src: &Content) {
    for (key, value) in src {
        dst.insert(key.clone(), value.clone());
    }
}

/// Minimal stub standing in for an unresolved reference
pub fn minimal_stub(api_host: &str, identity: &str) -> Content {
    let mut stub = Map::new();
    stub.insert(
        ID.to_string(),
        Value::String(format!("{}/content/{}", api_host, identity)),
    );
    stub
}
