//! Canonical rendering of a reply for signing.
//!
//! The signed material is the plain concatenation
//!
//! ```text
//! message + random + results + success + secret
//! ```
//!
//! where `message` is empty when absent, `random` is the decimal nonce,
//! `success` is `true` or `false`, and `results` is rendered by
//! [`render_results`]:
//!
//! - `{` + entries joined by `", "` + `}`, so an empty map is `{}`
//! - entries sorted by key in byte order, each written as `key=value`
//! - keys written raw, with `\ = , { }` escaped by a backslash
//! - every value written as compact JSON with object keys sorted at every
//!   depth, so strings are quoted and `"42"` never reads as `42`
//!
//! A single string entry therefore renders as `{dummy="foo"}`. Each value is
//! a complete JSON document, so an entry cannot swallow or fake a delimiter.

use serde_json::{Map, Value};
use zeroize::Zeroizing;

use crate::reply::Reply;

const ESCAPED: [char; 5] = ['\\', '=', ',', '{', '}'];

/// Build the string fed to the digest for `reply` under `secret`.
///
/// The result embeds the secret and is zeroed on drop.
#[must_use]
pub fn canonical_string(reply: &Reply, secret: &str) -> Zeroizing<String> {
    let results = render_results(&reply.results);
    let mut out = Zeroizing::new(String::with_capacity(
        results.len() + secret.len() + reply.message.as_deref().map_or(0, str::len) + 26,
    ));
    out.push_str(reply.message.as_deref().unwrap_or(""));
    out.push_str(&reply.random.to_string());
    out.push_str(&results);
    out.push_str(if reply.success { "true" } else { "false" });
    out.push_str(secret);
    out
}

/// Render the result map in its canonical textual form.
#[must_use]
pub fn render_results(results: &Map<String, Value>) -> String {
    let mut entries: Vec<(&String, &Value)> = results.iter().collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let mut out = String::from("{");
    for (i, (key, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        push_escaped(&mut out, key);
        out.push('=');
        push_json(&mut out, value);
    }
    out.push('}');
    out
}

fn push_escaped(out: &mut String, raw: &str) {
    for c in raw.chars() {
        if ESCAPED.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Compact JSON with object keys sorted, independent of map ordering.
fn push_json(out: &mut String, value: &Value) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                push_json(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::from(key.as_str()).to_string());
                out.push(':');
                push_json(out, item);
            }
            out.push('}');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
