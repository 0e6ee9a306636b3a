/*
 * Copyright Cedar Contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *      https://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Naming of grammar rules.

use std::fmt::Write;

use smol_str::SmolStr;

pub(super) const ROOT: &str = "root";
pub(super) const WS: &str = "ws";
pub(super) const STRING: &str = "string";
pub(super) const NUMBER: &str = "number";
pub(super) const INTEGER: &str = "integer";
pub(super) const BOOLEAN: &str = "boolean";
pub(super) const NULL: &str = "null";

/// Rule names the generator always owns, whether or not a grammar uses them
pub(super) const RESERVED: [&str; 7] = [ROOT, WS, STRING, NUMBER, INTEGER, BOOLEAN, NULL];

/// Convert a declared name into a lowercase kebab case rule name.
///
/// Word boundaries are underscores, spaces and other non alphanumeric
/// ASCII characters, as well as case changes (`SendMessage`, `HTTPServer`).
/// Each non ASCII character becomes its own `x<hex code point>` word, so
/// `café` is `caf-xe9`. A name without word characters becomes `unnamed`.
pub(super) fn rule_name(name: &str) -> SmolStr {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in chars.iter().copied().enumerate() {
        if !c.is_ascii() {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            let _ = write!(out, "x{:x}-", u32::from(c));
            continue;
        }
        if !c.is_ascii_alphanumeric() {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            continue;
        }
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars.get(i - 1).copied();
            let next = chars.get(i + 1).copied();
            let boundary = prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
                || (prev.is_some_and(|p| p.is_ascii_uppercase())
                    && next.is_some_and(|n| n.is_ascii_lowercase()));
            if boundary && !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
        }
        out.push(c.to_ascii_lowercase());
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        SmolStr::new_static("unnamed")
    } else {
        SmolStr::from(out)
    }
}

/// Name of an auxiliary rule below `parent`
pub(super) fn child_rule_name(parent: &str, segment: &str) -> SmolStr {
    SmolStr::from(format!("{parent}-{}", rule_name(segment)))
}
