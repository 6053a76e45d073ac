//! Positional structural diff of two snapshots.
//!
//! Children are paired by index only. When counts differ a single `Children`
//! record is emitted and only the shared prefix is compared, so an insertion
//! shows up as a count change plus field changes at the shifted positions.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::desktop::types::Snapshot;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    Changed {
        path: String,
        field: &'static str,
        old: Value,
        new: Value,
    },
    Children {
        path: String,
        old: usize,
        new: usize,
    },
}

impl Change {
    pub fn path(&self) -> &str {
        match self {
            Change::Changed { path, .. } | Change::Children { path, .. } => path,
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Changed { path, field, old, new } => {
                write!(f, "CHANGED {path}: {field} {old} -> {new}")
            }
            Change::Children { path, old, new } => {
                write!(f, "CHILDREN {path}: count {old} -> {new}")
            }
        }
    }
}

/// Every difference between `old` and `new`, in pre-order
pub fn diff(old: &Snapshot, new: &Snapshot) -> Vec<Change> {
    let mut changes = Vec::new();
    diff_at(old, new, "root", 0, &mut changes);
    changes
}

fn label(parent: &str, index: usize, node: &Snapshot) -> String {
    let role = node.info.role.as_deref().unwrap_or("?");
    match node.info.title.as_deref() {
        Some(title) if !title.is_empty() => format!("{parent} > [{index}] {role} '{title}'"),
        _ => format!("{parent} > [{index}] {role}"),
    }
}

fn compared_fields(node: &Snapshot) -> [(&'static str, Value); 4] {
    let text = |v: &Option<String>| v.clone().map(Value::String).unwrap_or(Value::Null);
    [
        ("role", text(&node.info.role)),
        ("title", text(&node.info.title)),
        ("description", text(&node.info.description)),
        ("enabled", node.info.enabled.map(Value::Bool).unwrap_or(Value::Null)),
    ]
}

fn diff_at(old: &Snapshot, new: &Snapshot, parent: &str, index: usize, out: &mut Vec<Change>) {
    let path = label(parent, index, old);

    for ((field, before), (_, after)) in compared_fields(old).into_iter().zip(compared_fields(new)) {
        if before != after {
            out.push(Change::Changed {
                path: path.clone(),
                field,
                old: before,
                new: after,
            });
        }
    }

    if old.children.len() != new.children.len() {
        out.push(Change::Children {
            path: path.clone(),
            old: old.children.len(),
            new: new.children.len(),
        });
    }

    for (i, (a, b)) in old.children.iter().zip(&new.children).enumerate() {
        diff_at(a, b, &path, i, out);
    }
}
