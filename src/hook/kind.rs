use serde::{Deserialize, Serialize};

use crate::error::HookError;

/// Collection operations covered by the hook system.
///
/// Discriminants index the argument table in `table.rs`; keep the two in
/// the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum OperationKind {
    Insert = 0,
    Find = 1,
    FindOne = 2,
    Remove = 3,
    Aggregate = 4,
    MapReduce = 5,
    Update = 6,
    FindAndModify = 7,
    FindAndRemove = 8,
}

impl OperationKind {
    /// The fixed set of methods the bootstrap wraps.
    pub const ALL: [OperationKind; 9] = [
        OperationKind::Insert,
        OperationKind::Find,
        OperationKind::FindOne,
        OperationKind::Remove,
        OperationKind::Aggregate,
        OperationKind::MapReduce,
        OperationKind::Update,
        OperationKind::FindAndModify,
        OperationKind::FindAndRemove,
    ];

    /// Driver-side method name for this operation.
    pub fn method_name(&self) -> &'static str {
        match self {
            OperationKind::Insert => "insert",
            OperationKind::Find => "find",
            OperationKind::FindOne => "findOne",
            OperationKind::Remove => "remove",
            OperationKind::Aggregate => "aggregate",
            OperationKind::MapReduce => "mapReduce",
            OperationKind::Update => "update",
            OperationKind::FindAndModify => "findAndModify",
            OperationKind::FindAndRemove => "findAndRemove",
        }
    }

    /// Resolve a driver method name; only names in `ALL` are accepted.
    pub fn from_method(name: &str) -> Result<Self, HookError> {
        OperationKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.method_name() == name)
            .ok_or_else(|| HookError::UnknownMethod(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_round_trip() {
        for kind in OperationKind::ALL {
            assert_eq!(OperationKind::from_method(kind.method_name()), Ok(kind));
        }
    }

    #[test]
    fn unknown_method_rejected() {
        assert_eq!(
            OperationKind::from_method("drop"),
            Err(HookError::UnknownMethod("drop".to_string()))
        );
    }
}
