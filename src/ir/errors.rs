use thiserror::Error;

use super::{ExprId, FnIndex, Name, Var, module::EntityKind};

/// A lookup that did not find what the caller asked for.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolveError {
    #[error("unresolved reference {var:?}")]
    Unresolved { var: Var },
    #[error("{var:?} refers to a {found}, expected a {expected}")]
    UnexpectedKind {
        var: Var,
        expected: EntityKind,
        found: EntityKind,
    },
    #[error("local {var:?} not declared in function {function:?}")]
    LocalNotFound { var: Var, function: FnIndex },
    #[error("no export named {name:?}")]
    UnknownExport { name: Name },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegisterError {
    #[error("{var:?} is already bound to a {existing}")]
    AlreadyBound { var: Var, existing: EntityKind },
    #[error("expression {expr:?} does not bind any label")]
    NotLabelBearing { expr: ExprId },
    #[error("export {name:?} already exists")]
    DuplicateExport { name: Name },
    #[error("local {name:?} is declared more than once")]
    DuplicateLocal { name: Name },
}
