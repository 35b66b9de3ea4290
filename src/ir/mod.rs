use std::{
    fmt::{self, Write},
    hash::{Hash, Hasher},
};

use itertools::Itertools;
use typed_generational_arena::SmallSlabIndex;

use crate::arena::Id;

pub mod builder;
pub mod errors;
pub mod expressions;
pub mod module;
pub mod ops;
pub mod var;

pub use builder::Builder;
pub use errors::{RegisterError, ResolveError};
pub use expressions::{Expression, ExpressionKind, LabelRole};
pub use module::{Entity, EntityKind, LabelTarget, Module};
pub use var::{Interner, Name, Var};

pub type ExprId = Id<Expression>;
pub type TypeIndex = SmallSlabIndex<CustomType>;
pub type FnIndex = SmallSlabIndex<Function>;
pub type ImportIndex = SmallSlabIndex<Import>;
pub type ExportIndex = SmallSlabIndex<Export>;

/// The four value kinds, plus `None` for void contexts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BasicType {
    #[default]
    None,
    I32,
    I64,
    F32,
    F64,
}

impl BasicType {
    pub fn is_int(self) -> bool {
        matches!(self, BasicType::I32 | BasicType::I64)
    }

    pub fn is_float(self) -> bool {
        matches!(self, BasicType::F32 | BasicType::F64)
    }

    /// Size of a value of this type in bytes, 0 for `None`.
    pub fn byte_width(self) -> u32 {
        match self {
            BasicType::None => 0,
            BasicType::I32 | BasicType::F32 => 4,
            BasicType::I64 | BasicType::F64 => 8,
        }
    }
}

impl fmt::Display for BasicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasicType::None => write!(f, "none"),
            BasicType::I32 => write!(f, "i32"),
            BasicType::I64 => write!(f, "i64"),
            BasicType::F32 => write!(f, "f32"),
            BasicType::F64 => write!(f, "f64"),
        }
    }
}

/// A constant value. The variant is the type.
///
/// Floats compare and hash by bit pattern, so `NaN == NaN` holds for literals
/// carrying the same payload and `0.0 != -0.0`.
#[derive(Debug, Clone, Copy)]
pub enum Literal {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Literal {
    pub fn ty(&self) -> BasicType {
        match self {
            Literal::I32(_) => BasicType::I32,
            Literal::I64(_) => BasicType::I64,
            Literal::F32(_) => BasicType::F32,
            Literal::F64(_) => BasicType::F64,
        }
    }

    /// The payload zero-extended to 64 bits.
    pub fn bits(&self) -> u64 {
        match self {
            Literal::I32(value) => *value as u32 as u64,
            Literal::I64(value) => *value as u64,
            Literal::F32(value) => value.to_bits() as u64,
            Literal::F64(value) => value.to_bits(),
        }
    }
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        self.ty() == other.ty() && self.bits() == other.bits()
    }
}

impl Eq for Literal {}

impl Hash for Literal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ty().hash(state);
        self.bits().hash(state);
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::I32(value) => write!(f, "i32.const {value}"),
            Literal::I64(value) => write!(f, "i64.const {value}"),
            Literal::F32(value) => write!(f, "f32.const {value}"),
            Literal::F64(value) => write!(f, "f64.const {value}"),
        }
    }
}

/// A typed slot: parameter, local, or signature entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NameType {
    pub name: Name,
    pub ty: BasicType,
}

impl NameType {
    pub fn new(name: Name, ty: BasicType) -> Self {
        Self { name, ty }
    }
}

/// A named function signature, used to check indirect calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomType {
    pub name: Name,
    /// `BasicType::None` for signatures without a result.
    pub result: BasicType,
    pub params: Vec<NameType>,
}

impl CustomType {
    pub fn new(name: Name, result: BasicType) -> Self {
        Self {
            name,
            result,
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: NameType) -> Self {
        self.params.push(param);
        self
    }

    /// Whether `function` has exactly this parameter and result list.
    pub fn matches(&self, function: &Function) -> bool {
        self.result == function.result
            && self.params.len() == function.params.len()
            && self
                .params
                .iter()
                .zip(&function.params)
                .all(|(a, b)| a.ty == b.ty)
    }

    /// Renders as `name(i32, f64) -> i64`.
    pub fn display(&self, module: &Module) -> Result<String, fmt::Error> {
        let mut f = String::new();
        let params = self.params.iter().map(|param| param.ty).join(", ");
        write!(f, "{}({params})", module.name_str(self.name))?;
        if self.result != BasicType::None {
            write!(f, " -> {}", self.result)?;
        }
        Ok(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// The name of this function.
    pub name: Name,
    pub result: BasicType,
    pub params: Vec<NameType>,
    /// Declared locals, disjoint from `params`.
    pub locals: Vec<NameType>,
    /// Root of the body, once built.
    pub body: Option<ExprId>,
}

impl Function {
    pub fn new(name: Name, result: BasicType) -> Self {
        Self {
            name,
            result,
            params: Vec::new(),
            locals: Vec::new(),
            body: None,
        }
    }

    pub fn with_param(mut self, param: NameType) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_local(mut self, local: NameType) -> Self {
        self.locals.push(local);
        self
    }

    pub fn with_body(mut self, body: ExprId) -> Self {
        self.body = Some(body);
        self
    }

    /// Finds a parameter or local.
    ///
    /// Numeric vars are 1-based over the parameters followed by the locals.
    pub fn local(&self, var: &Var) -> Option<LocalRef> {
        let slot = match var {
            Var::None => return None,
            Var::Index(index) => (*index as usize).checked_sub(1)?,
            Var::Name(name) => self
                .params
                .iter()
                .chain(&self.locals)
                .position(|slot| slot.name == *name)?,
        };

        let (kind, decl) = if slot < self.params.len() {
            (LocalKind::Param, self.params[slot])
        } else {
            (LocalKind::Local, *self.locals.get(slot - self.params.len())?)
        };

        Some(LocalRef {
            kind,
            slot,
            name: decl.name,
            ty: decl.ty,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalKind {
    Param,
    Local,
}

/// A resolved parameter or local of some function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalRef {
    pub kind: LocalKind,
    /// Position over params followed by locals, starting at 0.
    pub slot: usize,
    pub name: Name,
    pub ty: BasicType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub name: Name,
    pub ty: CustomType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Export {
    /// External name.
    pub name: Name,
    pub value: Var,
}

/// The indirect-call dispatch table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub vars: Vec<Var>,
}
