use super::BasicType;

/// The value kinds an operator may be applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandClass {
    Int,
    Float,
    Any,
}

impl OperandClass {
    pub fn accepts(self, ty: BasicType) -> bool {
        match self {
            OperandClass::Int => ty.is_int(),
            OperandClass::Float => ty.is_float(),
            OperandClass::Any => ty.is_int() || ty.is_float(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnaryOp {
    // int
    Clz,
    Ctz,
    Popcnt,
    // float
    Neg,
    Abs,
    Ceil,
    Floor,
    Trunc,
    Nearest,
    Sqrt,
}

impl UnaryOp {
    pub fn class(self) -> OperandClass {
        match self {
            UnaryOp::Clz | UnaryOp::Ctz | UnaryOp::Popcnt => OperandClass::Int,
            UnaryOp::Neg
            | UnaryOp::Abs
            | UnaryOp::Ceil
            | UnaryOp::Floor
            | UnaryOp::Trunc
            | UnaryOp::Nearest
            | UnaryOp::Sqrt => OperandClass::Float,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BinaryOp {
    // int or float
    Add,
    Sub,
    Mul,
    // int
    DivS,
    DivU,
    RemS,
    RemU,
    And,
    Or,
    Xor,
    Shl,
    ShrU,
    ShrS,
    // float
    Div,
    CopySign,
    Min,
    Max,
}

impl BinaryOp {
    pub fn class(self) -> OperandClass {
        match self {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => OperandClass::Any,
            BinaryOp::DivS
            | BinaryOp::DivU
            | BinaryOp::RemS
            | BinaryOp::RemU
            | BinaryOp::And
            | BinaryOp::Or
            | BinaryOp::Xor
            | BinaryOp::Shl
            | BinaryOp::ShrU
            | BinaryOp::ShrS => OperandClass::Int,
            BinaryOp::Div | BinaryOp::CopySign | BinaryOp::Min | BinaryOp::Max => {
                OperandClass::Float
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RelationalOp {
    // int or float
    Eq,
    Ne,
    // int
    LtS,
    LtU,
    LeS,
    LeU,
    GtS,
    GtU,
    GeS,
    GeU,
    // float
    Lt,
    Le,
    Gt,
    Ge,
}

impl RelationalOp {
    pub fn class(self) -> OperandClass {
        match self {
            RelationalOp::Eq | RelationalOp::Ne => OperandClass::Any,
            RelationalOp::LtS
            | RelationalOp::LtU
            | RelationalOp::LeS
            | RelationalOp::LeU
            | RelationalOp::GtS
            | RelationalOp::GtU
            | RelationalOp::GeS
            | RelationalOp::GeU => OperandClass::Int,
            RelationalOp::Lt | RelationalOp::Le | RelationalOp::Gt | RelationalOp::Ge => {
                OperandClass::Float
            }
        }
    }
}

/// A conversion. Each operator fixes both its source and its destination type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConvertOp {
    I64ExtendSI32,
    I64ExtendUI32,
    I32WrapI64,
    I32TruncSF32,
    I32TruncUF32,
    I32TruncSF64,
    I32TruncUF64,
    I64TruncSF32,
    I64TruncUF32,
    I64TruncSF64,
    I64TruncUF64,
    I32ReinterpretF32,
    I64ReinterpretF64,
    F32ConvertSI32,
    F32ConvertUI32,
    F32ConvertSI64,
    F32ConvertUI64,
    F64ConvertSI32,
    F64ConvertUI32,
    F64ConvertSI64,
    F64ConvertUI64,
    F64PromoteF32,
    F32DemoteF64,
    F32ReinterpretI32,
    F64ReinterpretI64,
}

impl ConvertOp {
    pub fn from_type(self) -> BasicType {
        use ConvertOp::*;
        match self {
            I64ExtendSI32 | I64ExtendUI32 | F32ConvertSI32 | F32ConvertUI32 | F64ConvertSI32
            | F64ConvertUI32 | F32ReinterpretI32 => BasicType::I32,
            I32WrapI64 | F32ConvertSI64 | F32ConvertUI64 | F64ConvertSI64 | F64ConvertUI64
            | F64ReinterpretI64 => BasicType::I64,
            I32TruncSF32 | I32TruncUF32 | I64TruncSF32 | I64TruncUF32 | I32ReinterpretF32
            | F64PromoteF32 => BasicType::F32,
            I32TruncSF64 | I32TruncUF64 | I64TruncSF64 | I64TruncUF64 | I64ReinterpretF64
            | F32DemoteF64 => BasicType::F64,
        }
    }

    pub fn to_type(self) -> BasicType {
        use ConvertOp::*;
        match self {
            I32WrapI64 | I32TruncSF32 | I32TruncUF32 | I32TruncSF64 | I32TruncUF64
            | I32ReinterpretF32 => BasicType::I32,
            I64ExtendSI32 | I64ExtendUI32 | I64TruncSF32 | I64TruncUF32 | I64TruncSF64
            | I64TruncUF64 | I64ReinterpretF64 => BasicType::I64,
            F32ConvertSI32 | F32ConvertUI32 | F32ConvertSI64 | F32ConvertUI64 | F32DemoteF64
            | F32ReinterpretI32 => BasicType::F32,
            F64ConvertSI32 | F64ConvertUI32 | F64ConvertSI64 | F64ConvertUI64 | F64PromoteF32
            | F64ReinterpretI64 => BasicType::F64,
        }
    }

    /// Reinterpretations keep the bit pattern and never change the width.
    pub fn is_reinterpret(self) -> bool {
        matches!(
            self,
            ConvertOp::I32ReinterpretF32
                | ConvertOp::I64ReinterpretF64
                | ConvertOp::F32ReinterpretI32
                | ConvertOp::F64ReinterpretI64
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HostOp {
    PageSize,
    MemorySize,
    GrowMemory,
    HasFeature,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions() {
        assert!(UnaryOp::Clz.class().accepts(BasicType::I64));
        assert!(!UnaryOp::Clz.class().accepts(BasicType::F32));
        assert!(UnaryOp::Sqrt.class().accepts(BasicType::F64));
        assert!(!UnaryOp::Sqrt.class().accepts(BasicType::I32));
        assert!(BinaryOp::Add.class().accepts(BasicType::F32));
        assert!(BinaryOp::Add.class().accepts(BasicType::I32));
        assert!(!BinaryOp::ShrS.class().accepts(BasicType::F64));
        assert!(!BinaryOp::CopySign.class().accepts(BasicType::I64));
        assert!(RelationalOp::Eq.class().accepts(BasicType::F64));
        assert!(!RelationalOp::LtU.class().accepts(BasicType::F32));
        assert!(!RelationalOp::Ge.class().accepts(BasicType::I32));
        assert!(!OperandClass::Any.accepts(BasicType::None));
    }

    #[test]
    fn conversions_fix_both_types() {
        assert_eq!(ConvertOp::I32WrapI64.from_type(), BasicType::I64);
        assert_eq!(ConvertOp::I32WrapI64.to_type(), BasicType::I32);
        assert_eq!(ConvertOp::F64PromoteF32.from_type(), BasicType::F32);
        assert_eq!(ConvertOp::F64PromoteF32.to_type(), BasicType::F64);
        assert_eq!(ConvertOp::I64TruncUF64.from_type(), BasicType::F64);
        assert_eq!(ConvertOp::I64TruncUF64.to_type(), BasicType::I64);
    }

    #[test]
    fn reinterpret_keeps_width() {
        for op in [
            ConvertOp::I32ReinterpretF32,
            ConvertOp::I64ReinterpretF64,
            ConvertOp::F32ReinterpretI32,
            ConvertOp::F64ReinterpretI64,
        ] {
            assert!(op.is_reinterpret());
            assert_eq!(op.from_type().byte_width(), op.to_type().byte_width());
            assert_ne!(op.from_type(), op.to_type());
        }
        assert!(!ConvertOp::F32DemoteF64.is_reinterpret());
    }
}
