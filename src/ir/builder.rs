//! Node construction.
//!
//! Every helper allocates one node in the module arena and returns its id.
//! Operator/type mismatches and malformed memory accesses are producer bugs,
//! so the builder panics on them instead of returning an error.

use super::{
    BasicType, ExprId, Literal, Module,
    expressions::{
        Binary, Block, Break, Call, CallIndirect, Compare, Convert, Expression, GetLocal, Host,
        If, Label, Load, Loop, SetLocal, Store, Switch, SwitchCase, Unary,
    },
    ops::{BinaryOp, ConvertOp, HostOp, RelationalOp, UnaryOp},
    var::Var,
};

#[derive(Debug)]
pub struct Builder<'m> {
    module: &'m mut Module,
}

impl<'m> Builder<'m> {
    pub fn new(module: &'m mut Module) -> Self {
        Self { module }
    }

    pub fn module(&mut self) -> &mut Module {
        self.module
    }

    pub fn nop(&mut self) -> ExprId {
        self.module.alloc(Expression::Nop)
    }

    pub fn block(&mut self, label: Var, list: Vec<ExprId>) -> ExprId {
        self.module.alloc(Expression::Block(Block { label, list }))
    }

    pub fn if_(&mut self, condition: ExprId, if_true: ExprId, if_false: Option<ExprId>) -> ExprId {
        self.module.alloc(Expression::If(If {
            condition,
            if_true,
            if_false,
        }))
    }

    pub fn loop_(&mut self, exit_label: Var, continue_label: Var, body: ExprId) -> ExprId {
        assert!(
            exit_label.is_none() || exit_label != continue_label,
            "loop exit and continue labels must differ"
        );
        self.module.alloc(Expression::Loop(Loop {
            exit_label,
            continue_label,
            body,
        }))
    }

    pub fn label(&mut self, label: Var) -> ExprId {
        self.module.alloc(Expression::Label(Label { label }))
    }

    pub fn br(&mut self, target: Var, condition: Option<ExprId>) -> ExprId {
        assert!(!target.is_none(), "break needs a target label");
        self.module
            .alloc(Expression::Break(Break { target, condition }))
    }

    pub fn switch(
        &mut self,
        label: Var,
        value: ExprId,
        cases: Vec<SwitchCase>,
        default: Option<ExprId>,
    ) -> ExprId {
        self.module.alloc(Expression::Switch(Switch {
            label,
            value,
            cases,
            default,
        }))
    }

    pub fn call(&mut self, target: Var, operands: Vec<ExprId>) -> ExprId {
        self.module
            .alloc(Expression::Call(Call { target, operands }))
    }

    pub fn call_import(&mut self, target: Var, operands: Vec<ExprId>) -> ExprId {
        self.module
            .alloc(Expression::CallImport(Call { target, operands }))
    }

    pub fn call_indirect(&mut self, ty: Var, target: ExprId, operands: Vec<ExprId>) -> ExprId {
        self.module.alloc(Expression::CallIndirect(CallIndirect {
            ty,
            target,
            operands,
        }))
    }

    pub fn get_local(&mut self, local: Var) -> ExprId {
        self.module
            .alloc(Expression::GetLocal(GetLocal { local }))
    }

    pub fn set_local(&mut self, local: Var, value: ExprId) -> ExprId {
        self.module
            .alloc(Expression::SetLocal(SetLocal { local, value }))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn load(
        &mut self,
        ty: BasicType,
        bytes: u32,
        signed: bool,
        offset: u32,
        align: u32,
        ptr: ExprId,
    ) -> ExprId {
        check_access(ty, bytes, align);
        assert!(
            !signed || (ty.is_int() && bytes < ty.byte_width()),
            "only partial-width integer loads can be signed"
        );
        self.module.alloc(Expression::Load(Load {
            ty,
            bytes,
            signed,
            offset,
            align,
            ptr,
        }))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn store(
        &mut self,
        ty: BasicType,
        bytes: u32,
        offset: u32,
        align: u32,
        ptr: ExprId,
        value: ExprId,
    ) -> ExprId {
        check_access(ty, bytes, align);
        self.module.alloc(Expression::Store(Store {
            ty,
            bytes,
            offset,
            align,
            ptr,
            value,
        }))
    }

    pub fn const_(&mut self, value: Literal) -> ExprId {
        self.module.alloc(Expression::Const(value))
    }

    pub fn i32_const(&mut self, value: i32) -> ExprId {
        self.const_(Literal::I32(value))
    }

    pub fn i64_const(&mut self, value: i64) -> ExprId {
        self.const_(Literal::I64(value))
    }

    pub fn f32_const(&mut self, value: f32) -> ExprId {
        self.const_(Literal::F32(value))
    }

    pub fn f64_const(&mut self, value: f64) -> ExprId {
        self.const_(Literal::F64(value))
    }

    pub fn unary(&mut self, op: UnaryOp, ty: BasicType, value: ExprId) -> ExprId {
        assert!(op.class().accepts(ty), "{op:?} cannot be applied to {ty}");
        self.module
            .alloc(Expression::Unary(Unary { op, ty, value }))
    }

    pub fn binary(&mut self, op: BinaryOp, ty: BasicType, left: ExprId, right: ExprId) -> ExprId {
        assert!(op.class().accepts(ty), "{op:?} cannot be applied to {ty}");
        self.module.alloc(Expression::Binary(Binary {
            op,
            ty,
            left,
            right,
        }))
    }

    pub fn compare(
        &mut self,
        op: RelationalOp,
        ty: BasicType,
        left: ExprId,
        right: ExprId,
    ) -> ExprId {
        assert!(op.class().accepts(ty), "{op:?} cannot be applied to {ty}");
        self.module.alloc(Expression::Compare(Compare {
            op,
            ty,
            left,
            right,
        }))
    }

    pub fn convert(&mut self, op: ConvertOp, value: ExprId) -> ExprId {
        self.module
            .alloc(Expression::Convert(Convert { op, value }))
    }

    pub fn host(&mut self, op: HostOp, operands: Vec<ExprId>) -> ExprId {
        self.module
            .alloc(Expression::Host(Host { op, operands }))
    }
}

fn check_access(ty: BasicType, bytes: u32, align: u32) {
    assert!(
        matches!(bytes, 1 | 2 | 4 | 8) && bytes <= ty.byte_width(),
        "cannot access {bytes} bytes as {ty}"
    );
    assert!(ty.is_int() || bytes == ty.byte_width(), "floats are accessed whole");
    assert!(align.is_power_of_two(), "alignment {align} is not a power of two");
}
