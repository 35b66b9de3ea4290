use super::{
    BasicType, ExprId, Literal,
    ops::{BinaryOp, ConvertOp, HostOp, RelationalOp, UnaryOp},
    var::Var,
};

pub type ExpressionList = Vec<ExprId>;

/// One node of a function body.
///
/// Children are referenced by [`ExprId`] into the owning module's arena; a node
/// never owns another node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Nop,
    Block(Block),
    If(If),
    Loop(Loop),
    Label(Label),
    Break(Break),
    Switch(Switch),
    Call(Call),
    /// Same shape as [`Expression::Call`], the target names an import.
    CallImport(Call),
    CallIndirect(CallIndirect),
    GetLocal(GetLocal),
    SetLocal(SetLocal),
    Load(Load),
    Store(Store),
    Const(Literal),
    Unary(Unary),
    Binary(Binary),
    Compare(Compare),
    Convert(Convert),
    Host(Host),
}

/// Fieldless discriminant of [`Expression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionKind {
    Nop,
    Block,
    If,
    Loop,
    Label,
    Break,
    Switch,
    Call,
    CallImport,
    CallIndirect,
    GetLocal,
    SetLocal,
    Load,
    Store,
    Const,
    Unary,
    Binary,
    Compare,
    Convert,
    Host,
}

/// Sequential evaluation. `label` is the target of forward exits.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub label: Var,
    pub list: ExpressionList,
}

#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub condition: ExprId,
    pub if_true: ExprId,
    pub if_false: Option<ExprId>,
}

/// A repeatable region.
///
/// Branching to `continue_label` restarts the body, branching to `exit_label`
/// leaves the loop. Producers pick the label explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct Loop {
    pub exit_label: Var,
    pub continue_label: Var,
    pub body: ExprId,
}

/// A bare branch target.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub label: Var,
}

/// Transfers control to an enclosing target, or falls through when `condition` is false.
#[derive(Debug, Clone, PartialEq)]
pub struct Break {
    pub target: Var,
    pub condition: Option<ExprId>,
}

impl Break {
    pub fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub value: Literal,
    pub body: ExprId,
    /// Continue into the next case's body instead of leaving the switch.
    pub fallthrough: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Switch {
    pub label: Var,
    pub value: ExprId,
    pub cases: Vec<SwitchCase>,
    pub default: Option<ExprId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub target: Var,
    pub operands: ExpressionList,
}

/// Call through the table. `ty` names the signature the callee must have.
#[derive(Debug, Clone, PartialEq)]
pub struct CallIndirect {
    pub ty: Var,
    pub target: ExprId,
    pub operands: ExpressionList,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetLocal {
    pub local: Var,
}

/// Writes the local and yields the written value.
#[derive(Debug, Clone, PartialEq)]
pub struct SetLocal {
    pub local: Var,
    pub value: ExprId,
}

/// Reads `bytes` bytes from `ptr + offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct Load {
    pub ty: BasicType,
    pub bytes: u32,
    pub signed: bool,
    pub offset: u32,
    pub align: u32,
    pub ptr: ExprId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Store {
    pub ty: BasicType,
    pub bytes: u32,
    pub offset: u32,
    pub align: u32,
    pub ptr: ExprId,
    pub value: ExprId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    pub op: UnaryOp,
    pub ty: BasicType,
    pub value: ExprId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub op: BinaryOp,
    pub ty: BasicType,
    pub left: ExprId,
    pub right: ExprId,
}

/// `ty` is the operand type; the result is always `i32`.
#[derive(Debug, Clone, PartialEq)]
pub struct Compare {
    pub op: RelationalOp,
    pub ty: BasicType,
    pub left: ExprId,
    pub right: ExprId,
}

impl Compare {
    pub fn result_type(&self) -> BasicType {
        BasicType::I32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Convert {
    pub op: ConvertOp,
    pub value: ExprId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Host {
    pub op: HostOp,
    pub operands: ExpressionList,
}

/// What a label bound by a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelRole {
    Block,
    LoopExit,
    LoopContinue,
    Marker,
    Switch,
}

impl Expression {
    pub fn kind(&self) -> ExpressionKind {
        match self {
            Expression::Nop => ExpressionKind::Nop,
            Expression::Block(_) => ExpressionKind::Block,
            Expression::If(_) => ExpressionKind::If,
            Expression::Loop(_) => ExpressionKind::Loop,
            Expression::Label(_) => ExpressionKind::Label,
            Expression::Break(_) => ExpressionKind::Break,
            Expression::Switch(_) => ExpressionKind::Switch,
            Expression::Call(_) => ExpressionKind::Call,
            Expression::CallImport(_) => ExpressionKind::CallImport,
            Expression::CallIndirect(_) => ExpressionKind::CallIndirect,
            Expression::GetLocal(_) => ExpressionKind::GetLocal,
            Expression::SetLocal(_) => ExpressionKind::SetLocal,
            Expression::Load(_) => ExpressionKind::Load,
            Expression::Store(_) => ExpressionKind::Store,
            Expression::Const(_) => ExpressionKind::Const,
            Expression::Unary(_) => ExpressionKind::Unary,
            Expression::Binary(_) => ExpressionKind::Binary,
            Expression::Compare(_) => ExpressionKind::Compare,
            Expression::Convert(_) => ExpressionKind::Convert,
            Expression::Host(_) => ExpressionKind::Host,
        }
    }

    /// Direct children in evaluation order.
    pub fn children(&self) -> Vec<ExprId> {
        match self {
            Expression::Nop
            | Expression::Label(_)
            | Expression::GetLocal(_)
            | Expression::Const(_) => Vec::new(),
            Expression::Block(block) => block.list.clone(),
            Expression::If(node) => {
                let mut children = vec![node.condition, node.if_true];
                children.extend(node.if_false);
                children
            }
            Expression::Loop(node) => vec![node.body],
            Expression::Break(node) => node.condition.into_iter().collect(),
            Expression::Switch(node) => {
                let mut children = vec![node.value];
                children.extend(node.cases.iter().map(|case| case.body));
                children.extend(node.default);
                children
            }
            Expression::Call(call) | Expression::CallImport(call) => call.operands.clone(),
            Expression::CallIndirect(call) => {
                let mut children = vec![call.target];
                children.extend(call.operands.iter().copied());
                children
            }
            Expression::SetLocal(node) => vec![node.value],
            Expression::Load(node) => vec![node.ptr],
            Expression::Store(node) => vec![node.ptr, node.value],
            Expression::Unary(node) => vec![node.value],
            Expression::Binary(node) => vec![node.left, node.right],
            Expression::Compare(node) => vec![node.left, node.right],
            Expression::Convert(node) => vec![node.value],
            Expression::Host(node) => node.operands.clone(),
        }
    }

    /// Mutable access to the child slots, in the same order as [`Expression::children`].
    pub fn children_mut(&mut self) -> Vec<&mut ExprId> {
        match self {
            Expression::Nop
            | Expression::Label(_)
            | Expression::GetLocal(_)
            | Expression::Const(_) => Vec::new(),
            Expression::Block(block) => block.list.iter_mut().collect(),
            Expression::If(node) => {
                let mut children = vec![&mut node.condition, &mut node.if_true];
                children.extend(node.if_false.as_mut());
                children
            }
            Expression::Loop(node) => vec![&mut node.body],
            Expression::Break(node) => node.condition.iter_mut().collect(),
            Expression::Switch(node) => {
                let mut children = vec![&mut node.value];
                children.extend(node.cases.iter_mut().map(|case| &mut case.body));
                children.extend(node.default.as_mut());
                children
            }
            Expression::Call(call) | Expression::CallImport(call) => {
                call.operands.iter_mut().collect()
            }
            Expression::CallIndirect(call) => {
                let mut children = vec![&mut call.target];
                children.extend(call.operands.iter_mut());
                children
            }
            Expression::SetLocal(node) => vec![&mut node.value],
            Expression::Load(node) => vec![&mut node.ptr],
            Expression::Store(node) => vec![&mut node.ptr, &mut node.value],
            Expression::Unary(node) => vec![&mut node.value],
            Expression::Binary(node) => vec![&mut node.left, &mut node.right],
            Expression::Compare(node) => vec![&mut node.left, &mut node.right],
            Expression::Convert(node) => vec![&mut node.value],
            Expression::Host(node) => node.operands.iter_mut().collect(),
        }
    }

    /// Labels this node binds as branch targets. Unset labels are skipped.
    pub fn labels(&self) -> Vec<(Var, LabelRole)> {
        let labels = match self {
            Expression::Block(block) => vec![(block.label, LabelRole::Block)],
            Expression::Loop(node) => vec![
                (node.exit_label, LabelRole::LoopExit),
                (node.continue_label, LabelRole::LoopContinue),
            ],
            Expression::Label(node) => vec![(node.label, LabelRole::Marker)],
            Expression::Switch(node) => vec![(node.label, LabelRole::Switch)],
            _ => Vec::new(),
        };

        labels
            .into_iter()
            .filter(|(label, _)| !label.is_none())
            .collect()
    }
}
