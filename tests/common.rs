use tracing_subscriber::EnvFilter;
use wasm_ir::ir::{
    BasicType, Builder, Expression, ExprId, FnIndex, Function, Module, NameType, Var,
    ops::{BinaryOp, RelationalOp},
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A module holding `fact(n: i32) -> i32` computed with a loop:
///
/// ```text
/// acc = 1
/// loop $exit $continue
///   br $exit if n <= 1
///   acc = acc * n
///   n = n - 1
///   br $continue
/// acc
/// ```
#[allow(unused)]
pub fn factorial_module() -> (Module, FnIndex) {
    let mut module = Module::new();
    let n = module.intern("n");
    let acc = module.intern("acc");
    let name = module.intern("fact");

    let exit = module.fresh_var();
    let cont = module.fresh_var();

    let mut b = Builder::new(&mut module);
    let one = b.i32_const(1);
    let init = b.set_local(Var::name(acc), one);

    let get_n = b.get_local(Var::name(n));
    let one = b.i32_const(1);
    let done = b.compare(RelationalOp::LeS, BasicType::I32, get_n, one);
    let leave = b.br(exit, Some(done));

    let get_acc = b.get_local(Var::name(acc));
    let get_n = b.get_local(Var::name(n));
    let product = b.binary(BinaryOp::Mul, BasicType::I32, get_acc, get_n);
    let update_acc = b.set_local(Var::name(acc), product);

    let get_n = b.get_local(Var::name(n));
    let one = b.i32_const(1);
    let decremented = b.binary(BinaryOp::Sub, BasicType::I32, get_n, one);
    let update_n = b.set_local(Var::name(n), decremented);

    let again = b.br(cont, None);
    let body = b.block(Var::None, vec![leave, update_acc, update_n, again]);
    let looped = b.loop_(exit, cont, body);
    let result = b.get_local(Var::name(acc));
    let root = b.block(Var::None, vec![init, looped, result]);

    module.register_label(looped).expect("loop labels are fresh");

    let function = Function::new(name, BasicType::I32)
        .with_param(NameType::new(n, BasicType::I32))
        .with_local(NameType::new(acc, BasicType::I32))
        .with_body(root);
    let idx = module.add_function(function).expect("fact is registered once");
    (module, idx)
}

/// Collects the kind of every node under `root`, in pre-order.
#[allow(unused)]
pub fn kinds(module: &Module, root: ExprId) -> Vec<wasm_ir::ir::ExpressionKind> {
    let mut kinds = Vec::new();
    module.walk(root, |_, expr: &Expression| kinds.push(expr.kind()));
    kinds
}
