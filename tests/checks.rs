use wasm_ir::ir::{
    BasicType, Builder, CustomType, Entity, EntityKind, Export, Function, Import, LabelRole,
    Module, NameType, RegisterError, ResolveError, Var, module::LabelTarget,
};

mod common;

#[test]
fn unresolved_name() {
    common::init_tracing();
    let mut module = Module::new();
    let var = module.var("missing");
    let error = module.resolve(&var).expect_err("nothing is registered");

    assert!(
        matches!(&error, ResolveError::Unresolved { var: v } if *v == var),
        "{:#?}",
        error
    );
}

#[test]
fn unresolved_index() {
    let module = Module::new();
    let error = module.resolve(&Var::index(7)).expect_err("nothing is registered");

    assert_eq!(error, ResolveError::Unresolved { var: Var::index(7) });
    assert_eq!(error.to_string(), "unresolved reference Index(7)");
}

#[test]
fn wrong_entity_kind() {
    common::init_tracing();
    let mut module = Module::new();
    let sig = module.intern("sig");
    module
        .add_custom_type(CustomType::new(sig, BasicType::I32))
        .unwrap();

    let error = module
        .resolve_function(&Var::name(sig))
        .expect_err("sig is a type");
    assert!(
        matches!(
            &error,
            ResolveError::UnexpectedKind {
                expected: EntityKind::Function,
                found: EntityKind::CustomType,
                ..
            }
        ),
        "{:#?}",
        error
    );
    assert!(module.resolve_custom_type(&Var::name(sig)).is_ok());
}

#[test]
fn name_registered_twice() {
    let mut module = Module::new();
    let name = module.intern("dup");
    module
        .add_function(Function::new(name, BasicType::None))
        .unwrap();
    let sig = CustomType::new(name, BasicType::None);
    let error = module
        .add_import(Import { name, ty: sig })
        .expect_err("dup is taken");

    assert_eq!(
        error,
        RegisterError::AlreadyBound {
            var: Var::name(name),
            existing: EntityKind::Function,
        }
    );
    assert_eq!(module.imports().count(), 0);
}

#[test]
fn label_on_non_labelled_node() {
    let mut module = Module::new();
    let nop = Builder::new(&mut module).nop();
    let error = module.register_label(nop).expect_err("nop has no label");

    assert_eq!(error, RegisterError::NotLabelBearing { expr: nop });
}

#[test]
fn label_clash_binds_nothing() {
    let mut module = Module::new();
    let taken = module.fresh_var();
    let free = module.fresh_var();

    let mut b = Builder::new(&mut module);
    let first = b.label(taken);
    let body = b.nop();
    let looped = b.loop_(free, taken, body);

    module.register_label(first).unwrap();
    let error = module.register_label(looped).expect_err("taken is bound");
    assert!(matches!(error, RegisterError::AlreadyBound { var, .. } if var == taken));
    assert!(module.resolve(&free).is_err());
}

#[test]
fn loop_labels_resolve_to_distinct_roles() {
    let mut module = Module::new();
    let exit = module.var("exit");
    let cont = module.var("continue");

    let mut b = Builder::new(&mut module);
    let body = b.nop();
    let looped = b.loop_(exit, cont, body);
    module.register_label(looped).unwrap();

    assert_eq!(
        module.resolve_label(&exit),
        Ok(LabelTarget {
            expr: looped,
            role: LabelRole::LoopExit
        })
    );
    assert_eq!(
        module.resolve(&cont),
        Ok(Entity::Label(LabelTarget {
            expr: looped,
            role: LabelRole::LoopContinue
        }))
    );
}

#[test]
fn local_not_declared() {
    let mut module = Module::new();
    let x = module.intern("x");
    let name = module.intern("f");
    let f = module
        .add_function(
            Function::new(name, BasicType::None).with_param(NameType::new(x, BasicType::I32)),
        )
        .unwrap();

    assert!(module.resolve_local(f, &Var::index(1)).is_ok());
    let error = module
        .resolve_local(f, &Var::index(2))
        .expect_err("only one slot");
    assert_eq!(
        error,
        ResolveError::LocalNotFound {
            var: Var::index(2),
            function: f,
        }
    );
}

#[test]
fn unknown_export() {
    let mut module = Module::new();
    let name = module.intern("run");
    let error = module.resolve_export(name).expect_err("not exported");
    assert_eq!(error, ResolveError::UnknownExport { name });

    module
        .add_export(Export {
            name,
            value: Var::index(1),
        })
        .unwrap();
    let idx = module.resolve_export(name).unwrap();
    assert_eq!(module.export(idx).value, Var::index(1));
}
