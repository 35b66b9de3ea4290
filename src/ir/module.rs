use std::{collections::HashMap, fmt};

use educe::Educe;
use tracing::{debug, instrument, trace};
use typed_generational_arena::SmallSlab;

use crate::{
    arena::Arena,
    config::{Config, ConfigError},
};

use super::{
    CustomType, Export, ExportIndex, ExprId, Expression, FnIndex, Function, Import, ImportIndex,
    LocalRef, Table, TypeIndex,
    errors::{RegisterError, ResolveError},
    expressions::LabelRole,
    var::{Interner, Name, Var},
};

/// What a [`Var`] is bound to in a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    CustomType(TypeIndex),
    Function(FnIndex),
    Import(ImportIndex),
    Label(LabelTarget),
}

/// A label-bearing node together with the role the label plays there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelTarget {
    pub expr: ExprId,
    pub role: LabelRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    CustomType,
    Function,
    Import,
    Label,
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::CustomType(_) => EntityKind::CustomType,
            Entity::Function(_) => EntityKind::Function,
            Entity::Import(_) => EntityKind::Import,
            Entity::Label(_) => EntityKind::Label,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::CustomType => write!(f, "type"),
            EntityKind::Function => write!(f, "function"),
            EntityKind::Import => write!(f, "import"),
            EntityKind::Label => write!(f, "label"),
        }
    }
}

/// Owns every entity and expression of one program, and maps identifiers to them.
///
/// Entities are never removed; everything is dropped together with the module.
#[derive(Educe)]
#[educe(Debug)]
pub struct Module {
    /// Signatures, in registration order.
    custom_types: SmallSlab<CustomType>,
    /// Functions, in registration order.
    functions: SmallSlab<Function>,
    imports: SmallSlab<Import>,
    exports: SmallSlab<Export>,
    table: Table,
    /// Resolution map for every bound identifier.
    map: HashMap<Var, Entity>,
    /// Exports live in their own namespace, keyed by external name.
    export_names: HashMap<Name, ExportIndex>,
    /// Next fresh numeric identifier, 0 is never handed out.
    next_var: u32,
    #[educe(Debug(ignore))]
    interner: Interner,
    #[educe(Debug(ignore))]
    exprs: Arena<Expression>,
}

impl Default for Module {
    fn default() -> Self {
        Self::new()
    }
}

impl Module {
    pub fn new() -> Self {
        Self::with_arena(Arena::new())
    }

    /// Creates a module whose arena uses the configured chunk size.
    pub fn with_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_arena(Arena::with_chunk_size(config.arena.chunk_size)))
    }

    fn with_arena(exprs: Arena<Expression>) -> Self {
        Self {
            custom_types: SmallSlab::new(),
            functions: SmallSlab::new(),
            imports: SmallSlab::new(),
            exports: SmallSlab::new(),
            table: Table::default(),
            map: HashMap::new(),
            export_names: HashMap::new(),
            next_var: 1,
            interner: Interner::new(),
            exprs,
        }
    }

    pub fn intern(&mut self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// Panics if `name` was interned by another module.
    pub fn name_str(&self, name: Name) -> &str {
        self.interner.lookup(name)
    }

    /// Named var for `s`, interning it if needed.
    pub fn var(&mut self, s: &str) -> Var {
        Var::Name(self.intern(s))
    }

    /// Mints the next unbound numeric identifier: 1, 2, 3, ...
    ///
    /// Indices a producer already bound are skipped.
    pub fn fresh_var(&mut self) -> Var {
        while self.map.contains_key(&Var::Index(self.next_var)) {
            self.next_var += 1;
        }
        let var = Var::index(self.next_var);
        self.next_var += 1;
        trace!(?var, "minted var");
        var
    }

    /// Binds `var` to `entity`. A var can be bound only once per module.
    pub fn bind(&mut self, var: Var, entity: Entity) -> Result<(), RegisterError> {
        assert!(!var.is_none(), "cannot bind the null var");
        if let Some(existing) = self.map.get(&var) {
            return Err(RegisterError::AlreadyBound {
                var,
                existing: existing.kind(),
            });
        }
        debug!(?var, kind = %entity.kind(), "bound var");
        self.map.insert(var, entity);
        Ok(())
    }

    #[instrument(level = "debug", skip_all, fields(name = ?ty.name))]
    pub fn add_custom_type(&mut self, ty: CustomType) -> Result<TypeIndex, RegisterError> {
        let var = Var::Name(ty.name);
        self.check_unbound(var)?;
        let idx = self.custom_types.insert(ty);
        self.bind(var, Entity::CustomType(idx))?;
        Ok(idx)
    }

    /// Registers a function under its name.
    ///
    /// Fails if the name is taken or a param and a local share a name.
    #[instrument(level = "debug", skip_all, fields(name = ?function.name))]
    pub fn add_function(&mut self, function: Function) -> Result<FnIndex, RegisterError> {
        let var = Var::Name(function.name);
        self.check_unbound(var)?;

        let mut seen = Vec::with_capacity(function.params.len() + function.locals.len());
        for slot in function.params.iter().chain(&function.locals) {
            if seen.contains(&slot.name) {
                return Err(RegisterError::DuplicateLocal { name: slot.name });
            }
            seen.push(slot.name);
        }

        debug!(
            params = function.params.len(),
            locals = function.locals.len(),
            "adding function"
        );
        let idx = self.functions.insert(function);
        self.bind(var, Entity::Function(idx))?;
        Ok(idx)
    }

    #[instrument(level = "debug", skip_all, fields(name = ?import.name))]
    pub fn add_import(&mut self, import: Import) -> Result<ImportIndex, RegisterError> {
        let var = Var::Name(import.name);
        self.check_unbound(var)?;
        let idx = self.imports.insert(import);
        self.bind(var, Entity::Import(idx))?;
        Ok(idx)
    }

    #[instrument(level = "debug", skip_all, fields(name = ?export.name))]
    pub fn add_export(&mut self, export: Export) -> Result<ExportIndex, RegisterError> {
        if self.export_names.contains_key(&export.name) {
            return Err(RegisterError::DuplicateExport { name: export.name });
        }
        let name = export.name;
        let idx = self.exports.insert(export);
        self.export_names.insert(name, idx);
        debug!("added export");
        Ok(idx)
    }

    pub fn push_table_entry(&mut self, var: Var) {
        self.table.vars.push(var);
    }

    /// Binds every label `expr` declares to it.
    ///
    /// Nothing is bound if any of the labels is already taken.
    pub fn register_label(&mut self, expr: ExprId) -> Result<(), RegisterError> {
        let labels = self.exprs[expr].labels();
        if labels.is_empty() {
            return Err(RegisterError::NotLabelBearing { expr });
        }
        for (i, (label, _)) in labels.iter().enumerate() {
            self.check_unbound(*label)?;
            // A loop must not use the same var for both of its labels.
            if labels[..i].iter().any(|(other, _)| other == label) {
                return Err(RegisterError::AlreadyBound {
                    var: *label,
                    existing: EntityKind::Label,
                });
            }
        }
        for (label, role) in labels {
            self.bind(label, Entity::Label(LabelTarget { expr, role }))?;
        }
        Ok(())
    }

    fn check_unbound(&self, var: Var) -> Result<(), RegisterError> {
        match self.map.get(&var) {
            Some(existing) => Err(RegisterError::AlreadyBound {
                var,
                existing: existing.kind(),
            }),
            None => Ok(()),
        }
    }

    pub fn resolve(&self, var: &Var) -> Result<Entity, ResolveError> {
        self.map
            .get(var)
            .copied()
            .ok_or(ResolveError::Unresolved { var: *var })
    }

    pub fn resolve_function(&self, var: &Var) -> Result<FnIndex, ResolveError> {
        match self.resolve(var)? {
            Entity::Function(idx) => Ok(idx),
            other => Err(unexpected(var, EntityKind::Function, other)),
        }
    }

    pub fn resolve_custom_type(&self, var: &Var) -> Result<TypeIndex, ResolveError> {
        match self.resolve(var)? {
            Entity::CustomType(idx) => Ok(idx),
            other => Err(unexpected(var, EntityKind::CustomType, other)),
        }
    }

    pub fn resolve_import(&self, var: &Var) -> Result<ImportIndex, ResolveError> {
        match self.resolve(var)? {
            Entity::Import(idx) => Ok(idx),
            other => Err(unexpected(var, EntityKind::Import, other)),
        }
    }

    pub fn resolve_label(&self, var: &Var) -> Result<LabelTarget, ResolveError> {
        match self.resolve(var)? {
            Entity::Label(target) => Ok(target),
            other => Err(unexpected(var, EntityKind::Label, other)),
        }
    }

    pub fn resolve_export(&self, name: Name) -> Result<ExportIndex, ResolveError> {
        self.export_names
            .get(&name)
            .copied()
            .ok_or(ResolveError::UnknownExport { name })
    }

    /// Resolves a parameter or local of `function`.
    pub fn resolve_local(&self, function: FnIndex, var: &Var) -> Result<LocalRef, ResolveError> {
        self.functions[function]
            .local(var)
            .ok_or(ResolveError::LocalNotFound {
                var: *var,
                function,
            })
    }

    pub fn alloc(&mut self, expr: Expression) -> ExprId {
        self.exprs.alloc(expr)
    }

    pub fn expr(&self, id: ExprId) -> &Expression {
        &self.exprs[id]
    }

    /// For rewriting passes.
    pub fn expr_mut(&mut self, id: ExprId) -> &mut Expression {
        &mut self.exprs[id]
    }

    pub fn expression_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn arena(&self) -> &Arena<Expression> {
        &self.exprs
    }

    pub fn function(&self, idx: FnIndex) -> &Function {
        &self.functions[idx]
    }

    pub fn function_mut(&mut self, idx: FnIndex) -> &mut Function {
        &mut self.functions[idx]
    }

    pub fn set_body(&mut self, function: FnIndex, body: ExprId) {
        self.functions[function].body = Some(body);
    }

    pub fn custom_type(&self, idx: TypeIndex) -> &CustomType {
        &self.custom_types[idx]
    }

    pub fn import(&self, idx: ImportIndex) -> &Import {
        &self.imports[idx]
    }

    pub fn export(&self, idx: ExportIndex) -> &Export {
        &self.exports[idx]
    }

    pub fn functions(&self) -> impl Iterator<Item = (FnIndex, &Function)> {
        self.functions.iter()
    }

    pub fn custom_types(&self) -> impl Iterator<Item = (TypeIndex, &CustomType)> {
        self.custom_types.iter()
    }

    pub fn imports(&self) -> impl Iterator<Item = (ImportIndex, &Import)> {
        self.imports.iter()
    }

    pub fn exports(&self) -> impl Iterator<Item = (ExportIndex, &Export)> {
        self.exports.iter()
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Visits `root` and all its descendants in pre-order.
    ///
    /// Every node is visited, including code that can never execute.
    pub fn walk(&self, root: ExprId, mut f: impl FnMut(ExprId, &Expression)) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let expr = &self.exprs[id];
            f(id, expr);
            stack.extend(expr.children().into_iter().rev());
        }
    }
}

fn unexpected(var: &Var, expected: EntityKind, found: Entity) -> ResolveError {
    ResolveError::UnexpectedKind {
        var: *var,
        expected,
        found: found.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BasicType, Builder, NameType};

    #[test]
    fn fresh_vars_count_from_one() {
        let mut module = Module::new();
        let minted: Vec<_> = (0..5).map(|_| module.fresh_var()).collect();
        let expected: Vec<_> = (1..=5).map(Var::index).collect();
        assert_eq!(minted, expected);
    }

    #[test]
    fn fresh_vars_skip_bound_indices() {
        let mut module = Module::new();
        let block = Builder::new(&mut module).block(Var::index(1), Vec::new());
        module.register_label(block).unwrap();
        let sig = module.intern("sig");
        let sig_idx = module
            .add_custom_type(CustomType::new(sig, BasicType::None))
            .unwrap();
        module
            .bind(Var::index(2), Entity::CustomType(sig_idx))
            .unwrap();

        let fresh = module.fresh_var();
        assert_eq!(fresh, Var::index(3));
        assert!(module.resolve(&fresh).is_err());

        let marker = Builder::new(&mut module).label(fresh);
        module.register_label(marker).unwrap();
        assert_eq!(module.fresh_var(), Var::index(4));
    }

    #[test]
    fn foreign_name_registers_without_panicking() {
        let mut other = Interner::new();
        for s in ["a", "b", "c"] {
            other.intern(s);
        }
        let foreign = other.intern("d");

        let mut module = Module::new();
        let idx = module
            .add_function(Function::new(foreign, BasicType::None))
            .unwrap();
        assert_eq!(module.resolve_function(&Var::name(foreign)), Ok(idx));
        assert!(
            module
                .add_custom_type(CustomType::new(foreign, BasicType::None))
                .is_err()
        );
    }

    #[test]
    fn function_resolves_by_name() {
        let mut module = Module::new();
        let name = module.intern("foo");
        let idx = module
            .add_function(Function::new(name, BasicType::None))
            .unwrap();

        assert_eq!(module.resolve(&Var::name(name)), Ok(Entity::Function(idx)));
        assert_eq!(module.resolve_function(&Var::name(name)), Ok(idx));

        let missing = module.var("bar");
        assert_eq!(
            module.resolve(&missing),
            Err(ResolveError::Unresolved { var: missing })
        );
    }

    #[test]
    fn duplicate_local_names_are_rejected() {
        let mut module = Module::new();
        let x = module.intern("x");
        let function = Function::new(module.intern("f"), BasicType::None)
            .with_param(NameType::new(x, BasicType::I32))
            .with_local(NameType::new(x, BasicType::I64));

        assert_eq!(
            module.add_function(function),
            Err(RegisterError::DuplicateLocal { name: x })
        );
        assert_eq!(module.functions().count(), 0);
    }

    #[test]
    fn export_namespace_is_separate() {
        let mut module = Module::new();
        let name = module.intern("main");
        let fn_idx = module
            .add_function(Function::new(name, BasicType::I32))
            .unwrap();
        let export_idx = module
            .add_export(Export {
                name,
                value: Var::name(name),
            })
            .unwrap();

        assert_eq!(module.resolve_export(name), Ok(export_idx));
        assert_eq!(module.resolve_function(&Var::name(name)), Ok(fn_idx));
        assert_eq!(
            module.add_export(Export {
                name,
                value: Var::name(name),
            }),
            Err(RegisterError::DuplicateExport { name })
        );
    }
}
