//! JSON project format.
//!
//! A project lists modules, their types and methods, and method bodies as
//! small statement/expression trees. Call targets are written as method
//! keys (`"Repo.Load"`, or an explicit overload key) and resolved after all
//! symbols are declared, so bodies may reference methods declared later.
//!
//! ```json
//! {
//!   "modules": [{
//!     "name": "App",
//!     "types": [
//!       { "name": "IRepo", "kind": "interface",
//!         "methods": [{ "name": "Load", "returns": "int" }] },
//!       { "name": "Repo", "kind": "class", "implements": ["IRepo"],
//!         "methods": [{ "name": "Load", "returns": "int", "modifiers": ["public"],
//!                       "body": [{ "return": { "literal": "42" } }] }] }
//!     ]
//!   }]
//! }
//! ```

use crate::builder::{MethodSpec, ProgramBuilder};
use crate::error::ModelError;
use crate::ids::{NodeIndex, SymbolId, TypeId};
use crate::program::Program;
use crate::types::{ModifierFlags, TypeKind, TypeRef};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectFile {
    pub modules: Vec<ModuleDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleDef {
    pub name: String,
    #[serde(default)]
    pub types: Vec<TypeDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDef {
    pub name: String,
    pub kind: TypeKind,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub methods: Vec<MethodDef>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

fn void() -> String {
    "void".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodDef {
    pub name: String,
    #[serde(default = "void")]
    pub returns: String,
    #[serde(default)]
    pub params: Vec<ParamDef>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub key: Option<String>,
    /// Declared outside this program (no declaration to rewrite).
    #[serde(default)]
    pub external: bool,
    #[serde(default)]
    pub body: Option<Vec<StmtDef>>,
    /// Bodies of additional partial declarations.
    #[serde(default)]
    pub partial: Vec<Vec<StmtDef>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDef {
    pub name: String,
    pub init: ExprDef,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StmtDef {
    Expr(ExprDef),
    Return(Option<ExprDef>),
    Local {
        name: String,
        init: ExprDef,
    },
    LocalFunction {
        name: String,
        #[serde(default, rename = "async")]
        is_async: bool,
        #[serde(default = "void")]
        returns: String,
        body: Vec<StmtDef>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprDef {
    Call(CallDef),
    Await(Box<ExprDef>),
    Lambda {
        #[serde(default, rename = "async")]
        is_async: bool,
        #[serde(default)]
        params: Vec<String>,
        body: Vec<StmtDef>,
    },
    MethodGroup {
        target: String,
    },
    Name(String),
    Literal(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CallDef {
    /// Method key of the callee; absent for calls outside the program.
    #[serde(default)]
    pub target: Option<String>,
    /// Invoked name as written; defaults to the target's name.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub receiver: Option<Box<ExprDef>>,
    #[serde(default)]
    pub args: Vec<ExprDef>,
}

/// Parse and load a project from JSON text.
pub fn load_project(json: &str) -> Result<Program, ModelError> {
    let file: ProjectFile = serde_json::from_str(json)?;
    ProjectLoader::default().load(&file)
}

#[derive(Default)]
struct ProjectLoader {
    builder: Option<ProgramBuilder>,
    types_by_name: FxHashMap<String, TypeId>,
}

impl ProjectLoader {
    fn builder(&mut self) -> &mut ProgramBuilder {
        self.builder
            .get_or_insert_with(ProgramBuilder::without_default_module)
    }

    fn load(mut self, file: &ProjectFile) -> Result<Program, ModelError> {
        // Pass 1: modules and types.
        let mut type_ids = Vec::new();
        for module in &file.modules {
            self.builder().module(module.name.clone());
            for ty in &module.types {
                let id = match ty.kind {
                    TypeKind::Class => self.builder().class(ty.name.clone()),
                    TypeKind::Interface => self.builder().interface(ty.name.clone()),
                };
                self.types_by_name.entry(ty.name.clone()).or_insert(id);
                type_ids.push((id, ty));
            }
        }

        // Pass 2: heritage.
        for (id, ty) in &type_ids {
            if let Some(base) = &ty.extends {
                let base = self.lookup_type(base)?;
                self.builder().extends(*id, base);
            }
            for iface in &ty.implements {
                let iface = self.lookup_type(iface)?;
                self.builder().implements(*id, iface);
            }
        }

        // Pass 3: method symbols.
        let mut keys = FxHashSet::default();
        let mut pending = Vec::new();
        for (id, ty) in &type_ids {
            for method in &ty.methods {
                if let Some(key) = &method.key
                    && !keys.insert(key.clone())
                {
                    return Err(ModelError::DuplicateKey(key.clone()));
                }
                let spec = Self::method_spec(method)?;
                let symbol = self.builder().method(*id, spec);
                pending.push((symbol, method));
            }
        }

        // Pass 4: bodies and field initializers.
        for (symbol, method) in pending {
            if let Some(body) = &method.body {
                let statements = self.lower_block(body)?;
                self.builder().body(symbol, statements);
            }
            for part in &method.partial {
                let statements = self.lower_block(part)?;
                self.builder().partial(symbol, statements);
            }
        }
        for (id, ty) in &type_ids {
            for field in &ty.fields {
                let init = self.lower_expr(&field.init)?;
                self.builder().field(*id, field.name.clone(), init);
            }
        }

        let builder = self.builder.unwrap_or_else(ProgramBuilder::without_default_module);
        let program = builder.finish()?;
        debug!(
            types = program.types().len(),
            methods = program.symbols().len(),
            nodes = program.nodes.len(),
            "loaded project"
        );
        Ok(program)
    }

    fn lookup_type(&self, name: &str) -> Result<TypeId, ModelError> {
        self.types_by_name
            .get(name)
            .copied()
            .ok_or_else(|| ModelError::UnknownType(name.to_string()))
    }

    fn method_spec(method: &MethodDef) -> Result<MethodSpec, ModelError> {
        let mut modifiers = ModifierFlags::empty();
        for keyword in &method.modifiers {
            modifiers |= ModifierFlags::from_keyword(keyword)?;
        }
        let mut spec = MethodSpec::new(method.name.clone())
            .returns(TypeRef::parse(&method.returns)?)
            .modifiers(modifiers);
        for param in &method.params {
            spec = spec.param(param.name.clone(), TypeRef::parse(&param.ty)?);
        }
        if let Some(key) = &method.key {
            spec = spec.key(key.clone());
        }
        if method.external {
            spec = spec.metadata_only();
        }
        Ok(spec)
    }

    fn resolve(&mut self, key: &str) -> Result<SymbolId, ModelError> {
        self.builder().program().resolve_method(key)
    }

    fn lower_block(&mut self, statements: &[StmtDef]) -> Result<Vec<NodeIndex>, ModelError> {
        statements.iter().map(|s| self.lower_stmt(s)).collect()
    }

    fn lower_stmt(&mut self, stmt: &StmtDef) -> Result<NodeIndex, ModelError> {
        Ok(match stmt {
            StmtDef::Expr(expr) => {
                let expr = self.lower_expr(expr)?;
                self.builder().expr(expr)
            }
            StmtDef::Return(expr) => {
                let expr = match expr {
                    Some(expr) => self.lower_expr(expr)?,
                    None => NodeIndex::NONE,
                };
                self.builder().ret(expr)
            }
            StmtDef::Local { name, init } => {
                let init = self.lower_expr(init)?;
                self.builder().local(name.clone(), init)
            }
            StmtDef::LocalFunction {
                name,
                is_async,
                returns,
                body,
            } => {
                let return_type = TypeRef::parse(returns)?;
                let statements = self.lower_block(body)?;
                self.builder()
                    .local_function(name.clone(), *is_async, return_type, statements)
            }
        })
    }

    fn lower_expr(&mut self, expr: &ExprDef) -> Result<NodeIndex, ModelError> {
        Ok(match expr {
            ExprDef::Call(call) => {
                let receiver = match &call.receiver {
                    Some(receiver) => self.lower_expr(receiver)?,
                    None => NodeIndex::NONE,
                };
                let args = call
                    .args
                    .iter()
                    .map(|arg| self.lower_expr(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                match (&call.target, &call.name) {
                    (Some(target), name) => {
                        let target = self.resolve(target)?;
                        let idx = self.builder().call_on(receiver, target, args);
                        if let Some(name) = name
                            && let Some(call) = self
                                .builder()
                                .program_mut()
                                .nodes
                                .get_mut(idx)
                                .and_then(|n| n.as_call_mut())
                        {
                            call.name = name.clone();
                        }
                        idx
                    }
                    (None, Some(name)) => {
                        self.builder().call_unresolved(receiver, name.clone(), args)
                    }
                    (None, None) => {
                        return Err(ModelError::UnknownMethod(
                            "<call without target or name>".into(),
                        ));
                    }
                }
            }
            ExprDef::Await(operand) => {
                let operand = self.lower_expr(operand)?;
                self.builder().await_expr(operand)
            }
            ExprDef::Lambda {
                is_async,
                params,
                body,
            } => {
                let statements = self.lower_block(body)?;
                self.builder().lambda(*is_async, params.clone(), statements)
            }
            ExprDef::MethodGroup { target } => {
                let target = self.resolve(target)?;
                self.builder().method_group(target)
            }
            ExprDef::Name(text) => self.builder().name(text.clone()),
            ExprDef::Literal(text) => self.builder().literal(text.clone()),
        })
    }
}
