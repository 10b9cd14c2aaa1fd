//! JSON program loader.
//!
//! A program is described as a list of classes, each one with its fields
//! and methods. Method bodies are lists of pointer-relevant statements,
//! tagged by their `op`:
//!
//! ```json
//! {
//!   "entry": "LMain;->main([Ljava/lang/String;)V",
//!   "classes": [
//!     { "name": "A", "fields": [{ "name": "f", "type": "Ljava/lang/Object;" }] },
//!     { "name": "Main", "methods": [{
//!         "name": "main", "static": true,
//!         "params": [{ "name": "args", "type": "[Ljava/lang/String;" }],
//!         "locals": [{ "name": "a", "type": "LA;" }],
//!         "body": [
//!           { "op": "new", "lhs": "a", "type": "LA;" },
//!           { "op": "invoke", "kind": "special", "base": "a", "method": "LA;-><init>()V" },
//!           { "op": "return" }
//!         ]
//!     }]}
//!   ]
//! }
//! ```

use crate::errors::{IrError, IrResult};
use crate::program::*;
use crate::types::Type;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::io::Read;

#[derive(Debug, Default, Deserialize)]
pub struct ProgramDef {
    /// Descriptor of the entry method.
    #[serde(default)]
    pub entry: Option<String>,
    #[serde(default)]
    pub classes: Vec<ClassDef>,
}

#[derive(Debug, Deserialize)]
pub struct ClassDef {
    pub name: String,
    #[serde(rename = "super", default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub interface: bool,
    #[serde(rename = "abstract", default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub methods: Vec<MethodDef>,
}

#[derive(Debug, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(rename = "static", default)]
    pub is_static: bool,
}

#[derive(Debug, Deserialize)]
pub struct MethodDef {
    pub name: String,
    #[serde(default)]
    pub params: Vec<VarDef>,
    #[serde(rename = "return", default = "void_descriptor")]
    pub return_type: String,
    #[serde(rename = "static", default)]
    pub is_static: bool,
    #[serde(rename = "abstract", default)]
    pub is_abstract: bool,
    #[serde(rename = "native", default)]
    pub is_native: bool,
    #[serde(default)]
    pub locals: Vec<VarDef>,
    #[serde(default)]
    pub body: Vec<StmtDef>,
}

fn void_descriptor() -> String {
    "V".to_string()
}

#[derive(Debug, Deserialize)]
pub struct VarDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
}

/// Statements, with variables named as declared in the method and
/// members referenced by their descriptors. A field access without a
/// `base` is a static field access.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StmtDef {
    New {
        lhs: String,
        #[serde(rename = "type")]
        type_: String,
    },
    Copy {
        lhs: String,
        rhs: String,
    },
    StoreField {
        #[serde(default)]
        base: Option<String>,
        field: String,
        rhs: String,
    },
    LoadField {
        lhs: String,
        #[serde(default)]
        base: Option<String>,
        field: String,
    },
    StoreArray {
        base: String,
        rhs: String,
    },
    LoadArray {
        lhs: String,
        base: String,
    },
    Invoke {
        kind: CallKind,
        #[serde(default)]
        base: Option<String>,
        method: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        result: Option<String>,
    },
    Return {
        #[serde(default)]
        value: Option<String>,
    },
}

/// Parses a JSON program description and builds the program.
pub fn load_json(input: &str) -> IrResult<Program> {
    let def: ProgramDef = serde_json::from_str(input)?;
    Program::from_def(def)
}

pub fn load_reader<R: Read>(reader: R) -> IrResult<Program> {
    let def: ProgramDef = serde_json::from_reader(reader)?;
    Program::from_def(def)
}

impl Program {
    /// Builds a program from its description.
    ///
    /// Classes are registered first so that members may reference any
    /// class of the program, regardless of declaration order. Referenced
    /// but undefined classes become phantom classes.
    pub fn from_def(def: ProgramDef) -> IrResult<Self> {
        let mut program = Self::new();

        let mut class_uids = Vec::with_capacity(def.classes.len());
        for cdef in &def.classes {
            let mut flags = ClassFlags::ACC_PUBLIC;
            if cdef.interface {
                flags |= ClassFlags::ACC_INTERFACE | ClassFlags::ACC_ABSTRACT;
            }
            if cdef.is_abstract {
                flags |= ClassFlags::ACC_ABSTRACT;
            }
            class_uids.push(program.register_class(&cdef.name, flags)?);
        }

        for (cdef, cuid) in def.classes.iter().zip(&class_uids) {
            if let Some(superclass) = &cdef.superclass {
                let super_uid = program.class_or_phantom(superclass)?;
                program.insert_extends(*cuid, super_uid)?;
            }
            for interface in &cdef.interfaces {
                let iuid = program.class_or_phantom(interface)?;
                program.insert_implements(*cuid, iuid)?;
            }
            for mdef in &cdef.methods {
                for sdef in &mdef.body {
                    if let StmtDef::New { type_, .. } = sdef {
                        if let Type::Class(name) = Type::try_from(type_.as_str())? {
                            program.class_or_phantom(&name)?;
                        }
                    }
                }
            }
        }

        program.close_hierarchy()?;

        let mut method_uids = Vec::new();
        for (cdef, cuid) in def.classes.iter().zip(&class_uids) {
            for fdef in &cdef.fields {
                let mut flags = FieldFlags::empty();
                if fdef.is_static {
                    flags |= FieldFlags::ACC_STATIC;
                }
                let type_ = Type::try_from(fdef.type_.as_str())?;
                program.register_field(*cuid, &fdef.name, type_, flags)?;
            }
            for mdef in &cdef.methods {
                let params = mdef
                    .params
                    .iter()
                    .map(|param| Type::try_from(param.type_.as_str()))
                    .collect::<IrResult<Vec<Type>>>()?;
                let return_type = Type::try_from(mdef.return_type.as_str())?;
                let subsig = Subsignature::new(&mdef.name, params, return_type);
                let mut flags = MethodFlags::ACC_PUBLIC;
                if mdef.is_static {
                    flags |= MethodFlags::ACC_STATIC;
                }
                if mdef.is_abstract {
                    flags |= MethodFlags::ACC_ABSTRACT;
                }
                if mdef.is_native {
                    flags |= MethodFlags::ACC_NATIVE;
                }
                let muid = program.register_method(*cuid, subsig, flags)?;
                method_uids.push((muid, mdef));
            }
        }

        for (muid, mdef) in method_uids {
            if mdef.is_abstract || mdef.is_native {
                if !mdef.body.is_empty() {
                    log::warn!(
                        "ignoring the body of {} method {}",
                        if mdef.is_abstract { "abstract" } else { "native" },
                        program[muid]
                    );
                }
                continue;
            }
            let body = BodyBuilder::new(&mut program, muid).build(mdef)?;
            program.set_body(muid, body);
        }

        if let Some(entry) = &def.entry {
            let descr = MethodDescr::try_from(entry.as_str())?;
            let muid = program
                .find_method_by_descriptor(&descr)
                .map(Method::uid)
                .ok_or_else(|| IrError::MethodNotFound(entry.clone()))?;
            program.set_entry(muid);
        } else {
            let mains: Vec<MethodUid> = program
                .iter_methods()
                .filter(|method| method.is_static() && method.name() == "main")
                .map(Method::uid)
                .collect();
            match mains.as_slice() {
                [main] => program.set_entry(*main),
                [] => log::debug!("no entry method in program"),
                _ => log::warn!("several static main methods, no entry selected"),
            }
        }

        log::debug!(
            "program loaded: {} classes, {} methods, {} statements",
            program.nb_classes(),
            program.nb_methods(),
            program.nb_stmts()
        );
        Ok(program)
    }
}

struct BodyBuilder<'p> {
    program: &'p mut Program,
    method: MethodUid,
    names: BTreeMap<String, VarUid>,
    body: Body,
}

impl<'p> BodyBuilder<'p> {
    fn new(program: &'p mut Program, method: MethodUid) -> Self {
        Self {
            program,
            method,
            names: BTreeMap::new(),
            body: Body::default(),
        }
    }

    fn build(mut self, mdef: &MethodDef) -> IrResult<Body> {
        let method = &self.program[self.method];
        if !method.is_static() {
            let this_type = self.program[method.class()].to_type();
            let this = self.declare("this", this_type)?;
            self.body.this = Some(this);
        }
        for param in &mdef.params {
            let var = self.declare(&param.name, Type::try_from(param.type_.as_str())?)?;
            self.body.params.push(var);
        }
        for local in &mdef.locals {
            self.declare(&local.name, Type::try_from(local.type_.as_str())?)?;
        }

        for (index, sdef) in mdef.body.iter().enumerate() {
            let kind = self.resolve_stmt(index, sdef)?;
            let suid = self.program.register_stmt(self.method, index, kind);
            self.index_stmt(suid);
            self.body.stmts.push(suid);
        }
        Ok(self.body)
    }

    fn declare(&mut self, name: &str, type_: Type) -> IrResult<VarUid> {
        if self.names.contains_key(name) {
            return Err(IrError::DuplicateVar {
                method: self.program[self.method].to_string(),
                var: name.to_string(),
            });
        }
        let var = self.program.register_var(self.method, name, type_);
        self.names.insert(name.to_string(), var);
        self.body.vars.push(var);
        Ok(var)
    }

    fn var(&self, name: &str) -> IrResult<VarUid> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| IrError::UnknownVar {
                method: self.program[self.method].to_string(),
                var: name.to_string(),
            })
    }

    fn malformed(&self, index: usize, reason: &str) -> IrError {
        IrError::MalformedStmt {
            method: self.program[self.method].to_string(),
            index,
            reason: reason.to_string(),
        }
    }

    /// Resolves a field reference, checking that it is accessed the way it
    /// is declared (statically or on an instance).
    fn field(&self, index: usize, fref: &str, instance: bool) -> IrResult<FieldUid> {
        let fref = FieldRef::try_from(fref)?;
        let field = self
            .program
            .resolve_field(&fref)
            .ok_or_else(|| IrError::FieldNotFound(fref.to_string()))?;
        match (field.is_static(), instance) {
            (true, true) => Err(self.malformed(index, "static field accessed through an instance")),
            (false, false) => Err(self.malformed(index, "instance field accessed statically")),
            _ => Ok(field.uid()),
        }
    }

    fn resolve_stmt(&mut self, index: usize, sdef: &StmtDef) -> IrResult<StmtKind> {
        let kind = match sdef {
            StmtDef::New { lhs, type_ } => {
                let type_ = Type::try_from(type_.as_str())?;
                if !type_.is_reference() {
                    return Err(self.malformed(index, "allocation of a non reference type"));
                }
                StmtKind::New {
                    lhs: self.var(lhs)?,
                    type_,
                }
            }
            StmtDef::Copy { lhs, rhs } => StmtKind::Copy {
                lhs: self.var(lhs)?,
                rhs: self.var(rhs)?,
            },
            StmtDef::StoreField {
                base: Some(base),
                field,
                rhs,
            } => StmtKind::InstanceStore {
                base: self.var(base)?,
                field: self.field(index, field, true)?,
                rhs: self.var(rhs)?,
            },
            StmtDef::StoreField {
                base: None,
                field,
                rhs,
            } => StmtKind::StaticStore {
                field: self.field(index, field, false)?,
                rhs: self.var(rhs)?,
            },
            StmtDef::LoadField {
                lhs,
                base: Some(base),
                field,
            } => StmtKind::InstanceLoad {
                lhs: self.var(lhs)?,
                base: self.var(base)?,
                field: self.field(index, field, true)?,
            },
            StmtDef::LoadField {
                lhs,
                base: None,
                field,
            } => StmtKind::StaticLoad {
                lhs: self.var(lhs)?,
                field: self.field(index, field, false)?,
            },
            StmtDef::StoreArray { base, rhs } => StmtKind::ArrayStore {
                base: self.var(base)?,
                rhs: self.var(rhs)?,
            },
            StmtDef::LoadArray { lhs, base } => StmtKind::ArrayLoad {
                lhs: self.var(lhs)?,
                base: self.var(base)?,
            },
            StmtDef::Invoke {
                kind,
                base,
                method,
                args,
                result,
            } => {
                let method_ref = MethodRef::try_from(method.as_str())?;
                let base = match (kind, base) {
                    (CallKind::Static, None) => None,
                    (CallKind::Static, Some(_)) => {
                        return Err(self.malformed(index, "static invocation with a receiver"))
                    }
                    (_, Some(base)) => Some(self.var(base)?),
                    (_, None) => {
                        return Err(self.malformed(index, "instance invocation without receiver"))
                    }
                };
                let args = args
                    .iter()
                    .map(|arg| self.var(arg))
                    .collect::<IrResult<Vec<VarUid>>>()?;
                if args.len() != method_ref.subsignature().parameters_types().len() {
                    log::warn!(
                        "{}@{}: {} arguments given to {}",
                        self.program[self.method],
                        index,
                        args.len(),
                        method_ref
                    );
                }
                let result = result.as_deref().map(|name| self.var(name)).transpose()?;
                StmtKind::Invoke(Invoke {
                    kind: *kind,
                    method_ref,
                    base,
                    args,
                    result,
                })
            }
            StmtDef::Return { value } => {
                let value = value.as_deref().map(|name| self.var(name)).transpose()?;
                if let Some(var) = value {
                    if !self.body.return_vars.contains(&var) {
                        self.body.return_vars.push(var);
                    }
                }
                StmtKind::Return(value)
            }
        };
        Ok(kind)
    }

    /// Registers the statement in the indexes of its base variable.
    fn index_stmt(&mut self, suid: StmtUid) {
        match self.program[suid].kind().clone() {
            StmtKind::InstanceStore { base, .. } => self.program.var_mut(base).store_fields.push(suid),
            StmtKind::InstanceLoad { base, .. } => self.program.var_mut(base).load_fields.push(suid),
            StmtKind::ArrayStore { base, .. } => self.program.var_mut(base).store_arrays.push(suid),
            StmtKind::ArrayLoad { base, .. } => self.program.var_mut(base).load_arrays.push(suid),
            StmtKind::Invoke(Invoke {
                base: Some(base), ..
            }) => self.program.var_mut(base).invokes.push(suid),
            _ => (),
        }
    }
}
