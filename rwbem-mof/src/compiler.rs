//! MOF semantic passes and repository application
//!
//! Two passes over the AST: *resolve* (qualifier declarations and class
//! references, inheritance propagation, initializer typing) and *apply*
//! (repository mutations in dependency order: qualifier types, classes
//! topologically by inheritance, then instances). Every applied mutation
//! lands in an undo log; the first failure replays the log in reverse.
//! Qualifier-declaration rollback is best-effort.

use crate::ast::{
    ClassDecl, DataType, Feature, Initializer, InstanceDecl, Literal, Production,
    QualifierApplication, QualifierTypeDecl,
};
use crate::error::{MofError, MofResult, SourceLocation};
use crate::parser;
use crate::token::Span;
use rwbem_repo::{Repository, RepositoryError};
use rwbem_types::{
    fold_namespace, CimArray, CimClass, CimInstance, CimInstanceName, CimMethod, CimParameter,
    CimProperty, CimQualifier, CimQualifierDeclaration, CimScopes, CimType, CimValue, CimName,
};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Counts of applied top-level mutations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileReport {
    pub qualifiers: usize,
    pub classes: usize,
    pub instances: usize,
}

/// One planned repository mutation, in apply order
#[derive(Debug, Clone)]
pub struct PlannedMutation {
    pub location: SourceLocation,
    pub kind: MutationKind,
}

#[derive(Debug, Clone)]
pub enum MutationKind {
    CreateNamespace {
        namespace: String,
    },
    SetQualifier {
        namespace: String,
        declaration: CimQualifierDeclaration,
    },
    CreateClass {
        namespace: String,
        class: CimClass,
    },
    ModifyClass {
        namespace: String,
        class: CimClass,
    },
    CreateInstance {
        namespace: String,
        instance: CimInstance,
    },
    ModifyInstance {
        namespace: String,
        instance: CimInstance,
    },
}

/// Undo-log entry for one applied mutation
enum Applied {
    CreateNamespace {
        namespace: String,
    },
    SetQualifier {
        namespace: String,
        name: CimName,
        previous: Option<CimQualifierDeclaration>,
    },
    CreateClass {
        namespace: String,
        name: CimName,
    },
    ModifyClass {
        namespace: String,
        previous: CimClass,
    },
    CreateInstance {
        namespace: String,
        path: CimInstanceName,
    },
    ModifyInstance {
        namespace: String,
        previous: CimInstance,
    },
}

/// The MOF compiler: parses units, resolves them against a repository,
/// and applies the resulting mutations transactionally
pub struct MofCompiler<'r> {
    repository: &'r mut dyn Repository,
    default_namespace: String,
}

struct Sourced {
    file: String,
    namespace: String,
    production: Production,
}

impl<'r> MofCompiler<'r> {
    pub fn new(repository: &'r mut dyn Repository, default_namespace: &str) -> Self {
        Self {
            repository,
            default_namespace: rwbem_types::normalize_namespace(default_namespace),
        }
    }

    /// Compile MOF text against the repository. `origin` names the
    /// source in diagnostics; includes resolve relative to the current
    /// directory.
    pub fn compile_str(&mut self, source: &str, origin: &str) -> MofResult<CompileReport> {
        let productions = self.load_str(source, origin, None)?;
        let plan = self.plan_productions(productions)?;
        self.apply(plan)
    }

    /// Compile a MOF file; includes resolve relative to the file
    pub fn compile_file(&mut self, path: &Path) -> MofResult<CompileReport> {
        let productions = self.load_file(path, &mut Vec::new())?;
        let plan = self.plan_productions(productions)?;
        self.apply(plan)
    }

    /// Dry run: resolve and return the mutation plan without applying it
    pub fn plan_str(&mut self, source: &str, origin: &str) -> MofResult<Vec<PlannedMutation>> {
        let productions = self.load_str(source, origin, None)?;
        self.plan_productions(productions)
    }

    // ---- loading and include handling -----------------------------------

    fn load_str(
        &self,
        source: &str,
        origin: &str,
        base: Option<&Path>,
    ) -> MofResult<Vec<Sourced>> {
        self.load_str_with_stack(source, origin, base, &mut Vec::new())
    }

    fn load_file(&self, path: &Path, stack: &mut Vec<PathBuf>) -> MofResult<Vec<Sourced>> {
        let canonical = path.canonicalize().map_err(|e| MofError::Io {
            file: path.display().to_string(),
            message: e.to_string(),
        })?;
        if stack.contains(&canonical) {
            return Err(MofError::parse(
                SourceLocation {
                    file: path.display().to_string(),
                    line: 0,
                    column: 0,
                },
                "include cycle detected",
            ));
        }
        stack.push(canonical.clone());
        let source = fs::read_to_string(&canonical).map_err(|e| MofError::Io {
            file: path.display().to_string(),
            message: e.to_string(),
        })?;
        let base = canonical.parent().map(Path::to_path_buf);
        let result = self.load_str_with_stack(&source, &path.display().to_string(), base.as_deref(), stack);
        stack.pop();
        result
    }

    fn load_str_with_stack(
        &self,
        source: &str,
        origin: &str,
        base: Option<&Path>,
        stack: &mut Vec<PathBuf>,
    ) -> MofResult<Vec<Sourced>> {
        let unit = parser::parse(source, origin)?;
        let mut out = Vec::new();
        let mut namespace = self.default_namespace.clone();
        for production in unit.productions {
            match &production {
                Production::Pragma(pragma) if pragma.name.eq_ignore_ascii_case("namespace") => {
                    namespace = rwbem_types::normalize_namespace(&pragma.argument);
                    debug!(namespace, "switching target namespace");
                }
                Production::Pragma(pragma) if pragma.name.eq_ignore_ascii_case("include") => {
                    let dir = base.map(Path::to_path_buf).unwrap_or_default();
                    let included = dir.join(&pragma.argument);
                    let mut nested = self.load_file(&included, stack)?;
                    for item in &mut nested {
                        if item.namespace == self.default_namespace {
                            item.namespace = namespace.clone();
                        }
                    }
                    out.extend(nested);
                }
                Production::Pragma(pragma) => {
                    warn!(pragma = %pragma.name, "ignoring unsupported pragma");
                }
                _ => out.push(Sourced {
                    file: origin.to_string(),
                    namespace: namespace.clone(),
                    production,
                }),
            }
        }
        Ok(out)
    }

    // ---- resolve pass ---------------------------------------------------

    fn plan_productions(&mut self, productions: Vec<Sourced>) -> MofResult<Vec<PlannedMutation>> {
        let mut resolver = Resolver {
            repository: &*self.repository,
            unit_quals: HashMap::new(),
            unit_classes: HashMap::new(),
            unit_class_names: productions
                .iter()
                .filter_map(|item| match &item.production {
                    Production::Class(decl) => Some((
                        fold_namespace(&item.namespace),
                        decl.name.to_ascii_lowercase(),
                    )),
                    _ => None,
                })
                .collect(),
            aliases: HashMap::new(),
        };
        let mut plan: Vec<PlannedMutation> = Vec::new();

        // namespaces first, in first-use order
        let known: Vec<String> = self
            .repository
            .namespaces()
            .unwrap_or_default()
            .iter()
            .map(|n| fold_namespace(n))
            .collect();
        let mut created: Vec<String> = Vec::new();
        for item in &productions {
            let folded = fold_namespace(&item.namespace);
            if !known.contains(&folded) && !created.contains(&folded) {
                created.push(folded);
                plan.push(PlannedMutation {
                    location: location_of(&item.file, production_span(&item.production)),
                    kind: MutationKind::CreateNamespace {
                        namespace: item.namespace.clone(),
                    },
                });
            }
        }

        // pass A: qualifier declarations resolve first so that uses
        // earlier in the unit than their declaration still find them
        for item in &productions {
            if let Production::QualifierType(decl) = &item.production {
                let location = location_of(&item.file, decl.span);
                let declaration = resolver.qualifier_declaration(decl, &location)?;
                resolver.unit_quals.insert(
                    (fold_namespace(&item.namespace), decl.name.to_ascii_lowercase()),
                    declaration.clone(),
                );
                plan.push(PlannedMutation {
                    location,
                    kind: MutationKind::SetQualifier {
                        namespace: item.namespace.clone(),
                        declaration,
                    },
                });
            }
        }

        // pass B: classes, topologically by inheritance within the unit
        let class_items: Vec<&Sourced> = productions
            .iter()
            .filter(|i| matches!(i.production, Production::Class(_)))
            .collect();
        for item in topo_sort_classes(&class_items)? {
            let Production::Class(decl) = &item.production else {
                continue;
            };
            let location = location_of(&item.file, decl.span);
            let class = resolver.class(decl, &item.namespace, &location)?;
            let exists = self
                .repository
                .get_class(&item.namespace, &decl.name, false, false, false)
                .is_ok();
            resolver.unit_classes.insert(
                (fold_namespace(&item.namespace), decl.name.to_ascii_lowercase()),
                class.clone(),
            );
            plan.push(PlannedMutation {
                location,
                kind: if exists {
                    MutationKind::ModifyClass {
                        namespace: item.namespace.clone(),
                        class,
                    }
                } else {
                    MutationKind::CreateClass {
                        namespace: item.namespace.clone(),
                        class,
                    }
                },
            });
        }

        // pass C: instances, in declaration order (aliases resolve
        // strictly backwards)
        for item in &productions {
            if let Production::Instance(decl) = &item.production {
                let location = location_of(&item.file, decl.span);
                let instance = resolver.instance(decl, &item.namespace, &location)?;
                let path = instance
                    .path
                    .clone()
                    .ok_or_else(|| {
                        MofError::resolve(location.clone(), "instance has no key values")
                    })?;
                if let Some(alias) = &decl.alias {
                    resolver.aliases.insert(alias.to_ascii_lowercase(), path.clone());
                }
                let exists = self.repository.get_instance(&item.namespace, &path).is_ok();
                plan.push(PlannedMutation {
                    location,
                    kind: if exists {
                        MutationKind::ModifyInstance {
                            namespace: item.namespace.clone(),
                            instance,
                        }
                    } else {
                        MutationKind::CreateInstance {
                            namespace: item.namespace.clone(),
                            instance,
                        }
                    },
                });
            }
        }

        Ok(plan)
    }

    // ---- apply pass with rollback ---------------------------------------

    fn apply(&mut self, plan: Vec<PlannedMutation>) -> MofResult<CompileReport> {
        let mut undo: Vec<Applied> = Vec::new();
        let mut report = CompileReport::default();
        for mutation in plan {
            if let Err(source) = self.apply_one(&mutation, &mut undo, &mut report) {
                error!(error = %source, location = %mutation.location, "mutation failed, rolling back");
                self.rollback(undo);
                return Err(MofError::Repository {
                    location: mutation.location,
                    source,
                });
            }
        }
        info!(
            qualifiers = report.qualifiers,
            classes = report.classes,
            instances = report.instances,
            "MOF compilation applied"
        );
        Ok(report)
    }

    fn apply_one(
        &mut self,
        mutation: &PlannedMutation,
        undo: &mut Vec<Applied>,
        report: &mut CompileReport,
    ) -> Result<(), RepositoryError> {
        match &mutation.kind {
            MutationKind::CreateNamespace { namespace } => {
                self.repository.create_namespace(namespace)?;
                undo.push(Applied::CreateNamespace {
                    namespace: namespace.clone(),
                });
            }
            MutationKind::SetQualifier {
                namespace,
                declaration,
            } => {
                let previous = self
                    .repository
                    .get_qualifier(namespace, declaration.name.as_str())
                    .ok();
                self.repository.set_qualifier(namespace, declaration.clone())?;
                report.qualifiers += 1;
                undo.push(Applied::SetQualifier {
                    namespace: namespace.clone(),
                    name: declaration.name.clone(),
                    previous,
                });
            }
            MutationKind::CreateClass { namespace, class } => {
                self.repository.create_class(namespace, class.clone())?;
                report.classes += 1;
                undo.push(Applied::CreateClass {
                    namespace: namespace.clone(),
                    name: class.class_name.clone(),
                });
            }
            MutationKind::ModifyClass { namespace, class } => {
                let previous = self.repository.get_class(
                    namespace,
                    class.class_name.as_str(),
                    false,
                    true,
                    true,
                )?;
                self.repository.modify_class(namespace, class.clone())?;
                report.classes += 1;
                undo.push(Applied::ModifyClass {
                    namespace: namespace.clone(),
                    previous,
                });
            }
            MutationKind::CreateInstance {
                namespace,
                instance,
            } => {
                let path = self
                    .repository
                    .create_instance(namespace, instance.clone())?;
                report.instances += 1;
                undo.push(Applied::CreateInstance {
                    namespace: namespace.clone(),
                    path,
                });
            }
            MutationKind::ModifyInstance {
                namespace,
                instance,
            } => {
                let path = instance.path.clone().ok_or_else(|| {
                    RepositoryError::InvalidParameter("instance has no path".into())
                })?;
                let previous = self.repository.get_instance(namespace, &path)?;
                self.repository
                    .modify_instance(namespace, instance.clone(), true, None)?;
                report.instances += 1;
                undo.push(Applied::ModifyInstance {
                    namespace: namespace.clone(),
                    previous,
                });
            }
        }
        Ok(())
    }

    /// Replay the undo log in reverse. Qualifier-declaration rollback is
    /// best-effort: failures are logged and do not mask the original
    /// error.
    fn rollback(&mut self, undo: Vec<Applied>) {
        for entry in undo.into_iter().rev() {
            match entry {
                Applied::CreateNamespace { namespace } => {
                    if let Err(e) = self.repository.delete_namespace(&namespace) {
                        error!(error = %e, namespace, "rollback: delete_namespace failed");
                    }
                }
                Applied::SetQualifier {
                    namespace,
                    name,
                    previous,
                } => {
                    let result = match previous {
                        Some(declaration) => {
                            self.repository.set_qualifier(&namespace, declaration)
                        }
                        None => self.repository.delete_qualifier(&namespace, name.as_str()),
                    };
                    if let Err(e) = result {
                        warn!(error = %e, qualifier = %name, "rollback of qualifier declaration failed (best-effort)");
                    }
                }
                Applied::CreateClass { namespace, name } => {
                    if let Err(e) = self.repository.delete_class(&namespace, name.as_str()) {
                        error!(error = %e, class = %name, "rollback: delete_class failed");
                    }
                }
                Applied::ModifyClass {
                    namespace,
                    previous,
                } => {
                    let name = previous.class_name.clone();
                    if let Err(e) = self.repository.modify_class(&namespace, previous) {
                        error!(error = %e, class = %name, "rollback: modify_class failed");
                    }
                }
                Applied::CreateInstance { namespace, path } => {
                    if let Err(e) = self.repository.delete_instance(&namespace, &path) {
                        error!(error = %e, path = %path, "rollback: delete_instance failed");
                    }
                }
                Applied::ModifyInstance {
                    namespace,
                    previous,
                } => {
                    if let Err(e) =
                        self.repository.modify_instance(&namespace, previous, true, None)
                    {
                        error!(error = %e, "rollback: modify_instance failed");
                    }
                }
            }
        }
    }
}

// ---- resolution helpers -------------------------------------------------

struct Resolver<'a> {
    repository: &'a dyn Repository,
    /// (folded namespace, folded name) → declaration from this unit
    unit_quals: HashMap<(String, String), CimQualifierDeclaration>,
    /// (folded namespace, folded name) → fully propagated class
    unit_classes: HashMap<(String, String), CimClass>,
    /// every class name this unit declares, resolved or not yet;
    /// REF targets may point forward within the unit
    unit_class_names: HashSet<(String, String)>,
    /// folded alias → instance path
    aliases: HashMap<String, CimInstanceName>,
}

impl Resolver<'_> {
    fn qualifier_declaration(
        &self,
        decl: &QualifierTypeDecl,
        location: &SourceLocation,
    ) -> MofResult<CimQualifierDeclaration> {
        let default = match &decl.default {
            Some(init) => {
                initializer_value(init, decl.data_type, decl.is_array, &self.aliases, location)?
            }
            None => None,
        };
        let mut scopes = CimScopes::default();
        for scope in &decl.scopes {
            scopes
                .set(scope)
                .map_err(|e| MofError::resolve(location.clone(), e.to_string()))?;
        }
        let mut declaration =
            CimQualifierDeclaration::new(decl.name.clone(), decl.data_type, decl.is_array, default, scopes)
                .map_err(|e| MofError::resolve(location.clone(), e.to_string()))?;
        declaration.array_size = decl.array_size;
        for flavor in &decl.flavors {
            apply_flavor(
                flavor,
                &mut declaration.overridable,
                &mut declaration.tosubclass,
                &mut declaration.toinstance,
                &mut declaration.translatable,
            )
            .map_err(|msg| MofError::resolve(location.clone(), msg))?;
        }
        Ok(declaration)
    }

    fn lookup_qualifier(
        &self,
        namespace: &str,
        name: &str,
        location: &SourceLocation,
    ) -> MofResult<CimQualifierDeclaration> {
        let key = (fold_namespace(namespace), name.to_ascii_lowercase());
        if let Some(declaration) = self.unit_quals.get(&key) {
            return Ok(declaration.clone());
        }
        self.repository
            .get_qualifier(namespace, name)
            .map_err(|_| {
                MofError::resolve(
                    location.clone(),
                    format!("qualifier {name:?} is not declared in namespace {namespace:?}"),
                )
            })
    }

    fn qualifier(
        &self,
        app: &QualifierApplication,
        namespace: &str,
        file: &str,
    ) -> MofResult<CimQualifier> {
        let location = location_of(file, app.span);
        let declaration = self.lookup_qualifier(namespace, &app.name, &location)?;
        let value = match &app.value {
            // a bare boolean qualifier means true; anything else takes
            // its declaration default
            None => {
                if declaration.cim_type == CimType::Boolean && !declaration.is_array {
                    Some(CimValue::Boolean(true))
                } else {
                    declaration.default_value.clone()
                }
            }
            Some(init) => initializer_value(
                init,
                declaration.cim_type,
                declaration.is_array,
                &self.aliases,
                &location,
            )?,
        };
        let mut qualifier = CimQualifier::new(app.name.clone(), declaration.cim_type, value)
            .map_err(|e| MofError::resolve(location.clone(), e.to_string()))?;
        for flavor in &app.flavors {
            apply_flavor(
                flavor,
                &mut qualifier.overridable,
                &mut qualifier.tosubclass,
                &mut qualifier.toinstance,
                &mut qualifier.translatable,
            )
            .map_err(|msg| MofError::resolve(location.clone(), msg))?;
        }
        Ok(qualifier)
    }

    fn class_exists(&self, namespace: &str, name: &str) -> bool {
        let key = (fold_namespace(namespace), name.to_ascii_lowercase());
        self.unit_class_names.contains(&key)
            || self
                .repository
                .get_class(namespace, name, true, false, false)
                .is_ok()
    }

    fn lookup_class(
        &self,
        namespace: &str,
        name: &str,
        location: &SourceLocation,
    ) -> MofResult<CimClass> {
        let key = (fold_namespace(namespace), name.to_ascii_lowercase());
        if let Some(class) = self.unit_classes.get(&key) {
            return Ok(class.clone());
        }
        self.repository
            .get_class(namespace, name, false, true, true)
            .map_err(|_| {
                MofError::resolve(
                    location.clone(),
                    format!("class {name:?} is not known in namespace {namespace:?}"),
                )
            })
    }

    fn class(
        &self,
        decl: &ClassDecl,
        namespace: &str,
        location: &SourceLocation,
    ) -> MofResult<CimClass> {
        let mut class = CimClass::new(decl.name.clone());
        for app in &decl.qualifiers {
            let q = self.qualifier(app, namespace, &location.file)?;
            class.qualifiers.insert(q.name.clone(), q);
        }
        for feature in &decl.features {
            match feature {
                Feature::Property(p) => {
                    let location = location_of(&location.file, p.span);
                    let mut property = match &p.data_type {
                        DataType::Reference(target) => {
                            // the referenced class must exist somewhere:
                            // in this unit (possibly later) or the repo
                            if !self.class_exists(namespace, target) {
                                return Err(MofError::resolve(
                                    location.clone(),
                                    format!(
                                        "class {target:?} is not known in namespace {namespace:?}"
                                    ),
                                ));
                            }
                            let value = match &p.default {
                                Some(init) => initializer_value(
                                    init,
                                    CimType::Reference,
                                    false,
                                    &self.aliases,
                                    &location,
                                )?,
                                None => None,
                            };
                            CimProperty::reference(p.name.clone(), target.clone(), value)
                                .map_err(|e| MofError::resolve(location.clone(), e.to_string()))?
                        }
                        DataType::Cim(ty) => {
                            let value = match &p.default {
                                Some(init) => initializer_value(
                                    init,
                                    *ty,
                                    p.is_array,
                                    &self.aliases,
                                    &location,
                                )?,
                                None => None,
                            };
                            CimProperty::new(p.name.clone(), *ty, p.is_array, value)
                                .map_err(|e| MofError::resolve(location.clone(), e.to_string()))?
                        }
                    };
                    property.array_size = p.array_size;
                    property.class_origin = Some(class.class_name.clone());
                    for app in &p.qualifiers {
                        let q = self.qualifier(app, namespace, &location.file)?;
                        property.qualifiers.insert(q.name.clone(), q);
                    }
                    class.properties.insert(property.name.clone(), property);
                }
                Feature::Method(m) => {
                    let location = location_of(&location.file, m.span);
                    let return_type = match &m.return_type {
                        DataType::Cim(ty) => *ty,
                        DataType::Reference(_) => CimType::Reference,
                    };
                    let mut method = CimMethod::new(m.name.clone(), return_type);
                    method.class_origin = Some(class.class_name.clone());
                    for app in &m.qualifiers {
                        let q = self.qualifier(app, namespace, &location.file)?;
                        method.qualifiers.insert(q.name.clone(), q);
                    }
                    for p in &m.parameters {
                        let mut parameter = match &p.data_type {
                            DataType::Reference(target) => {
                                CimParameter::reference(p.name.clone(), target.clone(), p.is_array)
                            }
                            DataType::Cim(ty) => {
                                CimParameter::new(p.name.clone(), *ty, p.is_array)
                            }
                        };
                        parameter.array_size = p.array_size;
                        for app in &p.qualifiers {
                            let q = self.qualifier(app, namespace, &location.file)?;
                            parameter.qualifiers.insert(q.name.clone(), q);
                        }
                        method.parameters.insert(parameter.name.clone(), parameter);
                    }
                    class.methods.insert(method.name.clone(), method);
                }
            }
        }

        if let Some(superclass) = &decl.superclass {
            let parent = self.lookup_class(namespace, superclass, location)?;
            class = class.with_superclass(parent.class_name.clone());
            propagate(&mut class, &parent);
        }
        Ok(class)
    }

    fn instance(
        &self,
        decl: &InstanceDecl,
        namespace: &str,
        location: &SourceLocation,
    ) -> MofResult<CimInstance> {
        let class = self.lookup_class(namespace, &decl.class_name, location)?;
        let mut instance = CimInstance::new(class.class_name.clone());
        for init in &decl.properties {
            let location = location_of(&location.file, init.span);
            let declared = class.properties.get(&init.name).ok_or_else(|| {
                MofError::resolve(
                    location.clone(),
                    format!(
                        "class {} has no property {:?}",
                        class.class_name, init.name
                    ),
                )
            })?;
            let value = initializer_value(
                &init.value,
                declared.cim_type,
                declared.is_array,
                &self.aliases,
                &location,
            )?;
            let mut property = declared.clone();
            property.propagated = false;
            property
                .set_value(value)
                .map_err(|e| MofError::resolve(location.clone(), e.to_string()))?;
            instance.properties.insert(property.name.clone(), property);
        }
        let path = instance
            .build_path(Some(namespace))
            .map_err(|e| MofError::resolve(location.clone(), e.to_string()))?;
        Ok(instance.with_path(path))
    }
}

/// Copy the parent's features into the subclass (inheritance
/// propagation). Locally re-declared members win; qualifiers whose
/// tosubclass flavor is `Restricted` do not propagate, and propagated
/// qualifiers keep their declaration flavors.
fn propagate(class: &mut CimClass, parent: &CimClass) {
    for (name, q) in parent.qualifiers.iter() {
        if q.tosubclass == Some(false) || class.qualifiers.contains(name.as_str()) {
            continue;
        }
        let mut inherited = q.clone();
        inherited.propagated = true;
        class.qualifiers.insert(name.clone(), inherited);
    }
    for (name, property) in parent.properties.iter() {
        if class.properties.contains(name.as_str()) {
            continue;
        }
        let mut inherited = property.clone();
        inherited.propagated = true;
        if inherited.class_origin.is_none() {
            inherited.class_origin = Some(parent.class_name.clone());
        }
        class.properties.insert(name.clone(), inherited);
    }
    for (name, method) in parent.methods.iter() {
        if class.methods.contains(name.as_str()) {
            continue;
        }
        let mut inherited = method.clone();
        inherited.propagated = true;
        if inherited.class_origin.is_none() {
            inherited.class_origin = Some(parent.class_name.clone());
        }
        class.methods.insert(name.clone(), inherited);
    }
}

fn apply_flavor(
    flavor: &str,
    overridable: &mut Option<bool>,
    tosubclass: &mut Option<bool>,
    toinstance: &mut Option<bool>,
    translatable: &mut Option<bool>,
) -> Result<(), String> {
    match flavor.to_ascii_lowercase().as_str() {
        "enableoverride" => *overridable = Some(true),
        "disableoverride" => *overridable = Some(false),
        "tosubclass" => *tosubclass = Some(true),
        "restricted" => *tosubclass = Some(false),
        "toinstance" => *toinstance = Some(true),
        "translatable" => *translatable = Some(true),
        other => return Err(format!("unknown flavor {other:?}")),
    }
    Ok(())
}

fn literal_value(
    literal: &Literal,
    cim_type: CimType,
    aliases: &HashMap<String, CimInstanceName>,
    location: &SourceLocation,
) -> MofResult<CimValue> {
    let mismatch = |found: &str| {
        MofError::resolve(
            location.clone(),
            format!("expected a {cim_type} value, found {found}"),
        )
    };
    match literal {
        Literal::Int(n) => {
            if cim_type.is_integer() {
                CimValue::integer(cim_type, *n)
                    .map_err(|e| MofError::resolve(location.clone(), e.to_string()))
            } else if cim_type.is_real() {
                CimValue::real(cim_type, *n as f64)
                    .map_err(|e| MofError::resolve(location.clone(), e.to_string()))
            } else {
                Err(mismatch("an integer"))
            }
        }
        Literal::Real(r) => {
            if cim_type.is_real() {
                CimValue::real(cim_type, *r)
                    .map_err(|e| MofError::resolve(location.clone(), e.to_string()))
            } else {
                Err(mismatch("a real"))
            }
        }
        Literal::String(s) => match cim_type {
            CimType::String => Ok(CimValue::String(s.clone())),
            CimType::DateTime => CimValue::from_cim_str(CimType::DateTime, s)
                .map_err(|e| MofError::resolve(location.clone(), e.to_string())),
            CimType::Char16 => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(CimValue::Char16(c)),
                    _ => Err(mismatch("a multi-character string")),
                }
            }
            _ => Err(mismatch("a string")),
        },
        Literal::Char(c) => match cim_type {
            CimType::Char16 => Ok(CimValue::Char16(*c)),
            CimType::String => Ok(CimValue::String(c.to_string())),
            _ => Err(mismatch("a character")),
        },
        Literal::Boolean(b) => match cim_type {
            CimType::Boolean => Ok(CimValue::Boolean(*b)),
            _ => Err(mismatch("a boolean")),
        },
        Literal::Alias(alias) => match cim_type {
            CimType::Reference => aliases
                .get(&alias.to_ascii_lowercase())
                .map(|path| CimValue::Reference(Box::new(path.clone())))
                .ok_or_else(|| {
                    MofError::resolve(
                        location.clone(),
                        format!("alias ${alias} is not defined (aliases resolve backwards only)"),
                    )
                }),
            _ => Err(mismatch("an alias")),
        },
        Literal::Null => Err(mismatch("NULL")),
    }
}

fn initializer_value(
    init: &Initializer,
    cim_type: CimType,
    is_array: bool,
    aliases: &HashMap<String, CimInstanceName>,
    location: &SourceLocation,
) -> MofResult<Option<CimValue>> {
    match init {
        Initializer::Scalar(Literal::Null) => Ok(None),
        Initializer::Scalar(literal) => {
            if is_array {
                return Err(MofError::resolve(
                    location.clone(),
                    "array member needs an array initializer",
                ));
            }
            Ok(Some(literal_value(literal, cim_type, aliases, location)?))
        }
        Initializer::Array(literals) => {
            if !is_array {
                return Err(MofError::resolve(
                    location.clone(),
                    "scalar member cannot take an array initializer",
                ));
            }
            let mut elements = Vec::with_capacity(literals.len());
            for literal in literals {
                match literal {
                    Literal::Null => elements.push(None),
                    other => elements.push(Some(literal_value(other, cim_type, aliases, location)?)),
                }
            }
            let array = CimArray::new(cim_type, elements)
                .map_err(|e| MofError::resolve(location.clone(), e.to_string()))?;
            Ok(Some(CimValue::Array(array)))
        }
    }
}

fn location_of(file: &str, span: Span) -> SourceLocation {
    SourceLocation {
        file: file.to_string(),
        line: span.line,
        column: span.column,
    }
}

fn production_span(production: &Production) -> Span {
    match production {
        Production::Pragma(p) => p.span,
        Production::QualifierType(q) => q.span,
        Production::Class(c) => c.span,
        Production::Instance(i) => i.span,
    }
}

/// Order unit classes so every superclass precedes its subclasses
fn topo_sort_classes<'a>(items: &[&'a Sourced]) -> MofResult<Vec<&'a Sourced>> {
    let mut ordered: Vec<&Sourced> = Vec::with_capacity(items.len());
    let mut remaining: Vec<&Sourced> = items.to_vec();
    while !remaining.is_empty() {
        let placed_before = ordered.len();
        remaining.retain(|item| {
            let Production::Class(decl) = &item.production else {
                return false;
            };
            let ready = match &decl.superclass {
                None => true,
                Some(superclass) => {
                    let in_unit = items.iter().any(|other| {
                        matches!(&other.production, Production::Class(c)
                            if c.name.eq_ignore_ascii_case(superclass)
                            && fold_namespace(&other.namespace) == fold_namespace(&item.namespace))
                    });
                    if !in_unit {
                        true // resolved against the repository instead
                    } else {
                        ordered.iter().any(|placed| {
                            matches!(&placed.production, Production::Class(c)
                                if c.name.eq_ignore_ascii_case(superclass)
                                && fold_namespace(&placed.namespace) == fold_namespace(&item.namespace))
                        })
                    }
                }
            };
            if ready {
                ordered.push(*item);
                false
            } else {
                true
            }
        });
        if ordered.len() == placed_before {
            let Production::Class(decl) = &remaining[0].production else {
                unreachable!("remaining holds classes only");
            };
            return Err(MofError::resolve(
                location_of(&remaining[0].file, decl.span),
                format!("inheritance cycle involving class {:?}", decl.name),
            ));
        }
    }
    Ok(ordered)
}
