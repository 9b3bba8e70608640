//! Type catalog: the immutable registry of types and decision functions.

use std::collections::{HashMap, HashSet};

use lacuna_interchange::{ProgramBundle, ProgramConstruct, RecordConstruct};

use super::logic::{parse_expr, parse_logic};
use super::outcome::RequirementKind;
use super::{CatalogError, Expr, LogicNode};

// ──────────────────────────────────────────────
// Type definitions
// ──────────────────────────────────────────────

/// Dense index of a type inside its [`Catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub usize);

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    Integer,
    Decimal,
    String,
}

impl Primitive {
    pub const ALL: [Primitive; 4] = [
        Primitive::Boolean,
        Primitive::Integer,
        Primitive::Decimal,
        Primitive::String,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Boolean => "Boolean",
            Primitive::Integer => "Integer",
            Primitive::Decimal => "Decimal",
            Primitive::String => "String",
        }
    }

    pub fn from_name(name: &str) -> Option<Primitive> {
        Primitive::ALL.into_iter().find(|p| p.name() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Primitive(Primitive),
    Enumeration(Vec<String>),
    Record,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Singular,
    Collection,
}

/// A member of a record type, with its type reference resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSpec {
    pub name: String,
    pub type_id: TypeId,
    /// Declared type name, kept for diagnostics.
    pub type_name: String,
    pub cardinality: Cardinality,
    pub required: bool,
}

impl MemberSpec {
    /// Requirement kind reported when this member is missing.
    pub fn requirement_kind(&self) -> RequirementKind {
        match self.cardinality {
            Cardinality::Singular => RequirementKind::Has,
            Cardinality::Collection => RequirementKind::Includes,
        }
    }

    pub fn is_collection(&self) -> bool {
        self.cardinality == Cardinality::Collection
    }
}

/// A resolved type definition.
///
/// Record members are flattened: members inherited from the family base
/// come first, in declaration order, followed by the type's own members.
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub id: TypeId,
    pub name: String,
    pub label: Option<String>,
    pub kind: TypeKind,
    pub is_abstract: bool,
    pub parent: Option<TypeId>,
    pub members: Vec<MemberSpec>,
    member_index: HashMap<String, usize>,
    /// Transitive descendants, in declaration order.
    pub variants: Vec<TypeId>,
}

impl TypeDef {
    fn new(id: TypeId, name: String, kind: TypeKind) -> TypeDef {
        TypeDef {
            id,
            name,
            label: None,
            kind,
            is_abstract: false,
            parent: None,
            members: Vec::new(),
            member_index: HashMap::new(),
            variants: Vec::new(),
        }
    }

    /// Look up a member by name in O(1) via the index.
    pub fn member(&self, name: &str) -> Option<&MemberSpec> {
        self.member_index.get(name).map(|&i| &self.members[i])
    }

    pub fn is_record(&self) -> bool {
        self.kind == TypeKind::Record
    }

    /// A slot of this type needs a discriminator tag to pick its concrete type.
    pub fn is_polymorphic(&self) -> bool {
        self.is_record() && (self.is_abstract || !self.variants.is_empty())
    }

    pub fn enum_values(&self) -> Option<&[String]> {
        match &self.kind {
            TypeKind::Enumeration(values) => Some(values),
            _ => None,
        }
    }

    pub fn primitive(&self) -> Option<Primitive> {
        match self.kind {
            TypeKind::Primitive(p) => Some(p),
            _ => None,
        }
    }

    /// Human-readable name: the label, or the last segment of a dotted name.
    pub fn display_name(&self) -> &str {
        match &self.label {
            Some(label) => label.as_str(),
            None => self.name.rsplit('.').next().unwrap_or(&self.name),
        }
    }
}

/// Lookup failures from [`Catalog::resolve`] and [`Catalog::resolve_variant`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("unknown type '{name}'")]
    UnknownType { name: String },
    #[error("'{tag}' is not a concrete variant of '{family}'")]
    UnknownVariant { family: String, tag: String },
}

// ──────────────────────────────────────────────
// Decision functions
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub label: String,
    pub type_id: TypeId,
}

/// A decision function with its logic tree parsed and type references resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionFunction {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub result_type: TypeId,
    pub body: Vec<LogicNode>,
    pub produce: Expr,
}

impl DecisionFunction {
    pub fn parameter(&self, label: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.label == label)
    }
}

// ──────────────────────────────────────────────
// Catalog
// ──────────────────────────────────────────────

/// Immutable registry of type definitions and decision functions.
///
/// There is no mutation API; a catalog is shared by reference across any
/// number of concurrent evaluations.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub id: String,
    pub version: String,
    types: Vec<TypeDef>,
    type_index: HashMap<String, TypeId>,
    functions: Vec<DecisionFunction>,
    function_index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from a program description JSON document.
    pub fn from_interchange(program: &serde_json::Value) -> Result<Catalog, CatalogError> {
        let bundle = lacuna_interchange::from_interchange(program)?;
        Catalog::from_bundle(&bundle)
    }

    /// Build and validate a catalog from already-parsed program constructs.
    pub fn from_bundle(bundle: &ProgramBundle) -> Result<Catalog, CatalogError> {
        let mut catalog = Catalog {
            id: bundle.id.clone(),
            version: bundle.program_version.clone(),
            types: Vec::new(),
            type_index: HashMap::new(),
            functions: Vec::new(),
            function_index: HashMap::new(),
        };

        for p in Primitive::ALL {
            catalog.register(TypeDef::new(
                TypeId(catalog.types.len()),
                p.name().to_string(),
                TypeKind::Primitive(p),
            ))?;
        }

        // Pass 1: allocate ids for every declared type.
        let mut records: Vec<(TypeId, &RecordConstruct)> = Vec::new();
        for construct in &bundle.constructs {
            match construct {
                ProgramConstruct::Enum(e) => {
                    if e.values.is_empty() {
                        return Err(CatalogError::EmptyEnum { name: e.id.clone() });
                    }
                    let mut def = TypeDef::new(
                        TypeId(catalog.types.len()),
                        e.id.clone(),
                        TypeKind::Enumeration(e.values.clone()),
                    );
                    def.label = e.label.clone();
                    catalog.register(def)?;
                }
                ProgramConstruct::Record(r) => {
                    let id = TypeId(catalog.types.len());
                    let mut def = TypeDef::new(id, r.id.clone(), TypeKind::Record);
                    def.label = r.label.clone();
                    def.is_abstract = r.is_abstract;
                    catalog.register(def)?;
                    records.push((id, r));
                }
                ProgramConstruct::Function(_) => {}
            }
        }

        // Pass 2: family links.
        for (id, r) in &records {
            if let Some(base) = &r.extends {
                let base_id = catalog.lookup(base).ok_or_else(|| {
                    CatalogError::UnknownTypeReference {
                        context: format!("type '{}' extends", r.id),
                        name: base.clone(),
                    }
                })?;
                if !catalog.types[base_id.0].is_record() {
                    return Err(CatalogError::InvalidExtension {
                        name: r.id.clone(),
                        base: base.clone(),
                    });
                }
                catalog.types[id.0].parent = Some(base_id);
            }
        }
        for (id, r) in &records {
            catalog.check_acyclic(*id, &r.id)?;
        }

        // Pass 3: flattened members and variant lists.
        let constructs: HashMap<TypeId, &RecordConstruct> = records.iter().copied().collect();
        for (id, r) in &records {
            let members = catalog.flatten_members(*id, &constructs)?;
            let member_index = members
                .iter()
                .enumerate()
                .map(|(i, m)| (m.name.clone(), i))
                .collect();
            let def = &mut catalog.types[id.0];
            def.members = members;
            def.member_index = member_index;

            let mut ancestor = catalog.types[id.0].parent;
            while let Some(a) = ancestor {
                catalog.types[a.0].variants.push(*id);
                ancestor = catalog.types[a.0].parent;
            }
            tracing::trace!(type_name = %r.id, "registered record type");
        }

        // Pass 4: decision functions, parsed against the finished type table.
        let mut functions = Vec::new();
        let mut seen = HashSet::new();
        for f in bundle.functions() {
            if !seen.insert(f.id.clone()) {
                return Err(CatalogError::DuplicateFunction { name: f.id.clone() });
            }
            functions.push(catalog.build_function(f)?);
        }
        catalog.function_index = functions
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), i))
            .collect();
        catalog.functions = functions;

        tracing::debug!(
            program = %catalog.id,
            version = %catalog.version,
            types = catalog.types.len(),
            functions = catalog.functions.len(),
            "catalog built"
        );
        Ok(catalog)
    }

    fn register(&mut self, def: TypeDef) -> Result<(), CatalogError> {
        if self.type_index.contains_key(&def.name) {
            return Err(CatalogError::DuplicateType { name: def.name });
        }
        self.type_index.insert(def.name.clone(), def.id);
        self.types.push(def);
        Ok(())
    }

    fn lookup(&self, name: &str) -> Option<TypeId> {
        self.type_index.get(name).copied()
    }

    fn check_acyclic(&self, start: TypeId, name: &str) -> Result<(), CatalogError> {
        let mut current = self.types[start.0].parent;
        let mut steps = 0;
        while let Some(id) = current {
            if id == start || steps > self.types.len() {
                return Err(CatalogError::ExtensionCycle {
                    name: name.to_string(),
                });
            }
            current = self.types[id.0].parent;
            steps += 1;
        }
        Ok(())
    }

    fn flatten_members(
        &self,
        id: TypeId,
        constructs: &HashMap<TypeId, &RecordConstruct>,
    ) -> Result<Vec<MemberSpec>, CatalogError> {
        let mut chain = vec![id];
        let mut ancestor = self.types[id.0].parent;
        while let Some(a) = ancestor {
            chain.push(a);
            ancestor = self.types[a.0].parent;
        }

        let owner = &self.types[id.0].name;
        let mut members: Vec<MemberSpec> = Vec::new();
        for link in chain.iter().rev() {
            let Some(construct) = constructs.get(link) else {
                continue;
            };
            for m in &construct.members {
                if members.iter().any(|existing| existing.name == m.name) {
                    return Err(CatalogError::DuplicateMember {
                        owner: owner.clone(),
                        member: m.name.clone(),
                    });
                }
                let type_id =
                    self.lookup(&m.type_name)
                        .ok_or_else(|| CatalogError::UnknownTypeReference {
                            context: format!("type '{}' member '{}'", construct.id, m.name),
                            name: m.type_name.clone(),
                        })?;
                if m.collection && !self.types[type_id.0].is_record() {
                    return Err(CatalogError::ScalarCollection {
                        owner: construct.id.clone(),
                        member: m.name.clone(),
                        element: m.type_name.clone(),
                    });
                }
                members.push(MemberSpec {
                    name: m.name.clone(),
                    type_id,
                    type_name: m.type_name.clone(),
                    cardinality: if m.collection {
                        Cardinality::Collection
                    } else {
                        Cardinality::Singular
                    },
                    required: m.required,
                });
            }
        }
        Ok(members)
    }

    fn build_function(
        &self,
        f: &lacuna_interchange::FunctionConstruct,
    ) -> Result<DecisionFunction, CatalogError> {
        let invalid = |message: String| CatalogError::InvalidFunction {
            function: f.id.clone(),
            message,
        };

        let mut parameters: Vec<Parameter> = Vec::with_capacity(f.parameters.len());
        for p in &f.parameters {
            if p.label.is_empty() || p.label.contains('.') {
                return Err(invalid(format!(
                    "parameter label '{}' must be non-empty and contain no '.'",
                    p.label
                )));
            }
            if parameters.iter().any(|existing| existing.label == p.label) {
                return Err(invalid(format!("duplicate parameter '{}'", p.label)));
            }
            let type_id =
                self.lookup(&p.type_name)
                    .ok_or_else(|| CatalogError::UnknownTypeReference {
                        context: format!("function '{}' parameter '{}'", f.id, p.label),
                        name: p.type_name.clone(),
                    })?;
            if !self.types[type_id.0].is_record() {
                return Err(invalid(format!(
                    "parameter '{}' must have a record type, got '{}'",
                    p.label, p.type_name
                )));
            }
            parameters.push(Parameter {
                label: p.label.clone(),
                type_id,
            });
        }

        let result_type =
            self.lookup(&f.result)
                .ok_or_else(|| CatalogError::UnknownTypeReference {
                    context: format!("function '{}' result", f.id),
                    name: f.result.clone(),
                })?;

        let body = parse_logic(&f.body, self).map_err(&invalid)?;
        let produce = parse_expr(&f.produce, self).map_err(&invalid)?;

        Ok(DecisionFunction {
            name: f.id.clone(),
            parameters,
            result_type,
            body,
            produce,
        })
    }

    // ── Lookups ─────────────────────────────────────────────────────

    /// Resolve a type by name.
    pub fn resolve(&self, name: &str) -> Result<&TypeDef, LookupError> {
        self.lookup(name)
            .map(|id| &self.types[id.0])
            .ok_or_else(|| LookupError::UnknownType {
                name: name.to_string(),
            })
    }

    /// Resolve a discriminator tag within a family.
    ///
    /// The tag must name a non-abstract type that is the family base
    /// itself or one of its descendants.
    pub fn resolve_variant(&self, family: TypeId, tag: &str) -> Result<&TypeDef, LookupError> {
        let unknown = || LookupError::UnknownVariant {
            family: self.types[family.0].name.clone(),
            tag: tag.to_string(),
        };
        let id = self.lookup(tag).ok_or_else(unknown)?;
        let def = &self.types[id.0];
        if def.is_abstract || !def.is_record() || !self.is_a(id, family) {
            return Err(unknown());
        }
        Ok(def)
    }

    /// Get a type by id. Ids are only minted by this catalog.
    pub fn get(&self, id: TypeId) -> &TypeDef {
        &self.types[id.0]
    }

    pub fn type_name(&self, id: TypeId) -> &str {
        &self.types[id.0].name
    }

    pub(crate) fn type_id(&self, name: &str) -> Option<TypeId> {
        self.lookup(name)
    }

    /// Whether `ty` is `ancestor` or one of its descendants.
    pub fn is_a(&self, ty: TypeId, ancestor: TypeId) -> bool {
        let mut current = Some(ty);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.types[id.0].parent;
        }
        false
    }

    /// Look up a decision function by name in O(1) via the index.
    pub fn function(&self, name: &str) -> Option<&DecisionFunction> {
        self.function_index.get(name).map(|&i| &self.functions[i])
    }

    pub fn functions(&self) -> impl Iterator<Item = &DecisionFunction> {
        self.functions.iter()
    }

    /// Human-readable name for a type name, falling back to the name itself.
    pub fn display_name<'a>(&'a self, name: &'a str) -> &'a str {
        match self.lookup(name) {
            Some(id) => self.types[id.0].display_name(),
            None => name,
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn program(constructs: Vec<serde_json::Value>) -> serde_json::Value {
        json!({"id": "catalog-test", "kind": "Program", "constructs": constructs})
    }

    fn family() -> Vec<serde_json::Value> {
        vec![
            json!({"kind": "Enum", "id": "demo.config.Scaling", "values": ["Manual", "Auto"]}),
            json!({"kind": "Type", "id": "demo.config.Cluster", "abstract": true,
                   "members": [{"name": "region", "type": "String"}]}),
            json!({"kind": "Type", "id": "demo.config.DedicatedCluster", "extends": "demo.config.Cluster",
                   "label": "dedicated cluster",
                   "members": [{"name": "scaling", "type": "demo.config.Scaling", "required": true}]}),
            json!({"kind": "Type", "id": "demo.config.SharedCluster", "extends": "demo.config.Cluster",
                   "members": [{"name": "partitions", "type": "Integer", "required": true}]}),
        ]
    }

    #[test]
    fn builds_family_with_inherited_members() {
        let catalog = Catalog::from_interchange(&program(family())).unwrap();
        let dedicated = catalog.resolve("demo.config.DedicatedCluster").unwrap();
        let names: Vec<&str> = dedicated.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["region", "scaling"]);
        assert!(dedicated.member("scaling").unwrap().required);
        assert!(!dedicated.is_polymorphic());

        let cluster = catalog.resolve("demo.config.Cluster").unwrap();
        assert!(cluster.is_polymorphic());
        assert_eq!(cluster.variants.len(), 2);
        assert_eq!(catalog.get(cluster.variants[0]).name, "demo.config.DedicatedCluster");
    }

    #[test]
    fn resolve_variant_rules() {
        let catalog = Catalog::from_interchange(&program(family())).unwrap();
        let cluster = catalog.type_id("demo.config.Cluster").unwrap();
        assert!(catalog
            .resolve_variant(cluster, "demo.config.SharedCluster")
            .is_ok());
        // Abstract base cannot be a concrete tag.
        assert!(matches!(
            catalog.resolve_variant(cluster, "demo.config.Cluster"),
            Err(LookupError::UnknownVariant { .. })
        ));
        // Not in the family.
        assert!(catalog
            .resolve_variant(cluster, "demo.config.Scaling")
            .is_err());
        assert!(catalog.resolve_variant(cluster, "Nope").is_err());
    }

    #[test]
    fn resolve_unknown_type() {
        let catalog = Catalog::from_interchange(&program(vec![])).unwrap();
        assert!(catalog.resolve("Integer").is_ok());
        assert_eq!(
            catalog.resolve("demo.Missing").unwrap_err(),
            LookupError::UnknownType {
                name: "demo.Missing".to_string()
            }
        );
    }

    #[test]
    fn display_names() {
        let catalog = Catalog::from_interchange(&program(family())).unwrap();
        assert_eq!(
            catalog.display_name("demo.config.DedicatedCluster"),
            "dedicated cluster"
        );
        assert_eq!(catalog.display_name("demo.config.SharedCluster"), "SharedCluster");
        assert_eq!(catalog.display_name("not.registered"), "not.registered");
    }

    #[test]
    fn rejects_unknown_member_type() {
        let err = Catalog::from_interchange(&program(vec![json!({
            "kind": "Type", "id": "T", "members": [{"name": "x", "type": "Nope"}]
        })]))
        .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownTypeReference { .. }));
    }

    #[test]
    fn rejects_duplicate_types() {
        let err = Catalog::from_interchange(&program(vec![
            json!({"kind": "Type", "id": "T"}),
            json!({"kind": "Enum", "id": "T", "values": ["a"]}),
        ]))
        .unwrap_err();
        assert_eq!(err, CatalogError::DuplicateType { name: "T".to_string() });
    }

    #[test]
    fn rejects_shadowing_primitive() {
        let err = Catalog::from_interchange(&program(vec![json!({"kind": "Type", "id": "String"})]))
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateType { .. }));
    }

    #[test]
    fn rejects_extension_cycle() {
        let err = Catalog::from_interchange(&program(vec![
            json!({"kind": "Type", "id": "A", "extends": "B"}),
            json!({"kind": "Type", "id": "B", "extends": "A"}),
        ]))
        .unwrap_err();
        assert!(matches!(err, CatalogError::ExtensionCycle { .. }));
    }

    #[test]
    fn rejects_extending_enum() {
        let err = Catalog::from_interchange(&program(vec![
            json!({"kind": "Enum", "id": "E", "values": ["a"]}),
            json!({"kind": "Type", "id": "A", "extends": "E"}),
        ]))
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidExtension { .. }));
    }

    #[test]
    fn rejects_redeclared_inherited_member() {
        let err = Catalog::from_interchange(&program(vec![
            json!({"kind": "Type", "id": "A", "members": [{"name": "x", "type": "String"}]}),
            json!({"kind": "Type", "id": "B", "extends": "A", "members": [{"name": "x", "type": "Integer"}]}),
        ]))
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateMember { .. }));
    }

    #[test]
    fn rejects_empty_enum_and_scalar_collection() {
        let err = Catalog::from_interchange(&program(vec![
            json!({"kind": "Enum", "id": "E", "values": []}),
        ]))
        .unwrap_err();
        assert!(matches!(err, CatalogError::EmptyEnum { .. }));

        let err = Catalog::from_interchange(&program(vec![json!({
            "kind": "Type", "id": "T",
            "members": [{"name": "tags", "type": "String", "collection": true}]
        })]))
        .unwrap_err();
        assert!(matches!(err, CatalogError::ScalarCollection { .. }));
    }

    #[test]
    fn builds_function() {
        let mut constructs = family();
        constructs.push(json!({"kind": "Type", "id": "demo.config.Configuration",
            "members": [{"name": "cluster", "type": "demo.config.Cluster", "required": true}]}));
        constructs.push(json!({
            "kind": "Function", "id": "pick",
            "parameters": [{"label": "the configuration", "type": "demo.config.Configuration"}],
            "result": "Boolean",
            "body": [{"match": "the configuration.cluster",
                      "arms": [{"variant": "demo.config.DedicatedCluster",
                                "then": [{"require": "the configuration.cluster.scaling"}]}]}],
            "produce": {"literal": true}
        }));
        let catalog = Catalog::from_interchange(&program(constructs)).unwrap();
        let f = catalog.function("pick").unwrap();
        assert_eq!(f.parameters[0].label, "the configuration");
        assert_eq!(catalog.type_name(f.result_type), "Boolean");
        assert_eq!(f.body.len(), 1);
        assert!(catalog.function("other").is_none());
    }

    #[test]
    fn rejects_bad_functions() {
        let base = json!({"kind": "Type", "id": "R"});
        let cases = vec![
            json!({"kind": "Function", "id": "f", "parameters": [{"label": "a.b", "type": "R"}],
                   "result": "Boolean", "produce": {"literal": true}}),
            json!({"kind": "Function", "id": "f", "parameters": [{"label": "a", "type": "Integer"}],
                   "result": "Boolean", "produce": {"literal": true}}),
            json!({"kind": "Function", "id": "f", "parameters": [],
                   "result": "Boolean", "body": [{"match": "a.b", "arms": [{"variant": "Nope", "then": []}]}],
                   "produce": {"literal": true}}),
            json!({"kind": "Function", "id": "f", "parameters": [],
                   "result": "Boolean", "produce": {"bogus": 1}}),
        ];
        for case in cases {
            let err = Catalog::from_interchange(&program(vec![base.clone(), case.clone()]));
            assert!(
                matches!(err, Err(CatalogError::InvalidFunction { .. })),
                "expected InvalidFunction for {}, got {:?}",
                case,
                err
            );
        }

        let err = Catalog::from_interchange(&program(vec![json!({
            "kind": "Function", "id": "f", "result": "Nope", "produce": {"literal": 1}
        })]))
        .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownTypeReference { .. }));
    }

    #[test]
    fn rejects_duplicate_function() {
        let f = json!({"kind": "Function", "id": "f", "result": "Boolean", "produce": {"literal": true}});
        let err = Catalog::from_interchange(&program(vec![f.clone(), f])).unwrap_err();
        assert_eq!(err, CatalogError::DuplicateFunction { name: "f".to_string() });
    }

    #[test]
    fn catalog_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Catalog>();
    }
}
