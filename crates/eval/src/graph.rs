//! Partial value graph assembly from a caller payload.
//!
//! Every declared member of a composite gets a node: supplied values become
//! `Present`, anything not mentioned (or `null`) becomes `Missing`. Only
//! malformed input fails, as a [`PreEvaluationError`].

use std::collections::BTreeMap;

use crate::types::values::{number_decimal, DISCRIMINATOR};
use crate::types::{
    json_type_name, Catalog, DecisionFunction, MemberSpec, PreEvaluationError, Primitive,
    TypeId, TypeKind, Value,
};

/// A slot in the graph.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueNode {
    Present(Concrete),
    Missing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Concrete {
    Scalar(Value),
    Composite(Composite),
    /// Collection elements in payload order. Untagged polymorphic
    /// elements stay in place as `Missing` so indices match the payload.
    Sequence(Vec<ValueNode>),
}

/// A composite with its concrete type and one node per declared member.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    pub type_id: TypeId,
    pub members: BTreeMap<String, ValueNode>,
}

/// A function parameter bound to its composite.
#[derive(Debug, Clone, PartialEq)]
pub struct Root {
    pub label: String,
    /// Always `Concrete::Composite`.
    pub node: Concrete,
}

/// The graph for one evaluation call.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueGraph {
    pub roots: Vec<Root>,
}

impl ValueGraph {
    pub fn root(&self, label: &str) -> Option<&Composite> {
        match &self.roots.iter().find(|r| r.label == label)?.node {
            Concrete::Composite(c) => Some(c),
            _ => None,
        }
    }

    /// Navigate a path without recording anything.
    ///
    /// A root-only path yields the parameter's composite. Returns `None`
    /// when any segment is missing or does not exist. Numeric segments
    /// index into collections.
    pub fn get(&self, path: &crate::types::FieldPath) -> Option<&Concrete> {
        let mut current = &self.roots.iter().find(|r| r.label == path.root)?.node;
        for segment in &path.members {
            let next = match current {
                Concrete::Composite(c) => c.members.get(segment)?,
                Concrete::Sequence(items) => items.get(segment.parse::<usize>().ok()?)?,
                Concrete::Scalar(_) => return None,
            };
            current = match next {
                ValueNode::Present(c) => c,
                ValueNode::Missing => return None,
            };
        }
        Some(current)
    }
}

/// Build the value graph for `function` from a payload keyed by parameter label.
pub fn build_graph(
    catalog: &Catalog,
    function: &DecisionFunction,
    payload: &serde_json::Value,
) -> Result<ValueGraph, PreEvaluationError> {
    let obj = payload
        .as_object()
        .ok_or_else(|| PreEvaluationError::MalformedPayload {
            got: json_type_name(payload).to_string(),
        })?;

    let builder = GraphBuilder { catalog };
    let mut roots = Vec::with_capacity(function.parameters.len());
    for param in &function.parameters {
        let raw = match obj.get(&param.label) {
            None | Some(serde_json::Value::Null) => {
                return Err(PreEvaluationError::MissingParameter {
                    function: function.name.clone(),
                    parameter: param.label.clone(),
                })
            }
            Some(v) => v,
        };
        let node = builder.composite(&param.label, param.type_id, raw)?.ok_or_else(|| {
            let slot = catalog.get(param.type_id);
            PreEvaluationError::TypeMismatch {
                path: param.label.clone(),
                expected: format!("a '{}' tag naming a variant of {}", DISCRIMINATOR, slot.name),
                got: "untagged object".to_string(),
            }
        })?;
        roots.push(Root {
            label: param.label.clone(),
            node: Concrete::Composite(node),
        });
    }

    for key in obj.keys() {
        if function.parameter(key).is_none() {
            tracing::debug!(key = %key, "ignoring payload entry that is not a parameter");
        }
    }

    Ok(ValueGraph { roots })
}

struct GraphBuilder<'c> {
    catalog: &'c Catalog,
}

impl GraphBuilder<'_> {
    /// Build a composite for a slot of type `slot`.
    ///
    /// `Ok(None)` means the slot is polymorphic and no tag was supplied.
    fn composite(
        &self,
        path: &str,
        slot: TypeId,
        raw: &serde_json::Value,
    ) -> Result<Option<Composite>, PreEvaluationError> {
        let slot_def = self.catalog.get(slot);
        let obj = raw
            .as_object()
            .ok_or_else(|| PreEvaluationError::TypeMismatch {
                path: path.to_string(),
                expected: slot_def.name.clone(),
                got: json_type_name(raw).to_string(),
            })?;

        let concrete = match obj.get(DISCRIMINATOR) {
            Some(serde_json::Value::String(tag)) => self
                .catalog
                .resolve_variant(slot, tag)
                .map_err(|_| PreEvaluationError::UnknownVariant {
                    path: path.to_string(),
                    family: slot_def.name.clone(),
                    tag: tag.clone(),
                })?
                .id,
            Some(other) => {
                return Err(PreEvaluationError::TypeMismatch {
                    path: format!("{}.{}", path, DISCRIMINATOR),
                    expected: "string".to_string(),
                    got: json_type_name(other).to_string(),
                })
            }
            None if slot_def.is_polymorphic() => {
                tracing::debug!(path, family = %slot_def.name, "untagged polymorphic value");
                return Ok(None);
            }
            None => slot,
        };

        let def = self.catalog.get(concrete);
        let mut members = BTreeMap::new();
        for spec in &def.members {
            let member_path = format!("{}.{}", path, spec.name);
            let node = self.member(&member_path, spec, obj.get(&spec.name))?;
            members.insert(spec.name.clone(), node);
        }
        for key in obj.keys() {
            if key != DISCRIMINATOR && def.member(key).is_none() {
                tracing::debug!(path, key = %key, type_name = %def.name, "ignoring undeclared field");
            }
        }

        Ok(Some(Composite {
            type_id: concrete,
            members,
        }))
    }

    fn member(
        &self,
        path: &str,
        spec: &MemberSpec,
        raw: Option<&serde_json::Value>,
    ) -> Result<ValueNode, PreEvaluationError> {
        let raw = match raw {
            None | Some(serde_json::Value::Null) => return Ok(ValueNode::Missing),
            Some(v) => v,
        };

        if spec.is_collection() {
            let items = raw
                .as_array()
                .ok_or_else(|| PreEvaluationError::TypeMismatch {
                    path: path.to_string(),
                    expected: format!("array of {}", spec.type_name),
                    got: json_type_name(raw).to_string(),
                })?;
            let mut elements = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let element_path = format!("{}.{}", path, i);
                let node = if item.is_null() {
                    ValueNode::Missing
                } else {
                    match self.composite(&element_path, spec.type_id, item)? {
                        Some(c) => ValueNode::Present(Concrete::Composite(c)),
                        None => ValueNode::Missing,
                    }
                };
                elements.push(node);
            }
            if elements.iter().all(|e| *e == ValueNode::Missing) {
                return Ok(ValueNode::Missing);
            }
            return Ok(ValueNode::Present(Concrete::Sequence(elements)));
        }

        let def = self.catalog.get(spec.type_id);
        match &def.kind {
            TypeKind::Primitive(p) => Ok(ValueNode::Present(Concrete::Scalar(scalar(
                path, *p, raw,
            )?))),
            TypeKind::Enumeration(values) => {
                let s = raw.as_str().ok_or_else(|| PreEvaluationError::TypeMismatch {
                    path: path.to_string(),
                    expected: def.name.clone(),
                    got: json_type_name(raw).to_string(),
                })?;
                if !values.iter().any(|v| v == s) {
                    return Err(PreEvaluationError::InvalidEnumValue {
                        path: path.to_string(),
                        enum_type: def.name.clone(),
                        value: s.to_string(),
                        allowed: values.clone(),
                    });
                }
                Ok(ValueNode::Present(Concrete::Scalar(Value::Enum(
                    s.to_string(),
                ))))
            }
            TypeKind::Record => Ok(match self.composite(path, spec.type_id, raw)? {
                Some(c) => ValueNode::Present(Concrete::Composite(c)),
                None => ValueNode::Missing,
            }),
        }
    }
}

fn scalar(path: &str, p: Primitive, raw: &serde_json::Value) -> Result<Value, PreEvaluationError> {
    let value = match p {
        Primitive::Boolean => raw.as_bool().map(Value::Bool),
        Primitive::Integer => raw.as_i64().map(Value::Int),
        Primitive::Decimal => number_decimal(raw).map(Value::Decimal),
        Primitive::String => raw.as_str().map(|s| Value::Text(s.to_string())),
    };
    value.ok_or_else(|| PreEvaluationError::TypeMismatch {
        path: path.to_string(),
        expected: p.name().to_string(),
        got: json_type_name(raw).to_string(),
    })
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
