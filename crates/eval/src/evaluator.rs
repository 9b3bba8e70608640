//! Decision function evaluation over a partial value graph.
//!
//! The walk never aborts on missing data. A missing required read records a
//! diagnostic and makes everything gated on that value indeterminate: the
//! gated sub-tree is skipped, not explored. Diagnostics come out in
//! depth-first, left-to-right order of the logic tree.
//!
//! Expressions evaluate to one of three states:
//! - `Known(value)`
//! - `Absent`: an optional member was not supplied
//! - `Missing`: a required member was not supplied (already recorded)

use std::collections::BTreeMap;

use crate::diagnostics::DiagnosticCollector;
use crate::graph::{Composite, Concrete, ValueGraph, ValueNode};
use crate::numeric;
use crate::types::{
    Catalog, Completion, DecisionFunction, DecisionLogicError, Expr, FieldPath, LogicNode,
    MissingElement, Outcome, TypeId, TypeKind, Value,
};

/// How a path read treats missing segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadMode {
    /// `require`: every segment is required.
    Required,
    /// Expression read: segments follow the catalog's required flags.
    Declared,
    /// Presence probe: never records, missing reads as absent.
    Probe,
    /// Result expression: a missing required segment is a logic defect.
    Result,
}

#[derive(Debug, Clone, Copy)]
enum Slot<'a> {
    Composite(&'a Composite),
    Scalar(&'a Value),
    Sequence(&'a [ValueNode]),
}

#[derive(Debug)]
enum Resolved<'a> {
    Found { slot: Slot<'a>, label: String },
    Absent,
    Missing,
}

#[derive(Debug, Clone, PartialEq)]
enum Eval {
    Known(Value),
    Absent,
    Missing,
}

impl Eval {
    /// Truth value for gating: absent counts as false, missing is `None`.
    fn truth(&self) -> Result<Option<bool>, DecisionLogicError> {
        match self {
            Eval::Known(v) => v.as_bool().map(Some),
            Eval::Absent => Ok(Some(false)),
            Eval::Missing => Ok(None),
        }
    }
}

/// A variable bound by `each` or a quantifier.
#[derive(Debug)]
struct Binding<'a> {
    name: String,
    label: String,
    node: &'a Composite,
}

/// Evaluate a decision function against a graph built for it.
pub fn eval_function(
    catalog: &Catalog,
    function: &DecisionFunction,
    graph: &ValueGraph,
) -> Outcome {
    let mut evaluator = Evaluator {
        catalog,
        graph,
        bindings: Vec::new(),
        collector: DiagnosticCollector::new(),
    };
    match evaluator.run_function(function) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::debug!(function = %function.name, error = %e, "decision logic error");
            Outcome::DecisionLogicError(e)
        }
    }
}

struct Evaluator<'a> {
    catalog: &'a Catalog,
    graph: &'a ValueGraph,
    bindings: Vec<Binding<'a>>,
    collector: DiagnosticCollector,
}

impl<'a> Evaluator<'a> {
    fn run_function(&mut self, function: &DecisionFunction) -> Result<Outcome, DecisionLogicError> {
        self.run(&function.body)?;

        if self.collector.has_missing() {
            let missing = std::mem::take(&mut self.collector.missing);
            tracing::debug!(function = %function.name, count = missing.len(), "missing data");
            return Ok(Outcome::MissingData(missing));
        }

        let value = match self.eval(&function.produce, ReadMode::Result)? {
            Eval::Known(v) => v,
            Eval::Absent => {
                return Err(DecisionLogicError::ResultTypeMismatch {
                    expected: self.catalog.type_name(function.result_type).to_string(),
                    got: "absent value".to_string(),
                })
            }
            // Result reads of missing required data error out before this point.
            Eval::Missing => {
                return Err(DecisionLogicError::TypeError {
                    message: "result expression is indeterminate".to_string(),
                })
            }
        };
        let value = self.conform(value, function.result_type)?;

        Ok(Outcome::Completed(Completion {
            value,
            fields_read: std::mem::take(&mut self.collector.fields_read),
        }))
    }

    // ── Logic nodes ─────────────────────────────────────────────────

    fn run(&mut self, nodes: &[LogicNode]) -> Result<(), DecisionLogicError> {
        for node in nodes {
            self.run_node(node)?;
        }
        Ok(())
    }

    fn run_node(&mut self, node: &LogicNode) -> Result<(), DecisionLogicError> {
        match node {
            LogicNode::Require(path) => {
                self.resolve(path, ReadMode::Required)?;
                Ok(())
            }

            LogicNode::Gate {
                condition,
                then,
                otherwise,
            } => match self.eval(condition, ReadMode::Declared)?.truth()? {
                Some(true) => self.run(then),
                Some(false) => self.run(otherwise),
                None => {
                    tracing::debug!("gate condition indeterminate; branches skipped");
                    Ok(())
                }
            },

            LogicNode::Switch {
                path,
                cases,
                otherwise,
            } => match self.resolve(path, ReadMode::Declared)? {
                Resolved::Missing => Ok(()),
                Resolved::Absent => self.run(otherwise),
                Resolved::Found {
                    slot: Slot::Scalar(value),
                    ..
                } => {
                    for (case, body) in cases {
                        if numeric::compare_values(value, case, "=")? {
                            return self.run(body);
                        }
                    }
                    self.run(otherwise)
                }
                Resolved::Found { .. } => Err(DecisionLogicError::TypeError {
                    message: format!("switch on '{}', which is not a scalar", path),
                }),
            },

            LogicNode::Match {
                path,
                arms,
                otherwise,
            } => match self.resolve(path, ReadMode::Declared)? {
                Resolved::Missing => Ok(()),
                Resolved::Absent => self.run(otherwise),
                Resolved::Found {
                    slot: Slot::Composite(c),
                    ..
                } => {
                    let concrete = c.type_id;
                    for (variant, body) in arms {
                        if self.catalog.is_a(concrete, *variant) {
                            tracing::trace!(
                                path = %path,
                                variant = %self.catalog.type_name(concrete),
                                "match arm selected"
                            );
                            return self.run(body);
                        }
                    }
                    self.run(otherwise)
                }
                Resolved::Found { .. } => Err(DecisionLogicError::TypeError {
                    message: format!("match on '{}', which is not a composite", path),
                }),
            },

            LogicNode::Each {
                path,
                variable,
                body,
            } => match self.resolve(path, ReadMode::Declared)? {
                Resolved::Missing | Resolved::Absent => Ok(()),
                Resolved::Found {
                    slot: Slot::Sequence(items),
                    label,
                } => {
                    for (i, item) in items.iter().enumerate() {
                        if let ValueNode::Present(Concrete::Composite(c)) = item {
                            self.bindings.push(Binding {
                                name: variable.clone(),
                                label: format!("{}.{}", label, i),
                                node: c,
                            });
                            let result = self.run(body);
                            self.bindings.pop();
                            result?;
                        }
                    }
                    Ok(())
                }
                Resolved::Found { .. } => Err(DecisionLogicError::TypeError {
                    message: format!("each over '{}', which is not a collection", path),
                }),
            },
        }
    }

    // ── Path resolution ─────────────────────────────────────────────

    fn lookup_root(&self, path: &FieldPath) -> Result<(String, &'a Composite), DecisionLogicError> {
        if let Some(b) = self.bindings.iter().rev().find(|b| b.name == path.root) {
            return Ok((b.label.clone(), b.node));
        }
        let graph: &'a ValueGraph = self.graph;
        graph
            .root(&path.root)
            .map(|c| (path.root.clone(), c))
            .ok_or_else(|| DecisionLogicError::UnknownRoot {
                path: path.to_string(),
                root: path.root.clone(),
            })
    }

    fn resolve(&mut self, path: &FieldPath, mode: ReadMode) -> Result<Resolved<'a>, DecisionLogicError> {
        let (mut label, root) = self.lookup_root(path)?;
        let mut current = Slot::Composite(root);

        for segment in &path.members {
            let composite = match current {
                Slot::Composite(c) => c,
                Slot::Scalar(_) => {
                    return Err(DecisionLogicError::NotNavigable {
                        path: path.to_string(),
                        segment: segment.clone(),
                        reason: "parent is a scalar value".to_string(),
                    })
                }
                Slot::Sequence(_) => {
                    return Err(DecisionLogicError::NotNavigable {
                        path: path.to_string(),
                        segment: segment.clone(),
                        reason: "parent is a collection; iterate it with each or a quantifier"
                            .to_string(),
                    })
                }
            };

            let def = self.catalog.get(composite.type_id);
            let spec = def
                .member(segment)
                .ok_or_else(|| DecisionLogicError::UnknownMember {
                    path: path.to_string(),
                    type_name: def.name.clone(),
                    member: segment.clone(),
                })?;

            match composite.members.get(segment) {
                Some(ValueNode::Present(c)) => {
                    current = match c {
                        Concrete::Scalar(v) => Slot::Scalar(v),
                        Concrete::Composite(c) => Slot::Composite(c),
                        Concrete::Sequence(items) => Slot::Sequence(items),
                    };
                    label = format!("{}.{}", label, segment);
                }
                Some(ValueNode::Missing) | None => {
                    let required = match mode {
                        ReadMode::Required => true,
                        ReadMode::Declared | ReadMode::Result => spec.required,
                        ReadMode::Probe => false,
                    };
                    if !required {
                        return Ok(Resolved::Absent);
                    }
                    if mode == ReadMode::Result {
                        return Err(DecisionLogicError::UnrequiredResultRead {
                            path: format!("{}.{}", label, segment),
                        });
                    }
                    tracing::trace!(target_label = %label, member = %segment, "missing required member");
                    self.collector.record_missing(MissingElement {
                        target: label,
                        target_type: def.name.clone(),
                        member: segment.clone(),
                        member_type: spec.type_name.clone(),
                        kind: spec.requirement_kind(),
                    });
                    return Ok(Resolved::Missing);
                }
            }
        }

        if mode != ReadMode::Probe {
            tracing::trace!(path = %label, "read");
            self.collector.record_read(&label);
        }
        Ok(Resolved::Found {
            slot: current,
            label,
        })
    }

    // ── Expressions ─────────────────────────────────────────────────

    fn eval(&mut self, expr: &Expr, mode: ReadMode) -> Result<Eval, DecisionLogicError> {
        match expr {
            Expr::Literal(v) => Ok(Eval::Known(v.clone())),

            Expr::FieldRef(path) => Ok(match self.resolve(path, mode)? {
                Resolved::Found { slot, .. } => Eval::Known(self.slot_value(slot)),
                Resolved::Absent => Eval::Absent,
                Resolved::Missing => Eval::Missing,
            }),

            Expr::Present(path) => Ok(Eval::Known(Value::Bool(matches!(
                self.resolve(path, ReadMode::Probe)?,
                Resolved::Found { .. }
            )))),

            Expr::VariantOf { path, variant } => match self.resolve(path, ReadMode::Probe)? {
                Resolved::Found {
                    slot: Slot::Composite(c),
                    ..
                } => Ok(Eval::Known(Value::Bool(self.catalog.is_a(c.type_id, *variant)))),
                Resolved::Found { .. } => Err(DecisionLogicError::TypeError {
                    message: format!("variant_of on '{}', which is not a composite", path),
                }),
                Resolved::Absent | Resolved::Missing => Ok(Eval::Known(Value::Bool(false))),
            },

            Expr::Count(path) => match self.resolve(path, mode)? {
                Resolved::Found {
                    slot: Slot::Sequence(items),
                    ..
                } => {
                    let n = items
                        .iter()
                        .filter(|i| matches!(i, ValueNode::Present(_)))
                        .count();
                    Ok(Eval::Known(Value::Int(n as i64)))
                }
                Resolved::Found { .. } => Err(DecisionLogicError::TypeError {
                    message: format!("count of '{}', which is not a collection", path),
                }),
                Resolved::Absent => Ok(Eval::Known(Value::Int(0))),
                Resolved::Missing => Ok(Eval::Missing),
            },

            Expr::Compare { left, op, right } => {
                let l = self.eval(left, mode)?;
                let r = self.eval(right, mode)?;
                match (l, r) {
                    (Eval::Known(l), Eval::Known(r)) => {
                        Ok(Eval::Known(Value::Bool(numeric::compare_values(&l, &r, op)?)))
                    }
                    (Eval::Missing, _) | (_, Eval::Missing) => Ok(Eval::Missing),
                    _ => Ok(Eval::Known(Value::Bool(false))),
                }
            }

            Expr::And { left, right } => match self.eval(left, mode)?.truth()? {
                None => Ok(Eval::Missing),
                Some(false) => Ok(Eval::Known(Value::Bool(false))),
                Some(true) => Ok(match self.eval(right, mode)?.truth()? {
                    None => Eval::Missing,
                    Some(b) => Eval::Known(Value::Bool(b)),
                }),
            },

            Expr::Or { left, right } => match self.eval(left, mode)?.truth()? {
                None => Ok(Eval::Missing),
                Some(true) => Ok(Eval::Known(Value::Bool(true))),
                Some(false) => Ok(match self.eval(right, mode)?.truth()? {
                    None => Eval::Missing,
                    Some(b) => Eval::Known(Value::Bool(b)),
                }),
            },

            Expr::Not { operand } => Ok(match self.eval(operand, mode)?.truth()? {
                None => Eval::Missing,
                Some(b) => Eval::Known(Value::Bool(!b)),
            }),

            Expr::Exists {
                variable,
                domain,
                body,
            } => self.quantify(variable, domain, body, mode, true),

            Expr::Forall {
                variable,
                domain,
                body,
            } => self.quantify(variable, domain, body, mode, false),

            Expr::Record { type_id, fields } => {
                let mut out = BTreeMap::new();
                for (name, e) in fields {
                    match self.eval(e, mode)? {
                        Eval::Known(v) => {
                            out.insert(name.clone(), v);
                        }
                        Eval::Absent => {}
                        Eval::Missing => return Ok(Eval::Missing),
                    }
                }
                Ok(Eval::Known(Value::Record {
                    type_name: self.catalog.type_name(*type_id).to_string(),
                    fields: out,
                }))
            }

            Expr::If {
                condition,
                then,
                otherwise,
            } => match self.eval(condition, mode)?.truth()? {
                None => Ok(Eval::Missing),
                Some(true) => self.eval(then, mode),
                Some(false) => self.eval(otherwise, mode),
            },
        }
    }

    /// `exists` stops at the first true body, `forall` at the first false
    /// one. A missing body stops iteration and makes the result missing.
    fn quantify(
        &mut self,
        variable: &str,
        domain: &FieldPath,
        body: &Expr,
        mode: ReadMode,
        existential: bool,
    ) -> Result<Eval, DecisionLogicError> {
        let (items, label) = match self.resolve(domain, mode)? {
            Resolved::Found {
                slot: Slot::Sequence(items),
                label,
            } => (items, label),
            Resolved::Found { .. } => {
                return Err(DecisionLogicError::TypeError {
                    message: format!("quantifier domain '{}' is not a collection", domain),
                })
            }
            Resolved::Absent => return Ok(Eval::Known(Value::Bool(!existential))),
            Resolved::Missing => return Ok(Eval::Missing),
        };

        for (i, item) in items.iter().enumerate() {
            let ValueNode::Present(Concrete::Composite(c)) = item else {
                continue;
            };
            self.bindings.push(Binding {
                name: variable.to_string(),
                label: format!("{}.{}", label, i),
                node: c,
            });
            let result = self.eval(body, mode).and_then(|r| r.truth());
            self.bindings.pop();
            match result? {
                None => return Ok(Eval::Missing),
                Some(b) if b == existential => return Ok(Eval::Known(Value::Bool(existential))),
                Some(_) => {}
            }
        }
        Ok(Eval::Known(Value::Bool(!existential)))
    }

    // ── Values ──────────────────────────────────────────────────────

    fn slot_value(&self, slot: Slot<'_>) -> Value {
        match slot {
            Slot::Scalar(v) => v.clone(),
            Slot::Composite(c) => self.composite_value(c),
            Slot::Sequence(items) => Value::List(
                items
                    .iter()
                    .filter_map(|i| match i {
                        ValueNode::Present(Concrete::Composite(c)) => Some(self.composite_value(c)),
                        _ => None,
                    })
                    .collect(),
            ),
        }
    }

    /// Present members only; missing ones are omitted.
    fn composite_value(&self, c: &Composite) -> Value {
        let fields = c
            .members
            .iter()
            .filter_map(|(name, node)| match node {
                ValueNode::Present(concrete) => {
                    let slot = match concrete {
                        Concrete::Scalar(v) => Slot::Scalar(v),
                        Concrete::Composite(c) => Slot::Composite(c),
                        Concrete::Sequence(items) => Slot::Sequence(items),
                    };
                    Some((name.clone(), self.slot_value(slot)))
                }
                ValueNode::Missing => None,
            })
            .collect();
        Value::Record {
            type_name: self.catalog.type_name(c.type_id).to_string(),
            fields,
        }
    }

    /// Check a produced value against the declared result type, promoting
    /// integers to decimals and strings to enum values where needed.
    fn conform(&self, value: Value, ty: TypeId) -> Result<Value, DecisionLogicError> {
        let def = self.catalog.get(ty);
        let mismatch = |got: &str| DecisionLogicError::ResultTypeMismatch {
            expected: def.name.clone(),
            got: got.to_string(),
        };
        match (&def.kind, value) {
            (TypeKind::Primitive(p), v) => match (p.name(), v) {
                ("Boolean", v @ Value::Bool(_))
                | ("Integer", v @ Value::Int(_))
                | ("Decimal", v @ Value::Decimal(_))
                | ("String", v @ Value::Text(_)) => Ok(v),
                ("Decimal", Value::Int(i)) => Ok(Value::Decimal(numeric::promote_int_to_decimal(i))),
                (_, v) => Err(mismatch(v.type_name())),
            },
            (TypeKind::Enumeration(values), Value::Enum(s) | Value::Text(s)) => {
                if values.contains(&s) {
                    Ok(Value::Enum(s))
                } else {
                    Err(mismatch(&format!("'{}'", s)))
                }
            }
            (TypeKind::Record, Value::Record { type_name, fields }) => {
                match self.catalog.type_id(&type_name) {
                    Some(actual) if self.catalog.is_a(actual, ty) => {
                        Ok(Value::Record { type_name, fields })
                    }
                    _ => Err(mismatch(&type_name)),
                }
            }
            (_, v) => Err(mismatch(v.type_name())),
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
