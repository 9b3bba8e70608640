//! Parsing of logic trees and expressions from program JSON.
//!
//! Type names inside logic (match arms, `variant_of`, `record`, typed
//! literals) are resolved against the catalog under construction, so a
//! parsed tree carries only [`TypeId`]s.

use super::catalog::{Catalog, TypeId, TypeKind};
use super::values::{infer_literal, typed_literal};
use super::{Expr, FieldPath, LogicNode};

fn path_field(v: &serde_json::Value, key: &str) -> Result<FieldPath, String> {
    let s = v
        .get(key)
        .and_then(|p| p.as_str())
        .ok_or_else(|| format!("'{}' must be a field path string", key))?;
    FieldPath::parse(s)
}

fn str_field<'a>(v: &'a serde_json::Value, key: &str, node: &str) -> Result<&'a str, String> {
    v.get(key)
        .and_then(|s| s.as_str())
        .ok_or_else(|| format!("{} missing '{}'", node, key))
}

fn nodes_field(
    v: &serde_json::Value,
    key: &str,
    node: &str,
    catalog: &Catalog,
) -> Result<Vec<LogicNode>, String> {
    match v.get(key) {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(serde_json::Value::Array(items)) => parse_logic(items, catalog),
        Some(_) => Err(format!("{} '{}' must be an array of logic nodes", node, key)),
    }
}

fn expr_field(
    v: &serde_json::Value,
    key: &str,
    node: &str,
    catalog: &Catalog,
) -> Result<Expr, String> {
    let e = v
        .get(key)
        .ok_or_else(|| format!("{} missing '{}'", node, key))?;
    parse_expr(e, catalog)
}

fn record_type(catalog: &Catalog, name: &str, context: &str) -> Result<TypeId, String> {
    let id = catalog
        .type_id(name)
        .ok_or_else(|| format!("{} names unknown type '{}'", context, name))?;
    if catalog.get(id).kind != TypeKind::Record {
        return Err(format!("{} names non-record type '{}'", context, name));
    }
    Ok(id)
}

/// Parse an array of logic nodes.
pub fn parse_logic(
    nodes: &[serde_json::Value],
    catalog: &Catalog,
) -> Result<Vec<LogicNode>, String> {
    nodes.iter().map(|n| parse_node(n, catalog)).collect()
}

fn parse_node(v: &serde_json::Value, catalog: &Catalog) -> Result<LogicNode, String> {
    if v.get("require").is_some() {
        return Ok(LogicNode::Require(path_field(v, "require")?));
    }

    if let Some(cond) = v.get("gate") {
        return Ok(LogicNode::Gate {
            condition: parse_expr(cond, catalog)?,
            then: nodes_field(v, "then", "gate", catalog)?,
            otherwise: nodes_field(v, "else", "gate", catalog)?,
        });
    }

    if v.get("switch").is_some() {
        let path = path_field(v, "switch")?;
        let mut cases = Vec::new();
        if let Some(raw) = v.get("cases") {
            let arr = raw
                .as_array()
                .ok_or_else(|| "switch 'cases' must be an array".to_string())?;
            for case in arr {
                let value = case
                    .get("value")
                    .ok_or_else(|| "switch case missing 'value'".to_string())?;
                cases.push((
                    infer_literal(value)?,
                    nodes_field(case, "then", "switch case", catalog)?,
                ));
            }
        }
        return Ok(LogicNode::Switch {
            path,
            cases,
            otherwise: nodes_field(v, "otherwise", "switch", catalog)?,
        });
    }

    if v.get("match").is_some() {
        let path = path_field(v, "match")?;
        let mut arms = Vec::new();
        if let Some(raw) = v.get("arms") {
            let arr = raw
                .as_array()
                .ok_or_else(|| "match 'arms' must be an array".to_string())?;
            for arm in arr {
                let name = str_field(arm, "variant", "match arm")?;
                let id = record_type(catalog, name, "match arm")?;
                arms.push((id, nodes_field(arm, "then", "match arm", catalog)?));
            }
        }
        return Ok(LogicNode::Match {
            path,
            arms,
            otherwise: nodes_field(v, "otherwise", "match", catalog)?,
        });
    }

    if v.get("each").is_some() {
        return Ok(LogicNode::Each {
            path: path_field(v, "each")?,
            variable: str_field(v, "as", "each")?.to_string(),
            body: nodes_field(v, "do", "each", catalog)?,
        });
    }

    Err(format!("unknown logic node: {}", v))
}

/// Parse an expression.
pub fn parse_expr(v: &serde_json::Value, catalog: &Catalog) -> Result<Expr, String> {
    if v.get("field_ref").is_some() {
        return Ok(Expr::FieldRef(path_field(v, "field_ref")?));
    }

    if v.get("present").is_some() {
        return Ok(Expr::Present(path_field(v, "present")?));
    }

    if v.get("count").is_some() {
        return Ok(Expr::Count(path_field(v, "count")?));
    }

    if v.get("variant_of").is_some() {
        let path = path_field(v, "variant_of")?;
        let name = str_field(v, "variant", "variant_of")?;
        return Ok(Expr::VariantOf {
            path,
            variant: record_type(catalog, name, "variant_of")?,
        });
    }

    // Operators are checked before literals.
    if let Some(op_val) = v.get("op") {
        let op = op_val
            .as_str()
            .ok_or_else(|| "'op' must be a string".to_string())?;
        return match op {
            "and" => Ok(Expr::And {
                left: Box::new(expr_field(v, "left", "and", catalog)?),
                right: Box::new(expr_field(v, "right", "and", catalog)?),
            }),
            "or" => Ok(Expr::Or {
                left: Box::new(expr_field(v, "left", "or", catalog)?),
                right: Box::new(expr_field(v, "right", "or", catalog)?),
            }),
            "not" => Ok(Expr::Not {
                operand: Box::new(expr_field(v, "operand", "not", catalog)?),
            }),
            "=" | "!=" | "<" | "<=" | ">" | ">=" => Ok(Expr::Compare {
                left: Box::new(expr_field(v, "left", "compare", catalog)?),
                op: op.to_string(),
                right: Box::new(expr_field(v, "right", "compare", catalog)?),
            }),
            _ => Err(format!("unknown operator: {}", op)),
        };
    }

    if let Some(lit) = v.get("literal") {
        let value = match v.get("type").and_then(|t| t.as_str()) {
            None => infer_literal(lit)?,
            Some(type_name) => {
                let id = catalog
                    .type_id(type_name)
                    .ok_or_else(|| format!("literal names unknown type '{}'", type_name))?;
                let def = catalog.get(id);
                match &def.kind {
                    TypeKind::Record => {
                        return Err(format!("literal cannot have record type '{}'", type_name))
                    }
                    TypeKind::Enumeration(values) => {
                        let parsed = typed_literal(lit, type_name)?;
                        if let super::Value::Enum(s) = &parsed {
                            if !values.contains(s) {
                                return Err(format!(
                                    "'{}' is not a value of enum '{}'",
                                    s, type_name
                                ));
                            }
                        }
                        parsed
                    }
                    TypeKind::Primitive(_) => typed_literal(lit, type_name)?,
                }
            }
        };
        return Ok(Expr::Literal(value));
    }

    if let Some(q) = v.get("quantifier") {
        let quantifier = q
            .as_str()
            .ok_or_else(|| "'quantifier' must be a string".to_string())?;
        let variable = str_field(v, "variable", "quantifier")?.to_string();
        let domain = path_field(v, "domain")?;
        let body = Box::new(expr_field(v, "body", "quantifier", catalog)?);
        return match quantifier {
            "exists" => Ok(Expr::Exists {
                variable,
                domain,
                body,
            }),
            "forall" => Ok(Expr::Forall {
                variable,
                domain,
                body,
            }),
            _ => Err(format!("unknown quantifier: {}", quantifier)),
        };
    }

    if v.get("record").is_some() {
        let name = str_field(v, "record", "record")?;
        let type_id = record_type(catalog, name, "record")?;
        let def = catalog.get(type_id);
        if def.is_abstract {
            return Err(format!("record expression builds abstract type '{}'", name));
        }
        let mut fields = Vec::new();
        if let Some(raw) = v.get("fields") {
            let obj = raw
                .as_object()
                .ok_or_else(|| "record 'fields' must be an object".to_string())?;
            for (member, e) in obj {
                if def.member(member).is_none() {
                    return Err(format!("type '{}' declares no member '{}'", name, member));
                }
                fields.push((member.clone(), parse_expr(e, catalog)?));
            }
        }
        return Ok(Expr::Record { type_id, fields });
    }

    if let Some(cond) = v.get("if") {
        return Ok(Expr::If {
            condition: Box::new(parse_expr(cond, catalog)?),
            then: Box::new(expr_field(v, "then", "if", catalog)?),
            otherwise: Box::new(expr_field(v, "else", "if", catalog)?),
        });
    }

    Err(format!("unknown expression: {}", v))
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;
    use serde_json::json;

    fn catalog() -> Catalog {
        Catalog::from_interchange(&json!({
            "id": "logic-test",
            "constructs": [
                {"kind": "Enum", "id": "Scaling", "values": ["Manual", "Auto"]},
                {"kind": "Type", "id": "Cluster", "abstract": true},
                {"kind": "Type", "id": "Dedicated", "extends": "Cluster",
                 "members": [{"name": "nodes", "type": "Integer", "required": true}]}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn parses_nested_logic() {
        let c = catalog();
        let nodes = vec![
            json!({"require": "req.cloud"}),
            json!({"gate": {"field_ref": "req.dedicated"},
                   "then": [{"match": "conf.cluster",
                             "arms": [{"variant": "Dedicated", "then": [{"require": "conf.cluster.nodes"}]}],
                             "otherwise": []}]}),
            json!({"switch": "req.cloud", "cases": [{"value": "AWS", "then": []}]}),
            json!({"each": "conf.cluster.parts", "as": "part", "do": [{"require": "part.email"}]}),
        ];
        let parsed = parse_logic(&nodes, &c).unwrap();
        assert_eq!(parsed.len(), 4);
        assert_eq!(
            parsed[0],
            LogicNode::Require(FieldPath::parse("req.cloud").unwrap())
        );
        match &parsed[1] {
            LogicNode::Gate {
                then, otherwise, ..
            } => {
                assert_eq!(then.len(), 1);
                assert!(otherwise.is_empty());
            }
            other => panic!("expected gate, got {:?}", other),
        }
        match &parsed[2] {
            LogicNode::Switch { cases, .. } => {
                assert_eq!(cases[0].0, Value::Text("AWS".to_string()))
            }
            other => panic!("expected switch, got {:?}", other),
        }
        assert!(matches!(&parsed[3], LogicNode::Each { variable, .. } if variable == "part"));
    }

    #[test]
    fn op_checked_before_literal() {
        let c = catalog();
        let e = parse_expr(
            &json!({"op": "=", "left": {"field_ref": "a.b"}, "right": {"literal": 6}, "literal": 1}),
            &c,
        )
        .unwrap();
        assert!(matches!(e, Expr::Compare { ref op, .. } if op == "="));
    }

    #[test]
    fn typed_enum_literal_validated() {
        let c = catalog();
        assert_eq!(
            parse_expr(&json!({"literal": "Auto", "type": "Scaling"}), &c).unwrap(),
            Expr::Literal(Value::Enum("Auto".to_string()))
        );
        assert!(parse_expr(&json!({"literal": "Turbo", "type": "Scaling"}), &c).is_err());
        assert!(parse_expr(&json!({"literal": 1, "type": "Dedicated"}), &c).is_err());
    }

    #[test]
    fn record_expression_checks_members() {
        let c = catalog();
        let e = parse_expr(
            &json!({"record": "Dedicated", "fields": {"nodes": {"literal": 3}}}),
            &c,
        )
        .unwrap();
        assert!(matches!(e, Expr::Record { ref fields, .. } if fields.len() == 1));
        assert!(parse_expr(&json!({"record": "Dedicated", "fields": {"bogus": {"literal": 3}}}), &c)
            .is_err());
        assert!(parse_expr(&json!({"record": "Cluster"}), &c).is_err());
    }

    #[test]
    fn quantifier_and_if() {
        let c = catalog();
        let e = parse_expr(
            &json!({"quantifier": "exists", "variable": "x", "domain": "a.items",
                    "body": {"present": "x.email"}}),
            &c,
        )
        .unwrap();
        assert!(matches!(e, Expr::Exists { .. }));
        let e = parse_expr(
            &json!({"if": {"literal": true}, "then": {"literal": 1}, "else": {"literal": 2}}),
            &c,
        )
        .unwrap();
        assert!(matches!(e, Expr::If { .. }));
        assert!(parse_expr(&json!({"quantifier": "some", "variable": "x", "domain": "a.b", "body": {"literal": true}}), &c).is_err());
    }

    #[test]
    fn rejects_unknown_shapes() {
        let c = catalog();
        assert!(parse_logic(&[json!({"loop": "x"})], &c).is_err());
        assert!(parse_expr(&json!({"op": "xor", "left": {"literal": true}, "right": {"literal": true}}), &c).is_err());
        assert!(parse_expr(&json!({"field_ref": "a..b"}), &c).is_err());
        assert!(parse_logic(&[json!({"gate": {"literal": true}, "then": {"require": "a.b"}})], &c).is_err());
    }
}
