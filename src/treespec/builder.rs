//! Builds a [`Specs`] table from a [`Grammar`]: the treespec-inference pass
//! that turns rules into `TokenSpec`/`NodeSpec`/`VariantSpec`, grounded on
//! `grammar_to_specs`/`infer_type`/`get_fields`/`get_field_name` in the
//! source's `treespec.py`.

use std::collections::HashMap;

use crate::analysis::{is_fragment, is_skip_rule, is_static_token_rule, is_token_rule, is_variant_rule};
use crate::grammar::{ExprId, ExprKind, Grammar, Rule};

use super::types::{simplify_type, Field, NodeSpec, Spec, Specs, TokenSpec, Type, VariantSpec};

/// Runs inference over every non-fragment, non-skip rule in `grammar` and
/// returns the resulting spec table.
pub fn build_specs(grammar: &Grammar) -> Specs {
    let mut specs = Specs::new();
    for rule in &grammar.rules {
        if rule.is_extern() || is_fragment(grammar, rule) || rule.is_skip() {
            continue;
        }
        let Some(expr) = rule.expr else { continue };
        if is_token_rule(grammar, rule) {
            specs.add(Spec::Token(TokenSpec {
                rule: rule.name.clone(),
                name: rule.name.clone(),
                field_type: rule.type_name.clone(),
                is_static: is_static_token_rule(grammar, rule),
            }));
            continue;
        }
        if is_variant_rule(grammar, rule) {
            let members = get_variants(grammar, expr);
            specs.add(Spec::Variant(VariantSpec {
                rule: rule.name.clone(),
                name: rule.name.clone(),
                members,
            }));
            continue;
        }
        let mut fields = get_field_members(grammar, expr);
        rename_duplicate_members(&mut fields);
        specs.add(Spec::Node(NodeSpec {
            rule: rule.name.clone(),
            name: rule.name.clone(),
            fields,
        }));
    }
    specs
}

/// True when `id` is a bare `Ref` to the magic `skip` rule. `insert_skip`
/// wraps every such reference in `Hide` so it never reaches here as anything
/// but a `Hide`-wrapped subtree, but `remove_hidden` strips that wrapper
/// before `build_specs` runs, leaving a plain `Ref` — this is what lets
/// inference still recognize and ignore it rather than mistaking it for a
/// node-producing field.
fn is_skip_ref(grammar: &Grammar, id: ExprId) -> bool {
    match grammar.kind(id) {
        ExprKind::Ref(name) => grammar.lookup(name).map(is_skip_rule).unwrap_or(false),
        _ => false,
    }
}

/// Infers the type a (literal-free) expression produces. Mirrors
/// `infer_type`: `Hide` collapses to the unit type, a `Ref` resolves through
/// private rules to their body, and a `Seq` of single-field elements
/// collapses to that one field's type instead of a one-element tuple.
fn infer_type(grammar: &Grammar, id: ExprId) -> Type {
    match grammar.kind(id) {
        ExprKind::Hide(_) => super::types::make_unit(),
        ExprKind::List { element, separator, min_count } => {
            let element_ty = infer_type(grammar, *element);
            let separator_ty = infer_type(grammar, *separator);
            Type::Punct {
                element: Box::new(element_ty),
                separator: Box::new(separator_ty),
                required: *min_count > 0,
                before: vec![],
                after: vec![],
            }
        }
        ExprKind::Ref(name) => match grammar.lookup(name) {
            None => Type::any(),
            Some(rule) if rule.is_extern() => {
                Type::extern_(rule.type_name.clone().unwrap_or_else(|| rule.name.clone()))
            }
            Some(rule) if rule.expr.is_none() => Type::any(),
            Some(rule) if !rule.is_public() => infer_type(grammar, rule.expr.unwrap()),
            Some(rule) if is_token_rule(grammar, rule) => Type::token(rule.name.clone()),
            Some(rule) if is_variant_rule(grammar, rule) => Type::variant(rule.name.clone()),
            Some(rule) => Type::node(rule.name.clone()),
        },
        ExprKind::Lit(_) | ExprKind::CharSet(_) => {
            unreachable!("literals must be extracted before treespec inference")
        }
        ExprKind::Repeat { expr, min, max } => {
            let element_ty = infer_type(grammar, *expr);
            if *max == 0 {
                super::types::make_unit()
            } else if *min == 0 && *max == 1 {
                super::types::make_optional(element_ty)
            } else if *min == 1 && *max == 1 {
                element_ty
            } else {
                Type::List { element: Box::new(element_ty), required: *min > 0, before: vec![], after: vec![] }
            }
        }
        ExprKind::Seq(items) => {
            let mut types = Vec::new();
            let mut buffer: Vec<ExprId> = Vec::new();
            for item in items {
                if let ExprKind::Hide(inner) = grammar.kind(*item) {
                    buffer.push(*inner);
                    continue;
                }
                if is_skip_ref(grammar, *item) {
                    buffer.push(*item);
                    continue;
                }
                let mut ty = infer_type(grammar, *item);
                if super::types::is_unit(&ty) {
                    continue;
                }
                let before = std::mem::take(&mut buffer);
                ty = ty.with_trivia(before, vec![]);
                types.push(ty);
            }
            if types.len() == 1 {
                types.into_iter().next().unwrap()
            } else {
                Type::Tuple { elements: types, before: vec![], after: vec![] }
            }
        }
        ExprKind::Lookahead { .. } => super::types::make_unit(),
        ExprKind::Choice(items) => {
            let members = items.iter().map(|id| infer_type(grammar, *id)).collect();
            Type::Union { members, before: vec![], after: vec![] }
        }
    }
}

/// Derives a field's name from the shape of the expression it was inferred
/// from, when the author didn't supply an explicit label — `expr.field` for
/// a `Ref`, and the pluralized element name for a `Repeat` with `max > 1`.
fn derive_field_name(grammar: &Grammar, id: ExprId) -> Option<String> {
    let node = grammar.get(id);
    if let Some(label) = &node.label {
        return Some(label.clone());
    }
    match &node.kind {
        ExprKind::Ref(name) => Some(name.clone()),
        ExprKind::Repeat { expr, max, .. } => {
            let inner = derive_field_name(grammar, *expr)?;
            if *max > 1 {
                Some(plural(&inner))
            } else {
                Some(inner)
            }
        }
        ExprKind::List { .. } | ExprKind::CharSet(_) | ExprKind::Choice(_) => None,
        _ => None,
    }
}

fn plural(name: &str) -> String {
    if name.ends_with('s') {
        name.to_string()
    } else {
        format!("{name}s")
    }
}

struct FieldNameGenerator {
    counter: usize,
}

impl FieldNameGenerator {
    fn new() -> Self {
        Self { counter: 0 }
    }
    fn next(&mut self) -> String {
        let name = format!("field_{}", self.counter);
        self.counter += 1;
        name
    }
}

/// Walks a rule body top-down collecting every value-producing leaf as a
/// [`Field`]. A `Ref` to a private rule is transparently expanded; a
/// `Hide`-wrapped subtree is skipped entirely (not even contributing
/// trivia here — `infer_type`'s `Seq` case already folds trivia into the
/// neighboring field). Mirrors `get_fields`/`get_field_members`.
fn get_field_members(grammar: &Grammar, id: ExprId) -> Vec<Field> {
    let mut generator = FieldNameGenerator::new();
    let mut fields = Vec::new();
    collect_fields(grammar, id, None, &mut generator, &mut fields);
    fields
}

fn collect_fields(
    grammar: &Grammar,
    id: ExprId,
    rule_name: Option<&str>,
    generator: &mut FieldNameGenerator,
    out: &mut Vec<Field>,
) {
    match grammar.kind(id) {
        ExprKind::Lookahead { .. } => {}
        ExprKind::Hide(_) => {}
        ExprKind::Ref(name) => {
            if let Some(rule) = grammar.lookup(name) {
                if is_skip_rule(rule) {
                    return;
                }
                if !rule.is_public() && rule.expr.is_some() {
                    collect_fields(grammar, rule.expr.unwrap(), Some(&rule.name), generator, out);
                    return;
                }
            }
            let field_name = rule_name
                .map(str::to_string)
                .or_else(|| derive_field_name(grammar, id))
                .unwrap_or_else(|| generator.next());
            out.push(Field { name: field_name, ty: simplify_type(infer_type(grammar, id)), expr: id });
        }
        ExprKind::Seq(items) => {
            for item in items {
                collect_fields(grammar, *item, None, generator, out);
            }
        }
        ExprKind::Lit(_) | ExprKind::CharSet(_) => {
            unreachable!("literals must be extracted before treespec inference")
        }
        _ => {
            let field_name = rule_name
                .map(str::to_string)
                .or_else(|| derive_field_name(grammar, id))
                .unwrap_or_else(|| generator.next());
            out.push(Field { name: field_name, ty: simplify_type(infer_type(grammar, id)), expr: id });
        }
    }
}

fn get_member_name(grammar: &Grammar, id: ExprId) -> String {
    let node = grammar.get(id);
    if let Some(label) = &node.label {
        return label.clone();
    }
    match &node.kind {
        ExprKind::Ref(name) => match grammar.lookup(name) {
            Some(rule) if !rule.is_public() && rule.expr.is_some() => {
                get_member_name(grammar, rule.expr.unwrap())
            }
            Some(rule) => rule.name.clone(),
            None => name.clone(),
        },
        _ => "member".to_string(),
    }
}

/// Computes the `(name, type)` pairs for every branch of a variant rule's
/// top-level choice. A branch that is itself a `Seq` of several members
/// gets a name built by joining each member's name with `_` (mirrors
/// `get_variants`'s `SeqExpr` case).
fn get_variants(grammar: &Grammar, id: ExprId) -> Vec<(String, Type)> {
    match grammar.kind(id) {
        ExprKind::Choice(items) => items.iter().flat_map(|item| get_variants(grammar, *item)).collect(),
        ExprKind::Seq(items) => {
            let mut names = Vec::new();
            let mut types = Vec::new();
            for item in items {
                names.push(get_member_name(grammar, *item));
                types.push(infer_type(grammar, *item));
            }
            vec![(names.join("_"), Type::Tuple { elements: types, before: vec![], after: vec![] })]
        }
        _ => vec![(get_member_name(grammar, id), infer_type(grammar, id))],
    }
}

/// Renames `field_name`, `field_name_2`, `field_name_3`, ... for any field
/// names that recur more than once within the same node.
fn rename_duplicate_members(fields: &mut [Field]) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for field in fields.iter_mut() {
        let count = seen.entry(field.name.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            field.name = format!("{}_{}", field.name, count);
        }
    }
}

#[cfg(test)]
mod __tests__ {
    use super::*;
    use crate::grammar::{CharSet, CharSetElem, GrammarBuilder, RuleFlags};

    fn digit_rule() -> Rule {
        Rule { name: "Digit".to_string(), flags: RuleFlags::PUBLIC, type_name: Some("String".to_string()), expr: None }
    }

    #[test]
    fn token_rule_becomes_token_spec() {
        let mut builder = GrammarBuilder::new();
        let cs = builder.push(
            ExprKind::CharSet(CharSet { elements: vec![CharSetElem::Range('0', '9')], case_insensitive: false, invert: false }),
            None,
        );
        let rep = builder.push(ExprKind::Repeat { expr: cs, min: 1, max: crate::grammar::UNBOUNDED }, None);
        let rule = Rule { expr: Some(rep), ..digit_rule() };
        let grammar = builder.finish(vec![rule]);

        let specs = build_specs(&grammar);
        match specs.lookup("Digit") {
            Some(Spec::Token(t)) => assert!(!t.is_static),
            other => panic!("expected TokenSpec, got {other:?}"),
        }
    }

    #[test]
    fn node_rule_derives_ref_field_names() {
        let mut builder = GrammarBuilder::new();
        let lhs = builder.push(ExprKind::Ref("Digit".to_string()), None);
        let op = builder.push(ExprKind::Ref("plus".to_string()), None);
        let rhs = builder.push(ExprKind::Ref("Digit".to_string()), None);
        let seq = builder.push(ExprKind::Seq(vec![lhs, op, rhs]), None);
        let plus_rule = Rule { name: "plus".to_string(), flags: RuleFlags::PUBLIC | RuleFlags::FORCE_TOKEN, type_name: None, expr: None };
        let add = Rule { name: "Add".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(seq) };
        let digit = digit_rule();
        let grammar = builder.finish(vec![add, digit, plus_rule]);

        let specs = build_specs(&grammar);
        match specs.lookup("Add") {
            Some(Spec::Node(n)) => {
                assert_eq!(n.fields.len(), 3);
                assert_eq!(n.fields[0].name, "Digit");
                assert_eq!(n.fields[1].name, "plus");
                assert_eq!(n.fields[2].name, "Digit_2");
            }
            other => panic!("expected NodeSpec, got {other:?}"),
        }
    }

    #[test]
    fn variant_rule_collects_members() {
        let mut builder = GrammarBuilder::new();
        let a_ref = builder.push(ExprKind::Ref("A".to_string()), None);
        let b_ref = builder.push(ExprKind::Ref("B".to_string()), None);
        let choice = builder.push(ExprKind::Choice(vec![a_ref, b_ref]), None);
        let expr_rule = Rule { name: "Expr".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(choice) };
        let a = Rule { name: "A".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: None };
        let b = Rule { name: "B".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: None };
        let grammar = builder.finish(vec![expr_rule, a, b]);

        let specs = build_specs(&grammar);
        match specs.lookup("Expr") {
            Some(Spec::Variant(v)) => assert_eq!(v.members.len(), 2),
            other => panic!("expected VariantSpec, got {other:?}"),
        }
    }

    #[test]
    fn skip_rule_does_not_leak_as_a_field_through_the_real_pipeline() {
        // `Add = Digit '+' Digit` run through the actual magic-rule insertion
        // and hide-removal passes, the way `normalize` does it, rather than
        // a hand-built `Seq` that skips straight past `insert_skip`.
        let mut builder = GrammarBuilder::new();
        let lhs = builder.push(ExprKind::Ref("Digit".to_string()), None);
        let plus = builder.push(ExprKind::Lit("+".to_string()), None);
        let rhs = builder.push(ExprKind::Ref("Digit".to_string()), None);
        let seq = builder.push(ExprKind::Seq(vec![lhs, plus, rhs]), None);
        let add = Rule { name: "Add".to_string(), flags: RuleFlags::PUBLIC, type_name: None, expr: Some(seq) };
        let digit = digit_rule();
        let grammar = builder.finish(vec![add, digit]);

        let grammar = crate::transforms::extract_literals(&grammar);
        let grammar = crate::transforms::insert_magic_rules(&grammar);
        let grammar = crate::transforms::insert_skip(&grammar);
        let grammar = crate::transforms::remove_hidden(&grammar);

        let specs = build_specs(&grammar);
        match specs.lookup("Add") {
            Some(Spec::Node(n)) => {
                assert!(
                    n.fields.iter().all(|f| f.name != "skip"),
                    "spurious skip field in {:?}",
                    n.fields.iter().map(|f| &f.name).collect::<Vec<_>>()
                );
                assert_eq!(n.fields.len(), 3);
            }
            other => panic!("expected NodeSpec, got {other:?}"),
        }
    }
}
