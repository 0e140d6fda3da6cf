//! The treespec type algebra: the small type system used to describe the
//! shape of a field or a whole node, independent of any target language.
//!
//! Every constructor carries `before`/`after`: the hidden expressions
//! (`Hide(...)` subtrees, typically skip/trivia) encountered immediately
//! before or after the value-producing expression that this type was
//! inferred from. A target backend can attach those to doc comments or
//! trivia buffers; this crate's own interpreter ignores them, but keeps them
//! around since `infer_type` (`treespec.py`) always threads them through.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

use crate::grammar::ExprId;

#[derive(Debug, Clone)]
pub enum Type {
    Extern { name: String, before: Vec<ExprId>, after: Vec<ExprId> },
    Node { name: String, before: Vec<ExprId>, after: Vec<ExprId> },
    Token { name: String, before: Vec<ExprId>, after: Vec<ExprId> },
    Variant { name: String, before: Vec<ExprId>, after: Vec<ExprId> },
    Never { before: Vec<ExprId>, after: Vec<ExprId> },
    NoneType { before: Vec<ExprId>, after: Vec<ExprId> },
    Any { before: Vec<ExprId>, after: Vec<ExprId> },
    Tuple { elements: Vec<Type>, before: Vec<ExprId>, after: Vec<ExprId> },
    List { element: Box<Type>, required: bool, before: Vec<ExprId>, after: Vec<ExprId> },
    Punct { element: Box<Type>, separator: Box<Type>, required: bool, before: Vec<ExprId>, after: Vec<ExprId> },
    Union { members: Vec<Type>, before: Vec<ExprId>, after: Vec<ExprId> },
}

impl Type {
    pub fn node(name: impl Into<String>) -> Type {
        Type::Node { name: name.into(), before: vec![], after: vec![] }
    }
    pub fn token(name: impl Into<String>) -> Type {
        Type::Token { name: name.into(), before: vec![], after: vec![] }
    }
    pub fn variant(name: impl Into<String>) -> Type {
        Type::Variant { name: name.into(), before: vec![], after: vec![] }
    }
    pub fn extern_(name: impl Into<String>) -> Type {
        Type::Extern { name: name.into(), before: vec![], after: vec![] }
    }
    pub fn any() -> Type {
        Type::Any { before: vec![], after: vec![] }
    }
    pub fn never() -> Type {
        Type::Never { before: vec![], after: vec![] }
    }
    pub fn none() -> Type {
        Type::NoneType { before: vec![], after: vec![] }
    }

    pub fn before(&self) -> &[ExprId] {
        match self {
            Type::Extern { before, .. }
            | Type::Node { before, .. }
            | Type::Token { before, .. }
            | Type::Variant { before, .. }
            | Type::Never { before, .. }
            | Type::NoneType { before, .. }
            | Type::Any { before, .. }
            | Type::Tuple { before, .. }
            | Type::List { before, .. }
            | Type::Punct { before, .. }
            | Type::Union { before, .. } => before,
        }
    }

    pub fn with_trivia(mut self, before: Vec<ExprId>, after: Vec<ExprId>) -> Type {
        let (b, a) = self.trivia_mut();
        *b = before;
        *a = after;
        self
    }

    fn trivia_mut(&mut self) -> (&mut Vec<ExprId>, &mut Vec<ExprId>) {
        match self {
            Type::Extern { before, after, .. }
            | Type::Node { before, after, .. }
            | Type::Token { before, after, .. }
            | Type::Variant { before, after, .. }
            | Type::Never { before, after, .. }
            | Type::NoneType { before, after, .. }
            | Type::Any { before, after, .. }
            | Type::Tuple { before, after, .. }
            | Type::List { before, after, .. }
            | Type::Punct { before, after, .. }
            | Type::Union { before, after, .. } => (before, after),
        }
    }

    /// A canonical, trivia-free textual key, equivalent in spirit to the
    /// source's `encode()` tuple: two types with the same `encode_key` are
    /// structurally indistinguishable regardless of their `before`/`after`
    /// buffers. Used to back `Eq`/`Ord`/`Hash`.
    pub fn encode_key(&self) -> String {
        match self {
            Type::Node { name, .. } => format!("1:{name}"),
            Type::Token { name, .. } => format!("2:{name}"),
            Type::Variant { name, .. } => format!("3:{name}"),
            Type::Never { .. } => "4:".to_string(),
            Type::Tuple { elements, .. } => {
                let parts: Vec<String> = elements.iter().map(Type::encode_key).collect();
                format!("5:{}:[{}]", elements.len(), parts.join(","))
            }
            Type::List { element, required, .. } => {
                format!("6:{}:{}", element.encode_key(), required)
            }
            Type::Punct { element, separator, required, .. } => {
                format!("7:{}:{}:{}", element.encode_key(), separator.encode_key(), required)
            }
            Type::Union { members, .. } => {
                let parts: Vec<String> = members.iter().map(Type::encode_key).collect();
                format!("8:{}:[{}]", members.len(), parts.join(","))
            }
            Type::NoneType { .. } => "9:".to_string(),
            Type::Extern { name, .. } => format!("10:{name}"),
            Type::Any { .. } => "11:".to_string(),
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.encode_key() == other.encode_key()
    }
}
impl Eq for Type {}

impl PartialOrd for Type {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Type {
    fn cmp(&self, other: &Self) -> Ordering {
        self.encode_key().cmp(&other.encode_key())
    }
}
impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.encode_key().hash(state);
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode_key())
    }
}

pub fn make_unit() -> Type {
    Type::Tuple { elements: vec![], before: vec![], after: vec![] }
}

pub fn is_unit(ty: &Type) -> bool {
    matches!(ty, Type::Tuple { elements, .. } if elements.is_empty())
}

pub fn make_optional(ty: Type) -> Type {
    Type::Union { members: vec![ty, Type::none()], before: vec![], after: vec![] }
}

pub fn flatten_union(ty: &Type) -> Vec<&Type> {
    match ty {
        Type::Union { members, .. } => members.iter().flat_map(flatten_union).collect(),
        other => vec![other],
    }
}

pub fn is_optional(ty: &Type) -> bool {
    if matches!(ty, Type::NoneType { .. }) {
        return true;
    }
    if let Type::Union { .. } = ty {
        return flatten_union(ty).iter().any(|t| matches!(t, Type::NoneType { .. }));
    }
    false
}

/// A single field of a [`crate::treespec::NodeSpec`]: its derived name, its
/// inferred type, and the arena id of the expression it came from.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub ty: Type,
    pub expr: ExprId,
}

#[derive(Debug, Clone)]
pub struct TokenSpec {
    pub rule: String,
    pub name: String,
    pub field_type: Option<String>,
    pub is_static: bool,
}

#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub rule: String,
    pub name: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone)]
pub struct VariantSpec {
    pub rule: String,
    pub name: String,
    pub members: Vec<(String, Type)>,
}

#[derive(Debug, Clone)]
pub enum Spec {
    Token(TokenSpec),
    Node(NodeSpec),
    Variant(VariantSpec),
}

impl Spec {
    pub fn name(&self) -> &str {
        match self {
            Spec::Token(s) => &s.name,
            Spec::Node(s) => &s.name,
            Spec::Variant(s) => &s.name,
        }
    }
}

/// The full result of treespec inference: every non-fragment rule's spec,
/// keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Specs {
    mapping: std::collections::HashMap<String, Spec>,
    order: Vec<String>,
}

impl Specs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, spec: Spec) {
        let name = spec.name().to_string();
        self.order.push(name.clone());
        self.mapping.insert(name, spec);
    }

    pub fn lookup(&self, name: &str) -> Option<&Spec> {
        self.mapping.get(name)
    }

    pub fn is_static(&self, name: &str) -> bool {
        matches!(self.lookup(name), Some(Spec::Token(t)) if t.is_static)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Spec> {
        self.order.iter().map(move |name| &self.mapping[name])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeSpec> {
        self.iter().filter_map(|spec| match spec {
            Spec::Node(n) => Some(n),
            _ => None,
        })
    }
}

pub fn spec_to_type(spec: &Spec) -> Type {
    match spec {
        Spec::Token(t) => Type::token(t.name.clone()),
        Spec::Node(n) => Type::node(n.name.clone()),
        Spec::Variant(v) => Type::variant(v.name.clone()),
    }
}

/// True if a value of `ty` can always be reproduced from nothing but its own
/// grammar-determined shape — no run of the input text is needed, because
/// every constituent is itself static (a keyword token, or a node/variant
/// built entirely from static tokens). `Never`/`Extern`/`List`/`Punct`/`Any`
/// are never static: a list's length and an extern type's value are not
/// knowable ahead of time.
pub fn is_static(ty: &Type, specs: &Specs) -> bool {
    let mut visited = std::collections::HashSet::new();
    is_static_visit(ty, specs, &mut visited)
}

fn is_static_visit(ty: &Type, specs: &Specs, visited: &mut std::collections::HashSet<String>) -> bool {
    match ty {
        Type::Extern { .. } | Type::Never { .. } | Type::List { .. } | Type::Punct { .. } | Type::Any { .. } => false,
        Type::NoneType { .. } => true,
        Type::Union { members, .. } => members.iter().all(|t| is_static_visit(t, specs, visited)),
        Type::Variant { name, .. } => {
            if !visited.insert(name.clone()) {
                return false;
            }
            match specs.lookup(name) {
                Some(Spec::Variant(v)) => v.members.iter().all(|(_, t)| is_static_visit(t, specs, visited)),
                _ => false,
            }
        }
        Type::Node { name, .. } => {
            if !visited.insert(name.clone()) {
                return false;
            }
            match specs.lookup(name) {
                Some(Spec::Node(n)) => n.fields.iter().all(|f| is_static_visit(&f.ty, specs, visited)),
                _ => false,
            }
        }
        Type::Token { name, .. } => {
            if !visited.insert(name.clone()) {
                return false;
            }
            specs.is_static(name)
        }
        Type::Tuple { elements, .. } => elements.iter().all(|t| is_static_visit(t, specs, visited)),
    }
}

/// A short, filesystem/identifier-safe name for a type, used as a suffix
/// when the synthesizer needs a unique name per distinct type (e.g. per
/// variant-member visitor).
pub fn mangle_type(ty: &Type) -> String {
    match ty {
        Type::Node { name, .. } => format!("node_{name}"),
        Type::Variant { name, .. } => format!("variant_{name}"),
        Type::Token { name, .. } => format!("token_{name}"),
        Type::Tuple { elements, .. } => {
            let mut out = format!("tuple_{}", elements.len());
            for ty in elements {
                out.push('_');
                out.push_str(&mangle_type(ty));
            }
            out
        }
        Type::List { element, required, .. } => {
            let mut out = format!("list_{}", mangle_type(element));
            if *required {
                out.push_str("_required");
            }
            out
        }
        Type::Punct { element, separator, required, .. } => {
            let mut out = format!("punct_{}_{}", mangle_type(element), mangle_type(separator));
            if *required {
                out.push_str("_required");
            }
            out
        }
        Type::Extern { name, .. } => format!("extern_{}", to_snake_case(name)),
        Type::Never { .. } => "never".to_string(),
        Type::NoneType { .. } => "none".to_string(),
        Type::Union { members, .. } => {
            let mut out = format!("union_{}", members.len());
            for ty in members {
                out.push('_');
                out.push_str(&mangle_type(ty));
            }
            out
        }
        Type::Any { .. } => "any".to_string(),
    }
}

fn to_snake_case(name: &str) -> String {
    let mut out = String::new();
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i != 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Structural overlap test: roughly "would `type(a) == type(b)` hold", used
/// to decide whether two union members can share a synthesized variant arm.
pub fn do_types_shallow_overlap(a: &Type, b: &Type) -> bool {
    if matches!(a, Type::Never { .. }) || matches!(b, Type::Never { .. }) {
        return false;
    }
    if matches!(a, Type::Any { .. }) || matches!(b, Type::Any { .. }) {
        return true;
    }
    if let Type::Union { members, .. } = a {
        return members.iter().any(|t| do_types_shallow_overlap(t, b));
    }
    if let Type::Union { .. } = b {
        return do_types_shallow_overlap(b, a);
    }
    match (a, b) {
        (Type::Extern { name: n1, .. }, Type::Extern { name: n2, .. }) => n1 == n2,
        (Type::Node { name: n1, .. }, Type::Node { name: n2, .. }) => n1 == n2,
        (Type::Variant { name: n1, .. }, Type::Variant { name: n2, .. }) => n1 == n2,
        (Type::Token { name: n1, .. }, Type::Token { name: n2, .. }) => n1 == n2,
        (Type::List { .. }, Type::List { .. }) => true,
        (Type::Punct { .. }, Type::Punct { .. }) => true,
        (Type::NoneType { .. }, Type::NoneType { .. }) => true,
        (Type::Tuple { .. }, Type::Tuple { .. }) => true,
        _ => false,
    }
}

/// Replaces every `Variant` type with the `Union` of its members, recursing
/// into the result so nested variants expand too. Used before static/cyclic
/// analysis, which reasons in terms of concrete node/token shapes.
pub fn expand_variant_types(ty: Type, specs: &Specs) -> Type {
    match ty {
        Type::Variant { name, before, after } => {
            let members = match specs.lookup(&name) {
                Some(Spec::Variant(v)) => v.members.clone(),
                _ => vec![],
            };
            let expanded = members
                .into_iter()
                .map(|(_, t)| expand_variant_types(t, specs))
                .collect();
            Type::Union { members: expanded, before, after }
        }
        Type::Tuple { elements, before, after } => Type::Tuple {
            elements: elements.into_iter().map(|t| expand_variant_types(t, specs)).collect(),
            before,
            after,
        },
        Type::List { element, required, before, after } => Type::List {
            element: Box::new(expand_variant_types(*element, specs)),
            required,
            before,
            after,
        },
        Type::Punct { element, separator, required, before, after } => Type::Punct {
            element: Box::new(expand_variant_types(*element, specs)),
            separator: Box::new(expand_variant_types(*separator, specs)),
            required,
            before,
            after,
        },
        Type::Union { members, before, after } => Type::Union {
            members: members.into_iter().map(|t| expand_variant_types(t, specs)).collect(),
            before,
            after,
        },
        other => other,
    }
}

/// Flattens unions, drops `Never`, collapses to `Any` if any member is
/// `Any`, sorts and deduplicates the remainder. Mirrors `simplify_type`.
pub fn simplify_type(ty: Type) -> Type {
    match ty {
        Type::List { element, required, before, after } => Type::List {
            element: Box::new(simplify_type(*element)),
            required,
            before,
            after,
        },
        Type::Tuple { elements, before, after } => Type::Tuple {
            elements: elements.into_iter().map(simplify_type).collect(),
            before,
            after,
        },
        Type::Punct { element, separator, required, before, after } => Type::Punct {
            element: Box::new(simplify_type(*element)),
            separator: Box::new(simplify_type(*separator)),
            required,
            before,
            after,
        },
        Type::Union { members, before, after } => {
            let mut flattened: Vec<Type> = Vec::new();
            for member in members {
                flatten_union_owned(member, &mut flattened);
            }
            let mut kept = Vec::with_capacity(flattened.len());
            for member in flattened {
                if matches!(member, Type::Never { .. }) {
                    continue;
                }
                if matches!(member, Type::Any { .. }) {
                    return Type::Any { before, after };
                }
                kept.push(simplify_type(member));
            }
            kept.sort();
            kept.dedup();
            match kept.len() {
                0 => Type::Never { before, after },
                1 => kept.into_iter().next().unwrap().with_trivia(before, after),
                _ => Type::Union { members: kept, before, after },
            }
        }
        other => other,
    }
}

fn flatten_union_owned(ty: Type, out: &mut Vec<Type>) {
    match ty {
        Type::Union { members, .. } => {
            for member in members {
                flatten_union_owned(member, out);
            }
        }
        other => out.push(other),
    }
}

/// Whether a value typed `left` may be used wherever `right` is expected.
pub fn is_type_assignable(left: &Type, right: &Type, specs: &Specs) -> bool {
    if matches!(left, Type::Never { .. }) || matches!(right, Type::Never { .. }) {
        return false;
    }
    if matches!(left, Type::Any { .. }) || matches!(right, Type::Any { .. }) {
        return true;
    }
    match (left, right) {
        (Type::NoneType { .. }, Type::NoneType { .. }) => true,
        (Type::Extern { name: a, .. }, Type::Extern { name: b, .. }) => a == b,
        (Type::Node { name: a, .. }, Type::Node { name: b, .. }) => a == b,
        (Type::Token { name: a, .. }, Type::Token { name: b, .. }) => a == b,
        (Type::Variant { name, .. }, _) => match specs.lookup(name) {
            Some(Spec::Variant(v)) => v.members.iter().all(|(_, t)| is_type_assignable(t, right, specs)),
            _ => false,
        },
        (_, Type::Variant { name, .. }) => match specs.lookup(name) {
            Some(Spec::Variant(v)) => v.members.iter().any(|(_, t)| is_type_assignable(left, t, specs)),
            _ => false,
        },
        (Type::List { element: le, .. }, Type::List { element: re, .. }) => is_type_assignable(le, re, specs),
        (Type::Punct { element: le, separator: lsep, .. }, Type::Punct { element: re, separator: rsep, .. }) => {
            is_type_assignable(le, re, specs) && is_type_assignable(lsep, rsep, specs)
        }
        (Type::Punct { element: le, .. }, Type::List { element: re, .. }) => is_type_assignable(le, re, specs),
        (Type::Union { members, .. }, _) => members.iter().all(|t| is_type_assignable(t, right, specs)),
        (_, Type::Union { members, .. }) => members.iter().any(|t| is_type_assignable(left, t, specs)),
        (Type::Tuple { elements: le, .. }, Type::Tuple { elements: re, .. }) => {
            le.len() == re.len() && le.iter().zip(re).all(|(a, b)| is_type_assignable(a, b, specs))
        }
        _ => false,
    }
}

fn expand_type(ty: &Type) -> Vec<&Type> {
    match ty {
        Type::List { element, .. } => vec![element.as_ref()],
        Type::Punct { element, separator, .. } => vec![element.as_ref(), separator.as_ref()],
        Type::Tuple { elements, .. } => elements.iter().collect(),
        Type::Union { members, .. } => members.iter().collect(),
        _ => vec![],
    }
}

/// Whether `name`'s own node/variant type can (directly or through its
/// fields) contain another value of the same type — a grammar like
/// `pub Expr = Expr '+' Expr | Digit` is cyclic in `Expr`. The synthesizer
/// uses this to decide whether a variant needs a boxed/indirect
/// representation and whether a visitor needs to guard against infinite
/// descent.
pub fn is_cyclic(name: &str, specs: &Specs) -> bool {
    let Some(spec) = specs.lookup(name) else { return false };
    let spec_type = expand_variant_types(spec_to_type(spec), specs);
    let mut visited = std::collections::HashSet::new();
    check_cyclic(&spec_type, &spec_type, specs, &mut visited, true)
}

fn check_cyclic(
    ty: &Type,
    target: &Type,
    specs: &Specs,
    visited: &mut std::collections::HashSet<String>,
    first: bool,
) -> bool {
    if !first && is_type_assignable(ty, target, specs) {
        return true;
    }
    if let Type::Node { name, .. } = ty {
        if !visited.insert(name.clone()) {
            return false;
        }
        if let Some(Spec::Node(n)) = specs.lookup(name) {
            return n.fields.iter().any(|f| {
                let expanded = expand_variant_types(f.ty.clone(), specs);
                check_cyclic(&expanded, target, specs, visited, false)
            });
        }
        return false;
    }
    expand_type(ty).into_iter().any(|t| check_cyclic(t, target, specs, visited, first))
}

/// Merges structurally similar members of a union into one: `List<A> |
/// List<B>` becomes `List<A | B>`, and likewise for `Punct` and same-length
/// tuples. Not semantically exact (a consumer can no longer tell which arm
/// of the original union it received just from the merged type) but useful
/// wherever a cheaper, looser check is preferable to an exhaustive match.
pub fn merge_similar_types(ty: Type) -> Type {
    let mut flattened = Vec::new();
    flatten_union_owned(ty, &mut flattened);

    let mut out = Vec::new();
    let mut list_elements = Vec::new();
    let mut list_required = true;
    let mut punct_elements = Vec::new();
    let mut punct_separators = Vec::new();
    let mut punct_required = true;
    let mut tuples_by_len: std::collections::BTreeMap<usize, Vec<Vec<Type>>> = std::collections::BTreeMap::new();

    for member in flattened {
        match member {
            Type::Tuple { elements, .. } => {
                let slot = tuples_by_len.entry(elements.len()).or_insert_with(|| vec![Vec::new(); elements.len()]);
                for (i, element) in elements.into_iter().enumerate() {
                    slot[i].push(merge_similar_types(element));
                }
            }
            Type::List { element, required, .. } => {
                list_elements.push(merge_similar_types(*element));
                list_required &= required;
            }
            Type::Punct { element, separator, required, .. } => {
                punct_elements.push(merge_similar_types(*element));
                punct_separators.push(merge_similar_types(*separator));
                punct_required &= required;
            }
            other => out.push(other),
        }
    }

    if !list_elements.is_empty() {
        out.push(Type::List {
            element: Box::new(Type::Union { members: list_elements, before: vec![], after: vec![] }),
            required: list_required,
            before: vec![],
            after: vec![],
        });
    }
    if !punct_elements.is_empty() {
        out.push(Type::Punct {
            element: Box::new(Type::Union { members: punct_elements, before: vec![], after: vec![] }),
            separator: Box::new(Type::Union { members: punct_separators, before: vec![], after: vec![] }),
            required: punct_required,
            before: vec![],
            after: vec![],
        });
    }
    for (_, columns) in tuples_by_len {
        let elements = columns
            .into_iter()
            .map(|col| Type::Union { members: col, before: vec![], after: vec![] })
            .collect();
        out.push(Type::Tuple { elements, before: vec![], after: vec![] });
    }

    simplify_type(Type::Union { members: out, before: vec![], after: vec![] })
}

#[cfg(test)]
mod __tests__ {
    use super::*;

    #[test]
    fn optional_detection_round_trips() {
        let ty = make_optional(Type::token("Digit"));
        assert!(is_optional(&ty));
        assert!(!is_optional(&Type::token("Digit")));
    }

    #[test]
    fn simplify_dedups_union_members() {
        let ty = Type::Union {
            members: vec![Type::token("A"), Type::token("A"), Type::token("B")],
            before: vec![],
            after: vec![],
        };
        let simplified = simplify_type(ty);
        match simplified {
            Type::Union { members, .. } => assert_eq!(members.len(), 2),
            other => panic!("expected Union, got {other:?}"),
        }
    }

    #[test]
    fn simplify_collapses_singleton_union() {
        let ty = Type::Union { members: vec![Type::token("A")], before: vec![], after: vec![] };
        assert_eq!(simplify_type(ty), Type::token("A"));
    }

    #[test]
    fn mangle_is_stable_and_distinct() {
        assert_eq!(mangle_type(&Type::node("Expr")), "node_Expr");
        assert_ne!(mangle_type(&Type::node("Expr")), mangle_type(&Type::token("Expr")));
    }

    #[test]
    fn shallow_overlap_ignores_any_as_wildcard() {
        assert!(do_types_shallow_overlap(&Type::any(), &Type::token("A")));
        assert!(!do_types_shallow_overlap(&Type::token("A"), &Type::token("B")));
        assert!(do_types_shallow_overlap(&Type::token("A"), &Type::token("A")));
    }

    fn punct(element: Type, separator: Type) -> Type {
        Type::Punct { element: Box::new(element), separator: Box::new(separator), required: false, before: vec![], after: vec![] }
    }

    #[test]
    fn structurally_compatible_punct_types_are_assignable() {
        let specs = Specs::new();
        let a = punct(Type::token("Item"), Type::token("Comma"));
        let b = punct(Type::token("Item"), Type::token("Comma"));
        assert!(is_type_assignable(&a, &b, &specs));
    }

    #[test]
    fn punct_types_with_incompatible_separators_are_not_assignable() {
        let specs = Specs::new();
        let a = punct(Type::token("Item"), Type::token("Comma"));
        let b = punct(Type::token("Item"), Type::token("Semi"));
        assert!(!is_type_assignable(&a, &b, &specs));
    }
}
