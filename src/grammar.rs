//! The grammar intermediate representation.
//!
//! A [`Grammar`] is an ordered sequence of [`Rule`]s; each rule's body is an
//! [`Expr`] living in the grammar's own arena. Expressions are referenced by
//! [`ExprId`] rather than by pointer, so a `Grammar` can be cloned, rebuilt by
//! a transform, and compared cheaply; this mirrors the index-newtype style
//! `lang_pt` uses for `TokenPtr`/`FltrPtr` rather than raw pointers or `Rc`
//! cycles for the parent back-link.

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

/// Sentinel used for an unbounded repetition upper bound (the source's
/// `POSINF`).
pub const UNBOUNDED: usize = usize::MAX;

/// A minimal hand-rolled bitflags-style macro, in keeping with the teacher's
/// habit of hand-rolling small utilities (`NTHelper`, `FieldTree`) rather than
/// adding a dependency for something this small.
macro_rules! bitflags_lite {
    (
        $(#[$meta:meta])*
        pub struct $name:ident: $repr:ty {
            $(const $flag:ident = $value:expr;)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
        pub struct $name($repr);

        impl $name {
            $(pub const $flag: $name = $name($value);)*

            pub const fn empty() -> Self {
                $name(0)
            }

            pub const fn contains(&self, other: $name) -> bool {
                (self.0 & other.0) == other.0
            }
        }

        impl std::ops::BitOr for $name {
            type Output = $name;
            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }

        impl std::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: $name) {
                self.0 |= rhs.0;
            }
        }
    };
}

/// Index of an [`Expr`] inside a [`Grammar`]'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(u32);

impl ExprId {
    fn new(index: usize) -> Self {
        Self(index as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

bitflags_lite! {
    /// Rule flags. Named after the source's `PUBLIC | FORCE_TOKEN`-style bit
    /// composition rather than individual booleans, since rules are built by
    /// OR-ing flags together in transforms (see `extract_literals`).
    pub struct RuleFlags: u8 {
        const PUBLIC = 0b0000_0001;
        const EXTERN = 0b0000_0010;
        const FORCE_TOKEN = 0b0000_0100;
        const SKIP = 0b0000_1000;
        const KEYWORD = 0b0001_0000;
    }
}

/// A single character-set member: either a literal character or an inclusive
/// range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharSetElem {
    Char(char),
    Range(char, char),
}

impl CharSetElem {
    pub fn matches(&self, ch: char, case_insensitive: bool) -> bool {
        let eq = |a: char, b: char| {
            if case_insensitive {
                a.to_ascii_lowercase() == b.to_ascii_lowercase()
            } else {
                a == b
            }
        };
        match *self {
            CharSetElem::Char(c) => eq(c, ch),
            CharSetElem::Range(low, high) => {
                if case_insensitive {
                    let ch_lower = ch.to_ascii_lowercase();
                    let ch_upper = ch.to_ascii_uppercase();
                    (low..=high).contains(&ch_lower) || (low..=high).contains(&ch_upper)
                } else {
                    (low..=high).contains(&ch)
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharSet {
    pub elements: Vec<CharSetElem>,
    pub case_insensitive: bool,
    pub invert: bool,
}

impl CharSet {
    pub fn matches(&self, ch: char) -> bool {
        let hit = self
            .elements
            .iter()
            .any(|e| e.matches(ch, self.case_insensitive));
        hit != self.invert
    }
}

/// The body of an expression, exhaustively matched by every pass. See
/// `spec.md` §3.1 for the authoritative table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    Lit(String),
    CharSet(CharSet),
    Ref(String),
    Seq(Vec<ExprId>),
    Choice(Vec<ExprId>),
    Repeat { expr: ExprId, min: usize, max: usize },
    List { element: ExprId, separator: ExprId, min_count: usize },
    Lookahead { expr: ExprId, negated: bool },
    Hide(ExprId),
}

/// A node in the expression arena: the kind, the user-supplied label, the
/// parent link established by [`Grammar::establish_parents`], and the
/// treespec-inference outputs that get filled in once (`field_name`,
/// `field_type`).
#[derive(Debug, Clone)]
pub struct ExprNode {
    pub kind: ExprKind,
    pub label: Option<String>,
    pub parent: Option<ExprId>,
    pub field_name: Option<String>,
}

impl ExprNode {
    fn new(kind: ExprKind, label: Option<String>) -> Self {
        Self {
            kind,
            label,
            parent: None,
            field_name: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub flags: RuleFlags,
    pub type_name: Option<String>,
    pub expr: Option<ExprId>,
}

impl Rule {
    pub fn is_public(&self) -> bool {
        self.flags.contains(RuleFlags::PUBLIC)
    }
    pub fn is_extern(&self) -> bool {
        self.flags.contains(RuleFlags::EXTERN)
    }
    pub fn is_force_token(&self) -> bool {
        self.flags.contains(RuleFlags::FORCE_TOKEN)
    }
    pub fn is_skip(&self) -> bool {
        self.flags.contains(RuleFlags::SKIP)
    }
    pub fn is_keyword(&self) -> bool {
        self.flags.contains(RuleFlags::KEYWORD)
    }
}

/// An immutable grammar: an ordered rule list plus the arena backing every
/// rule's expression tree. Transforms never mutate a `Grammar` in place —
/// each one builds and returns a fresh value (`spec.md` §3.3).
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    pub rules: Vec<Rule>,
    arena: Vec<ExprNode>,
}

impl Grammar {
    pub fn new(rules: Vec<Rule>, arena: Vec<ExprNode>) -> Self {
        let mut g = Self { rules, arena };
        g.establish_parents();
        g
    }

    pub fn get(&self, id: ExprId) -> &ExprNode {
        &self.arena[id.index()]
    }

    pub fn get_mut(&mut self, id: ExprId) -> &mut ExprNode {
        &mut self.arena[id.index()]
    }

    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.arena[id.index()].kind
    }

    pub fn lookup(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn rule_index_map(&self) -> HashMap<&str, usize> {
        self.rules
            .iter()
            .enumerate()
            .map(|(i, r)| (r.name.as_str(), i))
            .collect()
    }

    /// Re-establish `parent` links with a single post-order walk. Required
    /// after every transform since a fresh arena has no parent information
    /// yet (`spec.md` §3.1 invariant).
    pub fn establish_parents(&mut self) {
        for node in &mut self.arena {
            node.parent = None;
        }
        let roots: Vec<ExprId> = self.rules.iter().filter_map(|r| r.expr).collect();
        for root in roots {
            self.walk_set_parents(root, None);
        }
    }

    fn walk_set_parents(&mut self, id: ExprId, parent: Option<ExprId>) {
        self.arena[id.index()].parent = parent;
        let children: Vec<ExprId> = self.children_of(id);
        for child in children {
            self.walk_set_parents(child, Some(id));
        }
    }

    pub fn children_of(&self, id: ExprId) -> Vec<ExprId> {
        match &self.kind(id) {
            ExprKind::Lit(_) | ExprKind::CharSet(_) | ExprKind::Ref(_) => vec![],
            ExprKind::Seq(items) | ExprKind::Choice(items) => items.clone(),
            ExprKind::Repeat { expr, .. } => vec![*expr],
            ExprKind::List { element, separator, .. } => vec![*element, *separator],
            ExprKind::Lookahead { expr, .. } => vec![*expr],
            ExprKind::Hide(expr) => vec![*expr],
        }
    }
}

/// A builder that accumulates arena nodes for a fresh [`Grammar`]. Every
/// transform constructs one of these instead of mutating its input grammar.
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    arena: Vec<ExprNode>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: ExprKind, label: Option<String>) -> ExprId {
        self.arena.push(ExprNode::new(kind, label));
        ExprId::new(self.arena.len() - 1)
    }

    /// Look up a node already pushed into this builder's arena. Used by
    /// rewriters that need to inspect a child after it has already been
    /// rebuilt (the child ids a rewriter sees refer to this arena, not the
    /// grammar being transformed).
    pub fn get(&self, id: ExprId) -> &ExprNode {
        &self.arena[id.index()]
    }

    pub fn get_mut(&mut self, id: ExprId) -> &mut ExprNode {
        &mut self.arena[id.index()]
    }

    pub fn finish(self, rules: Vec<Rule>) -> Grammar {
        Grammar::new(rules, self.arena)
    }
}

/// Renders an expression in a Mage-like textual form, used by diagnostics and
/// by [`Grammar`]'s `Display`-adjacent debug helpers (`impl_grammar` in the
/// source).
pub fn render_expr(grammar: &Grammar, id: ExprId) -> String {
    let mut out = String::new();
    render_expr_into(grammar, id, &mut out);
    out
}

fn render_expr_into(grammar: &Grammar, id: ExprId, out: &mut String) {
    match grammar.kind(id) {
        ExprKind::Lit(text) => out.push_str(&format!("{text:?}")),
        ExprKind::CharSet(cs) => {
            out.push('[');
            if cs.invert {
                out.push('^');
            }
            for elem in &cs.elements {
                match elem {
                    CharSetElem::Char(c) => out.push(*c),
                    CharSetElem::Range(lo, hi) => out.push_str(&format!("{lo}-{hi}")),
                }
            }
            out.push(']');
        }
        ExprKind::Ref(name) => out.push_str(name),
        ExprKind::Seq(items) => {
            for (i, item) in items.iter().enumerate() {
                if i != 0 {
                    out.push(' ');
                }
                render_expr_into(grammar, *item, out);
            }
        }
        ExprKind::Choice(items) => {
            for (i, item) in items.iter().enumerate() {
                if i != 0 {
                    out.push_str(" | ");
                }
                render_expr_into(grammar, *item, out);
            }
        }
        ExprKind::Repeat { expr, min, max } => {
            render_expr_into(grammar, *expr, out);
            match (*min, *max) {
                (0, 1) => out.push('?'),
                (0, UNBOUNDED) => out.push('*'),
                (1, UNBOUNDED) => out.push('+'),
                (min, max) if max == UNBOUNDED => out.push_str(&format!("{{{min},}}")),
                (min, max) => out.push_str(&format!("{{{min},{max}}}")),
            }
        }
        ExprKind::List { element, separator, min_count } => {
            render_expr_into(grammar, *element, out);
            out.push('(');
            render_expr_into(grammar, *separator, out);
            out.push(' ');
            render_expr_into(grammar, *element, out);
            out.push_str(if *min_count > 0 { ")+" } else { ")*" });
        }
        ExprKind::Lookahead { expr, negated } => {
            out.push(if *negated { '!' } else { '&' });
            render_expr_into(grammar, *expr, out);
        }
        ExprKind::Hide(expr) => {
            out.push('(');
            render_expr_into(grammar, *expr, out);
            out.push(')');
        }
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            if rule.is_public() {
                write!(f, "pub ")?;
            }
            write!(f, "{}", rule.name)?;
            if let Some(expr) = rule.expr {
                writeln!(f, " = {} ;", render_expr(self, expr))?;
            } else {
                writeln!(f, " ;")?;
            }
        }
        Ok(())
    }
}
