//! Treespec inference: deriving a typed concrete-syntax-tree specification
//! from a normalized [`crate::grammar::Grammar`].

mod builder;
mod types;

pub use builder::build_specs;
pub use types::{
    do_types_shallow_overlap, expand_variant_types, flatten_union, is_cyclic, is_optional,
    is_static, is_type_assignable, is_unit, make_optional, make_unit, mangle_type,
    merge_similar_types, simplify_type, spec_to_type, Field, NodeSpec, Spec, Specs, TokenSpec,
    Type, VariantSpec,
};
