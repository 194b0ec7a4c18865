use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod fragment;
mod merge;

/// Generates a `Fragment` mirror type, where every field is replaced by its
/// `Option`al (or nested-fragment) counterpart.
///
/// See [`radius_core::config::fragment`](../radius_core/config/fragment/index.html) for usage.
#[proc_macro_derive(Fragment, attributes(fragment, fragment_attrs))]
pub fn derive_fragment(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    fragment::derive(input).into()
}

/// Generates a [`Merge`](../radius_core/config/merge/trait.Merge.html) implementation that
/// merges a fragment's fields with a set of defaults, field-by-field.
#[proc_macro_derive(Merge, attributes(merge))]
pub fn derive_merge(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    merge::derive(input).into()
}
