extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Derives [`SchedulerError`](../error/trait.SchedulerError.html) for a type that already
/// implements [`std::error::Error`] and [`Kind`](../kind/trait.Kind.html).
#[proc_macro_derive(SchedulerError)]
pub fn scheduler_error(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident;
    quote!(
        impl SchedulerError for #name {}
    )
    .into()
}
