mod impls;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use syn::spanned::Spanned;
use syn::{Error as SynError, Result as SynResult};

#[proc_macro_attribute]
pub fn injectable(attr: TokenStream, item: TokenStream) -> TokenStream {
    match injectable_impl(attr, item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

fn injectable_impl(attr: TokenStream, item: TokenStream) -> SynResult<TokenStream2> {
    if !attr.is_empty() {
        let attr = TokenStream2::from(attr);
        return Err(SynError::new(attr.span(), "`#[injectable]` takes no arguments"));
    }
    impls::expand_implementation(item)
}
