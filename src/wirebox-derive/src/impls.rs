use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::token::Comma;
use syn::{
    Attribute, Error as SynError, FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, LitStr, Meta,
    Path, Result as SynResult, ReturnType, Signature, Type, TypePath,
};

#[derive(Debug)]
struct ConstructorData {
    self_type: TypePath,
    identifier: Ident,
    parameters: Vec<ParameterData>,
}

#[derive(Debug)]
struct ParameterData {
    span: Span,
    ty: Type,
    dependency: DependencyData,
}

#[derive(Debug)]
enum DependencyData {
    Literal(LitStr),
    Type(Path),
}

pub fn expand_implementation(impls: TokenStream) -> SynResult<TokenStream2> {
    let mut impls = match syn::parse::<ItemImpl>(impls) {
        Ok(impls) => impls,
        Err(err) => {
            return Err(SynError::new(
                err.span(),
                "`#[injectable]` should be annotated on an inherent `impl` block",
            ))
        }
    };

    if let Some((_, path, _)) = &impls.trait_ {
        return Err(SynError::new(
            path.span(),
            "`#[injectable]` does not support trait `impl` blocks",
        ));
    }
    if !impls.generics.params.is_empty() {
        return Err(SynError::new(
            impls.generics.span(),
            "`#[injectable]` does not support generic types",
        ));
    }

    let self_type = get_self_type(&impls)?;
    let signature = get_constructor_signature(&impls.items, impls.span())?;
    let ctor_data = parse_constructor(self_type, signature)?;

    let expanded = expand_injectable_implementation(&ctor_data)?;

    strip_helper_attributes(&mut impls);

    Ok(quote! {
        #impls
        #expanded
    })
}

fn get_self_type(impls: &ItemImpl) -> SynResult<TypePath> {
    if let Type::Path(ty) = impls.self_ty.as_ref() {
        Ok(ty.clone())
    } else {
        Err(SynError::new(impls.self_ty.span(), "invalid self type"))
    }
}

fn get_constructor_signature(items: &[ImplItem], impl_span: Span) -> SynResult<Signature> {
    let ctors: Vec<_> = items
        .iter()
        .filter_map(filter_and_map_item_fn)
        .filter(|item_fn| item_fn.attrs.iter().any(is_constructor_marker))
        .collect();

    let signature = if ctors.len() > 1 {
        return Err(SynError::new(
            impl_span,
            "only one associated function can be marked as the `#[inject]` constructor",
        ));
    } else if let Some(&ctor) = ctors.first() {
        ctor.sig.clone()
    } else {
        return Err(SynError::new(
            impl_span,
            "no associated function is marked with `#[inject]`",
        ));
    };

    if let Some(FnArg::Receiver(rec)) = signature.inputs.first() {
        return Err(SynError::new(
            rec.span(),
            "a method cannot be the `#[inject]` constructor",
        ));
    }

    Ok(signature)
}

fn filter_and_map_item_fn(item: &ImplItem) -> Option<&ImplItemFn> {
    if let ImplItem::Fn(impl_fn) = item {
        Some(impl_fn)
    } else {
        None
    }
}

fn is_constructor_marker(attr: &Attribute) -> bool {
    matches!(&attr.meta, Meta::Path(path) if path.is_ident("inject"))
}

fn is_dependency_annotation(attr: &Attribute) -> bool {
    matches!(&attr.meta, Meta::List(list) if list.path.is_ident("inject"))
}

fn parse_constructor(self_type: TypePath, signature: Signature) -> SynResult<ConstructorData> {
    check_constructor_return_type(&signature.output, &self_type)?;
    let identifier = signature.ident;
    let parameters = parse_constructor_parameters(signature.inputs)?;

    Ok(ConstructorData {
        self_type,
        identifier,
        parameters,
    })
}

fn check_constructor_return_type(output: &ReturnType, self_type: &TypePath) -> SynResult<()> {
    let ReturnType::Type(_, return_type) = output else {
        return Err(SynError::new(
            output.span(),
            "a constructor should return `Self`",
        ));
    };
    let Type::Path(return_type) = return_type.as_ref() else {
        return Err(SynError::new(
            return_type.span(),
            "a constructor should return `Self`",
        ));
    };

    if return_type.path.is_ident("Self") || return_type == self_type {
        Ok(())
    } else {
        Err(SynError::new(
            return_type.span(),
            "a constructor should return `Self`",
        ))
    }
}

fn parse_constructor_parameters(inputs: Punctuated<FnArg, Comma>) -> SynResult<Vec<ParameterData>> {
    inputs
        .into_iter()
        .map(|arg| {
            let FnArg::Typed(arg) = arg else {
                unreachable!("a constructor should not have a receiver argument");
            };
            let dependency = parse_parameter_attributes(&arg.attrs, arg.span())?;
            Ok(ParameterData {
                span: arg.span(),
                ty: *arg.ty,
                dependency,
            })
        })
        .collect()
}

fn parse_parameter_attributes(attrs: &[Attribute], param_span: Span) -> SynResult<DependencyData> {
    let mut res = None;

    for attr in attrs {
        let list = match &attr.meta {
            Meta::List(list) if list.path.is_ident("inject") => list,
            Meta::Path(path) if path.is_ident("inject") => {
                return Err(SynError::new(
                    path.span(),
                    "expects `#[inject(...)]` to name a dependency identifier",
                ));
            }
            _ => continue,
        };

        if res.is_some() {
            return Err(SynError::new(
                list.span(),
                "only one `#[inject(...)]` annotation is allowed per parameter",
            ));
        }

        let dependency = if let Ok(name) = syn::parse2::<LitStr>(list.tokens.clone()) {
            DependencyData::Literal(name)
        } else if let Ok(path) = syn::parse2::<Path>(list.tokens.clone()) {
            DependencyData::Type(path)
        } else {
            return Err(SynError::new(
                list.tokens.span(),
                "expects `#[inject(...)]` to receive a string literal or a type",
            ));
        };
        res = Some(dependency);
    }

    res.ok_or_else(|| {
        SynError::new(
            param_span,
            "every constructor parameter needs an `#[inject(...)]` annotation naming its dependency",
        )
    })
}

fn strip_helper_attributes(impls: &mut ItemImpl) {
    for item in &mut impls.items {
        if let ImplItem::Fn(item_fn) = item {
            item_fn
                .attrs
                .retain(|attr| !is_constructor_marker(attr) && !is_dependency_annotation(attr));
            for arg in &mut item_fn.sig.inputs {
                if let FnArg::Typed(arg) = arg {
                    arg.attrs
                        .retain(|attr| !is_constructor_marker(attr) && !is_dependency_annotation(attr));
                }
            }
        }
    }
}

fn expand_injectable_implementation(ctor_data: &ConstructorData) -> SynResult<TokenStream2> {
    let self_type = &ctor_data.self_type;
    let constructor = &ctor_data.identifier;
    let name = type_name_literal(self_type)?;

    let annotate_fn = expand_annotate_fn(ctor_data);

    let take_statements = ctor_data
        .parameters
        .iter()
        .enumerate()
        .map(|(i, parameter)| {
            let dep = Ident::new(&format!("dep{i}"), parameter.span);
            let ty = &parameter.ty;
            quote! { let #dep = arguments.take::<#ty>()?; }
        })
        .collect::<TokenStream2>();

    let dep_args = ctor_data
        .parameters
        .iter()
        .enumerate()
        .map(|(i, parameter)| {
            let dep = Ident::new(&format!("dep{i}"), parameter.span);
            quote! { #dep, }
        })
        .collect::<TokenStream2>();

    let arguments_binding = if ctor_data.parameters.is_empty() {
        quote! { arguments }
    } else {
        quote! { mut arguments }
    };

    Ok(quote! {
        impl wirebox::provider::Injectable for #self_type {
            const NAME: &'static str = #name;

            #annotate_fn

            fn construct(
                #arguments_binding: wirebox::provider::Arguments,
            ) -> std::result::Result<Self, wirebox::provider::ArgumentError> {
                #take_statements
                arguments.finish()?;
                std::result::Result::Ok(Self::#constructor(#dep_args))
            }
        }
    })
}

fn expand_annotate_fn(ctor_data: &ConstructorData) -> TokenStream2 {
    if ctor_data.parameters.is_empty() {
        return TokenStream2::new();
    }

    let annotate_statements = ctor_data
        .parameters
        .iter()
        .enumerate()
        .map(|(i, parameter)| {
            let identifier = dependency_identifier(&parameter.dependency);
            quote! {
                wirebox::annotation::TypedRecorder::annotate::<Self>(recorder, #i, #identifier)?;
            }
        })
        .collect::<TokenStream2>();

    quote! {
        fn annotate(
            recorder: &dyn wirebox::annotation::Recorder,
        ) -> std::result::Result<(), wirebox::annotation::AnnotationError> {
            #annotate_statements
            std::result::Result::Ok(())
        }
    }
}

fn dependency_identifier(dependency: &DependencyData) -> TokenStream2 {
    match dependency {
        DependencyData::Literal(name) => quote! { #name },
        DependencyData::Type(path) => quote! { <#path as wirebox::provider::Injectable>::NAME },
    }
}

fn type_name_literal(self_type: &TypePath) -> SynResult<LitStr> {
    let Some(segment) = self_type.path.segments.last() else {
        return Err(SynError::new(self_type.span(), "invalid self type"));
    };
    Ok(LitStr::new(&segment.ident.to_string(), segment.ident.span()))
}
