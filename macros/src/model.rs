use darling::{ast, FromDeriveInput, FromField};
use proc_macro2::TokenTree;
use quote::{format_ident, quote, ToTokens};
use syn::{punctuated::Punctuated, Meta, Token};

#[derive(Debug, FromDeriveInput)]
#[darling(supports(struct_named), forward_attrs)]
struct ModelInputReceiver {
	ident: syn::Ident,

	generics: syn::Generics,

	data: ast::Data<(), ModelFieldReceiver>,

	attrs: Vec<syn::Attribute>,
}

#[derive(Debug, FromField)]
#[darling(forward_attrs)]
struct ModelFieldReceiver {
	ident: Option<syn::Ident>,

	ty: syn::Type,
	vis: syn::Visibility,

	attrs: Vec<syn::Attribute>,
}

/// Returns `true` for `#[serde(skip)]` and `#[serde(skip_deserializing)]`.
fn is_skipped(attr: &syn::Attribute) -> bool {
	let Meta::List(ref list) = attr.meta else {
		return false;
	};

	if !list.path.is_ident("serde") {
		return false;
	}

	list.tokens.to_token_stream().into_iter().any(|token| {
		matches!(token, TokenTree::Ident(ref ident) if ident == "skip_deserializing" || ident == "skip")
	})
}

/// Input structs are never read from a row, so `FromRow` is dropped from
/// forwarded derives.
fn input_attr(attr: &syn::Attribute) -> syn::Attribute {
	if !attr.path().is_ident("derive") {
		return attr.clone();
	}

	let Ok(paths) = attr.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)
	else {
		return attr.clone();
	};

	let paths = paths.into_iter().filter(|path| {
		path.segments
			.last()
			.map_or(true, |segment| segment.ident != "FromRow")
	});

	syn::parse_quote!(#[derive(#(#paths),*)])
}

pub fn from_input(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
	let input = syn::parse_macro_input!(input as syn::DeriveInput);
	let receiver = match ModelInputReceiver::from_derive_input(&input) {
		Ok(x) => x,
		Err(e) => return e.write_errors().into(),
	};

	let ident = &receiver.ident;
	let vis = &input.vis;
	let generics = &receiver.generics;
	let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
	let create_ident = format_ident!("Create{}Input", ident);
	let update_ident = format_ident!("Update{}Input", ident);

	let attrs = receiver.attrs.iter().map(input_attr).collect::<Vec<_>>();

	let Some(fields) = receiver.data.take_struct() else {
		return syn::Error::new_spanned(ident, "expected a struct with named fields")
			.into_compile_error()
			.into();
	};

	let fields = fields
		.iter()
		.filter_map(|field| {
			let ident = field.ident.as_ref()?;

			if field.attrs.iter().any(is_skipped) {
				return None;
			}

			let attrs = field
				.attrs
				.iter()
				.filter(|attr| !attr.path().is_ident("sqlx"))
				.collect::<Vec<_>>();

			Some((attrs, ident, &field.ty, &field.vis))
		})
		.collect::<Vec<_>>();

	let create_fields = fields.iter().map(|(attrs, ident, ty, vis)| {
		quote! {
			#(#attrs)*
			#vis #ident: #ty,
		}
	});

	let update_fields = fields.iter().map(|(attrs, ident, ty, vis)| {
		quote! {
			#(#attrs)*
			#vis #ident: Option<#ty>,
		}
	});

	let update_idents = fields.iter().map(|(_, ident, ..)| ident);

	quote! {
		#input

		#(#attrs)*
		#vis struct #create_ident #generics {
			#(
				#create_fields
			)*
		}

		#(#attrs)*
		#vis struct #update_ident #generics {
			#(
				#update_fields
			)*
		}

		impl #impl_generics #update_ident #ty_generics #where_clause {
			/// Returns `true` if no field would be changed by this update.
			#vis fn is_empty(&self) -> bool {
				true #(&& self.#update_idents.is_none())*
			}
		}
	}
	.into()
}
