mod model;
mod route;

use proc_macro::TokenStream;

/// Creates a new documentation function for the route, named after the original function with the suffix `_docs`.
///
/// The first line of the doc comment becomes the operation summary and the
/// remaining lines, if any, its description.
#[proc_macro_attribute]
pub fn route(args: TokenStream, input: TokenStream) -> TokenStream {
	route::from_input(args, input)
}

/// Creates two new structs for the model: `CreateXInput` and `UpdateXInput`.
/// For both, fields with #[serde(skip_deserializing)] are skipped and all other
/// fields are included verbatim (including attributes). Every field of the update
/// input is optional, and `UpdateXInput::is_empty` reports whether any was supplied.
#[proc_macro_attribute]
pub fn model(_args: TokenStream, input: TokenStream) -> TokenStream {
	model::from_input(input)
}
