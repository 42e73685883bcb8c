mod structures;

use proc_macro::TokenStream;
use quote::quote;
use structures::ErrorKindTarget;
use syn::parse_macro_input;

/// Derives the [`ErrorKind`] trait for the given struct.
///
/// This trait can be derived for any struct that is not a tuple struct.
///
/// The information of the error is customized using the `error` attribute by adding the
/// corresponding tags to it:
/// ```
/// use echem_attrs::ErrorKind;
///
/// #[derive(Debug, ErrorKind)]
/// #[error(
///     message = format!("unknown parameter `{}`", name),
///     labels = ["this row"],
///     help = "check the spelling of the parameter name",
/// )]
/// pub struct Foo {
///     name: String,
/// }
/// ```
///
/// The following tags are available:
///
/// | Tag         | Description                                                                  |
/// | ----------- | ---------------------------------------------------------------------------- |
/// | `message`   | The message displayed at the top of the error when it is displayed.          |
/// | `labels`    | An array of label texts, one for each span the error is created with.        |
/// | `help`      | Optional help text for the error, describing what the user can do to fix it. |
/// | `note`      | Optional note with additional context.                                       |
///
/// Each tag accepts an expression that should evaluate to something implementing
/// [`ToString`]. For structs with named fields, the expression is evaluated with the members of
/// the struct in scope, so they can be used in the expression directly, or through `self`.
///
/// Labels are paired with the error's spans in order; extra labels or extra spans are ignored.
/// An empty label string highlights its span without any text.
///
/// [`ErrorKind`]: https://docs.rs/echem-error
#[proc_macro_derive(ErrorKind, attributes(error))]
pub fn error_kind(item: TokenStream) -> TokenStream {
    let target = parse_macro_input!(item as ErrorKindTarget);
    let name = &target.name;
    quote! {
        impl echem_error::ErrorKind for #name {
            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
            #target
        }
    }.into()
}
