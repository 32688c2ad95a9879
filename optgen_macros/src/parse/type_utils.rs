//! Type introspection helpers.
//!
//! These utilities perform shallow inspection of `syn::Type` values to
//! recognise wrapper types such as `Option<T>`, `Vec<T>` and the owning
//! smart pointers, and to spot string-like types whose defaults need quoting.

use syn::{GenericArgument, PathArguments, Type, TypePath};

/// Extract the first type argument from a `PathArguments` container.
fn extract_first_type_argument(args: &PathArguments) -> Option<&Type> {
    let PathArguments::AngleBracketed(angle_args) = args else {
        return None;
    };
    angle_args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    })
}

/// Returns the generic parameter if `ty` is the provided wrapper.
///
/// The check is shallow: it inspects only the outermost path and supports
/// common fully-qualified forms like `std::option::Option<T>`. The function is
/// not recursive.
fn type_inner<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(TypePath { qself: None, path }) = ty else {
        return None;
    };
    let last = path.segments.last()?;
    if last.ident != wrapper {
        return None;
    }
    extract_first_type_argument(&last.arguments)
}

/// Returns the inner type if `ty` is `Option<T>`.
///
/// Not recursive: `Option<Vec<T>>` yields `Vec<T>`.
pub(crate) fn option_inner(ty: &Type) -> Option<&Type> {
    type_inner(ty, "Option")
}

/// Extracts the element type `T` if `ty` is `Vec<T>`.
pub(crate) fn vec_inner(ty: &Type) -> Option<&Type> {
    type_inner(ty, "Vec")
}

/// Extracts `T` if `ty` is `Box<T>`.
pub(crate) fn box_inner(ty: &Type) -> Option<&Type> {
    type_inner(ty, "Box")
}

/// Extracts `T` if `ty` is one of the owning pointers `Box`, `Arc` or `Rc`.
pub(crate) fn smart_pointer_inner(ty: &Type) -> Option<&Type> {
    ["Box", "Arc", "Rc"]
        .into_iter()
        .find_map(|wrapper| type_inner(ty, wrapper))
}

/// Returns the identifier of a bare single-segment path type such as `Pair`.
pub(crate) fn single_ident(ty: &Type) -> Option<&syn::Ident> {
    let Type::Path(TypePath { qself: None, path }) = ty else {
        return None;
    };
    if path.leading_colon.is_some() || path.segments.len() != 1 {
        return None;
    }
    let segment = path.segments.first()?;
    matches!(segment.arguments, PathArguments::None).then_some(&segment.ident)
}

/// Reports whether `ty` holds text: `String`, `&str`, `Cow<str>` and the
/// owning pointers to `str`.
pub(crate) fn is_string_like(ty: &Type) -> bool {
    match ty {
        Type::Reference(reference) => is_str(&reference.elem),
        Type::Path(TypePath { qself: None, path }) => {
            let Some(last) = path.segments.last() else {
                return false;
            };
            match last.ident.to_string().as_str() {
                "String" => true,
                "Cow" | "Box" | "Arc" | "Rc" => {
                    extract_first_type_argument(&last.arguments).is_some_and(is_str)
                }
                _ => false,
            }
        }
        Type::Group(group) => is_string_like(&group.elem),
        Type::Paren(paren) => is_string_like(&paren.elem),
        _ => false,
    }
}

fn is_str(ty: &Type) -> bool {
    single_ident(ty).is_some_and(|ident| ident == "str")
}
