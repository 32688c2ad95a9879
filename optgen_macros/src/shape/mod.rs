//! Field shape classification.
//!
//! Maps a field's declared type and its [`Directive`] to a [`FieldShape`],
//! which fixes the constructor's parameter list and how the setter wraps the
//! supplied value before assigning it. Inline records are classified
//! recursively into leaves so their constructors take one argument per leaf.

use proc_macro2::Span;
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{Ident, Type, TypePath, TypeTraitObject};

use crate::error::{GenerateError, GenerateResult};
use crate::parse::{
    Directive, FieldDeclaration, InlineRecords, OptionSpec, box_inner, interpret, is_string_like,
    option_inner, smart_pointer_inner, vec_inner,
};


/// Derived structure of a field.
#[derive(Clone, Debug)]
pub(crate) enum FieldShape {
    /// One argument of the field type, assigned as-is.
    Scalar,
    /// `Option<T>` with the pointer marker: takes `T`, stores `Some`.
    PointerToScalar { inner: Type, boxed: bool },
    /// `Vec<T>` with the variadic marker.
    SliceVariadic { elem: Type },
    /// `Option<Vec<T>>` with the variadic marker.
    PointerToSliceVariadic { elem: Type, boxed: bool },
    /// A struct marked `#[options(inline)]`.
    InlineRecord { record: Ident, leaves: Vec<ClassifiedField> },
    /// `Option<Record>` or `Option<Box<Record>>` of an inline record.
    PointerToInlineRecord {
        record: Ident,
        leaves: Vec<ClassifiedField>,
        boxed: bool,
    },
    /// Function pointers and shared `dyn Fn*` values.
    OpaqueCallable,
    /// `Dynamic` and shared `dyn Trait` values.
    OpaqueDynamic,
    /// A type reached through an external namespace, e.g. `time::Duration`.
    QualifiedExternal { namespace: syn::Path, local: Ident },
}

/// A field together with its interpreted annotation and shape.
#[derive(Clone, Debug)]
pub(crate) struct ClassifiedField {
    pub decl: FieldDeclaration,
    pub directive: Directive,
    pub shape: FieldShape,
}

impl ClassifiedField {
    pub(crate) fn is_skipped(&self) -> bool {
        matches!(self.directive, Directive::Skip)
    }

    pub(crate) fn default_literal(&self) -> Option<&str> {
        match &self.directive {
            Directive::Skip => None,
            Directive::Generate(spec) => spec.default.as_deref(),
        }
    }

    /// The field holds an opaque value outside `Option`, so there is no
    /// `Default` to seed it with.
    pub(crate) fn lacks_zero_value(&self) -> bool {
        matches!(
            self.shape,
            FieldShape::OpaqueCallable | FieldShape::OpaqueDynamic
        ) && option_inner(&self.decl.ty).is_none()
    }
}

/// Classifies every field of a declaration in order.
pub(crate) fn classify_fields(
    fields: &[FieldDeclaration],
    inline: &InlineRecords,
) -> GenerateResult<Vec<ClassifiedField>> {
    let mut stack = Vec::new();
    classify_all(fields, inline, &mut stack)
}

fn classify_all(
    fields: &[FieldDeclaration],
    inline: &InlineRecords,
    stack: &mut Vec<String>,
) -> GenerateResult<Vec<ClassifiedField>> {
    fields
        .iter()
        .map(|field| {
            let directive = interpret(field)?;
            let shape = classify(field, &directive, inline, stack)?;
            Ok(ClassifiedField {
                decl: field.clone(),
                directive,
                shape,
            })
        })
        .collect()
}

fn classify(
    field: &FieldDeclaration,
    directive: &Directive,
    inline: &InlineRecords,
    stack: &mut Vec<String>,
) -> GenerateResult<FieldShape> {
    let spec = directive.spec();
    let ty = &field.ty;
    let span = ty.span();

    if spec.variadic {
        return classify_variadic(field, ty, span);
    }
    if let Some(shape) = classify_inline(field, &spec, inline, stack)? {
        return Ok(shape);
    }
    if spec.pointer {
        let Some(inner) = option_inner(ty) else {
            return Err(GenerateError::unsupported(
                field.name(),
                "the `*` marker requires an `Option<T>` field",
                span,
            ));
        };
        return Ok(match box_inner(inner) {
            Some(boxed) => FieldShape::PointerToScalar {
                inner: boxed.clone(),
                boxed: true,
            },
            None => FieldShape::PointerToScalar {
                inner: inner.clone(),
                boxed: false,
            },
        });
    }
    if let Some(shape) = classify_opaque(field, directive)? {
        return Ok(shape);
    }
    Ok(classify_qualified(ty).unwrap_or(FieldShape::Scalar))
}

fn classify_variadic(
    field: &FieldDeclaration,
    ty: &Type,
    span: Span,
) -> GenerateResult<FieldShape> {
    if let Some(elem) = vec_inner(ty) {
        return Ok(FieldShape::SliceVariadic { elem: elem.clone() });
    }
    if let Some(inner) = option_inner(ty) {
        if let Some(elem) = vec_inner(inner) {
            return Ok(FieldShape::PointerToSliceVariadic {
                elem: elem.clone(),
                boxed: false,
            });
        }
        if let Some(elem) = box_inner(inner).and_then(vec_inner) {
            return Ok(FieldShape::PointerToSliceVariadic {
                elem: elem.clone(),
                boxed: true,
            });
        }
    }
    Err(GenerateError::unsupported(
        field.name(),
        "the `...` marker requires a `Vec<T>` or `Option<Vec<T>>` field",
        span,
    ))
}

fn classify_inline(
    field: &FieldDeclaration,
    spec: &OptionSpec,
    inline: &InlineRecords,
    stack: &mut Vec<String>,
) -> GenerateResult<Option<FieldShape>> {
    let ty = &field.ty;
    let (target, pointer, boxed) = if let Some(inner) = option_inner(ty) {
        match box_inner(inner) {
            Some(boxed) => (boxed, true, true),
            None => (inner, true, false),
        }
    } else {
        (ty, false, false)
    };
    let Some((name, record_fields)) = inline.lookup(target) else {
        return Ok(None);
    };

    let span = ty.span();
    if spec.pointer && !pointer {
        return Err(GenerateError::unsupported(
            field.name(),
            "the `*` marker requires an `Option<T>` field",
            span,
        ));
    }
    if spec.default.is_some() {
        return Err(GenerateError::unsupported(
            field.name(),
            format!("defaults apply to the leaf fields of `{name}`, not the record itself"),
            span,
        ));
    }
    if stack.iter().any(|seen| seen == name) {
        return Err(GenerateError::unsupported(
            field.name(),
            format!("inline record `{name}` contains itself"),
            span,
        ));
    }

    stack.push(name.to_owned());
    let classified = classify_all(record_fields, inline, stack);
    stack.pop();
    let leaves = classified?;
    if let Some(leaf) = leaves
        .iter()
        .find(|leaf| leaf.is_skipped() && leaf.lacks_zero_value())
    {
        return Err(GenerateError::unsupported(
            field.name(),
            format!(
                "skipped leaf `{}` of `{name}` has no default to rebuild the record with; \
                 wrap it in `Option`",
                leaf.decl.name()
            ),
            span,
        ));
    }
    let record = Ident::new(name, Span::call_site());
    Ok(Some(if pointer {
        FieldShape::PointerToInlineRecord {
            record,
            leaves,
            boxed,
        }
    } else {
        FieldShape::InlineRecord { record, leaves }
    }))
}

/// Recognises callables and type-erased values.
///
/// Options clone their arguments on every apply, so a `Box<dyn ..>` option
/// field is rejected in favour of the shared pointers. Skipped fields are
/// never cloned and keep any pointer.
fn classify_opaque(
    field: &FieldDeclaration,
    directive: &Directive,
) -> GenerateResult<Option<FieldShape>> {
    let ty = &field.ty;
    let base = option_inner(ty).unwrap_or(ty);
    if matches!(base, Type::BareFn(_)) {
        return Ok(Some(FieldShape::OpaqueCallable));
    }
    if last_segment_is(base, "Dynamic") {
        return Ok(Some(FieldShape::OpaqueDynamic));
    }
    let Some(Type::TraitObject(object)) = smart_pointer_inner(base) else {
        return Ok(None);
    };
    if box_inner(base).is_some() && !matches!(directive, Directive::Skip) {
        return Err(GenerateError::unsupported(
            field.name(),
            "`Box<dyn ..>` cannot be cloned into an option; use `Arc<dyn ..>` or `Rc<dyn ..>`",
            ty.span(),
        ));
    }
    Ok(Some(if is_callable_object(object) {
        FieldShape::OpaqueCallable
    } else {
        FieldShape::OpaqueDynamic
    }))
}

fn last_segment_is(ty: &Type, name: &str) -> bool {
    let Type::Path(TypePath { qself: None, path }) = ty else {
        return false;
    };
    path.segments
        .last()
        .is_some_and(|seg| seg.ident == name && seg.arguments.is_empty())
}

fn is_callable_object(object: &TypeTraitObject) -> bool {
    object.bounds.iter().any(|bound| match bound {
        syn::TypeParamBound::Trait(tr) => tr
            .path
            .segments
            .last()
            .is_some_and(|seg| matches!(seg.ident.to_string().as_str(), "Fn" | "FnMut" | "FnOnce")),
        _ => false,
    })
}

/// Roots that refer to the current crate rather than an external namespace.
const LOCAL_ROOTS: [&str; 4] = ["crate", "self", "super", "Self"];

/// Splits `ns::Type` into its namespace and final identifier.
///
/// Returns `None` for single-segment paths, absolute `::` paths and paths
/// rooted in the current crate.
pub(crate) fn qualified_parts(path: &syn::Path) -> Option<(syn::Path, Ident)> {
    if path.leading_colon.is_some() || path.segments.len() < 2 {
        return None;
    }
    let first = path.segments.first()?;
    if LOCAL_ROOTS.iter().any(|root| first.ident == root) {
        return None;
    }
    let local = path.segments.last()?.ident.clone();
    let namespace = syn::Path {
        leading_colon: None,
        segments: path
            .segments
            .iter()
            .take(path.segments.len() - 1)
            .map(|seg| syn::PathSegment::from(seg.ident.clone()))
            .collect(),
    };
    Some((namespace, local))
}

fn classify_qualified(ty: &Type) -> Option<FieldShape> {
    let Type::Path(TypePath { qself: None, path }) = ty else {
        return None;
    };
    let (namespace, local) = qualified_parts(path)?;
    Some(FieldShape::QualifiedExternal { namespace, local })
}

/// How an argument renders in the generated `Display` implementation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Render {
    /// Text types render through `Display`.
    Text,
    /// Everything else renders through `Debug`.
    Debug,
    /// Variadic sequences render as `[a b c]`.
    List(Box<Render>),
    Callable,
    Dynamic,
}

impl Render {
    fn for_type(ty: &Type) -> Self {
        if is_string_like(ty) {
            Self::Text
        } else {
            Self::Debug
        }
    }
}

/// One constructor argument derived from a shape.
#[derive(Clone, Debug)]
pub(crate) struct Param {
    /// Argument name, also the option struct's field name.
    pub ident: Ident,
    /// Key used when several arguments render as `{key:value ...}`.
    pub label: String,
    /// Type stored in the option struct.
    pub stored: Type,
    /// Element type when the constructor accepts `impl IntoIterator`.
    pub variadic: Option<Type>,
    pub render: Render,
    /// The argument is opaque and excluded from equality.
    pub opaque: bool,
}

impl ClassifiedField {
    /// Parameter list of the option constructor for this field.
    pub(crate) fn params(&self) -> Vec<Param> {
        let ident = self.decl.ident.clone();
        let label = ident.unraw().to_string();
        params_for(ident, label, &self.decl.ty, &self.shape)
    }
}

fn params_for(ident: Ident, label: String, ty: &Type, shape: &FieldShape) -> Vec<Param> {
    let single = |stored: Type, variadic: Option<Type>, render: Render, opaque: bool| {
        vec![Param {
            ident: ident.clone(),
            label: label.clone(),
            stored,
            variadic,
            render,
            opaque,
        }]
    };
    match shape {
        FieldShape::Scalar | FieldShape::QualifiedExternal { .. } => {
            single(ty.clone(), None, Render::for_type(ty), false)
        }
        FieldShape::PointerToScalar { inner, .. } => {
            single(inner.clone(), None, Render::for_type(inner), false)
        }
        FieldShape::SliceVariadic { elem } | FieldShape::PointerToSliceVariadic { elem, .. } => {
            single(
                syn::parse_quote!(::std::vec::Vec<#elem>),
                Some(elem.clone()),
                Render::List(Box::new(Render::for_type(elem))),
                false,
            )
        }
        FieldShape::OpaqueCallable => single(ty.clone(), None, Render::Callable, true),
        FieldShape::OpaqueDynamic => single(ty.clone(), None, Render::Dynamic, true),
        FieldShape::InlineRecord { leaves, .. }
        | FieldShape::PointerToInlineRecord { leaves, .. } => leaf_params(None, leaves),
    }
}

/// Argument name and display label of an inline-record leaf.
///
/// Leaves of the outermost record keep their own names; nested leaves are
/// labelled with the dotted path leading to them and named by that path with
/// underscores.
pub(crate) fn leaf_binding(prefix: Option<&str>, leaf: &ClassifiedField) -> (Ident, String) {
    let name = leaf.decl.ident.unraw().to_string();
    match prefix {
        Some(parent) => {
            let label = format!("{parent}.{name}");
            (Ident::new(&label.replace('.', "_"), Span::call_site()), label)
        }
        None => (leaf.decl.ident.clone(), name),
    }
}

/// Flattens the non-skipped leaves of an inline record, recursively.
fn leaf_params(prefix: Option<&str>, leaves: &[ClassifiedField]) -> Vec<Param> {
    leaves
        .iter()
        .filter(|leaf| !leaf.is_skipped())
        .flat_map(|leaf| {
            let (ident, label) = leaf_binding(prefix, leaf);
            match &leaf.shape {
                FieldShape::InlineRecord { leaves: inner, .. }
                | FieldShape::PointerToInlineRecord { leaves: inner, .. } => {
                    leaf_params(Some(&label), inner)
                }
                shape => params_for(ident, label, &leaf.decl.ty, shape),
            }
        })
        .collect()
}
