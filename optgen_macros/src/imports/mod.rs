//! Import and qualifier resolution.
//!
//! Field types may name external namespaces directly (`std::time::Duration`)
//! or through a local alias (`time2::Duration`). Every such reference must be
//! declared in the policy's `imports` table. Each namespace is imported once
//! under a canonical name derived from its path, and emitted types are
//! rewritten to use that name, so the same namespace reached through several
//! aliases (or from several declarations) yields a single import.

use std::collections::BTreeMap;

use proc_macro2::{Span, TokenStream};
use quote::{ToTokens, quote};
use syn::ext::IdentExt;
use syn::visit::Visit;
use syn::visit_mut::VisitMut;
use syn::{Ident, Path, PathSegment, Type, TypePath};

use crate::error::{ErrorKind, GenerateError, GenerateResult};
use crate::parse::AliasEntry;
use crate::shape::{ClassifiedField, FieldShape, qualified_parts};


/// One `use` statement of the emitted unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Import {
    pub path: Path,
    pub canonical: Ident,
}

impl ToTokens for Import {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let Self { path, canonical } = self;
        let simple = path.segments.len() == 1
            && path
                .segments
                .first()
                .is_some_and(|seg| seg.ident == *canonical);
        tokens.extend(if simple {
            quote! { #[allow(unused_imports)] use #path; }
        } else {
            quote! { #[allow(unused_imports)] use #path as #canonical; }
        });
    }
}

/// Imports keyed by canonical path so merging is deterministic.
#[derive(Clone, Debug, Default)]
pub(crate) struct ImportSet {
    entries: BTreeMap<String, Import>,
}

/// Two namespaces whose canonical names coincide, e.g. `a_b::c` and
/// `a::b_c`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ImportClash {
    pub existing: String,
    pub incoming: String,
    pub canonical: Ident,
}

impl ImportClash {
    pub(crate) fn detail(&self) -> String {
        let Self {
            existing,
            incoming,
            canonical,
        } = self;
        format!("namespaces `{existing}` and `{incoming}` would both be imported as `{canonical}`")
    }
}

impl ImportSet {
    fn insert(&mut self, path: &Path) -> Result<(), ImportClash> {
        let import = Import {
            path: path.clone(),
            canonical: canonical_ident(path),
        };
        self.check(&path_key(path), &import)?;
        self.entries.entry(path_key(path)).or_insert(import);
        Ok(())
    }

    /// Reports an entry under another path that already uses the canonical
    /// name of `import`.
    fn check(&self, key: &str, import: &Import) -> Result<(), ImportClash> {
        self.entries
            .iter()
            .find(|(other, held)| other.as_str() != key && held.canonical == import.canonical)
            .map_or(Ok(()), |(existing, _)| {
                Err(ImportClash {
                    existing: existing.clone(),
                    incoming: key.to_owned(),
                    canonical: import.canonical.clone(),
                })
            })
    }

    /// Folds `other` into `self`; shared namespaces stay single entries.
    ///
    /// Nothing is merged when a namespace of `other` clashes with one
    /// already held.
    pub(crate) fn merge(&mut self, other: &Self) -> Result<(), ImportClash> {
        for (key, import) in &other.entries {
            self.check(key, import)?;
        }
        for (key, import) in &other.entries {
            self.entries
                .entry(key.clone())
                .or_insert_with(|| import.clone());
        }
        Ok(())
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Import> {
        self.entries.values()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

fn path_key(path: &Path) -> String {
    path.segments
        .iter()
        .map(|seg| seg.ident.unraw().to_string())
        .collect::<Vec<_>>()
        .join("::")
}

/// `std::time` becomes `std_time`; a single-segment path keeps its name.
fn canonical_ident(path: &Path) -> Ident {
    let joined = path
        .segments
        .iter()
        .map(|seg| seg.ident.unraw().to_string())
        .collect::<Vec<_>>()
        .join("_");
    Ident::new(&joined, Span::call_site())
}

/// Result of resolving one declaration's field types.
pub(crate) struct Resolved {
    table: Vec<AliasEntry>,
    pub imports: ImportSet,
}

impl Resolved {
    /// Rewrites qualified references inside `ty` to canonical import names.
    pub(crate) fn rewrite(&self, ty: &Type) -> Type {
        let mut out = ty.clone();
        Rewriter { resolved: self }.visit_type_mut(&mut out);
        out
    }

    fn canonical_for(&self, path: &Path) -> Option<Path> {
        let (namespace, rest) = match_entry(&self.table, path)?;
        let canonical = canonical_ident(&namespace);
        Some(Path {
            leading_colon: None,
            segments: std::iter::once(PathSegment::from(canonical))
                .chain(rest)
                .collect(),
        })
    }
}

/// Resolves every qualified type reachable from the non-skipped `fields`.
///
/// # Errors
///
/// Returns [`ErrorKind::UnresolvedNamespace`] naming the first field whose
/// type references a namespace missing from `table`, or whose namespace
/// would share its import name with another namespace.
pub(crate) fn resolve(fields: &[ClassifiedField], table: &[AliasEntry]) -> GenerateResult<Resolved> {
    let mut imports = ImportSet::default();
    for field in fields.iter().filter(|field| !field.is_skipped()) {
        let field_name = field.decl.name();
        for emitted in emitted_fields(field) {
            for path in references(emitted) {
                let span = syn::spanned::Spanned::span(&path);
                let Some((namespace, _)) = match_entry(table, &path) else {
                    let reference = path_key(&path);
                    return Err(GenerateError::new(
                        ErrorKind::UnresolvedNamespace,
                        field_name,
                        format!("`{reference}` is not covered by the `imports` table"),
                        span,
                    ));
                };
                imports.insert(&namespace).map_err(|clash| {
                    GenerateError::new(
                        ErrorKind::UnresolvedNamespace,
                        field_name.clone(),
                        clash.detail(),
                        span,
                    )
                })?;
            }
        }
    }
    Ok(Resolved {
        table: table.to_vec(),
        imports,
    })
}

/// Fields whose types end up spelled in generated code for `field`.
fn emitted_fields(field: &ClassifiedField) -> Vec<&ClassifiedField> {
    match &field.shape {
        FieldShape::InlineRecord { leaves, .. }
        | FieldShape::PointerToInlineRecord { leaves, .. } => leaves
            .iter()
            .filter(|leaf| !leaf.is_skipped())
            .flat_map(emitted_fields)
            .collect(),
        _ => vec![field],
    }
}

/// Qualified paths referenced by the type of `field`.
///
/// A field classified as a qualified external type contributes its own
/// namespace and local name; only its generic arguments are searched.
fn references(field: &ClassifiedField) -> Vec<Path> {
    let mut collector = Collector::default();
    match (&field.shape, &field.decl.ty) {
        (
            FieldShape::QualifiedExternal { namespace, local },
            Type::Path(TypePath { path, .. }),
        ) => {
            let mut head = namespace.clone();
            head.segments.push(PathSegment::from(local.clone()));
            collector.paths.push(head);
            for segment in &path.segments {
                collector.visit_path_arguments(&segment.arguments);
            }
        }
        (_, ty) => collector.visit_type(ty),
    }
    collector.paths
}

/// Finds the alias entry covering `path`, returning the namespace and the
/// remaining segments after it.
fn match_entry(table: &[AliasEntry], path: &Path) -> Option<(Path, Vec<PathSegment>)> {
    let first = path.segments.first()?.ident.unraw().to_string();
    if let Some(entry) = table
        .iter()
        .find(|entry| entry.local_name().is_some_and(|local| local == first))
    {
        return Some((entry.path.clone(), path.segments.iter().skip(1).cloned().collect()));
    }
    table.iter().find_map(|entry| {
        let prefix_len = entry.path.segments.len();
        let is_prefix = path.segments.len() > prefix_len
            && entry
                .path
                .segments
                .iter()
                .zip(path.segments.iter())
                .all(|(want, have)| want.ident == have.ident);
        is_prefix.then(|| {
            (
                entry.path.clone(),
                path.segments.iter().skip(prefix_len).cloned().collect(),
            )
        })
    })
}

/// Collects qualified type paths, including those nested in generics.
#[derive(Default)]
struct Collector {
    paths: Vec<Path>,
}

impl<'ast> Visit<'ast> for Collector {
    fn visit_type_path(&mut self, node: &'ast TypePath) {
        if node.qself.is_none() && qualified_parts(&node.path).is_some() {
            self.paths.push(node.path.clone());
        }
        syn::visit::visit_type_path(self, node);
    }
}

struct Rewriter<'a> {
    resolved: &'a Resolved,
}

impl VisitMut for Rewriter<'_> {
    fn visit_type_path_mut(&mut self, node: &mut TypePath) {
        syn::visit_mut::visit_type_path_mut(self, node);
        if node.qself.is_some() || qualified_parts(&node.path).is_none() {
            return;
        }
        if let Some(path) = self.resolved.canonical_for(&node.path) {
            node.path = path;
        }
    }
}
