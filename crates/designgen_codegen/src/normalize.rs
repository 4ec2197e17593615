//! Post-generation normalization of emitted Rust source.
//!
//! Templates are free to over-declare `use` items; this pass removes every private import the file never references
//! and prints the result in canonical form. The pass is idempotent: normalizing its own output is a no-op.
//!
//! ## Notes
//!
//! - Usage is decided by identifier occurrence in the token stream of the items sharing the import's scope, macro
//!   bodies included. That over-approximates (a local variable named like an import keeps it) but never removes an
//!   import that is needed by name.
//! - Trait imports used only for method resolution are invisible to that scan; write them as `use path as _;`, which is
//!   always kept. `pub` re-exports, globs and attributed imports are kept as well.
//! - `syn` drops plain `//` comments. The leading comment block (the generated-code banner) is carried over verbatim;
//!   comments elsewhere do not survive, so templates document generated items with doc comments.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use miette::{Diagnostic, NamedSource, SourceSpan};
use proc_macro2::{TokenStream, TokenTree};
use quote::ToTokens;
use syn::punctuated::Punctuated;
use syn::{Item, ItemUse, UseTree, Visibility};
use thiserror::Error;

/// Errors from [`normalize_file`].
#[derive(Debug, Error, Diagnostic)]
pub enum NormalizeError {
    /// The file is not valid Rust.
    #[error("{}:{line}:{column}: {message}\n========\nContent:\n{content}", path.display())]
    #[diagnostic(
        code(designgen::normalize::parse),
        help("the generated source does not parse; check the template that produced it")
    )]
    Parse {
        path: PathBuf,
        message: String,
        line: usize,
        column: usize,
        content: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("does not parse")]
        span: SourceSpan,
    },

    #[error("cannot normalize `{}`: {source}", path.display())]
    #[diagnostic(code(designgen::normalize::io))]
    Io { path: PathBuf, source: io::Error },
}

/// Normalize the Rust file at `path` in place.
pub fn normalize_file(path: &Path) -> Result<(), NormalizeError> {
    let io_error = |source| NormalizeError::Io {
        path: path.to_path_buf(),
        source,
    };
    let content = fs::read_to_string(path).map_err(io_error)?;
    let normalized = normalize_source(&content).map_err(|err| parse_error(path, &content, &err))?;
    if normalized != content {
        fs::write(path, normalized).map_err(io_error)?;
    }
    Ok(())
}

/// Normalize Rust source text: prune unused imports, sort them, and print canonically.
pub fn normalize_source(source: &str) -> Result<String, syn::Error> {
    let mut file = syn::parse_file(source)?;
    prune_items(&mut file.items);
    let body = prettyplease::unparse(&file);

    let banner = leading_comments(source);
    Ok(match (banner.is_empty(), body.is_empty()) {
        (true, _) => body,
        (false, true) => format!("{banner}\n"),
        (false, false) => format!("{banner}\n\n{body}"),
    })
}

fn parse_error(path: &Path, content: &str, err: &syn::Error) -> NormalizeError {
    let start = err.span().start();
    let message = err.to_string();
    let offset = byte_offset(content, start.line, start.column);
    NormalizeError::Parse {
        path: path.to_path_buf(),
        message,
        line: start.line,
        column: start.column + 1,
        content: content.to_string(),
        src: NamedSource::new(path.display().to_string(), content.to_string()),
        span: SourceSpan::from((offset, 0)),
    }
}

/// Byte offset of a 1-based line and 0-based character column.
fn byte_offset(content: &str, line: usize, column: usize) -> usize {
    let line_start: usize = content
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    let rest = &content[line_start.min(content.len())..];
    let within = rest
        .char_indices()
        .nth(column)
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    line_start + within
}

/// The `//` comment lines at the top of the file, skipping blank lines before them. Doc comments are attributes and
/// are left to the parser.
fn leading_comments(source: &str) -> String {
    source
        .lines()
        .skip_while(|line| line.trim().is_empty())
        .take_while(|line| {
            let line = line.trim_start();
            line.starts_with("//") && !line.starts_with("///") && !line.starts_with("//!")
        })
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

fn prune_items(items: &mut Vec<Item>) {
    for item in items.iter_mut() {
        if let Item::Mod(module) = item {
            if let Some((_, content)) = &mut module.content {
                prune_items(content);
            }
        }
    }

    // A pruned `use` may have been the only user of another import's binding (`use a as b; use b::c;`), so prune
    // until no import changes.
    loop {
        let before = use_items(items);
        let used = used_names(items);
        items.retain_mut(|item| match item {
            Item::Use(item_use) if is_prunable(item_use) => retain_used(&mut item_use.tree, None, &used),
            _ => true,
        });
        if use_items(items) == before {
            break;
        }
    }
    for item in items.iter_mut() {
        if let Item::Use(item_use) = item {
            canonicalize(&mut item_use.tree);
        }
    }
    sort_use_runs(items);
    items.dedup_by(|a, b| {
        matches!((&*a, &*b), (Item::Use(_), Item::Use(_)))
            && a.to_token_stream().to_string() == b.to_token_stream().to_string()
    });
}

fn use_items(items: &[Item]) -> Vec<String> {
    items
        .iter()
        .filter(|item| matches!(item, Item::Use(_)))
        .map(|item| item.to_token_stream().to_string())
        .collect()
}

fn is_prunable(item_use: &ItemUse) -> bool {
    matches!(item_use.vis, Visibility::Inherited) && item_use.attrs.is_empty()
}

/// Every identifier a `use` binding in this scope could be referenced by.
fn used_names(items: &[Item]) -> HashSet<String> {
    let mut used = HashSet::new();
    for item in items {
        match item {
            Item::Use(item_use) => collect_use_roots(&item_use.tree, &mut used),
            other => collect_idents(other.to_token_stream(), &mut used),
        }
    }
    used
}

fn collect_idents(tokens: TokenStream, used: &mut HashSet<String>) {
    for tree in tokens {
        match tree {
            TokenTree::Ident(ident) => {
                used.insert(ident.to_string());
            }
            TokenTree::Group(group) => collect_idents(group.stream(), used),
            TokenTree::Punct(_) | TokenTree::Literal(_) => {}
        }
    }
}

/// First segments of `use` paths that name another binding (`use json::Value;` and `use json as j;` both use a
/// binding named `json`).
fn collect_use_roots(tree: &UseTree, used: &mut HashSet<String>) {
    match tree {
        UseTree::Path(path) => {
            used.insert(path.ident.to_string());
        }
        UseTree::Rename(rename) => {
            used.insert(rename.ident.to_string());
        }
        UseTree::Group(group) => group.items.iter().for_each(|item| collect_use_roots(item, used)),
        UseTree::Name(_) | UseTree::Glob(_) => {}
    }
}

/// Drop unused leaves from `tree`; returns whether anything is left.
fn retain_used(tree: &mut UseTree, parent: Option<&str>, used: &HashSet<String>) -> bool {
    match tree {
        UseTree::Path(path) => {
            let parent = path.ident.to_string();
            retain_used(&mut path.tree, Some(parent.as_str()), used)
        }
        UseTree::Name(name) if name.ident == "self" => parent.is_none_or(|parent| used.contains(parent)),
        UseTree::Name(name) => used.contains(&name.ident.to_string()),
        UseTree::Rename(rename) => rename.rename == "_" || used.contains(&rename.rename.to_string()),
        UseTree::Glob(_) => true,
        UseTree::Group(group) => {
            let kept: Punctuated<UseTree, syn::Token![,]> = std::mem::take(&mut group.items)
                .into_iter()
                .filter_map(|mut item| retain_used(&mut item, parent, used).then_some(item))
                .collect();
            group.items = kept;
            !group.items.is_empty()
        }
    }
}

/// Sort group members and flatten single-member groups (`a::{b}` becomes `a::b`, `a::{self}` stays).
fn canonicalize(tree: &mut UseTree) {
    let flattened = match tree {
        UseTree::Path(path) => {
            canonicalize(&mut path.tree);
            None
        }
        UseTree::Group(group) => {
            let mut members: Vec<UseTree> = std::mem::take(&mut group.items).into_iter().collect();
            members.iter_mut().for_each(canonicalize);
            members.sort_by_cached_key(tree_key);
            if members.len() == 1 && !is_self(&members[0]) {
                members.pop()
            } else {
                group.items = members.into_iter().collect();
                None
            }
        }
        UseTree::Name(_) | UseTree::Rename(_) | UseTree::Glob(_) => None,
    };
    if let Some(only) = flattened {
        *tree = only;
    }
}

fn is_self(tree: &UseTree) -> bool {
    matches!(tree, UseTree::Name(name) if name.ident == "self")
}

/// `self` first, then by rendered path.
fn tree_key(tree: &UseTree) -> (bool, String) {
    (!is_self(tree), tree.to_token_stream().to_string())
}

fn sort_use_runs(items: &mut [Item]) {
    let mut start = 0;
    while start < items.len() {
        if !matches!(items[start], Item::Use(_)) {
            start += 1;
            continue;
        }
        let end = items[start..]
            .iter()
            .position(|item| !matches!(item, Item::Use(_)))
            .map_or(items.len(), |len| start + len);
        items[start..end].sort_by_cached_key(|item| match item {
            Item::Use(item_use) => tree_key(&item_use.tree),
            _ => (true, String::new()),
        });
        start = end;
    }
}
