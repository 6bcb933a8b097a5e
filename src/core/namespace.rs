//! Call-site namespace resolution and translation-call extraction.
//!
//! A partial key written at a call site (`t('profile.name')`) only becomes
//! a fully-qualified key once the enclosing function's translation-hook
//! invocation is found (`useTranslation('user')` → `user.profile.name`).
//! The hook's first argument decides the namespace: a string literal is
//! used as-is, an array literal contributes its first element, an object
//! literal contributes its `namespace` or `ns` property. The first hook
//! call in document order inside the enclosing function wins; call sites
//! outside any function, or in functions without a hook call, resolve with
//! an empty namespace.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use swc_common::Span;
use swc_ecma_ast::{
    ArrowExpr, CallExpr, Callee, Expr, Function, Lit, Pat, Prop, PropName, PropOrSpread, VarDecl,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::core::js::{ParsedModule, parse_module_source};

/// Hook/factory functions whose first argument establishes a namespace.
pub const TRANSLATION_HOOKS: &[&str] =
    &["useTranslation", "useTranslations", "getTranslations", "useI18n"];

/// Default translation function names; extended via configuration.
pub const DEFAULT_FUNCTIONS: &[&str] = &["t", "$t"];

/// A key reference extracted from one call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyUsage {
    /// The key literal as written at the call site.
    pub partial_key: String,
    /// Namespace resolved from the enclosing function, possibly empty.
    pub namespace: String,
    /// Namespace-qualified key.
    pub full_key: String,
    /// 1-based source line of the call.
    pub line: usize,
    /// Byte offset of the key string literal, quotes included.
    pub lit_offset: usize,
    /// Byte length of the key string literal, quotes included.
    pub lit_len: usize,
}

/// Ambiguity carrier for consumers that must try both the qualified and
/// the literally-written key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCandidate {
    pub full_key: String,
    pub partial_key: String,
}

impl KeyUsage {
    pub fn candidate(&self) -> KeyCandidate {
        KeyCandidate {
            full_key: self.full_key.clone(),
            partial_key: self.partial_key.clone(),
        }
    }
}

/// Qualify a partial key with a namespace.
pub fn full_key(namespace: &str, partial_key: &str) -> String {
    if namespace.is_empty() {
        partial_key.to_string()
    } else {
        format!("{}.{}", namespace, partial_key)
    }
}

/// Extract every translation call in a source file and resolve its
/// namespace. `functions` lists the translation function names to match
/// (`t`, `$t`, plus user-configured ones); variables bound to a hook
/// result are recognized as well, so `const tr = useTranslation('x')`
/// makes `tr('k')` a match.
pub fn collect_usages(content: &str, path: &Path, functions: &[String]) -> Result<Vec<KeyUsage>> {
    let parsed = parse_module_source(content, &path.to_string_lossy())?;

    let mut collector = CallCollector {
        functions,
        bindings: HashSet::new(),
        function_spans: Vec::new(),
        hook_calls: Vec::new(),
        key_calls: Vec::new(),
    };
    parsed.module.visit_with(&mut collector);
    // Document order regardless of AST visit order.
    collector.hook_calls.sort_by_key(|(span, _)| span.lo);

    let usages = collector
        .key_calls
        .into_iter()
        .map(|call| {
            let namespace = resolve_namespace(
                call.span,
                &collector.function_spans,
                &collector.hook_calls,
            );
            let full_key = full_key(&namespace, &call.key);
            KeyUsage {
                partial_key: call.key,
                namespace,
                full_key,
                line: parsed.line_of(call.span.lo),
                lit_offset: parsed.offset_of(call.lit_span.lo),
                lit_len: parsed.span_len(call.lit_span),
            }
        })
        .collect();
    Ok(usages)
}

/// Namespace for a call at `call_span`: the first hook call (in document
/// order) inside the smallest enclosing function.
fn resolve_namespace(
    call_span: Span,
    function_spans: &[Span],
    hook_calls: &[(Span, String)],
) -> String {
    let enclosing = function_spans
        .iter()
        .filter(|f| contains(**f, call_span))
        .min_by_key(|f| f.hi.0 - f.lo.0);
    let Some(enclosing) = enclosing else {
        return String::new();
    };
    hook_calls
        .iter()
        .find(|(span, _)| contains(*enclosing, *span))
        .map(|(_, namespace)| namespace.clone())
        .unwrap_or_default()
}

fn contains(outer: Span, inner: Span) -> bool {
    outer.lo <= inner.lo && inner.hi <= outer.hi
}

struct PendingCall {
    span: Span,
    lit_span: Span,
    key: String,
}

struct CallCollector<'a> {
    functions: &'a [String],
    /// Variables bound to the result of a translation hook.
    bindings: HashSet<String>,
    function_spans: Vec<Span>,
    hook_calls: Vec<(Span, String)>,
    key_calls: Vec<PendingCall>,
}

impl CallCollector<'_> {
    fn is_translation_fn(&self, name: &str) -> bool {
        self.functions.iter().any(|f| f == name) || self.bindings.contains(name)
    }
}

impl Visit for CallCollector<'_> {
    fn visit_function(&mut self, node: &Function) {
        self.function_spans.push(node.span);
        node.visit_children_with(self);
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr) {
        self.function_spans.push(node.span);
        node.visit_children_with(self);
    }

    fn visit_var_decl(&mut self, node: &VarDecl) {
        for decl in &node.decls {
            if let Some(init) = &decl.init {
                // Both sync and awaited hooks bind translation functions.
                let call = match &**init {
                    Expr::Call(call) => Some(call),
                    Expr::Await(awaited) => match &*awaited.arg {
                        Expr::Call(call) => Some(call),
                        _ => None,
                    },
                    _ => None,
                };
                if let Some(call) = call
                    && callee_name(call).is_some_and(|name| TRANSLATION_HOOKS.contains(&name))
                    && let Pat::Ident(binding) = &decl.name
                {
                    self.bindings.insert(binding.id.sym.to_string());
                }
            }
        }
        node.visit_children_with(self);
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        if let Some(name) = callee_name(node) {
            if TRANSLATION_HOOKS.contains(&name) {
                self.hook_calls.push((node.span, hook_namespace(node)));
            } else if self.is_translation_fn(name)
                && let Some(arg) = node.args.first()
                && let Expr::Lit(Lit::Str(key)) = &*arg.expr
            {
                self.key_calls.push(PendingCall {
                    span: node.span,
                    lit_span: key.span,
                    key: key.value.to_string(),
                });
            }
        }
        node.visit_children_with(self);
    }
}

fn callee_name(call: &CallExpr) -> Option<&str> {
    let Callee::Expr(expr) = &call.callee else {
        return None;
    };
    let Expr::Ident(ident) = &**expr else {
        return None;
    };
    Some(ident.sym.as_ref())
}

/// Extract the namespace from a hook call's first argument.
fn hook_namespace(call: &CallExpr) -> String {
    let Some(arg) = call.args.first() else {
        return String::new();
    };
    match &*arg.expr {
        Expr::Lit(Lit::Str(s)) => s.value.to_string(),
        Expr::Array(array) => array
            .elems
            .first()
            .and_then(|elem| elem.as_ref())
            .and_then(|elem| match &*elem.expr {
                Expr::Lit(Lit::Str(s)) => Some(s.value.to_string()),
                _ => None,
            })
            .unwrap_or_default(),
        Expr::Object(object) => object
            .props
            .iter()
            .find_map(|prop| {
                let PropOrSpread::Prop(prop) = prop else {
                    return None;
                };
                let Prop::KeyValue(kv) = &**prop else {
                    return None;
                };
                let name = match &kv.key {
                    PropName::Ident(ident) => ident.sym.to_string(),
                    PropName::Str(s) => s.value.to_string(),
                    _ => return None,
                };
                if (name == "namespace" || name == "ns")
                    && let Expr::Lit(Lit::Str(s)) = &*kv.value
                {
                    return Some(s.value.to_string());
                }
                None
            })
            .unwrap_or_default(),
        _ => String::new(),
    }
}
