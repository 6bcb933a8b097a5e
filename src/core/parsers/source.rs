//! Parser for locale data kept in JS/TS modules.
//!
//! Handles `export default { ... }`, `export default ident` resolved
//! through a top-level `const ident = { ... }`, and
//! `module.exports = { ... }`. Nested object literals flatten like JSON;
//! only string-literal leaves (and expression-free template literals)
//! become entries. A module without an exported object literal is simply
//! empty, not an error. Offsets come straight from swc spans.

use anyhow::Result;
use swc_ecma_ast::{
    AssignTarget, Decl, Expr, Lit, MemberProp, ModuleDecl, ModuleItem, ObjectLit, Pat, Prop,
    PropName, PropOrSpread, SimpleAssignTarget, Stmt,
};

use crate::core::entry::TranslationFile;
use crate::core::js::{ParsedModule, parse_module_source};
use crate::core::parsers::join_key;

pub(super) fn parse_into(content: &str, file: &mut TranslationFile) -> Result<()> {
    let path = file.path.to_string_lossy().to_string();
    let parsed = parse_module_source(content, &path)?;
    if let Some(object) = exported_object(&parsed) {
        flatten_object(object, String::new(), &parsed, file);
    }
    Ok(())
}

/// Byte offset just inside the closing brace of the module's exported
/// object literal. Used by the create-key writer to append a leaf entry.
pub(crate) fn export_object_end(content: &str, path: &std::path::Path) -> Option<usize> {
    let parsed = parse_module_source(content, &path.to_string_lossy()).ok()?;
    let object = exported_object(&parsed)?;
    Some(parsed.offset_of(object.span.hi).saturating_sub(1))
}

/// Find the object literal the module exports, if any.
fn exported_object<'m>(parsed: &'m ParsedModule) -> Option<&'m ObjectLit> {
    for item in &parsed.module.body {
        match item {
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(export)) => {
                match &*export.expr {
                    Expr::Object(object) => return Some(object),
                    Expr::Ident(ident) => {
                        if let Some(object) = top_level_object(parsed, ident.sym.as_ref()) {
                            return Some(object);
                        }
                    }
                    _ => {}
                }
            }
            ModuleItem::Stmt(Stmt::Expr(stmt)) => {
                if let Expr::Assign(assign) = &*stmt.expr
                    && is_module_exports(&assign.left)
                    && let Expr::Object(object) = &*assign.right
                {
                    return Some(object);
                }
            }
            _ => {}
        }
    }
    None
}

/// Resolve `export default messages` through `const messages = { ... }`.
fn top_level_object<'m>(parsed: &'m ParsedModule, name: &str) -> Option<&'m ObjectLit> {
    for item in &parsed.module.body {
        if let ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))) = item {
            for decl in &var.decls {
                if let Pat::Ident(binding) = &decl.name
                    && binding.id.sym.as_ref() == name
                    && let Some(init) = &decl.init
                    && let Expr::Object(object) = &**init
                {
                    return Some(object);
                }
            }
        }
    }
    None
}

fn is_module_exports(target: &AssignTarget) -> bool {
    let AssignTarget::Simple(SimpleAssignTarget::Member(member)) = target else {
        return false;
    };
    let Expr::Ident(object) = &*member.obj else {
        return false;
    };
    let MemberProp::Ident(prop) = &member.prop else {
        return false;
    };
    object.sym.as_ref() == "module" && prop.sym.as_ref() == "exports"
}

fn flatten_object(
    object: &ObjectLit,
    prefix: String,
    parsed: &ParsedModule,
    out: &mut TranslationFile,
) {
    for prop in &object.props {
        let PropOrSpread::Prop(prop) = prop else {
            continue;
        };
        let Prop::KeyValue(kv) = &**prop else {
            continue;
        };
        let (name, key_span) = match &kv.key {
            PropName::Ident(ident) => (ident.sym.to_string(), ident.span),
            PropName::Str(s) => (s.value.to_string(), s.span),
            _ => continue,
        };
        let path = join_key(&prefix, &name);
        let offset = parsed.offset_of(key_span.lo);
        let len = parsed.span_len(key_span);
        match &*kv.value {
            Expr::Object(nested) => flatten_object(nested, path, parsed, out),
            Expr::Lit(Lit::Str(s)) => out.insert(path, s.value.to_string(), offset, len),
            Expr::Tpl(tpl) if tpl.exprs.is_empty() => {
                if let Some(quasi) = tpl.quasis.first() {
                    let value = quasi
                        .cooked
                        .as_ref()
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| quasi.raw.to_string());
                    out.insert(path, value, offset, len);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::entry::FileFormat;
    use crate::core::parsers::parse_str;
    use crate::core::path_rules::parse_file_path;

    fn parse(content: &str, path: &str) -> TranslationFile {
        let origin = parse_file_path(Path::new(path), Path::new(""));
        parse_str(content, Path::new(path), FileFormat::Source, origin).unwrap()
    }

    #[test]
    fn test_export_default_object() {
        let file = parse(
            "export default {\n  common: {\n    save: 'Save',\n    cancel: 'Cancel',\n  },\n};\n",
            "src/locales/en.ts",
        );
        assert_eq!(file.entries.get("common.save").map(|e| e.value.as_str()), Some("Save"));
        assert_eq!(file.len(), 2);
    }

    #[test]
    fn test_export_default_ident() {
        let file = parse(
            "const messages = { hello: 'Hello' };\nexport default messages;\n",
            "src/locales/en.ts",
        );
        assert_eq!(file.entries.get("hello").map(|e| e.value.as_str()), Some("Hello"));
    }

    #[test]
    fn test_module_exports() {
        let file = parse(
            "module.exports = { bye: 'Bye' };\n",
            "src/locales/en.cjs",
        );
        assert_eq!(file.entries.get("bye").map(|e| e.value.as_str()), Some("Bye"));
    }

    #[test]
    fn test_quoted_and_template_values() {
        let file = parse(
            "export default {\n  'dotted.key': \"Quoted\",\n  tpl: `Template`,\n};\n",
            "src/locales/en.ts",
        );
        assert_eq!(file.entries.get("dotted.key").map(|e| e.value.as_str()), Some("Quoted"));
        assert_eq!(file.entries.get("tpl").map(|e| e.value.as_str()), Some("Template"));
    }

    #[test]
    fn test_non_string_leaves_ignored() {
        let file = parse(
            "export default { n: 3, ok: true, f: () => 'x', label: 'ok' };\n",
            "src/locales/en.ts",
        );
        assert_eq!(file.len(), 1);
    }

    #[test]
    fn test_no_export_is_empty() {
        let file = parse("const x = 1;\n", "src/locales/en.ts");
        assert!(file.is_empty());
    }

    #[test]
    fn test_key_offsets_are_exact() {
        let content = "export default {\n  auth: {\n    title: 'Login',\n  },\n};\n";
        let file = parse(content, "src/locales/en.ts");
        let entry = file.entries.get("auth.title").unwrap();
        assert_eq!(&content[entry.offset..entry.offset + entry.len], "title");
    }
}
