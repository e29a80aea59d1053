//! Export analysis on an swc AST.
//!
//! The module is ESM when it has a top-level import/export declaration or
//! references `import.meta`. TypeScript's CommonJS forms (`export =`,
//! `import x = require(..)`, `export as namespace`) do not count.

use super::{ExportsKind, ParseOptions, ParseOutcome, SourceParser};
use indexmap::IndexSet;
use swc_common::{sync::Lrc, FileName, SourceMap};
use swc_ecma_ast::{
    AssignPatProp, BindingIdent, Decl, DefaultDecl, EsVersion, ExportSpecifier, Expr,
    MetaPropExpr, MetaPropKind, Module, ModuleDecl, ModuleExportName, ModuleItem, PropName,
    TsModuleName, TsType,
};
use swc_ecma_parser::{lexer::Lexer, EsSyntax, Parser, StringInput, Syntax, TsSyntax};
use swc_ecma_visit::{Visit, VisitWith};
use tracing::debug;

/// Default [`SourceParser`], backed by `swc_ecma_parser`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwcParser;

impl SourceParser for SwcParser {
    fn parse(&self, source: &str, options: &ParseOptions) -> ParseOutcome {
        parse_exports(source, options)
    }
}

fn syntax_for(options: &ParseOptions) -> Syntax {
    if options.typescript {
        Syntax::Typescript(TsSyntax {
            tsx: options.jsx,
            decorators: true,
            ..Default::default()
        })
    } else {
        Syntax::Es(EsSyntax {
            jsx: options.jsx,
            decorators: true,
            ..Default::default()
        })
    }
}

/// Parse `source` and report its module kind and named exports.
///
/// Names are in first-appearance order, deduplicated. A source that is not a
/// valid module but is a valid sloppy-mode script (`with`, legacy octals) is
/// CommonJS. `success` is false only when neither parses.
#[must_use]
pub fn parse_exports(source: &str, options: &ParseOptions) -> ParseOutcome {
    let cm: Lrc<SourceMap> = Lrc::default();
    let fm = cm.new_source_file(Lrc::new(FileName::Anon), source.to_string());
    let syntax = syntax_for(options);
    let new_parser = || {
        Parser::new_from(Lexer::new(
            syntax,
            EsVersion::EsNext,
            StringInput::from(&*fm),
            None,
        ))
    };

    let mut parser = new_parser();
    match parser.parse_module() {
        Ok(module) => {
            if !options.suppress_diagnostics {
                for err in parser.take_errors() {
                    debug!(error = ?err.kind(), "recoverable parse error");
                }
            }
            analyze_module(&module)
        }
        Err(err) => {
            if !options.suppress_diagnostics {
                debug!(error = ?err.kind(), "source is not a valid module");
            }
            let script = new_parser().parse_script().is_ok();
            ParseOutcome {
                kind: ExportsKind::Cjs,
                named_exports: Vec::new(),
                success: script,
            }
        }
    }
}

fn analyze_module(module: &Module) -> ParseOutcome {
    let mut esm = false;
    let mut names = IndexSet::new();

    for item in &module.body {
        let ModuleItem::ModuleDecl(decl) = item else {
            continue;
        };
        match decl {
            ModuleDecl::TsExportAssignment(_) | ModuleDecl::TsNamespaceExport(_) => {}
            ModuleDecl::TsImportEquals(import) => {
                if import.is_export {
                    esm = true;
                    if !import.is_type_only {
                        names.insert(import.id.sym.to_string());
                    }
                }
            }
            ModuleDecl::ExportDecl(export) => {
                esm = true;
                decl_names(&export.decl, &mut names);
            }
            ModuleDecl::ExportNamed(named) => {
                esm = true;
                if named.type_only {
                    continue;
                }
                for spec in &named.specifiers {
                    match spec {
                        ExportSpecifier::Named(s) if !s.is_type_only => {
                            names.insert(export_name(s.exported.as_ref().unwrap_or(&s.orig)));
                        }
                        ExportSpecifier::Named(_) => {}
                        ExportSpecifier::Namespace(s) => {
                            names.insert(export_name(&s.name));
                        }
                        ExportSpecifier::Default(s) => {
                            names.insert(s.exported.sym.to_string());
                        }
                    }
                }
            }
            ModuleDecl::ExportDefaultDecl(export) => {
                esm = true;
                if !matches!(export.decl, DefaultDecl::TsInterfaceDecl(_)) {
                    names.insert("default".to_string());
                }
            }
            ModuleDecl::ExportDefaultExpr(_) => {
                esm = true;
                names.insert("default".to_string());
            }
            _ => esm = true,
        }
    }

    if !esm {
        let mut meta = ImportMetaFinder::default();
        module.visit_with(&mut meta);
        esm = meta.found;
    }

    ParseOutcome {
        kind: if esm { ExportsKind::Esm } else { ExportsKind::Cjs },
        named_exports: names.into_iter().collect(),
        success: true,
    }
}

fn export_name(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::Ident(ident) => ident.sym.to_string(),
        ModuleExportName::Str(s) => s.value.to_string(),
    }
}

/// Value bindings introduced by an exported declaration. Types, interfaces
/// and ambient (`declare`) declarations have no runtime binding.
fn decl_names(decl: &Decl, names: &mut IndexSet<String>) {
    match decl {
        Decl::Class(c) if !c.declare => {
            names.insert(c.ident.sym.to_string());
        }
        Decl::Fn(f) if !f.declare => {
            names.insert(f.ident.sym.to_string());
        }
        Decl::Var(v) if !v.declare => {
            let mut bindings = BindingNames::default();
            for declarator in &v.decls {
                declarator.name.visit_with(&mut bindings);
            }
            names.extend(bindings.0);
        }
        Decl::TsEnum(e) if !e.declare => {
            names.insert(e.id.sym.to_string());
        }
        Decl::TsModule(m) if !m.declare => {
            if let TsModuleName::Ident(id) = &m.id {
                names.insert(id.sym.to_string());
            }
        }
        _ => {}
    }
}

/// Collects names bound by a pattern, skipping default values, computed
/// keys and type annotations.
#[derive(Default)]
struct BindingNames(Vec<String>);

impl Visit for BindingNames {
    fn visit_binding_ident(&mut self, node: &BindingIdent) {
        self.0.push(node.id.sym.to_string());
    }

    fn visit_assign_pat_prop(&mut self, node: &AssignPatProp) {
        self.0.push(node.key.sym.to_string());
    }

    fn visit_expr(&mut self, _: &Expr) {}

    fn visit_prop_name(&mut self, _: &PropName) {}

    fn visit_ts_type(&mut self, _: &TsType) {}
}

#[derive(Default)]
struct ImportMetaFinder {
    found: bool,
}

impl Visit for ImportMetaFinder {
    fn visit_meta_prop_expr(&mut self, node: &MetaPropExpr) {
        if matches!(node.kind, MetaPropKind::ImportMeta) {
            self.found = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> ParseOutcome {
        parse_exports(source, &ParseOptions::default())
    }

    fn parse_ts(source: &str) -> ParseOutcome {
        let options = ParseOptions {
            typescript: true,
            ..ParseOptions::default()
        };
        parse_exports(source, &options)
    }

    #[test]
    fn test_export_default_function() {
        let out = parse("export default function(){}");
        assert!(out.success);
        assert_eq!(out.kind, ExportsKind::Esm);
        assert!(out.has_export("default"));
    }

    #[test]
    fn test_module_exports_is_cjs() {
        let out = parse("module.exports = { a: 1, b: require('./b') };");
        assert!(out.success);
        assert_eq!(out.kind, ExportsKind::Cjs);
        assert!(out.named_exports.is_empty());
    }

    #[test]
    fn test_exports_dot_assignment_is_cjs() {
        let out = parse("exports.foo = 1;\nObject.defineProperty(exports, '__esModule', { value: true });");
        assert_eq!(out.kind, ExportsKind::Cjs);
    }

    #[test]
    fn test_sloppy_script_is_cjs() {
        let out = parse("with (Math) { module.exports = max(1, 2); }");
        assert!(out.success);
        assert_eq!(out.kind, ExportsKind::Cjs);
    }

    #[test]
    fn test_named_declarations() {
        let out = parse(
            r"
export const a = 1, b = { x: [1, 2] };
export let c;
export var d = function () { return 1 }
export function e() {}
export function* f() {}
export async function g() {}
export class H {}
",
        );
        assert_eq!(out.named_exports, vec!["a", "b", "c", "d", "e", "f", "g", "H"]);
        assert!(!out.has_export("default"));
    }

    #[test]
    fn test_export_list_with_aliases() {
        let out = parse("const a = 1, b = 2; export { a, b as c, a as default };");
        assert_eq!(out.named_exports, vec!["a", "c", "default"]);
    }

    #[test]
    fn test_reexports() {
        let out = parse(
            r#"
export * from "./all";
export * as ns from "./ns";
export { x as y } from './x';
"#,
        );
        assert_eq!(out.kind, ExportsKind::Esm);
        assert_eq!(out.named_exports, vec!["ns", "y"]);
    }

    #[test]
    fn test_string_export_names() {
        let out = parse(r#"const a = 1; export { a as "kebab-name" };"#);
        assert_eq!(out.named_exports, vec!["kebab-name"]);
    }

    #[test]
    fn test_destructured_declarations() {
        let out = parse("export const { a, b: renamed, c = (x) => x, ...rest } = obj, [d, , e] = arr;");
        assert_eq!(out.named_exports, vec!["a", "renamed", "c", "rest", "d", "e"]);
    }

    #[test]
    fn test_import_only_is_esm() {
        let out = parse("import React from 'react';\nReact.render();");
        assert_eq!(out.kind, ExportsKind::Esm);
        assert!(out.named_exports.is_empty());
    }

    #[test]
    fn test_import_meta_is_esm() {
        let out = parse("function f() { return import.meta.url }");
        assert_eq!(out.kind, ExportsKind::Esm);
    }

    #[test]
    fn test_dynamic_import_is_not_esm() {
        let out = parse("const m = import('./m');\nmodule.exports = m;");
        assert_eq!(out.kind, ExportsKind::Cjs);
    }

    #[test]
    fn test_ignores_comments_and_strings() {
        let out = parse(
            r#"
// export default 1
/* export const a = 1 */
const s = "export default 2";
const t = `export ${"default"} 3`;
module.exports = s + t;
"#,
        );
        assert_eq!(out.kind, ExportsKind::Cjs);
        assert!(out.success);
    }

    #[test]
    fn test_ignores_nested_export_words() {
        let out = parse("var o = { export: 1, import: 2 }; o.export = 3; module.exports = o;");
        assert_eq!(out.kind, ExportsKind::Cjs);
    }

    #[test]
    fn test_default_regex_with_quotes() {
        let out = parse("export default /['\"]/;");
        assert!(out.success);
        assert!(out.has_export("default"));
    }

    #[test]
    fn test_regex_after_paren_in_cjs() {
        let out = parse("if (typeof s === 'string') /\"/.test(s);\nmodule.exports = 1;");
        assert!(out.success);
        assert_eq!(out.kind, ExportsKind::Cjs);
    }

    #[test]
    fn test_division_is_not_regex() {
        let out = parse("var x = a / b / c;\nexport { x };");
        assert!(out.success);
        assert_eq!(out.named_exports, vec!["x"]);
    }

    #[test]
    fn test_jsx_needs_option() {
        let source = "export const App = () => <div />;";
        assert!(!parse(source).success);

        let options = ParseOptions {
            jsx: true,
            ..ParseOptions::default()
        };
        let out = parse_exports(source, &options);
        assert!(out.success);
        assert_eq!(out.named_exports, vec!["App"]);
    }

    #[test]
    fn test_typescript_exports() {
        let out = parse_ts(
            r"
export type Props = { a: string };
export interface State { b: number }
export type { Hidden } from './types';
export enum Color { Red }
export const enum Size { S }
export declare function declared(): void;
export abstract class Base {}
export namespace NS { export const inner = 1 }
export { type T, visible };
export const typed: (x: number) => void = () => {}, other = 1;
",
        );
        assert!(out.success);
        assert_eq!(out.kind, ExportsKind::Esm);
        assert_eq!(
            out.named_exports,
            vec!["Color", "Size", "Base", "NS", "visible", "typed", "other"]
        );
    }

    #[test]
    fn test_typescript_export_assignment_is_not_esm() {
        let out = parse_ts("import fs = require('fs');\nconst x = 1;\nexport = x;");
        assert!(out.success);
        assert_eq!(out.kind, ExportsKind::Cjs);
    }

    #[test]
    fn test_unterminated_comment_fails() {
        let out = parse("export default 1; /* never closed");
        assert!(!out.success);
    }

    #[test]
    fn test_unterminated_string_fails() {
        let out = parse("const s = 'oops\nexport default s;");
        assert!(!out.success);
    }

    #[test]
    fn test_hashbang() {
        let out = parse("#!/usr/bin/env node\nexport default 1;");
        assert!(out.success);
        assert!(out.has_export("default"));
    }

    #[test]
    fn test_duplicate_names_deduplicated() {
        let out = parse("const a = 1; export { a }; export { a as b, a };");
        assert_eq!(out.named_exports, vec!["a", "b"]);
    }
}
