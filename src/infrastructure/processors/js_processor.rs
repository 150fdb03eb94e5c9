use crate::core::{interfaces::ModuleTransformer, models::TransformOutput};
use crate::utils::{BundleError, Logger, Result};
use once_cell::sync::Lazy;
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    BindingIdentifier, Declaration, ExportAllDeclaration, ExportDefaultDeclaration,
    ExportDefaultDeclarationKind, ExportNamedDeclaration, ImportDeclaration,
    ImportDeclarationSpecifier, Program, Statement,
};
use oxc_ast::AstKind;
use oxc_diagnostics::OxcDiagnostic;
use oxc_parser::Parser;
use oxc_semantic::{Semantic, SemanticBuilder};
use oxc_span::{GetSpan, SourceType, Span};
use regex::Regex;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::path::Path;

static IDENTIFIER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

/// Parses ES modules with oxc and lowers their module syntax to calls on
/// the injected `require`, `module` and `exports`.
///
/// Imported bindings stay live: every reference is rewritten to a property
/// read on the dependency's `exports`, and local exports are getters over
/// the local binding.
#[derive(Clone, Default)]
pub struct OxcJsProcessor;

impl OxcJsProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl ModuleTransformer for OxcJsProcessor {
    fn transform(&self, path: &Path, source: &str) -> Result<TransformOutput> {
        let allocator = Allocator::default();
        let parse_result = Parser::new(&allocator, source, SourceType::mjs()).parse();

        if parse_result.panicked || !parse_result.errors.is_empty() {
            return Err(BundleError::parse(path, describe(&parse_result.errors)));
        }

        let program = parse_result.program;
        let semantic = SemanticBuilder::new().build(&program).semantic;

        // Factories are plain functions; these only exist in module code.
        if let Some((span, construct)) = find_module_only_syntax(&semantic) {
            return Err(BundleError::parse(
                path,
                format!(
                    "{} is not supported in bundled modules (line {})",
                    construct,
                    line_of(source, span)
                ),
            ));
        }

        let output = ModuleLowering::new(source, &semantic).lower(&program);
        Logger::debug(&format!(
            "Lowered {} ({} imports)",
            path.display(),
            output.specifiers.len()
        ));
        Ok(output)
    }
}

fn describe(errors: &[OxcDiagnostic]) -> String {
    if errors.is_empty() {
        return "parser aborted".to_string();
    }
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn find_module_only_syntax(semantic: &Semantic) -> Option<(Span, &'static str)> {
    for node in semantic.nodes().iter() {
        let (span, construct) = match node.kind() {
            AstKind::AwaitExpression(expr) => (expr.span, "top-level await"),
            AstKind::ForOfStatement(stmt) if stmt.r#await => (stmt.span, "top-level for await"),
            AstKind::MetaProperty(meta) if meta.meta.name.as_str() == "import" => {
                return Some((meta.span, "import.meta"))
            }
            _ => continue,
        };

        let scoping = semantic.scoping();
        let mut scope = Some(node.scope_id());
        let mut in_function = false;
        while let Some(id) = scope {
            if scoping.scope_flags(id).is_function() {
                in_function = true;
                break;
            }
            scope = scoping.scope_parent_id(id);
        }
        if !in_function {
            return Some((span, construct));
        }
    }
    None
}

fn line_of(source: &str, span: Span) -> usize {
    source[..span.start as usize].matches('\n').count() + 1
}

/// `object.name` when `name` is an identifier, `object["name"]` otherwise.
fn member(object: &str, name: &str) -> String {
    if IDENTIFIER_REGEX.is_match(name) {
        format!("{}.{}", object, name)
    } else {
        format!("{}[{}]", object, quote(name))
    }
}

fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

fn define_getter(exported: &str, getter_body: &str) -> String {
    format!(
        "Object.defineProperty(exports, {}, {{ enumerable: true, get: function () {{ return {}; }} }});",
        quote(exported),
        getter_body
    )
}

struct Edit {
    start: usize,
    end: usize,
    replacement: String,
}

/// Rewrites one parsed module. Output order is: `__esModule` marker, getters
/// for local exports, requires with their import bindings and named
/// re-exports, then `export *` copies, then the edited body. Requires run
/// before the importer body, matching ES module evaluation order.
struct ModuleLowering<'s, 'a> {
    source: &'s str,
    semantic: &'s Semantic<'a>,
    specifiers: Vec<String>,
    bindings: HashMap<String, String>,
    interops: HashMap<String, String>,
    imported: HashMap<String, String>,
    /// `(exported, local)` pairs, rendered once every import is known.
    local_exports: Vec<(String, String)>,
    has_exports: bool,
    prologue: Vec<String>,
    star_exports: Vec<String>,
    shorthand: HashSet<u32>,
    callees: HashSet<(u32, u32)>,
    edits: Vec<Edit>,
}

impl<'s, 'a> ModuleLowering<'s, 'a> {
    fn new(source: &'s str, semantic: &'s Semantic<'a>) -> Self {
        let mut shorthand = HashSet::new();
        let mut callees = HashSet::new();
        for node in semantic.nodes().iter() {
            match node.kind() {
                AstKind::ObjectProperty(prop) if prop.shorthand => {
                    shorthand.insert(prop.value.span().start);
                }
                AstKind::CallExpression(call) => {
                    let span = call.callee.span();
                    callees.insert((span.start, span.end));
                }
                AstKind::TaggedTemplateExpression(tagged) => {
                    let span = tagged.tag.span();
                    callees.insert((span.start, span.end));
                }
                _ => {}
            }
        }

        Self {
            source,
            semantic,
            specifiers: Vec::new(),
            bindings: HashMap::new(),
            interops: HashMap::new(),
            imported: HashMap::new(),
            local_exports: Vec::new(),
            has_exports: false,
            prologue: Vec::new(),
            star_exports: Vec::new(),
            shorthand,
            callees,
            edits: Vec::new(),
        }
    }

    fn lower(mut self, program: &Program) -> TransformOutput {
        for stmt in &program.body {
            match stmt {
                Statement::ImportDeclaration(decl) => self.lower_import(decl),
                Statement::ExportNamedDeclaration(decl) => self.lower_export_named(decl),
                Statement::ExportDefaultDeclaration(decl) => self.lower_export_default(decl),
                Statement::ExportAllDeclaration(decl) => self.lower_export_all(decl),
                _ => {}
            }
        }

        let body = self.apply_edits();

        let mut code = String::from("\"use strict\";\n");
        if self.has_exports {
            code.push_str("Object.defineProperty(exports, \"__esModule\", { value: true });\n");
        }
        for (exported, local) in &self.local_exports {
            let target = self.imported.get(local).map_or(local.as_str(), String::as_str);
            code.push_str(&define_getter(exported, target));
            code.push('\n');
        }
        for line in self.prologue.iter().chain(&self.star_exports) {
            code.push_str(line);
            code.push('\n');
        }
        code.push_str(&body);

        TransformOutput {
            specifiers: self.specifiers,
            code,
        }
    }

    fn text(&self, span: Span) -> &'s str {
        &self.source[span.start as usize..span.end as usize]
    }

    fn replace(&mut self, span: Span, replacement: String) {
        self.replace_range(span.start, span.end, replacement);
    }

    fn replace_range(&mut self, start: u32, end: u32, replacement: String) {
        self.edits.push(Edit {
            start: start as usize,
            end: end as usize,
            replacement,
        });
    }

    /// Local variable holding `require(specifier)`, one per distinct specifier.
    fn require(&mut self, specifier: &str) -> String {
        if let Some(binding) = self.bindings.get(specifier) {
            return binding.clone();
        }

        let binding = format!("__tinypack_dep{}", self.bindings.len());
        self.prologue
            .push(format!("var {} = require({});", binding, quote(specifier)));
        self.bindings.insert(specifier.to_string(), binding.clone());
        if !self.specifiers.iter().any(|s| s == specifier) {
            self.specifiers.push(specifier.to_string());
        }
        binding
    }

    /// `{ default: dep }` unless `dep` came from an ES module.
    fn interop(&mut self, dep: &str) -> String {
        if let Some(interop) = self.interops.get(dep) {
            return interop.clone();
        }

        let interop = format!("{}_interop", dep);
        self.prologue.push(format!(
            "var {interop} = {dep} && {dep}.__esModule ? {dep} : {{ default: {dep} }};",
            interop = interop,
            dep = dep
        ));
        self.interops.insert(dep.to_string(), interop.clone());
        interop
    }

    /// Points every resolved reference of `local` at `target`.
    fn bind_import(&mut self, local: &BindingIdentifier, target: String) {
        let semantic = self.semantic;
        let scoping = semantic.scoping();
        let mut rewrites = Vec::new();

        for reference_id in scoping.get_resolved_reference_ids(local.symbol_id()) {
            let node_id = scoping.get_reference(*reference_id).node_id();
            let AstKind::IdentifierReference(ident) = semantic.nodes().get_node(node_id).kind()
            else {
                continue;
            };
            let span = ident.span;
            let replacement = if self.shorthand.contains(&span.start) {
                format!("{}: {}", ident.name, target)
            } else if self.callees.contains(&(span.start, span.end)) {
                format!("(0, {})", target)
            } else {
                target.clone()
            };
            rewrites.push((span, replacement));
        }

        for (span, replacement) in rewrites {
            self.replace(span, replacement);
        }
        self.imported.insert(local.name.to_string(), target);
    }

    fn lower_import(&mut self, decl: &ImportDeclaration) {
        let dep = self.require(decl.source.value.as_str());

        if let Some(specifiers) = &decl.specifiers {
            for specifier in specifiers {
                match specifier {
                    ImportDeclarationSpecifier::ImportSpecifier(s) => {
                        let target = member(&dep, s.imported.name().as_str());
                        self.bind_import(&s.local, target);
                    }
                    ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                        let interop = self.interop(&dep);
                        self.bind_import(&s.local, format!("{}.default", interop));
                    }
                    ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                        self.prologue.push(format!("var {} = {};", s.local.name, dep));
                    }
                }
            }
        }

        self.replace(decl.span, String::new());
    }

    fn lower_export_named(&mut self, decl: &ExportNamedDeclaration) {
        self.has_exports = true;

        if let Some(source) = &decl.source {
            let dep = self.require(source.value.as_str());
            for specifier in &decl.specifiers {
                let getter = member(&dep, specifier.local.name().as_str());
                self.prologue
                    .push(define_getter(specifier.exported.name().as_str(), &getter));
            }
            self.replace(decl.span, String::new());
            return;
        }

        if let Some(declaration) = &decl.declaration {
            match declaration {
                Declaration::FunctionDeclaration(func) => {
                    if let Some(id) = &func.id {
                        self.export_local(id.name.as_str(), id.name.as_str());
                    }
                    self.replace_range(decl.span.start, func.span.start, String::new());
                }
                // `var` keeps early reads in a cycle at `undefined` instead of a TDZ error.
                Declaration::VariableDeclaration(var) => {
                    for declarator in &var.declarations {
                        for id in declarator.id.get_binding_identifiers() {
                            self.export_local(id.name.as_str(), id.name.as_str());
                        }
                    }
                    let keyword = self
                        .text(var.span)
                        .find(|c: char| !c.is_ascii_alphabetic())
                        .unwrap_or(0) as u32;
                    self.replace_range(
                        decl.span.start,
                        var.span.start + keyword,
                        "var".to_string(),
                    );
                }
                Declaration::ClassDeclaration(class) => {
                    if let Some(id) = &class.id {
                        self.export_local(id.name.as_str(), id.name.as_str());
                        self.replace_range(
                            decl.span.start,
                            class.span.start,
                            format!("var {} = ", id.name),
                        );
                        self.replace_range(class.span.end, decl.span.end, ";".to_string());
                    }
                }
                _ => {}
            }
            return;
        }

        for specifier in &decl.specifiers {
            self.export_local(
                specifier.exported.name().as_str(),
                specifier.local.name().as_str(),
            );
        }
        self.replace(decl.span, String::new());
    }

    fn export_local(&mut self, exported: &str, local: &str) {
        self.local_exports
            .push((exported.to_string(), local.to_string()));
    }

    fn lower_export_default(&mut self, decl: &ExportDefaultDeclaration) {
        self.has_exports = true;

        match &decl.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(func) if func.id.is_some() => {
                if let Some(id) = &func.id {
                    self.export_local("default", id.name.as_str());
                }
                self.replace_range(decl.span.start, func.span.start, String::new());
            }
            ExportDefaultDeclarationKind::ClassDeclaration(class) if class.id.is_some() => {
                if let Some(id) = &class.id {
                    self.export_local("default", id.name.as_str());
                    self.replace_range(
                        decl.span.start,
                        class.span.start,
                        format!("var {} = ", id.name),
                    );
                }
                self.replace_range(class.span.end, decl.span.end, ";".to_string());
            }
            other => {
                let span = other.span();
                self.replace_range(
                    decl.span.start,
                    span.start,
                    "exports.default = (".to_string(),
                );
                self.replace_range(span.end, decl.span.end, ");".to_string());
            }
        }
    }

    /// Copies run after every explicit export is defined, so a local or named
    /// export always wins over a name from `export *`.
    fn lower_export_all(&mut self, decl: &ExportAllDeclaration) {
        self.has_exports = true;
        let dep = self.require(decl.source.value.as_str());

        match &decl.exported {
            Some(exported) => self.prologue.push(define_getter(exported.name().as_str(), &dep)),
            None => self.star_exports.push(format!(
                "Object.keys({dep}).forEach(function (key) {{ \
                 if (key === \"default\" || key === \"__esModule\" || Object.prototype.hasOwnProperty.call(exports, key)) return; \
                 Object.defineProperty(exports, key, {{ enumerable: true, get: function () {{ return {dep}[key]; }} }}); }});",
                dep = dep
            )),
        }

        self.replace(decl.span, String::new());
    }

    /// Applies edits in source order. An edit inside a statement that is
    /// already being replaced is dropped.
    fn apply_edits(&mut self) -> String {
        self.edits.sort_by_key(|edit| (edit.start, Reverse(edit.end)));

        let mut body = String::with_capacity(self.source.len());
        let mut cursor = 0;

        for edit in &self.edits {
            if edit.start < cursor {
                continue;
            }
            body.push_str(&self.source[cursor..edit.start]);
            body.push_str(&edit.replacement);
            cursor = edit.end;
        }
        body.push_str(&self.source[cursor..]);

        body
    }
}
