//! C#-like rendering of a program.
//!
//! Output is for people and for tests that assert on whole-program shape;
//! it is not meant to be parsed back.

use crate::ids::{NodeIndex, SymbolId};
use crate::node::Node;
use crate::program::{MethodSymbol, Program, TypeDecl};
use crate::types::TypeKind;
use asyncify_common::limits::MAX_BODY_DEPTH;
use std::fmt::Write;

const INDENT: &str = "    ";

/// Render every module of the program.
pub fn print_program(program: &Program) -> String {
    let mut printer = Printer::new(program);
    for module in program.modules() {
        printer.line(0, &format!("// module {}", module.name));
        for ty in program.types().iter().filter(|t| t.module == module.id) {
            printer.print_type(ty);
        }
    }
    printer.out
}

/// Render a single method (signature and every declaration body).
pub fn print_method(program: &Program, symbol: SymbolId) -> String {
    let mut printer = Printer::new(program);
    if let Some(symbol) = program.symbol(symbol) {
        printer.print_method(0, symbol);
    }
    printer.out
}

/// Render one expression on a single line.
pub fn print_expr(program: &Program, idx: NodeIndex) -> String {
    let mut printer = Printer::new(program);
    printer.expr(idx, 0)
}

struct Printer<'a> {
    program: &'a Program,
    out: String,
}

impl<'a> Printer<'a> {
    fn new(program: &'a Program) -> Self {
        Self {
            program,
            out: String::new(),
        }
    }

    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn print_type(&mut self, ty: &TypeDecl) {
        let program = self.program;
        let keyword = match ty.kind {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
        };
        let supers: Vec<&str> = ty
            .supertypes()
            .filter_map(|id| program.type_decl(id))
            .map(|t| t.name.as_str())
            .collect();
        let header = if supers.is_empty() {
            format!("{keyword} {}", ty.name)
        } else {
            format!("{keyword} {} : {}", ty.name, supers.join(", "))
        };
        self.line(0, &header);
        self.line(0, "{");
        for root in &ty.initializers {
            if let Some(Node::Initializer { field, expr }) = program.nodes.get(*root) {
                let text = format!("var {field} = {};", self.expr(*expr, 0));
                self.line(1, &text);
            }
        }
        for member in &ty.members {
            if let Some(symbol) = program.symbol(*member) {
                self.print_method(1, symbol);
            }
        }
        self.line(0, "}");
    }

    fn signature(&self, symbol: &MethodSymbol) -> String {
        let mut sig = String::new();
        for keyword in symbol.modifiers.keywords() {
            sig.push_str(keyword);
            sig.push(' ');
        }
        let params: Vec<String> = symbol
            .params
            .iter()
            .map(|p| format!("{} {}", p.ty, p.name))
            .collect();
        let _ = write!(
            sig,
            "{} {}({})",
            symbol.return_type,
            symbol.name,
            params.join(", ")
        );
        sig
    }

    fn print_method(&mut self, depth: usize, symbol: &MethodSymbol) {
        let program = self.program;
        let sig = self.signature(symbol);
        if symbol.declarations.is_empty() {
            self.line(depth, &format!("extern {sig};"));
            return;
        }
        for decl in &symbol.declarations {
            let body = program
                .declaration(*decl)
                .map_or(NodeIndex::NONE, |d| d.body);
            if body.is_none() {
                self.line(depth, &format!("{sig};"));
            } else {
                self.line(depth, &sig);
                self.block(depth, body, 0);
            }
        }
    }

    fn block(&mut self, depth: usize, idx: NodeIndex, nesting: u32) {
        let program = self.program;
        self.line(depth, "{");
        if let Some(Node::Block { statements }) = program.nodes.get(idx) {
            for stmt in statements {
                self.stmt(depth + 1, *stmt, nesting + 1);
            }
        }
        self.line(depth, "}");
    }

    fn stmt(&mut self, depth: usize, idx: NodeIndex, nesting: u32) {
        let program = self.program;
        if nesting > MAX_BODY_DEPTH {
            self.line(depth, "/* ... */");
            return;
        }
        let Some(node) = program.nodes.get(idx) else {
            return;
        };
        match node {
            Node::ExprStatement { expr } => {
                let text = format!("{};", self.expr(*expr, nesting));
                self.line(depth, &text);
            }
            Node::Return { expr } => {
                let text = if expr.is_none() {
                    "return;".to_string()
                } else {
                    format!("return {};", self.expr(*expr, nesting))
                };
                self.line(depth, &text);
            }
            Node::Local { name, init } => {
                let text = format!("var {name} = {};", self.expr(*init, nesting));
                self.line(depth, &text);
            }
            Node::LocalFunction {
                name,
                is_async,
                return_type,
                body,
            } => {
                let prefix = if *is_async { "async " } else { "" };
                self.line(depth, &format!("{prefix}{return_type} {name}()"));
                self.block(depth, *body, nesting + 1);
            }
            Node::Block { .. } => self.block(depth, idx, nesting + 1),
            _ => {
                let text = format!("{};", self.expr(idx, nesting));
                self.line(depth, &text);
            }
        }
    }

    fn expr(&mut self, idx: NodeIndex, nesting: u32) -> String {
        let program = self.program;
        if nesting > MAX_BODY_DEPTH {
            return "...".to_string();
        }
        let Some(node) = program.nodes.get(idx) else {
            return String::new();
        };
        match node {
            Node::Call(call) => {
                let args: Vec<String> = call
                    .args
                    .iter()
                    .map(|a| self.expr(*a, nesting + 1))
                    .collect();
                let callee = self.qualified(call.receiver, &call.name, nesting);
                format!("{callee}({})", args.join(", "))
            }
            Node::Await { operand } => format!("await {}", self.expr(*operand, nesting + 1)),
            Node::MethodGroup { receiver, name, .. } => self.qualified(*receiver, name, nesting),
            Node::Lambda {
                is_async,
                params,
                body,
            } => {
                let prefix = if *is_async { "async " } else { "" };
                let statements: Vec<String> = match program.nodes.get(*body) {
                    Some(Node::Block { statements }) => statements
                        .iter()
                        .map(|s| self.inline_stmt(*s, nesting + 1))
                        .collect(),
                    _ => Vec::new(),
                };
                format!(
                    "{prefix}({}) => {{ {} }}",
                    params.join(", "),
                    statements.join(" ")
                )
            }
            Node::Name { text } | Node::Literal { text } => text.clone(),
            Node::Block { .. }
            | Node::ExprStatement { .. }
            | Node::Return { .. }
            | Node::Local { .. }
            | Node::LocalFunction { .. }
            | Node::Initializer { .. } => self.inline_stmt(idx, nesting),
        }
    }

    fn inline_stmt(&mut self, idx: NodeIndex, nesting: u32) -> String {
        let program = self.program;
        let Some(node) = program.nodes.get(idx) else {
            return String::new();
        };
        match node {
            Node::ExprStatement { expr } => format!("{};", self.expr(*expr, nesting + 1)),
            Node::Return { expr } if expr.is_none() => "return;".to_string(),
            Node::Return { expr } => format!("return {};", self.expr(*expr, nesting + 1)),
            Node::Local { name, init } => {
                format!("var {name} = {};", self.expr(*init, nesting + 1))
            }
            _ => format!("{};", self.expr(idx, nesting + 1)),
        }
    }

    fn qualified(&mut self, receiver: NodeIndex, name: &str, nesting: u32) -> String {
        if receiver.is_none() {
            return name.to_string();
        }
        let text = self.expr(receiver, nesting + 1);
        // Member access binds tighter than `await` and lambdas.
        match self.program.nodes.get(receiver) {
            Some(Node::Await { .. } | Node::Lambda { .. }) => format!("({text}).{name}"),
            _ => format!("{text}.{name}"),
        }
    }
}
