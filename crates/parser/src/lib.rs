use std::hash::BuildHasherDefault;

use ast::{StmtKind, ValueDeclaration};
use ir::{
    builder::{FunctionBuilder, ModuleBuilder},
    ir_writer::DebugProvider,
    AstContext, AstNodeKind, AstNodeRef, BlockId, Builtin, FuncRef, Inst, Location, Module,
    Signature, SourceRange, ValueId,
};
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use smallvec::SmallVec;
use smol_str::SmolStr;
use syntax::Spanned;

pub mod ast;
mod error;
pub mod syntax;
pub use error::{Error, UndefinedKind};
pub use syntax::Span;

type Bimap<K, V> = bimap::BiHashMap<K, V, BuildHasherDefault<FxHasher>>;

pub struct ParsedModule {
    pub module: Module,
    pub debug: DebugInfo,
}

pub fn parse_module(input: &str) -> Result<ParsedModule, Vec<Error>> {
    let ast = ast::parse(input)?;

    let mut builder = ModuleBuilder::default();
    let mut ctx = BuildCtx::default();

    for (idx, decl) in ast.ast_nodes.iter().enumerate() {
        ctx.ast_node(&mut builder, idx as u32, decl);
    }

    // Declare every function up front so that `function_ref` may refer to a
    // function defined later in the file.
    let mut declared = Vec::with_capacity(ast.functions.len());
    for func in &ast.functions {
        let sig = &func.signature;
        let name = &sig.name.inner.0;
        if ctx.func_refs.contains_key(name) {
            ctx.errors.push(Error::DuplicatedDeclaration(
                format!("%{name}").into(),
                sig.name.span,
            ));
            declared.push(None);
            continue;
        }

        let args = sig
            .params
            .iter()
            .map(|ValueDeclaration(_, ty)| ctx.type_(&mut builder.ast, ty))
            .collect::<Vec<_>>();
        let ret_ty = ctx.type_(&mut builder.ast, &sig.ret_type);
        let loc = ctx.location(&builder.ast, sig.loc);

        let ir_sig = Signature::new(name, &args, ret_ty).with_noreturn(sig.noreturn);
        let func_ref = builder.declare_function(ir_sig, loc);
        ctx.func_refs.insert(name.clone(), func_ref);
        declared.push(Some(func_ref));
    }

    for (func, func_ref) in ast.functions.iter().zip(declared) {
        if let Some(func_ref) = func_ref {
            ctx.build_func(&mut builder, func_ref, func);
        }
    }

    if ctx.errors.is_empty() {
        Ok(ParsedModule {
            module: builder.build(),
            debug: DebugInfo {
                source: ast.source,
                value_names: ctx.value_names,
            },
        })
    } else {
        Err(ctx.errors)
    }
}

pub struct DebugInfo {
    /// Path of the source file the AST ranges point into, from the
    /// `source "...";` header.
    pub source: Option<SmolStr>,
    pub value_names: FxHashMap<FuncRef, Bimap<ValueId, SmolStr>>,
}

impl DebugProvider for DebugInfo {
    fn value_name(&self, func: FuncRef, value: ValueId) -> Option<&str> {
        let names = self.value_names.get(&func)?;
        names.get_by_left(&value).map(|s| s.as_str())
    }
}

#[derive(Default)]
struct BuildCtx {
    errors: Vec<Error>,
    func_refs: FxHashMap<SmolStr, FuncRef>,
    /// Textual block label to the block allocated for it.
    blocks: FxHashMap<u32, BlockId>,
    value_names: FxHashMap<FuncRef, Bimap<ValueId, SmolStr>>,
    func_value_names: Bimap<ValueId, SmolStr>,
}

impl BuildCtx {
    fn ast_node(&mut self, mb: &mut ModuleBuilder, expected: u32, decl: &ast::AstNodeDecl) {
        if decl.id.id.is_some_and(|id| id != expected) {
            self.errors.push(Error::UnexpectedNodeId {
                expected,
                span: decl.id.span,
            });
        }

        let kind = AstNodeKind::by_name(&decl.kind.inner).unwrap_or_else(|| {
            self.errors.push(Error::Undefined(
                UndefinedKind::NodeKind(decl.kind.inner.clone()),
                decl.kind.span,
            ));
            AstNodeKind::OtherStmt
        });

        let range = match decl.range {
            Some((start, end)) if start <= end => SourceRange::new(start, end),
            Some(_) => {
                self.errors.push(Error::InvalidSourceRange(decl.span));
                SourceRange::default()
            }
            None => SourceRange::default(),
        };

        // The node is made even on error to keep the numbering of the
        // following nodes intact.
        mb.make_ast_node(kind, range);
    }

    fn build_func(&mut self, mb: &mut ModuleBuilder, func_ref: FuncRef, func: &ast::Func) {
        self.blocks.clear();
        let (mut fb, ast_ctx) = mb.func_builder_with_ast(func_ref);

        for (i, ValueDeclaration(name, _ty)) in func.signature.params.iter().enumerate() {
            let value = fb.args()[i];
            self.name_value(value, name);
        }

        // Collect all block labels first; branches may jump forward. Blocks
        // are allocated densely in ascending label order, so `block0`..`blockN`
        // keep their numbers.
        let mut labels = FxHashSet::default();
        let mut has_dup = FxHashSet::default();
        for block in &func.blocks {
            let Some(id) = block.id.id else {
                continue;
            };
            if !labels.insert(id) && has_dup.insert(id) {
                self.errors.push(Error::DuplicatedDeclaration(
                    format!("block{id}").into(),
                    block.id.span,
                ));
            }
        }
        let mut declared: Vec<_> = labels.into_iter().collect();
        declared.sort_unstable();
        for id in declared {
            let block_id = fb.make_block();
            self.blocks.insert(id, block_id);
        }

        let mut laid_out = FxHashSet::default();
        for block in &func.blocks {
            let Some(id) = block.id.id else {
                continue;
            };
            if !laid_out.insert(id) {
                continue;
            }
            let block_id = self.blocks[&id];
            fb.insert_block(block_id);
            fb.switch_to_block(block_id);

            for ValueDeclaration(name, ty) in &block.params {
                let ty = self.type_(ast_ctx, ty);
                let value = fb.append_block_param(block_id, ty);
                self.name_value(value, name);
            }

            for stmt in &block.stmts {
                let loc = self.location(ast_ctx, stmt.loc);
                fb.set_location(loc);
                self.build_stmt(&mut fb, ast_ctx, stmt);
            }
        }

        let names = std::mem::take(&mut self.func_value_names);
        self.value_names.insert(func_ref, names);
    }

    fn build_stmt(
        &mut self,
        fb: &mut FunctionBuilder<'_>,
        ast_ctx: &mut AstContext,
        stmt: &ast::Stmt,
    ) {
        match &stmt.kind {
            StmtKind::Define(ValueDeclaration(name, type_), expr) => {
                let ty = self.type_(ast_ctx, type_);

                let inst = match expr {
                    ast::Expr::IntegerLiteral(lit) => {
                        if !ty.is_integral() {
                            self.type_error("integer type", type_.span);
                        } else if lit.inner.is_some_and(|value| !literal_fits(value, ty)) {
                            self.errors.push(Error::NumberOutOfBounds(lit.span));
                        }
                        Inst::IntegerLiteral {
                            value: lit.inner.unwrap_or_default(),
                        }
                    }

                    ast::Expr::BuiltinRef(builtin_name) => {
                        self.expect_fn_type(ty, type_);
                        let builtin = Builtin::by_name(&builtin_name.inner).unwrap_or_else(|| {
                            self.errors.push(Error::Undefined(
                                UndefinedKind::Builtin(builtin_name.inner.clone()),
                                builtin_name.span,
                            ));
                            Builtin::StaticReport
                        });
                        Inst::BuiltinRef { builtin }
                    }

                    ast::Expr::FunctionRef(name) => {
                        self.expect_fn_type(ty, type_);
                        Inst::FunctionRef {
                            func: self.func_ref(name),
                        }
                    }

                    ast::Expr::Apply(callee, args) => {
                        let callee = self.value(callee);
                        let args: SmallVec<[ValueId; 4]> =
                            args.iter().map(|arg| self.value(arg)).collect();
                        Inst::Apply { callee, args }
                    }
                };

                let value = fb.insert_inst(inst, ty);
                self.name_value(value, name);
            }

            StmtKind::Br(dest, args) => {
                let dest = self.block(dest);
                let args = args.iter().map(|arg| self.value(arg)).collect::<Vec<_>>();
                fb.br(dest, &args);
            }

            StmtKind::CondBr(cond, then_dest, else_dest) => {
                let cond = self.value(cond);
                let then_dest = self.block(then_dest);
                let else_dest = self.block(else_dest);
                fb.cond_br(cond, then_dest, else_dest);
            }

            StmtKind::Return(arg) => {
                let arg = arg.as_ref().map(|arg| self.value(arg));
                fb.ret(arg);
            }

            StmtKind::Unreachable => {
                fb.unreachable();
            }
        }
    }

    fn location(&mut self, ast_ctx: &AstContext, loc: Option<ast::Loc>) -> Location {
        let Some(ast::Loc { kind, node }) = loc else {
            return Location::Invalid;
        };
        // An id that didn't fit in a `u32` is already reported.
        let Some(id) = node.id else {
            return Location::Invalid;
        };

        if id as usize >= ast_ctx.node_num() {
            self.errors
                .push(Error::Undefined(UndefinedKind::Node(id), node.span));
            return Location::Invalid;
        }
        let node_ref = AstNodeRef::from_u32(id);

        match kind {
            ir::LocKind::Regular => Location::regular(node_ref),
            ir::LocKind::Return => Location::ret(node_ref),
            ir::LocKind::ImplicitReturn => Location::implicit_return(node_ref),
        }
    }

    fn func_ref(&mut self, name: &Spanned<ast::FunctionName>) -> FuncRef {
        self.func_refs
            .get(&name.inner.0)
            .copied()
            .unwrap_or_else(|| {
                self.errors.push(Error::Undefined(
                    UndefinedKind::Func(name.inner.0.clone()),
                    name.span,
                ));
                FuncRef::from_u32(0)
            })
    }

    fn block(&mut self, b: &ast::BlockId) -> BlockId {
        let Some(id) = b.id else {
            return BlockId(0);
        };
        match self.blocks.get(&id) {
            Some(block_id) => *block_id,
            None => {
                self.errors
                    .push(Error::Undefined(UndefinedKind::Block(id), b.span));
                BlockId(0)
            }
        }
    }

    fn name_value(&mut self, value: ValueId, name: &ast::ValueName) {
        if self
            .func_value_names
            .insert_no_overwrite(value, name.string.clone())
            .is_err()
        {
            self.errors
                .push(Error::DuplicateValueName(name.string.clone(), name.span));
        }
    }

    fn value(&mut self, name: &ast::ValueName) -> ValueId {
        self.func_value_names
            .get_by_right(&name.string)
            .copied()
            .unwrap_or_else(|| {
                self.errors.push(Error::Undefined(
                    UndefinedKind::Value(name.string.clone()),
                    name.span,
                ));
                ValueId(0)
            })
    }

    fn type_(&mut self, ast_ctx: &mut AstContext, t: &ast::Type) -> ir::Type {
        ir::Type::builtin_by_name(&t.name).unwrap_or_else(|| ast_ctx.types.make_nominal(&t.name))
    }

    fn expect_fn_type(&mut self, ty: ir::Type, type_: &ast::Type) {
        if ty != ir::Type::Fn {
            self.type_error("fn", type_.span);
        }
    }

    fn type_error(&mut self, expected: &str, span: Span) {
        self.errors.push(Error::TypeError {
            expected: expected.to_string(),
            span,
        });
    }
}

/// Literals may be spelled signed or unsigned, e.g. both `-1` and `255` are
/// accepted for `i8`.
fn literal_fits(value: i128, ty: ir::Type) -> bool {
    let bits = match ty {
        ir::Type::I1 => return value == 0 || value == 1,
        ir::Type::I8 => 8,
        ir::Type::I16 => 16,
        ir::Type::I32 => 32,
        ir::Type::I64 => 64,
        _ => return true,
    };
    let min = -(1i128 << (bits - 1));
    let max = (1i128 << bits) - 1;
    (min..=max).contains(&value)
}
