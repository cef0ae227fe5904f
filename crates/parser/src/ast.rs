use pest::Parser as _;
use smol_str::SmolStr;

use super::{syntax::Node, Error};
use crate::{
    syntax::{FromSyntax, Parser, Rule, Spanned},
    Span,
};
pub use ir::LocKind;

pub fn parse(input: &str) -> Result<Module, Vec<Error>> {
    match Parser::parse(Rule::module, input) {
        Err(err) => Err(vec![Error::SyntaxError(err)]),
        Ok(mut pairs) => {
            let pair = pairs.next().unwrap();
            debug_assert_eq!(pair.as_rule(), Rule::module);
            let mut node = Node::new(pair);

            let module = Module::from_syntax(&mut node);

            if node.errors.is_empty() {
                Ok(module)
            } else {
                Err(node.errors)
            }
        }
    }
}

#[derive(Debug)]
pub struct Module {
    pub source: Option<SmolStr>,
    pub ast_nodes: Vec<AstNodeDecl>,
    pub functions: Vec<Func>,
}

impl FromSyntax<Error> for Module {
    fn from_syntax(node: &mut Node<Error>) -> Self {
        let source = node.descend_into_opt(Rule::source_decl, |n| {
            n.descend_into(Rule::string_literal, |n| {
                SmolStr::from(n.txt_opt(Rule::string_inner).unwrap_or_default())
            })
        });
        let ast_nodes = node
            .descend_into_opt(Rule::ast_decl, |n| n.multi(Rule::ast_node))
            .unwrap_or_default();

        Module {
            source,
            ast_nodes,
            functions: node.multi(Rule::function),
        }
    }
}

impl FromSyntax<Error> for SmolStr {
    fn from_syntax(node: &mut Node<Error>) -> Self {
        node.txt.into()
    }
}

/// `#N: kind start..end;`
#[derive(Debug)]
pub struct AstNodeDecl {
    pub id: NodeId,
    pub kind: Spanned<SmolStr>,
    pub range: Option<(u32, u32)>,
    pub span: Span,
}

impl FromSyntax<Error> for AstNodeDecl {
    fn from_syntax(node: &mut Node<Error>) -> Self {
        let span = node.span;
        let id = node.single(Rule::node_ident);
        let kind = node.single(Rule::node_kind);
        let range = node.descend_into(Rule::source_range, |n| {
            let start = number(n, Rule::source_pos)?;
            let end = number(n, Rule::source_pos)?;
            Some((start, end))
        });

        AstNodeDecl {
            id,
            kind,
            range,
            span,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NodeId {
    pub id: Option<u32>,
    pub span: Span,
}

impl FromSyntax<Error> for NodeId {
    fn from_syntax(node: &mut Node<Error>) -> Self {
        let span = node.span;
        let id = number(node, Rule::node_number);
        NodeId { id, span }
    }
}

/// `@ [return | implicit_return] #N`
#[derive(Debug, Clone, Copy)]
pub struct Loc {
    pub kind: LocKind,
    pub node: NodeId,
}

impl FromSyntax<Error> for Loc {
    fn from_syntax(node: &mut Node<Error>) -> Self {
        let kind = match node.txt_opt(Rule::loc_kind) {
            Some("return") => LocKind::Return,
            Some("implicit_return") => LocKind::ImplicitReturn,
            Some(_) => unreachable!(),
            None => LocKind::Regular,
        };
        Loc {
            kind,
            node: node.single(Rule::node_ident),
        }
    }
}

#[derive(Debug)]
pub struct Func {
    pub signature: FuncSignature,
    pub blocks: Vec<Block>,
}

impl FromSyntax<Error> for Func {
    fn from_syntax(node: &mut Node<Error>) -> Self {
        Func {
            signature: node.single(Rule::function_signature),
            blocks: node.multi(Rule::block),
        }
    }
}

#[derive(Debug)]
pub struct FuncSignature {
    pub name: Spanned<FunctionName>,
    pub params: Vec<ValueDeclaration>,
    pub ret_type: Type,
    pub noreturn: bool,
    pub loc: Option<Loc>,
}

impl FromSyntax<Error> for FuncSignature {
    fn from_syntax(node: &mut Node<Error>) -> Self {
        FuncSignature {
            name: node.single(Rule::function_identifier),
            params: node.descend_into(Rule::function_params, |n| n.multi(Rule::value_declaration)),
            ret_type: node.single(Rule::type_name),
            noreturn: node.has(Rule::noreturn),
            loc: node.single_opt(Rule::location),
        }
    }
}

/// Doesn't include `%` prefix.
#[derive(Debug)]
pub struct FunctionName(pub SmolStr);

impl FromSyntax<Error> for FunctionName {
    fn from_syntax(node: &mut Node<Error>) -> Self {
        FunctionName(node.single(Rule::function_name))
    }
}

#[derive(Debug)]
pub struct Block {
    pub id: BlockId,
    pub params: Vec<ValueDeclaration>,
    pub stmts: Vec<Stmt>,
}

impl FromSyntax<Error> for Block {
    fn from_syntax(node: &mut Node<Error>) -> Self {
        Self {
            id: node.single(Rule::block_ident),
            params: node
                .descend_into_opt(Rule::block_params, |n| n.multi(Rule::value_declaration))
                .unwrap_or_default(),
            stmts: node.multi(Rule::stmt),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BlockId {
    pub id: Option<u32>,
    pub span: Span,
}

impl FromSyntax<Error> for BlockId {
    fn from_syntax(node: &mut Node<Error>) -> Self {
        let span = node.span;
        let id = number(node, Rule::block_number);
        BlockId { id, span }
    }
}

#[derive(Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub loc: Option<Loc>,
    pub span: Span,
}

impl FromSyntax<Error> for Stmt {
    fn from_syntax(node: &mut Node<Error>) -> Self {
        let span = node.span;
        let loc = node.single_opt(Rule::location);

        node.descend();
        let kind = match node.rule {
            Rule::define_stmt => StmtKind::Define(
                node.single(Rule::value_declaration),
                node.single(Rule::expr),
            ),
            Rule::br_stmt => StmtKind::Br(
                node.single(Rule::block_ident),
                node.descend_into_opt(Rule::value_args, |n| n.multi(Rule::value_name))
                    .unwrap_or_default(),
            ),
            Rule::cond_br_stmt => StmtKind::CondBr(
                node.single(Rule::value_name),
                node.single(Rule::block_ident),
                node.single(Rule::block_ident),
            ),
            Rule::return_stmt => StmtKind::Return(node.single_opt(Rule::value_name)),
            Rule::unreachable_stmt => StmtKind::Unreachable,
            _ => unreachable!(),
        };
        Stmt { kind, loc, span }
    }
}

#[derive(Debug)]
pub enum StmtKind {
    Define(ValueDeclaration, Expr),
    Br(BlockId, Vec<ValueName>),
    CondBr(ValueName, BlockId, BlockId),
    Return(Option<ValueName>),
    Unreachable,
}

#[derive(Debug)]
pub enum Expr {
    /// `None` if the literal doesn't fit in 128 bits; the error is already
    /// recorded.
    IntegerLiteral(Spanned<Option<i128>>),
    BuiltinRef(Spanned<SmolStr>),
    FunctionRef(Spanned<FunctionName>),
    Apply(ValueName, Vec<ValueName>),
}

impl FromSyntax<Error> for Expr {
    fn from_syntax(node: &mut Node<Error>) -> Self {
        node.descend();
        match node.rule {
            Rule::integer_literal_expr => Expr::IntegerLiteral(node.single(Rule::integer)),
            Rule::builtin_ref_expr => Expr::BuiltinRef(node.single(Rule::builtin_name)),
            Rule::function_ref_expr => Expr::FunctionRef(node.single(Rule::function_identifier)),
            Rule::apply_expr => Expr::Apply(
                node.single(Rule::value_name),
                node.descend_into(Rule::value_args, |n| n.multi(Rule::value_name)),
            ),
            _ => unreachable!(),
        }
    }
}

impl FromSyntax<Error> for Option<i128> {
    fn from_syntax(node: &mut Node<Error>) -> Self {
        let value = node.txt.parse().ok();
        if value.is_none() {
            node.error(Error::NumberOutOfBounds(node.span));
        }
        value
    }
}

#[derive(Debug, Clone)]
pub struct ValueName {
    pub string: SmolStr,
    pub span: Span,
}

impl FromSyntax<Error> for ValueName {
    fn from_syntax(node: &mut Node<Error>) -> Self {
        Self {
            string: node.txt.into(),
            span: node.span,
        }
    }
}

#[derive(Debug)]
pub struct ValueDeclaration(pub ValueName, pub Type);

impl FromSyntax<Error> for ValueDeclaration {
    fn from_syntax(node: &mut Node<Error>) -> Self {
        ValueDeclaration(node.single(Rule::value_name), node.single(Rule::type_name))
    }
}

/// A builtin type name or a nominal type name; resolved while building the
/// module.
#[derive(Debug)]
pub struct Type {
    pub name: SmolStr,
    pub span: Span,
}

impl FromSyntax<Error> for Type {
    fn from_syntax(node: &mut Node<Error>) -> Self {
        Type {
            name: node.txt.into(),
            span: node.span,
        }
    }
}

/// Parses the decimal child matching `rule`, recording an error if it
/// doesn't fit in a `u32`.
fn number(node: &mut Node<Error>, rule: Rule) -> Option<u32> {
    let pair = node.get(rule);
    let span = pair.as_span().into();
    let n = pair.as_str().parse().ok();
    if n.is_none() {
        node.error(Error::NumberOutOfBounds(span));
    }
    n
}
