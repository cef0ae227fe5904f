//! Textual dump of a [`Module`] in the syntax accepted by `sluice-parser`.
use std::io;

use crate::{
    module::FuncRef, AstContext, BlockId, Function, Inst, InstId, Location, Module, ValueId,
};

pub trait DebugProvider {
    fn value_name(&self, _func: FuncRef, _value: ValueId) -> Option<&str> {
        None
    }
}
impl DebugProvider for () {}

pub struct ModuleWriter<'a> {
    module: &'a Module,
    debug: Option<&'a dyn DebugProvider>,
}

impl<'a> ModuleWriter<'a> {
    pub fn new(module: &'a Module) -> Self {
        Self {
            module,
            debug: None,
        }
    }

    pub fn with_debug_provider(module: &'a Module, debug: &'a dyn DebugProvider) -> Self {
        Self {
            module,
            debug: Some(debug),
        }
    }

    pub fn write(&mut self, mut w: impl io::Write) -> io::Result<()> {
        let ast = &self.module.ast;
        if ast.node_num() != 0 {
            writeln!(w, "ast {{")?;
            for (node_ref, node) in ast.nodes() {
                writeln!(
                    w,
                    "    #{}: {} {};",
                    node_ref.as_u32(),
                    node.kind,
                    node.range
                )?;
            }
            writeln!(w, "}}")?;
            writeln!(w)?;
        }

        let mut funcs = self.module.funcs.keys().peekable();
        while let Some(func_ref) = funcs.next() {
            FuncWriter::new(self.module, func_ref, self.debug).write(&mut w)?;
            if funcs.peek().is_some() {
                writeln!(w)?;
            }
        }

        Ok(())
    }

    pub fn dump_string(&mut self) -> io::Result<String> {
        let mut s = Vec::new();
        self.write(&mut s)?;
        String::from_utf8(s).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

pub struct FuncWriter<'a> {
    module: &'a Module,
    func_ref: FuncRef,
    func: &'a Function,
    ast: &'a AstContext,
    debug: Option<&'a dyn DebugProvider>,
}

impl<'a> FuncWriter<'a> {
    pub fn new(
        module: &'a Module,
        func_ref: FuncRef,
        debug: Option<&'a dyn DebugProvider>,
    ) -> Self {
        Self {
            module,
            func_ref,
            func: &module.funcs[func_ref],
            ast: &module.ast,
            debug,
        }
    }

    pub fn write(&mut self, mut w: impl io::Write) -> io::Result<()> {
        write!(w, "func %{}(", self.func.name())?;
        let args: Vec<_> = self
            .func
            .arg_values
            .iter()
            .map(|arg| self.value_with_ty(*arg))
            .collect();
        write!(w, "{}) -> ", args.join(", "))?;
        write!(w, "{}", self.func.sig.ret_ty().display(self.ast))?;
        if self.func.sig.is_noreturn() {
            write!(w, " noreturn")?;
        }
        self.write_loc(self.func.loc, &mut w)?;
        writeln!(w, " {{")?;

        for block in self.func.layout.iter_block() {
            self.write_block_with_insts(block, &mut w)?;
        }

        writeln!(w, "}}")
    }

    pub fn dump_string(&mut self) -> io::Result<String> {
        let mut s = Vec::new();
        self.write(&mut s)?;
        String::from_utf8(s).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub fn value_name(&self, value: ValueId) -> String {
        self.debug
            .and_then(|d| d.value_name(self.func_ref, value))
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string())
    }

    fn value_with_ty(&self, value: ValueId) -> String {
        let ty = self.func.dfg.value_ty(value);
        format!("{}.{}", self.value_name(value), ty.display(self.ast))
    }

    fn value_list(&self, values: &[ValueId]) -> String {
        values
            .iter()
            .map(|v| self.value_name(*v))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn write_block_with_insts(&self, block: BlockId, mut w: impl io::Write) -> io::Result<()> {
        let params = self.func.dfg.block_params(block);
        if params.is_empty() {
            writeln!(w, "    {block}:")?;
        } else {
            let params: Vec<_> = params.iter().map(|p| self.value_with_ty(*p)).collect();
            writeln!(w, "    {block}({}):", params.join(", "))?;
        }

        for inst in self.func.layout.iter_inst(block) {
            write!(w, "        ")?;
            self.write_inst(inst, &mut w)?;
            writeln!(w, ";")?;
        }

        Ok(())
    }

    fn write_inst(&self, inst_id: InstId, mut w: impl io::Write) -> io::Result<()> {
        let dfg = &self.func.dfg;
        if let Some(result) = dfg.inst_result(inst_id) {
            write!(w, "{} = ", self.value_with_ty(result))?;
        }

        let inst = dfg.inst(inst_id);
        write!(w, "{}", inst.as_text())?;
        match inst {
            Inst::IntegerLiteral { value } => write!(w, " {value}")?,
            Inst::BuiltinRef { builtin } => write!(w, " {builtin}")?,
            Inst::FunctionRef { func } => match self.module.funcs.get(*func) {
                Some(callee) => write!(w, " %{}", callee.name())?,
                None => write!(w, " %{func}")?,
            },
            Inst::Apply { callee, args } => write!(
                w,
                " {}({})",
                self.value_name(*callee),
                self.value_list(args)
            )?,
            Inst::Br { dest, args } => {
                if args.is_empty() {
                    write!(w, " {dest}")?
                } else {
                    write!(w, " {dest}({})", self.value_list(args))?
                }
            }
            Inst::CondBr {
                cond,
                then_dest,
                else_dest,
            } => write!(w, " {}, {then_dest}, {else_dest}", self.value_name(*cond))?,
            Inst::Return { arg } => {
                if let Some(arg) = arg {
                    write!(w, " {}", self.value_name(*arg))?
                }
            }
            Inst::Unreachable => {}
        }

        self.write_loc(dfg.inst_loc(inst_id), &mut w)
    }

    fn write_loc(&self, loc: Location, mut w: impl io::Write) -> io::Result<()> {
        if loc.is_valid() {
            write!(w, " @ {loc}")?;
        }
        Ok(())
    }}
