use std::fmt;

use dir_test::{dir_test, Fixture};
use indenter::indented;
use ir::ir_writer::ModuleWriter;
use pest::{iterators::Pairs, Parser as _};
use sluice_parser::{
    parse_module,
    syntax::{Parser, Rule},
};

#[dir_test(
    dir: "$CARGO_MANIFEST_DIR/test_files/syntax",
    glob: "*.sil"
)]
fn test_module_ir(fixture: Fixture<&str>) {
    let parsed = match parse_module(fixture.content()) {
        Ok(parsed) => parsed,
        Err(errs) => {
            for err in errs {
                eprintln!(
                    "{}",
                    err.print_to_string(fixture.path(), fixture.content(), false)
                );
            }
            panic!("failed to parse {}", fixture.path());
        }
    };

    let mut w = ModuleWriter::with_debug_provider(&parsed.module, &parsed.debug);
    assert_eq!(w.dump_string().unwrap(), *fixture.content());
}

#[test]
fn source_header() {
    let parsed = parse_module(
        r#"source "main.swift";

        ast {
            #0: func_decl 0..4;
        }"#,
    )
    .unwrap();

    assert_eq!(parsed.debug.source.as_deref(), Some("main.swift"));
    assert_eq!(parsed.module.ast.node_num(), 1);
    assert!(parsed.module.funcs.is_empty());
}

#[test]
fn syntax_error() {
    let input = "func %f() -> unit {\n    block0:\n        unreachable\n}\n";
    let Err(errs) = parse_module(input) else {
        panic!("missing `;` must be rejected");
    };
    assert_eq!(errs.len(), 1);
    assert!(matches!(errs[0], sluice_parser::Error::SyntaxError(_)));

    let rendered = errs[0].print_to_string("missing_semi.sil", input, false);
    assert!(rendered.contains("parse error"));
}

#[test]
fn stmt_pairs() {
    let pairs = Parser::parse(Rule::stmt, "v3.unit = apply v1(v2) @ #0;").unwrap();
    insta::assert_snapshot!(format!("{:?}", PairsWrapper(pairs)), @r##"
    stmt "v3.unit = apply v1(v2) @ #0;"
      define_stmt "v3.unit = apply v1(v2)"
        value_declaration "v3.unit"
          value_name "v3"
          type_name "unit"
        expr "apply v1(v2)"
          apply_expr "apply v1(v2)"
            value_name "v1"
            value_args "(v2)"
              value_name "v2"
      location "@ #0"
        node_ident "#0"
          node_number "0"
    "##);

    let pairs = Parser::parse(Rule::stmt, "return v1 @ implicit_return #2;").unwrap();
    insta::assert_snapshot!(format!("{:?}", PairsWrapper(pairs)), @r##"
    stmt "return v1 @ implicit_return #2;"
      return_stmt "return v1"
        value_name "v1"
      location "@ implicit_return #2"
        loc_kind "implicit_return"
        node_ident "#2"
          node_number "2"
    "##);
}

struct PairsWrapper<'i>(Pairs<'i, Rule>);

impl fmt::Debug for PairsWrapper<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;

        for pair in self.0.clone() {
            let rule = pair.as_rule();
            writeln!(f, "{rule:?} \"{}\"", pair.as_str())?;
            let pairs = pair.into_inner();
            if pairs.len() > 0 {
                write!(indented(f).with_str("  "), "{:?}", &PairsWrapper(pairs))?;
            }
        }
        Ok(())
    }
}
