use std::path::Path;

use dir_test::{dir_test, Fixture};
use sluice_parser::parse_module;

/// Each fixture lists the expected error messages, in order, as
/// `// error: <message>` lines.
#[dir_test(
    dir: "$CARGO_MANIFEST_DIR/test_files/errors/",
    glob: "*.sil"
)]
fn test_errors(fixture: Fixture<&str>) {
    let Err(errs) = parse_module(fixture.content()) else {
        panic!("expected parse_module to fail with errors");
    };
    let path = Path::new(fixture.path())
        .file_name()
        .unwrap()
        .to_string_lossy();

    let expected: Vec<_> = fixture
        .content()
        .lines()
        .filter_map(|line| line.strip_prefix("// error: "))
        .collect();
    let messages: Vec<_> = errs.iter().map(|err| err.message()).collect();
    assert_eq!(messages, expected);

    for err in &errs {
        let rendered = err.print_to_string(&path, fixture.content(), false);
        assert!(rendered.contains("error: parse error"), "{rendered}");
        assert!(rendered.contains(path.as_ref()), "{rendered}");
        assert!(rendered.contains(&err.message()), "{rendered}");
    }
}
