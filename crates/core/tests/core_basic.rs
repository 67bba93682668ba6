use testgen_core::syntax::{parse_source, print_file};
use testgen_core::version;

#[test]
fn version_is_non_empty() {
    let v = version();
    assert!(!v.is_empty());
}

#[test]
fn printed_file_parses_back_to_the_same_tree() {
    let src = "package shop\n\nimport (\n\t\"context\"\n\t\"errors\"\n)\n\ntype Store interface {\n\tGet(ctx context.Context, id int) (string, error)\n}\n\nfunc Lookup(s Store, id int) error {\n\tif id < 0 {\n\t\treturn errors.New(\"negative\")\n\t}\n\t_, err := s.Get(context.Background(), id)\n\treturn err\n}\n";
    let file = parse_source(src).expect("parse");
    let printed = print_file(&file);
    let reparsed = parse_source(&printed).expect("printed source parses");
    assert_eq!(reparsed.decls, file.decls);
    assert_eq!(printed, src);
}
