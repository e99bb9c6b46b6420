//! Loading behavior: idempotence, canonical paths, analysis levels, and
//! Fatal handling for files that cannot be built.

mod helpers;

use helpers::{engine, write_file};
use megamodel::build::{AnalysisLevel, ElementRef, SourceState};
use megamodel::issues::{codes, IssueLevel, LevelFilter};

#[test]
fn test_idempotent_load_returns_same_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "demo.cls", "class model Demo\nclass Person\n");

    let mut megamodel = engine();
    let first = megamodel.load_file(&path, None).unwrap();
    let issues_after_first = megamodel.issues().all(megamodel.source(first).issue_box).len();

    let second = megamodel.load_file(&path, None).unwrap();
    assert_eq!(first, second);

    // The second call compiled nothing, so no new issues appeared.
    let issues_after_second = megamodel.issues().all(megamodel.source(first).issue_box).len();
    assert_eq!(issues_after_first, issues_after_second);
}

#[test]
fn test_canonical_path_identity() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "a/x.cls", "class model X\n");

    let mut megamodel = engine();
    let plain = dir.path().join("a/x.cls");
    let dotted = dir.path().join("./a/../a/x.cls");
    let first = megamodel.load_file(&plain, None).unwrap();
    let second = megamodel.load_file(&dotted, None).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_full_pipeline_fills_and_resolves() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "demo.cls",
        "class model Demo (system)\nclass Person\nclass Employee extends Person\n",
    );

    let mut megamodel = engine();
    let id = megamodel.load_file(&path, None).unwrap();
    assert_eq!(megamodel.source_state(id), SourceState::Built);

    let progress = megamodel.progress(id);
    assert!(progress.parsed);
    assert!(progress.dependencies_discovered);
    assert!(progress.filled);
    assert!(progress.resolved);
    assert!(progress.finalized);

    let model = megamodel.model(megamodel.source(id).model.unwrap());
    assert_eq!(model.name, "Demo");
    assert_eq!(model.kinds, vec!["system"]);
    assert_eq!(model.elements.len(), 2);
    assert_eq!(
        model.element("Employee").unwrap().references,
        vec![ElementRef::Resolved(0)]
    );
    assert!(model.is_fully_resolved());
    assert!(megamodel.is_source_valid(id));
}

#[test]
fn test_syntax_error_yields_one_localized_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "bad.cls",
        "class model Bad\nclass Ok\n??? what is this\n",
    );

    let mut megamodel = engine();
    // A Fatal mid-pipeline still yields a usable partial file.
    let id = megamodel.load_file(&path, None).unwrap();

    let issues = megamodel.issues().all(megamodel.source(id).issue_box);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].level, IssueLevel::Fatal);
    assert_eq!(issues[0].code, codes::SYNTAX_ERROR);
    assert_eq!(issues[0].position.line, 3);

    // Nothing past phase 1 ran; fields beyond it stay at their defaults.
    let progress = megamodel.progress(id);
    assert!(!progress.parsed);
    assert!(!progress.filled);
    assert!(megamodel.source(id).ast.is_none());
    assert!(megamodel.source(id).import_box.is_empty());
    assert!(!megamodel.is_source_valid(id));
}

#[test]
fn test_fatal_line_clamped_into_file() {
    let dir = tempfile::tempdir().unwrap();
    // The parser reports the import on line 2; make the import target fail
    // and check the Fatal lands inside the file's line range.
    let path = write_file(
        dir.path(),
        "m.cls",
        "class model M\nimport gl model from \"missing.gls\"\n",
    );

    let mut megamodel = engine();
    let id = megamodel.load_file(&path, None).unwrap();
    let issues = megamodel.issues().select(
        megamodel.source(id).issue_box,
        IssueLevel::Fatal,
        LevelFilter::Exactly,
    );
    assert!(!issues.is_empty());
    let unresolved: Vec<_> = issues
        .iter()
        .filter(|issue| issue.code == codes::UNRESOLVED_IMPORT)
        .collect();
    assert_eq!(unresolved.len(), 1);
    assert_eq!(unresolved[0].position.line, 2);
}

#[test]
fn test_missing_file_returns_none_with_fatal_in_sink() {
    let dir = tempfile::tempdir().unwrap();
    let mut megamodel = engine();
    let sink = megamodel.new_issue_box("cli");

    let result = megamodel.load_file(&dir.path().join("ghost.cls"), Some(sink));
    assert!(result.is_none());

    let fatals = megamodel
        .issues()
        .select(sink, IssueLevel::Fatal, LevelFilter::AtLeast);
    assert_eq!(fatals.len(), 1);
    assert_eq!(fatals[0].code, codes::FILE_NOT_FOUND);
}

#[test]
fn test_missing_file_reload_does_not_duplicate_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut megamodel = engine();
    let sink = megamodel.new_issue_box("cli");

    assert!(megamodel.load_file(&dir.path().join("ghost.cls"), Some(sink)).is_none());
    assert!(megamodel.load_file(&dir.path().join("ghost.cls"), Some(sink)).is_none());

    let fatals = megamodel
        .issues()
        .select(sink, IssueLevel::Fatal, LevelFilter::AtLeast);
    assert_eq!(fatals.len(), 1);
}

#[test]
fn test_unknown_extension_returns_none() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "notes.txt", "whatever\n");

    let mut megamodel = engine();
    let sink = megamodel.new_issue_box("cli");
    assert!(megamodel.load_file(&path, Some(sink)).is_none());

    let fatals = megamodel
        .issues()
        .select(sink, IssueLevel::Fatal, LevelFilter::AtLeast);
    assert_eq!(fatals.len(), 1);
    assert_eq!(fatals[0].code, codes::UNKNOWN_EXTENSION);
}

#[test]
fn test_unknown_extension_without_sink_goes_to_global_box() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "notes.txt", "whatever\n");

    let mut megamodel = engine();
    assert!(megamodel.load_file(&path, None).is_none());
    let fatals = megamodel.issues().select(
        megamodel.global_box(),
        IssueLevel::Fatal,
        LevelFilter::AtLeast,
    );
    assert_eq!(fatals.len(), 1);
}

#[test]
fn test_just_ast_level_skips_dependency_discovery() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "g.gls", "glossary model G\n");
    let path = write_file(
        dir.path(),
        "m.cls",
        "class model M\nimport gl model from \"g.gls\"\n",
    );

    let mut megamodel = engine();
    megamodel.set_analysis_level(AnalysisLevel::JustAst);
    let id = megamodel.load_file(&path, None).unwrap();

    assert!(megamodel.progress(id).parsed);
    assert!(!megamodel.progress(id).dependencies_discovered);
    assert!(megamodel.source_id(&dir.path().join("g.gls")).is_none());
    assert!(megamodel.source(id).import_box.is_empty());
}

#[test]
fn test_just_ast_dep_level_loads_imports_but_skips_semantics() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "g.gls", "glossary model G\nentry speed : \"how fast\"\n");
    let path = write_file(
        dir.path(),
        "m.cls",
        "class model M\nimport gl model from \"g.gls\"\nclass Car\n",
    );

    let mut megamodel = engine();
    megamodel.set_analysis_level(AnalysisLevel::JustAstDep);
    let id = megamodel.load_file(&path, None).unwrap();

    assert!(megamodel.progress(id).dependencies_discovered);
    assert!(!megamodel.progress(id).filled);
    let imported = megamodel.source_id(&dir.path().join("g.gls")).unwrap();
    assert_eq!(megamodel.source_state(imported), SourceState::Built);
    // Models exist but stay empty below Full.
    let model = megamodel.model(megamodel.source(id).model.unwrap());
    assert!(model.elements.is_empty());
    // The file-level edge implies the model-level edge even below Full.
    assert_eq!(
        megamodel.dependency_graph().model_dependencies(None, None).len(),
        1
    );
}

#[test]
fn test_unresolved_superclass_is_error_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "demo.cls",
        "class model Demo\nclass Employee extends Missing\n",
    );

    let mut megamodel = engine();
    let id = megamodel.load_file(&path, None).unwrap();

    let errors = megamodel.issues().big_issues(megamodel.source(id).issue_box);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, codes::UNRESOLVED_SYMBOL);
    assert_eq!(errors[0].position.line, 2);
    // Advisory only: the file is still valid and fully built.
    assert!(megamodel.is_source_valid(id));
    assert!(megamodel.progress(id).finalized);
}

#[test]
fn test_declared_name_reaches_import_box_and_model() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "x.cls", "class model Inventory (design)\n");

    let mut megamodel = engine();
    let id = megamodel.load_file(&path, None).unwrap();
    let file = megamodel.source(id);
    assert_eq!(file.import_box.name.as_deref(), Some("Inventory"));
    assert_eq!(file.import_box.kinds, vec!["design"]);
    let model = megamodel.model(file.model.unwrap());
    assert_eq!(model.name, "Inventory");
    assert_eq!(model.source, Some(id));
}
