use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use super::*;
use crate::asset::{CollectingReporter, PassthroughMinifier};
use crate::error::LoadError;
use crate::manifest::Entry;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn write_manifest(dir: &Path, name: &str, body: &str) -> PathBuf {
    write(
        dir,
        name,
        &format!(r#"<?xml version="1.0" encoding="UTF-8"?><resources>{body}</resources>"#),
    )
}

/// Private cache and no minification, so outputs are easy to predict.
fn aggregator() -> Aggregator {
    Aggregator::new()
        .with_store(ManifestStore::new())
        .with_minifier(Arc::new(PassthroughMinifier))
        .with_reporter(Arc::new(CollectingReporter::new()))
}

fn load_output(report: &AggregationReport) -> Manifest {
    (*ManifestStore::uncached().load(&report.manifest).unwrap()).clone()
}

fn read_value(out: &Path, entry: &Entry) -> String {
    fs::read_to_string(out.join(&entry.value)).unwrap()
}

#[test]
fn test_css_runs_split_on_media() {
    let skin = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(skin.path(), "a.css", "a{}");
    write(skin.path(), "b.css", "b{}");
    write(skin.path(), "c.css", "c{}");
    let manifest = write_manifest(
        skin.path(),
        "skin.xml",
        r#"<css value="a.css" included="both"/>
           <css value="b.css" included="both"/>
           <css value="c.css" included="both" media="print"/>"#,
    );

    let report = aggregator()
        .aggregate(&AggregationRequest::new(&manifest, out.path()))
        .unwrap();

    assert_eq!(report.css, KindCounts { before: 3, after: 2 });
    assert_eq!(report.bundles.len(), 2);
    assert!(report.warnings.is_empty());
    assert_eq!(report.manifest.file_name().unwrap(), "skin.aggr.xml");
    assert!(report.manifest.starts_with(out.path().canonicalize().unwrap()));

    let aggregated = load_output(&report);
    assert_eq!(aggregated.css.len(), 2);
    assert_eq!(read_value(out.path(), &aggregated.css[0]), "a{}\nb{}");
    assert_eq!(read_value(out.path(), &aggregated.css[1]), "c{}");
    assert_eq!(aggregated.css[0].media, None);
    assert_eq!(aggregated.css[1].media.as_deref(), Some("print"));
    assert!(aggregated.css.iter().all(|e| e.compressed));
}

#[test]
fn test_only_aggregated_scope_is_bundled() {
    let skin = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(skin.path(), "plain.js", "plain()");
    write(skin.path(), "aggr.js", "aggr()");
    let manifest = write_manifest(
        skin.path(),
        "skin.xml",
        r#"<js value="plain.js"/>
           <js value="aggr.js" included="aggregated"/>
           <parameter name="skin.name" value="Default"/>"#,
    );

    let report = aggregator()
        .aggregate(&AggregationRequest::new(&manifest, out.path()))
        .unwrap();
    let aggregated = load_output(&report);

    assert_eq!(report.js, KindCounts { before: 1, after: 1 });
    assert_eq!(read_value(out.path(), &aggregated.js[0]), "aggr()");
    assert_eq!(aggregated.parameter("skin.name"), Some("Default"));
}

#[test]
fn test_imported_entries_resolve_from_importer() {
    let skin = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(skin.path(), "child/x.js", "child()");
    write(skin.path(), "main.js", "main()");
    write_manifest(
        skin.path(),
        "child/skin.xml",
        r#"<js value="x.js" included="both"/>"#,
    );
    let manifest = write_manifest(
        skin.path(),
        "skin.xml",
        r#"<js value="child/skin.xml" import="true"/><js value="main.js" included="both"/>"#,
    );

    let resolved = ManifestStore::new()
        .load_filtered(&manifest, Scope::Aggregated)
        .unwrap();
    let values: Vec<_> = resolved.js.iter().map(|e| e.value.as_str()).collect();
    assert_eq!(values, ["child/x.js", "main.js"]);

    let report = aggregator()
        .aggregate(&AggregationRequest::new(&manifest, out.path()))
        .unwrap();
    let aggregated = load_output(&report);
    // Scripts merge across directories
    assert_eq!(aggregated.js.len(), 1);
    assert_eq!(read_value(out.path(), &aggregated.js[0]), "child()\nmain()");
}

#[test]
fn test_whitespace_only_run_warns() {
    let skin = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(skin.path(), "blank.css", " \n\t\n ");
    write(skin.path(), "print/p.css", "p{}");
    let manifest = write_manifest(
        skin.path(),
        "skin.xml",
        r#"<css value="blank.css" included="both"/><css value="print/p.css" included="both"/>"#,
    );

    let report = aggregator()
        .aggregate(&AggregationRequest::new(&manifest, out.path()))
        .unwrap();

    assert_eq!(report.css, KindCounts { before: 2, after: 1 });
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("blank.css"));

    let aggregated = load_output(&report);
    assert_eq!(aggregated.css.len(), 1);
    assert!(aggregated.css[0].value.starts_with("print/"));
}

#[test]
fn test_same_input_same_names() {
    let skin = TempDir::new().unwrap();
    write(skin.path(), "a.css", "a { color: red }");
    write(skin.path(), "b.js", "b();");
    let manifest = write_manifest(
        skin.path(),
        "skin.xml",
        r#"<css value="a.css" included="both"/><js value="b.js" included="both"/>"#,
    );

    let first_out = TempDir::new().unwrap();
    let second_out = TempDir::new().unwrap();
    let first = aggregator()
        .aggregate(&AggregationRequest::new(&manifest, first_out.path()))
        .unwrap();
    let second = aggregator()
        .aggregate(&AggregationRequest::new(&manifest, second_out.path()))
        .unwrap();

    assert_eq!(load_output(&first), load_output(&second));
    for (a, b) in first.bundles.iter().zip(&second.bundles) {
        assert_eq!(a.file_name(), b.file_name());
        assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap());
    }
}

#[test]
fn test_changed_byte_changes_name() {
    let skin = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let member = write(skin.path(), "a.css", "a{color:red}");
    let manifest = write_manifest(skin.path(), "skin.xml", r#"<css value="a.css" included="both"/>"#);
    let request = AggregationRequest::new(&manifest, out.path());

    let before = load_output(&aggregator().aggregate(&request).unwrap());
    fs::write(&member, "a{color:rad}").unwrap();
    let after = load_output(&aggregator().aggregate(&request).unwrap());

    assert_ne!(before.css[0].value, after.css[0].value);
}

#[test]
fn test_self_import_is_cycle() {
    let skin = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let manifest = write_manifest(skin.path(), "skin.xml", r#"<css value="skin.xml" import="true"/>"#);

    let err = aggregator()
        .aggregate(&AggregationRequest::new(&manifest, out.path()))
        .unwrap_err();
    match err {
        AggregateError::Load(LoadError::Cycle { chain }) => assert_eq!(chain.len(), 2),
        other => panic!("expected cycle, got {other:?}"),
    }
}

#[test]
fn test_transitive_import_is_cycle() {
    let skin = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_manifest(skin.path(), "b.xml", r#"<js value="c/c.xml" import="true"/>"#);
    write_manifest(skin.path(), "c/c.xml", r#"<js value="../a.xml" import="true"/>"#);
    let manifest = write_manifest(skin.path(), "a.xml", r#"<js value="b.xml" import="true"/>"#);

    let err = aggregator()
        .aggregate(&AggregationRequest::new(&manifest, out.path()))
        .unwrap_err();
    match err {
        AggregateError::Load(LoadError::Cycle { chain }) => {
            assert_eq!(chain.len(), 4);
            assert_eq!(chain.first(), chain.last());
        }
        other => panic!("expected cycle, got {other:?}"),
    }
    // Nothing was written
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_output_path_is_file() {
    let skin = TempDir::new().unwrap();
    write(skin.path(), "a.css", "a{}");
    let manifest = write_manifest(skin.path(), "skin.xml", r#"<css value="a.css" included="both"/>"#);
    let blocker = write(skin.path(), "out", "not a directory");

    let err = aggregator()
        .aggregate(&AggregationRequest::new(&manifest, &blocker))
        .unwrap_err();
    assert!(matches!(err, AggregateError::Precondition { .. }), "{err}");
}

#[test]
fn test_output_dir_is_created() {
    let skin = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(skin.path(), "a.css", "a{}");
    let manifest = write_manifest(skin.path(), "skin.xml", r#"<css value="a.css" included="both"/>"#);
    let nested = out.path().join("deep/skins/default");

    let report = aggregator()
        .aggregate(&AggregationRequest::new(&manifest, &nested))
        .unwrap();
    assert!(nested.join("skin.aggr.xml").is_file());
    assert!(report.bundles[0].starts_with(nested.canonicalize().unwrap()));
}

#[test]
fn test_shared_script_dir() {
    let skin = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(skin.path(), "css/a.css", "a{}");
    write(skin.path(), "js/lib/a.js", "a()");
    let manifest = write_manifest(
        skin.path(),
        "skin.xml",
        r#"<css value="css/a.css" included="both"/><js value="js/lib/a.js" included="both"/>"#,
    );
    let shared = out.path().join("shared-js");

    let report = aggregator()
        .aggregate(&AggregationRequest::new(&manifest, out.path()).with_shared_script_dir(&shared))
        .unwrap();
    let aggregated = load_output(&report);

    assert!(aggregated.css[0].value.starts_with("css/"));
    let js = &aggregated.js[0].value;
    assert!(js.starts_with("shared-js/"), "{js}");
    assert_eq!(js.matches('/').count(), 1);
    assert_eq!(read_value(out.path(), &aggregated.js[0]), "a()");
}

#[test]
fn test_extra_source_dirs() {
    let skin = TempDir::new().unwrap();
    let extra = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(extra.path(), "lib/util.js", "util()");
    write(skin.path(), "app.js", "app()");
    let manifest = write_manifest(
        skin.path(),
        "skin.xml",
        r#"<js value="lib/util.js" included="both"/><js value="app.js" included="both"/>"#,
    );

    let missing = aggregator()
        .aggregate(&AggregationRequest::new(&manifest, out.path()))
        .unwrap_err();
    assert!(matches!(missing, AggregateError::ResourceNotFound { .. }), "{missing}");

    let report = aggregator()
        .aggregate(&AggregationRequest::new(&manifest, out.path()).with_source_dir(extra.path()))
        .unwrap();
    let aggregated = load_output(&report);
    assert_eq!(read_value(out.path(), &aggregated.js[0]), "util()\napp()");
}

#[test]
fn test_absolute_and_conditional_entries() {
    let skin = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(skin.path(), "a.js", "a()");
    write(skin.path(), "ie.js", "ie()");
    let manifest = write_manifest(
        skin.path(),
        "skin.xml",
        r#"<js value="https://cdn.example.org/jquery.js" included="both" compressed="true"/>
           <js value="a.js" included="both"/>
           <js value="ie.js" included="both" conditional="lt IE 9"/>"#,
    );

    let report = aggregator()
        .aggregate(&AggregationRequest::new(&manifest, out.path()))
        .unwrap();
    let aggregated = load_output(&report);

    assert_eq!(report.js, KindCounts { before: 3, after: 3 });
    assert_eq!(report.bundles.len(), 2);
    assert_eq!(aggregated.js[0].value, "https://cdn.example.org/jquery.js");
    assert!(!aggregated.js[1].is_conditional());
    assert_eq!(aggregated.js[2].conditional.as_deref(), Some("lt IE 9"));
}

#[test]
fn test_minify_error_aborts() {
    let skin = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(skin.path(), "broken.js", "function (");
    let manifest = write_manifest(skin.path(), "skin.xml", r#"<js value="broken.js" included="both"/>"#);

    let reporter = Arc::new(CollectingReporter::new());
    let err = aggregator()
        .with_minifier(Arc::new(NativeMinifier::default()))
        .with_reporter(reporter.clone())
        .aggregate(&AggregationRequest::new(&manifest, out.path()))
        .unwrap_err();

    assert!(matches!(err, AggregateError::Minify(_)), "{err}");
    assert_eq!(reporter.errors(), 1);
    // No working file and no manifest left behind
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_saved_manifest_round_trips() {
    let skin = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(skin.path(), "a.css", "a{}");
    let manifest = write_manifest(
        skin.path(),
        "skin.xml",
        r#"<css value="a.css" included="both" conditional="IE" media="screen"/>
           <parameter name="p" value="1"/>"#,
    );
    let report = aggregator()
        .aggregate(&AggregationRequest::new(&manifest, out.path()))
        .unwrap();

    let store = ManifestStore::uncached();
    let loaded = load_output(&report);
    let copy = out.path().join("copy.xml");
    store.save(&loaded, &copy).unwrap();
    assert_eq!(*store.load(&copy).unwrap(), loaded);
}

#[test]
fn test_native_minifier_keeps_library_scripts() {
    let skin = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(
        skin.path(),
        "lib.js",
        "function helperFn(x) {\n  return x + 1;\n}\nvar sharedConfig = { debug: true };\n",
    );
    write(skin.path(), "theme.css", "body {\n  color: #ff0000;\n}\n");
    let manifest = write_manifest(
        skin.path(),
        "skin.xml",
        r#"<css value="theme.css" included="both"/><js value="lib.js" included="both"/>"#,
    );

    let reporter = Arc::new(CollectingReporter::new());
    let report = aggregator()
        .with_minifier(Arc::new(NativeMinifier::default()))
        .with_reporter(reporter.clone())
        .aggregate(&AggregationRequest::new(&manifest, out.path()))
        .unwrap();

    assert_eq!(report.js, KindCounts { before: 1, after: 1 });
    assert_eq!(report.css, KindCounts { before: 1, after: 1 });
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(reporter.errors(), 0);

    let aggregated = load_output(&report);
    let script = read_value(out.path(), &aggregated.js[0]);
    assert!(script.contains("function helperFn("), "{script}");
    assert!(script.contains("sharedConfig"), "{script}");
    assert_eq!(read_value(out.path(), &aggregated.css[0]), "body{color:red}");
}

#[test]
fn test_concurrent_aggregations_share_imports() {
    let skin = TempDir::new().unwrap();
    write(skin.path(), "common/base.css", "base{}");
    write(skin.path(), "common/base.js", "base()");
    write_manifest(
        skin.path(),
        "common/skin.xml",
        r#"<css value="base.css" included="both"/><js value="base.js" included="both"/>"#,
    );
    write(skin.path(), "widgets/w.js", "widget()");
    write_manifest(
        skin.path(),
        "widgets.xml",
        r#"<js value="common/skin.xml" import="true"/><js value="widgets/w.js" included="both"/>"#,
    );

    // Each skin reaches common both directly and through widgets
    let manifests: Vec<PathBuf> = (0..6)
        .map(|i| {
            write(skin.path(), &format!("skin{i}.css"), &format!("s{i}{{}}"));
            write_manifest(
                skin.path(),
                &format!("skin{i}.xml"),
                &format!(
                    r#"<css value="common/skin.xml" import="true"/>
                       <css value="skin{i}.css" included="both"/>
                       <js value="common/skin.xml" import="true"/>
                       <js value="widgets.xml" import="true"/>"#
                ),
            )
        })
        .collect();

    let sequential: Vec<Manifest> = manifests
        .iter()
        .map(|manifest| {
            let out = TempDir::new().unwrap();
            load_output(
                &aggregator()
                    .aggregate(&AggregationRequest::new(manifest, out.path()))
                    .unwrap(),
            )
        })
        .collect();

    let shared = aggregator();
    let outs: Vec<TempDir> = manifests.iter().map(|_| TempDir::new().unwrap()).collect();
    let concurrent: Vec<Result<AggregationReport, AggregateError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = manifests
            .iter()
            .zip(&outs)
            .map(|(manifest, out)| {
                let shared = &shared;
                scope.spawn(move || shared.aggregate(&AggregationRequest::new(manifest, out.path())))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (result, expected) in concurrent.iter().zip(&sequential) {
        let report = match result {
            Ok(report) => report,
            Err(AggregateError::Load(LoadError::Cycle { chain })) => {
                panic!("spurious cycle: {chain:?}")
            }
            Err(err) => panic!("{err}"),
        };
        assert_eq!(&load_output(report), expected);
    }
}
