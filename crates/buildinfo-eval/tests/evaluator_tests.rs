//! Integration tests for multi-target evaluation
//!
//! Drives the evaluator through a scripted gateway and checks the records it
//! produces for single-target, multi-target and broken projects.

mod common;

use buildinfo_eval::{
    link_designer_files, Evaluation, ProjectEvaluator, ProjectReference, ResolveWarning,
};
use common::{fixture_path, path_str, sdk_project, FakeGateway, ProjectScript};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn reference(name: &str, relative: &str) -> ProjectReference {
    ProjectReference::new(name, fixture_path(relative))
}

#[test]
fn test_single_target_project_produces_one_record() {
    let app = fixture_path("App/App.csproj");
    let gateway = FakeGateway::new().project(&app, ProjectScript::new(sdk_project("App", "App", "net8.0")));
    let evaluator = ProjectEvaluator::new(gateway);

    let projects = evaluator.evaluate(&reference("App", "App/App.csproj"));

    assert_eq!(projects.len(), 1);
    let project = &projects[0];
    assert_eq!(project.name, "App");
    assert_eq!(project.path, app);
    assert_eq!(project.target_framework, "net8.0");
    assert_eq!(project.output_type, "WinExe");
    assert_eq!(
        project.target_path,
        fixture_path("App/bin/Debug/net8.0/App.dll")
    );
    assert_eq!(
        project.deps_file_path,
        fixture_path("App/bin/Debug/net8.0/App.deps.json")
    );
    assert_eq!(
        project.runtime_config_file_path,
        fixture_path("App/bin/Debug/net8.0/App.runtimeconfig.json")
    );
    assert!(project.target_frameworks.is_empty());
    assert!(project.warnings().is_empty());
    // Only the baseline evaluation ran
    assert_eq!(evaluator.gateway().calls().len(), 1);
}

#[test]
fn test_scenario_a_intermediate_path() {
    let app = fixture_path("App/App.csproj");
    let gateway = FakeGateway::new().project(&app, ProjectScript::new(sdk_project("App", "App", "net8.0")));

    let projects = ProjectEvaluator::new(gateway).evaluate(&reference("App", "App/App.csproj"));

    assert_eq!(
        projects[0].intermediate_output_path,
        fixture_path("App/obj/Debug/net8.0/Avalonia/references")
    );
}

#[test]
fn test_scenario_b_multi_target_evaluated_per_framework() {
    let lib = fixture_path("Lib/Lib.csproj");
    let baseline = Evaluation::new()
        .with_property("TargetFrameworks", "net8.0;net9.0")
        .with_property("IntermediateOutputPath", "obj\\Debug\\");
    let script = ProjectScript::new(baseline)
        .framework("net8.0", sdk_project("Lib", "Lib", "net8.0").with_property("OutputType", "Library"))
        .framework("net9.0", sdk_project("Lib", "Lib", "net9.0").with_property("OutputType", "Exe"));
    let evaluator = ProjectEvaluator::new(FakeGateway::new().project(&lib, script));

    let projects = evaluator.evaluate(&reference("Lib", "Lib/Lib.csproj"));

    let frameworks: Vec<&str> = projects.iter().map(|p| p.target_framework.as_str()).collect();
    assert_eq!(frameworks, vec!["net8.0", "net9.0"]);

    // Properties come from each framework's own evaluation
    assert_eq!(projects[0].output_type, "Library");
    assert_eq!(projects[1].output_type, "Exe");
    assert_eq!(
        projects[1].target_path,
        fixture_path("Lib/bin/Debug/net9.0/Lib.dll")
    );
    assert_eq!(
        projects[1].intermediate_output_path,
        fixture_path("Lib/obj/Debug/net9.0/Avalonia/references")
    );
    for project in &projects {
        assert_eq!(project.target_frameworks, vec!["net8.0", "net9.0"]);
    }

    // Baseline plus one forced evaluation per framework
    let calls = evaluator.gateway().calls_for(&lib);
    assert_eq!(calls.len(), 3);
    let mut forced: Vec<String> = calls
        .iter()
        .filter_map(|o| o.get("TargetFramework").cloned())
        .collect();
    forced.sort();
    assert_eq!(forced, vec!["net8.0", "net9.0"]);
}

#[test]
fn test_n_declared_frameworks_give_n_distinct_records() {
    let multi = fixture_path("Multi/Multi.csproj");
    let tfms = ["net6.0", "net7.0", "net8.0", "net9.0", "net8.0-windows"];
    let mut script = ProjectScript::new(
        Evaluation::new().with_property("TargetFrameworks", tfms.join(";")),
    );
    for tfm in tfms {
        script = script.framework(tfm, sdk_project("Multi", "Multi", tfm));
    }
    let evaluator = ProjectEvaluator::new(FakeGateway::new().project(&multi, script)).with_jobs(2);

    let projects = evaluator.evaluate(&reference("Multi", "Multi/Multi.csproj"));

    assert_eq!(projects.len(), tfms.len());
    let mut seen: Vec<&str> = projects.iter().map(|p| p.target_framework.as_str()).collect();
    seen.dedup();
    assert_eq!(seen.len(), tfms.len());
}

#[test]
fn test_single_declared_framework_still_forced() {
    let app = fixture_path("App/App.csproj");
    let script = ProjectScript::new(Evaluation::new().with_property("TargetFrameworks", "net8.0"))
        .framework("net8.0", sdk_project("App", "App", "net8.0"));
    let evaluator = ProjectEvaluator::new(FakeGateway::new().project(&app, script));

    let projects = evaluator.evaluate(&reference("App", "App/App.csproj"));

    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].target_framework, "net8.0");
    assert_eq!(evaluator.gateway().calls_for(&app).len(), 2);
}

#[test]
fn test_scenario_c_no_framework_degrades() {
    let legacy = fixture_path("Legacy/Legacy.csproj");
    let evaluation = Evaluation::new().with_property("OutputType", "Library");
    let evaluator = ProjectEvaluator::new(FakeGateway::new().project(&legacy, ProjectScript::new(evaluation)));

    let projects = evaluator.evaluate(&reference("Legacy", "Legacy/Legacy.csproj"));

    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].target_framework, "");
    assert_eq!(
        projects[0].intermediate_output_path,
        fixture_path("Legacy/obj/Avalonia/references")
    );
    assert_eq!(projects[0].target_path, PathBuf::new());
    assert_eq!(
        projects[0].warnings(),
        &[ResolveWarning::MissingTargetFramework]
    );
}

#[test]
fn test_failing_project_does_not_stop_siblings() {
    let app = fixture_path("App/App.csproj");
    let broken = fixture_path("Broken/Broken.csproj");
    let lib = fixture_path("Lib/Lib.csproj");
    let gateway = FakeGateway::new()
        .project(&app, ProjectScript::new(sdk_project("App", "App", "net8.0")))
        .project(&broken, ProjectScript::failing("MSB4025: The project file could not be loaded"))
        .project(&lib, ProjectScript::new(sdk_project("Lib", "Lib", "net8.0")));

    let projects = ProjectEvaluator::new(gateway)
        .evaluate_all(&[
            reference("App", "App/App.csproj"),
            reference("Broken", "Broken/Broken.csproj"),
            reference("Lib", "Lib/Lib.csproj"),
        ])
        .unwrap();

    let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["App", "Lib"]);
}

#[test]
fn test_failing_framework_does_not_stop_other_frameworks() {
    let lib = fixture_path("Lib/Lib.csproj");
    let script = ProjectScript::new(Evaluation::new().with_property("TargetFrameworks", "net8.0;net9.0;net10.0"))
        .framework("net8.0", sdk_project("Lib", "Lib", "net8.0"))
        .failing_framework("net9.0", "NETSDK1045: The current .NET SDK does not support targeting .NET 9.0")
        .framework("net10.0", sdk_project("Lib", "Lib", "net10.0"));

    let projects = ProjectEvaluator::new(FakeGateway::new().project(&lib, script))
        .evaluate(&reference("Lib", "Lib/Lib.csproj"));

    let frameworks: Vec<&str> = projects.iter().map(|p| p.target_framework.as_str()).collect();
    assert_eq!(frameworks, vec!["net8.0", "net10.0"]);
}

#[test]
fn test_evaluate_all_keeps_collector_order() {
    let names = ["A", "B", "C", "D", "E", "F", "G", "H"];
    let mut gateway = FakeGateway::new();
    for name in names {
        gateway = gateway.project(
            fixture_path(&format!("{0}/{0}.csproj", name)),
            ProjectScript::new(sdk_project(name, name, "net8.0")),
        );
    }
    let references: Vec<_> = names
        .iter()
        .map(|n| reference(n, &format!("{0}/{0}.csproj", n)))
        .collect();

    let projects = ProjectEvaluator::new(gateway)
        .with_jobs(4)
        .evaluate_all(&references)
        .unwrap();

    let got: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(got, names.to_vec());
}

#[test]
fn test_project_references_resolved_against_project_dir() {
    let app = fixture_path("src/App/App.csproj");
    let evaluation = sdk_project("src/App", "App", "net8.0")
        .with_item("ProjectReference", "..\\Lib\\Lib.csproj")
        .with_item("ProjectReference", "../Core/Core.fsproj");
    let gateway = FakeGateway::new().project(&app, ProjectScript::new(evaluation));

    let projects = ProjectEvaluator::new(gateway).evaluate(&reference("App", "src/App/App.csproj"));

    assert_eq!(
        projects[0].project_references,
        vec![
            fixture_path("src/Lib/Lib.csproj"),
            fixture_path("src/Core/Core.fsproj"),
        ]
    );
}

#[test]
fn test_designer_host_path_resolution() {
    let app = fixture_path("App/App.csproj");
    let tool = fixture_path("tools/Avalonia.Designer.HostApp.dll");
    let with_tool = sdk_project("App", "App", "net8.0")
        .with_property("AvaloniaPreviewerNetCoreToolPath", path_str(&tool));
    let lib = fixture_path("Lib/Lib.csproj");
    let relative_tool = sdk_project("Lib", "Lib", "net8.0")
        .with_property("AvaloniaPreviewerNetCoreToolPath", "tools/host.dll");
    let gateway = FakeGateway::new()
        .project(&app, ProjectScript::new(with_tool))
        .project(&lib, ProjectScript::new(relative_tool));
    let evaluator = ProjectEvaluator::new(gateway).with_working_dir(fixture_path("work"));

    let app_projects = evaluator.evaluate(&reference("App", "App/App.csproj"));
    assert_eq!(app_projects[0].designer_host_path, Some(tool));

    // Relative tool paths resolve against the working directory, not the project
    let lib_projects = evaluator.evaluate(&reference("Lib", "Lib/Lib.csproj"));
    assert_eq!(
        lib_projects[0].designer_host_path,
        Some(fixture_path("work/tools/host.dll"))
    );
}

#[test]
fn test_empty_designer_host_path_is_absent() {
    let app = fixture_path("App/App.csproj");
    let evaluation = sdk_project("App", "App", "net8.0")
        .with_property("AvaloniaPreviewerNetCoreToolPath", "");
    let gateway = FakeGateway::new().project(&app, ProjectScript::new(evaluation));

    let projects = ProjectEvaluator::new(gateway).evaluate(&reference("App", "App/App.csproj"));
    assert_eq!(projects[0].designer_host_path, None);
}

#[test]
fn test_global_properties_reach_every_evaluation() {
    let lib = fixture_path("Lib/Lib.csproj");
    let script = ProjectScript::new(Evaluation::new().with_property("TargetFrameworks", "net8.0;net9.0"))
        .framework("net8.0", sdk_project("Lib", "Lib", "net8.0"))
        .framework("net9.0", sdk_project("Lib", "Lib", "net9.0"));
    let evaluator = ProjectEvaluator::new(FakeGateway::new().project(&lib, script))
        .with_global_property("Configuration", "Release");

    evaluator.evaluate(&reference("Lib", "Lib/Lib.csproj"));

    let calls = evaluator.gateway().calls_for(&lib);
    assert_eq!(calls.len(), 3);
    assert!(calls
        .iter()
        .all(|o| o.get("Configuration").map(String::as_str) == Some("Release")));
}

#[test]
fn test_designer_files_follow_project_order_without_dedup() {
    let app = fixture_path("App/App.csproj");
    let lib = fixture_path("Lib/Lib.csproj");
    let shared = "../Shared/Theme.axaml";
    let gateway = FakeGateway::new()
        .project(
            &app,
            ProjectScript::new(
                sdk_project("App", "App", "net8.0")
                    .with_item("AvaloniaXaml", "App.axaml")
                    .with_item("AvaloniaXaml", shared),
            ),
        )
        .project(
            &lib,
            ProjectScript::new(sdk_project("Lib", "Lib", "net8.0").with_item("AvaloniaXaml", shared)),
        );

    let projects = ProjectEvaluator::new(gateway)
        .evaluate_all(&[
            reference("App", "App/App.csproj"),
            reference("Lib", "Lib/Lib.csproj"),
        ])
        .unwrap();
    let files = link_designer_files(&projects, "AvaloniaXaml");

    let paths: Vec<PathBuf> = files.iter().map(|f| f.path.clone()).collect();
    assert_eq!(
        paths,
        vec![
            fixture_path("App/App.axaml"),
            fixture_path("Shared/Theme.axaml"),
            fixture_path("Shared/Theme.axaml"),
        ]
    );
    assert_eq!(files[1].project_path, app);
    assert_eq!(files[2].project_path, lib);
    assert_eq!(files[2].target_path, fixture_path("Lib/bin/Debug/net8.0/Lib.dll"));
}

#[test]
fn test_multi_target_designer_files_per_record() {
    let lib = fixture_path("Lib/Lib.csproj");
    let script = ProjectScript::new(Evaluation::new().with_property("TargetFrameworks", "net8.0;net9.0"))
        .framework(
            "net8.0",
            sdk_project("Lib", "Lib", "net8.0").with_item("AvaloniaXaml", "View.axaml"),
        )
        .framework(
            "net9.0",
            sdk_project("Lib", "Lib", "net9.0").with_item("AvaloniaXaml", "View.axaml"),
        );

    let projects = ProjectEvaluator::new(FakeGateway::new().project(&lib, script))
        .evaluate(&reference("Lib", "Lib/Lib.csproj"));
    let files = link_designer_files(&projects, "AvaloniaXaml");

    assert_eq!(files.len(), 2);
    assert_eq!(files[0].target_path, fixture_path("Lib/bin/Debug/net8.0/Lib.dll"));
    assert_eq!(files[1].target_path, fixture_path("Lib/bin/Debug/net9.0/Lib.dll"));
}
