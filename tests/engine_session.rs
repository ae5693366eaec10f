//! End-to-end orchestration against the bundled engine and a real home
//! directory on disk.

use lookout::directives::{DirectiveSet, OptionAssignment};
use lookout::engine::{Engine, ModuleRun, ModuleRunner};
use lookout::orchestrator::{LaunchProfile, Orchestrator, EXIT_FAILURE, EXIT_OK};
use lookout::render::Renderer;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

struct TempHome {
    path: PathBuf,
}

impl TempHome {
    fn new() -> Self {
        let suffix = DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "lookout-e2e-{}-{suffix}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("failed to create temp home");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dirs");
        }
        fs::write(&path, content).expect("failed to write fixture");
        path
    }
}

impl Drop for TempHome {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

#[derive(Default)]
struct RecordingRunner {
    runs: RefCell<Vec<BTreeMap<String, String>>>,
}

impl ModuleRunner for RecordingRunner {
    fn run(&self, run: &ModuleRun<'_>) -> Result<(), String> {
        self.runs.borrow_mut().push(run.options.clone());
        Ok(())
    }
}

/// Offline directives: stealth keeps startup from reaching the network.
fn offline_directives() -> DirectiveSet {
    DirectiveSet {
        stealth: true,
        ..DirectiveSet::default()
    }
}

const MODULE_MANIFEST: &str = r#"
path = "recon/domains-hosts/resolve"
author = "tester"
version = "1.0"
description = "resolve hostnames"

[[options]]
name = "SOURCE"
required = true
description = "input source"
"#;

#[test]
fn scripted_session_builds_workspace_and_runs_module() {
    let home = TempHome::new();
    home.write("modules/resolve.toml", MODULE_MANIFEST);
    let script = home.write("batch.txt", "# configure\nset THREADS 3\n\nworkspaces list\n");

    let runner = Rc::new(RecordingRunner::default());
    let mut engine = Engine::with_home(home.path());
    engine.register_runner("recon/domains-hosts/resolve", Rc::clone(&runner) as Rc<dyn ModuleRunner>);

    let renderer = Renderer::new(false);
    let directives = DirectiveSet {
        workspace: Some("acme".to_string()),
        script_file: Some(script),
        global_options: vec![OptionAssignment {
            name: "TIMEOUT".to_string(),
            value: "30".to_string(),
        }],
        module: Some("recon/domains-hosts/resolve".to_string()),
        module_commands: vec!["set SOURCE example.com".to_string()],
        run_module: true,
        ..offline_directives()
    };

    let outcome = Orchestrator::new(&engine, &renderer, LaunchProfile::Cli)
        .with_history_path(engine.history_path())
        .run(&directives);

    assert_eq!(outcome.exit_code, EXIT_OK);
    assert!(!outcome.interactive);
    assert!(home.path().join("workspaces/acme").is_dir());

    // Script + explicit global options landed in the workspace file.
    let saved = fs::read_to_string(home.path().join("workspaces/acme/options.toml"))
        .expect("options should persist");
    assert!(saved.contains("THREADS"), "saved: {saved}");
    assert!(saved.contains("TIMEOUT"), "saved: {saved}");

    let runs = runner.runs.borrow();
    assert_eq!(runs.len(), 1, "module should run exactly once");
    assert_eq!(runs[0].get("SOURCE").map(String::as_str), Some("example.com"));
}

#[test]
fn unknown_module_fails_the_run() {
    let home = TempHome::new();
    let engine = Engine::with_home(home.path());
    let renderer = Renderer::new(false);
    let directives = DirectiveSet {
        module: Some("recon/ghost".to_string()),
        run_module: true,
        ..offline_directives()
    };
    let outcome = Orchestrator::new(&engine, &renderer, LaunchProfile::Cli).run(&directives);
    assert_eq!(outcome.exit_code, EXIT_FAILURE);
}

#[test]
fn console_profile_initializes_workspace_from_script_session() {
    let home = TempHome::new();
    let script = home.write("setup.txt", "set NAMESERVER 1.1.1.1\n");
    let engine = Engine::with_home(home.path());
    let renderer = Renderer::new(false);
    let directives = DirectiveSet {
        workspace: Some("client".to_string()),
        script_file: Some(script),
        ..offline_directives()
    };
    let outcome =
        Orchestrator::new(&engine, &renderer, LaunchProfile::Console).run(&directives);
    assert_eq!(outcome.exit_code, EXIT_OK);
    assert!(outcome.interactive, "console sessions hand off to the loop");
    let saved = fs::read_to_string(home.path().join("workspaces/client/options.toml"))
        .expect("options should persist");
    assert!(saved.contains("1.1.1.1"), "saved: {saved}");
}

#[test]
fn script_failure_leaves_earlier_side_effects_in_place() {
    let home = TempHome::new();
    let script = home.write("bad.txt", "set THREADS 9\nfrobnicate\nset THREADS 1\n");
    let engine = Engine::with_home(home.path());
    let renderer = Renderer::new(false);
    let directives = DirectiveSet {
        script_file: Some(script),
        ..offline_directives()
    };
    let outcome = Orchestrator::new(&engine, &renderer, LaunchProfile::Cli).run(&directives);
    assert_eq!(outcome.exit_code, EXIT_FAILURE);
    let saved = fs::read_to_string(home.path().join("workspaces/default/options.toml"))
        .expect("options should persist");
    assert!(saved.contains("9"), "first set persists: {saved}");
    assert!(!saved.contains("THREADS = \"1\""), "third line never ran: {saved}");
}
