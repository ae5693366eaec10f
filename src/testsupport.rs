//! Shared test fixtures: a std-only temp-dir helper and recording fakes for
//! the console capability surface.
//!
//! The fakes record every call in order so orchestration tests can assert
//! sequencing and early-exit behavior without a real console.

use crate::context::{ConsoleContext, Framework, FrameworkInfo, ModuleContext, SessionMode};
use crate::error::ContextError;
use crate::flags::ReconciledFlags;
use crate::render::RenderSink;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static TEST_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Temporary directory fixture with best-effort cleanup.
#[derive(Debug)]
pub struct TestTempDir {
    path: PathBuf,
}

impl TestTempDir {
    /// Create a unique temporary directory with a readable prefix.
    pub fn new(prefix: &str) -> Self {
        let suffix = TEST_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let dir = std::env::temp_dir().join(format!("lookout-{prefix}-{millis}-{suffix}"));
        fs::create_dir_all(&dir).expect("failed to create temporary fixture directory");
        Self { path: dir }
    }

    /// Root directory path for this fixture.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Build a child path under the fixture root.
    pub fn child(&self, relative: &str) -> PathBuf {
        self.path.join(relative)
    }

    /// Write UTF-8 text to a child path, creating parent directories.
    pub fn write_text(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.child(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent directories for fixture");
        }
        fs::write(&path, content).expect("failed to write fixture file");
        path
    }
}

impl Drop for TestTempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

// ---------------------------------------------------------------------------
// Recording renderer
// ---------------------------------------------------------------------------

/// Output kinds captured by [`RecordingRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputKind {
    Status,
    Warn,
    Error,
    Hint,
}

/// `RenderSink` that records everything said instead of printing.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    lines: RefCell<Vec<(OutputKind, String)>>,
}

impl RecordingRenderer {
    fn record(&self, kind: OutputKind, msg: &str) {
        self.lines.borrow_mut().push((kind, msg.to_string()));
    }

    fn collect(&self, kind: OutputKind) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.collect(OutputKind::Status)
    }

    pub fn warnings(&self) -> Vec<String> {
        self.collect(OutputKind::Warn)
    }

    pub fn errors(&self) -> Vec<String> {
        self.collect(OutputKind::Error)
    }

    pub fn hints(&self) -> Vec<String> {
        self.collect(OutputKind::Hint)
    }
}

impl RenderSink for RecordingRenderer {
    fn status(&self, msg: &str) {
        self.record(OutputKind::Status, msg);
    }

    fn warn(&self, msg: &str) {
        self.record(OutputKind::Warn, msg);
    }

    fn error(&self, msg: &str) {
        self.record(OutputKind::Error, msg);
    }

    fn hint(&self, msg: &str) {
        self.record(OutputKind::Hint, msg);
    }
}

// ---------------------------------------------------------------------------
// Fake console framework
// ---------------------------------------------------------------------------

/// One recorded call against the fake console or a fake module context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCall {
    Start {
        mode: SessionMode,
        workspace: Option<String>,
    },
    InitWorkspace(String),
    Execute(String),
    ListOptions,
    SetOption(String),
    SearchModules(String),
    LoadModule(String),
    ModuleExecute { module: String, command: String },
    ModuleListOptions { module: String },
    ModuleSetOption { module: String, spec: String },
    ModuleRun { module: String },
}

/// How the fake console answers `load_module`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadBehavior {
    Succeed,
    Fail,
}

#[derive(Debug, Clone)]
struct FakeBehavior {
    load: LoadBehavior,
    /// Command that triggers the paired error from `execute`.
    execute_trap: Option<(String, ContextError)>,
}

/// `Framework` fake producing recording consoles.
pub struct FakeFramework {
    probe: Result<FrameworkInfo, String>,
    construct_fails: bool,
    behavior: FakeBehavior,
    calls: Rc<RefCell<Vec<ConsoleCall>>>,
    constructed_flags: RefCell<Option<ReconciledFlags>>,
}

impl FakeFramework {
    /// A reachable framework at the minimum supported version.
    pub fn healthy() -> Self {
        Self {
            probe: Ok(FrameworkInfo {
                version: "1.0".to_string(),
                requires_elevated: false,
            }),
            construct_fails: false,
            behavior: FakeBehavior {
                load: LoadBehavior::Succeed,
                execute_trap: None,
            },
            calls: Rc::new(RefCell::new(Vec::new())),
            constructed_flags: RefCell::new(None),
        }
    }

    /// A framework whose probe fails with the given detail.
    pub fn unreachable(detail: &str) -> Self {
        let mut framework = Self::healthy();
        framework.probe = Err(detail.to_string());
        framework
    }

    /// Make `construct` fail.
    pub fn fail_construct(mut self) -> Self {
        self.construct_fails = true;
        self
    }

    /// Choose how `load_module` behaves.
    pub fn with_load(mut self, load: LoadBehavior) -> Self {
        self.behavior.load = load;
        self
    }

    /// Make `execute` return `error` when invoked with `command`.
    pub fn fail_execute_on(mut self, command: &str, error: ContextError) -> Self {
        self.behavior.execute_trap = Some((command.to_string(), error));
        self
    }

    /// All calls recorded so far, in order.
    pub fn calls(&self) -> Vec<ConsoleCall> {
        self.calls.borrow().clone()
    }

    /// Flags the console was constructed with, if construction happened.
    pub fn constructed_flags(&self) -> Option<ReconciledFlags> {
        *self.constructed_flags.borrow()
    }
}

impl Framework for FakeFramework {
    fn probe(&self) -> Result<FrameworkInfo, ContextError> {
        self.probe
            .clone()
            .map_err(ContextError::failed)
    }

    fn construct(&self, flags: ReconciledFlags) -> Result<Box<dyn ConsoleContext>, ContextError> {
        if self.construct_fails {
            return Err(ContextError::failed("construction refused by test"));
        }
        *self.constructed_flags.borrow_mut() = Some(flags);
        Ok(Box::new(FakeConsole {
            behavior: self.behavior.clone(),
            calls: Rc::clone(&self.calls),
        }))
    }
}

struct FakeConsole {
    behavior: FakeBehavior,
    calls: Rc<RefCell<Vec<ConsoleCall>>>,
}

impl FakeConsole {
    fn push(&self, call: ConsoleCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl ConsoleContext for FakeConsole {
    fn start(&mut self, mode: SessionMode, workspace: Option<&str>) -> Result<(), ContextError> {
        self.push(ConsoleCall::Start {
            mode,
            workspace: workspace.map(str::to_string),
        });
        Ok(())
    }

    fn init_workspace(&mut self, name: &str) -> Result<(), ContextError> {
        self.push(ConsoleCall::InitWorkspace(name.to_string()));
        Ok(())
    }

    fn execute(&mut self, command: &str) -> Result<(), ContextError> {
        self.push(ConsoleCall::Execute(command.to_string()));
        if let Some((trap, error)) = &self.behavior.execute_trap {
            if command == trap {
                return Err(error.clone());
            }
        }
        Ok(())
    }

    fn list_options(&mut self) -> Result<(), ContextError> {
        self.push(ConsoleCall::ListOptions);
        Ok(())
    }

    fn set_option(&mut self, spec: &str) -> Result<(), ContextError> {
        self.push(ConsoleCall::SetOption(spec.to_string()));
        Ok(())
    }

    fn search_modules(&mut self, filter: &str) -> Result<(), ContextError> {
        self.push(ConsoleCall::SearchModules(filter.to_string()));
        Ok(())
    }

    fn load_module(
        &mut self,
        path: &str,
    ) -> Result<Option<Box<dyn ModuleContext>>, ContextError> {
        self.push(ConsoleCall::LoadModule(path.to_string()));
        match self.behavior.load {
            LoadBehavior::Fail => Ok(None),
            LoadBehavior::Succeed => Ok(Some(Box::new(FakeModule {
                module: path.to_string(),
                calls: Rc::clone(&self.calls),
            }))),
        }
    }

    fn prompt(&self) -> String {
        "[fake] > ".to_string()
    }
}

struct FakeModule {
    module: String,
    calls: Rc<RefCell<Vec<ConsoleCall>>>,
}

impl ModuleContext for FakeModule {
    fn execute(&mut self, command: &str) -> Result<(), ContextError> {
        self.calls.borrow_mut().push(ConsoleCall::ModuleExecute {
            module: self.module.clone(),
            command: command.to_string(),
        });
        Ok(())
    }

    fn list_options(&mut self) -> Result<(), ContextError> {
        self.calls.borrow_mut().push(ConsoleCall::ModuleListOptions {
            module: self.module.clone(),
        });
        Ok(())
    }

    fn set_option(&mut self, spec: &str) -> Result<(), ContextError> {
        self.calls.borrow_mut().push(ConsoleCall::ModuleSetOption {
            module: self.module.clone(),
            spec: spec.to_string(),
        });
        Ok(())
    }

    fn run(&mut self) -> Result<(), ContextError> {
        self.calls.borrow_mut().push(ConsoleCall::ModuleRun {
            module: self.module.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_dir_fixture_writes_and_resolves_paths() {
        let fixture = TestTempDir::new("fixture");
        let file = fixture.write_text("nested/file.txt", "hello");
        assert_eq!(fs::read_to_string(file).unwrap(), "hello");
    }

    #[test]
    fn fake_console_records_calls_in_order() {
        let framework = FakeFramework::healthy();
        let mut console = framework
            .construct(crate::flags::reconcile(Default::default(), false))
            .expect("construct");
        console.execute("one").unwrap();
        console.set_option("A 1").unwrap();
        assert_eq!(
            framework.calls(),
            vec![
                ConsoleCall::Execute("one".into()),
                ConsoleCall::SetOption("A 1".into()),
            ]
        );
    }

    #[test]
    fn recording_renderer_partitions_output_kinds() {
        let renderer = RecordingRenderer::default();
        renderer.status("a");
        renderer.warn("b");
        renderer.error("c");
        renderer.hint("d");
        assert_eq!(renderer.statuses(), vec!["a"]);
        assert_eq!(renderer.warnings(), vec!["b"]);
        assert_eq!(renderer.errors(), vec!["c"]);
        assert_eq!(renderer.hints(), vec!["d"]);
    }
}
