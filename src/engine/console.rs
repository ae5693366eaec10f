//! The bundled console session.
//!
//! Session state lives behind `Rc<RefCell<_>>` — the launcher is
//! single-threaded and the loaded-module context shares the same state as
//! the global console, exactly like a prompt that switches scope. Module
//! runners must not call back into the console; they receive a
//! [`ModuleRun`] snapshot instead.

use crate::context::{ConsoleContext, ModuleContext, SessionMode};
use crate::engine::banner;
use crate::engine::modules::{
    ModuleIndex, ModuleRun, ModuleRunner, RemoteModule, Resolution, MODULES_DIR,
    REMOTE_INDEX_FILE,
};
use crate::engine::options::OptionRegistry;
use crate::engine::workspace::{self, DEFAULT_WORKSPACE, WORKSPACES_DIR};
use crate::engine::EngineManifest;
use crate::error::ContextError;
use crate::flags::ReconciledFlags;
use crate::render::{RenderSink, Renderer};
use rand::rngs::OsRng;
use rand::RngCore;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

/// Timeout for the optional startup requests (version check, telemetry,
/// index refresh).
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// File holding the anonymous analytics client id.
const CLIENT_ID_FILE: &str = ".cid";

/// The global console context produced by the engine.
pub struct Console {
    state: Rc<RefCell<SessionState>>,
}

struct SessionState {
    home: PathBuf,
    flags: ReconciledFlags,
    manifest: EngineManifest,
    renderer: Renderer,
    globals: OptionRegistry,
    workspace: String,
    index: ModuleIndex,
    runners: BTreeMap<String, Rc<dyn ModuleRunner>>,
    /// Option registries of modules loaded this session, keyed by path.
    module_options: BTreeMap<String, OptionRegistry>,
    active_module: Option<String>,
}

impl Console {
    pub(crate) fn new(
        home: PathBuf,
        flags: ReconciledFlags,
        manifest: EngineManifest,
        runners: BTreeMap<String, Rc<dyn ModuleRunner>>,
    ) -> Self {
        Self {
            state: Rc::new(RefCell::new(SessionState {
                home,
                renderer: Renderer::new(flags.colors),
                globals: default_globals(flags.debug),
                flags,
                manifest,
                workspace: DEFAULT_WORKSPACE.to_string(),
                index: ModuleIndex::default(),
                runners,
                module_options: BTreeMap::new(),
                active_module: None,
            })),
        }
    }
}

fn default_globals(debug: bool) -> OptionRegistry {
    let mut globals = OptionRegistry::global_defaults();
    if debug {
        // Mirror the debug toggle into the session's own verbosity option.
        let _ = globals.set("VERBOSITY", "2");
    }
    globals
}

impl ConsoleContext for Console {
    fn start(&mut self, mode: SessionMode, workspace: Option<&str>) -> Result<(), ContextError> {
        let state = &mut *self.state.borrow_mut();
        init_home(state)?;
        refresh_remote_index(state);
        state.index = ModuleIndex::load(&state.home);
        let name = workspace.unwrap_or(DEFAULT_WORKSPACE).to_string();
        activate_workspace(state, &name)?;
        check_version(state);
        send_analytics(state, mode);
        if mode == SessionMode::Console {
            banner::print_banner(state.flags.accessible, &state.manifest.version, &state.index);
        }
        tracing::debug!(mode = %mode, workspace = %state.workspace, "console session started");
        Ok(())
    }

    fn init_workspace(&mut self, name: &str) -> Result<(), ContextError> {
        let state = &mut *self.state.borrow_mut();
        activate_workspace(state, name)
    }

    fn execute(&mut self, command: &str) -> Result<(), ContextError> {
        let state = &mut *self.state.borrow_mut();
        dispatch(state, command)
    }

    fn list_options(&mut self) -> Result<(), ContextError> {
        let state = self.state.borrow();
        print_table(state.globals.table_lines());
        Ok(())
    }

    fn set_option(&mut self, spec: &str) -> Result<(), ContextError> {
        let state = &mut *self.state.borrow_mut();
        let (name, value) = spec
            .split_once(char::is_whitespace)
            .ok_or_else(|| ContextError::failed(format!("expected NAME VALUE, got `{spec}`")))?;
        // The context-level setter always targets the global scope, even
        // while a module is active.
        state
            .globals
            .set(name, value.trim())
            .map_err(ContextError::failed)?;
        persist_globals(state)
    }

    fn search_modules(&mut self, filter: &str) -> Result<(), ContextError> {
        let state = self.state.borrow();
        let installed = state.index.search(filter);
        println!("  Modules ({})", installed.len());
        println!();
        for manifest in &installed {
            if manifest.description.is_empty() {
                println!("    {}", manifest.path);
            } else {
                println!("    {} - {}", manifest.path, manifest.description);
            }
        }
        let available = state.index.search_available(filter);
        if !available.is_empty() {
            println!();
            println!("  Available via marketplace ({})", available.len());
            for remote in available {
                println!("    {}", remote.path);
            }
        }
        println!();
        Ok(())
    }

    fn load_module(
        &mut self,
        path: &str,
    ) -> Result<Option<Box<dyn ModuleContext>>, ContextError> {
        let resolved = {
            let state = &mut *self.state.borrow_mut();
            resolve_and_activate(state, path)
        };
        Ok(resolved.map(|path| {
            Box::new(LoadedModule {
                state: Rc::clone(&self.state),
                path,
            }) as Box<dyn ModuleContext>
        }))
    }

    fn prompt(&self) -> String {
        let state = self.state.borrow();
        match &state.active_module {
            Some(module) => format!("[lookout][{}][{module}] > ", state.workspace),
            None => format!("[lookout][{}] > ", state.workspace),
        }
    }
}

/// A console narrowed to one loaded module.
struct LoadedModule {
    state: Rc<RefCell<SessionState>>,
    path: String,
}

impl ModuleContext for LoadedModule {
    fn execute(&mut self, command: &str) -> Result<(), ContextError> {
        let state = &mut *self.state.borrow_mut();
        // Module contexts always dispatch in their own scope, even if the
        // global console moved on meanwhile.
        state.active_module = Some(self.path.clone());
        dispatch(state, command)
    }

    fn list_options(&mut self) -> Result<(), ContextError> {
        let state = self.state.borrow();
        let registry = state
            .module_options
            .get(&self.path)
            .ok_or_else(|| ContextError::failed(format!("module not loaded: {}", self.path)))?;
        print_table(registry.table_lines());
        Ok(())
    }

    fn set_option(&mut self, spec: &str) -> Result<(), ContextError> {
        let state = &mut *self.state.borrow_mut();
        let (name, value) = spec
            .split_once(char::is_whitespace)
            .ok_or_else(|| ContextError::failed(format!("expected NAME VALUE, got `{spec}`")))?;
        state
            .module_options
            .get_mut(&self.path)
            .ok_or_else(|| ContextError::failed(format!("module not loaded: {}", self.path)))?
            .set(name, value.trim())
            .map_err(ContextError::failed)
    }

    fn run(&mut self) -> Result<(), ContextError> {
        let state = &mut *self.state.borrow_mut();
        run_module(state, &self.path)
    }
}

// ---------------------------------------------------------------------------
// Session internals
// ---------------------------------------------------------------------------

fn init_home(state: &SessionState) -> Result<(), ContextError> {
    fs::create_dir_all(&state.home)?;
    fs::create_dir_all(state.home.join(MODULES_DIR))?;
    fs::create_dir_all(state.home.join(WORKSPACES_DIR))?;
    Ok(())
}

/// Switch to (creating if needed) a workspace, reloading its saved options
/// over fresh defaults. Idempotent.
fn activate_workspace(state: &mut SessionState, name: &str) -> Result<(), ContextError> {
    workspace::init(&state.home, name).map_err(ContextError::failed)?;
    let saved = workspace::load_saved_options(&state.home, name).map_err(ContextError::failed)?;
    state.globals = default_globals(state.flags.debug);
    state.globals.apply_assigned(&saved);
    state.workspace = name.to_string();
    Ok(())
}

fn persist_globals(state: &SessionState) -> Result<(), ContextError> {
    workspace::store_options(&state.home, &state.workspace, &state.globals.assigned())
        .map_err(ContextError::failed)
}

fn print_table(lines: Vec<String>) {
    println!();
    for line in lines {
        println!("{line}");
    }
    println!();
}

/// One command line against the session, scoped to the active module when
/// one is loaded.
fn dispatch(state: &mut SessionState, command: &str) -> Result<(), ContextError> {
    let command = command.trim();
    let (verb, rest) = split_first(command);
    match verb {
        "" => Ok(()),
        "help" => {
            print_help();
            Ok(())
        }
        // Scripted sessions routinely end with `exit`; the loop owns
        // session lifetime, so treat it as a no-op here.
        "exit" | "quit" => {
            tracing::debug!("ignoring session-exit command in batch context");
            Ok(())
        }
        "set" => {
            let (name, value) = split_first(rest);
            if name.is_empty() || value.is_empty() {
                return Err(ContextError::failed("usage: set NAME VALUE"));
            }
            scoped_set(state, name, value)
        }
        "unset" => {
            if rest.is_empty() {
                return Err(ContextError::failed("usage: unset NAME"));
            }
            scoped_unset(state, rest)
        }
        "options" => match split_first(rest) {
            ("list", _) | ("", _) => {
                print_table(scoped_registry(state)?.table_lines());
                Ok(())
            }
            ("set", args) => {
                let (name, value) = split_first(args);
                if name.is_empty() || value.is_empty() {
                    return Err(ContextError::failed("usage: options set NAME VALUE"));
                }
                scoped_set(state, name, value)
            }
            ("unset", name) if !name.is_empty() => scoped_unset(state, name),
            _ => Err(ContextError::failed("usage: options [list|set|unset]")),
        },
        "show" => match rest {
            "options" => {
                print_table(scoped_registry(state)?.table_lines());
                Ok(())
            }
            "modules" => {
                show_modules(state, "");
                Ok(())
            }
            "workspaces" => show_workspaces(state),
            other => Err(ContextError::failed(format!("nothing to show for `{other}`"))),
        },
        "workspaces" => match split_first(rest) {
            ("list", _) | ("", _) => show_workspaces(state),
            ("create", name) | ("select", name) if !name.is_empty() => {
                activate_workspace(state, name)
            }
            _ => Err(ContextError::failed(
                "usage: workspaces [list|create NAME|select NAME]",
            )),
        },
        "modules" => match split_first(rest) {
            ("search", filter) => {
                show_modules(state, filter);
                Ok(())
            }
            ("load", query) if !query.is_empty() => match resolve_and_activate(state, query) {
                Some(_) => Ok(()),
                None => Err(ContextError::failed(format!("invalid module: {query}"))),
            },
            _ => Err(ContextError::failed("usage: modules [search FILTER|load PATH]")),
        },
        "back" => {
            state.active_module = None;
            Ok(())
        }
        "run" => match state.active_module.clone() {
            Some(module) => run_module(state, &module),
            None => Err(ContextError::failed("no module loaded")),
        },
        other => Err(ContextError::failed(format!("unknown command: {other}"))),
    }
}

fn split_first(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (input, ""),
    }
}

fn print_help() {
    println!();
    println!("  Commands");
    println!("  --------");
    println!("  help                          this text");
    println!("  set NAME VALUE                set an option in the current scope");
    println!("  unset NAME                    clear an option in the current scope");
    println!("  options [list|set|unset]      manage options in the current scope");
    println!("  show options|modules|workspaces");
    println!("  workspaces list|create NAME|select NAME");
    println!("  modules search [FILTER]       list matching modules");
    println!("  modules load PATH             enter a module's context");
    println!("  back                          leave the module context");
    println!("  run                           run the loaded module");
    println!("  exit                          leave the session");
    println!();
}

/// Registry of the active scope: the loaded module's options, or the
/// global table.
fn scoped_registry<'a>(state: &'a SessionState) -> Result<&'a OptionRegistry, ContextError> {
    match &state.active_module {
        Some(module) => state
            .module_options
            .get(module)
            .ok_or_else(|| ContextError::failed(format!("module not loaded: {module}"))),
        None => Ok(&state.globals),
    }
}

fn scoped_set(state: &mut SessionState, name: &str, value: &str) -> Result<(), ContextError> {
    match state.active_module.clone() {
        Some(module) => state
            .module_options
            .get_mut(&module)
            .ok_or_else(|| ContextError::failed(format!("module not loaded: {module}")))?
            .set(name, value)
            .map_err(ContextError::failed)?,
        None => {
            state
                .globals
                .set(name, value)
                .map_err(ContextError::failed)?;
            persist_globals(state)?;
        }
    }
    state
        .renderer
        .status(&format!("{} => {value}", name.to_uppercase()));
    Ok(())
}

fn scoped_unset(state: &mut SessionState, name: &str) -> Result<(), ContextError> {
    match state.active_module.clone() {
        Some(module) => state
            .module_options
            .get_mut(&module)
            .ok_or_else(|| ContextError::failed(format!("module not loaded: {module}")))?
            .unset(name)
            .map_err(ContextError::failed)?,
        None => {
            state
                .globals
                .unset(name)
                .map_err(ContextError::failed)?;
            persist_globals(state)?;
        }
    }
    Ok(())
}

fn show_modules(state: &SessionState, filter: &str) {
    let installed = state.index.search(filter);
    println!("  Modules ({})", installed.len());
    for manifest in installed {
        println!("    {}", manifest.path);
    }
    println!();
}

fn show_workspaces(state: &SessionState) -> Result<(), ContextError> {
    let names = workspace::list(&state.home)?;
    println!("  Workspaces ({})", names.len());
    for name in names {
        let marker = if name == state.workspace { "*" } else { " " };
        println!("  {marker} {name}");
    }
    println!();
    Ok(())
}

/// Resolve a module query and make it the active module, seeding its
/// option registry from the manifest on first load.
fn resolve_and_activate(state: &mut SessionState, query: &str) -> Option<String> {
    match state.index.resolve(query) {
        Resolution::Found(path) => {
            if !state.module_options.contains_key(&path) {
                let registry = state
                    .index
                    .get(&path)
                    .map(|manifest| manifest.option_registry())
                    .unwrap_or_default();
                state.module_options.insert(path.clone(), registry);
            }
            state.active_module = Some(path.clone());
            Some(path)
        }
        Resolution::NotFound => None,
        Resolution::Ambiguous(matches) => {
            state
                .renderer
                .error(&format!("ambiguous module query `{query}`:"));
            for candidate in matches {
                println!("    {candidate}");
            }
            None
        }
    }
}

fn run_module(state: &mut SessionState, module: &str) -> Result<(), ContextError> {
    let registry = state
        .module_options
        .get(module)
        .ok_or_else(|| ContextError::failed(format!("module not loaded: {module}")))?;
    let missing = registry.missing_required();
    if !missing.is_empty() {
        return Err(ContextError::failed(format!(
            "value required for option: {}",
            missing.join(", ")
        )));
    }
    let runner = state
        .runners
        .get(module)
        .cloned()
        .ok_or_else(|| ContextError::failed(format!("no runner bound for module `{module}`")))?;
    let run = ModuleRun {
        module,
        options: registry.assigned(),
        workspace_dir: workspace::workspace_dir(&state.home, &state.workspace),
    };
    tracing::debug!(module = %module, workspace = %state.workspace, "running module");
    runner.run(&run).map_err(ContextError::failed)
}

// ---------------------------------------------------------------------------
// Startup side channels (all best-effort, all flag-gated)
// ---------------------------------------------------------------------------

fn check_version(state: &SessionState) {
    if !state.flags.check {
        state.renderer.status("Version check disabled.");
        return;
    }
    let Some(url) = &state.manifest.update_url else {
        tracing::debug!("no update endpoint configured");
        return;
    };
    match fetch_text(url) {
        Ok(remote) if remote != state.manifest.version => {
            state
                .renderer
                .warn("Your version of lookout does not match the latest release.");
            state.renderer.warn("Consider updating before further use.");
            state.renderer.status(&format!("Remote version: {remote}"));
            state
                .renderer
                .status(&format!("Local version:  {}", state.manifest.version));
        }
        Ok(_) => tracing::debug!("running the latest release"),
        Err(e) => state.renderer.warn(&format!("Version check failed ({e}).")),
    }
}

fn send_analytics(state: &SessionState, mode: SessionMode) {
    if !state.flags.analytics {
        tracing::debug!("analytics disabled");
        return;
    }
    let Some(url) = &state.manifest.telemetry_url else {
        tracing::debug!("no telemetry endpoint configured");
        return;
    };
    let cid = match client_id(state) {
        Ok(cid) => cid,
        Err(e) => {
            tracing::debug!(error = %e, "analytics client id unavailable");
            return;
        }
    };
    let result = http_client().and_then(|client| {
        client
            .get(url)
            .query(&[
                ("cid", cid.as_str()),
                ("version", state.manifest.version.as_str()),
                ("view", "launch"),
                ("mode", &mode.to_string()),
            ])
            .send()
            .map_err(|e| e.to_string())
    });
    if let Err(e) = result {
        tracing::debug!(error = %e, "analytics ping failed");
    }
}

fn refresh_remote_index(state: &SessionState) {
    if !state.flags.marketplace {
        tracing::debug!("module index refresh disabled");
        return;
    }
    let Some(url) = &state.manifest.index_url else {
        tracing::debug!("no module index endpoint configured");
        return;
    };
    let fetched = http_client().and_then(|client| {
        client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.json::<Vec<RemoteModule>>())
            .map_err(|e| e.to_string())
    });
    match fetched {
        Ok(remote) => {
            let encoded = match serde_json::to_string_pretty(&remote) {
                Ok(encoded) => encoded,
                Err(e) => {
                    tracing::debug!(error = %e, "failed to encode remote index");
                    return;
                }
            };
            if let Err(e) = fs::write(state.home.join(REMOTE_INDEX_FILE), encoded) {
                tracing::debug!(error = %e, "failed to cache remote index");
            }
        }
        Err(e) => tracing::debug!(error = %e, "module index refresh failed"),
    }
}

fn http_client() -> Result<reqwest::blocking::Client, String> {
    reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| e.to_string())
}

fn fetch_text(url: &str) -> Result<String, String> {
    let text = http_client()?
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.text())
        .map_err(|e| e.to_string())?;
    Ok(text.trim().to_string())
}

/// Stable anonymous client id, created on first use.
fn client_id(state: &SessionState) -> Result<String, String> {
    let path = state.home.join(CLIENT_ID_FILE);
    if let Ok(existing) = fs::read_to_string(&path) {
        let existing = existing.trim();
        if !existing.is_empty() {
            return Ok(existing.to_string());
        }
    }
    let id = generate_client_id();
    fs::write(&path, &id).map_err(|e| e.to_string())?;
    Ok(id)
}

/// Opaque grouped-hex id (`xxxx-xxxx-xxxx-xxxx`).
fn generate_client_id() -> String {
    let mut bytes = [0u8; 8];
    OsRng.fill_bytes(&mut bytes);
    let hex = format!("{:016x}", u64::from_be_bytes(bytes));
    format!("{}-{}-{}-{}", &hex[0..4], &hex[4..8], &hex[8..12], &hex[12..16])
}
