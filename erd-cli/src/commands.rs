//! Subcommand implementations.

use std::fmt;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use erd_core::{load_script, EditorConfig, EditorEvent, EditorState, Scene, ScriptReport};
use erd_renderer::{BackendType, RenderView, Renderer, RendererConfig};

use crate::{CliConfig, Command};

/// A diagram read from disk.
#[derive(Debug)]
pub struct LoadedDiagram {
    /// Editor wrapping the loaded scene, with empty history.
    pub state: EditorState,
    /// Present when the input was a script.
    pub script: Option<ScriptReport>,
}

/// Summary printed by `erd check`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    /// Number of shapes.
    pub shapes: usize,
    /// Number of edges, dangling ones included.
    pub edges: usize,
    /// Edges whose endpoints are missing.
    pub dangling_edges: usize,
    /// Skipped script lines, formatted as `line N: reason`.
    pub issues: Vec<String>,
}

impl CheckReport {
    /// Whether the diagram has no problems.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.dangling_edges == 0 && self.issues.is_empty()
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "shapes: {}", self.shapes)?;
        writeln!(f, "edges: {}", self.edges)?;
        writeln!(f, "dangling edges: {}", self.dangling_edges)?;
        for issue in &self.issues {
            writeln!(f, "{issue}")?;
        }
        Ok(())
    }
}

/// Run the configured subcommand.
///
/// # Errors
///
/// Returns an error if any input cannot be read or parsed, or output cannot be written.
pub fn run(config: &CliConfig) -> anyhow::Result<()> {
    let editor_config = config.editor_config()?;

    match &config.command {
        Command::Render { input, output } => {
            let diagram = load_diagram(input, editor_config)?;
            let renderer = render(&diagram.state, config.width, config.height)?;
            match output {
                Some(path) => {
                    let mut file = std::fs::File::create(path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    renderer
                        .write_last_output(&mut file)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!("Wrote {}", path.display());
                }
                None => renderer.write_last_output(&mut std::io::stdout().lock())?,
            }
            Ok(())
        }
        Command::Convert { input, output } => {
            let diagram = load_diagram(input, editor_config)?;
            let json = diagram.state.to_json()?;
            write_output(output.as_deref(), &json)
        }
        Command::Check { input } => {
            let diagram = load_diagram(input, editor_config)?;
            let report = check(&diagram);
            if !report.is_clean() {
                tracing::warn!("{} has problems", input.display());
            }
            write_output(None, &report.to_string())
        }
        Command::Replay {
            input,
            events,
            output,
        } => {
            let mut diagram = load_diagram(input, editor_config)?;
            let events = read_events(events)?;
            let redraws = replay(&mut diagram.state, &events);
            tracing::info!("Replayed {} events ({redraws} redraws)", events.len());
            let json = diagram.state.to_json()?;
            write_output(output.as_deref(), &json)
        }
    }
}

/// Read a document (`.json`) or a declarative script.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the document is invalid.
/// Bad script lines are not errors; they are collected in the report.
pub fn load_diagram(path: &Path, config: EditorConfig) -> anyhow::Result<LoadedDiagram> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let is_document = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_document {
        let scene = Scene::from_json(&source)
            .with_context(|| format!("Invalid document {}", path.display()))?;
        tracing::debug!("Loaded document {}", path.display());
        return Ok(LoadedDiagram {
            state: EditorState::with_scene(config, scene),
            script: None,
        });
    }

    let mut scene = Scene::new();
    let report = load_script(&mut scene, &source);
    tracing::debug!(
        "Loaded script {}: {} shapes, {} edges",
        path.display(),
        report.shapes_created,
        report.edges_created
    );
    Ok(LoadedDiagram {
        state: EditorState::with_scene(config, scene),
        script: Some(report),
    })
}

/// Render the editor state to an SVG document.
///
/// # Errors
///
/// Returns an error if the renderer cannot be created or produces no output.
pub fn render_svg(state: &EditorState, width: u32, height: u32) -> anyhow::Result<String> {
    render(state, width, height)?
        .last_output()
        .map(str::to_string)
        .context("SVG backend produced no output")
}

fn render(state: &EditorState, width: u32, height: u32) -> anyhow::Result<Renderer> {
    let editor = state.config();
    let mut renderer = Renderer::new(RendererConfig {
        preferred_backend: BackendType::Svg,
        width,
        height,
        grid_size: editor.grid_size,
        handle_size: editor.handle_size,
        ..RendererConfig::default()
    })?;
    renderer.render(&RenderView::of(state))?;
    Ok(renderer)
}

/// Summarize a loaded diagram.
#[must_use]
pub fn check(diagram: &LoadedDiagram) -> CheckReport {
    let scene = diagram.state.scene();
    let issues = diagram
        .script
        .iter()
        .flat_map(|report| &report.issues)
        .map(|issue| format!("line {}: {}", issue.line, issue.error))
        .collect();

    CheckReport {
        shapes: scene.shape_count(),
        edges: scene.edge_count(),
        dangling_edges: scene.edge_count() - scene.resolved_edges().count(),
        issues,
    }
}

/// Read a JSON array of recorded editor events.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid event list.
pub fn read_events(path: &Path) -> anyhow::Result<Vec<EditorEvent>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid event list {}", path.display()))
}

/// Feed events to the editor in order. Returns how many asked for a redraw.
pub fn replay(state: &mut EditorState, events: &[EditorEvent]) -> usize {
    events
        .iter()
        .filter(|event| state.handle_event(event))
        .count()
}

fn write_output(path: Option<&Path>, contents: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, contents)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(contents.as_bytes())?;
            if !contents.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}
