//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use anyhow::Context;
use attnview_core::config::{init_workspace_config, load_config};
use attnview_core::error::ConfigError;
use attnview_core::layout::LayoutConfig;
use attnview_core::{OutputFormat, Scene, Viewer, ViewerEvent, ViewerParams, ViewerSettings};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Errors from parsing command-line values.
#[derive(Debug, thiserror::Error)]
pub enum ArgError {
    #[error("Invalid selection '{value}': expected LAYER:HEAD, e.g. 3:7")]
    InvalidSelection { value: String },
}

/// Parse a `LAYER:HEAD` pair.
pub fn parse_selection(value: &str) -> Result<(usize, usize), ArgError> {
    let invalid = || ArgError::InvalidSelection {
        value: value.to_string(),
    };
    let (layer, head) = value.split_once(':').ok_or_else(invalid)?;
    let layer = layer.trim().parse().map_err(|_| invalid())?;
    let head = head.trim().parse().map_err(|_| invalid())?;
    Ok((layer, head))
}

/// What to do to a freshly rendered viewer before writing it out.
#[derive(Debug, Default)]
pub struct RenderRequest {
    pub filter: Option<String>,
    pub events: Vec<ViewerEvent>,
    pub select: Option<(usize, usize)>,
    pub hover: Option<usize>,
    pub format: Option<OutputFormat>,
}

/// Handle a CLI subcommand.
pub async fn handle_command(
    command: Commands,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<()> {
    match command {
        Commands::Render {
            params,
            filter,
            select,
            hover,
            events,
            format,
            output,
        } => {
            let events = match events {
                Some(path) => read_events(&path).await?,
                None => Vec::new(),
            };
            let request = RenderRequest {
                filter,
                events,
                select,
                hover,
                format: format.map(OutputFormat::from),
            };
            handle_render(&params, request, output.as_deref(), workspace, config_file).await
        }
        Commands::Layout { params, filter } => {
            handle_layout(&params, filter.as_deref(), workspace, config_file).await
        }
        Commands::Config { action } => handle_config(action, workspace, config_file).await,
    }
}

fn load_settings(workspace: &Path, config_file: Option<&Path>) -> anyhow::Result<ViewerSettings> {
    if let Some(path) = config_file {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }
    }
    let settings = load_config(Some(workspace), config_file, None)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    settings.validate()?;
    Ok(settings)
}

async fn read_params(path: &Path) -> anyhow::Result<ViewerParams> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read parameters from {}", path.display()))?;
    ViewerParams::from_json(&json)
        .with_context(|| format!("Invalid parameters in {}", path.display()))
}

async fn read_events(path: &Path) -> anyhow::Result<Vec<ViewerEvent>> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read events from {}", path.display()))?;
    ViewerEvent::parse_list(&json)
        .with_context(|| format!("Invalid events in {}", path.display()))
}

/// Build a viewer on `params` and apply the request in order: filter,
/// replayed events, selection, hover.
pub fn render_document(
    params: ViewerParams,
    settings: &ViewerSettings,
    request: &RenderRequest,
) -> anyhow::Result<String> {
    let mut viewer = Viewer::open(params, settings, Scene::new())?;

    if let Some(filter) = &request.filter {
        viewer.set_filter(filter)?;
    }
    for (i, event) in request.events.iter().enumerate() {
        viewer
            .dispatch(event)
            .with_context(|| format!("Event #{} ({}) failed", i, event.kind()))?;
    }
    if let Some((layer, head)) = request.select {
        viewer.click_thumbnail(layer, head)?;
    }
    if let Some(index) = request.hover {
        viewer.hover_token(index)?;
    }

    let format = request.format.unwrap_or(settings.output.format);
    Ok(match format {
        OutputFormat::Svg => viewer.to_svg(),
        OutputFormat::Html => viewer.to_html(),
    })
}

async fn handle_render(
    params_path: &Path,
    request: RenderRequest,
    output: Option<&Path>,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<()> {
    let settings = load_settings(workspace, config_file)?;
    let params = read_params(params_path).await?;
    let document = render_document(params, &settings, &request)?;

    match output {
        Some(path) => {
            tokio::fs::write(path, &document)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = document.len(), "Wrote output");
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(document.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}

async fn handle_layout(
    params_path: &Path,
    filter: Option<&str>,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<()> {
    let settings = load_settings(workspace, config_file)?;
    let params = read_params(params_path).await?;
    let layout = layout_for(&params, &settings, filter)?;
    println!("{}", serde_json::to_string_pretty(&layout)?);
    Ok(())
}

/// Layout metrics for `filter`, or the default filter, without drawing.
pub fn layout_for(
    params: &ViewerParams,
    settings: &ViewerSettings,
    filter: Option<&str>,
) -> anyhow::Result<LayoutConfig> {
    params.validate()?;
    let key = filter.unwrap_or(&params.default_filter);
    let data = params.filter(key)?;
    Ok(LayoutConfig::compute(&settings.layout, data, params.total_heads))
}

async fn handle_config(
    action: ConfigAction,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            match init_workspace_config(workspace, &ViewerSettings::default())? {
                Some(path) => println!("Created default configuration at: {}", path.display()),
                None => println!(
                    "Configuration file already exists at: {}",
                    attnview_core::config::workspace_config_path(workspace).display()
                ),
            }
            Ok(())
        }
        ConfigAction::Show => {
            let settings = load_settings(workspace, config_file)?;
            let toml_str = toml::to_string_pretty(&settings)?;
            println!("{}", toml_str);
            Ok(())
        }
    }
}
