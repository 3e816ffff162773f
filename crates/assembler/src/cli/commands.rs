use super::print::{print_document, print_listing, print_messages, print_warnings};
use super::setup::{Cli, Commands};
use anyhow::{anyhow, bail, Context};
use assemblerapp::api::AssemblerApi;
use assemblerapp::config::AssemblerConfig;
use assemblerapp::encode::DocumentEncoder;
use assemblerapp::filter::AttributeFilter;
use assemblerapp::host::memory::MemoryScene;
use assemblerapp::host::{AttributeHandle, NodeHandle, SceneHost};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "ASSEMBLER_LOG";

struct AppContext {
    api: AssemblerApi<MemoryScene>,
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Inspect {
            scene,
            all,
            hidden,
            hide_non_keyable,
            connected_only,
            search,
        } => {
            let ctx = init_context(&scene, config)?;
            let mut filter = ctx.api.default_filter();
            filter.show_hidden |= hidden;
            filter.show_non_keyable &= !hide_non_keyable;
            filter.connected_only |= connected_only;
            if let Some(term) = search {
                filter = filter.with_search(term);
            }
            handle_inspect(&ctx, all, &filter)
        }
        Commands::Export {
            scene,
            nodes,
            attrs,
            indent,
            indent_size,
            output,
        } => {
            let mut ctx = init_context(&scene, config)?;
            let config = ctx.api.config();
            let encoder = DocumentEncoder::new(
                indent || config.include_indentation,
                indent_size.unwrap_or(config.indentation_size),
            );
            handle_export(&mut ctx, &nodes, &attrs, &encoder, output)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // A subscriber may already be installed when running under a test harness.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AssemblerConfig> {
    match path {
        Some(path) => AssemblerConfig::load_from(path)
            .with_context(|| format!("failed to read config {}", path.display())),
        None => Ok(AssemblerConfig::load().unwrap_or_else(|error| {
            tracing::warn!(%error, "ignoring unreadable config, using defaults");
            AssemblerConfig::default()
        })),
    }
}

fn init_context(scene: &Path, config: AssemblerConfig) -> anyhow::Result<AppContext> {
    let host = MemoryScene::load(scene)
        .with_context(|| format!("failed to load scene {}", scene.display()))?;
    tracing::debug!(nodes = host.nodes().len(), "scene loaded");
    Ok(AppContext {
        api: AssemblerApi::new(host, config),
    })
}

fn handle_inspect(ctx: &AppContext, all: bool, filter: &AttributeFilter) -> anyhow::Result<()> {
    let result = if all {
        let nodes = ctx.api.host().nodes();
        ctx.api.explore_nodes(&nodes, filter)?
    } else {
        ctx.api.explore_selection(filter)?
    };
    print_listing(&result.listed_nodes);
    print_messages(&result.messages);
    Ok(())
}

fn handle_export(
    ctx: &mut AppContext,
    nodes: &[String],
    attrs: &[String],
    encoder: &DocumentEncoder,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let host = ctx.api.host();
    let mut node_handles = nodes
        .iter()
        .map(|name| resolve_node(host, name))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let attr_handles = attrs
        .iter()
        .map(|path| resolve_attribute(host, path))
        .collect::<anyhow::Result<Vec<_>>>()?;
    if node_handles.is_empty() && attr_handles.is_empty() {
        node_handles = host.active_selection()?;
    }
    if node_handles.is_empty() && attr_handles.is_empty() {
        bail!("nothing to export: no --node or --attr given and nothing is selected");
    }

    let filter = ctx.api.default_filter();
    let mut warnings = ctx.api.add_nodes(&node_handles, &filter)?.messages;
    warnings.extend(ctx.api.add_attributes(&attr_handles)?.messages);
    print_warnings(&warnings);

    match output {
        Some(path) => {
            let result = ctx.api.export(&path, encoder)?;
            print_messages(&result.messages);
        }
        None => {
            let result = ctx.api.preview_with(encoder)?;
            print_document(result.document.as_deref().unwrap_or_default());
        }
    }
    Ok(())
}

fn resolve_node(host: &MemoryScene, name: &str) -> anyhow::Result<NodeHandle> {
    host.find_node(name)
        .ok_or_else(|| anyhow!("no node named '{}' in scene", name))
}

/// Resolve `NODE.ATTR`, where ATTR may be a short or long attribute name.
fn resolve_attribute(host: &MemoryScene, path: &str) -> anyhow::Result<AttributeHandle> {
    let (node, attr) = path
        .split_once('.')
        .ok_or_else(|| anyhow!("attribute '{}' must be written as NODE.ATTR", path))?;
    let node = resolve_node(host, node)?;
    host.find_attribute(node, attr)
        .ok_or_else(|| anyhow!("no attribute '{}' in scene", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assemblerapp::host::memory::fixtures::SceneFixture;

    #[test]
    fn resolves_short_and_long_attribute_names() {
        let fixture = SceneFixture::new();
        let by_short = resolve_attribute(&fixture.scene, "pCube1.tx").unwrap();
        let by_long = resolve_attribute(&fixture.scene, "pCube1.translateX").unwrap();
        assert_eq!(by_short, by_long);
    }

    #[test]
    fn rejects_malformed_attribute_path() {
        let fixture = SceneFixture::new();
        let err = resolve_attribute(&fixture.scene, "translateX").unwrap_err();
        assert!(err.to_string().contains("NODE.ATTR"));
    }

    #[test]
    fn unknown_node_is_reported_by_name() {
        let fixture = SceneFixture::new();
        let err = resolve_node(&fixture.scene, "persp").unwrap_err();
        assert!(err.to_string().contains("persp"));
    }
}
