//! Command implementations.
//!
//! Each command returns the text it would print so it can be tested
//! without capturing stdout.

use crate::scenario::{self, Scenario};
use causegraph_core::{RemoteExceptionGraph, snapshot};
use causegraph_wire::{DecodeLimits, WireCodec};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::info;

/// Build a sample graph, snapshot and encode it.
///
/// Writes the bytes to `output` when given, otherwise returns them as hex.
pub fn demo(scenario: Scenario, output: Option<&Path>) -> Result<String> {
    let native = scenario::build(scenario)?;
    let graph = snapshot(&native);
    let bytes = WireCodec::default().encode_to_vec(&graph)?;

    match output {
        Some(path) => {
            fs::write(path, &bytes).wrap_err_with(|| format!("writing {}", path.display()))?;
            info!(?scenario, nodes = graph.len(), bytes = bytes.len(), path = %path.display(), "wrote snapshot");
            Ok(format!(
                "wrote {} nodes ({} bytes) to {}\n",
                graph.len(),
                bytes.len(),
                path.display()
            ))
        }
        None => Ok(format!("{}\n", hex::encode(&bytes))),
    }
}

/// Decode a snapshot file and describe it
pub fn inspect(input: &Path, limits: DecodeLimits, json: bool) -> Result<String> {
    let bytes = fs::read(input).wrap_err_with(|| format!("reading {}", input.display()))?;
    let graph = WireCodec::new(limits)
        .decode(bytes.as_slice())
        .wrap_err_with(|| format!("decoding {}", input.display()))?;

    if json {
        let mut out = serde_json::to_string_pretty(&graph)?;
        out.push('\n');
        Ok(out)
    } else {
        Ok(describe(&graph))
    }
}

/// Resolve decode limits from an optional JSON file and flag overrides
pub fn load_limits(
    path: Option<&Path>,
    max_string_len: Option<u32>,
    max_nodes: Option<u32>,
    max_depth: Option<u32>,
) -> Result<DecodeLimits> {
    let mut limits = match path {
        Some(path) => {
            let text = fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<DecodeLimits>(&text).wrap_err_with(|| format!("parsing limits in {}", path.display()))?
        }
        None => DecodeLimits::default(),
    };
    if let Some(max) = max_string_len {
        limits = limits.with_max_string_len(max);
    }
    if let Some(max) = max_nodes {
        limits = limits.with_max_nodes(max);
    }
    if let Some(max) = max_depth {
        limits = limits.with_max_depth(max);
    }
    Ok(limits)
}

/// Rendered trace followed by the extracted fields of every node
fn describe(graph: &RemoteExceptionGraph) -> String {
    let mut out = graph.root().render_trace();
    let with_fields: Vec<_> = graph.iter().filter(|node| !node.fields().is_empty()).collect();
    if !with_fields.is_empty() {
        out.push_str("\nFields:\n");
        for node in with_fields {
            let _ = write!(out, "  {} {}:", node.id(), node.class_name());
            for field in node.fields() {
                let _ = write!(out, " {}={}", field.name, field.value);
            }
            out.push('\n');
        }
    }
    out
}
