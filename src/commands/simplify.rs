use std::path::{Path, PathBuf};
use std::process::ExitCode;

use dctx_lib::{
    normalize_node_id, parse_payload, simplify_response, DctxError, RawResponse, Simplification,
    SimplifyOptions,
};

use crate::cli::RenderArgs;
use crate::formatting::{render_error, write_output};
use crate::settings::{format_effective_settings, load_config, resolve_settings};

/// Run the simplify command on a raw response saved on disk. Never touches the network.
pub fn run_simplify(
    config_path: Option<PathBuf>,
    input: PathBuf,
    node_ids: Vec<String>,
    render: RenderArgs,
) -> ExitCode {
    let output = render.output.clone();
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => {
            return render_error(err, render.format.unwrap_or_default(), output.as_deref())
        }
    };
    let settings = resolve_settings(&render, None, &config);
    let format = settings.format;
    tracing::debug!("{}", format_effective_settings(&settings, config_path.as_deref()));

    let node_ids: Vec<String> = node_ids.iter().map(|id| normalize_node_id(id)).collect();
    let options = SimplifyOptions {
        max_depth: settings.depth,
    };
    let simplification = match simplify_input(&input, &node_ids, &options) {
        Ok(result) => result,
        Err(err) => return render_error(err, format, output.as_deref()),
    };

    if let Err(err) = write_output(&simplification.design, format, output.as_deref()) {
        return render_error(err, format, output.as_deref());
    }
    ExitCode::SUCCESS
}

fn simplify_input(
    input: &Path,
    node_ids: &[String],
    options: &SimplifyOptions,
) -> Result<Simplification, DctxError> {
    let raw = std::fs::read_to_string(input)?;
    let value: serde_json::Value = parse_payload(&raw)?;
    let response = RawResponse::from_value(value)?;
    tracing::debug!(input = %input.display(), "read raw response");
    simplify_response(&response, node_ids, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn simplify_input_reads_a_saved_nodes_response() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"name":"Saved","nodes":{{"1:2":{{"document":{{"id":"1:2","name":"Hero","type":"FRAME"}}}}}}}}"#
        )
        .unwrap();

        let result = simplify_input(file.path(), &[], &SimplifyOptions::default()).unwrap();
        assert_eq!(result.design.metadata().name, "Saved");
        assert_eq!(result.design.nodes()[0].id, "1:2");
    }

    #[test]
    fn simplify_input_reports_unreadable_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = simplify_input(file.path(), &[], &SimplifyOptions::default()).unwrap_err();
        assert!(matches!(err, DctxError::Serialization(_)));
    }

    #[test]
    fn simplify_input_handles_deeply_nested_documents() {
        let levels = 200;
        let mut document = String::new();
        for i in 0..levels {
            document.push_str(&format!(r#"{{"id":"n{i}","name":"Level {i}","type":"FRAME","children":["#));
        }
        document.push_str(&"]}".repeat(levels));
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"name":"Deep","nodes":{{"n0":{{"document":{document}}}}}}}"#).unwrap();

        let result = simplify_input(file.path(), &[], &SimplifyOptions::default()).unwrap();
        let mut node = &result.design.nodes()[0];
        let mut depth = 0;
        while let Some(child) = node.children.first() {
            node = child;
            depth += 1;
        }
        assert_eq!(depth, levels - 1);
        assert_eq!(node.id, format!("n{}", levels - 1));
    }
}
