use std::path::PathBuf;
use std::process::ExitCode;

use dctx_lib::{download_image_assets, ImagesOutput};

use crate::cli::{RenderArgs, TargetArgs};
use crate::formatting::{render_error, write_output};
use crate::settings::{format_effective_settings, load_config, resolve_settings};

use super::{build_client, fetch_and_simplify, resolve_target};

/// Run the images command: simplify, then download every referenced image fill.
pub async fn run_images(
    config_path: Option<PathBuf>,
    target: TargetArgs,
    dir: Option<PathBuf>,
    render: RenderArgs,
) -> ExitCode {
    let output = render.output.clone();
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => {
            return render_error(err, render.format.unwrap_or_default(), output.as_deref())
        }
    };
    let settings = resolve_settings(&render, dir.as_deref(), &config);
    let format = settings.format;
    tracing::debug!("{}", format_effective_settings(&settings, config_path.as_deref()));

    let (file_key, node_ids) = match resolve_target(&target) {
        Ok(resolved) => resolved,
        Err(err) => return render_error(err, format, output.as_deref()),
    };
    let client = match build_client(&settings) {
        Ok(client) => client,
        Err(err) => return render_error(err, format, output.as_deref()),
    };

    let simplification =
        match fetch_and_simplify(&client, &file_key, &node_ids, settings.depth).await {
            Ok(result) => result,
            Err(err) => return render_error(err, format, output.as_deref()),
        };

    let assets = match download_image_assets(
        &client,
        &file_key,
        &simplification.image_assets,
        &settings.assets_dir,
    )
    .await
    {
        Ok(assets) => assets,
        Err(err) => return render_error(err, format, output.as_deref()),
    };

    let body = ImagesOutput::new(file_key, settings.assets_dir, assets);
    tracing::info!(
        downloaded = body.downloaded,
        failed = body.failed,
        "image download finished"
    );
    if let Err(err) = write_output(&body, format, output.as_deref()) {
        return render_error(err, format, output.as_deref());
    }
    ExitCode::SUCCESS
}
