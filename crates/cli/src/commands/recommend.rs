use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::Value;
use swimfit_core::config::{AppConfig, LoadOptions};
use swimfit_core::domain::request::FitRequest;
use swimfit_core::fit::{build_runtime, FitRuntime};
use swimfit_core::response::RecommendResponse;

use crate::commands::CommandResult;

#[derive(Debug, Clone)]
pub enum RecommendSource {
    File(PathBuf),
    Inline(String),
    Stdin,
}

/// Offline evaluation with the configured engine; nothing is written to analytics.
pub fn run(source: RecommendSource) -> CommandResult {
    let raw = match read_source(&source) {
        Ok(raw) => raw,
        Err(error) => {
            return CommandResult::failure("recommend", "input", format!("{error:#}"), 6);
        }
    };

    let request = match serde_json::from_str::<Value>(&raw)
        .map_err(|error| format!("invalid JSON payload: {error}"))
        .and_then(|payload| FitRequest::from_json(&payload).map_err(|error| error.to_string()))
    {
        Ok(request) => request,
        Err(message) => return CommandResult::failure("recommend", "input", message, 6),
    };

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "recommend",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match build_runtime(&config.engine) {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure("recommend", "runtime_init", error.to_string(), 3);
        }
    };

    let response = RecommendResponse::from(&runtime.evaluate(&request));
    match serde_json::to_string_pretty(&response) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => CommandResult::failure("recommend", "serialization", error.to_string(), 3),
    }
}

fn read_source(source: &RecommendSource) -> Result<String> {
    match source {
        RecommendSource::File(path) => fs::read_to_string(path)
            .with_context(|| format!("could not read request file `{}`", path.display())),
        RecommendSource::Inline(text) => Ok(text.clone()),
        RecommendSource::Stdin => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).context("could not read request from stdin")?;
            Ok(buffer)
        }
    }
}
