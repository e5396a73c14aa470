// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The plug-in calling convention: each of `send`/`process`/`receive` is a
//! subprocess invoked with one JSON value on stdin, expected to print one
//! JSON value to stdout and exit zero. This keeps the per-application
//! contract opaque — the plug-in can be written in anything — at the cost
//! of one process spawn per call, which is acceptable since calls are
//! per-case, not per-file.

use crate::error::PluginError;
use serde::Serialize;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

pub struct PluginTrampoline {
    applications_dir: PathBuf,
}

impl PluginTrampoline {
    pub fn new(applications_dir: impl Into<PathBuf>) -> Self {
        Self { applications_dir: applications_dir.into() }
    }

    fn entry_point(&self, app: &str, name: &'static str) -> Result<PathBuf, PluginError> {
        let path = self.applications_dir.join(app).join(name);
        let executable = std::fs::metadata(&path).map(|m| m.permissions().mode() & 0o111 != 0).unwrap_or(false);
        if executable {
            Ok(path)
        } else {
            Err(PluginError::NotAvailable(app.to_string(), name))
        }
    }

    /// `select_input_files(filepath) -> list[list[path]]`.
    pub async fn select_input_files(
        &self,
        app: &str,
        filepath: &Path,
    ) -> Result<Vec<Vec<PathBuf>>, PluginError> {
        let entry = self.entry_point(app, "send")?;
        let output = invoke(&entry, &SelectInputFilesRequest { filepath }).await?;
        parse_cases(&entry, output)
    }

    /// `process_case(ordered_inputs) -> ordered_outputs`.
    pub async fn process_case(
        &self,
        app: &str,
        ordered_inputs: &[PathBuf],
    ) -> Result<Vec<PathBuf>, PluginError> {
        let entry = self.entry_point(app, "process")?;
        let output = invoke(&entry, &ProcessCaseRequest { ordered_inputs }).await?;
        serde_json::from_slice(&output).map_err(|e| PluginError::InvalidJson(entry, e))
    }

    /// `receive_case(ordered_outputs) -> ()`.
    pub async fn receive_case(&self, app: &str, ordered_outputs: &[PathBuf]) -> Result<(), PluginError> {
        let entry = self.entry_point(app, "receive")?;
        invoke(&entry, &ReceiveCaseRequest { ordered_outputs }).await?;
        Ok(())
    }
}

#[derive(Serialize)]
struct SelectInputFilesRequest<'a> {
    filepath: &'a Path,
}

#[derive(Serialize)]
struct ProcessCaseRequest<'a> {
    ordered_inputs: &'a [PathBuf],
}

#[derive(Serialize)]
struct ReceiveCaseRequest<'a> {
    ordered_outputs: &'a [PathBuf],
}

async fn invoke(entry: &Path, request: &impl Serialize) -> Result<Vec<u8>, PluginError> {
    let payload = serde_json::to_vec(request).map_err(|e| PluginError::EncodeInput(entry.to_path_buf(), e))?;

    let mut child = Command::new(entry)
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::inherit())
        .spawn()
        .map_err(|source| PluginError::Spawn { path: entry.to_path_buf(), source })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(&payload)
            .await
            .map_err(|source| PluginError::WriteStdin(entry.to_path_buf(), source))?;
    }

    let output = child
        .wait_with_output()
        .await
        .map_err(|source| PluginError::ReadOutput(entry.to_path_buf(), source))?;

    if !output.status.success() {
        return Err(PluginError::NonZeroExit(entry.to_path_buf()));
    }
    Ok(output.stdout)
}

fn parse_cases(entry: &Path, output: Vec<u8>) -> Result<Vec<Vec<PathBuf>>, PluginError> {
    let value: serde_json::Value =
        serde_json::from_slice(&output).map_err(|e| PluginError::InvalidJson(entry.to_path_buf(), e))?;

    let cases = value.as_array().ok_or_else(|| PluginError::MalformedCases(value.to_string()))?;
    cases
        .iter()
        .map(|case| {
            let inputs = case.as_array().ok_or_else(|| PluginError::MalformedCases(value.to_string()))?;
            inputs
                .iter()
                .map(|input| {
                    input
                        .as_str()
                        .map(PathBuf::from)
                        .ok_or_else(|| PluginError::MalformedCases(value.to_string()))
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
#[path = "trampoline_tests.rs"]
mod tests;
