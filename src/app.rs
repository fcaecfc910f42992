// Copyright (c) 2025 - Cowboy AI, Inc.
//! App - the root of a cloud assembly
//!
//! Holds every declared stack and writes them out as a cloud assembly: one
//! `<stack>.template.json` per stack plus a `manifest.json` listing them.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::errors::{SynthError, SynthResult};
use crate::stack::Stack;

/// Cloud assembly manifest schema version
pub const MANIFEST_VERSION: &str = "36.0.0";

/// Artifact type of a CloudFormation stack in the manifest
pub const STACK_ARTIFACT_TYPE: &str = "aws:cloudformation:stack";

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Default)]
pub struct App {
    stacks: BTreeMap<String, Stack>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fully declared stack; names are unique within an app
    pub fn add_stack(&mut self, stack: Stack) -> SynthResult<()> {
        if self.stacks.contains_key(stack.name()) {
            return Err(SynthError::Configuration(format!(
                "stack {} already exists",
                stack.name()
            )));
        }
        self.stacks.insert(stack.name().to_string(), stack);
        Ok(())
    }

    pub fn stack(&self, name: &str) -> SynthResult<&Stack> {
        self.stacks
            .get(name)
            .ok_or_else(|| SynthError::StackNotFound(name.to_string()))
    }

    pub fn stacks(&self) -> impl Iterator<Item = &Stack> {
        self.stacks.values()
    }

    /// Render every stack into `out_dir`
    ///
    /// All templates are validated before anything is written.
    pub fn synth(&self, out_dir: impl AsRef<Path>) -> SynthResult<CloudAssembly> {
        let out_dir = out_dir.as_ref();

        let rendered = self
            .stacks
            .values()
            .map(|stack| -> SynthResult<_> {
                Ok((stack, serde_json::to_string_pretty(&stack.synth()?)?))
            })
            .collect::<SynthResult<Vec<_>>>()?;

        fs::create_dir_all(out_dir)?;

        let mut manifest = Manifest {
            version: MANIFEST_VERSION,
            artifacts: BTreeMap::new(),
        };
        let mut templates = BTreeMap::new();

        for (stack, template) in rendered {
            let file_name = template_file_name(stack.name());
            let path = out_dir.join(&file_name);
            fs::write(&path, template)?;
            info!("Wrote {} to {}", stack.name(), path.display());

            manifest.artifacts.insert(
                stack.name().to_string(),
                Artifact {
                    artifact_type: STACK_ARTIFACT_TYPE,
                    environment: stack.environment().to_string(),
                    properties: ArtifactProperties {
                        template_file: file_name,
                    },
                },
            );
            templates.insert(stack.name().to_string(), path);
        }

        fs::write(
            out_dir.join(MANIFEST_FILE),
            serde_json::to_string_pretty(&manifest)?,
        )?;

        Ok(CloudAssembly {
            directory: out_dir.to_path_buf(),
            templates,
        })
    }
}

pub fn template_file_name(stack_name: &str) -> String {
    format!("{}.template.json", stack_name)
}

/// Files written by [`App::synth`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudAssembly {
    pub directory: PathBuf,
    pub templates: BTreeMap<String, PathBuf>,
}

impl CloudAssembly {
    pub fn template_path(&self, stack_name: &str) -> Option<&Path> {
        self.templates.get(stack_name).map(PathBuf::as_path)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.directory.join(MANIFEST_FILE)
    }
}

#[derive(Debug, Serialize)]
struct Manifest {
    version: &'static str,
    artifacts: BTreeMap<String, Artifact>,
}

#[derive(Debug, Serialize)]
struct Artifact {
    #[serde(rename = "type")]
    artifact_type: &'static str,
    environment: String,
    properties: ArtifactProperties,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactProperties {
    template_file: String,
}
