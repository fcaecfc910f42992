// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cloud Assembly Output Tests
//!
//! Write the assembly to a temporary directory and read it back.

mod fixtures;

use std::fs;

use alb_mtls::app::template_file_name;
use alb_mtls::{AlbMtlsStack, App};
use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use fixtures::*;

fn read_json(path: &std::path::Path) -> Result<Value> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

#[test]
fn test_synth_writes_template_and_manifest() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let (app, declared) = declare(&config())?;

    let assembly = app.synth(dir.path().join("cdk.out"))?;

    let path = assembly
        .template_path(&declared.stack_name)
        .ok_or_else(|| anyhow::anyhow!("template not written"))?;
    assert_eq!(
        path.file_name().and_then(|name| name.to_str()),
        Some(template_file_name(STACK_ID).as_str())
    );

    let written = read_json(path)?;
    assert_eq!(written, synth_default()?);

    let template = alb_mtls_assertions::Template::from_json(written)?;
    template.resource_count_is(LOAD_BALANCER, 1)?;
    template.resource_count_is(TRUST_STORE, 1)?;

    let manifest = read_json(&assembly.manifest_path())?;
    assert_eq!(manifest["version"], json!("36.0.0"));
    assert_eq!(
        manifest["artifacts"][STACK_ID],
        json!({
            "type": "aws:cloudformation:stack",
            "environment": "aws://unknown-account/unknown-region",
            "properties": { "templateFile": "MyTestStack.template.json" }
        })
    );

    Ok(())
}

#[test]
fn test_environment_lands_in_manifest() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut config = config();
    config.account = Some("123456789012".to_string());
    config.region = Some("ap-northeast-1".to_string());

    let mut app = App::new();
    AlbMtlsStack::new(&mut app, STACK_ID, &config)?;
    let assembly = app.synth(dir.path())?;

    let manifest = read_json(&assembly.manifest_path())?;
    assert_eq!(
        manifest["artifacts"][STACK_ID]["environment"],
        json!("aws://123456789012/ap-northeast-1")
    );

    Ok(())
}

#[test]
fn test_resynth_overwrites_identically() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let (app, declared) = declare(&config())?;

    let first = app.synth(dir.path())?;
    let first_text = fs::read_to_string(
        first
            .template_path(&declared.stack_name)
            .ok_or_else(|| anyhow::anyhow!("template not written"))?,
    )?;

    let second = app.synth(dir.path())?;
    let second_text = fs::read_to_string(
        second
            .template_path(&declared.stack_name)
            .ok_or_else(|| anyhow::anyhow!("template not written"))?,
    )?;

    assert_eq!(first_text, second_text);
    assert_eq!(first, second);
    Ok(())
}
