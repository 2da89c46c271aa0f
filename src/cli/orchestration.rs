//! Request workflows behind the `check`, `in` and `out` commands
//!
//! Each workflow takes a parsed request plus the runner git goes through and
//! returns the response payload. Reading stdin, writing stdout and the exit
//! status stay in `main.rs`.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::boundary::BoundaryWarning;
use crate::bump::BumpOrchestrator;
use crate::check::CheckEngine;
use crate::config::{RepositoryConfig, Settings};
use crate::credentials::CredentialScope;
use crate::domain::{BumpPolicy, CommitRef, VersionRecord};
use crate::error::{ResourceError, Result};
use crate::git::{CommandRunner, RepositorySync, Workspace};
use crate::models::{
    CheckRequest, InRequest, MetadataField, OutRequest, Version, VersionParams, VersionResponse,
};
use crate::store::VersionStore;

/// Files written into the `in` destination, each holding the version
pub const IN_FILES: [&str; 2] = ["version", "number"];

/// List versions newer than the request's baseline
///
/// An absent baseline means "everything" (`0.0.0`, no ref); an unparsable
/// baseline number is reported and treated the same way.
///
/// # Returns
/// * `Ok(Vec<Version>)` - One entry per new source commit, oldest first
/// * `Err` - Invalid source, or labeled version/ref failures
pub fn run_check<R>(request: &CheckRequest, runner: R, settings: &Settings) -> Result<Vec<Version>>
where
    R: CommandRunner + Clone,
{
    let config = RepositoryConfig::from_source(&request.source)?;
    let (baseline, baseline_ref) = baseline(request.version.as_ref());

    let mut runner = runner;
    let _credentials = prepare_runner(&config, settings, &mut runner)?;

    let store = VersionStore::new(repository(runner.clone(), &config, settings)?, &config);
    let source = repository(runner, &config, settings)?;
    let engine = CheckEngine::new(store, source, &config.source_branch);

    let found = engine.check(&baseline, &baseline_ref)?;
    info!(baseline = %baseline, found = found.len(), "check finished");

    Ok(found
        .into_iter()
        .map(|checked| Version::new(checked.version.to_string(), checked.commit.to_string()))
        .collect())
}

/// Materialize a version into `destination`
///
/// The source is validated like for `check` and `out`. The params bump, if
/// any, is applied locally only; nothing is pushed.
pub fn run_in(request: &InRequest, destination: &Path) -> Result<VersionResponse> {
    RepositoryConfig::from_source(&request.source)?;

    let raw = request.version.number.trim();
    let requested = VersionRecord::parse(raw)
        .map_err(|e| ResourceError::validation(format!("invalid version: {}", raw), Some(e)))?;

    let policy = policy_from(&request.params);
    let version = policy.apply(&requested);
    if version != requested {
        info!(from = %requested, to = %version, policy = %policy, "bumped version locally");
    }

    fs::create_dir_all(destination)?;
    for name in IN_FILES {
        fs::write(destination.join(name), version.to_string())?;
    }

    Ok(VersionResponse {
        version: request.version.clone(),
        metadata: vec![MetadataField::number(request.version.number.clone())],
    })
}

/// Bump the stored version and publish it
pub fn run_out<R>(request: &OutRequest, runner: R, settings: &Settings) -> Result<VersionResponse>
where
    R: CommandRunner + Clone,
{
    let config = RepositoryConfig::from_source(&request.source)?;
    let policy = policy_from(&request.params);

    let mut runner = runner;
    let _credentials = prepare_runner(&config, settings, &mut runner)?;

    let store = VersionStore::new(repository(runner, &config, settings)?, &config);
    let version = BumpOrchestrator::new(store)
        .with_rounds(settings.retry.rounds())
        .bump(&policy)
        .map_err(|e| e.context("error bumping version"))?;

    let number = version.to_string();
    Ok(VersionResponse {
        version: Version::new(number.clone(), ""),
        metadata: vec![MetadataField::number(number)],
    })
}

fn baseline(version: Option<&Version>) -> (VersionRecord, CommitRef) {
    let Some(version) = version else {
        return (VersionRecord::default(), CommitRef::default());
    };

    let raw = version.number.trim();
    let record = match VersionRecord::parse(raw) {
        Ok(record) => record,
        Err(_) => {
            BoundaryWarning::InvalidBaselineVersion {
                raw: raw.to_string(),
            }
            .emit();
            VersionRecord::default()
        }
    };
    (record, CommitRef::new(version.commit.trim()))
}

fn policy_from(params: &VersionParams) -> BumpPolicy {
    let (policy, recognized) = BumpPolicy::from_params(&params.bump, &params.pre);
    if !recognized {
        BoundaryWarning::UnrecognizedBump {
            bump: params.bump.clone(),
            pre: params.pre.clone(),
        }
        .emit();
    }
    policy
}

/// Stage credentials and the commit identity on `runner`
fn prepare_runner<R: CommandRunner>(
    config: &RepositoryConfig,
    settings: &Settings,
    runner: &mut R,
) -> Result<CredentialScope> {
    let scope = CredentialScope::stage(
        &config.credentials,
        config.skip_ssl_verification,
        runner,
    )?;
    for (key, value) in settings.git.identity_env() {
        runner.set_env(key, value);
    }
    Ok(scope)
}

fn repository<R: CommandRunner>(
    runner: R,
    config: &RepositoryConfig,
    settings: &Settings,
) -> Result<RepositorySync<R>> {
    Ok(
        RepositorySync::new(runner, &config.remote_uri, Workspace::temporary()?)
            .with_retry(settings.retry.push_policy())
            .with_remote_name(&settings.git.remote),
    )
}
