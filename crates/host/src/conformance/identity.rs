use std::future::Future;

use super::{host_err, TestResult};
use crate::{HostGraph, ValueKind};

pub(super) async fn run_identity_tests<G, F, Fut>(factory: &F) -> Vec<TestResult>
where
    G: HostGraph,
    F: Fn() -> Fut,
    Fut: Future<Output = G>,
{
    vec![
        TestResult::from_result(
            "identity",
            "origins_start_empty",
            origins_start_empty(factory).await,
        ),
        TestResult::from_result(
            "identity",
            "origins_survive_renames",
            origins_survive_renames(factory).await,
        ),
        TestResult::from_result(
            "identity",
            "source_identity_round_trips",
            source_identity_round_trips(factory).await,
        ),
    ]
}

async fn origins_start_empty<G, F, Fut>(factory: &F) -> Result<(), String>
where
    G: HostGraph,
    F: Fn() -> Fut,
    Fut: Future<Output = G>,
{
    let g = factory().await;
    let c = g.create_collection("colors").await.map_err(host_err)?;
    let v = g
        .create_variable("x", &c.id, ValueKind::String)
        .await
        .map_err(host_err)?;
    if c.original_id.is_some() || c.modes[0].original_id.is_some() || v.original_id.is_some() {
        return Err("fresh entities must not carry an origin".to_string());
    }
    if g.source_identity().await.map_err(host_err)?.is_some() {
        return Err("fresh graph must not carry a source identity".to_string());
    }
    Ok(())
}

async fn origins_survive_renames<G, F, Fut>(factory: &F) -> Result<(), String>
where
    G: HostGraph,
    F: Fn() -> Fut,
    Fut: Future<Output = G>,
{
    let g = factory().await;
    let c = g.create_collection("colors").await.map_err(host_err)?;
    let v = g
        .create_variable("x", &c.id, ValueKind::String)
        .await
        .map_err(host_err)?;
    g.set_collection_origin(&c.id, "col-1")
        .await
        .map_err(host_err)?;
    g.set_mode_origin(&c.id, &c.default_mode_id, "mode-1")
        .await
        .map_err(host_err)?;
    g.set_variable_origin(&v.id, "V1").await.map_err(host_err)?;
    g.rename_mode(&c.id, &c.default_mode_id, "light")
        .await
        .map_err(host_err)?;
    g.rename_variable(&v.id, "y").await.map_err(host_err)?;

    let collections = g.list_collections().await.map_err(host_err)?;
    let variables = g.list_variables().await.map_err(host_err)?;
    if collections[0].original_id.as_deref() != Some("col-1") {
        return Err("collection origin lost".to_string());
    }
    if collections[0].modes[0].original_id.as_deref() != Some("mode-1") {
        return Err("mode origin lost after rename".to_string());
    }
    if variables[0].original_id.as_deref() != Some("V1") {
        return Err("variable origin lost after rename".to_string());
    }
    Ok(())
}

async fn source_identity_round_trips<G, F, Fut>(factory: &F) -> Result<(), String>
where
    G: HostGraph,
    F: Fn() -> Fut,
    Fut: Future<Output = G>,
{
    let g = factory().await;
    g.set_source_identity("file-abc").await.map_err(host_err)?;
    match g.source_identity().await.map_err(host_err)? {
        Some(id) if id == "file-abc" => Ok(()),
        other => Err(format!("expected Some(\"file-abc\"), got {:?}", other)),
    }
}
