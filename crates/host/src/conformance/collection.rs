use std::future::Future;

use super::{host_err, TestResult};
use crate::{HostError, HostGraph};

pub(super) async fn run_collection_tests<G, F, Fut>(factory: &F) -> Vec<TestResult>
where
    G: HostGraph,
    F: Fn() -> Fut,
    Fut: Future<Output = G>,
{
    vec![
        TestResult::from_result(
            "collection",
            "new_collection_has_one_default_mode",
            new_collection_has_one_default_mode(factory).await,
        ),
        TestResult::from_result(
            "collection",
            "collections_listed_in_creation_order",
            collections_listed_in_creation_order(factory).await,
        ),
        TestResult::from_result(
            "collection",
            "add_mode_appends",
            add_mode_appends(factory).await,
        ),
        TestResult::from_result(
            "collection",
            "rename_mode_keeps_id",
            rename_mode_keeps_id(factory).await,
        ),
        TestResult::from_result(
            "collection",
            "add_mode_to_unknown_collection_fails",
            add_mode_to_unknown_collection_fails(factory).await,
        ),
    ]
}

async fn new_collection_has_one_default_mode<G, F, Fut>(factory: &F) -> Result<(), String>
where
    G: HostGraph,
    F: Fn() -> Fut,
    Fut: Future<Output = G>,
{
    let g = factory().await;
    let c = g.create_collection("colors").await.map_err(host_err)?;
    if c.modes.len() != 1 {
        return Err(format!("expected 1 mode, got {}", c.modes.len()));
    }
    if c.modes[0].mode_id != c.default_mode_id {
        return Err("default_mode_id does not name the only mode".to_string());
    }
    Ok(())
}

async fn collections_listed_in_creation_order<G, F, Fut>(factory: &F) -> Result<(), String>
where
    G: HostGraph,
    F: Fn() -> Fut,
    Fut: Future<Output = G>,
{
    let g = factory().await;
    g.create_collection("first").await.map_err(host_err)?;
    g.create_collection("second").await.map_err(host_err)?;
    let names: Vec<String> = g
        .list_collections()
        .await
        .map_err(host_err)?
        .into_iter()
        .map(|c| c.name)
        .collect();
    if names != ["first", "second"] {
        return Err(format!("unexpected order: {:?}", names));
    }
    Ok(())
}

async fn add_mode_appends<G, F, Fut>(factory: &F) -> Result<(), String>
where
    G: HostGraph,
    F: Fn() -> Fut,
    Fut: Future<Output = G>,
{
    let g = factory().await;
    let c = g.create_collection("colors").await.map_err(host_err)?;
    let dark = g.add_mode(&c.id, "dark").await.map_err(host_err)?;
    let listed = g.list_collections().await.map_err(host_err)?;
    let modes = &listed[0].modes;
    if modes.len() != 2 || modes[1].mode_id != dark.mode_id || modes[1].name != "dark" {
        return Err(format!("unexpected modes after add: {:?}", modes));
    }
    if modes[0].mode_id == dark.mode_id {
        return Err("new mode reused the default mode id".to_string());
    }
    Ok(())
}

async fn rename_mode_keeps_id<G, F, Fut>(factory: &F) -> Result<(), String>
where
    G: HostGraph,
    F: Fn() -> Fut,
    Fut: Future<Output = G>,
{
    let g = factory().await;
    let c = g.create_collection("colors").await.map_err(host_err)?;
    g.rename_mode(&c.id, &c.default_mode_id, "light")
        .await
        .map_err(host_err)?;
    let listed = g.list_collections().await.map_err(host_err)?;
    let mode = listed[0]
        .mode(&c.default_mode_id)
        .ok_or("renamed mode disappeared")?;
    if mode.name != "light" {
        return Err(format!("expected name 'light', got '{}'", mode.name));
    }
    Ok(())
}

async fn add_mode_to_unknown_collection_fails<G, F, Fut>(factory: &F) -> Result<(), String>
where
    G: HostGraph,
    F: Fn() -> Fut,
    Fut: Future<Output = G>,
{
    let g = factory().await;
    match g.add_mode("no-such-collection", "dark").await {
        Err(HostError::CollectionNotFound { .. }) => Ok(()),
        other => Err(format!("expected CollectionNotFound, got {:?}", other)),
    }
}
