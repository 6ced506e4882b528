use std::future::Future;

use super::{host_err, TestResult};
use crate::{HostError, HostGraph, HostValue, Rgba, ValueKind};

pub(super) async fn run_variable_tests<G, F, Fut>(factory: &F) -> Vec<TestResult>
where
    G: HostGraph,
    F: Fn() -> Fut,
    Fut: Future<Output = G>,
{
    vec![
        TestResult::from_result(
            "variable",
            "created_variable_is_listed_without_values",
            created_variable_is_listed_without_values(factory).await,
        ),
        TestResult::from_result(
            "variable",
            "values_are_per_mode",
            values_are_per_mode(factory).await,
        ),
        TestResult::from_result(
            "variable",
            "wrong_kind_is_rejected",
            wrong_kind_is_rejected(factory).await,
        ),
        TestResult::from_result(
            "variable",
            "alias_accepted_for_any_kind",
            alias_accepted_for_any_kind(factory).await,
        ),
        TestResult::from_result(
            "variable",
            "value_for_foreign_mode_is_rejected",
            value_for_foreign_mode_is_rejected(factory).await,
        ),
        TestResult::from_result(
            "variable",
            "rename_variable_keeps_id",
            rename_variable_keeps_id(factory).await,
        ),
    ]
}

async fn created_variable_is_listed_without_values<G, F, Fut>(factory: &F) -> Result<(), String>
where
    G: HostGraph,
    F: Fn() -> Fut,
    Fut: Future<Output = G>,
{
    let g = factory().await;
    let c = g.create_collection("spacing").await.map_err(host_err)?;
    let v = g
        .create_variable("space/sm", &c.id, ValueKind::Number)
        .await
        .map_err(host_err)?;
    let listed = g.list_variables().await.map_err(host_err)?;
    let found = listed
        .iter()
        .find(|x| x.id == v.id)
        .ok_or("created variable not listed")?;
    if found.collection_id != c.id || found.kind != ValueKind::Number {
        return Err(format!("unexpected variable record: {:?}", found));
    }
    if !found.values.is_empty() {
        return Err("new variable already holds values".to_string());
    }
    Ok(())
}

async fn values_are_per_mode<G, F, Fut>(factory: &F) -> Result<(), String>
where
    G: HostGraph,
    F: Fn() -> Fut,
    Fut: Future<Output = G>,
{
    let g = factory().await;
    let c = g.create_collection("spacing").await.map_err(host_err)?;
    let compact = g.add_mode(&c.id, "compact").await.map_err(host_err)?;
    let v = g
        .create_variable("space/sm", &c.id, ValueKind::Number)
        .await
        .map_err(host_err)?;
    g.set_value_for_mode(&v.id, &c.default_mode_id, HostValue::Number(8.0))
        .await
        .map_err(host_err)?;
    g.set_value_for_mode(&v.id, &compact.mode_id, HostValue::Number(4.0))
        .await
        .map_err(host_err)?;

    let listed = g.list_variables().await.map_err(host_err)?;
    let values = &listed[0].values;
    if values.get(&c.default_mode_id) != Some(&HostValue::Number(8.0))
        || values.get(&compact.mode_id) != Some(&HostValue::Number(4.0))
    {
        return Err(format!("unexpected per-mode values: {:?}", values));
    }
    Ok(())
}

async fn wrong_kind_is_rejected<G, F, Fut>(factory: &F) -> Result<(), String>
where
    G: HostGraph,
    F: Fn() -> Fut,
    Fut: Future<Output = G>,
{
    let g = factory().await;
    let c = g.create_collection("colors").await.map_err(host_err)?;
    let v = g
        .create_variable("brand", &c.id, ValueKind::Color)
        .await
        .map_err(host_err)?;
    match g
        .set_value_for_mode(&v.id, &c.default_mode_id, HostValue::Number(1.0))
        .await
    {
        Err(HostError::KindMismatch { .. }) => Ok(()),
        other => Err(format!("expected KindMismatch, got {:?}", other)),
    }
}

async fn alias_accepted_for_any_kind<G, F, Fut>(factory: &F) -> Result<(), String>
where
    G: HostGraph,
    F: Fn() -> Fut,
    Fut: Future<Output = G>,
{
    let g = factory().await;
    let c = g.create_collection("colors").await.map_err(host_err)?;
    let base = g
        .create_variable("gray/50", &c.id, ValueKind::Color)
        .await
        .map_err(host_err)?;
    let alias = g
        .create_variable("primary", &c.id, ValueKind::Color)
        .await
        .map_err(host_err)?;
    g.set_value_for_mode(&base.id, &c.default_mode_id, HostValue::Color(Rgba::BLACK))
        .await
        .map_err(host_err)?;
    g.set_value_for_mode(
        &alias.id,
        &c.default_mode_id,
        HostValue::Alias {
            variable_id: base.id.clone(),
        },
    )
    .await
    .map_err(host_err)?;

    let listed = g.list_variables().await.map_err(host_err)?;
    let stored = listed
        .iter()
        .find(|x| x.id == alias.id)
        .and_then(|x| x.values.get(&c.default_mode_id))
        .and_then(|v| v.alias_target());
    if stored != Some(base.id.as_str()) {
        return Err(format!("alias not stored, got {:?}", stored));
    }
    Ok(())
}

async fn value_for_foreign_mode_is_rejected<G, F, Fut>(factory: &F) -> Result<(), String>
where
    G: HostGraph,
    F: Fn() -> Fut,
    Fut: Future<Output = G>,
{
    let g = factory().await;
    let a = g.create_collection("a").await.map_err(host_err)?;
    let b = g.create_collection("b").await.map_err(host_err)?;
    let v = g
        .create_variable("x", &a.id, ValueKind::Boolean)
        .await
        .map_err(host_err)?;
    match g
        .set_value_for_mode(&v.id, &b.default_mode_id, HostValue::Boolean(true))
        .await
    {
        Err(HostError::ModeNotFound { .. }) => Ok(()),
        other => Err(format!("expected ModeNotFound, got {:?}", other)),
    }
}

async fn rename_variable_keeps_id<G, F, Fut>(factory: &F) -> Result<(), String>
where
    G: HostGraph,
    F: Fn() -> Fut,
    Fut: Future<Output = G>,
{
    let g = factory().await;
    let c = g.create_collection("colors").await.map_err(host_err)?;
    let v = g
        .create_variable("primary", &c.id, ValueKind::Color)
        .await
        .map_err(host_err)?;
    g.rename_variable(&v.id, "brand/primary")
        .await
        .map_err(host_err)?;
    let listed = g.list_variables().await.map_err(host_err)?;
    match listed.iter().find(|x| x.id == v.id) {
        Some(x) if x.name == "brand/primary" => Ok(()),
        other => Err(format!("rename not applied: {:?}", other)),
    }
}
