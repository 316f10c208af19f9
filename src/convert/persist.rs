use super::export::{BlockPlan, plan_export};
use super::import::{ImportLayout, import_flowchart};
use crate::error::{PersistError, RemoteError};
use crate::graph::GraphState;
use crate::remote::{BlockApi, SequenceRequest};
use crate::timing::TimingPolicy;
use ahash::AHashMap;

/// How a save treats blocks that already exist remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveMode {
    /// A new flowchart: blocks are only created.
    Create,
    /// An edited flowchart: the listed blocks are deleted first, and the new
    /// order is written with a final sequence call.
    Replace { previous_block_ids: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SaveReport {
    /// Remote ids in creation order.
    pub created: Vec<String>,
    /// Node id to remote id.
    pub id_map: AHashMap<String, String>,
    pub deleted: usize,
    /// Blocks whose references were filled in by an edit call after creation.
    pub patched: usize,
}

/// A flowchart loaded from the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedFlowchart {
    pub name: String,
    pub state: GraphState,
    /// The remote ids of the loaded blocks, needed for a later replace save.
    pub block_ids: Vec<String>,
}

/// Persists `state` as the blocks of `flowchart_id`.
///
/// Calls are issued strictly one after another. The first failing call aborts
/// the save; blocks created before it stay on the backend and are listed in
/// the error. Previous blocks the backend no longer knows are skipped.
pub async fn save_flowchart(
    api: &dyn BlockApi,
    flowchart_id: &str,
    name: &str,
    state: &GraphState,
    mode: &SaveMode,
) -> Result<SaveReport, PersistError> {
    let plan = plan_export(state)?;
    let mut report = SaveReport::default();

    if let SaveMode::Replace { previous_block_ids } = mode {
        for block_id in previous_block_ids {
            match api.delete_block(block_id).await {
                Ok(()) => report.deleted += 1,
                Err(RemoteError::NotFound(_)) => {
                    tracing::warn!(block = %block_id, "previous block already gone, skipping delete");
                }
                Err(source) => return Err(remote_failure("delete_block", &report, source)),
            }
        }
    }

    let mut deferred: Vec<&BlockPlan> = Vec::new();
    for block in &plan.blocks {
        let (request, pending) = block.resolve(&report.id_map);
        let created = api
            .create_block(flowchart_id, &request)
            .await
            .map_err(|source| remote_failure("create_block", &report, source))?;
        tracing::debug!(node = %block.node_id, block = %created.id, "block created");
        if !pending.is_empty() {
            tracing::debug!(node = %block.node_id, pending = ?pending, "references deferred");
            deferred.push(block);
        }
        report.id_map.insert(block.node_id.clone(), created.id.clone());
        report.created.push(created.id);
    }

    for block in deferred {
        let (request, pending) = block.resolve(&report.id_map);
        if !pending.is_empty() {
            // Every node of the plan has been created by now.
            tracing::warn!(node = %block.node_id, pending = ?pending, "references still unresolved");
        }
        let Some(remote_id) = report.id_map.get(&block.node_id).cloned() else {
            continue;
        };
        api.update_block(&remote_id, &request)
            .await
            .map_err(|source| remote_failure("update_block", &report, source))?;
        report.patched += 1;
    }

    if matches!(mode, SaveMode::Replace { .. }) {
        let sequence = SequenceRequest {
            name: name.to_string(),
            ordered_ids: report.created.clone(),
        };
        api.set_flowchart_sequence(flowchart_id, &sequence)
            .await
            .map_err(|source| remote_failure("set_flowchart_sequence", &report, source))?;
    }

    tracing::info!(
        flowchart = %flowchart_id,
        created = report.created.len(),
        deleted = report.deleted,
        patched = report.patched,
        "flowchart saved"
    );
    Ok(report)
}

/// Fetches a flowchart and turns it into an editor graph.
pub async fn load_flowchart(
    api: &dyn BlockApi,
    flowchart_id: &str,
    policy: &TimingPolicy,
    layout: &ImportLayout,
) -> Result<LoadedFlowchart, PersistError> {
    let flowchart = api
        .get_flowchart(flowchart_id)
        .await
        .map_err(|source| PersistError::Remote {
            operation: "get_flowchart",
            created: Vec::new(),
            source,
        })?;
    let state = import_flowchart(&flowchart, policy, layout)?;
    tracing::info!(flowchart = %flowchart_id, blocks = flowchart.blocks.len(), "flowchart loaded");
    Ok(LoadedFlowchart {
        block_ids: flowchart.blocks.iter().map(|b| b.id.clone()).collect(),
        name: flowchart.name,
        state,
    })
}

fn remote_failure(operation: &'static str, report: &SaveReport, source: RemoteError) -> PersistError {
    tracing::error!(operation, created = report.created.len(), error = %source, "save aborted");
    PersistError::Remote {
        operation,
        created: report.created.clone(),
        source,
    }
}
