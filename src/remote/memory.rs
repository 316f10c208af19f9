use super::{BlockApi, BlockRequest, CreatedBlock, Flowchart, RemoteBlock, SequenceRequest};
use crate::error::RemoteError;
use ahash::AHashMap;
use async_trait::async_trait;
use parking_lot::Mutex;

/// A call received by [`InMemoryBlockApi`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Create { flowchart_id: String, block_id: String },
    Update { block_id: String },
    Delete { block_id: String },
    SetSequence { flowchart_id: String, ordered_ids: Vec<String> },
    Get { flowchart_id: String },
}

#[derive(Default)]
struct StoredFlowchart {
    name: String,
    /// Block ids in creation order.
    blocks: Vec<String>,
    sequence: Option<Vec<String>>,
}

#[derive(Default)]
struct Inner {
    flowcharts: AHashMap<String, StoredFlowchart>,
    blocks: AHashMap<String, (String, BlockRequest)>,
    next_id: u64,
    calls: Vec<ApiCall>,
    /// Number of creates that succeed before every further create fails.
    creates_before_failure: Option<usize>,
}

/// A complete in-process block backend.
#[derive(Default)]
pub struct InMemoryBlockApi {
    inner: Mutex<Inner>,
}

impl InMemoryBlockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an empty flowchart so it can be loaded and saved.
    pub fn with_flowchart(self, flowchart_id: &str, name: &str) -> Self {
        self.inner.lock().flowcharts.insert(
            flowchart_id.to_string(),
            StoredFlowchart {
                name: name.to_string(),
                ..StoredFlowchart::default()
            },
        );
        self
    }

    /// Seeds a flowchart with existing blocks, keeping their ids.
    pub fn with_blocks(self, flowchart_id: &str, name: &str, blocks: Vec<RemoteBlock>) -> Self {
        {
            let mut inner = self.inner.lock();
            let ids = blocks.iter().map(|b| b.id.clone()).collect();
            for block in blocks {
                inner
                    .blocks
                    .insert(block.id, (flowchart_id.to_string(), block.block));
            }
            inner.flowcharts.insert(
                flowchart_id.to_string(),
                StoredFlowchart {
                    name: name.to_string(),
                    blocks: ids,
                    sequence: None,
                },
            );
        }
        self
    }

    /// Makes every create call after the first `successes` fail.
    pub fn fail_creates_after(self, successes: usize) -> Self {
        self.inner.lock().creates_before_failure = Some(successes);
        self
    }

    /// Lets every further create call succeed again.
    pub fn clear_failures(&self) {
        self.inner.lock().creates_before_failure = None;
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.inner.lock().calls.clone()
    }

    pub fn block(&self, block_id: &str) -> Option<BlockRequest> {
        self.inner
            .lock()
            .blocks
            .get(block_id)
            .map(|(_, request)| request.clone())
    }

    pub fn block_count(&self) -> usize {
        self.inner.lock().blocks.len()
    }

    pub fn sequence(&self, flowchart_id: &str) -> Option<Vec<String>> {
        self.inner
            .lock()
            .flowcharts
            .get(flowchart_id)
            .and_then(|f| f.sequence.clone())
    }
}

#[async_trait]
impl BlockApi for InMemoryBlockApi {
    async fn create_block(
        &self,
        flowchart_id: &str,
        request: &BlockRequest,
    ) -> Result<CreatedBlock, RemoteError> {
        let mut inner = self.inner.lock();
        if let Some(remaining) = inner.creates_before_failure {
            if remaining == 0 {
                return Err(RemoteError::Request("create rejected".to_string()));
            }
            inner.creates_before_failure = Some(remaining - 1);
        }
        if !inner.flowcharts.contains_key(flowchart_id) {
            return Err(RemoteError::NotFound(flowchart_id.to_string()));
        }

        inner.next_id += 1;
        let id = format!("blk-{}", inner.next_id);
        inner
            .blocks
            .insert(id.clone(), (flowchart_id.to_string(), request.clone()));
        if let Some(flowchart) = inner.flowcharts.get_mut(flowchart_id) {
            flowchart.blocks.push(id.clone());
        }
        inner.calls.push(ApiCall::Create {
            flowchart_id: flowchart_id.to_string(),
            block_id: id.clone(),
        });
        Ok(CreatedBlock { id })
    }

    async fn update_block(
        &self,
        block_id: &str,
        request: &BlockRequest,
    ) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock();
        let stored = inner
            .blocks
            .get_mut(block_id)
            .ok_or_else(|| RemoteError::NotFound(block_id.to_string()))?;
        stored.1 = request.clone();
        inner.calls.push(ApiCall::Update {
            block_id: block_id.to_string(),
        });
        Ok(())
    }

    async fn delete_block(&self, block_id: &str) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock();
        let (flowchart_id, _) = inner
            .blocks
            .remove(block_id)
            .ok_or_else(|| RemoteError::NotFound(block_id.to_string()))?;
        if let Some(flowchart) = inner.flowcharts.get_mut(&flowchart_id) {
            flowchart.blocks.retain(|b| b != block_id);
            if let Some(sequence) = flowchart.sequence.as_mut() {
                sequence.retain(|b| b != block_id);
            }
        }
        inner.calls.push(ApiCall::Delete {
            block_id: block_id.to_string(),
        });
        Ok(())
    }

    async fn set_flowchart_sequence(
        &self,
        flowchart_id: &str,
        sequence: &SequenceRequest,
    ) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock();
        if let Some(missing) = sequence
            .ordered_ids
            .iter()
            .find(|id| !inner.blocks.contains_key(id.as_str()))
        {
            return Err(RemoteError::NotFound(missing.clone()));
        }
        let flowchart = inner
            .flowcharts
            .get_mut(flowchart_id)
            .ok_or_else(|| RemoteError::NotFound(flowchart_id.to_string()))?;
        flowchart.name = sequence.name.clone();
        flowchart.sequence = Some(sequence.ordered_ids.clone());
        inner.calls.push(ApiCall::SetSequence {
            flowchart_id: flowchart_id.to_string(),
            ordered_ids: sequence.ordered_ids.clone(),
        });
        Ok(())
    }

    async fn get_flowchart(&self, flowchart_id: &str) -> Result<Flowchart, RemoteError> {
        let mut inner = self.inner.lock();
        let flowchart = inner
            .flowcharts
            .get(flowchart_id)
            .ok_or_else(|| RemoteError::NotFound(flowchart_id.to_string()))?;
        let ids = flowchart.sequence.as_ref().unwrap_or(&flowchart.blocks);
        let blocks = ids
            .iter()
            .filter_map(|id| {
                inner.blocks.get(id).map(|(_, block)| RemoteBlock {
                    id: id.clone(),
                    block: block.clone(),
                })
            })
            .collect();
        let result = Flowchart {
            name: flowchart.name.clone(),
            blocks,
        };
        inner.calls.push(ApiCall::Get {
            flowchart_id: flowchart_id.to_string(),
        });
        Ok(result)
    }
}
