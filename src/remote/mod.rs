//! The remote block API the editor persists to.
//!
//! Only the shape of the calls is fixed here. A concrete HTTP client lives
//! outside this crate; [`InMemoryBlockApi`] implements the same contract in
//! process.

use crate::error::RemoteError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

mod memory;

pub use memory::{ApiCall, InMemoryBlockApi};

/// The content of one block as the backend stores it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message_purpose: String,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub data_collection: Vec<String>,
    /// The branching question. `Some` only for blocks with a condition.
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub previous_message_block_id: Option<String>,
    #[serde(default)]
    pub positive_block_id: Option<String>,
    #[serde(default)]
    pub negative_block_id: Option<String>,
    #[serde(default)]
    pub is_first_message: bool,
    #[serde(default)]
    pub is_last_message: bool,
    #[serde(default)]
    pub interval: u32,
    #[serde(default)]
    pub max_wait: u32,
}

/// A persisted block with its backend-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteBlock {
    pub id: String,
    #[serde(flatten)]
    pub block: BlockRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Flowchart {
    pub name: String,
    pub blocks: Vec<RemoteBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedBlock {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceRequest {
    pub name: String,
    pub ordered_ids: Vec<String>,
}

#[async_trait]
pub trait BlockApi: Send + Sync {
    async fn create_block(
        &self,
        flowchart_id: &str,
        request: &BlockRequest,
    ) -> Result<CreatedBlock, RemoteError>;

    /// Replaces the content of an existing block.
    async fn update_block(&self, block_id: &str, request: &BlockRequest)
    -> Result<(), RemoteError>;

    async fn delete_block(&self, block_id: &str) -> Result<(), RemoteError>;

    async fn set_flowchart_sequence(
        &self,
        flowchart_id: &str,
        sequence: &SequenceRequest,
    ) -> Result<(), RemoteError>;

    async fn get_flowchart(&self, flowchart_id: &str) -> Result<Flowchart, RemoteError>;
}
