//! The editing session a UI host drives.
//!
//! A [`FlowEditor`] owns exactly one graph plus the current selection. The host
//! forwards its input events to the `on_*` callbacks and receives an
//! [`EditorView`] after every mutation through the registered observer.

use crate::convert::{ImportLayout, SaveMode, SaveReport, load_flowchart, save_flowchart};
use crate::error::{GraphError, PersistError};
use crate::graph::FlowGraph;
use crate::model::{Edge, Handle, Node, NodeData, NodePatch, Position};
use crate::remote::BlockApi;
use crate::snapshot::FlowSnapshot;
use crate::timing::TimingPolicy;
use crate::validation::Diagnostics;
use serde::{Deserialize, Serialize};

/// Settings for a new editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    pub timing: TimingPolicy,
    /// Start a new flow with one blank start block instead of an empty canvas.
    pub seed_start_node: bool,
    pub import_origin_x: f64,
    pub import_origin_y: f64,
    pub import_spacing: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let layout = ImportLayout::default();
        Self {
            timing: TimingPolicy::default(),
            seed_start_node: true,
            import_origin_x: layout.origin.x,
            import_origin_y: layout.origin.y,
            import_spacing: layout.vertical_spacing,
        }
    }
}

impl EditorConfig {
    pub fn import_layout(&self) -> ImportLayout {
        ImportLayout {
            origin: Position::new(self.import_origin_x, self.import_origin_y),
            vertical_spacing: self.import_spacing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Node(String),
    Edge(String),
}

/// What the host renders after a mutation.
#[derive(Debug, Clone)]
pub struct EditorView<'a> {
    pub nodes: &'a [Node],
    pub edges: &'a [Edge],
    pub selected_node: Option<&'a Node>,
    pub selected_edge: Option<&'a Edge>,
    pub sidebar_open: bool,
    pub diagnostics: Diagnostics,
}

pub type Observer = Box<dyn FnMut(&EditorView<'_>) + Send>;

pub struct FlowEditor {
    name: String,
    graph: FlowGraph,
    selection: Selection,
    observer: Option<Observer>,
    /// Remote ids of the blocks this flow was last loaded from or saved as.
    persisted_block_ids: Option<Vec<String>>,
    config: EditorConfig,
}

impl FlowEditor {
    pub fn new(name: impl Into<String>, config: EditorConfig) -> Self {
        let graph = FlowGraph::builder()
            .with_timing_policy(config.timing)
            .with_seed_start_node(config.seed_start_node)
            .build();
        Self::from_graph(name, graph, None, config)
    }

    pub fn from_graph(
        name: impl Into<String>,
        graph: FlowGraph,
        persisted_block_ids: Option<Vec<String>>,
        config: EditorConfig,
    ) -> Self {
        Self {
            name: name.into(),
            graph,
            selection: Selection::None,
            observer: None,
            persisted_block_ids,
            config,
        }
    }

    /// Opens an existing flowchart for editing.
    pub async fn load(
        api: &dyn BlockApi,
        flowchart_id: &str,
        config: EditorConfig,
    ) -> Result<Self, PersistError> {
        let loaded = load_flowchart(api, flowchart_id, &config.timing, &config.import_layout()).await?;
        let graph = FlowGraph::builder()
            .with_timing_policy(config.timing)
            .with_state(loaded.state)
            .build();
        Ok(Self::from_graph(loaded.name, graph, Some(loaded.block_ids), config))
    }

    pub fn from_snapshot(snapshot: FlowSnapshot, config: EditorConfig) -> Self {
        let graph = FlowGraph::builder()
            .with_timing_policy(config.timing)
            .with_state(snapshot.state)
            .build();
        Self::from_graph(snapshot.name, graph, snapshot.persisted_block_ids, config)
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot::new(
            &self.name,
            self.graph.state().clone(),
            self.persisted_block_ids.clone(),
        )
    }

    pub fn set_observer(&mut self, observer: Observer) {
        self.observer = Some(observer);
        self.notify();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn persisted_block_ids(&self) -> Option<&[String]> {
        self.persisted_block_ids.as_deref()
    }

    pub fn view(&self) -> EditorView<'_> {
        build_view(&self.graph, &self.selection)
    }

    pub fn selected_node_data(&self) -> Option<&NodeData> {
        match &self.selection {
            Selection::Node(id) => self.graph.node(id).map(|n| &n.data),
            _ => None,
        }
    }

    pub fn on_node_click(&mut self, id: &str) -> Result<(), GraphError> {
        if self.graph.node(id).is_none() {
            return Err(GraphError::NodeNotFound(id.to_string()));
        }
        self.selection = Selection::Node(id.to_string());
        self.notify();
        Ok(())
    }

    pub fn on_edge_click(&mut self, id: &str) -> Result<(), GraphError> {
        if self.graph.edge(id).is_none() {
            return Err(GraphError::EdgeNotFound(id.to_string()));
        }
        self.selection = Selection::Edge(id.to_string());
        self.notify();
        Ok(())
    }

    pub fn on_pane_click(&mut self) {
        self.selection = Selection::None;
        self.notify();
    }

    /// Deletes whatever is selected. Does nothing without a selection.
    pub fn on_delete_key(&mut self) -> Result<(), GraphError> {
        match std::mem::take(&mut self.selection) {
            Selection::Node(id) => {
                self.graph.delete_node(&id)?;
            }
            Selection::Edge(id) => {
                self.graph.disconnect_edge(&id)?;
            }
            Selection::None => return Ok(()),
        }
        self.notify();
        Ok(())
    }

    pub fn on_connect(&mut self, source: &str, handle: Handle, target: &str) -> Result<Edge, GraphError> {
        let edge = self.graph.connect(source, handle, target)?;
        self.notify();
        Ok(edge)
    }

    pub fn on_reconnect(&mut self, edge_id: &str, target: &str) -> Result<(), GraphError> {
        self.graph.retarget_edge(edge_id, target)?;
        self.notify();
        Ok(())
    }

    /// Adds a blank block and selects it.
    pub fn add_block(&mut self, position: Position) -> String {
        let id = self.graph.create_node(position);
        self.selection = Selection::Node(id.clone());
        self.notify();
        id
    }

    pub fn on_update_node_data(&mut self, id: &str, patch: NodePatch) -> Result<(), GraphError> {
        self.graph.update_node_data(id, patch)?;
        self.notify();
        Ok(())
    }

    /// Recomputes timing for a node, discarding any manual edit.
    pub fn force_timing_update(&mut self, id: &str) -> Result<(), GraphError> {
        if self.graph.refresh_timing(id, true)? {
            self.notify();
        }
        Ok(())
    }

    pub fn add_data_field(&mut self, id: &str, field: &str) -> Result<(), GraphError> {
        let mut fields = self.data_fields(id)?;
        if fields.iter().any(|f| f == field) {
            return Ok(());
        }
        fields.push(field.to_string());
        self.replace_data_fields(id, fields)
    }

    pub fn remove_data_field(&mut self, id: &str, field: &str) -> Result<(), GraphError> {
        let mut fields = self.data_fields(id)?;
        let before = fields.len();
        fields.retain(|f| f != field);
        if fields.len() == before {
            return Ok(());
        }
        self.replace_data_fields(id, fields)
    }

    /// Persists the flow. The first save creates the blocks; later saves replace
    /// the blocks created by the previous one.
    ///
    /// When a save fails after its deletes went through, the blocks it created
    /// become the ones the next save replaces.
    pub async fn save(&mut self, api: &dyn BlockApi, flowchart_id: &str) -> Result<SaveReport, PersistError> {
        let mode = match &self.persisted_block_ids {
            Some(ids) => SaveMode::Replace {
                previous_block_ids: ids.clone(),
            },
            None => SaveMode::Create,
        };
        match save_flowchart(api, flowchart_id, &self.name, self.graph.state(), &mode).await {
            Ok(report) => {
                self.persisted_block_ids = Some(report.created.clone());
                Ok(report)
            }
            Err(err) => {
                if let PersistError::Remote {
                    operation, created, ..
                } = &err
                {
                    if *operation != "delete_block" {
                        tracing::debug!(orphans = created.len(), "tracking blocks of the failed save");
                        self.persisted_block_ids = Some(created.clone());
                    }
                }
                Err(err)
            }
        }
    }

    fn data_fields(&self, id: &str) -> Result<Vec<String>, GraphError> {
        self.graph
            .node(id)
            .map(|n| n.data.data_collection.clone())
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))
    }

    fn replace_data_fields(&mut self, id: &str, fields: Vec<String>) -> Result<(), GraphError> {
        self.graph
            .update_node_data(id, NodePatch::default().data_collection(fields))?;
        self.graph.refresh_timing(id, true)?;
        self.notify();
        Ok(())
    }

    fn notify(&mut self) {
        self.prune_selection();
        if let Some(observer) = self.observer.as_mut() {
            let view = build_view(&self.graph, &self.selection);
            observer(&view);
        }
    }

    fn prune_selection(&mut self) {
        let dangling = match &self.selection {
            Selection::Node(id) => self.graph.node(id).is_none(),
            Selection::Edge(id) => self.graph.edge(id).is_none(),
            Selection::None => false,
        };
        if dangling {
            self.selection = Selection::None;
        }
    }
}

fn build_view<'a>(graph: &'a FlowGraph, selection: &Selection) -> EditorView<'a> {
    let selected_node = match selection {
        Selection::Node(id) => graph.node(id),
        _ => None,
    };
    let selected_edge = match selection {
        Selection::Edge(id) => graph.edge(id),
        _ => None,
    };
    EditorView {
        nodes: graph.nodes(),
        edges: graph.edges(),
        selected_node,
        selected_edge,
        sidebar_open: selected_node.is_some(),
        diagnostics: Diagnostics::collect(graph.state()),
    }
}
