//! Tree projection of the timeline for observer/view layers.
//!
//! The model is exposed as a two-level tree: tracks are roots in display
//! order, clips are children ordered by position. A node's identity is
//! the composite of its item id and its structural role, never its row:
//! reordering tracks changes rows but not node identity. Rows are
//! derived values available through `node_row`/`node_at`.
//!
//! Attributes are role-keyed so a view can render tracks and clips
//! without touching the registries directly.

use serde::{Deserialize, Serialize};
use sprocket_core::ItemId;

use crate::model::TimelineModel;

/// Structural role of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Track,
    Clip,
}

/// Identity of a tree node: item id plus structural role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId {
    pub id: ItemId,
    pub kind: NodeKind,
}

impl NodeId {
    pub fn track(id: ItemId) -> Self {
        Self {
            id,
            kind: NodeKind::Track,
        }
    }

    pub fn clip(id: ItemId) -> Self {
        Self {
            id,
            kind: NodeKind::Clip,
        }
    }
}

/// Role keys a view may query on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrRole {
    Name,
    Resource,
    Service,
    Blank,
    Start,
    Duration,
    InPoint,
    OutPoint,
    FrameRate,
    Mute,
    Hidden,
    Audio,
    Locked,
    FadeIn,
    FadeOut,
    Transition,
    Hash,
    Speed,
    Height,
}

/// Attribute value for a (node, role) pair.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Text(String),
    Int(i64),
    Number(f64),
    Flag(bool),
}

impl AttrValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(v) => Some(*v),
            _ => None,
        }
    }
}

impl TimelineModel {
    /// Root nodes: tracks in display order.
    pub fn root_nodes(&self) -> Vec<NodeId> {
        self.track_order.iter().map(|&id| NodeId::track(id)).collect()
    }

    /// Children of a node: a track's clips in timeline order. Clips are
    /// leaves.
    pub fn child_nodes(&self, node: NodeId) -> Vec<NodeId> {
        match node.kind {
            NodeKind::Track => self
                .tracks
                .get(&node.id)
                .map(|t| t.placements().map(|(_, cid)| NodeId::clip(cid)).collect())
                .unwrap_or_default(),
            NodeKind::Clip => Vec::new(),
        }
    }

    /// Parent of a clip node; tracks are roots.
    pub fn parent_node(&self, node: NodeId) -> Option<NodeId> {
        match node.kind {
            NodeKind::Track => None,
            NodeKind::Clip => self.clip_track(node.id).map(NodeId::track),
        }
    }

    /// Derived display row of a node among its siblings.
    pub fn node_row(&self, node: NodeId) -> Option<usize> {
        match node.kind {
            NodeKind::Track => self.track_row(node.id),
            NodeKind::Clip => {
                let tid = self.clip_track(node.id)?;
                self.tracks.get(&tid)?.row_of_clip(node.id)
            }
        }
    }

    /// Node at a display row under `parent` (`None` = root level).
    pub fn node_at(&self, parent: Option<NodeId>, row: usize) -> Option<NodeId> {
        match parent {
            None => self.track_at_row(row).map(NodeId::track),
            Some(p) if p.kind == NodeKind::Track => self
                .tracks
                .get(&p.id)?
                .clip_by_row(row)
                .map(NodeId::clip),
            Some(_) => None,
        }
    }

    /// Role-keyed attribute of a node. `None` when the role does not
    /// apply to the node's kind.
    pub fn attribute(&self, node: NodeId, role: AttrRole) -> Option<AttrValue> {
        match node.kind {
            NodeKind::Clip => self.clip_attribute(node.id, role),
            NodeKind::Track => self.track_attribute(node.id, role),
        }
    }

    fn clip_attribute(&self, id: ItemId, role: AttrRole) -> Option<AttrValue> {
        let clip = self.clips.get(&id)?;
        let value = match role {
            AttrRole::Name => AttrValue::Text(clip.name.clone()),
            AttrRole::Resource => AttrValue::Text(clip.source.path.clone()),
            AttrRole::Service => AttrValue::Text(clip.source.service.clone()),
            AttrRole::Blank => AttrValue::Flag(false),
            AttrRole::Start => AttrValue::Int(clip.position()),
            AttrRole::Duration => AttrValue::Int(clip.playtime()),
            AttrRole::InPoint => AttrValue::Int(clip.in_point()),
            AttrRole::OutPoint => AttrValue::Int(clip.out_point()),
            AttrRole::FrameRate => AttrValue::Number(self.frame_rate.to_fps_f64()),
            AttrRole::Hidden => AttrValue::Flag(!clip.enabled),
            AttrRole::FadeIn => AttrValue::Int(clip.fade_in),
            AttrRole::FadeOut => AttrValue::Int(clip.fade_out),
            AttrRole::Transition => AttrValue::Flag(false),
            AttrRole::Hash => AttrValue::Text(clip.source.hash.clone()),
            AttrRole::Speed => AttrValue::Number(clip.speed),
            AttrRole::Mute | AttrRole::Audio | AttrRole::Locked | AttrRole::Height => return None,
        };
        Some(value)
    }

    fn track_attribute(&self, id: ItemId, role: AttrRole) -> Option<AttrValue> {
        let track = self.tracks.get(&id)?;
        let value = match role {
            AttrRole::Name => AttrValue::Text(track.name.clone()),
            AttrRole::Duration => AttrValue::Int(track.duration(&self.clips)),
            AttrRole::FrameRate => AttrValue::Number(self.frame_rate.to_fps_f64()),
            AttrRole::Mute => AttrValue::Flag(track.muted),
            AttrRole::Hidden => AttrValue::Flag(track.hidden),
            AttrRole::Audio => AttrValue::Flag(track.is_audio()),
            AttrRole::Locked => AttrValue::Flag(track.locked),
            AttrRole::Height => AttrValue::Int(track.height as i64),
            AttrRole::Blank => AttrValue::Flag(false),
            AttrRole::Start => AttrValue::Int(0),
            AttrRole::Resource
            | AttrRole::Service
            | AttrRole::InPoint
            | AttrRole::OutPoint
            | AttrRole::FadeIn
            | AttrRole::FadeOut
            | AttrRole::Transition
            | AttrRole::Hash
            | AttrRole::Speed => return None,
        };
        Some(value)
    }
}
