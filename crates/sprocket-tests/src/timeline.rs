//! Integration tests for the timeline engine.
//!
//! Exercises whole editing sessions against the public model API:
//! moves, resizes, grouping, long undo/redo chains, and the tree
//! projection staying consistent with the registries.

use std::collections::BTreeSet;

use sprocket_core::{FrameRate, ItemId, RationalTime};
use sprocket_timeline::{
    AttrRole, ClipSource, NodeId, TimelineModel, TrackKind,
};

// ── Helpers ────────────────────────────────────────────────────

struct Session {
    model: TimelineModel,
    v1: ItemId,
    v2: ItemId,
    a1: ItemId,
}

fn session() -> Session {
    let mut model = TimelineModel::new();
    let v1 = model.create_track(TrackKind::Video, "V1").unwrap();
    let v2 = model.create_track(TrackKind::Video, "V2").unwrap();
    let a1 = model.create_track(TrackKind::Audio, "A1").unwrap();
    Session { model, v1, v2, a1 }
}

fn media_clip(model: &mut TimelineModel, name: &str, frames: i64) -> ItemId {
    model.create_clip(name, ClipSource::new(format!("media/{name}.mp4"), frames))
}

// ── Whole-session editing ──────────────────────────────────────

#[test]
fn assemble_a_rough_cut() {
    let mut s = session();
    let intro = media_clip(&mut s.model, "intro", 120);
    let body = media_clip(&mut s.model, "body", 720);
    let outro = media_clip(&mut s.model, "outro", 240);
    let music = media_clip(&mut s.model, "music", 1100);

    assert!(s.model.request_clip_move(intro, s.v1, 0));
    assert!(s.model.request_clip_move(body, s.v1, 120));
    assert!(s.model.request_clip_move(outro, s.v1, 840));
    assert!(s.model.request_clip_move(music, s.a1, 0));

    assert_eq!(s.model.clips_count(), 4);
    assert_eq!(s.model.track_clips_count(s.v1), 3);
    assert_eq!(s.model.track_clips_count(s.a1), 1);
    assert_eq!(s.model.duration(), 1100);

    // Frame duration converts exactly at the session frame rate
    let rate = s.model.frame_rate();
    assert_eq!(rate, FrameRate::FPS_25);
    let seconds = RationalTime::from_frames(s.model.duration(), rate);
    assert_eq!(seconds.to_seconds_f64(), 44.0);
}

#[test]
fn failed_edit_leaves_no_trace_in_a_busy_session() {
    let mut s = session();
    let a = media_clip(&mut s.model, "a", 100);
    let b = media_clip(&mut s.model, "b", 100);
    assert!(s.model.request_clip_move(a, s.v1, 0));
    assert!(s.model.request_clip_move(b, s.v2, 40));

    let depth = s.model.history().undo_count();

    // Target overlaps `a`: the removal from V2 must be unwound.
    assert!(!s.model.request_clip_move(b, s.v1, 60));
    assert_eq!(s.model.clip_track(b), Some(s.v2));
    assert_eq!(s.model.clip_position(b), Some(40));
    assert_eq!(s.model.history().undo_count(), depth);

    // The rejected edit must not have poisoned later ones.
    assert!(s.model.request_clip_move(b, s.v1, 100));
    assert_eq!(s.model.clip_track(b), Some(s.v1));
}

#[test]
fn deep_undo_chain_rewinds_the_whole_session() {
    let mut s = session();
    let a = media_clip(&mut s.model, "a", 50);
    let b = media_clip(&mut s.model, "b", 50);

    assert!(s.model.request_clip_move(a, s.v1, 0));
    assert!(s.model.request_clip_move(b, s.v1, 50));
    assert!(s.model.request_clip_resize(a, 30, true));
    assert!(s.model.request_clip_move(b, s.v2, 10));
    let ids: BTreeSet<ItemId> = [a, b].into();
    let gid = s.model.request_group_clips(&ids).unwrap();

    assert_eq!(s.model.history().undo_count(), 5);

    while s.model.undo() {}

    assert_eq!(s.model.clip_track(a), None);
    assert_eq!(s.model.clip_track(b), None);
    assert_eq!(s.model.track_clips_count(s.v1), 0);
    assert_eq!(s.model.track_clips_count(s.v2), 0);
    assert!(!s.model.is_group(gid));
    assert_eq!(s.model.duration(), 0);

    while s.model.redo() {}

    assert_eq!(s.model.clip_track(a), Some(s.v1));
    assert_eq!(s.model.clip_by_id(a).unwrap().playtime(), 30);
    assert_eq!(s.model.clip_track(b), Some(s.v2));
    assert_eq!(s.model.group_parent(a), Some(gid));
    assert_eq!(s.model.group_parent(b), Some(gid));
}

#[test]
fn grouping_across_tracks_survives_moves() {
    let mut s = session();
    let video = media_clip(&mut s.model, "video", 200);
    let audio = media_clip(&mut s.model, "audio", 200);
    assert!(s.model.request_clip_move(video, s.v1, 0));
    assert!(s.model.request_clip_move(audio, s.a1, 0));

    let ids: BTreeSet<ItemId> = [video, audio].into();
    let gid = s.model.request_group_clips(&ids).unwrap();

    // Moving a member does not disturb the binding
    assert!(s.model.request_clip_move(video, s.v2, 500));
    assert_eq!(s.model.group_parent(video), Some(gid));
    assert_eq!(s.model.group_parent(audio), Some(gid));

    assert!(s.model.request_ungroup_clip(video));
    assert!(s.model.request_ungroup_clip(audio));
    assert!(!s.model.is_group(gid));
}

#[test]
fn nested_groups_unwind_one_level_at_a_time() {
    let mut s = session();
    let a = media_clip(&mut s.model, "a", 10);
    let b = media_clip(&mut s.model, "b", 10);
    let c = media_clip(&mut s.model, "c", 10);

    let inner: BTreeSet<ItemId> = [a, b].into();
    let g1 = s.model.request_group_clips(&inner).unwrap();
    let outer: BTreeSet<ItemId> = [g1, c].into();
    let g2 = s.model.request_group_clips(&outer).unwrap();

    assert_eq!(s.model.group_parent(g1), Some(g2));
    assert_eq!(s.model.group_parent(a), Some(g1));

    // Ungrouping the inner group removes exactly one level
    assert!(s.model.request_ungroup_clip(g1));
    assert_eq!(s.model.group_parent(g1), None);
    assert_eq!(s.model.group_parent(a), Some(g1));
    assert_eq!(s.model.group_parent(c), Some(g2));
}

// ── Projection consistency ─────────────────────────────────────

#[test]
fn projection_tracks_every_edit() {
    let mut s = session();
    let a = media_clip(&mut s.model, "a", 60);
    let b = media_clip(&mut s.model, "b", 60);
    assert!(s.model.request_clip_move(a, s.v1, 100));
    assert!(s.model.request_clip_move(b, s.v1, 0));

    let roots = s.model.root_nodes();
    assert_eq!(roots.len(), 3);
    assert_eq!(roots[0], NodeId::track(s.v1));

    let kids = s.model.child_nodes(NodeId::track(s.v1));
    assert_eq!(kids, vec![NodeId::clip(b), NodeId::clip(a)]);

    // Move `b` behind `a`: child order follows positions
    assert!(s.model.request_clip_move(b, s.v1, 200));
    let kids = s.model.child_nodes(NodeId::track(s.v1));
    assert_eq!(kids, vec![NodeId::clip(a), NodeId::clip(b)]);

    // Undo restores the projection too
    assert!(s.model.undo());
    let kids = s.model.child_nodes(NodeId::track(s.v1));
    assert_eq!(kids, vec![NodeId::clip(b), NodeId::clip(a)]);
}

#[test]
fn attributes_render_a_clip_without_registry_access() {
    let mut s = session();
    let a = media_clip(&mut s.model, "interview", 250);
    assert!(s.model.request_clip_move(a, s.v1, 75));
    assert!(s.model.request_clip_resize(a, 100, true));

    let n = NodeId::clip(a);
    let name = s.model.attribute(n, AttrRole::Name).unwrap();
    let start = s.model.attribute(n, AttrRole::Start).unwrap();
    let duration = s.model.attribute(n, AttrRole::Duration).unwrap();
    let resource = s.model.attribute(n, AttrRole::Resource).unwrap();
    let fps = s.model.attribute(n, AttrRole::FrameRate).unwrap();

    assert_eq!(name.as_text(), Some("interview"));
    assert_eq!(start.as_int(), Some(75));
    assert_eq!(duration.as_int(), Some(100));
    assert_eq!(resource.as_text(), Some("media/interview.mp4"));
    assert_eq!(fps.as_number(), Some(25.0));
}

// ── Structural changes ─────────────────────────────────────────

#[test]
fn deleting_a_track_keeps_clips_registered() {
    let mut s = session();
    let a = media_clip(&mut s.model, "a", 60);
    assert!(s.model.request_clip_move(a, s.v2, 0));

    assert!(s.model.delete_track(s.v2));
    assert_eq!(s.model.tracks_count(), 2);
    assert!(s.model.is_clip(a));
    assert_eq!(s.model.clip_track(a), None);

    // Rows shift up; identity does not change
    assert_eq!(s.model.track_row(s.a1), Some(1));
    assert_eq!(s.model.root_nodes(), vec![
        NodeId::track(s.v1),
        NodeId::track(s.a1),
    ]);

    // The unplaced clip can be placed again
    assert!(s.model.request_clip_move(a, s.v1, 0));
}

#[test]
fn populated_model_is_editable() {
    let mut m = TimelineModel::populated().unwrap();
    assert_eq!(m.tracks_count(), 2);
    assert_eq!(m.clips_count(), 2);

    let t1 = m.track_at_row(0).unwrap();
    let c1 = m.track_by_id(t1).unwrap().clip_by_row(0).unwrap();
    assert_eq!(m.clip_position(c1), Some(100));

    assert!(m.request_clip_move(c1, t1, 400));
    assert_eq!(m.clip_position(c1), Some(400));
    assert!(m.undo());
    assert_eq!(m.clip_position(c1), Some(100));
}

// ── Serialization smoke ────────────────────────────────────────

#[test]
fn model_value_types_serialize() {
    let mut s = session();
    let a = media_clip(&mut s.model, "a", 60);
    assert!(s.model.request_clip_move(a, s.v1, 10));

    let clip_json = serde_json::to_string(s.model.clip_by_id(a).unwrap()).unwrap();
    assert!(clip_json.contains("media/a.mp4"));

    let track_json = serde_json::to_string(s.model.track_by_id(s.v1).unwrap()).unwrap();
    assert!(track_json.contains("V1"));
}
