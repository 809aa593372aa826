//! One-shot pass over a freshly spawned scene instance.
//!
//! `post_process_scene` runs as soon as the instance is ready: it clones and
//! accents materials, tags named nodes and attaches outlines. Lights and
//! interaction zones need world bounds, which only exist after transform
//! propagation and bounds calculation, so `build_pending_rigs` finishes the
//! job on a later frame.

use std::collections::HashMap;

use bevy::pbr::NotShadowCaster;
use bevy::prelude::*;
use bevy::render::primitives::Aabb;

use super::bounds::WorldBounds;
use super::materials::{accent_material, neon_tube, outline_material, screen_glow};
use super::tags::{NodeTagger, NodeTags};
use super::{
    ComputerAnchor, InteractionZone, InteractiveMesh, OutlineMesh, PostProcessed, SceneReady,
    ScreenSurface,
};
use crate::config::WorkshopSettings;
use crate::flicker::{FlickerAnimator, FlickerSeed, NeonFlicker, TubeLightRig};

/// A tagged node waiting for its world bounds.
#[derive(Clone, Debug)]
pub struct PendingNode {
    pub node: Entity,
    pub tags: NodeTags,
    pub meshes: Vec<Entity>,
    pub tube_materials: Vec<Handle<StandardMaterial>>,
    pub tube_emissive: LinearRgba,
}

#[derive(Component, Clone, Debug, Default)]
pub struct PendingRig {
    pub nodes: Vec<PendingNode>,
}

/// Depth-first list of `root` and everything below it.
fn descendants(root: Entity, children: &Query<&Children>) -> Vec<Entity> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(entity) = stack.pop() {
        out.push(entity);
        if let Ok(kids) = children.get(entity) {
            stack.extend(kids.iter().rev().copied());
        }
    }
    out
}

#[allow(clippy::too_many_arguments)]
pub fn post_process_scene(
    mut commands: Commands,
    settings: Res<WorkshopSettings>,
    roots: Query<Entity, (With<SceneReady>, Without<PostProcessed>)>,
    children: Query<&Children>,
    parents: Query<&Parent>,
    names: Query<&Name>,
    meshes: Query<(&Mesh3d, &MeshMaterial3d<StandardMaterial>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let lighting = &settings.lighting;
    let tagger = NodeTagger::new(settings.identifiers.clone());

    for root in &roots {
        let walk = descendants(root, &children);

        // Per-instance material copies, shared between meshes that shared the original.
        let mut accented: HashMap<AssetId<StandardMaterial>, Handle<StandardMaterial>> =
            HashMap::new();
        let mut mesh_materials: HashMap<Entity, Handle<StandardMaterial>> = HashMap::new();
        for &entity in &walk {
            let Ok((_, material)) = meshes.get(entity) else {
                continue;
            };
            let handle = match accented.get(&material.0.id()) {
                Some(handle) => handle.clone(),
                None => {
                    let mut copy = materials.get(&material.0).cloned().unwrap_or_default();
                    accent_material(&mut copy, &lighting.accent);
                    let handle = materials.add(copy);
                    accented.insert(material.0.id(), handle.clone());
                    handle
                }
            };
            mesh_materials.insert(entity, handle);
        }

        // Mesh primitives are tagged by their own name, else by their glTF node's name.
        let mut pending: Vec<PendingNode> = Vec::new();
        let mut outline: Option<Handle<StandardMaterial>> = None;
        for &entity in &walk {
            let Ok((mesh, _)) = meshes.get(entity) else {
                continue;
            };
            let Some(accent_handle) = mesh_materials.get(&entity).cloned() else {
                continue;
            };
            let Some((node, tags)) = resolve_node(entity, &names, &parents, &tagger) else {
                commands
                    .entity(entity)
                    .insert(MeshMaterial3d(accent_handle));
                continue;
            };

            let index = match pending.iter().position(|p| p.node == node) {
                Some(index) => index,
                None => {
                    commands.entity(node).insert(tags);
                    pending.push(PendingNode {
                        node,
                        tags,
                        meshes: Vec::new(),
                        tube_materials: Vec::new(),
                        tube_emissive: LinearRgba::BLACK,
                    });
                    pending.len() - 1
                }
            };
            let entry = &mut pending[index];
            entry.meshes.push(entity);

            let mut entity_commands = commands.entity(entity);
            if tags.screen || tags.tube_light {
                let mut own = materials.get(&accent_handle).cloned().unwrap_or_default();
                if tags.screen {
                    let screen = &lighting.screen;
                    screen_glow(&mut own, screen.emissive, screen.emissive_strength);
                    entity_commands.insert(ScreenSurface);
                } else {
                    entry.tube_emissive = neon_tube(
                        &mut own,
                        lighting.tube.base_color,
                        lighting.tube.emissive,
                        lighting.tube.emissive_strength,
                    );
                }
                let handle = materials.add(own);
                if tags.tube_light {
                    entry.tube_materials.push(handle.clone());
                }
                entity_commands.insert(MeshMaterial3d(handle));
            } else {
                entity_commands.insert(MeshMaterial3d(accent_handle));
            }

            if tags.interactive {
                let outline = outline
                    .get_or_insert_with(|| materials.add(outline_material()))
                    .clone();
                entity_commands
                    .insert(InteractiveMesh { node })
                    .with_children(|parent| {
                        parent.spawn((
                            OutlineMesh { source: entity },
                            Mesh3d(mesh.0.clone()),
                            MeshMaterial3d(outline),
                            Transform::from_scale(Vec3::splat(lighting.outline_scale)),
                            Visibility::Hidden,
                            NotShadowCaster,
                        ));
                    });
            }
        }

        debug!(
            "scene {root}: {} materials accented, {} tagged nodes",
            accented.len(),
            pending.len()
        );
        commands
            .entity(root)
            .insert((PostProcessed, PendingRig { nodes: pending }));
    }
}

fn resolve_node(
    entity: Entity,
    names: &Query<&Name>,
    parents: &Query<&Parent>,
    tagger: &NodeTagger,
) -> Option<(Entity, NodeTags)> {
    let own = names
        .get(entity)
        .ok()
        .map(|name| (entity, tagger.classify(name.as_str())));
    let parent = parents.get(entity).ok().and_then(|parent| {
        names
            .get(parent.get())
            .ok()
            .map(|name| (parent.get(), tagger.classify(name.as_str())))
    });
    own.into_iter()
        .chain(parent)
        .find(|(_, tags)| tags.any())
}

/// Spawns lights and zones for tagged nodes once every mesh has bounds.
pub fn build_pending_rigs(
    mut commands: Commands,
    settings: Res<WorkshopSettings>,
    seed: Option<Res<FlickerSeed>>,
    mut anchor: ResMut<ComputerAnchor>,
    roots: Query<(Entity, &PendingRig, &GlobalTransform)>,
    bounds: Query<(&GlobalTransform, &Aabb)>,
) {
    let seed = seed.and_then(|s| s.0);
    let lighting = &settings.lighting;

    'roots: for (root, rig, root_transform) in &roots {
        let mut node_bounds = Vec::with_capacity(rig.nodes.len());
        for pending in &rig.nodes {
            let mut union: Option<WorldBounds> = None;
            for &mesh in &pending.meshes {
                let Ok((transform, aabb)) = bounds.get(mesh) else {
                    continue 'roots;
                };
                let world = WorldBounds::from_aabb(transform, aabb);
                union = Some(union.map_or(world, |u| u.union(world)));
            }
            node_bounds.push(union);
        }

        let to_local = root_transform.compute_matrix().inverse();
        let local = |world: Transform| Transform::from_matrix(to_local * world.compute_matrix());

        for (pending, world) in rig.nodes.iter().zip(node_bounds) {
            let Some(world) = world else {
                continue;
            };
            let center = world.center();
            let tags = pending.tags;

            if tags.anchor && anchor.0.is_none() {
                anchor.0 = Some(center);
                info!("computer anchor at {center:?}");
            }

            if tags.interactive {
                let zone = world.scaled(lighting.zone_scale);
                commands.entity(root).with_children(|parent| {
                    parent.spawn((
                        InteractionZone {
                            source: pending.node,
                            center: zone.center(),
                            half_extents: zone.half_extents(),
                        },
                        local(Transform::from_translation(zone.center())),
                    ));
                });
            }

            if tags.screen {
                let screen = &lighting.screen;
                let front = center + Vec3::Z * screen.forward_offset;
                commands.entity(root).with_children(|parent| {
                    parent.spawn((
                        PointLight {
                            color: Color::WHITE,
                            intensity: screen.main_intensity,
                            range: screen.main_range,
                            shadows_enabled: true,
                            ..default()
                        },
                        local(Transform::from_translation(front)),
                    ));
                    for i in 0..screen.area_count {
                        let offset = Vec3::new(
                            (i as f32 - 1.0) * screen.area_spacing,
                            (i as f32).cos() * screen.area_lift,
                            0.0,
                        );
                        parent.spawn((
                            PointLight {
                                color: Color::WHITE,
                                intensity: screen.area_intensity,
                                range: screen.area_range,
                                ..default()
                            },
                            local(Transform::from_translation(front + offset)),
                        ));
                    }
                });
            }

            if tags.tube_light {
                spawn_tube_rig(&mut commands, root, pending, center, &settings, seed, &local);
            }
        }

        commands.entity(root).remove::<PendingRig>();
    }
}

fn spawn_tube_rig(
    commands: &mut Commands,
    root: Entity,
    pending: &PendingNode,
    center: Vec3,
    settings: &WorkshopSettings,
    seed: Option<u64>,
    local: &dyn Fn(Transform) -> Transform,
) {
    let tube = &settings.lighting.tube;
    let baselines = &settings.flicker.baselines;
    let color = Color::srgb_u8(tube.light_color[0], tube.light_color[1], tube.light_color[2]);

    let mut main = Entity::PLACEHOLDER;
    let mut area = Vec::with_capacity(tube.area_count);
    let mut fill = Entity::PLACEHOLDER;
    commands.entity(root).with_children(|parent| {
        main = parent
            .spawn((
                PointLight {
                    color,
                    intensity: baselines.main_intensity,
                    range: tube.main_range,
                    shadows_enabled: true,
                    ..default()
                },
                local(Transform::from_translation(center)),
            ))
            .id();
        for i in 0..tube.area_count {
            let offset = Vec3::new(
                (i as f32 - 2.0) * tube.area_spacing,
                (i as f32).sin() * tube.area_lift,
                0.0,
            );
            area.push(
                parent
                    .spawn((
                        PointLight {
                            color,
                            intensity: baselines.area_intensity,
                            range: tube.area_range,
                            ..default()
                        },
                        local(Transform::from_translation(center + offset)),
                    ))
                    .id(),
            );
        }
        // Straight down; Z is up for the look rotation.
        let aim = Transform::from_translation(center + Vec3::Y * tube.fill_height)
            .looking_at(center - Vec3::Y * tube.fill_drop, Vec3::Z);
        fill = parent
            .spawn((
                DirectionalLight {
                    color,
                    illuminance: baselines.fill_illuminance,
                    ..default()
                },
                local(aim),
            ))
            .id();
    });

    info!("tube light rig built with {} area lights", area.len());
    commands.entity(pending.node).insert((
        TubeLightRig {
            main,
            area,
            fill,
            materials: pending.tube_materials.clone(),
            emissive: pending.tube_emissive,
        },
        NeonFlicker::new(FlickerAnimator::with_seed(settings.flicker.clone(), seed)),
    ));
}
