use cadence_common::ItemId;
use glam::Vec3;
use std::sync::Arc;

use crate::camera::Camera;
use crate::light::{DirectionalLight, PointLight, SpotLight};

/// A mesh placed in the world.
///
/// The mesh is shared; many items may draw the same one.
#[derive(Debug)]
pub struct SceneItem<M> {
    id: ItemId,
    mesh: Arc<M>,
    pub position: Vec3,
    /// Degrees about X, Y and Z.
    pub rotation: Vec3,
    pub scale: f32,
}

impl<M> SceneItem<M> {
    pub fn new(mesh: Arc<M>) -> Self {
        Self {
            id: ItemId::new(),
            mesh,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: 1.0,
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn mesh(&self) -> &M {
        &self.mesh
    }

    /// The shared handle, for placing the same mesh again.
    pub fn mesh_handle(&self) -> &Arc<M> {
        &self.mesh
    }
}

/// Everything the frame renderer draws.
#[derive(Debug)]
pub struct Scene<M> {
    pub camera: Camera,
    pub ambient_light: Vec3,
    pub point_light: PointLight,
    pub spot_light: SpotLight,
    pub directional_light: DirectionalLight,
    items: Vec<SceneItem<M>>,
}

impl<M> Default for Scene<M> {
    fn default() -> Self {
        Self {
            camera: Camera::default(),
            ambient_light: Vec3::splat(0.3),
            point_light: PointLight::default(),
            spot_light: SpotLight::default(),
            directional_light: DirectionalLight::default(),
            items: Vec::new(),
        }
    }
}

impl<M> Scene<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&mut self, item: SceneItem<M>) -> ItemId {
        let id = item.id;
        self.items.push(item);
        id
    }

    pub fn item(&self, id: ItemId) -> Option<&SceneItem<M>> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut SceneItem<M>> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub fn remove_item(&mut self, id: ItemId) -> Option<SceneItem<M>> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Items in draw order.
    pub fn items(&self) -> &[SceneItem<M>] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [SceneItem<M>] {
        &mut self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop every item and return the meshes this scene held the last
    /// reference to, each exactly once.
    pub fn teardown(&mut self) -> Vec<M> {
        let count = self.items.len();
        let meshes: Vec<M> = self
            .items
            .drain(..)
            .filter_map(|item| Arc::into_inner(item.mesh))
            .collect();
        tracing::debug!(items = count, meshes = meshes.len(), "scene torn down");
        meshes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct FakeMesh(&'static str);

    #[test]
    fn items_keep_insertion_order() {
        let mut scene = Scene::new();
        let mesh = Arc::new(FakeMesh("cube"));
        let a = scene.add_item(SceneItem::new(mesh.clone()).with_position(Vec3::X));
        let b = scene.add_item(SceneItem::new(mesh.clone()).with_position(Vec3::Y));
        let c = scene.add_item(SceneItem::new(mesh).with_position(Vec3::Z));

        let ids: Vec<_> = scene.items().iter().map(SceneItem::id).collect();
        assert_eq!(ids, vec![a, b, c]);
        assert!(Arc::ptr_eq(scene.items()[0].mesh_handle(), scene.items()[2].mesh_handle()));

        scene.remove_item(b).unwrap();
        let ids: Vec<_> = scene.items().iter().map(SceneItem::id).collect();
        assert_eq!(ids, vec![a, c]);
        assert!(scene.item(b).is_none());
    }

    #[test]
    fn item_mut_updates_in_place() {
        let mut scene = Scene::new();
        let id = scene.add_item(SceneItem::new(Arc::new(FakeMesh("cube"))));
        scene.item_mut(id).unwrap().scale = 2.5;
        assert_eq!(scene.item(id).unwrap().scale, 2.5);
    }

    #[test]
    fn teardown_returns_each_shared_mesh_once() {
        let mut scene = Scene::new();
        let cube = Arc::new(FakeMesh("cube"));
        let quad = Arc::new(FakeMesh("quad"));
        scene.add_item(SceneItem::new(cube.clone()));
        scene.add_item(SceneItem::new(quad.clone()));
        scene.add_item(SceneItem::new(cube));
        drop(quad);

        let meshes = scene.teardown();
        assert_eq!(meshes.len(), 2);
        assert!(meshes.contains(&FakeMesh("cube")));
        assert!(meshes.contains(&FakeMesh("quad")));
        assert!(scene.is_empty());
    }

    #[test]
    fn teardown_keeps_meshes_still_referenced_elsewhere() {
        let mut scene = Scene::new();
        let cube = Arc::new(FakeMesh("cube"));
        scene.add_item(SceneItem::new(cube.clone()));
        assert!(scene.teardown().is_empty());
        assert_eq!(Arc::strong_count(&cube), 1);
    }

    #[test]
    fn new_item_is_unit_scaled_at_origin() {
        let item = SceneItem::new(Arc::new(FakeMesh("cube")));
        assert_eq!(item.position, Vec3::ZERO);
        assert_eq!(item.rotation, Vec3::ZERO);
        assert_eq!(item.scale, 1.0);
        assert_eq!(item.mesh(), &FakeMesh("cube"));
    }
}
