//! Boat model hierarchy and the asynchronous asset loader that delivers it.
//!
//! The scene only needs three things from a loaded model: the named root whose
//! subtree is drawn, a named node carrying the hull bounding box (for the
//! resting height), and a material per mesh. Anything else is ignored.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use log::{info, warn};

use crate::error::AssetError;

/// Name of the node whose subtree is the boat
pub const BOAT_ROOT: &str = "boat";

/// Name of the node carrying the hull bounding box
pub const HULL_BOUNDS: &str = "hull";

/// Fraction of the hull height that sits below the waterline
const DRAFT_FRACTION: f32 = 0.35;

/// Lit, vertex-colored mesh vertex (boat pipeline layout)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self { min: first, max: first }, |acc, p| Self {
            min: acc.min.min(p),
            max: acc.max.max(p),
        }))
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Indexed triangle mesh in model space
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Append `other`, recoloring it with `color`
    fn append_tinted(&mut self, other: &MeshData, color: [f32; 3]) {
        let base = self.vertices.len() as u32;
        self.vertices
            .extend(other.vertices.iter().map(|v| MeshVertex { color, ..*v }));
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().map(|v| Vec3::from_array(v.position)))
    }
}

/// One node of a loaded model
#[derive(Debug, Clone, Default)]
pub struct ModelNode {
    pub name: String,
    pub mesh: Option<MeshData>,
    pub material: Option<String>,
    pub bounds: Option<Aabb>,
    pub children: Vec<ModelNode>,
}

impl ModelNode {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Depth-first search for a node by name, including `self`
    pub fn find(&self, name: &str) -> Option<&ModelNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    fn visit<'a>(&'a self, out: &mut Vec<&'a ModelNode>) {
        out.push(self);
        for child in &self.children {
            child.visit(out);
        }
    }
}

/// Whatever the asset loader hands back: a tree of named nodes
#[derive(Debug, Clone)]
pub struct ModelHierarchy {
    pub root: ModelNode,
}

impl ModelHierarchy {
    pub fn find(&self, name: &str) -> Option<&ModelNode> {
        self.root.find(name)
    }
}

/// Known material names and their base colors
#[derive(Debug, Clone)]
pub struct MaterialLibrary {
    colors: HashMap<String, [f32; 3]>,
    fallback: [f32; 3],
}

impl Default for MaterialLibrary {
    fn default() -> Self {
        let colors = [
            ("hull_paint", [0.55, 0.12, 0.1]),
            ("deck_wood", [0.6, 0.42, 0.25]),
            ("cabin_white", [0.92, 0.92, 0.9]),
        ]
        .into_iter()
        .map(|(name, color)| (name.to_string(), color))
        .collect();
        Self {
            colors,
            fallback: [0.7, 0.7, 0.7],
        }
    }
}

impl MaterialLibrary {
    /// Look up a material; unknown or missing names get the default material
    pub fn resolve(&self, node: &str, material: Option<&str>) -> [f32; 3] {
        match material.and_then(|name| self.colors.get(name)) {
            Some(color) => *color,
            None => {
                warn!(
                    "Node '{}' has missing material {:?}, using default",
                    node, material
                );
                self.fallback
            }
        }
    }
}

/// A boat located inside a loaded hierarchy, ready to simulate and draw
#[derive(Debug, Clone)]
pub struct BoatModel {
    /// Merged, material-tinted mesh of the root subtree
    pub mesh: MeshData,
    /// Hull bounds in model space
    pub bounds: Aabb,
    /// Uniform model scale
    pub scale: f32,
    /// Resting height of the boat origin above the water plane
    pub base_height: f32,
}

impl BoatModel {
    /// Find the boat root and hull bounds in `hierarchy`.
    ///
    /// A missing root falls back to the hierarchy root, missing bounds are
    /// recomputed from the mesh, and missing materials use the library default;
    /// each substitution is logged. Only a root without any mesh is an error.
    pub fn locate(
        hierarchy: &ModelHierarchy,
        scale: f32,
        water_level: f32,
        materials: &MaterialLibrary,
    ) -> Result<Self, AssetError> {
        let root = match hierarchy.find(BOAT_ROOT) {
            Some(node) => node,
            None => {
                warn!(
                    "{}, falling back to '{}'",
                    AssetError::MissingNode(BOAT_ROOT.to_string()),
                    hierarchy.root.name
                );
                &hierarchy.root
            }
        };

        let mut nodes = Vec::new();
        root.visit(&mut nodes);

        let mut mesh = MeshData::default();
        for node in &nodes {
            if let Some(node_mesh) = &node.mesh {
                let color = materials.resolve(&node.name, node.material.as_deref());
                mesh.append_tinted(node_mesh, color);
            }
        }
        if mesh.vertices.is_empty() {
            return Err(AssetError::MissingMesh(root.name.clone()));
        }

        let bounds = match root.find(HULL_BOUNDS).and_then(|node| node.bounds) {
            Some(bounds) => bounds,
            None => {
                warn!(
                    "{}, deriving from mesh",
                    AssetError::MissingBounds(HULL_BOUNDS.to_string())
                );
                mesh.bounds()
                    .ok_or_else(|| AssetError::MissingBounds(root.name.clone()))?
            }
        };

        let draft = bounds.size().y * DRAFT_FRACTION;
        let base_height = water_level - (draft + bounds.min.y) * scale;

        Ok(Self {
            mesh,
            bounds,
            scale,
            base_height,
        })
    }
}

/// Source of a model that may arrive after the scene has started ticking
pub trait AssetSource {
    /// `None` while still loading; a result exactly once when done
    fn poll(&mut self) -> Option<Result<ModelHierarchy, AssetError>>;
}

/// Builds the boat hierarchy on a worker thread and delivers it over a channel
pub struct ProceduralBoatLoader {
    receiver: Option<Receiver<ModelHierarchy>>,
}

impl ProceduralBoatLoader {
    /// Start loading; `delay` simulates I/O latency
    pub fn spawn(delay: Duration) -> Self {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            thread::sleep(delay);
            let model = build_boat_hierarchy();
            // Receiver may have been dropped if the app already quit
            let _ = sender.send(model);
        });
        Self {
            receiver: Some(receiver),
        }
    }
}

impl AssetSource for ProceduralBoatLoader {
    fn poll(&mut self) -> Option<Result<ModelHierarchy, AssetError>> {
        let receiver = self.receiver.as_ref()?;
        match receiver.try_recv() {
            Ok(model) => {
                info!("Boat model loaded");
                self.receiver = None;
                Some(Ok(model))
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.receiver = None;
                Some(Err(AssetError::LoaderDisconnected))
            }
        }
    }
}

/// Flat-shaded convex solid builder
struct SolidBuilder {
    mesh: MeshData,
    center: Vec3,
}

impl SolidBuilder {
    fn new(center: Vec3) -> Self {
        Self {
            mesh: MeshData::default(),
            center,
        }
    }

    /// Add a triangle, flipping winding so the normal faces away from the center
    fn triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        let mut normal = (b - a).cross(c - a).normalize_or_zero();
        let (b, c) = if normal.dot((a + b + c) / 3.0 - self.center) < 0.0 {
            normal = -normal;
            (c, b)
        } else {
            (b, c)
        };
        let base = self.mesh.vertices.len() as u32;
        for p in [a, b, c] {
            self.mesh.vertices.push(MeshVertex {
                position: p.to_array(),
                normal: normal.to_array(),
                color: [1.0; 3],
            });
        }
        self.mesh.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }

    /// Fan-triangulate a convex polygon
    fn polygon(&mut self, points: &[Vec3]) {
        for i in 1..points.len().saturating_sub(1) {
            self.triangle(points[0], points[i], points[i + 1]);
        }
    }

    /// Join two outlines with the same vertex count by quads
    fn band(&mut self, top: &[Vec3], bottom: &[Vec3]) {
        let n = top.len();
        for i in 0..n {
            let j = (i + 1) % n;
            self.triangle(top[i], bottom[i], top[j]);
            self.triangle(top[j], bottom[i], bottom[j]);
        }
    }

    fn finish(self) -> MeshData {
        self.mesh
    }
}

/// Small motorboat, bow toward -Z: hull, deck and cabin nodes under `boat`
pub fn build_boat_hierarchy() -> ModelHierarchy {
    let deck = [
        Vec3::new(0.0, 1.0, -6.0),
        Vec3::new(2.0, 1.0, -3.0),
        Vec3::new(2.0, 1.0, 6.0),
        Vec3::new(-2.0, 1.0, 6.0),
        Vec3::new(-2.0, 1.0, -3.0),
    ];
    let keel = [
        Vec3::new(0.0, -1.0, -5.0),
        Vec3::new(1.2, -1.0, -2.5),
        Vec3::new(1.2, -1.0, 5.5),
        Vec3::new(-1.2, -1.0, 5.5),
        Vec3::new(-1.2, -1.0, -2.5),
    ];

    let mut hull = SolidBuilder::new(Vec3::new(0.0, 0.0, 0.5));
    hull.band(&deck, &keel);
    hull.polygon(&keel);
    let hull_mesh = hull.finish();

    let mut deck_solid = SolidBuilder::new(Vec3::new(0.0, 0.0, 0.5));
    deck_solid.polygon(&deck);
    let deck_mesh = deck_solid.finish();

    let (lo, hi) = (Vec3::new(-1.2, 1.0, 0.0), Vec3::new(1.2, 2.5, 4.0));
    let cabin_top = [
        Vec3::new(lo.x, hi.y, lo.z),
        Vec3::new(hi.x, hi.y, lo.z),
        Vec3::new(hi.x, hi.y, hi.z),
        Vec3::new(lo.x, hi.y, hi.z),
    ];
    let cabin_bottom = cabin_top.map(|p| Vec3::new(p.x, lo.y, p.z));
    let mut cabin = SolidBuilder::new((lo + hi) / 2.0);
    cabin.band(&cabin_top, &cabin_bottom);
    cabin.polygon(&cabin_top);
    let cabin_mesh = cabin.finish();

    let hull_bounds = hull_mesh.bounds();

    let mut root = ModelNode::named(BOAT_ROOT);
    root.children = vec![
        ModelNode {
            mesh: Some(hull_mesh),
            material: Some("hull_paint".to_string()),
            bounds: hull_bounds,
            ..ModelNode::named(HULL_BOUNDS)
        },
        ModelNode {
            mesh: Some(deck_mesh),
            material: Some("deck_wood".to_string()),
            ..ModelNode::named("deck")
        },
        ModelNode {
            mesh: Some(cabin_mesh),
            material: Some("cabin_white".to_string()),
            ..ModelNode::named("cabin")
        },
    ];

    let mut scene_root = ModelNode::named("__root__");
    scene_root.children.push(root);
    ModelHierarchy { root: scene_root }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_procedural_boat() {
        let hierarchy = build_boat_hierarchy();
        let boat =
            BoatModel::locate(&hierarchy, 1.0, 0.0, &MaterialLibrary::default()).unwrap();

        assert_eq!(boat.bounds.min.y, -1.0);
        assert_eq!(boat.bounds.max.y, 1.0);
        // 35% of the 2m hull below water: origin sits 0.3m above the plane
        assert!((boat.base_height - 0.3).abs() < 1e-5);
        assert_eq!(boat.mesh.indices.len() % 3, 0);
        assert!(boat.mesh.vertices.iter().any(|v| v.color == [0.55, 0.12, 0.1]));
    }

    #[test]
    fn test_hull_normals_point_outward() {
        let hierarchy = build_boat_hierarchy();
        let hull = hierarchy.find(HULL_BOUNDS).and_then(|n| n.mesh.as_ref()).unwrap();
        let center = Vec3::new(0.0, 0.0, 0.5);
        for tri in hull.vertices.chunks(3) {
            let centroid = tri
                .iter()
                .map(|v| Vec3::from_array(v.position))
                .sum::<Vec3>()
                / 3.0;
            let normal = Vec3::from_array(tri[0].normal);
            assert!(normal.dot(centroid - center) >= 0.0);
        }
    }

    #[test]
    fn test_missing_material_uses_default() {
        let mut hierarchy = build_boat_hierarchy();
        hierarchy.root.children[0].children[2].material = Some("unobtainium".to_string());
        let library = MaterialLibrary::default();
        let boat = BoatModel::locate(&hierarchy, 1.0, 0.0, &library).unwrap();
        assert!(boat.mesh.vertices.iter().any(|v| v.color == library.fallback));
    }

    #[test]
    fn test_missing_root_falls_back_to_hierarchy_root() {
        let mut hierarchy = build_boat_hierarchy();
        hierarchy.root.children[0].name = "dinghy".to_string();
        let boat = BoatModel::locate(&hierarchy, 2.0, 0.0, &MaterialLibrary::default());
        assert!(boat.is_ok());
    }

    #[test]
    fn test_missing_bounds_derived_from_mesh() {
        let mut hierarchy = build_boat_hierarchy();
        hierarchy.root.children[0].children[0].bounds = None;
        let boat =
            BoatModel::locate(&hierarchy, 1.0, 0.0, &MaterialLibrary::default()).unwrap();
        // Whole boat incl. cabin roof
        assert_eq!(boat.bounds.max.y, 2.5);
    }

    #[test]
    fn test_meshless_model_rejected() {
        let hierarchy = ModelHierarchy {
            root: ModelNode::named(BOAT_ROOT),
        };
        let err = BoatModel::locate(&hierarchy, 1.0, 0.0, &MaterialLibrary::default());
        assert_eq!(err.unwrap_err(), AssetError::MissingMesh(BOAT_ROOT.to_string()));
    }

    #[test]
    fn test_loader_delivers_once() {
        let mut loader = ProceduralBoatLoader::spawn(Duration::ZERO);
        let mut delivered = None;
        for _ in 0..200 {
            if let Some(result) = loader.poll() {
                delivered = Some(result);
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        assert!(matches!(delivered, Some(Ok(_))));
        assert!(loader.poll().is_none());
    }
}
