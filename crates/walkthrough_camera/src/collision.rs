//! Scene queries and the free-movement collision probe
//!
//! The controller never owns scene geometry. It only needs something that can
//! answer "what does this ray hit", expressed by [`SpatialQuery`].
//! [`TriangleMesh`] answers it with parry for static scene geometry.

use parry3d::math::{Point, Vector};
use parry3d::query::RayCast;
use parry3d::shape::TriMesh;
use smallvec::SmallVec;
use tracing::{debug, trace};
use walkthrough_core::{BoundingBox, CollisionConfig, Result, Vec3, WalkthroughError};

/// Ray for raycasting
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// Ray origin
    pub origin: Vec3,
    /// Ray direction (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray, normalizing `direction`
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get point along ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// One surface intersection along a ray
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaycastHit {
    /// Hit position in world space
    pub position: Vec3,
    /// Surface normal at the hit, when the surface provides one
    pub normal: Option<Vec3>,
    /// Distance from ray origin
    pub distance: f32,
}

/// Hits along one ray, nearest first
pub type RaycastHits = SmallVec<[RaycastHit; 4]>;

/// Scene geometry as seen by the controller
pub trait SpatialQuery {
    /// All intersections within `max_distance`, sorted by distance
    fn raycast(&self, ray: &Ray, max_distance: f32) -> RaycastHits;
}

// =============================================================================
// Triangle mesh
// =============================================================================

/// Static indexed triangle mesh backed by a parry [`TriMesh`]
///
/// Triangles are double sided. The reported normal is the face normal from
/// counter-clockwise winding, whichever side the ray came from.
#[derive(Clone)]
pub struct TriangleMesh {
    shape: TriMesh,
}

impl std::fmt::Debug for TriangleMesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriangleMesh")
            .field("triangles", &self.triangle_count())
            .field("bounds", &self.bounds())
            .finish()
    }
}

impl TriangleMesh {
    /// Build a mesh from vertices and triangle indices
    ///
    /// Degenerate (zero-area) triangles are dropped.
    pub fn new(vertices: &[Vec3], indices: &[[u32; 3]]) -> Result<Self> {
        if let Some(i) = vertices.iter().position(|v| !v.is_finite()) {
            return Err(WalkthroughError::InvalidMesh(format!(
                "vertex {} is not finite",
                i
            )));
        }

        let mut kept = Vec::with_capacity(indices.len());
        for (i, tri) in indices.iter().enumerate() {
            let [a, b, c] = tri.map(|index| vertices.get(index as usize).copied());
            let (Some(a), Some(b), Some(c)) = (a, b, c) else {
                return Err(WalkthroughError::InvalidMesh(format!(
                    "triangle {} references a vertex outside 0..{}",
                    i,
                    vertices.len()
                )));
            };
            if (b - a).cross(c - a).length_squared() <= f32::EPSILON {
                trace!("Dropping degenerate triangle {}", i);
                continue;
            }
            kept.push(*tri);
        }

        if kept.is_empty() {
            return Err(WalkthroughError::InvalidMesh(
                "mesh has no usable triangles".to_string(),
            ));
        }

        let points = vertices.iter().map(|v| Point::new(v.x, v.y, v.z)).collect();
        let shape = TriMesh::new(points, kept);
        debug!("Built triangle mesh with {} triangles", shape.num_triangles());
        Ok(Self { shape })
    }

    /// Closed axis-aligned room: floor, ceiling and four walls, all facing
    /// inward
    pub fn box_room(bounds: BoundingBox) -> Result<Self> {
        if bounds.is_empty() {
            return Err(WalkthroughError::InvalidMesh(
                "room bounds are empty".to_string(),
            ));
        }
        let (lo, hi) = (bounds.min, bounds.max);
        let vertices = [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
        ];
        // Counter-clockwise when seen from inside the room
        let indices = [
            // floor (+y)
            [0, 3, 2],
            [0, 2, 1],
            // ceiling (-y)
            [4, 5, 6],
            [4, 6, 7],
            // z = min wall (+z)
            [0, 1, 5],
            [0, 5, 4],
            // z = max wall (-z)
            [3, 7, 6],
            [3, 6, 2],
            // x = min wall (+x)
            [0, 4, 7],
            [0, 7, 3],
            // x = max wall (-x)
            [1, 2, 6],
            [1, 6, 5],
        ];
        Self::new(&vertices, &indices)
    }

    pub fn triangle_count(&self) -> usize {
        self.shape.num_triangles()
    }

    pub fn bounds(&self) -> BoundingBox {
        let aabb = self.shape.local_aabb();
        BoundingBox::new(
            Vec3::new(aabb.mins.x, aabb.mins.y, aabb.mins.z),
            Vec3::new(aabb.maxs.x, aabb.maxs.y, aabb.maxs.z),
        )
    }
}

impl SpatialQuery for TriangleMesh {
    fn raycast(&self, ray: &Ray, max_distance: f32) -> RaycastHits {
        let parry_ray = parry3d::query::Ray::new(
            Point::new(ray.origin.x, ray.origin.y, ray.origin.z),
            Vector::new(ray.direction.x, ray.direction.y, ray.direction.z),
        );

        if !self.shape.local_aabb().intersects_local_ray(&parry_ray, max_distance) {
            return RaycastHits::new();
        }

        // Every crossing, not just the nearest: the movement probe looks past
        // floors to whatever lies behind them
        let mut hits: RaycastHits = self
            .shape
            .triangles()
            .filter_map(|tri| {
                let intersection =
                    tri.cast_local_ray_and_get_normal(&parry_ray, max_distance, false)?;
                let face = tri.scaled_normal();
                let normal = if intersection.normal.dot(&face) < 0.0 {
                    -intersection.normal
                } else {
                    intersection.normal
                }
                .normalize();
                Some(RaycastHit {
                    position: ray.point_at(intersection.time_of_impact),
                    normal: Some(Vec3::new(normal.x, normal.y, normal.z)),
                    distance: intersection.time_of_impact,
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

// =============================================================================
// Movement probe
// =============================================================================

/// Outcome of checking a free-movement displacement
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveCheck {
    /// Too short to bother; neither checked nor applied
    Negligible,
    /// Something solid is in the way
    Blocked,
    /// Safe to apply
    Clear,
}

/// Decide whether moving from `position` by `displacement` tunnels through
/// geometry
///
/// The probe casts back from the destination toward the current position, so
/// a wall that the camera would end up touching or passing is found even when
/// the camera starts flush against it. Upward-facing surfaces (floor, stairs)
/// never block. Without a scene every move is clear.
pub fn check_move(
    scene: Option<&dyn SpatialQuery>,
    position: Vec3,
    displacement: Vec3,
    config: &CollisionConfig,
) -> MoveCheck {
    let length = displacement.length();
    if !length.is_finite() || length < config.min_displacement {
        return MoveCheck::Negligible;
    }

    let Some(scene) = scene else {
        return MoveCheck::Clear;
    };

    let destination = position + displacement;
    let ray = Ray::new(destination, -displacement);
    let reach = length + config.near_margin;

    let blocker = scene
        .raycast(&ray, length + config.far_margin)
        .into_iter()
        .filter(|hit| hit.distance < reach)
        .find(|hit| !matches!(hit.normal, Some(n) if n.y > config.floor_normal_y));

    match blocker {
        Some(hit) => {
            debug!(
                "Move blocked by surface {:.3} from destination",
                hit.distance
            );
            MoveCheck::Blocked
        }
        None => MoveCheck::Clear,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A single wall at z = `z`, facing +z, whose diagonal misses the z axis
    fn wall(z: f32) -> TriangleMesh {
        TriangleMesh::new(
            &[
                Vec3::new(-5.0, -5.0, z),
                Vec3::new(6.0, -5.0, z),
                Vec3::new(6.0, 5.0, z),
                Vec3::new(-5.0, 5.0, z),
            ],
            &[[0, 1, 2], [0, 2, 3]],
        )
        .unwrap()
    }

    /// A floor plane at y = `y`, facing up
    fn floor(y: f32) -> TriangleMesh {
        TriangleMesh::new(
            &[
                Vec3::new(-5.0, y, -5.0),
                Vec3::new(-5.0, y, 5.0),
                Vec3::new(5.0, y, 5.0),
                Vec3::new(5.0, y, -5.0),
            ],
            &[[0, 1, 2], [0, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn test_raycast_hits_both_faces() {
        let mesh = wall(-2.0);
        let origin = Vec3::new(1.0, -2.0, 0.0);
        let front = mesh.raycast(&Ray::new(origin, Vec3::FORWARD), 10.0);
        assert_eq!(front.len(), 1);
        assert!((front[0].distance - 2.0).abs() < 1e-5);
        assert!(front[0].normal.unwrap().abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), 1e-6));

        let back = mesh.raycast(
            &Ray::new(Vec3::new(1.0, -2.0, -4.0), Vec3::new(0.0, 0.0, 1.0)),
            10.0,
        );
        assert_eq!(back.len(), 1);
    }

    #[test]
    fn test_back_face_keeps_winding_normal() {
        let mesh = wall(-2.0);
        let hits = mesh.raycast(
            &Ray::new(Vec3::new(1.0, -2.0, -4.0), Vec3::new(0.0, 0.0, 1.0)),
            10.0,
        );
        assert!((hits[0].distance - 2.0).abs() < 1e-5);
        assert!(hits[0].normal.unwrap().abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), 1e-5));
    }

    #[test]
    fn test_raycast_reports_every_crossing() {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        for (k, z) in [-1.0, -2.0].into_iter().enumerate() {
            let base = (k * 4) as u32;
            vertices.extend([
                Vec3::new(-5.0, -5.0, z),
                Vec3::new(5.0, -5.0, z),
                Vec3::new(5.0, 5.0, z),
                Vec3::new(-5.0, 5.0, z),
            ]);
            indices.extend([[base, base + 1, base + 2], [base, base + 2, base + 3]]);
        }
        let mesh = TriangleMesh::new(&vertices, &indices).unwrap();
        assert_eq!(mesh.triangle_count(), 4);

        let hits = mesh.raycast(&Ray::new(Vec3::new(1.0, -2.0, 0.0), Vec3::FORWARD), 10.0);
        assert_eq!(hits.len(), 2);
        assert!((hits[0].distance - 1.0).abs() < 1e-5);
        assert!((hits[1].distance - 2.0).abs() < 1e-5);
        assert!(hits[1].position.abs_diff_eq(Vec3::new(1.0, -2.0, -2.0), 1e-5));
    }

    #[test]
    fn test_bounds_cover_vertices() {
        let room = TriangleMesh::box_room(BoundingBox::new(
            Vec3::new(-2.0, 0.0, -3.0),
            Vec3::new(2.0, 3.0, 3.0),
        ))
        .unwrap();
        let bounds = room.bounds();
        assert!(bounds.min.abs_diff_eq(Vec3::new(-2.0, 0.0, -3.0), 1e-6));
        assert!(bounds.max.abs_diff_eq(Vec3::new(2.0, 3.0, 3.0), 1e-6));
    }

    #[test]
    fn test_mesh_rejects_non_finite_vertex() {
        let result = TriangleMesh::new(
            &[Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, f32::NAN, 1.0)],
            &[[0, 1, 2]],
        );
        assert!(matches!(result, Err(WalkthroughError::InvalidMesh(_))));
    }

    #[test]
    fn test_raycast_respects_max_distance() {
        let mesh = wall(-2.0);
        assert!(mesh.raycast(&Ray::new(Vec3::ZERO, Vec3::FORWARD), 1.5).is_empty());
    }

    #[test]
    fn test_box_room_hits_sorted_and_inward() {
        let room = TriangleMesh::box_room(BoundingBox::new(
            Vec3::new(-2.0, 0.0, -3.0),
            Vec3::new(2.0, 3.0, 3.0),
        ))
        .unwrap();
        assert_eq!(room.triangle_count(), 12);

        let hits = room.raycast(&Ray::new(Vec3::new(0.0, 1.5, 0.0), Vec3::FORWARD), 100.0);
        assert!(!hits.is_empty());
        assert!((hits[0].distance - 3.0).abs() < 1e-5);
        assert!(hits[0].normal.unwrap().z > 0.99);

        let down = room.raycast(&Ray::new(Vec3::new(0.0, 1.5, 0.0), -Vec3::UP), 100.0);
        assert!(down[0].normal.unwrap().y > 0.99);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_mesh_rejects_bad_indices() {
        let result = TriangleMesh::new(&[Vec3::ZERO, Vec3::ONE], &[[0, 1, 2]]);
        assert!(matches!(result, Err(WalkthroughError::InvalidMesh(_))));
    }

    #[test]
    fn test_mesh_rejects_all_degenerate() {
        let result = TriangleMesh::new(&[Vec3::ZERO, Vec3::ONE, Vec3::splat(2.0)], &[[0, 1, 2]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_wall_ahead_blocks_long_step() {
        let config = CollisionConfig::default();
        let scene = wall(-0.3);
        let check = check_move(Some(&scene), Vec3::ZERO, Vec3::new(0.0, 0.0, -0.5), &config);
        assert_eq!(check, MoveCheck::Blocked);
    }

    #[test]
    fn test_wall_ahead_allows_short_step() {
        let config = CollisionConfig::default();
        let scene = wall(-0.3);
        let check = check_move(Some(&scene), Vec3::ZERO, Vec3::new(0.0, 0.0, -0.1), &config);
        assert_eq!(check, MoveCheck::Clear);
    }

    #[test]
    fn test_floor_never_blocks() {
        let config = CollisionConfig::default();
        let scene = floor(-0.02);
        let check = check_move(Some(&scene), Vec3::ZERO, Vec3::new(0.5, -0.03, 0.0), &config);
        assert_eq!(check, MoveCheck::Clear);
    }

    #[test]
    fn test_tiny_step_is_negligible() {
        let config = CollisionConfig::default();
        let scene = wall(-0.001);
        let check = check_move(Some(&scene), Vec3::ZERO, Vec3::new(0.0, 0.0, -0.005), &config);
        assert_eq!(check, MoveCheck::Negligible);
    }

    #[test]
    fn test_missing_scene_fails_open() {
        let config = CollisionConfig::default();
        let check = check_move(None, Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), &config);
        assert_eq!(check, MoveCheck::Clear);
    }

    struct NormalLess;

    impl SpatialQuery for NormalLess {
        fn raycast(&self, ray: &Ray, _max_distance: f32) -> RaycastHits {
            let mut hits = RaycastHits::new();
            hits.push(RaycastHit {
                position: ray.point_at(0.1),
                normal: None,
                distance: 0.1,
            });
            hits
        }
    }

    #[test]
    fn test_hit_without_normal_blocks() {
        let config = CollisionConfig::default();
        let check = check_move(Some(&NormalLess), Vec3::ZERO, Vec3::new(0.2, 0.0, 0.0), &config);
        assert_eq!(check, MoveCheck::Blocked);
    }
}
