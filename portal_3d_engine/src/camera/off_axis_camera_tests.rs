use glam::{Quat, Vec3};
use super::*;

fn viewer_at(position: Vec3) -> ViewerPose {
    ViewerPose::looking_at(position, Vec3::ZERO)
}

fn approx(a: Vec3, b: Vec3, eps: f32) -> bool {
    (a - b).length() < eps
}

/// NDC depth of a camera-space plane `z = -distance`
fn ndc_depth(edges: &FrustumEdges, distance: f32) -> f32 {
    let clip = off_axis_projection(edges) * glam::Vec4::new(0.0, 0.0, -distance, 1.0);
    clip.z / clip.w
}

// ============================================================================
// FrustumEdges::fit
// ============================================================================

#[test]
fn test_centered_viewer_gives_symmetric_edges() {
    let mut camera = OffAxisCamera::new(PortalConfig::default());
    let portal = PortalSurface::from_aspect(1.0);

    let edges = camera.update(&viewer_at(Vec3::new(0.0, 0.0, 1.0)), &portal);

    assert!((edges.left + edges.right).abs() < 1e-6);
    assert!((edges.top + edges.bottom).abs() < 1e-6);
    assert!((edges.right - 0.05).abs() < 1e-6);
    assert_eq!(edges.near, 0.1);
    assert_eq!(edges.far, 100.0);
}

#[test]
fn test_sideways_viewer_shifts_frustum() {
    let mut camera = OffAxisCamera::new(PortalConfig::default());
    let portal = PortalSurface::from_aspect(1.0);

    let centered = camera.update(&viewer_at(Vec3::new(0.0, 0.0, 1.0)), &portal);
    let shifted = camera.update(&viewer_at(Vec3::new(0.25, 0.0, 1.0)), &portal);

    // Same depth: same width, midpoint moves opposite to the viewer
    assert!((shifted.width() - centered.width()).abs() < 1e-6);
    let midpoint = (shifted.left + shifted.right) * 0.5;
    assert!((midpoint - (-0.025)).abs() < 1e-6);
}

#[test]
fn test_edges_scale_with_distance() {
    let config = PortalConfig::default();
    let near_edges = FrustumEdges::fit(Vec3::new(0.0, 0.0, -0.5), 0.5, 0.5, &config);
    let far_edges = FrustumEdges::fit(Vec3::new(0.0, 0.0, -2.0), 0.5, 0.5, &config);

    assert!((near_edges.width() - 0.2).abs() < 1e-6);
    assert!((far_edges.width() - 0.05).abs() < 1e-6);
}

#[test]
fn test_viewer_on_portal_plane_stays_finite() {
    let config = PortalConfig::default();
    let edges = FrustumEdges::fit(Vec3::new(0.1, 0.0, 0.0), 0.5, 0.5, &config);
    let projection = off_axis_projection(&edges);

    assert!(edges.left.is_finite() && edges.right.is_finite());
    assert!(projection.is_finite());
}

// ============================================================================
// Projection alignment
// ============================================================================

#[test]
fn test_ndc_corners_land_on_portal_corners() {
    let portal = PortalSurface::new(
        Vec3::new(0.2, -0.1, 0.0),
        Quat::from_rotation_y(0.3),
        0.5,
        0.3,
    );
    let mut off_axis = OffAxisCamera::new(PortalConfig::default());

    let viewers = [
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(0.4, 0.1, 0.8),
        Vec3::new(-0.6, -0.3, 1.5),
        Vec3::new(0.0, 0.5, 0.3),
    ];

    for viewer in viewers {
        let edges = off_axis.update(&viewer_at(viewer), &portal);
        let camera = off_axis.camera().read().unwrap();
        let distance = camera.world_to_local(portal.position).z.abs();
        let depth = ndc_depth(&edges, distance);
        let inverse = camera.view_projection_matrix().inverse();

        let ndc = [
            Vec3::new(-1.0, -1.0, depth),
            Vec3::new(1.0, -1.0, depth),
            Vec3::new(1.0, 1.0, depth),
            Vec3::new(-1.0, 1.0, depth),
        ];
        for (corner, expected) in ndc.iter().zip(portal.corners()) {
            let world = inverse.project_point3(*corner);
            assert!(
                approx(world, expected, 1e-3),
                "viewer {:?}: corner {:?} unprojected to {:?}, expected {:?}",
                viewer, corner, world, expected
            );
        }
    }
}

#[test]
fn test_camera_takes_viewer_position_and_portal_orientation() {
    let portal = PortalSurface::new(Vec3::ZERO, Quat::from_rotation_y(0.5), 0.5, 0.5);
    let mut off_axis = OffAxisCamera::new(PortalConfig::default());

    off_axis.update(&viewer_at(Vec3::new(0.3, 0.2, 1.0)), &portal);
    let camera = off_axis.camera().read().unwrap();

    assert!(approx(camera.position(), Vec3::new(0.3, 0.2, 1.0), 1e-6));
    assert!(camera.orientation().abs_diff_eq(portal.orientation, 1e-6));
    assert_eq!(camera.near(), 0.1);
}

// ============================================================================
// PortalSurface
// ============================================================================

#[test]
fn test_portal_from_aspect() {
    let landscape = PortalSurface::from_aspect(2.0);
    assert_eq!((landscape.width(), landscape.height()), (1.0, 0.5));

    let portrait = PortalSurface::from_aspect(0.5);
    assert_eq!((portrait.width(), portrait.height()), (0.5, 1.0));
}

#[test]
fn test_portal_fit_aspect_keeps_pose() {
    let mut portal = PortalSurface::new(Vec3::X, Quat::from_rotation_z(0.1), 0.5, 0.5);
    portal.fit_aspect(4.0);

    assert_eq!(portal.position, Vec3::X);
    assert_eq!(portal.half_height, 0.125);
}

#[test]
fn test_portal_corners_and_normal() {
    let portal = PortalSurface::from_aspect(1.0);
    let corners = portal.corners();

    assert_eq!(corners[0], Vec3::new(-0.5, -0.5, 0.0));
    assert_eq!(corners[2], Vec3::new(0.5, 0.5, 0.0));
    assert_eq!(portal.normal(), Vec3::Z);
}
