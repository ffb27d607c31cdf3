//! End-to-end checks across geometry, views and classification.

use approx::assert_relative_eq;
use countframe::countframe_geom::OutlineRecord;
use countframe::prelude::*;

fn tapered() -> RegionGeometry {
    let outlines = OutlineSet {
        axes: AxisPermutation::IDENTITY,
        spacing: [1.0, 1.0, 1.0],
        slices: vec![
            OutlineRecord {
                depth: 0.0,
                points: vec![[0.0, 100.0], [0.0, 0.0], [100.0, 0.0], [100.0, 100.0]],
            },
            OutlineRecord {
                depth: 10.0,
                points: vec![[20.0, 80.0], [20.0, 20.0], [80.0, 20.0], [80.0, 80.0]],
            },
        ],
    };
    RegionGeometry::adaptive("t", &outlines).unwrap()
}

#[test]
fn box_volumes_and_classification_agree() {
    let mut region =
        RegionGeometry::rectangular("a", [0.0, 100.0, 0.0, 100.0, 0.0, 10.0], [1.0; 3]).unwrap();
    assert_relative_eq!(region.total_volume(), 100_000.0);
    assert_relative_eq!(region.inclusion_volume(), 100_000.0);

    assert!(region.set_margins([10.0, 20.0, 2.0], [5.0, 5.0, 1.0]));
    assert_relative_eq!(region.inclusion_volume(), 85.0 * 75.0 * 7.0);
    assert_relative_eq!(
        region.total_volume(),
        region.inclusion_volume() + region.exclusion_volume()
    );

    let c = VolumeClassifier::new(&region);
    assert_eq!(c.classify_point(&Point3::new(50.0, 50.0, 5.0)), Classification::InsideInclusion);
    assert_eq!(c.classify_point(&Point3::new(50.0, 50.0, 1.0)), Classification::InsideExclusion);
}

#[test]
fn adaptive_region_through_all_layers() {
    let mut region = tapered();
    assert_eq!(region.kind(), RegionKind::Adaptive);
    assert!(region.set_margins([5.0, 5.0, 0.0], [0.0; 3]));

    let face = SliceFaceProjector::new(Plane::Axial).project(&region, 5.0);
    assert!(face.is_visible());
    // outline at depth 5 spans 10..90, left edge moved in by 5
    let left = &face.edge(Edge::Left).polyline;
    assert!(left.points.iter().all(|p| (p.x - 15.0).abs() < 1e-9));

    let c = VolumeClassifier::new(&region);
    assert_eq!(c.classify_point(&Point3::new(12.0, 50.0, 5.0)), Classification::InsideExclusion);
    assert_eq!(c.classify_point(&Point3::new(16.0, 50.0, 5.0)), Classification::InsideInclusion);

    let line = format::serialize(&region);
    assert_eq!(line, "AdaptiveBoundingRegion=5.00,5.00,0.00,0.00,0.00,0.00");
    let mut list = RegionList::new();
    let report = list.load(&line, |_| Ok(tapered()));
    assert!(report.is_complete());
}
