mod common;

use common::{expected_vertex_value, voxel_features, write_subjects_dir, vertex, MemoryDb, HEMI_VERTICES, SUBJECT, XFM};
use cortexroi::{
    project_features_to_vertices, project_roi_features, rescale_roi_volume, select_roi_vertices, CortexRoiError,
    FsSubjectsDir, MapperMethod, RoiConfig, Sentinel, SurfaceDatabase, SurfaceKind, VoiSet, VoxelMapper,
};
use ndarray::{array, Array2};

use std::fs;

fn subjects_dir() -> (tempfile::TempDir, FsSubjectsDir) {
    let dir = tempfile::tempdir().unwrap();
    write_subjects_dir(dir.path());
    let mut config = RoiConfig::new(dir.path());
    config.annot = Some(String::from("aparc"));
    let db = FsSubjectsDir::from_config(&config);
    (dir, db)
}

#[test]
fn surfaces_are_read_for_both_hemispheres() {
    let (_dir, db) = subjects_dir();
    let surfs = db.surfaces(SUBJECT, SurfaceKind::Fiducial).unwrap();
    assert_eq!(HEMI_VERTICES, surfs.split_index());
    assert_eq!(2 * HEMI_VERTICES, surfs.total_vertices());
    assert_eq!(0.5, surfs.lh.vertices[[0, 2]]);
    assert!(db.surfaces(SUBJECT, SurfaceKind::Inflated).is_err());
}

#[test]
fn label_rois_use_global_indices() {
    let (_dir, db) = subjects_dir();
    let roi = db.roi_vertices(SUBJECT, "V1").unwrap();
    assert_eq!(vec![vertex(false, 0, 0), vertex(false, 1, 0), vertex(true, 0, 0)], roi);
}

#[test]
fn annot_regions_are_used_without_a_label_file() {
    let (_dir, db) = subjects_dir();
    assert_eq!(vec![7], db.roi_vertices(SUBJECT, "MT").unwrap());
    assert_eq!(vec![HEMI_VERTICES + 3], db.roi_vertices(SUBJECT, "FFA").unwrap());
}

#[test]
fn unknown_names_are_reported() {
    let (_dir, db) = subjects_dir();
    match db.roi_vertices(SUBJECT, "V4") {
        Err(CortexRoiError::UnknownRoi(name)) => assert_eq!("V4", name),
        other => panic!("expected UnknownRoi, got {:?}", other),
    }
    assert!(matches!(db.roi_vertices("S9", "V1"), Err(CortexRoiError::UnknownSubject(_))));
    assert!(matches!(db.transform(SUBJECT, "coronal"), Err(CortexRoiError::UnknownXfm(_))));
}

#[test]
fn without_an_annot_only_labels_are_rois() {
    let (dir, _) = subjects_dir();
    let db = FsSubjectsDir::new(dir.path());
    assert!(db.roi_vertices(SUBJECT, "V1").is_ok());
    assert!(matches!(db.roi_vertices(SUBJECT, "MT"), Err(CortexRoiError::UnknownRoi(_))));
}

#[test]
fn files_and_memory_give_the_same_selection() {
    let (_dir, db) = subjects_dir();
    let memory = MemoryDb::new();
    for radius in [0.0, 0.2, 0.6, 1.0].iter() {
        let from_files = select_roi_vertices(&db, SUBJECT, "V1", *radius).unwrap();
        let from_memory = select_roi_vertices(&memory, SUBJECT, "V1", *radius).unwrap();
        assert_eq!(from_memory, from_files, "radius {}", radius);
    }
}

#[test]
fn the_file_backed_mapper_covers_all_vertices() {
    let (_dir, db) = subjects_dir();
    let mapper = db.mapper(SUBJECT, XFM, cortexroi::MapperMethod::LineNearest).unwrap();
    assert_eq!(2 * HEMI_VERTICES, mapper.num_vertices());
}

#[test]
fn roi_features_can_be_projected_from_files() {
    let (_dir, db) = subjects_dir();
    let voi = select_roi_vertices(&db, SUBJECT, "V1", 0.3).unwrap();
    let projected = project_roi_features(&db, SUBJECT, XFM, "V1", 0.3, voxel_features(2), Sentinel::Zero).unwrap();
    for v in 0..2 * HEMI_VERTICES {
        for r in 0..2 {
            let expected = if voi.contains(v) { expected_vertex_value(r, v) } else { 0.0 };
            assert_eq!(expected, projected[[r, v]]);
        }
    }
}

#[test]
fn the_configured_surface_is_used_for_selection() {
    let (dir, _) = subjects_dir();
    let surf_dir = dir.path().join(SUBJECT).join("surf");
    fs::remove_file(surf_dir.join("lh.pial")).unwrap();
    fs::remove_file(surf_dir.join("rh.pial")).unwrap();

    let fiducial = FsSubjectsDir::from_config(&RoiConfig::new(dir.path()));
    assert_eq!(SurfaceKind::Fiducial, fiducial.surface_kind());
    assert!(select_roi_vertices(&fiducial, SUBJECT, "V1", 0.3).is_err());

    let config = RoiConfig::from_toml_str(&format!(
        "subjects_dir = {:?}\nsurface = \"white\"\n",
        dir.path().display().to_string()
    ))
    .unwrap();
    let white = FsSubjectsDir::from_config(&config);
    assert_eq!(SurfaceKind::White, white.surface_kind());
    let voi = select_roi_vertices(&white, SUBJECT, "V1", 0.3).unwrap();
    assert_eq!(select_roi_vertices(&MemoryDb::new(), SUBJECT, "V1", 0.3).unwrap(), voi);
}

#[test]
fn the_configured_mapper_method_is_used_for_projection() {
    let (dir, _) = subjects_dir();
    // 0 in the white (k = 0) voxel layer, 10 in the pial (k = 1) layer.
    let features = || Array2::from_shape_fn((1, 80), |(_, flat)| (flat % 2) as f64 * 10.0);
    let voi = VoiSet::new((0..2 * HEMI_VERTICES).collect(), 2 * HEMI_VERTICES).unwrap();

    let line = FsSubjectsDir::from_config(&RoiConfig::new(dir.path()));
    assert_eq!(MapperMethod::LineNearest, line.mapper_method());
    let projected = project_features_to_vertices(&line, SUBJECT, XFM, &voi, features(), Sentinel::Zero).unwrap();
    assert!(projected.iter().all(|&v| v == 5.0), "{:?}", projected);

    let mut config = RoiConfig::new(dir.path());
    config.mapper.method = MapperMethod::Nearest;
    let nearest = FsSubjectsDir::from_config(&config);
    let projected = project_features_to_vertices(&nearest, SUBJECT, XFM, &voi, features(), Sentinel::Zero).unwrap();
    assert!(projected.iter().all(|&v| v == 10.0), "{:?}", projected);
}

#[test]
fn rescaled_volumes_carry_the_configured_colormap() {
    let (dir, db) = subjects_dir();
    let roi = array![0.0, 1.0, -1.0].into_dyn();
    let data = array![4.0, -2.0, 1.0].into_dyn();
    assert_eq!("RdBu_r", rescale_roi_volume(&db, roi.view(), data.view(), SUBJECT, XFM, None).unwrap().cmap);

    let mut config = RoiConfig::new(dir.path());
    config.colormap = String::from("hot");
    let db = FsSubjectsDir::from_config(&config);
    let rescaled = rescale_roi_volume(&db, roi.view(), data.view(), SUBJECT, XFM, None).unwrap();
    assert_eq!("hot", rescaled.cmap);
    assert_eq!((-2.0, 2.0), (rescaled.vmin, rescaled.vmax));
}
