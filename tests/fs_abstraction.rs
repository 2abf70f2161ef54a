use std::path::Path;

use devlaunch::fs::FileSystem;
use devlaunch::fs::mock::MockFileSystem;

#[test]
fn test_mock_fs_tracks_files_and_parent_dirs() {
    let fs = MockFileSystem::new();
    fs.add_file("/project/node_modules/.package-lock.json");

    assert!(fs.exists(Path::new("/project/node_modules/.package-lock.json")));
    assert!(!fs.is_dir(Path::new("/project/node_modules/.package-lock.json")));

    assert!(fs.is_dir(Path::new("/project/node_modules")));
    assert!(fs.is_dir(Path::new("/project")));
    assert!(fs.exists(Path::new("/project/node_modules")));

    assert!(!fs.exists(Path::new("/project/dist")));
}

#[test]
fn test_mock_fs_clones_share_state() {
    let fs = MockFileSystem::new();
    let view = fs.clone();

    fs.add_dir("web/node_modules");

    assert!(view.is_dir(Path::new("web/node_modules")));
    assert!(view.is_dir(Path::new("web")));
    assert!(!view.exists(Path::new("")));
}
