// vidmerge-core/tests/discovery_tests.rs

use vidmerge_core::discovery::{find_video_files, find_video_files_with_extensions};
use vidmerge_core::error::{CoreError, MergePhase};
use std::fs::{self, File};
use std::path::PathBuf;
use tempfile::tempdir;

fn names(files: &[PathBuf]) -> Vec<String> {
    files
        .iter()
        .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_find_video_files_natural_order() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input_dir = dir.path();

    File::create(input_dir.join("b2.mp4"))?;
    File::create(input_dir.join("a1.mp4"))?;
    File::create(input_dir.join("a10.mp4"))?;

    let files = find_video_files(input_dir)?;
    assert_eq!(names(&files), vec!["a1.mp4", "a10.mp4", "b2.mp4"]);
    assert!(files.iter().all(|f| f.starts_with(input_dir)));

    dir.close()?;
    Ok(())
}

#[test]
fn test_find_video_files_filters() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input_dir = dir.path();

    File::create(input_dir.join("clip2.mp4"))?;
    File::create(input_dir.join("clip10.MOV"))?; // Case insensitive extension
    File::create(input_dir.join("a.b.mp4"))?; // Two periods
    File::create(input_dir.join("notes.txt"))?;
    File::create(input_dir.join("noextension"))?;
    fs::create_dir(input_dir.join("folder.mkv"))?; // Directory, not a file
    fs::create_dir(input_dir.join("subdir"))?;
    File::create(input_dir.join("subdir").join("nested1.mp4"))?; // Not searched

    let files = find_video_files(input_dir)?;
    assert_eq!(names(&files), vec!["clip2.mp4", "clip10.MOV"]);

    dir.close()?;
    Ok(())
}

#[test]
fn test_find_video_files_empty_is_ok() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    File::create(dir.path().join("document.txt"))?;

    let files = find_video_files(dir.path())?;
    assert!(files.is_empty());

    dir.close()?;
    Ok(())
}

#[test]
fn test_find_video_files_nonexistent_dir() {
    let non_existent_path = PathBuf::from("surely_this_does_not_exist_42_integration");
    let err = find_video_files(&non_existent_path).unwrap_err();
    assert_eq!(err.phase(), MergePhase::Discovery);
    match err {
        CoreError::DirectoryRead { path, .. } => assert_eq!(path, non_existent_path),
        e => panic!("Unexpected error type: {e:?}"),
    }
}

#[test]
fn test_leading_zero_names_have_fixed_order() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    File::create(dir.path().join("f7.mp4"))?;
    File::create(dir.path().join("f007.mp4"))?;
    File::create(dir.path().join("f8.mp4"))?;

    // Equal under the comparator, so byte order decides between them.
    let files = find_video_files(dir.path())?;
    assert_eq!(names(&files), vec!["f007.mp4", "f7.mp4", "f8.mp4"]);

    dir.close()?;
    Ok(())
}

#[test]
fn test_custom_extensions() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    File::create(dir.path().join("part1.webm"))?;
    File::create(dir.path().join("part2.mp4"))?;

    let files = find_video_files_with_extensions(dir.path(), &["webm"])?;
    assert_eq!(names(&files), vec!["part1.webm"]);

    dir.close()?;
    Ok(())
}
