use std::fs;
use std::path::Path;

/// Extensions of finished downloads.
pub const VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "mkv", "webm", "avi", "mov", "flv"];

/// Whether an item's output is already present in `target_folder`.
///
/// Only names are checked, a partial or foreign file with a matching name
/// counts as present.
pub fn exists(target_folder: impl AsRef<Path>, name: &str, is_playlist: bool) -> bool {
    let target_folder = target_folder.as_ref();
    if is_playlist {
        return directory_has_entries(target_folder.join(name));
    }

    VIDEO_EXTENSIONS
        .iter()
        .any(|ext| target_folder.join(format!("{}.{}", name, ext)).exists())
}

fn directory_has_entries(path: impl AsRef<Path>) -> bool {
    match fs::read_dir(path) {
        Err(_) => false,
        Ok(mut entries) => entries.next().is_some(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_video_extensions() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!exists(dir.path(), "A", false));

        fs::write(dir.path().join("A.part"), b"").unwrap();
        fs::write(dir.path().join("A.info.json"), b"{}").unwrap();
        assert!(!exists(dir.path(), "A", false));

        for ext in VIDEO_EXTENSIONS {
            let dir = tempfile::tempdir().unwrap();
            fs::write(dir.path().join(format!("A.{}", ext)), b"").unwrap();
            assert!(exists(dir.path(), "A", false), "{}", ext);
            assert!(!exists(dir.path(), "B", false));
        }
    }

    #[test]
    fn test_playlist_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!exists(dir.path(), "P", true));

        let playlist = dir.path().join("P");
        fs::create_dir(&playlist).unwrap();
        assert!(!exists(dir.path(), "P", true));

        fs::write(playlist.join("1 - First.mp4"), b"").unwrap();
        assert!(exists(dir.path(), "P", true));
    }

    #[test]
    fn test_playlist_name_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("P"), b"").unwrap();
        assert!(!exists(dir.path(), "P", true));
    }
}
