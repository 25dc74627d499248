use std::path::Path;

/// Recursively copy the fixture tree at `source` into `target`, which must already exist.
pub fn copy_dir_contents(source: &Path, target: &Path) {
    for entry in std::fs::read_dir(source).unwrap() {
        let from = entry.unwrap().path();
        let to = target.join(from.file_name().unwrap());
        if from.is_dir() {
            std::fs::create_dir_all(&to).unwrap();
            copy_dir_contents(&from, &to);
        } else {
            std::fs::copy(&from, &to).unwrap();
        }
    }
}
