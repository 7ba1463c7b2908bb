//! Course archive handling. Everything here is blocking file IO; callers run it on
//! `tokio::task::spawn_blocking`.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use tar::{Archive, Builder};

use campus_domain::course::CourseKey;

use crate::domain::types::COURSE_DESCRIPTOR;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("entry {0:?} escapes the extraction directory")]
    UnsafePath(String),
    #[error("entry {0:?} is a link")]
    LinkEntry(String),
    #[error("{0}")]
    Io(#[from] io::Error),
}

/// Where an installed course lives: `<data_dir>/<org>/<course>/<run>`.
pub fn install_path(data_dir: &Path, course_id: &CourseKey) -> PathBuf {
    course_id
        .segments()
        .iter()
        .fold(data_dir.to_path_buf(), |path, segment| path.join(segment))
}

/// `path` with `.` dropped, or `None` if it is absolute or climbs with `..`.
fn relative_entry_path(path: &Path) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(relative)
}

/// Extract a gzipped tarball into `dest`. Links and entries outside `dest` are refused.
pub fn unpack_archive(bytes: &[u8], dest: &Path) -> Result<(), ArchiveError> {
    let mut archive = Archive::new(GzDecoder::new(bytes));
    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();
        let display = path.display().to_string();
        let relative = relative_entry_path(&path)
            .ok_or_else(|| ArchiveError::UnsafePath(display.clone()))?;
        if relative.as_os_str().is_empty() {
            continue;
        }

        let entry_type = entry.header().entry_type();
        let target = dest.join(&relative);
        if entry_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry_type.is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            entry.unpack(&target)?;
        } else if entry_type.is_symlink() || entry_type.is_hard_link() {
            return Err(ArchiveError::LinkEntry(display));
        }
    }
    Ok(())
}

/// Directory holding the shallowest `course.xml` under `root`, searched breadth first in
/// name order.
pub fn find_course_root(root: &Path) -> io::Result<Option<PathBuf>> {
    let mut queue = VecDeque::from([root.to_path_buf()]);
    while let Some(dir) = queue.pop_front() {
        if dir.join(COURSE_DESCRIPTOR).is_file() {
            return Ok(Some(dir));
        }
        let mut children: Vec<PathBuf> = fs::read_dir(&dir)?
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
            .map(|e| e.path())
            .collect();
        children.sort();
        queue.extend(children);
    }
    Ok(None)
}

/// Move `course_root` to `dest`, replacing whatever was installed there.
/// Both paths must be on the same filesystem.
pub fn install_course(course_root: &Path, dest: &Path) -> io::Result<()> {
    if dest.exists() {
        fs::remove_dir_all(dest)?;
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::rename(course_root, dest)
}

/// Gzipped tarball of `dir`, with its contents under a top-level `name/` directory.
pub fn pack_course(dir: &Path, name: &str) -> io::Result<Vec<u8>> {
    let mut builder = Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    builder.follow_symlinks(false);
    builder.append_dir_all(name, dir)?;
    builder.into_inner()?.finish()
}
