//! Lazy depth-first walk used by the local disk's `flat_list`.

use crate::core::errors::map_io_error;
use flydrive_commons::paths::prefix_directory;
use flydrive_commons::{FileListResponse, FileListStream, RawResponse, Result};
use futures_util::{stream, StreamExt};
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};

struct WalkState {
    root: PathBuf,
    prefix: String,
    /// Directories still to read, popped from the end
    pending_dirs: Vec<PathBuf>,
    /// Matching files of the last directory read
    ready: VecDeque<String>,
}

/// Stream every file under `root` whose `/` separated key starts with `prefix`.
///
/// Directories are read one at a time as the stream is polled, in sorted
/// order. A prefix pointing at a missing directory yields nothing.
pub(crate) fn walk(root: PathBuf, prefix: String) -> FileListStream<'static> {
    let start = root.join(prefix_directory(&prefix));
    let state = WalkState {
        root,
        prefix,
        pending_dirs: vec![start],
        ready: VecDeque::new(),
    };

    stream::try_unfold(state, next_entry).boxed()
}

async fn next_entry(mut state: WalkState) -> Result<Option<(FileListResponse, WalkState)>> {
    loop {
        if let Some(path) = state.ready.pop_front() {
            let entry = FileListResponse::new(path, RawResponse::none());
            return Ok(Some((entry, state)));
        }
        let Some(dir) = state.pending_dirs.pop() else {
            return Ok(None);
        };
        read_directory(&mut state, &dir).await?;
    }
}

async fn read_directory(state: &mut WalkState, dir: &Path) -> Result<()> {
    let dir_key = relative_key(&state.root, dir);

    // The root may itself be a link; nothing below it is followed
    let meta = if dir == state.root.as_path() {
        tokio::fs::metadata(dir).await
    } else {
        tokio::fs::symlink_metadata(dir).await
    };
    match meta {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(map_io_error(e, &dir_key)),
    }

    let mut reader = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| map_io_error(e, &dir_key))?;

    let mut dirs = Vec::new();
    let mut files = Vec::new();
    while let Some(entry) = reader
        .next_entry()
        .await
        .map_err(|e| map_io_error(e, &dir_key))?
    {
        let path = entry.path();
        let key = relative_key(&state.root, &path);
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| map_io_error(e, &key))?;

        if file_type.is_dir() {
            if may_contain(&key, &state.prefix) {
                dirs.push(path);
            }
        } else if key.starts_with(&state.prefix) && is_listable_file(&path, file_type).await {
            files.push(key);
        }
    }

    files.sort();
    state.ready.extend(files);

    dirs.sort();
    state.pending_dirs.extend(dirs.into_iter().rev());
    Ok(())
}

/// Regular files, and symlinks resolving to a file. Directory symlinks and
/// dangling links are skipped, so the walk stays finite and inside the root.
async fn is_listable_file(path: &Path, file_type: std::fs::FileType) -> bool {
    if !file_type.is_symlink() {
        return file_type.is_file();
    }
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

/// Whether a directory can hold keys starting with `prefix`.
fn may_contain(dir_key: &str, prefix: &str) -> bool {
    let dir_prefix = format!("{}/", dir_key);
    dir_prefix.starts_with(prefix) || prefix.starts_with(&dir_prefix)
}

fn relative_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
