// src/plan/planfile.rs

use std::path::{Component, Path, PathBuf};

use anyhow::Result;

use crate::fs::FileSystem;

/// Project names may contain `/`, which can't go into a filename.
pub const PLANFILE_SLASH_REPLACE: &str = "::";

/// First line of a planfile we synthesised from remote ops output. The apply
/// step uses it to tell these apart from real terraform planfiles.
pub const REMOTE_OPS_HEADER: &str = "Atlantis: this plan was created by remote ops\n";

/// Deterministic planfile name for a (workspace, project) pair.
pub fn plan_filename(workspace: &str, project_name: &str) -> String {
    if project_name.is_empty() {
        return format!("{workspace}.tfplan");
    }
    let project = project_name.replace('/', PLANFILE_SLASH_REPLACE);
    format!("{project}-{workspace}.tfplan")
}

/// Planfile location inside the (lexically cleaned) project directory.
pub fn plan_file_path(path: &Path, workspace: &str, project_name: &str) -> PathBuf {
    clean_path(path).join(plan_filename(workspace, project_name))
}

/// Write the remote ops header followed by `plan_output`, owner-only.
pub fn write_remote_ops_planfile(fs: &dyn FileSystem, plan_file: &Path, plan_output: &str) -> Result<()> {
    let mut contents = String::with_capacity(REMOTE_OPS_HEADER.len() + plan_output.len());
    contents.push_str(REMOTE_OPS_HEADER);
    contents.push_str(plan_output);
    fs.write_private(plan_file, contents.as_bytes())
}

/// Lexically clean a path: drop `.` components and resolve `..` against the
/// preceding component. Never touches the filesystem.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match cleaned.components().next_back() {
                Some(Component::Normal(_)) => {
                    cleaned.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => cleaned.push(".."),
            },
            other => cleaned.push(other.as_os_str()),
        }
    }
    if cleaned.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        cleaned
    }
}
