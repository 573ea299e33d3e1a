use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{ExplorerError, Result};

/// One directory row as the backend reports it, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFileEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
    pub size_bytes: Option<u64>,
}

/// One volume as the backend reports it. Capacity figures are optional and
/// stay absent when the platform gives no cheap way to read them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawVolume {
    pub path: PathBuf,
    pub name: Option<String>,
    pub free_bytes: Option<u64>,
    pub total_bytes: Option<u64>,
}

/// A single filesystem mutation. Pastes and batch actions queue several of
/// these in one request; they run in order and stop at the first failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOp {
    Copy { src: PathBuf, dst: PathBuf, overwrite: bool },
    Move { src: PathBuf, dst: PathBuf, overwrite: bool },
    Delete { path: PathBuf },
    Recycle { path: PathBuf },
    Hardlink { src: PathBuf, dst: PathBuf },
    Symlink { src: PathBuf, link: PathBuf },
    SetReadOnly { path: PathBuf, read_only: bool },
    CreateFolder { dir: PathBuf, name: String },
    CreateFile { dir: PathBuf, name: String },
}

impl FileOp {
    pub fn run(&self, backend: &dyn Backend) -> Result<()> {
        match self {
            FileOp::Copy { src, dst, overwrite } => backend.copy_path(src, dst, *overwrite),
            FileOp::Move { src, dst, overwrite } => backend.move_path(src, dst, *overwrite),
            FileOp::Delete { path } => backend.delete_path(path),
            FileOp::Recycle { path } => backend.recycle_to_bin(path),
            FileOp::Hardlink { src, dst } => backend.create_hardlink(src, dst),
            FileOp::Symlink { src, link } => backend.create_symlink(src, link),
            FileOp::SetReadOnly { path, read_only } => backend.set_read_only(path, *read_only),
            FileOp::CreateFolder { dir, name } => backend.create_folder(dir, name),
            FileOp::CreateFile { dir, name } => backend.create_file(dir, name),
        }
    }
}

/// Hand-off to an external program. These spawn and return; nothing waits
/// on the launched process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOp {
    Open { paths: Vec<PathBuf> },
    Edit { paths: Vec<PathBuf> },
    History { path: PathBuf },
    OpenConfig,
    RunScript { line: String, cwd: PathBuf, paths: Vec<PathBuf> },
}

impl LaunchOp {
    pub fn run(&self, backend: &dyn Backend) -> Result<()> {
        match self {
            LaunchOp::Open { paths } => backend.open_paths(paths),
            LaunchOp::Edit { paths } => backend.edit_paths(paths),
            LaunchOp::History { path } => backend.show_history(path),
            LaunchOp::OpenConfig => backend.open_config_file(),
            LaunchOp::RunScript { line, cwd, paths } => backend.run_script(line, cwd, paths),
        }
    }
}

/// Work sent to the backend worker thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Listing {
        token: u64,
        path: PathBuf,
        limit: Option<usize>,
    },
    Volumes {
        token: u64,
    },
    Mutate {
        id: u64,
        /// Status-line text to show once the whole batch succeeds.
        done: String,
        ops: Vec<FileOp>,
    },
    Launch {
        op: LaunchOp,
    },
}

/// Reply for one [`Request`], tagged so listing replies can be matched
/// against the newest outstanding request and stale ones dropped.
#[derive(Debug)]
pub enum Completion {
    Listing {
        token: u64,
        path: PathBuf,
        result: Result<Vec<RawFileEntry>>,
    },
    Volumes {
        token: u64,
        result: Result<Vec<RawVolume>>,
    },
    Mutate {
        id: u64,
        done: String,
        result: Result<()>,
    },
    Launch {
        result: Result<()>,
    },
}

/// The filesystem service the explorer core talks to. Everything is
/// path-in, result-out; no method blocks on user interaction. Implementors
/// must be callable from the worker thread.
pub trait Backend: Send {
    fn list_directory(&self, path: &Path, limit: Option<usize>) -> Result<Vec<RawFileEntry>>;
    fn list_volumes(&self) -> Result<Vec<RawVolume>>;

    fn copy_path(&self, src: &Path, dst: &Path, overwrite: bool) -> Result<()>;
    fn move_path(&self, src: &Path, dst: &Path, overwrite: bool) -> Result<()>;
    fn delete_path(&self, path: &Path) -> Result<()>;
    fn recycle_to_bin(&self, path: &Path) -> Result<()>;
    fn create_hardlink(&self, src: &Path, dst: &Path) -> Result<()>;
    fn create_symlink(&self, src: &Path, link: &Path) -> Result<()>;
    fn create_junction(&self, target: &Path, link: &Path) -> Result<()>;
    fn set_read_only(&self, path: &Path, read_only: bool) -> Result<()>;
    fn create_folder(&self, dir: &Path, name: &str) -> Result<()>;
    fn create_file(&self, dir: &Path, name: &str) -> Result<()>;

    fn open_paths(&self, paths: &[PathBuf]) -> Result<()>;
    fn edit_paths(&self, paths: &[PathBuf]) -> Result<()>;
    fn show_history(&self, path: &Path) -> Result<()>;
    fn open_config_file(&self) -> Result<()>;
    fn run_script(&self, line: &str, cwd: &Path, paths: &[PathBuf]) -> Result<()>;
}

/// Local-filesystem backend built on `std::fs` plus the platform's opener
/// and shell.
pub struct LocalBackend {
    show_hidden: bool,
    trash_dir: PathBuf,
    config_file: PathBuf,
}

impl LocalBackend {
    pub fn new(show_hidden: bool, trash_dir: PathBuf, config_file: PathBuf) -> Self {
        LocalBackend {
            show_hidden,
            trash_dir,
            config_file,
        }
    }

    fn guard_transfer(&self, src: &Path, dst: &Path, overwrite: bool) -> Result<()> {
        if !src.exists() {
            return Err(ExplorerError::io_msg(format!(
                "{} does not exist",
                src.display()
            )));
        }
        if src == dst {
            return Err(ExplorerError::precondition(
                "source and destination are the same path",
            ));
        }
        if src.is_dir() && dst.starts_with(src) {
            return Err(ExplorerError::precondition(format!(
                "cannot place {} inside itself",
                src.display()
            )));
        }
        if dst.exists() {
            if !overwrite {
                return Err(ExplorerError::io_msg(format!(
                    "{} already exists",
                    dst.display()
                )));
            }
            remove_any(dst)?;
        }
        Ok(())
    }
}

impl Backend for LocalBackend {
    fn list_directory(&self, path: &Path, limit: Option<usize>) -> Result<Vec<RawFileEntry>> {
        let read = fs::read_dir(path)
            .map_err(|e| ExplorerError::io(format!("cannot read {}", path.display()), e))?;

        let mut rows = Vec::new();
        for entry in read {
            let entry =
                entry.map_err(|e| ExplorerError::io(format!("cannot read {}", path.display()), e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !self.show_hidden && name.starts_with('.') {
                continue;
            }
            if limit.is_some_and(|limit| rows.len() >= limit) {
                break;
            }
            let entry_path = entry.path();
            // Follow symlinks to classify them; a broken link lists as a file.
            let metadata = fs::metadata(&entry_path).or_else(|_| entry.metadata());
            let Ok(metadata) = metadata else {
                tracing::debug!(path = %entry_path.display(), "skipping unreadable entry");
                continue;
            };
            let is_directory = metadata.is_dir();
            rows.push(RawFileEntry {
                name,
                path: entry_path,
                is_directory,
                size_bytes: (!is_directory).then(|| metadata.len()),
            });
        }

        rows.sort_by(|a, b| {
            b.is_directory
                .cmp(&a.is_directory)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        Ok(rows)
    }

    #[cfg(target_os = "linux")]
    fn list_volumes(&self) -> Result<Vec<RawVolume>> {
        let mounts = fs::read_to_string("/proc/mounts")
            .map_err(|e| ExplorerError::io("cannot read /proc/mounts", e))?;

        let mut seen = std::collections::HashSet::new();
        let mut volumes = Vec::new();
        for line in mounts.lines() {
            let Some(mount_point) = line.split_whitespace().nth(1) else {
                continue;
            };
            // Pseudo-filesystem mounts would drown the real volumes.
            let noise = ["/proc", "/sys", "/dev", "/run"]
                .iter()
                .any(|prefix| mount_point == *prefix || mount_point.starts_with(&format!("{prefix}/")));
            if noise || !seen.insert(mount_point.to_string()) {
                continue;
            }
            volumes.push(RawVolume {
                path: PathBuf::from(mount_point),
                name: None,
                free_bytes: None,
                total_bytes: None,
            });
        }
        Ok(volumes)
    }

    #[cfg(target_os = "macos")]
    fn list_volumes(&self) -> Result<Vec<RawVolume>> {
        let mut volumes = vec![RawVolume {
            path: PathBuf::from("/"),
            name: None,
            free_bytes: None,
            total_bytes: None,
        }];
        if let Ok(read) = fs::read_dir("/Volumes") {
            for entry in read.flatten() {
                volumes.push(RawVolume {
                    path: entry.path(),
                    name: None,
                    free_bytes: None,
                    total_bytes: None,
                });
            }
        }
        Ok(volumes)
    }

    #[cfg(target_os = "windows")]
    fn list_volumes(&self) -> Result<Vec<RawVolume>> {
        let mut volumes = Vec::new();
        for letter in b'A'..=b'Z' {
            let root = format!("{}:\\", letter as char);
            if Path::new(&root).exists() {
                volumes.push(RawVolume {
                    path: PathBuf::from(root),
                    name: None,
                    free_bytes: None,
                    total_bytes: None,
                });
            }
        }
        Ok(volumes)
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    fn list_volumes(&self) -> Result<Vec<RawVolume>> {
        Ok(vec![RawVolume {
            path: PathBuf::from("/"),
            name: None,
            free_bytes: None,
            total_bytes: None,
        }])
    }

    fn copy_path(&self, src: &Path, dst: &Path, overwrite: bool) -> Result<()> {
        self.guard_transfer(src, dst, overwrite)?;
        if src.is_dir() {
            copy_tree(src, dst)
        } else {
            fs::copy(src, dst)
                .map(|_| ())
                .map_err(|e| ExplorerError::io(format!("cannot copy {}", src.display()), e))
        }
    }

    fn move_path(&self, src: &Path, dst: &Path, overwrite: bool) -> Result<()> {
        self.guard_transfer(src, dst, overwrite)?;
        if fs::rename(src, dst).is_ok() {
            return Ok(());
        }
        // Rename fails across devices; fall back to copy-then-delete.
        if src.is_dir() {
            copy_tree(src, dst)?;
        } else {
            fs::copy(src, dst)
                .map(|_| ())
                .map_err(|e| ExplorerError::io(format!("cannot move {}", src.display()), e))?;
        }
        remove_any(src)
    }

    fn delete_path(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(ExplorerError::io_msg(format!(
                "{} does not exist",
                path.display()
            )));
        }
        remove_any(path)
    }

    fn recycle_to_bin(&self, path: &Path) -> Result<()> {
        let Some(name) = path.file_name() else {
            return Err(ExplorerError::precondition(format!(
                "cannot move {} to the bin",
                path.display()
            )));
        };
        fs::create_dir_all(&self.trash_dir).map_err(|e| {
            ExplorerError::io(format!("cannot create {}", self.trash_dir.display()), e)
        })?;

        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let mut target = self
            .trash_dir
            .join(format!("{stamp}-{}", name.to_string_lossy()));
        let mut attempt = 1;
        while target.exists() {
            target = self
                .trash_dir
                .join(format!("{stamp}-{attempt}-{}", name.to_string_lossy()));
            attempt += 1;
        }
        self.move_path(path, &target, false)
    }

    fn create_hardlink(&self, src: &Path, dst: &Path) -> Result<()> {
        fs::hard_link(src, dst)
            .map_err(|e| ExplorerError::io(format!("cannot hardlink {}", src.display()), e))
    }

    #[cfg(unix)]
    fn create_symlink(&self, src: &Path, link: &Path) -> Result<()> {
        std::os::unix::fs::symlink(src, link)
            .map_err(|e| ExplorerError::io(format!("cannot symlink {}", src.display()), e))
    }

    #[cfg(windows)]
    fn create_symlink(&self, src: &Path, link: &Path) -> Result<()> {
        let result = if src.is_dir() {
            std::os::windows::fs::symlink_dir(src, link)
        } else {
            std::os::windows::fs::symlink_file(src, link)
        };
        match result {
            Ok(()) => Ok(()),
            // Symlink creation needs a privilege many accounts lack; for
            // directories a junction gives the same effect without it.
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied && src.is_dir() => {
                self.create_junction(src, link)
            }
            Err(e) => Err(ExplorerError::io(
                format!("cannot symlink {}", src.display()),
                e,
            )),
        }
    }

    #[cfg(not(any(unix, windows)))]
    fn create_symlink(&self, src: &Path, _link: &Path) -> Result<()> {
        Err(ExplorerError::io_msg(format!(
            "symlinks are not supported on this platform ({})",
            src.display()
        )))
    }

    #[cfg(windows)]
    fn create_junction(&self, target: &Path, link: &Path) -> Result<()> {
        let status = Command::new("cmd")
            .args(["/C", "mklink", "/J"])
            .arg(link)
            .arg(target)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| ExplorerError::io("cannot run mklink", e))?;
        if status.success() {
            Ok(())
        } else {
            Err(ExplorerError::io_msg(format!(
                "mklink failed for {}",
                link.display()
            )))
        }
    }

    #[cfg(not(windows))]
    fn create_junction(&self, _target: &Path, link: &Path) -> Result<()> {
        Err(ExplorerError::io_msg(format!(
            "junctions are not supported on this platform ({})",
            link.display()
        )))
    }

    fn set_read_only(&self, path: &Path, read_only: bool) -> Result<()> {
        let metadata = fs::metadata(path)
            .map_err(|e| ExplorerError::io(format!("cannot stat {}", path.display()), e))?;
        let mut permissions = metadata.permissions();
        // Mirrors the read-only/read-write toggle: on Unix this flips the
        // write bits for everyone, which is exactly the advertised effect.
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(read_only);
        fs::set_permissions(path, permissions)
            .map_err(|e| ExplorerError::io(format!("cannot chmod {}", path.display()), e))
    }

    fn create_folder(&self, dir: &Path, name: &str) -> Result<()> {
        let name = valid_entry_name(name)?;
        fs::create_dir(dir.join(name))
            .map_err(|e| ExplorerError::io(format!("cannot create folder {name}"), e))
    }

    fn create_file(&self, dir: &Path, name: &str) -> Result<()> {
        let name = valid_entry_name(name)?;
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dir.join(name))
            .map(|_| ())
            .map_err(|e| ExplorerError::io(format!("cannot create file {name}"), e))
    }

    fn open_paths(&self, paths: &[PathBuf]) -> Result<()> {
        for path in paths {
            spawn_detached(opener_command(path))
                .map_err(|e| ExplorerError::io(format!("cannot open {}", path.display()), e))?;
        }
        Ok(())
    }

    fn edit_paths(&self, paths: &[PathBuf]) -> Result<()> {
        let editor = std::env::var("VISUAL")
            .or_else(|_| std::env::var("EDITOR"))
            .ok()
            .filter(|e| !e.trim().is_empty());
        match editor {
            Some(editor) => {
                let mut command = Command::new(editor);
                command.args(paths);
                spawn_detached(command)
                    .map_err(|e| ExplorerError::io("cannot start the editor", e))
            }
            // No editor configured; the platform opener is the next best thing.
            None => self.open_paths(paths),
        }
    }

    fn show_history(&self, path: &Path) -> Result<()> {
        Err(ExplorerError::io_msg(format!(
            "path history is not available for {} on the local backend",
            path.display()
        )))
    }

    fn open_config_file(&self) -> Result<()> {
        if let Some(parent) = self.config_file.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ExplorerError::io(format!("cannot create {}", parent.display()), e)
            })?;
        }
        if !self.config_file.exists() {
            fs::write(&self.config_file, "{}\n").map_err(|e| {
                ExplorerError::io(format!("cannot create {}", self.config_file.display()), e)
            })?;
        }
        self.edit_paths(std::slice::from_ref(&self.config_file))
    }

    fn run_script(&self, line: &str, cwd: &Path, paths: &[PathBuf]) -> Result<()> {
        let joined = paths
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("\n");

        let mut command = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(line);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(line);
            c
        };
        command
            .current_dir(cwd)
            .env("FILEDECK_PATHS", joined)
            .env(
                "FILEDECK_PATH",
                paths.first().map(|p| p.as_os_str()).unwrap_or_default(),
            );
        spawn_detached(command).map_err(|e| ExplorerError::io("cannot start the script", e))
    }
}

fn valid_entry_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ExplorerError::precondition("the name is empty"));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(ExplorerError::precondition(format!(
            "{name:?} is not a valid entry name"
        )));
    }
    Ok(name)
}

fn remove_any(path: &Path) -> Result<()> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| ExplorerError::io(format!("cannot remove {}", path.display()), e))
}

/// Copies a directory tree, creating `dst` and descending breadth-first.
fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)
        .map_err(|e| ExplorerError::io(format!("cannot create {}", dst.display()), e))?;
    let read = fs::read_dir(src)
        .map_err(|e| ExplorerError::io(format!("cannot read {}", src.display()), e))?;
    for entry in read {
        let entry =
            entry.map_err(|e| ExplorerError::io(format!("cannot read {}", src.display()), e))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if from.is_dir() {
            copy_tree(&from, &to)?;
        } else {
            fs::copy(&from, &to)
                .map(|_| ())
                .map_err(|e| ExplorerError::io(format!("cannot copy {}", from.display()), e))?;
        }
    }
    Ok(())
}

fn opener_command(path: &Path) -> Command {
    #[cfg(target_os = "macos")]
    {
        let mut c = Command::new("open");
        c.arg(path);
        c
    }
    #[cfg(target_os = "windows")]
    {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]).arg(path);
        c
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        let mut c = Command::new("xdg-open");
        c.arg(path);
        c
    }
}

/// Spawns without waiting and without touching the terminal the TUI owns.
fn spawn_detached(mut command: Command) -> std::io::Result<()> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}


#[cfg(test)]
mod tests {
    use super::*;

    fn backend(dir: &Path) -> LocalBackend {
        LocalBackend::new(
            false,
            dir.join("trash"),
            dir.join("settings.json"),
        )
    }

    fn write(path: &Path, text: &str) {
        fs::write(path, text).expect("write test file");
    }

    #[test]
    fn listing_reports_names_kinds_and_sizes() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(&dir.path().join("notes.txt"), "hello");
        fs::create_dir(dir.path().join("sub")).expect("mkdir");

        let rows = backend(dir.path())
            .list_directory(dir.path(), None)
            .expect("list");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "sub");
        assert!(rows[0].is_directory);
        assert_eq!(rows[0].size_bytes, None);
        assert_eq!(rows[1].name, "notes.txt");
        assert!(!rows[1].is_directory);
        assert_eq!(rows[1].size_bytes, Some(5));
    }

    #[test]
    fn listing_sorts_directories_first_then_by_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(&dir.path().join("b.txt"), "");
        write(&dir.path().join("A.txt"), "");
        fs::create_dir(dir.path().join("zdir")).expect("mkdir");

        let rows = backend(dir.path())
            .list_directory(dir.path(), None)
            .expect("list");
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["zdir", "A.txt", "b.txt"]);
    }

    #[test]
    fn hidden_entries_are_filtered_unless_enabled() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(&dir.path().join(".hidden"), "");
        write(&dir.path().join("shown"), "");

        let hidden_off = backend(dir.path())
            .list_directory(dir.path(), None)
            .expect("list");
        assert_eq!(hidden_off.len(), 1);
        assert_eq!(hidden_off[0].name, "shown");

        let all = LocalBackend::new(true, dir.path().join("t"), dir.path().join("c"))
            .list_directory(dir.path(), None)
            .expect("list");
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn listing_honors_the_limit() {
        let dir = tempfile::tempdir().expect("tempdir");
        for i in 0..5 {
            write(&dir.path().join(format!("f{i}")), "");
        }
        let rows = backend(dir.path())
            .list_directory(dir.path(), Some(3))
            .expect("list");
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn listing_a_missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = backend(dir.path())
            .list_directory(&dir.path().join("nope"), None)
            .unwrap_err();
        assert!(matches!(err, ExplorerError::Io(_)));
    }

    #[test]
    fn copy_file_copies_the_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = dir.path().join("a.txt");
        let dst = dir.path().join("b.txt");
        write(&src, "payload");

        backend(dir.path()).copy_path(&src, &dst, false).expect("copy");
        assert_eq!(fs::read_to_string(&dst).expect("read"), "payload");
        assert!(src.exists());
    }

    #[test]
    fn copy_without_overwrite_refuses_an_existing_destination() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = dir.path().join("a.txt");
        let dst = dir.path().join("b.txt");
        write(&src, "new");
        write(&dst, "old");

        let err = backend(dir.path()).copy_path(&src, &dst, false).unwrap_err();
        assert!(matches!(err, ExplorerError::Io(_)));
        assert_eq!(fs::read_to_string(&dst).expect("read"), "old");

        backend(dir.path()).copy_path(&src, &dst, true).expect("overwrite");
        assert_eq!(fs::read_to_string(&dst).expect("read"), "new");
    }

    #[test]
    fn copy_descends_into_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = dir.path().join("tree");
        fs::create_dir_all(src.join("deep")).expect("mkdir");
        write(&src.join("top.txt"), "top");
        write(&src.join("deep").join("leaf.txt"), "leaf");

        let dst = dir.path().join("copy");
        backend(dir.path()).copy_path(&src, &dst, false).expect("copy");
        assert_eq!(fs::read_to_string(dst.join("top.txt")).expect("read"), "top");
        assert_eq!(
            fs::read_to_string(dst.join("deep").join("leaf.txt")).expect("read"),
            "leaf"
        );
    }

    #[test]
    fn copying_a_folder_into_itself_is_rejected_before_any_io() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = dir.path().join("tree");
        fs::create_dir(&src).expect("mkdir");
        let err = backend(dir.path())
            .copy_path(&src, &src.join("inner"), false)
            .unwrap_err();
        assert!(matches!(err, ExplorerError::Precondition(_)));
        assert!(!src.join("inner").exists());
    }

    #[test]
    fn move_leaves_no_source_behind() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = dir.path().join("a.txt");
        let dst = dir.path().join("moved.txt");
        write(&src, "payload");

        backend(dir.path()).move_path(&src, &dst, false).expect("move");
        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dst).expect("read"), "payload");
    }

    #[test]
    fn delete_removes_files_and_trees() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("f.txt");
        write(&file, "");
        let tree = dir.path().join("tree");
        fs::create_dir_all(tree.join("deep")).expect("mkdir");

        let b = backend(dir.path());
        b.delete_path(&file).expect("delete file");
        b.delete_path(&tree).expect("delete tree");
        assert!(!file.exists());
        assert!(!tree.exists());

        let err = b.delete_path(&file).unwrap_err();
        assert!(matches!(err, ExplorerError::Io(_)));
    }

    #[test]
    fn recycle_moves_into_the_trash_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let victim = dir.path().join("old.txt");
        write(&victim, "bytes");

        let b = backend(dir.path());
        b.recycle_to_bin(&victim).expect("recycle");
        assert!(!victim.exists());

        let trashed: Vec<_> = fs::read_dir(dir.path().join("trash"))
            .expect("trash dir")
            .flatten()
            .collect();
        assert_eq!(trashed.len(), 1);
        let name = trashed[0].file_name().to_string_lossy().into_owned();
        assert!(name.ends_with("-old.txt"), "got {name}");
    }

    #[test]
    fn hardlink_shares_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = dir.path().join("orig.txt");
        let dst = dir.path().join("link.txt");
        write(&src, "shared");

        backend(dir.path()).create_hardlink(&src, &dst).expect("hardlink");
        assert_eq!(fs::read_to_string(&dst).expect("read"), "shared");
    }

    #[cfg(unix)]
    #[test]
    fn symlink_points_back_at_the_source() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = dir.path().join("orig.txt");
        let link = dir.path().join("link.txt");
        write(&src, "");

        backend(dir.path()).create_symlink(&src, &link).expect("symlink");
        assert_eq!(fs::read_link(&link).expect("read_link"), src);
    }

    #[cfg(not(windows))]
    #[test]
    fn junctions_are_unsupported_off_windows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = backend(dir.path())
            .create_junction(dir.path(), &dir.path().join("j"))
            .unwrap_err();
        assert!(matches!(err, ExplorerError::Io(_)));
    }

    #[test]
    fn read_only_flag_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("f.txt");
        write(&file, "");

        let b = backend(dir.path());
        b.set_read_only(&file, true).expect("set");
        assert!(fs::metadata(&file).expect("stat").permissions().readonly());
        b.set_read_only(&file, false).expect("clear");
        assert!(!fs::metadata(&file).expect("stat").permissions().readonly());
    }

    #[test]
    fn create_folder_and_file_reject_duplicates_and_bad_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let b = backend(dir.path());

        b.create_folder(dir.path(), "made").expect("mkdir");
        assert!(dir.path().join("made").is_dir());
        assert!(b.create_folder(dir.path(), "made").is_err());

        b.create_file(dir.path(), "made.txt").expect("mkfile");
        assert!(dir.path().join("made.txt").is_file());
        assert!(b.create_file(dir.path(), "made.txt").is_err());

        let err = b.create_folder(dir.path(), "a/b").unwrap_err();
        assert!(matches!(err, ExplorerError::Precondition(_)));
        let err = b.create_file(dir.path(), "  ").unwrap_err();
        assert!(matches!(err, ExplorerError::Precondition(_)));
    }

    #[test]
    fn history_is_unsupported_locally() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = backend(dir.path()).show_history(dir.path()).unwrap_err();
        assert!(matches!(err, ExplorerError::Io(_)));
    }

    #[test]
    fn file_ops_dispatch_to_the_matching_backend_call() {
        let memory = testing::MemoryBackend::new();
        FileOp::Copy {
            src: PathBuf::from("/a"),
            dst: PathBuf::from("/b"),
            overwrite: false,
        }
        .run(&memory)
        .expect("copy");
        FileOp::Recycle {
            path: PathBuf::from("/c"),
        }
        .run(&memory)
        .expect("recycle");
        assert_eq!(memory.calls(), ["copy /a /b false", "recycle /c"]);
    }
}
