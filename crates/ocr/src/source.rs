use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Where images to solve come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    /// New captures dropped into the watched capture folder.
    Camera,
    /// An existing image file picked by the user.
    #[default]
    Gallery,
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Camera => write!(f, "camera"),
            ImageSource::Gallery => write!(f, "gallery"),
        }
    }
}

impl std::str::FromStr for ImageSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "camera" => Ok(ImageSource::Camera),
            "gallery" => Ok(ImageSource::Gallery),
            other => Err(format!("Unknown image source: '{other}'")),
        }
    }
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "gif", "tif", "tiff"];

/// Whether `path` has an extension the preprocessor can decode.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Whether a watcher event means a capture is complete: its writer closed
/// the file, or it was renamed into the folder already written.
fn is_finished_capture(kind: &notify::EventKind) -> bool {
    use notify::event::{AccessKind, AccessMode, ModifyKind, RenameMode};
    use notify::EventKind;

    matches!(
        kind,
        EventKind::Access(AccessKind::Close(AccessMode::Write))
            | EventKind::Modify(ModifyKind::Name(RenameMode::To))
    )
}

/// Spawn a notify watcher on `capture_dir` that sends finished image files
/// to `tx`. Empty files are skipped; their real content arrives with a later
/// close. The returned watcher must be kept alive for watching to continue.
pub fn spawn_capture_watcher(
    capture_dir: &Path,
    tx: mpsc::Sender<PathBuf>,
) -> notify::Result<impl notify::Watcher> {
    use notify::{RecursiveMode, Watcher};

    let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
        match event {
            Ok(ev) if is_finished_capture(&ev.kind) => {
                for path in ev.paths.into_iter().filter(|p| is_image_file(p)) {
                    let len = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
                    if len == 0 {
                        continue;
                    }
                    if tx.try_send(path).is_err() {
                        tracing::warn!("capture queue full or closed; dropping image");
                    }
                }
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("capture watcher error: {e}"),
        }
    })?;

    watcher.watch(capture_dir, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}
