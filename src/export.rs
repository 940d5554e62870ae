//! Still-image and geometry export.
//!
//! Single exports run on the caller's thread. [`BatchExport`] walks a store,
//! or a selection of its entries, on a worker thread and reports progress
//! over a channel.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use image::{ImageFormat, RgbaImage};
use thiserror::Error;

use crate::colors;
use crate::mesh::{DecodeError, DecodedMesh, MeshDecoder};
use crate::obj;
use crate::render::Frame;
use crate::store::{ModelStore, StoreError};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export")]
    EmptyFrame,

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to decode model {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: DecodeError,
    },

    #[error("export worker panicked")]
    WorkerPanicked,
}

impl ExportError {
    fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Convert a frame's composite to an RGBA image.
pub fn frame_to_image(frame: &Frame) -> Option<RgbaImage> {
    let bytes = frame
        .composite()
        .into_iter()
        .flat_map(colors::unpack_argb)
        .collect();
    RgbaImage::from_raw(frame.width(), frame.height(), bytes)
}

/// Save the composite of `frame` (fill plus overlays) as a PNG.
///
/// A frame with zero width or height cannot be exported.
pub fn export_png(frame: &Frame, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    if frame.width() == 0 || frame.height() == 0 {
        return Err(ExportError::EmptyFrame);
    }
    let image = frame_to_image(frame).ok_or(ExportError::EmptyFrame)?;
    image.save_with_format(path, ImageFormat::Png)?;
    log::info!("exported {}x{} image to {}", frame.width(), frame.height(), path.display());
    Ok(())
}

/// Paths written by [`export_obj`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjFiles {
    pub obj: PathBuf,
    pub mtl: PathBuf,
}

/// Write `<stem>.obj` and `<stem>.mtl` into `dir`.
///
/// The mesh gets the same orientation correction as the viewer applies, so
/// the exported model faces the way it was shown.
pub fn export_obj(mesh: DecodedMesh, dir: &Path, stem: &str) -> Result<ObjFiles, ExportError> {
    let mesh = mesh.into_viewer_orientation();
    let mtl_name = format!("{stem}.mtl");
    let files = ObjFiles {
        obj: dir.join(format!("{stem}.obj")),
        mtl: dir.join(&mtl_name),
    };

    write_file(&files.mtl, |out| obj::write_mtl(&mesh, out))?;
    write_file(&files.obj, |out| obj::write_obj(&mesh, &mtl_name, out))?;

    log::debug!("exported {} faces to {}", mesh.face_count(), files.obj.display());
    Ok(files)
}

fn write_file(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<File>) -> io::Result<()>,
) -> Result<(), ExportError> {
    let file = File::create(path).map_err(ExportError::io(path))?;
    let mut out = BufWriter::new(file);
    write(&mut out)
        .and_then(|()| out.flush())
        .map_err(ExportError::io(path))
}

/// Export stem for a store entry: its name up to the first `.`.
fn stem_of(name: &str) -> &str {
    name.split_once('.').map_or(name, |(stem, _)| stem)
}

/// How far a batch export has got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

impl Progress {
    /// Completed fraction in [0, 1]. An empty batch is complete.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.done as f64 / self.total as f64
        }
    }
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}%", self.fraction() * 100.0)
    }
}

/// Outcome of a batch that was not aborted by an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub exported: usize,
    pub total: usize,
    pub cancelled: bool,
}

/// Exports models of a store to OBJ/MTL on a worker thread.
///
/// The first failure stops the batch. [`BatchExport::cancel`] asks the
/// worker to stop after the model it is on.
pub struct BatchExport {
    progress: mpsc::Receiver<Progress>,
    cancel: Arc<AtomicBool>,
    worker: thread::JoinHandle<Result<BatchSummary, ExportError>>,
}

impl BatchExport {
    /// Export every model in `store`.
    pub fn spawn<S, D>(store: Arc<S>, decoder: Arc<D>, dir: impl Into<PathBuf>) -> io::Result<Self>
    where
        S: ModelStore + ?Sized + 'static,
        D: MeshDecoder + Send + Sync + ?Sized + 'static,
    {
        let indices = (0..store.len()).collect();
        Self::spawn_selection(store, decoder, indices, dir)
    }

    /// Export the store entries at `indices`, in that order.
    pub fn spawn_selection<S, D>(
        store: Arc<S>,
        decoder: Arc<D>,
        indices: Vec<usize>,
        dir: impl Into<PathBuf>,
    ) -> io::Result<Self>
    where
        S: ModelStore + ?Sized + 'static,
        D: MeshDecoder + Send + Sync + ?Sized + 'static,
    {
        let dir = dir.into();
        let cancel = Arc::new(AtomicBool::new(false));
        let (sender, progress) = mpsc::channel();

        let worker = thread::Builder::new().name("model export".to_owned()).spawn({
            let cancel = Arc::clone(&cancel);
            move || run_batch(&*store, &*decoder, &indices, &dir, &cancel, &sender)
        })?;

        Ok(Self {
            progress,
            cancel,
            worker,
        })
    }

    /// Progress updates, one per exported model.
    pub fn progress(&self) -> &mpsc::Receiver<Progress> {
        &self.progress
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Wait for the worker and return its outcome.
    pub fn join(self) -> Result<BatchSummary, ExportError> {
        self.worker
            .join()
            .map_err(|_| ExportError::WorkerPanicked)?
    }
}

fn run_batch<S, D>(
    store: &S,
    decoder: &D,
    indices: &[usize],
    dir: &Path,
    cancel: &AtomicBool,
    progress: &mpsc::Sender<Progress>,
) -> Result<BatchSummary, ExportError>
where
    S: ModelStore + ?Sized,
    D: MeshDecoder + ?Sized,
{
    fs::create_dir_all(dir).map_err(ExportError::io(dir))?;

    let total = indices.len();
    log::info!("exporting {total} models to {}", dir.display());

    for (done, &index) in indices.iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            log::info!("export cancelled after {done} of {total} models");
            return Ok(BatchSummary {
                exported: done,
                total,
                cancelled: true,
            });
        }

        let name = store.name(index).unwrap_or_default().to_owned();
        let bytes = store.read(index)?;
        let mesh = decoder.decode(&bytes).map_err(|source| ExportError::Decode {
            name: name.clone(),
            source,
        })?;
        export_obj(mesh, dir, stem_of(&name))?;

        // The receiver may have been dropped; the export still completes.
        let _ = progress.send(Progress {
            done: done + 1,
            total,
        });
    }

    log::info!("exported {total} models to {}", dir.display());
    Ok(BatchSummary {
        exported: total,
        total,
        cancelled: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::Rgb;
    use crate::math::Vec4;
    use crate::obj::ObjDecoder;
    use crate::render::{render_frame, RenderFlags, RenderFrameInputs};
    use crate::store::MemoryStore;
    use crate::transform::Transform;
    use crate::triangle::Triangle;
    use std::sync::Barrier;

    const TRIANGLE_OBJ: &str = "v 1 2 3\nv 4 5 6\nv 7 8 10\nf 1 2 3\n";

    fn frame() -> Frame {
        let scene = [Triangle::new(
            Vec4::point(-4.0, -4.0, 0.0),
            Vec4::point(4.0, -4.0, 0.0),
            Vec4::point(-4.0, 4.0, 0.0),
            Rgb::RED,
        )];
        let inputs =
            RenderFrameInputs::new(Transform::default(), RenderFlags::FILLED_SHADED, 16, 12);
        render_frame(&scene, &inputs)
    }

    #[test]
    fn png_matches_composite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.png");
        let frame = frame();
        export_png(&frame, &path).unwrap();

        let image = image::open(&path).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (16, 12));
        assert_eq!(image.get_pixel(6, 6).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(15, 11).0, [0, 0, 0, 0]);
    }

    #[test]
    fn png_of_empty_frame_fails() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = RenderFrameInputs::new(Transform::default(), RenderFlags::FILLED_SHADED, 0, 5);
        let frame = render_frame(&[], &inputs);
        assert!(matches!(
            export_png(&frame, dir.path().join("x.png")),
            Err(ExportError::EmptyFrame)
        ));
    }

    #[test]
    fn obj_export_is_rotated_half_turn() {
        let dir = tempfile::tempdir().unwrap();
        let mesh = ObjDecoder::new().decode(TRIANGLE_OBJ.as_bytes()).unwrap();
        let files = export_obj(mesh, dir.path(), "42").unwrap();

        assert_eq!(files.obj, dir.path().join("42.obj"));
        let obj = fs::read_to_string(&files.obj).unwrap();
        assert!(obj.contains("mtllib 42.mtl\nv -1.0 2.0 -3.0\n"));
        assert!(obj.ends_with("usemtl 16777215\nf 1 2 3\n"));
        let mtl = fs::read_to_string(&files.mtl).unwrap();
        assert_eq!(mtl, "newmtl 16777215\nKd 1.0 1.0 1.0\n\n");
    }

    #[test]
    fn batch_exports_every_model() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("dump");
        let mut store = MemoryStore::new();
        store
            .push("0.obj", TRIANGLE_OBJ.into())
            .push("1.obj", TRIANGLE_OBJ.into())
            .push("tree", TRIANGLE_OBJ.into());

        let batch =
            BatchExport::spawn(Arc::new(store), Arc::new(ObjDecoder::new()), &out).unwrap();
        let summary = batch.join().unwrap();

        assert_eq!(
            summary,
            BatchSummary {
                exported: 3,
                total: 3,
                cancelled: false
            }
        );
        for stem in ["0", "1", "tree"] {
            assert!(out.join(format!("{stem}.obj")).is_file());
            assert!(out.join(format!("{stem}.mtl")).is_file());
        }
    }

    #[test]
    fn batch_reports_progress() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = MemoryStore::new();
        store.push("a", TRIANGLE_OBJ.into()).push("b", TRIANGLE_OBJ.into());

        let batch =
            BatchExport::spawn(Arc::new(store), Arc::new(ObjDecoder::new()), dir.path()).unwrap();
        let updates: Vec<Progress> = batch.progress().iter().collect();
        batch.join().unwrap();

        assert_eq!(
            updates,
            vec![Progress { done: 1, total: 2 }, Progress { done: 2, total: 2 }]
        );
        assert_eq!(updates[0].to_string(), "50.00%");
    }

    #[test]
    fn batch_stops_on_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = MemoryStore::new();
        store
            .push("good", TRIANGLE_OBJ.into())
            .push("bad", b"f 1 2 3\n".to_vec())
            .push("never", TRIANGLE_OBJ.into());

        let batch =
            BatchExport::spawn(Arc::new(store), Arc::new(ObjDecoder::new()), dir.path()).unwrap();
        let err = batch.join().unwrap_err();

        assert!(matches!(err, ExportError::Decode { ref name, .. } if name == "bad"));
        assert!(dir.path().join("good.obj").is_file());
        assert!(!dir.path().join("never.obj").exists());
    }

    #[test]
    fn cancelled_batch_stops_early() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = MemoryStore::new();
        for i in 0..4 {
            store.push(i.to_string(), TRIANGLE_OBJ.into());
        }

        // Cancel before the worker can be observed running: the flag is
        // checked before every model, including the first.
        let cancel = AtomicBool::new(true);
        let (sender, _receiver) = mpsc::channel();
        let indices: Vec<usize> = (0..store.len()).collect();
        let summary =
            run_batch(&store, &ObjDecoder::new(), &indices, dir.path(), &cancel, &sender).unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.exported, 0);
        assert!(!dir.path().join("0.obj").exists());
    }

    #[test]
    fn batch_exports_only_selected_models() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = MemoryStore::new();
        for name in ["12", "7", "120", "3"] {
            store.push(name, TRIANGLE_OBJ.into());
        }

        let batch = BatchExport::spawn_selection(
            Arc::new(store),
            Arc::new(ObjDecoder::new()),
            vec![0, 2],
            dir.path(),
        )
        .unwrap();
        let updates: Vec<Progress> = batch.progress().iter().collect();
        let summary = batch.join().unwrap();

        assert_eq!(
            summary,
            BatchSummary {
                exported: 2,
                total: 2,
                cancelled: false
            }
        );
        assert_eq!(updates.last(), Some(&Progress { done: 2, total: 2 }));
        assert!(dir.path().join("12.obj").is_file());
        assert!(dir.path().join("120.obj").is_file());
        assert!(!dir.path().join("7.obj").exists());
        assert!(!dir.path().join("3.obj").exists());
    }

    #[test]
    fn cancel_stops_running_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = MemoryStore::new();
        for i in 0..4 {
            store.push(i.to_string(), TRIANGLE_OBJ.into());
        }

        // The first decode holds the worker until the batch has been cancelled.
        let started = Arc::new(Barrier::new(2));
        let resume = Arc::new(Barrier::new(2));
        let decoder = {
            let started = Arc::clone(&started);
            let resume = Arc::clone(&resume);
            let first = AtomicBool::new(true);
            move |bytes: &[u8]| -> Result<DecodedMesh, DecodeError> {
                if first.swap(false, Ordering::SeqCst) {
                    started.wait();
                    resume.wait();
                }
                ObjDecoder::new().decode(bytes)
            }
        };

        let batch = BatchExport::spawn(Arc::new(store), Arc::new(decoder), dir.path()).unwrap();
        started.wait();
        batch.cancel();
        resume.wait();
        let summary = batch.join().unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.exported, 1);
        assert_eq!(summary.total, 4);
        assert!(dir.path().join("0.obj").is_file());
        assert!(!dir.path().join("1.obj").exists());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ExportError>();
    }

    #[test]
    fn progress_fraction() {
        assert_eq!(Progress { done: 0, total: 0 }.fraction(), 1.0);
        assert_eq!(Progress { done: 1, total: 4 }.to_string(), "25.00%");
    }
}
