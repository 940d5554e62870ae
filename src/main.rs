//! Interactive viewer.
//!
//! Usage: `modelview [MODEL_DIR] [SEARCH]`
//!
//! Lists the models in `MODEL_DIR` whose names contain `SEARCH` and shows the
//! first one. Drag to rotate (ctrl-drag pans), right-drag or scroll to zoom,
//! arrow keys step through models, `1`-`4` toggle fill, shading, edges and
//! vertices, `P` saves a PNG, `O` exports the model, `B` exports every listed model
//! and `C` cancels that batch.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use modelview::config::ViewerConfig;
use modelview::controls::ViewControls;
use modelview::export::{self, BatchExport};
use modelview::mesh::{self, MeshDecoder};
use modelview::obj::ObjDecoder;
use modelview::render::render_frame;
use modelview::scene::SceneHandle;
use modelview::store::{Catalog, DirectoryStore, ModelStore};
use modelview::window::{Command, FrameLimiter, Window, WindowEvent};

struct App {
    config: ViewerConfig,
    controls: ViewControls,
    scene: SceneHandle,
    store: Arc<DirectoryStore>,
    decoder: Arc<ObjDecoder>,
    /// Store indices that pass the search filter.
    listing: Vec<usize>,
    selected: usize,
    batch: Option<BatchExport>,
}

impl App {
    fn new(model_dir: Option<PathBuf>, query: &str) -> Result<Self, Box<dyn Error>> {
        let config = ViewerConfig::load().unwrap_or_else(|e| {
            log::warn!("{e}. Using defaults.");
            ViewerConfig::default()
        });

        let (store, decoder) = match model_dir {
            Some(dir) => (
                DirectoryStore::open(&dir)?,
                ObjDecoder::with_material_dir(dir),
            ),
            None => (DirectoryStore::default(), ObjDecoder::new()),
        };
        let listing = Catalog::new(query).filter(&store);
        log::info!("{} of {} models match {query:?}", listing.len(), store.len());

        let mut app = Self {
            controls: ViewControls::from_config(&config.controls),
            config,
            scene: SceneHandle::default(),
            store: Arc::new(store),
            decoder: Arc::new(decoder),
            listing,
            selected: 0,
            batch: None,
        };
        app.select(0);
        Ok(app)
    }

    fn current(&self) -> Option<usize> {
        self.listing.get(self.selected).copied()
    }

    fn select(&mut self, position: usize) {
        self.selected = position;
        let Some(index) = self.current() else {
            self.scene.clear();
            return;
        };
        let name = self.store.name(index).unwrap_or_default();
        match self.store.read(index) {
            Ok(bytes) => {
                if let Ok(faces) = mesh::select_model(&self.scene, &*self.decoder, &bytes) {
                    log::info!("showing {name} ({faces} faces)");
                }
            }
            Err(e) => {
                log::warn!("{e}");
                self.scene.clear();
            }
        }
    }

    fn step(&mut self, forward: bool) {
        let len = self.listing.len();
        if len == 0 {
            return;
        }
        let next = if forward {
            (self.selected + 1) % len
        } else {
            (self.selected + len - 1) % len
        };
        self.select(next);
    }

    fn stem(&self) -> Option<String> {
        let name = self.store.name(self.current()?)?;
        Some(name.split_once('.').map_or(name, |(stem, _)| stem).to_owned())
    }

    fn run_command(&mut self, command: Command, width: u32, height: u32) {
        match command {
            Command::NextModel => self.step(true),
            Command::PreviousModel => self.step(false),
            Command::ToggleFill => toggle(&mut self.controls.flags_mut().fill),
            Command::ToggleShade => toggle(&mut self.controls.flags_mut().shade),
            Command::ToggleEdges => toggle(&mut self.controls.flags_mut().edges),
            Command::ToggleVertices => toggle(&mut self.controls.flags_mut().vertices),
            Command::ExportImage => self.export_image(width, height),
            Command::ExportModel => self.export_model(),
            Command::ExportAll => self.export_all(),
            Command::CancelExport => {
                if let Some(batch) = &self.batch {
                    batch.cancel();
                }
            }
        }
    }

    fn export_image(&self, width: u32, height: u32) {
        let scene = self.scene.snapshot();
        let Some(stem) = self.stem().filter(|_| !scene.is_empty()) else {
            return;
        };
        let frame = render_frame(&scene, &self.controls.frame_inputs(width, height));
        let path = self.config.export.directory.join(format!("{stem}.png"));
        if let Err(e) = export::export_png(&frame, &path) {
            log::error!("{e}");
        }
    }

    fn export_model(&self) {
        let (Some(index), Some(stem)) = (self.current(), self.stem()) else {
            return;
        };
        let result = self
            .store
            .read(index)
            .map_err(export::ExportError::from)
            .and_then(|bytes| {
                self.decoder
                    .decode(&bytes)
                    .map_err(|source| export::ExportError::Decode {
                        name: stem.clone(),
                        source,
                    })
            })
            .and_then(|mesh| export::export_obj(mesh, &self.config.export.directory, &stem));
        match result {
            Ok(files) => log::info!("wrote {}", files.obj.display()),
            Err(e) => log::error!("{e}"),
        }
    }

    fn export_all(&mut self) {
        if self.batch.is_some() {
            log::warn!("an export is already running");
            return;
        }
        match BatchExport::spawn_selection(
            Arc::clone(&self.store),
            Arc::clone(&self.decoder),
            self.listing.clone(),
            self.config.export.batch_directory.clone(),
        ) {
            Ok(batch) => self.batch = Some(batch),
            Err(e) => log::error!("failed to start export: {e}"),
        }
    }

    /// Report batch progress and collect the result once the worker is done.
    fn poll_batch(&mut self) {
        let Some(batch) = &self.batch else {
            return;
        };
        if let Some(progress) = batch.progress().try_iter().last() {
            log::info!("export {progress}");
        }
        if !batch.is_finished() {
            return;
        }
        if let Some(batch) = self.batch.take() {
            match batch.join() {
                Ok(summary) => log::info!(
                    "export finished: {} of {} models{}",
                    summary.exported,
                    summary.total,
                    if summary.cancelled { " (cancelled)" } else { "" }
                ),
                Err(e) => log::error!("export failed: {e}"),
            }
        }
    }
}

fn toggle(flag: &mut bool) {
    *flag = !*flag;
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    log::info!("Starting modelview");

    let mut args = std::env::args().skip(1);
    let model_dir = args.next().map(PathBuf::from);
    let query = args.next().unwrap_or_default();

    let mut app = App::new(model_dir, &query)?;
    let window_config = app.config.window.clone();
    let mut window = Window::new(&window_config.title, window_config.width, window_config.height)?;
    let mut limiter = FrameLimiter::new(&window);

    'running: loop {
        for event in window.poll_events() {
            match event {
                WindowEvent::Quit => break 'running,
                WindowEvent::Resize(width, height) => window.resize(width, height)?,
                WindowEvent::Pressed { x, y } => app.controls.press(x, y),
                WindowEvent::Dragged {
                    x,
                    y,
                    button,
                    ctrl,
                } => app.controls.drag(x, y, button, ctrl),
                WindowEvent::Scrolled(delta) => app.controls.scroll(delta),
                WindowEvent::Command(command) => {
                    app.run_command(command, window.width(), window.height())
                }
            }
        }
        app.poll_batch();

        let scene = app.scene.snapshot();
        let frame = render_frame(
            &scene,
            &app.controls.frame_inputs(window.width(), window.height()),
        );
        window.present(&frame.composite_bytes())?;

        limiter.wait_and_get_delta(&window);
    }

    if let Some(batch) = app.batch.take() {
        batch.cancel();
        let _ = batch.join();
    }
    Ok(())
}
