//=========================================================================
// Asset Loader
//=========================================================================
//
// Resolves named resources to textures through a pluggable source.
//
// Flow:
//   Scene::new → add(name)… ──> Director → load()
//                                              ↓
//   Engine::frame → poll() ── resolves queue ── LoadStatus::Completed
//                                              ↓
//                               Scene::initialized() reads texture(name)
//
// `reset()` discards everything pending, so a destroyed scene's load can
// never complete into the scene that replaces it.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::rc::Rc;

use kurbo::Size;
use log::{debug, trace};

//=== Internal Dependencies ===============================================

use crate::core::error::AssetError;

//=== Texture =============================================================

/// A resolved, drawable image reference.
///
/// Cheap to clone; the name is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    name: Rc<str>,
    width: u32,
    height: u32,
}

impl Texture {
    pub fn new(name: &str, width: u32, height: u32) -> Self {
        Self {
            name: Rc::from(name),
            width,
            height,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }
}

//=== AssetSource =========================================================

/// Backend that turns a resource name into a texture.
///
/// Implemented by whatever actually decodes images; the engine only cares
/// that a name resolves.
pub trait AssetSource {
    fn fetch(&mut self, name: &str) -> Result<Texture, AssetError>;
}

/// In-memory source mapping names to texture sizes.
#[derive(Debug, Default, Clone)]
pub struct StaticSource {
    entries: HashMap<String, (u32, u32)>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, builder style.
    pub fn with(mut self, name: &str, width: u32, height: u32) -> Self {
        self.entries.insert(name.to_string(), (width, height));
        self
    }
}

impl AssetSource for StaticSource {
    fn fetch(&mut self, name: &str) -> Result<Texture, AssetError> {
        self.entries
            .get(name)
            .map(|&(width, height)| Texture::new(name, width, height))
            .ok_or_else(|| AssetError::Unresolved {
                name: name.to_string(),
                reason: "not present in static source".to_string(),
            })
    }
}

//=== LoadStatus ==========================================================

/// Result of polling the loader once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// No load was requested.
    Idle,

    /// The requested load finished during this poll.
    Completed,
}

//=== AssetLoader =========================================================

/// Queue-then-load resource resolver shared by all scenes.
pub struct AssetLoader {
    source: Box<dyn AssetSource>,
    queued: Vec<String>,
    resources: HashMap<String, Texture>,
    requested: bool,
}

impl AssetLoader {
    pub fn new(source: Box<dyn AssetSource>) -> Self {
        Self {
            source,
            queued: Vec::new(),
            resources: HashMap::new(),
            requested: false,
        }
    }

    //--- Requests ---------------------------------------------------------

    /// Queues a resource for the next load.
    pub fn add(&mut self, name: &str) -> &mut Self {
        if !self.resources.contains_key(name) && !self.queued.iter().any(|q| q == name) {
            self.queued.push(name.to_string());
        }
        self
    }

    /// Queues several resources at once.
    pub fn add_all<'a, I>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        for name in names {
            self.add(name);
        }
        self
    }

    /// Requests resolution of everything queued.
    ///
    /// Completion is reported by the next [`poll`](Self::poll), even when
    /// nothing was queued.
    pub fn load(&mut self) {
        self.requested = true;
    }

    /// True while a requested load has not completed yet.
    pub fn is_loading(&self) -> bool {
        self.requested
    }

    //--- Resolution -------------------------------------------------------

    /// Resolves queued resources if a load was requested.
    ///
    /// # Errors
    ///
    /// Returns the first source failure. The failed name stays queued.
    pub fn poll(&mut self) -> Result<LoadStatus, AssetError> {
        if !self.requested {
            return Ok(LoadStatus::Idle);
        }

        while let Some(name) = self.queued.first() {
            let texture = self.source.fetch(name)?;
            trace!(target: "assets", "Resolved `{}` ({}x{})", name, texture.width(), texture.height());
            let name = self.queued.remove(0);
            self.resources.insert(name, texture);
        }

        self.requested = false;
        debug!(target: "assets", "Load complete ({} resources available)", self.resources.len());
        Ok(LoadStatus::Completed)
    }

    //--- Queries ----------------------------------------------------------

    /// Returns a loaded texture.
    ///
    /// # Errors
    ///
    /// [`AssetError::Missing`] if `name` was never loaded. Content code is
    /// expected to propagate this as a fatal fault.
    pub fn texture(&self, name: &str) -> Result<Texture, AssetError> {
        self.resources
            .get(name)
            .cloned()
            .ok_or_else(|| AssetError::Missing(name.to_string()))
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    //--- Reset ------------------------------------------------------------

    /// Discards queued names, loaded resources and any pending request.
    pub fn reset(&mut self) {
        debug!(
            target: "assets",
            "Loader reset ({} queued, {} loaded dropped)",
            self.queued.len(),
            self.resources.len()
        );
        self.queued.clear();
        self.resources.clear();
        self.requested = false;
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
