//! Screen capture using xcap, plus the on-disk layout for screenshots and baselines.

use chrono::Local;
use image::RgbaImage;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use xcap::{Monitor, Window};

use crate::config::Config;
use crate::error::{HarnessError, Result};

/// Screen capture utilities
pub struct ScreenCapture;

impl ScreenCapture {
    /// Capture the entire primary monitor
    pub fn capture_primary_screen() -> Result<RgbaImage> {
        let monitors = Monitor::all().map_err(|e| anyhow::anyhow!("Failed to get monitors: {}", e))?;

        let primary = monitors
            .into_iter()
            .find(|m| m.is_primary())
            .ok_or_else(|| HarnessError::not_found("primary monitor"))?;

        let image = primary
            .capture_image()
            .map_err(|e| anyhow::anyhow!("Failed to capture screen: {}", e))?;

        Ok(image)
    }

    /// Capture the first visible window owned by `pid`, by window id, so
    /// whatever overlaps it on screen is left out
    pub fn capture_window(pid: u32) -> Result<RgbaImage> {
        let windows = Window::all().map_err(|e| anyhow::anyhow!("Failed to get windows: {}", e))?;

        let window = windows
            .into_iter()
            .find(|w| WindowInfo::of(w).is_capturable_for(pid))
            .ok_or_else(|| HarnessError::not_found(format!("visible window for pid {pid}")))?;
        info!("Capturing window {} '{}' of pid {}", window.id(), window.title(), pid);

        let image = window
            .capture_image()
            .map_err(|e| anyhow::anyhow!("Failed to capture window: {}", e))?;

        Ok(image)
    }
}

/// What window selection looks at
#[derive(Debug, Clone, PartialEq)]
pub struct WindowInfo {
    pub process_id: u32,
    pub width: u32,
    pub height: u32,
    pub is_minimized: bool,
}

impl WindowInfo {
    fn of(window: &Window) -> Self {
        Self {
            process_id: window.process_id(),
            width: window.width(),
            height: window.height(),
            is_minimized: window.is_minimized(),
        }
    }

    pub fn is_capturable_for(&self, pid: u32) -> bool {
        self.process_id == pid && !self.is_minimized && self.width > 0 && self.height > 0
    }
}

/// What to capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureTarget {
    PrimaryScreen,
    Window(u32),
}

impl From<Option<u32>> for CaptureTarget {
    fn from(pid: Option<u32>) -> Self {
        pid.map_or(Self::PrimaryScreen, Self::Window)
    }
}

impl CaptureTarget {
    pub fn grab(self) -> Result<RgbaImage> {
        debug!("capturing {:?}", self);
        match self {
            Self::PrimaryScreen => ScreenCapture::capture_primary_screen(),
            Self::Window(pid) => ScreenCapture::capture_window(pid),
        }
    }
}

pub fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Screenshot and baseline directories
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    screenshots: PathBuf,
    baselines: PathBuf,
}

impl ArtifactStore {
    pub fn new(config: &Config) -> Self {
        Self {
            screenshots: config.screenshots_dir(),
            baselines: config.baselines_dir(),
        }
    }

    pub fn screenshots_dir(&self) -> &Path {
        &self.screenshots
    }

    /// Write `image` as `<screenshots>/<name>_<timestamp>.png`
    pub fn save_screenshot(&self, name: &str, image: &RgbaImage) -> Result<PathBuf> {
        fs::create_dir_all(&self.screenshots)?;
        let path = self.screenshots.join(format!("{}_{}.png", name, timestamp()));
        image.save(&path)?;
        info!("Saved screenshot: {}", path.display());
        Ok(path)
    }

    /// Capture `target` and save it under `name`
    pub fn capture(&self, name: &str, target: CaptureTarget) -> Result<PathBuf> {
        let image = target.grab()?;
        self.save_screenshot(name, &image)
    }

    pub fn baseline_path(&self, name: &str) -> PathBuf {
        self.baselines.join(format!("{name}.png"))
    }

    /// Baseline for `name`, or `NotFound` if none was recorded
    pub fn existing_baseline(&self, name: &str) -> Result<PathBuf> {
        let path = self.baseline_path(name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(HarnessError::not_found(format!("baseline not found: {}", path.display())))
        }
    }

    /// Re-encode a captured screenshot as the baseline for `name`
    pub fn promote_baseline(&self, name: &str, screenshot: &Path) -> Result<PathBuf> {
        fs::create_dir_all(&self.baselines)?;
        let path = self.baseline_path(name);
        image::open(screenshot)?.save(&path)?;
        info!("Baseline saved: {}", path.display());
        Ok(path)
    }
}
