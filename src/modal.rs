//! Certificate viewer state.

pub const ESCAPE: &str = "Escape";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalEffect {
    /// Show the overlay with this image, lock scrolling, focus the close
    /// control.
    Show { source: String },
    /// Hide the overlay, unlock scrolling, return focus.
    Hide,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalState {
    open: bool,
    source: Option<String>,
}

impl ModalState {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Image currently (or most recently) shown.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Opens on `source`. A trigger without a source is ignored. Opening
    /// while already open just swaps the image.
    pub fn open(&mut self, source: Option<&str>) -> Option<ModalEffect> {
        let source = source.map(str::trim).filter(|s| !s.is_empty())?;
        self.open = true;
        self.source = Some(source.to_owned());
        Some(ModalEffect::Show {
            source: source.to_owned(),
        })
    }

    pub fn close(&mut self) -> Option<ModalEffect> {
        if !self.open {
            return None;
        }
        self.open = false;
        Some(ModalEffect::Hide)
    }

    pub fn on_key(&mut self, key: &str) -> Option<ModalEffect> {
        if key == ESCAPE {
            self.close()
        } else {
            None
        }
    }
}
