//! Page-wide settings shared by every controller.
//!
//! Nothing here is read from disk: the page is a static bundle, so the values
//! are compiled in and handed to the controllers through the page context.

/// Options for one intersection observer.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverOptions {
    pub selector: &'static str,
    pub threshold: f64,
    pub root_margin: &'static str,
}

/// Fixed camera and material values for the particle background.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundConfig {
    /// Id of the element the canvas is appended to.
    pub container_id: &'static str,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub camera_distance: f32,
    /// Points are spread uniformly over `[-spread / 2, spread / 2)` per axis.
    pub spread: f32,
    pub rotation_step: f32,
    pub color: [f32; 3],
    pub opacity: f32,
    pub max_pixel_ratio: f64,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            container_id: "background",
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            camera_distance: 1000.0,
            spread: 2000.0,
            rotation_step: 0.0005,
            // #00ffff
            color: [0.0, 1.0, 1.0],
            opacity: 0.8,
            max_pixel_ratio: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavConfig {
    pub toggle: &'static str,
    pub menu: &'static str,
    pub links: &'static str,
    pub open_class: &'static str,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            toggle: ".menu-toggle",
            menu: ".nav-menu",
            links: ".nav-link",
            open_class: "active",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModalConfig {
    pub modal_id: &'static str,
    pub image_id: &'static str,
    pub close: &'static str,
    pub triggers: &'static str,
    pub source_attr: &'static str,
    pub open_class: &'static str,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            modal_id: "certificate-modal",
            image_id: "certificate-image",
            close: ".close-modal",
            triggers: ".view-certificate",
            source_attr: "data-certificate",
            open_class: "show",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    pub background: BackgroundConfig,
    pub nav: NavConfig,
    pub modal: ModalConfig,
    /// Height of the fixed header kept above scrolled-to anchors, in CSS px.
    pub header_offset: f64,
    pub resize_debounce_ms: i32,
    pub reveal: ObserverOptions,
    pub lazy_images: ObserverOptions,
    pub visible_class: &'static str,
    pub loading_screen_id: &'static str,
    pub skip_target: &'static str,
    /// Value written to `--animation-duration` on low-end devices.
    pub low_end_animation_duration: &'static str,
    pub card_selector: &'static str,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            background: BackgroundConfig::default(),
            nav: NavConfig::default(),
            modal: ModalConfig::default(),
            header_offset: 70.0,
            resize_debounce_ms: 250,
            reveal: ObserverOptions {
                selector: "section, .reveal",
                threshold: 0.1,
                root_margin: "-10px",
            },
            lazy_images: ObserverOptions {
                selector: "img[data-src]",
                threshold: 0.0,
                root_margin: "50px",
            },
            visible_class: "visible",
            loading_screen_id: "loading-screen",
            skip_target: "#main",
            low_end_animation_duration: "0.3s",
            card_selector: ".card",
        }
    }
}
