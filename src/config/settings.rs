use crate::{
    foundation::core::{Resolution, Rgb8},
    foundation::error::{SkeletorError, SkeletorResult},
    scoring::policy::MissedDetectionPolicy,
};

/// Engine configuration. Loaded from JSON with every field optional.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    /// A keypoint is valid only when its score is strictly above this.
    pub detection_threshold: f32,
    pub skeleton_line_width: f64,
    pub skeleton_color: Rgb8,
    /// Diameter of keypoint markers on the skeleton layer.
    pub keypoint_size: f64,
    pub keypoint_color: Rgb8,
    pub silhouette_color: Rgb8,
    pub silhouette_opacity: f32,
    /// Limb width in output pixels.
    pub silhouette_thickness: f64,
    /// Block size of the pixelated silhouette; `1` disables pixelation.
    pub silhouette_pixelation: u32,
    pub head_size: f64,
    pub mask_opacity: f32,
    pub show_webcam: bool,
    pub show_mask: bool,
    pub show_silhouette: bool,
    pub show_skeleton: bool,
    pub show_difference: bool,
    /// Capture device; `None` lets the capture collaborator choose.
    pub device_id: Option<String>,
    pub resolution: Resolution,
    pub missed_detection: MissedDetectionPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            detection_threshold: 0.3,
            skeleton_line_width: 4.0,
            skeleton_color: Rgb8::CYAN,
            keypoint_size: 6.0,
            keypoint_color: Rgb8::RED,
            silhouette_color: Rgb8::WHITE,
            silhouette_opacity: 0.8,
            silhouette_thickness: 40.0,
            silhouette_pixelation: 1,
            head_size: 1.0,
            mask_opacity: 0.5,
            show_webcam: true,
            show_mask: true,
            show_silhouette: true,
            show_skeleton: true,
            show_difference: true,
            device_id: None,
            resolution: Resolution::default(),
            missed_detection: MissedDetectionPolicy::default(),
        }
    }
}

impl Settings {
    pub fn from_json(text: &str) -> SkeletorResult<Self> {
        let settings: Self = serde_json::from_str(text)
            .map_err(|e| SkeletorError::validation(format!("settings json: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> SkeletorResult<()> {
        if !(0.0..=1.0).contains(&self.detection_threshold) {
            return Err(SkeletorError::validation(
                "detection_threshold must be in [0,1]",
            ));
        }
        if self.silhouette_pixelation < 1 {
            return Err(SkeletorError::validation(
                "silhouette_pixelation must be >= 1",
            ));
        }
        for (name, v) in [
            ("silhouette_opacity", self.silhouette_opacity),
            ("mask_opacity", self.mask_opacity),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(SkeletorError::validation(format!("{name} must be in [0,1]")));
            }
        }
        for (name, v) in [
            ("silhouette_thickness", self.silhouette_thickness),
            ("head_size", self.head_size),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(SkeletorError::validation(format!("{name} must be > 0")));
            }
        }
        for (name, v) in [
            ("skeleton_line_width", self.skeleton_line_width),
            ("keypoint_size", self.keypoint_size),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(SkeletorError::validation(format!("{name} must be >= 0")));
            }
        }
        self.missed_detection.validate()
    }
}

/// Partial settings update. `None` leaves a field unchanged.
///
/// An empty `device_id` string clears the device selection.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SettingsPatch {
    pub detection_threshold: Option<f32>,
    pub skeleton_line_width: Option<f64>,
    pub skeleton_color: Option<Rgb8>,
    pub keypoint_size: Option<f64>,
    pub keypoint_color: Option<Rgb8>,
    pub silhouette_color: Option<Rgb8>,
    pub silhouette_opacity: Option<f32>,
    pub silhouette_thickness: Option<f64>,
    pub silhouette_pixelation: Option<u32>,
    pub head_size: Option<f64>,
    pub mask_opacity: Option<f32>,
    pub show_webcam: Option<bool>,
    pub show_mask: Option<bool>,
    pub show_silhouette: Option<bool>,
    pub show_skeleton: Option<bool>,
    pub show_difference: Option<bool>,
    pub device_id: Option<String>,
    pub resolution: Option<Resolution>,
    pub missed_detection: Option<MissedDetectionPolicy>,
}

impl SettingsPatch {
    /// Applies the patch to a copy of `base`, recording which fields changed.
    pub fn apply_to(&self, base: &Settings) -> (Settings, SettingsDelta) {
        let mut next = base.clone();
        let mut delta = SettingsDelta::default();

        macro_rules! patch {
            ($($field:ident),* $(,)?) => {
                $(
                    if let Some(v) = &self.$field
                        && next.$field != *v
                    {
                        next.$field = v.clone();
                        delta.changed.push(stringify!($field));
                    }
                )*
            };
        }

        patch!(
            detection_threshold,
            skeleton_line_width,
            skeleton_color,
            keypoint_size,
            keypoint_color,
            silhouette_color,
            silhouette_opacity,
            silhouette_thickness,
            silhouette_pixelation,
            head_size,
            mask_opacity,
            show_webcam,
            show_mask,
            show_silhouette,
            show_skeleton,
            show_difference,
            resolution,
            missed_detection,
        );

        if let Some(id) = &self.device_id {
            let id = (!id.is_empty()).then(|| id.clone());
            if next.device_id != id {
                next.device_id = id;
                delta.changed.push("device_id");
            }
        }

        delta.requires_reconfigure = delta.touches("device_id") || delta.touches("resolution");
        (next, delta)
    }
}

/// Fields changed by one settings update.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SettingsDelta {
    pub changed: Vec<&'static str>,
    /// Device or resolution changed; the capture source must be swapped.
    pub requires_reconfigure: bool,
}

impl SettingsDelta {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    pub fn touches(&self, field: &str) -> bool {
        self.changed.iter().any(|f| *f == field)
    }
}

/// Receives settings after every effective change.
pub trait SettingsObserver {
    fn settings_changed(&self, settings: &Settings, delta: &SettingsDelta);
}

/// Owns the live settings and fans out change notifications.
#[derive(Default)]
pub struct SettingsStore {
    current: Settings,
    observers: Vec<Box<dyn SettingsObserver>>,
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("current", &self.current)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl SettingsStore {
    pub fn new(settings: Settings) -> SkeletorResult<Self> {
        settings.validate()?;
        Ok(Self {
            current: settings,
            observers: Vec::new(),
        })
    }

    pub fn get(&self) -> &Settings {
        &self.current
    }

    pub fn subscribe(&mut self, observer: Box<dyn SettingsObserver>) {
        self.observers.push(observer);
    }

    /// Validates and commits `patch`. A rejected patch leaves settings untouched.
    pub fn apply(&mut self, patch: &SettingsPatch) -> SkeletorResult<SettingsDelta> {
        let (next, delta) = patch.apply_to(&self.current);
        if delta.is_empty() {
            return Ok(delta);
        }
        next.validate()?;
        self.current = next;
        for observer in &self.observers {
            observer.settings_changed(&self.current, &delta);
        }
        Ok(delta)
    }

    /// Replaces settings wholesale, notifying observers of every changed field.
    pub fn replace(&mut self, settings: Settings) -> SkeletorResult<SettingsDelta> {
        self.apply(&SettingsPatch::from(settings))
    }
}

impl From<Settings> for SettingsPatch {
    fn from(s: Settings) -> Self {
        Self {
            detection_threshold: Some(s.detection_threshold),
            skeleton_line_width: Some(s.skeleton_line_width),
            skeleton_color: Some(s.skeleton_color),
            keypoint_size: Some(s.keypoint_size),
            keypoint_color: Some(s.keypoint_color),
            silhouette_color: Some(s.silhouette_color),
            silhouette_opacity: Some(s.silhouette_opacity),
            silhouette_thickness: Some(s.silhouette_thickness),
            silhouette_pixelation: Some(s.silhouette_pixelation),
            head_size: Some(s.head_size),
            mask_opacity: Some(s.mask_opacity),
            show_webcam: Some(s.show_webcam),
            show_mask: Some(s.show_mask),
            show_silhouette: Some(s.show_silhouette),
            show_skeleton: Some(s.show_skeleton),
            show_difference: Some(s.show_difference),
            device_id: Some(s.device_id.unwrap_or_default()),
            resolution: Some(s.resolution),
            missed_detection: Some(s.missed_detection),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/settings.rs"]
mod tests;
