use std::fmt;

/// Generation intent. Each mode compiles to a fixed paragraph count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    Photography,
    DigitalArt,
    Restoration,
}

impl GenerationMode {
    pub fn paragraph_count(self) -> usize {
        match self {
            GenerationMode::Photography => 5,
            GenerationMode::DigitalArt => 3,
            GenerationMode::Restoration => 3,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "photography" | "photo" => Some(GenerationMode::Photography),
            "digital-art" | "digital_art" | "art" => Some(GenerationMode::DigitalArt),
            "restoration" | "restore" => Some(GenerationMode::Restoration),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectCount {
    Single,
    Couple,
}

impl SubjectCount {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "single" => Some(SubjectCount::Single),
            "couple" => Some(SubjectCount::Couple),
            _ => None,
        }
    }
}

impl fmt::Display for SubjectCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectCount::Single => write!(f, "Single"),
            SubjectCount::Couple => write!(f, "Couple"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    MaleFemale,
    FemaleFemale,
    MaleMale,
}

impl Gender {
    pub fn is_single_variant(self) -> bool {
        matches!(self, Gender::Male | Gender::Female)
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace(' ', "").as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "male&female" | "male-female" => Some(Gender::MaleFemale),
            "female&female" | "female-female" => Some(Gender::FemaleFemale),
            "male&male" | "male-male" => Some(Gender::MaleMale),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
            Gender::MaleFemale => write!(f, "Male & Female"),
            Gender::FemaleFemale => write!(f, "Female & Female"),
            Gender::MaleMale => write!(f, "Male & Male"),
        }
    }
}

/// A toggled field: either derived from the image or supplied by the user.
/// Resolution is three-way: manual non-empty text wins outright, manual empty
/// text degrades to a fixed fallback phrase, automatic emits an analysis
/// instruction pointing the downstream model at the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSetting {
    Automatic,
    Manual(String),
}

impl FieldSetting {
    pub fn manual(text: impl Into<String>) -> Self {
        FieldSetting::Manual(text.into())
    }

    pub fn resolve(&self, kind: FieldKind) -> String {
        match self {
            FieldSetting::Manual(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    kind.fallback_phrase().to_string()
                } else {
                    format!("{}{}", kind.manual_prefix(), trimmed)
                }
            }
            FieldSetting::Automatic => kind.analysis_instruction().to_string(),
        }
    }
}

impl Default for FieldSetting {
    fn default() -> Self {
        FieldSetting::Automatic
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Outfit,
    Pose,
    Background,
    Style,
}

impl FieldKind {
    fn manual_prefix(self) -> &'static str {
        match self {
            FieldKind::Outfit => "Use ONLY this clothing description: ",
            FieldKind::Pose => "Use ONLY this pose description: ",
            FieldKind::Background => "Use ONLY this background description: ",
            FieldKind::Style => "Use ONLY this artistic style description: ",
        }
    }

    // Style deliberately gets its own neutral phrase instead of an
    // "as shown" fallback: an empty manual style means "no style opinion",
    // not "copy the image's style".
    fn fallback_phrase(self) -> &'static str {
        match self {
            FieldKind::Outfit => "Outfit follows the uploaded image.",
            FieldKind::Pose => "Pose follows the uploaded image.",
            FieldKind::Background => "Background follows the uploaded image.",
            FieldKind::Style => "Apply a neutral, non-descriptive artistic style.",
        }
    }

    fn analysis_instruction(self) -> &'static str {
        match self {
            FieldKind::Outfit => {
                "Analyze and describe clothing details (style, cut, color, fabric, accessories) \
                 from the image using non-gendered language."
            }
            FieldKind::Pose => {
                "Analyze and describe body pose and gestures from the image. If portrait, focus \
                 on gaze and head orientation. Use non-gendered language."
            }
            FieldKind::Background => {
                "Analyze and describe environment, architecture, lighting, weather, and mood \
                 from the image. Use non-gendered language."
            }
            FieldKind::Style => {
                "Analyze and describe only the artistic style, line quality, color palette, \
                 medium, and rendering technique from the image."
            }
        }
    }
}

/// The full set of user choices feeding the compiler. Read-only input to
/// `compile`; consistency is maintained by `repair`, which must run after
/// every mutation of `subject_count` or `gender`.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationProfile {
    pub subject_count: SubjectCount,
    pub gender: Gender,
    pub hijab: bool,
    pub outfit: FieldSetting,
    pub pose: FieldSetting,
    pub background: FieldSetting,
    pub style: FieldSetting,
    pub time_of_day: String,
    pub expression: String,
    pub camera_type: String,
    pub lens_type: String,
    pub filter: String,
    pub scene_mood: String,
    pub aspect_ratio: String,
    pub camera_angle: String,
    pub shot_size: String,
}

impl Default for GenerationProfile {
    fn default() -> Self {
        GenerationProfile {
            subject_count: SubjectCount::Single,
            gender: Gender::Female,
            hijab: false,
            outfit: FieldSetting::Automatic,
            pose: FieldSetting::Automatic,
            background: FieldSetting::Automatic,
            style: FieldSetting::Automatic,
            time_of_day: "Morning".to_string(),
            expression: "Neutral".to_string(),
            camera_type: "iPhone 17 Pro".to_string(),
            lens_type: "35mm Prime f/1.4".to_string(),
            filter: "None".to_string(),
            scene_mood: "Natural".to_string(),
            aspect_ratio: "1:1".to_string(),
            camera_angle: "Eye Level".to_string(),
            shot_size: "Close-up".to_string(),
        }
    }
}

impl GenerationProfile {
    /// Restores the gender/hijab invariants. Single subjects must carry a
    /// single-gender value (Female if the previous value no longer fits) and
    /// hijab is only meaningful for a single female subject.
    pub fn repair(&mut self) {
        match self.subject_count {
            SubjectCount::Single => {
                if !self.gender.is_single_variant() {
                    self.gender = Gender::Female;
                }
                if self.gender == Gender::Male {
                    self.hijab = false;
                }
            }
            SubjectCount::Couple => {
                if self.gender.is_single_variant() {
                    self.gender = Gender::MaleFemale;
                }
                self.hijab = false;
            }
        }
    }

    pub fn set_subject_count(&mut self, subject_count: SubjectCount) {
        self.subject_count = subject_count;
        self.repair();
    }

    pub fn set_gender(&mut self, gender: Gender) {
        self.gender = gender;
        self.repair();
    }

    /// True only when the hijab state is reportable at all.
    pub fn hijab_applicable(&self) -> bool {
        self.subject_count == SubjectCount::Single && self.gender == Gender::Female
    }
}
