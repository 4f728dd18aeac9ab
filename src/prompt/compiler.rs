use crate::prompt::profile::{FieldKind, Gender, GenerationMode, GenerationProfile, SubjectCount};

pub const COMMAND_LINE: &str = "create a new image from this image object";

const IDENTITY_LOCK: &str = "Use the uploaded image as the ONLY and ABSOLUTE identity reference. \
    Preserve facial structure, proportions, bone structure, eyes, nose, mouth, jawline, skin \
    tone, skin texture, hairstyle, hairline, and apparent age exactly as shown. Do NOT \
    reinterpret, redesign, stylize, beautify, or replace the face. Do NOT generate a different \
    person. The final image MUST be instantly recognizable as the same individual.";

const STYLE_IDENTITY_LOCK: &str = "Use the uploaded image as the ONLY and ABSOLUTE identity \
    reference. Preserve facial structure, proportions, bone structure, eyes, nose, mouth, \
    jawline, skin tone, skin texture, hairstyle, hairline, and apparent age exactly as shown. \
    Do NOT reinterpret, redesign, stylize, beautify, or replace the face.";

const RESTORATION_LOCK: &str = "Use the uploaded image as the primary reference for historical \
    restoration. Preserve all semantic content including facial structure, clothing, and \
    environment.";

const PURITY_CONSTRAINT: &str =
    "Do NOT mention gender, body shape, physical traits, ethnicity, or age.";

const QUALITY_LINE: &str = "high detail clarity, sharp focus, natural skin texture, balanced \
    lighting, realistic color grading, no artificial blur.";

const COUPLE_LOCK: &str = "This image contains two locked subjects. Identity attributes must \
    NEVER be swapped or blended.";

/// Compiles a profile into the final structured prompt for `mode`.
///
/// Pure and total: every field combination yields a valid prompt with exactly
/// `mode.paragraph_count()` paragraphs separated by single blank lines.
pub fn compile(mode: GenerationMode, profile: &GenerationProfile) -> String {
    let paragraphs = match mode {
        GenerationMode::Photography => photography_paragraphs(profile),
        GenerationMode::DigitalArt => digital_art_paragraphs(profile),
        GenerationMode::Restoration => restoration_paragraphs(),
    };
    debug_assert_eq!(paragraphs.len(), mode.paragraph_count());
    paragraphs.join("\n\n")
}

fn hijab_state(profile: &GenerationProfile) -> &'static str {
    if !profile.hijab_applicable() {
        "Not Applicable"
    } else if profile.hijab {
        "wearing hijab"
    } else {
        "not wearing hijab"
    }
}

fn identity_mapping(gender: Gender) -> &'static str {
    match gender {
        Gender::MaleFemale => "Image 1 for the male subject, Image 2 for the female subject.",
        _ => "Image 1 for the left subject, Image 2 for the right subject.",
    }
}

fn photography_paragraphs(profile: &GenerationProfile) -> Vec<String> {
    let mut command = format!(
        "{COMMAND_LINE}\n{IDENTITY_LOCK}\nState parameters: Gender: {}, Hijab: {}, Object \
         Count: {}.",
        profile.gender,
        hijab_state(profile),
        profile.subject_count
    );
    if profile.subject_count == SubjectCount::Couple {
        command.push(' ');
        command.push_str(identity_mapping(profile.gender));
        command.push(' ');
        command.push_str(COUPLE_LOCK);
    }

    // When hijab is off this paragraph must not contain the words "hijab" or
    // "veil" at all, so the keep-sentence is only emitted for the on state.
    let mut subject = format!(
        "Pose: {}\nOutfit: {}\nExpression: {}.",
        profile.pose.resolve(FieldKind::Pose),
        profile.outfit.resolve(FieldKind::Outfit),
        profile.expression
    );
    if profile.hijab_applicable() && profile.hijab {
        subject.push_str("\nThe outfit includes a hijab; keep it exactly as stated.");
    }
    subject.push('\n');
    subject.push_str(PURITY_CONSTRAINT);

    let scene = format!(
        "Background and atmosphere: {}\nTime of day: {}.\n{PURITY_CONSTRAINT}",
        profile.background.resolve(FieldKind::Background),
        profile.time_of_day
    );

    let cinematography = format!(
        "Camera: {}, Lens: {}, Filter: {}, Style: {}.\nFraming: {} framing, Angle: {} view \
         angle, Aspect Ratio: aspect ratio {}.\n{QUALITY_LINE}",
        profile.camera_type,
        profile.lens_type,
        profile.filter,
        profile.scene_mood,
        profile.shot_size,
        profile.camera_angle,
        profile.aspect_ratio
    );

    let hijab_clause = if profile.hijab_applicable() && profile.hijab {
        "Do NOT prohibit hijab or head coverings."
    } else {
        "Remove any enforcement of hijab or head coverings."
    };
    let negative = format!(
        "Negative prompt: face change, identity drift, gender change, extra people, AI \
         beautification, unrealistic artifacts.\n{hijab_clause}"
    );

    vec![command, subject, scene, cinematography, negative]
}

fn digital_art_paragraphs(profile: &GenerationProfile) -> Vec<String> {
    let command = format!("{COMMAND_LINE}\n{STYLE_IDENTITY_LOCK}");

    let style = format!(
        "{}\nFocus exclusively on visual aesthetics, medium, and technical rendering. Do NOT \
         mention people, gender, body parts, clothing, fashion, pose, gesture, ethnicity, or \
         age.",
        profile.style.resolve(FieldKind::Style)
    );

    let negative = "Negative prompt: identity alteration, character redesign, clothing \
         invention, accessory addition, pose modification. The result must remain a strictly \
         digital, artistic rendering."
        .to_string();

    vec![command, style, negative]
}

fn restoration_paragraphs() -> Vec<String> {
    let command = format!("{COMMAND_LINE}\n{RESTORATION_LOCK}");

    let colorization = "Identify scratches, noise, and blur for repair. Apply mandatory \
         period-accurate, soft, muted colorization to the entire scene (subjects, skin, \
         clothes, objects, background). Recover lost details while preserving the authentic \
         photographic grain and lighting of the era."
        .to_string();

    let negative = "Negative prompt: modern photographic looks, high saturation, cinematic \
         color grading, modernization of clothing or background, face alteration, object \
         removal or addition."
        .to_string();

    vec![command, colorization, negative]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::profile::FieldSetting;

    fn paragraphs(output: &str) -> Vec<&str> {
        output.split("\n\n").collect()
    }

    #[test]
    fn photography_always_has_five_paragraphs() {
        let profile = GenerationProfile::default();
        let output = compile(GenerationMode::Photography, &profile);
        assert_eq!(paragraphs(&output).len(), 5);
        assert!(output.starts_with(COMMAND_LINE));
        assert!(!output.contains("\n\n\n"));
    }

    #[test]
    fn digital_art_and_restoration_have_three_paragraphs() {
        let profile = GenerationProfile::default();
        for mode in [GenerationMode::DigitalArt, GenerationMode::Restoration] {
            let output = compile(mode, &profile);
            assert_eq!(paragraphs(&output).len(), 3, "{mode:?}");
            assert!(output.starts_with(COMMAND_LINE), "{mode:?}");
        }
    }

    #[test]
    fn manual_outfit_and_hijab_state_appear_where_required() {
        let mut profile = GenerationProfile::default();
        profile.hijab = true;
        profile.outfit = FieldSetting::manual("red dress");
        profile.repair();

        let output = compile(GenerationMode::Photography, &profile);
        let paragraphs = paragraphs(&output);
        assert!(paragraphs[0].contains("Hijab: wearing hijab"));
        assert!(paragraphs[1].contains("Use ONLY this clothing description: red dress"));
        assert!(!paragraphs[4].contains("Remove any enforcement"));
        assert!(paragraphs[4].contains("Do NOT prohibit hijab"));
    }

    #[test]
    fn paragraph_two_omits_hijab_words_when_flag_is_off() {
        let profile = GenerationProfile::default();
        assert!(!profile.hijab);
        let output = compile(GenerationMode::Photography, &profile);
        let subject = paragraphs(&output)[1].to_lowercase();
        assert!(!subject.contains("hijab"));
        assert!(!subject.contains("veil"));
    }

    #[test]
    fn single_male_reports_not_applicable_hijab() {
        let mut profile = GenerationProfile::default();
        profile.set_gender(Gender::Male);
        let output = compile(GenerationMode::Photography, &profile);
        assert!(paragraphs(&output)[0].contains("Hijab: Not Applicable"));
    }

    #[test]
    fn mixed_couple_gets_male_female_image_mapping() {
        let mut profile = GenerationProfile::default();
        profile.set_subject_count(SubjectCount::Couple);
        let output = compile(GenerationMode::Photography, &profile);
        let command = paragraphs(&output)[0];
        assert!(
            command.contains("Image 1 for the male subject, Image 2 for the female subject.")
        );
        assert!(command.contains("NEVER be swapped or blended"));
    }

    #[test]
    fn same_gender_couple_maps_left_and_right_subjects() {
        let mut profile = GenerationProfile::default();
        profile.set_subject_count(SubjectCount::Couple);
        profile.set_gender(Gender::MaleMale);
        let output = compile(GenerationMode::Photography, &profile);
        assert!(paragraphs(&output)[0]
            .contains("Image 1 for the left subject, Image 2 for the right subject."));
    }

    #[test]
    fn empty_manual_fields_never_leave_empty_clauses() {
        let mut profile = GenerationProfile::default();
        profile.outfit = FieldSetting::manual("");
        profile.pose = FieldSetting::manual(" ");
        profile.background = FieldSetting::manual("");
        let output = compile(GenerationMode::Photography, &profile);
        assert!(output.contains("Outfit: Outfit follows the uploaded image."));
        assert!(output.contains("Pose: Pose follows the uploaded image."));
        assert!(output.contains("Background and atmosphere: Background follows the uploaded image."));
        assert!(!output.contains("Pose: \n"));
    }

    #[test]
    fn cinematography_fields_are_injected_verbatim() {
        let mut profile = GenerationProfile::default();
        profile.camera_type = "Leica M11".to_string();
        profile.shot_size = "Wide Shot".to_string();
        profile.camera_angle = "Low Angle".to_string();
        profile.aspect_ratio = "16:9".to_string();
        let output = compile(GenerationMode::Photography, &profile);
        let cinematography = paragraphs(&output)[3];
        assert!(cinematography.contains("Camera: Leica M11"));
        assert!(cinematography.contains("Wide Shot framing"));
        assert!(cinematography.contains("Low Angle view angle"));
        assert!(cinematography.contains("aspect ratio 16:9"));
        assert!(cinematography.contains("no artificial blur"));
    }

    #[test]
    fn digital_art_uses_manual_style_as_single_source() {
        let mut profile = GenerationProfile::default();
        profile.style = FieldSetting::manual("ukiyo-e woodblock, muted indigo palette");
        let output = compile(GenerationMode::DigitalArt, &profile);
        let style = paragraphs(&output)[1];
        assert!(style.starts_with(
            "Use ONLY this artistic style description: ukiyo-e woodblock, muted indigo palette"
        ));
    }

    #[test]
    fn restoration_ignores_profile_fields() {
        let mut profile = GenerationProfile::default();
        profile.outfit = FieldSetting::manual("red dress");
        let output = compile(GenerationMode::Restoration, &profile);
        assert!(!output.contains("red dress"));
        assert!(output.contains("muted colorization to the entire scene"));
    }

    #[test]
    fn compilation_is_deterministic() {
        let profile = GenerationProfile::default();
        let first = compile(GenerationMode::Photography, &profile);
        let second = compile(GenerationMode::Photography, &profile);
        assert_eq!(first, second);
    }
}
