use std::error::Error;

use anyhow::anyhow;
use dotenvy::dotenv;
use tracing::info;

mod config;
mod health;
mod llm;
mod prompt;
mod session;
mod utils;

use config::CONFIG;
use llm::media::load_image;
use prompt::profile::{FieldSetting, Gender, GenerationMode, GenerationProfile, SubjectCount};
use session::Session;
use utils::logging::init_logging;

type MainResult = Result<(), Box<dyn Error + Send + Sync>>;

#[derive(Debug, PartialEq)]
struct GenerateArgs {
    image: String,
    mode: GenerationMode,
    profile: GenerationProfile,
    dry_run: bool,
}

#[derive(Debug, PartialEq)]
enum Cli {
    Generate(GenerateArgs),
    Health,
}

fn usage() -> &'static str {
    "Usage:\n  prompt-architect generate --image <path|data-uri> [--mode photography|digital-art|restoration]\n      [--subjects single|couple] [--gender <male|female|male-female|female-female|male-male>]\n      [--hijab] [--outfit <text>] [--pose <text>] [--background <text>] [--style <text>]\n      [--time-of-day <v>] [--expression <v>] [--camera <v>] [--lens <v>] [--filter <v>]\n      [--mood <v>] [--aspect-ratio <v>] [--angle <v>] [--shot-size <v>] [--dry-run]\n  prompt-architect health"
}

fn parse_cli(args: &[String]) -> anyhow::Result<Cli> {
    match args.get(1).map(|value| value.as_str()) {
        Some("health") => Ok(Cli::Health),
        Some("generate") => Ok(Cli::Generate(parse_generate_args(&args[2..])?)),
        Some("--help") | Some("-h") | None => Err(anyhow!(usage())),
        Some(other) => Err(anyhow!("Unknown subcommand: {other}\n{}", usage())),
    }
}

fn parse_generate_args(args: &[String]) -> anyhow::Result<GenerateArgs> {
    let mut image: Option<String> = None;
    let mut mode = GenerationMode::Photography;
    let mut profile = GenerationProfile::default();
    let mut dry_run = false;

    fn take<'a>(args: &'a [String], index: &mut usize, flag: &str) -> anyhow::Result<&'a str> {
        *index += 1;
        args.get(*index)
            .map(|value| value.as_str())
            .ok_or_else(|| anyhow!("Missing value for {flag}"))
    }

    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--image" => {
                image = Some(take(args, &mut index, "--image")?.to_string());
            }
            "--mode" => {
                let value = take(args, &mut index, "--mode")?;
                mode = GenerationMode::parse(value)
                    .ok_or_else(|| anyhow!("Invalid --mode value: {value}"))?;
            }
            "--subjects" => {
                let value = take(args, &mut index, "--subjects")?;
                profile.subject_count = SubjectCount::parse(value)
                    .ok_or_else(|| anyhow!("Invalid --subjects value: {value}"))?;
            }
            "--gender" => {
                let value = take(args, &mut index, "--gender")?;
                profile.gender = Gender::parse(value)
                    .ok_or_else(|| anyhow!("Invalid --gender value: {value}"))?;
            }
            "--hijab" => {
                profile.hijab = true;
            }
            "--outfit" => {
                profile.outfit = FieldSetting::manual(take(args, &mut index, "--outfit")?);
            }
            "--pose" => {
                profile.pose = FieldSetting::manual(take(args, &mut index, "--pose")?);
            }
            "--background" => {
                profile.background =
                    FieldSetting::manual(take(args, &mut index, "--background")?);
            }
            "--style" => {
                profile.style = FieldSetting::manual(take(args, &mut index, "--style")?);
            }
            "--time-of-day" => {
                profile.time_of_day = take(args, &mut index, "--time-of-day")?.to_string();
            }
            "--expression" => {
                profile.expression = take(args, &mut index, "--expression")?.to_string();
            }
            "--camera" => {
                profile.camera_type = take(args, &mut index, "--camera")?.to_string();
            }
            "--lens" => {
                profile.lens_type = take(args, &mut index, "--lens")?.to_string();
            }
            "--filter" => {
                profile.filter = take(args, &mut index, "--filter")?.to_string();
            }
            "--mood" => {
                profile.scene_mood = take(args, &mut index, "--mood")?.to_string();
            }
            "--aspect-ratio" => {
                profile.aspect_ratio = take(args, &mut index, "--aspect-ratio")?.to_string();
            }
            "--angle" => {
                profile.camera_angle = take(args, &mut index, "--angle")?.to_string();
            }
            "--shot-size" => {
                profile.shot_size = take(args, &mut index, "--shot-size")?.to_string();
            }
            "--dry-run" => {
                dry_run = true;
            }
            "--help" | "-h" => {
                return Err(anyhow!(usage()));
            }
            other => {
                return Err(anyhow!("Unknown generate argument: {other}\n{}", usage()));
            }
        }
        index += 1;
    }

    let image = image.ok_or_else(|| anyhow!("--image is required\n{}", usage()))?;
    profile.repair();

    Ok(GenerateArgs {
        image,
        mode,
        profile,
        dry_run,
    })
}

#[tokio::main]
async fn main() -> MainResult {
    dotenv().ok();
    let _guards = init_logging();

    let args: Vec<String> = std::env::args().collect();
    match parse_cli(&args)? {
        Cli::Health => {
            let report = health::check(&CONFIG);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Cli::Generate(generate) => {
            let session = Session::new(generate.profile);

            if generate.dry_run {
                println!("{}", session.compile(generate.mode));
                return Ok(());
            }

            if !CONFIG.has_gemini_api_key() {
                return Err("GEMINI_API_KEY is not configured; set it or use --dry-run".into());
            }

            let image = load_image(&generate.image).await?;
            info!(
                mode = ?generate.mode,
                image_mime = %image.mime_type,
                image_bytes = image.bytes.len(),
                "generating prompt"
            );
            let result = session.generate(generate.mode, &image).await?;
            println!("{result}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parses_health_subcommand() {
        let cli = parse_cli(&args(&["prompt-architect", "health"])).unwrap();
        assert_eq!(cli, Cli::Health);
    }

    #[test]
    fn generate_requires_an_image() {
        let err = parse_cli(&args(&["prompt-architect", "generate"])).unwrap_err();
        assert!(err.to_string().contains("--image is required"));
    }

    #[test]
    fn generate_parses_profile_overrides() {
        let cli = parse_cli(&args(&[
            "prompt-architect",
            "generate",
            "--image",
            "photo.jpg",
            "--subjects",
            "couple",
            "--gender",
            "male-male",
            "--outfit",
            "matching suits",
            "--aspect-ratio",
            "16:9",
            "--dry-run",
        ]))
        .unwrap();

        let Cli::Generate(generate) = cli else {
            panic!("expected generate");
        };
        assert_eq!(generate.image, "photo.jpg");
        assert!(generate.dry_run);
        assert_eq!(generate.profile.subject_count, SubjectCount::Couple);
        assert_eq!(generate.profile.gender, Gender::MaleMale);
        assert_eq!(
            generate.profile.outfit,
            FieldSetting::manual("matching suits")
        );
        assert_eq!(generate.profile.aspect_ratio, "16:9");
    }

    #[test]
    fn parsed_profile_is_already_repaired() {
        let cli = parse_cli(&args(&[
            "prompt-architect",
            "generate",
            "--image",
            "photo.jpg",
            "--subjects",
            "couple",
            "--hijab",
        ]))
        .unwrap();

        let Cli::Generate(generate) = cli else {
            panic!("expected generate");
        };
        assert_eq!(generate.profile.gender, Gender::MaleFemale);
        assert!(!generate.profile.hijab);
    }

    #[test]
    fn rejects_unknown_flags_and_modes() {
        assert!(parse_cli(&args(&["prompt-architect", "generate", "--bogus"])).is_err());
        assert!(parse_cli(&args(&[
            "prompt-architect",
            "generate",
            "--image",
            "x.png",
            "--mode",
            "sculpture"
        ]))
        .is_err());
    }
}
