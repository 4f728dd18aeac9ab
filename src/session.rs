use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::llm::gemini;
use crate::llm::media::MediaFile;
use crate::prompt::compiler;
use crate::prompt::profile::{GenerationMode, GenerationProfile};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("a generation request is already in flight")]
pub struct SessionBusy;

/// Owns the mutable profile and serializes generation: at most one remote
/// request may be in flight at a time, re-entry fails fast with `SessionBusy`.
#[derive(Clone)]
pub struct Session {
    profile: Arc<Mutex<GenerationProfile>>,
    in_flight: Arc<AtomicBool>,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Session {
    pub fn new(profile: GenerationProfile) -> Self {
        Session {
            profile: Arc::new(Mutex::new(profile)),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Mutates the profile and re-establishes the gender/hijab invariants
    /// before the change becomes visible to `generate`.
    pub fn update<F>(&self, mutate: F)
    where
        F: FnOnce(&mut GenerationProfile),
    {
        let mut profile = self.profile.lock();
        mutate(&mut profile);
        profile.repair();
    }

    pub fn profile(&self) -> GenerationProfile {
        self.profile.lock().clone()
    }

    /// Compiles the current profile for `mode`. Repair runs first so a stale
    /// external mutation can never leak an inconsistent profile downstream.
    pub fn compile(&self, mode: GenerationMode) -> String {
        let mut profile = self.profile.lock();
        profile.repair();
        compiler::compile(mode, &profile)
    }

    pub async fn generate(
        &self,
        mode: GenerationMode,
        image: &MediaFile,
    ) -> Result<String, SessionBusy> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SessionBusy);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let compiled = self.compile(mode);
        Ok(gemini::generate_prompt(image, &compiled).await)
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new(GenerationProfile::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::profile::{Gender, SubjectCount};

    #[test]
    fn update_always_repairs_the_profile() {
        let session = Session::default();
        session.update(|profile| {
            profile.subject_count = SubjectCount::Couple;
            profile.hijab = true;
        });
        let profile = session.profile();
        assert_eq!(profile.gender, Gender::MaleFemale);
        assert!(!profile.hijab);
    }

    #[test]
    fn compile_repairs_before_templating() {
        let session = Session::default();
        session.update(|profile| {
            profile.gender = Gender::Male;
            profile.hijab = true;
        });
        let output = session.compile(GenerationMode::Photography);
        assert!(output.contains("Hijab: Not Applicable"));
    }

    #[tokio::test]
    async fn second_concurrent_generate_is_rejected() {
        let session = Session::default();
        assert!(session
            .in_flight
            .compare_exchange(
                false,
                true,
                std::sync::atomic::Ordering::AcqRel,
                std::sync::atomic::Ordering::Acquire
            )
            .is_ok());

        let image = MediaFile::new(vec![0x89, 0x50, 0x4E, 0x47], "image/png".to_string());
        let result = session.generate(GenerationMode::Restoration, &image).await;
        assert_eq!(result, Err(SessionBusy));
        session
            .in_flight
            .store(false, std::sync::atomic::Ordering::Release);
    }
}
