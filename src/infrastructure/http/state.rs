//! Application State
//!
//! 持有所有 Command/Query Handlers

use std::sync::Arc;

use crate::application::ports::{ContactRepositoryPort, PortfolioRepositoryPort, VisitCounterPort};
use crate::application::{
    // Command handlers
    PlayNarrationHandler, PlaySoundHandler, RecordVisitHandler, RetryNarrationHandler,
    StopNarrationHandler, SubmitContactHandler, SynthesizeNarrationHandler,
    UpdateSoundSettingsHandler,
    // Query handlers
    GetNarrationStatusHandler, GetSoundWavHandler, ListExperienceHandler, ListProjectsHandler,
    ListSkillsHandler,
    // Services
    Narrator, SoundBank,
};

/// 应用状态
pub struct AppState {
    // ========== Services ==========
    pub narrator: Arc<Narrator>,
    pub sounds: Arc<SoundBank>,

    // ========== Command Handlers ==========
    pub play_narration_handler: PlayNarrationHandler,
    pub synthesize_narration_handler: SynthesizeNarrationHandler,
    pub stop_narration_handler: StopNarrationHandler,
    pub retry_narration_handler: RetryNarrationHandler,
    pub play_sound_handler: PlaySoundHandler,
    pub update_sound_settings_handler: UpdateSoundSettingsHandler,
    pub submit_contact_handler: SubmitContactHandler,
    pub record_visit_handler: RecordVisitHandler,

    // ========== Query Handlers ==========
    pub narration_status_handler: GetNarrationStatusHandler,
    pub sound_wav_handler: GetSoundWavHandler,
    pub list_projects_handler: ListProjectsHandler,
    pub list_skills_handler: ListSkillsHandler,
    pub list_experience_handler: ListExperienceHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        narrator: Arc<Narrator>,
        sounds: Arc<SoundBank>,
        portfolio_repo: Arc<dyn PortfolioRepositoryPort>,
        contact_repo: Arc<dyn ContactRepositoryPort>,
        visit_counter: Arc<dyn VisitCounterPort>,
    ) -> Self {
        Self {
            // Command handlers
            play_narration_handler: PlayNarrationHandler::new(narrator.clone()),
            synthesize_narration_handler: SynthesizeNarrationHandler::new(narrator.clone()),
            stop_narration_handler: StopNarrationHandler::new(narrator.clone()),
            retry_narration_handler: RetryNarrationHandler::new(narrator.clone()),
            play_sound_handler: PlaySoundHandler::new(sounds.clone()),
            update_sound_settings_handler: UpdateSoundSettingsHandler::new(sounds.clone()),
            submit_contact_handler: SubmitContactHandler::new(contact_repo),
            record_visit_handler: RecordVisitHandler::new(visit_counter),

            // Query handlers
            narration_status_handler: GetNarrationStatusHandler::new(narrator.clone()),
            sound_wav_handler: GetSoundWavHandler::new(sounds.clone()),
            list_projects_handler: ListProjectsHandler::new(portfolio_repo.clone()),
            list_skills_handler: ListSkillsHandler::new(portfolio_repo.clone()),
            list_experience_handler: ListExperienceHandler::new(portfolio_repo),

            // Services
            narrator,
            sounds,
        }
    }
}
