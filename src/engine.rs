//! The interview engine: session seeding, turn handling, and token-budget
//! enforcement.
//!
//! One engine serves many sessions. All state lives in the list store;
//! the engine itself holds only an immutable `Config` and handles to its
//! collaborators, so it is safe to share across tasks. Calls for the
//! same `interview_id` must be serialized by the caller — the
//! read-then-append turn sequence is not transactional.

use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::error::Result;
use crate::provider::{CompletionOptions, CompletionProvider};
use crate::store::ListStore;
use crate::tokens;
use crate::transcript::{Message, Transcript};

/// Termination request appended when the candidate ends the interview.
const END_REQUEST: &str = "I am done with the interview. End the interview by giving some \
helpful remarks and saying, \"ending your interview!!!--catapult.ai\"";

/// Synthetic turn injected when the token budget is exhausted.
const BUDGET_TERMINATION: &str = "I am done with the interview. End the interview by saying \
only, \"ending your interview!!!--catapult.ai\"";

/// Lifecycle state of an interview session, as reported by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewState {
    /// The candidate is still answering questions
    Ongoing,
    /// The candidate has asked to end the interview
    End,
}

/// Candidate details interpolated into the seeded profile message.
#[derive(Debug, Clone, Default)]
pub struct CandidateProfile {
    /// The candidate's name
    pub username: String,
    /// The role applied for
    pub position: String,
    /// Relevant skills, free text
    pub skills: String,
    /// Job description for the applied position
    pub job_description: String,
    /// Relevant prior experience, free text
    pub experience: String,
}

impl CandidateProfile {
    /// Create a profile with the required fields; job description and
    /// experience default to empty.
    pub fn new(username: &str, position: &str, skills: &str) -> Self {
        Self {
            username: username.to_string(),
            position: position.to_string(),
            skills: skills.to_string(),
            ..Default::default()
        }
    }

    /// Set the job description.
    pub fn with_job_description(mut self, job_description: &str) -> Self {
        self.job_description = job_description.to_string();
        self
    }

    /// Set the prior experience.
    pub fn with_experience(mut self, experience: &str) -> Self {
        self.experience = experience.to_string();
        self
    }

    /// Render the fixed profile prose seeded into the transcript.
    fn render(&self) -> String {
        format!(
            "Candidate name is {username}. {username} has applied for role: {position}. \
             Job description for the applied position is: {job_description}. \
             Their relevant skills are: {skills}. \
             Candidate's relevant experience in the field is: {experience}.",
            username = self.username,
            position = self.position,
            job_description = self.job_description,
            skills = self.skills,
            experience = self.experience,
        )
    }
}

/// Outcome of one interview turn.
#[derive(Debug, Clone)]
pub struct Turn {
    /// The generated interviewer reply
    pub reply: String,
    /// True when this turn terminated the interview, either because the
    /// candidate ended it or because the token budget was exhausted
    pub is_last: bool,
}

/// Orchestrates interview sessions over a list store and a completion
/// provider.
pub struct InterviewEngine {
    config: Config,
    token_limit: u32,
    store: Arc<dyn ListStore>,
    provider: Arc<dyn CompletionProvider>,
}

impl std::fmt::Debug for InterviewEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterviewEngine")
            .field("config", &self.config)
            .field("token_limit", &self.token_limit)
            .finish_non_exhaustive()
    }
}

impl InterviewEngine {
    /// Build an engine from an immutable configuration.
    ///
    /// Validates the configuration and resolves the model's context
    /// window up front, so an unknown model id fails here rather than on
    /// the first turn.
    pub fn new(
        config: Config,
        store: Arc<dyn ListStore>,
        provider: Arc<dyn CompletionProvider>,
    ) -> Result<Self> {
        config.validate()?;
        let token_limit = tokens::context_window(&config.model)?;
        Ok(Self {
            config,
            token_limit,
            store,
            provider,
        })
    }

    fn transcript(&self, interview_id: &str) -> Transcript {
        Transcript::new(Arc::clone(&self.store), interview_id)
    }

    /// Seed a new session with the interview instruction and the
    /// candidate's profile.
    ///
    /// Returns `true` on success. Store failures are logged and reported
    /// as `false`; no error escapes this boundary.
    pub async fn store_user_data(&self, interview_id: &str, profile: &CandidateProfile) -> bool {
        let transcript = self.transcript(interview_id);
        let seeded: Result<()> = async {
            transcript
                .append_chronological(&Message::system(&self.config.interview_instruction))
                .await?;
            transcript
                .append_chronological(&Message::system(&profile.render()))
                .await?;
            Ok(())
        }
        .await;

        match seeded {
            Ok(()) => {
                debug!(interview_id, "session seeded");
                true
            }
            Err(e) => {
                error!(interview_id, error = %e, "failed to seed session");
                false
            }
        }
    }

    /// Run one interview turn and return the generated reply.
    ///
    /// For `Ongoing`, records `candidate_input` in the `_answers` log and
    /// the transcript. For `End`, appends the fixed termination request
    /// (`candidate_input` is ignored). Store and completion errors
    /// propagate to the caller; nothing is retried here.
    pub async fn chat(
        &self,
        interview_id: &str,
        state: InterviewState,
        candidate_input: &str,
    ) -> Result<Turn> {
        let transcript = self.transcript(interview_id);

        match state {
            InterviewState::Ongoing => {
                transcript.push_answer(candidate_input).await?;
                transcript
                    .append_chronological(&Message::user(candidate_input))
                    .await?;
            }
            InterviewState::End => {
                transcript
                    .append_chronological(&Message::user(END_REQUEST))
                    .await?;
            }
        }

        let mut messages = transcript.replay().await?;
        let estimated = tokens::estimate_messages(&self.config.model, &messages);

        // Budget enforcement: a single injection per turn. Re-estimating
        // after injecting can never drop below the threshold (the synthetic
        // message only adds tokens), so one injection is both sufficient
        // and the only terminating form of this check.
        let mut budget_exhausted = false;
        if state != InterviewState::End && self.over_budget(estimated) {
            warn!(
                interview_id,
                estimated,
                token_limit = self.token_limit,
                "token budget exhausted, forcing interview termination"
            );
            transcript
                .append_chronological(&Message::user(BUDGET_TERMINATION))
                .await?;
            budget_exhausted = true;
            // Re-read so the completion call sees the synthetic turn.
            messages = transcript.replay().await?;
        }

        let options = CompletionOptions {
            max_tokens: self.config.max_response_tokens,
            temperature: self.config.temperature,
        };
        let response = self
            .provider
            .complete(&messages, &self.config.model, options)
            .await?;

        transcript
            .append_chronological(&Message::assistant(&response.content))
            .await?;
        transcript.push_question(&response.content).await?;

        Ok(Turn {
            reply: response.content,
            is_last: budget_exhausted || state == InterviewState::End,
        })
    }

    fn over_budget(&self, estimated_tokens: usize) -> bool {
        let budget = self.token_limit as f64 * self.config.cutoff_threshold;
        (estimated_tokens + self.config.max_response_tokens as usize) as f64 >= budget
    }
}
