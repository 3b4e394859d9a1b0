//! The content panel catalog.
//!
//! Each panel pairs a prompt builder with the status-message sequence the
//! progress presenter walks while its response streams in. The sequences
//! are deliberately short (four labels ≈ one advance per ~25 characters
//! of output) so the status line moves early and often.

/// One selectable content panel.
pub struct Panel {
    pub id: &'static str,
    pub title: &'static str,
    /// Shown when the panel is selected, describing what to type.
    pub hint: &'static str,
    pub status_messages: &'static [&'static str],
    /// Whether submitting requires non-empty user input.
    pub needs_input: bool,
    /// Routed through the web-search proxy instead of the LLM transport.
    pub uses_search: bool,
    prompt: fn(&str) -> String,
}

impl Panel {
    pub fn build_prompt(&self, input: &str) -> String {
        (self.prompt)(input)
    }

    pub fn status_messages_vec(&self) -> Vec<String> {
        self.status_messages.iter().map(|s| s.to_string()).collect()
    }
}

pub fn catalog() -> &'static [Panel] {
    &PANELS
}

pub fn find(id: &str) -> Option<&'static Panel> {
    PANELS.iter().find(|p| p.id == id)
}

static PANELS: [Panel; 10] = [
    Panel {
        id: "concepts",
        title: "Learning Concepts",
        hint: "optionally name a focus area, or just press Enter",
        status_messages: &[],
        needs_input: false,
        uses_search: false,
        prompt: concepts_prompt,
    },
    Panel {
        id: "micro-lesson",
        title: "Micro-Lesson",
        hint: "name the topic you want a short lesson on",
        status_messages: &[
            "Analyzing topic...",
            "Generating content...",
            "Creating examples...",
            "Finalizing lesson...",
        ],
        needs_input: true,
        uses_search: false,
        prompt: micro_lesson_prompt,
    },
    Panel {
        id: "simulation",
        title: "Scenario Simulator",
        hint: "optionally describe the workplace situation to simulate",
        status_messages: &[
            "Creating scenario...",
            "Building interactive elements...",
            "Generating responses...",
            "Finalizing simulation...",
        ],
        needs_input: false,
        uses_search: false,
        prompt: simulation_prompt,
    },
    Panel {
        id: "recommendation",
        title: "Learning Recommendation",
        hint: "describe the skill gap you want to close",
        status_messages: &[
            "Analyzing skill gaps...",
            "Finding relevant content...",
            "Generating recommendations...",
            "Personalizing suggestions...",
        ],
        needs_input: true,
        uses_search: false,
        prompt: recommendation_prompt,
    },
    Panel {
        id: "career-coach",
        title: "Career Coach",
        hint: "ask about leadership, communication, or conflict management",
        status_messages: &[
            "Analyzing profile...",
            "Identifying opportunities...",
            "Generating advice...",
            "Creating action plan...",
        ],
        needs_input: true,
        uses_search: false,
        prompt: career_coach_prompt,
    },
    Panel {
        id: "skills-forecast",
        title: "Skills Forecasting",
        hint: "describe your current skills and career goals",
        status_messages: &[
            "Analyzing learning history...",
            "Identifying trends...",
            "Predicting future needs...",
            "Generating forecast...",
        ],
        needs_input: true,
        uses_search: false,
        prompt: skills_forecast_prompt,
    },
    Panel {
        id: "team-dynamics",
        title: "Team Dynamics",
        hint: "describe your team's makeup and current friction points",
        status_messages: &[
            "Analyzing team data...",
            "Identifying patterns...",
            "Generating insights...",
            "Creating recommendations...",
        ],
        needs_input: true,
        uses_search: false,
        prompt: team_dynamics_prompt,
    },
    Panel {
        id: "certifications",
        title: "Certification Advisor",
        hint: "give your role, key skills, and career goals",
        status_messages: &[
            "Reviewing your profile...",
            "Matching certifications...",
            "Estimating effort and cost...",
            "Preparing recommendations...",
        ],
        needs_input: true,
        uses_search: false,
        prompt: certifications_prompt,
    },
    Panel {
        id: "video-lesson",
        title: "Video Lesson Quiz",
        hint: "paste a summary of the video you just watched",
        status_messages: &[
            "Processing video...",
            "Extracting key points...",
            "Generating summary...",
            "Creating quiz questions...",
        ],
        needs_input: true,
        uses_search: false,
        prompt: video_lesson_prompt,
    },
    Panel {
        id: "web-search",
        title: "Web Search",
        hint: "type a query for the web-search proxy",
        status_messages: &["Searching the web...", "Summarizing results..."],
        needs_input: true,
        uses_search: true,
        prompt: passthrough_prompt,
    },
];

fn concepts_prompt(input: &str) -> String {
    let mut p = String::from(
        "Act as an AI expert and learning designer. Create 3 innovative concepts on how AI can \
         revolutionize workplace learning. Focus on: a) adaptive learning, b) simulation-based \
         training, and c) behavior-based recommendations. For each concept, provide a title and \
         a concise explanation. Use a professional, inspiring tone.",
    );
    if !input.is_empty() {
        p.push_str(&format!(" Tailor every concept to this context: {input}."));
    }
    p
}

fn micro_lesson_prompt(input: &str) -> String {
    format!(
        "Act as an expert corporate learning instructor with 15+ years of experience in adult \
         education and workplace training. Create a concise, practical micro-lesson on the \
         following topic: {input}. Focus on actionable insights, real-world examples, and clear \
         learning objectives. Keep the lesson under 300 words. Use a friendly, professional \
         tone. Format:\n1. Lesson Title\n2. Objective\n3. Lesson Content (with examples)"
    )
}

fn simulation_prompt(input: &str) -> String {
    let mut p = String::from(
        "Act as a senior workplace trainer designing realistic customer service scenarios. \
         Create a challenging but fair workplace conversation between an employee and a \
         customer. Focus on communication, problem-solving, and emotional intelligence. Provide \
         a scenario introduction, then the first customer message, then three possible employee \
         responses labeled A, B, and C, each reflecting a different approach, with one line of \
         feedback per response.",
    );
    if !input.is_empty() {
        p.push_str(&format!(" Base the scenario on this situation: {input}."));
    }
    p
}

fn recommendation_prompt(input: &str) -> String {
    format!(
        "Act as a professional learning and development advisor. Given the user's identified \
         skill gap: '{input}', recommend a targeted learning activity or resource. Explain why \
         this recommendation is effective, suggest a practical first step the user can take, \
         and keep your response under 100 words."
    )
}

fn career_coach_prompt(input: &str) -> String {
    format!(
        "Act as an experienced career development coach specializing in leadership, soft \
         skills, and professional growth. Guide the user through their career challenge by \
         asking thoughtful, open-ended questions, providing actionable advice and \
         encouragement, and suggesting practical next steps. Keep the response empathetic, \
         realistic, and supportive, and under 150 words.\n\nThe user says: {input}"
    )
}

fn skills_forecast_prompt(input: &str) -> String {
    format!(
        "Act as a workforce analytics expert specializing in future skills prediction. Given \
         my current skills and career goals: {input}, identify three emerging skills I should \
         develop for career advancement in the next 2-3 years. For each skill, provide a brief \
         explanation of its importance and a recommended way to acquire it. Use clear, \
         actionable language and format the response as a numbered list."
    )
}

fn team_dynamics_prompt(input: &str) -> String {
    format!(
        "Act as an organizational psychologist advising on team effectiveness. Given this \
         description of a team: {input}, analyze the likely collaboration patterns, name the \
         strengths worth reinforcing and the friction points worth addressing, and finish with \
         a short bulleted list of concrete interventions a team lead could try this month."
    )
}

fn certifications_prompt(input: &str) -> String {
    format!(
        "You are an expert certification advisor for professionals. Based on this profile: \
         {input}, recommend 3-5 relevant certifications that will enhance marketability and \
         career growth. For each, explain why it fits the profile, the expected time commitment \
         and difficulty, the estimated cost, and a first step to get started. Format the \
         response in a clear, structured way."
    )
}

fn video_lesson_prompt(input: &str) -> String {
    format!(
        "You are an AI learning assistant. A user just watched a video with this summary:\n\
         {input}\n\nCreate 3 multiple-choice questions about it. For each: provide a clear \
         question, list 4 options labeled A through D, indicate the correct answer, and add a \
         brief explanation for why it is correct."
    )
}

fn passthrough_prompt(input: &str) -> String {
    input.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_ids_are_unique() {
        let mut ids: Vec<_> = catalog().iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalog().len());
    }

    #[test]
    fn prompts_embed_the_user_input() {
        for panel in catalog().iter().filter(|p| p.needs_input) {
            let prompt = panel.build_prompt("UNIQUE-MARKER");
            assert!(
                prompt.contains("UNIQUE-MARKER"),
                "panel {} drops its input",
                panel.id
            );
        }
    }

    #[test]
    fn optional_input_panels_accept_empty_input() {
        let prompt = find("concepts").unwrap().build_prompt("");
        assert!(!prompt.is_empty());
        assert!(!prompt.contains("Tailor"));
    }

    #[test]
    fn search_panel_passes_the_query_through_verbatim() {
        let panel = find("web-search").unwrap();
        assert!(panel.uses_search);
        assert_eq!(panel.build_prompt("rust actors"), "rust actors");
    }
}
