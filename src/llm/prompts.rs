// Prompt fragments and fixed spoken phrases

pub struct SystemPrompts;

impl SystemPrompts {
    /// Appended after the final `AI:` marker of every generation prompt
    pub fn concise_reply_instruction() -> &'static str {
        "간결하고 대화형으로 대답해 주세요. 이모티콘은 사용하지 말아 주세요."
    }
}

pub struct ConversationTemplates;

impl ConversationTemplates {
    /// Shown before each capture
    pub fn listening() -> &'static str {
        "무슨 말이라도? : "
    }

    /// Spoken when nothing intelligible was heard
    pub fn not_understood() -> &'static str {
        "인식하지 못했습니다. 다시 시도해 주세요."
    }

    /// Spoken when the recognition service could not be reached
    pub fn recognition_unavailable() -> &'static str {
        "음성 인식 서비스에 문제가 발생했습니다. 다시 시도해 주세요."
    }

    /// Substituted for the reply when generation fails
    pub fn generation_unavailable() -> &'static str {
        "응답을 받을 수 없습니다."
    }

    pub fn goodbye() -> &'static str {
        "프로그램을 종료합니다."
    }
}
