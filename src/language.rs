use serde::{Deserialize, Serialize};

/// Interface language, also sent with every AI request so generated content
/// matches the reader's language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[serde(rename = "English")]
    English,
    #[default]
    #[serde(rename = "한국어")]
    Korean,
    #[serde(rename = "中文")]
    Chinese,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Korean => "한국어",
            Language::Chinese => "中文",
        }
    }

    pub fn all() -> Vec<Language> {
        vec![Language::English, Language::Korean, Language::Chinese]
    }

    pub fn next(self) -> Language {
        match self {
            Language::English => Language::Korean,
            Language::Korean => Language::Chinese,
            Language::Chinese => Language::English,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Language::English => "Welcome to Bible AI",
            Language::Korean => "바이블 AI에 오신 것을 환영합니다",
            Language::Chinese => "欢迎来到 Bible AI",
        }
    }

    pub fn prev_label(&self) -> &'static str {
        match self {
            Language::English => "Prev",
            Language::Korean => "이전 장",
            Language::Chinese => "上一章",
        }
    }

    pub fn next_label(&self) -> &'static str {
        match self {
            Language::English => "Next",
            Language::Korean => "다음 장",
            Language::Chinese => "下一章",
        }
    }

    pub fn devotion_tab_label(&self) -> &'static str {
        match self {
            Language::English => "Devotion",
            Language::Korean => "묵상",
            Language::Chinese => "灵修",
        }
    }

    pub fn chat_tab_label(&self) -> &'static str {
        match self {
            Language::English => "Chat",
            Language::Korean => "대화",
            Language::Chinese => "对话",
        }
    }
}
