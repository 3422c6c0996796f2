//! Display languages and the strings table
//!
//! Both locales map every [`UiText`] key through an exhaustive `match`, so adding a
//! key without translating it fails to compile.

use std::fmt;
use std::str::FromStr;

/// Supported display languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    /// Traditional Chinese
    #[default]
    Zh,
    /// English
    En,
}

/// Keys for every user-visible string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiText {
    Title,
    Upload,
    QuestionPlaceholder,
    Processing,
    AskQuestion,
    Answer,
    Error,
    Disclaimer,
    Designer,
    CurrentModel,
    ScrollHint,
    ApiKeyError,
}

impl UiText {
    /// All keys, in display order
    pub const ALL: [UiText; 12] = [
        UiText::Title,
        UiText::Upload,
        UiText::QuestionPlaceholder,
        UiText::Processing,
        UiText::AskQuestion,
        UiText::Answer,
        UiText::Error,
        UiText::Disclaimer,
        UiText::Designer,
        UiText::CurrentModel,
        UiText::ScrollHint,
        UiText::ApiKeyError,
    ];
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Zh, Language::En];

    /// The other language
    pub fn toggle(self) -> Self {
        match self {
            Language::Zh => Language::En,
            Language::En => Language::Zh,
        }
    }

    /// Short locale code
    pub fn code(self) -> &'static str {
        match self {
            Language::Zh => "zh",
            Language::En => "en",
        }
    }

    /// System instruction sent with every question
    pub fn system_prompt(self) -> &'static str {
        match self {
            Language::Zh => "你是一個專業的面試助手，負責回答關於這份履歷的問題。請基於履歷內容提供準確、專業的回答。如果問題超出履歷範圍，請明確指出。回答時要保持專業、客觀的語氣。",
            Language::En => "You are a professional interview assistant responsible for answering questions about this resume. Please provide accurate and professional answers based on the resume content. If a question goes beyond the scope of the resume, please clearly indicate this. Maintain a professional and objective tone in your responses.",
        }
    }

    /// Look up a display string
    pub fn text(self, key: UiText) -> &'static str {
        match self {
            Language::Zh => match key {
                UiText::Title => "Ask about me",
                UiText::Upload => "點擊上傳或拖放 PDF 檔案",
                UiText::QuestionPlaceholder => {
                    "請輸入您的問題... (按 Enter 送出，Shift+Enter 換行)"
                }
                UiText::Processing => "處理中...",
                UiText::AskQuestion => "送出問題",
                UiText::Answer => "回答：",
                UiText::Error => "抱歉，處理您的問題時發生錯誤。請重試。",
                UiText::Disclaimer => "* 回答僅供參考，請以 PDF 內容為準",
                UiText::Designer => "設計者",
                UiText::CurrentModel => "使用模型",
                UiText::ScrollHint => "* 可上下滾動查看完整內容",
                UiText::ApiKeyError => "請先設定 OpenAI API Key",
            },
            Language::En => match key {
                UiText::Title => "Ask about me",
                UiText::Upload => "Click to upload or drag and drop a PDF file",
                UiText::QuestionPlaceholder => {
                    "Ask a question... (Press Enter to submit, Shift+Enter for new line)"
                }
                UiText::Processing => "Processing...",
                UiText::AskQuestion => "Ask Question",
                UiText::Answer => "Answer:",
                UiText::Error => {
                    "Sorry, there was an error processing your question. Please try again."
                }
                UiText::Disclaimer => {
                    "* Answers are for reference only, please refer to the PDF content"
                }
                UiText::Designer => "Designer",
                UiText::CurrentModel => "Current Model",
                UiText::ScrollHint => "* Scroll to view full content",
                UiText::ApiKeyError => "Please set your OpenAI API Key first",
            },
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code().to_uppercase())
    }
}

/// Error returned when parsing an unknown locale code
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language: {0} (expected \"zh\" or \"en\")")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zh" => Ok(Language::Zh),
            "en" => Ok(Language::En),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}
