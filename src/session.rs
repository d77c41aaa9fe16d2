//! Conversation state owned by the session controller.

use serde::{Deserialize, Serialize};

use crate::catalog::ModelCatalogs;

pub const TEMPERATURE_RANGE: (f32, f32) = (0.0, 2.0);
pub const MAX_TOKENS_RANGE: (u32, u32) = (100, 1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    TextVision,
    ImageGen,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::TextVision => Mode::ImageGen,
            Mode::ImageGen => Mode::TextVision,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::TextVision => "text/vision",
            Mode::ImageGen => "image generation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    #[default]
    Low,
    High,
}

impl ImageDetail {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ImageDetail::Low => "low",
            ImageDetail::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    pub temperature: f32,
    pub max_tokens: u32,
    pub image_detail: ImageDetail,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 300,
            image_detail: ImageDetail::Low,
        }
    }
}

/// A partial update; `None` fields are left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterUpdate {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub image_detail: Option<ImageDetail>,
}

impl Parameters {
    pub fn apply(&mut self, update: ParameterUpdate) {
        if let Some(temperature) = update.temperature {
            self.temperature = if temperature.is_nan() {
                TEMPERATURE_RANGE.0
            } else {
                temperature.clamp(TEMPERATURE_RANGE.0, TEMPERATURE_RANGE.1)
            };
        }
        if let Some(max_tokens) = update.max_tokens {
            self.max_tokens = max_tokens.clamp(MAX_TOKENS_RANGE.0, MAX_TOKENS_RANGE.1);
        }
        if let Some(detail) = update.image_detail {
            self.image_detail = detail;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    Image {
        mime_type: &'static str,
        base64_payload: String,
        detail: ImageDetail,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantKind {
    Text,
    GeneratedImage,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Never empty: the controller only builds one from validated input.
    User { parts: Vec<ContentPart> },
    Assistant { kind: AssistantKind, value: String },
}

impl Message {
    pub fn assistant_text(value: impl Into<String>) -> Self {
        Self::Assistant {
            kind: AssistantKind::Text,
            value: value.into(),
        }
    }

    pub fn generated_image(url: impl Into<String>) -> Self {
        Self::Assistant {
            kind: AssistantKind::GeneratedImage,
            value: url.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    TextVision,
    ImageGen,
}

/// The single conversation of one client instance.
///
/// History slot 0 is the system prompt, kept in its own field so it can
/// never be rendered or cleared as a chat turn. `turns` holds slots 1..
/// and is append-only until `clear`.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub(crate) system_prompt: String,
    pub(crate) turns: Vec<Message>,
    pub(crate) mode: Mode,
    pub(crate) selected_text_vision_model: Option<String>,
    pub(crate) selected_image_gen_model: Option<String>,
    pub(crate) parameters: Parameters,
    pub(crate) input_counter: u64,
    pub(crate) catalogs: ModelCatalogs,
}

impl Session {
    pub fn new(system_prompt: impl Into<String>, parameters: Parameters) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            parameters,
            ..Self::default()
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Chat turns after the system slot, in order.
    pub fn turns(&self) -> &[Message] {
        &self.turns
    }

    /// Length of the full history including the system slot.
    pub fn history_len(&self) -> usize {
        self.turns.len() + 1
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selected_model(&self, catalog: CatalogKind) -> Option<&str> {
        match catalog {
            CatalogKind::TextVision => self.selected_text_vision_model.as_deref(),
            CatalogKind::ImageGen => self.selected_image_gen_model.as_deref(),
        }
    }

    pub fn parameters(&self) -> Parameters {
        self.parameters
    }

    pub fn input_counter(&self) -> u64 {
        self.input_counter
    }

    pub fn catalogs(&self) -> &ModelCatalogs {
        &self.catalogs
    }

    pub fn latest_generated_image(&self) -> Option<&str> {
        self.turns.iter().rev().find_map(|message| match message {
            Message::Assistant {
                kind: AssistantKind::GeneratedImage,
                value,
            } => Some(value.as_str()),
            _ => None,
        })
    }
}
